/*
 * @file config.rs
 * @brief Runtime configuration loading
 * @author Kevin Thomas
 * @date 2025
 *
 * MIT License
 *
 * Copyright (c) 2025 Kevin Thomas
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy
 * of this software and associated documentation files (the "Software"), to deal
 * in the Software without restriction, including without limitation the rights
 * to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
 * copies of the Software, and to permit persons to whom the Software is
 * furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all
 * copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
 * AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
 * SOFTWARE.
 */

//! Runtime configuration.
//!
//! Values come from `config.json`, then environment variables, then command
//! line flags, each layer overriding the previous one.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::speech::{TtsConfig, TtsEngine};

/// Default path of the JSON configuration file.
pub const CONFIG_PATH: &str = "config.json";

/// Where reminders and alarms are kept when nothing else is configured.
const FALLBACK_DATA_FILE: &str = "nexa_data.json";

/// Where a custom rule table is looked for when nothing else is configured.
const FALLBACK_RULES_FILE: &str = "rules.json";

/// How often the assistant asks whether there is anything else to do.
const FALLBACK_CHECK_IN_EVERY: u32 = 5;

/// Strongly typed representation of `config.json`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "fallback_assistant_name")]
    pub assistant_name: String,
    #[serde(default = "fallback_data_file")]
    pub data_file: PathBuf,
    #[serde(default = "fallback_rules_file")]
    pub rules_file: PathBuf,
    #[serde(default)]
    pub tts: TtsConfig,
    /// Turns between check-ins; `0` disables them.
    #[serde(default = "fallback_check_in_every")]
    pub check_in_every: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            assistant_name: fallback_assistant_name(),
            data_file: fallback_data_file(),
            rules_file: fallback_rules_file(),
            tts: TtsConfig::default(),
            check_in_every: fallback_check_in_every(),
        }
    }
}

impl AppConfig {
    /// Applies `NEXA_*` environment overrides.
    pub fn apply_env(&mut self) {
        self.apply_overrides_from(|key| env::var(key).ok());
    }

    /// Applies overrides from any key lookup.
    ///
    /// # Details
    /// Recognizes `NEXA_DATA_FILE`, `NEXA_RULES_FILE`, `NEXA_VOICE` and
    /// `NEXA_TTS`. Blank values are ignored and an unknown engine name is
    /// logged and ignored.
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        if let Some(path) = get("NEXA_DATA_FILE") {
            self.data_file = PathBuf::from(path);
        }
        if let Some(path) = get("NEXA_RULES_FILE") {
            self.rules_file = PathBuf::from(path);
        }
        if let Some(voice) = get("NEXA_VOICE") {
            self.tts.voice = Some(voice);
        }
        if let Some(engine) = get("NEXA_TTS") {
            match engine.parse::<TtsEngine>() {
                Ok(engine) => self.tts.engine = engine,
                Err(err) => warn!("Ignoring NEXA_TTS: {}", err),
            }
        }
    }
}

/// Loads configuration from `path`, falling back to baked defaults when missing.
///
/// # Details
/// A missing file is normal and only noted at debug level; a file that
/// exists but cannot be read or parsed is logged as a warning.
///
/// # Arguments
/// * `path` - Location of the JSON configuration file.
///
/// # Returns
/// * `AppConfig` - The loaded or default configuration.
pub fn load_app_config(path: &Path) -> AppConfig {
    if !path.exists() {
        debug!(path = %path.display(), "no config file, using defaults");
        return AppConfig::default();
    }
    match fs::read_to_string(path) {
        Ok(raw) => match serde_json::from_str(&raw) {
            Ok(cfg) => cfg,
            Err(err) => {
                warn!("Config parse error ({}): {}", path.display(), err);
                AppConfig::default()
            }
        },
        Err(err) => {
            warn!("Config load error ({}): {}", path.display(), err);
            AppConfig::default()
        }
    }
}

fn fallback_assistant_name() -> String {
    "NEXA".to_string()
}

fn fallback_data_file() -> PathBuf {
    PathBuf::from(FALLBACK_DATA_FILE)
}

fn fallback_rules_file() -> PathBuf {
    PathBuf::from(FALLBACK_RULES_FILE)
}

fn fallback_check_in_every() -> u32 {
    FALLBACK_CHECK_IN_EVERY
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_app_config(&dir.path().join(CONFIG_PATH));
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.data_file, PathBuf::from("nexa_data.json"));
        assert_eq!(config.check_in_every, 5);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_PATH);
        fs::write(
            &path,
            r#"{ "assistant_name": "Jarvis", "tts": { "engine": "off", "rate": 150 } }"#,
        )
        .unwrap();
        let config = load_app_config(&path);
        assert_eq!(config.assistant_name, "Jarvis");
        assert_eq!(config.tts.engine, TtsEngine::Off);
        assert_eq!(config.tts.rate, 150);
        assert_eq!(config.tts.timeout_secs, 20);
        assert_eq!(config.rules_file, PathBuf::from("rules.json"));
    }

    #[test]
    fn malformed_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_PATH);
        fs::write(&path, "{ assistant_name: ").unwrap();
        assert_eq!(load_app_config(&path), AppConfig::default());
    }

    #[test]
    fn environment_overrides_file_values() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("NEXA_DATA_FILE", "/tmp/agenda.json"),
            ("NEXA_VOICE", "Zira"),
            ("NEXA_TTS", "espeak"),
            ("NEXA_RULES_FILE", "  "),
        ]);
        let mut config = AppConfig::default();
        config.apply_overrides_from(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.data_file, PathBuf::from("/tmp/agenda.json"));
        assert_eq!(config.tts.voice.as_deref(), Some("Zira"));
        assert_eq!(config.tts.engine, TtsEngine::Espeak);
        assert_eq!(config.rules_file, PathBuf::from("rules.json"));
    }

    #[test]
    fn unknown_engine_is_ignored() {
        let mut config = AppConfig::default();
        let before = config.tts.engine;
        config.apply_overrides_from(|key| (key == "NEXA_TTS").then(|| "festival".to_string()));
        assert_eq!(config.tts.engine, before);
    }
}
