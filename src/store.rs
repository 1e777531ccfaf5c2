/*
 * @file store.rs
 * @brief Persistent reminders and alarms
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

//! Reminder and alarm persistence.
//!
//! The agenda file is a single JSON object with `reminders` and `alarms`
//! arrays. It is read in full at startup and rewritten in full after every
//! change.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// A note the user asked to be reminded of.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    /// What to be reminded about.
    pub text: String,
    /// Human-readable scheduled time.
    pub time: String,
    /// When the reminder was created.
    pub created: NaiveDateTime,
}

/// An alarm the user asked for.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alarm {
    /// Alarm time, e.g. `5:00 AM`.
    pub time: String,
    #[serde(default = "alarm_active_default")]
    pub active: bool,
}

fn alarm_active_default() -> bool {
    true
}

/// Everything persisted between runs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agenda {
    #[serde(default)]
    pub reminders: Vec<Reminder>,
    #[serde(default)]
    pub alarms: Vec<Alarm>,
}

impl Agenda {
    pub fn is_empty(&self) -> bool {
        self.reminders.is_empty() && self.alarms.is_empty()
    }
}

/// Loads the agenda, treating any failure as "no prior data".
///
/// # Arguments
/// * `path` - Location of the agenda file.
///
/// # Returns
/// * `Agenda` - The stored agenda, or an empty one if it is missing or malformed.
pub fn load_agenda(path: &Path) -> Agenda {
    match load_agenda_from_file(path) {
        Ok(agenda) => agenda,
        Err(err) => {
            warn!("Agenda load error: {:#}. Starting fresh.", err);
            Agenda::default()
        }
    }
}

/// Reads the agenda file.
///
/// # Details
/// A missing or blank file is an empty agenda rather than an error.
///
/// # Errors
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_agenda_from_file(path: &Path) -> Result<Agenda> {
    if !path.exists() {
        return Ok(Agenda::default());
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    if contents.trim().is_empty() {
        return Ok(Agenda::default());
    }
    serde_json::from_str(&contents).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Writes the whole agenda to disk as pretty-printed JSON.
///
/// # Errors
/// Returns an error if serialization fails or the file cannot be written.
pub fn persist_agenda(path: &Path, agenda: &Agenda) -> Result<()> {
    let json = serde_json::to_string_pretty(agenda)
        .with_context(|| format!("Failed to serialize {}", path.display()))?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}
