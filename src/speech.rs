//! Text-to-speech functionality module.

use std::collections::BTreeMap;
use std::fmt;
use std::process::Stdio;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::process::Command;

use crate::commands::Mood;

/// Base speaking rate in words per minute.
const DEFAULT_RATE: u32 = 180;

/// Words-per-minute change for each mood step.
const RATE_STEP: i32 = 20;

/// Slowest rate we will ever ask an engine for.
const MIN_RATE: u32 = 80;

/// Upper bound on a single utterance.
const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// External program used to speak.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TtsEngine {
    /// macOS `say`.
    Say,
    /// `espeak` / `espeak-ng` on Linux.
    Espeak,
    /// Print only.
    Off,
}

impl TtsEngine {
    /// Picks the engine normally available on this OS.
    pub fn platform_default() -> Self {
        if cfg!(target_os = "macos") {
            TtsEngine::Say
        } else if cfg!(target_os = "linux") {
            TtsEngine::Espeak
        } else {
            TtsEngine::Off
        }
    }

    fn program(self) -> Option<&'static str> {
        match self {
            TtsEngine::Say => Some("say"),
            TtsEngine::Espeak => Some("espeak"),
            TtsEngine::Off => None,
        }
    }

    fn rate_flag(self) -> &'static str {
        match self {
            TtsEngine::Espeak => "-s",
            _ => "-r",
        }
    }
}

impl Default for TtsEngine {
    fn default() -> Self {
        Self::platform_default()
    }
}

impl FromStr for TtsEngine {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "say" => Ok(TtsEngine::Say),
            "espeak" => Ok(TtsEngine::Espeak),
            "off" | "none" | "mute" => Ok(TtsEngine::Off),
            other => bail!("unknown TTS engine '{}'", other),
        }
    }
}

impl fmt::Display for TtsEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TtsEngine::Say => "say",
            TtsEngine::Espeak => "espeak",
            TtsEngine::Off => "off",
        };
        f.write_str(name)
    }
}

/// Speech settings as they appear in `config.json`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TtsConfig {
    #[serde(default)]
    pub engine: TtsEngine,
    #[serde(default)]
    pub voice: Option<String>,
    #[serde(default = "default_rate")]
    pub rate: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Spoken-only spelling fixes, e.g. `NEXA` -> `NEX-uh`.
    #[serde(default = "default_pronunciations")]
    pub pronunciations: BTreeMap<String, String>,
    /// Wording changes applied to replies before they are shown and spoken.
    #[serde(default)]
    pub phrasing: Phrasing,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            engine: TtsEngine::default(),
            voice: None,
            rate: default_rate(),
            timeout_secs: default_timeout_secs(),
            pronunciations: default_pronunciations(),
            phrasing: Phrasing::default(),
        }
    }
}

fn default_rate() -> u32 {
    DEFAULT_RATE
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_pronunciations() -> BTreeMap<String, String> {
    BTreeMap::from([("NEXA".to_string(), "NEX-uh".to_string())])
}

/// Makes canned replies sound less mechanical.
///
/// # Details
/// Formal pairs such as "I am" become contractions, matched on whole words
/// in lowercase or capitalized form. Then a random lead-in is prepended and
/// a random sign-off appended according to the reply's mood. Empty maps turn
/// each step off.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Phrasing {
    #[serde(default = "default_contractions")]
    pub contractions: BTreeMap<String, String>,
    #[serde(default = "default_lead_ins")]
    pub lead_ins: BTreeMap<Mood, Vec<String>>,
    #[serde(default = "default_sign_offs")]
    pub sign_offs: BTreeMap<Mood, Vec<String>>,
}

impl Default for Phrasing {
    fn default() -> Self {
        Self {
            contractions: default_contractions(),
            lead_ins: default_lead_ins(),
            sign_offs: default_sign_offs(),
        }
    }
}

impl Phrasing {
    /// Leaves every reply as written.
    pub fn plain() -> Self {
        Self {
            contractions: BTreeMap::new(),
            lead_ins: BTreeMap::new(),
            sign_offs: BTreeMap::new(),
        }
    }

    /// Rewrites `text` for delivery in the given mood.
    pub fn apply<R: Rng + ?Sized>(&self, text: &str, mood: Mood, rng: &mut R) -> String {
        let mut text = self
            .contractions
            .iter()
            .fold(text.to_string(), |acc, (formal, natural)| {
                let acc = replace_words(&acc, formal, natural);
                replace_words(&acc, &capitalize(formal), &capitalize(natural))
            });
        if let Some(lead_in) = self.lead_ins.get(&mood).and_then(|c| c.choose(rng)) {
            text = if lead_in.ends_with(',') {
                format!("{} {}", lead_in, soften_first_word(&text))
            } else {
                format!("{} {}", lead_in, text)
            };
        }
        if let Some(sign_off) = self.sign_offs.get(&mood).and_then(|c| c.choose(rng)) {
            text = if text.ends_with(['.', '!', '?']) {
                format!("{} {}", text, sign_off)
            } else {
                format!("{}. {}", text, sign_off)
            };
        }
        text
    }
}

fn default_contractions() -> BTreeMap<String, String> {
    [
        ("i am", "I'm"),
        ("it is", "it's"),
        ("i will", "I'll"),
        ("do not", "don't"),
        ("cannot", "can't"),
        ("i have", "I've"),
        ("you are", "you're"),
        ("what is", "what's"),
    ]
    .into_iter()
    .map(|(formal, natural)| (formal.to_string(), natural.to_string()))
    .collect()
}

fn default_lead_ins() -> BTreeMap<Mood, Vec<String>> {
    BTreeMap::from([
        (
            Mood::Friendly,
            vec![
                "Hey there!".to_string(),
                "You know,".to_string(),
                "Well,".to_string(),
                "So,".to_string(),
            ],
        ),
        (
            Mood::Excited,
            vec!["Wow!".to_string(), "Awesome!".to_string(), "Cool!".to_string()],
        ),
    ])
}

fn default_sign_offs() -> BTreeMap<Mood, Vec<String>> {
    BTreeMap::from([(
        Mood::Calm,
        vec!["No worries.".to_string(), "Take your time.".to_string()],
    )])
}

/// Replaces `from` with `to` where it stands as whole words.
fn replace_words(text: &str, from: &str, to: &str) -> String {
    if from.is_empty() {
        return text.to_string();
    }
    let is_boundary = |c: Option<char>| c.map_or(true, |c| !c.is_alphanumeric() && c != '\'');
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for (pos, _) in text.match_indices(from) {
        let end = pos + from.len();
        if is_boundary(text[..pos].chars().next_back()) && is_boundary(text[end..].chars().next()) {
            out.push_str(&text[last..pos]);
            out.push_str(to);
            last = end;
        }
    }
    out.push_str(&text[last..]);
    out
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Lowercases a sentence-initial word after a comma lead-in ("Well, the...").
/// "I", "I'm" and words with more than one capital keep their case.
fn soften_first_word(text: &str) -> String {
    let first_word = text.split_whitespace().next().unwrap_or_default();
    let letters: Vec<char> = first_word.chars().filter(|c| c.is_alphabetic()).collect();
    let keep = letters.len() <= 1
        || first_word.starts_with("I'")
        || letters.iter().skip(1).any(|c| c.is_uppercase());
    if keep {
        return text.to_string();
    }
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Speaks replies through an OS text-to-speech command.
#[derive(Clone, Debug)]
pub struct Speaker {
    engine: TtsEngine,
    voice: Option<String>,
    rate: u32,
    timeout: Duration,
    pronunciations: BTreeMap<String, String>,
    phrasing: Phrasing,
}

impl Speaker {
    pub fn from_config(config: &TtsConfig) -> Self {
        Self {
            engine: config.engine,
            voice: config.voice.clone().filter(|v| !v.trim().is_empty()),
            rate: config.rate,
            timeout: Duration::from_secs(config.timeout_secs.max(1)),
            pronunciations: config.pronunciations.clone(),
            phrasing: config.phrasing.clone(),
        }
    }

    /// A speaker that never produces sound.
    pub fn muted() -> Self {
        Self::from_config(&TtsConfig {
            engine: TtsEngine::Off,
            ..TtsConfig::default()
        })
    }

    pub fn is_muted(&self) -> bool {
        self.engine == TtsEngine::Off
    }

    /// Wording of a reply as it is printed and spoken.
    pub fn phrase<R: Rng + ?Sized>(&self, text: &str, mood: Mood, rng: &mut R) -> String {
        self.phrasing.apply(text, mood, rng)
    }

    /// Applies pronunciation fixes to text that is about to be spoken.
    pub fn spoken_text(&self, text: &str) -> String {
        self.pronunciations
            .iter()
            .fold(text.to_string(), |acc, (written, spoken)| acc.replace(written, spoken))
    }

    /// Speaking rate for a mood, in words per minute.
    pub fn rate_for(&self, mood: Mood) -> u32 {
        let rate = i64::from(self.rate) + i64::from(mood.rate_step()) * i64::from(RATE_STEP);
        u32::try_from(rate.max(i64::from(MIN_RATE))).unwrap_or(u32::MAX)
    }

    /// Arguments passed to the engine's program.
    pub fn command_args(&self, text: &str, mood: Mood) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(voice) = &self.voice {
            args.push("-v".to_string());
            args.push(voice.clone());
        }
        args.push(self.engine.rate_flag().to_string());
        args.push(self.rate_for(mood).to_string());
        args.push(self.spoken_text(text));
        args
    }

    /// Speaks the given text.
    ///
    /// # Parameters
    /// * `text` - The utterance to synthesize.
    /// * `mood` - Tone that sets the speaking rate.
    ///
    /// # Returns
    /// `Ok(())` when the engine finishes successfully or speech is off.
    ///
    /// # Errors
    /// Returns an error for empty text, when the engine fails to spawn, exits
    /// unsuccessfully, or runs past the timeout (the child is killed).
    pub async fn speak(&self, text: &str, mood: Mood) -> Result<()> {
        if text.trim().is_empty() {
            bail!("Cannot speak empty text");
        }
        let Some(program) = self.engine.program() else {
            return Ok(());
        };
        let mut child = Command::new(program)
            .args(self.command_args(text, mood))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to start {}", program))?;
        let status = match tokio::time::timeout(self.timeout, child.wait()).await {
            Ok(status) => status.with_context(|| format!("Failed to wait for {}", program))?,
            Err(_) => bail!("{} timed out after {:?}", program, self.timeout),
        };
        if !status.success() {
            bail!("{} exited with {}", program, status);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn speaker(engine: TtsEngine, voice: Option<&str>) -> Speaker {
        Speaker::from_config(&TtsConfig {
            engine,
            voice: voice.map(str::to_string),
            ..TtsConfig::default()
        })
    }

    #[test]
    fn say_arguments_include_voice_and_rate() {
        let args = speaker(TtsEngine::Say, Some("Samantha")).command_args("Hello", Mood::Friendly);
        assert_eq!(args, vec!["-v", "Samantha", "-r", "180", "Hello"]);
    }

    #[test]
    fn espeak_uses_speed_flag_and_fixes_pronunciation() {
        let args = speaker(TtsEngine::Espeak, None).command_args("I am NEXA", Mood::Calm);
        assert_eq!(args, vec!["-s", "140", "I am NEX-uh"]);
    }

    #[test]
    fn mood_changes_rate_with_floor() {
        let speaker = speaker(TtsEngine::Say, None);
        assert!(speaker.rate_for(Mood::Excited) > speaker.rate_for(Mood::Neutral));
        assert!(speaker.rate_for(Mood::Slow) < speaker.rate_for(Mood::Calm));
        let slow = Speaker::from_config(&TtsConfig {
            rate: 60,
            ..TtsConfig::default()
        });
        assert_eq!(slow.rate_for(Mood::Slow), MIN_RATE);
    }

    #[test]
    fn rate_saturates_at_the_top_of_the_range() {
        let fast = Speaker::from_config(&TtsConfig {
            rate: u32::MAX,
            ..TtsConfig::default()
        });
        assert_eq!(fast.rate_for(Mood::Excited), u32::MAX);
        assert_eq!(fast.rate_for(Mood::Slow), u32::MAX - 60);
    }

    #[test]
    fn contractions_apply_to_whole_words_only() {
        let phrasing = Phrasing::default();
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            phrasing.apply("I am NEXA and it is late", Mood::Neutral, &mut rng),
            "I'm NEXA and it's late"
        );
        assert_eq!(
            phrasing.apply("What is the pi amount? I ambled.", Mood::Neutral, &mut rng),
            "What's the pi amount? I ambled."
        );
    }

    #[test]
    fn lead_ins_follow_mood() {
        let phrasing = Phrasing::default();
        let mut rng = StdRng::seed_from_u64(2);
        let observed: HashSet<String> = (0..200)
            .map(|_| phrasing.apply("The time is 5", Mood::Friendly, &mut rng))
            .collect();
        let expected: HashSet<String> = [
            "Hey there! The time is 5",
            "You know, the time is 5",
            "Well, the time is 5",
            "So, the time is 5",
        ]
        .into_iter()
        .map(str::to_string)
        .collect();
        assert_eq!(observed, expected);

        for _ in 0..20 {
            let text = phrasing.apply("NEXA is ready", Mood::Friendly, &mut rng);
            assert!(text.ends_with(" NEXA is ready"), "{text}");
            let text = phrasing.apply("Good job!", Mood::Excited, &mut rng);
            assert!(["Wow! ", "Awesome! ", "Cool! "].iter().any(|p| text.starts_with(p)));
        }
    }

    #[test]
    fn calm_replies_get_a_sign_off() {
        let phrasing = Phrasing::default();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..20 {
            let text = phrasing.apply("Could you try again?", Mood::Calm, &mut rng);
            assert!(
                text == "Could you try again? No worries."
                    || text == "Could you try again? Take your time.",
                "{text}"
            );
            let text = phrasing.apply("All done", Mood::Calm, &mut rng);
            assert!(text.starts_with("All done. "), "{text}");
        }
    }

    #[test]
    fn plain_phrasing_leaves_text_alone() {
        let mut rng = StdRng::seed_from_u64(4);
        let text = "I am calm, it is fine";
        assert_eq!(Phrasing::plain().apply(text, Mood::Calm, &mut rng), text);
    }

    #[test]
    fn phrasing_reads_from_config_json() {
        let config: TtsConfig = serde_json::from_str(
            r#"{ "phrasing": { "lead_ins": { "slow": ["Hmm,"] }, "sign_offs": {} } }"#,
        )
        .unwrap();
        let speaker = Speaker::from_config(&config);
        let mut rng = StdRng::seed_from_u64(5);
        assert_eq!(speaker.phrase("Let me think", Mood::Slow, &mut rng), "Hmm, let me think");
        assert_eq!(speaker.phrase("I am here", Mood::Calm, &mut rng), "I'm here");
    }

    #[test]
    fn engine_names_parse() {
        assert_eq!("ESPEAK".parse::<TtsEngine>().unwrap(), TtsEngine::Espeak);
        assert_eq!("mute".parse::<TtsEngine>().unwrap(), TtsEngine::Off);
        assert!("festival".parse::<TtsEngine>().is_err());
    }

    #[tokio::test]
    async fn muted_speaker_succeeds_with_text() {
        assert!(Speaker::muted().speak("Hello test", Mood::Neutral).await.is_ok());
    }

    #[tokio::test]
    async fn speak_rejects_empty_text() {
        assert!(Speaker::muted().speak("   ", Mood::Neutral).await.is_err());
    }

    #[tokio::test]
    async fn speak_reports_missing_program() {
        let speaker = speaker(TtsEngine::Say, None);
        if which_say_exists() {
            return;
        }
        assert!(speaker.speak("failure case", Mood::Neutral).await.is_err());
    }

    fn which_say_exists() -> bool {
        std::env::var_os("PATH")
            .map(|paths| std::env::split_paths(&paths).any(|dir| dir.join("say").is_file()))
            .unwrap_or(false)
    }
}
