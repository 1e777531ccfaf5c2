//! Command line interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{AppConfig, CONFIG_PATH};
use crate::speech::TtsEngine;

/// NEXA - a rule-driven console assistant that talks back.
#[derive(Parser, Debug)]
#[command(name = "nexa", version, about)]
pub struct Cli {
    /// Path to config.json
    #[arg(long, global = true, default_value = CONFIG_PATH)]
    pub config: PathBuf,

    /// Custom rule table (JSON)
    #[arg(long, global = true)]
    pub rules: Option<PathBuf>,

    /// Where reminders and alarms are stored
    #[arg(long, global = true)]
    pub data_file: Option<PathBuf>,

    /// Print replies without speaking them
    #[arg(long, global = true)]
    pub mute: bool,

    /// Voice name passed to the speech engine
    #[arg(long, global = true)]
    pub voice: Option<String>,

    /// Seed for reply selection
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    /// Debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Start an interactive conversation (default)
    Chat,
    /// Answer a single command and exit
    Ask {
        #[arg(required = true, num_args = 1..)]
        words: Vec<String>,
    },
    /// Print the active rule table as JSON
    Rules,
    /// List stored reminders and alarms
    Agenda,
}

impl Cli {
    /// Layers command line flags over file and environment settings.
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(path) = &self.rules {
            config.rules_file = path.clone();
        }
        if let Some(path) = &self.data_file {
            config.data_file = path.clone();
        }
        if let Some(voice) = &self.voice {
            config.tts.voice = Some(voice.clone());
        }
        if self.mute {
            config.tts.engine = TtsEngine::Off;
        }
    }

    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Chat)
    }

    /// Default tracing filter when `RUST_LOG` is unset.
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "nexa=debug"
        } else {
            "nexa=info"
        }
    }
}
