//! Per-run conversation state.

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::info;

use crate::interpreter::Effect;
use crate::store::{self, Agenda};

/// Mutable state owned by one assistant run.
///
/// # Details
/// Holds the user's name once they introduce themselves, the number of turns
/// processed so far, and the agenda together with the file it is saved to.
#[derive(Debug)]
pub struct Session {
    user_name: Option<String>,
    turns: u64,
    agenda: Agenda,
    agenda_path: PathBuf,
}

impl Session {
    /// Opens a session backed by the agenda file at `agenda_path`.
    pub fn open(agenda_path: impl Into<PathBuf>) -> Self {
        let agenda_path = agenda_path.into();
        let agenda = store::load_agenda(&agenda_path);
        info!(
            reminders = agenda.reminders.len(),
            alarms = agenda.alarms.len(),
            "agenda loaded"
        );
        Self {
            user_name: None,
            turns: 0,
            agenda,
            agenda_path,
        }
    }

    pub fn user_name(&self) -> Option<&str> {
        self.user_name.as_deref()
    }

    pub fn turns(&self) -> u64 {
        self.turns
    }

    pub fn record_turn(&mut self) {
        self.turns += 1;
    }

    pub fn agenda(&self) -> &Agenda {
        &self.agenda
    }

    pub fn agenda_path(&self) -> &Path {
        &self.agenda_path
    }

    /// Applies a reply's effect to the session.
    ///
    /// # Details
    /// New reminders and alarms are appended and the whole agenda is written
    /// back immediately. Help and quit effects belong to the runtime loop and
    /// leave the session untouched.
    ///
    /// # Errors
    /// Returns an error if the agenda cannot be persisted; the in-memory
    /// agenda keeps the new entry either way.
    pub fn apply(&mut self, effect: &Effect) -> Result<()> {
        match effect {
            Effect::Remember(name) => {
                self.user_name = Some(name.clone());
                Ok(())
            }
            Effect::AddReminder(reminder) => {
                self.agenda.reminders.push(reminder.clone());
                store::persist_agenda(&self.agenda_path, &self.agenda)
            }
            Effect::AddAlarm(alarm) => {
                self.agenda.alarms.push(alarm.clone());
                store::persist_agenda(&self.agenda_path, &self.agenda)
            }
            Effect::ShowHelp | Effect::Quit => Ok(()),
        }
    }
}
