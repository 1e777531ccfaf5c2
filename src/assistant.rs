/*
 * @file assistant.rs
 * @brief Conversation runtime and entry points
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

//! Conversation runtime.
//!
//! Owns the interpreter, the session, the speaker and the random source, and
//! drives them one input line at a time.

use std::io::Write;

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::commands::{self, generate_command_list};
use crate::config::AppConfig;
use crate::interpreter::{Effect, Interpreter, Reply};
use crate::session::Session;
use crate::speech::Speaker;
use crate::store::{self, Agenda};

/// Runs the interactive console assistant until the user quits or input ends.
///
/// # Arguments
/// * `config` - Fully layered configuration.
/// * `seed` - Optional seed for reproducible reply selection.
///
/// # Errors
/// Returns an error only if stdin or stdout fail.
pub async fn run_assistant(config: &AppConfig, seed: Option<u64>) -> Result<()> {
    let runtime = AssistantRuntime::from_config(config, seed);
    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    runtime.run_loop(stdin, &mut stdout).await?;
    Ok(())
}

/// Answers a single command, applying its effect, then returns the reply.
pub async fn ask_once(config: &AppConfig, seed: Option<u64>, text: &str) -> Result<Reply> {
    let mut runtime = AssistantRuntime::from_config(config, seed);
    let mut stdout = std::io::stdout();
    runtime.respond(text, &mut stdout).await
}

/// Prints the stored reminders and alarms.
pub fn show_agenda(config: &AppConfig) -> Result<()> {
    let agenda = store::load_agenda(&config.data_file);
    let mut stdout = std::io::stdout();
    write!(stdout, "{}", describe_agenda(&agenda)).context("Failed to write agenda")?;
    Ok(())
}

/// Prints the active rule table as pretty JSON.
///
/// # Details
/// The output is a valid rules file, so it can be saved and edited as a
/// starting point for a custom table.
pub fn print_rules(config: &AppConfig) -> Result<()> {
    let table = commands::load_rules(&config.rules_file);
    let json = serde_json::to_string_pretty(&table).context("Failed to serialize rules")?;
    println!("{}", json);
    Ok(())
}

/// Human-readable listing of an agenda.
pub fn describe_agenda(agenda: &Agenda) -> String {
    if agenda.is_empty() {
        return "No reminders or alarms saved.\n".to_string();
    }
    let mut out = String::new();
    if !agenda.reminders.is_empty() {
        out.push_str("Reminders:\n");
        for reminder in &agenda.reminders {
            out.push_str(&format!("- {} ({})\n", reminder.text, reminder.time));
        }
    }
    if !agenda.alarms.is_empty() {
        out.push_str("Alarms:\n");
        for alarm in &agenda.alarms {
            let state = if alarm.active { "on" } else { "off" };
            out.push_str(&format!("- {} [{}]\n", alarm.time, state));
        }
    }
    out
}

/// Builds the reply source, seeded when asked for.
fn reply_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Runtime container for one conversation.
///
/// # Details
/// Generic over the clock so tests can pin the time of day.
pub struct AssistantRuntime<C: Clock = SystemClock> {
    interpreter: Interpreter,
    session: Session,
    speaker: Speaker,
    rng: StdRng,
    clock: C,
    check_in_every: u32,
}

impl AssistantRuntime<SystemClock> {
    /// Creates a runtime from configuration.
    ///
    /// # Details
    /// Loads the rule table and the agenda, both of which fall back to
    /// defaults on failure, so construction itself cannot fail.
    pub fn from_config(config: &AppConfig, seed: Option<u64>) -> Self {
        let table = commands::load_rules(&config.rules_file);
        info!(
            rules = table.rules.len(),
            engine = %config.tts.engine,
            "assistant configured"
        );
        Self::new(
            Interpreter::new(table, config.assistant_name.clone()),
            Session::open(&config.data_file),
            Speaker::from_config(&config.tts),
            reply_rng(seed),
            SystemClock,
            config.check_in_every,
        )
    }
}

impl<C: Clock> AssistantRuntime<C> {
    pub fn new(
        interpreter: Interpreter,
        session: Session,
        speaker: Speaker,
        rng: StdRng,
        clock: C,
        check_in_every: u32,
    ) -> Self {
        Self {
            interpreter,
            session,
            speaker,
            rng,
            clock,
            check_in_every,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Runs the conversation loop until quit or end of input.
    ///
    /// # Arguments
    /// * `input` - Line source, normally stdin.
    /// * `out` - Where the conversation is printed.
    ///
    /// # Returns
    /// * `Session` - Final session state.
    ///
    /// # Errors
    /// Returns an error if reading input or writing output fails.
    pub async fn run_loop<I, W>(mut self, input: I, out: &mut W) -> Result<Session>
    where
        I: AsyncBufRead + Unpin,
        W: Write,
    {
        self.greet(out).await?;
        let mut lines = input.lines();
        loop {
            write!(out, "You: ").context("Failed to write prompt")?;
            out.flush().context("Failed to flush prompt")?;
            let Some(line) = lines.next_line().await.context("Failed to read input")? else {
                writeln!(out).context("Failed to write output")?;
                debug!("input closed");
                break;
            };
            let reply = self.respond(&line, out).await?;
            if reply.is_quit() {
                break;
            }
            if self.check_in_due() {
                let check_in = self.interpreter.check_in(&mut self.rng, &self.clock);
                self.deliver(&check_in, out).await?;
            }
        }
        let turns = self.session.turns();
        info!(turns, "session ended");
        writeln!(out, "Processed {} commands this session.", turns)
            .context("Failed to write output")?;
        Ok(self.session)
    }

    /// Handles one line of input.
    ///
    /// # Details
    /// Counts the turn, interprets the text, applies the reply's effect,
    /// then prints and speaks the reply. A failed save is logged and the
    /// conversation goes on.
    ///
    /// # Errors
    /// Returns an error only if writing to `out` fails.
    pub async fn respond<W: Write>(&mut self, input: &str, out: &mut W) -> Result<Reply> {
        self.session.record_turn();
        let reply = self
            .interpreter
            .interpret(input, &self.session, &mut self.rng, &self.clock);
        if let Some(effect) = &reply.effect {
            if let Err(err) = self.session.apply(effect) {
                warn!("Could not save agenda: {:#}", err);
            }
        }
        self.deliver(&reply, out).await?;
        if matches!(reply.effect, Some(Effect::ShowHelp)) {
            write!(out, "{}", generate_command_list(self.interpreter.table()))
                .context("Failed to write help")?;
        }
        Ok(reply)
    }

    async fn greet<W: Write>(&mut self, out: &mut W) -> Result<()> {
        let name = self.interpreter.assistant_name().to_string();
        writeln!(out, "=== {} ===", name).context("Failed to write banner")?;
        writeln!(out, "Type 'help' to see what I can do, or 'quit' to leave.")
            .context("Failed to write banner")?;
        let welcome = self.interpreter.welcome(&mut self.rng, &self.clock);
        self.deliver(&welcome, out).await
    }

    /// Phrases a reply for its mood, then prints and speaks it.
    async fn deliver<W: Write>(&mut self, reply: &Reply, out: &mut W) -> Result<()> {
        let text = self.speaker.phrase(&reply.text, reply.mood, &mut self.rng);
        writeln!(out, "{}: {}", self.interpreter.assistant_name(), text)
            .context("Failed to write reply")?;
        out.flush().context("Failed to flush reply")?;
        if let Err(err) = self.speaker.speak(&text, reply.mood).await {
            warn!("Speech failed: {:#}", err);
        }
        Ok(())
    }

    fn check_in_due(&self) -> bool {
        let every = u64::from(self.check_in_every);
        every > 0 && self.session.turns() % every == 0
    }
}
