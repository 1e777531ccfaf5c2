/*
 * @file commands.rs
 * @brief Command rule table configuration and matching logic
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

//! Command rule table configuration and matching.
//!
//! A [`RuleTable`] is an ordered list of [`Rule`]s. Each rule owns a set of
//! trigger substrings and the replies to choose from once one of them shows
//! up in the user's text. Order is priority: the first rule with any trigger
//! present wins.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Short tag describing how a reply should be delivered.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    #[default]
    Neutral,
    Friendly,
    Excited,
    Calm,
    Slow,
}

impl Mood {
    /// Every mood a reply can carry.
    pub const ALL: [Mood; 5] = [
        Mood::Neutral,
        Mood::Friendly,
        Mood::Excited,
        Mood::Calm,
        Mood::Slow,
    ];

    /// Relative speaking-rate step for this mood; `0` is the base rate.
    pub fn rate_step(self) -> i32 {
        match self {
            Mood::Excited => 1,
            Mood::Friendly => 0,
            Mood::Neutral => -1,
            Mood::Calm => -2,
            Mood::Slow => -3,
        }
    }
}

/// What a matched rule does besides replying.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Reply only.
    #[default]
    Say,
    /// Capture the user's name from the words after the trigger.
    Introduce,
    /// Store a reminder when the text carries a schedule.
    Remind,
    /// Store an alarm when the text carries a clock time.
    Alarm,
    /// Reply, then list the available commands.
    Help,
    /// Reply, then end the conversation.
    Quit,
}

/// A single entry of the dispatch table.
///
/// # Details
/// Replies may contain placeholders that are filled in when the rule fires:
/// `{time}`, `{date}`, `{day}`, `{greeting}`, `{name}`, `{input}` and
/// `{assistant}`, plus `{task}`/`{when}` for reminders and `{alarm}` for alarms.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Short identifier shown in the help listing.
    pub name: String,
    /// Substrings that activate this rule.
    pub triggers: Vec<String>,
    /// Delivery tone for the reply.
    #[serde(default)]
    pub mood: Mood,
    /// Side effect requested by the rule.
    #[serde(default)]
    pub action: Action,
    /// Reply candidates; one is chosen uniformly at random.
    pub replies: Vec<String>,
    /// Replies used instead of `replies` once the user's name is known.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub known_user: Vec<String>,
    /// Tone for `known_user` replies; the rule's mood when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub known_user_mood: Option<Mood>,
    /// Optional random lead-ins prepended to the chosen reply.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub openers: Vec<String>,
    /// Follow-up question used when an action lacks the details it needs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
}

impl Rule {
    /// Builds a rule with the given triggers and replies.
    pub fn new(name: &str, triggers: &[&str], mood: Mood, replies: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            triggers: strings(triggers),
            mood,
            action: Action::Say,
            replies: strings(replies),
            known_user: Vec::new(),
            known_user_mood: None,
            openers: Vec::new(),
            prompt: None,
        }
    }

    pub fn with_action(mut self, action: Action) -> Self {
        self.action = action;
        self
    }

    pub fn with_known_user(mut self, replies: &[&str]) -> Self {
        self.known_user = strings(replies);
        self
    }

    pub fn with_known_user_mood(mut self, mood: Mood) -> Self {
        self.known_user_mood = Some(mood);
        self
    }

    pub fn with_openers(mut self, openers: &[&str]) -> Self {
        self.openers = strings(openers);
        self
    }

    pub fn with_prompt(mut self, prompt: &str) -> Self {
        self.prompt = Some(prompt.to_string());
        self
    }

    /// Returns the first trigger contained in `text`, if any.
    pub fn matched_trigger(&self, text: &str) -> Option<&str> {
        self.triggers
            .iter()
            .map(String::as_str)
            .find(|trigger| text.contains(trigger))
    }
}

/// A reply set with a fixed mood, used outside the ordered rules.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Canned {
    pub replies: Vec<String>,
    #[serde(default)]
    pub mood: Mood,
}

impl Canned {
    fn new(mood: Mood, replies: &[&str]) -> Self {
        Self {
            replies: strings(replies),
            mood,
        }
    }
}

/// Greeting candidates per part of the day.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Greetings {
    pub morning: Vec<String>,
    pub afternoon: Vec<String>,
    pub evening: Vec<String>,
    pub night: Vec<String>,
}

/// The complete dispatch table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RuleTable {
    /// Rules in priority order.
    pub rules: Vec<Rule>,
    /// Reply when no rule matches.
    pub fallback: Canned,
    /// Reply when the input is empty.
    pub no_input: Canned,
    /// Time-of-day greetings for `{greeting}`.
    #[serde(default = "default_greetings")]
    pub greetings: Greetings,
    /// Lines spoken once at startup.
    #[serde(default = "default_welcome")]
    pub welcome: Canned,
    /// Periodic "anything else?" line.
    #[serde(default = "default_check_in")]
    pub check_in: Canned,
}

impl Default for RuleTable {
    fn default() -> Self {
        default_rules()
    }
}

impl RuleTable {
    /// Finds the first rule with a trigger contained in `text`.
    ///
    /// # Arguments
    /// * `text` - The user's utterance in lowercase.
    ///
    /// # Returns
    /// * `Some(&Rule)` - The highest-priority matching rule.
    /// * `None` - No rule matched.
    pub fn find_rule(&self, text: &str) -> Option<&Rule> {
        self.rules
            .iter()
            .find(|rule| rule.matched_trigger(text).is_some())
    }

    /// Lowercases and trims every trigger so they line up with normalized input.
    pub fn normalize(&mut self) {
        for rule in &mut self.rules {
            for trigger in &mut rule.triggers {
                *trigger = trigger.trim().to_lowercase();
            }
        }
    }

    /// Checks the table for entries that would make a reply impossible.
    ///
    /// # Errors
    /// Returns an error naming the first offending rule: a rule without
    /// triggers, an empty trigger (it would match everything), a rule without
    /// replies, or an action that needs a follow-up prompt but has none. Empty
    /// fallback or no-input replies are rejected as well.
    pub fn validate(&self) -> Result<()> {
        for (index, rule) in self.rules.iter().enumerate() {
            let label = if rule.name.is_empty() {
                format!("#{}", index)
            } else {
                rule.name.clone()
            };
            if rule.triggers.is_empty() {
                bail!("rule {} has no triggers", label);
            }
            if rule.triggers.iter().any(|t| t.trim().is_empty()) {
                bail!("rule {} has an empty trigger", label);
            }
            if rule.replies.is_empty() {
                bail!("rule {} has no replies", label);
            }
            let needs_prompt = matches!(
                rule.action,
                Action::Introduce | Action::Remind | Action::Alarm
            );
            if needs_prompt && rule.prompt.is_none() {
                bail!("rule {} needs a prompt for its action", label);
            }
        }
        if self.fallback.replies.is_empty() {
            bail!("fallback has no replies");
        }
        if self.no_input.replies.is_empty() {
            bail!("no_input has no replies");
        }
        Ok(())
    }
}

/// Loads the rule table from `path`.
///
/// # Details
/// Returns the built-in table when the file is missing, cannot be parsed, or
/// fails validation, so the assistant always has something to say.
///
/// # Arguments
/// * `path` - Location of the JSON rule file.
///
/// # Returns
/// * `RuleTable` - Loaded or default rule table.
pub fn load_rules(path: &Path) -> RuleTable {
    if !path.exists() {
        debug!(path = %path.display(), "no rule file, using built-in rules");
        return default_rules();
    }
    load_rules_from_file(path).unwrap_or_else(|err| {
        warn!(
            "Failed to load {}: {:#}. Using built-in rules.",
            path.display(),
            err
        );
        default_rules()
    })
}

/// Reads, normalizes and validates a JSON rule file.
///
/// # Errors
/// Returns an error if the file cannot be read, parsed, or validated.
fn load_rules_from_file(path: &Path) -> Result<RuleTable> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let mut table: RuleTable = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    table.normalize();
    table.validate()?;
    Ok(table)
}

/// Generates a help listing for every rule in the table.
///
/// # Arguments
/// * `table` - The rule table.
///
/// # Returns
/// * `String` - One line per rule with up to three example triggers.
pub fn generate_command_list(table: &RuleTable) -> String {
    let mut result = String::from("Available commands:\n");
    for rule in &table.rules {
        let examples: Vec<&str> = rule.triggers.iter().take(3).map(String::as_str).collect();
        result.push_str(&format!("- {}: {}\n", rule.name, examples.join(" / ")));
    }
    result
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_greetings() -> Greetings {
    Greetings {
        morning: strings(&[
            "Good morning! I hope you're starting your day well!",
            "Morning! Ready for a great day ahead?",
            "Hello there! What a beautiful morning to chat!",
        ]),
        afternoon: strings(&[
            "Good afternoon! How's your day going so far?",
            "Afternoon! Hope you're having a productive day!",
            "Hello! Lovely afternoon for a conversation, isn't it?",
        ]),
        evening: strings(&[
            "Good evening! How was your day?",
            "Evening! Perfect time to relax and chat!",
            "Hello! Hope you had a wonderful evening so far!",
        ]),
        night: strings(&[
            "Hello! Still up and about I see!",
            "Hi there! Late night conversations are the best!",
            "Hello! Working late or just enjoying the night?",
        ]),
    }
}

fn default_welcome() -> Canned {
    Canned::new(
        Mood::Excited,
        &[
            "{greeting} I'm {assistant}, ready to assist you.",
            "{greeting} All systems online. {assistant} is ready for your commands.",
        ],
    )
}

fn default_check_in() -> Canned {
    Canned::new(Mood::Friendly, &["Is there anything else I can help you with?"])
}

/// Provides the built-in rule table.
///
/// # Details
/// Rules that store data come first so their free text (a reminder to "say
/// goodbye") cannot trip a control rule. Quit and help follow, then the
/// informational rules, and the very broad greeting triggers last so that
/// words like "this" or "which" do not shadow more specific requests.
pub fn default_rules() -> RuleTable {
    let rules = vec![
        Rule::new(
            "introduce",
            &["my name is", "call me"],
            Mood::Friendly,
            &[
                "Nice to meet you, {name}!",
                "Got it, {name}! I'll remember that name.",
                "Hello {name}! That's a great name. How can I help you today?",
                "Pleased to meet you, {name}! Ready to chat?",
            ],
        )
        .with_action(Action::Introduce)
        .with_prompt("Sorry, I didn't catch your name. What should I call you?"),
        Rule::new(
            "reminder",
            &["remind me", "reminder", "remember", "don't forget"],
            Mood::Calm,
            &[
                "I'll remind you: '{task}' on {when}",
                "Got it. '{task}' is on your list for {when}.",
            ],
        )
        .with_action(Action::Remind)
        .with_prompt("What would you like me to remind you about, and when?"),
        Rule::new(
            "alarm",
            &["alarm", "wake me"],
            Mood::Neutral,
            &["Alarm set for {alarm}", "Done. Your alarm is set for {alarm}."],
        )
        .with_action(Action::Alarm)
        .with_prompt("What time should I set the alarm for?"),
        Rule::new(
            "quit",
            &["goodbye", "bye", "exit", "quit", "stop", "shutdown", "good night", "see you"],
            Mood::Friendly,
            &[
                "Goodbye! It was wonderful talking with you!",
                "See you later! Take care!",
                "{assistant} systems going offline. Goodbye!",
            ],
        )
        .with_action(Action::Quit)
        .with_known_user(&[
            "Goodbye {name}! This was a great chat!",
            "See you later {name}!",
            "Take care {name}! Until we speak again!",
        ]),
        Rule::new(
            "help",
            &["help", "what can you do", "what can i ask", "commands", "menu"],
            Mood::Excited,
            &[
                "I can tell you the time and date, tell jokes, remember your name, and keep reminders and alarms. Here's the full list.",
                "Lots of things! Here's what you can ask me.",
            ],
        )
        .with_action(Action::Help),
        Rule::new(
            "day",
            &["what day", "which day", "day of the week"],
            Mood::Friendly,
            &[
                "Today is {day}",
                "It's {day} today",
                "We're on {day}",
                "Today is {day}, my friend",
            ],
        ),
        Rule::new(
            "time",
            &["time", "clock"],
            Mood::Neutral,
            &[
                "It's currently {time}",
                "Right now it's {time}",
                "The time is {time}",
                "My clock shows {time}",
            ],
        ),
        Rule::new(
            "date",
            &["date", "what is today", "today's date"],
            Mood::Neutral,
            &[
                "Today is {date}",
                "It's {date} today",
                "According to my calendar, it's {date}",
            ],
        ),
        Rule::new(
            "joke",
            &["joke", "funny", "make me laugh"],
            Mood::Excited,
            &[
                "Why do programmers prefer dark mode? Because light attracts bugs!",
                "What's a computer's favorite snack? Microchips!",
                "Why was the computer cold? It left its Windows open!",
                "How do you organize a space party? You planet!",
                "Why don't scientists trust atoms? Because they make up everything!",
                "What do you call a sleeping computer? A laptop!",
            ],
        ),
        Rule::new(
            "story",
            &["story"],
            Mood::Calm,
            &["Once upon a time, an engineer created an AI assistant. And that's me, {assistant}! The story continues as we build amazing things together."],
        ),
        Rule::new(
            "weather",
            &["weather", "temperature", "forecast"],
            Mood::Neutral,
            &["Weather services are currently in development. This feature will be available soon."],
        ),
        Rule::new(
            "calculate",
            &["calculate", "math"],
            Mood::Neutral,
            &["Calculation module is standing by. Ready for mathematical operations."],
        ),
        Rule::new(
            "status",
            &["status", "diagnostic", "system check"],
            Mood::Neutral,
            &["All systems are operational. Running at optimal performance levels."],
        ),
        Rule::new(
            "audio test",
            &["audio test", "voice test", "test"],
            Mood::Neutral,
            &["Audio systems confirmed working. {assistant} is speaking clearly and ready for commands."],
        ),
        Rule::new(
            "voice",
            &["voice"],
            Mood::Friendly,
            &["This is my voice! Do you like how I sound?"],
        ),
        Rule::new(
            "how are you",
            &["how are you", "how do you feel", "how is it going"],
            Mood::Friendly,
            &[
                "I'm functioning perfectly, thank you for asking!",
                "I'm great! Ready for whatever you need.",
                "I'm doing well! It's nice to chat with you.",
            ],
        ),
        Rule::new(
            "thanks",
            &["thank you", "thanks", "appreciate it"],
            Mood::Friendly,
            &[
                "You're welcome! It's always a pleasure to assist you.",
                "Anytime!",
                "My pleasure!",
            ],
        ),
        Rule::new(
            "compliment",
            &["you are smart", "you are intelligent", "good job", "well done"],
            Mood::Excited,
            &[
                "Thank you! I'm learning from our conversations.",
                "You're making me blush! Well, if I could blush...",
                "Thank you! I'm just trying to keep up with you!",
            ],
        ),
        Rule::new(
            "identity",
            &["your name", "who are you", "what are you", "tell me about yourself"],
            Mood::Friendly,
            &[
                "I am {assistant}, your personal AI assistant.",
                "I'm {assistant}! I'm here to help with time, dates, reminders and a good joke.",
            ],
        ),
        Rule::new(
            "creator",
            &["who made you", "who created you", "who built you"],
            Mood::Neutral,
            &["I was developed as an innovative AI project, bringing futuristic technology to life."],
        ),
        Rule::new(
            "greeting",
            &[
                "hello",
                "hey",
                "hi",
                "wake up",
                "good morning",
                "good afternoon",
                "good evening",
                "nexa",
            ],
            Mood::Friendly,
            &[
                "{greeting} What should I call you?",
                "{greeting} Mind telling me your name?",
                "{greeting} I'm {assistant}. What's your name?",
            ],
        )
        .with_known_user(&["{greeting} {name}!", "Hey {name}! {greeting}"])
        .with_known_user_mood(Mood::Excited),
    ];

    RuleTable {
        rules,
        fallback: Canned::new(
            Mood::Calm,
            &[
                "I heard '{input}'. Try asking about the time, the date, a joke, or a reminder.",
                "You said '{input}'. I'm still learning that one. You can ask me what time it is or to tell a joke.",
                "I understand you said '{input}', but I'm still learning that specific command. Say 'help' to see what I can do.",
            ],
        ),
        no_input: Canned::new(Mood::Calm, &["I didn't catch that. Could you try again?"]),
        greetings: default_greetings(),
        welcome: default_welcome(),
        check_in: default_check_in(),
    }
}
