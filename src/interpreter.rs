/*
 * @file interpreter.rs
 * @brief Command interpreter that turns an utterance into a reply
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

//! Command interpreter.
//!
//! [`Interpreter::interpret`] is total: every input, including the empty
//! string, yields exactly one non-empty [`Reply`]. Randomness and the current
//! time are passed in so callers decide how deterministic a run is.

use chrono::{Duration, NaiveDateTime};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::clock::{
    find_clock_time, Clock, DayPeriod, ALARM_FORMAT, DATE_FORMAT, SCHEDULE_FORMAT, TIME_FORMAT,
};
use crate::commands::{Action, Canned, Mood, Rule, RuleTable};
use crate::session::Session;
use crate::store::{Alarm, Reminder};

/// Used only if a reply template is empty.
const LAST_RESORT_REPLY: &str = "I'm not sure how to answer that yet.";

/// Stand-in for `{name}` before the user has introduced themselves.
const UNKNOWN_USER: &str = "friend";

/// Words dropped from the front of a reminder's task.
const LEADING_FILLERS: &[&str] = &[
    "set", "a", "an", "me", "to", "about", "please", "that", "for",
];

/// Words dropped from the end of a reminder's task.
const TRAILING_FILLERS: &[&str] = &["at", "on", "for", "by", "to"];

/// Session change requested by a reply.
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    Remember(String),
    AddReminder(Reminder),
    AddAlarm(Alarm),
    ShowHelp,
    Quit,
}

/// The interpreter's answer to one utterance.
#[derive(Clone, Debug, PartialEq)]
pub struct Reply {
    pub text: String,
    pub mood: Mood,
    pub effect: Option<Effect>,
}

impl Reply {
    fn new(text: String, mood: Mood) -> Self {
        let text = if text.trim().is_empty() {
            LAST_RESORT_REPLY.to_string()
        } else {
            text
        };
        Self {
            text,
            mood,
            effect: None,
        }
    }

    fn with_effect(mut self, effect: Effect) -> Self {
        self.effect = Some(effect);
        self
    }

    /// Whether this reply ends the conversation.
    pub fn is_quit(&self) -> bool {
        matches!(self.effect, Some(Effect::Quit))
    }
}

/// Values available to reply templates.
#[derive(Default)]
struct Fill<'a> {
    input: &'a str,
    name: Option<&'a str>,
    task: Option<&'a str>,
    when: Option<&'a str>,
    alarm: Option<&'a str>,
}

/// Rule-table driven command interpreter.
#[derive(Clone, Debug)]
pub struct Interpreter {
    table: RuleTable,
    assistant_name: String,
}

impl Interpreter {
    pub fn new(table: RuleTable, assistant_name: impl Into<String>) -> Self {
        Self {
            table,
            assistant_name: assistant_name.into(),
        }
    }

    pub fn table(&self) -> &RuleTable {
        &self.table
    }

    pub fn assistant_name(&self) -> &str {
        &self.assistant_name
    }

    /// Produces the startup line.
    pub fn welcome<R, C>(&self, rng: &mut R, clock: &C) -> Reply
    where
        R: Rng + ?Sized,
        C: Clock + ?Sized,
    {
        self.canned(&self.table.welcome, &Fill::default(), clock.now(), rng)
    }

    /// Produces the periodic "anything else?" line.
    pub fn check_in<R, C>(&self, rng: &mut R, clock: &C) -> Reply
    where
        R: Rng + ?Sized,
        C: Clock + ?Sized,
    {
        self.canned(&self.table.check_in, &Fill::default(), clock.now(), rng)
    }

    /// Selects a reply for `input`.
    ///
    /// # Details
    /// The input is trimmed and lowercased. Empty input gets the no-input
    /// reply. Otherwise rules are tried in table order and the first rule
    /// with a trigger contained anywhere in the input answers; if none does,
    /// the fallback answers.
    ///
    /// # Arguments
    /// * `input` - Raw user text.
    /// * `session` - Current session, read for the user's name.
    /// * `rng` - Source for picking among candidate replies.
    /// * `clock` - Source of the current time.
    ///
    /// # Returns
    /// * `Reply` - Text, mood, and an optional effect for the caller to apply.
    pub fn interpret<R, C>(&self, input: &str, session: &Session, rng: &mut R, clock: &C) -> Reply
    where
        R: Rng + ?Sized,
        C: Clock + ?Sized,
    {
        let normalized = input.trim().to_lowercase();
        let now = clock.now();
        let fill = Fill {
            input: &normalized,
            name: session.user_name(),
            ..Fill::default()
        };

        if normalized.is_empty() {
            return self.canned(&self.table.no_input, &fill, now, rng);
        }

        let Some(rule) = self.table.find_rule(&normalized) else {
            debug!(input = %normalized, "no rule matched");
            return self.canned(&self.table.fallback, &fill, now, rng);
        };
        debug!(rule = %rule.name, "rule matched");

        match rule.action {
            Action::Say => self.say(rule, &fill, now, rng),
            Action::Help => self.say(rule, &fill, now, rng).with_effect(Effect::ShowHelp),
            Action::Quit => self.say(rule, &fill, now, rng).with_effect(Effect::Quit),
            Action::Introduce => self.introduce(rule, &fill, now, rng),
            Action::Remind => self.remind(rule, &fill, now, rng),
            Action::Alarm => self.alarm(rule, &fill, now, rng),
        }
    }

    fn canned<R: Rng + ?Sized>(
        &self,
        canned: &Canned,
        fill: &Fill<'_>,
        now: NaiveDateTime,
        rng: &mut R,
    ) -> Reply {
        let template = choose(&canned.replies, rng);
        Reply::new(self.render(template, fill, now, rng), canned.mood)
    }

    /// Picks a reply from the rule, honoring known-user replies and openers.
    fn say<R: Rng + ?Sized>(
        &self,
        rule: &Rule,
        fill: &Fill<'_>,
        now: NaiveDateTime,
        rng: &mut R,
    ) -> Reply {
        let (candidates, mood) = if fill.name.is_some() && !rule.known_user.is_empty() {
            (&rule.known_user, rule.known_user_mood.unwrap_or(rule.mood))
        } else {
            (&rule.replies, rule.mood)
        };
        let template = choose(candidates, rng).to_string();
        let template = if rule.openers.is_empty() {
            template
        } else {
            format!("{}{}", choose(&rule.openers, rng), template)
        };
        Reply::new(self.render(&template, fill, now, rng), mood)
    }

    fn prompt<R: Rng + ?Sized>(
        &self,
        rule: &Rule,
        fill: &Fill<'_>,
        now: NaiveDateTime,
        rng: &mut R,
    ) -> Reply {
        let template = rule.prompt.as_deref().unwrap_or(LAST_RESORT_REPLY);
        Reply::new(self.render(template, fill, now, rng), rule.mood)
    }

    fn introduce<R: Rng + ?Sized>(
        &self,
        rule: &Rule,
        fill: &Fill<'_>,
        now: NaiveDateTime,
        rng: &mut R,
    ) -> Reply {
        let name = rule
            .matched_trigger(fill.input)
            .and_then(|trigger| extract_name(fill.input, trigger));
        let Some(name) = name else {
            return self.prompt(rule, fill, now, rng);
        };
        let fill = Fill {
            name: Some(name.as_str()),
            ..*fill
        };
        let reply = Reply::new(self.render(choose(&rule.replies, rng), &fill, now, rng), rule.mood);
        reply.with_effect(Effect::Remember(name.clone()))
    }

    fn remind<R: Rng + ?Sized>(
        &self,
        rule: &Rule,
        fill: &Fill<'_>,
        now: NaiveDateTime,
        rng: &mut R,
    ) -> Reply {
        let Some((task, at)) = plan_reminder(rule, fill.input, now) else {
            return self.prompt(rule, fill, now, rng);
        };
        let when = at.format(SCHEDULE_FORMAT).to_string();
        let fill = Fill {
            task: Some(task.as_str()),
            when: Some(when.as_str()),
            ..*fill
        };
        let reply = Reply::new(self.render(choose(&rule.replies, rng), &fill, now, rng), rule.mood);
        reply.with_effect(Effect::AddReminder(Reminder {
            text: task.clone(),
            time: when.clone(),
            created: now,
        }))
    }

    fn alarm<R: Rng + ?Sized>(
        &self,
        rule: &Rule,
        fill: &Fill<'_>,
        now: NaiveDateTime,
        rng: &mut R,
    ) -> Reply {
        let Some(found) = find_clock_time(fill.input) else {
            return self.prompt(rule, fill, now, rng);
        };
        let time = found.time.format(ALARM_FORMAT).to_string();
        let fill = Fill {
            alarm: Some(time.as_str()),
            ..*fill
        };
        let reply = Reply::new(self.render(choose(&rule.replies, rng), &fill, now, rng), rule.mood);
        reply.with_effect(Effect::AddAlarm(Alarm {
            time: time.clone(),
            active: true,
        }))
    }

    /// Expands placeholders in a reply template.
    ///
    /// # Details
    /// The template is scanned once from left to right. Substituted values
    /// are never scanned again, so braces inside user text or a stored task
    /// come out literally. Unknown `{...}` sequences are kept as written.
    fn render<R: Rng + ?Sized>(
        &self,
        template: &str,
        fill: &Fill<'_>,
        now: NaiveDateTime,
        rng: &mut R,
    ) -> String {
        let greeting = template
            .contains("{greeting}")
            .then(|| self.greeting(now, rng).to_string());
        let mut text = String::with_capacity(template.len());
        let mut rest = template;
        while let Some(open) = rest.find('{') {
            text.push_str(&rest[..open]);
            rest = &rest[open..];
            let key = rest[1..].find(['{', '}']).and_then(|end| {
                let key = &rest[1..1 + end];
                rest[1 + end..].starts_with('}').then_some(key)
            });
            let value = key.and_then(|key| {
                self.placeholder(key, fill, now, greeting.as_deref())
                    .map(|value| (key.len(), value))
            });
            match value {
                Some((len, value)) => {
                    text.push_str(&value);
                    rest = &rest[len + 2..];
                }
                None => {
                    text.push('{');
                    rest = &rest[1..];
                }
            }
        }
        text.push_str(rest);
        text
    }

    fn placeholder(
        &self,
        key: &str,
        fill: &Fill<'_>,
        now: NaiveDateTime,
        greeting: Option<&str>,
    ) -> Option<String> {
        let value = match key {
            "time" => now.format(TIME_FORMAT).to_string(),
            "date" => now.format(DATE_FORMAT).to_string(),
            "day" => now.format("%A").to_string(),
            "greeting" => greeting?.to_string(),
            "assistant" => self.assistant_name.clone(),
            "alarm" => fill.alarm.unwrap_or_default().to_string(),
            "when" => fill.when.unwrap_or_default().to_string(),
            "name" => fill.name.unwrap_or(UNKNOWN_USER).to_string(),
            "task" => fill.task.unwrap_or_default().to_string(),
            "input" => fill.input.to_string(),
            _ => return None,
        };
        Some(value)
    }

    fn greeting<R: Rng + ?Sized>(&self, now: NaiveDateTime, rng: &mut R) -> &str {
        let greetings = &self.table.greetings;
        let band = match DayPeriod::of(now) {
            DayPeriod::Morning => &greetings.morning,
            DayPeriod::Afternoon => &greetings.afternoon,
            DayPeriod::Evening => &greetings.evening,
            DayPeriod::Night => &greetings.night,
        };
        band.choose(rng).map(String::as_str).unwrap_or("Hello!")
    }
}

/// Picks one candidate uniformly at random.
fn choose<'a, R: Rng + ?Sized>(candidates: &'a [String], rng: &mut R) -> &'a str {
    candidates
        .choose(rng)
        .map(String::as_str)
        .unwrap_or(LAST_RESORT_REPLY)
}

/// Pulls a name out of "my name is ada" / "call me ada".
///
/// # Details
/// Takes the first word after the last occurrence of the trigger, keeps
/// letters, hyphens and apostrophes, and capitalizes it.
fn extract_name(text: &str, trigger: &str) -> Option<String> {
    let rest = text.rsplit(trigger).next()?;
    let word: String = rest
        .split_whitespace()
        .next()?
        .chars()
        .filter(|c| c.is_alphabetic() || *c == '-' || *c == '\'')
        .collect();
    let mut chars = word.chars();
    let first = chars.next()?;
    Some(first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect())
}

/// Works out what to remind the user about and when.
///
/// # Details
/// A reminder needs a schedule: "tomorrow", a clock time, or both. The task
/// is what is left after removing the rule's triggers, the schedule words
/// and filler like "to" or "about". Without a clock time the current time of
/// day is used.
///
/// # Returns
/// * `Some((task, at))` - The task text and its scheduled instant.
/// * `None` - No schedule or no task could be found.
fn plan_reminder(rule: &Rule, text: &str, now: NaiveDateTime) -> Option<(String, NaiveDateTime)> {
    let tomorrow = text.contains("tomorrow");
    let clock = find_clock_time(text);
    if !tomorrow && clock.is_none() {
        return None;
    }

    let mut remaining = text.to_string();
    if let Some(found) = &clock {
        remaining.replace_range(found.span.clone(), " ");
    }
    let mut triggers: Vec<&str> = rule.triggers.iter().map(String::as_str).collect();
    triggers.sort_by_key(|trigger| std::cmp::Reverse(trigger.len()));
    for word in triggers.into_iter().chain(["tomorrow"]) {
        remaining = remaining.replace(word, " ");
    }

    let mut words: Vec<&str> = remaining.split_whitespace().collect();
    while words.first().is_some_and(|w| LEADING_FILLERS.contains(w)) {
        words.remove(0);
    }
    while words.last().is_some_and(|w| TRAILING_FILLERS.contains(w)) {
        words.pop();
    }
    if words.is_empty() {
        return None;
    }

    let date = if tomorrow {
        now.date() + Duration::days(1)
    } else {
        now.date()
    };
    let time = clock.map(|found| found.time).unwrap_or_else(|| now.time());
    Some((words.join(" "), date.and_time(time)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::commands::default_rules;
    use chrono::NaiveDate;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;
    use tempfile::TempDir;

    fn instant(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 16)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn session() -> (TempDir, Session) {
        let dir = tempfile::tempdir().unwrap();
        let session = Session::open(dir.path().join("agenda.json"));
        (dir, session)
    }

    fn interpreter() -> Interpreter {
        Interpreter::new(default_rules(), "NEXA")
    }

    fn rule_replies(name: &str) -> Vec<String> {
        default_rules()
            .rules
            .into_iter()
            .find(|rule| rule.name == name)
            .unwrap()
            .replies
    }

    #[test]
    fn empty_input_gets_no_input_reply() {
        let (_dir, session) = session();
        let mut rng = StdRng::seed_from_u64(1);
        let clock = FixedClock(instant(10, 0));
        for input in ["", "   ", "\n"] {
            let reply = interpreter().interpret(input, &session, &mut rng, &clock);
            assert_eq!(reply.text, "I didn't catch that. Could you try again?");
            assert_eq!(reply.mood, Mood::Calm);
            assert_eq!(reply.effect, None);
        }
    }

    #[test]
    fn every_non_empty_input_gets_a_reply() {
        let (_dir, session) = session();
        let mut rng = StdRng::seed_from_u64(2);
        let clock = FixedClock(instant(23, 59));
        let inputs = [
            "hello", "HI THERE", "what's the date", "which day is it", "sing a song",
            "{input}", "remind me", "alarm", "my name is", "?", "status report",
            "how are you", "thanks", "weather", "who made you", "story time",
        ];
        for input in inputs {
            let reply = interpreter().interpret(input, &session, &mut rng, &clock);
            assert!(!reply.text.trim().is_empty(), "empty reply for {input:?}");
            assert!(Mood::ALL.contains(&reply.mood));
        }
    }

    #[test]
    fn first_matching_rule_wins() {
        let table = RuleTable {
            rules: vec![
                Rule::new("alpha", &["foo"], Mood::Excited, &["A"]),
                Rule::new("beta", &["bar"], Mood::Calm, &["B"]),
            ],
            ..default_rules()
        };
        let interpreter = Interpreter::new(table, "NEXA");
        let (_dir, session) = session();
        let mut rng = StdRng::seed_from_u64(3);
        let clock = FixedClock(instant(10, 0));
        let reply = interpreter.interpret("bar then foo", &session, &mut rng, &clock);
        assert_eq!(reply.text, "A");
        assert_eq!(reply.mood, Mood::Excited);
    }

    #[test]
    fn random_replies_cover_exactly_the_candidates() {
        let (_dir, session) = session();
        let mut rng = StdRng::seed_from_u64(4);
        let clock = FixedClock(instant(10, 0));
        let interpreter = interpreter();
        let observed: HashSet<String> = (0..500)
            .map(|_| interpreter.interpret("tell me a joke", &session, &mut rng, &clock).text)
            .collect();
        let expected: HashSet<String> = rule_replies("joke").into_iter().collect();
        assert_eq!(observed, expected);
    }

    #[test]
    fn joke_is_one_of_the_candidates() {
        let (_dir, session) = session();
        let mut rng = StdRng::seed_from_u64(5);
        let reply = interpreter().interpret(
            "tell me a joke",
            &session,
            &mut rng,
            &FixedClock(instant(10, 0)),
        );
        assert!(rule_replies("joke").contains(&reply.text));
        assert_eq!(reply.mood, Mood::Excited);
    }

    #[test]
    fn time_reply_uses_clock_at_call_time() {
        let (_dir, session) = session();
        let mut rng = StdRng::seed_from_u64(6);
        let clock = FixedClock(instant(21, 5));
        let reply = interpreter().interpret("What time is it", &session, &mut rng, &clock);
        assert!(reply.text.ends_with(" 09:05 PM"), "{}", reply.text);
        let phrases: Vec<String> = rule_replies("time")
            .iter()
            .map(|r| r.replace("{time}", "09:05 PM"))
            .collect();
        assert!(phrases.contains(&reply.text));
    }

    #[test]
    fn date_and_day_replies_use_clock() {
        let (_dir, session) = session();
        let mut rng = StdRng::seed_from_u64(7);
        let clock = FixedClock(instant(9, 0));
        let date = interpreter().interpret("what's the date", &session, &mut rng, &clock);
        assert!(date.text.contains("Friday, October 16, 2026"));
        let day = interpreter().interpret("what day is it", &session, &mut rng, &clock);
        assert!(day.text.contains("Friday"));
    }

    #[test]
    fn fallback_echoes_input() {
        let (_dir, session) = session();
        let mut rng = StdRng::seed_from_u64(8);
        let reply = interpreter().interpret(
            "Sing A Song",
            &session,
            &mut rng,
            &FixedClock(instant(10, 0)),
        );
        assert!(reply.text.contains("'sing a song'"));
        assert_eq!(reply.mood, Mood::Calm);
    }

    #[test]
    fn greeting_follows_time_of_day_and_known_name() {
        let (_dir, mut session) = session();
        let mut rng = StdRng::seed_from_u64(9);
        let morning = FixedClock(instant(8, 0));
        let interpreter = interpreter();
        let reply = interpreter.interpret("hello", &session, &mut rng, &morning);
        assert!(default_rules()
            .greetings
            .morning
            .iter()
            .any(|g| reply.text.contains(g.as_str())));

        assert_eq!(reply.mood, Mood::Friendly);

        session.apply(&Effect::Remember("Ada".to_string())).unwrap();
        let reply = interpreter.interpret("hello", &session, &mut rng, &morning);
        assert!(reply.text.contains("Ada"));
        assert_eq!(reply.mood, Mood::Excited);
    }

    #[test]
    fn introduce_captures_first_name() {
        let (_dir, session) = session();
        let mut rng = StdRng::seed_from_u64(10);
        let reply = interpreter().interpret(
            "hi, my name is ada lovelace",
            &session,
            &mut rng,
            &FixedClock(instant(10, 0)),
        );
        assert_eq!(reply.effect, Some(Effect::Remember("Ada".to_string())));
        assert!(reply.text.contains("Ada"));
    }

    #[test]
    fn introduce_without_name_prompts() {
        let (_dir, session) = session();
        let mut rng = StdRng::seed_from_u64(11);
        let reply = interpreter().interpret(
            "call me",
            &session,
            &mut rng,
            &FixedClock(instant(10, 0)),
        );
        assert_eq!(reply.effect, None);
        assert!(reply.text.contains("What should I call you?"));
    }

    #[test]
    fn reminder_for_tomorrow_keeps_time_of_day() {
        let (_dir, session) = session();
        let mut rng = StdRng::seed_from_u64(12);
        let now = instant(9, 30);
        let reply = interpreter().interpret(
            "remind me to study tomorrow",
            &session,
            &mut rng,
            &FixedClock(now),
        );
        let Some(Effect::AddReminder(reminder)) = reply.effect.clone() else {
            panic!("expected a reminder, got {:?}", reply);
        };
        assert_eq!(reminder.text, "study");
        assert_eq!(reminder.time, "Saturday, October 17 at 09:30 AM");
        assert_eq!(reminder.created, now);
        assert!(reply.text.contains("study"));
    }

    #[test]
    fn reminder_with_clock_time_is_today() {
        let (_dir, session) = session();
        let mut rng = StdRng::seed_from_u64(13);
        let reply = interpreter().interpret(
            "set a reminder to call mom at 5 pm",
            &session,
            &mut rng,
            &FixedClock(instant(9, 30)),
        );
        let Some(Effect::AddReminder(reminder)) = reply.effect.clone() else {
            panic!("expected a reminder, got {:?}", reply);
        };
        assert_eq!(reminder.text, "call mom");
        assert_eq!(reminder.time, "Friday, October 16 at 05:00 PM");
    }

    #[test]
    fn reminder_without_schedule_prompts() {
        let (_dir, session) = session();
        let mut rng = StdRng::seed_from_u64(14);
        let clock = FixedClock(instant(9, 30));
        for input in ["remind me to study", "remind me tomorrow"] {
            let reply = interpreter().interpret(input, &session, &mut rng, &clock);
            assert_eq!(reply.effect, None, "{input}");
            assert_eq!(
                reply.text,
                "What would you like me to remind you about, and when?"
            );
        }
    }

    #[test]
    fn alarm_needs_a_clock_time() {
        let (_dir, session) = session();
        let mut rng = StdRng::seed_from_u64(15);
        let clock = FixedClock(instant(22, 0));
        let reply = interpreter().interpret("set an alarm for 5 am", &session, &mut rng, &clock);
        assert_eq!(
            reply.effect,
            Some(Effect::AddAlarm(Alarm {
                time: "5:00 AM".to_string(),
                active: true,
            }))
        );
        assert!(reply.text.contains("5:00 AM"));

        let reply = interpreter().interpret("alarm", &session, &mut rng, &clock);
        assert_eq!(reply.effect, None);
        assert_eq!(reply.text, "What time should I set the alarm for?");
    }

    #[test]
    fn control_rules_carry_effects() {
        let (_dir, session) = session();
        let mut rng = StdRng::seed_from_u64(16);
        let clock = FixedClock(instant(10, 0));
        let quit = interpreter().interpret("goodbye", &session, &mut rng, &clock);
        assert!(quit.is_quit());
        let help = interpreter().interpret("help", &session, &mut rng, &clock);
        assert_eq!(help.effect, Some(Effect::ShowHelp));
    }

    #[test]
    fn openers_prefix_the_reply() {
        let table = RuleTable {
            rules: vec![Rule::new("joke", &["joke"], Mood::Excited, &["Knock knock."])
                .with_openers(&["Sure! ", "Okay, "])],
            ..default_rules()
        };
        let interpreter = Interpreter::new(table, "NEXA");
        let (_dir, session) = session();
        let mut rng = StdRng::seed_from_u64(17);
        let reply = interpreter.interpret("joke", &session, &mut rng, &FixedClock(instant(10, 0)));
        assert!(reply.text == "Sure! Knock knock." || reply.text == "Okay, Knock knock.");
    }

    #[test]
    fn user_braces_are_not_expanded() {
        let (_dir, session) = session();
        let mut rng = StdRng::seed_from_u64(18);
        let reply = interpreter().interpret(
            "{assistant}",
            &session,
            &mut rng,
            &FixedClock(instant(10, 0)),
        );
        assert!(reply.text.contains("'{assistant}'"));
    }

    #[test]
    fn braces_in_a_task_are_stored_and_echoed_verbatim() {
        let (_dir, session) = session();
        let mut rng = StdRng::seed_from_u64(20);
        let reply = interpreter().interpret(
            "remind me to {input} tomorrow",
            &session,
            &mut rng,
            &FixedClock(instant(9, 30)),
        );
        let Some(Effect::AddReminder(reminder)) = reply.effect.clone() else {
            panic!("expected a reminder, got {:?}", reply);
        };
        assert_eq!(reminder.text, "{input}");
        assert!(reply.text.contains("'{input}'"), "{}", reply.text);
        assert!(!reply.text.contains("remind me to"));
    }

    #[test]
    fn render_keeps_unknown_and_nested_braces() {
        let interpreter = interpreter();
        let mut rng = StdRng::seed_from_u64(21);
        let fill = Fill {
            input: "x",
            ..Fill::default()
        };
        let text = interpreter.render("{{input}} {nope} {", &fill, instant(10, 0), &mut rng);
        assert_eq!(text, "{x} {nope} {");
    }

    #[test]
    fn reminder_text_may_mention_control_words() {
        let (_dir, session) = session();
        let mut rng = StdRng::seed_from_u64(22);
        let clock = FixedClock(instant(9, 30));
        let reply = interpreter().interpret(
            "remind me to say goodbye to grandma tomorrow",
            &session,
            &mut rng,
            &clock,
        );
        let Some(Effect::AddReminder(reminder)) = reply.effect.clone() else {
            panic!("expected a reminder, got {:?}", reply);
        };
        assert_eq!(reminder.text, "say goodbye to grandma");
        assert!(!reply.is_quit());

        let reply = interpreter().interpret("remind me to help dad at 5 pm", &session, &mut rng, &clock);
        let Some(Effect::AddReminder(reminder)) = reply.effect.clone() else {
            panic!("expected a reminder, got {:?}", reply);
        };
        assert_eq!(reminder.text, "help dad");
        assert_eq!(reminder.time, "Friday, October 16 at 05:00 PM");
    }

    #[test]
    fn welcome_names_the_assistant() {
        let mut rng = StdRng::seed_from_u64(19);
        let reply = interpreter().welcome(&mut rng, &FixedClock(instant(19, 0)));
        assert!(reply.text.contains("NEXA"));
        assert_eq!(reply.mood, Mood::Excited);
    }

    #[test]
    fn extract_name_title_cases() {
        assert_eq!(extract_name("call me bob!", "call me"), Some("Bob".to_string()));
        assert_eq!(extract_name("call me", "call me"), None);
    }
}
