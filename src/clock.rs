/*
 * @file clock.rs
 * @brief Wall-clock access and spoken clock-time parsing
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

//! Wall-clock access and clock-time parsing.
//!
//! Everything time-sensitive in the interpreter goes through the [`Clock`]
//! trait so replies can be checked against a frozen instant in tests.

use std::ops::Range;

use chrono::{Local, NaiveDateTime, NaiveTime, Timelike};

/// Format used for `{time}` replies, e.g. `09:05 PM`.
pub const TIME_FORMAT: &str = "%I:%M %p";

/// Format used for `{date}` replies, e.g. `Friday, October 16, 2026`.
pub const DATE_FORMAT: &str = "%A, %B %d, %Y";

/// Format used for stored alarm times, e.g. `5:00 AM`.
pub const ALARM_FORMAT: &str = "%-I:%M %p";

/// Format used for a reminder's scheduled time.
pub const SCHEDULE_FORMAT: &str = "%A, %B %d at %I:%M %p";

/// Source of the current local time.
pub trait Clock {
    /// Returns the current local date and time.
    fn now(&self) -> NaiveDateTime;
}

/// Clock backed by the operating system's local time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock frozen at a single instant.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Coarse part of the day used to choose a greeting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DayPeriod {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl DayPeriod {
    /// Classifies an hour in `0..24`.
    ///
    /// # Details
    /// Morning covers 05:00–11:59, afternoon 12:00–16:59, evening
    /// 17:00–20:59 and night everything else.
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=11 => DayPeriod::Morning,
            12..=16 => DayPeriod::Afternoon,
            17..=20 => DayPeriod::Evening,
            _ => DayPeriod::Night,
        }
    }

    /// Classifies the hour of the given instant.
    pub fn of(now: NaiveDateTime) -> Self {
        Self::from_hour(now.hour())
    }
}

/// A clock time found inside free text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClockMatch {
    /// The parsed time of day.
    pub time: NaiveTime,
    /// Byte range of the phrase that produced `time`.
    pub span: Range<usize>,
}

/// Finds the first clock time mentioned in `text`.
///
/// # Details
/// Understands `5 am`, `5am`, `5:30 pm`, `5 p.m.` and 24-hour `17:45`.
/// A bare number without a meridiem or colon is not treated as a time, so
/// "remind me in 5 minutes" does not produce a match.
///
/// # Arguments
/// * `text` - Lowercase free text.
///
/// # Returns
/// * `Some(ClockMatch)` - The first time found and where it was found.
/// * `None` - No recognizable time.
pub fn find_clock_time(text: &str) -> Option<ClockMatch> {
    let tokens = tokenize(text);
    for (index, &(start, token)) in tokens.iter().enumerate() {
        let clean = clean_token(token);
        let end = start + token.len();

        for (suffix, pm) in [("am", false), ("pm", true)] {
            if let Some(prefix) = clean.strip_suffix(suffix) {
                if let Some(time) = parse_twelve_hour(prefix, pm) {
                    return Some(ClockMatch { time, span: start..end });
                }
            }
        }

        if let Some(&(next_start, next)) = tokens.get(index + 1) {
            if let Some(pm) = meridiem(&clean_token(next)) {
                if let Some(time) = parse_twelve_hour(&clean, pm) {
                    return Some(ClockMatch {
                        time,
                        span: start..next_start + next.len(),
                    });
                }
            }
        }

        if clean.contains(':') {
            if let Some(time) = parse_twenty_four_hour(&clean) {
                return Some(ClockMatch { time, span: start..end });
            }
        }
    }
    None
}

/// Splits text on whitespace while keeping each token's byte offset.
fn tokenize(text: &str) -> Vec<(usize, &str)> {
    let mut tokens = Vec::new();
    let mut start = None;
    for (idx, ch) in text.char_indices() {
        if ch.is_whitespace() {
            if let Some(begin) = start.take() {
                tokens.push((begin, &text[begin..idx]));
            }
        } else if start.is_none() {
            start = Some(idx);
        }
    }
    if let Some(begin) = start {
        tokens.push((begin, &text[begin..]));
    }
    tokens
}

/// Drops trailing punctuation and the dots of `a.m.` / `p.m.`.
fn clean_token(token: &str) -> String {
    token
        .trim_end_matches([',', '!', '?', ';'])
        .replace('.', "")
}

fn meridiem(token: &str) -> Option<bool> {
    match token {
        "am" => Some(false),
        "pm" => Some(true),
        _ => None,
    }
}

/// Parses `h` or `h:mm` into hour and minute digits.
fn split_hour_minute(raw: &str) -> Option<(u32, u32)> {
    let (hour, minute) = match raw.split_once(':') {
        Some((hour, minute)) if minute.len() == 2 => (hour, minute),
        Some(_) => return None,
        None => (raw, "0"),
    };
    let digits = |s: &str| !s.is_empty() && s.len() <= 2 && s.chars().all(|c| c.is_ascii_digit());
    if !digits(hour) || !digits(minute) {
        return None;
    }
    Some((hour.parse().ok()?, minute.parse().ok()?))
}

fn parse_twelve_hour(raw: &str, pm: bool) -> Option<NaiveTime> {
    let (hour, minute) = split_hour_minute(raw)?;
    if !(1..=12).contains(&hour) {
        return None;
    }
    let hour = hour % 12 + if pm { 12 } else { 0 };
    NaiveTime::from_hms_opt(hour, minute, 0)
}

fn parse_twenty_four_hour(raw: &str) -> Option<NaiveTime> {
    let (hour, minute) = split_hour_minute(raw)?;
    NaiveTime::from_hms_opt(hour, minute, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    #[test]
    fn day_periods_follow_greeting_bands() {
        assert_eq!(DayPeriod::from_hour(4), DayPeriod::Night);
        assert_eq!(DayPeriod::from_hour(5), DayPeriod::Morning);
        assert_eq!(DayPeriod::from_hour(12), DayPeriod::Afternoon);
        assert_eq!(DayPeriod::from_hour(17), DayPeriod::Evening);
        assert_eq!(DayPeriod::from_hour(21), DayPeriod::Night);
    }

    #[test]
    fn parses_separate_meridiem() {
        let found = find_clock_time("set alarm for 5 am please").unwrap();
        assert_eq!(found.time, at(5, 0));
        assert_eq!(&"set alarm for 5 am please"[found.span], "5 am");
    }

    #[test]
    fn parses_attached_and_dotted_meridiem() {
        assert_eq!(find_clock_time("wake me at 6:30pm").unwrap().time, at(18, 30));
        assert_eq!(find_clock_time("at 7 p.m. sharp").unwrap().time, at(19, 0));
        assert_eq!(find_clock_time("12 am").unwrap().time, at(0, 0));
        assert_eq!(find_clock_time("12 pm").unwrap().time, at(12, 0));
    }

    #[test]
    fn parses_twenty_four_hour_times() {
        assert_eq!(find_clock_time("meeting at 17:45.").unwrap().time, at(17, 45));
    }

    #[test]
    fn ignores_numbers_without_clock_markers() {
        assert!(find_clock_time("remind me in 5 minutes").is_none());
        assert!(find_clock_time("i am here").is_none());
        assert!(find_clock_time("13 pm").is_none());
        assert!(find_clock_time("25:00").is_none());
    }

    #[test]
    fn fixed_clock_reports_its_instant() {
        let instant = NaiveDate::from_ymd_opt(2026, 10, 16)
            .unwrap()
            .and_hms_opt(21, 5, 0)
            .unwrap();
        let clock = FixedClock(instant);
        assert_eq!(clock.now().format(TIME_FORMAT).to_string(), "09:05 PM");
        assert_eq!(
            clock.now().format(DATE_FORMAT).to_string(),
            "Friday, October 16, 2026"
        );
    }
}
