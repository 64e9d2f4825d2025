//! Five-field cron expressions.
//!
//! Expressions use the standard `minute hour day-of-month month day-of-week`
//! layout with day-of-week 0-7 (0 and 7 are Sunday) or names. They are
//! evaluated by the `cron` crate, which wants a leading seconds field and
//! numbers weekdays 1-7 from Sunday, so the day-of-week field is rewritten
//! before parsing.

use std::str::FromStr;

use chrono::{DateTime, Local};
use cron::Schedule;
use thiserror::Error;

/// Why an expression was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CronError {
    #[error("expected 5 fields, found {0}")]
    FieldCount(usize),

    #[error("invalid day-of-week '{0}'")]
    DayOfWeek(String),

    #[error("{0}")]
    Parse(String),
}

/// A parsed, evaluable cron expression.
#[derive(Debug, Clone)]
pub struct CronSchedule {
    expression: String,
    schedule: Schedule,
}

impl CronSchedule {
    pub fn parse(expression: &str) -> Result<Self, CronError> {
        let fields: Vec<&str> = expression.split_whitespace().collect();
        if fields.len() != 5 {
            return Err(CronError::FieldCount(fields.len()));
        }

        let day_of_week = translate_day_of_week(fields[4])?;
        let native = format!(
            "0 {} {} {} {} {}",
            fields[0], fields[1], fields[2], fields[3], day_of_week
        );
        let schedule =
            Schedule::from_str(&native).map_err(|e| CronError::Parse(e.to_string()))?;

        Ok(Self {
            expression: expression.trim().to_string(),
            schedule,
        })
    }

    /// The expression as written by the user.
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// First fire time strictly after `after`.
    pub fn next_after(&self, after: &DateTime<Local>) -> Option<DateTime<Local>> {
        self.schedule.after(after).next()
    }

    /// The next `count` fire times from now.
    pub fn upcoming(&self, count: usize) -> Vec<DateTime<Local>> {
        self.schedule.upcoming(Local).take(count).collect()
    }
}

/// Whether `expression` is a valid five-field cron expression.
pub fn validate(expression: &str) -> bool {
    CronSchedule::parse(expression).is_ok()
}

/// Rewrite a standard day-of-week field into the `cron` crate's numbering.
///
/// Numeric items, ranges and steps are expanded into an explicit sorted list;
/// names and `*`/`?` are passed through.
pub(crate) fn translate_day_of_week(field: &str) -> Result<String, CronError> {
    if field == "*" || field == "?" {
        return Ok(field.to_string());
    }

    let invalid = || CronError::DayOfWeek(field.to_string());
    let mut days: Vec<u8> = Vec::new();
    let mut names: Vec<String> = Vec::new();

    for item in field.split(',') {
        if item.is_empty() {
            return Err(invalid());
        }
        if item.chars().any(|c| c.is_ascii_alphabetic()) {
            names.push(item.to_ascii_uppercase());
            continue;
        }

        let (range, step) = match item.split_once('/') {
            Some((range, step)) => {
                let step: u8 = step.parse().map_err(|_| invalid())?;
                if step == 0 {
                    return Err(invalid());
                }
                (range, Some(step))
            }
            None => (item, None),
        };

        let (start, end) = if range == "*" {
            (0, 6)
        } else if let Some((a, b)) = range.split_once('-') {
            (parse_day(a).ok_or_else(invalid)?, parse_day(b).ok_or_else(invalid)?)
        } else {
            let start = parse_day(range).ok_or_else(invalid)?;
            // `n/step` runs to the end of the week.
            (start, if step.is_some() { start.max(6) } else { start })
        };
        if start > end {
            return Err(invalid());
        }

        let step = usize::from(step.unwrap_or(1));
        for day in (start..=end).step_by(step) {
            days.push(to_native(day));
        }
    }

    days.sort_unstable();
    days.dedup();

    let mut items: Vec<String> = days.iter().map(u8::to_string).collect();
    items.extend(names);
    Ok(items.join(","))
}

fn parse_day(value: &str) -> Option<u8> {
    value.parse::<u8>().ok().filter(|d| *d <= 7)
}

/// Standard weekday (0-7, Sunday = 0 or 7) to 1-7 with Sunday = 1.
fn to_native(day: u8) -> u8 {
    if day == 7 { 1 } else { day + 1 }
}

#[cfg(test)]
#[path = "cron_tests.rs"]
mod tests;
