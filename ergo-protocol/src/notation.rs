//! Textual workout notation
//!
//! Published workouts describe each step on its own text bar:
//!
//! ```text
//! 10min @ 85rpm, 55% FTP
//! 5min from 50 to 80% FTP
//! 30sec @ 110rpm, 120% FTP
//! ```
//!
//! Steps are returned in the order they appear in the text. Anything that
//! does not look like a step is skipped.

use std::sync::LazyLock;

use ergo_core::plan::{Step, WorkoutPlan};
use regex::{Captures, Regex};

use crate::error::NotationError;
use crate::plan::{RangeRecord, StepRecord};

static PROGRESSIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?P<duration>\d+(?:min|sec))\s+from\s+(?P<from>\d+)\s*to\s*(?P<to>\d+)\s*%\s*FTP",
    )
    .expect("progressive step pattern")
});

static FIXED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?P<duration>\d+(?:min|sec))\s*(?:@\s*(?P<rpm>\d+)\s*rpm)?\s*,?\s*(?P<ftp>\d+)\s*%\s*FTP",
    )
    .expect("fixed step pattern")
});

static DURATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(\d+)(min|sec)$").expect("duration pattern"));

fn number<T: std::str::FromStr>(caps: &Captures<'_>, name: &str) -> Result<Option<T>, NotationError> {
    match caps.name(name) {
        Some(m) => m
            .as_str()
            .parse()
            .map(Some)
            .map_err(|_| NotationError::Number(m.as_str().to_string())),
        None => Ok(None),
    }
}

fn seconds(caps: &Captures<'_>) -> Result<f64, NotationError> {
    let text = &caps["duration"];
    let parts = DURATION
        .captures(text)
        .ok_or_else(|| NotationError::Number(text.to_string()))?;
    let value: u32 = parts[1]
        .parse()
        .map_err(|_| NotationError::Number(text.to_string()))?;

    let scale = if parts[2].eq_ignore_ascii_case("min") { 60.0 } else { 1.0 };
    Ok(value as f64 * scale)
}

fn required(value: Option<u32>, caps: &Captures<'_>) -> Result<f64, NotationError> {
    value
        .map(f64::from)
        .ok_or_else(|| NotationError::Number(caps[0].to_string()))
}

/// Extract step records from workout text
pub fn parse_workout_records(text: &str) -> Result<Vec<StepRecord>, NotationError> {
    let mut found: Vec<(usize, StepRecord)> = Vec::new();

    for caps in PROGRESSIVE.captures_iter(text) {
        let record = StepRecord {
            ftp_percent: None,
            duration: seconds(&caps)?,
            rpm: None,
            progressive_range: Some(RangeRecord {
                from: required(number(&caps, "from")?, &caps)?,
                to: required(number(&caps, "to")?, &caps)?,
            }),
        };
        found.push((caps.get(0).map_or(0, |m| m.start()), record));
    }

    for caps in FIXED.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };

        // Already taken as a progressive step
        if PROGRESSIVE
            .find(whole.as_str())
            .is_some_and(|m| m.start() == 0)
        {
            continue;
        }

        let record = StepRecord {
            ftp_percent: Some(required(number(&caps, "ftp")?, &caps)?),
            duration: seconds(&caps)?,
            rpm: number(&caps, "rpm")?,
            progressive_range: None,
        };
        found.push((whole.start(), record));
    }

    found.sort_by_key(|(position, _)| *position);
    Ok(found.into_iter().map(|(_, record)| record).collect())
}

/// Parse workout text into a plan
pub fn parse_workout_text(text: &str) -> Result<WorkoutPlan, NotationError> {
    let records = parse_workout_records(text)?;
    if records.is_empty() {
        return Err(NotationError::Empty);
    }

    let mut plan = WorkoutPlan::new();
    for record in records {
        let step = Step::try_from(record).map_err(|source| NotationError::Step {
            text: describe(&record),
            source,
        })?;
        plan.push(step).map_err(NotationError::Plan)?;
    }
    Ok(plan)
}

fn describe(record: &StepRecord) -> String {
    match (record.ftp_percent, record.progressive_range) {
        (Some(percent), _) => format!("{}s @ {}% FTP", record.duration, percent),
        (None, Some(range)) => format!("{}s from {} to {}% FTP", record.duration, range.from, range.to),
        (None, None) => format!("{}s", record.duration),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ergo_core::plan::{PowerTarget, ProgressiveRange};

    #[test]
    fn test_fixed_step_with_cadence() {
        let records = parse_workout_records("10min @ 90rpm, 75% FTP").unwrap();
        assert_eq!(
            records,
            vec![StepRecord {
                ftp_percent: Some(75.0),
                duration: 600.0,
                rpm: Some(90),
                progressive_range: None,
            }]
        );
    }

    #[test]
    fn test_progressive_step() {
        let records = parse_workout_records("5min from 50 to 80% FTP").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].duration, 300.0);
        assert_eq!(records[0].ftp_percent, None);
        assert_eq!(
            records[0].progressive_range,
            Some(RangeRecord { from: 50.0, to: 80.0 })
        );
    }

    #[test]
    fn test_steps_in_text_order() {
        let text = "10min from 40 to 65% FTP\n\
                    3min @ 95rpm, 105% FTP\n\
                    30sec 50% FTP\n\
                    5min from 65 to 45% FTP";
        let plan = parse_workout_text(text).unwrap();

        assert_eq!(plan.len(), 4);
        assert_eq!(
            plan.step(0).unwrap().target,
            PowerTarget::Progressive(ProgressiveRange { from: 40.0, to: 65.0 })
        );
        assert_eq!(plan.step(1).unwrap().target, PowerTarget::Fixed(105.0));
        assert_eq!(plan.step(1).unwrap().cadence_rpm, Some(95));
        assert_eq!(plan.step(2).unwrap().duration_ms, 30_000);
        assert_eq!(plan.step(2).unwrap().cadence_rpm, None);
        assert_eq!(
            plan.step(3).unwrap().target,
            PowerTarget::Progressive(ProgressiveRange { from: 65.0, to: 45.0 })
        );
        assert_eq!(plan.total_duration_ms(), 1_110_000);
    }

    #[test]
    fn test_case_insensitive() {
        let records = parse_workout_records("2MIN @ 100RPM, 90% ftp").unwrap();
        assert_eq!(records[0].duration, 120.0);
        assert_eq!(records[0].rpm, Some(100));
    }

    #[test]
    fn test_free_text_ignored() {
        let text = "Warm up gently\n4min @ 85rpm, 60% FTP\nthen cool down";
        assert_eq!(parse_workout_records(text).unwrap().len(), 1);
    }

    #[test]
    fn test_empty_text() {
        assert_eq!(parse_workout_text("just ride"), Err(NotationError::Empty));
    }

    #[test]
    fn test_zero_duration_rejected() {
        assert!(matches!(
            parse_workout_text("0min @ 90rpm, 75% FTP"),
            Err(NotationError::Step { .. })
        ));
    }

    #[test]
    fn test_oversized_number() {
        assert!(matches!(
            parse_workout_records("1min @ 99999rpm, 75% FTP"),
            Err(NotationError::Number(_))
        ));
    }
}
