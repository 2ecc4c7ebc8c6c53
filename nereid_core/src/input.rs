//! Boundary normalization of caller input into core types.
//!
//! Everything that can be malformed is checked here and rejected with
//! [`Error::InvalidInput`] (or [`Error::RemoteUpdate`] for externally
//! produced predictions and goals). The estimator, predictor and scorers
//! assume their inputs already passed through this module.

use crate::goals::is_known_title;
use crate::predictor::phases_are_contiguous;
use crate::{
    Coloration, Error, Flow, Goal, GoalTarget, LogEntry, Mood, Nutrition, Pain, Predictions,
    Result, SensorSnapshot,
};
use chrono::{Datelike, NaiveDate};
use std::collections::HashSet;
use std::str::FromStr;

const MAX_HOURS_PER_DAY: f64 = 24.0;
const MIN_BODY_TEMP_C: f64 = 30.0;
const MAX_BODY_TEMP_C: f64 = 45.0;

/// Earliest calendar year accepted for any recorded date
pub const MIN_SUPPORTED_YEAR: i32 = 1900;
/// Latest calendar year accepted for any recorded date
pub const MAX_SUPPORTED_YEAR: i32 = 9999;

/// Whether `date` lies in the supported year range
///
/// Keeping dates inside four-digit years leaves room for every cycle,
/// phase and forecast offset to stay inside chrono's representable range.
pub fn is_supported_date(date: NaiveDate) -> bool {
    (MIN_SUPPORTED_YEAR..=MAX_SUPPORTED_YEAR).contains(&date.year())
}

/// Parse a calendar date in `YYYY-MM-DD` form
///
/// Years outside [`MIN_SUPPORTED_YEAR`]..=[`MAX_SUPPORTED_YEAR`] are
/// rejected even when chrono can represent them.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let date = NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| Error::InvalidInput(format!("invalid date {:?}: {}", s, e)))?;

    if !is_supported_date(date) {
        return Err(Error::InvalidInput(format!(
            "date {} outside supported years {}-{}",
            date, MIN_SUPPORTED_YEAR, MAX_SUPPORTED_YEAR
        )));
    }
    Ok(date)
}

/// Build a sensor snapshot from raw readings
///
/// Rejects negative or non-finite values, hour counts above 24, and body
/// temperatures outside 30–45 °C.
pub fn normalize_sensor(
    steps: i64,
    sleep_hours: f64,
    screen_time_hours: f64,
    temperature_c: f64,
    resting_hr: Option<f64>,
) -> Result<SensorSnapshot> {
    let steps = u32::try_from(steps)
        .map_err(|_| Error::InvalidInput(format!("steps out of range: {}", steps)))?;

    check_hours("sleep_hours", sleep_hours)?;
    check_hours("screen_time_hours", screen_time_hours)?;

    if !temperature_c.is_finite() || !(MIN_BODY_TEMP_C..=MAX_BODY_TEMP_C).contains(&temperature_c) {
        return Err(Error::InvalidInput(format!(
            "temperature_c out of range: {}",
            temperature_c
        )));
    }

    if let Some(hr) = resting_hr {
        if !hr.is_finite() || hr <= 0.0 {
            return Err(Error::InvalidInput(format!("resting_hr out of range: {}", hr)));
        }
    }

    Ok(SensorSnapshot {
        steps,
        sleep_hours,
        screen_time_hours,
        temperature_c,
        resting_hr,
    })
}

fn check_hours(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() || !(0.0..=MAX_HOURS_PER_DAY).contains(&value) {
        return Err(Error::InvalidInput(format!(
            "{} must be between 0 and 24, got {}",
            field, value
        )));
    }
    Ok(())
}

/// Parse a `(field, value)` label pair into a log entry
///
/// Labels are matched case-insensitively, ignoring `_`, `-` and spaces, so
/// `dark_red`, `darkRed` and `Dark Red` are all accepted.
pub fn parse_log_entry(field: &str, value: &str) -> Result<LogEntry> {
    let entry = match normalize_label(field).as_str() {
        "mood" => LogEntry::Mood(value.parse()?),
        "flow" => LogEntry::Flow(value.parse()?),
        "color" | "colour" => LogEntry::Color(value.parse()?),
        "pain" => LogEntry::Pain(value.parse()?),
        "nutrition" => LogEntry::Nutrition(value.parse()?),
        _ => {
            return Err(Error::InvalidInput(format!("unknown log field {:?}", field)));
        }
    };
    Ok(entry)
}

fn normalize_label(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

fn unknown_label(kind: &str, value: &str) -> Error {
    Error::InvalidInput(format!("unknown {} {:?}", kind, value))
}

impl FromStr for Mood {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match normalize_label(s).as_str() {
            "calm" => Ok(Mood::Calm),
            "happy" => Ok(Mood::Happy),
            "low" => Ok(Mood::Low),
            "irritable" => Ok(Mood::Irritable),
            "anxious" => Ok(Mood::Anxious),
            _ => Err(unknown_label("mood", s)),
        }
    }
}

impl FromStr for Flow {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match normalize_label(s).as_str() {
            "spotting" => Ok(Flow::Spotting),
            "light" => Ok(Flow::Light),
            "medium" => Ok(Flow::Medium),
            "heavy" => Ok(Flow::Heavy),
            _ => Err(unknown_label("flow", s)),
        }
    }
}

impl FromStr for Coloration {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match normalize_label(s).as_str() {
            "brightred" => Ok(Coloration::BrightRed),
            "darkred" | "dark" => Ok(Coloration::DarkRed),
            "brown" => Ok(Coloration::Brown),
            "pink" => Ok(Coloration::Pink),
            _ => Err(unknown_label("color", s)),
        }
    }
}

impl FromStr for Pain {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match normalize_label(s).as_str() {
            "none" => Ok(Pain::None),
            "crampy" | "cramps" => Ok(Pain::Crampy),
            "backache" => Ok(Pain::Backache),
            "headache" => Ok(Pain::Headache),
            "pelvic" => Ok(Pain::Pelvic),
            _ => Err(unknown_label("pain", s)),
        }
    }
}

impl FromStr for Nutrition {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match normalize_label(s).as_str() {
            "balanced" => Ok(Nutrition::Balanced),
            "ironrich" => Ok(Nutrition::IronRich),
            "lowappetite" => Ok(Nutrition::LowAppetite),
            "highcarb" => Ok(Nutrition::HighCarb),
            "highprotein" => Ok(Nutrition::HighProtein),
            _ => Err(unknown_label("nutrition", s)),
        }
    }
}

/// Check a goal target is finite, non-negative and, for ranges, ordered
pub fn validate_target(target: &GoalTarget) -> Result<()> {
    let ok = match target {
        GoalTarget::Value(v) => v.is_finite() && *v >= 0.0,
        GoalTarget::Range { min, max } => {
            min.is_finite() && max.is_finite() && *min >= 0.0 && min <= max
        }
    };
    if ok {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!("invalid goal target {:?}", target)))
    }
}

/// Validate predictions produced outside this crate
///
/// Requires four contiguous phases, confidence and every condition
/// probability within [0, 1], and a fertile window whose start does not
/// follow its end.
pub fn validate_remote_predictions(predictions: &Predictions) -> Result<()> {
    if !phases_are_contiguous(&predictions.phases) {
        return Err(Error::RemoteUpdate(
            "phases must be four contiguous, ordered, non-empty ranges".into(),
        ));
    }

    if !in_unit_interval(predictions.confidence) {
        return Err(Error::RemoteUpdate(format!(
            "confidence out of range: {}",
            predictions.confidence
        )));
    }

    if let Some(risk) = predictions
        .conditions
        .iter()
        .find(|c| !in_unit_interval(c.probability))
    {
        return Err(Error::RemoteUpdate(format!(
            "probability for {} out of range: {}",
            risk.condition.as_str(),
            risk.probability
        )));
    }

    if let Some(window) = &predictions.fertile_window {
        if window.start > window.end {
            return Err(Error::RemoteUpdate("fertile window ends before it starts".into()));
        }
    }

    Ok(())
}

/// Validate goals produced outside this crate
///
/// Titles must belong to the fixed goal set and appear at most once;
/// targets must pass [`validate_target`].
pub fn validate_remote_goals(goals: &[Goal]) -> Result<()> {
    let mut seen = HashSet::new();
    for goal in goals {
        if !is_known_title(&goal.title) {
            return Err(Error::RemoteUpdate(format!("unknown goal {:?}", goal.title)));
        }
        if !seen.insert(goal.title.as_str()) {
            return Err(Error::RemoteUpdate(format!("duplicate goal {:?}", goal.title)));
        }
        validate_target(&goal.target)
            .map_err(|e| Error::RemoteUpdate(format!("{}: {}", goal.title, e)))?;
    }
    Ok(())
}

fn in_unit_interval(p: f64) -> bool {
    p.is_finite() && (0.0..=1.0).contains(&p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goals::default_goals;
    use crate::predictor::{predict, PhasePolicy};
    use crate::{CycleEstimate, Regularity};

    fn sample_predictions() -> Predictions {
        let estimate = CycleEstimate {
            average_cycle_length_days: 28,
            regularity: Regularity::Regular,
            cycles_observed: 2,
        };
        let last = parse_date("2025-01-31").unwrap();
        predict(&estimate, Some(last), last, &PhasePolicy::default())
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2025-02-28").unwrap(),
            NaiveDate::from_ymd_opt(2025, 2, 28).unwrap()
        );
        assert!(parse_date("2025-02-30").is_err());
        assert!(parse_date("28/02/2025").is_err());
        assert!(parse_date("").is_err());
    }

    #[test]
    fn test_parse_date_rejects_years_outside_supported_range() {
        assert!(matches!(
            parse_date("+262142-12-20"),
            Err(Error::InvalidInput(_))
        ));
        assert!(parse_date("1899-12-31").is_err());
        assert!(parse_date("10000-01-01").is_err());

        assert!(parse_date("1900-01-01").is_ok());
        assert!(parse_date("9999-12-31").is_ok());
        assert!(!is_supported_date(NaiveDate::MAX));
    }

    #[test]
    fn test_normalize_sensor_accepts_valid_readings() {
        let sensor = normalize_sensor(6000, 7.0, 2.0, 36.6, Some(58.0)).unwrap();
        assert_eq!(sensor.steps, 6000);
        assert_eq!(sensor.resting_hr, Some(58.0));
    }

    #[test]
    fn test_normalize_sensor_rejects_malformed_readings() {
        assert!(normalize_sensor(-1, 7.0, 2.0, 36.6, None).is_err());
        assert!(normalize_sensor(6000, -0.5, 2.0, 36.6, None).is_err());
        assert!(normalize_sensor(6000, 7.0, 25.0, 36.6, None).is_err());
        assert!(normalize_sensor(6000, f64::NAN, 2.0, 36.6, None).is_err());
        assert!(normalize_sensor(6000, 7.0, 2.0, 12.0, None).is_err());
        assert!(normalize_sensor(6000, 7.0, 2.0, 36.6, Some(0.0)).is_err());
    }

    #[test]
    fn test_parse_log_entry_labels() {
        assert_eq!(
            parse_log_entry("flow", "Heavy").unwrap(),
            LogEntry::Flow(Flow::Heavy)
        );
        assert_eq!(
            parse_log_entry("color", "darkRed").unwrap(),
            LogEntry::Color(Coloration::DarkRed)
        );
        assert_eq!(
            parse_log_entry("colour", "dark_red").unwrap(),
            LogEntry::Color(Coloration::DarkRed)
        );
        assert_eq!(
            parse_log_entry("nutrition", "iron-rich").unwrap(),
            LogEntry::Nutrition(Nutrition::IronRich)
        );
        assert!(parse_log_entry("flow", "torrential").is_err());
        assert!(parse_log_entry("weather", "sunny").is_err());
    }

    #[test]
    fn test_validate_target() {
        assert!(validate_target(&GoalTarget::Value(2000.0)).is_ok());
        assert!(validate_target(&GoalTarget::Range { min: 0.0, max: 2.0 }).is_ok());
        assert!(validate_target(&GoalTarget::Value(-1.0)).is_err());
        assert!(validate_target(&GoalTarget::Range { min: 3.0, max: 2.0 }).is_err());
    }

    #[test]
    fn test_remote_predictions_accepted_when_well_formed() {
        assert!(validate_remote_predictions(&sample_predictions()).is_ok());
    }

    #[test]
    fn test_remote_predictions_rejected() {
        let mut bad = sample_predictions();
        bad.confidence = 1.2;
        assert!(matches!(
            validate_remote_predictions(&bad),
            Err(Error::RemoteUpdate(_))
        ));

        let mut bad = sample_predictions();
        bad.phases.pop();
        assert!(validate_remote_predictions(&bad).is_err());

        let mut bad = sample_predictions();
        bad.phases[2].start = bad.phases[2].start + chrono::Duration::days(1);
        assert!(validate_remote_predictions(&bad).is_err());

        let mut bad = sample_predictions();
        bad.conditions = vec![crate::ConditionRisk {
            condition: crate::Condition::Pain,
            probability: -0.1,
            actionable: true,
        }];
        assert!(validate_remote_predictions(&bad).is_err());
    }

    #[test]
    fn test_remote_goals() {
        assert!(validate_remote_goals(&default_goals()).is_ok());

        let mut unknown = default_goals();
        unknown[0].title = "Meditation".into();
        assert!(validate_remote_goals(&unknown).is_err());

        let mut duplicate = default_goals();
        duplicate[1].title = duplicate[0].title.clone();
        assert!(validate_remote_goals(&duplicate).is_err());

        let mut inverted = default_goals();
        inverted[3].target = GoalTarget::Range { min: 5.0, max: 1.0 };
        assert!(validate_remote_goals(&inverted).is_err());
    }
}
