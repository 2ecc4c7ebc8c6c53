//! Default goal set and rule-based goal personalization.
//!
//! The goal set is fixed: titles are never added or removed at runtime.
//! Personalization only moves targets; progress values are set elsewhere.

use crate::{DailyLog, Goal, GoalTarget, SensorSnapshot};
use once_cell::sync::Lazy;

pub const SLEEP: &str = "Sleep";
pub const WATER: &str = "Water";
pub const STEPS: &str = "Steps";
pub const SCREEN_TIME: &str = "Screen Time";
pub const EXERCISE: &str = "Exercise";

/// Every goal title, in display order
pub const GOAL_TITLES: [&str; 5] = [SLEEP, WATER, STEPS, SCREEN_TIME, EXERCISE];

/// Number of recent logs the personalizer looks at
pub const PERSONALIZATION_LOG_WINDOW: usize = 5;

const HEAVY_DAYS_FOR_WATER: usize = 2;
const RAISED_WATER_ML: f64 = 2400.0;
const LOW_SLEEP_HOURS: f64 = 6.0;
const HIGH_SCREEN_HOURS: f64 = 3.0;
const TIGHT_SCREEN_MAX_HOURS: f64 = 2.0;

/// Cached default goals - built once, cloned on use
static DEFAULT_GOALS: Lazy<Vec<Goal>> = Lazy::new(build_default_goals);

/// The starting goal set for a new user
pub fn default_goals() -> Vec<Goal> {
    DEFAULT_GOALS.clone()
}

fn build_default_goals() -> Vec<Goal> {
    vec![
        goal(SLEEP, GoalTarget::Range { min: 7.0, max: 9.0 }, 6.2, "h"),
        goal(WATER, GoalTarget::Value(2000.0), 1400.0, "ml"),
        goal(STEPS, GoalTarget::Value(8000.0), 5200.0, ""),
        goal(SCREEN_TIME, GoalTarget::Range { min: 0.0, max: 2.5 }, 3.8, "h"),
        goal(EXERCISE, GoalTarget::Value(30.0), 12.0, "min"),
    ]
}

fn goal(title: &str, target: GoalTarget, current: f64, unit: &str) -> Goal {
    Goal {
        title: title.into(),
        target,
        current,
        unit: unit.into(),
        enabled: true,
    }
}

/// Whether `title` names one of the fixed goals
pub fn is_known_title(title: &str) -> bool {
    GOAL_TITLES.contains(&title)
}

/// Overwrite goals in `goals` with the same-titled entries from `updates`
///
/// Titles missing from `updates` keep their current values and titles
/// not already in `goals` are ignored, so the goal set never changes shape.
/// Returns how many goals were replaced.
pub fn merge_goals(goals: &mut [Goal], updates: &[Goal]) -> usize {
    let mut replaced = 0;
    for update in updates {
        if let Some(goal) = goals.iter_mut().find(|g| g.title == update.title) {
            *goal = update.clone();
            replaced += 1;
        }
    }
    replaced
}

/// Adjust goal targets from recent logs and the current sensor snapshot
///
/// Rules fire independently:
/// 1. Two or more heavy-flow or dark-red days among the recent logs raise
///    the Water target to 2400 ml
/// 2. Under 6 h of sleep with over 3 h of screen time tightens Screen Time
///    to 0–2 h
///
/// Goals no rule touches are returned unchanged, so repeated calls with
/// the same input are idempotent.
pub fn personalize(
    goals: &[Goal],
    recent_logs: &[&DailyLog],
    sensor: &SensorSnapshot,
) -> Vec<Goal> {
    let mut goals = goals.to_vec();

    let heavy_days = recent_logs
        .iter()
        .rev()
        .take(PERSONALIZATION_LOG_WINDOW)
        .filter(|l| l.is_heavy_or_dark())
        .count();

    if heavy_days >= HEAVY_DAYS_FOR_WATER {
        if let Some(water) = goals.iter_mut().find(|g| g.title == WATER) {
            water.target = GoalTarget::Value(RAISED_WATER_ML);
            tracing::debug!("{} heavy days, raised water target", heavy_days);
        }
    }

    if sensor.sleep_hours < LOW_SLEEP_HOURS && sensor.screen_time_hours > HIGH_SCREEN_HOURS {
        if let Some(screen) = goals.iter_mut().find(|g| g.title == SCREEN_TIME) {
            screen.target = GoalTarget::Range {
                min: 0.0,
                max: TIGHT_SCREEN_MAX_HOURS,
            };
            tracing::debug!(
                "Sleep {:.1}h with {:.1}h screen time, tightened screen target",
                sensor.sleep_hours,
                sensor.screen_time_hours
            );
        }
    }

    goals
}
