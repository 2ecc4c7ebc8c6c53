//! Heuristic condition-risk scoring.
//!
//! These are fixed heuristics, not diagnostics. All four conditions are
//! always emitted, in [`Condition::ALL`] order, so output is stable for
//! identical input.

use crate::{Condition, ConditionRisk, DailyLog, Predictions, SensorSnapshot};

/// Default number of recent logs the scorer looks at
pub const DEFAULT_RISK_LOG_WINDOW: usize = 7;

const PAIN_BASE: f64 = 0.20;
const PAIN_SHORT_SLEEP: f64 = 0.15;
const PAIN_LOW_ACTIVITY: f64 = 0.10;
const SHORT_SLEEP_HOURS: f64 = 6.5;
const LOW_ACTIVITY_STEPS: u32 = 5000;

const ANEMIA_BASE: f64 = 0.05;
const ANEMIA_PER_HEAVY_DAY: f64 = 0.06;

const PCOS_BASE: f64 = 0.03;
const PCOS_LONG_CYCLE: f64 = 0.12;
const LONG_CYCLE_DAYS: u32 = 35;

const PREGNANCY_IN_WINDOW: f64 = 0.06;
const PREGNANCY_BASELINE: f64 = 0.02;

/// Score every condition from recent logs, current readings and the cycle
/// prediction
///
/// `recent_logs` should be the most recent logs in date order; callers
/// pick the window size.
pub fn score_conditions(
    recent_logs: &[&DailyLog],
    sensor: &SensorSnapshot,
    predictions: &Predictions,
) -> Vec<ConditionRisk> {
    Condition::ALL
        .into_iter()
        .map(|condition| {
            let raw = match condition {
                Condition::Pain => pain(sensor),
                Condition::Anemia => anemia(recent_logs),
                Condition::PcosLikeIrregularity => pcos_like(predictions.cycle_length_days),
                Condition::PregnancyWindow => pregnancy(predictions.fertile_window.is_some()),
            };
            ConditionRisk {
                condition,
                probability: to_probability(raw),
                actionable: is_actionable(condition),
            }
        })
        .collect()
}

/// Pain, anemia and the pregnancy window prompt action; PCOS-like
/// irregularity is only monitored
pub fn is_actionable(condition: Condition) -> bool {
    !matches!(condition, Condition::PcosLikeIrregularity)
}

fn pain(sensor: &SensorSnapshot) -> f64 {
    let mut p = PAIN_BASE;
    if sensor.sleep_hours < SHORT_SLEEP_HOURS {
        p += PAIN_SHORT_SLEEP;
    }
    if sensor.steps < LOW_ACTIVITY_STEPS {
        p += PAIN_LOW_ACTIVITY;
    }
    p
}

fn anemia(recent_logs: &[&DailyLog]) -> f64 {
    let heavy_days = recent_logs.iter().filter(|l| l.is_heavy_or_dark()).count();
    ANEMIA_BASE + ANEMIA_PER_HEAVY_DAY * heavy_days as f64
}

fn pcos_like(cycle_length_days: u32) -> f64 {
    if cycle_length_days > LONG_CYCLE_DAYS {
        PCOS_BASE + PCOS_LONG_CYCLE
    } else {
        PCOS_BASE
    }
}

fn pregnancy(has_fertile_window: bool) -> f64 {
    if has_fertile_window {
        PREGNANCY_IN_WINDOW
    } else {
        PREGNANCY_BASELINE
    }
}

// Heuristic weights have two decimals; rounding keeps sums like
// 0.20 + 0.15 + 0.10 equal to the literal 0.45.
fn to_probability(raw: f64) -> f64 {
    ((raw * 100.0).round() / 100.0).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predictor::{predict, PhasePolicy};
    use crate::{Coloration, CycleEstimate, Flow, Regularity};
    use chrono::NaiveDate;

    fn predictions(length: u32, with_history: bool) -> Predictions {
        let estimate = CycleEstimate {
            average_cycle_length_days: length,
            regularity: Regularity::Regular,
            cycles_observed: 2,
        };
        let last = NaiveDate::from_ymd_opt(2025, 1, 31);
        predict(
            &estimate,
            if with_history { last } else { None },
            NaiveDate::from_ymd_opt(2025, 2, 10).unwrap(),
            &PhasePolicy::default(),
        )
    }

    fn probability(risks: &[ConditionRisk], condition: Condition) -> f64 {
        risks
            .iter()
            .find(|r| r.condition == condition)
            .map(|r| r.probability)
            .unwrap()
    }

    fn heavy_log() -> DailyLog {
        DailyLog {
            flow: Some(Flow::Heavy),
            ..Default::default()
        }
    }

    #[test]
    fn test_all_conditions_in_fixed_order() {
        let risks = score_conditions(&[], &SensorSnapshot::default(), &predictions(28, true));
        let order: Vec<Condition> = risks.iter().map(|r| r.condition).collect();
        assert_eq!(order, Condition::ALL.to_vec());

        let actionable: Vec<bool> = risks.iter().map(|r| r.actionable).collect();
        assert_eq!(actionable, vec![true, true, false, true]);
    }

    #[test]
    fn test_pain_from_short_sleep_and_low_steps() {
        let sensor = SensorSnapshot {
            sleep_hours: 5.0,
            steps: 2000,
            ..Default::default()
        };
        let risks = score_conditions(&[], &sensor, &predictions(28, true));
        assert_eq!(probability(&risks, Condition::Pain), 0.45);
    }

    #[test]
    fn test_pain_baseline_with_default_sensor() {
        let risks = score_conditions(&[], &SensorSnapshot::default(), &predictions(28, true));
        assert_eq!(probability(&risks, Condition::Pain), 0.20);
    }

    #[test]
    fn test_anemia_counts_heavy_or_dark_days() {
        let heavy = heavy_log();
        let dark = DailyLog {
            color: Some(Coloration::DarkRed),
            ..Default::default()
        };
        let both = DailyLog {
            flow: Some(Flow::Heavy),
            color: Some(Coloration::DarkRed),
            ..Default::default()
        };
        let light = DailyLog {
            flow: Some(Flow::Light),
            ..Default::default()
        };
        let logs = vec![&heavy, &dark, &both, &light];

        let risks = score_conditions(&logs, &SensorSnapshot::default(), &predictions(28, true));
        // 0.05 + 3 * 0.06
        assert_eq!(probability(&risks, Condition::Anemia), 0.23);
    }

    #[test]
    fn test_anemia_is_clamped() {
        let heavy = heavy_log();
        let logs: Vec<&DailyLog> = std::iter::repeat(&heavy).take(20).collect();
        let risks = score_conditions(&logs, &SensorSnapshot::default(), &predictions(28, true));
        assert_eq!(probability(&risks, Condition::Anemia), 1.0);
    }

    #[test]
    fn test_pcos_like_for_long_cycles() {
        let risks = score_conditions(&[], &SensorSnapshot::default(), &predictions(40, true));
        assert_eq!(probability(&risks, Condition::PcosLikeIrregularity), 0.15);

        let risks = score_conditions(&[], &SensorSnapshot::default(), &predictions(35, true));
        assert_eq!(probability(&risks, Condition::PcosLikeIrregularity), 0.03);
    }

    #[test]
    fn test_pregnancy_depends_on_fertile_window() {
        let risks = score_conditions(&[], &SensorSnapshot::default(), &predictions(28, true));
        assert_eq!(probability(&risks, Condition::PregnancyWindow), 0.06);

        let risks = score_conditions(&[], &SensorSnapshot::default(), &predictions(28, false));
        assert_eq!(probability(&risks, Condition::PregnancyWindow), 0.02);
    }

    #[test]
    fn test_probabilities_stay_in_unit_interval() {
        let heavy = heavy_log();
        let logs: Vec<&DailyLog> = std::iter::repeat(&heavy).take(7).collect();
        let sensor = SensorSnapshot {
            sleep_hours: 0.0,
            steps: 0,
            ..Default::default()
        };
        for risk in score_conditions(&logs, &sensor, &predictions(90, true)) {
            assert!((0.0..=1.0).contains(&risk.probability));
        }
    }
}
