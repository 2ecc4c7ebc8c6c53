//! Inference engine tying the pipeline together.
//!
//! One recompute runs, in order:
//! - Cycle estimation over the recorded period starts
//! - Phase, next-period and fertile-window prediction
//! - Condition-risk scoring over the most recent logs
//! - Goal personalization
//! - Insight, reminder and UI-emphasis derivation
//!
//! Every stage is a pure function of its inputs, so the same history,
//! logs, readings, goals and date always give the same output.

use crate::config::{Config, NotificationConfig};
use crate::estimator::estimate_cycle;
use crate::goals::{personalize, PERSONALIZATION_LOG_WINDOW};
use crate::input::is_supported_date;
use crate::insights::{self, Insights};
use crate::predictor::{forecast_cycles, phases_are_contiguous, predict, CycleForecast, PhasePolicy};
use crate::risk::{score_conditions, DEFAULT_RISK_LOG_WINDOW};
use crate::{CycleHistory, DailyLogBook, Goal, Predictions, SensorSnapshot};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Tunables for one engine instance
#[derive(Clone, Debug, PartialEq)]
pub struct InferenceSettings {
    /// Recent logs the risk scorer looks at
    pub risk_log_window: usize,
    pub notifications: NotificationConfig,
    pub phase_policy: PhasePolicy,
}

impl Default for InferenceSettings {
    fn default() -> Self {
        Self {
            risk_log_window: DEFAULT_RISK_LOG_WINDOW,
            notifications: NotificationConfig::default(),
            phase_policy: PhasePolicy::default(),
        }
    }
}

impl From<&Config> for InferenceSettings {
    fn from(config: &Config) -> Self {
        Self {
            risk_log_window: config.inference.risk_log_window,
            notifications: config.notifications.clone(),
            phase_policy: PhasePolicy::default(),
        }
    }
}

/// Combined result of one recompute
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct InferenceOutput {
    pub predictions: Predictions,
    pub goals: Vec<Goal>,
    pub insights: Insights,
    /// Date the output was computed for
    pub computed_on: NaiveDate,
}

/// Runs the full inference pipeline
#[derive(Clone, Debug, Default)]
pub struct InferenceEngine {
    settings: InferenceSettings,
}

impl InferenceEngine {
    pub fn new(settings: InferenceSettings) -> Self {
        Self { settings }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(InferenceSettings::from(config))
    }

    pub fn settings(&self) -> &InferenceSettings {
        &self.settings
    }

    /// Recompute everything for today's UTC date
    pub fn recompute(
        &self,
        history: &CycleHistory,
        logs: &DailyLogBook,
        sensor: &SensorSnapshot,
        goals: &[Goal],
    ) -> InferenceOutput {
        self.recompute_on(history, logs, sensor, goals, Utc::now().date_naive())
    }

    /// Recompute everything as of `today`
    ///
    /// `today` only matters when there is no period history (placeholder
    /// phases start on it) and for the day-relative parts of the insights.
    pub fn recompute_on(
        &self,
        history: &CycleHistory,
        logs: &DailyLogBook,
        sensor: &SensorSnapshot,
        goals: &[Goal],
        today: NaiveDate,
    ) -> InferenceOutput {
        let starts = supported_starts(history);
        let estimate = estimate_cycle(&starts);
        tracing::debug!(
            "Estimated {} day cycle ({}) from {} starts",
            estimate.average_cycle_length_days,
            estimate.regularity.as_str(),
            starts.len()
        );

        let mut predictions = predict(
            &estimate,
            starts.last().copied(),
            today,
            &self.settings.phase_policy,
        );
        debug_assert!(phases_are_contiguous(&predictions.phases));

        predictions.conditions = score_conditions(
            &logs.recent(self.settings.risk_log_window),
            sensor,
            &predictions,
        );

        let goals = personalize(goals, &logs.recent(PERSONALIZATION_LOG_WINDOW), sensor);
        let insights = insights::derive(&predictions, sensor, today, &self.settings.notifications);

        tracing::info!(
            "Recomputed for {}: next period {}, confidence {:.2}, {} insights",
            today,
            predictions
                .next_period_start
                .map(|d| d.to_string())
                .unwrap_or_else(|| "unknown".into()),
            predictions.confidence,
            insights.cycle_insights.len()
        );

        InferenceOutput {
            predictions,
            goals,
            insights,
            computed_on: today,
        }
    }

    /// Upcoming cycles covering `days_ahead` days past the last recorded start
    pub fn forecast(&self, history: &CycleHistory, days_ahead: u32) -> Vec<CycleForecast> {
        let starts = supported_starts(history);
        let estimate = estimate_cycle(&starts);
        forecast_cycles(
            &estimate,
            starts.last().copied(),
            days_ahead,
            &self.settings.phase_policy,
        )
    }
}

/// Recorded starts inside the supported year range
///
/// State files written by hand or by older builds can hold dates that
/// `parse_date` would now reject; those are skipped rather than trusted.
fn supported_starts(history: &CycleHistory) -> Vec<NaiveDate> {
    let (starts, skipped): (Vec<NaiveDate>, Vec<NaiveDate>) =
        history.dates().into_iter().partition(|d| is_supported_date(*d));

    if !skipped.is_empty() {
        tracing::warn!(
            "Ignoring {} period starts outside the supported year range",
            skipped.len()
        );
    }
    starts
}

/// Recompute with default settings for today's UTC date
pub fn recompute(
    history: &CycleHistory,
    logs: &DailyLogBook,
    sensor: &SensorSnapshot,
    goals: &[Goal],
) -> InferenceOutput {
    InferenceEngine::default().recompute(history, logs, sensor, goals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goals::{default_goals, WATER};
    use crate::{Condition, Flow, GoalTarget, LogEntry, PhaseName, Regularity};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn two_cycle_history() -> CycleHistory {
        CycleHistory::from_dates([date("2025-01-03"), date("2025-01-31")])
    }

    #[test]
    fn test_end_to_end_two_starts() {
        crate::logging::init_test();
        let engine = InferenceEngine::default();
        let output = engine.recompute_on(
            &two_cycle_history(),
            &DailyLogBook::new(),
            &SensorSnapshot::default(),
            &default_goals(),
            date("2025-02-10"),
        );

        let p = &output.predictions;
        assert_eq!(p.cycle_length_days, 28);
        assert_eq!(p.regularity, Regularity::VeryRegular);
        assert_eq!(p.confidence, 0.95);
        assert_eq!(p.next_period_start, Some(date("2025-02-28")));

        let window = p.fertile_window.as_ref().unwrap();
        assert_eq!(window.start, date("2025-02-09"));
        assert_eq!(window.end, date("2025-02-14"));

        assert_eq!(p.phases[0].start, date("2025-01-31"));
        assert_eq!(p.phases[0].end, date("2025-02-04"));
        assert_eq!(p.phases[1].end, date("2025-02-18"));
        assert_eq!(p.phases[2].end, date("2025-02-21"));
        assert_eq!(p.phases[3].end, date("2025-02-27"));

        let order: Vec<Condition> = p.conditions.iter().map(|c| c.condition).collect();
        assert_eq!(order, Condition::ALL.to_vec());

        assert_eq!(output.insights.current_phase, Some(PhaseName::Follicular));
        assert_eq!(output.insights.day_of_cycle, Some(11));
        assert!(output.insights.fertile_today);
        assert_eq!(output.computed_on, date("2025-02-10"));
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let mut logs = DailyLogBook::new();
        logs.save(date("2025-01-31"), LogEntry::Flow(Flow::Heavy));
        logs.save(date("2025-02-01"), LogEntry::Flow(Flow::Heavy));

        let engine = InferenceEngine::default();
        let history = two_cycle_history();
        let sensor = SensorSnapshot::default();
        let today = date("2025-02-03");

        let first = engine.recompute_on(&history, &logs, &sensor, &default_goals(), today);
        let second = engine.recompute_on(&history, &logs, &sensor, &first.goals, today);
        assert_eq!(first, second);
    }

    #[test]
    fn test_heavy_logs_flow_through_to_goals_and_risk() {
        let mut logs = DailyLogBook::new();
        logs.save(date("2025-01-31"), LogEntry::Flow(Flow::Heavy));
        logs.save(date("2025-02-01"), LogEntry::Flow(Flow::Heavy));

        let output = InferenceEngine::default().recompute_on(
            &two_cycle_history(),
            &logs,
            &SensorSnapshot::default(),
            &default_goals(),
            date("2025-02-03"),
        );

        let water = output.goals.iter().find(|g| g.title == WATER).unwrap();
        assert_eq!(water.target, GoalTarget::Value(2400.0));

        let anemia = output
            .predictions
            .conditions
            .iter()
            .find(|c| c.condition == Condition::Anemia)
            .unwrap();
        assert_eq!(anemia.probability, 0.17);
    }

    #[test]
    fn test_no_history_uses_placeholder_phases() {
        let today = date("2025-03-01");
        let output = InferenceEngine::default().recompute_on(
            &CycleHistory::new(),
            &DailyLogBook::new(),
            &SensorSnapshot::default(),
            &default_goals(),
            today,
        );

        let p = &output.predictions;
        assert_eq!(p.next_period_start, None);
        assert_eq!(p.fertile_window, None);
        assert_eq!(p.cycle_length_days, 28);
        assert_eq!(p.regularity, Regularity::Unknown);
        assert_eq!(p.confidence, 0.50);
        assert_eq!(p.phases[0].start, today);
        assert!(!output.insights.fertile_today);
    }

    #[test]
    fn test_settings_from_config() {
        let mut config = Config::default();
        config.inference.risk_log_window = 5;
        config.notifications.tracking_reminder = "21:15".into();

        let engine = InferenceEngine::from_config(&config);
        assert_eq!(engine.settings().risk_log_window, 5);

        let output = engine.recompute_on(
            &two_cycle_history(),
            &DailyLogBook::new(),
            &SensorSnapshot::default(),
            &default_goals(),
            date("2025-02-10"),
        );
        assert_eq!(output.insights.reminders[0].time, "21:15");
    }

    #[test]
    fn test_out_of_range_starts_are_ignored() {
        let mut history = two_cycle_history();
        history.add(NaiveDate::MAX);
        history.add(NaiveDate::MIN);

        let engine = InferenceEngine::default();
        let output = engine.recompute_on(
            &history,
            &DailyLogBook::new(),
            &SensorSnapshot::default(),
            &default_goals(),
            date("2025-02-10"),
        );
        assert_eq!(output.predictions.cycle_length_days, 28);
        assert_eq!(output.predictions.next_period_start, Some(date("2025-02-28")));

        let mut far_future = CycleHistory::new();
        far_future.add(NaiveDate::MAX);
        let output = engine.recompute_on(
            &far_future,
            &DailyLogBook::new(),
            &SensorSnapshot::default(),
            &default_goals(),
            date("2025-02-10"),
        );
        assert_eq!(output.predictions.next_period_start, None);
        assert!(engine.forecast(&far_future, 90).is_empty());
    }

    #[test]
    fn test_forecast_covers_requested_days() {
        let forecast = InferenceEngine::default().forecast(&two_cycle_history(), 60);
        assert_eq!(forecast.len(), 3);
        assert_eq!(forecast[0].start, date("2025-02-28"));
        assert_eq!(forecast[1].start, date("2025-03-28"));

        assert!(InferenceEngine::default()
            .forecast(&CycleHistory::new(), 60)
            .is_empty());
    }
}
