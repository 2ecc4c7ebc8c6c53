//! Phase calendar, next-period and fertile-window prediction.
//!
//! The phase layout is a fixed policy, not a learned model:
//! - Menstrual: 5 days
//! - Follicular: 60% of the rest of the cycle, rounded
//! - Ovulatory: 3 days
//! - Luteal: whatever remains
//!
//! Follicular and luteal are clamped to at least one day. For very short
//! cycles this lets the phase total exceed the nominal cycle length rather
//! than produce an empty or negative phase.

use crate::{
    CycleEstimate, CyclePhase, FertileWindow, PhaseName, Predictions, Regularity,
};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Confidence used when there is no period history at all
pub const NO_HISTORY_CONFIDENCE: f64 = 0.50;

/// Longest horizon [`forecast_cycles`] will cover, about ten years
pub const MAX_FORECAST_DAYS: u32 = 3650;

/// Fixed phase-duration and fertility policy
#[derive(Clone, Debug, PartialEq)]
pub struct PhasePolicy {
    pub menstrual_days: u32,
    pub follicular_share: f64,
    pub ovulatory_days: u32,
    pub min_phase_days: u32,
    pub fertile_window_days: u32,
    pub ovulation_offset_days: u32,
}

impl Default for PhasePolicy {
    fn default() -> Self {
        Self {
            menstrual_days: 5,
            follicular_share: 0.6,
            ovulatory_days: 3,
            min_phase_days: 1,
            fertile_window_days: 6,
            ovulation_offset_days: 14,
        }
    }
}

impl PhasePolicy {
    /// Durations for menstrual, follicular, ovulatory and luteal phases
    pub fn durations(&self, cycle_length: u32) -> [u32; 4] {
        let menstrual = self.menstrual_days;
        let ovulatory = self.ovulatory_days;

        let remaining = cycle_length as f64 - menstrual as f64;
        let follicular = ((remaining * self.follicular_share).round() as i64)
            .max(self.min_phase_days as i64) as u32;

        let luteal = (cycle_length as i64
            - menstrual as i64
            - follicular as i64
            - ovulatory as i64)
            .max(self.min_phase_days as i64) as u32;

        [menstrual, follicular, ovulatory, luteal]
    }

    /// Start of the following cycle, if one laid out from `start` fits in
    /// the calendar
    ///
    /// Short cycles can lay out more phase days than `cycle_length`, so the
    /// longer of the two spans is checked.
    fn next_cycle_start(&self, start: NaiveDate, cycle_length: u32) -> Option<NaiveDate> {
        let laid_out: u32 = self.durations(cycle_length).iter().sum();
        start.checked_add_signed(Duration::days(laid_out.max(cycle_length) as i64))?;
        start.checked_add_signed(Duration::days(cycle_length as i64))
    }
}

/// Lay out the four phases back to back starting at `start`
pub fn layout_phases(start: NaiveDate, cycle_length: u32, policy: &PhasePolicy) -> Vec<CyclePhase> {
    let mut phases = Vec::with_capacity(4);
    let mut phase_start = start;

    for (name, duration) in PhaseName::ALL.into_iter().zip(policy.durations(cycle_length)) {
        let end = phase_start + Duration::days(duration as i64 - 1);
        phases.push(CyclePhase {
            name,
            start: phase_start,
            end,
            duration_days: duration,
        });
        phase_start = end + Duration::days(1);
    }

    debug_assert!(phases_are_contiguous(&phases));
    phases
}

/// Confidence lookup by regularity
pub fn confidence_for(regularity: Regularity) -> f64 {
    match regularity {
        Regularity::VeryRegular => 0.95,
        Regularity::Regular => 0.85,
        Regularity::ModeratelyIrregular => 0.70,
        Regularity::Irregular => 0.55,
        Regularity::Unknown => 0.75,
    }
}

/// Fertile window: the days ending on the estimated ovulation day
pub fn fertile_window(next_period_start: NaiveDate, policy: &PhasePolicy) -> FertileWindow {
    let ovulation_day = next_period_start - Duration::days(policy.ovulation_offset_days as i64);
    FertileWindow {
        start: ovulation_day - Duration::days(policy.fertile_window_days as i64 - 1),
        end: ovulation_day,
        ovulation_day,
    }
}

/// Predict the current cycle's phases, next period and fertile window
///
/// `today` is only used when there is no history: phases are then laid out
/// from `today` as a placeholder, there is no next period or fertile
/// window, and confidence is forced to [`NO_HISTORY_CONFIDENCE`].
///
/// Condition risks are left empty; the risk scorer fills them in.
pub fn predict(
    estimate: &CycleEstimate,
    last_start: Option<NaiveDate>,
    today: NaiveDate,
    policy: &PhasePolicy,
) -> Predictions {
    let cycle_length = estimate.average_cycle_length_days;

    let anchored = last_start.and_then(|start| match policy.next_cycle_start(start, cycle_length) {
        Some(next) => Some((start, next)),
        None => {
            tracing::warn!(
                "A {} day cycle from {} runs past the calendar, ignoring history",
                cycle_length,
                start
            );
            None
        }
    });

    let Some((last_start, next_period_start)) = anchored else {
        tracing::debug!("No period history, laying out placeholder phases from {}", today);
        return Predictions {
            next_period_start: None,
            cycle_length_days: cycle_length,
            regularity: estimate.regularity,
            confidence: NO_HISTORY_CONFIDENCE,
            phases: layout_phases(today, cycle_length, policy),
            fertile_window: None,
            conditions: Vec::new(),
        };
    };

    Predictions {
        next_period_start: Some(next_period_start),
        cycle_length_days: cycle_length,
        regularity: estimate.regularity,
        confidence: confidence_for(estimate.regularity),
        phases: layout_phases(last_start, cycle_length, policy),
        fertile_window: Some(fertile_window(next_period_start, policy)),
        conditions: Vec::new(),
    }
}

/// One predicted future cycle
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CycleForecast {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub length_days: u32,
    pub phases: Vec<CyclePhase>,
    pub confidence: f64,
}

/// Forecast enough upcoming cycles to cover `days_ahead` days
///
/// The first forecast cycle begins at the predicted next period start.
/// Without history there is nothing to anchor on and the forecast is empty.
/// `days_ahead` is capped at [`MAX_FORECAST_DAYS`], and the forecast stops
/// early if a cycle would run past the end of the calendar.
pub fn forecast_cycles(
    estimate: &CycleEstimate,
    last_start: Option<NaiveDate>,
    days_ahead: u32,
    policy: &PhasePolicy,
) -> Vec<CycleForecast> {
    let Some(last_start) = last_start else {
        return Vec::new();
    };

    if days_ahead > MAX_FORECAST_DAYS {
        tracing::warn!(
            "Forecast of {} days capped at {}",
            days_ahead,
            MAX_FORECAST_DAYS
        );
    }
    let days_ahead = days_ahead.min(MAX_FORECAST_DAYS);

    let length = estimate.average_cycle_length_days.max(1);
    let count = days_ahead.div_ceil(length);
    let confidence = confidence_for(estimate.regularity);

    let mut forecasts = Vec::with_capacity(count as usize);
    let mut start = last_start;
    for _ in 0..count {
        let Some(next) = policy.next_cycle_start(start, length) else {
            break;
        };
        start = next;
        if policy.next_cycle_start(start, length).is_none() {
            break;
        }

        forecasts.push(CycleForecast {
            start,
            end: start + Duration::days(length as i64 - 1),
            length_days: length,
            phases: layout_phases(start, length, policy),
            confidence,
        });
    }
    forecasts
}

impl Predictions {
    /// The phase containing `date`, if it falls inside the laid-out cycle
    pub fn phase_on(&self, date: NaiveDate) -> Option<&CyclePhase> {
        self.phases.iter().find(|p| p.contains(date))
    }

    /// 1-based day of the cycle for `date`, counted from the first phase
    pub fn day_of_cycle(&self, date: NaiveDate) -> Option<u32> {
        let first = self.phases.first()?;
        let offset = (date - first.start).num_days();
        if offset < 0 {
            return None;
        }
        Some(offset as u32 + 1)
    }

    /// Whether `date` is inside the fertile window
    pub fn is_fertile_on(&self, date: NaiveDate) -> bool {
        self.fertile_window
            .as_ref()
            .is_some_and(|w| w.contains(date))
    }
}

/// Exactly four phases in cycle order, each at least a day long, with
/// every phase starting the day after the previous one ends
pub fn phases_are_contiguous(phases: &[CyclePhase]) -> bool {
    if phases.len() != 4 {
        return false;
    }

    let ordered = phases
        .iter()
        .zip(PhaseName::ALL)
        .all(|(phase, name)| phase.name == name);

    let sized = phases.iter().all(|p| {
        p.duration_days >= 1 && (p.end - p.start).num_days() + 1 == p.duration_days as i64
    });

    let joined = phases
        .windows(2)
        .all(|w| w[0].end + Duration::days(1) == w[1].start);

    ordered && sized && joined
}
