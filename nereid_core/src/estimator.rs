//! Average cycle length and regularity from period-start history.

use crate::{CycleEstimate, Regularity};
use chrono::NaiveDate;

/// Cycle length assumed when history is too sparse to measure one
pub const DEFAULT_CYCLE_LENGTH_DAYS: u32 = 28;

/// Estimate cycle length and regularity from ascending period starts
///
/// Gaps between consecutive starts are measured in days. Non-positive gaps
/// (duplicate days or out-of-order input) are dropped before any statistics
/// are taken. The estimate falls back to the default length with unknown
/// regularity when no valid gap is left, or when a gap was dropped and
/// fewer than two remain. A single clean gap between two distinct starts
/// is still measured.
///
/// Regularity is the coefficient of variation (population standard
/// deviation over mean) of the gaps:
/// - `< 0.10` very regular
/// - `< 0.20` regular
/// - `< 0.30` moderately irregular
/// - otherwise irregular
pub fn estimate_cycle(starts: &[NaiveDate]) -> CycleEstimate {
    if starts.len() < 2 {
        return default_estimate();
    }

    let gaps: Vec<f64> = starts
        .windows(2)
        .map(|w| (w[1] - w[0]).num_days())
        .filter(|gap| *gap > 0)
        .map(|gap| gap as f64)
        .collect();

    let dropped = starts.len() - 1 - gaps.len();
    if gaps.is_empty() || (dropped > 0 && gaps.len() < 2) {
        tracing::debug!(
            "{} valid cycle gaps in {} starts ({} dropped), using defaults",
            gaps.len(),
            starts.len(),
            dropped
        );
        return default_estimate();
    }

    let mean = gaps.iter().sum::<f64>() / gaps.len() as f64;
    let variance = gaps.iter().map(|g| (g - mean).powi(2)).sum::<f64>() / gaps.len() as f64;
    let cv = variance.sqrt() / mean;

    let estimate = CycleEstimate {
        average_cycle_length_days: mean.round() as u32,
        regularity: classify(cv),
        cycles_observed: gaps.len(),
    };

    tracing::debug!(
        "Estimated cycle: {} days from {} gaps (cv {:.3}, {})",
        estimate.average_cycle_length_days,
        estimate.cycles_observed,
        cv,
        estimate.regularity.as_str()
    );

    estimate
}

fn classify(cv: f64) -> Regularity {
    if cv < 0.10 {
        Regularity::VeryRegular
    } else if cv < 0.20 {
        Regularity::Regular
    } else if cv < 0.30 {
        Regularity::ModeratelyIrregular
    } else {
        Regularity::Irregular
    }
}

fn default_estimate() -> CycleEstimate {
    CycleEstimate {
        average_cycle_length_days: DEFAULT_CYCLE_LENGTH_DAYS,
        regularity: Regularity::Unknown,
        cycles_observed: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn starts_with_gaps(first: &str, gaps: &[i64]) -> Vec<NaiveDate> {
        let mut current = date(first);
        let mut out = vec![current];
        for gap in gaps {
            current += Duration::days(*gap);
            out.push(current);
        }
        out
    }

    #[test]
    fn test_empty_and_single_use_defaults() {
        for starts in [vec![], vec![date("2025-01-03")]] {
            let estimate = estimate_cycle(&starts);
            assert_eq!(estimate.average_cycle_length_days, 28);
            assert_eq!(estimate.regularity, Regularity::Unknown);
            assert_eq!(estimate.cycles_observed, 0);
        }
    }

    #[test]
    fn test_two_events_fourteen_days_apart() {
        let estimate = estimate_cycle(&[date("2025-01-01"), date("2025-01-15")]);
        assert_eq!(estimate.average_cycle_length_days, 14);
        assert_eq!(estimate.regularity, Regularity::VeryRegular);
        assert_eq!(estimate.cycles_observed, 1);
    }

    #[test]
    fn test_average_is_rounded_mean() {
        // Gaps 28, 29, 29 -> mean 28.67 -> 29
        let starts = starts_with_gaps("2025-01-01", &[28, 29, 29]);
        assert_eq!(estimate_cycle(&starts).average_cycle_length_days, 29);

        // Gaps 27, 28 -> mean 27.5 -> rounds half away from zero to 28
        let starts = starts_with_gaps("2025-01-01", &[27, 28]);
        assert_eq!(estimate_cycle(&starts).average_cycle_length_days, 28);
    }

    #[test]
    fn test_regularity_thresholds() {
        // Gaps 24, 32: mean 28, sd 4, cv 0.143
        let starts = starts_with_gaps("2025-01-01", &[24, 32]);
        assert_eq!(estimate_cycle(&starts).regularity, Regularity::Regular);

        // Gaps 21, 35: mean 28, sd 7, cv 0.25
        let starts = starts_with_gaps("2025-01-01", &[21, 35]);
        assert_eq!(
            estimate_cycle(&starts).regularity,
            Regularity::ModeratelyIrregular
        );

        // Gaps 15, 45: mean 30, sd 15, cv 0.5
        let starts = starts_with_gaps("2025-01-01", &[15, 45]);
        assert_eq!(estimate_cycle(&starts).regularity, Regularity::Irregular);

        // Gaps 27, 28, 29: cv well under 0.1
        let starts = starts_with_gaps("2025-01-01", &[27, 28, 29]);
        assert_eq!(estimate_cycle(&starts).regularity, Regularity::VeryRegular);
    }

    #[test]
    fn test_zero_gaps_are_dropped() {
        let starts = vec![
            date("2025-01-01"),
            date("2025-01-01"),
            date("2025-01-29"),
            date("2025-02-26"),
        ];
        let estimate = estimate_cycle(&starts);
        assert_eq!(estimate.average_cycle_length_days, 28);
        assert_eq!(estimate.regularity, Regularity::VeryRegular);
        assert_eq!(estimate.cycles_observed, 2);
    }

    #[test]
    fn test_duplicate_start_leaving_one_gap_falls_back_to_default() {
        let starts = vec![date("2025-01-01"), date("2025-01-01"), date("2025-01-29")];
        let estimate = estimate_cycle(&starts);
        assert_eq!(estimate.average_cycle_length_days, 28);
        assert_eq!(estimate.regularity, Regularity::Unknown);
        assert_eq!(estimate.cycles_observed, 0);
    }

    #[test]
    fn test_only_zero_gaps_fall_back_to_default() {
        let starts = vec![date("2025-01-01"), date("2025-01-01")];
        let estimate = estimate_cycle(&starts);
        assert_eq!(estimate.average_cycle_length_days, 28);
        assert_eq!(estimate.regularity, Regularity::Unknown);
    }
}
