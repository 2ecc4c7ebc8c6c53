//! Holder for the most recent inference output.
//!
//! Output normally comes from a local recompute. A remote service may also
//! push predictions or goals; those are validated and stored as-is, without
//! being re-derived, and stay in place until the next local recompute.

use crate::engine::InferenceOutput;
use crate::goals::merge_goals;
use crate::input::{validate_remote_goals, validate_remote_predictions};
use crate::{Goal, Predictions, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Where the stored predictions came from
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PredictionSource {
    #[default]
    Local,
    Remote,
}

/// Latest predictions, goals and insights, plus provenance
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct PredictionStore {
    output: Option<InferenceOutput>,

    #[serde(default)]
    source: PredictionSource,

    /// Date the stored predictions were produced (local) or received (remote)
    #[serde(default)]
    updated_on: Option<NaiveDate>,
}

impl PredictionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn output(&self) -> Option<&InferenceOutput> {
        self.output.as_ref()
    }

    pub fn predictions(&self) -> Option<&Predictions> {
        self.output.as_ref().map(|o| &o.predictions)
    }

    pub fn goals(&self) -> Option<&[Goal]> {
        self.output.as_ref().map(|o| o.goals.as_slice())
    }

    pub fn source(&self) -> PredictionSource {
        self.source
    }

    pub fn updated_on(&self) -> Option<NaiveDate> {
        self.updated_on
    }

    /// Store the result of a local recompute
    pub fn apply_local(&mut self, output: InferenceOutput) {
        self.updated_on = Some(output.computed_on);
        self.source = PredictionSource::Local;
        self.output = Some(output);
    }

    /// Replace the stored predictions with externally produced ones
    ///
    /// Goals and insights from the last local recompute are kept. Fails
    /// with [`crate::Error::RemoteUpdate`] if the predictions are malformed
    /// or there is no local output to attach them to; the store is left
    /// unchanged on failure.
    pub fn apply_remote(&mut self, predictions: Predictions, received_on: NaiveDate) -> Result<()> {
        validate_remote_predictions(&predictions)?;
        let output = self.output.as_mut().ok_or_else(|| {
            crate::Error::RemoteUpdate("no local output to attach remote predictions to".into())
        })?;

        output.predictions = predictions;
        self.source = PredictionSource::Remote;
        self.updated_on = Some(received_on);
        tracing::info!("Applied remote predictions received on {}", received_on);
        Ok(())
    }

    /// Merge externally produced goals into the stored goals by title
    ///
    /// A payload may carry any subset of the fixed goals; the rest keep
    /// their stored values. Unlike predictions, goals do not change the
    /// recorded source.
    pub fn apply_remote_goals(&mut self, goals: &[Goal]) -> Result<()> {
        validate_remote_goals(goals)?;
        let output = self.output.as_mut().ok_or_else(|| {
            crate::Error::RemoteUpdate("no local output to attach remote goals to".into())
        })?;

        let replaced = merge_goals(&mut output.goals, goals);
        tracing::info!("Applied {} remote goals", replaced);
        Ok(())
    }

    /// Days since the stored predictions were produced, if any
    pub fn age_days(&self, today: NaiveDate) -> Option<i64> {
        self.updated_on.map(|d| (today - d).num_days())
    }

    /// Whether the stored predictions are older than `max_age_days`
    ///
    /// An empty store is always stale.
    pub fn is_stale(&self, today: NaiveDate, max_age_days: i64) -> bool {
        self.age_days(today).map_or(true, |age| age > max_age_days)
    }
}
