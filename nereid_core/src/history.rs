//! Period-start history and per-day symptom logs.
//!
//! Both collections are pure data. Period starts have set semantics and are
//! always iterated oldest first; daily logs are keyed by calendar date and
//! merged field by field.

use crate::{DailyLog, LogEntry};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Recorded period-start dates, deduplicated and sorted ascending
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct CycleHistory {
    starts: BTreeSet<NaiveDate>,
}

impl CycleHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a history from unordered dates; duplicates collapse
    pub fn from_dates<I>(dates: I) -> Self
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        Self {
            starts: dates.into_iter().collect(),
        }
    }

    /// Record a period start. Returns false if the day was already recorded.
    pub fn add(&mut self, date: NaiveDate) -> bool {
        self.starts.insert(date)
    }

    /// Flip a day: remove it if recorded, otherwise record it
    ///
    /// Returns whether the date is recorded after the call.
    pub fn toggle(&mut self, date: NaiveDate) -> bool {
        if self.starts.remove(&date) {
            tracing::debug!("Removed period start {}", date);
            false
        } else {
            self.starts.insert(date);
            tracing::debug!("Recorded period start {}", date);
            true
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.starts.contains(&date)
    }

    /// Most recent period start
    pub fn last(&self) -> Option<NaiveDate> {
        self.starts.iter().next_back().copied()
    }

    /// All dates, oldest first
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.starts.iter().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NaiveDate> {
        self.starts.iter()
    }

    pub fn len(&self) -> usize {
        self.starts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }
}

/// Daily logs keyed by calendar date
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct DailyLogBook {
    logs: BTreeMap<NaiveDate, DailyLog>,
}

impl DailyLogBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Save one field for a day, creating the day's log if needed
    pub fn save(&mut self, date: NaiveDate, entry: LogEntry) {
        self.logs.entry(date).or_default().update(entry);
        tracing::debug!("Saved {:?} for {}", entry, date);
    }

    /// Merge a whole log into the day, keeping fields `log` leaves unset
    pub fn merge(&mut self, date: NaiveDate, log: &DailyLog) {
        if log.is_empty() {
            return;
        }
        self.logs.entry(date).or_default().merge(log);
    }

    pub fn get(&self, date: NaiveDate) -> Option<&DailyLog> {
        self.logs.get(&date)
    }

    /// The `n` most recent logs, returned in ascending date order
    pub fn recent(&self, n: usize) -> Vec<&DailyLog> {
        let mut recent: Vec<&DailyLog> = self.logs.values().rev().take(n).collect();
        recent.reverse();
        recent
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NaiveDate, &DailyLog)> {
        self.logs.iter()
    }

    pub fn len(&self) -> usize {
        self.logs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.logs.is_empty()
    }
}
