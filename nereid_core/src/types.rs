//! Core domain types for cycle inference.
//!
//! This module defines the fundamental types used throughout the system:
//! - Daily symptom logs and their labelled fields
//! - Sensor snapshots
//! - Goals and their targets
//! - Cycle phases, estimates and predictions
//! - Condition risk scores

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ============================================================================
// Daily Log Types
// ============================================================================

/// Self-reported mood
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Calm,
    Happy,
    Low,
    Irritable,
    Anxious,
}

/// Menstrual flow intensity
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Flow {
    Spotting,
    Light,
    Medium,
    Heavy,
}

/// Observed flow colour
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Coloration {
    BrightRed,
    DarkRed,
    Brown,
    Pink,
}

/// Kind of pain reported for the day
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Pain {
    None,
    Crampy,
    Backache,
    Headache,
    Pelvic,
}

/// Nutrition tag for the day
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Nutrition {
    Balanced,
    IronRich,
    LowAppetite,
    HighCarb,
    HighProtein,
}

/// A single field update for a day's log
///
/// Saving an entry overwrites only the named field and leaves the rest of
/// the day's log untouched.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum LogEntry {
    Mood(Mood),
    Flow(Flow),
    Color(Coloration),
    Pain(Pain),
    Nutrition(Nutrition),
}

/// Everything logged for one calendar day
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DailyLog {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<Mood>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow: Option<Flow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Coloration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pain: Option<Pain>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nutrition: Option<Nutrition>,
}

impl DailyLog {
    /// Apply a single-field update
    pub fn update(&mut self, entry: LogEntry) {
        match entry {
            LogEntry::Mood(v) => self.mood = Some(v),
            LogEntry::Flow(v) => self.flow = Some(v),
            LogEntry::Color(v) => self.color = Some(v),
            LogEntry::Pain(v) => self.pain = Some(v),
            LogEntry::Nutrition(v) => self.nutrition = Some(v),
        }
    }

    /// Merge every field that is set in `other` into this log
    pub fn merge(&mut self, other: &DailyLog) {
        if other.mood.is_some() {
            self.mood = other.mood;
        }
        if other.flow.is_some() {
            self.flow = other.flow;
        }
        if other.color.is_some() {
            self.color = other.color;
        }
        if other.pain.is_some() {
            self.pain = other.pain;
        }
        if other.nutrition.is_some() {
            self.nutrition = other.nutrition;
        }
    }

    /// True when the day shows heavy flow or dark-red colouration
    pub fn is_heavy_or_dark(&self) -> bool {
        self.flow == Some(Flow::Heavy) || self.color == Some(Coloration::DarkRed)
    }

    pub fn is_empty(&self) -> bool {
        self == &DailyLog::default()
    }
}

// ============================================================================
// Sensor Types
// ============================================================================

/// The most recent sensor readings for the user
///
/// There is exactly one current snapshot; a new reading replaces it
/// wholesale.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SensorSnapshot {
    pub steps: u32,
    pub sleep_hours: f64,
    pub screen_time_hours: f64,
    pub temperature_c: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resting_hr: Option<f64>,
}

impl Default for SensorSnapshot {
    fn default() -> Self {
        Self {
            steps: 6000,
            sleep_hours: 7.0,
            screen_time_hours: 2.0,
            temperature_c: 36.6,
            resting_hr: None,
        }
    }
}

// ============================================================================
// Goal Types
// ============================================================================

/// Target for a goal: a single threshold or an inclusive range
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum GoalTarget {
    Value(f64),
    Range { min: f64, max: f64 },
}

impl GoalTarget {
    /// Whether `current` satisfies the target
    ///
    /// A single-value target is a threshold to reach; a range must contain
    /// the value.
    pub fn is_met(&self, current: f64) -> bool {
        match self {
            GoalTarget::Value(v) => current >= *v,
            GoalTarget::Range { min, max } => current >= *min && current <= *max,
        }
    }
}

/// A personal goal. `title` is the identity key within the fixed goal set.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Goal {
    pub title: String,
    pub target: GoalTarget,
    pub current: f64,
    pub unit: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

// ============================================================================
// Cycle Types
// ============================================================================

/// One of the four named sub-intervals of a cycle
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PhaseName {
    Menstrual,
    Follicular,
    Ovulatory,
    Luteal,
}

impl PhaseName {
    /// Phases in cycle order
    pub const ALL: [PhaseName; 4] = [
        PhaseName::Menstrual,
        PhaseName::Follicular,
        PhaseName::Ovulatory,
        PhaseName::Luteal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PhaseName::Menstrual => "menstrual",
            PhaseName::Follicular => "follicular",
            PhaseName::Ovulatory => "ovulatory",
            PhaseName::Luteal => "luteal",
        }
    }
}

/// A dated phase. `end` is inclusive.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CyclePhase {
    pub name: PhaseName,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub duration_days: u32,
}

impl CyclePhase {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// Coarse classification of how consistent historical cycle lengths are
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Regularity {
    VeryRegular,
    Regular,
    ModeratelyIrregular,
    Irregular,
    Unknown,
}

impl Regularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Regularity::VeryRegular => "very_regular",
            Regularity::Regular => "regular",
            Regularity::ModeratelyIrregular => "moderately_irregular",
            Regularity::Irregular => "irregular",
            Regularity::Unknown => "unknown",
        }
    }
}

/// Output of the cycle estimator
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CycleEstimate {
    pub average_cycle_length_days: u32,
    pub regularity: Regularity,
    /// Number of valid gaps the statistics were computed from
    pub cycles_observed: usize,
}

/// Inclusive date range most likely to include ovulation-adjacent fertility
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct FertileWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub ovulation_day: NaiveDate,
}

impl FertileWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

// ============================================================================
// Condition Risk Types
// ============================================================================

/// Conditions scored by the heuristic risk scorer, in output order
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Pain,
    Anemia,
    PcosLikeIrregularity,
    PregnancyWindow,
}

impl Condition {
    pub const ALL: [Condition; 4] = [
        Condition::Pain,
        Condition::Anemia,
        Condition::PcosLikeIrregularity,
        Condition::PregnancyWindow,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::Pain => "pain",
            Condition::Anemia => "anemia",
            Condition::PcosLikeIrregularity => "pcos_like_irregularity",
            Condition::PregnancyWindow => "pregnancy_window",
        }
    }
}

/// Heuristic (not diagnostic) probability for one condition
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ConditionRisk {
    pub condition: Condition,
    pub probability: f64,
    pub actionable: bool,
}

// ============================================================================
// Prediction Type
// ============================================================================

/// Derived cycle state. Recomputed on demand; has no identity of its own.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Predictions {
    pub next_period_start: Option<NaiveDate>,
    pub cycle_length_days: u32,
    pub regularity: Regularity,
    pub confidence: f64,
    pub phases: Vec<CyclePhase>,
    #[serde(default)]
    pub fertile_window: Option<FertileWindow>,
    #[serde(default)]
    pub conditions: Vec<ConditionRisk>,
}
