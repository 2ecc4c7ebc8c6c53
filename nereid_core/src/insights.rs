//! Insights, reminder plans and UI emphasis derived from predictions.
//!
//! This layer turns the numeric outputs into things the presentation layer
//! can show: short cycle insights, a daily reminder plan, which areas to
//! put in focus, and phase-specific activity and nutrition guidance.

use crate::config::NotificationConfig;
use crate::{Condition, PhaseName, Predictions, Regularity, SensorSnapshot};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

const ANEMIA_ALERT_PROBABILITY: f64 = 0.15;
const RECOMMENDED_SLEEP_HOURS: f64 = 7.0;
const RECOMMENDED_STEPS: u32 = 8000;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    Warning,
    Alert,
    Recommendation,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CycleInsight {
    pub kind: InsightKind,
    pub title: String,
    pub message: String,
    pub priority: Priority,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReminderCategory {
    CycleTracking,
    HealthCheckin,
    Wellbeing,
}

/// A reminder the delivery layer should schedule. Times are `HH:MM`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ReminderPlan {
    pub category: ReminderCategory,
    pub title: String,
    pub body: String,
    pub time: String,
    pub daily: bool,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FocusArea {
    CycleTracking,
    SleepTracking,
    ActivityTracking,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    #[default]
    Normal,
    High,
}

/// Which parts of the UI to emphasise
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct UiEmphasis {
    pub focus_areas: Vec<FocusArea>,
    pub urgency: Urgency,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Intensity {
    Low,
    Moderate,
    High,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ActivityGuidance {
    pub intensity: Intensity,
    pub duration: String,
    pub activities: String,
    pub reason: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PhaseGuidance {
    pub phase: PhaseName,
    pub activity: ActivityGuidance,
    pub nutrition: Vec<String>,
}

/// Everything this layer derives for one recompute
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Insights {
    pub current_phase: Option<PhaseName>,
    pub day_of_cycle: Option<u32>,
    pub fertile_today: bool,
    pub cycle_insights: Vec<CycleInsight>,
    pub reminders: Vec<ReminderPlan>,
    pub ui_emphasis: UiEmphasis,
    pub guidance: Option<PhaseGuidance>,
}

/// Derive insights for `today`
///
/// `predictions` should already carry condition risks.
pub fn derive(
    predictions: &Predictions,
    sensor: &SensorSnapshot,
    today: NaiveDate,
    schedule: &NotificationConfig,
) -> Insights {
    let cycle_insights = cycle_insights(predictions, sensor);
    let reminders = reminder_plan(&cycle_insights, schedule);
    let ui_emphasis = ui_emphasis(&cycle_insights);

    let current_phase = predictions.phase_on(today).map(|p| p.name);

    Insights {
        current_phase,
        day_of_cycle: current_phase.and_then(|_| predictions.day_of_cycle(today)),
        fertile_today: predictions.is_fertile_on(today),
        cycle_insights,
        reminders,
        ui_emphasis,
        guidance: current_phase.map(phase_guidance),
    }
}

/// Rule-based insights, highest priority first
pub fn cycle_insights(predictions: &Predictions, sensor: &SensorSnapshot) -> Vec<CycleInsight> {
    let mut insights = Vec::new();

    if predictions.regularity == Regularity::Irregular {
        insights.push(CycleInsight {
            kind: InsightKind::Warning,
            title: "Irregular Cycle Pattern".into(),
            message: "Your cycle shows irregular patterns. Consider tracking additional \
                      factors like stress, sleep, and nutrition."
                .into(),
            priority: Priority::High,
        });
    }

    let anemia = predictions
        .conditions
        .iter()
        .find(|c| c.condition == Condition::Anemia)
        .map(|c| c.probability)
        .unwrap_or(0.0);
    if anemia >= ANEMIA_ALERT_PROBABILITY {
        insights.push(CycleInsight {
            kind: InsightKind::Alert,
            title: "Frequent Heavy Flow".into(),
            message: "Several recent days show heavy or dark flow. Stay hydrated, favour \
                      iron-rich foods, and consider checking in with a healthcare provider."
                .into(),
            priority: Priority::High,
        });
    }

    if sensor.sleep_hours < RECOMMENDED_SLEEP_HOURS {
        insights.push(CycleInsight {
            kind: InsightKind::Recommendation,
            title: "Sleep Optimization".into(),
            message: "Your sleep is below recommended levels. This may impact cycle \
                      regularity and overall health."
                .into(),
            priority: Priority::Medium,
        });
    }

    if sensor.steps < RECOMMENDED_STEPS {
        insights.push(CycleInsight {
            kind: InsightKind::Recommendation,
            title: "Increase Daily Activity".into(),
            message: "Aim for at least 8,000 steps daily to support hormonal balance and \
                      overall health."
                .into(),
            priority: Priority::Low,
        });
    }

    insights.sort_by(|a, b| b.priority.cmp(&a.priority));
    insights
}

/// Daily reminder plan: tracking and check-in always, wellbeing when a
/// high-priority insight exists
pub fn reminder_plan(insights: &[CycleInsight], schedule: &NotificationConfig) -> Vec<ReminderPlan> {
    let mut reminders = vec![
        ReminderPlan {
            category: ReminderCategory::CycleTracking,
            title: "Track Your Cycle".into(),
            body: "Log your symptoms and observations for better predictions".into(),
            time: schedule.tracking_reminder.clone(),
            daily: true,
        },
        ReminderPlan {
            category: ReminderCategory::HealthCheckin,
            title: "Health Check-in".into(),
            body: "How are you feeling today?".into(),
            time: schedule.checkin_reminder.clone(),
            daily: true,
        },
    ];

    if let Some(top) = insights.iter().find(|i| i.priority == Priority::High) {
        reminders.push(ReminderPlan {
            category: ReminderCategory::Wellbeing,
            title: top.title.clone(),
            body: top.message.clone(),
            time: schedule.wellbeing_reminder.clone(),
            daily: true,
        });
    }

    reminders
}

fn ui_emphasis(insights: &[CycleInsight]) -> UiEmphasis {
    let mut emphasis = UiEmphasis::default();

    if insights.iter().any(|i| i.priority == Priority::High) {
        emphasis.focus_areas.push(FocusArea::CycleTracking);
        emphasis.urgency = Urgency::High;
    }
    if insights.iter().any(|i| i.title == "Sleep Optimization") {
        emphasis.focus_areas.push(FocusArea::SleepTracking);
    }
    if insights.iter().any(|i| i.title == "Increase Daily Activity") {
        emphasis.focus_areas.push(FocusArea::ActivityTracking);
    }

    emphasis
}

/// Activity and nutrition guidance for a phase
pub fn phase_guidance(phase: PhaseName) -> PhaseGuidance {
    let (activity, nutrition) = match phase {
        PhaseName::Menstrual => (
            activity(
                Intensity::Low,
                "20-30 minutes",
                "gentle yoga, walking, swimming",
                "Lower energy levels and potential discomfort",
            ),
            vec![
                "Increase iron-rich foods",
                "Stay hydrated (2.5L water)",
                "Consider magnesium supplements",
            ],
        ),
        PhaseName::Follicular => (
            activity(
                Intensity::Moderate,
                "30-45 minutes",
                "strength training, cardio",
                "Rising energy levels and improved performance",
            ),
            vec![
                "Focus on protein for muscle building",
                "Include complex carbohydrates",
            ],
        ),
        PhaseName::Ovulatory => (
            activity(
                Intensity::High,
                "45-60 minutes",
                "high-intensity training, sports",
                "Peak energy and performance capabilities",
            ),
            vec!["Maximize protein intake", "Include healthy fats"],
        ),
        PhaseName::Luteal => (
            activity(
                Intensity::Moderate,
                "30-40 minutes",
                "moderate cardio, yoga, pilates",
                "Gradually decreasing energy, focus on maintenance",
            ),
            vec![
                "Stabilize blood sugar with complex carbs",
                "Reduce caffeine if experiencing anxiety",
            ],
        ),
    };

    PhaseGuidance {
        phase,
        activity,
        nutrition: nutrition.into_iter().map(String::from).collect(),
    }
}

fn activity(intensity: Intensity, duration: &str, activities: &str, reason: &str) -> ActivityGuidance {
    ActivityGuidance {
        intensity,
        duration: duration.into(),
        activities: activities.into(),
        reason: reason.into(),
    }
}
