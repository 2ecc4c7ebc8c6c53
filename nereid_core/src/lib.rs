#![forbid(unsafe_code)]

//! Core domain model and inference logic for the Nereid cycle tracker.
//!
//! This crate provides:
//! - Domain types (daily logs, sensor readings, goals, phases, predictions)
//! - Period history and daily log storage
//! - Cycle estimation, phase prediction and forecasting
//! - Condition-risk scoring and goal personalization
//! - Insights, reminder plans and phase guidance
//! - Persistence (state file, CSV import) and the prediction store

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod input;
pub mod history;
pub mod estimator;
pub mod predictor;
pub mod risk;
pub mod goals;
pub mod insights;
pub mod engine;
pub mod store;
pub mod state;
pub mod import;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use history::{CycleHistory, DailyLogBook};
pub use estimator::estimate_cycle;
pub use predictor::{forecast_cycles, predict, CycleForecast, PhasePolicy};
pub use risk::score_conditions;
pub use goals::{default_goals, personalize};
pub use insights::{phase_guidance, Insights};
pub use engine::{recompute, InferenceEngine, InferenceOutput, InferenceSettings};
pub use store::{PredictionSource, PredictionStore};
pub use state::UserCycleState;
pub use import::{import_csv, ImportSummary};
