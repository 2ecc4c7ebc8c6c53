//! User state persistence with file locking.
//!
//! This module handles saving and loading the user's cycle history, logs,
//! readings, goals and last inference output, with proper file locking to
//! prevent concurrent access issues.

use crate::engine::{InferenceEngine, InferenceOutput};
use crate::goals::{default_goals, merge_goals};
use crate::store::PredictionStore;
use crate::{
    CycleHistory, DailyLogBook, Error, Goal, Predictions, Result, SensorSnapshot,
};
use chrono::NaiveDate;
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Everything persisted for one user
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UserCycleState {
    #[serde(default)]
    pub history: CycleHistory,

    #[serde(default)]
    pub logs: DailyLogBook,

    #[serde(default)]
    pub sensor: SensorSnapshot,

    /// Base goals before personalization
    #[serde(default = "default_goals")]
    pub goals: Vec<Goal>,

    #[serde(default)]
    pub store: PredictionStore,
}

impl Default for UserCycleState {
    fn default() -> Self {
        Self {
            history: CycleHistory::default(),
            logs: DailyLogBook::default(),
            sensor: SensorSnapshot::default(),
            goals: default_goals(),
            store: PredictionStore::default(),
        }
    }
}

impl UserCycleState {
    /// Recompute as of `today`, store the output locally and return it
    pub fn refresh(&mut self, engine: &InferenceEngine, today: NaiveDate) -> InferenceOutput {
        let output = engine.recompute_on(&self.history, &self.logs, &self.sensor, &self.goals, today);
        self.store.apply_local(output.clone());
        output
    }

    /// Apply server-produced predictions and/or goals
    ///
    /// Remote goals are merged by title into the stored output and into
    /// the base goals, so later local recomputes personalize from them.
    /// Nothing changes unless every part validates.
    pub fn apply_remote(
        &mut self,
        predictions: Option<Predictions>,
        goals: Option<Vec<Goal>>,
        received_on: NaiveDate,
    ) -> Result<()> {
        let mut store = self.store.clone();
        if let Some(predictions) = predictions {
            store.apply_remote(predictions, received_on)?;
        }
        if let Some(goals) = &goals {
            store.apply_remote_goals(goals)?;
        }

        self.store = store;
        if let Some(goals) = goals {
            merge_goals(&mut self.goals, &goals);
        }
        Ok(())
    }

    /// Load user state from a file with shared locking
    ///
    /// Returns default state if file doesn't exist.
    /// If file is corrupted, logs a warning and returns default state.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("No state file found, using default state");
            return Ok(Self::default());
        }

        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!(
                    "Unable to open state file {:?}: {}. Using defaults.",
                    path,
                    e
                );
                return Ok(Self::default());
            }
        };

        if let Err(e) = file.lock_shared() {
            tracing::warn!(
                "Unable to lock state file {:?}: {}. Using defaults.",
                path,
                e
            );
            return Ok(Self::default());
        }

        let mut contents = String::new();
        let mut reader = std::io::BufReader::new(&file);
        if let Err(e) = reader.read_to_string(&mut contents) {
            let _ = file.unlock();
            tracing::warn!(
                "Failed to read state file {:?}: {}. Using defaults.",
                path,
                e
            );
            return Ok(Self::default());
        }

        file.unlock()?;

        match serde_json::from_str::<UserCycleState>(&contents) {
            Ok(state) => {
                tracing::debug!(
                    "Loaded {} period starts and {} logs from {:?}",
                    state.history.len(),
                    state.logs.len(),
                    path
                );
                Ok(state)
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to parse state file {:?}: {}. Using defaults.",
                    path,
                    e
                );
                Ok(Self::default())
            }
        }
    }

    /// Save user state to a file with exclusive locking
    ///
    /// Writes to a temp file in the same directory, syncs it, then renames
    /// it over the original.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let temp = NamedTempFile::new_in(path.parent().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::Other, "state path missing parent")
        })?)?;

        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string(self)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved user state to {:?}", path);
        Ok(())
    }

    /// Load state, modify it, and save it back atomically
    pub fn update<F>(path: &Path, f: F) -> Result<Self>
    where
        F: FnOnce(&mut UserCycleState) -> Result<()>,
    {
        let mut state = Self::load(path)?;
        f(&mut state)?;
        state.save(path)?;
        Ok(state)
    }
}
