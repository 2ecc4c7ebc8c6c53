//! CSV import of period starts and daily logs.
//!
//! Expected header:
//!
//! ```text
//! date,period_start,flow,color,pain,mood,nutrition
//! ```
//!
//! Every column but `date` may be empty. Rows that fail to parse are
//! skipped with a warning instead of aborting the import.

use crate::input::{parse_date, parse_log_entry};
use crate::{CycleHistory, DailyLog, DailyLogBook, Error, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

/// One raw CSV row, before label parsing
#[derive(Debug, Deserialize)]
struct CsvRow {
    date: String,
    #[serde(default)]
    period_start: Option<String>,
    #[serde(default)]
    flow: Option<String>,
    #[serde(default)]
    color: Option<String>,
    #[serde(default)]
    pain: Option<String>,
    #[serde(default)]
    mood: Option<String>,
    #[serde(default)]
    nutrition: Option<String>,
}

impl CsvRow {
    fn parse(&self) -> Result<(NaiveDate, bool, DailyLog)> {
        let date = parse_date(&self.date)?;
        let period_start = match &self.period_start {
            Some(flag) => parse_flag(flag)?,
            None => false,
        };

        let mut log = DailyLog::default();
        for (field, value) in [
            ("flow", &self.flow),
            ("color", &self.color),
            ("pain", &self.pain),
            ("mood", &self.mood),
            ("nutrition", &self.nutrition),
        ] {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                log.update(parse_log_entry(field, value)?);
            }
        }

        Ok((date, period_start, log))
    }
}

fn parse_flag(s: &str) -> Result<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "" | "0" | "false" | "no" | "n" => Ok(false),
        "1" | "true" | "yes" | "y" => Ok(true),
        other => Err(Error::InvalidInput(format!(
            "period_start must be true/false, got {:?}",
            other
        ))),
    }
}

/// Result of one CSV import
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ImportSummary {
    pub history: CycleHistory,
    pub logs: DailyLogBook,
    pub rows_imported: usize,
    pub rows_skipped: usize,
}

impl ImportSummary {
    /// Merge imported period starts and logs into existing data
    ///
    /// Imported starts are added, never toggled off. Imported log fields
    /// overwrite the same fields already logged for that day.
    pub fn merge_into(&self, history: &mut CycleHistory, logs: &mut DailyLogBook) {
        for date in self.history.iter() {
            history.add(*date);
        }
        for (date, log) in self.logs.iter() {
            logs.merge(*date, log);
        }
    }
}

/// Import a CSV file from disk
pub fn import_csv(path: &Path) -> Result<ImportSummary> {
    let file = std::fs::File::open(path)?;
    let summary = import_reader(file)?;
    tracing::info!(
        "Imported {} rows from {:?} ({} skipped)",
        summary.rows_imported,
        path,
        summary.rows_skipped
    );
    Ok(summary)
}

/// Import CSV data from any reader
pub fn import_reader<R: Read>(reader: R) -> Result<ImportSummary> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut summary = ImportSummary::default();

    for (index, result) in reader.deserialize::<CsvRow>().enumerate() {
        // Header is line 1
        let line = index + 2;

        let parsed = result.map_err(Error::from).and_then(|row| row.parse());
        match parsed {
            Ok((date, period_start, log)) => {
                if period_start {
                    summary.history.add(date);
                }
                summary.logs.merge(date, &log);
                summary.rows_imported += 1;
            }
            Err(e) => {
                tracing::warn!("Skipping CSV line {}: {}", line, e);
                summary.rows_skipped += 1;
            }
        }
    }

    Ok(summary)
}
