//! Data-driven execution: one independent run per input row.
//!
//! # Design
//! `run_cases` calls the case body once per row and records each row's
//! outcome separately. A failing or panicking row never prevents the
//! following rows from running; the report is turned into a single
//! `Result` only at the end, listing every row that failed.

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};

use serde::de::DeserializeOwned;

use crate::error::Error;

/// Why a single row failed.
#[derive(Debug, thiserror::Error)]
pub enum CaseError {
    #[error(transparent)]
    Failed(#[from] Error),

    #[error("panicked: {0}")]
    Panicked(String),
}

#[derive(Debug)]
pub struct CaseOutcome {
    pub index: usize,
    /// `Debug` rendering of the row.
    pub label: String,
    pub result: Result<(), CaseError>,
}

impl CaseOutcome {
    pub fn passed(&self) -> bool {
        self.result.is_ok()
    }
}

#[derive(Debug)]
pub struct CaseReport {
    outcomes: Vec<CaseOutcome>,
}

impl CaseReport {
    pub fn outcomes(&self) -> &[CaseOutcome] {
        &self.outcomes
    }

    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.passed()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.passed()
    }

    /// `Ok` when every row passed, otherwise every failed row.
    pub fn into_result(self) -> Result<(), CaseFailures> {
        let total = self.outcomes.len();
        let failures: Vec<CaseOutcome> = self.outcomes.into_iter().filter(|o| !o.passed()).collect();
        if failures.is_empty() {
            Ok(())
        } else {
            Err(CaseFailures { total, failures })
        }
    }
}

/// Every failed row of a data-driven run.
#[derive(Debug, thiserror::Error)]
#[error("{} of {total} cases failed{}", .failures.len(), render_failures(.failures))]
pub struct CaseFailures {
    pub total: usize,
    pub failures: Vec<CaseOutcome>,
}

fn render_failures(failures: &[CaseOutcome]) -> String {
    failures
        .iter()
        .filter_map(|outcome| {
            let e = outcome.result.as_ref().err()?;
            Some(format!("\n  [{}] {}: {e}", outcome.index, outcome.label))
        })
        .collect()
}

/// Run `case` once per row.
pub fn run_cases<R, F>(rows: &[R], mut case: F) -> CaseReport
where
    R: fmt::Debug,
    F: FnMut(&R) -> Result<(), Error>,
{
    let outcomes = rows
        .iter()
        .enumerate()
        .map(|(index, row)| {
            let label = format!("{row:?}");
            let result = match catch_unwind(AssertUnwindSafe(|| case(row))) {
                Ok(Ok(())) => Ok(()),
                Ok(Err(e)) => Err(CaseError::Failed(e)),
                Err(payload) => Err(CaseError::Panicked(panic_message(payload.as_ref()))),
            };
            match &result {
                Ok(()) => tracing::debug!(index, %label, "case passed"),
                Err(e) => tracing::debug!(index, %label, error = %e, "case failed"),
            }
            CaseOutcome {
                index,
                label,
                result,
            }
        })
        .collect();
    CaseReport { outcomes }
}

/// Deserialize a JSON array of rows.
pub fn load_rows<T: DeserializeOwned>(json: &str) -> Result<Vec<T>, serde_json::Error> {
    serde_json::from_str(json)
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
