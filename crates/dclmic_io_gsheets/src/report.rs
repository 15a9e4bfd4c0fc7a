//! Publish report model.

use std::fmt;

use dclmic_io::{EnumRunOutcome, SpecStepError};

/// Step results of one `publish_dataframe` run.
#[derive(Debug, Default, Clone)]
pub struct ReportPublish {
    /// Labels of steps that succeeded, in order.
    pub steps_completed: Vec<String>,
    /// Spreadsheet id reported by the values update.
    pub spreadsheet_id: Option<String>,
    /// Sheet title written to.
    pub sheet_title: Option<String>,
    /// Rows reported by the values update (header included).
    pub updated_rows: u64,
    /// Whether the run stopped before the values update.
    pub if_aborted: bool,
    /// Non-fatal notes (fallback sheet creation).
    pub warnings: Vec<String>,
    /// Failed steps.
    pub errors: Vec<SpecStepError>,
}

impl ReportPublish {
    /// Number of failed steps.
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Number of non-fatal notes.
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// `Failed` when the values never landed, `Partial` when a best-effort
    /// step (share, clear) failed.
    pub fn outcome(&self) -> EnumRunOutcome {
        if self.if_aborted || self.spreadsheet_id.is_none() {
            return EnumRunOutcome::Failed;
        }
        if self.errors.is_empty() {
            EnumRunOutcome::Success
        } else {
            EnumRunOutcome::Partial
        }
    }

    pub(crate) fn add_step(&mut self, step: &str) {
        self.steps_completed.push(step.to_string());
    }

    pub(crate) fn add_error(&mut self, step: &str, exception: String) {
        self.errors.push(SpecStepError {
            step: step.to_string(),
            exception,
        });
    }

    /// Human-readable one-line summary.
    pub fn format(&self, prefix: &str) -> String {
        format!(
            "{prefix} spreadsheet={} rows={} steps={} errors={} warnings={} outcome={}",
            self.spreadsheet_id.as_deref().unwrap_or("-"),
            self.updated_rows,
            self.steps_completed.len(),
            self.error_count(),
            self.warning_count(),
            self.outcome()
        )
    }
}

impl fmt::Display for ReportPublish {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format("[GSHEETS]"))
    }
}
