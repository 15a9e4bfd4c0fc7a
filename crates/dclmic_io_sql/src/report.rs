//! Bulk-load and spatial promotion report models.

use std::collections::BTreeMap;
use std::fmt;

use dclmic_io::{EnumRunOutcome, SpecStepError, derive_run_outcome};

use crate::spec::SpecRowError;

/// Counters and diagnostics for one `upload_dataframe` run.
#[derive(Debug, Default, Clone)]
pub struct ReportSqlLoad {
    /// Qualified destination name.
    pub table_qualified: String,
    /// Rows in the source dataframe.
    pub cnt_rows_total: usize,
    /// Rows whose insert statement succeeded.
    pub cnt_rows_inserted: usize,
    /// Rows whose insert statement failed.
    pub cnt_rows_failed: usize,
    /// Drop statement and its commit succeeded.
    pub if_table_dropped: bool,
    /// Create statement and its commit succeeded.
    pub if_table_created: bool,
    /// Final commit succeeded.
    pub if_committed: bool,
    /// Non-fatal warnings (failed DDL steps).
    pub warnings: Vec<String>,
    /// Per-row failures.
    pub errors: Vec<SpecRowError>,
}

impl ReportSqlLoad {
    /// Number of failed rows.
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Number of collected warnings.
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// Classify the run. A failed final commit loses every insert.
    pub fn outcome(&self) -> EnumRunOutcome {
        if self.cnt_rows_total == 0 {
            return derive_run_outcome(0, self.warning_count(), !self.if_committed);
        }
        derive_run_outcome(
            self.cnt_rows_inserted,
            self.cnt_rows_failed,
            !self.if_committed,
        )
    }

    /// Machine-readable counters.
    pub fn to_dict(&self) -> BTreeMap<String, u64> {
        let mut dict_counts = BTreeMap::new();
        dict_counts.insert("cnt_rows_total".to_string(), self.cnt_rows_total as u64);
        dict_counts.insert(
            "cnt_rows_inserted".to_string(),
            self.cnt_rows_inserted as u64,
        );
        dict_counts.insert("cnt_rows_failed".to_string(), self.cnt_rows_failed as u64);
        dict_counts.insert("cnt_errors".to_string(), self.error_count() as u64);
        dict_counts.insert("cnt_warnings".to_string(), self.warning_count() as u64);
        dict_counts
    }

    /// Human-readable one-line summary.
    pub fn format(&self, prefix: &str) -> String {
        format!(
            "{prefix} table={} total={} inserted={} failed={} warnings={} outcome={}",
            self.table_qualified,
            self.cnt_rows_total,
            self.cnt_rows_inserted,
            self.cnt_rows_failed,
            self.warning_count(),
            self.outcome()
        )
    }
}

impl fmt::Display for ReportSqlLoad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format("[SQL]"))
    }
}

/// Step results of one `promote_table_spatial` run.
#[derive(Debug, Default, Clone)]
pub struct ReportSpatial {
    /// Qualified table name.
    pub table_qualified: String,
    /// Labels of steps that executed and committed.
    pub steps_completed: Vec<String>,
    /// Failed steps.
    pub errors: Vec<SpecStepError>,
}

impl ReportSpatial {
    /// Number of failed steps.
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Classify the run.
    pub fn outcome(&self) -> EnumRunOutcome {
        derive_run_outcome(self.steps_completed.len(), self.error_count(), false)
    }

    /// Human-readable one-line summary.
    pub fn format(&self, prefix: &str) -> String {
        format!(
            "{prefix} table={} completed={} errors={} outcome={}",
            self.table_qualified,
            self.steps_completed.len(),
            self.error_count(),
            self.outcome()
        )
    }
}

impl fmt::Display for ReportSpatial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format("[SPATIAL]"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_sql_load_summary() {
        let report = ReportSqlLoad {
            table_qualified: "[LMDW].[dbo].[t]".to_string(),
            cnt_rows_total: 10,
            cnt_rows_inserted: 9,
            cnt_rows_failed: 1,
            if_table_dropped: true,
            if_table_created: true,
            if_committed: true,
            warnings: vec![],
            errors: vec![SpecRowError {
                row_idx: 5,
                exception: "boom".to_string(),
            }],
        };

        assert_eq!(report.outcome(), EnumRunOutcome::Partial);
        assert_eq!(report.to_dict()["cnt_rows_failed"], 1);
        assert_eq!(
            report.to_string(),
            "[SQL] table=[LMDW].[dbo].[t] total=10 inserted=9 failed=1 warnings=0 outcome=partial"
        );
    }

    #[test]
    fn test_report_sql_load_uncommitted_is_failed() {
        let report = ReportSqlLoad {
            cnt_rows_total: 2,
            cnt_rows_inserted: 2,
            if_committed: false,
            ..Default::default()
        };
        assert_eq!(report.outcome(), EnumRunOutcome::Failed);
    }

    #[test]
    fn test_report_spatial_outcome() {
        let mut report = ReportSpatial {
            steps_completed: vec!["add_geometry_column".to_string()],
            ..Default::default()
        };
        assert_eq!(report.outcome(), EnumRunOutcome::Success);

        report.errors.push(SpecStepError {
            step: "add_primary_key".to_string(),
            exception: "exists".to_string(),
        });
        assert_eq!(report.outcome(), EnumRunOutcome::Partial);
    }
}
