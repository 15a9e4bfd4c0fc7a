//! Row-by-row bulk loader.

use log::{info, warn};
use polars::prelude::DataFrame;

use crate::report::ReportSqlLoad;
use crate::spec::{SpecRowError, SpecSqlLoadOptions, SpecSqlTarget, SqlCursor, SqlLoadError};
use crate::util::{
    ColumnNameNormalizer, build_create_table_sql, build_drop_table_sql, build_insert_sql,
    derive_qualified_name, derive_text_value,
};

/// Load `df` into `target`, one parameterized insert per row.
///
/// Validation failures return `Err` before any statement runs. After that
/// the call is best-effort: drop and create are each attempted and committed
/// independently, a failing row is recorded and skipped, and one final commit
/// follows the last row. Nothing is rolled back.
pub fn upload_dataframe<C>(
    cursor: &mut C,
    df: &DataFrame,
    target: &SpecSqlTarget,
    options: &SpecSqlLoadOptions,
) -> Result<ReportSqlLoad, SqlLoadError>
where
    C: SqlCursor + ?Sized,
{
    validate_load_inputs(df, target, options)?;

    let normalizer = ColumnNameNormalizer::new()?;
    let l_col_names =
        normalizer.normalize_all(df.get_columns().iter().map(|col| col.name().as_str()))?;

    let c_qualified = derive_qualified_name(target);
    let mut report = ReportSqlLoad {
        table_qualified: c_qualified.clone(),
        cnt_rows_total: df.height(),
        ..Default::default()
    };

    info!("Writing DataFrame into sql table {c_qualified}.");

    if options.if_drop {
        match execute_and_commit(cursor, &build_drop_table_sql(target)) {
            Ok(()) => {
                report.if_table_dropped = true;
                info!("Dropped {c_qualified}.");
            }
            Err(err) => {
                warn!("Could not drop {c_qualified}: {err}");
                report.warnings.push(format!("drop_table: {err}"));
            }
        }

        match execute_and_commit(cursor, &build_create_table_sql(target, &l_col_names)) {
            Ok(()) => {
                report.if_table_created = true;
                info!("Created {c_qualified}.");
            }
            Err(err) => {
                warn!("Could not create {c_qualified}: {err}");
                report.warnings.push(format!("create_table: {err}"));
            }
        }
    }

    let c_insert_sql = build_insert_sql(target, &l_col_names);
    let n_rows = df.height();
    info!("Writing in {n_rows} rows.");

    for n_idx_row in 0..n_rows {
        if n_idx_row % options.n_rows_progress == 0 {
            info!("{n_idx_row} out of {n_rows}");
        }

        let l_params = df
            .get_columns()
            .iter()
            .map(|column| column.get(n_idx_row).map(|val| derive_text_value(&val)))
            .collect::<Result<Vec<_>, _>>()?;

        match cursor.execute(&c_insert_sql, &l_params) {
            Ok(()) => report.cnt_rows_inserted += 1,
            Err(err) => {
                warn!("Could not upload row {n_idx_row}: {err}");
                report.cnt_rows_failed += 1;
                report.errors.push(SpecRowError {
                    row_idx: n_idx_row,
                    exception: err,
                });
            }
        }
    }

    match cursor.commit() {
        Ok(()) => report.if_committed = true,
        Err(err) => {
            warn!("Final commit on {c_qualified} failed: {err}");
            report.warnings.push(format!("commit: {err}"));
        }
    }

    info!("{report}");
    Ok(report)
}

fn validate_load_inputs(
    df: &DataFrame,
    target: &SpecSqlTarget,
    options: &SpecSqlLoadOptions,
) -> Result<(), SqlLoadError> {
    if target.table_name.trim().is_empty() {
        return Err(SqlLoadError::InvalidOptions(
            "table_name must not be empty.".to_string(),
        ));
    }
    if target.schema.trim().is_empty() {
        return Err(SqlLoadError::InvalidOptions(
            "schema must not be empty.".to_string(),
        ));
    }
    if options.n_rows_progress == 0 {
        return Err(SqlLoadError::InvalidOptions(
            "n_rows_progress must be at least 1.".to_string(),
        ));
    }
    if df.width() == 0 {
        return Err(SqlLoadError::NoColumns);
    }
    Ok(())
}

pub(crate) fn execute_and_commit<C>(cursor: &mut C, sql: &str) -> Result<(), String>
where
    C: SqlCursor + ?Sized,
{
    cursor.execute(sql, &[])?;
    cursor.commit()
}
