//! SQL cursor seam, load/spatial options and errors.

use std::fmt;

use polars::prelude::PolarsError;
use thiserror::Error;

use crate::conf::{
    derive_default_bounding_box, derive_default_spatial_options, derive_default_sql_load_options,
    derive_default_sql_target,
};

////////////////////////////////////////////////////////////////////////////////
// #region CursorSeam

/// Minimal database cursor used by the loader and the spatial promoter.
///
/// Implementations wrap a live connection owned exclusively by the caller for
/// the duration of one call. Statement placeholders are `?`.
pub trait SqlCursor {
    /// Execute one statement with positional text parameters.
    fn execute(&mut self, sql: &str, params: &[String]) -> Result<(), String>;

    /// Commit the current transaction.
    fn commit(&mut self) -> Result<(), String>;
}

impl<T: SqlCursor + ?Sized> SqlCursor for &mut T {
    fn execute(&mut self, sql: &str, params: &[String]) -> Result<(), String> {
        (**self).execute(sql, params)
    }

    fn commit(&mut self) -> Result<(), String> {
        (**self).commit()
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Options

/// Destination table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecSqlTarget {
    /// Database prefix; `None` uses the connection's current database.
    pub database: Option<String>,
    /// Schema name.
    pub schema: String,
    /// Table name.
    pub table_name: String,
}

impl Default for SpecSqlTarget {
    fn default() -> Self {
        derive_default_sql_target()
    }
}

/// Options for [`crate::loader::upload_dataframe`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecSqlLoadOptions {
    /// Drop and recreate the destination table before inserting.
    pub if_drop: bool,
    /// Log progress every this many rows. Must be at least 1.
    pub n_rows_progress: usize,
}

impl Default for SpecSqlLoadOptions {
    fn default() -> Self {
        derive_default_sql_load_options()
    }
}

/// Spatial index region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpecBoundingBox {
    /// West edge (longitude).
    pub xmin: f64,
    /// South edge (latitude).
    pub ymin: f64,
    /// East edge (longitude).
    pub xmax: f64,
    /// North edge (latitude).
    pub ymax: f64,
}

impl Default for SpecBoundingBox {
    fn default() -> Self {
        derive_default_bounding_box()
    }
}

impl fmt::Display for SpecBoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "xmin={}, ymin={}, xmax={}, ymax={}",
            self.xmin, self.ymin, self.xmax, self.ymax
        )
    }
}

/// Options for [`crate::spatial::promote_table_spatial`].
#[derive(Debug, Clone, PartialEq)]
pub struct SpecSpatialOptions {
    /// Column holding well-known-text geometry.
    pub wkt_column: String,
    /// Target SRID.
    pub crs: u32,
    /// Name of the computed geometry column.
    pub geometry_column: String,
    /// Name of the identity primary key column.
    pub key_column: String,
    /// Spatial index region.
    pub bounding_box: SpecBoundingBox,
}

impl Default for SpecSpatialOptions {
    fn default() -> Self {
        derive_default_spatial_options()
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// One failed row insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecRowError {
    /// Zero-based row index in the source dataframe.
    pub row_idx: usize,
    /// Cursor error text.
    pub exception: String,
}

/// "Top-level call failed" errors (validation / setup stage).
#[derive(Debug, Error)]
pub enum SqlLoadError {
    /// Target or options are unusable.
    #[error("{0}")]
    InvalidOptions(String),
    /// Dataframe has no columns.
    #[error("Cannot load a dataframe without columns.")]
    NoColumns,
    /// Two source columns normalize to the same SQL name.
    #[error("Columns {col_first:?} and {col_second:?} both normalize to {normalized:?}")]
    DuplicateColumnName {
        /// Normalized name.
        normalized: String,
        /// First source column.
        col_first: String,
        /// Second source column.
        col_second: String,
    },
    /// A source column normalizes to an empty name.
    #[error("Column {0:?} has no usable characters after normalization")]
    EmptyColumnName(String),
    /// Column name pattern failed to compile.
    #[error("Invalid column name pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
    /// Underlying dataframe access failure.
    #[error("dataframe error: {0}")]
    Polars(#[from] PolarsError),
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
