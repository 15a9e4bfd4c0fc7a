//! `dclmic_io_sql` v1:
//! Load polars DataFrames into SQL Server tables and promote them to spatial tables.
//!
//! Module layout:
//! - `conf`    : default names, bounding box and option factories
//! - `spec`    : cursor seam, options and errors
//! - `report`  : load / spatial report models
//! - `util`    : name normalization, value rendering, statement builders
//! - `loader`  : row-by-row bulk loader
//! - `spatial` : geometry column, identity key and spatial index steps
pub mod conf;
pub mod loader;
pub mod report;
pub mod spatial;
pub mod spec;
pub mod util;

pub use dclmic_io::{EnumRunOutcome, SpecStepError};
pub use loader::upload_dataframe;
pub use report::{ReportSpatial, ReportSqlLoad};
pub use spatial::{EnumSpatialStep, promote_table_spatial};
pub use spec::{
    SpecBoundingBox, SpecRowError, SpecSpatialOptions, SpecSqlLoadOptions, SpecSqlTarget,
    SqlCursor, SqlLoadError,
};
pub use util::{ColumnNameNormalizer, derive_qualified_name, derive_text_value, normalize_column_name};
