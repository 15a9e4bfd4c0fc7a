//! SQL loader constants and default option factories.

use crate::spec::{SpecBoundingBox, SpecSpatialOptions, SpecSqlLoadOptions, SpecSqlTarget};

/// Default database name prefixed to qualified table names.
pub const C_SQL_DATABASE_DEFAULT: &str = "LMDW";
/// Default schema.
pub const C_SQL_SCHEMA_DEFAULT: &str = "dbo";
/// Default destination table.
pub const C_SQL_TABLE_NAME_DEFAULT: &str = "test__";
/// Column type used for every loaded column.
pub const C_SQL_COLUMN_TYPE: &str = "[VARCHAR](MAX) NOT NULL";
/// Bulk-load progress is logged every this many rows.
pub const N_ROWS_PROGRESS_DEFAULT: usize = 50;

/// Column holding well-known-text geometry.
pub const C_WKT_COLUMN_DEFAULT: &str = "geom_wkt";
/// Target coordinate reference system (SRID).
pub const N_CRS_DEFAULT: u32 = 4326;
/// Computed geometry column added by the spatial promoter.
pub const C_GEOMETRY_COLUMN_DEFAULT: &str = "geom";
/// Surrogate identity key added by the spatial promoter.
pub const C_KEY_COLUMN_DEFAULT: &str = "PKEY_IDX";

/// Build the default destination.
pub fn derive_default_sql_target() -> SpecSqlTarget {
    SpecSqlTarget {
        database: Some(C_SQL_DATABASE_DEFAULT.to_string()),
        schema: C_SQL_SCHEMA_DEFAULT.to_string(),
        table_name: C_SQL_TABLE_NAME_DEFAULT.to_string(),
    }
}

/// Build default bulk-load options.
pub fn derive_default_sql_load_options() -> SpecSqlLoadOptions {
    SpecSqlLoadOptions {
        if_drop: true,
        n_rows_progress: N_ROWS_PROGRESS_DEFAULT,
    }
}

/// Default spatial index region (north Texas).
pub fn derive_default_bounding_box() -> SpecBoundingBox {
    SpecBoundingBox {
        xmin: -99.0,
        ymin: 32.0,
        xmax: -96.0,
        ymax: 33.0,
    }
}

/// Build default spatial promotion options.
pub fn derive_default_spatial_options() -> SpecSpatialOptions {
    SpecSpatialOptions {
        wkt_column: C_WKT_COLUMN_DEFAULT.to_string(),
        crs: N_CRS_DEFAULT,
        geometry_column: C_GEOMETRY_COLUMN_DEFAULT.to_string(),
        key_column: C_KEY_COLUMN_DEFAULT.to_string(),
        bounding_box: derive_default_bounding_box(),
    }
}
