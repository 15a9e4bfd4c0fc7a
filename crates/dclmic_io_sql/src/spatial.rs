//! Spatial promotion of a loaded table.

use log::{info, warn};

use dclmic_io::SpecStepError;

use crate::loader::execute_and_commit;
use crate::report::ReportSpatial;
use crate::spec::{SpecSpatialOptions, SpecSqlTarget, SqlCursor, SqlLoadError};
use crate::util::{
    build_add_geometry_column_sql, build_add_identity_column_sql, build_add_primary_key_sql,
    build_create_spatial_index_sql, derive_qualified_name,
};

/// One DDL step of [`promote_table_spatial`], in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumSpatialStep {
    /// Persisted computed geometry column from the WKT column.
    AddGeometryColumn,
    /// Integer identity column.
    AddIdentityColumn,
    /// Clustered primary key on the identity column.
    AddPrimaryKey,
    /// Spatial index over the configured bounding box.
    CreateSpatialIndex,
}

impl EnumSpatialStep {
    /// Every step, in execution order.
    pub fn all() -> [EnumSpatialStep; 4] {
        [
            Self::AddGeometryColumn,
            Self::AddIdentityColumn,
            Self::AddPrimaryKey,
            Self::CreateSpatialIndex,
        ]
    }

    /// Label used in logs and report errors.
    pub fn name(self) -> &'static str {
        match self {
            Self::AddGeometryColumn => "add_geometry_column",
            Self::AddIdentityColumn => "add_identity_column",
            Self::AddPrimaryKey => "add_primary_key",
            Self::CreateSpatialIndex => "create_spatial_index",
        }
    }

    fn build_sql(self, target: &SpecSqlTarget, options: &SpecSpatialOptions) -> String {
        match self {
            Self::AddGeometryColumn => build_add_geometry_column_sql(target, options),
            Self::AddIdentityColumn => build_add_identity_column_sql(target, options),
            Self::AddPrimaryKey => build_add_primary_key_sql(target, options),
            Self::CreateSpatialIndex => build_create_spatial_index_sql(target, options),
        }
    }
}

/// Add a geometry column, an identity primary key and a spatial index.
///
/// Every step runs and commits on its own; a failed step is recorded and the
/// next step is still attempted.
pub fn promote_table_spatial<C>(
    cursor: &mut C,
    target: &SpecSqlTarget,
    options: &SpecSpatialOptions,
) -> Result<ReportSpatial, SqlLoadError>
where
    C: SqlCursor + ?Sized,
{
    validate_spatial_inputs(target, options)?;

    let c_qualified = derive_qualified_name(target);
    let mut report = ReportSpatial {
        table_qualified: c_qualified.clone(),
        ..Default::default()
    };
    info!("Making {c_qualified} spatial and adding spatial index.");

    for step in EnumSpatialStep::all() {
        info!("[SPATIAL] {}...", step.name());
        match execute_and_commit(cursor, &step.build_sql(target, options)) {
            Ok(()) => report.steps_completed.push(step.name().to_string()),
            Err(err) => {
                warn!("[SPATIAL] {} failed on {c_qualified}: {err}", step.name());
                report.errors.push(SpecStepError {
                    step: step.name().to_string(),
                    exception: err,
                });
            }
        }
    }

    info!("{report}");
    Ok(report)
}

fn validate_spatial_inputs(
    target: &SpecSqlTarget,
    options: &SpecSpatialOptions,
) -> Result<(), SqlLoadError> {
    for (c_field, c_value) in [
        ("table_name", target.table_name.as_str()),
        ("schema", target.schema.as_str()),
        ("wkt_column", options.wkt_column.as_str()),
        ("geometry_column", options.geometry_column.as_str()),
        ("key_column", options.key_column.as_str()),
    ] {
        if c_value.trim().is_empty() {
            return Err(SqlLoadError::InvalidOptions(format!(
                "{c_field} must not be empty."
            )));
        }
    }

    let bbox = &options.bounding_box;
    if !(bbox.xmin < bbox.xmax && bbox.ymin < bbox.ymax) {
        return Err(SqlLoadError::InvalidOptions(format!(
            "Bounding box is empty: {bbox}"
        )));
    }
    Ok(())
}
