//! Name normalization, value rendering and statement builders.

use std::collections::HashMap;

use dclmic_io::value::{derive_date_text, render_float_text};
use polars::prelude::AnyValue;
use regex::Regex;

use crate::conf::C_SQL_COLUMN_TYPE;
use crate::spec::{SpecSpatialOptions, SpecSqlTarget, SqlLoadError};

////////////////////////////////////////////////////////////////////////////////
// #region ColumnNames

/// Compiled rules turning dataframe column names into SQL column names.
#[derive(Debug, Clone)]
pub struct ColumnNameNormalizer {
    re_whitespace: Regex,
    re_invalid: Regex,
}

impl ColumnNameNormalizer {
    /// Compile the whitespace and invalid-character patterns.
    pub fn new() -> Result<Self, SqlLoadError> {
        Ok(Self {
            re_whitespace: Regex::new(r"\s")?,
            re_invalid: Regex::new(r"[^A-Za-z0-9_]")?,
        })
    }

    /// Each whitespace char becomes `_`, other non-word chars are dropped,
    /// the result is lower-cased.
    pub fn normalize(&self, raw: &str) -> String {
        let c_underscored = self.re_whitespace.replace_all(raw, "_");
        self.re_invalid
            .replace_all(&c_underscored, "")
            .to_lowercase()
    }

    /// Normalize every name, rejecting empty and colliding results.
    pub fn normalize_all<'a, I>(&self, names: I) -> Result<Vec<String>, SqlLoadError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut dict_seen: HashMap<String, String> = HashMap::new();
        let mut l_names = Vec::new();

        for c_raw in names {
            let c_name = self.normalize(c_raw);
            if c_name.is_empty() {
                return Err(SqlLoadError::EmptyColumnName(c_raw.to_string()));
            }
            if let Some(c_first) = dict_seen.get(&c_name) {
                return Err(SqlLoadError::DuplicateColumnName {
                    normalized: c_name,
                    col_first: c_first.clone(),
                    col_second: c_raw.to_string(),
                });
            }
            dict_seen.insert(c_name.clone(), c_raw.to_string());
            l_names.push(c_name);
        }
        Ok(l_names)
    }
}

/// One-shot [`ColumnNameNormalizer::normalize`].
pub fn normalize_column_name(raw: &str) -> Result<String, SqlLoadError> {
    Ok(ColumnNameNormalizer::new()?.normalize(raw))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ValueRendering

/// Render one cell as the text bound to an insert parameter.
///
/// Missing values (null, NaN) become the empty string; dates and datetimes
/// keep only `YYYY-MM-DD`.
pub fn derive_text_value(value: &AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::Boolean(val) => if *val { "True" } else { "False" }.to_string(),
        AnyValue::String(val) => val.to_string(),
        AnyValue::StringOwned(val) => val.to_string(),
        AnyValue::Float32(val) => render_float_text(*val),
        AnyValue::Float64(val) => render_float_text(*val),
        AnyValue::Date(_) | AnyValue::Datetime(..) | AnyValue::DatetimeOwned(..) => {
            derive_date_text(value).unwrap_or_default()
        }
        other => other.to_string(),
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region StatementBuilders

/// `[name]` with `]` doubled.
pub fn quote_identifier(name: &str) -> String {
    format!("[{}]", name.replace(']', "]]"))
}

/// `[database].[schema].[table]`, or `[schema].[table]` without a database.
pub fn derive_qualified_name(target: &SpecSqlTarget) -> String {
    let mut l_parts = Vec::with_capacity(3);
    if let Some(c_database) = &target.database {
        l_parts.push(quote_identifier(c_database));
    }
    l_parts.push(quote_identifier(&target.schema));
    l_parts.push(quote_identifier(&target.table_name));
    l_parts.join(".")
}

fn quote_string_literal(value: &str) -> String {
    format!("N'{}'", value.replace('\'', "''"))
}

/// Drop the target table when it exists.
pub fn build_drop_table_sql(target: &SpecSqlTarget) -> String {
    let c_qualified = derive_qualified_name(target);
    format!(
        "IF OBJECT_ID({}, N'U') IS NOT NULL DROP TABLE {c_qualified};",
        quote_string_literal(&c_qualified)
    )
}

/// Every column is created as unbounded non-null text.
pub fn build_create_table_sql(target: &SpecSqlTarget, col_names: &[String]) -> String {
    let c_qualified = derive_qualified_name(target);
    let c_columns = col_names
        .iter()
        .map(|c_name| format!("{}{C_SQL_COLUMN_TYPE}", quote_identifier(c_name)))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "IF OBJECT_ID({}, N'U') IS NULL CREATE TABLE {c_qualified} ({c_columns});",
        quote_string_literal(&c_qualified)
    )
}

/// Parameterized single-row insert with one `?` per column.
pub fn build_insert_sql(target: &SpecSqlTarget, col_names: &[String]) -> String {
    let c_columns = col_names
        .iter()
        .map(|c_name| quote_identifier(c_name))
        .collect::<Vec<_>>()
        .join(", ");
    let c_placeholders = vec!["?"; col_names.len()].join(", ");
    format!(
        "INSERT INTO {} ({c_columns}) VALUES ({c_placeholders});",
        derive_qualified_name(target)
    )
}

/// Persisted geometry column computed from the WKT text column.
pub fn build_add_geometry_column_sql(
    target: &SpecSqlTarget,
    options: &SpecSpatialOptions,
) -> String {
    format!(
        "ALTER TABLE {} ADD {} AS geometry::STGeomFromText({}, {}).MakeValid() PERSISTED;",
        derive_qualified_name(target),
        quote_identifier(&options.geometry_column),
        quote_identifier(&options.wkt_column),
        options.crs
    )
}

/// Auto-incrementing integer key column.
pub fn build_add_identity_column_sql(
    target: &SpecSqlTarget,
    options: &SpecSpatialOptions,
) -> String {
    format!(
        "ALTER TABLE {} ADD {} INT IDENTITY;",
        derive_qualified_name(target),
        quote_identifier(&options.key_column)
    )
}

/// Clustered primary key `<table>_constraint_sidx` on the key column.
pub fn build_add_primary_key_sql(target: &SpecSqlTarget, options: &SpecSpatialOptions) -> String {
    format!(
        "ALTER TABLE {} ADD CONSTRAINT {} PRIMARY KEY CLUSTERED ({});",
        derive_qualified_name(target),
        quote_identifier(&format!("{}_constraint_sidx", target.table_name)),
        quote_identifier(&options.key_column)
    )
}

/// Spatial index `spatial_idx_<table>` over the bounding box.
pub fn build_create_spatial_index_sql(
    target: &SpecSqlTarget,
    options: &SpecSpatialOptions,
) -> String {
    format!(
        "CREATE SPATIAL INDEX {} ON {}({}) WITH (BOUNDING_BOX = ({}));",
        quote_identifier(&format!(
            "spatial_idx_{}",
            target.table_name.to_lowercase()
        )),
        derive_qualified_name(target),
        quote_identifier(&options.geometry_column),
        options.bounding_box
    )
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::SpecBoundingBox;
    use polars::prelude::TimeUnit;

    fn derive_target() -> SpecSqlTarget {
        SpecSqlTarget {
            database: Some("LMDW".to_string()),
            schema: "dbo".to_string(),
            table_name: "Tracts".to_string(),
        }
    }

    #[test]
    fn test_normalize_column_name() {
        assert_eq!(
            normalize_column_name("Median Income (USD)").expect("normalize"),
            "median_income_usd"
        );
        assert_eq!(
            normalize_column_name("ratio: a/b").expect("normalize"),
            "ratio_ab"
        );
        assert_eq!(
            normalize_column_name("two  spaces").expect("normalize"),
            "two__spaces"
        );
    }

    #[test]
    fn test_normalize_all_rejects_collisions_and_empty() {
        let normalizer = ColumnNameNormalizer::new().expect("normalizer");

        let err = normalizer
            .normalize_all(["Pop Total", "pop_total"])
            .expect_err("collision");
        assert!(matches!(
            err,
            SqlLoadError::DuplicateColumnName { ref normalized, .. } if normalized == "pop_total"
        ));

        let err = normalizer.normalize_all(["()"]).expect_err("empty");
        assert!(matches!(err, SqlLoadError::EmptyColumnName(_)));
    }

    #[test]
    fn test_derive_text_value() {
        assert_eq!(derive_text_value(&AnyValue::Null), "");
        assert_eq!(derive_text_value(&AnyValue::Float64(1.0)), "1.0");
        assert_eq!(derive_text_value(&AnyValue::Float64(2.5)), "2.5");
        assert_eq!(derive_text_value(&AnyValue::Float64(f64::NAN)), "");
        assert_eq!(derive_text_value(&AnyValue::Float32(0.1)), "0.1");
        assert_eq!(derive_text_value(&AnyValue::Float32(4.0)), "4.0");
        assert_eq!(derive_text_value(&AnyValue::Float32(f32::NAN)), "");
        assert_eq!(derive_text_value(&AnyValue::Int64(42)), "42");
        assert_eq!(derive_text_value(&AnyValue::Boolean(true)), "True");
        assert_eq!(derive_text_value(&AnyValue::String("x y")), "x y");
        // 2024-01-01
        assert_eq!(derive_text_value(&AnyValue::Date(19_723)), "2024-01-01");
        assert_eq!(
            derive_text_value(&AnyValue::Datetime(
                1_704_153_600_000,
                TimeUnit::Milliseconds,
                None
            )),
            "2024-01-02"
        );
    }

    #[test]
    fn test_qualified_name() {
        assert_eq!(derive_qualified_name(&derive_target()), "[LMDW].[dbo].[Tracts]");

        let target = SpecSqlTarget {
            database: None,
            table_name: "odd]name".to_string(),
            ..derive_target()
        };
        assert_eq!(derive_qualified_name(&target), "[dbo].[odd]]name]");
    }

    #[test]
    fn test_ddl_and_insert_statements() {
        let target = derive_target();
        let l_cols = vec!["a".to_string(), "b".to_string()];

        assert_eq!(
            build_drop_table_sql(&target),
            "IF OBJECT_ID(N'[LMDW].[dbo].[Tracts]', N'U') IS NOT NULL DROP TABLE [LMDW].[dbo].[Tracts];"
        );
        assert_eq!(
            build_create_table_sql(&target, &l_cols),
            "IF OBJECT_ID(N'[LMDW].[dbo].[Tracts]', N'U') IS NULL CREATE TABLE [LMDW].[dbo].[Tracts] \
             ([a][VARCHAR](MAX) NOT NULL, [b][VARCHAR](MAX) NOT NULL);"
        );
        assert_eq!(
            build_insert_sql(&target, &l_cols),
            "INSERT INTO [LMDW].[dbo].[Tracts] ([a], [b]) VALUES (?, ?);"
        );
    }

    #[test]
    fn test_spatial_statements() {
        let target = derive_target();
        let options = SpecSpatialOptions::default();

        assert_eq!(
            build_add_geometry_column_sql(&target, &options),
            "ALTER TABLE [LMDW].[dbo].[Tracts] ADD [geom] AS \
             geometry::STGeomFromText([geom_wkt], 4326).MakeValid() PERSISTED;"
        );
        assert_eq!(
            build_add_primary_key_sql(&target, &options),
            "ALTER TABLE [LMDW].[dbo].[Tracts] ADD CONSTRAINT [Tracts_constraint_sidx] \
             PRIMARY KEY CLUSTERED ([PKEY_IDX]);"
        );
        assert_eq!(
            build_create_spatial_index_sql(&target, &options),
            "CREATE SPATIAL INDEX [spatial_idx_tracts] ON [LMDW].[dbo].[Tracts]([geom]) \
             WITH (BOUNDING_BOX = (xmin=-99, ymin=32, xmax=-96, ymax=33));"
        );

        let options = SpecSpatialOptions {
            bounding_box: SpecBoundingBox {
                xmin: -106.5,
                ymin: 25.8,
                xmax: -93.5,
                ymax: 36.5,
            },
            ..options
        };
        assert!(
            build_create_spatial_index_sql(&target, &options)
                .contains("xmin=-106.5, ymin=25.8, xmax=-93.5, ymax=36.5")
        );
    }
}
