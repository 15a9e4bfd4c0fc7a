//! Stateless helper utilities used by the XLSX export kernel.

use std::collections::{BTreeMap, HashMap};

use dclmic_io::value::{
    derive_datetime_text, derive_f64_from_any_value, derive_naive_datetime_from_any_value,
    render_float_text,
};
use polars::prelude::{AnyValue, Column, DataType, PolarsResult};

use crate::conf::{
    N_EXCEL_SERIAL_UNIX_EPOCH, N_LEN_EXCEL_SHEET_NAME_MAX, N_WIDTH_CELL_PADDING, TUP_EXCEL_ILLEGAL,
};
use crate::spec::{
    EnumCellValue, EnumColumnFormatDirective, EnumColumnKind, EnumFormatRule, EnumNumberStyle,
    EnumResolvedNumberFormat, XlsxExportError,
};

////////////////////////////////////////////////////////////////////////////////
// #region Naming

/// Turn `median_hh_income` into `Median Hh Income`.
///
/// The whole input is lower-cased, split on `_`, and each segment gets an
/// upper-case first character. Spaces are not separators, so
/// `"Median Income"` becomes `"Median income"`.
pub fn friendlize(raw: &str) -> String {
    raw.to_lowercase()
        .split('_')
        .map(capitalize_first)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize_first(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(chr_first) => chr_first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Derive the tab identifier for a table.
///
/// An entry in `tab_names` replaces the display name. The result is
/// friendlified when requested and then cut to the Excel length limit.
pub fn derive_sheet_identifier(
    display_name: &str,
    tab_names: &BTreeMap<String, String>,
    if_friendly_names: bool,
) -> String {
    let c_name_base = tab_names
        .get(display_name)
        .map(String::as_str)
        .unwrap_or(display_name);

    let c_name = if if_friendly_names {
        friendlize(c_name_base)
    } else {
        c_name_base.to_string()
    };

    c_name.chars().take(N_LEN_EXCEL_SHEET_NAME_MAX).collect()
}

/// Validate identifiers against Excel rules and reject collisions.
///
/// Excel compares sheet names case-insensitively.
pub fn validate_sheet_identifiers(sheet_names: &[String]) -> Result<(), XlsxExportError> {
    let mut dict_seen: HashMap<String, usize> = HashMap::new();

    for (n_idx, c_name) in sheet_names.iter().enumerate() {
        if c_name.trim().is_empty()
            || c_name.starts_with('\'')
            || c_name.ends_with('\'')
            || TUP_EXCEL_ILLEGAL
                .iter()
                .any(|c_illegal| c_name.contains(c_illegal))
        {
            return Err(XlsxExportError::InvalidSheetIdentifier(c_name.clone()));
        }

        if let Some(n_idx_first) = dict_seen.insert(c_name.to_lowercase(), n_idx) {
            return Err(XlsxExportError::DuplicateSheetIdentifier {
                sheet_name: c_name.clone(),
                idx_first: n_idx_first,
                idx_second: n_idx,
            });
        }
    }

    Ok(())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region FormatInference

/// Map a polars dtype onto the coarse kind used by format inference.
pub fn derive_column_kind(dtype: &DataType) -> EnumColumnKind {
    match dtype {
        DataType::Boolean => EnumColumnKind::Boolean,
        DataType::String => EnumColumnKind::Text,
        DataType::Date => EnumColumnKind::Date,
        DataType::Datetime(_, _) => EnumColumnKind::Datetime,
        dtype if dtype.is_integer() => EnumColumnKind::Integer,
        dtype if dtype.is_float() => EnumColumnKind::Float,
        _ => EnumColumnKind::Other,
    }
}

/// Resolve the number format of one column.
///
/// First match wins:
/// 1. explicit directive (catalog style or literal pattern),
/// 2. name contains `%` or `percent` -> percent,
/// 3. name contains `income`, `salary` or `wage` -> currency,
/// 4. integer dtype -> thousands,
/// 5. float dtype -> thousands when every non-missing value is whole, else decimal,
/// 6. no numeric format.
pub fn resolve_column_format(
    column: &Column,
    directive: Option<&EnumColumnFormatDirective>,
) -> PolarsResult<(EnumResolvedNumberFormat, EnumFormatRule)> {
    if let Some(directive) = directive {
        let fmt_resolved = match directive {
            EnumColumnFormatDirective::Style(style) => EnumResolvedNumberFormat::Style(*style),
            EnumColumnFormatDirective::Custom(pattern) => {
                EnumResolvedNumberFormat::Custom(pattern.clone())
            }
        };
        return Ok((fmt_resolved, EnumFormatRule::Directive));
    }

    let c_name_lower = column.name().as_str().to_lowercase();
    if c_name_lower.contains('%') || c_name_lower.contains("percent") {
        return Ok((
            EnumResolvedNumberFormat::Style(EnumNumberStyle::Percent),
            EnumFormatRule::PercentName,
        ));
    }
    if ["income", "salary", "wage"]
        .iter()
        .any(|c_key| c_name_lower.contains(c_key))
    {
        return Ok((
            EnumResolvedNumberFormat::Style(EnumNumberStyle::Currency),
            EnumFormatRule::CurrencyName,
        ));
    }

    match derive_column_kind(column.dtype()) {
        EnumColumnKind::Integer => Ok((
            EnumResolvedNumberFormat::Style(EnumNumberStyle::Thousands),
            EnumFormatRule::IntegerDtype,
        )),
        EnumColumnKind::Float => {
            if is_integral_float_column(column)? {
                Ok((
                    EnumResolvedNumberFormat::Style(EnumNumberStyle::Thousands),
                    EnumFormatRule::IntegralFloat,
                ))
            } else {
                Ok((
                    EnumResolvedNumberFormat::Style(EnumNumberStyle::Decimal),
                    EnumFormatRule::FractionalFloat,
                ))
            }
        }
        _ => Ok((EnumResolvedNumberFormat::Default, EnumFormatRule::Fallback)),
    }
}

/// Whether every non-missing value of a float column is a whole number.
///
/// Null and NaN count as missing. Infinities are not whole.
pub fn is_integral_float_column(column: &Column) -> PolarsResult<bool> {
    for n_idx_row in 0..column.len() {
        let Some(n_value) = derive_f64_from_any_value(&column.get(n_idx_row)?) else {
            continue;
        };
        if n_value.is_nan() {
            continue;
        }
        if n_value.fract() != 0.0 {
            return Ok(false);
        }
    }
    Ok(true)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region WidthInference

/// Column width: longest value text or raw column name, plus fixed padding.
///
/// The raw name is measured even when a friendly header is displayed.
pub fn calculate_column_width(column: &Column) -> PolarsResult<usize> {
    let mut n_len_max = column.name().as_str().chars().count();
    for n_idx_row in 0..column.len() {
        let n_len_value = derive_text_from_any_value(&column.get(n_idx_row)?)
            .chars()
            .count();
        n_len_max = usize::max(n_len_max, n_len_value);
    }
    Ok(n_len_max + N_WIDTH_CELL_PADDING)
}

/// Text rendering of one value as used for width inference.
pub fn derive_text_from_any_value(value: &AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::Boolean(val) => if *val { "True" } else { "False" }.to_string(),
        AnyValue::String(val) => val.to_string(),
        AnyValue::StringOwned(val) => val.to_string(),
        AnyValue::Float32(val) => render_float_text(*val),
        AnyValue::Float64(val) => render_float_text(*val),
        AnyValue::Date(_) | AnyValue::Datetime(..) | AnyValue::DatetimeOwned(..) => {
            derive_datetime_text(value).unwrap_or_default()
        }
        _ => value.to_string(),
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region CellValueConversion

/// Excel serial date number for a `Date`/`Datetime` value.
pub fn derive_excel_serial_from_any_value(value: &AnyValue<'_>) -> Option<f64> {
    let dt = derive_naive_datetime_from_any_value(value)?.and_utc();
    let n_seconds = dt.timestamp() as f64 + f64::from(dt.timestamp_subsec_nanos()) / 1e9;
    Some(n_seconds / 86_400.0 + N_EXCEL_SERIAL_UNIX_EPOCH)
}

/// Normalize one value for writing.
///
/// Missing and NaN become blank cells; infinities are written as text.
pub fn derive_cell_value_from_any_value(value: AnyValue<'_>) -> EnumCellValue {
    match value {
        AnyValue::Null => EnumCellValue::None,
        AnyValue::String(val) => EnumCellValue::String(val.to_string()),
        AnyValue::StringOwned(val) => EnumCellValue::String(val.to_string()),
        AnyValue::Boolean(val) => EnumCellValue::Boolean(val),
        AnyValue::Date(_) | AnyValue::Datetime(..) | AnyValue::DatetimeOwned(..) => {
            match derive_excel_serial_from_any_value(&value) {
                Some(n_serial) => EnumCellValue::Number(n_serial),
                None => EnumCellValue::None,
            }
        }
        _ => match derive_f64_from_any_value(&value) {
            Some(n_value) if n_value.is_nan() => EnumCellValue::None,
            Some(n_value) if n_value.is_infinite() => {
                EnumCellValue::String(derive_text_from_any_value(&value))
            }
            Some(n_value) => EnumCellValue::Number(n_value),
            None => EnumCellValue::String(value.to_string()),
        },
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
