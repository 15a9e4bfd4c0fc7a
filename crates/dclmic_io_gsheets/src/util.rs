//! DataFrame to sheet-values conversion.

use dclmic_io::value::{derive_datetime_text, widen_f32};
use polars::prelude::{AnyValue, DataFrame, PolarsResult};
use serde_json::{Number, Value};

/// Header row of column names followed by one row per record.
///
/// Missing values (null, NaN) become `""` so the remote cells are cleared.
pub fn derive_sheet_values(df: &DataFrame) -> PolarsResult<Vec<Vec<Value>>> {
    let mut l_rows = Vec::with_capacity(df.height() + 1);
    l_rows.push(
        df.get_columns()
            .iter()
            .map(|col| Value::String(col.name().to_string()))
            .collect(),
    );

    for n_idx_row in 0..df.height() {
        let l_row = df
            .get_columns()
            .iter()
            .map(|col| col.get(n_idx_row).map(|val| derive_json_value(&val)))
            .collect::<PolarsResult<Vec<_>>>()?;
        l_rows.push(l_row);
    }
    Ok(l_rows)
}

/// Convert one cell to a JSON value accepted by the values API.
pub fn derive_json_value(value: &AnyValue<'_>) -> Value {
    match value {
        AnyValue::Null => Value::String(String::new()),
        AnyValue::Boolean(val) => Value::Bool(*val),
        AnyValue::String(val) => Value::String(val.to_string()),
        AnyValue::StringOwned(val) => Value::String(val.to_string()),
        AnyValue::Int8(val) => Value::from(*val),
        AnyValue::Int16(val) => Value::from(*val),
        AnyValue::Int32(val) => Value::from(*val),
        AnyValue::Int64(val) => Value::from(*val),
        AnyValue::UInt8(val) => Value::from(*val),
        AnyValue::UInt16(val) => Value::from(*val),
        AnyValue::UInt32(val) => Value::from(*val),
        AnyValue::UInt64(val) => Value::from(*val),
        AnyValue::Float32(val) => derive_json_float(widen_f32(*val)),
        AnyValue::Float64(val) => derive_json_float(*val),
        AnyValue::Date(_) | AnyValue::Datetime(..) | AnyValue::DatetimeOwned(..) => {
            Value::String(derive_datetime_text(value).unwrap_or_default())
        }
        other => Value::String(other.to_string()),
    }
}

fn derive_json_float(value: f64) -> Value {
    if value.is_nan() {
        return Value::String(String::new());
    }
    // JSON has no infinity
    Number::from_f64(value)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(if value > 0.0 { "inf" } else { "-inf" }.to_string()))
}
