//! Cell value rendering shared by every sink.

use std::fmt::Display;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use polars::prelude::{AnyValue, TimeUnit};

/// Days between 0001-01-01 (CE day 1) and 1970-01-01.
pub const N_DAYS_CE_TO_UNIX_EPOCH: i32 = 719_163;

/// Render floats the way a dataframe prints them: whole numbers keep `.0`.
///
/// NaN renders as `""` and infinities as `inf`/`-inf`. Anything else goes
/// through the source type's own `Display`, so `0.1f32` stays `"0.1"`.
pub fn render_float_text<F>(value: F) -> String
where
    F: Into<f64> + Copy + Display,
{
    let n_value: f64 = value.into();
    if n_value.is_nan() {
        return String::new();
    }
    if n_value.is_infinite() {
        return if n_value.is_sign_positive() { "inf" } else { "-inf" }.to_string();
    }
    if n_value.fract() == 0.0 && n_value.abs() < 1e16 {
        return format!("{n_value:.1}");
    }
    value.to_string()
}

/// Widen an `f32` to the `f64` with the same shortest decimal form.
///
/// `f64::from(0.1f32)` is `0.10000000149011612`; this returns `0.1`.
pub fn widen_f32(value: f32) -> f64 {
    if !value.is_finite() {
        return f64::from(value);
    }
    value
        .to_string()
        .parse::<f64>()
        .unwrap_or_else(|_| f64::from(value))
}

/// Numeric view of an [`AnyValue`], if it has one.
pub fn derive_f64_from_any_value(value: &AnyValue<'_>) -> Option<f64> {
    match value {
        AnyValue::UInt8(val) => Some(f64::from(*val)),
        AnyValue::UInt16(val) => Some(f64::from(*val)),
        AnyValue::UInt32(val) => Some(f64::from(*val)),
        AnyValue::UInt64(val) => Some(*val as f64),
        AnyValue::Int8(val) => Some(f64::from(*val)),
        AnyValue::Int16(val) => Some(f64::from(*val)),
        AnyValue::Int32(val) => Some(f64::from(*val)),
        AnyValue::Int64(val) => Some(*val as f64),
        AnyValue::Float32(val) => Some(widen_f32(*val)),
        AnyValue::Float64(val) => Some(*val),
        _ => None,
    }
}

/// Calendar view of a `Date`/`Datetime` value (time zone ignored, wall clock UTC).
pub fn derive_naive_datetime_from_any_value(value: &AnyValue<'_>) -> Option<NaiveDateTime> {
    match value {
        AnyValue::Date(n_days) => {
            NaiveDate::from_num_days_from_ce_opt(n_days.checked_add(N_DAYS_CE_TO_UNIX_EPOCH)?)
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        }
        AnyValue::Datetime(n_ts, time_unit, _) | AnyValue::DatetimeOwned(n_ts, time_unit, _) => {
            let dt = match time_unit {
                TimeUnit::Nanoseconds => Some(DateTime::from_timestamp_nanos(*n_ts)),
                TimeUnit::Microseconds => DateTime::from_timestamp_micros(*n_ts),
                TimeUnit::Milliseconds => DateTime::from_timestamp_millis(*n_ts),
            };
            dt.map(|dt| dt.naive_utc())
        }
        _ => None,
    }
}

/// `YYYY-MM-DD` for a `Date`/`Datetime` value; the time of day is dropped.
pub fn derive_date_text(value: &AnyValue<'_>) -> Option<String> {
    derive_naive_datetime_from_any_value(value).map(|dt| dt.format("%Y-%m-%d").to_string())
}

/// `YYYY-MM-DD` for a `Date`, `YYYY-MM-DD HH:MM:SS` for a `Datetime`.
pub fn derive_datetime_text(value: &AnyValue<'_>) -> Option<String> {
    let dt = derive_naive_datetime_from_any_value(value)?;
    if matches!(value, AnyValue::Date(_)) {
        Some(dt.format("%Y-%m-%d").to_string())
    } else {
        Some(dt.format("%Y-%m-%d %H:%M:%S").to_string())
    }
}
