//! `dclmic_io` v1:
//! Shared pieces of the `dclmic_io_*` crates.
//!
//! - `report` : run outcome classification shared by every report model
//! - `value`  : float and date rendering of dataframe cells
pub mod report;
pub mod value;

pub use report::{EnumRunOutcome, SpecStepError, derive_run_outcome};
pub use value::{
    N_DAYS_CE_TO_UNIX_EPOCH, derive_date_text, derive_datetime_text, derive_f64_from_any_value,
    derive_naive_datetime_from_any_value, render_float_text, widen_f32,
};
