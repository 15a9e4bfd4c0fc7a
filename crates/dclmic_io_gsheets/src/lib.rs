//! `dclmic_io_gsheets` v1:
//! Publish polars DataFrames to a cloud spreadsheet through a client seam.
//!
//! Module layout:
//! - `conf`      : defaults (workbook name, fallback sheet, grid size)
//! - `spec`      : client trait, handles, options and errors
//! - `report`    : publish report model
//! - `util`      : DataFrame to JSON values conversion
//! - `publisher` : step-by-step publish flow
pub mod conf;
pub mod publisher;
pub mod report;
pub mod spec;
pub mod util;

pub use dclmic_io::{EnumRunOutcome, SpecStepError};
pub use publisher::publish_dataframe;
pub use report::ReportPublish;
pub use spec::{
    EnumShareRole, EnumSheetSelector, SheetsClient, SheetsPublishError, SpecSheetsPublishOptions,
    SpecUpdateResponse, SpecWorkbookRef, SpecWorksheetRef,
};
pub use util::derive_sheet_values;
