//! Sheets client seam, publish options and errors.

use std::fmt;
use std::path::{Path, PathBuf};

use polars::prelude::PolarsError;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::conf::derive_default_publish_options;

////////////////////////////////////////////////////////////////////////////////
// #region ClientSeam

/// Handle to a remote workbook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecWorkbookRef {
    /// Spreadsheet id.
    pub id: String,
    /// Workbook title.
    pub name: String,
}

/// Handle to one sheet inside a remote workbook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecWorksheetRef {
    /// Sheet id.
    pub id: u64,
    /// Sheet title.
    pub title: String,
    /// Zero-based position in the workbook.
    pub index: usize,
}

/// Values-update response body.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecUpdateResponse {
    /// Id of the updated spreadsheet.
    pub spreadsheet_id: String,
    /// Rows touched by the update, header row included.
    #[serde(default)]
    pub updated_rows: u64,
    /// Columns touched by the update.
    #[serde(default)]
    pub updated_columns: u64,
}

/// Permission granted when sharing a new workbook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumShareRole {
    Reader,
    Commenter,
    Writer,
}

impl EnumShareRole {
    /// API role name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Reader => "reader",
            Self::Commenter => "commenter",
            Self::Writer => "writer",
        }
    }
}

impl fmt::Display for EnumShareRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cloud spreadsheet operations used by [`crate::publisher::publish_dataframe`].
///
/// The transport (HTTP, OAuth) belongs to the implementation. Lookups return
/// `Ok(None)` when the sheet does not exist.
pub trait SheetsClient {
    /// Authenticate with a service-account credential file.
    fn authenticate(&mut self, path_credentials: &Path) -> Result<(), String>;

    /// Create an empty workbook named `name`.
    fn create_workbook(&mut self, name: &str) -> Result<SpecWorkbookRef, String>;

    /// Grant `email` the given role on `workbook`.
    fn share_workbook(
        &mut self,
        workbook: &SpecWorkbookRef,
        email: &str,
        role: EnumShareRole,
    ) -> Result<(), String>;

    /// Open an existing workbook by name.
    fn open_workbook(&mut self, name: &str) -> Result<SpecWorkbookRef, String>;

    /// Sheet at zero-based `index`; `Ok(None)` when out of range.
    fn worksheet_by_index(
        &mut self,
        workbook: &SpecWorkbookRef,
        index: usize,
    ) -> Result<Option<SpecWorksheetRef>, String>;

    /// Sheet titled `name`; `Ok(None)` when absent.
    fn worksheet_by_name(
        &mut self,
        workbook: &SpecWorkbookRef,
        name: &str,
    ) -> Result<Option<SpecWorksheetRef>, String>;

    /// Append a sheet titled `title` with an `n_rows` x `n_cols` grid.
    fn add_worksheet(
        &mut self,
        workbook: &SpecWorkbookRef,
        title: &str,
        n_rows: usize,
        n_cols: usize,
    ) -> Result<SpecWorksheetRef, String>;

    /// Remove every value from `worksheet`.
    fn clear_worksheet(
        &mut self,
        workbook: &SpecWorkbookRef,
        worksheet: &SpecWorksheetRef,
    ) -> Result<(), String>;

    /// Overwrite the sheet starting at A1 with `values` (row-major).
    fn update_values(
        &mut self,
        workbook: &SpecWorkbookRef,
        worksheet: &SpecWorksheetRef,
        values: &[Vec<Value>],
    ) -> Result<SpecUpdateResponse, String>;
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Options

/// Target sheet inside the workbook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumSheetSelector {
    /// Zero-based position.
    Index(usize),
    /// Sheet title.
    Name(String),
}

impl fmt::Display for EnumSheetSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(n_idx) => write!(f, "#{n_idx}"),
            Self::Name(c_name) => write!(f, "{c_name:?}"),
        }
    }
}

impl From<usize> for EnumSheetSelector {
    fn from(value: usize) -> Self {
        Self::Index(value)
    }
}

impl From<&str> for EnumSheetSelector {
    fn from(value: &str) -> Self {
        Self::Name(value.to_string())
    }
}

/// Options for one publish call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecSheetsPublishOptions {
    /// Workbook title to create and/or open.
    pub workbook_name: String,
    /// Target sheet.
    pub sheet: EnumSheetSelector,
    /// Create the workbook before opening it.
    pub if_new_book: bool,
    /// Clear an existing workbook's sheet before writing.
    pub if_clear: bool,
    /// Service-account credential file.
    pub path_credentials: PathBuf,
    /// Account a newly created workbook is shared with.
    pub share_with: Option<String>,
    /// Role granted to `share_with`.
    pub share_role: EnumShareRole,
    /// Grid rows of a sheet added for a missing selector.
    pub n_rows_new_sheet: usize,
    /// Grid columns of a sheet added for a missing selector.
    pub n_cols_new_sheet: usize,
}

impl Default for SpecSheetsPublishOptions {
    fn default() -> Self {
        derive_default_publish_options()
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// "Top-level call failed" errors (validation stage). Remote failures are
/// reported in [`crate::report::ReportPublish`] instead.
#[derive(Debug, Error)]
pub enum SheetsPublishError {
    #[error("{0}")]
    InvalidOptions(String),
    #[error("dataframe error: {0}")]
    Polars(#[from] PolarsError),
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
