//! Publisher constants and default options.

use std::path::PathBuf;

use crate::spec::{EnumShareRole, EnumSheetSelector, SpecSheetsPublishOptions};

/// Default target workbook name.
pub const C_WORKBOOK_NAME_DEFAULT: &str = "newsheet";
/// Default service-account credential file.
pub const C_CREDENTIALS_FILE_DEFAULT: &str = "gsheets_key.json";
/// Title of a sheet created for a missing index selector.
pub const C_SHEET_TITLE_FALLBACK: &str = "NewSheet";
/// Row count of a newly added sheet.
pub const N_ROWS_NEW_SHEET: usize = 100_000;
/// Column count of a newly added sheet.
pub const N_COLS_NEW_SHEET: usize = 200;

/// Build default publish options.
pub fn derive_default_publish_options() -> SpecSheetsPublishOptions {
    SpecSheetsPublishOptions {
        workbook_name: C_WORKBOOK_NAME_DEFAULT.to_string(),
        sheet: EnumSheetSelector::Index(0),
        if_new_book: true,
        if_clear: true,
        path_credentials: PathBuf::from(C_CREDENTIALS_FILE_DEFAULT),
        share_with: None,
        share_role: EnumShareRole::Writer,
        n_rows_new_sheet: N_ROWS_NEW_SHEET,
        n_cols_new_sheet: N_COLS_NEW_SHEET,
    }
}
