//! XLSX constants, fixed sheet layout and default preset factories.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::spec::{SpecCellFormat, SpecXlsxExportOptions, SpecXlsxFormatPresets};

/// Excel sheet name maximum length.
pub const N_LEN_EXCEL_SHEET_NAME_MAX: usize = 31;
/// Characters not allowed in sheet names.
pub const TUP_EXCEL_ILLEGAL: [&str; 7] = ["*", ":", "?", "/", "\\", "[", "]"];

/// Zero-based row of the merged title cell.
pub const N_ROW_TITLE: usize = 1;
/// Zero-based row of the header cells.
pub const N_ROW_HEADER: usize = 2;
/// Zero-based row of the first data row.
pub const N_ROW_DATA_START: usize = 3;
/// Zero-based column of the first data column.
pub const N_COL_DATA_START: usize = 1;

/// Extra characters added to the inferred column width.
pub const N_WIDTH_CELL_PADDING: usize = 6;
/// Excel column width maximum.
pub const N_WIDTH_CELL_MAX: usize = 255;

/// Output workbook file extension.
pub const C_XLSX_FILE_EXTENSION: &str = "xlsx";
/// Default output directory.
pub const C_DIR_OUT_DEFAULT: &str = ".";
/// Default workbook file stem.
pub const C_FILE_NAME_DEFAULT: &str = "file";
/// Prefix of auto-generated display names (`Sheet0`, `Sheet1`, ...).
pub const C_SHEET_NAME_AUTO_PREFIX: &str = "Sheet";

/// Font family shared by every styled cell.
pub const C_FONT_NAME_DEFAULT: &str = "Calibri Light";

/// Number format applied to `Date` columns without a numeric pattern.
pub const C_NUM_FORMAT_DATE: &str = "yyyy-mm-dd";
/// Number format applied to `Datetime` columns without a numeric pattern.
pub const C_NUM_FORMAT_DATETIME: &str = "yyyy-mm-dd hh:mm:ss";
/// Excel serial day number of 1970-01-01.
pub const N_EXCEL_SERIAL_UNIX_EPOCH: f64 = 25_569.0;

/// Build default cell format presets used by [`crate::writer::XlsxExportWriter`].
pub fn derive_default_xlsx_formats() -> SpecXlsxFormatPresets {
    let cfg_base_fmt_spec = SpecCellFormat {
        font_name: Some(C_FONT_NAME_DEFAULT.to_string()),
        font_size: Some(12),
        ..Default::default()
    };

    SpecXlsxFormatPresets {
        fmt_body: cfg_base_fmt_spec.clone(),
        fmt_header: cfg_base_fmt_spec.with_(SpecCellFormat {
            bold: Some(true),
            valign: Some("bottom".to_string()),
            bg_color: Some("#ece7f2".to_string()),
            border: Some(1),
            ..Default::default()
        }),
        fmt_title: cfg_base_fmt_spec.with_(SpecCellFormat {
            bold: Some(true),
            font_size: Some(14),
            valign: Some("bottom".to_string()),
            align: Some("center".to_string()),
            bg_color: Some("#a6bddb".to_string()),
            border: Some(1),
            ..Default::default()
        }),
    }
}

/// Build default export options.
///
/// Writes `./file.xlsx` with friendly names and the default presets.
pub fn derive_default_xlsx_export_options() -> SpecXlsxExportOptions {
    SpecXlsxExportOptions {
        dir_out: PathBuf::from(C_DIR_OUT_DEFAULT),
        file_name: C_FILE_NAME_DEFAULT.to_string(),
        sheet_names: vec![],
        tab_names: BTreeMap::new(),
        col_formats: BTreeMap::new(),
        if_friendly_names: true,
        formats: derive_default_xlsx_formats(),
    }
}
