//! `dclmic_io_xlsx` v1:
//! Styled multi-sheet XLSX export for polars DataFrames.
//!
//! Module layout:
//! - `conf`   : constants, layout geometry and default presets
//! - `spec`   : specs/models/options/errors
//! - `util`   : pure naming, format-inference and value helpers
//! - `writer` : sheet planning and workbook rendering
pub mod conf;
pub mod spec;
pub mod util;
pub mod writer;

pub use conf::{
    N_COL_DATA_START, N_LEN_EXCEL_SHEET_NAME_MAX, N_ROW_DATA_START, N_ROW_HEADER, N_ROW_TITLE,
    N_WIDTH_CELL_MAX, N_WIDTH_CELL_PADDING, TUP_EXCEL_ILLEGAL,
};
pub use spec::{
    EnumColumnFormatDirective, EnumColumnKind, EnumFormatRule, EnumNumberStyle,
    EnumResolvedNumberFormat, SpecCellFormat, SpecCellRange, SpecColumnPlan, SpecSheetPlan,
    SpecXlsxExportOptions, SpecXlsxFormatPresets, SpecXlsxReport, SpecXlsxSheetSummary,
    XlsxExportError,
};
pub use util::{
    calculate_column_width, derive_sheet_identifier, friendlize, resolve_column_format,
    validate_sheet_identifiers,
};
pub use writer::{
    StyleBook, XlsxExportWriter, derive_display_names, derive_output_path, export_dataframes,
    plan_sheet,
};
