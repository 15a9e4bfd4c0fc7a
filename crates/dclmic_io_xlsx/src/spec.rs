//! Shared XLSX export models, options and errors.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use polars::prelude::PolarsError;
use rust_xlsxwriter::XlsxError;
use thiserror::Error;

use crate::conf::{derive_default_xlsx_export_options, derive_default_xlsx_formats};

////////////////////////////////////////////////////////////////////////////////
// #region CellFormatSpecification

/// Cell format specification.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SpecCellFormat {
    /// Font family name.
    pub font_name: Option<String>,
    /// Font size in points.
    pub font_size: Option<i64>,
    /// Bold style.
    pub bold: Option<bool>,
    /// Italic style.
    pub italic: Option<bool>,

    /// Horizontal alignment.
    pub align: Option<String>,
    /// Vertical alignment.
    pub valign: Option<String>,
    /// Border style for all sides.
    pub border: Option<i64>,

    /// Number format code.
    pub num_format: Option<String>,
    /// Background fill color.
    pub bg_color: Option<String>,
    /// Font color.
    pub font_color: Option<String>,
}

impl SpecCellFormat {
    /// Return a new format by overlaying `patch` onto `self`.
    pub fn with_(&self, patch: SpecCellFormat) -> SpecCellFormat {
        self.merge(&patch)
    }

    /// Merge two formats with right-side non-`None` overwrite semantics.
    pub fn merge(&self, other: &SpecCellFormat) -> SpecCellFormat {
        SpecCellFormat {
            font_name: other.font_name.clone().or_else(|| self.font_name.clone()),
            font_size: other.font_size.or(self.font_size),
            bold: other.bold.or(self.bold),
            italic: other.italic.or(self.italic),
            align: other.align.clone().or_else(|| self.align.clone()),
            valign: other.valign.clone().or_else(|| self.valign.clone()),
            border: other.border.or(self.border),
            num_format: other.num_format.clone().or_else(|| self.num_format.clone()),
            bg_color: other.bg_color.clone().or_else(|| self.bg_color.clone()),
            font_color: other.font_color.clone().or_else(|| self.font_color.clone()),
        }
    }
}

/// Body/header/title presets used when rendering one workbook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecXlsxFormatPresets {
    /// Base format for data cells; the column number pattern is merged on top.
    pub fmt_body: SpecCellFormat,
    /// Header row format.
    pub fmt_header: SpecCellFormat,
    /// Merged title cell format.
    pub fmt_title: SpecCellFormat,
}

impl Default for SpecXlsxFormatPresets {
    fn default() -> Self {
        derive_default_xlsx_formats()
    }
}

/// Normalized cell value during conversion/write pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumCellValue {
    /// Missing/blank value.
    None,
    /// Text value.
    String(String),
    /// Numeric value (dates are already Excel serial numbers).
    Number(f64),
    /// Boolean value.
    Boolean(bool),
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region StyleCatalog

/// Closed catalog of named numeric display patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EnumNumberStyle {
    /// `#,###`
    Thousands,
    /// `$#,##0.00`
    Currency,
    /// `$#,##0`
    CurrencyInt,
    /// `#,##0.00`
    Decimal,
    /// `0.00%`
    Percent,
    /// `0%`
    PercentInt,
}

impl EnumNumberStyle {
    /// Every catalog entry, in declaration order.
    pub fn all() -> [EnumNumberStyle; 6] {
        [
            Self::Thousands,
            Self::Currency,
            Self::CurrencyInt,
            Self::Decimal,
            Self::Percent,
            Self::PercentInt,
        ]
    }

    /// Catalog key as accepted in column directives.
    pub fn name(self) -> &'static str {
        match self {
            Self::Thousands => "thousands",
            Self::Currency => "currency",
            Self::CurrencyInt => "currency_int",
            Self::Decimal => "decimal",
            Self::Percent => "percent",
            Self::PercentInt => "percent_int",
        }
    }

    /// Excel number format code.
    pub fn pattern(self) -> &'static str {
        match self {
            Self::Thousands => "#,###",
            Self::Currency => "$#,##0.00",
            Self::CurrencyInt => "$#,##0",
            Self::Decimal => "#,##0.00",
            Self::Percent => "0.00%",
            Self::PercentInt => "0%",
        }
    }

    /// Look up a catalog entry by its exact key.
    pub fn from_name(name: &str) -> Option<EnumNumberStyle> {
        Self::all().into_iter().find(|style| style.name() == name)
    }
}

impl fmt::Display for EnumNumberStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-(table, column) format override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumColumnFormatDirective {
    /// Named catalog style.
    Style(EnumNumberStyle),
    /// Literal number format code, used once and never added to the catalog.
    Custom(String),
}

impl EnumColumnFormatDirective {
    /// Catalog key becomes [`Self::Style`]; anything else is a literal pattern.
    pub fn from_directive_str(value: &str) -> EnumColumnFormatDirective {
        match EnumNumberStyle::from_name(value) {
            Some(style) => Self::Style(style),
            None => Self::Custom(value.to_string()),
        }
    }
}

impl From<&str> for EnumColumnFormatDirective {
    fn from(value: &str) -> Self {
        Self::from_directive_str(value)
    }
}

impl From<EnumNumberStyle> for EnumColumnFormatDirective {
    fn from(value: EnumNumberStyle) -> Self {
        Self::Style(value)
    }
}

/// Final number format of one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumResolvedNumberFormat {
    /// Catalog style.
    Style(EnumNumberStyle),
    /// Caller-supplied literal pattern.
    Custom(String),
    /// No numeric pattern; the default cell style applies.
    Default,
}

impl EnumResolvedNumberFormat {
    /// Excel number format code, if any.
    pub fn pattern(&self) -> Option<&str> {
        match self {
            Self::Style(style) => Some(style.pattern()),
            Self::Custom(pattern) => Some(pattern.as_str()),
            Self::Default => None,
        }
    }
}

/// Precedence rule that decided a column's format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumFormatRule {
    /// Explicit per-table/per-column directive.
    Directive,
    /// Name contains `%` or `percent`.
    PercentName,
    /// Name contains `income`, `salary` or `wage`.
    CurrencyName,
    /// Integer dtype.
    IntegerDtype,
    /// Float dtype whose non-missing values are all whole numbers.
    IntegralFloat,
    /// Float dtype with at least one fractional value.
    FractionalFloat,
    /// Anything else.
    Fallback,
}

/// Coarse column type used by format inference and cell conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumColumnKind {
    /// Signed or unsigned integer dtype.
    Integer,
    /// `Float32` / `Float64`.
    Float,
    /// `Boolean`.
    Boolean,
    /// `String`.
    Text,
    /// `Date`.
    Date,
    /// `Datetime`.
    Datetime,
    /// Any other dtype, written as its text rendering.
    Other,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SheetPlanSpecification

/// Inclusive zero-based cell range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecCellRange {
    /// First row (inclusive).
    pub row_first: usize,
    /// First column (inclusive).
    pub col_first: usize,
    /// Last row (inclusive).
    pub row_last: usize,
    /// Last column (inclusive).
    pub col_last: usize,
}

impl SpecCellRange {
    /// Whether the range covers exactly one cell.
    pub fn is_single_cell(&self) -> bool {
        self.row_first == self.row_last && self.col_first == self.col_last
    }
}

/// Resolved layout decisions for one data column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecColumnPlan {
    /// Raw column name.
    pub name: String,
    /// Header text actually displayed.
    pub header_text: String,
    /// Coarse column type.
    pub kind: EnumColumnKind,
    /// Final column width in characters.
    pub width: usize,
    /// Resolved number format.
    pub number_format: EnumResolvedNumberFormat,
    /// Precedence rule that produced `number_format`.
    pub rule: EnumFormatRule,
}

/// Complete plan for one rendered sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecSheetPlan {
    /// Title text (the table's display name).
    pub title: String,
    /// Sheet identifier shown on the tab.
    pub sheet_name: String,
    /// Number of data rows.
    pub n_rows: usize,
    /// Number of data columns.
    pub n_cols: usize,
    /// Per-column decisions, in column order.
    pub columns: Vec<SpecColumnPlan>,
    /// Title cell range (merged when it spans more than one cell).
    pub range_title: SpecCellRange,
    /// Autofilter range over header and data rows; `None` without columns.
    pub range_autofilter: Option<SpecCellRange>,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ExportOptions

/// Options for one [`crate::writer::export_dataframes`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecXlsxExportOptions {
    /// Output directory.
    pub dir_out: PathBuf,
    /// Output base file name, without extension.
    pub file_name: String,
    /// Display names aligned with the frames; empty means `Sheet0`, `Sheet1`, ...
    pub sheet_names: Vec<String>,
    /// Display name -> sheet identifier overrides.
    pub tab_names: BTreeMap<String, String>,
    /// Display name -> column name -> format directive.
    pub col_formats: BTreeMap<String, BTreeMap<String, EnumColumnFormatDirective>>,
    /// Friendlify sheet identifiers and column headers.
    pub if_friendly_names: bool,
    /// Cell format presets.
    pub formats: SpecXlsxFormatPresets,
}

impl Default for SpecXlsxExportOptions {
    fn default() -> Self {
        derive_default_xlsx_export_options()
    }
}

impl SpecXlsxExportOptions {
    /// Register a format directive for `(table_name, col_name)`.
    pub fn with_column_format(
        mut self,
        table_name: &str,
        col_name: &str,
        directive: impl Into<EnumColumnFormatDirective>,
    ) -> Self {
        self.col_formats
            .entry(table_name.to_string())
            .or_default()
            .insert(col_name.to_string(), directive.into());
        self
    }

    /// Look up the directive for `(table_name, col_name)`.
    pub fn column_format(
        &self,
        table_name: &str,
        col_name: &str,
    ) -> Option<&EnumColumnFormatDirective> {
        self.col_formats
            .get(table_name)
            .and_then(|dict_cols| dict_cols.get(col_name))
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ReportSpecification

/// Summary of one written sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecXlsxSheetSummary {
    /// Sheet identifier.
    pub sheet_name: String,
    /// Title text.
    pub title: String,
    /// Data rows written.
    pub n_rows: usize,
    /// Data columns written.
    pub n_cols: usize,
}

/// Per-export report.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecXlsxReport {
    /// Written workbook path.
    pub file_out: PathBuf,
    /// Written sheets, in input order.
    pub sheets: Vec<SpecXlsxSheetSummary>,
    /// Non-fatal warnings.
    pub warnings: Vec<String>,
}

impl SpecXlsxReport {
    /// Add a warning message.
    pub fn warn(&mut self, msg: impl AsRef<str>) {
        self.warnings.push(msg.as_ref().to_string());
    }
}

impl fmt::Display for SpecXlsxReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[XLSX] file={} sheets={} warnings={}",
            self.file_out.display(),
            self.sheets.len(),
            self.warnings.len()
        )
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// Top-level export failures.
#[derive(Debug, Error)]
pub enum XlsxExportError {
    /// Display names given but not aligned with the frames.
    #[error("sheet_names has {n_names} entries but {n_frames} frames were given")]
    SheetNameCountMismatch {
        /// Number of display names.
        n_names: usize,
        /// Number of frames.
        n_frames: usize,
    },
    /// Two tables resolved to the same sheet identifier.
    #[error("Duplicate sheet identifier {sheet_name:?} (tables {idx_first} and {idx_second})")]
    DuplicateSheetIdentifier {
        /// Colliding identifier.
        sheet_name: String,
        /// Index of the first table using it.
        idx_first: usize,
        /// Index of the second table using it.
        idx_second: usize,
    },
    /// Identifier is empty or contains a character Excel rejects.
    #[error("Invalid sheet identifier {0:?}")]
    InvalidSheetIdentifier(String),
    /// Row/column index does not fit the worksheet grid.
    #[error("{0}")]
    GridOverflow(String),
    /// Sheet plan does not describe the dataframe handed to the writer.
    #[error("{0}")]
    PlanMismatch(String),
    /// Writer already flushed its workbook.
    #[error("Cannot write after close().")]
    WriterClosed,
    /// Underlying dataframe access failure.
    #[error("dataframe error: {0}")]
    Polars(#[from] PolarsError),
    /// Underlying workbook write failure.
    #[error("xlsx write error: {0}")]
    Xlsx(#[from] XlsxError),
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
