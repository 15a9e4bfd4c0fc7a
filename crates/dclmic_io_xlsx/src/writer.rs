//! XLSX writer kernel that renders planned DataFrame sheets into one workbook.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use polars::prelude::DataFrame;
use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, Worksheet};

use crate::conf::{
    C_NUM_FORMAT_DATE, C_NUM_FORMAT_DATETIME, C_SHEET_NAME_AUTO_PREFIX, C_XLSX_FILE_EXTENSION,
    N_COL_DATA_START, N_ROW_DATA_START, N_ROW_HEADER, N_ROW_TITLE, N_WIDTH_CELL_MAX,
};
use crate::spec::{
    EnumCellValue, EnumColumnKind, EnumNumberStyle, EnumResolvedNumberFormat, SpecCellFormat,
    SpecCellRange, SpecColumnPlan, SpecSheetPlan, SpecXlsxExportOptions, SpecXlsxFormatPresets,
    SpecXlsxReport, SpecXlsxSheetSummary, XlsxExportError,
};
use crate::util::{
    calculate_column_width, derive_cell_value_from_any_value, derive_column_kind,
    derive_sheet_identifier, friendlize, resolve_column_format, validate_sheet_identifiers,
};

////////////////////////////////////////////////////////////////////////////////
// #region StyleBook

/// Per-export immutable set of rendered formats.
///
/// Built once per [`XlsxExportWriter`]; literal column patterns produce
/// one-off formats and are never stored here.
pub struct StyleBook {
    fmt_body_spec: SpecCellFormat,
    fmt_body: Format,
    fmt_header: Format,
    fmt_title: Format,
    dict_fmt_by_style: BTreeMap<EnumNumberStyle, Format>,
}

impl StyleBook {
    /// Render presets and every catalog style.
    pub fn new(presets: &SpecXlsxFormatPresets) -> Self {
        let dict_fmt_by_style = EnumNumberStyle::all()
            .into_iter()
            .map(|style| {
                let fmt_spec = presets.fmt_body.with_(SpecCellFormat {
                    num_format: Some(style.pattern().to_string()),
                    ..Default::default()
                });
                (style, derive_rust_xlsx_format(&fmt_spec))
            })
            .collect();

        Self {
            fmt_body_spec: presets.fmt_body.clone(),
            fmt_body: derive_rust_xlsx_format(&presets.fmt_body),
            fmt_header: derive_rust_xlsx_format(&presets.fmt_header),
            fmt_title: derive_rust_xlsx_format(&presets.fmt_title),
            dict_fmt_by_style,
        }
    }

    /// Body base format (no number pattern).
    pub fn body(&self) -> &Format {
        &self.fmt_body
    }

    /// Header row format.
    pub fn header(&self) -> &Format {
        &self.fmt_header
    }

    /// Title cell format.
    pub fn title(&self) -> &Format {
        &self.fmt_title
    }

    /// Catalog format for `style`.
    pub fn style(&self, style: EnumNumberStyle) -> &Format {
        // every catalog entry is inserted in `new`
        self.dict_fmt_by_style.get(&style).unwrap_or(&self.fmt_body)
    }

    /// Data format for one planned column.
    pub fn column_format(&self, col_plan: &SpecColumnPlan) -> Format {
        let c_num_format = match &col_plan.number_format {
            EnumResolvedNumberFormat::Style(style) => return self.style(*style).clone(),
            EnumResolvedNumberFormat::Custom(pattern) => pattern.as_str(),
            EnumResolvedNumberFormat::Default => match col_plan.kind {
                EnumColumnKind::Date => C_NUM_FORMAT_DATE,
                EnumColumnKind::Datetime => C_NUM_FORMAT_DATETIME,
                _ => return self.fmt_body.clone(),
            },
        };

        derive_rust_xlsx_format(&self.fmt_body_spec.with_(SpecCellFormat {
            num_format: Some(c_num_format.to_string()),
            ..Default::default()
        }))
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SheetPlanning

/// Decide name, layout and per-column formats for one table.
///
/// `display_name` is the table title and the key into `tab_names` and
/// `col_formats`.
pub fn plan_sheet(
    df: &DataFrame,
    display_name: &str,
    options: &SpecXlsxExportOptions,
) -> Result<SpecSheetPlan, XlsxExportError> {
    let sheet_name = derive_sheet_identifier(
        display_name,
        &options.tab_names,
        options.if_friendly_names,
    );

    let mut l_col_plans = Vec::with_capacity(df.width());
    for column in df.get_columns() {
        let c_col_name = column.name().as_str();
        let (number_format, rule) =
            resolve_column_format(column, options.column_format(display_name, c_col_name))?;
        debug!("[{sheet_name}] column {c_col_name:?}: {rule:?} -> {number_format:?}");

        l_col_plans.push(SpecColumnPlan {
            name: c_col_name.to_string(),
            header_text: if options.if_friendly_names {
                friendlize(c_col_name)
            } else {
                c_col_name.to_string()
            },
            kind: derive_column_kind(column.dtype()),
            width: usize::min(N_WIDTH_CELL_MAX, calculate_column_width(column)?),
            number_format,
            rule,
        });
    }

    let n_rows = df.height();
    let n_cols = df.width();

    let range_title = SpecCellRange {
        row_first: N_ROW_TITLE,
        col_first: N_COL_DATA_START,
        row_last: N_ROW_TITLE,
        col_last: N_COL_DATA_START + usize::max(n_cols, 1) - 1,
    };
    let range_autofilter = (n_cols > 0).then(|| SpecCellRange {
        row_first: N_ROW_HEADER,
        col_first: N_COL_DATA_START,
        row_last: N_ROW_HEADER + n_rows,
        col_last: N_COL_DATA_START + n_cols - 1,
    });

    Ok(SpecSheetPlan {
        title: display_name.to_string(),
        sheet_name,
        n_rows,
        n_cols,
        columns: l_col_plans,
        range_title,
        range_autofilter,
    })
}

/// Display names for `n_frames` tables; `Sheet0`, `Sheet1`, ... when none given.
pub fn derive_display_names(
    n_frames: usize,
    sheet_names: &[String],
) -> Result<Vec<String>, XlsxExportError> {
    if sheet_names.is_empty() {
        return Ok((0..n_frames)
            .map(|n_idx| format!("{C_SHEET_NAME_AUTO_PREFIX}{n_idx}"))
            .collect());
    }
    if sheet_names.len() != n_frames {
        return Err(XlsxExportError::SheetNameCountMismatch {
            n_names: sheet_names.len(),
            n_frames,
        });
    }
    Ok(sheet_names.to_vec())
}

/// `<dir_out>/<file_name>.xlsx`
pub fn derive_output_path(dir_out: &Path, file_name: &str) -> PathBuf {
    dir_out.join(format!("{file_name}.{C_XLSX_FILE_EXTENSION}"))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Export

/// Export `frames` as one workbook with one styled sheet per frame.
///
/// All sheets are planned and validated before anything is written, and the
/// workbook is saved exactly once at the end. An empty `frames` slice still
/// produces a workbook.
pub fn export_dataframes(
    frames: &[DataFrame],
    options: &SpecXlsxExportOptions,
) -> Result<SpecXlsxReport, XlsxExportError> {
    let l_display_names = derive_display_names(frames.len(), &options.sheet_names)?;

    let l_sheet_plans = frames
        .iter()
        .zip(&l_display_names)
        .map(|(df, c_display_name)| plan_sheet(df, c_display_name, options))
        .collect::<Result<Vec<_>, _>>()?;

    let l_sheet_names = l_sheet_plans
        .iter()
        .map(|plan| plan.sheet_name.clone())
        .collect::<Vec<_>>();
    validate_sheet_identifiers(&l_sheet_names)?;

    let path_file_out = derive_output_path(&options.dir_out, &options.file_name);
    info!("Saving to {}...", path_file_out.display());

    let mut writer = XlsxExportWriter::new(path_file_out, &options.formats);
    for (df, plan) in frames.iter().zip(&l_sheet_plans) {
        writer.write_sheet(df, plan)?;
    }
    writer.close()?;
    info!("Saved!");

    let mut report = SpecXlsxReport {
        file_out: writer.path_file_out().to_path_buf(),
        sheets: writer.sheets().to_vec(),
        warnings: vec![],
    };
    if frames.is_empty() {
        report.warn("No frames given; workbook holds only the default blank sheet.");
    }
    Ok(report)
}

/// Stateful workbook writer.
///
/// The workbook is buffered in memory until [`Self::close`]. Dropping an
/// unclosed writer still saves the sheets written so far.
pub struct XlsxExportWriter {
    path_file_out: PathBuf,
    workbook: Workbook,
    style_book: StyleBook,
    l_sheets: Vec<SpecXlsxSheetSummary>,
    if_closed: bool,
}

impl XlsxExportWriter {
    /// Create writer bound to output path and format presets.
    pub fn new(path_file_out: PathBuf, presets: &SpecXlsxFormatPresets) -> Self {
        Self {
            path_file_out,
            workbook: Workbook::new(),
            style_book: StyleBook::new(presets),
            l_sheets: Vec::new(),
            if_closed: false,
        }
    }

    /// Output file path.
    pub fn path_file_out(&self) -> &Path {
        &self.path_file_out
    }

    /// Sheets written so far.
    pub fn sheets(&self) -> &[SpecXlsxSheetSummary] {
        &self.l_sheets
    }

    /// Flush workbook to disk. Idempotent.
    pub fn close(&mut self) -> Result<(), XlsxExportError> {
        if self.if_closed {
            return Ok(());
        }
        self.if_closed = true;
        self.workbook.save(&self.path_file_out)?;
        Ok(())
    }

    /// Render one planned sheet.
    pub fn write_sheet(
        &mut self,
        df: &DataFrame,
        plan: &SpecSheetPlan,
    ) -> Result<(), XlsxExportError> {
        if self.if_closed {
            return Err(XlsxExportError::WriterClosed);
        }
        if plan.n_cols != df.width()
            || plan.n_rows != df.height()
            || plan.columns.len() != df.width()
        {
            return Err(XlsxExportError::PlanMismatch(format!(
                "Sheet plan {:?} expects {}x{}, dataframe is {}x{}.",
                plan.sheet_name,
                plan.n_rows,
                plan.n_cols,
                df.height(),
                df.width()
            )));
        }

        let style_book = &self.style_book;
        let worksheet = self.workbook.add_worksheet();
        worksheet.set_name(&plan.sheet_name)?;
        worksheet.set_column_format(0, style_book.body())?;

        let l_fmt_data_by_col: Vec<Format> = plan
            .columns
            .iter()
            .map(|col_plan| style_book.column_format(col_plan))
            .collect();

        for (n_idx_col, col_plan) in plan.columns.iter().enumerate() {
            let n_col = cast_col_num(N_COL_DATA_START + n_idx_col)?;
            worksheet.set_column_width(n_col, col_plan.width as f64)?;
            worksheet.set_column_format(n_col, &l_fmt_data_by_col[n_idx_col])?;
            worksheet.write_string_with_format(
                cast_row_num(N_ROW_HEADER)?,
                n_col,
                &col_plan.header_text,
                style_book.header(),
            )?;
        }

        write_title(worksheet, &plan.range_title, &plan.title, style_book.title())?;

        for (n_idx_col, column) in df.get_columns().iter().enumerate() {
            let n_col = cast_col_num(N_COL_DATA_START + n_idx_col)?;
            for n_idx_row in 0..plan.n_rows {
                let value = derive_cell_value_from_any_value(column.get(n_idx_row)?);
                write_cell_with_format(
                    worksheet,
                    cast_row_num(N_ROW_DATA_START + n_idx_row)?,
                    n_col,
                    &value,
                    &l_fmt_data_by_col[n_idx_col],
                )?;
            }
        }

        if let Some(range) = &plan.range_autofilter {
            worksheet.autofilter(
                cast_row_num(range.row_first)?,
                cast_col_num(range.col_first)?,
                cast_row_num(range.row_last)?,
                cast_col_num(range.col_last)?,
            )?;
        }

        self.l_sheets.push(SpecXlsxSheetSummary {
            sheet_name: plan.sheet_name.clone(),
            title: plan.title.clone(),
            n_rows: plan.n_rows,
            n_cols: plan.n_cols,
        });
        Ok(())
    }
}

impl Drop for XlsxExportWriter {
    fn drop(&mut self) {
        if self.if_closed {
            return;
        }
        if let Err(err) = self.close() {
            warn!(
                "Failed to finalize {} on drop: {err}",
                self.path_file_out.display()
            );
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region CellWriting

fn write_title(
    worksheet: &mut Worksheet,
    range: &SpecCellRange,
    title: &str,
    fmt_title: &Format,
) -> Result<(), XlsxExportError> {
    if range.is_single_cell() {
        worksheet.write_string_with_format(
            cast_row_num(range.row_first)?,
            cast_col_num(range.col_first)?,
            title,
            fmt_title,
        )?;
    } else {
        worksheet.merge_range(
            cast_row_num(range.row_first)?,
            cast_col_num(range.col_first)?,
            cast_row_num(range.row_last)?,
            cast_col_num(range.col_last)?,
            title,
            fmt_title,
        )?;
    }
    Ok(())
}

fn write_cell_with_format(
    worksheet: &mut Worksheet,
    row_num: u32,
    col_num: u16,
    value: &EnumCellValue,
    format: &Format,
) -> Result<(), XlsxExportError> {
    match value {
        EnumCellValue::None => {
            worksheet.write_blank(row_num, col_num, format)?;
        }
        EnumCellValue::String(val) => {
            worksheet.write_string_with_format(row_num, col_num, val, format)?;
        }
        EnumCellValue::Number(val) => {
            worksheet.write_number_with_format(row_num, col_num, *val, format)?;
        }
        EnumCellValue::Boolean(val) => {
            worksheet.write_boolean_with_format(row_num, col_num, *val, format)?;
        }
    }
    Ok(())
}

fn derive_rust_xlsx_format(spec: &SpecCellFormat) -> Format {
    let mut format = Format::new();

    if let Some(val) = &spec.font_name {
        format = format.set_font_name(val.clone());
    }
    if let Some(val) = spec.font_size {
        format = format.set_font_size(val as f64);
    }
    if spec.bold.unwrap_or(false) {
        format = format.set_bold();
    }
    if spec.italic.unwrap_or(false) {
        format = format.set_italic();
    }

    if let Some(val) = &spec.align
        && let Some(align) = derive_format_align(val)
    {
        format = format.set_align(align);
    }
    if let Some(val) = &spec.valign
        && let Some(align) = derive_format_align(val)
    {
        format = format.set_align(align);
    }

    if let Some(val) = &spec.num_format {
        format = format.set_num_format(val.clone());
    }
    if let Some(val) = &spec.bg_color {
        format = format.set_background_color(val.as_str());
    }
    if let Some(val) = &spec.font_color {
        format = format.set_font_color(val.as_str());
    }
    if let Some(val) = spec.border {
        format = format.set_border(derive_format_border(val));
    }

    format
}

fn derive_format_border(border: i64) -> FormatBorder {
    match border {
        1 => FormatBorder::Thin,
        2 => FormatBorder::Medium,
        3 => FormatBorder::Dashed,
        4 => FormatBorder::Dotted,
        5 => FormatBorder::Thick,
        6 => FormatBorder::Double,
        7 => FormatBorder::Hair,
        _ => FormatBorder::None,
    }
}

fn derive_format_align(align: &str) -> Option<FormatAlign> {
    let value = align.trim().to_ascii_lowercase();
    match value.as_str() {
        "general" => Some(FormatAlign::General),
        "left" => Some(FormatAlign::Left),
        "center" => Some(FormatAlign::Center),
        "right" => Some(FormatAlign::Right),
        "top" => Some(FormatAlign::Top),
        "bottom" => Some(FormatAlign::Bottom),
        "vcenter" | "vertical_center" => Some(FormatAlign::VerticalCenter),
        _ => None,
    }
}

fn cast_row_num(value: usize) -> Result<u32, XlsxExportError> {
    u32::try_from(value)
        .map_err(|_| XlsxExportError::GridOverflow(format!("row index overflow: {value}")))
}

fn cast_col_num(value: usize) -> Result<u16, XlsxExportError> {
    u16::try_from(value)
        .map_err(|_| XlsxExportError::GridOverflow(format!("column index overflow: {value}")))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{EnumColumnFormatDirective, EnumFormatRule};
    use polars::df;
    use polars::prelude::Column;

    #[test]
    fn test_plan_sheet_layout_multi_column() {
        let df = df!(
            "county" => ["Dallas", "Collin", "Denton"],
            "total_pop" => [2_600_000i64, 1_100_000, 950_000]
        )
        .expect("df");

        let plan = plan_sheet(&df, "Population Totals", &SpecXlsxExportOptions::default())
            .expect("plan");

        assert_eq!(plan.title, "Population Totals");
        assert_eq!(plan.sheet_name, "Population totals");
        assert_eq!(
            plan.range_title,
            SpecCellRange {
                row_first: 1,
                col_first: 1,
                row_last: 1,
                col_last: 2
            }
        );
        assert!(!plan.range_title.is_single_cell());
        assert_eq!(
            plan.range_autofilter,
            Some(SpecCellRange {
                row_first: 2,
                col_first: 1,
                row_last: 5,
                col_last: 2
            })
        );
        assert_eq!(plan.columns[1].header_text, "Total Pop");
        assert_eq!(plan.columns[1].rule, EnumFormatRule::IntegerDtype);
        // raw name "total_pop" (9) beats "2600000" (7)
        assert_eq!(plan.columns[1].width, 9 + 6);
    }

    #[test]
    fn test_plan_sheet_single_column_title_is_single_cell() {
        let df = df!("value" => [1.5f64, 2.5]).expect("df");
        let plan = plan_sheet(&df, "Only", &SpecXlsxExportOptions::default()).expect("plan");

        assert!(plan.range_title.is_single_cell());
        assert_eq!(plan.range_title.col_first, 1);
        assert_eq!(
            plan.range_autofilter,
            Some(SpecCellRange {
                row_first: 2,
                col_first: 1,
                row_last: 4,
                col_last: 1
            })
        );
    }

    #[test]
    fn test_plan_sheet_without_columns_has_no_autofilter() {
        let df = DataFrame::empty();
        let plan = plan_sheet(&df, "Empty", &SpecXlsxExportOptions::default()).expect("plan");

        assert_eq!(plan.n_cols, 0);
        assert!(plan.columns.is_empty());
        assert!(plan.range_title.is_single_cell());
        assert_eq!(plan.range_autofilter, None);
    }

    #[test]
    fn test_plan_sheet_raw_names_when_not_friendly() {
        let df = df!("pct_change" => [0.05f64, 0.10]).expect("df");
        let options = SpecXlsxExportOptions {
            if_friendly_names: false,
            ..Default::default()
        };
        let plan = plan_sheet(&df, "median_income", &options).expect("plan");

        assert_eq!(plan.sheet_name, "median_income");
        assert_eq!(plan.columns[0].header_text, "pct_change");
    }

    #[test]
    fn test_plan_sheet_applies_directive_by_display_name() {
        let df = df!("count" => [1i64, 2, 3]).expect("df");
        let options = SpecXlsxExportOptions::default().with_column_format(
            "Sales",
            "count",
            "percent",
        );

        let plan = plan_sheet(&df, "Sales", &options).expect("plan");
        assert_eq!(
            plan.columns[0].number_format,
            EnumResolvedNumberFormat::Style(EnumNumberStyle::Percent)
        );

        let plan = plan_sheet(&df, "Other", &options).expect("plan");
        assert_eq!(
            plan.columns[0].number_format,
            EnumResolvedNumberFormat::Style(EnumNumberStyle::Thousands)
        );
    }

    #[test]
    fn test_width_measures_raw_name_under_friendly_header() {
        let column = Column::new("a_b".into(), &[1i64]);
        let df = DataFrame::new(vec![column]).expect("df");
        let plan = plan_sheet(&df, "T", &SpecXlsxExportOptions::default()).expect("plan");

        assert_eq!(plan.columns[0].header_text, "A B");
        assert_eq!(plan.columns[0].width, 3 + 6);
    }

    #[test]
    fn test_derive_display_names() {
        assert_eq!(
            derive_display_names(2, &[]).expect("names"),
            vec!["Sheet0".to_string(), "Sheet1".to_string()]
        );
        assert!(derive_display_names(0, &[]).expect("names").is_empty());

        let err = derive_display_names(2, &["Only".to_string()]).expect_err("mismatch");
        assert!(matches!(
            err,
            XlsxExportError::SheetNameCountMismatch {
                n_names: 1,
                n_frames: 2
            }
        ));
    }

    #[test]
    fn test_style_book_custom_pattern_is_one_off() {
        let style_book = StyleBook::new(&SpecXlsxFormatPresets::default());
        let col_plan = SpecColumnPlan {
            name: "x".to_string(),
            header_text: "X".to_string(),
            kind: EnumColumnKind::Float,
            width: 8,
            number_format: EnumResolvedNumberFormat::Custom("0.000".to_string()),
            rule: EnumFormatRule::Directive,
        };

        let fmt_custom = style_book.column_format(&col_plan);
        for style in EnumNumberStyle::all() {
            assert_ne!(&fmt_custom, style_book.style(style));
        }
        assert_eq!(style_book.dict_fmt_by_style.len(), EnumNumberStyle::all().len());

        let directive = EnumColumnFormatDirective::from("0.000");
        assert_eq!(
            directive,
            EnumColumnFormatDirective::Custom("0.000".to_string())
        );
    }

    #[test]
    fn test_writer_rejects_write_after_close() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let df = df!("a" => [1i64]).expect("df");
        let options = SpecXlsxExportOptions::default();
        let plan = plan_sheet(&df, "A", &options).expect("plan");

        let mut writer = XlsxExportWriter::new(tmp.path().join("closed.xlsx"), &options.formats);
        writer.close().expect("close");
        writer.close().expect("close is idempotent");

        let err = writer.write_sheet(&df, &plan).expect_err("closed");
        assert!(matches!(err, XlsxExportError::WriterClosed));
    }

    #[test]
    fn test_writer_rejects_mismatched_plan() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let df_planned = df!("a" => [1i64], "b" => [2i64]).expect("df");
        let df_other = df!("a" => [1i64]).expect("df");
        let options = SpecXlsxExportOptions::default();
        let plan = plan_sheet(&df_planned, "A", &options).expect("plan");

        let mut writer =
            XlsxExportWriter::new(tmp.path().join("mismatch.xlsx"), &options.formats);
        let err = writer.write_sheet(&df_other, &plan).expect_err("mismatch");
        assert!(matches!(err, XlsxExportError::PlanMismatch(_)));
        writer.close().expect("close");
    }

    #[test]
    fn test_writer_drop_finalizes_written_sheets() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path_file_out = tmp.path().join("dropped.xlsx");
        let df = df!("a" => [1i64, 2]).expect("df");
        let options = SpecXlsxExportOptions::default();
        let plan = plan_sheet(&df, "A", &options).expect("plan");

        {
            let mut writer = XlsxExportWriter::new(path_file_out.clone(), &options.formats);
            writer.write_sheet(&df, &plan).expect("write");
            assert_eq!(writer.sheets().len(), 1);
        }

        assert!(path_file_out.exists());
    }
}
