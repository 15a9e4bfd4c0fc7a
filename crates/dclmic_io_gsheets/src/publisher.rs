//! Publish one DataFrame to a cloud spreadsheet.

use log::{info, warn};
use polars::prelude::DataFrame;

use crate::conf::C_SHEET_TITLE_FALLBACK;
use crate::report::ReportPublish;
use crate::spec::{
    EnumSheetSelector, SheetsClient, SheetsPublishError, SpecSheetsPublishOptions,
    SpecWorkbookRef, SpecWorksheetRef,
};
use crate::util::derive_sheet_values;

const C_STEP_AUTHENTICATE: &str = "authenticate";
const C_STEP_CREATE: &str = "create_workbook";
const C_STEP_SHARE: &str = "share_workbook";
const C_STEP_OPEN: &str = "open_workbook";
const C_STEP_SELECT: &str = "select_worksheet";
const C_STEP_CLEAR: &str = "clear_worksheet";
const C_STEP_UPDATE: &str = "update_values";

/// Write `df` (header row first) into the selected sheet of a remote workbook.
///
/// Options are validated up front and the dataframe is converted before any
/// remote call. Remote failures never surface as `Err`: each step logs and
/// records its own failure, then the run either stops (authenticate, create,
/// open, select, update) or carries on (share, clear).
pub fn publish_dataframe<C>(
    client: &mut C,
    df: &DataFrame,
    options: &SpecSheetsPublishOptions,
) -> Result<ReportPublish, SheetsPublishError>
where
    C: SheetsClient + ?Sized,
{
    validate_publish_options(options)?;
    let l_values = derive_sheet_values(df)?;

    info!(
        "Loading in df with {} columns and {} rows",
        df.width(),
        df.height()
    );
    let mut report = ReportPublish::default();

    if let Err(err) = client.authenticate(&options.path_credentials) {
        return Ok(abort(report, C_STEP_AUTHENTICATE, err));
    }
    report.add_step(C_STEP_AUTHENTICATE);

    if options.if_new_book {
        info!("Creating new workbook {:?}", options.workbook_name);
        let workbook = match client.create_workbook(&options.workbook_name) {
            Ok(workbook) => workbook,
            Err(err) => return Ok(abort(report, C_STEP_CREATE, err)),
        };
        report.add_step(C_STEP_CREATE);

        if let Some(c_email) = &options.share_with {
            match client.share_workbook(&workbook, c_email, options.share_role) {
                Ok(()) => report.add_step(C_STEP_SHARE),
                Err(err) => {
                    warn!("[GSHEETS] {C_STEP_SHARE} failed: {err}");
                    report.add_error(C_STEP_SHARE, err);
                }
            }
        }
    }

    info!("Opening workbook...");
    let workbook = match client.open_workbook(&options.workbook_name) {
        Ok(workbook) => workbook,
        Err(err) => return Ok(abort(report, C_STEP_OPEN, err)),
    };
    report.add_step(C_STEP_OPEN);

    info!("Selecting worksheet {}...", options.sheet);
    let worksheet = match select_worksheet(client, &workbook, options, &mut report) {
        Ok(worksheet) => worksheet,
        Err(err) => return Ok(abort(report, C_STEP_SELECT, err)),
    };
    report.add_step(C_STEP_SELECT);
    report.sheet_title = Some(worksheet.title.clone());

    if !options.if_new_book && options.if_clear {
        match client.clear_worksheet(&workbook, &worksheet) {
            Ok(()) => report.add_step(C_STEP_CLEAR),
            Err(err) => {
                warn!("[GSHEETS] {C_STEP_CLEAR} failed: {err}");
                report.add_error(C_STEP_CLEAR, err);
            }
        }
    }

    info!("Updating workbook...");
    match client.update_values(&workbook, &worksheet, &l_values) {
        Ok(response) => {
            info!(
                "Success! Spreadsheet ID: {} Rows added: {}",
                response.spreadsheet_id, response.updated_rows
            );
            report.add_step(C_STEP_UPDATE);
            report.spreadsheet_id = Some(response.spreadsheet_id);
            report.updated_rows = response.updated_rows;
        }
        Err(err) => return Ok(abort(report, C_STEP_UPDATE, err)),
    }

    info!("{report}");
    Ok(report)
}

/// Look the sheet up; a missing sheet (or a failed lookup) adds a new one.
fn select_worksheet<C>(
    client: &mut C,
    workbook: &SpecWorkbookRef,
    options: &SpecSheetsPublishOptions,
    report: &mut ReportPublish,
) -> Result<SpecWorksheetRef, String>
where
    C: SheetsClient + ?Sized,
{
    let (res_lookup, c_title_new) = match &options.sheet {
        EnumSheetSelector::Index(n_idx) => (
            client.worksheet_by_index(workbook, *n_idx),
            C_SHEET_TITLE_FALLBACK,
        ),
        EnumSheetSelector::Name(c_name) => {
            (client.worksheet_by_name(workbook, c_name), c_name.as_str())
        }
    };

    let c_reason = match res_lookup {
        Ok(Some(worksheet)) => return Ok(worksheet),
        Ok(None) => format!("Worksheet {} not found", options.sheet),
        Err(err) => format!("Worksheet {} lookup failed: {err}", options.sheet),
    };
    warn!("[GSHEETS] {c_reason}; adding {c_title_new:?}");
    report.warnings.push(c_reason);

    client.add_worksheet(
        workbook,
        c_title_new,
        options.n_rows_new_sheet,
        options.n_cols_new_sheet,
    )
}

fn abort(mut report: ReportPublish, step: &str, err: String) -> ReportPublish {
    warn!("[GSHEETS] {step} failed: {err}");
    report.add_error(step, err);
    report.if_aborted = true;
    info!("{report}");
    report
}

fn validate_publish_options(options: &SpecSheetsPublishOptions) -> Result<(), SheetsPublishError> {
    if options.workbook_name.trim().is_empty() {
        return Err(SheetsPublishError::InvalidOptions(
            "workbook_name must not be empty.".to_string(),
        ));
    }
    if let EnumSheetSelector::Name(c_name) = &options.sheet
        && c_name.trim().is_empty()
    {
        return Err(SheetsPublishError::InvalidOptions(
            "Sheet name selector must not be empty.".to_string(),
        ));
    }
    if options.n_rows_new_sheet == 0 || options.n_cols_new_sheet == 0 {
        return Err(SheetsPublishError::InvalidOptions(
            "New sheet dimensions must be at least 1x1.".to_string(),
        ));
    }
    if options.share_with.as_deref().is_some_and(|c| c.trim().is_empty()) {
        return Err(SheetsPublishError::InvalidOptions(
            "share_with must not be empty when given.".to_string(),
        ));
    }
    Ok(())
}
