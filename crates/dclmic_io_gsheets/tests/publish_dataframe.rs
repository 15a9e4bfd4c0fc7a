use std::collections::BTreeSet;
use std::path::Path;

use dclmic_io_gsheets::{
    EnumRunOutcome, EnumShareRole, EnumSheetSelector, SheetsClient, SheetsPublishError,
    SpecSheetsPublishOptions, SpecUpdateResponse, SpecWorkbookRef, SpecWorksheetRef,
    publish_dataframe,
};
use polars::df;
use polars::prelude::DataFrame;
use serde_json::{Value, json};

/// In-memory workbook store that can be told to fail named calls.
#[derive(Default)]
struct FakeSheetsClient {
    l_sheet_titles: Vec<String>,
    l_calls: Vec<String>,
    set_fail: BTreeSet<&'static str>,
    l_written: Vec<Vec<Value>>,
    l_added: Vec<(String, usize, usize)>,
}

impl FakeSheetsClient {
    fn with_sheets(titles: &[&str]) -> Self {
        Self {
            l_sheet_titles: titles.iter().map(|c| c.to_string()).collect(),
            ..Default::default()
        }
    }

    fn failing(mut self, call: &'static str) -> Self {
        self.set_fail.insert(call);
        self
    }

    fn record(&mut self, call: &'static str) -> Result<(), String> {
        self.l_calls.push(call.to_string());
        if self.set_fail.contains(call) {
            return Err(format!("{call} refused"));
        }
        Ok(())
    }

    fn sheet_ref(&self, index: usize) -> SpecWorksheetRef {
        SpecWorksheetRef {
            id: index as u64 + 100,
            title: self.l_sheet_titles[index].clone(),
            index,
        }
    }
}

impl SheetsClient for FakeSheetsClient {
    fn authenticate(&mut self, _path_credentials: &Path) -> Result<(), String> {
        self.record("authenticate")
    }

    fn create_workbook(&mut self, name: &str) -> Result<SpecWorkbookRef, String> {
        self.record("create_workbook")?;
        self.l_sheet_titles = vec!["Sheet1".to_string()];
        Ok(SpecWorkbookRef {
            id: "wb-1".to_string(),
            name: name.to_string(),
        })
    }

    fn share_workbook(
        &mut self,
        _workbook: &SpecWorkbookRef,
        _email: &str,
        _role: EnumShareRole,
    ) -> Result<(), String> {
        self.record("share_workbook")
    }

    fn open_workbook(&mut self, name: &str) -> Result<SpecWorkbookRef, String> {
        self.record("open_workbook")?;
        Ok(SpecWorkbookRef {
            id: "wb-1".to_string(),
            name: name.to_string(),
        })
    }

    fn worksheet_by_index(
        &mut self,
        _workbook: &SpecWorkbookRef,
        index: usize,
    ) -> Result<Option<SpecWorksheetRef>, String> {
        self.record("worksheet_by_index")?;
        Ok((index < self.l_sheet_titles.len()).then(|| self.sheet_ref(index)))
    }

    fn worksheet_by_name(
        &mut self,
        _workbook: &SpecWorkbookRef,
        name: &str,
    ) -> Result<Option<SpecWorksheetRef>, String> {
        self.record("worksheet_by_name")?;
        Ok(self
            .l_sheet_titles
            .iter()
            .position(|c| c == name)
            .map(|n_idx| self.sheet_ref(n_idx)))
    }

    fn add_worksheet(
        &mut self,
        _workbook: &SpecWorkbookRef,
        title: &str,
        n_rows: usize,
        n_cols: usize,
    ) -> Result<SpecWorksheetRef, String> {
        self.record("add_worksheet")?;
        self.l_sheet_titles.push(title.to_string());
        self.l_added.push((title.to_string(), n_rows, n_cols));
        Ok(self.sheet_ref(self.l_sheet_titles.len() - 1))
    }

    fn clear_worksheet(
        &mut self,
        _workbook: &SpecWorkbookRef,
        _worksheet: &SpecWorksheetRef,
    ) -> Result<(), String> {
        self.record("clear_worksheet")
    }

    fn update_values(
        &mut self,
        workbook: &SpecWorkbookRef,
        _worksheet: &SpecWorksheetRef,
        values: &[Vec<Value>],
    ) -> Result<SpecUpdateResponse, String> {
        self.record("update_values")?;
        self.l_written = values.to_vec();
        Ok(SpecUpdateResponse {
            spreadsheet_id: workbook.id.clone(),
            updated_rows: values.len() as u64,
            updated_columns: values.first().map_or(0, |row| row.len() as u64),
        })
    }
}

fn derive_frame() -> DataFrame {
    df!("county" => ["Dallas", "Collin"], "pop" => [2_600_000i64, 1_100_000]).expect("df")
}

#[test]
fn test_publish_new_book_writes_header_and_rows() {
    let mut client = FakeSheetsClient::default();
    let options = SpecSheetsPublishOptions {
        workbook_name: "County pop".to_string(),
        share_with: Some("analyst@example.org".to_string()),
        ..Default::default()
    };

    let report = publish_dataframe(&mut client, &derive_frame(), &options).expect("publish");

    assert_eq!(
        client.l_calls,
        vec![
            "authenticate",
            "create_workbook",
            "share_workbook",
            "open_workbook",
            "worksheet_by_index",
            "update_values",
        ]
    );
    assert_eq!(
        client.l_written,
        vec![
            vec![json!("county"), json!("pop")],
            vec![json!("Dallas"), json!(2_600_000)],
            vec![json!("Collin"), json!(1_100_000)],
        ]
    );
    assert_eq!(report.spreadsheet_id.as_deref(), Some("wb-1"));
    assert_eq!(report.updated_rows, 3);
    assert_eq!(report.sheet_title.as_deref(), Some("Sheet1"));
    assert_eq!(report.outcome(), EnumRunOutcome::Success);
}

#[test]
fn test_publish_float32_values_keep_short_form() {
    let mut client = FakeSheetsClient::with_sheets(&["Data"]);
    let df = df!("share" => [Some(0.1f32), None, Some(2.0)]).expect("df");
    let options = SpecSheetsPublishOptions {
        if_new_book: false,
        ..Default::default()
    };

    publish_dataframe(&mut client, &df, &options).expect("publish");

    assert_eq!(
        client.l_written,
        vec![
            vec![json!("share")],
            vec![json!(0.1)],
            vec![json!("")],
            vec![json!(2.0)],
        ]
    );
}

#[test]
fn test_publish_stops_after_failed_authentication() {
    let mut client = FakeSheetsClient::default().failing("authenticate");

    let report = publish_dataframe(
        &mut client,
        &derive_frame(),
        &SpecSheetsPublishOptions::default(),
    )
    .expect("publish");

    assert_eq!(client.l_calls, vec!["authenticate"]);
    assert!(report.if_aborted);
    assert_eq!(report.errors[0].step, "authenticate");
    assert_eq!(report.outcome(), EnumRunOutcome::Failed);
}

#[test]
fn test_publish_missing_index_adds_fallback_sheet() {
    let mut client = FakeSheetsClient::with_sheets(&["Data"]);
    let options = SpecSheetsPublishOptions {
        sheet: EnumSheetSelector::Index(3),
        if_new_book: false,
        if_clear: false,
        ..Default::default()
    };

    let report = publish_dataframe(&mut client, &derive_frame(), &options).expect("publish");

    assert_eq!(
        client.l_added,
        vec![("NewSheet".to_string(), 100_000, 200)]
    );
    assert_eq!(report.sheet_title.as_deref(), Some("NewSheet"));
    assert_eq!(report.warning_count(), 1);
    assert!(!client.l_calls.contains(&"clear_worksheet".to_string()));
    assert_eq!(report.outcome(), EnumRunOutcome::Success);
}

#[test]
fn test_publish_missing_name_adds_named_sheet_and_clears() {
    let mut client = FakeSheetsClient::with_sheets(&["Data"]);
    let options = SpecSheetsPublishOptions {
        sheet: EnumSheetSelector::from("Summary"),
        if_new_book: false,
        ..Default::default()
    };

    let report = publish_dataframe(&mut client, &derive_frame(), &options).expect("publish");

    assert_eq!(client.l_added[0].0, "Summary");
    assert!(client.l_calls.contains(&"clear_worksheet".to_string()));
    assert_eq!(report.sheet_title.as_deref(), Some("Summary"));
}

#[test]
fn test_publish_failed_share_and_clear_continue() {
    let mut client = FakeSheetsClient::with_sheets(&["Data"])
        .failing("share_workbook")
        .failing("clear_worksheet");
    let options = SpecSheetsPublishOptions {
        share_with: Some("analyst@example.org".to_string()),
        ..Default::default()
    };

    let report = publish_dataframe(&mut client, &derive_frame(), &options).expect("publish");
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].step, "share_workbook");
    assert_eq!(report.outcome(), EnumRunOutcome::Partial);

    let mut client = FakeSheetsClient::with_sheets(&["Data"]).failing("clear_worksheet");
    let options = SpecSheetsPublishOptions {
        if_new_book: false,
        ..Default::default()
    };
    let report = publish_dataframe(&mut client, &derive_frame(), &options).expect("publish");
    assert_eq!(report.errors[0].step, "clear_worksheet");
    assert_eq!(client.l_calls.last().map(String::as_str), Some("update_values"));
    assert_eq!(report.outcome(), EnumRunOutcome::Partial);
}

#[test]
fn test_publish_failed_update_is_failed_outcome() {
    let mut client = FakeSheetsClient::default().failing("update_values");

    let report = publish_dataframe(
        &mut client,
        &derive_frame(),
        &SpecSheetsPublishOptions::default(),
    )
    .expect("publish");

    assert!(report.if_aborted);
    assert_eq!(report.spreadsheet_id, None);
    assert_eq!(report.outcome(), EnumRunOutcome::Failed);
}

#[test]
fn test_publish_rejects_invalid_options_before_any_call() {
    let mut client = FakeSheetsClient::default();
    let options = SpecSheetsPublishOptions {
        workbook_name: "  ".to_string(),
        ..Default::default()
    };

    let err = publish_dataframe(&mut client, &derive_frame(), &options).expect_err("invalid");
    assert!(matches!(err, SheetsPublishError::InvalidOptions(_)));
    assert!(client.l_calls.is_empty());
}
