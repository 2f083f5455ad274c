use crate::sheets::error::SheetsError;
use crate::sheets::storage::SheetStore;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// `FakeSheetStore` keeps sheet rows in memory and counts the calls made to it.
#[derive(Clone, Default)]
pub struct FakeSheetStore {
    sheets: Arc<Mutex<HashMap<String, Vec<Vec<String>>>>>,
    reads: Arc<Mutex<usize>>,
    appends: Arc<Mutex<usize>>,
    fail_append: Arc<Mutex<bool>>,
    misconfigured: Arc<Mutex<bool>>,
}

impl FakeSheetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a sheet
    pub fn with_rows(self, sheet: &str, rows: Vec<Vec<String>>) -> Self {
        self.sheets.lock().unwrap().insert(sheet.to_string(), rows);
        self
    }

    /// Fail every append with a network error
    pub fn fake_fail_append(&self) {
        *self.fail_append.lock().unwrap() = true;
    }

    /// Reject every call as if the spreadsheet were not shared with the account
    pub fn fake_misconfigure(&self) {
        *self.misconfigured.lock().unwrap() = true;
    }

    pub fn rows(&self, sheet: &str) -> Vec<Vec<String>> {
        self.sheets
            .lock()
            .unwrap()
            .get(sheet)
            .cloned()
            .unwrap_or_default()
    }

    pub fn read_calls(&self) -> usize {
        *self.reads.lock().unwrap()
    }

    pub fn append_calls(&self) -> usize {
        *self.appends.lock().unwrap()
    }

    fn check_configured(&self, sheet: &str) -> Result<(), SheetsError> {
        if *self.misconfigured.lock().unwrap() {
            return Err(SheetsError::Rejected {
                range: sheet.to_string(),
                status: 403,
                detail: "Simulated permission denied".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl SheetStore for FakeSheetStore {
    async fn read_first_row(&self, sheet: &str) -> Result<Vec<String>, SheetsError> {
        *self.reads.lock().unwrap() += 1;
        self.check_configured(sheet)?;
        Ok(self
            .sheets
            .lock()
            .unwrap()
            .get(sheet)
            .and_then(|rows| rows.first().cloned())
            .unwrap_or_default())
    }

    async fn append_values(&self, sheet: &str, rows: Vec<Vec<String>>) -> Result<(), SheetsError> {
        *self.appends.lock().unwrap() += 1;
        self.check_configured(sheet)?;
        if *self.fail_append.lock().unwrap() {
            return Err(SheetsError::Network(
                sheet.to_string(),
                "Simulated failure".to_string(),
            ));
        }
        self.sheets
            .lock()
            .unwrap()
            .entry(sheet.to_string())
            .or_default()
            .extend(rows);
        Ok(())
    }
}
