use crate::sheets::error::SheetsError;
use crate::sheets::schema::{HeaderSchema, SheetRow};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// Row-oriented spreadsheet interface used to record reports
#[async_trait]
pub trait SheetStore: Send + Sync + 'static {
    /// Values of the first row of `sheet`; empty when the sheet has no rows
    async fn read_first_row(&self, sheet: &str) -> Result<Vec<String>, SheetsError>;

    /// Append `rows` after the last non-empty row of `sheet`
    async fn append_values(&self, sheet: &str, rows: Vec<Vec<String>>) -> Result<(), SheetsError>;

    /// Append one data row, writing the header first when the sheet is empty.
    ///
    /// An existing first row is never compared against or rewritten.
    async fn append_row(
        &self,
        sheet: &str,
        schema: &HeaderSchema,
        row: &SheetRow,
    ) -> Result<(), SheetsError> {
        if self.read_first_row(sheet).await?.is_empty() {
            info!("Sheet {} is empty, writing header row", sheet);
            self.append_values(sheet, vec![schema.display_names()]).await?;
        }
        self.append_values(sheet, vec![row.values().to_vec()]).await
    }
}

#[async_trait]
impl<T: SheetStore + ?Sized> SheetStore for Arc<T> {
    async fn read_first_row(&self, sheet: &str) -> Result<Vec<String>, SheetsError> {
        (**self).read_first_row(sheet).await
    }

    async fn append_values(&self, sheet: &str, rows: Vec<Vec<String>>) -> Result<(), SheetsError> {
        (**self).append_values(sheet, rows).await
    }

    async fn append_row(
        &self,
        sheet: &str,
        schema: &HeaderSchema,
        row: &SheetRow,
    ) -> Result<(), SheetsError> {
        (**self).append_row(sheet, schema, row).await
    }
}
