pub mod error;
#[cfg(test)]
pub mod fake;
pub mod google;
pub mod schema;
pub mod storage;

pub use error::SheetsError;
#[cfg(test)]
pub use fake::FakeSheetStore;
pub use google::GoogleSheets;
pub use schema::{ColumnKey, HeaderSchema, SheetRow};
pub use storage::SheetStore;
