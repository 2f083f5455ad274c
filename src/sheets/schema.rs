use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::report::ImageLocation;

/// Logical data key that fills a sheet column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKey {
    Timestamp,
    GuardName,
    LightsOffLocation,
    LockedLocation,
    RoundsCompleted,
    Image(ImageLocation),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub display_name: String,
    pub key: ColumnKey,
}

/// Ordered mapping from display column name to the data key behind it.
///
/// Written once as the first row of a sheet; every data row is positioned by it.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderSchema {
    columns: Vec<Column>,
}

static GUARD_REPORT_SCHEMA: Lazy<HeaderSchema> = Lazy::new(|| {
    let mut columns = vec![
        ("Timestamp".to_string(), ColumnKey::Timestamp),
        ("Guard Name".to_string(), ColumnKey::GuardName),
        ("Lights Off Location".to_string(), ColumnKey::LightsOffLocation),
        ("Locked Location".to_string(), ColumnKey::LockedLocation),
        ("Rounds Completed".to_string(), ColumnKey::RoundsCompleted),
    ];
    // Image columns keep the `<fieldId>Url` headings existing sheets were created with
    columns.extend(
        ImageLocation::ALL
            .into_iter()
            .map(|location| (format!("{}Url", location.field_id()), ColumnKey::Image(location))),
    );
    HeaderSchema::new(columns)
});

impl HeaderSchema {
    pub fn new(columns: impl IntoIterator<Item = (String, ColumnKey)>) -> Self {
        Self {
            columns: columns
                .into_iter()
                .map(|(display_name, key)| Column { display_name, key })
                .collect(),
        }
    }

    /// The schema of the guard report sheet
    pub fn guard_report() -> &'static HeaderSchema {
        &GUARD_REPORT_SCHEMA
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn display_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.display_name.clone()).collect()
    }

    /// Position `values` by column order. Keys without a value become empty cells.
    pub fn arrange(&self, values: &HashMap<ColumnKey, String>) -> SheetRow {
        SheetRow(
            self.columns
                .iter()
                .map(|column| values.get(&column.key).cloned().unwrap_or_default())
                .collect(),
        )
    }

    /// Index of the column filled by `key`
    pub fn position(&self, key: ColumnKey) -> Option<usize> {
        self.columns.iter().position(|c| c.key == key)
    }
}

/// One data row, already in header order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRow(Vec<String>);

impl SheetRow {
    pub fn values(&self) -> &[String] {
        &self.0
    }

    pub fn into_values(self) -> Vec<String> {
        self.0
    }
}
