use chrono::{DateTime, SecondsFormat, Utc};
use futures::FutureExt;
use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::drive::ObjectStore;
use crate::report::{ImageBlob, RawSubmission, ReportValidator, ValidatedReport};
use crate::sheets::{ColumnKey, HeaderSchema, SheetStore};
use crate::stream::to_stream;
use crate::submission::outcome::{SubmissionOutcome, SubmitError};

/// Cell value for a location without a photo
pub const NO_FILE_UPLOADED: &str = "No file uploaded";
/// Cell value for a stored photo the store returned no link for
pub const UPLOAD_FAILED: &str = "Upload Failed";

const DEFAULT_EXTENSION: &str = "jpg";
const DEFAULT_MIME_TYPE: &str = "image/jpeg";

/// Drives one report from raw form to stored photos and an appended row
pub struct Submitter<O: ObjectStore, S: SheetStore> {
    object_store: Arc<O>,
    sheet_store: Arc<S>,
    validator: ReportValidator,
    sheet_name: String,
}

/// Extension of an uploaded file name, `jpg` when there is none
pub fn file_extension(original_name: &str) -> &str {
    match original_name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() && !ext.contains(['/', '\\']) => ext,
        _ => DEFAULT_EXTENSION,
    }
}

/// Name a photo is stored under: `{timestamp}_{fieldId}.{ext}`
pub fn stored_file_name(timestamp: &str, field_id: &str, original_name: &str) -> String {
    format!(
        "{}_{}.{}",
        timestamp,
        field_id,
        file_extension(original_name)
    )
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}

impl<O: ObjectStore, S: SheetStore> Submitter<O, S> {
    pub fn new(
        object_store: O,
        sheet_store: S,
        validator: ReportValidator,
        sheet_name: impl Into<String>,
    ) -> Self {
        Self {
            object_store: Arc::new(object_store),
            sheet_store: Arc::new(sheet_store),
            validator,
            sheet_name: sheet_name.into(),
        }
    }

    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }

    /// Run the whole pipeline and turn its result into a client outcome.
    ///
    /// Never fails: every error, including a panic in the pipeline, becomes
    /// an unsuccessful outcome.
    pub async fn submit(&self, raw: RawSubmission) -> SubmissionOutcome {
        let result = AssertUnwindSafe(self.run(&raw, Utc::now()))
            .catch_unwind()
            .await
            .unwrap_or_else(|payload| Err(SubmitError::Unexpected(panic_message(payload))));

        match result {
            Ok(()) => SubmissionOutcome::committed(),
            Err(err) => {
                match &err {
                    SubmitError::Validation(errors) => {
                        info!("Report rejected: {} invalid field(s)", errors.len())
                    }
                    other => error!("Report submission failed: {}", other),
                }
                err.into()
            }
        }
    }

    /// Validate, upload photos in fixed order, then append the row
    pub async fn run(&self, raw: &RawSubmission, now: DateTime<Utc>) -> Result<(), SubmitError> {
        let report = self.validator.validate(raw).map_err(SubmitError::Validation)?;

        let timestamp = now.to_rfc3339_opts(SecondsFormat::Millis, true);
        info!(
            "Submitting report from {} with {} photo(s) at {}",
            report.guard_name(),
            report.images().present_count(),
            timestamp
        );

        let mut values = self.scalar_values(&report, &timestamp);

        for (location, blob) in report.images().iter() {
            let cell = match blob {
                None => NO_FILE_UPLOADED.to_string(),
                Some(blob) => {
                    let name = stored_file_name(&timestamp, location.field_id(), &blob.file_name);
                    self.upload(&name, blob)
                        .await
                        .map_err(|e| SubmitError::upload(location, e))?
                }
            };
            values.insert(ColumnKey::Image(location), cell);
        }

        let schema = HeaderSchema::guard_report();
        let row = schema.arrange(&values);
        self.sheet_store
            .append_row(&self.sheet_name, schema, &row)
            .await
            .map_err(SubmitError::append)?;

        info!("Report from {} recorded in {}", report.guard_name(), self.sheet_name);
        Ok(())
    }

    fn scalar_values(&self, report: &ValidatedReport, timestamp: &str) -> HashMap<ColumnKey, String> {
        HashMap::from([
            (ColumnKey::Timestamp, timestamp.to_string()),
            (ColumnKey::GuardName, report.guard_name().to_string()),
            (
                ColumnKey::LightsOffLocation,
                report.lights_off_location().as_str().to_string(),
            ),
            (
                ColumnKey::LockedLocation,
                report.locked_location().as_str().to_string(),
            ),
            (
                ColumnKey::RoundsCompleted,
                report.rounds_completed().as_str().to_string(),
            ),
        ])
    }

    /// Store one photo and return the cell value that points at it
    async fn upload(&self, name: &str, blob: &ImageBlob) -> Result<String, crate::drive::DriveError> {
        let mime_type = if blob.mime_type.is_empty() {
            DEFAULT_MIME_TYPE
        } else {
            blob.mime_type.as_str()
        };
        debug!("Uploading {} ({} bytes, {})", name, blob.size, mime_type);

        let stored = self
            .object_store
            .upload_object(name, mime_type, to_stream(blob.clone()))
            .await?;

        Ok(match stored.view_url {
            Some(url) => url,
            None => {
                warn!("Stored {} as {} but no view link was returned", name, stored.id);
                UPLOAD_FAILED.to_string()
            }
        })
    }
}
