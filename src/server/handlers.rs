use axum::extract::multipart::{Field, MultipartError};
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::drive::ObjectStore;
use crate::report::{ImageBlob, RawField, RawSubmission};
use crate::sheets::SheetStore;
use crate::submission::{OutcomeKind, SubmissionOutcome, Submitter};

pub const MSG_UNREADABLE_FORM: &str = "The submitted form could not be read.";

pub async fn health() -> &'static str {
    "ok"
}

/// Accept one multipart report and answer with the submission outcome
pub async fn guard_upload<O: ObjectStore, S: SheetStore>(
    State(submitter): State<Arc<Submitter<O, S>>>,
    multipart: Multipart,
) -> Response {
    let raw = match read_form(multipart).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!("Rejected unreadable form: {}", e.body_text());
            let body = json!({ "success": false, "message": MSG_UNREADABLE_FORM });
            return (e.status(), Json(body)).into_response();
        }
    };

    let outcome = submitter.submit(raw).await;
    (status_for(&outcome), Json(outcome)).into_response()
}

pub fn status_for(outcome: &SubmissionOutcome) -> StatusCode {
    match outcome.kind {
        OutcomeKind::Committed => StatusCode::OK,
        OutcomeKind::Rejected => StatusCode::UNPROCESSABLE_ENTITY,
        OutcomeKind::Misconfigured => StatusCode::SERVICE_UNAVAILABLE,
        OutcomeKind::UploadFailed | OutcomeKind::AppendFailed => StatusCode::BAD_GATEWAY,
        OutcomeKind::Unexpected => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Collect every named part. Parts with a file name become files, the rest text.
async fn read_form(mut multipart: Multipart) -> Result<RawSubmission, MultipartError> {
    let mut raw = RawSubmission::new();
    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        let value = read_field(field).await?;
        raw.insert(name, value);
    }
    debug!("Read {} form field(s)", raw.len());
    Ok(raw)
}

async fn read_field(field: Field<'_>) -> Result<RawField, MultipartError> {
    match field.file_name().map(str::to_string) {
        Some(file_name) => {
            let mime_type = field.content_type().unwrap_or_default().to_string();
            let data = field.bytes().await?;
            Ok(RawField::File(ImageBlob::new(file_name, mime_type, data)))
        }
        None => Ok(RawField::Text(field.text().await?)),
    }
}
