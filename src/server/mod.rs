//! HTTP entry point for report submissions

pub mod handlers;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;

use crate::drive::ObjectStore;
use crate::sheets::SheetStore;
use crate::submission::Submitter;

pub const UPLOAD_PATH: &str = "/api/guard-upload";
pub const HEALTH_PATH: &str = "/health";

/// Build the service router.
///
/// `body_limit` caps the size of a whole multipart request in bytes.
pub fn router<O: ObjectStore, S: SheetStore>(
    submitter: Arc<Submitter<O, S>>,
    body_limit: usize,
) -> Router {
    Router::new()
        .route(UPLOAD_PATH, post(handlers::guard_upload::<O, S>))
        .route(HEALTH_PATH, get(handlers::health))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(submitter)
}
