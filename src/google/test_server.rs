//! In-process stand-in for the Google token, Drive and Sheets endpoints

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use bytes::Bytes;
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::config::GoogleConfig;

pub const TEST_TOKEN: &str = "test-token";
pub const TEST_PRIVATE_KEY: &str = include_str!("../../testdata/service_account_key.pem");
pub const TEST_PUBLIC_KEY: &str = include_str!("../../testdata/service_account_pub.pem");

#[derive(Debug, Clone)]
pub struct RecordedUpload {
    pub id: String,
    pub content_type: String,
    pub metadata: serde_json::Value,
    pub media_type: String,
    pub data: Bytes,
}

#[derive(Default)]
struct FakeGoogleState {
    token_requests: usize,
    reject_token: bool,
    uploads: Vec<RecordedUpload>,
    fail_uploads_with: Option<u16>,
    omit_links: bool,
    sheets: HashMap<String, Vec<Vec<String>>>,
    fail_sheets_with: Option<u16>,
}

type Shared = Arc<Mutex<FakeGoogleState>>;

pub struct FakeGoogleServer {
    pub base_url: String,
    state: Shared,
}

impl FakeGoogleServer {
    pub async fn start() -> Self {
        let state: Shared = Arc::default();
        let app = Router::new()
            .route("/token", post(token))
            .route("/upload/drive/v3/files", post(upload))
            .route("/drive/v3/files/:id", get(download).delete(delete))
            .route("/v4/spreadsheets/:sheet_id/values/:range", get(read_values).post(append_values))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, state }
    }

    /// Complete configuration pointing every endpoint at this server
    pub fn config(&self) -> GoogleConfig {
        GoogleConfig {
            service_account_email: Some("reports@test.iam.gserviceaccount.com".to_string()),
            private_key: Some(TEST_PRIVATE_KEY.to_string()),
            sheet_id: Some("test-sheet".to_string()),
            drive_folder_id: Some("test-folder".to_string()),
            sheet_name: "Sheet1".to_string(),
            token_uri: format!("{}/token", self.base_url),
            drive_upload_url: format!("{}/upload/drive/v3/files", self.base_url),
            drive_api_url: format!("{}/drive/v3/files", self.base_url),
            sheets_api_url: format!("{}/v4/spreadsheets", self.base_url),
        }
    }

    pub fn token_requests(&self) -> usize {
        self.state.lock().unwrap().token_requests
    }

    pub fn reject_tokens(&self) {
        self.state.lock().unwrap().reject_token = true;
    }

    pub fn uploads(&self) -> Vec<RecordedUpload> {
        self.state.lock().unwrap().uploads.clone()
    }

    pub fn fail_uploads_with(&self, status: u16) {
        self.state.lock().unwrap().fail_uploads_with = Some(status);
    }

    /// Answer uploads without a `webViewLink`
    pub fn omit_links(&self) {
        self.state.lock().unwrap().omit_links = true;
    }

    pub fn sheet_rows(&self, sheet: &str) -> Vec<Vec<String>> {
        self.state
            .lock()
            .unwrap()
            .sheets
            .get(sheet)
            .cloned()
            .unwrap_or_default()
    }

    pub fn set_sheet_rows(&self, sheet: &str, rows: Vec<Vec<String>>) {
        self.state
            .lock()
            .unwrap()
            .sheets
            .insert(sheet.to_string(), rows);
    }

    pub fn fail_sheets_with(&self, status: u16) {
        self.state.lock().unwrap().fail_sheets_with = Some(status);
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        == Some(format!("Bearer {}", TEST_TOKEN).as_str())
}

fn status_error(status: u16) -> Response {
    let status = StatusCode::from_u16(status).unwrap();
    (status, Json(json!({ "error": { "code": status.as_u16(), "message": "simulated" } })))
        .into_response()
}

async fn token(State(state): State<Shared>, body: String) -> Response {
    let mut state = state.lock().unwrap();
    state.token_requests += 1;
    if state.reject_token || !body.contains("assertion=") {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "invalid_grant", "error_description": "Invalid JWT Signature." })),
        )
            .into_response();
    }
    Json(json!({ "access_token": TEST_TOKEN, "expires_in": 3600, "token_type": "Bearer" }))
        .into_response()
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Split one `multipart/related` part into its content type and payload
fn split_part(part: &[u8]) -> (String, Bytes) {
    let part = part.strip_prefix(b"\r\n").unwrap_or(part);
    let split = find(part, b"\r\n\r\n").unwrap();
    let headers = String::from_utf8_lossy(&part[..split]).to_string();
    let body = &part[split + 4..];
    let body = body.strip_suffix(b"\r\n").unwrap_or(body);
    let content_type = headers
        .lines()
        .find_map(|l| l.strip_prefix("Content-Type: "))
        .unwrap_or_default()
        .to_string();
    (content_type, Bytes::copy_from_slice(body))
}

async fn upload(State(state): State<Shared>, headers: HeaderMap, body: Bytes) -> Response {
    if !authorized(&headers) {
        return status_error(401);
    }
    let mut state = state.lock().unwrap();
    if let Some(status) = state.fail_uploads_with {
        return status_error(status);
    }

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let boundary = content_type
        .split("boundary=")
        .nth(1)
        .unwrap_or_default()
        .to_string();
    let delimiter = format!("--{}", boundary);

    let mut parts = Vec::new();
    let mut rest = &body[..];
    while let Some(start) = find(rest, delimiter.as_bytes()) {
        rest = &rest[start + delimiter.len()..];
        if rest.starts_with(b"--") {
            break;
        }
        let end = find(rest, delimiter.as_bytes()).unwrap_or(rest.len());
        parts.push(split_part(&rest[..end]));
    }
    if parts.len() != 2 {
        return status_error(400);
    }

    let metadata: serde_json::Value = serde_json::from_slice(&parts[0].1).unwrap_or_default();
    let id = format!("file-{}", state.uploads.len() + 1);
    state.uploads.push(RecordedUpload {
        id: id.clone(),
        content_type,
        metadata,
        media_type: parts[1].0.clone(),
        data: parts[1].1.clone(),
    });

    if state.omit_links {
        Json(json!({ "id": id })).into_response()
    } else {
        let link = format!("https://drive.google.com/file/d/{}/view", id);
        Json(json!({ "id": id, "webViewLink": link })).into_response()
    }
}

async fn download(State(state): State<Shared>, headers: HeaderMap, Path(id): Path<String>) -> Response {
    if !authorized(&headers) {
        return status_error(401);
    }
    let state = state.lock().unwrap();
    match state.uploads.iter().find(|u| u.id == id) {
        Some(upload) => upload.data.clone().into_response(),
        None => status_error(404),
    }
}

async fn delete(State(state): State<Shared>, headers: HeaderMap, Path(id): Path<String>) -> Response {
    if !authorized(&headers) {
        return status_error(401);
    }
    let mut state = state.lock().unwrap();
    let before = state.uploads.len();
    state.uploads.retain(|u| u.id != id);
    if state.uploads.len() == before {
        status_error(404)
    } else {
        StatusCode::NO_CONTENT.into_response()
    }
}

fn sheet_of(range: &str) -> String {
    range.split('!').next().unwrap_or_default().to_string()
}

async fn read_values(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path((_sheet_id, range)): Path<(String, String)>,
) -> Response {
    if !authorized(&headers) {
        return status_error(401);
    }
    let state = state.lock().unwrap();
    if let Some(status) = state.fail_sheets_with {
        return status_error(status);
    }
    match state.sheets.get(&sheet_of(&range)).and_then(|rows| rows.first()) {
        Some(first) => Json(json!({ "range": range, "majorDimension": "ROWS", "values": [first] }))
            .into_response(),
        None => Json(json!({ "range": range, "majorDimension": "ROWS" })).into_response(),
    }
}

async fn append_values(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path((sheet_id, range)): Path<(String, String)>,
    Json(body): Json<serde_json::Value>,
) -> Response {
    if !authorized(&headers) {
        return status_error(401);
    }
    let mut state = state.lock().unwrap();
    if let Some(status) = state.fail_sheets_with {
        return status_error(status);
    }
    if !range.ends_with(":append") {
        return status_error(400);
    }
    let rows: Vec<Vec<String>> = serde_json::from_value(body["values"].clone()).unwrap_or_default();
    state
        .sheets
        .entry(sheet_of(&range))
        .or_default()
        .extend(rows);
    Json(json!({ "spreadsheetId": sheet_id, "updates": { "updatedRange": range } })).into_response()
}
