use crate::config::GoogleConfig;
use crate::google::ServiceAccountAuth;
use crate::sheets::error::SheetsError;
use crate::sheets::storage::SheetStore;
use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, error, info};

#[derive(Debug, Default, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

fn cell_text(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Google Sheets implementation of the SheetStore trait
#[derive(Clone)]
pub struct GoogleSheets {
    http: reqwest::Client,
    auth: Arc<ServiceAccountAuth>,
    config: GoogleConfig,
}

impl GoogleSheets {
    pub fn new(http: reqwest::Client, auth: Arc<ServiceAccountAuth>, config: &GoogleConfig) -> Self {
        Self {
            http,
            auth,
            config: config.clone(),
        }
    }

    /// Bearer token and the values endpoint for `range`
    async fn prepare(&self, range: &str) -> Result<(String, Url), SheetsError> {
        let credentials = self.config.resolve().map_err(|e| {
            error!("Sheets call attempted without configuration: {}", e);
            SheetsError::Configuration(e.to_string())
        })?;

        let mut url = Url::parse(&self.config.sheets_api_url).map_err(|e| {
            SheetsError::Configuration(format!(
                "Invalid Sheets API url {}: {}",
                self.config.sheets_api_url, e
            ))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                SheetsError::Configuration(format!(
                    "Sheets API url {} cannot hold a path",
                    self.config.sheets_api_url
                ))
            })?
            .pop_if_empty()
            .extend([credentials.sheet_id.as_str(), "values", range]);

        let token = self.auth.access_token(&credentials).await?;
        Ok((token, url))
    }

    async fn check(response: reqwest::Response, range: &str) -> Result<reqwest::Response, SheetsError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let detail = response.text().await.unwrap_or_default();
        error!("Sheets rejected {} with {}: {}", range, status, detail);
        Err(SheetsError::Rejected {
            range: range.to_string(),
            status: status.as_u16(),
            detail,
        })
    }
}

#[async_trait]
impl SheetStore for GoogleSheets {
    async fn read_first_row(&self, sheet: &str) -> Result<Vec<String>, SheetsError> {
        let range = format!("{}!1:1", sheet);
        let (token, url) = self.prepare(&range).await?;

        let response = self
            .http
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| SheetsError::Network(range.clone(), e.to_string()))?;
        let response = Self::check(response, &range).await?;

        let body: ValueRange = response
            .json()
            .await
            .map_err(|e| SheetsError::InvalidResponse(range.clone(), e.to_string()))?;

        let first_row: Vec<String> = body
            .values
            .into_iter()
            .next()
            .unwrap_or_default()
            .into_iter()
            .map(cell_text)
            .collect();
        debug!("First row of {} has {} cells", sheet, first_row.len());
        Ok(first_row)
    }

    async fn append_values(&self, sheet: &str, rows: Vec<Vec<String>>) -> Result<(), SheetsError> {
        let range = format!("{}!A1", sheet);
        let (token, mut url) = self.prepare(&format!("{}:append", range)).await?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", "USER_ENTERED")
            .append_pair("insertDataOption", "INSERT_ROWS");

        let count = rows.len();
        let response = self
            .http
            .post(url)
            .bearer_auth(token)
            .json(&serde_json::json!({ "values": rows }))
            .send()
            .await
            .map_err(|e| {
                error!("Error appending to {}: {}", range, e);
                SheetsError::Network(range.clone(), e.to_string())
            })?;
        Self::check(response, &range).await?;

        info!("Appended {} row(s) to sheet {}", count, sheet);
        Ok(())
    }
}
