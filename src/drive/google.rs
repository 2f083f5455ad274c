use crate::config::GoogleConfig;
use crate::drive::error::DriveError;
use crate::drive::storage::{ObjectStore, StoredObject};
use crate::google::ServiceAccountAuth;
use crate::stream::{ByteStream, StreamError};
use async_trait::async_trait;
use bytes::Bytes;
use futures::{future, stream, StreamExt};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, error, info};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedFile {
    id: String,
    web_view_link: Option<String>,
}

/// Google Drive implementation of the ObjectStore trait.
///
/// Files are created with a single `multipart/related` upload whose media
/// part is streamed straight from the [`ByteStream`].
#[derive(Clone)]
pub struct GoogleDrive {
    http: reqwest::Client,
    auth: Arc<ServiceAccountAuth>,
    config: GoogleConfig,
}

impl GoogleDrive {
    pub fn new(http: reqwest::Client, auth: Arc<ServiceAccountAuth>, config: &GoogleConfig) -> Self {
        Self {
            http,
            auth,
            config: config.clone(),
        }
    }

    async fn bearer_token(&self) -> Result<(String, String), DriveError> {
        let credentials = self.config.resolve().map_err(|e| {
            error!("Drive upload attempted without configuration: {}", e);
            DriveError::Configuration(e.to_string())
        })?;
        let token = self.auth.access_token(&credentials).await?;
        Ok((token, credentials.drive_folder_id))
    }
}

/// Frame the metadata and media parts of a Drive multipart upload
fn multipart_related_body(
    boundary: &str,
    metadata: &serde_json::Value,
    mime_type: &str,
    content: ByteStream,
) -> reqwest::Body {
    let head = format!(
        "--{boundary}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{metadata}\r\n--{boundary}\r\nContent-Type: {mime_type}\r\n\r\n"
    );
    let tail = format!("\r\n--{boundary}--\r\n");

    let parts = stream::once(future::ready(Ok::<Bytes, StreamError>(Bytes::from(head))))
        .chain(content)
        .chain(stream::once(future::ready(Ok(Bytes::from(tail)))));

    reqwest::Body::wrap_stream(parts)
}

#[async_trait]
impl ObjectStore for GoogleDrive {
    async fn upload_object(
        &self,
        name: &str,
        mime_type: &str,
        content: ByteStream,
    ) -> Result<StoredObject, DriveError> {
        let (token, folder_id) = self.bearer_token().await?;

        let metadata = serde_json::json!({
            "name": name,
            "parents": [folder_id],
            "mimeType": mime_type,
        });
        let boundary = format!("guard-report-{}", Uuid::new_v4().simple());
        let body = multipart_related_body(&boundary, &metadata, mime_type, content);

        debug!("Uploading {} to Drive folder {}", name, folder_id);

        let response = self
            .http
            .post(&self.config.drive_upload_url)
            .query(&[
                ("uploadType", "multipart"),
                ("fields", "id,webViewLink"),
                ("supportsAllDrives", "true"),
            ])
            .bearer_auth(token)
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("multipart/related; boundary={}", boundary),
            )
            .body(body)
            .send()
            .await
            .map_err(|e| {
                error!("Error uploading {} to Google Drive: {}", name, e);
                DriveError::Network(name.to_string(), e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            error!("Drive rejected {} with {}: {}", name, status, detail);
            return Err(DriveError::Rejected {
                name: name.to_string(),
                status: status.as_u16(),
                detail,
            });
        }

        let created: CreatedFile = response
            .json()
            .await
            .map_err(|e| DriveError::InvalidResponse(name.to_string(), e.to_string()))?;

        info!("Uploaded {} to Google Drive as {}", name, created.id);

        Ok(StoredObject {
            id: created.id,
            view_url: created.web_view_link,
        })
    }

    #[cfg(test)]
    async fn fetch_object(&self, id: &str) -> Result<Bytes, DriveError> {
        let (token, _) = self.bearer_token().await?;
        let response = self
            .http
            .get(format!("{}/{}", self.config.drive_api_url, id))
            .query(&[("alt", "media"), ("supportsAllDrives", "true")])
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| DriveError::Network(id.to_string(), e.to_string()))?;

        match response.status().as_u16() {
            200 => response
                .bytes()
                .await
                .map_err(|e| DriveError::InvalidResponse(id.to_string(), e.to_string())),
            404 => Err(DriveError::NotFound(id.to_string())),
            status => Err(DriveError::Rejected {
                name: id.to_string(),
                status,
                detail: response.text().await.unwrap_or_default(),
            }),
        }
    }

    #[cfg(test)]
    async fn remove_object(&self, id: &str) -> Result<(), DriveError> {
        let (token, _) = self.bearer_token().await?;
        let response = self
            .http
            .delete(format!("{}/{}", self.config.drive_api_url, id))
            .query(&[("supportsAllDrives", "true")])
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| DriveError::Network(id.to_string(), e.to_string()))?;

        match response.status().as_u16() {
            200 | 204 => Ok(()),
            404 => Err(DriveError::NotFound(id.to_string())),
            status => Err(DriveError::Rejected {
                name: id.to_string(),
                status,
                detail: response.text().await.unwrap_or_default(),
            }),
        }
    }
}
