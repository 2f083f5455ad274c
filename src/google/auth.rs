use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use crate::config::GoogleCredentials;
use crate::google::error::AuthError;

/// Scopes needed to append rows and create files in a shared folder
pub const SCOPES: &str =
    "https://www.googleapis.com/auth/spreadsheets https://www.googleapis.com/auth/drive.file";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Assertions are valid for one hour, the maximum Google accepts
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Tokens are refreshed this long before they actually expire
const EXPIRY_MARGIN_SECS: i64 = 60;

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Claims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    account: String,
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn usable_for(&self, account: &str, now: DateTime<Utc>) -> bool {
        self.account == account && now + Duration::seconds(EXPIRY_MARGIN_SECS) < self.expires_at
    }
}

/// Exchanges a signed service-account assertion for an OAuth access token.
///
/// The last token is reused until shortly before it expires.
pub struct ServiceAccountAuth {
    http: reqwest::Client,
    token_uri: String,
    cached: Mutex<Option<CachedToken>>,
}

impl ServiceAccountAuth {
    pub fn new(http: reqwest::Client, token_uri: &str) -> Self {
        Self {
            http,
            token_uri: token_uri.to_string(),
            cached: Mutex::new(None),
        }
    }

    /// Sign the JWT assertion sent to the token endpoint
    pub(crate) fn build_assertion(
        &self,
        credentials: &GoogleCredentials,
        now: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let key = EncodingKey::from_rsa_pem(credentials.private_key.as_bytes())
            .map_err(|e| AuthError::InvalidCredentials(e.to_string()))?;

        let claims = Claims {
            iss: credentials.service_account_email.clone(),
            scope: SCOPES.to_string(),
            aud: self.token_uri.clone(),
            iat: now.timestamp(),
            exp: now.timestamp() + ASSERTION_LIFETIME_SECS,
        };

        jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &key)
            .map_err(|e| AuthError::InvalidCredentials(e.to_string()))
    }

    /// Return a bearer token for `credentials`, fetching a new one if needed
    pub async fn access_token(&self, credentials: &GoogleCredentials) -> Result<String, AuthError> {
        let account = credentials.service_account_email.as_str();
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref() {
            if token.usable_for(account, Utc::now()) {
                debug!("Reusing access token for {}", account);
                return Ok(token.access_token.clone());
            }
        }

        let now = Utc::now();
        let assertion = self.build_assertion(credentials, now)?;

        let response = self
            .http
            .post(&self.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| {
                error!("Token request to {} failed: {}", self.token_uri, e);
                AuthError::Request(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            error!("Token endpoint answered {}: {}", status, detail);
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                detail,
            });
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::Request(format!("Unreadable token response: {}", e)))?;

        info!(
            "Obtained access token for {} valid for {}s",
            account, token.expires_in
        );

        let access_token = token.access_token.clone();
        *cached = Some(CachedToken {
            account: account.to_string(),
            access_token: token.access_token,
            expires_at: now + Duration::seconds(token.expires_in),
        });

        Ok(access_token)
    }
}
