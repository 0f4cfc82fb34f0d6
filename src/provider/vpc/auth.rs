//! # IAM Authentication
//!
//! Exchanges an IBM Cloud API key for a bearer token.
//!
//! A client lives for a single hook invocation, so the token is fetched at most once
//! per client and never refreshed.

use super::responses::TokenResponse;
use crate::provider::{ProviderError, Result};
use tokio::sync::OnceCell;
use tracing::debug;

const GRANT_TYPE_API_KEY: &str = "urn:ibm:params:oauth:grant-type:apikey";

pub struct IamAuthenticator {
    http_client: reqwest::Client,
    iam_url: String,
    api_key: String,
    token: OnceCell<String>,
}

impl std::fmt::Debug for IamAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IamAuthenticator")
            .field("iam_url", &self.iam_url)
            .field("api_key", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl IamAuthenticator {
    pub fn new(http_client: reqwest::Client, iam_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http_client,
            iam_url: iam_url.into(),
            api_key: api_key.into(),
            token: OnceCell::new(),
        }
    }

    /// Bearer token, fetched on first use
    pub async fn access_token(&self) -> Result<&str> {
        let token = self
            .token
            .get_or_try_init(|| self.request_token())
            .await?;
        Ok(token.as_str())
    }

    async fn request_token(&self) -> Result<String> {
        let url = format!("{}/identity/token", self.iam_url.trim_end_matches('/'));
        debug!("Requesting IAM token from {}", url);

        let response = self
            .http_client
            .post(&url)
            .header("Accept", "application/json")
            .form(&[("grant_type", GRANT_TYPE_API_KEY), ("apikey", self.api_key.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ProviderError::Authentication(format!(
                "IAM token request failed with {status}: {error_text}"
            )));
        }

        let token: TokenResponse = response.json().await?;
        Ok(token.access_token)
    }
}
