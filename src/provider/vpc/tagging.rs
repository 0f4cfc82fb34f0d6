//! # Global Tagging Client
//!
//! Attaches user tags to IBM Cloud resources by CRN, implementing [`TaggingProvider`].
//! Attaching a tag that is already present is a no-op on the service side.

use super::auth::IamAuthenticator;
use super::handle_error_response;
use super::requests::{AttachTagsRequest, TagResource};
use super::responses::TagResults;
use crate::constants::{
    DEFAULT_IBMCLOUD_IAM_URL, DEFAULT_IBMCLOUD_TAGGING_URL, KEY_IBMCLOUD_API_KEY, KEY_IBMCLOUD_IAM_URL,
    KEY_IBMCLOUD_TAGGING_URL,
};
use crate::controller::environment::Environment;
use crate::provider::{ProviderError, Result, TaggingProvider};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info_span, Instrument};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug)]
pub struct TaggingClient {
    http_client: reqwest::Client,
    base_url: String,
    authenticator: IamAuthenticator,
}

impl TaggingClient {
    /// Build a client from the merged environment of a hook invocation
    ///
    /// Requires `IBMCLOUD_API_KEY`; `IBMCLOUD_TAGGING_URL` overrides the public endpoint.
    pub fn from_env(env: &Environment) -> Result<Self> {
        let api_key = env.get(KEY_IBMCLOUD_API_KEY).ok_or_else(|| {
            ProviderError::InvalidConfig(format!(
                "unable to locate the API key from the environment variable [{KEY_IBMCLOUD_API_KEY}]"
            ))
        })?;
        let base_url = env
            .get(KEY_IBMCLOUD_TAGGING_URL)
            .unwrap_or(DEFAULT_IBMCLOUD_TAGGING_URL)
            .trim_end_matches('/')
            .to_string();
        let iam_url = env.get(KEY_IBMCLOUD_IAM_URL).unwrap_or(DEFAULT_IBMCLOUD_IAM_URL);

        let http_client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        let authenticator = IamAuthenticator::new(http_client.clone(), iam_url, api_key);

        Ok(Self {
            http_client,
            base_url,
            authenticator,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Turn per-resource failures of an attach answer into an error
fn check_tag_results(results: &TagResults) -> Result<()> {
    let failed: Vec<&str> = results
        .results
        .iter()
        .filter(|result| result.is_error)
        .map(|result| result.resource_id.as_str())
        .collect();
    if failed.is_empty() {
        return Ok(());
    }
    Err(ProviderError::Api {
        status: 200,
        message: format!("unable to attach tags to [{}]", failed.join(", ")),
    })
}

#[async_trait]
impl TaggingProvider for TaggingClient {
    async fn attach_tags(&self, crn: &str, tags: &[String]) -> Result<()> {
        let span = info_span!("tagging.attach", resource.crn = crn, tags.count = tags.len());
        async move {
            let token = self.authenticator.access_token().await?;
            let body = AttachTagsRequest {
                resources: vec![TagResource {
                    resource_id: crn.to_string(),
                }],
                tag_names: tags.to_vec(),
            };
            debug!("Attaching tags {:?} to {}", tags, crn);

            let response = self
                .http_client
                .post(format!("{}/v3/tags/attach", self.base_url))
                .query(&[("tag_type", "user")])
                .bearer_auth(token)
                .header("Accept", "application/json")
                .json(&body)
                .send()
                .await?;
            if !response.status().is_success() {
                let status = response.status();
                let error_text = response.text().await.unwrap_or_default();
                return Err(handle_error_response(status, &error_text));
            }
            let results: TagResults = response.json().await?;
            check_tag_results(&results)
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_env_requires_api_key() {
        assert!(matches!(
            TaggingClient::from_env(&Environment::new()),
            Err(ProviderError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_from_env_endpoint_override() {
        let env = Environment::from_iter([
            (KEY_IBMCLOUD_API_KEY.to_string(), "secret".to_string()),
            (KEY_IBMCLOUD_TAGGING_URL.to_string(), "https://tags.example.test/".to_string()),
        ]);
        let client = TaggingClient::from_env(&env).unwrap();
        assert_eq!(client.base_url(), "https://tags.example.test");
    }

    #[test]
    fn test_check_tag_results_reports_failed_resources() {
        let results: TagResults = serde_json::from_value(serde_json::json!({
            "results": [{ "resource_id": "crn:v1:x", "is_error": true }]
        }))
        .unwrap();
        match check_tag_results(&results) {
            Err(ProviderError::Api { message, .. }) => assert!(message.contains("crn:v1:x")),
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(check_tag_results(&TagResults { results: vec![] }).is_ok());
    }
}
