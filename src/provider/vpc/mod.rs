//! # IBM Cloud VPC Client
//!
//! Minimal REST client for the VPC API, implementing [`VpcProvider`].
//!
//! Every request carries the pinned API `version` date and `generation=2`.
//! Collections are followed through their `next` links until exhausted.

mod auth;
pub mod requests;
pub mod responses;
mod tagging;

pub use requests::{IdIdentity, InstancePrototype, NameIdentity, NetworkInterfacePrototype};
pub use tagging::TaggingClient;
pub use responses::{Image, Instance, ProfileReference, ResourceReference, Subnet, ZoneReference};

use crate::constants::{
    DEFAULT_IBMCLOUD_IAM_URL, DEFAULT_IBMCLOUD_REGION, KEY_IBMCLOUD_API_KEY, KEY_IBMCLOUD_IAM_URL,
    KEY_IBMCLOUD_REGION, KEY_IBMCLOUD_VPC_URL, STOCK_IMAGE_PREFIX, VPC_API_VERSION,
};
use crate::controller::environment::Environment;
use crate::provider::{ProviderError, Result, VpcProvider};
use async_trait::async_trait;
use auth::IamAuthenticator;
use reqwest::{Method, RequestBuilder, StatusCode};
use responses::{ErrorResponse, ImageCollection, InstanceCollection};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info, info_span, Instrument};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug)]
pub struct VpcClient {
    http_client: reqwest::Client,
    base_url: String,
    authenticator: IamAuthenticator,
}

impl VpcClient {
    /// Build a client from the merged environment of a hook invocation
    ///
    /// Requires `IBMCLOUD_API_KEY`; the endpoint is `IBMCLOUD_VPC_URL` or derived from
    /// `IBMCLOUD_REGION` (default `us-east`).
    pub fn from_env(env: &Environment) -> Result<Self> {
        let api_key = env.get(KEY_IBMCLOUD_API_KEY).ok_or_else(|| {
            ProviderError::InvalidConfig(format!(
                "unable to locate the API key from the environment variable [{KEY_IBMCLOUD_API_KEY}]"
            ))
        })?;

        let base_url = match env.get(KEY_IBMCLOUD_VPC_URL) {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => {
                let region = env.get(KEY_IBMCLOUD_REGION).unwrap_or(DEFAULT_IBMCLOUD_REGION);
                format!("https://{region}.iaas.cloud.ibm.com")
            }
        };
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

    /// Authenticated request carrying the pinned API version
    ///
    /// `next` links of collections may already carry the version parameters.
    async fn make_request(&self, method: Method, url: &str) -> Result<RequestBuilder> {
        let token = self.authenticator.access_token().await?;
        let mut request = self
            .http_client
            .request(method, url)
            .bearer_auth(token)
            .header("Accept", "application/json");
        if !url.contains("version=") {
            request = request.query(&[("version", VPC_API_VERSION), ("generation", "2")]);
        }
        Ok(request)
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/v1/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Send a request and decode the JSON body, mapping non-2xx answers to errors
    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(handle_error_response(status, &error_text));
        }
        Ok(response.json().await?)
    }

    async fn list_images(&self, query: &[(&str, &str)]) -> Result<Vec<Image>> {
        let mut images = Vec::new();
        let mut url = self.api_url("images");
        let mut first_page = true;
        loop {
            let mut request = self.make_request(Method::GET, &url).await?;
            if first_page {
                request = request.query(query);
            }
            let page: ImageCollection = self.send_json(request).await?;
            images.extend(page.images);
            match page.next {
                Some(next) => {
                    url = next.href;
                    first_page = false;
                }
                None => return Ok(images),
            }
        }
    }

    async fn list_instances(&self, query: &[(&str, &str)]) -> Result<Vec<Instance>> {
        let mut instances = Vec::new();
        let mut url = self.api_url("instances");
        let mut first_page = true;
        loop {
            let mut request = self.make_request(Method::GET, &url).await?;
            if first_page {
                request = request.query(query);
            }
            let page: InstanceCollection = self.send_json(request).await?;
            instances.extend(page.instances);
            match page.next {
                Some(next) => {
                    url = next.href;
                    first_page = false;
                }
                None => return Ok(instances),
            }
        }
    }
}

/// Map an unsuccessful VPC API answer to a provider error
fn handle_error_response(status: StatusCode, error_text: &str) -> ProviderError {
    let message = match serde_json::from_str::<ErrorResponse>(error_text) {
        Ok(parsed) if !parsed.errors.is_empty() => {
            let mut message = parsed
                .errors
                .iter()
                .map(|e| format!("{}: {}", e.code, e.message))
                .collect::<Vec<_>>()
                .join("; ");
            if let Some(trace) = parsed.trace {
                message.push_str(&format!(" (trace {trace})"));
            }
            message
        }
        _ => error_text.to_string(),
    };

    if status == StatusCode::NOT_FOUND {
        ProviderError::NotFound(message)
    } else {
        ProviderError::Api {
            status: status.as_u16(),
            message,
        }
    }
}

/// Newest available image whose name marks it as a Hyper Protect Container Runtime image
pub fn select_latest_stock_image(images: Vec<Image>) -> Option<Image> {
    images
        .into_iter()
        .filter(|image| image.name.starts_with(STOCK_IMAGE_PREFIX))
        .filter(|image| image.status.as_deref().is_none_or(|s| s == "available"))
        .max_by(|a, b| a.created_at.cmp(&b.created_at))
}

#[async_trait]
impl VpcProvider for VpcClient {
    async fn get_subnet(&self, subnet_id: &str) -> Result<Subnet> {
        let span = info_span!("vpc.subnet.get", subnet.id = subnet_id);
        async move {
            let url = self.api_url(&format!("subnets/{subnet_id}"));
            let request = self.make_request(Method::GET, &url).await?;
            self.send_json(request).await
        }
        .instrument(span)
        .await
    }

    async fn find_image_by_name(&self, name: &str) -> Result<Image> {
        let span = info_span!("vpc.image.find", image.name = name);
        async move {
            let images = self.list_images(&[("name", name)]).await?;
            images
                .into_iter()
                .find(|image| image.name == name)
                .ok_or_else(|| ProviderError::NotFound(format!("image [{name}]")))
        }
        .instrument(span)
        .await
    }

    async fn find_latest_stock_image(&self) -> Result<Image> {
        let span = info_span!("vpc.image.latest_stock");
        async move {
            let images = self
                .list_images(&[("visibility", "public"), ("status", "available"), ("limit", "100")])
                .await?;
            debug!("Inspecting {} public images for the latest stock image", images.len());
            let image = select_latest_stock_image(images).ok_or_else(|| {
                ProviderError::NotFound(format!("stock image with prefix [{STOCK_IMAGE_PREFIX}]"))
            })?;
            info!("Selected stock image [{}] ({})", image.name, image.id);
            Ok(image)
        }
        .instrument(span)
        .await
    }

    async fn find_instances_by_name(&self, name: &str) -> Result<Vec<Instance>> {
        let span = info_span!("vpc.instance.find", instance.name = name);
        async move {
            let instances = self.list_instances(&[("name", name)]).await?;
            Ok(instances.into_iter().filter(|i| i.name == name).collect())
        }
        .instrument(span)
        .await
    }

    async fn create_instance(&self, prototype: &InstancePrototype) -> Result<Instance> {
        let span = info_span!("vpc.instance.create", instance.name = %prototype.name);
        async move {
            let url = self.api_url("instances");
            let request = self.make_request(Method::POST, &url).await?.json(prototype);
            self.send_json(request).await
        }
        .instrument(span)
        .await
    }

    async fn delete_instance(&self, instance_id: &str) -> Result<()> {
        let span = info_span!("vpc.instance.delete", instance.id = instance_id);
        async move {
            let url = self.api_url(&format!("instances/{instance_id}"));
            let response = self.make_request(Method::DELETE, &url).await?.send().await?;
            let status = response.status();
            // Already gone is as good as deleted
            if status.is_success() || status == StatusCode::NOT_FOUND {
                return Ok(());
            }
            let error_text = response.text().await.unwrap_or_default();
            Err(handle_error_response(status, &error_text))
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn image(name: &str, status: &str, day: u32) -> Image {
        Image {
            id: format!("id-{name}"),
            name: name.to_string(),
            status: Some(status.to_string()),
            visibility: Some("public".to_string()),
            created_at: Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_select_latest_stock_image_picks_newest_available() {
        let images = vec![
            image("ibm-hyper-protect-container-runtime-1-0-s390x-14", "available", 1),
            image("ibm-hyper-protect-container-runtime-1-0-s390x-16", "deprecated", 20),
            image("ibm-hyper-protect-container-runtime-1-0-s390x-15", "available", 10),
            image("ibm-ubuntu-22-04-amd64", "available", 28),
        ];

        let selected = select_latest_stock_image(images).unwrap();
        assert_eq!(selected.name, "ibm-hyper-protect-container-runtime-1-0-s390x-15");
    }

    #[test]
    fn test_select_latest_stock_image_none_without_candidates() {
        let images = vec![image("ibm-ubuntu-22-04-amd64", "available", 1)];
        assert!(select_latest_stock_image(images).is_none());
    }

    #[test]
    fn test_handle_error_response_maps_not_found() {
        let body = r#"{"errors":[{"code":"not_found","message":"Subnet not found"}],"trace":"abc"}"#;
        match handle_error_response(StatusCode::NOT_FOUND, body) {
            ProviderError::NotFound(message) => {
                assert_eq!(message, "not_found: Subnet not found (trace abc)");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_handle_error_response_keeps_raw_body() {
        match handle_error_response(StatusCode::BAD_GATEWAY, "upstream down") {
            ProviderError::Api { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "upstream down");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_from_env_requires_api_key() {
        let env = Environment::default();
        assert!(matches!(
            VpcClient::from_env(&env),
            Err(ProviderError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_from_env_derives_endpoint_from_region() {
        let env = Environment::from_iter([
            (KEY_IBMCLOUD_API_KEY.to_string(), "secret".to_string()),
            (KEY_IBMCLOUD_REGION.to_string(), "eu-de".to_string()),
        ]);
        let client = VpcClient::from_env(&env).unwrap();
        assert_eq!(client.base_url(), "https://eu-de.iaas.cloud.ibm.com");
        assert_eq!(
            client.api_url("subnets/abc"),
            "https://eu-de.iaas.cloud.ibm.com/v1/subnets/abc"
        );
    }
}
