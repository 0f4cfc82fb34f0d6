//! # Response Types
//!
//! IBM Cloud VPC REST API response structures.
//!
//! Only the fields the controller reads or reports are modelled; everything else in
//! the payload is ignored. API Reference: https://cloud.ibm.com/apidocs/vpc/latest

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reference to another VPC resource (VPC, image, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceReference {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Reference to a zone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneReference {
    pub name: String,
}

/// Reference to an instance profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileReference {
    pub name: String,
}

/// A subnet; the controller derives the VPC and zone of new instances from it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subnet {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub vpc: ResourceReference,
    pub zone: ZoneReference,
}

/// A boot image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub visibility: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A virtual server instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    pub id: String,
    pub crn: String,
    pub name: String,
    /// deleting, failed, pending, restarting, running, starting, stopped, stopping
    pub status: String,
    pub vpc: ResourceReference,
    pub zone: ZoneReference,
    pub profile: ProfileReference,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ResourceReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Instance {
    pub fn is_running(&self) -> bool {
        self.status == "running"
    }

    pub fn is_failed(&self) -> bool {
        self.status == "failed"
    }

    pub fn is_deleting(&self) -> bool {
        self.status == "deleting"
    }
}

/// Link to the next page of a collection
#[derive(Debug, Deserialize)]
pub struct PageLink {
    pub href: String,
}

/// Page of `GET /v1/images`
#[derive(Debug, Deserialize)]
pub struct ImageCollection {
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub next: Option<PageLink>,
}

/// Page of `GET /v1/instances`
#[derive(Debug, Deserialize)]
pub struct InstanceCollection {
    #[serde(default)]
    pub instances: Vec<Instance>,
    #[serde(default)]
    pub next: Option<PageLink>,
}

/// Error payload returned by the VPC API
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub errors: Vec<ErrorDetail>,
    #[serde(default)]
    pub trace: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

/// Answer of `POST /v3/tags/attach`, one entry per addressed resource
#[derive(Debug, Deserialize)]
pub struct TagResults {
    #[serde(default)]
    pub results: Vec<TagResult>,
}

#[derive(Debug, Deserialize)]
pub struct TagResult {
    pub resource_id: String,
    #[serde(default)]
    pub is_error: bool,
}

/// IAM token exchange response
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
}
