//! # Request Types
//!
//! IBM Cloud VPC and Global Tagging REST API request bodies.

use serde::Serialize;

/// Identity of an existing resource by ID
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdIdentity {
    pub id: String,
}

/// Identity of an existing resource by name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameIdentity {
    pub name: String,
}

/// Primary network interface of a new instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkInterfacePrototype {
    pub subnet: IdIdentity,
}

/// Body of `POST /v1/instances` (instance by image)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstancePrototype {
    pub name: String,
    pub profile: NameIdentity,
    pub vpc: IdIdentity,
    pub image: IdIdentity,
    pub zone: NameIdentity,
    pub primary_network_interface: NetworkInterfacePrototype,
    /// The encrypted contract
    pub user_data: String,
}

/// Resource addressed by a tagging request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagResource {
    pub resource_id: String,
}

/// Body of `POST /v3/tags/attach`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttachTagsRequest {
    pub resources: Vec<TagResource>,
    pub tag_names: Vec<String>,
}
