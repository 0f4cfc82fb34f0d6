//! # Constants
//!
//! Shared constants used throughout the controller.
//!
//! Process-wide defaults live here; [`crate::config::ControllerConfig`] picks them
//! up at start-up and may override them from the process environment.

/// Default HTTP port for the hook server
pub const DEFAULT_SERVER_PORT: u16 = 8080;

/// Delay the orchestrator is asked to wait before re-invoking a hook for a
/// resource that is not in a terminal state yet (seconds)
pub const DEFAULT_RESYNC_AFTER_SECS: u64 = 10;

/// Prefix of every provider-side instance name
pub const DEFAULT_SERVICE_PREFIX: &str = "k8s-operator-hpcr";

/// Instance profile used when neither the resource nor the environment names one
pub const DEFAULT_PROFILE_NAME: &str = "bz2e-2x8";

/// Environment key overriding the instance image by name
pub const KEY_TARGET_IMAGE_NAME: &str = "TARGET_IMAGE_NAME";

/// Environment key overriding the instance profile
pub const KEY_TARGET_PROFILE: &str = "TARGET_PROFILE";

/// Environment key supplying the subnet when the resource does not
pub const KEY_TARGET_SUBNET_ID: &str = "TARGET_SUBNET_ID";

/// Environment key with the IBM Cloud API key
pub const KEY_IBMCLOUD_API_KEY: &str = "IBMCLOUD_API_KEY";

/// Environment key with the IBM Cloud region (e.g. `us-east`)
pub const KEY_IBMCLOUD_REGION: &str = "IBMCLOUD_REGION";

/// Environment key overriding the VPC API endpoint
pub const KEY_IBMCLOUD_VPC_URL: &str = "IBMCLOUD_VPC_URL";

/// Environment key overriding the IAM token endpoint
pub const KEY_IBMCLOUD_IAM_URL: &str = "IBMCLOUD_IAM_URL";

/// Environment key overriding the Global Tagging API endpoint
pub const KEY_IBMCLOUD_TAGGING_URL: &str = "IBMCLOUD_TAGGING_URL";

/// Default Global Tagging endpoint
pub const DEFAULT_IBMCLOUD_TAGGING_URL: &str = "https://tags.global-search-tagging.cloud.ibm.com";

/// Region used when the environment does not name one
pub const DEFAULT_IBMCLOUD_REGION: &str = "us-east";

/// Default IAM endpoint
pub const DEFAULT_IBMCLOUD_IAM_URL: &str = "https://iam.cloud.ibm.com";

/// VPC API version date sent with every request
pub const VPC_API_VERSION: &str = "2024-04-30";

/// Name prefix of the public Hyper Protect Container Runtime stock images
pub const STOCK_IMAGE_PREFIX: &str = "ibm-hyper-protect-container-runtime";

/// Tag key carrying the uid of the owning resource
pub const TAG_UID: &str = "k8s-uid";

/// Tag key carrying the namespace of the owning resource
pub const TAG_NAMESPACE: &str = "k8s-namespace";

/// Environment key with the libvirt connection URI
pub const KEY_LIBVIRT_URI: &str = "LIBVIRT_URI";

/// libvirt URI used when the environment does not name one
pub const DEFAULT_LIBVIRT_URI: &str = "qemu:///system";

/// Environment key overriding the storage pool of data disk references
pub const KEY_LIBVIRT_STORAGE_POOL: &str = "LIBVIRT_STORAGE_POOL";

/// Storage pool used when neither the resource nor the environment names one
pub const DEFAULT_STORAGE_POOL: &str = "default";

/// API version of the core Kubernetes kinds the customize hook asks for
pub const K8S_API_VERSION: &str = "v1";
