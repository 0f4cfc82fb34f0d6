//! # Instance Options
//!
//! Resolution of the desired configuration of a VPC instance.
//!
//! Each field is taken from the first source that has it:
//!
//! | field   | resource            | environment         | fallback                     |
//! |---------|---------------------|---------------------|------------------------------|
//! | name    | -                   | -                   | `<prefix>-<metadata.uid>`    |
//! | subnet  | `spec.subnetID`     | `TARGET_SUBNET_ID`  | none, resolution fails       |
//! | profile | `spec.profileName`  | `TARGET_PROFILE`    | configured default profile   |
//! | image   | -                   | `TARGET_IMAGE_NAME` | latest stock image           |
//!
//! VPC and zone come from the subnet, the user data is the contract as is.
//! The user tags attached to the instance name the controller and the owning resource.

use crate::config::ControllerConfig;
use crate::constants::{KEY_TARGET_IMAGE_NAME, KEY_TARGET_PROFILE, KEY_TARGET_SUBNET_ID, TAG_NAMESPACE, TAG_UID};
use crate::controller::environment::Environment;
use crate::controller::ResolveError;
use crate::crd::{HyperProtectInstance, HyperProtectInstanceSpec};
use crate::provider::vpc::{IdIdentity, NameIdentity, NetworkInterfacePrototype};
use crate::provider::{InstancePrototype, VpcProvider};
use kube::ResourceExt;
use tracing::{debug, info};

/// Desired configuration of one instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceOptions {
    pub name: String,
    pub vpc_id: String,
    pub profile_name: String,
    pub image_id: String,
    pub zone: String,
    pub subnet_id: String,
    pub user_data: String,
    pub tags: Vec<String>,
}

impl From<&InstanceOptions> for InstancePrototype {
    fn from(options: &InstanceOptions) -> Self {
        InstancePrototype {
            name: options.name.clone(),
            profile: NameIdentity {
                name: options.profile_name.clone(),
            },
            vpc: IdIdentity {
                id: options.vpc_id.clone(),
            },
            image: IdIdentity {
                id: options.image_id.clone(),
            },
            zone: NameIdentity {
                name: options.zone.clone(),
            },
            primary_network_interface: NetworkInterfacePrototype {
                subnet: IdIdentity {
                    id: options.subnet_id.clone(),
                },
            },
            user_data: options.user_data.clone(),
        }
    }
}

/// Provider-side name of the instance owned by the resource with `uid`
pub fn instance_name_from_uid(prefix: &str, uid: &str) -> String {
    format!("{prefix}-{uid}")
}

fn parent_uid(parent: &HyperProtectInstance) -> Result<String, ResolveError> {
    parent.uid().filter(|uid| !uid.is_empty()).ok_or(ResolveError::MissingUid)
}

/// Deterministic instance name of `parent`
pub fn instance_name(config: &ControllerConfig, parent: &HyperProtectInstance) -> Result<String, ResolveError> {
    Ok(instance_name_from_uid(&config.service_prefix, &parent_uid(parent)?))
}

/// User tags of the instance owned by `parent`
pub fn instance_tags(config: &ControllerConfig, parent: &HyperProtectInstance) -> Result<Vec<String>, ResolveError> {
    let mut tags = vec![config.service_prefix.clone(), format!("{TAG_UID}:{}", parent_uid(parent)?)];
    if let Some(namespace) = parent.namespace() {
        tags.push(format!("{TAG_NAMESPACE}:{namespace}"));
    }
    Ok(tags)
}

pub fn get_subnet_id(spec: &HyperProtectInstanceSpec, env: &Environment) -> Result<String, ResolveError> {
    if let Some(subnet_id) = spec.subnet_id.as_deref().filter(|s| !s.is_empty()) {
        debug!("Using subnet [{}] from the resource", subnet_id);
        return Ok(subnet_id.to_string());
    }
    if let Some(subnet_id) = env.get(KEY_TARGET_SUBNET_ID) {
        debug!("Using subnet [{}] from [{}]", subnet_id, KEY_TARGET_SUBNET_ID);
        return Ok(subnet_id.to_string());
    }
    Err(ResolveError::MissingConfig {
        field: "subnet ID",
        key: KEY_TARGET_SUBNET_ID,
    })
}

pub fn get_profile_name(config: &ControllerConfig, spec: &HyperProtectInstanceSpec, env: &Environment) -> String {
    if let Some(profile) = spec.profile_name.as_deref().filter(|p| !p.is_empty()) {
        debug!("Using profile [{}] from the resource", profile);
        return profile.to_string();
    }
    if let Some(profile) = env.get(KEY_TARGET_PROFILE) {
        debug!("Using profile [{}] from [{}]", profile, KEY_TARGET_PROFILE);
        return profile.to_string();
    }
    debug!("Using default profile [{}]", config.default_profile);
    config.default_profile.clone()
}

pub async fn get_image_id(env: &Environment, vpc: &dyn VpcProvider) -> Result<String, ResolveError> {
    let image = match env.get(KEY_TARGET_IMAGE_NAME) {
        Some(name) => {
            debug!("Looking up image [{}] from [{}]", name, KEY_TARGET_IMAGE_NAME);
            vpc.find_image_by_name(name).await?
        }
        None => vpc.find_latest_stock_image().await?,
    };
    Ok(image.id)
}

/// Resolve the desired configuration of the instance owned by `parent`
pub async fn resolve_instance_options(
    config: &ControllerConfig,
    parent: &HyperProtectInstance,
    env: &Environment,
    vpc: &dyn VpcProvider,
) -> Result<InstanceOptions, ResolveError> {
    let name = instance_name(config, parent)?;
    let tags = instance_tags(config, parent)?;
    let subnet_id = get_subnet_id(&parent.spec, env)?;
    let subnet = vpc.get_subnet(&subnet_id).await?;
    let profile_name = get_profile_name(config, &parent.spec, env);
    let image_id = get_image_id(env, vpc).await?;

    info!(
        "Resolved instance [{}]: subnet={}, vpc={}, zone={}, profile={}, image={}",
        name, subnet.id, subnet.vpc.id, subnet.zone.name, profile_name, image_id
    );

    Ok(InstanceOptions {
        name,
        vpc_id: subnet.vpc.id,
        profile_name,
        image_id,
        zone: subnet.zone.name,
        subnet_id,
        user_data: parent.spec.contract.clone(),
        tags,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(subnet: Option<&str>, profile: Option<&str>) -> HyperProtectInstanceSpec {
        HyperProtectInstanceSpec {
            contract: "hyper-protect-basic.abc".to_string(),
            subnet_id: subnet.map(str::to_string),
            profile_name: profile.map(str::to_string),
            target_selector: None,
        }
    }

    fn env(entries: &[(&str, &str)]) -> Environment {
        entries.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect()
    }

    #[test]
    fn test_instance_name_from_uid() {
        assert_eq!(
            instance_name_from_uid("k8s-operator-hpcr", "4386-1249"),
            "k8s-operator-hpcr-4386-1249"
        );
    }

    #[test]
    fn test_instance_name_requires_uid() {
        let parent = HyperProtectInstance::new("enclave", spec(None, None));
        let result = instance_name(&ControllerConfig::default(), &parent);
        assert!(matches!(result, Err(ResolveError::MissingUid)));
    }

    #[test]
    fn test_instance_tags_name_owner() {
        let mut parent = HyperProtectInstance::new("enclave", spec(None, None));
        parent.metadata.uid = Some("4386-1249".to_string());
        let config = ControllerConfig::default();
        assert_eq!(
            instance_tags(&config, &parent).unwrap(),
            ["k8s-operator-hpcr", "k8s-uid:4386-1249"]
        );

        parent.metadata.namespace = Some("tenants".to_string());
        assert_eq!(
            instance_tags(&config, &parent).unwrap(),
            ["k8s-operator-hpcr", "k8s-uid:4386-1249", "k8s-namespace:tenants"]
        );
    }

    #[test]
    fn test_subnet_precedence() {
        let env = env(&[(KEY_TARGET_SUBNET_ID, "from-env")]);
        assert_eq!(get_subnet_id(&spec(Some("from-spec"), None), &env).unwrap(), "from-spec");
        assert_eq!(get_subnet_id(&spec(None, None), &env).unwrap(), "from-env");
    }

    #[test]
    fn test_missing_subnet_is_a_config_error() {
        let result = get_subnet_id(&spec(None, None), &Environment::new());
        assert!(matches!(
            result,
            Err(ResolveError::MissingConfig {
                key: KEY_TARGET_SUBNET_ID,
                ..
            })
        ));
    }

    #[test]
    fn test_profile_precedence() {
        let config = ControllerConfig::default();
        let env_with_profile = env(&[(KEY_TARGET_PROFILE, "bz2e-4x16")]);

        assert_eq!(
            get_profile_name(&config, &spec(None, Some("bz2e-8x32")), &env_with_profile),
            "bz2e-8x32"
        );
        assert_eq!(get_profile_name(&config, &spec(None, None), &env_with_profile), "bz2e-4x16");
        assert_eq!(get_profile_name(&config, &spec(None, None), &Environment::new()), "bz2e-2x8");
    }

    #[test]
    fn test_prototype_from_options() {
        let options = InstanceOptions {
            name: "k8s-operator-hpcr-1".to_string(),
            vpc_id: "vpc-1".to_string(),
            profile_name: "bz2e-2x8".to_string(),
            image_id: "image-1".to_string(),
            zone: "us-east-1".to_string(),
            subnet_id: "subnet-1".to_string(),
            user_data: "contract".to_string(),
            tags: vec!["k8s-operator-hpcr".to_string()],
        };

        let json = serde_json::to_value(InstancePrototype::from(&options)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "k8s-operator-hpcr-1",
                "profile": { "name": "bz2e-2x8" },
                "vpc": { "id": "vpc-1" },
                "image": { "id": "image-1" },
                "zone": { "name": "us-east-1" },
                "primary_network_interface": { "subnet": { "id": "subnet-1" } },
                "user_data": "contract"
            })
        );
    }
}
