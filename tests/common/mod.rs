//! Common test utilities: in-memory providers and request fixtures

#![allow(dead_code, reason = "each test binary uses a different subset")]

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{TimeZone, Utc};
use hpcr_controller::config::ControllerConfig;
use hpcr_controller::controller::{Environment, HookContext};
use hpcr_controller::provider::vpc::{ProfileReference, ResourceReference, ZoneReference};
use hpcr_controller::provider::{
    Image, Instance, InstancePrototype, Network, ProviderError, ProviderFactory, StorageVolume,
    Subnet, TaggingProvider, VirtualizationProvider, VpcProvider,
};
use hpcr_controller::server::{router, AppState, BuildInfo};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

pub const SUBNET_ID: &str = "0717-subnet-1";
pub const VPC_ID: &str = "r006-vpc-1";
pub const ZONE: &str = "us-east-1";
pub const STOCK_IMAGE_ID: &str = "r006-stock-image";

type ProviderResult<T> = Result<T, ProviderError>;

/// VPC with one subnet, a stock image and whatever instances the tests create
#[derive(Debug, Default)]
pub struct FakeVpc {
    pub instances: Mutex<Vec<Instance>>,
    pub images: Mutex<BTreeMap<String, String>>,
    pub created: Mutex<Vec<InstancePrototype>>,
    pub deleted: Mutex<Vec<String>>,
    pub calls: Mutex<usize>,
}

impl FakeVpc {
    pub fn add_image(&self, name: &str, id: &str) {
        self.images.lock().unwrap().insert(name.to_string(), id.to_string());
    }

    pub fn add_instance(&self, name: &str, status: &str) {
        let instance = instance(&format!("id-{name}"), name, status);
        self.instances.lock().unwrap().push(instance);
    }

    pub fn set_status(&self, name: &str, status: &str) {
        for instance in self.instances.lock().unwrap().iter_mut() {
            if instance.name == name {
                instance.status = status.to_string();
            }
        }
    }

    pub fn remove_instance(&self, name: &str) {
        self.instances.lock().unwrap().retain(|i| i.name != name);
    }

    pub fn created(&self) -> Vec<InstancePrototype> {
        self.created.lock().unwrap().clone()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }

    fn touch(&self) {
        *self.calls.lock().unwrap() += 1;
    }
}

pub fn instance(id: &str, name: &str, status: &str) -> Instance {
    Instance {
        id: id.to_string(),
        crn: instance_crn(id),
        name: name.to_string(),
        status: status.to_string(),
        vpc: ResourceReference {
            id: VPC_ID.to_string(),
            name: Some("test-vpc".to_string()),
        },
        zone: ZoneReference {
            name: ZONE.to_string(),
        },
        profile: ProfileReference {
            name: "bz2e-2x8".to_string(),
        },
        image: None,
        created_at: Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()),
    }
}

#[async_trait]
impl VpcProvider for FakeVpc {
    async fn get_subnet(&self, subnet_id: &str) -> ProviderResult<Subnet> {
        self.touch();
        if subnet_id != SUBNET_ID {
            return Err(ProviderError::NotFound(format!("subnet [{subnet_id}]")));
        }
        Ok(Subnet {
            id: SUBNET_ID.to_string(),
            name: Some("test-subnet".to_string()),
            vpc: ResourceReference {
                id: VPC_ID.to_string(),
                name: Some("test-vpc".to_string()),
            },
            zone: ZoneReference {
                name: ZONE.to_string(),
            },
        })
    }

    async fn find_image_by_name(&self, name: &str) -> ProviderResult<Image> {
        self.touch();
        let images = self.images.lock().unwrap();
        let id = images
            .get(name)
            .ok_or_else(|| ProviderError::NotFound(format!("image [{name}]")))?;
        Ok(image(id, name))
    }

    async fn find_latest_stock_image(&self) -> ProviderResult<Image> {
        self.touch();
        Ok(image(
            STOCK_IMAGE_ID,
            "ibm-hyper-protect-container-runtime-1-0-s390x-22",
        ))
    }

    async fn find_instances_by_name(&self, name: &str) -> ProviderResult<Vec<Instance>> {
        self.touch();
        Ok(self
            .instances
            .lock()
            .unwrap()
            .iter()
            .filter(|i| i.name == name)
            .cloned()
            .collect())
    }

    async fn create_instance(&self, prototype: &InstancePrototype) -> ProviderResult<Instance> {
        self.touch();
        self.created.lock().unwrap().push(prototype.clone());
        let created = instance(&format!("id-{}", prototype.name), &prototype.name, "pending");
        self.instances.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn delete_instance(&self, instance_id: &str) -> ProviderResult<()> {
        self.touch();
        self.deleted.lock().unwrap().push(instance_id.to_string());
        for instance in self.instances.lock().unwrap().iter_mut() {
            if instance.id == instance_id {
                instance.status = "deleting".to_string();
            }
        }
        Ok(())
    }
}

pub fn instance_crn(id: &str) -> String {
    format!("crn:v1:bluemix:public:is:{ZONE}:a/123456::instance:{id}")
}

/// Records every attach call as `(crn, tags)`
#[derive(Debug, Default)]
pub struct FakeTagging {
    pub attached: Mutex<Vec<(String, Vec<String>)>>,
    pub fail: bool,
}

impl FakeTagging {
    pub fn attached(&self) -> Vec<(String, Vec<String>)> {
        self.attached.lock().unwrap().clone()
    }
}

#[async_trait]
impl TaggingProvider for FakeTagging {
    async fn attach_tags(&self, crn: &str, tags: &[String]) -> ProviderResult<()> {
        self.attached.lock().unwrap().push((crn.to_string(), tags.to_vec()));
        if self.fail {
            return Err(ProviderError::Api {
                status: 200,
                message: format!("unable to attach tags to [{crn}]"),
            });
        }
        Ok(())
    }
}

fn image(id: &str, name: &str) -> Image {
    Image {
        id: id.to_string(),
        name: name.to_string(),
        status: Some("available".to_string()),
        visibility: Some("public".to_string()),
        created_at: Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap(),
    }
}

/// libvirt host with one network and one volume in pool `default`
#[derive(Debug, Default)]
pub struct FakeVirt {
    pub lookups: Mutex<Vec<String>>,
}

impl FakeVirt {
    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }
}

#[async_trait]
impl VirtualizationProvider for FakeVirt {
    async fn get_network(&self, name: &str) -> ProviderResult<Network> {
        self.lookups.lock().unwrap().push(format!("network/{name}"));
        if name != "hpcr-net" {
            return Err(ProviderError::NotFound(format!("network [{name}]")));
        }
        Ok(Network {
            name: name.to_string(),
            uuid: "2f1c2d6e-54f4-4b2d-9a1f-3a7d4b8c9e10".to_string(),
            active: true,
            persistent: true,
            autostart: true,
            bridge: Some("virbr1".to_string()),
        })
    }

    async fn get_storage_volume(&self, pool: &str, name: &str) -> ProviderResult<StorageVolume> {
        self.lookups.lock().unwrap().push(format!("volume/{pool}/{name}"));
        if pool != "default" || name != "data.qcow2" {
            return Err(ProviderError::NotFound(format!("volume [{pool}/{name}]")));
        }
        Ok(StorageVolume {
            name: name.to_string(),
            pool: pool.to_string(),
            kind: "file".to_string(),
            capacity: "10.00 GiB".to_string(),
            allocation: "196.00 KiB".to_string(),
            path: format!("/var/lib/libvirt/images/{name}"),
        })
    }
}

/// Hands out the shared fakes; optionally fails client construction like a missing API key
#[derive(Debug, Default)]
pub struct FakeProviders {
    pub vpc: Arc<FakeVpc>,
    pub tagging: Arc<FakeTagging>,
    pub virt: Arc<FakeVirt>,
    pub fail_vpc_client: bool,
    pub fail_tagging_client: bool,
    pub environments: Mutex<Vec<Environment>>,
}

impl FakeProviders {
    pub fn environments(&self) -> Vec<Environment> {
        self.environments.lock().unwrap().clone()
    }
}

impl ProviderFactory for FakeProviders {
    fn vpc(&self, env: &Environment) -> ProviderResult<Arc<dyn VpcProvider>> {
        self.environments.lock().unwrap().push(env.clone());
        if self.fail_vpc_client {
            return Err(ProviderError::InvalidConfig(
                "unable to locate the API key".to_string(),
            ));
        }
        Ok(Arc::clone(&self.vpc) as Arc<dyn VpcProvider>)
    }

    fn tagging(&self, _env: &Environment) -> ProviderResult<Arc<dyn TaggingProvider>> {
        if self.fail_tagging_client {
            return Err(ProviderError::InvalidConfig(
                "unable to locate the API key".to_string(),
            ));
        }
        Ok(Arc::clone(&self.tagging) as Arc<dyn TaggingProvider>)
    }

    fn virtualization(&self, env: &Environment) -> ProviderResult<Arc<dyn VirtualizationProvider>> {
        self.environments.lock().unwrap().push(env.clone());
        Ok(Arc::clone(&self.virt) as Arc<dyn VirtualizationProvider>)
    }
}

pub fn context(providers: Arc<FakeProviders>) -> HookContext {
    HookContext::new(Arc::new(ControllerConfig::default()), providers)
}

pub fn app(providers: Arc<FakeProviders>) -> Router {
    app_with_context(context(providers))
}

pub fn app_with_context(ctx: HookContext) -> Router {
    router(AppState {
        ctx,
        build: BuildInfo {
            version: "0.1.0",
            compile: "2024-05-01T12:00:00Z",
        },
    })
}

/// POST `body` to `path` and decode the JSON answer
pub async fn post(app: Router, path: &str, body: &Value) -> (StatusCode, Value) {
    post_raw(app, path, body.to_string()).await
}

pub async fn post_raw(app: Router, path: &str, body: String) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

pub async fn get(app: Router, path: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(path).body(Body::empty()).unwrap();
    send(app, request).await
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
}

pub fn instance_parent(uid: &str, spec: Value) -> Value {
    json!({
        "apiVersion": "hpcr.hyper-protect.io/v1",
        "kind": "HyperProtectInstance",
        "metadata": { "name": "enclave", "namespace": "default", "uid": uid },
        "spec": spec,
    })
}

pub fn parent(kind: &str, uid: &str, spec: Value) -> Value {
    json!({
        "apiVersion": "hpcr.hyper-protect.io/v1",
        "kind": kind,
        "metadata": { "name": "ref", "namespace": "default", "uid": uid },
        "spec": spec,
    })
}

/// Orchestrator request carrying one config map with `data`
pub fn hook_request(parent: Value, data: Value) -> Value {
    json!({
        "controller": { "metadata": { "name": "hpcr" } },
        "parent": parent,
        "related": {
            "ConfigMap.v1": {
                "default/hpcr-config": {
                    "apiVersion": "v1",
                    "kind": "ConfigMap",
                    "metadata": { "name": "hpcr-config", "namespace": "default" },
                    "data": data,
                }
            }
        },
        "finalizing": false,
    })
}

pub fn instance_name(uid: &str) -> String {
    format!("k8s-operator-hpcr-{uid}")
}
