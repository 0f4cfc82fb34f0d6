//! # CRD Generator
//!
//! Prints the CustomResourceDefinition YAML of every kind the hooks serve.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin crdgen > config/crd/hpcr.yaml
//!
//! # Generate and apply directly
//! cargo run --bin crdgen | kubectl apply -f -
//! ```

use hpcr_controller::crd::{DataDiskRef, HyperProtectInstance, NetworkRef};
use kube::core::CustomResourceExt;

fn main() {
    let crds = [HyperProtectInstance::crd(), NetworkRef::crd(), DataDiskRef::crd()];

    for crd in crds {
        match serde_yaml::to_string(&crd) {
            Ok(yaml) => {
                println!("---");
                print!("{yaml}");
            }
            Err(e) => {
                eprintln!("Failed to serialize CRD to YAML: {e}");
                std::process::exit(1);
            }
        }
    }
}
