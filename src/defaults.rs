//! Default configuration templates per (platform, vendor) pair.
//!
//! The reconciler never sees these directly: callers look up the template
//! for their model hub and target vendor, merge their overrides on top with
//! [`crate::config::merge`], and hand the result to `ensure_deployed`.

use serde_json::json;

use crate::config::{self, ConfigMap};
use crate::name::Platform;

/// Deployment vendor family a template targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VendorKind {
    /// Request/response function-compute vendor; create/update return a
    /// final URL immediately.
    FunctionCompute,
    /// Template-based vendor; create/update submit a provisioning job that
    /// is polled to completion.
    Devs,
}

/// Look up the default configuration template for a deployment, merged with
/// the caller's overrides (override wins at every leaf).
#[must_use]
pub fn default_config(
    platform: Platform,
    vendor: VendorKind,
    model_id: &str,
    model_version: &str,
    overrides: &ConfigMap,
) -> ConfigMap {
    let defaults = template(platform, vendor, model_id, model_version);
    config::merge(&defaults, overrides)
}

fn template(
    platform: Platform,
    vendor: VendorKind,
    model_id: &str,
    model_version: &str,
) -> ConfigMap {
    let value = match vendor {
        VendorKind::FunctionCompute => json!({
            "cpu": 0.05,
            "customContainerConfig": {},
            "description": format!("modelport service, {}-{}", model_id, model_version),
            "environmentVariables": {},
            "gpuConfig": {},
            "role": "",
            "runtime": "custom-container",
            "timeout": 300,
        }),
        VendorKind::Devs => json!({
            "template_name": devs_template_name(platform),
            "parameters": {},
        }),
    };
    match value {
        serde_json::Value::Object(map) => map,
        _ => ConfigMap::new(),
    }
}

fn devs_template_name(platform: Platform) -> &'static str {
    match platform {
        Platform::HuggingFace => "model_app",
        Platform::ModelScope => "tgpu_basic",
    }
}
