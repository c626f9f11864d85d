//! # modelport
//!
//! Deploy a machine-learning model to a serverless vendor as an invokable
//! HTTP service, and memoize the result so repeated requests for the same
//! model/config converge on one remote resource instead of re-provisioning.
//!
//! ## Core Concepts
//!
//! - **Vendor**: a backend that can check, create, and update a named
//!   service ([`FcVendor`] is synchronous, [`DevsVendor`] polls a
//!   provisioning job to completion)
//! - **CacheStore**: durable name → {url, config} memo of past deployments
//! - **Reconciler**: [`ensure_deployed`] decides reuse / update / create
//!   from the cache, a remote existence check, and config-drift comparison
//!
//! ## Example
//!
//! ```no_run
//! use modelport::{
//!     CacheStore, DevsVendor, Platform, VendorKind,
//!     default_config, ensure_deployed, invoke, resource_name,
//! };
//! use serde_json::json;
//!
//! # fn main() -> modelport::Result<()> {
//! let name = resource_name(Platform::ModelScope, "damo/nlp_structbert", "master");
//! let desired = default_config(
//!     Platform::ModelScope,
//!     VendorKind::Devs,
//!     "damo/nlp_structbert",
//!     "master",
//!     &serde_json::Map::new(),
//! );
//!
//! let vendor = DevsVendor::from_env()?;
//! let cache = CacheStore::default_location()?;
//! let deployment = ensure_deployed(&name, &desired, &vendor, &cache)?;
//!
//! let reply = invoke(&deployment.url, &json!({"input": "hello"}))?;
//! println!("{}", reply);
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod defaults;
pub mod error;
pub mod invoke;
pub mod name;
pub mod poller;
pub mod reconciler;
pub mod vendor;

// Re-export main types at crate root
pub use cache::{CacheEntry, CacheSession, CacheStore};
pub use config::{ConfigMap, is_subset, merge};
pub use defaults::{VendorKind, default_config};
pub use error::{Error, Result};
pub use invoke::invoke;
pub use name::{MAX_NAME_LEN, Platform, resource_name};
pub use poller::{PollOutcome, PollPolicy, PollState, await_completion};
pub use reconciler::ensure_deployed;
pub use vendor::{CheckOutcome, Deployment, DevsVendor, FcVendor, Vendor};
