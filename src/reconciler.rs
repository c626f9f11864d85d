//! Deployment reconciliation.
//!
//! `ensure_deployed` brings one named remote resource into agreement with a
//! desired configuration and returns its invokable URL. The decision walks
//! cache-first, then remote: a warm cache hit with no drift costs no network
//! call at all, a remote check before create keeps the operation idempotent
//! across process restarts, and no mutation happens unless drift was
//! actually observed (an update may redeploy a container, so no-op calls
//! must stay free of side effects).
//!
//! Cache-write rules are asymmetric on purpose: a plain cache hit with no
//! drift never rewrites the cache, but a remote check that finds a matching
//! resource does write it, because that is the first time this process has
//! seen the remote state.

use crate::cache::{CacheEntry, CacheStore};
use crate::config::{self, ConfigMap};
use crate::error::{Error, Result};
use crate::vendor::{CheckOutcome, Deployment, Vendor};

/// Fallback message when a check fails without a vendor message.
const CHECK_FAILED: &str = "model service check failed";
/// Fallback message when an update fails without a vendor message.
const UPDATE_FAILED: &str = "model service update failed";
/// Fallback message when a create fails without a vendor message.
const CREATE_FAILED: &str = "model service create failed";

impl From<&Deployment> for CacheEntry {
    fn from(deployment: &Deployment) -> Self {
        Self {
            url: deployment.url.clone(),
            config: deployment.config.clone(),
        }
    }
}

/// Ensure the named resource is deployed with the desired configuration.
///
/// Returns the live deployment, reusing the cached or remote resource when
/// its configuration already covers `desired` (recursive, value-equal
/// subset), updating it when drift is detected, and creating it when it
/// does not exist. Vendor failures surface immediately; there is no retry
/// at this layer. A cache that cannot be read degrades to a cold cache, and
/// a cache that cannot be written is logged without failing the call, since
/// the vendor state remains the source of truth.
pub fn ensure_deployed(
    name: &str,
    desired: &ConfigMap,
    vendor: &dyn Vendor,
    cache: &CacheStore,
) -> Result<Deployment> {
    if name.is_empty() {
        return Err(Error::config("resource name must not be empty"));
    }

    cache.with_session(|session| {
        // Warm path: last-known deployment for this name
        if let Some(entry) = session.get(name).cloned() {
            if config::is_subset(desired, &entry.config) {
                log::debug!("Cache hit for {}, configuration unchanged", name);
                return Ok(Deployment {
                    url: entry.url,
                    config: entry.config,
                });
            }
            log::info!("Configuration drift for cached {}, updating", name);
            let deployment = vendor
                .update(name, desired)
                .map_err(|e| with_fallback(e, UPDATE_FAILED))?;
            session.set(name, CacheEntry::from(&deployment));
            return Ok(deployment);
        }

        // Cold cache: ask the vendor before provisioning anything
        match vendor
            .check(name)
            .map_err(|e| with_fallback(e, CHECK_FAILED))?
        {
            CheckOutcome::Exists(remote) => {
                if config::is_subset(desired, &remote.config) {
                    log::debug!("Found matching remote deployment for {}", name);
                    session.set(name, CacheEntry::from(&remote));
                    Ok(remote)
                } else {
                    log::info!("Configuration drift for remote {}, updating", name);
                    let deployment = vendor
                        .update(name, desired)
                        .map_err(|e| with_fallback(e, UPDATE_FAILED))?;
                    session.set(name, CacheEntry::from(&deployment));
                    Ok(deployment)
                }
            }
            CheckOutcome::Absent => {
                log::info!("No deployment for {}, creating", name);
                let deployment = vendor
                    .create(name, desired)
                    .map_err(|e| with_fallback(e, CREATE_FAILED))?;
                session.set(name, CacheEntry::from(&deployment));
                Ok(deployment)
            }
        }
    })
}

/// Substitute a per-operation default for an empty vendor message.
fn with_fallback(err: Error, fallback: &str) -> Error {
    match err {
        Error::Vendor { message } if message.trim().is_empty() => Error::vendor(fallback),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_name_is_rejected_before_any_call() {
        struct Unreachable;
        impl Vendor for Unreachable {
            fn check(&self, _: &str) -> Result<CheckOutcome> {
                panic!("must not be called")
            }
            fn create(&self, _: &str, _: &ConfigMap) -> Result<Deployment> {
                panic!("must not be called")
            }
            fn update(&self, _: &str, _: &ConfigMap) -> Result<Deployment> {
                panic!("must not be called")
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let cache = CacheStore::new(dir.path().join("cache.json"));
        let err = ensure_deployed("", &ConfigMap::new(), &Unreachable, &cache).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_empty_vendor_message_gets_operation_fallback() {
        let err = with_fallback(Error::vendor(""), UPDATE_FAILED);
        assert_eq!(format!("{}", err), "model service update failed");
    }

    #[test]
    fn test_vendor_message_is_kept_verbatim() {
        let err = with_fallback(Error::vendor("quota exceeded"), CREATE_FAILED);
        assert_eq!(format!("{}", err), "quota exceeded");
    }

    #[test]
    fn test_non_vendor_errors_pass_through() {
        let err = with_fallback(
            Error::Timeout {
                name: "svc".to_string(),
                attempts: 45,
            },
            CHECK_FAILED,
        );
        assert!(err.is_timeout());
    }
}
