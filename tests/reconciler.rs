//! End-to-end reconciliation tests with a scripted vendor.

use std::sync::Mutex;

use serde_json::{Value, json};

use modelport::{
    CacheStore, CheckOutcome, ConfigMap, Deployment, Error, Result, Vendor, ensure_deployed,
};

fn map(value: Value) -> ConfigMap {
    match value {
        Value::Object(m) => m,
        _ => panic!("test fixture must be an object"),
    }
}

fn deployment(url: &str, config: Value) -> Deployment {
    Deployment {
        url: url.to_string(),
        config: map(config),
    }
}

/// Vendor double that records calls and answers from a fixed script.
#[derive(Default)]
struct MockVendor {
    calls: Mutex<Vec<&'static str>>,
    check_outcome: Option<CheckOutcome>,
    check_error: Option<String>,
    create_result: Option<Deployment>,
    create_error: Option<String>,
    update_result: Option<Deployment>,
    update_error: Option<String>,
}

impl MockVendor {
    fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }
}

impl Vendor for MockVendor {
    fn check(&self, _name: &str) -> Result<CheckOutcome> {
        self.calls.lock().unwrap().push("check");
        if let Some(msg) = &self.check_error {
            return Err(Error::vendor(msg.clone()));
        }
        Ok(self.check_outcome.clone().unwrap_or(CheckOutcome::Absent))
    }

    fn create(&self, _name: &str, _config: &ConfigMap) -> Result<Deployment> {
        self.calls.lock().unwrap().push("create");
        if let Some(msg) = &self.create_error {
            return Err(Error::vendor(msg.clone()));
        }
        self.create_result
            .clone()
            .ok_or_else(|| Error::vendor("unexpected create"))
    }

    fn update(&self, _name: &str, _config: &ConfigMap) -> Result<Deployment> {
        self.calls.lock().unwrap().push("update");
        if let Some(msg) = &self.update_error {
            return Err(Error::vendor(msg.clone()));
        }
        self.update_result
            .clone()
            .ok_or_else(|| Error::vendor("unexpected update"))
    }
}

fn temp_cache() -> (tempfile::TempDir, CacheStore) {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempfile::tempdir().unwrap();
    let store = CacheStore::new(dir.path().join(".cache").join("modelport.json"));
    (dir, store)
}

#[test]
fn test_cold_start_creates_and_caches() {
    let (_dir, cache) = temp_cache();
    let vendor = MockVendor {
        create_result: Some(deployment("https://x/y", json!({"memory": 512, "cpu": 1}))),
        ..Default::default()
    };

    let desired = map(json!({"memory": 512}));
    let result = ensure_deployed("svc-modelA-v1", &desired, &vendor, &cache).unwrap();

    assert_eq!(result.url, "https://x/y");
    assert_eq!(vendor.calls(), vec!["check", "create"]);
    assert_eq!(
        cache.get("svc-modelA-v1").unwrap().config,
        map(json!({"memory": 512, "cpu": 1}))
    );
}

#[test]
fn test_second_call_is_a_pure_cache_hit() {
    let (_dir, cache) = temp_cache();
    let vendor = MockVendor {
        create_result: Some(deployment("https://x/y", json!({"memory": 512, "cpu": 1}))),
        ..Default::default()
    };
    let desired = map(json!({"memory": 512}));

    ensure_deployed("svc-modelA-v1", &desired, &vendor, &cache).unwrap();
    let again = ensure_deployed("svc-modelA-v1", &desired, &vendor, &cache).unwrap();

    assert_eq!(again.url, "https://x/y");
    // Idempotence: the second call made no vendor calls at all
    assert_eq!(vendor.calls(), vec!["check", "create"]);
}

#[test]
fn test_cached_drift_triggers_update_and_rewrites_cache() {
    let (_dir, cache) = temp_cache();
    let vendor = MockVendor {
        create_result: Some(deployment("https://x/y", json!({"memory": 512, "cpu": 1}))),
        update_result: Some(deployment("https://x/y2", json!({"memory": 1024, "cpu": 1}))),
        ..Default::default()
    };

    ensure_deployed("svc-modelA-v1", &map(json!({"memory": 512})), &vendor, &cache).unwrap();
    let updated =
        ensure_deployed("svc-modelA-v1", &map(json!({"memory": 1024})), &vendor, &cache).unwrap();

    assert_eq!(updated.url, "https://x/y2");
    // Drift on a warm cache goes straight to update, without a remote check
    assert_eq!(vendor.calls(), vec!["check", "create", "update"]);
    assert_eq!(
        cache.get("svc-modelA-v1").unwrap().config,
        map(json!({"memory": 1024, "cpu": 1}))
    );
}

#[test]
fn test_matching_remote_deployment_is_adopted_into_cache() {
    let (_dir, cache) = temp_cache();
    let vendor = MockVendor {
        check_outcome: Some(CheckOutcome::Exists(deployment(
            "https://x/y",
            json!({"memory": 512, "cpu": 1}),
        ))),
        ..Default::default()
    };
    let desired = map(json!({"memory": 512}));

    let result = ensure_deployed("svc-modelA-v1", &desired, &vendor, &cache).unwrap();
    assert_eq!(result.url, "https://x/y");
    assert_eq!(vendor.calls(), vec!["check"]);

    // First sighting of the remote state is written to the cache, so the
    // next call does not even check
    ensure_deployed("svc-modelA-v1", &desired, &vendor, &cache).unwrap();
    assert_eq!(vendor.calls(), vec!["check"]);
}

#[test]
fn test_drifted_remote_deployment_is_updated() {
    let (_dir, cache) = temp_cache();
    let vendor = MockVendor {
        check_outcome: Some(CheckOutcome::Exists(deployment(
            "https://x/y",
            json!({"memory": 512}),
        ))),
        update_result: Some(deployment("https://x/y", json!({"memory": 1024}))),
        ..Default::default()
    };

    let result =
        ensure_deployed("svc-modelA-v1", &map(json!({"memory": 1024})), &vendor, &cache).unwrap();

    assert_eq!(vendor.calls(), vec!["check", "update"]);
    assert_eq!(result.config, map(json!({"memory": 1024})));
    assert_eq!(
        cache.get("svc-modelA-v1").unwrap().config,
        map(json!({"memory": 1024}))
    );
}

#[test]
fn test_failed_check_is_not_masked_by_creation() {
    let (_dir, cache) = temp_cache();
    let vendor = MockVendor {
        check_error: Some("resource exists but is broken".to_string()),
        create_result: Some(deployment("https://x/y", json!({}))),
        ..Default::default()
    };

    let err = ensure_deployed("svc-modelA-v1", &ConfigMap::new(), &vendor, &cache).unwrap_err();
    assert_eq!(format!("{}", err), "resource exists but is broken");
    // No create attempt after an indeterminate check
    assert_eq!(vendor.calls(), vec!["check"]);
    assert_eq!(cache.get("svc-modelA-v1"), None);
}

#[test]
fn test_failed_update_surfaces_the_vendor_message() {
    let (_dir, cache) = temp_cache();
    let vendor = MockVendor {
        create_result: Some(deployment("https://x/y", json!({"memory": 512}))),
        update_error: Some("quota exceeded".to_string()),
        ..Default::default()
    };

    ensure_deployed("svc-modelA-v1", &map(json!({"memory": 512})), &vendor, &cache).unwrap();
    let err = ensure_deployed("svc-modelA-v1", &map(json!({"memory": 1024})), &vendor, &cache)
        .unwrap_err();

    assert_eq!(format!("{}", err), "quota exceeded");
    // The cache still holds the last confirmed deployment
    assert_eq!(
        cache.get("svc-modelA-v1").unwrap().config,
        map(json!({"memory": 512}))
    );
}

#[test]
fn test_failed_update_without_message_gets_the_generic_default() {
    let (_dir, cache) = temp_cache();
    let vendor = MockVendor {
        create_result: Some(deployment("https://x/y", json!({"memory": 512}))),
        update_error: Some(String::new()),
        ..Default::default()
    };

    ensure_deployed("svc-modelA-v1", &map(json!({"memory": 512})), &vendor, &cache).unwrap();
    let err = ensure_deployed("svc-modelA-v1", &map(json!({"memory": 1024})), &vendor, &cache)
        .unwrap_err();

    assert_eq!(format!("{}", err), "model service update failed");
}

#[test]
fn test_failed_create_surfaces_the_vendor_message() {
    let (_dir, cache) = temp_cache();
    let vendor = MockVendor {
        create_error: Some("image pull denied".to_string()),
        ..Default::default()
    };

    let err = ensure_deployed("svc-modelA-v1", &ConfigMap::new(), &vendor, &cache).unwrap_err();
    assert_eq!(format!("{}", err), "image pull denied");
    assert_eq!(cache.get("svc-modelA-v1"), None);
}

#[test]
fn test_empty_desired_config_reuses_any_remote_state() {
    let (_dir, cache) = temp_cache();
    let vendor = MockVendor {
        check_outcome: Some(CheckOutcome::Exists(deployment(
            "https://x/y",
            json!({"anything": {"at": "all"}}),
        ))),
        ..Default::default()
    };

    let result = ensure_deployed("svc-modelA-v1", &ConfigMap::new(), &vendor, &cache).unwrap();
    assert_eq!(result.url, "https://x/y");
    assert_eq!(vendor.calls(), vec!["check"]);
}

#[test]
fn test_corrupt_cache_degrades_to_remote_check() {
    let (_dir, cache) = temp_cache();
    std::fs::create_dir_all(cache.path().parent().unwrap()).unwrap();
    std::fs::write(cache.path(), "definitely not json").unwrap();

    let vendor = MockVendor {
        check_outcome: Some(CheckOutcome::Exists(deployment(
            "https://x/y",
            json!({"memory": 512}),
        ))),
        ..Default::default()
    };

    let result =
        ensure_deployed("svc-modelA-v1", &map(json!({"memory": 512})), &vendor, &cache).unwrap();
    assert_eq!(result.url, "https://x/y");
    assert_eq!(vendor.calls(), vec!["check"]);

    // The corrupt document was replaced by a valid one
    assert_eq!(
        cache.get("svc-modelA-v1"),
        Some(modelport::CacheEntry {
            url: "https://x/y".to_string(),
            config: map(json!({"memory": 512})),
        })
    );
}

#[test]
fn test_distinct_names_do_not_share_cache_entries() {
    let (_dir, cache) = temp_cache();
    let vendor = MockVendor {
        create_result: Some(deployment("https://x/a", json!({"memory": 512}))),
        ..Default::default()
    };

    ensure_deployed("svc-modelA-v1", &map(json!({"memory": 512})), &vendor, &cache).unwrap();
    ensure_deployed("svc-modelB-v1", &map(json!({"memory": 512})), &vendor, &cache).unwrap();

    assert_eq!(vendor.calls(), vec!["check", "create", "check", "create"]);
}
