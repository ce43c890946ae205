//! Tests for [`ResourceCache`] de-duplication and failure memoization.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::Notify;

use bd_app::ResourceCache;
use bd_core::ids::{OwnerId, ResourceKey};
use bd_core::ports::{
    FetchedResource, FileTransferError, FileTransferPort, LocalFile, ProgressSender,
};

// Mock transport for bd-app tests
struct MockTransport {
    fetch_calls: Mutex<Vec<String>>,
    fail_keys: HashSet<String>,
    gate: Option<Notify>,
}

impl MockTransport {
    fn new() -> Self {
        Self {
            fetch_calls: Mutex::new(Vec::new()),
            fail_keys: HashSet::new(),
            gate: None,
        }
    }

    fn failing(keys: &[&str]) -> Self {
        Self {
            fetch_calls: Mutex::new(Vec::new()),
            fail_keys: keys.iter().map(|k| k.to_string()).collect(),
            gate: None,
        }
    }

    fn gated() -> Self {
        Self {
            fetch_calls: Mutex::new(Vec::new()),
            fail_keys: HashSet::new(),
            gate: Some(Notify::new()),
        }
    }

    fn fetch_count(&self, key: &str) -> usize {
        self.fetch_calls
            .lock()
            .unwrap()
            .iter()
            .filter(|k| k.as_str() == key)
            .count()
    }

    fn total_fetches(&self) -> usize {
        self.fetch_calls.lock().unwrap().len()
    }
}

#[async_trait]
impl FileTransferPort for MockTransport {
    async fn fetch_resource(
        &self,
        key: &ResourceKey,
    ) -> Result<FetchedResource, FileTransferError> {
        self.fetch_calls
            .lock()
            .unwrap()
            .push(key.as_str().to_string());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        tokio::task::yield_now().await;
        if self.fail_keys.contains(key.as_str()) {
            return Err(FileTransferError::Status(403));
        }
        Ok(FetchedResource {
            bytes: Bytes::from_static(b"binary"),
            content_type: Some("image/png".to_string()),
        })
    }

    async fn upload_file(
        &self,
        _file: LocalFile,
        _progress: ProgressSender,
    ) -> Result<ResourceKey, FileTransferError> {
        unreachable!("upload is not exercised by cache tests")
    }
}

#[tokio::test]
async fn concurrent_resolves_for_one_key_issue_one_request() {
    let transport = Arc::new(MockTransport::new());
    let cache = ResourceCache::new(transport.clone());
    let key = ResourceKey::from("img123.jpg");
    let row_a = OwnerId::from("booking-1");
    let row_b = OwnerId::from("booking-2");

    tokio::join!(cache.resolve(&key, &row_a), cache.resolve(&key, &row_b));

    assert_eq!(transport.fetch_count("img123.jpg"), 1);
    // Both rows end up with their own URI binding.
    assert!(cache.uri_for(&row_a).is_some());
    assert!(cache.uri_for(&row_b).is_some());
}

#[tokio::test]
async fn resolved_key_serves_later_owners_without_refetch() {
    let transport = Arc::new(MockTransport::new());
    let cache = ResourceCache::new(transport.clone());
    let key = ResourceKey::from("logo.png");

    cache.resolve(&key, &OwnerId::from("row-1")).await;
    cache.resolve(&key, &OwnerId::from("row-2")).await;

    assert_eq!(transport.fetch_count("logo.png"), 1);
    assert!(cache.uri_for(&OwnerId::from("row-2")).is_some());
}

#[tokio::test]
async fn resolved_uri_is_a_data_uri() {
    let transport = Arc::new(MockTransport::new());
    let cache = ResourceCache::new(transport.clone());
    let owner = OwnerId::from("row-1");

    cache.resolve(&ResourceKey::from("pic.jpg"), &owner).await;

    let uri = cache.uri_for(&owner).unwrap();
    assert!(uri.starts_with("data:image/png;base64,"));
}

#[tokio::test]
async fn failed_key_is_memoized_and_never_retried() {
    let transport = Arc::new(MockTransport::failing(&["broken.jpg"]));
    let cache = ResourceCache::new(transport.clone());
    let key = ResourceKey::from("broken.jpg");
    let owner = OwnerId::from("row-1");

    cache.resolve(&key, &owner).await;
    assert!(cache.is_failed(&key));
    assert!(!cache.is_in_flight(&key));
    assert!(cache.uri_for(&owner).is_none());

    // Re-render: same key, another owner. No new request.
    cache.resolve(&key, &OwnerId::from("row-2")).await;
    assert_eq!(transport.fetch_count("broken.jpg"), 1);
}

#[tokio::test]
async fn reset_clears_failure_memoization() {
    let transport = Arc::new(MockTransport::failing(&["flaky.jpg"]));
    let cache = ResourceCache::new(transport.clone());
    let key = ResourceKey::from("flaky.jpg");
    let owner = OwnerId::from("row-1");

    cache.resolve(&key, &owner).await;
    assert!(cache.is_failed(&key));

    cache.reset();
    assert!(!cache.is_failed(&key));

    cache.resolve(&key, &owner).await;
    assert_eq!(transport.fetch_count("flaky.jpg"), 2);
}

#[tokio::test]
async fn completion_after_reset_is_dropped() {
    let transport = Arc::new(MockTransport::gated());
    let cache = Arc::new(ResourceCache::new(transport.clone()));
    let key = ResourceKey::from("slow.jpg");
    let owner = OwnerId::from("row-1");

    let task = {
        let cache = cache.clone();
        let key = key.clone();
        let owner = owner.clone();
        tokio::spawn(async move { cache.resolve(&key, &owner).await })
    };

    // Wait until the fetch is actually out.
    while !cache.is_in_flight(&key) {
        tokio::task::yield_now().await;
    }

    cache.reset();
    transport.gate.as_ref().unwrap().notify_one();
    task.await.unwrap();

    // The screen state that asked for it is gone; nothing is bound.
    assert!(cache.uri_for(&owner).is_none());
    assert!(!cache.is_failed(&key));
    assert!(!cache.is_in_flight(&key));
}

#[tokio::test]
async fn empty_key_and_resolved_owner_are_no_ops() {
    let transport = Arc::new(MockTransport::new());
    let cache = ResourceCache::new(transport.clone());
    let owner = OwnerId::from("row-1");

    cache.resolve(&ResourceKey::from(""), &owner).await;
    assert_eq!(transport.total_fetches(), 0);

    cache.resolve(&ResourceKey::from("a.png"), &owner).await;
    // Owner already has a URI; a different key for the same owner is ignored.
    cache.resolve(&ResourceKey::from("b.png"), &owner).await;
    assert_eq!(transport.total_fetches(), 1);
}
