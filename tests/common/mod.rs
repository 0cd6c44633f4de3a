// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use skillshare_client::config::ClientConfig;
use skillshare_client::gateway::Navigator;
use skillshare_client::storage::MemoryStore;
use skillshare_client::SkillShareClient;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Serve `router` on an ephemeral local port. Returns the base URL.
#[allow(dead_code)]
pub async fn spawn_backend(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test backend");
    let addr = listener.local_addr().expect("No local address");

    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });

    format!("http://{}", addr)
}

/// Base URL of a port nothing listens on.
#[allow(dead_code)]
pub async fn closed_port_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("No local address");
    drop(listener);
    format!("http://{}", addr)
}

/// Navigator that records forced logouts instead of navigating.
#[derive(Default)]
pub struct RecordingNavigator {
    redirects: AtomicUsize,
    last_path: Mutex<Option<String>>,
}

impl RecordingNavigator {
    #[allow(dead_code)]
    pub fn redirects(&self) -> usize {
        self.redirects.load(Ordering::SeqCst)
    }

    #[allow(dead_code)]
    pub fn last_path(&self) -> Option<String> {
        self.last_path.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn redirect_to_login(&self, login_path: &str) {
        self.redirects.fetch_add(1, Ordering::SeqCst);
        *self.last_path.lock().unwrap() = Some(login_path.to_string());
    }
}

/// Test client bundle.
#[allow(dead_code)]
pub struct TestClient {
    pub client: SkillShareClient,
    pub store: Arc<MemoryStore>,
    pub navigator: Arc<RecordingNavigator>,
}

/// Client against `base_url` with in-memory credentials.
#[allow(dead_code)]
pub fn test_client(base_url: &str, fallback: bool) -> TestClient {
    let mut config = ClientConfig::test_default(base_url);
    config.fallback_enabled = fallback;

    let store = Arc::new(MemoryStore::new());
    let navigator = Arc::new(RecordingNavigator::default());
    let client = SkillShareClient::new(config, store.clone(), navigator.clone())
        .expect("Failed to build client");

    TestClient {
        client,
        store,
        navigator,
    }
}

/// Shared request counter for test handlers.
#[allow(dead_code)]
#[derive(Default)]
pub struct Hits(AtomicUsize);

#[allow(dead_code)]
impl Hits {
    pub fn bump(&self) -> usize {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}
