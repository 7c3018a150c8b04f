#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use drill_core::model::{AssetRequest, AssetResponse};
use services::{FetchError, Fetcher};

pub const ORIGIN: &str = "https://drill.test/app/";

/// In-memory network double that counts every request it sees.
#[derive(Default)]
pub struct FakeNetwork {
    routes: Mutex<HashMap<String, AssetResponse>>,
    offline: AtomicBool,
    calls: AtomicUsize,
}

impl FakeNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serve(&self, url: &str, body: &str) {
        self.serve_response(url, AssetResponse::ok(Some("text/plain"), body));
    }

    pub fn serve_response(&self, url: &str, response: AssetResponse) {
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), response);
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for FakeNetwork {
    async fn fetch(&self, request: &AssetRequest) -> Result<AssetResponse, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err(FetchError::Network("offline".into()));
        }
        let routes = self.routes.lock().unwrap();
        Ok(routes
            .get(request.url().as_str())
            .cloned()
            .unwrap_or_else(|| AssetResponse::new(404, None, b"not found".to_vec())))
    }
}

pub fn bank_json(questions: &[(&str, &str, &str)]) -> String {
    let items: Vec<String> = questions
        .iter()
        .map(|(text, case, answer)| {
            format!(
                r#"{{"text": "{text}", "targetCase": "{case}", "answer": "{answer}", "hint": "Tipp"}}"#
            )
        })
        .collect();
    format!(r#"{{"questions": [{}]}}"#, items.join(","))
}
