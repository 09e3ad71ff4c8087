//! Test doubles shared by the crawler unit tests

use crate::crawler::fetcher::{FetchError, FetchResponse, Fetcher};
use async_trait::async_trait;
use std::sync::Mutex;
use tokio::time::Instant;

type Script = dyn Fn(&str, usize) -> Result<FetchResponse, FetchError> + Send + Sync;

/// Fetcher whose answers come from a closure of `(url, call index for that url)`
pub struct ScriptedFetcher {
    script: Box<Script>,
    calls: Mutex<Vec<(String, Instant)>>,
}

impl ScriptedFetcher {
    pub fn new<F>(script: F) -> Self
    where
        F: Fn(&str, usize) -> Result<FetchResponse, FetchError> + Send + Sync + 'static,
    {
        Self {
            script: Box::new(script),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every URL requested so far, with the (tokio) time of the request
    pub fn calls(&self) -> Vec<(String, Instant)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn fetched_urls(&self) -> Vec<String> {
        self.calls().into_iter().map(|(url, _)| url).collect()
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            let previous = calls.iter().filter(|(u, _)| u == url).count();
            calls.push((url.to_string(), Instant::now()));
            previous
        };
        (self.script)(url, call)
    }
}

/// A 200 `text/html` response
pub fn html_page(url: &str, body: &str) -> FetchResponse {
    FetchResponse {
        final_url: url.to_string(),
        status_code: 200,
        body: body.to_string(),
    }
}
