//! In-memory transport serving a fixed page and continuation payloads.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;
use tubemeta_core::transport::{MarkupStream, Transport, TransportError};
use url::Url;

pub struct ScriptedTransport {
    page: String,
    chunk_size: usize,
    continuations: HashMap<String, Value>,
    requests: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    /// Serves `page` in pieces of `chunk_size` bytes (split on char boundaries).
    pub fn new(page: impl Into<String>, chunk_size: usize) -> Self {
        Self {
            page: page.into(),
            chunk_size: chunk_size.max(1),
            continuations: HashMap::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Registers a continuation payload for a path-and-query reference.
    pub fn with_continuation(mut self, reference: &str, payload: Value) -> Self {
        self.continuations.insert(reference.to_string(), payload);
        self
    }

    /// Path and query of every request seen, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    fn record(&self, url: &Url) -> String {
        let key = match url.query() {
            Some(query) => format!("{}?{query}", url.path()),
            None => url.path().to_string(),
        };
        self.requests.lock().unwrap().push(key.clone());
        key
    }
}

struct Pieces(std::vec::IntoIter<String>);

#[async_trait]
impl MarkupStream for Pieces {
    async fn next_chunk(&mut self) -> Result<Option<String>, TransportError> {
        Ok(self.0.next())
    }
}

fn split(text: &str, size: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    for ch in text.chars() {
        current.push(ch);
        if current.len() >= size {
            pieces.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn open_markup(&self, url: &Url) -> Result<Box<dyn MarkupStream>, TransportError> {
        self.record(url);
        Ok(Box::new(Pieces(split(&self.page, self.chunk_size).into_iter())))
    }

    async fn get_json(&self, url: &Url) -> Result<Value, TransportError> {
        let key = self.record(url);
        self.continuations
            .get(&key)
            .cloned()
            .ok_or_else(|| TransportError::http_status(url.as_str(), 404))
    }

    async fn get_form(&self, url: &Url) -> Result<String, TransportError> {
        self.record(url);
        Err(TransportError::http_status(url.as_str(), 404))
    }
}
