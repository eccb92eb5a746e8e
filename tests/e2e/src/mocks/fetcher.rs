//! In-memory Fetcher
//!
//! Serves registered URLs from memory and records every request, so tests can
//! assert both what the loader produced and what it had to download.

use std::collections::HashMap;
use std::io::Write;
use std::sync::{Arc, Mutex};

use wordvec_core::{FetchError, Fetcher};

#[derive(Debug, Clone)]
enum Response {
    Body(Vec<u8>),
    Status(u16),
}

/// Fetcher backed by a URL → response map
///
/// Cloning shares state, so a test can keep one handle and give the other
/// to a `ModelLoader`.
#[derive(Debug, Clone, Default)]
pub struct MockFetcher {
    responses: Arc<Mutex<HashMap<String, Response>>>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` at `url`
    pub fn serve(self, url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        self.responses
            .lock()
            .expect("mock lock poisoned")
            .insert(url.into(), Response::Body(body.into()));
        self
    }

    /// Answer `url` with an HTTP error status
    pub fn fail(self, url: impl Into<String>, status: u16) -> Self {
        self.responses
            .lock()
            .expect("mock lock poisoned")
            .insert(url.into(), Response::Status(status));
        self
    }

    /// URLs requested so far, in order
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().expect("mock lock poisoned").clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().expect("mock lock poisoned").len()
    }

    fn respond(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.requests
            .lock()
            .expect("mock lock poisoned")
            .push(url.to_string());

        match self.responses.lock().expect("mock lock poisoned").get(url) {
            Some(Response::Body(body)) => Ok(body.clone()),
            Some(Response::Status(404)) | None => Err(FetchError::NotFound(url.to_string())),
            Some(Response::Status(status)) => Err(FetchError::Status {
                url: url.to_string(),
                status: *status,
            }),
        }
    }
}

impl Fetcher for MockFetcher {
    fn fetch_to(&self, url: &str, writer: &mut dyn Write) -> Result<u64, FetchError> {
        let body = self.respond(url)?;
        writer.write_all(&body)?;
        Ok(body.len() as u64)
    }

    fn fetch_string(&self, url: &str) -> Result<String, FetchError> {
        let body = self.respond(url)?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}
