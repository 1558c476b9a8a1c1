//! In-memory transport for tests. Records every request it sees.

use async_trait::async_trait;
use http::StatusCode;
use std::sync::Mutex;

use crate::github::transport::{HttpRequest, HttpResponse, Transport, TransportError};

type Handler = Box<dyn Fn(&HttpRequest) -> (u16, String) + Send + Sync>;

pub struct MockTransport {
    handler: Handler,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&HttpRequest) -> (u16, String) + Send + Sync + 'static,
    {
        Self {
            handler: Box::new(handler),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of requests whose path equals `path`
    pub fn count(&self, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.url.path() == path)
            .count()
    }

    pub fn param(request: &HttpRequest, name: &str) -> Option<String> {
        request
            .url
            .query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }

    pub fn page(request: &HttpRequest) -> usize {
        Self::param(request, "page")
            .and_then(|p| p.parse().ok())
            .unwrap_or(1)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let (status, body) = (self.handler)(&request);
        self.requests.lock().unwrap().push(request);
        let status = StatusCode::from_u16(status).map_err(|e| TransportError(e.to_string()))?;
        Ok(HttpResponse { status, body })
    }
}
