use crate::{HttpTransport, TransportError};
use async_trait::async_trait;
use bytes::Bytes;
use http::header::{HeaderName, HeaderValue};
use http::{HeaderMap, Method, StatusCode, Uri};
use soapbind_core::{Body, BodyFactory, BufferBodyFactory, WireRequest, WireResponse};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Response replayed by [`CannedTransport`]
#[derive(Debug, Clone)]
pub struct CannedResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl CannedResponse {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self::new(StatusCode::OK, body)
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// Request as seen by [`CannedTransport`]
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: String,
}

#[derive(Debug)]
enum Canned {
    Response(CannedResponse),
    Failure(String),
}

// A test that panicked mid-call must not lose entries queued afterwards
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Transport replaying queued responses in order and recording every request
#[derive(Debug)]
pub struct CannedTransport {
    queue: Mutex<VecDeque<Canned>>,
    recorded: Mutex<Vec<RecordedRequest>>,
    body_factory: Arc<dyn BodyFactory>,
}

impl Default for CannedTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl CannedTransport {
    pub fn new() -> Self {
        Self::with_body_factory(Arc::new(BufferBodyFactory))
    }

    /// Response bodies are created by `body_factory`
    pub fn with_body_factory(body_factory: Arc<dyn BodyFactory>) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            recorded: Mutex::new(Vec::new()),
            body_factory,
        }
    }

    pub fn push_response(&self, response: CannedResponse) -> &Self {
        lock(&self.queue).push_back(Canned::Response(response));
        self
    }

    /// Queue a connection failure
    pub fn push_failure(&self, message: impl Into<String>) -> &Self {
        lock(&self.queue).push_back(Canned::Failure(message.into()));
        self
    }

    pub fn pending(&self) -> usize {
        lock(&self.queue).len()
    }

    pub fn recorded(&self) -> Vec<RecordedRequest> {
        lock(&self.recorded).clone()
    }
}

#[async_trait]
impl HttpTransport for CannedTransport {
    async fn send_request(&self, request: &WireRequest) -> Result<WireResponse, TransportError> {
        let recorded = RecordedRequest {
            method: request.method().clone(),
            uri: request.uri().clone(),
            headers: request.headers().clone(),
            body: request.body().as_string()?,
        };
        lock(&self.recorded).push(recorded);

        let next = lock(&self.queue).pop_front();

        match next {
            Some(Canned::Response(canned)) => {
                let mut builder = http::Response::builder().status(canned.status);
                if let Some(headers) = builder.headers_mut() {
                    *headers = canned.headers;
                }
                Ok(builder.body(self.body_factory.create_body(canned.body))?)
            }
            Some(Canned::Failure(message)) => Err(TransportError::Connection(message)),
            None => Err(TransportError::Protocol(
                "No canned response queued".to_string(),
            )),
        }
    }
}
