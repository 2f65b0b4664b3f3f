use async_trait::async_trait;
use soapbind_core::{BodyError, WireRequest, WireResponse};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Connection error: {0}")]
    Connection(String),
    #[error("Request timed out")]
    Timeout,
    #[error("Body error: {0}")]
    Body(#[from] BodyError),
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("Protocol error: {0}")]
    Protocol(String),
}

impl From<http::Error> for TransportError {
    fn from(err: http::Error) -> Self {
        TransportError::Http(err.to_string())
    }
}

/// Executes wire requests.
///
/// The transport only reads the request; the caller keeps ownership of the
/// request body and closes it afterwards. Non-success HTTP statuses are
/// returned as responses, since SOAP faults travel with status 500.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send_request(&self, request: &WireRequest) -> Result<WireResponse, TransportError>;
}

#[async_trait]
impl<T: HttpTransport + ?Sized> HttpTransport for Arc<T> {
    async fn send_request(&self, request: &WireRequest) -> Result<WireResponse, TransportError> {
        (**self).send_request(request).await
    }
}

/// Transport configuration
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Request timeout in milliseconds
    pub timeout_ms: u64,
    /// `User-Agent` sent with every request
    pub user_agent: Option<String>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30000,
            user_agent: None,
        }
    }
}
