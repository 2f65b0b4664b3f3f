use crate::{HttpTransport, TransportConfig, TransportError};
use async_trait::async_trait;
use soapbind_core::{Body, BoxBody, BufferBody, WireRequest, WireResponse};
use std::time::Duration;
use tracing::{debug, trace};

/// HTTP transport backed by a `reqwest` client
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(config: TransportConfig) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder().timeout(Duration::from_millis(config.timeout_ms));
        if let Some(user_agent) = config.user_agent {
            builder = builder.user_agent(user_agent);
        }
        let client = builder
            .build()
            .map_err(|e| TransportError::Connection(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// Use an already configured client (proxies, TLS, authentication)
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send_request(&self, request: &WireRequest) -> Result<WireResponse, TransportError> {
        let body = request.body().contents()?;

        debug!(method = %request.method(), uri = %request.uri(), "Sending HTTP request");
        trace!("Request body: {} bytes", body.len());

        let response = self
            .client
            .request(request.method().clone(), request.uri().to_string())
            .headers(request.headers().clone())
            .body(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        let version = response.version();
        let headers = response.headers().clone();
        let bytes = response.bytes().await.map_err(map_reqwest_error)?;

        debug!(%status, bytes = bytes.len(), "Received HTTP response");

        let mut builder = http::Response::builder().status(status).version(version);
        if let Some(map) = builder.headers_mut() {
            *map = headers;
        }
        let body: BoxBody = Box::new(BufferBody::from_bytes(bytes));
        Ok(builder.body(body)?)
    }
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_connect() {
        TransportError::Connection(err.to_string())
    } else {
        TransportError::Http(err.to_string())
    }
}
