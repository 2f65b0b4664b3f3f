//! Wires transport, body factory, engine and interpreter future into a client.

use crate::client::{BindingResult, InterpreterFuture, SoapHttpClient};
use crate::error::ResolutionError;
use crate::http_interpreter::{HttpBinding, HttpInterpreter};
use anyhow::{anyhow, Context};
use serde_json::{Map, Value};
use soapbind_core::{
    Body, BodyFactory, BodyGuard, ConfigError, EngineBuilder, EngineOptions, RequestHook,
    SoapInterpreter, WsdlSource,
};
use soapbind_transport::HttpTransport;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// True when the locator is an absolute `http` or `https` URI
pub fn is_remote_locator(locator: &str) -> bool {
    locator
        .parse::<http::Uri>()
        .ok()
        .and_then(|uri| {
            uri.scheme_str()
                .map(|scheme| scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https"))
        })
        .unwrap_or(false)
}

/// Builds [`SoapHttpClient`]s sharing one transport and body factory
#[derive(Clone)]
pub struct SoapHttpClientFactory {
    transport: Arc<dyn HttpTransport>,
    body_factory: Arc<dyn BodyFactory>,
    request_hook: Option<RequestHook>,
}

impl SoapHttpClientFactory {
    pub fn new(transport: Arc<dyn HttpTransport>, body_factory: Arc<dyn BodyFactory>) -> Self {
        Self {
            transport,
            body_factory,
            request_hook: None,
        }
    }

    /// Hook applied to every descriptor produced by clients of this factory
    pub fn with_request_hook(mut self, hook: RequestHook) -> Self {
        self.request_hook = Some(hook);
        self
    }

    /// Create a client for the service described at `wsdl`.
    ///
    /// Remote descriptions (`http`/`https`) are fetched through the transport the
    /// first time a call awaits the interpreter future. Local locators are handed
    /// to the engine builder immediately.
    pub fn create<B>(&self, wsdl: &str, options: EngineOptions, engine_builder: B) -> SoapHttpClient
    where
        B: EngineBuilder + 'static,
    {
        let interpreter = if is_remote_locator(wsdl) {
            debug!(wsdl, "Deferring engine construction until WSDL is fetched");
            let transport = self.transport.clone();
            let body_factory = self.body_factory.clone();
            let hook = self.request_hook.clone();
            let locator = wsdl.to_string();

            InterpreterFuture::from_future(async move {
                let document = fetch_wsdl(transport.as_ref(), body_factory.as_ref(), &locator)
                    .await
                    .map_err(|e| {
                        warn!(wsdl = %locator, error = %e, "WSDL fetch failed");
                        ResolutionError::from(e)
                    })?;
                build_binding(
                    &engine_builder,
                    WsdlSource::Document(document),
                    &options,
                    body_factory,
                    hook,
                )
            })
        } else {
            match build_binding(
                &engine_builder,
                WsdlSource::Location(wsdl.to_string()),
                &options,
                self.body_factory.clone(),
                self.request_hook.clone(),
            ) {
                Ok(binding) => InterpreterFuture::ready(binding),
                Err(e) => InterpreterFuture::failed(e),
            }
        };

        SoapHttpClient::new(self.transport.clone(), interpreter)
    }

    /// Normalise a raw option map, then [`create`](Self::create)
    pub fn create_with_raw_options<B>(
        &self,
        wsdl: &str,
        options: Map<String, Value>,
        engine_builder: B,
    ) -> Result<SoapHttpClient, ConfigError>
    where
        B: EngineBuilder + 'static,
    {
        let normalized = EngineOptions::normalize(options)?;
        Ok(self.create(wsdl, normalized.options, engine_builder))
    }
}

impl fmt::Debug for SoapHttpClientFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SoapHttpClientFactory")
            .field("body_factory", &self.body_factory)
            .field("has_request_hook", &self.request_hook.is_some())
            .finish_non_exhaustive()
    }
}

async fn fetch_wsdl(
    transport: &dyn HttpTransport,
    body_factory: &dyn BodyFactory,
    locator: &str,
) -> anyhow::Result<String> {
    info!(wsdl = locator, "Fetching WSDL");

    let request = BodyGuard::new(
        http::Request::builder()
            .method(http::Method::GET)
            .uri(locator)
            .body(body_factory.create_empty())
            .context("Invalid WSDL locator")?,
    );
    let response = BodyGuard::new(
        transport
            .send_request(&request)
            .await
            .with_context(|| format!("Failed to fetch WSDL from {}", locator))?,
    );

    if !response.status().is_success() {
        return Err(anyhow!(
            "Failed to fetch WSDL from {}: HTTP {}",
            locator,
            response.status()
        ));
    }

    let document = response
        .body()
        .as_string()
        .context("WSDL document is not readable")?;
    debug!(wsdl = locator, bytes = document.len(), "Fetched WSDL");
    Ok(document)
}

fn build_binding<B: EngineBuilder>(
    engine_builder: &B,
    source: WsdlSource,
    options: &EngineOptions,
    body_factory: Arc<dyn BodyFactory>,
    hook: Option<RequestHook>,
) -> BindingResult {
    let engine = engine_builder
        .build(source, options)
        .context("Failed to construct SOAP engine")?;

    let mut interpreter = SoapInterpreter::new(engine);
    if let Some(hook) = hook {
        interpreter = interpreter.with_request_hook(move |request| hook(request));
    }

    Ok(Arc::new(HttpInterpreter::new(Arc::new(interpreter), body_factory)) as Arc<dyn HttpBinding>)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_locator_detection() {
        assert!(is_remote_locator("http://example.com/stock?wsdl"));
        assert!(is_remote_locator("HTTPS://example.com/stock.wsdl"));
        assert!(!is_remote_locator("/srv/wsdl/stock.wsdl"));
        assert!(!is_remote_locator("file:///srv/wsdl/stock.wsdl"));
        assert!(!is_remote_locator("stock.wsdl"));
        assert!(!is_remote_locator(""));
    }
}
