//! Binds interpreted SOAP calls onto wire requests and decodes wire responses.

use crate::error::SoapError;
use serde_json::Value;
use soapbind_core::{
    Arguments, Body, BodyFactory, BodyGuard, CallOptions, MessageInterpreter, RequestBuilder,
    SoapHeader, WireRequest, WireResponse,
};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// Turns operation calls into wire requests and wire responses into values
pub trait HttpBinding: Send + Sync {
    fn request(
        &self,
        operation: &str,
        arguments: &Arguments,
        options: &CallOptions,
        headers: &[SoapHeader],
    ) -> Result<WireRequest, SoapError>;

    fn response(
        &self,
        response: &WireResponse,
        operation: &str,
        output_headers: &mut Vec<SoapHeader>,
    ) -> Result<Value, SoapError>;
}

/// [`HttpBinding`] over a [`MessageInterpreter`] and a fresh [`RequestBuilder`] per call
#[derive(Clone)]
pub struct HttpInterpreter {
    interpreter: Arc<dyn MessageInterpreter>,
    body_factory: Arc<dyn BodyFactory>,
}

impl HttpInterpreter {
    pub fn new(interpreter: Arc<dyn MessageInterpreter>, body_factory: Arc<dyn BodyFactory>) -> Self {
        Self {
            interpreter,
            body_factory,
        }
    }

    pub fn interpreter(&self) -> &Arc<dyn MessageInterpreter> {
        &self.interpreter
    }
}

impl HttpBinding for HttpInterpreter {
    fn request(
        &self,
        operation: &str,
        arguments: &Arguments,
        options: &CallOptions,
        headers: &[SoapHeader],
    ) -> Result<WireRequest, SoapError> {
        let descriptor = self
            .interpreter
            .interpret_request(operation, arguments, options, headers)?;

        let mut builder = RequestBuilder::with_body_factory(self.body_factory.clone());
        builder.set_version(descriptor.version());
        if let Some(location) = descriptor.location() {
            builder.set_location(location);
        }
        if let Some(action) = descriptor.action() {
            builder.set_action(action);
        }

        // Scratch buffer is closed when the guard drops, whatever create_request returns
        let mut buffer = BodyGuard::new(self.body_factory.create_empty());
        buffer.write(descriptor.body().as_bytes())?;
        buffer.rewind();
        builder.set_message(buffer.as_string()?);

        let request = builder.create_request()?;
        debug!(
            operation,
            method = %request.method(),
            uri = %request.uri(),
            headers = request.headers().len(),
            "Bound SOAP request"
        );
        Ok(request)
    }

    fn response(
        &self,
        response: &WireResponse,
        operation: &str,
        output_headers: &mut Vec<SoapHeader>,
    ) -> Result<Value, SoapError> {
        let body = response.body().as_string()?;
        trace!(operation, status = %response.status(), bytes = body.len(), "Interpreting SOAP response");
        Ok(self
            .interpreter
            .interpret_response(&body, operation, output_headers)?)
    }
}

impl fmt::Debug for HttpInterpreter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpInterpreter")
            .field("body_factory", &self.body_factory)
            .finish_non_exhaustive()
    }
}
