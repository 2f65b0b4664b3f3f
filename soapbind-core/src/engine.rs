//! Boundary to the external SOAP engine that encodes calls to envelopes and
//! decodes envelopes back to values.

use crate::error::Fault;
use crate::message::{Arguments, CallOptions, SoapHeader};
use crate::options::EngineOptions;
use base64::Engine as _;
use serde_json::Value;

/// Wire call produced by an engine for one operation
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawCall {
    pub request: String,
    pub location: Option<String>,
    pub action: Option<String>,
    /// Engine version code, `1` for SOAP 1.1
    pub version: u32,
    pub one_way: bool,
}

/// Value decoded from a response envelope
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DecodedReply {
    pub value: Value,
    pub headers: Vec<SoapHeader>,
}

impl DecodedReply {
    pub fn new(value: Value) -> Self {
        Self {
            value,
            headers: Vec::new(),
        }
    }
}

/// A stateful SOAP engine serving one call at a time.
///
/// `decode_reply` receives the call previously produced by `encode_call` for the
/// same operation, if the caller still holds it.
pub trait SoapEngine: Send {
    fn encode_call(
        &mut self,
        operation: &str,
        arguments: &Arguments,
        options: &CallOptions,
        headers: &[SoapHeader],
    ) -> Result<RawCall, Fault>;

    fn decode_reply(
        &mut self,
        operation: &str,
        call: Option<&RawCall>,
        response: &str,
    ) -> Result<DecodedReply, Fault>;
}

impl<E: SoapEngine + ?Sized> SoapEngine for Box<E> {
    fn encode_call(
        &mut self,
        operation: &str,
        arguments: &Arguments,
        options: &CallOptions,
        headers: &[SoapHeader],
    ) -> Result<RawCall, Fault> {
        (**self).encode_call(operation, arguments, options, headers)
    }

    fn decode_reply(
        &mut self,
        operation: &str,
        call: Option<&RawCall>,
        response: &str,
    ) -> Result<DecodedReply, Fault> {
        (**self).decode_reply(operation, call, response)
    }
}

/// Where an engine loads its service description from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WsdlSource {
    /// Locator the engine resolves itself (file path, URI)
    Location(String),
    /// Service description already fetched
    Document(String),
}

impl WsdlSource {
    /// Locator form, inlining fetched documents as a base64 `data:` URI
    pub fn to_data_uri(&self) -> String {
        match self {
            WsdlSource::Location(location) => location.clone(),
            WsdlSource::Document(document) => format!(
                "data://text/plain;base64,{}",
                base64::engine::general_purpose::STANDARD.encode(document)
            ),
        }
    }
}

/// Constructs engines from a service description
pub trait EngineBuilder: Send + Sync {
    type Engine: SoapEngine + 'static;

    fn build(&self, wsdl: WsdlSource, options: &EngineOptions) -> anyhow::Result<Self::Engine>;
}
