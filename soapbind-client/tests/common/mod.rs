#![allow(dead_code)]

use serde_json::json;
use soapbind_client::{
    Arguments, BodyFactory, CallOptions, EngineBuilder, EngineOptions, Fault, SoapHeader,
    WsdlSource,
};
use soapbind_core::{Body, BodyError, BoxBody, BufferBody, DecodedReply, RawCall, SoapEngine};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const DEFAULT_LOCATION: &str = "http://x/svc";

/// Decoded value the stock engine produces for a response body
pub fn decode(operation: &str, response: &str) -> Result<DecodedReply, Fault> {
    if response.contains("Fault") {
        return Err(Fault::server("Price unavailable"));
    }
    Ok(DecodedReply {
        value: json!({ "operation": operation, "body": response }),
        headers: vec![SoapHeader::new("urn:stock", "Session", json!("s-1"))],
    })
}

/// Engine serving `getStockPrice`, `notify` (one-way) and `unbound` (no endpoint)
pub struct StockEngine {
    encodes: Arc<AtomicUsize>,
    decoded_against: Arc<Mutex<Vec<Option<String>>>>,
}

impl SoapEngine for StockEngine {
    fn encode_call(
        &mut self,
        operation: &str,
        arguments: &Arguments,
        options: &CallOptions,
        headers: &[SoapHeader],
    ) -> Result<RawCall, Fault> {
        self.encodes.fetch_add(1, Ordering::SeqCst);
        if !matches!(operation, "getStockPrice" | "notify" | "unbound") {
            return Err(Fault::client(format!(
                "Function (\"{operation}\") is not a valid method for this service"
            )));
        }

        let args: String = arguments
            .iter()
            .map(|arg| {
                let name = arg.name.as_deref().unwrap_or("arg");
                format!("<{name}>{}</{name}>", arg.value)
            })
            .collect();
        let header_names: Vec<&str> = headers.iter().map(|h| h.name.as_str()).collect();

        let location = match operation {
            "unbound" => None,
            _ => Some(
                options
                    .location
                    .clone()
                    .unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
            ),
        };

        Ok(RawCall {
            request: format!(
                "<m:{operation} headers=\"{}\">{args}</m:{operation}>",
                header_names.join(",")
            ),
            location,
            action: Some(operation.to_string()),
            version: 1,
            one_way: operation == "notify",
        })
    }

    fn decode_reply(
        &mut self,
        operation: &str,
        call: Option<&RawCall>,
        response: &str,
    ) -> Result<DecodedReply, Fault> {
        self.decoded_against
            .lock()
            .unwrap()
            .push(call.map(|call| call.request.clone()));
        decode(operation, response)
    }
}

/// Builds [`StockEngine`]s and records every service description it receives
#[derive(Clone, Default)]
pub struct StockEngineBuilder {
    pub builds: Arc<AtomicUsize>,
    pub encodes: Arc<AtomicUsize>,
    /// Stashed request body each decode was handed
    pub decoded_against: Arc<Mutex<Vec<Option<String>>>>,
    pub sources: Arc<Mutex<Vec<WsdlSource>>>,
}

impl EngineBuilder for StockEngineBuilder {
    type Engine = StockEngine;

    fn build(&self, wsdl: WsdlSource, _options: &EngineOptions) -> anyhow::Result<StockEngine> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        if let WsdlSource::Location(location) = &wsdl {
            if location.ends_with("missing.wsdl") {
                anyhow::bail!("Couldn't load from '{}'", location);
            }
        }
        self.sources.lock().unwrap().push(wsdl);
        Ok(StockEngine {
            encodes: self.encodes.clone(),
            decoded_against: self.decoded_against.clone(),
        })
    }
}

/// Body factory counting every body it creates and every close call on them
#[derive(Debug, Default)]
pub struct TrackingBodyFactory {
    pub created: Arc<AtomicUsize>,
    pub closes: Arc<AtomicUsize>,
}

impl TrackingBodyFactory {
    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
struct TrackedBody {
    inner: BufferBody,
    closes: Arc<AtomicUsize>,
}

impl Body for TrackedBody {
    fn size(&self) -> Option<usize> {
        self.inner.size()
    }

    fn as_string(&self) -> Result<String, BodyError> {
        self.inner.as_string()
    }

    fn contents(&self) -> Result<bytes::Bytes, BodyError> {
        self.inner.contents()
    }

    fn write(&mut self, content: &[u8]) -> Result<usize, BodyError> {
        self.inner.write(content)
    }

    fn rewind(&mut self) {
        self.inner.rewind()
    }

    fn close(&mut self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
        self.inner.close()
    }

    fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }
}

impl BodyFactory for TrackingBodyFactory {
    fn create_body(&self, content: bytes::Bytes) -> BoxBody {
        self.created.fetch_add(1, Ordering::SeqCst);
        Box::new(TrackedBody {
            inner: BufferBody::from_bytes(content),
            closes: self.closes.clone(),
        })
    }
}
