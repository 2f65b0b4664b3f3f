//! Message interpreter boundary and the session adapter around a stateful engine.
//!
//! [`SoapInterpreter`] drives one request/response exchange at a time:
//!
//! - `interpret_request` encodes the call and stashes the produced descriptor;
//! - `interpret_response` stashes the raw response, hands both to the engine's
//!   decode path, then clears the session whether decoding succeeded or faulted.
//!
//! The adapter is not meant for interleaved calls. Two calls sharing one
//! instance must be serialised by the caller: a second `interpret_request` before
//! the first call's `interpret_response` replaces the stashed descriptor, which
//! is logged at warn level. Use one adapter per client for concurrent traffic.

use crate::descriptor::SoapRequest;
use crate::engine::{RawCall, SoapEngine};
use crate::error::InterpretError;
use crate::message::{Arguments, CallOptions, SoapHeader};
use crate::version::SoapVersion;
use serde_json::Value;
use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// Encodes operation calls into descriptors and decodes responses to values
pub trait MessageInterpreter: Send + Sync {
    fn interpret_request(
        &self,
        operation: &str,
        arguments: &Arguments,
        options: &CallOptions,
        headers: &[SoapHeader],
    ) -> Result<SoapRequest, InterpretError>;

    /// Decode a response body. Response headers reported by the engine are
    /// appended to `output_headers` when decoding succeeds.
    fn interpret_response(
        &self,
        body: &str,
        operation: &str,
        output_headers: &mut Vec<SoapHeader>,
    ) -> Result<Value, InterpretError>;
}

/// Rewrites a descriptor after the engine produced it
pub type RequestHook = Arc<dyn Fn(&mut SoapRequest) + Send + Sync>;

struct Session<E> {
    engine: E,
    pending_request: Option<RawCall>,
    pending_response: Option<String>,
}

impl<E> Session<E> {
    fn clear(&mut self) {
        self.pending_request = None;
        self.pending_response = None;
    }
}

pub struct SoapInterpreter<E> {
    session: Mutex<Session<E>>,
    request_hook: Option<RequestHook>,
}

impl<E: SoapEngine> SoapInterpreter<E> {
    pub fn new(engine: E) -> Self {
        Self {
            session: Mutex::new(Session {
                engine,
                pending_request: None,
                pending_response: None,
            }),
            request_hook: None,
        }
    }

    /// Install a hook that may rewrite every descriptor before it is returned
    pub fn with_request_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut SoapRequest) + Send + Sync + 'static,
    {
        self.request_hook = Some(Arc::new(hook));
        self
    }

    /// True when no request or response is stashed
    pub fn is_idle(&self) -> bool {
        match self.session.lock() {
            Ok(session) => session.pending_request.is_none() && session.pending_response.is_none(),
            Err(_) => false,
        }
    }

    fn descriptor(&self, call: &RawCall) -> SoapRequest {
        let mut request = SoapRequest::new();
        request
            .set_body(call.request.clone())
            .set_version(SoapVersion::from_code(call.version))
            .set_one_way(call.one_way);
        if let Some(location) = &call.location {
            request.set_location(location.clone());
        }
        if let Some(action) = &call.action {
            request.set_action(action.clone());
        }
        if let Some(hook) = &self.request_hook {
            hook(&mut request);
        }
        request
    }
}

impl<E: SoapEngine> MessageInterpreter for SoapInterpreter<E> {
    fn interpret_request(
        &self,
        operation: &str,
        arguments: &Arguments,
        options: &CallOptions,
        headers: &[SoapHeader],
    ) -> Result<SoapRequest, InterpretError> {
        let mut session = self
            .session
            .lock()
            .map_err(|_| InterpretError::SessionPoisoned)?;

        let call = session
            .engine
            .encode_call(operation, arguments, options, headers)
            .map_err(|fault| InterpretError::request(operation, fault.to_string()))?;

        if session.pending_request.is_some() {
            warn!(operation, "Replacing a request that never received its response");
        }

        let descriptor = self.descriptor(&call);
        debug!(
            operation,
            version = %descriptor.version(),
            one_way = descriptor.is_one_way(),
            "Interpreted SOAP request"
        );
        session.pending_request = Some(call);
        Ok(descriptor)
    }

    fn interpret_response(
        &self,
        body: &str,
        operation: &str,
        output_headers: &mut Vec<SoapHeader>,
    ) -> Result<Value, InterpretError> {
        let mut session = self
            .session
            .lock()
            .map_err(|_| InterpretError::SessionPoisoned)?;

        session.pending_response = Some(body.to_string());
        let Session {
            engine,
            pending_request,
            pending_response,
        } = &mut *session;
        let response = pending_response.as_deref().unwrap_or_default();
        let decoded = engine.decode_reply(operation, pending_request.as_ref(), response);
        session.clear();

        let reply = decoded.map_err(InterpretError::Fault)?;
        output_headers.extend(reply.headers);
        Ok(reply.value)
    }
}

impl<E> fmt::Debug for SoapInterpreter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SoapInterpreter")
            .field("has_request_hook", &self.request_hook.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::DecodedReply;
    use crate::error::Fault;
    use serde_json::json;

    /// Engine that echoes responses and records what decode saw
    #[derive(Default)]
    struct EchoEngine {
        seen_calls: Arc<Mutex<Vec<Option<RawCall>>>>,
    }

    impl SoapEngine for EchoEngine {
        fn encode_call(
            &mut self,
            operation: &str,
            arguments: &Arguments,
            _options: &CallOptions,
            _headers: &[SoapHeader],
        ) -> Result<RawCall, Fault> {
            if operation == "unknown" {
                return Err(Fault::client("Function (\"unknown\") is not a valid method"));
            }
            Ok(RawCall {
                request: format!("<{operation} args=\"{}\"/>", arguments.len()),
                location: Some("http://x/svc".to_string()),
                action: Some(format!("urn:{operation}")),
                version: 1,
                one_way: false,
            })
        }

        fn decode_reply(
            &mut self,
            _operation: &str,
            call: Option<&RawCall>,
            response: &str,
        ) -> Result<DecodedReply, Fault> {
            self.seen_calls.lock().unwrap().push(call.cloned());
            if response.contains("Fault") {
                return Err(Fault::server("Out of stock"));
            }
            Ok(DecodedReply {
                value: json!(response),
                headers: vec![SoapHeader::new("urn:stock", "Session", json!("s-1"))],
            })
        }
    }

    fn interpreter() -> (SoapInterpreter<EchoEngine>, Arc<Mutex<Vec<Option<RawCall>>>>) {
        let engine = EchoEngine::default();
        let seen = engine.seen_calls.clone();
        (SoapInterpreter::new(engine), seen)
    }

    #[test]
    fn test_request_produces_descriptor() {
        let (interpreter, _) = interpreter();
        let args = Arguments::from(json!({"name": "Computer"}));
        let descriptor = interpreter
            .interpret_request("getStockPrice", &args, &CallOptions::default(), &[])
            .unwrap();

        assert_eq!(descriptor.body(), "<getStockPrice args=\"1\"/>");
        assert_eq!(descriptor.location(), Some("http://x/svc"));
        assert_eq!(descriptor.action(), Some("urn:getStockPrice"));
        assert!(descriptor.is_soap_1_1());
        assert!(!interpreter.is_idle());
    }

    #[test]
    fn test_unknown_operation() {
        let (interpreter, _) = interpreter();
        let err = interpreter
            .interpret_request("unknown", &Arguments::new(), &CallOptions::default(), &[])
            .unwrap_err();
        assert!(matches!(err, InterpretError::Request { ref operation, .. } if operation == "unknown"));
        assert!(interpreter.is_idle());
    }

    #[test]
    fn test_response_consumes_stashed_request_and_clears() {
        let (interpreter, seen) = interpreter();
        interpreter
            .interpret_request("getStockPrice", &Arguments::new(), &CallOptions::default(), &[])
            .unwrap();

        let mut headers = Vec::new();
        let value = interpreter
            .interpret_response("<x:Price>10</x:Price>", "getStockPrice", &mut headers)
            .unwrap();

        assert_eq!(value, json!("<x:Price>10</x:Price>"));
        assert_eq!(headers.len(), 1);
        assert!(interpreter.is_idle());
        let seen = seen.lock().unwrap();
        assert_eq!(
            seen[0].as_ref().map(|call| call.request.as_str()),
            Some("<getStockPrice args=\"0\"/>")
        );
    }

    #[test]
    fn test_fault_clears_session() {
        let (interpreter, seen) = interpreter();
        interpreter
            .interpret_request("getStockPrice", &Arguments::new(), &CallOptions::default(), &[])
            .unwrap();

        let mut headers = Vec::new();
        let err = interpreter
            .interpret_response("<soap:Fault/>", "getStockPrice", &mut headers)
            .unwrap_err();
        assert!(matches!(err, InterpretError::Fault(ref fault) if fault.message == "Out of stock"));
        assert!(headers.is_empty());
        assert!(interpreter.is_idle());

        // The next exchange must not observe the faulted call
        interpreter
            .interpret_response("<x:Price>11</x:Price>", "getStockPrice", &mut headers)
            .unwrap();
        assert_eq!(seen.lock().unwrap()[1], None);
    }

    #[test]
    fn test_request_hook_rewrites_descriptor() {
        let interpreter = SoapInterpreter::new(EchoEngine::default()).with_request_hook(|request| {
            request.set_version(SoapVersion::V1_2).set_location("http://override/svc");
        });
        let descriptor = interpreter
            .interpret_request("getStockPrice", &Arguments::new(), &CallOptions::default(), &[])
            .unwrap();
        assert!(descriptor.is_soap_1_2());
        assert_eq!(descriptor.location(), Some("http://override/svc"));
    }
}
