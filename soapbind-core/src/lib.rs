//! Binding of SOAP 1.1 / 1.2 calls onto HTTP.
//!
//! - [`RequestBuilder`] validates a method/version/location/action/message
//!   combination and builds the wire request.
//! - [`SoapInterpreter`] wraps a stateful [`SoapEngine`] behind the
//!   [`MessageInterpreter`] boundary.
//! - [`EngineOptions::normalize`] filters engine configuration.

pub mod body;
pub mod builder;
pub mod descriptor;
pub mod engine;
pub mod error;
pub mod interpreter;
pub mod message;
pub mod options;
pub mod version;

pub use body::{
    Body, BodyError, BodyFactory, BodyGuard, BoxBody, BufferBody, BufferBodyFactory, CloseBody,
    WireRequest, WireResponse,
};
pub use builder::RequestBuilder;
pub use descriptor::SoapRequest;
pub use engine::{DecodedReply, EngineBuilder, RawCall, SoapEngine, WsdlSource};
pub use error::{BindingError, ConfigError, Fault, FaultCode, InterpretError};
pub use interpreter::{MessageInterpreter, RequestHook, SoapInterpreter};
pub use message::{Argument, Arguments, CallOptions, SoapHeader};
pub use options::{EngineOptions, NormalizedOptions};
pub use version::SoapVersion;
