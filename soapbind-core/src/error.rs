use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultCode {
    VersionMismatch,
    MustUnderstand,
    /// `Client` in SOAP 1.1, `Sender` in SOAP 1.2
    Client,
    /// `Server` in SOAP 1.1, `Receiver` in SOAP 1.2
    Server,
    Other(String),
}

impl FaultCode {
    /// Parse a fault code as reported on the wire, ignoring any namespace prefix
    pub fn parse(raw: &str) -> Self {
        let local = raw.rsplit(':').next().unwrap_or(raw);
        match local {
            "VersionMismatch" => FaultCode::VersionMismatch,
            "MustUnderstand" => FaultCode::MustUnderstand,
            "Client" | "Sender" => FaultCode::Client,
            "Server" | "Receiver" => FaultCode::Server,
            _ => FaultCode::Other(raw.to_string()),
        }
    }
}

impl fmt::Display for FaultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FaultCode::VersionMismatch => "VersionMismatch",
            FaultCode::MustUnderstand => "MustUnderstand",
            FaultCode::Client => "Client",
            FaultCode::Server => "Server",
            FaultCode::Other(code) => code,
        };
        write!(f, "{}", s)
    }
}

/// Application-level fault reported by a SOAP engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fault {
    pub code: FaultCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<Value>,
}

impl Fault {
    pub fn new(code: FaultCode, message: impl Into<String>) -> Self {
        Fault {
            code,
            message: message.into(),
            detail: None,
        }
    }

    pub fn with_detail(code: FaultCode, message: impl Into<String>, detail: Value) -> Self {
        Fault {
            code,
            message: message.into(),
            detail: Some(detail),
        }
    }

    pub fn client(message: impl Into<String>) -> Self {
        Self::new(FaultCode::Client, message)
    }

    pub fn server(message: impl Into<String>) -> Self {
        Self::new(FaultCode::Server, message)
    }

    pub fn version_mismatch(message: impl Into<String>) -> Self {
        Self::new(FaultCode::VersionMismatch, message)
    }

    pub fn must_understand(message: impl Into<String>) -> Self {
        Self::new(FaultCode::MustUnderstand, message)
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for Fault {}

/// The request builder could not produce a wire request
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BindingError {
    #[error("There is no endpoint specified")]
    MissingEndpoint,
    #[error("There is no SOAP message specified")]
    MissingMessage,
    #[error("SOAP 1.1 cannot be bound to non POST HTTP method {method}")]
    IllegalSoap11Binding { method: String },
    #[error("Invalid HTTP method {method} for SOAP 1.2, expected GET or POST")]
    IllegalSoap12Binding { method: String },
    #[error("Failed to construct request: {0}")]
    Construction(String),
}

impl From<http::Error> for BindingError {
    fn from(err: http::Error) -> Self {
        BindingError::Construction(err.to_string())
    }
}

impl From<http::header::InvalidHeaderValue> for BindingError {
    fn from(err: http::header::InvalidHeaderValue) -> Self {
        BindingError::Construction(err.to_string())
    }
}

/// Failures at the message interpreter boundary
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InterpretError {
    #[error("Cannot interpret operation {operation}: {reason}")]
    Request { operation: String, reason: String },
    #[error("Remote fault: {0}")]
    Fault(Fault),
    #[error("Interpreter session is unusable after a panic")]
    SessionPoisoned,
}

impl InterpretError {
    pub fn request(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        InterpretError::Request {
            operation: operation.into(),
            reason: reason.into(),
        }
    }
}

impl From<Fault> for InterpretError {
    fn from(fault: Fault) -> Self {
        InterpretError::Fault(fault)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown engine option: {0}")]
    UnknownOption(String),
    #[error("Invalid value for engine option {key}: {reason}")]
    InvalidValue { key: String, reason: String },
    #[error("Engine options must be a JSON object")]
    NotAnObject,
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
