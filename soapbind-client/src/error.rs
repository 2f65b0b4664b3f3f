use soapbind_core::{BindingError, BodyError, Fault, InterpretError};
use soapbind_transport::TransportError;
use thiserror::Error;

/// The interpreter future failed; every call on the client observes the same error
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Failed to resolve message interpreter: {message}")]
pub struct ResolutionError {
    message: String,
}

impl ResolutionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<anyhow::Error> for ResolutionError {
    fn from(err: anyhow::Error) -> Self {
        Self::new(format!("{:#}", err))
    }
}

#[derive(Debug, Error)]
pub enum SoapError {
    #[error("Binding error: {0}")]
    Binding(#[from] BindingError),

    #[error("Cannot interpret operation {operation}: {reason}")]
    RequestInterpretation { operation: String, reason: String },

    #[error("Remote fault: {0}")]
    RemoteFault(Fault),

    #[error(transparent)]
    InterpreterResolution(#[from] ResolutionError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Body error: {0}")]
    Body(#[from] BodyError),

    #[error("Call task failed: {0}")]
    TaskFailed(String),
}

impl SoapError {
    /// The remote fault, if this error carries one
    pub fn fault(&self) -> Option<&Fault> {
        match self {
            SoapError::RemoteFault(fault) => Some(fault),
            _ => None,
        }
    }

    pub fn is_fault(&self) -> bool {
        matches!(self, SoapError::RemoteFault(_))
    }
}

impl From<InterpretError> for SoapError {
    fn from(err: InterpretError) -> Self {
        match err {
            InterpretError::Request { operation, reason } => {
                SoapError::RequestInterpretation { operation, reason }
            }
            InterpretError::Fault(fault) => SoapError::RemoteFault(fault),
            InterpretError::SessionPoisoned => SoapError::RequestInterpretation {
                operation: String::new(),
                reason: InterpretError::SessionPoisoned.to_string(),
            },
        }
    }
}
