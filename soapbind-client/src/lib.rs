//! Async SOAP client over HTTP.
//!
//! ```rust,no_run
//! use soapbind_client::{soap_args, SoapHttpClientFactory};
//! # use soapbind_client::{EngineBuilder, EngineOptions};
//! # fn run<B: EngineBuilder + 'static>(engine_builder: B) -> anyhow::Result<()> {
//! use soapbind_client::{BufferBodyFactory, CannedTransport};
//! use std::sync::Arc;
//!
//! let factory = SoapHttpClientFactory::new(
//!     Arc::new(CannedTransport::new()),
//!     Arc::new(BufferBodyFactory),
//! );
//! let client = factory.create("/srv/wsdl/stock.wsdl", EngineOptions::default(), engine_builder);
//! let _price = client.call("getStockPrice", soap_args! { "name" => "Computer" });
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod factory;
pub mod http_interpreter;
pub mod logging;
pub mod macros;

pub use client::{BindingResult, InterpreterFuture, SoapFuture, SoapHttpClient, SoapReply};
pub use error::{ResolutionError, SoapError};
pub use factory::{is_remote_locator, SoapHttpClientFactory};
pub use http_interpreter::{HttpBinding, HttpInterpreter};

// Re-export commonly used types
pub use soapbind_core::{
    Arguments, BodyFactory, BufferBodyFactory, CallOptions, EngineBuilder, EngineOptions, Fault,
    FaultCode, MessageInterpreter, SoapHeader, SoapInterpreter, SoapVersion, WsdlSource,
};
pub use soapbind_transport::{CannedResponse, CannedTransport, HttpTransport, TransportConfig};
#[cfg(feature = "reqwest")]
pub use soapbind_transport::ReqwestTransport;

#[doc(hidden)]
pub mod __private {
    pub use serde_json;
}
