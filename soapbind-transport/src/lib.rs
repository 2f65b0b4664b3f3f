pub mod canned;
#[cfg(feature = "reqwest")]
pub mod reqwest_transport;
pub mod transport;

pub use canned::{CannedResponse, CannedTransport, RecordedRequest};
#[cfg(feature = "reqwest")]
pub use reqwest_transport::ReqwestTransport;
pub use transport::{HttpTransport, TransportConfig, TransportError};
