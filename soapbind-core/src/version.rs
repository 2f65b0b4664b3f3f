use serde::{Deserialize, Serialize};
use std::fmt;

/// SOAP protocol version a request is bound with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SoapVersion {
    /// SOAP 1.1: POST only, `SOAPAction` header, `text/xml`
    #[default]
    #[serde(rename = "1.1")]
    V1_1,
    /// SOAP 1.2: GET or POST, action carried in the `application/soap+xml` media type
    #[serde(rename = "1.2")]
    V1_2,
}

impl SoapVersion {
    /// Map an engine version code to a version.
    ///
    /// Engines report SOAP 1.1 as `1`; every other code is treated as SOAP 1.2.
    pub fn from_code(code: u32) -> Self {
        if code == 1 {
            SoapVersion::V1_1
        } else {
            SoapVersion::V1_2
        }
    }

    pub fn code(self) -> u32 {
        match self {
            SoapVersion::V1_1 => 1,
            SoapVersion::V1_2 => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SoapVersion::V1_1 => "1.1",
            SoapVersion::V1_2 => "1.2",
        }
    }
}

impl fmt::Display for SoapVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SOAP {}", self.as_str())
    }
}
