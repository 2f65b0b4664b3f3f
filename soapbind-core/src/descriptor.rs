use crate::version::SoapVersion;
use serde::{Deserialize, Serialize};

/// Version-tagged description of one encoded call, produced by the message
/// interpreter before any HTTP binding is applied.
///
/// A descriptor is created fresh for every call and owned by that call only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoapRequest {
    body: String,
    location: Option<String>,
    action: Option<String>,
    version: SoapVersion,
    one_way: bool,
}

impl SoapRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn action(&self) -> Option<&str> {
        self.action.as_deref()
    }

    pub fn version(&self) -> SoapVersion {
        self.version
    }

    pub fn is_soap_1_1(&self) -> bool {
        self.version == SoapVersion::V1_1
    }

    pub fn is_soap_1_2(&self) -> bool {
        self.version == SoapVersion::V1_2
    }

    pub fn is_one_way(&self) -> bool {
        self.one_way
    }

    pub fn set_body(&mut self, body: impl Into<String>) -> &mut Self {
        self.body = body.into();
        self
    }

    pub fn set_location(&mut self, location: impl Into<String>) -> &mut Self {
        self.location = Some(location.into());
        self
    }

    pub fn set_action(&mut self, action: impl Into<String>) -> &mut Self {
        self.action = Some(action.into());
        self
    }

    pub fn set_version(&mut self, version: SoapVersion) -> &mut Self {
        self.version = version;
        self
    }

    pub fn set_one_way(&mut self, one_way: bool) -> &mut Self {
        self.one_way = one_way;
        self
    }
}
