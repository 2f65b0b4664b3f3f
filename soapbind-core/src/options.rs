//! Engine option normalisation.
//!
//! Engine options arrive as a loose key/value map. Keys the engine understands
//! are kept, transport-level keys are stripped (those concerns belong to the HTTP
//! transport) and anything else is rejected.

use crate::error::ConfigError;
use crate::version::SoapVersion;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

/// Keys passed through to the engine
pub const RECOGNIZED_KEYS: &[&str] = &[
    "location",
    "uri",
    "style",
    "use",
    "soap_version",
    "encoding",
    "exceptions",
    "classmap",
    "typemap",
    "features",
    "cache_wsdl",
];

/// Keys configured on the HTTP transport instead of the engine
pub const TRANSPORT_KEYS: &[&str] = &[
    "login",
    "password",
    "proxy_host",
    "proxy_port",
    "proxy_login",
    "proxy_password",
    "local_cert",
    "passphrase",
    "authentication",
    "compression",
    "trace",
    "connection_timeout",
    "user_agent",
    "stream_context",
    "keep_alive",
    "ssl_method",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default, rename = "use", skip_serializing_if = "Option::is_none")]
    pub use_: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soap_version: Option<SoapVersion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exceptions: Option<bool>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub classmap: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub typemap: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_wsdl: Option<u32>,
}

/// Result of [`EngineOptions::normalize`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedOptions {
    pub options: EngineOptions,
    /// Transport-level keys removed from the input
    pub stripped: Vec<String>,
}

impl EngineOptions {
    /// Split a raw option map into engine options and stripped transport keys.
    ///
    /// `soap_version` accepts either the engine code (`1`, `2`) or `"1.1"` / `"1.2"`.
    pub fn normalize(raw: Map<String, Value>) -> Result<NormalizedOptions, ConfigError> {
        let mut kept = Map::new();
        let mut stripped = Vec::new();

        for (key, value) in raw {
            if TRANSPORT_KEYS.contains(&key.as_str()) {
                stripped.push(key);
            } else if RECOGNIZED_KEYS.contains(&key.as_str()) {
                kept.insert(key, value);
            } else {
                return Err(ConfigError::UnknownOption(key));
            }
        }

        if !stripped.is_empty() {
            warn!(keys = ?stripped, "Stripped transport-level keys from engine options");
        }

        let soap_version = match kept.remove("soap_version") {
            None | Some(Value::Null) => None,
            Some(value) => Some(parse_soap_version(&value)?),
        };

        let mut options: EngineOptions = serde_json::from_value(Value::Object(kept))?;
        options.soap_version = soap_version;

        Ok(NormalizedOptions { options, stripped })
    }

    /// Parse a JSON object of engine options and normalise it
    pub fn from_json_str(json: &str) -> Result<NormalizedOptions, ConfigError> {
        match serde_json::from_str::<Value>(json)? {
            Value::Object(map) => Self::normalize(map),
            _ => Err(ConfigError::NotAnObject),
        }
    }
}

fn parse_soap_version(value: &Value) -> Result<SoapVersion, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidValue {
        key: "soap_version".to_string(),
        reason: reason.to_string(),
    };
    match value {
        Value::Number(code) => match code.as_u64() {
            Some(1) => Ok(SoapVersion::V1_1),
            Some(2) => Ok(SoapVersion::V1_2),
            _ => Err(invalid("expected 1 or 2")),
        },
        Value::String(name) => match name.as_str() {
            "1.1" => Ok(SoapVersion::V1_1),
            "1.2" => Ok(SoapVersion::V1_2),
            _ => Err(invalid("expected \"1.1\" or \"1.2\"")),
        },
        _ => Err(invalid("expected a number or a string")),
    }
}
