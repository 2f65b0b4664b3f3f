//! Call model handed to the message interpreter: operation arguments, per-call
//! options and SOAP headers.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single operation argument, optionally named
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Argument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub value: Value,
}

/// Ordered list of positional and keyed arguments
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Arguments(Vec<Argument>);

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn positional(values: impl IntoIterator<Item = Value>) -> Self {
        Arguments(
            values
                .into_iter()
                .map(|value| Argument { name: None, value })
                .collect(),
        )
    }

    pub fn keyed<K: Into<String>>(pairs: impl IntoIterator<Item = (K, Value)>) -> Self {
        Arguments(
            pairs
                .into_iter()
                .map(|(name, value)| Argument {
                    name: Some(name.into()),
                    value,
                })
                .collect(),
        )
    }

    pub fn push(&mut self, value: Value) -> &mut Self {
        self.0.push(Argument { name: None, value });
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) -> &mut Self {
        self.0.push(Argument {
            name: Some(name.into()),
            value,
        });
        self
    }

    /// Value of the first argument with this name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0
            .iter()
            .find(|arg| arg.name.as_deref() == Some(name))
            .map(|arg| &arg.value)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Argument> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Value>> for Arguments {
    fn from(values: Vec<Value>) -> Self {
        Arguments::positional(values)
    }
}

/// Objects become keyed arguments, arrays positional ones, anything else a
/// single positional argument. `null` means no arguments.
impl From<Value> for Arguments {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Arguments::new(),
            Value::Array(items) => Arguments::positional(items),
            Value::Object(map) => Arguments::keyed(map),
            other => Arguments::positional([other]),
        }
    }
}

impl<'a> IntoIterator for &'a Arguments {
    type Item = &'a Argument;
    type IntoIter = std::slice::Iter<'a, Argument>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Per-call options understood by the message interpreter
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallOptions {
    /// Endpoint overriding the one declared by the service description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Target namespace of the service
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub soap_action: Option<String>,
}

impl CallOptions {
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    pub fn with_soap_action(mut self, action: impl Into<String>) -> Self {
        self.soap_action = Some(action.into());
        self
    }
}

/// SOAP envelope header entry, sent with a request or reported by a response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoapHeader {
    pub namespace: String,
    pub name: String,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub must_understand: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
}

impl SoapHeader {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>, data: Value) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            data,
            must_understand: false,
            actor: None,
        }
    }

    pub fn must_understand(mut self) -> Self {
        self.must_understand = true;
        self
    }

    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }
}
