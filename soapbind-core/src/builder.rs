//! SOAP over HTTP request builder.
//!
//! Accumulates a location, action, HTTP method, SOAP version and message, then
//! validates them against the SOAP 1.1 / 1.2 HTTP bindings and produces a wire
//! request.
//!
//! A builder describes one request shape. It is not reset by
//! [`RequestBuilder::create_request`], so the same configuration builds the same
//! request again, and any setter may be called between builds to change the shape.
//! Each build creates a fresh body from the builder's [`BodyFactory`]; nothing is
//! carried over from a previous build except the configured fields.

use crate::body::{BodyFactory, BoxBody, BufferBodyFactory, WireRequest};
use crate::error::BindingError;
use crate::version::SoapVersion;
use bytes::Bytes;
use http::header::{HeaderName, HeaderValue, ACCEPT, CONTENT_LENGTH, CONTENT_TYPE};
use http::{Method, Uri};
use std::sync::Arc;
use tracing::{debug, trace};

pub const SOAP_ACTION: HeaderName = HeaderName::from_static("soapaction");

pub const SOAP11_CONTENT_TYPE: &str = "text/xml; charset=\"utf-8\"";
pub const SOAP12_ACCEPT: &str = "application/soap+xml";

#[derive(Debug, Clone)]
pub struct RequestBuilder {
    location: Option<String>,
    method: String,
    version: SoapVersion,
    action: String,
    message: Option<Bytes>,
    body_factory: Arc<dyn BodyFactory>,
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestBuilder {
    /// Builder with SOAP 1.1, POST, empty action and no location or message
    pub fn new() -> Self {
        Self::with_body_factory(Arc::new(BufferBodyFactory))
    }

    pub fn with_body_factory(body_factory: Arc<dyn BodyFactory>) -> Self {
        Self {
            location: None,
            method: Method::POST.to_string(),
            version: SoapVersion::V1_1,
            action: String::new(),
            message: None,
            body_factory,
        }
    }

    pub fn set_location(&mut self, location: impl Into<String>) -> &mut Self {
        self.location = Some(location.into());
        self
    }

    pub fn set_action(&mut self, action: impl Into<String>) -> &mut Self {
        self.action = action.into();
        self
    }

    pub fn set_http_method(&mut self, method: impl Into<String>) -> &mut Self {
        self.method = method.into();
        self
    }

    pub fn set_message(&mut self, content: impl Into<Bytes>) -> &mut Self {
        self.message = Some(content.into());
        self
    }

    /// Build SOAP 1.1 requests
    pub fn soap_1_1(&mut self) -> &mut Self {
        self.version = SoapVersion::V1_1;
        self
    }

    /// Build SOAP 1.2 requests
    pub fn soap_1_2(&mut self) -> &mut Self {
        self.version = SoapVersion::V1_2;
        self
    }

    pub fn set_version(&mut self, version: SoapVersion) -> &mut Self {
        self.version = version;
        self
    }

    pub fn version(&self) -> SoapVersion {
        self.version
    }

    pub fn http_method(&self) -> &str {
        &self.method
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn has_message(&self) -> bool {
        self.message.is_some()
    }

    /// Validate the configuration and build the wire request.
    ///
    /// Checks run in a fixed order and the first failure is returned: location,
    /// message (POST only), SOAP 1.1 method, SOAP 1.2 method. Failures while
    /// assembling the request itself are reported as
    /// [`BindingError::Construction`].
    pub fn create_request(&self) -> Result<WireRequest, BindingError> {
        let location = self.validate().inspect_err(|err| {
            debug!(error = %err, version = %self.version, method = %self.method, "Request validation failed");
        })?;

        let method = Method::from_bytes(self.method.as_bytes())
            .map_err(|e| BindingError::Construction(e.to_string()))?;
        let uri: Uri = location
            .parse()
            .map_err(|e: http::uri::InvalidUri| BindingError::Construction(e.to_string()))?;
        let headers = self.prepare_headers()?;

        // Body is created last so a construction failure never leaves it open
        let mut builder = http::Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            if let Some(map) = builder.headers_mut() {
                map.insert(name, value);
            }
        }
        let request = builder.body(self.prepare_message())?;

        debug!(
            method = %request.method(),
            uri = %request.uri(),
            version = %self.version,
            headers = request.headers().len(),
            "Built SOAP request"
        );
        trace!(action = %self.action, "SOAP action");

        Ok(request)
    }

    fn validate(&self) -> Result<&str, BindingError> {
        let location = match self.location.as_deref() {
            Some(location) if !location.is_empty() => location,
            _ => return Err(BindingError::MissingEndpoint),
        };

        if self.is_post_request() && self.message.is_none() {
            return Err(BindingError::MissingMessage);
        }

        // SOAP 1.1 only defines an HTTP binding for POST
        if self.version == SoapVersion::V1_1 && !self.is_post_request() {
            return Err(BindingError::IllegalSoap11Binding {
                method: self.method.clone(),
            });
        }

        // SOAP 1.2 defines HTTP bindings for GET and POST only
        if self.version == SoapVersion::V1_2 && !matches!(self.method.as_str(), "GET" | "POST") {
            return Err(BindingError::IllegalSoap12Binding {
                method: self.method.clone(),
            });
        }

        Ok(location)
    }

    fn prepare_headers(&self) -> Result<Vec<(HeaderName, HeaderValue)>, BindingError> {
        match self.version {
            SoapVersion::V1_1 => self.prepare_soap11_headers(),
            SoapVersion::V1_2 => self.prepare_soap12_headers(),
        }
    }

    fn prepare_soap11_headers(&self) -> Result<Vec<(HeaderName, HeaderValue)>, BindingError> {
        Ok(vec![
            (CONTENT_LENGTH, HeaderValue::from(self.message_size())),
            (SOAP_ACTION, HeaderValue::from_str(&self.action)?),
            (CONTENT_TYPE, HeaderValue::from_static(SOAP11_CONTENT_TYPE)),
        ])
    }

    /// SOAP 1.2 drops the `SOAPAction` header and carries the action as a
    /// parameter of the `application/soap+xml` media type instead.
    fn prepare_soap12_headers(&self) -> Result<Vec<(HeaderName, HeaderValue)>, BindingError> {
        if self.method != "POST" {
            return Ok(vec![(ACCEPT, HeaderValue::from_static(SOAP12_ACCEPT))]);
        }
        let content_type = format!(
            "application/soap+xml; charset=\"utf-8\"; action=\"{}\"",
            self.action
        );
        Ok(vec![
            (CONTENT_LENGTH, HeaderValue::from(self.message_size())),
            (CONTENT_TYPE, HeaderValue::from_str(&content_type)?),
        ])
    }

    fn prepare_message(&self) -> BoxBody {
        match &self.message {
            Some(message) if self.is_post_request() => self.body_factory.create_body(message.clone()),
            _ => self.body_factory.create_empty(),
        }
    }

    fn message_size(&self) -> usize {
        self.message.as_ref().map_or(0, Bytes::len)
    }

    fn is_post_request(&self) -> bool {
        self.method.eq_ignore_ascii_case("POST")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOCATION: &str = "http://www.dneonline.com/calculator.asmx?wsdl";

    fn header<'a>(request: &'a WireRequest, name: &str) -> Option<&'a str> {
        request
            .headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
    }

    #[test]
    fn test_missing_location() {
        let err = RequestBuilder::new().create_request().unwrap_err();
        assert_eq!(err, BindingError::MissingEndpoint);
    }

    #[test]
    fn test_missing_location_wins_over_other_failures() {
        let err = RequestBuilder::new()
            .set_http_method("PUT")
            .soap_1_2()
            .create_request()
            .unwrap_err();
        assert_eq!(err, BindingError::MissingEndpoint);
    }

    #[test]
    fn test_empty_location_is_missing() {
        let err = RequestBuilder::new()
            .set_location("")
            .set_message("<x/>")
            .create_request()
            .unwrap_err();
        assert_eq!(err, BindingError::MissingEndpoint);
    }

    #[test]
    fn test_post_without_message() {
        let err = RequestBuilder::new()
            .set_location("http://x/svc")
            .create_request()
            .unwrap_err();
        assert_eq!(err, BindingError::MissingMessage);
    }

    #[test]
    fn test_lowercase_post_without_message() {
        let err = RequestBuilder::new()
            .set_location("http://x/svc")
            .set_http_method("post")
            .create_request()
            .unwrap_err();
        assert_eq!(err, BindingError::MissingMessage);
    }

    #[test]
    fn test_soap11_rejects_get() {
        let err = RequestBuilder::new()
            .set_location(LOCATION)
            .set_http_method("GET")
            .set_message("My Http Message")
            .create_request()
            .unwrap_err();
        assert_eq!(
            err,
            BindingError::IllegalSoap11Binding {
                method: "GET".to_string()
            }
        );
    }

    #[test]
    fn test_soap11_rejects_get_without_message() {
        let err = RequestBuilder::new()
            .set_location(LOCATION)
            .set_http_method("GET")
            .create_request()
            .unwrap_err();
        assert!(matches!(err, BindingError::IllegalSoap11Binding { .. }));
    }

    #[test]
    fn test_soap12_rejects_put() {
        let err = RequestBuilder::new()
            .set_location(LOCATION)
            .set_http_method("PUT")
            .soap_1_2()
            .set_message("<m:Value>2</m:Value>")
            .create_request()
            .unwrap_err();
        assert_eq!(
            err,
            BindingError::IllegalSoap12Binding {
                method: "PUT".to_string()
            }
        );
    }

    #[test]
    fn test_soap11_headers() {
        let request = RequestBuilder::new()
            .set_location("http://x/svc")
            .set_action("getStockPrice")
            .set_message("<x/>")
            .create_request()
            .unwrap();

        assert_eq!(request.method(), Method::POST);
        assert_eq!(header(&request, "SOAPAction"), Some("getStockPrice"));
        assert_eq!(header(&request, "content-type"), Some("text/xml; charset=\"utf-8\""));
        assert_eq!(header(&request, "Content-Length"), Some("4"));
        assert_eq!(request.headers().len(), 3);
        assert_eq!(request.body().as_string().unwrap(), "<x/>");
    }

    #[test]
    fn test_soap11_action_defaults_to_empty() {
        let request = RequestBuilder::new()
            .set_location("http://x/svc")
            .set_message("<x/>")
            .create_request()
            .unwrap();
        assert_eq!(header(&request, "soapaction"), Some(""));
    }

    #[test]
    fn test_soap12_post() {
        let request = RequestBuilder::new()
            .set_location(LOCATION)
            .set_http_method("POST")
            .soap_1_2()
            .set_message("<m:Value>2</m:Value>")
            .create_request()
            .unwrap();

        assert_eq!(request.method(), Method::POST);
        assert_eq!(request.uri().to_string(), LOCATION);
        assert_eq!(request.body().as_string().unwrap(), "<m:Value>2</m:Value>");
        let content_type = header(&request, "Content-Type").unwrap();
        assert!(content_type.contains("application/soap+xml"));
        assert_eq!(header(&request, "content-length"), Some("20"));
        assert!(request.headers().get("soapaction").is_none());
    }

    #[test]
    fn test_soap12_post_carries_action_in_content_type() {
        let request = RequestBuilder::new()
            .set_location("http://x/svc")
            .soap_1_2()
            .set_action("urn:Add")
            .set_message("<x/>")
            .create_request()
            .unwrap();
        assert_eq!(
            header(&request, "content-type"),
            Some("application/soap+xml; charset=\"utf-8\"; action=\"urn:Add\"")
        );
    }

    #[test]
    fn test_soap12_get() {
        let request = RequestBuilder::new()
            .set_location("http://x/svc")
            .set_http_method("GET")
            .soap_1_2()
            .set_message("<ignored/>")
            .create_request()
            .unwrap();

        assert_eq!(request.method(), Method::GET);
        assert_eq!(header(&request, "accept"), Some("application/soap+xml"));
        assert!(request.headers().get(CONTENT_LENGTH).is_none());
        assert!(request.headers().get(CONTENT_TYPE).is_none());
        assert_eq!(request.body().size(), Some(0));
    }

    #[test]
    fn test_soap12_get_without_message() {
        let request = RequestBuilder::new()
            .set_location("http://x/svc")
            .set_http_method("GET")
            .soap_1_2()
            .create_request()
            .unwrap();
        assert_eq!(request.body().as_string().unwrap(), "");
    }

    #[test]
    fn test_builder_is_reusable_after_build() {
        let mut builder = RequestBuilder::new();
        builder.set_location("http://x/svc").set_message("<a/>");

        let first = builder.create_request().unwrap();
        let second = builder.create_request().unwrap();
        assert_eq!(first.body().as_string().unwrap(), "<a/>");
        assert_eq!(second.body().as_string().unwrap(), "<a/>");

        builder.soap_1_2().set_http_method("GET");
        let third = builder.create_request().unwrap();
        assert_eq!(third.method(), Method::GET);
        assert!(builder.has_message());
    }

    #[test]
    fn test_malformed_location_is_construction_error() {
        let err = RequestBuilder::new()
            .set_location("http://exa mple.com/svc")
            .set_message("<x/>")
            .create_request()
            .unwrap_err();
        assert!(matches!(err, BindingError::Construction(_)));
    }

    #[test]
    fn test_invalid_action_is_construction_error() {
        let err = RequestBuilder::new()
            .set_location("http://x/svc")
            .set_action("bad\naction")
            .set_message("<x/>")
            .create_request()
            .unwrap_err();
        assert!(matches!(err, BindingError::Construction(_)));
    }
}
