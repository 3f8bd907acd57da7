use std::collections::HashMap;
use std::fmt;
use std::io::Read;
use std::sync::{Mutex, OnceLock};

use bytes::Bytes;
use thiserror::Error;
use url::Url;

use crate::http::headers::Headers;

/// HTTP request methods.
///
/// The eight methods of RFC 7231 get their own variant; any other valid
/// method token is carried as an [`Method::Extension`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET - Retrieve a resource
    GET,
    /// HEAD - Like GET but without the response body
    HEAD,
    /// POST - Create or submit data
    POST,
    /// PUT - Replace a resource
    PUT,
    /// DELETE - Delete a resource
    DELETE,
    /// TRACE - Loop back the request message
    TRACE,
    /// CONNECT - Establish a tunnel
    CONNECT,
    /// OPTIONS - Describe communication options
    OPTIONS,
    /// Any other method token, e.g. `PATCH` or `PROPFIND`
    Extension(String),
}

impl Method {
    /// Parses an HTTP method from a string.
    ///
    /// Method names are case-sensitive. Anything that is a valid RFC 7230
    /// token but not one of the standard methods becomes an extension.
    ///
    /// # Example
    ///
    /// ```
    /// # use webmachine::http::request::Method;
    /// assert_eq!(Method::from_str("GET"), Some(Method::GET));
    /// assert_eq!(Method::from_str("PATCH"), Some(Method::Extension("PATCH".into())));
    /// assert_eq!(Method::from_str("BAD METHOD"), None);
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        let method = match s {
            "GET" => Method::GET,
            "HEAD" => Method::HEAD,
            "POST" => Method::POST,
            "PUT" => Method::PUT,
            "DELETE" => Method::DELETE,
            "TRACE" => Method::TRACE,
            "CONNECT" => Method::CONNECT,
            "OPTIONS" => Method::OPTIONS,
            other if is_token(other) => Method::Extension(other.to_string()),
            _ => return None,
        };
        Some(method)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Method::GET => "GET",
            Method::HEAD => "HEAD",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
            Method::TRACE => "TRACE",
            Method::CONNECT => "CONNECT",
            Method::OPTIONS => "OPTIONS",
            Method::Extension(token) => token,
        }
    }

    /// The methods every resource knows unless it says otherwise.
    pub fn standard() -> Vec<Method> {
        vec![
            Method::GET,
            Method::HEAD,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::TRACE,
            Method::CONNECT,
            Method::OPTIONS,
        ]
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn is_token(s: &str) -> bool {
    !s.is_empty()
        && s.bytes().all(|b| {
            b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
        })
}

/// A lazily read request entity.
///
/// The reader sits behind a mutex so an otherwise immutable [`Request`] can
/// still hand its body out once.
pub struct BodyStream {
    reader: Mutex<Option<Box<dyn Read + Send>>>,
}

impl BodyStream {
    pub fn new(reader: impl Read + Send + 'static) -> Self {
        Self {
            reader: Mutex::new(Some(Box::new(reader))),
        }
    }

    /// Drains the stream. A second call yields an empty buffer.
    pub fn read_to_end(&self) -> std::io::Result<Bytes> {
        let mut guard = self
            .reader
            .lock()
            .map_err(|_| std::io::Error::other("request body reader poisoned"))?;

        let mut buf = Vec::new();
        if let Some(mut reader) = guard.take() {
            reader.read_to_end(&mut buf)?;
        }
        Ok(Bytes::from(buf))
    }
}

impl fmt::Debug for BodyStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BodyStream(..)")
    }
}

/// The entity carried by a request.
#[derive(Debug, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Buffered(Bytes),
    Stream(BodyStream),
}

impl RequestBody {
    pub fn is_empty(&self) -> bool {
        match self {
            RequestBody::Empty => true,
            RequestBody::Buffered(bytes) => bytes.is_empty(),
            RequestBody::Stream(_) => false,
        }
    }

    /// Returns the whole entity, reading a stream to its end.
    pub fn to_bytes(&self) -> std::io::Result<Bytes> {
        match self {
            RequestBody::Empty => Ok(Bytes::new()),
            RequestBody::Buffered(bytes) => Ok(bytes.clone()),
            RequestBody::Stream(stream) => stream.read_to_end(),
        }
    }
}

/// Routing data assigned by the dispatcher once a route has matched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dispatch {
    /// The part of the path consumed by the matched route.
    pub disp_path: String,
    /// Named bindings captured by the route.
    pub path_info: HashMap<String, String>,
    /// Path segments left over after a trailing wildcard.
    pub path_tokens: Vec<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("method missing")]
    MissingMethod,
    #[error("uri missing")]
    MissingUri,
    #[error("invalid uri: {0}")]
    InvalidUri(String),
    #[error("dispatch data already assigned")]
    DispatchAlreadySet,
}

/// An HTTP request handed to the decision engine.
///
/// Everything but the dispatch data is fixed at construction. Dispatch data
/// may be assigned exactly once, before the engine runs.
#[derive(Debug)]
pub struct Request {
    method: Method,
    uri: Url,
    headers: Headers,
    body: RequestBody,
    routing_tokens: Option<Vec<String>>,
    base_uri: Option<Url>,
    dispatch: OnceLock<Dispatch>,
}

/// Builder for constructing Request objects.
pub struct RequestBuilder {
    method: Option<Method>,
    uri: Option<String>,
    headers: Headers,
    body: RequestBody,
    routing_tokens: Option<Vec<String>>,
    base_uri: Option<String>,
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self {
            method: None,
            uri: None,
            headers: Headers::new(),
            body: RequestBody::Empty,
            routing_tokens: None,
            base_uri: None,
        }
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Sets the absolute request URI, e.g. `http://example.com/widgets/1`.
    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.append(key, value);
        self
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = RequestBody::Buffered(body.into());
        self
    }

    pub fn body_stream(mut self, reader: impl Read + Send + 'static) -> Self {
        self.body = RequestBody::Stream(BodyStream::new(reader));
        self
    }

    pub fn routing_tokens(mut self, tokens: Vec<String>) -> Self {
        self.routing_tokens = Some(tokens);
        self
    }

    pub fn base_uri(mut self, base: impl Into<String>) -> Self {
        self.base_uri = Some(base.into());
        self
    }

    pub fn build(self) -> Result<Request, RequestError> {
        let method = self.method.ok_or(RequestError::MissingMethod)?;
        let raw = self.uri.ok_or(RequestError::MissingUri)?;
        let uri = Url::parse(&raw).map_err(|e| RequestError::InvalidUri(format!("{raw}: {e}")))?;
        let base_uri = self
            .base_uri
            .map(|b| Url::parse(&b).map_err(|e| RequestError::InvalidUri(format!("{b}: {e}"))))
            .transpose()?;

        Ok(Request {
            method,
            uri,
            headers: self.headers,
            body: self.body,
            routing_tokens: self.routing_tokens,
            base_uri,
            dispatch: OnceLock::new(),
        })
    }
}

impl Request {
    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Url {
        &self.uri
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn body(&self) -> &RequestBody {
        &self.body
    }

    pub fn routing_tokens(&self) -> Option<&[String]> {
        self.routing_tokens.as_deref()
    }

    pub fn base_uri(&self) -> Option<&Url> {
        self.base_uri.as_ref()
    }

    /// Retrieves a header value by name, ignoring case.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key)
    }

    /// Retrieves the Content-Length header value and parses it as a usize.
    ///
    /// Returns `None` if the header is missing or not a valid number.
    pub fn content_length(&self) -> Option<usize> {
        self.header("Content-Length").and_then(|v| v.trim().parse().ok())
    }

    /// Assigns the router's dispatch data. Fails if it was already set.
    pub fn set_dispatch(&self, dispatch: Dispatch) -> Result<(), RequestError> {
        self.dispatch
            .set(dispatch)
            .map_err(|_| RequestError::DispatchAlreadySet)
    }

    pub fn dispatch(&self) -> Option<&Dispatch> {
        self.dispatch.get()
    }

    pub fn disp_path(&self) -> Option<&str> {
        self.dispatch().map(|d| d.disp_path.as_str())
    }

    pub fn path_info(&self, key: &str) -> Option<&str> {
        self.dispatch()
            .and_then(|d| d.path_info.get(key))
            .map(String::as_str)
    }

    pub fn path_tokens(&self) -> Option<&[String]> {
        self.dispatch().map(|d| d.path_tokens.as_slice())
    }

    pub fn is_https(&self) -> bool {
        self.uri.scheme() == "https"
    }

    pub fn is_get(&self) -> bool {
        self.method == Method::GET
    }

    pub fn is_head(&self) -> bool {
        self.method == Method::HEAD
    }

    pub fn is_post(&self) -> bool {
        self.method == Method::POST
    }

    pub fn is_put(&self) -> bool {
        self.method == Method::PUT
    }

    pub fn is_delete(&self) -> bool {
        self.method == Method::DELETE
    }

    pub fn is_trace(&self) -> bool {
        self.method == Method::TRACE
    }

    pub fn is_connect(&self) -> bool {
        self.method == Method::CONNECT
    }

    pub fn is_options(&self) -> bool {
        self.method == Method::OPTIONS
    }
}
