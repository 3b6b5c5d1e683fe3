use crate::error::RequestError;
use crate::protocol::body::BodyHandle;
use crate::protocol::{HttpMessage, Request};

/// Builds a [`Request`] in several fallible steps and reports the first
/// failure at [`RequestBuilder::build`].
///
/// ```
/// use micro_request::{HttpMessage, Request};
///
/// let request = Request::builder()
///     .method("POST")
///     .uri("https://example.com/upload?x=1")
///     .header("Content-Type", "text/plain")
///     .body("hello")
///     .build()
///     .unwrap();
///
/// assert_eq!(request.url(), "/upload?x=1");
/// assert_eq!(request.header("content-type"), ["text/plain"]);
/// ```
#[derive(Debug)]
#[must_use]
pub struct RequestBuilder {
    inner: Result<Request, RequestError>,
}

impl RequestBuilder {
    /// Starts from `GET /` over HTTP/1.1.
    pub fn new() -> Self {
        Self { inner: Ok(Request::default()) }
    }

    /// Sets the method; see [`Request::with_method`].
    pub fn method(self, method: &str) -> Self {
        self.and_then(|request| Ok(request.with_method(method)?))
    }

    /// Sets the absolute URI; the url follows from it.
    pub fn uri(self, uri: &str) -> Self {
        self.and_then(|request| Ok(request.with_absolute_uri(uri)?))
    }

    /// Sets the url; an absolute URI set earlier follows it.
    pub fn url(self, url: &str) -> Self {
        self.and_then(|request| Ok(request.with_url(url)?))
    }

    /// Sets the protocol version, e.g. `"1.0"`.
    pub fn version(self, version: &str) -> Self {
        self.and_then(|request| Ok(request.with_protocol_version(version)?))
    }

    /// Appends a header value; repeated calls with one name accumulate.
    pub fn header<V: Into<String>>(self, name: &str, value: V) -> Self {
        self.and_then(|request| Ok(request.with_added_header(name, value)))
    }

    /// Sets the body handle.
    pub fn body<B: Into<BodyHandle>>(self, body: B) -> Self {
        self.and_then(|request| Ok(request.with_body(body)))
    }

    /// # Errors
    ///
    /// The first error raised by any step.
    pub fn build(self) -> Result<Request, RequestError> {
        self.inner
    }

    fn and_then<F>(self, f: F) -> Self
    where
        F: FnOnce(&Request) -> Result<Request, RequestError>,
    {
        Self { inner: self.inner.and_then(|request| f(&request)) }
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}
