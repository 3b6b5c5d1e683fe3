//! The outgoing request value.
//!
//! A [`Request`] carries its target twice: as an optional absolute URI and as
//! a required origin-form url. The two are kept in step on every change:
//!
//! - setting the absolute URI derives the url from its path and query
//! - setting the url rewrites the path and query of the absolute URI, if there
//!   is one, and leaves scheme, authority and fragment alone
//!
//! so that `absolute_uri().map(AbsoluteUri::origin_form)` always equals
//! `Some(url())`. Every change returns a new request; the old one stays valid.

use bytes::BytesMut;
use http::{HeaderMap, HeaderName, HeaderValue, Uri};
use tokio_util::codec::Encoder;
use tracing::{debug, trace};

use crate::codec::HeadEncoder;
use crate::error::{IntoHttpError, InvalidMethod, InvalidUri, InvalidUrl, RequestError};
use crate::grammar::{AbsoluteUri, Method, OriginUrl, UrlPolicy, has_scheme};
use crate::protocol::body::HandleBody;
use crate::protocol::{HttpMessage, Message, RequestBuilder};

/// An immutable HTTP client request.
#[derive(Debug, Clone, Default)]
pub struct Request {
    method: Method,
    absolute_uri: Option<AbsoluteUri>,
    url: OriginUrl,
    message: Message,
}

impl Request {
    /// Creates a request with an empty body and no headers.
    ///
    /// `target` is read as an absolute URI when it starts with a scheme and as
    /// an origin-form url otherwise.
    ///
    /// # Errors
    ///
    /// Returns the [`RequestError`] of whichever part failed its grammar.
    pub fn new(method: &str, target: &str) -> Result<Self, RequestError> {
        let method = Method::parse(method)?;
        if has_scheme(target) {
            Ok(Self::from_uri_parts(method, AbsoluteUri::parse(target)?, Message::default()))
        } else {
            Ok(Self::from_url_parts(method, OriginUrl::parse(target)?, Message::default()))
        }
    }

    /// Starts a [`RequestBuilder`] from the default request (`GET /`, HTTP/1.1).
    pub fn builder() -> RequestBuilder {
        RequestBuilder::new()
    }

    /// Assembles a request from parts that already passed the grammar.
    pub fn from_uri_parts(method: Method, uri: AbsoluteUri, message: Message) -> Self {
        let url = uri.origin_form();
        Self::assemble(method, Some(uri), url, message)
    }

    /// Assembles a request with no absolute URI.
    pub fn from_url_parts(method: Method, url: OriginUrl, message: Message) -> Self {
        Self::assemble(method, None, url, message)
    }

    /// The request method, case as given.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Replaces the method.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidMethod`] if `method` is not a token; `self` is unchanged.
    pub fn with_method(&self, method: &str) -> Result<Self, InvalidMethod> {
        let method = Method::parse(method)?;
        Ok(Self::assemble(method, self.absolute_uri.clone(), self.url.clone(), self.message.clone()))
    }

    /// The absolute URI, `None` when scheme or host is unknown.
    pub fn absolute_uri(&self) -> Option<&AbsoluteUri> {
        self.absolute_uri.as_ref()
    }

    /// Sets the absolute URI and derives the url from its path and query.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidUri`] if `uri` lacks a scheme or host or breaks RFC 3986.
    pub fn with_absolute_uri(&self, uri: &str) -> Result<Self, InvalidUri> {
        let uri = AbsoluteUri::parse(uri)?;
        let url = uri.origin_form();
        trace!(uri = %uri, url = %url, "derive url from absolute uri");
        Ok(Self::assemble(self.method.clone(), Some(uri), url, self.message.clone()))
    }

    /// The origin-form request target, `/` by default.
    pub fn url(&self) -> &OriginUrl {
        &self.url
    }

    /// Sets the url, rejecting any scheme, authority or fragment.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidUrl`] if `url` is not origin-form.
    pub fn with_url(&self, url: &str) -> Result<Self, InvalidUrl> {
        self.with_url_policy(url, UrlPolicy::Reject)
    }

    /// Sets the url, handling scheme, authority and fragment per `policy`.
    ///
    /// When an absolute URI is present its path and query are replaced; when
    /// absent it stays absent.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidUrl`] if what remains under `policy` is not origin-form,
    /// or if the rewritten absolute URI would exceed [`MAX_URI_LEN`](crate::MAX_URI_LEN).
    pub fn with_url_policy(&self, url: &str, policy: UrlPolicy) -> Result<Self, InvalidUrl> {
        let origin = OriginUrl::parse_with(url, policy)?;
        let absolute_uri = self
            .absolute_uri
            .as_ref()
            .map(|uri| uri.with_origin_form(&origin))
            .transpose()
            .map_err(|reason| InvalidUrl::new(url, reason))
            .inspect_err(|e| debug!(url = e.value(), reason = e.reason(), "reject url for absolute uri"))?;
        if let Some(uri) = &absolute_uri {
            trace!(url = %origin, uri = %uri, "rewrite absolute uri from url");
        }
        Ok(Self::assemble(self.method.clone(), absolute_uri, origin, self.message.clone()))
    }

    /// Converts into an `http::Request` for a transport built on the `http`
    /// crate. The body handle is shared, not copied.
    ///
    /// The target is the absolute URI without its fragment when present, the
    /// url otherwise.
    ///
    /// # Errors
    ///
    /// - [`IntoHttpError::UnsupportedVersion`] if the version has no `http::Version`
    /// - [`IntoHttpError::InvalidTarget`] if `http::Uri` refuses the target; its
    ///   grammar is stricter than RFC 3986 in places, e.g. percent-escapes in a
    ///   host (`http://a%41b.com/`) are valid here but rejected there
    /// - [`IntoHttpError::InvalidHeaderName`] or [`IntoHttpError::InvalidHeaderValue`]
    ///   if a header is not acceptable to the `http` crate
    pub fn to_http(&self) -> Result<http::Request<HandleBody>, IntoHttpError> {
        self.http_request().inspect_err(|e| debug!(cause = %e, "failed to convert request to http"))
    }

    fn http_request(&self) -> Result<http::Request<HandleBody>, IntoHttpError> {
        let version = self.protocol_version().to_http().ok_or_else(|| IntoHttpError::unsupported_version(self.protocol_version()))?;

        let uri = match &self.absolute_uri {
            Some(absolute) => Uri::try_from(absolute.without_fragment())?,
            None => Uri::try_from(self.url.as_str())?,
        };

        let mut headers = HeaderMap::with_capacity(self.headers().len());
        for (name, values) in self.headers().iter() {
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| IntoHttpError::invalid_header_name(name, e))?;
            for value in values {
                let header_value = HeaderValue::from_str(value).map_err(|e| IntoHttpError::invalid_header_value(name, e))?;
                headers.append(&header_name, header_value);
            }
        }

        let mut request = http::Request::new(self.body().clone().into_http_body());
        *request.method_mut() = self.method.as_http().clone();
        *request.uri_mut() = uri;
        *request.version_mut() = version;
        *request.headers_mut() = headers;
        Ok(request)
    }

    /// Appends the HTTP/1.x request head (request line, header lines and the
    /// blank line) to `dst`. See [`HeadEncoder`].
    ///
    /// # Errors
    ///
    /// Returns [`IntoHttpError`] for versions other than 1.0 and 1.1 or for
    /// header names and values that cannot go on the wire; `dst` is unchanged.
    pub fn encode_head(&self, dst: &mut BytesMut) -> Result<(), IntoHttpError> {
        HeadEncoder.encode(self, dst)
    }

    fn assemble(method: Method, absolute_uri: Option<AbsoluteUri>, url: OriginUrl, message: Message) -> Self {
        debug_assert!(absolute_uri.as_ref().is_none_or(|uri| uri.origin_form() == url), "absolute uri and url out of sync");
        Self { method, absolute_uri, url, message }
    }
}

impl HttpMessage for Request {
    fn message(&self) -> &Message {
        &self.message
    }

    fn with_message(&self, message: Message) -> Self {
        Self::assemble(self.method.clone(), self.absolute_uri.clone(), self.url.clone(), message)
    }
}

impl TryFrom<&Request> for http::Request<HandleBody> {
    type Error = IntoHttpError;

    fn try_from(request: &Request) -> Result<Self, Self::Error> {
        request.to_http()
    }
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;

    use super::*;
    use crate::MAX_URI_LEN;
    use crate::protocol::body::BodyHandle;

    fn with_uri(uri: &str) -> Request {
        Request::default().with_absolute_uri(uri).unwrap()
    }

    #[test]
    fn default_request() {
        let request = Request::default();
        assert_eq!(request.method(), "GET");
        assert_eq!(request.url(), "/");
        assert!(request.absolute_uri().is_none());
        assert_eq!(request.protocol_version(), "1.1");
        assert!(request.headers().is_empty());
    }

    #[test]
    fn new_detects_target_form() {
        let absolute = Request::new("POST", "https://example.com/a?b=1").unwrap();
        assert_eq!(absolute.method(), "POST");
        assert_eq!(absolute.absolute_uri().unwrap(), "https://example.com/a?b=1");
        assert_eq!(absolute.url(), "/a?b=1");

        let relative = Request::new("GET", "/only/path").unwrap();
        assert!(relative.absolute_uri().is_none());
        assert_eq!(relative.url(), "/only/path");

        assert!(matches!(Request::new("G T", "/"), Err(RequestError::Method { .. })));
        assert!(matches!(Request::new("GET", "http:///x"), Err(RequestError::Uri { .. })));
        assert!(matches!(Request::new("GET", "//host/x"), Err(RequestError::Url { .. })));
    }

    #[test]
    fn method_round_trip_preserves_case() {
        let request = Request::default();
        for method in ["GET", "get", "Patch", "M-SEARCH", "x~y"] {
            assert_eq!(request.with_method(method).unwrap().method().as_str(), method);
        }
    }

    #[test]
    fn invalid_method_leaves_request_unchanged() {
        let request = Request::new("POST", "/a").unwrap();
        let error = request.with_method("GE T").unwrap_err();

        assert_eq!(error.value(), "GE T");
        assert_eq!(request.method(), "POST");
        assert_eq!(request.url(), "/a");
    }

    #[test]
    fn absolute_uri_drives_url() {
        let request = Request::default().with_absolute_uri("http://example.com/a/b?x=1").unwrap();
        assert_eq!(request.url(), "/a/b?x=1");
        assert_eq!(request.absolute_uri().unwrap(), "http://example.com/a/b?x=1");
    }

    #[test]
    fn absolute_uri_with_empty_path_gives_root_url() {
        assert_eq!(with_uri("http://example.com").url(), "/");
        assert_eq!(with_uri("http://example.com?x=1").url(), "/?x=1");
        assert_eq!(with_uri("http://example.com#top").url(), "/");
    }

    #[test]
    fn url_drives_absolute_uri() {
        let request = with_uri("http://example.com/old?y=2");
        let updated = request.with_url("/new?z=3").unwrap();

        assert_eq!(updated.absolute_uri().unwrap(), "http://example.com/new?z=3");
        assert_eq!(updated.url(), "/new?z=3");
    }

    #[test]
    fn url_keeps_scheme_authority_and_fragment() {
        let request = with_uri("https://user:pw@example.com:8443/old?y=2#section");
        let updated = request.with_url("/new").unwrap();

        assert_eq!(updated.absolute_uri().unwrap(), "https://user:pw@example.com:8443/new#section");
        assert_eq!(updated.url(), "/new");
    }

    #[test]
    fn url_rejects_mixed_forms() {
        let request = with_uri("http://example.com/old");

        let error = request.with_url("http://example.com/a").unwrap_err();
        assert_eq!(error.value(), "http://example.com/a");
        assert!(request.with_url("//example.com/a").is_err());
        assert!(request.with_url("/a#frag").is_err());

        assert_eq!(request.url(), "/old");
        assert_eq!(request.absolute_uri().unwrap(), "http://example.com/old");
    }

    #[test]
    fn url_is_always_reusable() {
        let error = Request::default().with_absolute_uri("http://example.com//evil.com/x").unwrap_err();
        assert_eq!(error.reason(), "path must not start with \"//\" at index 18");

        for uri in ["http://example.com", "http://example.com/a//b?c#d", "http://example.com?q", "http://[::1]:8080/%2F/x"] {
            let request = with_uri(uri);
            let again = request.with_url(request.url().as_str()).unwrap();
            assert_eq!(again.url(), request.url());
            assert_eq!(again.absolute_uri().unwrap().origin_form(), *request.url());
        }
    }

    #[test]
    fn url_rewrite_respects_uri_length_limit() {
        let request = with_uri(&format!("http://example.com/{}", "a".repeat(8000)));
        let long_url = format!("/{}", "b".repeat(8181));

        let error = request.with_url(&long_url).unwrap_err();
        assert_eq!(error.value(), long_url);
        assert_eq!(error.reason(), format!("resulting uri length 8200 exceeds the limit {MAX_URI_LEN}"));
        assert_eq!(request.url().as_str().len(), 8001);

        // without an absolute uri only the url limit applies
        let relative = Request::default().with_url(&long_url).unwrap();
        assert_eq!(relative.url(), long_url.as_str());

        let short = request.with_url("/short").unwrap();
        let reparsed = AbsoluteUri::parse(short.absolute_uri().unwrap().as_str()).unwrap();
        assert_eq!(&reparsed, short.absolute_uri().unwrap());
    }

    #[test]
    fn url_strip_policy() {
        let request = with_uri("http://example.com/old#keep");
        let updated = request.with_url_policy("https://other.org/new?q#drop", UrlPolicy::Strip).unwrap();

        assert_eq!(updated.url(), "/new?q");
        assert_eq!(updated.absolute_uri().unwrap(), "http://example.com/new?q#keep");
    }

    #[test]
    fn absent_absolute_uri_stays_absent() {
        let request = Request::new("GET", "/start").unwrap();
        assert!(request.absolute_uri().is_none());

        let updated = request.with_url("/next?x=1").unwrap();
        assert!(updated.absolute_uri().is_none());
        assert_eq!(updated.url(), "/next?x=1");
    }

    #[test]
    fn invalid_uri_leaves_request_unchanged() {
        let request = with_uri("http://example.com/a");
        let error = request.with_absolute_uri("/relative").unwrap_err();

        assert_eq!(error.reason(), "missing scheme");
        assert_eq!(request.absolute_uri().unwrap(), "http://example.com/a");
        assert_eq!(request.url(), "/a");
    }

    #[test]
    fn every_mutator_leaves_receiver_unchanged() {
        let request = with_uri("http://example.com/a?b").with_header("X-A", ["1"]).with_body("body");
        let headers = request.headers().clone();

        let _ = request.with_method("PUT").unwrap();
        let _ = request.with_absolute_uri("https://other.org/z").unwrap();
        let _ = request.with_url("/c").unwrap();
        let _ = request.with_protocol_version("1.0").unwrap();
        let _ = request.with_header("X-A", ["2"]);
        let _ = request.with_added_header("X-A", "3");
        let _ = request.without_header("X-A");
        let _ = request.with_body("other");

        assert_eq!(request.method(), "GET");
        assert_eq!(request.absolute_uri().unwrap(), "http://example.com/a?b");
        assert_eq!(request.url(), "/a?b");
        assert_eq!(request.protocol_version(), "1.1");
        assert_eq!(request.header("x-a"), ["1"]);
        assert!(request.headers().ptr_eq(&headers));
    }

    #[test]
    fn target_changes_share_headers_and_body() {
        let request = Request::new("GET", "/").unwrap().with_header("Accept", ["*/*"]).with_body("data");

        for updated in [
            request.with_method("HEAD").unwrap(),
            request.with_absolute_uri("http://example.com/x").unwrap(),
            request.with_url("/y").unwrap(),
        ] {
            assert!(updated.headers().ptr_eq(request.headers()));
            assert!(updated.body().ptr_eq(request.body()));
        }
    }

    #[test]
    fn header_case_insensitivity() {
        let request = Request::default().with_header("Content-Type", ["a"]);
        assert_eq!(request.header("content-type"), ["a"]);
    }

    #[test]
    fn requests_are_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Request>();
        assert_send_sync::<BodyHandle>();
    }

    #[test]
    fn shared_across_threads() {
        let request = with_uri("http://example.com/shared").with_header("X-A", ["1"]);
        std::thread::scope(|scope| {
            for i in 0..4 {
                let request = &request;
                scope.spawn(move || {
                    let updated = request.with_url(&format!("/t{i}")).unwrap();
                    assert_eq!(updated.absolute_uri().unwrap().as_str(), format!("http://example.com/t{i}"));
                    assert_eq!(request.url(), "/shared");
                });
            }
        });
    }

    #[tokio::test]
    async fn convert_to_http_request() {
        let request = Request::new("post", "http://user@example.com:8080/p?q=1#frag")
            .unwrap()
            .with_header("Content-Type", ["text/plain"])
            .with_added_header("X-Many", "a")
            .with_added_header("x-many", "b")
            .with_body("hello");

        let http_request = request.to_http().unwrap();
        assert_eq!(http_request.method().as_str(), "post");
        assert_eq!(http_request.uri().to_string(), "http://user@example.com:8080/p?q=1");
        assert_eq!(http_request.version(), http::Version::HTTP_11);
        assert_eq!(http_request.headers().get("content-type").unwrap(), "text/plain");

        let many: Vec<_> = http_request.headers().get_all("x-many").iter().collect();
        assert_eq!(many, ["a", "b"]);

        let body = http_request.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"hello");
    }

    #[test]
    fn convert_origin_form_request() {
        let request = Request::new("GET", "/index.html?a=1").unwrap().with_protocol_version("1.0").unwrap();
        let http_request = http::Request::<HandleBody>::try_from(&request).unwrap();

        assert_eq!(http_request.uri().path(), "/index.html");
        assert_eq!(http_request.uri().query(), Some("a=1"));
        assert_eq!(http_request.uri().host(), None);
        assert_eq!(http_request.version(), http::Version::HTTP_10);
    }

    #[test]
    fn convert_rejects_what_http_cannot_carry() {
        let unsupported = Request::default().with_protocol_version("1.2").unwrap();
        assert!(matches!(unsupported.to_http(), Err(IntoHttpError::UnsupportedVersion { .. })));

        let bad_name = Request::default().with_header("Bad Name", ["x"]);
        assert!(matches!(bad_name.to_http(), Err(IntoHttpError::InvalidHeaderName { .. })));

        let bad_value = Request::default().with_header("X-Injected", ["a\r\nHost: evil"]);
        assert!(matches!(bad_value.to_http(), Err(IntoHttpError::InvalidHeaderValue { .. })));

        let escaped_host = Request::new("GET", "http://a%41b.com/").unwrap();
        assert!(matches!(escaped_host.to_http(), Err(IntoHttpError::InvalidTarget { .. })));
    }
}
