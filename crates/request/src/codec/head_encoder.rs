use bytes::{BufMut, BytesMut};
use http::header::HOST;
use http::{HeaderName, HeaderValue, Version};
use tokio_util::codec::Encoder;
use tracing::{debug, trace};

use crate::error::IntoHttpError;
use crate::protocol::{HttpMessage, Request};

/// Initial buffer size reserved for a request head.
const INIT_HEAD_SIZE: usize = 1024;

/// Serializes the HTTP/1.x head of a [`Request`]: the request line, one line
/// per header value and the terminating blank line.
///
/// - the request target is the origin-form url
/// - header names keep their original spelling and order
/// - a `Host` header is derived from the absolute URI (without userinfo) when
///   the request has one and no `Host` header is set
///
/// Everything is validated before the first byte is written, so on error `dst`
/// is left as it was.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadEncoder;

impl Encoder<&Request> for HeadEncoder {
    type Error = IntoHttpError;

    fn encode(&mut self, request: &Request, dst: &mut BytesMut) -> Result<(), Self::Error> {
        encode_head(request, dst).inspect_err(|e| debug!(cause = %e, "failed to encode request head"))
    }
}

fn encode_head(request: &Request, dst: &mut BytesMut) -> Result<(), IntoHttpError> {
    let version: &[u8] = match request.protocol_version().to_http() {
        Some(Version::HTTP_10) => b"HTTP/1.0",
        Some(Version::HTTP_11) => b"HTTP/1.1",
        _ => return Err(IntoHttpError::unsupported_version(request.protocol_version())),
    };

    for (name, values) in request.headers().iter() {
        HeaderName::from_bytes(name.as_bytes()).map_err(|e| IntoHttpError::invalid_header_name(name, e))?;
        for value in values {
            HeaderValue::from_str(value).map_err(|e| IntoHttpError::invalid_header_value(name, e))?;
        }
    }

    let host = match request.absolute_uri() {
        Some(uri) if !request.has_header(HOST.as_str()) => Some(uri.host_and_port()),
        _ => None,
    };

    let before = dst.len();
    dst.reserve(INIT_HEAD_SIZE);

    dst.put_slice(request.method().as_str().as_bytes());
    dst.put_u8(b' ');
    dst.put_slice(request.url().as_str().as_bytes());
    dst.put_u8(b' ');
    dst.put_slice(version);
    dst.put_slice(b"\r\n");

    if let Some(host) = host {
        write_header(dst, "Host", host);
    }
    for (name, values) in request.headers().iter() {
        for value in values {
            write_header(dst, name, value);
        }
    }
    dst.put_slice(b"\r\n");

    trace!(size = dst.len() - before, "encoded request head");
    Ok(())
}

fn write_header(dst: &mut BytesMut, name: &str, value: &str) {
    dst.put_slice(name.as_bytes());
    dst.put_slice(b": ");
    dst.put_slice(value.as_bytes());
    dst.put_slice(b"\r\n");
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;

    fn encode(request: &Request) -> Result<String, IntoHttpError> {
        let mut buf = BytesMut::new();
        HeadEncoder.encode(request, &mut buf)?;
        Ok(String::from_utf8(buf.to_vec()).unwrap())
    }

    fn crlf(s: &str) -> String {
        s.replace('\n', "\r\n")
    }

    #[test]
    fn origin_form_request() {
        let request = Request::new("GET", "/index.html?q=1")
            .unwrap()
            .with_header("Accept", ["text/html"])
            .with_added_header("accept", "*/*")
            .with_header("User-Agent", ["micro"]);

        let expected = indoc! {"
            GET /index.html?q=1 HTTP/1.1
            Accept: text/html
            Accept: */*
            User-Agent: micro

        "};
        assert_eq!(encode(&request).unwrap(), crlf(expected));
    }

    #[test]
    fn host_derived_from_absolute_uri() {
        let request = Request::new("post", "https://user:pw@example.com:8443/submit#frag").unwrap().with_protocol_version("1.0").unwrap();

        let expected = indoc! {"
            post /submit HTTP/1.0
            Host: example.com:8443

        "};
        assert_eq!(encode(&request).unwrap(), crlf(expected));
    }

    #[test]
    fn explicit_host_wins() {
        let request = Request::new("GET", "http://example.com/").unwrap().with_header("host", ["proxy.local"]);

        let expected = indoc! {"
            GET / HTTP/1.1
            host: proxy.local

        "};
        assert_eq!(encode(&request).unwrap(), crlf(expected));
    }

    #[test]
    fn appends_to_existing_buffer() {
        let request = Request::default();
        let mut buf = BytesMut::from(&b"prefix"[..]);
        HeadEncoder.encode(&request, &mut buf).unwrap();
        assert_eq!(&buf[..], b"prefixGET / HTTP/1.1\r\n\r\n");
    }

    #[test]
    fn rejects_non_http1_versions() {
        for version in ["2", "3", "0.9", "1.2", "SPDY/3"] {
            let request = Request::default().with_protocol_version(version).unwrap();
            let error = encode(&request).unwrap_err();
            assert!(matches!(error, IntoHttpError::UnsupportedVersion { .. }), "{version}: {error}");
        }
    }

    #[test]
    fn invalid_header_leaves_buffer_untouched() {
        let request = Request::default().with_header("X-Ok", ["1"]).with_header("X-Bad", ["line\nbreak"]);
        let mut buf = BytesMut::from(&b"keep"[..]);

        let error = HeadEncoder.encode(&request, &mut buf).unwrap_err();
        assert!(matches!(error, IntoHttpError::InvalidHeaderValue { ref name, .. } if name == "X-Bad"));
        assert_eq!(&buf[..], b"keep");

        let request = Request::default().with_header("Bad:Name", ["1"]);
        assert!(matches!(encode(&request), Err(IntoHttpError::InvalidHeaderName { .. })));
    }

    #[test]
    fn request_encode_head_delegates() {
        let request = Request::new("DELETE", "/items/7").unwrap();
        let mut buf = BytesMut::new();
        request.encode_head(&mut buf).unwrap();
        assert_eq!(&buf[..], b"DELETE /items/7 HTTP/1.1\r\n\r\n");
    }
}
