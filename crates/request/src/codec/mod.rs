//! Wire encoding of a request head.
//!
//! [`HeadEncoder`] implements the `tokio_util` [`Encoder`] trait for
//! `&Request`, so it plugs into a `FramedWrite` next to whatever body encoder a
//! transport uses. The body itself is never read here.
//!
//! # Example
//!
//! ```
//! use bytes::BytesMut;
//! use micro_request::Request;
//! use micro_request::codec::HeadEncoder;
//! use tokio_util::codec::Encoder;
//!
//! let request = Request::new("GET", "http://example.com/index.html").unwrap();
//! let mut buf = BytesMut::new();
//! HeadEncoder.encode(&request, &mut buf).unwrap();
//!
//! assert_eq!(&buf[..], b"GET /index.html HTTP/1.1\r\nHost: example.com\r\n\r\n");
//! ```
//!
//! [`Encoder`]: tokio_util::codec::Encoder

mod head_encoder;

pub use head_encoder::HeadEncoder;
