//! Immutable, grammar-checked HTTP client requests
//!
//! This crate models an outgoing HTTP request as a persistent value. Every
//! modifier returns a new request and leaves the original untouched, and every
//! part of the request line is validated when it is set, not when it is sent.
//!
//! # Features
//!
//! - Methods checked as RFC 7230 tokens, case preserved
//! - Absolute URIs checked against RFC 3986, fragments kept
//! - Origin-form urls (path and query) kept in step with the absolute URI
//! - Ordered, case-insensitive, multi-valued headers with original spelling
//! - Bodies held by shared handle, never copied
//! - Conversion to `http::Request` and HTTP/1.x head encoding for transports
//!
//! # Example
//!
//! ```
//! use micro_request::{HttpMessage, Request};
//!
//! let template = Request::new("GET", "https://api.example.com/v1/items?page=1")
//!     .unwrap()
//!     .with_header("Accept", ["application/json"]);
//!
//! let next = template.with_url("/v1/items?page=2").unwrap();
//! assert_eq!(next.absolute_uri().unwrap(), "https://api.example.com/v1/items?page=2");
//!
//! // the template is unchanged and shares its headers with `next`
//! assert_eq!(template.url(), "/v1/items?page=1");
//! assert!(next.headers().ptr_eq(template.headers()));
//!
//! // a url is origin-form only
//! assert!(template.with_url("https://other.org/").is_err());
//! ```
//!
//! # Architecture
//!
//! - [`grammar`]: validated [`Method`], [`AbsoluteUri`] and [`OriginUrl`]
//! - [`protocol`]: [`Request`], its [`Message`] parts and the [`HttpMessage`] trait
//! - [`codec`]: [`HeadEncoder`](codec::HeadEncoder) for the HTTP/1.x wire format
//! - [`error`]: one error type per grammar, plus [`RequestError`] and [`IntoHttpError`]
//!
//! # Logging
//!
//! Rejected input is logged at `debug` through `tracing`; URI and url
//! derivations and body reads at `trace`. Nothing is logged on the happy path
//! above `trace`.
//!
//! # Limitations
//!
//! - Maximum URI and url length: [`MAX_URI_LEN`] bytes
//! - Header names and values are checked only when converted or encoded
//! - Bodies are never read or buffered by the request itself

pub mod codec;
pub mod error;
pub mod grammar;
pub mod protocol;

mod utils;
pub(crate) use utils::ensure;

pub use error::{IntoHttpError, RequestError};
pub use grammar::{AbsoluteUri, Method, OriginUrl, UrlPolicy};
pub use protocol::body::BodyHandle;
pub use protocol::{HeaderBag, HttpMessage, Message, ProtocolVersion, Request, RequestBuilder};

/// Longest absolute URI or origin-form url accepted, in bytes.
pub const MAX_URI_LEN: usize = 8 * 1024;
