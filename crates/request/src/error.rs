//! Error types for request construction and transport hand-off.
//!
//! Grammar failures are split per field so each `with_*` operation can name the
//! exact kind it may fail with. Every grammar error keeps the rejected input and
//! a human-readable reason. [`RequestError`] folds them together for callers
//! that build a request in several steps.

use std::io;

use http::header::{InvalidHeaderName, InvalidHeaderValue};
use thiserror::Error;

macro_rules! grammar_error {
    ($(#[$meta:meta])* $name:ident, $what:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Error)]
        #[error("invalid {what} {value:?}: {reason}", what = $what)]
        pub struct $name {
            value: String,
            reason: String,
        }

        impl $name {
            pub(crate) fn new<V: Into<String>, R: ToString>(value: V, reason: R) -> Self {
                Self { value: value.into(), reason: reason.to_string() }
            }

            /// The raw input that was rejected.
            pub fn value(&self) -> &str {
                &self.value
            }

            /// Which grammar rule the input broke.
            pub fn reason(&self) -> &str {
                &self.reason
            }
        }
    };
}

grammar_error!(
    /// The method is not an RFC 7230 token.
    InvalidMethod,
    "http method"
);

grammar_error!(
    /// The input is not an absolute URI with a scheme and a host.
    InvalidUri,
    "absolute uri"
);

grammar_error!(
    /// The input is not an origin-form request target.
    InvalidUrl,
    "origin-form url"
);

grammar_error!(
    /// The protocol version cannot be written on a request line.
    InvalidVersion,
    "protocol version"
);

/// Any validation failure raised while assembling a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("method error: {source}")]
    Method {
        #[from]
        source: InvalidMethod,
    },

    #[error("uri error: {source}")]
    Uri {
        #[from]
        source: InvalidUri,
    },

    #[error("url error: {source}")]
    Url {
        #[from]
        source: InvalidUrl,
    },

    #[error("version error: {source}")]
    Version {
        #[from]
        source: InvalidVersion,
    },
}

/// Failures while handing a finished request to a transport, either as an
/// `http::Request` or as an encoded HTTP/1.x head.
#[derive(Debug, Error)]
pub enum IntoHttpError {
    #[error("unsupported http version {version:?}")]
    UnsupportedVersion { version: String },

    #[error("invalid header name {name:?}: {source}")]
    InvalidHeaderName {
        name: String,
        #[source]
        source: InvalidHeaderName,
    },

    #[error("invalid value for header {name:?}: {source}")]
    InvalidHeaderValue {
        name: String,
        #[source]
        source: InvalidHeaderValue,
    },

    #[error("invalid request target: {source}")]
    InvalidTarget {
        #[from]
        source: http::uri::InvalidUri,
    },

    /// Required by the `tokio_util::codec::Encoder` error bound.
    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl IntoHttpError {
    pub fn unsupported_version<S: ToString>(version: S) -> Self {
        Self::UnsupportedVersion { version: version.to_string() }
    }

    pub fn invalid_header_name<S: Into<String>>(name: S, source: InvalidHeaderName) -> Self {
        Self::InvalidHeaderName { name: name.into(), source }
    }

    pub fn invalid_header_value<S: Into<String>>(name: S, source: InvalidHeaderValue) -> Self {
        Self::InvalidHeaderValue { name: name.into(), source }
    }
}
