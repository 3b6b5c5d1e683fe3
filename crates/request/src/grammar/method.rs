use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::ensure;
use crate::error::InvalidMethod;
use crate::grammar::chars::{describe, is_tchar};

/// A request method that passed the RFC 7230 token grammar.
///
/// The spelling is kept exactly as supplied: `"get"` and `"GET"` are two
/// different methods, because method names are case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Method(http::Method);

impl Method {
    /// Validates `method` as a token.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidMethod`] if `method` is empty or contains any byte that
    /// is not a `tchar` (whitespace, control characters, separators, non-ASCII).
    pub fn parse(method: &str) -> Result<Self, InvalidMethod> {
        parse_token(method)
            .and_then(|()| http::Method::from_bytes(method.as_bytes()).map_err(|e| e.to_string()))
            .map(Self)
            .map_err(|reason| InvalidMethod::new(method, reason))
            .inspect_err(|e| debug!(method = e.value(), reason = e.reason(), "reject http method"))
    }

    /// The method exactly as given.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// The same method as an `http::Method`, for handing the request to a transport.
    pub fn as_http(&self) -> &http::Method {
        &self.0
    }
}

fn parse_token(method: &str) -> Result<(), String> {
    ensure!(!method.is_empty(), "method must not be empty".to_owned());
    match method.bytes().enumerate().find(|(_, b)| !is_tchar(*b)) {
        Some((index, b)) => Err(format!("invalid token character {} at index {index}", describe(b))),
        None => Ok(()),
    }
}

impl From<http::Method> for Method {
    fn from(method: http::Method) -> Self {
        Self(method)
    }
}

impl FromStr for Method {
    type Err = InvalidMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Method {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PartialEq<str> for Method {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for Method {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_methods() {
        for name in ["GET", "HEAD", "POST", "PUT", "DELETE", "CONNECT", "OPTIONS", "TRACE", "PATCH"] {
            let method = Method::parse(name).unwrap();
            assert_eq!(method, name);
        }
        assert_eq!(Method::parse("GET").unwrap().as_http(), &http::Method::GET);
    }

    #[test]
    fn case_is_preserved() {
        let method = Method::parse("get").unwrap();
        assert_eq!(method.as_str(), "get");
        assert_ne!(method.as_http(), &http::Method::GET);

        assert_eq!(Method::parse("PuRgE").unwrap().to_string(), "PuRgE");
    }

    #[test]
    fn extension_token() {
        assert_eq!(Method::parse("M-SEARCH").unwrap(), "M-SEARCH");
        assert_eq!(Method::parse("!#$%&'*+-.^_`|~").unwrap(), "!#$%&'*+-.^_`|~");
    }

    #[test]
    fn rejects_empty() {
        let error = Method::parse("").unwrap_err();
        assert_eq!(error.value(), "");
        assert_eq!(error.reason(), "method must not be empty");
    }

    #[test]
    fn rejects_non_token() {
        let error = Method::parse("GE T").unwrap_err();
        assert_eq!(error.value(), "GE T");
        assert_eq!(error.reason(), "invalid token character ' ' at index 2");

        assert_eq!(Method::parse("GET\r\n").unwrap_err().reason(), "invalid token character 0x0d at index 3");
        assert_eq!(Method::parse("GET/1").unwrap_err().reason(), "invalid token character '/' at index 3");
        assert!(Method::parse("G\u{c9}T").is_err());
    }

    #[test]
    fn same_input_same_error() {
        assert_eq!(Method::parse("a b"), Method::parse("a b"));
    }

    #[test]
    fn default_is_get() {
        assert_eq!(Method::default(), "GET");
    }
}
