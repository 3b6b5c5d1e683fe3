//! Grammar checks for the parts of a request line.
//!
//! Each checked value has its own type, and the only way to get one is through
//! its `parse` function:
//!
//! - [`Method`]: an RFC 7230 token, case preserved
//! - [`AbsoluteUri`]: an RFC 3986 absolute URI with scheme and host
//! - [`OriginUrl`]: an RFC 7230 origin-form target (path and query)
//!
//! All checks are pure. A failed check returns the matching error from
//! [`crate::error`] carrying the input and the broken rule, and logs it at
//! `debug` level.

mod chars;
mod method;
mod uri;
mod url;

pub use method::Method;
pub use uri::AbsoluteUri;
pub use url::OriginUrl;
pub use url::UrlPolicy;

pub(crate) use chars::describe;

/// Whether `target` starts with a scheme, i.e. should be read as an absolute
/// URI rather than an origin-form url.
pub fn has_scheme(target: &str) -> bool {
    url::leading_scheme(target).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_scheme() {
        assert!(has_scheme("http://example.com/"));
        assert!(has_scheme("mailto:x@y"));
        assert!(!has_scheme("/a:b"));
        assert!(!has_scheme("?x=http://y"));
        assert!(!has_scheme("//host/a"));
        assert!(!has_scheme(""));
    }
}
