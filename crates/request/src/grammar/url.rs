//! Origin-form request targets (RFC 7230 section 5.3.1).
//!
//! `origin-form = absolute-path [ "?" query ]`. An empty path is read as `/`.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::MAX_URI_LEN;
use crate::ensure;
use crate::error::InvalidUrl;
use crate::grammar::chars::{check_component, is_path_char, is_query_char, is_scheme};

/// What to do with a scheme, authority or fragment found in an origin-form input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UrlPolicy {
    /// Fail with [`InvalidUrl`].
    #[default]
    Reject,
    /// Drop scheme, authority and fragment, then validate what remains.
    Strip,
}

/// A validated origin-form request target: path plus optional query.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct OriginUrl {
    raw: String,
    /// Index where the path ends; a `?` follows when there is a query.
    path_end: usize,
}

impl OriginUrl {
    /// Validates `url` with [`UrlPolicy::Reject`].
    ///
    /// # Errors
    ///
    /// Returns [`InvalidUrl`] if `url` carries a scheme, an authority or a
    /// fragment, has a relative path, or holds characters (or percent-escapes)
    /// that path and query grammar forbid.
    pub fn parse(url: &str) -> Result<Self, InvalidUrl> {
        Self::parse_with(url, UrlPolicy::Reject)
    }

    /// Validates `url` under the given policy.
    ///
    /// # Errors
    ///
    /// Same as [`OriginUrl::parse`], except that under [`UrlPolicy::Strip`] a
    /// scheme, authority or fragment is removed instead of rejected.
    pub fn parse_with(url: &str, policy: UrlPolicy) -> Result<Self, InvalidUrl> {
        let target = match policy {
            UrlPolicy::Reject => url,
            UrlPolicy::Strip => strip_to_origin_form(url),
        };

        parse_origin_form(target)
            .map_err(|reason| InvalidUrl::new(url, reason))
            .inspect_err(|e| debug!(url = e.value(), reason = e.reason(), ?policy, "reject origin-form url"))
    }

    /// Assembles a url from components that already passed the grammar.
    pub(crate) fn from_validated(path: &str, query: Option<&str>) -> Self {
        let path = if path.is_empty() { "/" } else { path };
        let mut raw = String::with_capacity(path.len() + query.map_or(0, |q| q.len() + 1));
        raw.push_str(path);
        if let Some(query) = query {
            raw.push('?');
            raw.push_str(query);
        }
        Self { raw, path_end: path.len() }
    }

    /// Path and query as one string, e.g. `/a?b=1`.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The path; never empty, always starts with `/`.
    pub fn path(&self) -> &str {
        &self.raw[..self.path_end]
    }

    /// The query without its leading `?`. `Some("")` for a trailing bare `?`.
    pub fn query(&self) -> Option<&str> {
        self.raw.get(self.path_end + 1..)
    }
}

impl Default for OriginUrl {
    fn default() -> Self {
        Self { raw: "/".to_owned(), path_end: 1 }
    }
}

fn parse_origin_form(s: &str) -> Result<OriginUrl, String> {
    ensure!(s.len() <= MAX_URI_LEN, format!("url length {} exceeds the limit {MAX_URI_LEN}", s.len()));
    ensure!(!s.starts_with("//"), "origin-form must not contain an authority".to_owned());
    if let Some(scheme) = leading_scheme(s) {
        return Err(format!("origin-form must not contain a scheme ({scheme}:)"));
    }
    ensure!(!s.contains('#'), "origin-form must not contain a fragment".to_owned());

    let (path, query) = match s.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (s, None),
    };
    ensure!(path.is_empty() || path.starts_with('/'), "path must be absolute (start with '/')".to_owned());

    check_component(path, 0, "path", is_path_char)?;
    if let Some(query) = query {
        check_component(query, path.len() + 1, "query", is_query_char)?;
    }

    Ok(OriginUrl::from_validated(path, query))
}

/// The scheme of `s` when it starts like `scheme ":"`.
pub(crate) fn leading_scheme(s: &str) -> Option<&str> {
    let end = s.find([':', '/', '?', '#'])?;
    (s.as_bytes()[end] == b':' && is_scheme(&s[..end])).then_some(&s[..end])
}

fn strip_to_origin_form(s: &str) -> &str {
    let mut rest = s;
    if let Some(scheme) = leading_scheme(rest) {
        rest = &rest[scheme.len() + 1..];
    }
    if let Some(after) = rest.strip_prefix("//") {
        rest = after.find(['/', '?', '#']).map_or("", |i| &after[i..]);
    }
    rest.split_once('#').map_or(rest, |(target, _)| target)
}

impl FromStr for OriginUrl {
    type Err = InvalidUrl;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for OriginUrl {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for OriginUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl fmt::Debug for OriginUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.raw, f)
    }
}

impl PartialEq<str> for OriginUrl {
    fn eq(&self, other: &str) -> bool {
        self.raw == other
    }
}

impl PartialEq<&str> for OriginUrl {
    fn eq(&self, other: &&str) -> bool {
        self.raw == *other
    }
}
