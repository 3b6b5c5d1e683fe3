//! Absolute URI parsing (RFC 3986 section 4.3).
//!
//! Only the hierarchical form with an authority is accepted:
//!
//! ```text
//! scheme "://" [ userinfo "@" ] host [ ":" port ] path-abempty [ "?" query ] [ "#" fragment ]
//! ```
//!
//! The input string is kept verbatim. Parsing records the byte range of each
//! component, so every accessor is a slice of the original input and nothing is
//! normalized (no case folding, no default-port removal, no dot-segment
//! resolution).

use std::fmt;
use std::net::Ipv6Addr;
use std::str::FromStr;

use tracing::debug;

use crate::MAX_URI_LEN;
use crate::ensure;
use crate::error::InvalidUri;
use crate::grammar::OriginUrl;
use crate::grammar::chars::{
    check_component, is_path_char, is_query_char, is_reg_name_char, is_scheme, is_sub_delim, is_unreserved, is_userinfo_char,
};

/// Byte range `(start, end)` of a component inside the raw input.
type Span = (usize, usize);

/// An absolute URI with at least a scheme and a non-empty host.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct AbsoluteUri {
    raw: String,
    /// Index of the `:` that ends the scheme.
    scheme_end: usize,
    authority: Authority,
    path: Span,
    query: Option<Span>,
    fragment: Option<Span>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Authority {
    span: Span,
    userinfo: Option<Span>,
    host: Span,
    port: Option<Span>,
    port_number: Option<u16>,
}

impl AbsoluteUri {
    /// Validates `uri` as an absolute URI.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidUri`] when the scheme or host is missing, the authority
    /// is malformed, a port is not a number in `0..=65535`, a percent-escape is
    /// malformed, or any component holds a character its grammar forbids.
    pub fn parse(uri: &str) -> Result<Self, InvalidUri> {
        parse_absolute(uri)
            .map_err(|reason| InvalidUri::new(uri, reason))
            .inspect_err(|e| debug!(uri = e.value(), reason = e.reason(), "reject absolute uri"))
    }

    /// The URI exactly as it was parsed or rebuilt.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The scheme without the trailing `:`, case as written.
    pub fn scheme(&self) -> &str {
        &self.raw[..self.scheme_end]
    }

    /// `[ userinfo "@" ] host [ ":" port ]`, as written.
    pub fn authority(&self) -> &str {
        self.slice(self.authority.span)
    }

    /// The part of the authority before `@`, if any.
    pub fn userinfo(&self) -> Option<&str> {
        self.authority.userinfo.map(|span| self.slice(span))
    }

    /// The host, including the brackets of an IP literal.
    pub fn host(&self) -> &str {
        self.slice(self.authority.host)
    }

    /// Host and port without the userinfo, suitable for a `Host` header.
    pub fn host_and_port(&self) -> &str {
        let end = self.authority.port.filter(|(start, end)| end > start).map_or(self.authority.host.1, |(_, end)| end);
        &self.raw[self.authority.host.0..end]
    }

    /// The explicit port, if one was written.
    pub fn port(&self) -> Option<u16> {
        self.authority.port_number
    }

    /// The explicit port, or the well-known port of the scheme.
    pub fn port_or_default(&self) -> Option<u16> {
        self.port().or_else(|| default_port(self.scheme()))
    }

    /// The raw path; empty when the URI has none.
    pub fn path(&self) -> &str {
        self.slice(self.path)
    }

    /// The query without its leading `?`.
    pub fn query(&self) -> Option<&str> {
        self.query.map(|span| self.slice(span))
    }

    /// The fragment without its leading `#`.
    pub fn fragment(&self) -> Option<&str> {
        self.fragment.map(|span| self.slice(span))
    }

    /// Path and query as written, without the fragment.
    pub fn path_and_query(&self) -> &str {
        let end = self.query.map_or(self.path.1, |(_, end)| end);
        &self.raw[self.path.0..end]
    }

    /// The URI without its `#fragment`.
    pub fn without_fragment(&self) -> &str {
        match self.fragment {
            Some((start, _)) => &self.raw[..start - 1],
            None => &self.raw,
        }
    }

    /// The request target this URI addresses in origin-form.
    ///
    /// An empty path becomes `/`, everything else is copied as written.
    pub fn origin_form(&self) -> OriginUrl {
        OriginUrl::from_validated(self.path(), self.query())
    }

    /// Replaces path and query with those of `url`, keeping scheme, authority
    /// and fragment.
    ///
    /// Fails with a reason when the rebuilt URI would exceed [`MAX_URI_LEN`].
    pub(crate) fn with_origin_form(&self, url: &OriginUrl) -> Result<Self, String> {
        let fragment = self.fragment();
        let len = self.path.0 + url.as_str().len() + fragment.map_or(0, |f| f.len() + 1);
        ensure!(len <= MAX_URI_LEN, format!("resulting uri length {len} exceeds the limit {MAX_URI_LEN}"));

        let mut raw = String::with_capacity(len);
        raw.push_str(&self.raw[..self.path.0]);

        let path_start = raw.len();
        raw.push_str(url.path());
        let path = (path_start, raw.len());

        let query = url.query().map(|query| {
            raw.push('?');
            let start = raw.len();
            raw.push_str(query);
            (start, raw.len())
        });

        let fragment = fragment.map(|fragment| {
            raw.push('#');
            let start = raw.len();
            raw.push_str(fragment);
            (start, raw.len())
        });

        Ok(Self { raw, scheme_end: self.scheme_end, authority: self.authority, path, query, fragment })
    }

    fn slice(&self, (start, end): Span) -> &str {
        &self.raw[start..end]
    }
}

fn default_port(scheme: &str) -> Option<u16> {
    const DEFAULT_PORTS: [(&str, u16); 4] = [("http", 80), ("https", 443), ("ws", 80), ("wss", 443)];
    DEFAULT_PORTS.iter().find(|(name, _)| name.eq_ignore_ascii_case(scheme)).map(|(_, port)| *port)
}

fn parse_absolute(s: &str) -> Result<AbsoluteUri, String> {
    ensure!(!s.is_empty(), "uri must not be empty".to_owned());
    ensure!(s.len() <= MAX_URI_LEN, format!("uri length {} exceeds the limit {MAX_URI_LEN}", s.len()));

    let scheme_end = s.find(':').ok_or_else(|| "missing scheme".to_owned())?;
    ensure!(scheme_end > 0, "missing scheme".to_owned());
    ensure!(is_scheme(&s[..scheme_end]), format!("invalid scheme {:?}", &s[..scheme_end]));

    ensure!(s[scheme_end + 1..].starts_with("//"), "missing authority, expected \"//\" after the scheme".to_owned());
    let authority_start = scheme_end + 3;
    let authority_end = s[authority_start..].find(['/', '?', '#']).map_or(s.len(), |i| authority_start + i);
    let authority = parse_authority(s, authority_start, authority_end)?;

    let fragment_start = s[authority_end..].find('#').map(|i| authority_end + i);
    let target_end = fragment_start.unwrap_or(s.len());
    let query_start = s[authority_end..target_end].find('?').map(|i| authority_end + i);

    let path = (authority_end, query_start.unwrap_or(target_end));
    check_component(&s[path.0..path.1], path.0, "path", is_path_char)?;
    // its origin-form would read as an authority
    ensure!(!s[path.0..path.1].starts_with("//"), format!("path must not start with \"//\" at index {}", path.0));

    let query = query_start.map(|q| (q + 1, target_end));
    if let Some((start, end)) = query {
        check_component(&s[start..end], start, "query", is_query_char)?;
    }

    let fragment = fragment_start.map(|f| (f + 1, s.len()));
    if let Some((start, end)) = fragment {
        check_component(&s[start..end], start, "fragment", is_query_char)?;
    }

    Ok(AbsoluteUri { raw: s.to_owned(), scheme_end, authority, path, query, fragment })
}

fn parse_authority(s: &str, start: usize, end: usize) -> Result<Authority, String> {
    let (userinfo, host_start) = match s[start..end].find('@') {
        Some(i) => {
            let at = start + i;
            check_component(&s[start..at], start, "userinfo", is_userinfo_char)?;
            (Some((start, at)), at + 1)
        }
        None => (None, start),
    };

    let host_end = if s[host_start..end].starts_with('[') {
        let close = s[host_start..end].find(']').map(|i| host_start + i).ok_or_else(|| "unterminated ip literal".to_owned())?;
        check_ip_literal(&s[host_start + 1..close], host_start + 1)?;
        close + 1
    } else {
        let host_end = s[host_start..end].find(':').map_or(end, |i| host_start + i);
        check_component(&s[host_start..host_end], host_start, "host", is_reg_name_char)?;
        host_end
    };
    ensure!(host_end > host_start, "missing host".to_owned());

    let (port, port_number) = if host_end < end {
        ensure!(s.as_bytes()[host_end] == b':', format!("unexpected character after host at index {host_end}"));
        let digits = &s[host_end + 1..end];
        if let Some(i) = digits.bytes().position(|b| !b.is_ascii_digit()) {
            return Err(format!("invalid port character at index {}", host_end + 1 + i));
        }
        // "host:" with an empty port is allowed by RFC 3986 and means "no port"
        let number = if digits.is_empty() {
            None
        } else {
            Some(digits.parse::<u16>().map_err(|e| format!("port {digits} out of range: {e}"))?)
        };
        (Some((host_end + 1, end)), number)
    } else {
        (None, None)
    };

    Ok(Authority { span: (start, end), userinfo, host: (host_start, host_end), port, port_number })
}

/// Checks the inside of `[...]`: an IPv6 address or `IPvFuture`.
fn check_ip_literal(literal: &str, offset: usize) -> Result<(), String> {
    if let Some(future) = literal.strip_prefix(['v', 'V']) {
        let (version, address) = future.split_once('.').ok_or_else(|| format!("invalid ip literal at index {offset}"))?;
        let valid = !version.is_empty()
            && version.bytes().all(|b| b.is_ascii_hexdigit())
            && !address.is_empty()
            && address.bytes().all(|b| is_unreserved(b) || is_sub_delim(b) || b == b':');
        ensure!(valid, format!("invalid ip literal at index {offset}"));
        return Ok(());
    }

    literal.parse::<Ipv6Addr>().map(|_| ()).map_err(|e| format!("invalid ipv6 address at index {offset}: {e}"))
}

impl FromStr for AbsoluteUri {
    type Err = InvalidUri;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for AbsoluteUri {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for AbsoluteUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl fmt::Debug for AbsoluteUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.raw, f)
    }
}

impl PartialEq<str> for AbsoluteUri {
    fn eq(&self, other: &str) -> bool {
        self.raw == other
    }
}

impl PartialEq<&str> for AbsoluteUri {
    fn eq(&self, other: &&str) -> bool {
        self.raw == *other
    }
}
