use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use http::Version;
use tracing::debug;

use crate::ensure;
use crate::error::InvalidVersion;
use crate::grammar::describe;

/// The protocol version of a message, e.g. `"1.1"`.
///
/// Only checked for being non-empty and free of whitespace and control
/// characters; the value is otherwise opaque. [`ProtocolVersion::to_http`]
/// tells whether a transport built on the `http` crate understands it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProtocolVersion(Cow<'static, str>);

impl ProtocolVersion {
    pub const HTTP_10: ProtocolVersion = ProtocolVersion(Cow::Borrowed("1.0"));
    pub const HTTP_11: ProtocolVersion = ProtocolVersion(Cow::Borrowed("1.1"));
    pub const HTTP_2: ProtocolVersion = ProtocolVersion(Cow::Borrowed("2"));

    /// # Errors
    ///
    /// Returns [`InvalidVersion`] if `version` is empty or contains a byte that
    /// is not visible ASCII.
    pub fn parse(version: &str) -> Result<Self, InvalidVersion> {
        check_version(version)
            .map(|()| Self(Cow::Owned(version.to_owned())))
            .map_err(|reason| InvalidVersion::new(version, reason))
            .inspect_err(|e| debug!(version = e.value(), reason = e.reason(), "reject protocol version"))
    }

    /// The version as written, without an `HTTP/` prefix.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Maps to the `http` crate's version, `None` for anything it has no name for.
    pub fn to_http(&self) -> Option<Version> {
        match self.as_str() {
            "0.9" => Some(Version::HTTP_09),
            "1.0" => Some(Version::HTTP_10),
            "1.1" => Some(Version::HTTP_11),
            "2" | "2.0" => Some(Version::HTTP_2),
            "3" | "3.0" => Some(Version::HTTP_3),
            _ => None,
        }
    }
}

fn check_version(version: &str) -> Result<(), String> {
    ensure!(!version.is_empty(), "version must not be empty".to_owned());
    match version.bytes().enumerate().find(|(_, b)| !b.is_ascii_graphic()) {
        Some((index, b)) => Err(format!("invalid character {} at index {index}", describe(b))),
        None => Ok(()),
    }
}

impl Default for ProtocolVersion {
    fn default() -> Self {
        Self::HTTP_11
    }
}

/// `http::Version` prints as `HTTP/x.y`; the prefix is dropped.
impl From<Version> for ProtocolVersion {
    fn from(version: Version) -> Self {
        let printed = format!("{version:?}");
        Self(Cow::Owned(printed.trim_start_matches("HTTP/").to_owned()))
    }
}

impl FromStr for ProtocolVersion {
    type Err = InvalidVersion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PartialEq<str> for ProtocolVersion {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for ProtocolVersion {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}
