//! The parts every HTTP message has: protocol version, headers and body.
//!
//! [`Message`] is a plain persistent value. [`HttpMessage`] lifts its
//! operations onto any type that embeds one, so a request (and later a
//! response) gets the whole header and body API by implementing two methods.

use mime::Mime;

use crate::error::InvalidVersion;
use crate::protocol::body::BodyHandle;
use crate::protocol::{HeaderBag, ProtocolVersion};

/// Protocol version, header bag and body handle.
///
/// Cloning is cheap: the header bag and the body handle are reference counted
/// and shared between clones.
#[derive(Debug, Clone, Default)]
pub struct Message {
    version: ProtocolVersion,
    headers: HeaderBag,
    body: BodyHandle,
}

impl Message {
    /// Bundles already validated parts.
    pub fn new(version: ProtocolVersion, headers: HeaderBag, body: BodyHandle) -> Self {
        Self { version, headers, body }
    }

    /// The protocol version, `1.1` by default.
    pub fn version(&self) -> &ProtocolVersion {
        &self.version
    }

    /// The header bag.
    pub fn headers(&self) -> &HeaderBag {
        &self.headers
    }

    /// The body handle, empty by default.
    pub fn body(&self) -> &BodyHandle {
        &self.body
    }

    /// A copy with `version`, sharing headers and body.
    pub fn with_version(&self, version: ProtocolVersion) -> Self {
        Self { version, headers: self.headers.clone(), body: self.body.clone() }
    }

    /// A copy with `headers`, sharing the body.
    pub fn with_headers(&self, headers: HeaderBag) -> Self {
        Self { version: self.version.clone(), headers, body: self.body.clone() }
    }

    /// A copy with `body`, sharing the headers.
    pub fn with_body(&self, body: BodyHandle) -> Self {
        Self { version: self.version.clone(), headers: self.headers.clone(), body }
    }
}

/// Header, body and version operations shared by every message type.
///
/// Every `with_*` method returns a new value and leaves `self` untouched.
pub trait HttpMessage: Sized {
    /// The embedded message parts.
    fn message(&self) -> &Message;

    /// A copy of `self` with its message part replaced.
    fn with_message(&self, message: Message) -> Self;

    /// The protocol version, e.g. `1.1`.
    fn protocol_version(&self) -> &ProtocolVersion {
        self.message().version()
    }

    /// Replaces the protocol version.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidVersion`] if `version` is empty or not visible ASCII.
    fn with_protocol_version(&self, version: &str) -> Result<Self, InvalidVersion> {
        let version = ProtocolVersion::parse(version)?;
        Ok(self.with_message(self.message().with_version(version)))
    }

    /// All headers, in insertion order.
    fn headers(&self) -> &HeaderBag {
        self.message().headers()
    }

    /// All values of `name`, empty if absent. Case-insensitive.
    fn header(&self, name: &str) -> &[String] {
        self.headers().get(name)
    }

    /// Whether `name` has at least one value. Case-insensitive.
    fn has_header(&self, name: &str) -> bool {
        self.headers().contains(name)
    }

    /// All values of `name` joined with `", "`.
    fn header_line(&self, name: &str) -> Option<String> {
        self.headers().get_line(name)
    }

    /// Replaces every value of `name`.
    fn with_header<I, V>(&self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let headers = self.headers().with(name, values);
        self.with_message(self.message().with_headers(headers))
    }

    /// Appends one value to `name`, keeping the existing ones.
    fn with_added_header<V: Into<String>>(&self, name: &str, value: V) -> Self {
        let headers = self.headers().with_added(name, value);
        self.with_message(self.message().with_headers(headers))
    }

    /// Removes every value of `name`.
    fn without_header(&self, name: &str) -> Self {
        let headers = self.headers().without(name);
        self.with_message(self.message().with_headers(headers))
    }

    /// The shared body handle.
    fn body(&self) -> &BodyHandle {
        self.message().body()
    }

    /// Replaces the body handle; the previous source is not read or closed.
    fn with_body<B: Into<BodyHandle>>(&self, body: B) -> Self {
        self.with_message(self.message().with_body(body.into()))
    }

    /// The first `Content-Type` value parsed as a media type.
    fn content_type(&self) -> Option<Mime> {
        self.header(http::header::CONTENT_TYPE.as_str()).first()?.parse().ok()
    }
}
