//! The request value and the message parts it is made of.
//!
//! # Architecture
//!
//! - **Message parts**
//!   - [`ProtocolVersion`]: the version written on the request line
//!   - [`HeaderBag`]: ordered, case-insensitive, multi-valued headers
//!   - [`body`]: [`BodyHandle`](body::BodyHandle), a shared reference to a byte source
//!   - [`Message`]: the three parts above, shared cheaply between values
//!
//! - **Request**
//!   - [`HttpMessage`]: version, header and body operations for any message type
//!   - [`Request`]: method, absolute URI, url and message
//!   - [`RequestBuilder`]: multi-step construction reporting the first error
//!
//! All values are immutable. Each `with_*` operation returns a new value and
//! shares every part it did not touch with the receiver, so deriving many
//! requests from one template copies little more than the changed field.

pub mod body;

mod builder;
mod header;
mod message;
mod request;
mod version;

pub use builder::RequestBuilder;
pub use header::HeaderBag;
pub use message::HttpMessage;
pub use message::Message;
pub use request::Request;
pub use version::ProtocolVersion;
