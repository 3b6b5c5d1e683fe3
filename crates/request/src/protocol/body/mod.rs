//! Request body handles.
//!
//! A message never owns its body bytes. It holds a [`BodyHandle`], a shared
//! reference to some [`BodySource`] living outside the message. Replacing any
//! other part of a request clones the handle, not the source, so every request
//! derived from another one reads from the same source.
//!
//! # Single pass by default
//!
//! Sources may be stateful: reading advances a cursor that all handles share.
//! Nothing in this crate reads a body, and nothing may assume a body can be
//! read twice unless [`BodySource::is_rewindable`] says so.
//!
//! # Transport
//!
//! [`BodyHandle::into_http_body`] adapts a handle to `http_body::Body` so a
//! transport built on the `http` ecosystem can stream it. The adapter reads
//! inside `poll_frame`, so it must only wrap sources that never block; a
//! source reporting [`BodySource::is_blocking`] has to be drained on a
//! blocking-capable thread instead (see [`ReaderBody`]).

mod handle_body;
mod source;

pub use handle_body::HandleBody;
pub use source::BytesBody;
pub use source::EmptyBody;
pub use source::ReaderBody;

use std::fmt;
use std::io;
use std::sync::Arc;

use bytes::Bytes;

/// A byte-producing source behind a [`BodyHandle`].
///
/// Methods take `&self` because the source is shared between handles; a
/// stateful source keeps its cursor behind interior mutability.
pub trait BodySource: fmt::Debug + Send + Sync {
    /// Reads bytes into `buf`, returning how many were written. `Ok(0)` means
    /// the source is exhausted.
    ///
    /// # Errors
    ///
    /// Whatever I/O error the underlying source reports.
    fn read(&self, buf: &mut [u8]) -> io::Result<usize>;

    /// Number of bytes left to read, when known.
    fn size_hint(&self) -> Option<u64> {
        None
    }

    /// Whether [`BodySource::read`] may block the calling thread, e.g. on file
    /// or socket I/O. In-memory sources return `false`.
    fn is_blocking(&self) -> bool {
        false
    }

    /// Whether [`BodySource::rewind`] can restart the source.
    fn is_rewindable(&self) -> bool {
        false
    }

    /// Moves the cursor back to the start.
    ///
    /// # Errors
    ///
    /// The default implementation fails with [`io::ErrorKind::Unsupported`].
    fn rewind(&self) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::Unsupported, "body source can only be read once"))
    }
}

/// A shared reference to the body of a message.
#[derive(Clone)]
pub struct BodyHandle {
    source: Arc<dyn BodySource>,
}

impl BodyHandle {
    pub fn new<S: BodySource + 'static>(source: S) -> Self {
        Self { source: Arc::new(source) }
    }

    /// Wraps a source that is already shared elsewhere.
    pub fn from_arc(source: Arc<dyn BodySource>) -> Self {
        Self { source }
    }

    /// A handle to an [`EmptyBody`].
    pub fn empty() -> Self {
        Self::new(EmptyBody)
    }

    /// Reads from the shared source; see [`BodySource::read`].
    ///
    /// # Errors
    ///
    /// Whatever I/O error the source reports.
    pub fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        self.source.read(buf)
    }

    /// Bytes left to read, when the source knows.
    pub fn size_hint(&self) -> Option<u64> {
        self.source.size_hint()
    }

    /// See [`BodySource::is_blocking`].
    pub fn is_blocking(&self) -> bool {
        self.source.is_blocking()
    }

    /// See [`BodySource::is_rewindable`].
    pub fn is_rewindable(&self) -> bool {
        self.source.is_rewindable()
    }

    /// # Errors
    ///
    /// Fails if the source is single pass.
    pub fn rewind(&self) -> io::Result<()> {
        self.source.rewind()
    }

    /// Whether both handles point at the same source.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.source, &other.source)
    }

    /// Adapts the handle to `http_body::Body`.
    ///
    /// Only for sources where [`BodyHandle::is_blocking`] is `false`; polling
    /// the result reads the source on the polling thread.
    pub fn into_http_body(self) -> HandleBody {
        HandleBody::new(self)
    }
}

impl Default for BodyHandle {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for BodyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BodyHandle").field("source", &self.source).finish()
    }
}

impl From<Arc<dyn BodySource>> for BodyHandle {
    fn from(source: Arc<dyn BodySource>) -> Self {
        Self::from_arc(source)
    }
}

impl From<Bytes> for BodyHandle {
    fn from(bytes: Bytes) -> Self {
        Self::new(BytesBody::new(bytes))
    }
}

impl From<&'static str> for BodyHandle {
    fn from(s: &'static str) -> Self {
        Bytes::from_static(s.as_bytes()).into()
    }
}

impl From<String> for BodyHandle {
    fn from(s: String) -> Self {
        Bytes::from(s).into()
    }
}

impl From<Vec<u8>> for BodyHandle {
    fn from(v: Vec<u8>) -> Self {
        Bytes::from(v).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_all(handle: &BodyHandle) -> Vec<u8> {
        let mut out = Vec::new();
        let mut buf = [0u8; 3];
        loop {
            let n = handle.read(&mut buf).unwrap();
            if n == 0 {
                return out;
            }
            out.extend_from_slice(&buf[..n]);
        }
    }

    #[test]
    fn clones_share_the_source() {
        let handle = BodyHandle::from("hello world");
        let shared = handle.clone();
        assert!(handle.ptr_eq(&shared));

        let mut buf = [0u8; 6];
        assert_eq!(handle.read(&mut buf).unwrap(), 6);
        assert_eq!(&buf, b"hello ");

        // the cursor moved for every handle
        assert_eq!(read_all(&shared), b"world");
        assert_eq!(read_all(&handle), b"");
    }

    #[test]
    fn separate_handles_do_not_share() {
        let a = BodyHandle::from("x");
        let b = BodyHandle::from("x");
        assert!(!a.ptr_eq(&b));
    }

    #[test]
    fn empty_handle() {
        let handle = BodyHandle::default();
        assert_eq!(handle.size_hint(), Some(0));
        assert!(handle.is_rewindable());
        assert_eq!(read_all(&handle), b"");
    }

    #[test]
    fn rewind_bytes() {
        let handle = BodyHandle::from(String::from("abc"));
        assert_eq!(handle.size_hint(), Some(3));
        assert_eq!(read_all(&handle), b"abc");
        assert_eq!(handle.size_hint(), Some(0));

        handle.rewind().unwrap();
        assert_eq!(read_all(&handle), b"abc");
    }

    #[test]
    fn only_reader_blocks() {
        assert!(!BodyHandle::empty().is_blocking());
        assert!(!BodyHandle::from("in memory").is_blocking());
        assert!(BodyHandle::new(ReaderBody::new(io::empty())).is_blocking());
    }

    #[tokio::test]
    async fn drain_blocking_source_off_the_runtime() {
        let handle = BodyHandle::new(ReaderBody::new(io::Cursor::new(b"from a file".to_vec())));
        let shared = handle.clone();

        let bytes = tokio::task::spawn_blocking(move || read_all(&shared)).await.unwrap();
        assert_eq!(bytes, b"from a file");
        assert_eq!(read_all(&handle), b"");
    }

    #[test]
    fn reader_is_single_pass() {
        let handle = BodyHandle::new(ReaderBody::new(io::Cursor::new(b"stream".to_vec())));
        assert!(!handle.is_rewindable());
        assert_eq!(handle.size_hint(), None);
        assert_eq!(read_all(&handle), b"stream");
        assert_eq!(handle.rewind().unwrap_err().kind(), io::ErrorKind::Unsupported);
    }
}
