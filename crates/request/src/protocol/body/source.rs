use std::fmt;
use std::io;
use std::io::Read;
use std::sync::{Mutex, MutexGuard};

use bytes::Bytes;

use crate::protocol::body::BodySource;

/// A body with no bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyBody;

impl BodySource for EmptyBody {
    fn read(&self, _buf: &mut [u8]) -> io::Result<usize> {
        Ok(0)
    }

    fn size_hint(&self) -> Option<u64> {
        Some(0)
    }

    fn is_rewindable(&self) -> bool {
        true
    }

    fn rewind(&self) -> io::Result<()> {
        Ok(())
    }
}

/// An in-memory body. Rewindable.
#[derive(Debug)]
pub struct BytesBody {
    data: Bytes,
    position: Mutex<usize>,
}

impl BytesBody {
    pub fn new(data: Bytes) -> Self {
        Self { data, position: Mutex::new(0) }
    }

    fn position(&self) -> io::Result<MutexGuard<'_, usize>> {
        self.position.lock().map_err(|e| io::Error::other(e.to_string()))
    }
}

impl BodySource for BytesBody {
    fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        let mut position = self.position()?;
        let remaining = &self.data[*position..];
        let n = remaining.len().min(buf.len());
        buf[..n].copy_from_slice(&remaining[..n]);
        *position += n;
        Ok(n)
    }

    fn size_hint(&self) -> Option<u64> {
        let position = self.position().ok()?;
        u64::try_from(self.data.len() - *position).ok()
    }

    fn is_rewindable(&self) -> bool {
        true
    }

    fn rewind(&self) -> io::Result<()> {
        *self.position()? = 0;
        Ok(())
    }
}

/// A body streamed from any [`Read`] implementation. Single pass.
///
/// Reads may block, so [`BodySource::is_blocking`] is `true`. Do not hand a
/// `ReaderBody` to [`BodyHandle::into_http_body`](crate::protocol::body::BodyHandle::into_http_body)
/// on an async runtime; drain it on a blocking thread instead:
///
/// ```
/// use std::io::Cursor;
///
/// use micro_request::protocol::body::{BodyHandle, ReaderBody};
///
/// # #[tokio::main]
/// # async fn main() -> std::io::Result<()> {
/// let handle = BodyHandle::new(ReaderBody::new(Cursor::new(b"file contents".to_vec())));
///
/// let body = tokio::task::spawn_blocking(move || {
///     let mut body = Vec::new();
///     let mut buf = [0u8; 4096];
///     loop {
///         match handle.read(&mut buf)? {
///             0 => return Ok::<_, std::io::Error>(body),
///             n => body.extend_from_slice(&buf[..n]),
///         }
///     }
/// })
/// .await??;
///
/// assert_eq!(body, b"file contents");
/// # Ok(())
/// # }
/// ```
pub struct ReaderBody<R> {
    reader: Mutex<R>,
}

impl<R: Read + Send> ReaderBody<R> {
    pub fn new(reader: R) -> Self {
        Self { reader: Mutex::new(reader) }
    }
}

impl<R> fmt::Debug for ReaderBody<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReaderBody").finish_non_exhaustive()
    }
}

impl<R: Read + Send> BodySource for ReaderBody<R> {
    fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.lock().map_err(|e| io::Error::other(e.to_string()))?.read(buf)
    }

    fn is_blocking(&self) -> bool {
        true
    }
}
