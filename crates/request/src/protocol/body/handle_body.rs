use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::{Bytes, BytesMut};
use http_body::{Body, Frame, SizeHint};
use tracing::trace;

use crate::protocol::body::BodyHandle;

/// Largest frame produced per poll.
const CHUNK_SIZE: usize = 8 * 1024;

/// Adapts a [`BodyHandle`] to `http_body::Body`.
///
/// Every poll reads up to [`CHUNK_SIZE`] bytes on the polling thread and yields
/// them as one data frame. The stream ends at the first empty read or after the
/// first error. Wrap only sources whose [`is_blocking`](BodyHandle::is_blocking)
/// is `false`; a blocking source would stall the executor.
#[derive(Debug)]
pub struct HandleBody {
    handle: BodyHandle,
    eof: bool,
}

impl HandleBody {
    pub(crate) fn new(handle: BodyHandle) -> Self {
        Self { handle, eof: false }
    }

    /// The handle being streamed.
    pub fn handle(&self) -> &BodyHandle {
        &self.handle
    }
}

impl Body for HandleBody {
    type Data = Bytes;
    type Error = io::Error;

    fn poll_frame(mut self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        if self.eof {
            return Poll::Ready(None);
        }

        let mut buf = BytesMut::zeroed(CHUNK_SIZE);
        loop {
            return match self.handle.read(&mut buf) {
                Ok(0) => {
                    self.eof = true;
                    Poll::Ready(None)
                }
                Ok(n) => {
                    trace!(size = n, "read body chunk");
                    buf.truncate(n);
                    Poll::Ready(Some(Ok(Frame::data(buf.freeze()))))
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.eof = true;
                    Poll::Ready(Some(Err(e)))
                }
            };
        }
    }

    fn is_end_stream(&self) -> bool {
        self.eof
    }

    fn size_hint(&self) -> SizeHint {
        if self.eof {
            return SizeHint::with_exact(0);
        }
        self.handle.size_hint().map_or_else(SizeHint::default, SizeHint::with_exact)
    }
}
