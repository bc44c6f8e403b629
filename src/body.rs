//! [http] / [http_body] crate abstractions. Provides [Body], implementing
//! [HttpBody] for a single in-memory chunk.

use bytes::Bytes;
use http_body::{Body as HttpBody, Frame, SizeHint};
use std::{
    convert::Infallible,
    pin::Pin,
    task::{Context, Poll},
};

/// [HttpBody] implementation for body consisting of a single in-memory
/// chunk. Implementation is based on `http_body_util::Full`, with owned
/// content (files are read per request, there is nothing to borrow from).
///
/// Please note that once body is used, eg. polled with [Self::poll_frame], it
/// will become empty, eg. [Self::data] will return empty slice.
#[derive(Debug)]
pub struct Body {
    // None (empty chunk) is not allowed.
    data: Option<Bytes>,
}
impl Body {
    /// Creates [self] from data.
    pub fn new(data: Bytes) -> Self {
        let data = if !data.is_empty() { Some(data) } else { None };
        Self { data }
    }

    /// Creates empty [self].
    pub fn empty() -> Self {
        let data = None;
        Self { data }
    }

    /// Returns remaining data.
    ///
    /// This will return original content until polled with [Self::poll_frame],
    /// then it will return empty slice.
    pub fn data(&self) -> &[u8] {
        self.data.as_deref().unwrap_or(b"")
    }
}
impl HttpBody for Body {
    type Data = Bytes;
    type Error = Infallible;

    fn poll_frame(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let self_ = self.get_mut();
        let data = self_.data.take();

        match data {
            Some(data) => Poll::Ready(Some(Ok(Frame::data(data)))),
            None => Poll::Ready(None),
        }
    }

    fn is_end_stream(&self) -> bool {
        self.data.is_none()
    }

    fn size_hint(&self) -> SizeHint {
        match &self.data {
            Some(data) => SizeHint::with_exact(data.len() as u64),
            None => SizeHint::with_exact(0),
        }
    }
}
