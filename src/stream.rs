use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use thiserror::Error;
use tokio::sync::oneshot;
use tracing::debug;

use crate::report::ImageBlob;

/// Errors surfaced through a [`ByteStream`] instead of at construction
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StreamError {
    #[error("Read {actual} bytes of {file_name} but {declared} were declared")]
    SizeMismatch {
        file_name: String,
        declared: u64,
        actual: u64,
    },

    #[error("Reader for {0} stopped before delivering its content")]
    Interrupted(String),
}

/// Single-pass byte stream over one uploaded photo.
///
/// Yields exactly one item: the full content or the read error. Polling after
/// that returns `None`.
#[derive(Debug)]
pub struct ByteStream {
    file_name: String,
    pending: Option<oneshot::Receiver<Result<Bytes, StreamError>>>,
}

/// Start reading `blob` on a worker task and hand back the stream it fills.
///
/// Must be called from within a tokio runtime.
pub fn to_stream(blob: ImageBlob) -> ByteStream {
    let (tx, rx) = oneshot::channel();
    let file_name = blob.file_name.clone();

    tokio::spawn(async move {
        let result = read_blob(blob);
        // The consumer may already be gone; nothing to report then.
        let _ = tx.send(result);
    });

    ByteStream {
        file_name,
        pending: Some(rx),
    }
}

fn read_blob(blob: ImageBlob) -> Result<Bytes, StreamError> {
    let actual = blob.data.len() as u64;
    if actual != blob.size {
        return Err(StreamError::SizeMismatch {
            file_name: blob.file_name,
            declared: blob.size,
            actual,
        });
    }
    debug!("Read {} bytes of {}", actual, blob.file_name);
    Ok(blob.data)
}

impl ByteStream {
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Drain the stream into one buffer
    pub async fn into_bytes(mut self) -> Result<Bytes, StreamError> {
        let mut buffer = BytesMut::new();
        while let Some(chunk) = self.next().await {
            buffer.extend_from_slice(&chunk?);
        }
        Ok(buffer.freeze())
    }
}

impl Stream for ByteStream {
    type Item = Result<Bytes, StreamError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let Some(rx) = self.pending.as_mut() else {
            return Poll::Ready(None);
        };

        let result = match Pin::new(rx).poll(cx) {
            Poll::Pending => return Poll::Pending,
            Poll::Ready(Ok(result)) => result,
            Poll::Ready(Err(_)) => Err(StreamError::Interrupted(self.file_name.clone())),
        };

        self.pending = None;
        Poll::Ready(Some(result))
    }
}
