//! Bounded output capture.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::debug;

/// Buffer keeping the first `cap` bytes of a stream.
///
/// Shared with the reader task so whatever arrived is still available if the
/// reader has to be abandoned.
#[derive(Clone)]
pub(crate) struct CappedBuffer {
    inner: Arc<Mutex<Vec<u8>>>,
    cap: usize,
}

impl CappedBuffer {
    pub(crate) fn new(cap: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Vec::new())),
            cap,
        }
    }

    /// Decoded text, never longer than `cap` bytes.
    ///
    /// A multi-byte character split by the cap is dropped rather than
    /// replaced, and replacement characters for invalid bytes never push the
    /// text past the cap.
    pub(crate) fn to_string_lossy(&self) -> String {
        let bytes = self.inner.lock();
        let end = match std::str::from_utf8(&bytes) {
            Err(e) if e.error_len().is_none() => e.valid_up_to(),
            _ => bytes.len(),
        };
        let mut text = String::from_utf8_lossy(&bytes[..end]).into_owned();
        if text.len() > self.cap {
            let mut cut = self.cap;
            while !text.is_char_boundary(cut) {
                cut -= 1;
            }
            text.truncate(cut);
        }
        text
    }

    /// Drain `reader` to EOF. Bytes past the cap are read and discarded so
    /// the child never blocks on a full pipe.
    pub(crate) async fn fill<R>(&self, mut reader: R)
    where
        R: AsyncRead + Unpin,
    {
        let cap = self.cap;
        let mut chunk = [0u8; 4096];
        loop {
            match reader.read(&mut chunk).await {
                Ok(0) => break,
                Ok(n) => {
                    let mut buf = self.inner.lock();
                    let room = cap.saturating_sub(buf.len());
                    if room > 0 {
                        buf.extend_from_slice(&chunk[..n.min(room)]);
                    }
                }
                Err(e) => {
                    debug!("Output stream closed with error: {}", e);
                    break;
                }
            }
        }
    }
}
