//! Pulls whole frames off an async byte stream.

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::trace;
use vidlink_protocol::{frame_len, Channel};

use crate::error::EngineError;

const INITIAL_CAPACITY: usize = 8 * 1024;

/// Buffers a stream and yields one complete frame at a time.
#[derive(Debug)]
pub struct FrameReader<R> {
    inner: R,
    channel: Channel,
    buffer: BytesMut,
    max_frame_size: usize,
}

impl<R: AsyncRead + Unpin> FrameReader<R> {
    pub fn new(inner: R, channel: Channel, max_frame_size: usize) -> Self {
        Self {
            inner,
            channel,
            buffer: BytesMut::with_capacity(INITIAL_CAPACITY),
            max_frame_size,
        }
    }

    /// Next complete frame, or `None` once the stream ends on a frame boundary.
    pub async fn next_frame(&mut self) -> Result<Option<Bytes>, EngineError> {
        loop {
            if let Some(total) = frame_len(self.channel, &self.buffer)? {
                if total > self.max_frame_size {
                    return Err(EngineError::FrameTooLarge {
                        size: total,
                        limit: self.max_frame_size,
                    });
                }
                if self.buffer.len() >= total {
                    trace!(channel = %self.channel, total, "Frame available");
                    return Ok(Some(self.buffer.split_to(total).freeze()));
                }
            }

            if self.inner.read_buf(&mut self.buffer).await? == 0 {
                if self.buffer.is_empty() {
                    return Ok(None);
                }
                return Err(EngineError::TruncatedStream {
                    remaining: self.buffer.len(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;

    const TWO_FRAMES: &[u8] = &[
        0x00, 0x05, 0x00, 0x01, 0x02, 0x06, //
        0x00, 0x06, 0x01, 0x01, 0x03, 0xAB, 0xAC,
    ];

    #[tokio::test]
    async fn test_reads_back_to_back_frames() {
        let mut reader = FrameReader::new(TWO_FRAMES, Channel::Data, 1024);
        assert_eq!(reader.next_frame().await.unwrap().unwrap(), &TWO_FRAMES[..6]);
        assert_eq!(reader.next_frame().await.unwrap().unwrap(), &TWO_FRAMES[6..]);
        assert!(reader.next_frame().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_frames_split_across_reads() {
        let (mut tx, rx) = tokio::io::duplex(4);
        let writer = tokio::spawn(async move {
            for chunk in TWO_FRAMES.chunks(3) {
                tx.write_all(chunk).await.unwrap();
            }
        });

        let mut reader = FrameReader::new(rx, Channel::Data, 1024);
        let mut frames = Vec::new();
        while let Some(frame) = reader.next_frame().await.unwrap() {
            frames.push(frame);
        }
        writer.await.unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1], &TWO_FRAMES[6..]);
    }

    #[tokio::test]
    async fn test_truncated_stream() {
        let mut reader = FrameReader::new(&TWO_FRAMES[..9], Channel::Data, 1024);
        assert!(reader.next_frame().await.unwrap().is_some());
        assert!(matches!(
            reader.next_frame().await,
            Err(EngineError::TruncatedStream { remaining: 3 })
        ));
    }

    #[tokio::test]
    async fn test_frame_limit() {
        let mut reader = FrameReader::new(TWO_FRAMES, Channel::Data, 4);
        assert!(matches!(
            reader.next_frame().await,
            Err(EngineError::FrameTooLarge { size: 6, limit: 4 })
        ));
    }
}
