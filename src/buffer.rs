use color_eyre::eyre::eyre;
use zerocopy::IntoBytes;

use crate::error::{Error, Result};
use crate::protocol::packet::{HEADER_SIZE, MessageHeader};

/// Outgoing buffer of framed backend messages
///
/// Layout: [finished messages][5-byte header space][payload of the open message]
///
/// Bytes past the finished messages that do not belong to an open message
/// never reach `pending` and are dropped by the next `start`.
#[derive(Debug, Default)]
pub struct MessageBuffer {
    buf: Vec<u8>,

    /// End of the last finished message
    finished: usize,

    /// Offset of the header of the open message
    open: Option<usize>,
}

impl MessageBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
            finished: 0,
            open: None,
        }
    }

    /// Open a new message, discarding an unfinished one
    pub fn start(&mut self, tag: u8) {
        self.buf.truncate(self.finished);
        self.open = Some(self.finished);
        self.buf.push(tag);
        self.buf.extend_from_slice(&[0u8; 4]);
    }

    /// Payload of the open message
    #[inline]
    pub fn payload_mut(&mut self) -> &mut Vec<u8> {
        &mut self.buf
    }

    #[cfg(test)]
    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// Payload length of the open message
    #[cfg(test)]
    pub fn payload_len(&self) -> usize {
        match self.open {
            Some(start) => self.buf.len() - start - HEADER_SIZE,
            None => 0,
        }
    }

    /// Fill in the length of the open message
    ///
    /// A message larger than `max_message_size` is dropped from the buffer.
    pub fn finish(&mut self, max_message_size: usize) -> Result<()> {
        let Some(start) = self.open.take() else {
            self.buf.truncate(self.finished);
            return Err(eyre!("message finished without being started").into());
        };
        let payload_len = self.buf.len() - start - HEADER_SIZE;
        let size = payload_len + 4;
        if size > max_message_size {
            self.buf.truncate(start);
            return Err(Error::MessageTooLarge {
                size,
                max: max_message_size,
            });
        }
        let header = match MessageHeader::encode(self.buf[start], payload_len) {
            Ok(header) => header,
            Err(err) => {
                self.buf.truncate(start);
                return Err(err);
            }
        };
        self.buf[start..start + HEADER_SIZE].copy_from_slice(header.as_bytes());
        self.finished = self.buf.len();
        Ok(())
    }

    /// Finished messages ready for transmission
    pub fn pending(&self) -> &[u8] {
        &self.buf[..self.finished]
    }

    /// Drop the finished messages, keeping an open one
    pub fn consume(&mut self) {
        self.buf.drain(..self.finished);
        self.open = self.open.map(|start| start - self.finished);
        self.finished = 0;
    }
}
