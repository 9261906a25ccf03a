use std::io::Write;

use crate::buffer::MessageBuffer;
use crate::error::Result;
use crate::opts::Opts;
use crate::protocol::primitive::*;
use crate::protocol::r#trait::FrameSink;

/// Frame sink over a blocking stream
///
/// Messages are framed in a reusable buffer and written to the stream when
/// finished (or on `flush` when `Opts::flush_each_message` is off). Blocking
/// on a slow peer happens inside the stream's `write_all`.
#[derive(Debug)]
pub struct StreamSink<W> {
    stream: W,
    buffer: MessageBuffer,
    opts: Opts,
}

impl<W: Write> StreamSink<W> {
    pub fn new(stream: W, opts: Opts) -> Self {
        Self {
            stream,
            buffer: MessageBuffer::with_capacity(opts.initial_buffer_capacity),
            opts,
        }
    }

    pub fn opts(&self) -> &Opts {
        &self.opts
    }

    pub fn get_ref(&self) -> &W {
        &self.stream
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.stream
    }

    /// Bytes of finished messages that have not reached the stream yet
    pub fn pending(&self) -> &[u8] {
        self.buffer.pending()
    }

    /// Write every finished message to the stream
    #[tracing::instrument(skip_all)]
    pub fn flush(&mut self) -> Result<()> {
        let pending = self.buffer.pending();
        if !pending.is_empty() {
            tracing::trace!(bytes = pending.len(), "flushing messages");
            self.stream.write_all(pending)?;
            self.buffer.consume();
        }
        self.stream.flush()?;
        Ok(())
    }

    /// Unwrap the stream, dropping unflushed messages
    pub fn into_inner(self) -> W {
        self.stream
    }
}

impl<W: Write> FrameSink for StreamSink<W> {
    fn begin_message(&mut self, tag: u8) {
        self.buffer.start(tag);
    }

    fn add_byte(&mut self, value: u8) {
        write_int_1(self.buffer.payload_mut(), value);
    }

    fn add_int16(&mut self, value: i16) {
        write_int_2(self.buffer.payload_mut(), value);
    }

    fn add_int32(&mut self, value: i32) {
        write_int_4(self.buffer.payload_mut(), value);
    }

    fn add_bytes(&mut self, data: &[u8]) {
        write_bytes_fix(self.buffer.payload_mut(), data);
    }

    fn add_string(&mut self, s: &str) {
        write_bytes_fix(self.buffer.payload_mut(), s.as_bytes());
    }

    fn add_null_terminate(&mut self) {
        write_int_1(self.buffer.payload_mut(), 0);
    }

    fn end_message(&mut self) -> Result<()> {
        self.buffer.finish(self.opts.max_message_size)?;
        if self.opts.flush_each_message {
            self.flush()?;
        }
        Ok(())
    }
}
