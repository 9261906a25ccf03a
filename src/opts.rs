use smart_default::SmartDefault;

use crate::constant::DEFAULT_MAX_MESSAGE_SIZE;

/// A configuration for a frame sink
///
/// ```rs
/// let mut opts = Opts::default();
/// opts.flush_each_message = false;
/// let sink = StreamSink::new(stream, opts);
/// ```
#[derive(Debug, Clone, SmartDefault)]
pub struct Opts {
    /// Upper bound of a single message including its 4-byte length field.
    /// A message above the limit is discarded and reported as `MessageTooLarge`.
    #[default(DEFAULT_MAX_MESSAGE_SIZE)]
    pub max_message_size: usize,

    /// Write every message to the stream as soon as it is finished.
    /// When disabled, messages accumulate until `StreamSink::flush`.
    #[default(true)]
    pub flush_each_message: bool,

    /// Initial capacity of the outgoing buffer
    #[default(8192)]
    pub initial_buffer_capacity: usize,
}
