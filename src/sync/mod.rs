//! Blocking I/O for backend messages.

mod sink;

pub use sink::StreamSink;
