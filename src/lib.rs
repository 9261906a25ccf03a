//! Outbound response writer for the PostgreSQL wire protocol.
//!
//! [`ResponseWriter`] enforces the sequencing of one command's response:
//! rows stream only while it is open and exactly one terminal message closes
//! it. Column descriptions and row values are encoded by a [`RowCodec`] and
//! framed by a [`FrameSink`].

mod buffer;
pub mod col;
pub mod constant;
pub mod error;
mod opts;
pub mod protocol;
pub mod sync;
pub mod value;
mod writer;

pub use col::{Column, Columns};
pub use constant::FormatCode;
pub use opts::Opts;
pub use protocol::{FrameSink, RowCodec};
pub use value::Value;
pub use writer::{ResponseWriter, WriterState};
