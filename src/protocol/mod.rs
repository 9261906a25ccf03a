pub mod backend;
pub mod packet;
pub mod primitive;
pub mod r#trait;

pub use packet::{RawMessage, read_message, read_messages};
pub use r#trait::{FrameSink, RowCodec};
