use auto_impl::auto_impl;

use crate::constant::FormatCode;
use crate::error::Result;
use crate::value::Value;

/// Tagged, length-prefixed message builder on top of a connection
///
/// Calls between `begin_message` and `end_message` append to the body of one
/// message. `end_message` fills in the length and hands the message over for
/// transmission.
#[auto_impl(&mut, Box)]
pub trait FrameSink {
    /// Start a new message with the given tag byte
    fn begin_message(&mut self, tag: u8);

    fn add_byte(&mut self, value: u8);

    /// Append a big-endian 16-bit integer
    fn add_int16(&mut self, value: i16);

    /// Append a big-endian 32-bit integer
    fn add_int32(&mut self, value: i32);

    fn add_bytes(&mut self, data: &[u8]);

    /// Append the bytes of `s` without a terminator
    fn add_string(&mut self, s: &str);

    fn add_null_terminate(&mut self);

    fn add_cstring(&mut self, s: &str) {
        self.add_string(s);
        self.add_null_terminate();
    }

    /// Finish the current message
    fn end_message(&mut self) -> Result<()>;
}

/// Encoder of a result set's column description and data rows
#[auto_impl(&, Box, Arc)]
pub trait RowCodec {
    /// Emit the column description of the result set
    fn define<S: FrameSink + ?Sized>(&self, sink: &mut S, formats: &[FormatCode]) -> Result<()>;

    /// Emit one data row
    ///
    /// `values` must hold one entry per column, `Value::Null` for NULL.
    fn write_row<S: FrameSink + ?Sized>(
        &self,
        sink: &mut S,
        formats: &[FormatCode],
        values: &[Value<'_>],
    ) -> Result<()>;
}
