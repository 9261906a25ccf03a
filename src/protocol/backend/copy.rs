//! COPY protocol messages.

use crate::constant::{FormatCode, msg_type};
use crate::error::{Error, Result};
use crate::protocol::primitive::*;
use crate::protocol::r#trait::FrameSink;

/// Write a CopyInResponse message switching the client into COPY FROM STDIN mode
///
/// Layout: overall format (1 byte), column count (int16), one int16 format per column.
pub fn write_copy_in_response<S: FrameSink + ?Sized>(
    sink: &mut S,
    overall: FormatCode,
    column_formats: &[FormatCode],
) -> Result<()> {
    let count = i16::try_from(column_formats.len())
        .map_err(|_| Error::TooManyColumns(column_formats.len()))?;
    sink.begin_message(msg_type::COPY_IN_RESPONSE);
    sink.add_byte(overall.as_i16() as u8);
    sink.add_int16(count);
    for format in column_formats {
        sink.add_int16(format.as_i16());
    }
    sink.end_message()
}

/// CopyInResponse message
#[derive(Debug, Clone)]
pub struct CopyInResponse {
    pub overall_format: FormatCode,
    pub column_formats: Vec<FormatCode>,
}

impl CopyInResponse {
    pub fn parse(payload: &[u8]) -> Result<Self> {
        let (overall, rest) = read_int_1(payload)?;
        let (count, mut data) = read_int_2(rest)?;
        let count = usize::try_from(count).map_err(|_| Error::InvalidMessage)?;
        let mut column_formats = Vec::with_capacity(count);
        for _ in 0..count {
            let (format, rest) = read_int_2(data)?;
            column_formats.push(FormatCode::try_from(format)?);
            data = rest;
        }
        Ok(Self {
            overall_format: FormatCode::try_from(i16::from(overall))?,
            column_formats,
        })
    }
}
