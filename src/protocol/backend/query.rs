//! Result set messages: RowDescription, DataRow and CommandComplete.

use crate::col::Column;
use crate::constant::{FormatCode, msg_type};
use crate::error::{Error, Result};
use crate::protocol::primitive::*;
use crate::protocol::r#trait::FrameSink;
use crate::value::Value;

/// Write a CommandComplete message carrying `description` (e.g. `SELECT 2`)
pub fn write_command_complete<S: FrameSink + ?Sized>(sink: &mut S, description: &str) -> Result<()> {
    sink.begin_message(msg_type::COMMAND_COMPLETE);
    sink.add_string(description);
    sink.add_null_terminate();
    sink.end_message()
}

/// Write a RowDescription message for `columns`
pub fn write_row_description<S: FrameSink + ?Sized>(
    sink: &mut S,
    columns: &[Column],
    formats: &[FormatCode],
) -> Result<()> {
    let count = field_count(columns.len())?;
    sink.begin_message(msg_type::ROW_DESCRIPTION);
    sink.add_int16(count);
    for (i, column) in columns.iter().enumerate() {
        sink.add_cstring(&column.name);
        sink.add_int32(column.table_oid as i32);
        sink.add_int16(column.attr_no);
        sink.add_int32(column.type_oid as i32);
        sink.add_int16(column.type_size);
        sink.add_int32(column.type_modifier);
        sink.add_int16(FormatCode::for_column(formats, i).as_i16());
    }
    sink.end_message()
}

/// Write a DataRow message
///
/// `scratch` is reused to encode each value before its length is known.
pub fn write_data_row<S: FrameSink + ?Sized>(
    sink: &mut S,
    formats: &[FormatCode],
    values: &[Value<'_>],
    scratch: &mut Vec<u8>,
) -> Result<()> {
    let count = field_count(values.len())?;
    sink.begin_message(msg_type::DATA_ROW);
    sink.add_int16(count);
    for (i, value) in values.iter().enumerate() {
        if value.is_null() {
            sink.add_int32(-1);
            continue;
        }
        scratch.clear();
        value.encode(FormatCode::for_column(formats, i), scratch)?;
        let len = i32::try_from(scratch.len()).map_err(|_| Error::MessageTooLarge {
            size: scratch.len(),
            max: i32::MAX as usize,
        })?;
        sink.add_int32(len);
        sink.add_bytes(scratch);
    }
    sink.end_message()
}

fn field_count(len: usize) -> Result<i16> {
    i16::try_from(len).map_err(|_| Error::TooManyColumns(len))
}

/// CommandComplete message
#[derive(Debug, Clone, Copy)]
pub struct CommandComplete<'a> {
    /// Command tag, e.g. `SELECT 2` or `INSERT 0 1`
    pub tag: &'a str,
}

impl<'a> CommandComplete<'a> {
    pub fn parse(payload: &'a [u8]) -> Result<Self> {
        let (tag, _rest) = read_string_null(payload)?;
        let tag = simdutf8::basic::from_utf8(tag)?;
        Ok(Self { tag })
    }

    /// Number of rows reported at the end of the tag, if any
    pub fn rows_affected(&self) -> Option<u64> {
        self.tag.rsplit(' ').next()?.parse().ok()
    }
}

/// One field of a RowDescription message
#[derive(Debug, Clone, Copy)]
pub struct FieldDescription<'a> {
    pub name: &'a str,
    pub table_oid: u32,
    pub attr_no: i16,
    pub type_oid: u32,
    pub type_size: i16,
    pub type_modifier: i32,
    pub format: FormatCode,
}

/// RowDescription message
#[derive(Debug, Clone)]
pub struct RowDescription<'a> {
    pub fields: Vec<FieldDescription<'a>>,
}

impl<'a> RowDescription<'a> {
    pub fn parse(payload: &'a [u8]) -> Result<Self> {
        let (count, mut data) = read_int_2(payload)?;
        let count = usize::try_from(count).map_err(|_| Error::InvalidMessage)?;
        let mut fields = Vec::with_capacity(count);
        for _ in 0..count {
            let (name, rest) = read_string_null(data)?;
            let (table_oid, rest) = read_int_4(rest)?;
            let (attr_no, rest) = read_int_2(rest)?;
            let (type_oid, rest) = read_int_4(rest)?;
            let (type_size, rest) = read_int_2(rest)?;
            let (type_modifier, rest) = read_int_4(rest)?;
            let (format, rest) = read_int_2(rest)?;
            fields.push(FieldDescription {
                name: simdutf8::basic::from_utf8(name)?,
                table_oid: table_oid as u32,
                attr_no,
                type_oid: type_oid as u32,
                type_size,
                type_modifier,
                format: FormatCode::try_from(format)?,
            });
            data = rest;
        }
        Ok(Self { fields })
    }
}

/// DataRow message
#[derive(Debug, Clone)]
pub struct DataRow<'a> {
    /// One entry per column, `None` for NULL
    pub values: Vec<Option<&'a [u8]>>,
}

impl<'a> DataRow<'a> {
    pub fn parse(payload: &'a [u8]) -> Result<Self> {
        let (count, mut data) = read_int_2(payload)?;
        let count = usize::try_from(count).map_err(|_| Error::InvalidMessage)?;
        let mut values = Vec::with_capacity(count);
        for _ in 0..count {
            let (value, rest) = read_nullable_bytes(data)?;
            values.push(value);
            data = rest;
        }
        Ok(Self { values })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
