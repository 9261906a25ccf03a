use zerocopy::byteorder::big_endian::U32 as U32BE;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::error::{Error, Result};

/// Backend message envelope (zero-copy)
///
/// Layout matches the PostgreSQL v3 protocol:
/// - tag: 1 byte
/// - length: 4 bytes (big-endian, counts itself and the payload but not the tag)
#[repr(C, packed)]
#[derive(Debug, Clone, Copy, FromBytes, KnownLayout, Immutable, IntoBytes, Unaligned)]
pub struct MessageHeader {
    pub tag: u8,
    pub length: U32BE,
}

pub const HEADER_SIZE: usize = size_of::<MessageHeader>();

impl MessageHeader {
    pub fn encode(tag: u8, payload_length: usize) -> Result<Self> {
        let length = u32::try_from(payload_length + 4).map_err(|_| Error::MessageTooLarge {
            size: payload_length + 4,
            max: u32::MAX as usize,
        })?;
        Ok(Self {
            tag,
            length: U32BE::new(length),
        })
    }

    /// Payload length, excluding the 4-byte length field
    pub fn payload_length(&self) -> Result<usize> {
        let length = self.length.get() as usize;
        length.checked_sub(4).ok_or(Error::InvalidMessage)
    }

    pub fn from_bytes(data: &[u8]) -> Result<&Self> {
        if data.len() < HEADER_SIZE {
            return Err(Error::UnexpectedEof);
        }
        Self::ref_from_prefix(data)
            .map(|(header, _)| header)
            .map_err(|_| Error::InvalidMessage)
    }
}

/// One framed backend message
///
/// Individual message bodies are parsed on demand by their own types.
#[derive(Debug, Clone, Copy)]
pub struct RawMessage<'a> {
    pub tag: u8,
    pub payload: &'a [u8],
}

/// Split the first framed message off `data`
pub fn read_message(data: &[u8]) -> Result<(RawMessage<'_>, &[u8])> {
    let header = MessageHeader::from_bytes(data)?;
    let length = header.payload_length()?;
    let body = &data[HEADER_SIZE..];
    if body.len() < length {
        return Err(Error::UnexpectedEof);
    }
    let (payload, rest) = body.split_at(length);
    Ok((
        RawMessage {
            tag: header.tag,
            payload,
        },
        rest,
    ))
}

/// Iterate over every framed message in `data`
pub fn read_messages(mut data: &[u8]) -> Result<Vec<RawMessage<'_>>> {
    let mut messages = Vec::new();
    while !data.is_empty() {
        let (message, rest) = read_message(data)?;
        messages.push(message);
        data = rest;
    }
    Ok(messages)
}
