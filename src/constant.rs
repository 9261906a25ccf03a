use crate::error::Error;

/// Per-column encoding of result values
#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormatCode {
    #[default]
    Text = 0,
    Binary = 1,
}

impl FormatCode {
    /// Resolve the format of the column at `index`
    ///
    /// - no codes: every column is text
    /// - one code: applies to every column
    /// - otherwise: one code per column
    pub fn for_column(formats: &[FormatCode], index: usize) -> FormatCode {
        match formats {
            [] => FormatCode::Text,
            [format] => *format,
            _ => formats.get(index).copied().unwrap_or_default(),
        }
    }

    pub fn as_i16(self) -> i16 {
        self as i16
    }
}

impl TryFrom<i16> for FormatCode {
    type Error = Error;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(FormatCode::Text),
            1 => Ok(FormatCode::Binary),
            _ => Err(Error::InvalidFormatCode(value)),
        }
    }
}

/// Backend message tags
pub mod msg_type {
    pub const ROW_DESCRIPTION: u8 = b'T';
    pub const DATA_ROW: u8 = b'D';
    pub const COMMAND_COMPLETE: u8 = b'C';
    pub const COPY_IN_RESPONSE: u8 = b'G';
}

/// Built-in type OIDs
pub mod oid {
    pub const BOOL: u32 = 16;
    pub const BYTEA: u32 = 17;
    pub const INT8: u32 = 20;
    pub const INT2: u32 = 21;
    pub const INT4: u32 = 23;
    pub const TEXT: u32 = 25;
    pub const FLOAT4: u32 = 700;
    pub const FLOAT8: u32 = 701;
    pub const DATE: u32 = 1082;
    pub const TIMESTAMP: u32 = 1114;
    pub const UUID: u32 = 2950;

    /// `pg_type.typlen` of a built-in type, -1 for variable length
    pub fn type_size(oid: u32) -> i16 {
        match oid {
            BOOL => 1,
            INT2 => 2,
            INT4 | FLOAT4 | DATE => 4,
            INT8 | FLOAT8 | TIMESTAMP => 8,
            UUID => 16,
            _ => -1,
        }
    }
}

/// Number of columns announced by the CopyIn stub
pub const COPY_IN_STUB_COLUMNS: usize = 3;

/// PostgreSQL refuses allocations of 1 GiB and above
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 0x3FFF_FFFF;
