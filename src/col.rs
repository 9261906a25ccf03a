use crate::constant::{FormatCode, oid};
use crate::error::{Error, Result};
use crate::protocol::backend::{write_data_row, write_row_description};
use crate::protocol::r#trait::{FrameSink, RowCodec};
use crate::value::Value;

/// Column definition announced in a RowDescription
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    /// OID of the source table, 0 if the column is not a table column
    pub table_oid: u32,
    /// Attribute number within the source table, 0 if not a table column
    pub attr_no: i16,
    pub type_oid: u32,
    /// `pg_type.typlen`, negative for variable-width types
    pub type_size: i16,
    /// Type-specific modifier, -1 if none
    pub type_modifier: i32,
}

impl Column {
    pub fn new(name: impl Into<String>, type_oid: u32) -> Self {
        Self {
            name: name.into(),
            table_oid: 0,
            attr_no: 0,
            type_oid,
            type_size: oid::type_size(type_oid),
            type_modifier: -1,
        }
    }

    pub fn with_table(mut self, table_oid: u32, attr_no: i16) -> Self {
        self.table_oid = table_oid;
        self.attr_no = attr_no;
        self
    }

    pub fn with_type_modifier(mut self, type_modifier: i32) -> Self {
        self.type_modifier = type_modifier;
        self
    }
}

/// Ordered column list of a result set
///
/// Acts as the row codec for its own result set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Columns(pub Vec<Column>);

impl Columns {
    pub fn new(columns: Vec<Column>) -> Self {
        Self(columns)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Column> {
        self.0.iter()
    }
}

impl From<Vec<Column>> for Columns {
    fn from(columns: Vec<Column>) -> Self {
        Self(columns)
    }
}

impl FromIterator<Column> for Columns {
    fn from_iter<I: IntoIterator<Item = Column>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl RowCodec for Columns {
    fn define<S: FrameSink + ?Sized>(&self, sink: &mut S, formats: &[FormatCode]) -> Result<()> {
        if formats.len() > 1 && formats.len() != self.len() {
            return Err(Error::FormatCountMismatch {
                formats: formats.len(),
                columns: self.len(),
            });
        }
        write_row_description(sink, &self.0, formats)
    }

    fn write_row<S: FrameSink + ?Sized>(
        &self,
        sink: &mut S,
        formats: &[FormatCode],
        values: &[Value<'_>],
    ) -> Result<()> {
        if values.len() != self.len() {
            return Err(Error::ColumnCountMismatch {
                expected: self.len(),
                actual: values.len(),
            });
        }
        let mut scratch = Vec::new();
        write_data_row(sink, formats, values, &mut scratch)
    }
}
