//! PostgreSQL backend (server → client) messages.

pub mod copy;
pub mod query;

pub use copy::{CopyInResponse, write_copy_in_response};
pub use query::{
    CommandComplete, DataRow, FieldDescription, RowDescription, write_command_complete,
    write_data_row, write_row_description,
};
