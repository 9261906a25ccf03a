use crate::col::Columns;
use crate::constant::{COPY_IN_STUB_COLUMNS, FormatCode};
use crate::error::{Error, Result};
use crate::protocol::backend::{write_command_complete, write_copy_in_response};
use crate::protocol::r#trait::{FrameSink, RowCodec};
use crate::value::Value;

/// Lifecycle of a response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    /// Rows and administrative messages may still be written
    Open,
    /// The response was terminated by Empty or Complete. Absorbing.
    Closed,
}

/// Writes the response of one executed command to the client
///
/// A command obtains one writer, optionally defines its columns, streams zero
/// or more rows and terminates the response with exactly one of [`empty`] or
/// [`complete`]. Every operation except [`written`] fails with
/// [`Error::ClosedWriter`] afterwards.
///
/// The writer is not meant for concurrent use: the owning command calls it
/// sequentially. Each call returns once the sink call returns.
///
/// [`empty`]: ResponseWriter::empty
/// [`complete`]: ResponseWriter::complete
/// [`written`]: ResponseWriter::written
pub struct ResponseWriter<'a, C, S: ?Sized> {
    columns: Option<C>,
    formats: Vec<FormatCode>,
    sink: &'a mut S,
    state: WriterState,
    written: u64,
}

impl<'a, C: RowCodec, S: FrameSink + ?Sized> ResponseWriter<'a, C, S> {
    pub fn new(columns: Option<C>, formats: Vec<FormatCode>, sink: &'a mut S) -> Self {
        Self {
            columns,
            formats,
            sink,
            state: WriterState::Open,
            written: 0,
        }
    }

    pub fn state(&self) -> WriterState {
        self.state
    }

    pub fn is_closed(&self) -> bool {
        self.state == WriterState::Closed
    }

    pub fn formats(&self) -> &[FormatCode] {
        &self.formats
    }

    /// Number of rows written to the client
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Announce the columns of the result set
    pub fn define(&mut self, columns: C) -> Result<()> {
        self.ensure_open()?;
        let columns = self.columns.insert(columns);
        columns.define(&mut *self.sink, &self.formats)
    }

    /// Write a single data row
    ///
    /// `values` holds one entry per defined column, `Value::Null` for NULL.
    /// Checking the shape of the row is up to the row codec. Without defined
    /// columns the row is encoded against an empty column list.
    pub fn row(&mut self, values: &[Value<'_>]) -> Result<()> {
        self.ensure_open()?;
        match &self.columns {
            Some(columns) => columns.write_row(&mut *self.sink, &self.formats, values)?,
            None => Columns::default().write_row(&mut *self.sink, &self.formats, values)?,
        }
        self.written += 1;
        Ok(())
    }

    /// Terminate a response that legitimately holds no rows
    ///
    /// No message is written.
    pub fn empty(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.finish_empty()?;
        self.close();
        Ok(())
    }

    /// Terminate the response with a CommandComplete carrying `description`
    ///
    /// The writer is closed even if the sink fails to write the message.
    #[tracing::instrument(skip_all)]
    pub fn complete(&mut self, description: &str) -> Result<()> {
        self.ensure_open()?;
        if self.written == 0 && self.columns.is_some() {
            self.finish_empty()?;
        }
        self.close();
        write_command_complete(&mut *self.sink, description)
    }

    /// Switch the client into COPY FROM STDIN mode
    ///
    /// Announces a fixed set of text columns for now; the column list of the
    /// target table is not plumbed through yet.
    #[tracing::instrument(skip_all)]
    pub fn copy_in(&mut self) -> Result<()> {
        self.ensure_open()?;
        write_copy_in_response(
            &mut *self.sink,
            FormatCode::Text,
            &[FormatCode::Text; COPY_IN_STUB_COLUMNS],
        )
    }

    fn ensure_open(&self) -> Result<()> {
        match self.state {
            WriterState::Open => Ok(()),
            WriterState::Closed => Err(Error::ClosedWriter),
        }
    }

    /// Validate a zero-row termination without touching the state
    fn finish_empty(&self) -> Result<()> {
        if self.written != 0 {
            return Err(Error::DataWritten);
        }
        Ok(())
    }

    fn close(&mut self) {
        tracing::trace!(written = self.written, "response closed");
        self.state = WriterState::Closed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constant::msg_type;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Begin(u8),
        Byte(u8),
        Int16(i16),
        Int32(i32),
        Bytes(Vec<u8>),
        Str(String),
        Nul,
        End,
    }

    #[derive(Default)]
    struct RecordingSink {
        events: Vec<Event>,
        fail_end: bool,
    }

    impl RecordingSink {
        fn tags(&self) -> Vec<u8> {
            self.events
                .iter()
                .filter_map(|event| match event {
                    Event::Begin(tag) => Some(*tag),
                    _ => None,
                })
                .collect()
        }
    }

    impl FrameSink for RecordingSink {
        fn begin_message(&mut self, tag: u8) {
            self.events.push(Event::Begin(tag));
        }

        fn add_byte(&mut self, value: u8) {
            self.events.push(Event::Byte(value));
        }

        fn add_int16(&mut self, value: i16) {
            self.events.push(Event::Int16(value));
        }

        fn add_int32(&mut self, value: i32) {
            self.events.push(Event::Int32(value));
        }

        fn add_bytes(&mut self, data: &[u8]) {
            self.events.push(Event::Bytes(data.to_vec()));
        }

        fn add_string(&mut self, s: &str) {
            self.events.push(Event::Str(s.to_owned()));
        }

        fn add_null_terminate(&mut self) {
            self.events.push(Event::Nul);
        }

        fn end_message(&mut self) -> Result<()> {
            self.events.push(Event::End);
            if self.fail_end {
                return Err(std::io::Error::from(std::io::ErrorKind::BrokenPipe).into());
            }
            Ok(())
        }
    }

    /// Row codec emitting one marker message per call
    #[derive(Default)]
    struct FakeCodec {
        columns: usize,
        fail_define: bool,
        fail_rows: bool,
    }

    impl RowCodec for FakeCodec {
        fn define<S: FrameSink + ?Sized>(&self, sink: &mut S, formats: &[FormatCode]) -> Result<()> {
            if self.fail_define {
                return Err(Error::FormatCountMismatch {
                    formats: formats.len(),
                    columns: self.columns,
                });
            }
            sink.begin_message(msg_type::ROW_DESCRIPTION);
            sink.add_int16(self.columns as i16);
            sink.add_int16(formats.len() as i16);
            sink.end_message()
        }

        fn write_row<S: FrameSink + ?Sized>(
            &self,
            sink: &mut S,
            _: &[FormatCode],
            values: &[Value<'_>],
        ) -> Result<()> {
            if self.fail_rows || values.len() != self.columns {
                return Err(Error::ColumnCountMismatch {
                    expected: self.columns,
                    actual: values.len(),
                });
            }
            sink.begin_message(msg_type::DATA_ROW);
            sink.add_int16(values.len() as i16);
            sink.end_message()
        }
    }

    fn codec(columns: usize) -> FakeCodec {
        FakeCodec {
            columns,
            ..FakeCodec::default()
        }
    }

    fn command_completes(sink: &RecordingSink) -> usize {
        sink.tags()
            .iter()
            .filter(|tag| **tag == msg_type::COMMAND_COMPLETE)
            .count()
    }

    #[test]
    fn test_two_rows_then_complete() {
        let mut sink = RecordingSink::default();
        let mut writer = ResponseWriter::new(None, vec![], &mut sink);
        writer.define(codec(2)).unwrap();
        writer.row(&[Value::Int4(1), Value::Text("a")]).unwrap();
        writer.row(&[Value::Int4(2), Value::Text("b")]).unwrap();
        writer.complete("SELECT 2").unwrap();
        assert_eq!(writer.written(), 2);
        assert!(writer.is_closed());

        assert_eq!(
            sink.tags(),
            vec![
                msg_type::ROW_DESCRIPTION,
                msg_type::DATA_ROW,
                msg_type::DATA_ROW,
                msg_type::COMMAND_COMPLETE,
            ]
        );
        assert_eq!(
            &sink.events[sink.events.len() - 4..],
            &[
                Event::Begin(msg_type::COMMAND_COMPLETE),
                Event::Str("SELECT 2".to_owned()),
                Event::Nul,
                Event::End,
            ]
        );
    }

    #[test]
    fn test_complete_described_zero_rows() {
        let mut sink = RecordingSink::default();
        let mut writer = ResponseWriter::new(Some(codec(2)), vec![], &mut sink);
        writer.complete("SELECT 0").unwrap();
        assert_eq!(writer.written(), 0);
        assert_eq!(writer.state(), WriterState::Closed);
        assert_eq!(command_completes(&sink), 1);
        assert!(sink.events.contains(&Event::Str("SELECT 0".to_owned())));
    }

    #[test]
    fn test_complete_without_columns() {
        let mut sink = RecordingSink::default();
        let mut writer = ResponseWriter::<FakeCodec, _>::new(None, vec![], &mut sink);
        writer.complete("CREATE TABLE").unwrap();
        assert!(writer.is_closed());
        assert_eq!(sink.tags(), vec![msg_type::COMMAND_COMPLETE]);
    }

    #[test]
    fn test_complete_twice() {
        let mut sink = RecordingSink::default();
        let mut writer = ResponseWriter::new(Some(codec(1)), vec![], &mut sink);
        writer.complete("SELECT 0").unwrap();
        assert!(matches!(writer.complete("SELECT 0"), Err(Error::ClosedWriter)));
        assert_eq!(command_completes(&sink), 1);
    }

    #[test]
    fn test_closed_writer_rejects_everything() {
        let mut sink = RecordingSink::default();
        let mut writer = ResponseWriter::new(Some(codec(1)), vec![], &mut sink);
        writer.row(&[Value::Int8(1)]).unwrap();
        writer.complete("SELECT 1").unwrap();

        assert!(matches!(writer.row(&[Value::Int8(2)]), Err(Error::ClosedWriter)));
        assert!(matches!(writer.empty(), Err(Error::ClosedWriter)));
        assert!(matches!(writer.complete("SELECT 1"), Err(Error::ClosedWriter)));
        assert!(matches!(writer.copy_in(), Err(Error::ClosedWriter)));
        assert!(matches!(writer.define(codec(1)), Err(Error::ClosedWriter)));
        assert_eq!(writer.written(), 1);
        assert_eq!(
            sink.tags(),
            vec![msg_type::DATA_ROW, msg_type::COMMAND_COMPLETE]
        );
    }

    #[test]
    fn test_empty_closes_without_message() {
        let mut sink = RecordingSink::default();
        let mut writer = ResponseWriter::new(Some(codec(1)), vec![], &mut sink);
        writer.empty().unwrap();
        assert!(writer.is_closed());
        assert!(matches!(writer.empty(), Err(Error::ClosedWriter)));
        assert!(matches!(writer.complete("SELECT 0"), Err(Error::ClosedWriter)));
        assert!(sink.events.is_empty());
    }

    #[test]
    fn test_empty_after_rows() {
        let mut sink = RecordingSink::default();
        let mut writer = ResponseWriter::new(Some(codec(1)), vec![], &mut sink);
        writer.row(&[Value::Bool(true)]).unwrap();
        assert!(matches!(writer.empty(), Err(Error::DataWritten)));
        assert_eq!(writer.state(), WriterState::Open);

        writer.complete("SELECT 1").unwrap();
        assert_eq!(command_completes(&sink), 1);
    }

    #[test]
    fn test_closed_checked_before_data_written() {
        let mut sink = RecordingSink::default();
        let mut writer = ResponseWriter::new(Some(codec(1)), vec![], &mut sink);
        writer.row(&[Value::Null]).unwrap();
        writer.complete("SELECT 1").unwrap();
        assert!(matches!(writer.empty(), Err(Error::ClosedWriter)));
    }

    #[test]
    fn test_failed_row_is_not_counted() {
        let mut sink = RecordingSink::default();
        let mut writer = ResponseWriter::new(Some(codec(2)), vec![], &mut sink);
        assert!(matches!(
            writer.row(&[Value::Int4(1)]),
            Err(Error::ColumnCountMismatch {
                expected: 2,
                actual: 1
            })
        ));
        assert_eq!(writer.written(), 0);
        assert_eq!(writer.state(), WriterState::Open);
        writer.empty().unwrap();
    }

    #[test]
    fn test_row_without_columns() {
        let mut sink = RecordingSink::default();
        let mut writer = ResponseWriter::<FakeCodec, _>::new(None, vec![], &mut sink);
        writer.row(&[]).unwrap();
        assert_eq!(writer.written(), 1);
        assert!(matches!(
            writer.row(&[Value::Int4(1)]),
            Err(Error::ColumnCountMismatch {
                expected: 0,
                actual: 1
            })
        ));
        assert_eq!(writer.written(), 1);
        writer.complete("SELECT 1").unwrap();
        assert_eq!(
            sink.events,
            vec![
                Event::Begin(msg_type::DATA_ROW),
                Event::Int16(0),
                Event::End,
                Event::Begin(msg_type::COMMAND_COMPLETE),
                Event::Str("SELECT 1".to_owned()),
                Event::Nul,
                Event::End,
            ]
        );
    }

    #[test]
    fn test_define_error_keeps_writer_open() {
        let mut sink = RecordingSink::default();
        let failing = FakeCodec {
            columns: 2,
            fail_define: true,
            ..FakeCodec::default()
        };
        let mut writer = ResponseWriter::new(None, vec![FormatCode::Text; 3], &mut sink);
        assert!(matches!(
            writer.define(failing),
            Err(Error::FormatCountMismatch {
                formats: 3,
                columns: 2
            })
        ));
        assert_eq!(writer.state(), WriterState::Open);
        assert_eq!(writer.written(), 0);
        writer.complete("SELECT 0").unwrap();
        assert_eq!(sink.tags(), vec![msg_type::COMMAND_COMPLETE]);
    }

    #[test]
    fn test_copy_in_sink_error_leaves_state() {
        let mut sink = RecordingSink {
            fail_end: true,
            ..RecordingSink::default()
        };
        let mut writer = ResponseWriter::new(Some(codec(1)), vec![], &mut sink);
        assert!(matches!(writer.copy_in(), Err(Error::IoError(_))));
        assert_eq!(writer.state(), WriterState::Open);
        assert_eq!(writer.written(), 0);
        assert!(matches!(writer.empty(), Ok(())));
    }

    #[test]
    fn test_codec_error_propagates_unchanged() {
        let mut sink = RecordingSink::default();
        let failing = FakeCodec {
            columns: 1,
            fail_rows: true,
            ..FakeCodec::default()
        };
        let mut writer = ResponseWriter::new(Some(failing), vec![], &mut sink);
        assert!(matches!(
            writer.row(&[Value::Int4(1)]),
            Err(Error::ColumnCountMismatch {
                expected: 1,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_define_passes_formats() {
        let mut sink = RecordingSink::default();
        let formats = vec![FormatCode::Binary, FormatCode::Text];
        let mut writer = ResponseWriter::new(None, formats, &mut sink);
        writer.define(codec(2)).unwrap();
        assert_eq!(writer.formats(), &[FormatCode::Binary, FormatCode::Text]);
        assert_eq!(
            sink.events,
            vec![
                Event::Begin(msg_type::ROW_DESCRIPTION),
                Event::Int16(2),
                Event::Int16(2),
                Event::End,
            ]
        );
    }

    #[test]
    fn test_copy_in_stub() {
        let mut sink = RecordingSink::default();
        let mut writer = ResponseWriter::<FakeCodec, _>::new(None, vec![], &mut sink);
        writer.copy_in().unwrap();
        assert_eq!(writer.written(), 0);
        assert_eq!(writer.state(), WriterState::Open);
        assert_eq!(
            sink.events,
            vec![
                Event::Begin(msg_type::COPY_IN_RESPONSE),
                Event::Byte(0),
                Event::Int16(3),
                Event::Int16(0),
                Event::Int16(0),
                Event::Int16(0),
                Event::End,
            ]
        );
    }

    #[test]
    fn test_complete_closes_on_sink_error() {
        let mut sink = RecordingSink {
            fail_end: true,
            ..RecordingSink::default()
        };
        let mut writer = ResponseWriter::<FakeCodec, _>::new(None, vec![], &mut sink);
        assert!(matches!(writer.complete("SELECT 0"), Err(Error::IoError(_))));
        assert!(writer.is_closed());
        assert!(matches!(writer.complete("SELECT 0"), Err(Error::ClosedWriter)));
    }

    #[test]
    fn test_written_is_monotonic() {
        let mut sink = RecordingSink::default();
        let mut writer = ResponseWriter::new(Some(codec(1)), vec![], &mut sink);
        let mut last = writer.written();
        for i in 0..5 {
            writer.row(&[Value::Int4(i)]).unwrap();
            assert!(writer.written() > last);
            last = writer.written();
        }
        let _ = writer.row(&[]);
        assert_eq!(writer.written(), 5);
        writer.complete("SELECT 5").unwrap();
        let _ = writer.row(&[Value::Int4(6)]);
        assert_eq!(writer.written(), 5);
    }

    #[test]
    fn test_writer_over_boxed_sink() {
        let mut sink: Box<dyn FrameSink> = Box::new(RecordingSink::default());
        let mut writer = ResponseWriter::new(Some(codec(1)), vec![], &mut *sink);
        writer.row(&[Value::Int2(1)]).unwrap();
        writer.complete("SELECT 1").unwrap();
        assert_eq!(writer.written(), 1);
    }
}
