// OSV - streaming CSV/TSV parsing engine
//
// Copyright (c) 2025 OSV contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Pull-based record cursor.
//!
//! A [`RecordCursor`] owns everything one iteration needs: the byte source
//! handle, its read buffer, the tokenizer position and the resolved headers.
//! Nothing is shared between cursors, so independent cursors may run on
//! separate threads over the same input without coordination.
//!
//! # Lifecycle
//!
//! ```text
//! Created --pull--> Active --+--> Exhausted --+
//!                            |                +--> Closed
//!                            +--> Failed -----+
//! ```
//!
//! The source is released as soon as the cursor leaves `Active`, on an
//! explicit [`close`](RecordCursor::close), or when the cursor is dropped.

use crate::assembler::RecordAssembler;
use crate::buffer::ChunkedReader;
use crate::config::ParserConfig;
use crate::error::{CsvError, CsvResult};
use crate::record::{HeaderSet, Record};
use crate::source::ByteSource;
use crate::tokenizer::{RawRecord, Tokenizer};
use crate::validate::Decoder;
use std::fmt;
use std::iter::FusedIterator;
use tracing::debug;

/// Lifecycle state of a [`RecordCursor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CursorState {
    /// Nothing read yet.
    Created,
    /// At least one pull made; more records may follow.
    Active,
    /// End of input reached cleanly.
    Exhausted,
    /// A fatal error stopped iteration.
    Failed,
    /// Closed by the caller.
    Closed,
}

impl CursorState {
    /// Whether no further records can be produced.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Exhausted | Self::Failed | Self::Closed)
    }
}

/// Outcome of one [`RecordCursor::pull`].
#[derive(Debug, Clone)]
pub enum Pull {
    /// The next record.
    Record(Record),
    /// No more records.
    End,
    /// Iteration stopped on this error. Repeated on every later pull.
    Failed(CsvError),
}

impl Pull {
    /// Whether this is the end-of-sequence signal.
    pub fn is_end(&self) -> bool {
        matches!(self, Self::End)
    }

    /// The record, if one was produced.
    pub fn into_record(self) -> Option<Record> {
        match self {
            Self::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Convert into the item type of the iterator.
    pub fn into_result(self) -> Option<CsvResult<Record>> {
        match self {
            Self::Record(record) => Some(Ok(record)),
            Self::End => None,
            Self::Failed(e) => Some(Err(e)),
        }
    }
}

/// Lazy, non-restartable sequence of records over one input.
///
/// # Examples
///
/// ## Pull Style
///
/// ```rust
/// use osv_core::{parse, ParserConfig, Pull};
///
/// let mut cursor = parse(&b"id,name\n1,John\n"[..], ParserConfig::default()).unwrap();
/// match cursor.pull() {
///     Pull::Record(record) => assert_eq!(record.get("name"), Some(Some("John"))),
///     other => panic!("unexpected {other:?}"),
/// }
/// assert!(cursor.pull().is_end());
/// assert!(cursor.pull().is_end());
/// ```
///
/// ## Iterator Style
///
/// ```rust
/// use osv_core::{parse, ParserConfig, ResultType};
///
/// let config = ParserConfig::default().result_type(ResultType::Array);
/// let rows: Vec<_> = parse(&b"a,b\n1,2\n3,4\n"[..], config)
///     .unwrap()
///     .collect::<Result<_, _>>()
///     .unwrap();
/// assert_eq!(rows.len(), 2);
/// ```
pub struct RecordCursor {
    reader: Option<ChunkedReader<ByteSource>>,
    tokenizer: Tokenizer,
    decoder: Decoder,
    assembler: RecordAssembler,
    raw: RawRecord,
    state: CursorState,
    error: Option<CsvError>,
    /// Non-blank rows tokenized, header included.
    rows: u64,
    records_read: u64,
    /// Whether the iterator has already yielded the terminal error.
    error_yielded: bool,
}

impl RecordCursor {
    pub(crate) fn new(source: ByteSource, config: &ParserConfig) -> Self {
        Self {
            reader: Some(ChunkedReader::new(source, config.buffer_size)),
            tokenizer: Tokenizer::new(
                config.delimiter,
                config.quote_char,
                config.ignore_null_bytes,
            ),
            decoder: Decoder::new(config.lossy),
            assembler: RecordAssembler::new(config),
            raw: RawRecord::new(),
            state: CursorState::Created,
            error: None,
            rows: 0,
            records_read: 0,
            error_yielded: false,
        }
    }

    /// Produce the next record.
    pub fn pull(&mut self) -> Pull {
        match self.state {
            CursorState::Created => self.state = CursorState::Active,
            CursorState::Active => {}
            CursorState::Exhausted | CursorState::Failed | CursorState::Closed => {
                return self.terminal();
            }
        }

        match self.advance() {
            Ok(Some(record)) => {
                self.records_read += 1;
                Pull::Record(record)
            }
            Ok(None) => {
                debug!(records = self.records_read, "input exhausted");
                self.state = CursorState::Exhausted;
                self.release();
                Pull::End
            }
            Err(e) => {
                debug!(error = %e, records = self.records_read, "parse failed");
                self.state = CursorState::Failed;
                self.error = Some(e.clone());
                self.release();
                Pull::Failed(e)
            }
        }
    }

    /// Release the source and buffer. Idempotent.
    ///
    /// Later pulls repeat the terminal error if the cursor had failed, and
    /// report [`Pull::End`] otherwise.
    pub fn close(&mut self) {
        if self.state != CursorState::Closed {
            debug!(records = self.records_read, "cursor closed");
            self.state = CursorState::Closed;
            self.release();
        }
    }

    /// Resolved headers, available after the first pull.
    pub fn headers(&self) -> Option<&HeaderSet> {
        self.assembler.headers()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> CursorState {
        self.state
    }

    /// Number of records delivered so far.
    pub fn records_read(&self) -> u64 {
        self.records_read
    }

    /// The error that stopped iteration, if any.
    pub fn error(&self) -> Option<&CsvError> {
        self.error.as_ref()
    }

    fn advance(&mut self) -> CsvResult<Option<Record>> {
        loop {
            let Some(reader) = self.reader.as_mut() else {
                return Ok(None);
            };
            if !self.tokenizer.read_record(reader, &mut self.raw)? {
                return Ok(None);
            }
            self.rows += 1;
            let fields = self.decoder.decode_record(&self.raw, self.rows)?;
            if let Some(record) = self.assembler.accept(fields, self.rows, self.raw.line())? {
                return Ok(Some(record));
            }
        }
    }

    fn terminal(&self) -> Pull {
        match self.error {
            Some(ref e) => Pull::Failed(e.clone()),
            None => Pull::End,
        }
    }

    fn release(&mut self) {
        if let Some(mut reader) = self.reader.take() {
            reader.release();
            reader.get_mut().close();
        }
    }
}

impl Iterator for RecordCursor {
    type Item = CsvResult<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.pull() {
            Pull::Record(record) => Some(Ok(record)),
            Pull::End => None,
            Pull::Failed(_) if self.error_yielded => None,
            Pull::Failed(e) => {
                self.error_yielded = true;
                Some(Err(e))
            }
        }
    }
}

impl FusedIterator for RecordCursor {}

impl fmt::Debug for RecordCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordCursor")
            .field("state", &self.state)
            .field("records_read", &self.records_read)
            .field("headers", &self.headers())
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Flexible, ResultType};
    use crate::source::Input;
    use std::io::{self, Read};

    fn cursor(input: &[u8], config: ParserConfig) -> RecordCursor {
        let source = ByteSource::open(Input::from(input)).unwrap();
        RecordCursor::new(source, &config)
    }

    fn array_config() -> ParserConfig {
        ParserConfig::default().result_type(ResultType::Array)
    }

    // ==================== State machine tests ====================

    #[test]
    fn test_lifecycle_to_exhausted() {
        let mut cursor = cursor(b"a\n1\n", array_config());
        assert_eq!(cursor.state(), CursorState::Created);
        assert!(cursor.headers().is_none());

        assert!(matches!(cursor.pull(), Pull::Record(_)));
        assert_eq!(cursor.state(), CursorState::Active);
        assert_eq!(cursor.headers().unwrap().to_vec(), vec!["a"]);

        assert!(cursor.pull().is_end());
        assert_eq!(cursor.state(), CursorState::Exhausted);
        assert!(cursor.reader.is_none());
        assert!(cursor.pull().is_end());
        assert_eq!(cursor.records_read(), 1);
    }

    #[test]
    fn test_lifecycle_to_failed() {
        let mut cursor = cursor(b"a,b\n1,2\n3\n4,5\n", array_config());
        assert!(matches!(cursor.pull(), Pull::Record(_)));

        let first = cursor.pull();
        assert!(matches!(
            first,
            Pull::Failed(CsvError::RecordWidth { record: 3, .. })
        ));
        assert_eq!(cursor.state(), CursorState::Failed);
        assert!(cursor.reader.is_none());

        // The terminal condition repeats; the row after it is never read.
        let again = cursor.pull().into_result().unwrap().unwrap_err();
        assert_eq!(again.to_string(), cursor.error().unwrap().to_string());
        assert_eq!(cursor.records_read(), 1);
        assert!(cursor.error().is_some());
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut cursor = cursor(b"a\n1\n2\n", array_config());
        assert!(matches!(cursor.pull(), Pull::Record(_)));
        cursor.close();
        assert_eq!(cursor.state(), CursorState::Closed);
        cursor.close();
        assert_eq!(cursor.state(), CursorState::Closed);
        assert!(cursor.pull().is_end());
    }

    #[test]
    fn test_close_before_first_pull() {
        let mut cursor = cursor(b"a\n1\n", array_config());
        cursor.close();
        assert!(cursor.pull().is_end());
        assert!(cursor.headers().is_none());
    }

    #[test]
    fn test_close_after_failure_keeps_error() {
        let mut cursor = cursor(b"a,b\n1\n", array_config());
        assert!(matches!(cursor.pull(), Pull::Failed(_)));
        cursor.close();
        assert!(matches!(cursor.pull(), Pull::Failed(CsvError::RecordWidth { .. })));
    }

    #[test]
    fn test_pull_conversions() {
        let mut cursor = cursor(b"a\n1\n", array_config());
        let record = cursor.pull().into_record().unwrap();
        assert_eq!(record.at(0), Some(Some("1")));
        assert!(cursor.pull().into_record().is_none());
        assert!(cursor.pull().into_result().is_none());

        let mut failing = RecordCursor::new(
            ByteSource::open(Input::from(&b"a,b\n1\n"[..])).unwrap(),
            &array_config(),
        );
        let failed = failing.pull();
        assert!(!failed.is_end());
        assert!(failed.clone().into_record().is_none());
        assert!(matches!(failed.into_result(), Some(Err(CsvError::RecordWidth { .. }))));
    }

    #[test]
    fn test_terminal_states() {
        assert!(!CursorState::Created.is_terminal());
        assert!(!CursorState::Active.is_terminal());
        assert!(CursorState::Exhausted.is_terminal());
        assert!(CursorState::Failed.is_terminal());
        assert!(CursorState::Closed.is_terminal());
    }

    // ==================== Iterator tests ====================

    #[test]
    fn test_iterator_yields_error_once() {
        let mut cursor = cursor(b"a,b\n1,2\n3\n", array_config());
        assert!(cursor.next().unwrap().is_ok());
        assert!(cursor.next().unwrap().is_err());
        assert!(cursor.next().is_none());
        assert!(cursor.next().is_none());
        // Pull still reports the cause.
        assert!(matches!(cursor.pull(), Pull::Failed(_)));
    }

    #[test]
    fn test_iterator_collects_records() {
        let records: Vec<Record> = cursor(b"id,name\n1,John\n2,Jane\n", ParserConfig::default())
            .collect::<CsvResult<_>>()
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].get("name"), Some(Some("Jane")));
    }

    #[test]
    fn test_header_only_input() {
        let mut cursor = cursor(b"id,name\n", ParserConfig::default());
        assert!(cursor.pull().is_end());
        assert_eq!(cursor.headers().unwrap().len(), 2);
    }

    #[test]
    fn test_empty_input() {
        let mut cursor = cursor(b"", ParserConfig::default());
        assert!(cursor.next().is_none());
        assert!(cursor.headers().is_none());
        assert_eq!(cursor.state(), CursorState::Exhausted);
    }

    #[test]
    fn test_flexible_continues_past_short_row() {
        let config = array_config().flexible(Flexible::PadNil);
        let rows: Vec<Record> = cursor(b"a,b\n1\n2,3\n", config)
            .collect::<CsvResult<_>>()
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].at(1), Some(None));
    }

    // ==================== Error reporting tests ====================

    #[test]
    fn test_record_and_line_numbers_in_errors() {
        let mut cursor = cursor(b"a,b\n\n\"1\n\",2\n3\n", array_config());
        assert!(cursor.next().unwrap().is_ok());
        let err = cursor.next().unwrap().unwrap_err();
        assert_eq!(err.record(), Some(3));
        assert_eq!(err.line(), Some(5));
    }

    struct FailAfter {
        data: io::Cursor<Vec<u8>>,
    }

    impl Read for FailAfter {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.data.read(buf)? {
                0 => Err(io::Error::new(io::ErrorKind::BrokenPipe, "stream closed")),
                n => Ok(n),
            }
        }
    }

    #[test]
    fn test_io_error_after_records() {
        let source = ByteSource::open(Input::reader(FailAfter {
            data: io::Cursor::new(b"a\n1\n2\n".to_vec()),
        }))
        .unwrap();
        let mut cursor = RecordCursor::new(source, &array_config());
        let mut ok = 0;
        let mut errors = Vec::new();
        for item in cursor.by_ref() {
            match item {
                Ok(_) => ok += 1,
                Err(e) => errors.push(e),
            }
        }
        assert_eq!(ok, 2);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].is_io());
        assert_eq!(cursor.state(), CursorState::Failed);
    }

    #[test]
    fn test_cursor_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<RecordCursor>();
    }

    #[test]
    fn test_debug_output() {
        let cursor = cursor(b"a\n", ParserConfig::default());
        let debug = format!("{cursor:?}");
        assert!(debug.contains("RecordCursor"));
        assert!(debug.contains("Created"));
    }
}
