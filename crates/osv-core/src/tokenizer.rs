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

//! Byte-level CSV tokenizer.
//!
//! The [`Tokenizer`] is an incremental state machine: it consumes whatever
//! bytes are available, remembers where it stopped, and resumes on the next
//! chunk. Field bytes are copied into a [`RawRecord`] as they are recognized,
//! so a field, a quoted span, an escaped quote or a CRLF pair split across a
//! chunk edge tokenizes exactly as it would in one piece.
//!
//! # Dialect
//!
//! - A field is quoted only when the quote byte is its very first byte. A
//!   quote anywhere else is a literal character.
//! - Inside a quoted field, a doubled quote is a literal quote. A closing
//!   quote followed by anything other than a delimiter, a line terminator or
//!   another quote becomes a literal quote and the field stays quoted.
//! - Line terminators inside quotes are content.
//! - Records end at `\n`, `\r\n` or a bare `\r`.
//! - Blank lines produce no record.
//! - A quoted field still open at end of input is closed there.

use crate::buffer::ChunkedReader;
use memchr::{memchr, memchr3};
use std::io::{self, Read};

/// Field boundaries of one logical row, before decoding.
///
/// Fields are stored back to back in one byte buffer; `ends` holds the end
/// offset of each field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    data: Vec<u8>,
    ends: Vec<usize>,
    line: u64,
}

impl RawRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of fields.
    #[inline]
    pub fn len(&self) -> usize {
        self.ends.len()
    }

    /// Whether the record has no fields.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ends.is_empty()
    }

    /// Line on which the record starts (1-based).
    #[inline]
    pub fn line(&self) -> u64 {
        self.line
    }

    /// Bytes of field `index`.
    pub fn get(&self, index: usize) -> Option<&[u8]> {
        let end = *self.ends.get(index)?;
        let start = if index == 0 { 0 } else { self.ends[index - 1] };
        Some(&self.data[start..end])
    }

    /// Iterate over field bytes.
    pub fn iter(&self) -> impl Iterator<Item = &[u8]> + '_ {
        (0..self.len()).filter_map(move |i| self.get(i))
    }

    fn clear(&mut self) {
        self.data.clear();
        self.ends.clear();
        self.line = 0;
    }

    #[inline]
    fn end_field(&mut self) {
        self.ends.push(self.data.len());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Between records.
    RecordStart,
    /// Between records, right after a `\r`; a following `\n` is swallowed.
    AfterCr,
    /// At the first byte of a field.
    FieldStart,
    UnquotedField,
    QuotedField,
    /// A quote byte seen inside a quoted field.
    QuoteSeen,
    /// The byte source failed; no more records are produced.
    Failed,
}

/// Incremental CSV tokenizer.
///
/// # Examples
///
/// ```rust
/// use osv_core::{ChunkedReader, RawRecord, Tokenizer};
/// use std::io::Cursor;
///
/// let input = b"name,quote\r\nJohn,\"He said \"\"Hi\"\"\"\n";
/// let mut reader = ChunkedReader::new(Cursor::new(input.to_vec()), 4);
/// let mut tokenizer = Tokenizer::new(b',', b'"', false);
/// let mut record = RawRecord::new();
///
/// assert!(tokenizer.read_record(&mut reader, &mut record).unwrap());
/// assert_eq!(record.get(1), Some(&b"quote"[..]));
///
/// assert!(tokenizer.read_record(&mut reader, &mut record).unwrap());
/// assert_eq!(record.get(1), Some(&b"He said \"Hi\""[..]));
///
/// assert!(!tokenizer.read_record(&mut reader, &mut record).unwrap());
/// ```
#[derive(Debug, Clone)]
pub struct Tokenizer {
    delimiter: u8,
    quote: u8,
    ignore_null_bytes: bool,
    state: State,
    /// Line terminators seen so far.
    lines: u64,
}

impl Tokenizer {
    /// Create a tokenizer for the given dialect.
    pub fn new(delimiter: u8, quote: u8, ignore_null_bytes: bool) -> Self {
        Self {
            delimiter,
            quote,
            ignore_null_bytes,
            state: State::RecordStart,
            lines: 0,
        }
    }

    /// Read the next non-blank record into `record`.
    ///
    /// Returns `Ok(false)` at end of input.
    ///
    /// # Errors
    ///
    /// Propagates read errors from the source. After an error the tokenizer
    /// stays failed and reports end of input.
    pub fn read_record<R: Read>(
        &mut self,
        reader: &mut ChunkedReader<R>,
        record: &mut RawRecord,
    ) -> io::Result<bool> {
        record.clear();
        if self.state == State::Failed {
            return Ok(false);
        }
        loop {
            let (consumed, complete) = self.feed(reader.available(), record);
            reader.consume(consumed);
            if complete {
                return Ok(true);
            }
            match reader.fill() {
                Ok(true) => {}
                Ok(false) => return Ok(self.finish(record)),
                Err(e) => {
                    self.state = State::Failed;
                    return Err(e);
                }
            }
        }
    }

    /// Run the state machine over `input`.
    ///
    /// Returns how many bytes were consumed and whether a record was
    /// completed. On completion the record terminator has been consumed.
    fn feed(&mut self, input: &[u8], record: &mut RawRecord) -> (usize, bool) {
        let mut i = 0;
        while i < input.len() {
            let byte = input[i];
            match self.state {
                State::RecordStart | State::AfterCr => {
                    if byte == b'\n' {
                        if self.state == State::RecordStart {
                            self.lines += 1;
                        }
                        self.state = State::RecordStart;
                        i += 1;
                    } else if byte == b'\r' {
                        self.lines += 1;
                        self.state = State::AfterCr;
                        i += 1;
                    } else {
                        record.line = self.lines + 1;
                        self.state = State::FieldStart;
                    }
                }
                State::FieldStart => {
                    if byte == self.quote {
                        self.state = State::QuotedField;
                        i += 1;
                    } else {
                        self.state = State::UnquotedField;
                    }
                }
                State::UnquotedField => {
                    let rest = &input[i..];
                    match memchr3(self.delimiter, b'\n', b'\r', rest) {
                        None => {
                            self.push(record, rest);
                            i = input.len();
                        }
                        Some(offset) => {
                            self.push(record, &rest[..offset]);
                            record.end_field();
                            i += offset + 1;
                            let terminator = rest[offset];
                            if terminator == self.delimiter {
                                self.state = State::FieldStart;
                            } else {
                                self.end_record(terminator);
                                return (i, true);
                            }
                        }
                    }
                }
                State::QuotedField => {
                    let rest = &input[i..];
                    match memchr(self.quote, rest) {
                        None => {
                            self.push_quoted(record, rest);
                            i = input.len();
                        }
                        Some(offset) => {
                            self.push_quoted(record, &rest[..offset]);
                            self.state = State::QuoteSeen;
                            i += offset + 1;
                        }
                    }
                }
                State::QuoteSeen => {
                    if byte == self.quote {
                        record.data.push(self.quote);
                        self.state = State::QuotedField;
                        i += 1;
                    } else if byte == self.delimiter {
                        record.end_field();
                        self.state = State::FieldStart;
                        i += 1;
                    } else if byte == b'\n' || byte == b'\r' {
                        record.end_field();
                        self.end_record(byte);
                        return (i + 1, true);
                    } else {
                        // Stray closing quote: keep it and stay quoted.
                        record.data.push(self.quote);
                        self.state = State::QuotedField;
                    }
                }
                State::Failed => return (i, false),
            }
        }
        (i, false)
    }

    /// Close the record in progress at end of input.
    fn finish(&mut self, record: &mut RawRecord) -> bool {
        match self.state {
            State::RecordStart | State::AfterCr | State::Failed => false,
            State::FieldStart
            | State::UnquotedField
            | State::QuotedField
            | State::QuoteSeen => {
                record.end_field();
                self.state = State::RecordStart;
                true
            }
        }
    }

    #[inline]
    fn end_record(&mut self, terminator: u8) {
        self.lines += 1;
        self.state = if terminator == b'\r' {
            State::AfterCr
        } else {
            State::RecordStart
        };
    }

    #[inline]
    fn push(&self, record: &mut RawRecord, bytes: &[u8]) {
        if self.ignore_null_bytes && memchr(0, bytes).is_some() {
            record.data.extend(bytes.iter().copied().filter(|&b| b != 0));
        } else {
            record.data.extend_from_slice(bytes);
        }
    }

    #[inline]
    fn push_quoted(&mut self, record: &mut RawRecord, bytes: &[u8]) {
        self.lines += memchr::memchr_iter(b'\n', bytes).count() as u64;
        self.push(record, bytes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn tokenize_with(input: &[u8], chunk: usize, tokenizer: &mut Tokenizer) -> Vec<Vec<String>> {
        let mut reader = ChunkedReader::new(Cursor::new(input.to_vec()), chunk);
        let mut record = RawRecord::new();
        let mut rows = Vec::new();
        while tokenizer.read_record(&mut reader, &mut record).unwrap() {
            rows.push(
                record
                    .iter()
                    .map(|f| String::from_utf8_lossy(f).into_owned())
                    .collect(),
            );
        }
        rows
    }

    fn tokenize(input: &str) -> Vec<Vec<String>> {
        tokenize_with(input.as_bytes(), 16 * 1024, &mut Tokenizer::new(b',', b'"', false))
    }

    fn rows(expected: &[&[&str]]) -> Vec<Vec<String>> {
        expected
            .iter()
            .map(|r| r.iter().map(|f| f.to_string()).collect())
            .collect()
    }

    // ==================== Basic tests ====================

    #[test]
    fn test_simple_rows() {
        assert_eq!(
            tokenize("id,name\n1,John\n"),
            rows(&[&["id", "name"], &["1", "John"]])
        );
    }

    #[test]
    fn test_no_trailing_newline() {
        assert_eq!(tokenize("a,b\n1,2"), rows(&[&["a", "b"], &["1", "2"]]));
    }

    #[test]
    fn test_empty_input() {
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn test_empty_fields() {
        assert_eq!(tokenize(",,\n"), rows(&[&["", "", ""]]));
        assert_eq!(tokenize("a,"), rows(&[&["a", ""]]));
    }

    // ==================== Quoting tests ====================

    #[test]
    fn test_quoted_delimiter() {
        assert_eq!(
            tokenize("1,\"Smith, John\"\n"),
            rows(&[&["1", "Smith, John"]])
        );
    }

    #[test]
    fn test_doubled_quote() {
        assert_eq!(
            tokenize("\"He said \"\"Hi\"\"\"\n"),
            rows(&[&["He said \"Hi\""]])
        );
    }

    #[test]
    fn test_empty_quoted_field() {
        assert_eq!(tokenize("\"\",x\n"), rows(&[&["", "x"]]));
        assert_eq!(tokenize("\"\"\"\"\n"), rows(&[&["\""]]));
    }

    #[test]
    fn test_newlines_inside_quotes() {
        assert_eq!(
            tokenize("1,\"123 Main St.\nApt 4B\r\nNY\"\n2,x\n"),
            rows(&[&["1", "123 Main St.\nApt 4B\r\nNY"], &["2", "x"]])
        );
    }

    #[test]
    fn test_quote_inside_unquoted_field_is_literal() {
        assert_eq!(tokenize("ab\"c\"d,e\n"), rows(&[&["ab\"c\"d", "e"]]));
    }

    #[test]
    fn test_leading_whitespace_prevents_quoting() {
        assert_eq!(
            tokenize("2,  \"  quoted spaces  \"\n"),
            rows(&[&["2", "  \"  quoted spaces  \""]])
        );
    }

    #[test]
    fn test_stray_closing_quote_keeps_field_quoted() {
        assert_eq!(tokenize("\"abc\"def\",x\n"), rows(&[&["abc\"def", "x"]]));
    }

    #[test]
    fn test_unterminated_quote_closed_at_eof() {
        assert_eq!(tokenize("a,\"open\nstill"), rows(&[&["a", "open\nstill"]]));
    }

    #[test]
    fn test_custom_dialect() {
        let mut tokenizer = Tokenizer::new(b'\t', b'\'', false);
        assert_eq!(
            tokenize_with(b"a\t'b\tc'\t\"d\"\n", 64, &mut tokenizer),
            rows(&[&["a", "b\tc", "\"d\""]])
        );
    }

    // ==================== Line ending tests ====================

    #[test]
    fn test_crlf() {
        assert_eq!(tokenize("a,b\r\n1,2\r\n"), rows(&[&["a", "b"], &["1", "2"]]));
    }

    #[test]
    fn test_bare_cr() {
        assert_eq!(tokenize("a,b\r1,2\r"), rows(&[&["a", "b"], &["1", "2"]]));
    }

    #[test]
    fn test_mixed_line_endings() {
        assert_eq!(
            tokenize("id,name\r\n1,John\n2,Jane\r\n3,Jim"),
            rows(&[&["id", "name"], &["1", "John"], &["2", "Jane"], &["3", "Jim"]])
        );
    }

    #[test]
    fn test_quoted_field_followed_by_crlf() {
        assert_eq!(tokenize("\"a\"\r\n\"b\"\r\n"), rows(&[&["a"], &["b"]]));
    }

    // ==================== Blank line tests ====================

    #[test]
    fn test_blank_lines_skipped() {
        assert_eq!(
            tokenize("\n\na\n\n\nb\r\n\r\n\rc\n\n"),
            rows(&[&["a"], &["b"], &["c"]])
        );
    }

    #[test]
    fn test_only_blank_lines() {
        assert!(tokenize("\n\r\n\r\r\n").is_empty());
    }

    #[test]
    fn test_whitespace_line_is_not_blank() {
        assert_eq!(tokenize("a\n  \nb\n"), rows(&[&["a"], &["  "], &["b"]]));
    }

    // ==================== Null byte tests ====================

    #[test]
    fn test_null_bytes_preserved_by_default() {
        assert_eq!(tokenize("Jo\0hn,x\n"), rows(&[&["Jo\0hn", "x"]]));
    }

    #[test]
    fn test_null_bytes_dropped_when_ignored() {
        let mut tokenizer = Tokenizer::new(b',', b'"', true);
        assert_eq!(
            tokenize_with(b"Jo\0hn,\"te\0st\"\n", 64, &mut tokenizer),
            rows(&[&["John", "test"]])
        );
    }

    // ==================== Chunk boundary tests ====================

    #[test]
    fn test_every_chunk_size_gives_same_rows() {
        let input = b"id,\"na,me\"\r\n1,\"a \"\"b\"\" c\"\r\n\r\n2,\"x\ny\"\r3,z";
        let expected = tokenize_with(input, 1024, &mut Tokenizer::new(b',', b'"', false));
        assert_eq!(expected.len(), 4);
        for chunk in 1..input.len() {
            let got = tokenize_with(input, chunk, &mut Tokenizer::new(b',', b'"', false));
            assert_eq!(got, expected, "chunk size {chunk}");
        }
    }

    #[test]
    fn test_multibyte_character_split_across_chunks() {
        let input = "名前,😀\n";
        for chunk in 1..8 {
            let got = tokenize_with(input.as_bytes(), chunk, &mut Tokenizer::new(b',', b'"', false));
            assert_eq!(got, rows(&[&["名前", "😀"]]));
        }
    }

    // ==================== Line number tests ====================

    #[test]
    fn test_record_line_numbers() {
        let input = b"a\n\nb\r\n\"c\nc\"\nd\n";
        let mut reader = ChunkedReader::new(Cursor::new(input.to_vec()), 3);
        let mut tokenizer = Tokenizer::new(b',', b'"', false);
        let mut record = RawRecord::new();
        let mut lines = Vec::new();
        while tokenizer.read_record(&mut reader, &mut record).unwrap() {
            lines.push(record.line());
        }
        assert_eq!(lines, vec![1, 3, 4, 6]);
    }

    // ==================== Failure tests ====================

    struct Broken;

    impl Read for Broken {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "broken pipe"))
        }
    }

    #[test]
    fn test_read_error_fails_tokenizer() {
        let mut reader = ChunkedReader::new(Broken, 8);
        let mut tokenizer = Tokenizer::new(b',', b'"', false);
        let mut record = RawRecord::new();
        assert!(tokenizer.read_record(&mut reader, &mut record).is_err());
        assert!(!tokenizer.read_record(&mut reader, &mut record).unwrap());
    }

    // ==================== RawRecord tests ====================

    #[test]
    fn test_raw_record_accessors() {
        let mut reader = ChunkedReader::new(Cursor::new(b"ab,,c\n".to_vec()), 8);
        let mut tokenizer = Tokenizer::new(b',', b'"', false);
        let mut record = RawRecord::new();
        tokenizer.read_record(&mut reader, &mut record).unwrap();
        assert_eq!(record.len(), 3);
        assert!(!record.is_empty());
        assert_eq!(record.get(0), Some(&b"ab"[..]));
        assert_eq!(record.get(1), Some(&b""[..]));
        assert_eq!(record.get(2), Some(&b"c"[..]));
        assert_eq!(record.get(3), None);
    }
}
