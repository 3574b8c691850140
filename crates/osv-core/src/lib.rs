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

//! Streaming CSV/TSV Parsing Engine
//!
//! This crate turns a byte stream into a lazy sequence of records. Input is
//! read in fixed-size chunks and shaped one record at a time, so memory use
//! is bounded by the widest record rather than by the file.
//!
//! # Features
//!
//! - **Any Byte Source**: files, in-memory buffers, or any `Read + Send`
//! - **Transparent Gzip**: detected by magic bytes, multi-member streams included
//! - **BOM Handling**: a leading UTF-8 byte-order mark is dropped
//! - **Permissive Quoting**: embedded delimiters and newlines, doubled quotes,
//!   CR, LF and CRLF record endings, blank lines skipped
//! - **Encoding Safety**: strict UTF-8 validation or lossy substitution
//! - **Record Shaping**: positional arrays or header-keyed maps, with trimming,
//!   nil sentinels and flexible-width padding
//! - **Isolated Cursors**: every iteration owns its buffer and handle, so
//!   cursors can run on separate threads
//!
//! # Pull Style
//!
//! ```rust
//! use osv_core::{parse, ParserConfig};
//!
//! let csv = "id,name,age\n1,John,25\n2,Jane,30\n";
//! let mut names = Vec::new();
//! for record in parse(csv.as_bytes(), ParserConfig::default()).unwrap() {
//!     let record = record.unwrap();
//!     names.push(record.get("name").flatten().unwrap().to_string());
//! }
//! assert_eq!(names, vec!["John", "Jane"]);
//! ```
//!
//! # Push Style
//!
//! ```rust
//! use osv_core::{for_each, ParserConfig, ResultType};
//! use std::ops::ControlFlow;
//!
//! let config = ParserConfig::default()
//!     .has_headers(false)
//!     .result_type(ResultType::Array);
//!
//! let mut first = None;
//! let delivered = for_each(&b"a,b\n1,2\n3,4\n"[..], config, |record| {
//!     first = record.into_array();
//!     ControlFlow::Break(())
//! })
//! .unwrap();
//! assert_eq!(delivered, 1);
//! assert_eq!(first, Some(vec![Some("a".to_string()), Some("b".to_string())]));
//! ```
//!
//! # Host Options
//!
//! Loosely typed options, as a scripting host would pass them, resolve to a
//! validated [`ParserConfig`]:
//!
//! ```rust
//! use osv_core::{ParserOptions, ResultType, Trim};
//!
//! let options = ParserOptions {
//!     col_sep: Some("\t".into()),
//!     result_type: Some("array".into()),
//!     trim: Some("all".into()),
//!     ..Default::default()
//! };
//! let config = options.resolve().unwrap();
//! assert_eq!(config.delimiter, b'\t');
//! assert_eq!(config.result_type, ResultType::Array);
//! assert_eq!(config.trim, Trim::All);
//! ```

mod assembler;
mod buffer;
mod config;
mod cursor;
mod error;
mod record;
mod source;
mod tokenizer;
mod validate;

pub use assembler::RecordAssembler;
pub use buffer::ChunkedReader;
pub use config::{Flexible, ParserConfig, ParserOptions, ResultType, Trim, DEFAULT_CHUNK_SIZE};
pub use cursor::{CursorState, Pull, RecordCursor};
pub use error::{CsvError, CsvResult};
pub use record::{HeaderSet, Record};
pub use source::{ByteSource, Input};
pub use tokenizer::{RawRecord, Tokenizer};
pub use validate::Decoder;

use std::ops::ControlFlow;

/// Start a pull-style parse.
///
/// The configuration is validated and a path is opened before returning.
/// Compression and BOM detection and header resolution happen on the first
/// pull.
///
/// # Errors
///
/// - [`CsvError::Config`] if the configuration is invalid
/// - [`CsvError::Io`] if a path cannot be opened
pub fn parse(input: impl Into<Input>, config: ParserConfig) -> CsvResult<RecordCursor> {
    config.validate()?;
    let source = ByteSource::open(input.into())?;
    Ok(RecordCursor::new(source, &config))
}

/// Parse `input`, handing each record to `handler`.
///
/// Stops early when the handler returns [`ControlFlow::Break`]. Returns the
/// number of records handed over.
///
/// # Errors
///
/// Any error [`parse`] returns, or the first fatal error met while reading.
/// Records delivered before the error stay delivered.
pub fn for_each<F>(input: impl Into<Input>, config: ParserConfig, mut handler: F) -> CsvResult<u64>
where
    F: FnMut(Record) -> ControlFlow<()>,
{
    let mut cursor = parse(input, config)?;
    let mut delivered = 0;
    for record in cursor.by_ref() {
        let record = record?;
        delivered += 1;
        if handler(record).is_break() {
            break;
        }
    }
    cursor.close();
    Ok(delivered)
}
