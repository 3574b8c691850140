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

//! Error types for the parsing engine.
//!
//! Every fatal condition halts the cursor that produced it and is surfaced
//! at the point it is first observed. Records yielded before the failure
//! stay valid.
//!
//! # Error Categories
//!
//! - **I/O Errors**: opening, reading or decompressing the input
//! - **Encoding Errors**: invalid UTF-8 in strict mode
//! - **Record Width Errors**: field-count mismatch in strict mode
//! - **Config Errors**: invalid option values or combinations
//!
//! # Examples
//!
//! ```rust
//! use osv_core::{parse, CsvError, Input, ParserConfig};
//!
//! let input = Input::from(&b"a,b\n1,2\n3\n"[..]);
//! let mut rows = 0;
//! for record in parse(input, ParserConfig::default()).unwrap() {
//!     match record {
//!         Ok(_) => rows += 1,
//!         Err(CsvError::RecordWidth { expected, actual, .. }) => {
//!             assert_eq!((expected, actual), (2, 1));
//!         }
//!         Err(e) => panic!("unexpected error: {e}"),
//!     }
//! }
//! assert_eq!(rows, 1);
//! ```

use std::io;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur while parsing.
///
/// `CsvError` is `Clone` so a failed cursor can keep reporting the same
/// terminal condition on every later pull. I/O errors are shared behind an
/// [`Arc`] for that reason.
#[derive(Error, Debug, Clone)]
pub enum CsvError {
    /// Opening, reading or decompressing the input failed.
    #[error("IO error: {0}")]
    Io(#[source] Arc<io::Error>),

    /// A field or header name is not valid UTF-8 (strict mode only).
    #[error(
        "invalid utf-8 in record {record} (line {line}), field {field}: \
         valid up to byte {valid_up_to}"
    )]
    Encoding {
        /// 1-based record number (header included).
        record: u64,
        /// Line on which the record starts.
        line: u64,
        /// 0-based field index.
        field: usize,
        /// Length of the valid UTF-8 prefix of the field.
        valid_up_to: usize,
    },

    /// A record's field count does not match the header (strict mode only).
    #[error("record {record} (line {line}) has {actual} fields, expected {expected}")]
    RecordWidth {
        /// 1-based record number (header included).
        record: u64,
        /// Line on which the record starts.
        line: u64,
        /// Column count of the header set.
        expected: usize,
        /// Field count of the offending record.
        actual: usize,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl CsvError {
    /// Create a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Get the line number if available.
    #[inline]
    pub fn line(&self) -> Option<u64> {
        match self {
            Self::Encoding { line, .. } | Self::RecordWidth { line, .. } => Some(*line),
            _ => None,
        }
    }

    /// Get the record number if available.
    #[inline]
    pub fn record(&self) -> Option<u64> {
        match self {
            Self::Encoding { record, .. } | Self::RecordWidth { record, .. } => Some(*record),
            _ => None,
        }
    }

    /// Whether this error came from the byte source rather than the data.
    #[inline]
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}

impl From<io::Error> for CsvError {
    fn from(err: io::Error) -> Self {
        Self::Io(Arc::new(err))
    }
}

/// Result type for parsing operations.
pub type CsvResult<T> = Result<T, CsvError>;
