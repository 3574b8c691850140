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

//! Parser configuration.
//!
//! Two layers live here:
//!
//! - [`ParserOptions`]: what a caller hands over. Every field is optional and
//!   an explicit `None` is the same as leaving the option out.
//! - [`ParserConfig`]: the resolved, typed configuration a parse session runs
//!   with. It is immutable once the session starts.
//!
//! # Examples
//!
//! ```rust
//! use osv_core::{ParserConfig, ParserOptions, ResultType, Trim};
//!
//! let options = ParserOptions {
//!     col_sep: Some("\t".to_string()),
//!     result_type: Some("array".to_string()),
//!     trim: Some("fields".to_string()),
//!     ..Default::default()
//! };
//! let config = options.resolve().unwrap();
//! assert_eq!(config.delimiter, b'\t');
//! assert_eq!(config.result_type, ResultType::Array);
//! assert_eq!(config.trim, Trim::Fields);
//!
//! // Explicit `None` values fall back to the defaults.
//! assert_eq!(ParserOptions::default().resolve().unwrap(), ParserConfig::default());
//! ```

use crate::error::{CsvError, CsvResult};
use std::str::FromStr;

/// Default chunk size used when refilling the read buffer (16 KiB).
pub const DEFAULT_CHUNK_SIZE: usize = 16 * 1024;

/// Output shape of each record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResultType {
    /// Ordered sequence of values, aligned with the header columns.
    Array,
    /// Mapping from column name to value.
    #[default]
    Map,
}

impl FromStr for ResultType {
    type Err = CsvError;

    fn from_str(s: &str) -> CsvResult<Self> {
        match s {
            "array" => Ok(Self::Array),
            "hash" | "map" | "mapping" => Ok(Self::Map),
            other => Err(CsvError::config(format!(
                "invalid result_type '{other}', expected 'hash' or 'array'"
            ))),
        }
    }
}

/// Whitespace trimming scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Trim {
    /// Leave header names and fields untouched.
    #[default]
    None,
    /// Trim header names only.
    Headers,
    /// Trim data fields only.
    Fields,
    /// Trim header names and data fields.
    All,
}

impl Trim {
    /// Whether header names are trimmed.
    #[inline]
    pub fn headers(self) -> bool {
        matches!(self, Self::Headers | Self::All)
    }

    /// Whether data fields are trimmed.
    #[inline]
    pub fn fields(self) -> bool {
        matches!(self, Self::Fields | Self::All)
    }
}

impl FromStr for Trim {
    type Err = CsvError;

    fn from_str(s: &str) -> CsvResult<Self> {
        match s {
            "none" => Ok(Self::None),
            "headers" => Ok(Self::Headers),
            "fields" => Ok(Self::Fields),
            "all" => Ok(Self::All),
            other => Err(CsvError::config(format!(
                "invalid trim '{other}', expected 'all', 'headers', 'fields' or 'none'"
            ))),
        }
    }
}

/// Width reconciliation policy for records narrower than the header.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Flexible {
    /// Any field-count mismatch is fatal.
    #[default]
    Off,
    /// Missing trailing columns become absent values.
    PadNil,
    /// Missing trailing columns are filled with the given value.
    PadDefault(String),
}

impl Flexible {
    /// Whether width mismatches are tolerated.
    #[inline]
    pub fn is_enabled(&self) -> bool {
        !matches!(self, Self::Off)
    }

    /// Value used for a padded column.
    #[inline]
    pub fn pad_value(&self) -> Option<String> {
        match self {
            Self::PadDefault(value) => Some(value.clone()),
            _ => None,
        }
    }
}

/// Resolved configuration of one parse session.
///
/// # Examples
///
/// ## Default Configuration
///
/// ```rust
/// use osv_core::{Flexible, ParserConfig, ResultType, Trim, DEFAULT_CHUNK_SIZE};
///
/// let config = ParserConfig::default();
/// assert!(config.has_headers);
/// assert_eq!(config.delimiter, b',');
/// assert_eq!(config.quote_char, b'"');
/// assert_eq!(config.result_type, ResultType::Map);
/// assert_eq!(config.trim, Trim::None);
/// assert_eq!(config.flexible, Flexible::Off);
/// assert_eq!(config.buffer_size, DEFAULT_CHUNK_SIZE);
/// ```
///
/// ## Builder Style
///
/// ```rust
/// use osv_core::{Flexible, ParserConfig, ResultType};
///
/// let config = ParserConfig::default()
///     .delimiter(b';')
///     .result_type(ResultType::Array)
///     .nil_string("NULL")
///     .flexible(Flexible::PadDefault("n/a".to_string()));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    /// Treat the first record as column names (default: `true`).
    ///
    /// When `false`, positional names `c0`, `c1`, ... are synthesized and the
    /// first record is emitted as data.
    pub has_headers: bool,

    /// Field separator (default: `,`).
    pub delimiter: u8,

    /// Quoting character (default: `"`).
    pub quote_char: u8,

    /// Field value mapped to an absent value (default: none).
    ///
    /// The empty string is a valid sentinel and makes empty fields absent.
    pub nil_string: Option<String>,

    /// Output shape (default: [`ResultType::Map`]).
    pub result_type: ResultType,

    /// Width reconciliation policy (default: [`Flexible::Off`]).
    ///
    /// Padding applies to both output shapes. A short record in
    /// [`ResultType::Array`] output is padded to the header width, never
    /// left short; keep it that way so both shapes agree on width.
    pub flexible: Flexible,

    /// Whitespace trimming scope (default: [`Trim::None`]).
    pub trim: Trim,

    /// Substitute invalid UTF-8 instead of failing (default: `false`).
    pub lossy: bool,

    /// Drop embedded NUL bytes from field content (default: `false`).
    pub ignore_null_bytes: bool,

    /// Bytes requested from the source per buffer fill (default: 16 KiB).
    ///
    /// Only affects read granularity, never the parsed output.
    pub buffer_size: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            has_headers: true,
            delimiter: b',',
            quote_char: b'"',
            nil_string: None,
            result_type: ResultType::Map,
            flexible: Flexible::Off,
            trim: Trim::None,
            lossy: false,
            ignore_null_bytes: false,
            buffer_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl ParserConfig {
    /// Set header mode.
    pub fn has_headers(mut self, has_headers: bool) -> Self {
        self.has_headers = has_headers;
        self
    }

    /// Set the field separator.
    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set the quoting character.
    pub fn quote_char(mut self, quote_char: u8) -> Self {
        self.quote_char = quote_char;
        self
    }

    /// Set the nil sentinel.
    pub fn nil_string(mut self, nil_string: impl Into<String>) -> Self {
        self.nil_string = Some(nil_string.into());
        self
    }

    /// Set the output shape.
    pub fn result_type(mut self, result_type: ResultType) -> Self {
        self.result_type = result_type;
        self
    }

    /// Set the width reconciliation policy.
    pub fn flexible(mut self, flexible: Flexible) -> Self {
        self.flexible = flexible;
        self
    }

    /// Set the trimming scope.
    pub fn trim(mut self, trim: Trim) -> Self {
        self.trim = trim;
        self
    }

    /// Enable or disable lossy decoding.
    pub fn lossy(mut self, lossy: bool) -> Self {
        self.lossy = lossy;
        self
    }

    /// Enable or disable NUL byte stripping.
    pub fn ignore_null_bytes(mut self, ignore: bool) -> Self {
        self.ignore_null_bytes = ignore;
        self
    }

    /// Set the read chunk size.
    pub fn buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    /// Check that the options can be used together.
    ///
    /// # Errors
    ///
    /// Returns [`CsvError::Config`] when the delimiter equals the quote
    /// character, when either is a line terminator, or when `buffer_size`
    /// is zero.
    pub fn validate(&self) -> CsvResult<()> {
        if self.delimiter == self.quote_char {
            return Err(CsvError::config(format!(
                "delimiter and quote_char must differ (both {:?})",
                self.delimiter as char
            )));
        }
        for (name, byte) in [("delimiter", self.delimiter), ("quote_char", self.quote_char)] {
            if byte == b'\n' || byte == b'\r' {
                return Err(CsvError::config(format!(
                    "{name} cannot be a line terminator"
                )));
            }
        }
        if self.buffer_size == 0 {
            return Err(CsvError::config("buffer_size must be greater than zero"));
        }
        Ok(())
    }
}

/// Caller-supplied options, as a host binding would pass them.
///
/// Every field is optional. `None` means "use the default", so an explicitly
/// absent value is never an error. Call [`resolve`](Self::resolve) to obtain a
/// validated [`ParserConfig`].
///
/// With the `serde` feature enabled this type can be deserialized from any
/// serde format; unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct ParserOptions {
    /// See [`ParserConfig::has_headers`].
    pub has_headers: Option<bool>,
    /// Field separator, exactly one byte.
    pub col_sep: Option<String>,
    /// Quoting character, exactly one byte.
    pub quote_char: Option<String>,
    /// See [`ParserConfig::nil_string`].
    pub nil_string: Option<String>,
    /// `"hash"` (or `"map"`, `"mapping"`) or `"array"`.
    pub result_type: Option<String>,
    /// Tolerate short records.
    pub flexible: Option<bool>,
    /// Fill value for padded columns; only used when `flexible` is set.
    pub flexible_default: Option<String>,
    /// `"none"`, `"headers"`, `"fields"` or `"all"`.
    pub trim: Option<String>,
    /// See [`ParserConfig::lossy`].
    pub lossy: Option<bool>,
    /// See [`ParserConfig::ignore_null_bytes`].
    pub ignore_null_bytes: Option<bool>,
    /// See [`ParserConfig::buffer_size`].
    pub buffer_size: Option<usize>,
}

impl ParserOptions {
    /// Resolve into a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CsvError::Config`] for single-byte options that are not
    /// exactly one byte long, unknown `result_type` / `trim` names, and any
    /// combination rejected by [`ParserConfig::validate`].
    pub fn resolve(&self) -> CsvResult<ParserConfig> {
        let defaults = ParserConfig::default();

        let flexible = if self.flexible.unwrap_or(false) {
            match &self.flexible_default {
                Some(value) => Flexible::PadDefault(value.clone()),
                None => Flexible::PadNil,
            }
        } else {
            Flexible::Off
        };

        let config = ParserConfig {
            has_headers: self.has_headers.unwrap_or(defaults.has_headers),
            delimiter: single_byte("col_sep", self.col_sep.as_deref())?
                .unwrap_or(defaults.delimiter),
            quote_char: single_byte("quote_char", self.quote_char.as_deref())?
                .unwrap_or(defaults.quote_char),
            nil_string: self.nil_string.clone(),
            result_type: self
                .result_type
                .as_deref()
                .map(str::parse::<ResultType>)
                .transpose()?
                .unwrap_or(defaults.result_type),
            flexible,
            trim: self
                .trim
                .as_deref()
                .map(str::parse::<Trim>)
                .transpose()?
                .unwrap_or(defaults.trim),
            lossy: self.lossy.unwrap_or(defaults.lossy),
            ignore_null_bytes: self.ignore_null_bytes.unwrap_or(defaults.ignore_null_bytes),
            buffer_size: self.buffer_size.unwrap_or(defaults.buffer_size),
        };
        config.validate()?;
        Ok(config)
    }
}

fn single_byte(name: &str, value: Option<&str>) -> CsvResult<Option<u8>> {
    match value {
        None => Ok(None),
        Some(s) if s.len() == 1 => Ok(Some(s.as_bytes()[0])),
        Some(s) => Err(CsvError::config(format!(
            "{name} must be a single byte, got {s:?}"
        ))),
    }
}
