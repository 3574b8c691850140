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

//! UTF-8 validation of tokenized fields.

use crate::error::{CsvError, CsvResult};
use crate::tokenizer::RawRecord;
use tracing::warn;

/// Turns the byte fields of a [`RawRecord`] into owned strings.
///
/// In strict mode the first malformed field fails the record. In lossy mode
/// malformed sequences become U+FFFD and a warning is logged once per
/// session.
#[derive(Debug, Clone)]
pub struct Decoder {
    lossy: bool,
    warned: bool,
}

impl Decoder {
    /// Create a decoder.
    pub fn new(lossy: bool) -> Self {
        Self {
            lossy,
            warned: false,
        }
    }

    /// Whether malformed input is substituted instead of rejected.
    #[inline]
    pub fn is_lossy(&self) -> bool {
        self.lossy
    }

    /// Decode every field of `record`.
    ///
    /// `record_no` is the 1-based number of the record, used for error
    /// reporting.
    pub fn decode_record(&mut self, record: &RawRecord, record_no: u64) -> CsvResult<Vec<String>> {
        let mut fields = Vec::with_capacity(record.len());
        for (index, bytes) in record.iter().enumerate() {
            fields.push(self.decode_field(bytes, record, record_no, index)?);
        }
        Ok(fields)
    }

    fn decode_field(
        &mut self,
        bytes: &[u8],
        record: &RawRecord,
        record_no: u64,
        field: usize,
    ) -> CsvResult<String> {
        match std::str::from_utf8(bytes) {
            Ok(text) => Ok(text.to_owned()),
            Err(_) if self.lossy => {
                if !self.warned {
                    warn!(
                        record = record_no,
                        line = record.line(),
                        field,
                        "invalid utf-8 replaced with U+FFFD"
                    );
                    self.warned = true;
                }
                Ok(String::from_utf8_lossy(bytes).into_owned())
            }
            Err(e) => Err(CsvError::Encoding {
                record: record_no,
                line: record.line(),
                field,
                valid_up_to: e.valid_up_to(),
            }),
        }
    }
}
