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

//! Header resolution and record shaping.

use crate::config::{Flexible, ParserConfig, ResultType};
use crate::error::{CsvError, CsvResult};
use crate::record::{HeaderSet, Record};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Turns decoded field lists into [`Record`]s.
///
/// The first accepted row resolves the [`HeaderSet`]: with headers enabled
/// it is consumed as column names, otherwise positional names are
/// synthesized from its width and it is shaped like any other row.
#[derive(Debug, Clone)]
pub struct RecordAssembler {
    result_type: ResultType,
    has_headers: bool,
    trim_headers: bool,
    trim_fields: bool,
    nil_string: Option<String>,
    flexible: Flexible,
    headers: Option<HeaderSet>,
}

impl RecordAssembler {
    /// Create an assembler for one session.
    pub fn new(config: &ParserConfig) -> Self {
        Self {
            result_type: config.result_type,
            has_headers: config.has_headers,
            trim_headers: config.trim.headers(),
            trim_fields: config.trim.fields(),
            nil_string: config.nil_string.clone(),
            flexible: config.flexible.clone(),
            headers: None,
        }
    }

    /// The resolved header set, once the first row has been seen.
    pub fn headers(&self) -> Option<&HeaderSet> {
        self.headers.as_ref()
    }

    /// Shape one decoded row.
    ///
    /// Returns `Ok(None)` for the header row.
    ///
    /// # Errors
    ///
    /// [`CsvError::RecordWidth`] when the row width differs from the header
    /// width and flexible mode is off.
    pub fn accept(
        &mut self,
        fields: Vec<String>,
        record_no: u64,
        line: u64,
    ) -> CsvResult<Option<Record>> {
        let headers = match self.headers {
            Some(ref headers) => headers,
            None if self.has_headers => {
                let trim = self.trim_headers;
                let names = fields
                    .into_iter()
                    .map(|name| if trim { trimmed(name) } else { name });
                let headers = HeaderSet::new(names);
                debug!(columns = headers.len(), "resolved headers");
                self.headers = Some(headers);
                return Ok(None);
            }
            None => {
                let headers = HeaderSet::positional(fields.len());
                debug!(columns = headers.len(), "synthesized positional headers");
                &*self.headers.insert(headers)
            }
        };

        let expected = headers.len();
        let actual = fields.len();
        if actual != expected && !self.flexible.is_enabled() {
            return Err(CsvError::RecordWidth {
                record: record_no,
                line,
                expected,
                actual,
            });
        }

        let mut values: Vec<Option<String>> = fields
            .into_iter()
            .map(|field| {
                let field = if self.trim_fields { trimmed(field) } else { field };
                match self.nil_string {
                    Some(ref nil) if *nil == field => None,
                    _ => Some(field),
                }
            })
            .collect();
        if actual < expected {
            let pad = self.flexible.pad_value();
            values.resize(expected, pad);
        }

        let record = match self.result_type {
            ResultType::Array => Record::Array(values),
            ResultType::Map => {
                let mut map = HashMap::with_capacity(expected);
                for (index, value) in values.into_iter().take(expected).enumerate() {
                    if let Some(name) = headers.shared(index) {
                        map.insert(Arc::clone(name), value);
                    }
                }
                Record::Map(map)
            }
        };
        Ok(Some(record))
    }
}

/// Trim surrounding whitespace, reusing the allocation when nothing changes.
fn trimmed(value: String) -> String {
    let trimmed = value.trim();
    if trimmed.len() == value.len() {
        value
    } else {
        trimmed.to_owned()
    }
}
