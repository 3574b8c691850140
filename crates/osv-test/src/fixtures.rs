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

//! Canonical CSV documents.
//!
//! Each constant comes with the rows it parses to where that is not obvious.

/// Three people with a header row.
///
/// Parses to `{id: 1, name: John, age: 25}`, `{id: 2, name: Jane, age: 30}`,
/// `{id: 3, name: Jim, age: 35}`.
pub const BASIC: &str = "id,name,age\n1,John,25\n2,Jane,30\n3,Jim,35\n";

/// [`BASIC`] as rows, header first.
pub fn basic_rows() -> Vec<Vec<&'static str>> {
    vec![
        vec!["id", "name", "age"],
        vec!["1", "John", "25"],
        vec!["2", "Jane", "30"],
        vec!["3", "Jim", "35"],
    ]
}

/// [`BASIC`] with a short fourth row (`4,oops`).
pub const SHORT_ROW: &str = "id,name,age\n1,John,25\n2,Jane,30\n3,Jim,35\n4,oops\n";

/// [`BASIC`] with blank lines before, between and after the rows.
pub const BLANK_LINES: &str = "\nid,name,age\n\n1,John,25\n\n\n2,Jane,30\r\n\r\n3,Jim,35\n\n";

/// [`BASIC`] with CRLF, LF and bare CR endings mixed.
pub const MIXED_LINE_ENDINGS: &str = "id,name,age\r\n1,John,25\n2,Jane,30\r3,Jim,35\r\n";

/// Quoted delimiters, escaped quotes and embedded newlines.
pub const QUOTED: &str = concat!(
    "id,name,note\n",
    "1,\"Smith, John\",\"He said \"\"Hi\"\"\"\n",
    "2,\"Doe, Jane\",\"123 Main St.\nApt 4B\"\n",
);

/// Tab-separated version of [`BASIC`].
pub const TSV: &str = "id\tname\tage\n1\tJohn\t25\n2\tJane\t30\n3\tJim\t35\n";

/// Header `id,name,age` with one row containing the byte `0xFF`.
pub const INVALID_UTF8: &[u8] = b"id,name,age\n1,Jo\xffhn,25\n2,Jane,30\n";

/// [`BASIC`] preceded by a UTF-8 byte-order mark.
pub fn with_bom() -> Vec<u8> {
    let mut bytes = vec![0xEF, 0xBB, 0xBF];
    bytes.extend_from_slice(BASIC.as_bytes());
    bytes
}

/// Non-ASCII headers and values.
pub const UNICODE: &str = "名前,都市\n太郎,東京\nJosé,São Paulo\n";

/// Whitespace around headers and values, plus a quoted value with spaces.
pub const PADDED: &str = " id , name \n 1 , John \n2,  \"  quoted spaces  \"\n";
