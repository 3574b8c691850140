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

//! Generators for large and wide inputs.

/// Header `c0..cN` plus `rows` rows of `width` columns.
///
/// Cell `(r, c)` holds `r_c`.
pub fn wide(width: usize, rows: usize) -> String {
    let mut out = String::new();
    push_row(&mut out, (0..width).map(|c| format!("c{c}")));
    for r in 0..rows {
        push_row(&mut out, (0..width).map(|c| format!("{r}_{c}")));
    }
    out
}

/// Header `id,name,value` plus `rows` numbered rows.
pub fn many_rows(rows: usize) -> String {
    let mut out = String::from("id,name,value\n");
    for i in 0..rows {
        out.push_str(&format!("{i},name{i},{}\n", i * 7));
    }
    out
}

/// Header `id,data` and one row whose `data` field is `len` bytes of `fill`.
///
/// When `quoted` is set the field is wrapped in quotes.
pub fn huge_field(len: usize, fill: char, quoted: bool) -> String {
    let field: String = std::iter::repeat(fill).take(len).collect();
    if quoted {
        format!("id,data\n1,\"{field}\"\n")
    } else {
        format!("id,data\n1,{field}\n")
    }
}

/// A field of exactly `len` bytes with an embedded newline and escaped quote
/// near each end, for boundary tests.
pub fn tricky_field(len: usize) -> String {
    assert!(len >= 8, "tricky field needs at least 8 bytes");
    let mut field = String::with_capacity(len);
    field.push_str("a\"b\n");
    field.extend(std::iter::repeat('x').take(len - 8));
    field.push_str("\nc\"d");
    field
}

/// Quote `field` for CSV output, doubling embedded quotes.
pub fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

fn push_row(out: &mut String, cells: impl Iterator<Item = String>) {
    let cells: Vec<String> = cells.collect();
    out.push_str(&cells.join(","));
    out.push('\n');
}
