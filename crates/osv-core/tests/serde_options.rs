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

//! Deserializing host options (requires the `serde` feature).

#![cfg(feature = "serde")]

use osv_core::{parse, Flexible, ParserOptions, ResultType, Trim};

#[test]
fn test_options_from_json() {
    let options: ParserOptions = serde_json::from_str(
        r#"{
            "has_headers": true,
            "col_sep": ";",
            "result_type": "array",
            "flexible": true,
            "flexible_default": "?",
            "trim": "fields",
            "nil_string": null
        }"#,
    )
    .unwrap();
    let config = options.resolve().unwrap();
    assert_eq!(config.delimiter, b';');
    assert_eq!(config.result_type, ResultType::Array);
    assert_eq!(config.flexible, Flexible::PadDefault("?".into()));
    assert_eq!(config.trim, Trim::Fields);
    assert_eq!(config.nil_string, None);

    let rows: Vec<_> = parse(&b"a;b\n 1 \n"[..], config)
        .unwrap()
        .map(|r| r.unwrap().into_array().unwrap())
        .collect();
    assert_eq!(rows, vec![vec![Some("1".to_string()), Some("?".to_string())]]);
}

#[test]
fn test_empty_json_object_is_default() {
    let options: ParserOptions = serde_json::from_str("{}").unwrap();
    assert_eq!(options, ParserOptions::default());
}

#[test]
fn test_unknown_option_rejected() {
    let result = serde_json::from_str::<ParserOptions>(r#"{"delimiter": ","}"#);
    assert!(result.is_err());
}
