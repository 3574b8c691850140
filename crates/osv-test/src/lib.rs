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

//! Shared test fixtures and utilities for the OSV parsing engine.
//!
//! # Features
//!
//! - **Canonical Documents**: small CSV inputs with known parses
//! - **Compression Helpers**: gzip and multi-member gzip encoders
//! - **Temp Files**: write fixtures to disk for path-based tests
//! - **Generators**: wide rows, huge fields and many-row documents
//!
//! # Quick Start
//!
//! ```rust
//! use osv_test::{fixtures, gzip, write_temp};
//!
//! let csv = fixtures::BASIC;
//! let compressed = gzip(csv.as_bytes());
//! assert_eq!(&compressed[..2], &[0x1f, 0x8b]);
//!
//! let file = write_temp(csv.as_bytes(), ".csv");
//! assert!(file.path().exists());
//! ```

pub mod fixtures;
pub mod generators;

mod files;

pub use files::{gzip, gzip_members, write_temp, write_temp_gzip};
