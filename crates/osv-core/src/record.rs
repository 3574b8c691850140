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

//! Shaped output records and the header set they are keyed by.

use std::collections::HashMap;
use std::sync::Arc;

/// Ordered column names of one parse session.
///
/// Names are unique by position, not by value. Each name is reference
/// counted so every mapping-shaped record shares the same key allocations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderSet {
    names: Vec<Arc<str>>,
}

impl HeaderSet {
    /// Build a header set from parsed names.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Arc<str>>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Synthesize positional names `c0`, `c1`, ... for `width` columns.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use osv_core::HeaderSet;
    ///
    /// let headers = HeaderSet::positional(3);
    /// assert_eq!(headers.to_vec(), vec!["c0", "c1", "c2"]);
    /// ```
    pub fn positional(width: usize) -> Self {
        Self::new((0..width).map(|i| format!("c{i}")))
    }

    /// Number of columns.
    #[inline]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether there are no columns.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Name of column `index`.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(|name| &**name)
    }

    /// Index of the last column called `name`.
    ///
    /// The last occurrence is the one a mapping-shaped record keeps.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().rposition(|n| &**n == name)
    }

    /// Iterate over column names in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.names.iter().map(|name| &**name)
    }

    /// Copy the names out as owned strings.
    pub fn to_vec(&self) -> Vec<String> {
        self.iter().map(str::to_owned).collect()
    }

    pub(crate) fn shared(&self, index: usize) -> Option<&Arc<str>> {
        self.names.get(index)
    }
}

/// One record as delivered to the caller.
///
/// `None` marks an absent value: a field equal to the nil sentinel, or a
/// column padded in flexible mode without a default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    /// Positional values.
    Array(Vec<Option<String>>),
    /// Values keyed by column name.
    Map(HashMap<Arc<str>, Option<String>>),
}

impl Record {
    /// Number of values.
    pub fn len(&self) -> usize {
        match self {
            Self::Array(values) => values.len(),
            Self::Map(values) => values.len(),
        }
    }

    /// Whether the record holds no values.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Positional values, if array-shaped.
    pub fn as_array(&self) -> Option<&[Option<String>]> {
        match self {
            Self::Array(values) => Some(values),
            Self::Map(_) => None,
        }
    }

    /// Keyed values, if mapping-shaped.
    pub fn as_map(&self) -> Option<&HashMap<Arc<str>, Option<String>>> {
        match self {
            Self::Map(values) => Some(values),
            Self::Array(_) => None,
        }
    }

    /// Value of column `name` in a mapping-shaped record.
    ///
    /// The outer `Option` is `None` when the column does not exist or the
    /// record is array-shaped; the inner one is `None` for an absent value.
    pub fn get(&self, name: &str) -> Option<Option<&str>> {
        self.as_map()?.get(name).map(|value| value.as_deref())
    }

    /// Value at `index` in an array-shaped record.
    pub fn at(&self, index: usize) -> Option<Option<&str>> {
        self.as_array()?.get(index).map(|value| value.as_deref())
    }

    /// Consume into positional values.
    pub fn into_array(self) -> Option<Vec<Option<String>>> {
        match self {
            Self::Array(values) => Some(values),
            Self::Map(_) => None,
        }
    }

    /// Consume into keyed values.
    pub fn into_map(self) -> Option<HashMap<Arc<str>, Option<String>>> {
        match self {
            Self::Map(values) => Some(values),
            Self::Array(_) => None,
        }
    }
}
