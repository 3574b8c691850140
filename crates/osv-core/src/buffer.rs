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

//! Chunked read buffer.
//!
//! [`ChunkedReader`] owns one growable buffer per cursor and refills it from
//! its source in fixed-size chunks. Consumers look at the unconsumed window
//! with [`available`](ChunkedReader::available), mark bytes as used with
//! [`consume`](ChunkedReader::consume) and call [`fill`](ChunkedReader::fill)
//! when they need more.
//!
//! Unconsumed bytes always survive a refill: they are moved to the front of
//! the buffer and the new chunk is appended after them. The buffer grows
//! whenever there is not enough room left for a full chunk, so a consumer
//! that keeps a partial field, quote or multi-byte character pending never
//! loses it, wherever the chunk edge happens to fall.

use std::io::{self, Read};
use tracing::trace;

/// Growable buffer refilled from a byte source in fixed-size chunks.
///
/// # Examples
///
/// ```rust
/// use osv_core::ChunkedReader;
/// use std::io::Cursor;
///
/// let mut reader = ChunkedReader::new(Cursor::new(b"hello world".to_vec()), 4);
/// assert!(reader.fill().unwrap());
/// assert_eq!(reader.available(), b"hell");
///
/// reader.consume(2);
/// assert!(reader.fill().unwrap());
/// assert_eq!(reader.available(), b"llo wo");
/// ```
#[derive(Debug)]
pub struct ChunkedReader<R> {
    source: R,
    buf: Vec<u8>,
    /// First unconsumed byte.
    start: usize,
    /// End of filled data.
    end: usize,
    chunk_size: usize,
    eof: bool,
}

impl<R: Read> ChunkedReader<R> {
    /// Create a reader that requests `chunk_size` bytes per fill.
    ///
    /// A `chunk_size` of zero is treated as one byte.
    pub fn new(source: R, chunk_size: usize) -> Self {
        Self {
            source,
            buf: Vec::new(),
            start: 0,
            end: 0,
            chunk_size: chunk_size.max(1),
            eof: false,
        }
    }

    /// Unconsumed bytes.
    #[inline]
    pub fn available(&self) -> &[u8] {
        &self.buf[self.start..self.end]
    }

    /// Mark the first `n` available bytes as consumed.
    #[inline]
    pub fn consume(&mut self, n: usize) {
        debug_assert!(n <= self.end - self.start);
        self.start = (self.start + n).min(self.end);
    }

    /// Append one chunk from the source.
    ///
    /// Returns `Ok(false)` once the source is exhausted. After that every call
    /// returns `Ok(false)` without touching the source again.
    ///
    /// # Errors
    ///
    /// Propagates read errors from the source. `Interrupted` reads are retried.
    pub fn fill(&mut self) -> io::Result<bool> {
        if self.eof {
            return Ok(false);
        }

        if self.start == self.end {
            self.start = 0;
            self.end = 0;
        } else if self.start > 0 && self.buf.len() - self.end < self.chunk_size {
            self.buf.copy_within(self.start..self.end, 0);
            self.end -= self.start;
            self.start = 0;
        }

        let wanted = self.end + self.chunk_size;
        if self.buf.len() < wanted {
            trace!(from = self.buf.len(), to = wanted, "growing read buffer");
            self.buf.resize(wanted, 0);
        }

        loop {
            match self.source.read(&mut self.buf[self.end..wanted]) {
                Ok(0) => {
                    self.eof = true;
                    return Ok(false);
                }
                Ok(n) => {
                    trace!(bytes = n, pending = self.end - self.start, "filled read buffer");
                    self.end += n;
                    return Ok(true);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    /// Whether the source is exhausted and every byte consumed.
    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.eof && self.start == self.end
    }

    /// Current buffer capacity in bytes.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Mutable access to the source.
    #[inline]
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.source
    }

    /// Free the buffer. Later fills report end of input.
    pub fn release(&mut self) {
        self.buf = Vec::new();
        self.start = 0;
        self.end = 0;
        self.eof = true;
    }
}
