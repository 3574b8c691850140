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

//! Byte sources.
//!
//! A [`ByteSource`] turns an [`Input`] into a plain byte stream: gzip input is
//! detected by its magic bytes and decoded transparently, and a leading UTF-8
//! byte-order mark is discarded. Both checks happen on the first read, so
//! opening a source never touches its content.

use crate::error::CsvResult;
use flate2::read::MultiGzDecoder;
use std::fmt;
use std::fs::File;
use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Gzip member header magic (ID1, ID2).
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// UTF-8 encoded byte-order mark.
const UTF8_BOM: [u8; 3] = [0xef, 0xbb, 0xbf];

/// Input of a parse session.
///
/// In-memory input is always an owned copy: the engine never keeps a borrowed
/// view into caller memory across pulls.
///
/// # Examples
///
/// ```rust
/// use osv_core::Input;
/// use std::path::Path;
///
/// let from_path = Input::from(Path::new("data.csv"));
/// let from_bytes = Input::from(&b"id,name\n1,Alice\n"[..]);
/// let from_reader = Input::reader(std::io::empty());
/// # let _ = (from_path, from_bytes, from_reader);
/// ```
pub enum Input {
    /// A file on disk, opened when the cursor is created.
    Path(PathBuf),
    /// An in-memory buffer.
    Bytes(Vec<u8>),
    /// Any readable byte stream, consumed synchronously by the cursor.
    Reader(Box<dyn Read + Send>),
}

impl Input {
    /// Wrap a file path.
    pub fn path(path: impl Into<PathBuf>) -> Self {
        Self::Path(path.into())
    }

    /// Copy an in-memory buffer.
    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::Bytes(bytes.into())
    }

    /// Wrap a readable stream.
    pub fn reader(reader: impl Read + Send + 'static) -> Self {
        Self::Reader(Box::new(reader))
    }
}

impl fmt::Debug for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => f.debug_tuple("Path").field(path).finish(),
            Self::Bytes(bytes) => write!(f, "Bytes({} bytes)", bytes.len()),
            Self::Reader(_) => f.write_str("Reader(..)"),
        }
    }
}

impl From<PathBuf> for Input {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<&Path> for Input {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

impl From<Vec<u8>> for Input {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<&[u8]> for Input {
    fn from(bytes: &[u8]) -> Self {
        Self::Bytes(bytes.to_vec())
    }
}

/// Byte stream with transparent gzip decoding and BOM removal.
pub struct ByteSource {
    reader: Option<Box<dyn Read + Send>>,
    /// Bytes read during detection and not yet handed out.
    pending: Cursor<Vec<u8>>,
    detected: bool,
}

impl ByteSource {
    /// Open an input.
    ///
    /// # Errors
    ///
    /// Returns [`CsvError::Io`](crate::CsvError::Io) if a path cannot be opened.
    pub fn open(input: Input) -> CsvResult<Self> {
        let reader: Box<dyn Read + Send> = match input {
            Input::Path(path) => {
                debug!(path = %path.display(), "opening file source");
                Box::new(File::open(&path)?)
            }
            Input::Bytes(bytes) => {
                debug!(len = bytes.len(), "opening in-memory source");
                Box::new(Cursor::new(bytes))
            }
            Input::Reader(reader) => {
                debug!("opening reader source");
                reader
            }
        };
        Ok(Self::from_reader(reader))
    }

    /// Wrap an already opened stream.
    pub fn from_reader(reader: Box<dyn Read + Send>) -> Self {
        Self {
            reader: Some(reader),
            pending: Cursor::new(Vec::new()),
            detected: false,
        }
    }

    /// Release the underlying handle. Later reads report end of input.
    pub fn close(&mut self) {
        self.reader = None;
        self.pending = Cursor::new(Vec::new());
        self.detected = true;
    }

    /// Whether the underlying handle has been released.
    pub fn is_closed(&self) -> bool {
        self.reader.is_none()
    }

    fn detect(&mut self) -> io::Result<()> {
        self.detected = true;
        let Some(mut raw) = self.reader.take() else {
            return Ok(());
        };

        let magic = read_prefix(&mut raw, GZIP_MAGIC.len())?;
        let is_gzip = magic == GZIP_MAGIC;
        let rewound = Cursor::new(magic).chain(raw);
        let mut decoded: Box<dyn Read + Send> = if is_gzip {
            debug!("gzip magic detected, decoding transparently");
            Box::new(MultiGzDecoder::new(rewound))
        } else {
            Box::new(rewound)
        };

        let mut head = read_prefix(&mut decoded, UTF8_BOM.len())?;
        if head == UTF8_BOM {
            debug!("stripped UTF-8 byte-order mark");
            head.clear();
        }
        self.pending = Cursor::new(head);
        self.reader = Some(decoded);
        Ok(())
    }
}

impl Read for ByteSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if !self.detected {
            self.detect()?;
        }
        let n = self.pending.read(buf)?;
        if n > 0 {
            return Ok(n);
        }
        match self.reader.as_mut() {
            Some(reader) => reader.read(buf),
            None => Ok(0),
        }
    }
}

impl fmt::Debug for ByteSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteSource")
            .field("closed", &self.is_closed())
            .field("detected", &self.detected)
            .finish()
    }
}

/// Read up to `n` bytes, stopping early only at end of input.
fn read_prefix(reader: &mut Box<dyn Read + Send>, n: usize) -> io::Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(n);
    reader.by_ref().take(n as u64).read_to_end(&mut buf)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use osv_test::gzip;

    fn read_all(input: Input) -> io::Result<Vec<u8>> {
        let mut source = ByteSource::open(input).expect("open");
        let mut out = Vec::new();
        source.read_to_end(&mut out)?;
        Ok(out)
    }

    // ==================== Plain input tests ====================

    #[test]
    fn test_plain_bytes_pass_through() {
        assert_eq!(read_all(Input::from(&b"id,name\n"[..])).unwrap(), b"id,name\n");
    }

    #[test]
    fn test_empty_input() {
        assert!(read_all(Input::bytes(Vec::new())).unwrap().is_empty());
    }

    #[test]
    fn test_single_byte_input() {
        assert_eq!(read_all(Input::from(&b"x"[..])).unwrap(), b"x");
    }

    #[test]
    fn test_reader_input() {
        let reader = Cursor::new(b"a,b\n1,2\n".to_vec());
        assert_eq!(read_all(Input::reader(reader)).unwrap(), b"a,b\n1,2\n");
    }

    // ==================== BOM tests ====================

    #[test]
    fn test_bom_stripped() {
        let data = b"\xEF\xBB\xBFid,name\n";
        assert_eq!(read_all(Input::from(&data[..])).unwrap(), b"id,name\n");
    }

    #[test]
    fn test_bom_stripped_only_once() {
        let data = b"\xEF\xBB\xBF\xEF\xBB\xBFid";
        assert_eq!(read_all(Input::from(&data[..])).unwrap(), b"\xEF\xBB\xBFid");
    }

    #[test]
    fn test_bom_only_at_start() {
        let data = b"id\xEF\xBB\xBF";
        assert_eq!(read_all(Input::from(&data[..])).unwrap(), data.to_vec());
    }

    #[test]
    fn test_partial_bom_kept() {
        let data = b"\xEF\xBBx";
        assert_eq!(read_all(Input::from(&data[..])).unwrap(), data.to_vec());
    }

    // ==================== Gzip tests ====================

    #[test]
    fn test_gzip_decoded() {
        let data = gzip(b"id,name\n1,John\n");
        assert_eq!(read_all(Input::bytes(data)).unwrap(), b"id,name\n1,John\n");
    }

    #[test]
    fn test_gzip_with_bom_stripped_after_decoding() {
        let data = gzip(b"\xEF\xBB\xBFid\n1\n");
        assert_eq!(read_all(Input::bytes(data)).unwrap(), b"id\n1\n");
    }

    #[test]
    fn test_multi_member_gzip() {
        let mut data = gzip(b"id\n1\n");
        data.extend(gzip(b"2\n"));
        assert_eq!(read_all(Input::bytes(data)).unwrap(), b"id\n1\n2\n");
    }

    #[test]
    fn test_corrupted_gzip_is_io_error() {
        let mut data = GZIP_MAGIC.to_vec();
        data.extend_from_slice(b"this is not a deflate stream at all");
        assert!(read_all(Input::bytes(data)).is_err());
    }

    #[test]
    fn test_truncated_gzip_is_io_error() {
        let mut data = gzip("id,name\n1,John\n".repeat(100).as_bytes());
        data.truncate(data.len() / 2);
        assert!(read_all(Input::bytes(data)).is_err());
    }

    // ==================== Handle tests ====================

    #[test]
    fn test_missing_file_is_io_error() {
        let err = ByteSource::open(Input::path("/definitely/not/here.csv")).unwrap_err();
        assert!(err.is_io());
    }

    #[test]
    fn test_close_releases_handle() {
        let mut source = ByteSource::open(Input::from(&b"abc"[..])).unwrap();
        assert!(!source.is_closed());
        source.close();
        assert!(source.is_closed());
        let mut buf = [0u8; 4];
        assert_eq!(source.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_input_debug() {
        assert_eq!(format!("{:?}", Input::from(&b"abc"[..])), "Bytes(3 bytes)");
        assert_eq!(format!("{:?}", Input::reader(io::empty())), "Reader(..)");
    }
}
