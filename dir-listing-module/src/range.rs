// Copyright 2024 Wladimir Palant
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Byte range processing (`Range` HTTP header)

use http::{header, HeaderMap};
use std::str::FromStr;

/// Represents the result of parsing the `Range` HTTP header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Range {
    /// A valid inclusive range, clipped to the file's boundaries
    Valid(u64, u64),
    /// A range starting outside of the file's boundaries
    OutOfBounds,
}

impl Range {
    /// Parses the value of a `Range` HTTP header. The file size is required to
    /// resolve ranges specified relative to the end of file, to clip both bounds
    /// and to recognize out of bounds ranges. Ranges that cannot be parsed
    /// (unexpected format, multiple ranges, non-byte units) result in `None`.
    pub fn parse(range: &str, file_size: u64) -> Option<Self> {
        let (units, range) = range.split_once('=')?;
        if units != "bytes" {
            return None;
        }

        let (start, end) = range.trim().split_once('-')?;
        let (start, end) = if start.is_empty() {
            // A suffix longer than the file resolves to the entire file.
            let len = u64::from_str(end.trim()).ok()?;
            (file_size.saturating_sub(len), file_size.saturating_sub(1))
        } else if end.is_empty() {
            (u64::from_str(start.trim()).ok()?, file_size.saturating_sub(1))
        } else {
            (
                u64::from_str(start.trim()).ok()?,
                u64::from_str(end.trim()).ok()?,
            )
        };

        if start >= file_size {
            return Some(Self::OutOfBounds);
        }

        let end = end.min(file_size - 1);
        if start > end {
            Some(Self::OutOfBounds)
        } else {
            Some(Self::Valid(start, end))
        }
    }
}

/// Extracts the requested byte range from the request headers if any. A missing
/// `Range` header or one using an unsupported format results in `None`, callers
/// fall back to producing the entire file.
pub(crate) fn extract_range(headers: &HeaderMap, file_size: u64) -> Option<Range> {
    let value = headers.get(header::RANGE)?;
    let value = value.to_str().ok()?;
    Range::parse(value, file_size)
}
