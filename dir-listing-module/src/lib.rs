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

//! # Directory listing module
//!
//! This crate implements the read-only core of a directory server: it renders
//! browsable index pages for directories and serves file contents, including
//! partial content (byte-range) delivery.
//!
//! ## Supported functionality
//!
//! * `GET` and `HEAD` requests, anything else is answered with `405` and an
//!   `Allow` header
//! * Byte range requests via the `Range` HTTP header (single ranges only,
//!   multi-range requests fall back to the full file)
//! * Exclusion rules: filtered paths are answered with `404`, indistinguishable
//!   from genuinely absent paths
//! * Deterministic index pages: identical backend state renders to byte-identical
//!   HTML, suitable for golden-file regression testing
//!
//! ## Code example
//!
//! [`DirListingHandler`] is constructed from a [`Backend`](vfs_backend::Backend)
//! and a [`PathFilter`](path_filter::PathFilter) and turns request parts into a
//! complete response:
//!
//! ```rust
//! use dir_listing_module::DirListingHandler;
//! use http::{HeaderMap, Method, Uri};
//! use path_filter::FilterRules;
//! use std::sync::Arc;
//! use vfs_backend::MemoryBackend;
//!
//! let backend = MemoryBackend::new().with_file("readme.txt", "hello");
//! let handler = DirListingHandler::new(Arc::new(backend), Arc::new(FilterRules::new()));
//!
//! let uri = Uri::from_static("/readme.txt");
//! let response = handler.handle(&Method::GET, &uri, &HeaderMap::new());
//! assert_eq!(response.status(), 200);
//! ```

mod entries;
mod handler;
mod range;
mod render;
mod standard_response;

pub use entries::{Entries, Entry};
pub use handler::DirListingHandler;
pub use range::Range;
