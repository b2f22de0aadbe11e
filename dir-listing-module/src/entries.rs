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

//! Listing row construction

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use vfs_backend::Node;

// RFC 3986 path segment encoding: unreserved characters, sub-delims, `:` and `@`
// pass through, everything else is escaped.
const URL_ESC_CHARSET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'!')
    .remove(b'$')
    .remove(b'&')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'*')
    .remove(b'+')
    .remove(b',')
    .remove(b';')
    .remove(b'=')
    .remove(b':')
    .remove(b'@');

/// One renderable listing row derived from a backend node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// The original node path, unmodified. Directories carry no trailing slash
    /// here.
    pub remote: String,
    /// Display name: the base name of `remote`, with a trailing `/` appended for
    /// directories. The root is the literal `/`.
    pub leaf: String,
    /// The hyperlink target: `leaf` percent-encoded, prefixed with `./` when the
    /// name would otherwise parse as a URI scheme.
    pub url: String,
}

impl Entry {
    fn from_node(node: &Node) -> Self {
        if node.path().is_empty() {
            // The root is always directory-like, regardless of the node's flag.
            return Self {
                remote: String::new(),
                leaf: "/".to_owned(),
                url: "/".to_owned(),
            };
        }

        let base = node.name();
        let leaf = if node.is_dir() {
            format!("{base}/")
        } else {
            base.to_owned()
        };

        let encoded = utf8_percent_encode(&leaf, URL_ESC_CHARSET).to_string();

        // A colon in the first path segment would make browsers read the name as
        // a URI scheme, e.g. <a href="why:this.txt">.
        let url = if base.contains(':') {
            format!("./{encoded}")
        } else {
            encoded
        };

        Self {
            remote: node.path().to_owned(),
            leaf,
            url,
        }
    }
}

/// An ordered sequence of listing rows, in the order nodes were added.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entries {
    entries: Vec<Entry>,
}

impl Entries {
    /// Creates an empty listing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Converts a node into a listing row and appends it.
    pub fn add_entry(&mut self, node: &Node) {
        self.entries.push(Entry::from_node(node));
    }

    /// Iterates over the rows in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    /// Number of rows in the listing.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the listing has no rows.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
