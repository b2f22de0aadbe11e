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

//! Request handling state machine

use http::{header, HeaderMap, Method, Response, StatusCode, Uri};
use log::{debug, error, warn};
use percent_encoding::percent_decode_str;
use std::sync::Arc;

use path_filter::PathFilter;
use vfs_backend::{Backend, BackendError, Node};

use crate::entries::Entries;
use crate::range::{extract_range, Range};
use crate::render::directory_page;
use crate::standard_response::{error_response, html_response, range_not_satisfiable};

/// Handler producing one response per request: method gating, path decoding,
/// filter enforcement, directory/file dispatch and byte-range handling.
///
/// The backend and filter are injected at construction and only ever read, the
/// handler carries no per-request state and can be shared between concurrently
/// running requests.
pub struct DirListingHandler {
    backend: Arc<dyn Backend>,
    filter: Arc<dyn PathFilter>,
}

impl std::fmt::Debug for DirListingHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirListingHandler").finish_non_exhaustive()
    }
}

impl DirListingHandler {
    /// Creates a handler serving the given backend, with the given filter deciding
    /// which paths are hidden.
    pub fn new(backend: Arc<dyn Backend>, filter: Arc<dyn PathFilter>) -> Self {
        Self { backend, filter }
    }

    /// Handles one request, always producing a response. Internal failures
    /// degrade to a minimal `500 Internal Server Error` response.
    pub fn handle(&self, method: &Method, uri: &Uri, headers: &HeaderMap) -> Response<Vec<u8>> {
        match self.try_handle(method, uri, headers) {
            Ok(response) => response,
            Err(err) => {
                error!("failed building response for {}: {err}", uri.path());
                let mut response = Response::new(Vec::new());
                *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
                response
            }
        }
    }

    fn try_handle(
        &self,
        method: &Method,
        uri: &Uri,
        headers: &HeaderMap,
    ) -> Result<Response<Vec<u8>>, http::Error> {
        if method != Method::GET && method != Method::HEAD {
            warn!("denying method {method}");
            return error_response(method, StatusCode::METHOD_NOT_ALLOWED);
        }

        let decoded = match percent_decode_str(uri.path()).decode_utf8() {
            Ok(decoded) => decoded.into_owned(),
            Err(err) => {
                // Not decodable means not addressable, same as an absent path.
                debug!("cannot decode request path {}: {err}", uri.path());
                return error_response(method, StatusCode::NOT_FOUND);
            }
        };
        let Some(path) = decoded.strip_prefix('/') else {
            debug!("request target {decoded:?} is not a path");
            return error_response(method, StatusCode::NOT_FOUND);
        };

        let dir_requested = path.is_empty() || path.ends_with('/');
        let remote = path.trim_end_matches('/');
        debug!("resolved request target to remote path {remote:?}");

        if self.excluded(remote) {
            // Deliberately indistinguishable from an absent path.
            debug!("remote path {remote:?} is excluded by filter");
            return error_response(method, StatusCode::NOT_FOUND);
        }

        let node = match self.backend.resolve(remote) {
            Ok(node) => node,
            Err(BackendError::NotFound { .. }) => {
                return error_response(method, StatusCode::NOT_FOUND)
            }
            Err(err) => {
                error!("backend failure resolving {remote:?}: {err}");
                return error_response(method, StatusCode::INTERNAL_SERVER_ERROR);
            }
        };

        if node.is_dir() {
            if !dir_requested {
                // Directories are only reachable via their slash-terminated
                // address.
                debug!("directory {remote:?} requested without trailing slash");
                return error_response(method, StatusCode::NOT_FOUND);
            }
            self.serve_directory(method, &node)
        } else {
            if dir_requested {
                debug!("file {remote:?} requested with trailing slash");
                return error_response(method, StatusCode::NOT_FOUND);
            }
            self.serve_file(method, headers, &node)
        }
    }

    /// Whether the path or any ancestor directory of it is excluded by the filter.
    fn excluded(&self, path: &str) -> bool {
        if self.filter.is_excluded(path) {
            return true;
        }

        let mut pos = 0;
        while let Some(index) = path[pos..].find('/') {
            if self.filter.is_excluded(&path[..pos + index]) {
                return true;
            }
            pos += index + 1;
        }
        false
    }

    fn serve_directory(
        &self,
        method: &Method,
        node: &Node,
    ) -> Result<Response<Vec<u8>>, http::Error> {
        let mut children = match self.backend.list_children(node.path()) {
            Ok(children) => children,
            Err(BackendError::NotFound { .. }) => {
                return error_response(method, StatusCode::NOT_FOUND)
            }
            Err(err) => {
                error!("backend failure listing {:?}: {err}", node.path());
                return error_response(method, StatusCode::INTERNAL_SERVER_ERROR);
            }
        };

        // Rendered output must be byte-stable across runs, backend enumeration
        // order is not. Case-insensitive lexical order, directories and files
        // mixed.
        children.sort_by(|a, b| {
            a.name()
                .to_lowercase()
                .cmp(&b.name().to_lowercase())
                .then_with(|| a.name().cmp(b.name()))
        });

        let mut entries = Entries::new();
        for child in &children {
            if self.excluded(child.path()) {
                debug!("omitting excluded child {:?} from listing", child.path());
                continue;
            }
            entries.add_entry(child);
        }

        debug!(
            "serving directory {:?} with {} entries",
            node.path(),
            entries.len()
        );
        html_response(method, directory_page(node.path(), &entries))
    }

    fn serve_file(
        &self,
        method: &Method,
        headers: &HeaderMap,
        node: &Node,
    ) -> Result<Response<Vec<u8>>, http::Error> {
        let mut file = match self.backend.open(node.path()) {
            Ok(file) => file,
            Err(BackendError::NotFound { .. }) => {
                return error_response(method, StatusCode::NOT_FOUND)
            }
            Err(err) => {
                error!("backend failure opening {:?}: {err}", node.path());
                return error_response(method, StatusCode::INTERNAL_SERVER_ERROR);
            }
        };
        let total = file.len();

        let (status, start, end) = match extract_range(headers, total) {
            Some(Range::Valid(start, end)) => {
                debug!("bytes range requested: {start}-{end}");
                (StatusCode::PARTIAL_CONTENT, start, end)
            }
            Some(Range::OutOfBounds) => {
                debug!("requested bytes range is out of bounds");
                return range_not_satisfiable(total);
            }
            None => {
                // Range is either missing or cannot be parsed, produce the entire
                // file.
                (StatusCode::OK, 0, total.saturating_sub(1))
            }
        };
        let length = if total == 0 { 0 } else { end - start + 1 };

        let mut builder = Response::builder()
            .status(status)
            .header(header::CONTENT_LENGTH, length)
            .header(header::ACCEPT_RANGES, "bytes")
            .header(
                header::CONTENT_TYPE,
                mime_guess::from_path(node.path())
                    .first_or_octet_stream()
                    .as_ref(),
            );
        if status == StatusCode::PARTIAL_CONTENT {
            builder = builder.header(
                header::CONTENT_RANGE,
                format!("bytes {start}-{end}/{total}"),
            );
        }

        let body = if method == Method::HEAD || length == 0 {
            Vec::new()
        } else {
            match file.read_range(start, length) {
                Ok(body) => body,
                Err(err) => {
                    error!("backend failure reading {:?}: {err}", node.path());
                    return error_response(method, StatusCode::INTERNAL_SERVER_ERROR);
                }
            }
        };

        builder.body(body)
    }
}
