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

//! Standard responses for various conditions
//!
//! All bodies produced here depend on nothing but the status code, repeated
//! identical requests yield byte-identical responses.

use http::{header, Method, Response, StatusCode};

/// Produces the text of a standard response page for the given status code.
pub(crate) fn response_text(status: StatusCode) -> String {
    let status_str = status.as_str();
    let reason = status.canonical_reason().unwrap_or("");
    format!(
        r#"<!DOCTYPE html>
<html>
<head><title>{status_str} {reason}</title></head>
<body>
<center><h1>{status_str} {reason}</h1></center>
</body>
</html>"#
    )
}

/// Builds a standard error page response for the given status code. A `405`
/// response carries the `Allow` header listing the accepted methods.
pub(crate) fn error_response(
    method: &Method,
    status: StatusCode,
) -> Result<Response<Vec<u8>>, http::Error> {
    let text = response_text(status);

    let mut builder = Response::builder()
        .status(status)
        .header(header::CONTENT_LENGTH, text.len())
        .header(header::CONTENT_TYPE, "text/html");
    if status == StatusCode::METHOD_NOT_ALLOWED {
        builder = builder.header(header::ALLOW, "GET, HEAD");
    }

    builder.body(if method == Method::HEAD {
        Vec::new()
    } else {
        text.into_bytes()
    })
}

/// Builds a `416 Range Not Satisfiable` response. Carries the total size in
/// `Content-Range` and no body.
pub(crate) fn range_not_satisfiable(total: u64) -> Result<Response<Vec<u8>>, http::Error> {
    Response::builder()
        .status(StatusCode::RANGE_NOT_SATISFIABLE)
        .header(header::CONTENT_RANGE, format!("bytes */{total}"))
        .header(header::CONTENT_LENGTH, 0)
        .body(Vec::new())
}

/// Builds a `200 OK` HTML response, empty body for `HEAD`.
pub(crate) fn html_response(
    method: &Method,
    text: String,
) -> Result<Response<Vec<u8>>, http::Error> {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_LENGTH, text.len())
        .header(header::CONTENT_TYPE, "text/html; charset=utf-8")
        .body(if method == Method::HEAD {
            Vec::new()
        } else {
            text.into_bytes()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_pages_contain_the_status_text() {
        let response = error_response(&Method::GET, StatusCode::NOT_FOUND).unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = String::from_utf8(response.body().clone()).unwrap();
        assert!(body.contains("404 Not Found"));
        assert_eq!(
            response.headers().get(header::CONTENT_LENGTH).unwrap(),
            &body.len().to_string()
        );
    }

    #[test]
    fn method_not_allowed_lists_accepted_methods() {
        let response = error_response(&Method::POST, StatusCode::METHOD_NOT_ALLOWED).unwrap();
        assert_eq!(response.headers().get(header::ALLOW).unwrap(), "GET, HEAD");
    }

    #[test]
    fn head_error_responses_have_no_body() {
        let get = error_response(&Method::GET, StatusCode::NOT_FOUND).unwrap();
        let head = error_response(&Method::HEAD, StatusCode::NOT_FOUND).unwrap();
        assert!(head.body().is_empty());
        assert_eq!(get.headers(), head.headers());
    }

    #[test]
    fn range_not_satisfiable_carries_total_size() {
        let response = range_not_satisfiable(4321).unwrap();
        assert_eq!(response.status(), StatusCode::RANGE_NOT_SATISFIABLE);
        assert_eq!(
            response.headers().get(header::CONTENT_RANGE).unwrap(),
            "bytes */4321"
        );
        assert!(response.body().is_empty());
    }
}
