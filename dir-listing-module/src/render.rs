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

//! Directory page rendering
//!
//! Output is compared byte-for-byte by downstream regression tooling, so it must
//! not contain timestamps, host-dependent paths or any other non-determinism.

use maud::{html, DOCTYPE};

use crate::entries::Entries;

/// Renders the index page for a directory. `path` is the directory's remote path,
/// empty for the root. Rows appear in listing order, one anchor per entry.
pub(crate) fn directory_page(path: &str, entries: &Entries) -> String {
    let title = format!("Directory listing of /{path}");
    html! {
        (DOCTYPE)
        html {
            head {
                title { (title) }
            }
            body {
                h1 { (title) }
                @for entry in entries.iter() {
                    a href=(entry.url) { (entry.leaf) }
                    br;
                }
            }
        }
    }
    .into_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    use vfs_backend::Node;

    fn listing() -> Entries {
        let mut entries = Entries::new();
        entries.add_entry(&Node::new("three/sub", true));
        entries.add_entry(&Node::new("three/a.txt", false));
        entries.add_entry(&Node::new("three/<b>.txt", false));
        entries
    }

    #[test]
    fn renders_one_anchor_per_entry_in_order() {
        let page = directory_page("three", &listing());
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("<title>Directory listing of /three</title>"));
        assert!(page.contains("<h1>Directory listing of /three</h1>"));

        let sub = page.find("<a href=\"sub/\">sub/</a>").unwrap();
        let a = page.find("<a href=\"a.txt\">a.txt</a>").unwrap();
        assert!(sub < a);
    }

    #[test]
    fn markup_in_names_is_escaped() {
        let page = directory_page("three", &listing());
        assert!(page.contains("<a href=\"%3Cb%3E.txt\">&lt;b&gt;.txt</a>"));
        assert!(!page.contains("<b>.txt"));
    }

    #[test]
    fn output_is_byte_stable() {
        let first = directory_page("three", &listing());
        let second = directory_page("three", &listing());
        assert_eq!(first, second);
    }
}
