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

//! # Path filter
//!
//! Glob-style include/exclude rules deciding whether a remote path is hidden from
//! all access. A rule list is loaded once at startup and consulted read-only by
//! concurrently running requests.
//!
//! Rules are lines of the form `- pattern` (exclude) or `+ pattern` (include). The
//! first rule matching a path wins, paths matching no rule are included. Patterns
//! starting with `/` are anchored at the served root, all others match at any
//! depth. `*` does not cross path separators, `**` does, so `- hidden/**` hides a
//! `hidden` directory and everything below it.

use globset::{GlobBuilder, GlobMatcher};
use log::trace;

/// Error type produced when parsing filter rules.
#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    /// A rule line didn't start with `+ ` or `- `.
    #[error("malformed filter rule {rule:?}, expected \"+ pattern\" or \"- pattern\"")]
    MalformedRule {
        /// The offending rule line.
        rule: String,
    },

    /// A rule carried an invalid glob pattern.
    #[error("invalid glob pattern: {0}")]
    InvalidPattern(#[from] globset::Error),
}

#[derive(Debug, Clone)]
struct Rule {
    include: bool,
    matchers: Vec<GlobMatcher>,
}

impl Rule {
    fn parse(line: &str) -> Result<Self, FilterError> {
        let (include, pattern) = if let Some(pattern) = line.strip_prefix("+ ") {
            (true, pattern)
        } else if let Some(pattern) = line.strip_prefix("- ") {
            (false, pattern)
        } else {
            return Err(FilterError::MalformedRule {
                rule: line.to_owned(),
            });
        };

        let pattern = match pattern.strip_prefix('/') {
            Some(anchored) => anchored.to_owned(),
            None => format!("**/{pattern}"),
        };

        let mut matchers = vec![compile(&pattern)?];
        if let Some(dir) = pattern.strip_suffix("/**") {
            // A directory wildcard hides the directory itself as well.
            matchers.push(compile(dir)?);
        }

        Ok(Self { include, matchers })
    }

    fn matches(&self, path: &str) -> bool {
        self.matchers.iter().any(|matcher| matcher.is_match(path))
    }
}

fn compile(pattern: &str) -> Result<GlobMatcher, FilterError> {
    Ok(GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()?
        .compile_matcher())
}

/// Decision function mapping a remote path to included/excluded.
pub trait PathFilter: Send + Sync {
    /// Whether the given path is hidden from all access. The root (empty path) is
    /// never excluded.
    fn is_excluded(&self, path: &str) -> bool;
}

/// An ordered list of include/exclude rules, first match wins.
#[derive(Debug, Clone, Default)]
pub struct FilterRules {
    rules: Vec<Rule>,
}

impl FilterRules {
    /// Creates an empty rule list which includes everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a sequence of rule lines. Blank lines and lines starting with `#`
    /// are skipped.
    pub fn from_rules<I>(lines: I) -> Result<Self, FilterError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut rules = Self::new();
        for line in lines {
            let line = line.as_ref().trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            rules.add_rule(line)?;
        }
        Ok(rules)
    }

    /// Appends a single rule line.
    pub fn add_rule(&mut self, line: &str) -> Result<(), FilterError> {
        self.rules.push(Rule::parse(line)?);
        Ok(())
    }
}

impl PathFilter for FilterRules {
    fn is_excluded(&self, path: &str) -> bool {
        if path.is_empty() {
            return false;
        }

        for rule in &self.rules {
            if rule.matches(path) {
                trace!(
                    "path {path:?} {} by filter rule",
                    if rule.include { "included" } else { "excluded" }
                );
                return !rule.include;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(lines: &[&str]) -> FilterRules {
        FilterRules::from_rules(lines).unwrap()
    }

    #[test]
    fn empty_rules_include_everything() {
        let filter = FilterRules::new();
        assert!(!filter.is_excluded("anything"));
        assert!(!filter.is_excluded("a/b/c"));
    }

    #[test]
    fn leaf_name_rules_match_at_any_depth() {
        let filter = rules(&["- hidden.txt"]);
        assert!(filter.is_excluded("hidden.txt"));
        assert!(filter.is_excluded("a/b/hidden.txt"));
        assert!(!filter.is_excluded("visible.txt"));
        assert!(!filter.is_excluded("hidden.txt.bak"));
    }

    #[test]
    fn directory_wildcard_covers_directory_and_descendants() {
        let filter = rules(&["- hidden/**"]);
        assert!(filter.is_excluded("hidden"));
        assert!(filter.is_excluded("hidden/file.txt"));
        assert!(filter.is_excluded("hidden/sub/file.txt"));
        assert!(filter.is_excluded("a/hidden/file.txt"));
        assert!(!filter.is_excluded("hiddenish/file.txt"));
    }

    #[test]
    fn anchored_rules_match_from_the_root() {
        let filter = rules(&["- /top.txt"]);
        assert!(filter.is_excluded("top.txt"));
        assert!(!filter.is_excluded("a/top.txt"));
    }

    #[test]
    fn first_match_wins() {
        let filter = rules(&["+ keep/important.txt", "- keep/**"]);
        assert!(!filter.is_excluded("keep/important.txt"));
        assert!(filter.is_excluded("keep/other.txt"));
        assert!(filter.is_excluded("keep"));
    }

    #[test]
    fn star_does_not_cross_separators() {
        let filter = rules(&["- /*.log"]);
        assert!(filter.is_excluded("server.log"));
        assert!(!filter.is_excluded("logs/server.log"));
    }

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        let filter = rules(&["# comment", "", "- hidden.txt"]);
        assert!(filter.is_excluded("hidden.txt"));
    }

    #[test]
    fn malformed_rules_are_rejected() {
        assert!(matches!(
            FilterRules::from_rules(["hidden.txt"]),
            Err(FilterError::MalformedRule { .. })
        ));
        assert!(FilterRules::from_rules(["- [unbalanced"]).is_err());
    }

    #[test]
    fn root_is_never_excluded() {
        let filter = rules(&["- **"]);
        assert!(!filter.is_excluded(""));
        assert!(filter.is_excluded("anything"));
    }
}
