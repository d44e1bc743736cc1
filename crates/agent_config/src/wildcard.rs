//! Wildcard pattern compiler.
//!
//! Several configuration options (`sanitizeFieldNames`, `ignoreUrls`,
//! `transactionIgnoreUrls`, `disableMetrics`, ...) are lists of glob-like
//! patterns. A pattern is a sequence of literal segments separated by `*`
//! wildcards, where `*` matches zero or more of any character. Matching is
//! anchored to the whole input and case-insensitive unless the pattern opts
//! into case-sensitive matching with a leading `(?-i)` marker.
//!
//! # Examples
//!
//! ```rust
//! use agent_config::CompiledMatcher;
//!
//! let m = CompiledMatcher::compile("*foo");
//! assert!(m.matches("barfoo"));
//! assert!(!m.matches("foobar"));
//!
//! let m = CompiledMatcher::compile("foo*bar");
//! assert!(m.matches("foobarbar"));
//!
//! // Case-insensitive by default; `(?-i)` opts out.
//! assert!(CompiledMatcher::compile("FOO").matches("foo"));
//! assert!(!CompiledMatcher::compile("(?-i)FOO").matches("foo"));
//! ```

use regex::RegexBuilder;
use serde::{Serialize, Serializer};
use std::fmt;

/// Marker prefix that makes a pattern match case-sensitively.
const CASE_SENSITIVE_MARKER: &str = "(?-i)";

/// The predicate form of a wildcard pattern.
///
/// Compilation never fails: a pattern the backing engine cannot express
/// degenerates into a matcher that matches only the literal pattern text.
#[derive(Debug, Clone)]
pub struct CompiledMatcher {
    pattern: String,
    matcher: Matcher,
}

#[derive(Debug, Clone)]
enum Matcher {
    Regex(regex::Regex),
    /// Fallback for patterns the regex engine rejects (for example a
    /// pattern exceeding the compiled size limit). Matches only itself.
    Literal {
        text: String,
        case_sensitive: bool,
    },
}

impl CompiledMatcher {
    /// Compile a wildcard pattern into a matcher.
    pub fn compile(pattern: &str) -> Self {
        let (body, case_sensitive) = match pattern.strip_prefix(CASE_SENSITIVE_MARKER) {
            Some(rest) => (rest, true),
            None => (pattern, false),
        };

        let mut source = String::from("^");
        for (i, segment) in body.split('*').enumerate() {
            if i > 0 {
                source.push_str(".*");
            }
            source.push_str(&regex::escape(segment));
        }
        source.push('$');

        let matcher = match RegexBuilder::new(&source)
            .case_insensitive(!case_sensitive)
            .dot_matches_new_line(true)
            .build()
        {
            Ok(regex) => Matcher::Regex(regex),
            Err(_) => Matcher::Literal {
                text: body.to_string(),
                case_sensitive,
            },
        };

        Self {
            pattern: pattern.to_string(),
            matcher,
        }
    }

    /// Test an input string against the pattern. Anchored to the whole input.
    pub fn matches(&self, input: &str) -> bool {
        match &self.matcher {
            Matcher::Regex(regex) => regex.is_match(input),
            Matcher::Literal {
                text,
                case_sensitive,
            } => {
                if *case_sensitive {
                    text == input
                } else {
                    text.eq_ignore_ascii_case(input)
                }
            }
        }
    }

    /// The original pattern text, including any case-sensitivity marker.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

impl PartialEq for CompiledMatcher {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern
    }
}

impl Eq for CompiledMatcher {}

impl fmt::Display for CompiledMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pattern)
    }
}

impl Serialize for CompiledMatcher {
    /// Serializes as the source pattern, which is what diagnostic output
    /// wants to show.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.pattern)
    }
}

#[cfg(test)]
#[path = "wildcard_tests.rs"]
mod tests;
