//! Store-compatible glob matching for the in-memory repository.
//!
//! Redis matches SCAN/KEYS patterns with its own glob dialect. The in-memory
//! backend has no server to delegate to, so it compiles the same dialect into
//! an anchored byte-oriented [`regex::bytes::Regex`]:
//!
//! | glob      | meaning                                  |
//! |-----------|------------------------------------------|
//! | `?`       | exactly one byte                         |
//! | `*`       | zero or more bytes                       |
//! | `[abc]`   | one byte from the set                    |
//! | `[^abc]`  | one byte not in the set                  |
//! | `[a-z]`   | one byte in the inclusive range          |
//! | `\x`      | the literal byte `x`                     |
//!
//! The store compares raw bytes, so a multibyte UTF-8 character counts as
//! several positions. Reversed ranges (`[z-a]`) are swapped and an
//! unterminated class runs to the end of the pattern, as the store does.

use regex::bytes::Regex;
use vercache_core::{CacheResult, StoreError};

/// A compiled glob pattern.
#[derive(Debug, Clone)]
pub struct GlobPattern {
    source: String,
    regex: Regex,
}

impl GlobPattern {
    /// Compile a glob pattern.
    pub fn new(pattern: &str) -> CacheResult<Self> {
        let translated = translate(pattern.as_bytes());
        let regex = Regex::new(&translated).map_err(|e| StoreError::CommandFailed {
            command: "SCAN".to_string(),
            reason: format!("unsupported pattern {:?}: {}", pattern, e),
        })?;
        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    /// The pattern as written by the caller.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether `key` matches the whole pattern, byte for byte.
    pub fn matches(&self, key: &str) -> bool {
        self.regex.is_match(key.as_bytes())
    }
}

/// Escape a single byte for use anywhere in a regex, including classes.
fn byte_escape(b: u8) -> String {
    format!("\\x{:02X}", b)
}

fn translate(pattern: &[u8]) -> String {
    let mut out = String::with_capacity(pattern.len() * 4 + 12);
    // Unicode off: `.` and classes consume exactly one byte.
    out.push_str("(?s-u)\\A");

    let mut i = 0;
    while i < pattern.len() {
        match pattern[i] {
            b'*' => {
                while i + 1 < pattern.len() && pattern[i + 1] == b'*' {
                    i += 1;
                }
                out.push_str(".*");
            }
            b'?' => out.push('.'),
            b'[' => {
                i = translate_class(pattern, i + 1, &mut out);
                continue;
            }
            b'\\' if i + 1 < pattern.len() => {
                i += 1;
                out.push_str(&byte_escape(pattern[i]));
            }
            b => out.push_str(&byte_escape(b)),
        }
        i += 1;
    }

    out.push_str("\\z");
    out
}

/// Translate a bracket expression starting just after `[`.
///
/// Returns the index of the first byte after the class.
fn translate_class(pattern: &[u8], start: usize, out: &mut String) -> usize {
    let mut i = start;
    let negated = pattern.get(i) == Some(&b'^');
    if negated {
        i += 1;
    }

    let mut members = String::new();
    loop {
        match pattern.get(i) {
            None => break,
            Some(b']') => {
                i += 1;
                break;
            }
            Some(b'\\') if i + 1 < pattern.len() => {
                members.push_str(&byte_escape(pattern[i + 1]));
                i += 2;
            }
            Some(&lo) if pattern.get(i + 1) == Some(&b'-') && i + 2 < pattern.len() => {
                let hi = pattern[i + 2];
                let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
                members.push_str(&byte_escape(lo));
                members.push('-');
                members.push_str(&byte_escape(hi));
                i += 3;
            }
            Some(&b) => {
                members.push_str(&byte_escape(b));
                i += 1;
            }
        }
    }

    match (members.is_empty(), negated) {
        // `[]` matches nothing, `[^]` matches any single byte.
        (true, false) => out.push_str("(?:\\z.)"),
        (true, true) => out.push('.'),
        (false, false) => {
            out.push('[');
            out.push_str(&members);
            out.push(']');
        }
        (false, true) => {
            out.push_str("[^");
            out.push_str(&members);
            out.push(']');
        }
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;

    fn glob(pattern: &str) -> GlobPattern {
        GlobPattern::new(pattern).expect("pattern should compile")
    }

    #[test]
    fn test_question_mark() {
        let p = glob("h?llo");
        assert!(p.matches("hello"));
        assert!(p.matches("hallo"));
        assert!(p.matches("hxllo"));
        assert!(!p.matches("hllo"));
        assert!(!p.matches("heello"));
    }

    #[test]
    fn test_star() {
        let p = glob("h*llo");
        assert!(p.matches("hllo"));
        assert!(p.matches("heeeello"));
        assert!(!p.matches("hlloo"));
        assert!(glob("*").matches(""));
        assert!(glob("**").matches("anything:at:all"));
    }

    #[test]
    fn test_set() {
        let p = glob("h[ae]llo");
        assert!(p.matches("hello"));
        assert!(p.matches("hallo"));
        assert!(!p.matches("hillo"));
    }

    #[test]
    fn test_negated_set() {
        let p = glob("h[^e]llo");
        assert!(p.matches("hallo"));
        assert!(p.matches("hbllo"));
        assert!(!p.matches("hello"));
        assert!(!p.matches("hllo"));
    }

    #[test]
    fn test_range() {
        let p = glob("h[a-b]llo");
        assert!(p.matches("hallo"));
        assert!(p.matches("hbllo"));
        assert!(!p.matches("hello"));
    }

    #[test]
    fn test_reversed_range_is_swapped() {
        let p = glob("h[b-a]llo");
        assert!(p.matches("hallo"));
        assert!(p.matches("hbllo"));
        assert!(!p.matches("hcllo"));
    }

    #[test]
    fn test_escapes() {
        assert!(glob("a\\*b").matches("a*b"));
        assert!(!glob("a\\*b").matches("axb"));
        assert!(glob("[\\]]").matches("]"));
        assert!(glob("end\\").matches("end\\"));
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        let p = glob("cache:1:a.b+(c)|{d}$");
        assert!(p.matches("cache:1:a.b+(c)|{d}$"));
        assert!(!p.matches("cache:1:aXb+(c)|{d}$"));
    }

    #[test]
    fn test_empty_classes() {
        assert!(!glob("a[]b").matches("ab"));
        assert!(!glob("a[]b").matches("axb"));
        assert!(glob("a[^]b").matches("axb"));
    }

    #[test]
    fn test_unterminated_class_runs_to_end() {
        let p = glob("key[ab");
        assert!(p.matches("keya"));
        assert!(p.matches("keyb"));
        assert!(!p.matches("keyc"));
    }

    #[test]
    fn test_match_is_anchored() {
        let p = glob("cache:1:user");
        assert!(p.matches("cache:1:user"));
        assert!(!p.matches("cache:1:user:2"));
        assert!(!p.matches("xcache:1:user"));
    }

    #[test]
    fn test_star_crosses_newlines() {
        assert!(glob("a*z").matches("a\nz"));
    }

    #[test]
    fn test_multibyte_keys_match_per_byte() {
        // `ä` is two bytes in UTF-8.
        assert!(!glob("h?llo").matches("hällo"));
        assert!(glob("h??llo").matches("hällo"));
        assert!(!glob("h[^e]llo").matches("hällo"));
        assert!(glob("h*llo").matches("hällo"));
        assert!(glob("hällo").matches("hällo"));
        assert!(!glob("hällo").matches("hallo"));
    }

    #[test]
    fn test_multibyte_literal_inside_class() {
        // The class holds the two bytes of `é`, so it matches one of them.
        let p = glob("caf[é]");
        assert!(!p.matches("café"));
        assert!(glob("caf[é][é]").matches("café"));
    }

    #[test]
    fn test_as_str() {
        assert_eq!(glob("cache:1:*").as_str(), "cache:1:*");
    }
}

#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        /// Property: a pattern with no metacharacters matches only itself.
        #[test]
        fn prop_literal_matches_only_itself(
            key in "[a-z0-9:_.-]{0,24}",
            other in "[a-z0-9:_.-]{0,24}",
        ) {
            let p = GlobPattern::new(&key).expect("compile");
            prop_assert!(p.matches(&key));
            prop_assert_eq!(p.matches(&other), key == other);
        }

        /// Property: `prefix*` matches exactly the keys starting with prefix.
        #[test]
        fn prop_prefix_star(
            prefix in "[a-z0-9:]{0,12}",
            key in "[a-z0-9:]{0,24}",
        ) {
            let p = GlobPattern::new(&format!("{}*", prefix)).expect("compile");
            prop_assert_eq!(p.matches(&key), key.starts_with(&prefix));
        }

        /// Property: `?` repeated n times matches exactly n-byte keys.
        #[test]
        fn prop_question_marks_count_bytes(n in 0usize..10, key in "[a-zäß€]{0,8}") {
            let p = GlobPattern::new(&"?".repeat(n)).expect("compile");
            prop_assert_eq!(p.matches(&key), key.len() == n);
        }
    }
}
