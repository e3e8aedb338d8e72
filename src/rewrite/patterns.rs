//! Byte-level patterns for the rewriter
//!
//! Path tokens follow `(segment "/")+ segment "." ext` where every segment and
//! the extension are `[A-Za-z0-9_-]+`. Word classes are ASCII-only so arbitrary
//! (non-UTF-8) tool output can be matched.

use once_cell::sync::Lazy;
use regex::bytes::Regex;
use std::borrow::Cow;

static PATH_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?-u)(?:[\w-]+/)+[\w-]+\.[\w-]+").expect("path token pattern is valid")
});

static APP_SWITCH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?-u)==> (\w+)").expect("app switch pattern is valid"));

/// Name of the app announced by a `==> name` line, if any
pub fn app_switch(line: &[u8]) -> Option<&str> {
    APP_SWITCH
        .captures(line)
        .and_then(|caps| caps.get(1))
        .and_then(|m| std::str::from_utf8(m.as_bytes()).ok())
}

/// Joins `prefix` and `token` with a single `/`.
///
/// An empty prefix leaves the token as is. Empty and `.` segments of the
/// prefix are dropped; a leading `/` is kept.
pub fn join_prefix(prefix: &str, token: &[u8]) -> Vec<u8> {
    let mut joined = Vec::with_capacity(prefix.len() + token.len() + 1);
    if prefix.starts_with('/') {
        joined.push(b'/');
    }
    for segment in prefix.split('/').filter(|s| !s.is_empty() && *s != ".") {
        joined.extend_from_slice(segment.as_bytes());
        joined.push(b'/');
    }
    joined.extend_from_slice(token);
    joined
}

/// Prefixes every path token in `line`, leftmost first, non-overlapping
pub fn prefix_paths<'l>(line: &'l [u8], prefix: &str) -> Cow<'l, [u8]> {
    if prefix.is_empty() {
        return Cow::Borrowed(line);
    }
    PATH_TOKEN.replace_all(line, |caps: &regex::bytes::Captures<'_>| {
        join_prefix(prefix, &caps[0])
    })
}

/// Every path token in `line`, in order
pub fn path_tokens(line: &[u8]) -> impl Iterator<Item = &[u8]> {
    PATH_TOKEN.find_iter(line).map(|m| m.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use yare::parameterized;

    fn tokens(line: &str) -> Vec<&str> {
        path_tokens(line.as_bytes())
            .map(|t| std::str::from_utf8(t).unwrap())
            .collect()
    }

    #[parameterized(
        simple = { "lib/foo.ex", &["lib/foo.ex"] },
        nested = { "lib/foo/bar.ex", &["lib/foo/bar.ex"] },
        hyphens = { "priv/static-assets/app-v2.min-js", &["priv/static-assets/app-v2.min-js"] },
        with_line = { "test/foo_test.exs:42", &["test/foo_test.exs"] },
        two_tokens = { "lib/a.ex and lib/b.ex", &["lib/a.ex", "lib/b.ex"] },
        bare_file = { "mix.exs", &[] },
        no_extension = { "lib/foo/bar", &[] },
        trailing_slash = { "lib/foo/", &[] },
        version = { "Elixir 1.15.7", &[] },
    )]
    fn test_path_token_grammar(line: &str, expected: &[&str]) {
        assert_eq!(tokens(line), expected);
    }

    #[test]
    fn test_second_extension_is_not_part_of_token() {
        assert_eq!(tokens("lib/foo.ex.bak"), vec!["lib/foo.ex"]);
    }

    #[test]
    fn test_absolute_path_matches_from_first_segment() {
        assert_eq!(tokens("/home/dev/lib/a.ex"), vec!["home/dev/lib/a.ex"]);
    }

    #[test]
    fn test_non_ascii_word_characters_break_tokens() {
        assert!(tokens("lib/café/x.ex").is_empty());
    }

    #[test]
    fn test_app_switch() {
        assert_eq!(app_switch(b"==> web"), Some("web"));
        assert_eq!(app_switch(b"\x1b[32m==> billing_engine\x1b[0m"), Some("billing_engine"));
        assert_eq!(app_switch(b"=> web"), None);
        assert_eq!(app_switch(b"==>web"), None);
        assert_eq!(app_switch(b"Compiling 3 files (.ex)"), None);
    }

    #[parameterized(
        empty_prefix = { "", "lib/a.ex", "lib/a.ex" },
        trailing_slash = { "apps/foo/", "lib/a.ex", "apps/foo/lib/a.ex" },
        no_trailing_slash = { "apps/foo", "lib/a.ex", "apps/foo/lib/a.ex" },
        duplicate_separators = { "apps//foo//", "lib/a.ex", "apps/foo/lib/a.ex" },
        dot_segment = { "./apps/foo/", "lib/a.ex", "apps/foo/lib/a.ex" },
        absolute = { "/src/apps/foo/", "lib/a.ex", "/src/apps/foo/lib/a.ex" },
    )]
    fn test_join_prefix(prefix: &str, token: &str, expected: &str) {
        assert_eq!(join_prefix(prefix, token.as_bytes()), expected.as_bytes());
    }

    #[test]
    fn test_prefix_paths_rewrites_every_token() {
        let line = b"warning: lib/a.ex:3 conflicts with lib/b/c.ex";
        assert_eq!(
            &*prefix_paths(line, "apps/foo/"),
            b"warning: apps/foo/lib/a.ex:3 conflicts with apps/foo/lib/b/c.ex".as_slice()
        );
    }

    #[test]
    fn test_prefix_paths_empty_prefix_borrows() {
        let line = b"Compiling lib/bar.ex";
        assert!(matches!(prefix_paths(line, ""), Cow::Borrowed(_)));
    }

    #[test]
    fn test_prefix_paths_keeps_invalid_utf8() {
        let line = b"\xff\xfe lib/a.ex";
        assert_eq!(
            &*prefix_paths(line, "apps/x/"),
            b"\xff\xfe apps/x/lib/a.ex".as_slice()
        );
    }
}
