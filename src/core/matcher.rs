//! Tag call-expression matcher.
//!
//! Locates calls of the configured tag identifier in raw source text without
//! full-language parsing. A regex finds candidate call sites (including an
//! optional `const x =` binding); a cursor scan then balances parens,
//! braces, and brackets while skipping string contents to find the textual
//! extent of each argument. A malformed or unbalanced call yields no match
//! for that occurrence rather than an error.

use anyhow::{Context, Result};
use regex::Regex;

use crate::core::tag::{TagArg, TagMatch};

pub struct TagMatcher {
    call_site: Regex,
}

impl TagMatcher {
    pub fn new(tag_name: &str) -> Result<Self> {
        // `\b` would not assert a boundary before a `$`-initial identifier,
        // so the guard is an explicit non-identifier character (or the scan
        // start) instead.
        let pattern = format!(
            r"(?:^|[^A-Za-z0-9_$])(?:(?:const|let|var)\s+(?P<var>[A-Za-z_$][A-Za-z0-9_$]*)\s*=\s*)?(?P<call>{}\s*\()",
            regex::escape(tag_name)
        );
        let call_site = Regex::new(&pattern)
            .with_context(|| format!("invalid tag identifier: \"{}\"", tag_name))?;
        Ok(Self { call_site })
    }

    /// All tag matches in `source`, in source order, non-overlapping.
    ///
    /// Each argument's text is exactly reconstructable by slicing `source`
    /// with the recorded offsets.
    pub fn matches(&self, source: &str) -> Vec<TagMatch> {
        let line_index = build_line_index(source);
        let mut out = Vec::new();
        let mut scan_from = 0;

        while let Some(caps) = self.call_site.captures(&source[scan_from..]) {
            let Some(call) = caps.name("call") else {
                break;
            };
            let tag_start = scan_from + call.start();
            let open_paren = scan_from + call.end() - 1;

            match scan_arguments(source, open_paren) {
                Some(scan) => {
                    let (line, column) = position_at(&line_index, tag_start);
                    let mut args = scan.args.into_iter().map(|(start, end)| TagArg {
                        text: source[start..end].to_string(),
                        start,
                        end,
                    });
                    out.push(TagMatch {
                        text: source[tag_start..scan.end].to_string(),
                        start: tag_start,
                        end: scan.end,
                        line,
                        column,
                        variable_name: caps.name("var").map(|m| m.as_str().to_string()),
                        param1: args.next(),
                        param2: args.next(),
                    });
                    scan_from = scan.end;
                }
                // Unbalanced call: skip past the paren and keep scanning.
                None => scan_from = open_paren + 1,
            }
        }

        out
    }
}

struct ArgScan {
    /// Trimmed byte spans of each top-level argument.
    args: Vec<(usize, usize)>,
    /// Byte offset just past the closing paren.
    end: usize,
}

/// Walk from the opening paren, balancing delimiters and skipping strings,
/// to find the call's argument spans and end offset.
fn scan_arguments(source: &str, open_paren: usize) -> Option<ArgScan> {
    let mut paren = 0i32;
    let mut brace = 0i32;
    let mut bracket = 0i32;
    let mut string_quote: Option<char> = None;
    let mut escaped = false;
    let mut args = Vec::new();
    let mut arg_start = open_paren + 1;

    for (rel, ch) in source[open_paren..].char_indices() {
        let at = open_paren + rel;

        if let Some(quote) = string_quote {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == quote {
                string_quote = None;
            }
            continue;
        }

        match ch {
            '"' | '\'' | '`' => string_quote = Some(ch),
            '(' => paren += 1,
            ')' => {
                paren -= 1;
                if paren == 0 {
                    if brace != 0 || bracket != 0 {
                        return None;
                    }
                    push_arg(source, &mut args, arg_start, at);
                    return Some(ArgScan { args, end: at + 1 });
                }
            }
            '{' => brace += 1,
            '}' => {
                brace -= 1;
                if brace < 0 {
                    return None;
                }
            }
            '[' => bracket += 1,
            ']' => {
                bracket -= 1;
                if bracket < 0 {
                    return None;
                }
            }
            ',' if paren == 1 && brace == 0 && bracket == 0 => {
                push_arg(source, &mut args, arg_start, at);
                arg_start = at + 1;
            }
            _ => {}
        }
    }

    // Ran off the end of the file: unterminated string or unbalanced call.
    None
}

/// Record the trimmed span of one argument; empty arguments (e.g. a
/// trailing comma) record nothing.
fn push_arg(source: &str, args: &mut Vec<(usize, usize)>, start: usize, end: usize) {
    let text = &source[start..end];
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return;
    }
    let lead = text.len() - text.trim_start().len();
    args.push((start + lead, start + lead + trimmed.len()));
}

/// Byte offsets where each line starts. Line 1 starts at offset 0.
fn build_line_index(content: &str) -> Vec<usize> {
    let mut offsets = vec![0];
    for (i, c) in content.char_indices() {
        if c == '\n' {
            offsets.push(i + 1);
        }
    }
    offsets
}

/// 1-based (line, column) for a byte offset, via binary search.
fn position_at(line_index: &[usize], offset: usize) -> (usize, usize) {
    let line = match line_index.binary_search(&offset) {
        Ok(line) => line + 1,
        Err(line) => line,
    };
    let column = offset - line_index[line - 1] + 1;
    (line, column)
}

#[cfg(test)]
mod tests {
    use crate::core::matcher::*;
    use pretty_assertions::assert_eq;

    fn matcher() -> TagMatcher {
        TagMatcher::new("tr").unwrap()
    }

    #[test]
    fn test_single_match_with_two_args() {
        let source = r#"const label = tr({title: "Hi"}, {namespace: "common"});"#;
        let matches = matcher().matches(source);

        assert_eq!(matches.len(), 1);
        let m = &matches[0];
        assert_eq!(m.variable_name.as_deref(), Some("label"));
        assert_eq!(m.param1.as_ref().unwrap().text, r#"{title: "Hi"}"#);
        assert_eq!(m.param2.as_ref().unwrap().text, r#"{namespace: "common"}"#);
        assert_eq!(&source[m.start..m.end], m.text);
    }

    #[test]
    fn test_matches_in_source_order_with_offsets() {
        let source = "tr({a: \"1\"});\nlet x = tr({b: \"2\"});\ntr({c: \"3\"});";
        let matches = matcher().matches(source);

        assert_eq!(matches.len(), 3);
        for m in &matches {
            assert_eq!(&source[m.start..m.end], m.text);
            for arg in [&m.param1, &m.param2].into_iter().flatten() {
                assert_eq!(&source[arg.start..arg.end], arg.text);
            }
        }
        assert_eq!(matches[0].line, 1);
        assert_eq!(matches[1].line, 2);
        assert_eq!(matches[1].variable_name.as_deref(), Some("x"));
        assert_eq!(matches[2].line, 3);
        assert_eq!(matches[2].column, 1);
    }

    #[test]
    fn test_nested_braces_and_parens_balanced() {
        let source = r#"tr({outer: {inner: {deep: "v (x)"}}}, {path: "a.b"})"#;
        let matches = matcher().matches(source);

        assert_eq!(matches.len(), 1);
        assert_eq!(
            matches[0].param1.as_ref().unwrap().text,
            r#"{outer: {inner: {deep: "v (x)"}}}"#
        );
    }

    #[test]
    fn test_strings_with_escaped_quotes_and_delimiters() {
        let source = r#"tr({msg: "brace } paren ) quote \" done", other: 'single \' ok'})"#;
        let matches = matcher().matches(source);

        assert_eq!(matches.len(), 1);
        assert!(matches[0].param2.is_none());
        assert!(
            matches[0]
                .param1
                .as_ref()
                .unwrap()
                .text
                .contains(r#"brace } paren )"#)
        );
    }

    #[test]
    fn test_commas_inside_nested_structures_do_not_split() {
        let source = r#"tr({a: "1", nested: {b: "2", c: "3"}}, {namespace: "n"})"#;
        let matches = matcher().matches(source);

        assert_eq!(matches.len(), 1);
        assert_eq!(
            matches[0].param1.as_ref().unwrap().text,
            r#"{a: "1", nested: {b: "2", c: "3"}}"#
        );
    }

    #[test]
    fn test_unbalanced_call_yields_no_match() {
        let source = "tr({never: \"closed\"";
        assert!(matcher().matches(source).is_empty());
    }

    #[test]
    fn test_unbalanced_call_does_not_swallow_later_match() {
        let source = "tr({broken);\ntr({ok: \"1\"});";
        let matches = matcher().matches(source);

        // The first occurrence closes its paren while a brace is still
        // open, so only the second call matches.
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].param1.as_ref().unwrap().text, "{ok: \"1\"}");
    }

    #[test]
    fn test_other_identifiers_not_matched() {
        let source = "translate({a: \"1\"}); entry({b: \"2\"});";
        assert!(matcher().matches(source).is_empty());
    }

    #[test]
    fn test_multiline_arguments() {
        let source = "tr(\n  {\n    title: \"Hi\",\n  },\n  {namespace: \"common\"}\n)";
        let matches = matcher().matches(source);

        assert_eq!(matches.len(), 1);
        let m = &matches[0];
        assert_eq!(m.param1.as_ref().unwrap().text, "{\n    title: \"Hi\",\n  }");
        assert_eq!(m.param2.as_ref().unwrap().text, "{namespace: \"common\"}");
    }

    #[test]
    fn test_trailing_comma_in_call() {
        let source = "tr({a: \"1\"},)";
        let matches = matcher().matches(source);

        assert_eq!(matches.len(), 1);
        assert!(matches[0].param2.is_none());
    }

    #[test]
    fn test_utf8_source_positions() {
        let source = "// héllo wörld\nconst s = tr({grüße: \"Grüße\"});";
        let matches = matcher().matches(source);

        assert_eq!(matches.len(), 1);
        let m = &matches[0];
        assert_eq!(m.line, 2);
        assert_eq!(&source[m.start..m.end], m.text);
        assert_eq!(m.variable_name.as_deref(), Some("s"));
    }

    #[test]
    fn test_no_args_call() {
        let source = "tr()";
        let matches = matcher().matches(source);

        assert_eq!(matches.len(), 1);
        assert!(matches[0].param1.is_none());
        assert!(matches[0].param2.is_none());
    }

    #[test]
    fn test_custom_tag_name() {
        let source = "i18nTag({a: \"1\"}); tr({b: \"2\"});";
        let matches = TagMatcher::new("i18nTag").unwrap().matches(source);

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].param1.as_ref().unwrap().text, "{a: \"1\"}");
    }

    #[test]
    fn test_dollar_prefixed_tag_name() {
        let source = "const x = $t({a: \"1\"});\n$t({b: \"2\"});";
        let matches = TagMatcher::new("$t").unwrap().matches(source);

        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].variable_name.as_deref(), Some("x"));
        assert_eq!(matches[0].param1.as_ref().unwrap().text, "{a: \"1\"}");
        assert_eq!(matches[1].line, 2);

        // A longer identifier ending in the tag name is still no match.
        assert!(TagMatcher::new("$t").unwrap().matches("a$t({c: \"3\"})").is_empty());
    }

    #[test]
    fn test_template_literal_argument_contents_skipped() {
        let source = "tr({msg: `has ) and } inside`})";
        let matches = matcher().matches(source);

        assert_eq!(matches.len(), 1);
    }
}
