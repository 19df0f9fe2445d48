//! Selector expansion.
//!
//! Bracket shorthand is substituted textually in a single pass, then the
//! result is split on separators into dotted paths. Nested or unclosed
//! brackets, and brackets with text stuck to the closing `]`, are left as
//! literal text; they never match a declaration, so they surface later as
//! an unknown path.

use std::borrow::Cow;

use crate::path::Path;

/// Whitespace and commas separate path expressions.
pub fn is_separator(c: char) -> bool {
    c.is_whitespace() || c == ','
}

/// Expand a selector into canonical paths, in selector order.
///
/// An empty selector expands to no paths.
pub fn expand(selector: &str) -> Vec<Path> {
    substitute_shorthand(selector)
        .split(is_separator)
        .filter_map(Path::parse)
        .collect()
}

/// Rewrite every `parent[c1 c2]` into ` parent.c1 parent.c2 `.
fn substitute_shorthand(selector: &str) -> Cow<'_, str> {
    if !selector.contains('[') {
        return Cow::Borrowed(selector);
    }

    let mut out = String::with_capacity(selector.len() * 2);
    let mut rest = selector;

    while let Some(open) = rest.find('[') {
        let (head, tail) = rest.split_at(open);
        let Some(close) = tail.find(']') else {
            break;
        };

        let parent_start = head
            .char_indices()
            .rev()
            .find(|(_, c)| is_separator(*c))
            .map_or(0, |(i, c)| i + c.len_utf8());
        let parent = &head[parent_start..];
        let inner = &tail[1..close];
        let mut children = inner.split(is_separator).filter(|c| !c.is_empty()).peekable();
        let attached = tail[close + 1..].chars().next().is_some_and(|c| !is_separator(c));

        out.push_str(&head[..parent_start]);
        if parent.is_empty() || attached || inner.contains('[') || children.peek().is_none() {
            out.push_str(parent);
            out.push_str(&tail[..=close]);
        } else {
            for child in children {
                out.push(' ');
                out.push_str(parent);
                out.push('.');
                out.push_str(child);
            }
            out.push(' ');
        }

        rest = &tail[close + 1..];
    }

    out.push_str(rest);
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn dotted(selector: &str) -> Vec<String> {
        expand(selector).iter().map(|p| p.to_string()).collect()
    }

    // =========================================================================
    // Plain paths
    // =========================================================================

    #[test]
    fn test_empty_selector() {
        assert!(expand("").is_empty());
        assert!(expand("  , \n").is_empty());
    }

    #[test]
    fn test_single_path() {
        assert_eq!(dotted("myClass"), vec!["myClass"]);
    }

    #[test]
    fn test_whitespace_and_commas() {
        assert_eq!(dotted("a b,c ,\td.e"), vec!["a", "b", "c", "d.e"]);
    }

    #[test]
    fn test_namespace_prefixed() {
        assert_eq!(dotted("foo.bar"), vec!["foo.bar"]);
    }

    // =========================================================================
    // Bracket shorthand
    // =========================================================================

    #[test]
    fn test_bracket_shorthand() {
        assert_eq!(dotted("a[b c]"), vec!["a.b", "a.c"]);
    }

    #[test]
    fn test_bracket_with_commas() {
        assert_eq!(dotted("a[b,c, d]"), vec!["a.b", "a.c", "a.d"]);
    }

    #[test]
    fn test_bracket_dotted_parent() {
        assert_eq!(
            dotted("x top.bottom[foo bar] y"),
            vec!["x", "top.bottom.foo", "top.bottom.bar", "y"]
        );
    }

    #[test]
    fn test_bracket_dotted_children() {
        assert_eq!(dotted("a[b.c d]"), vec!["a.b.c", "a.d"]);
    }

    #[test]
    fn test_multiple_brackets() {
        assert_eq!(dotted("a[b] c[d e]"), vec!["a.b", "c.d", "c.e"]);
    }

    #[test]
    fn test_nested_brackets_left_literal() {
        assert_eq!(dotted("a[b[c d]]"), vec!["a[b[c", "d]]"]);
    }

    #[test]
    fn test_unclosed_bracket_left_literal() {
        assert_eq!(dotted("a[b c"), vec!["a[b", "c"]);
    }

    #[test]
    fn test_empty_brackets_left_literal() {
        assert_eq!(dotted("a[]"), vec!["a[]"]);
    }

    #[test]
    fn test_text_after_closing_bracket_left_literal() {
        assert_eq!(dotted("a[b c]d x[y]z.q"), vec!["a[b", "c]d", "x[y]z.q"]);
        assert_eq!(dotted("a[b c]d e[f]"), vec!["a[b", "c]d", "e.f"]);
    }

    #[test]
    fn test_bracket_without_parent_left_literal() {
        assert_eq!(dotted("[b c]"), vec!["[b", "c]"]);
    }
}
