use std::fmt;

/// A canonical declaration path: a non-empty, ordered list of segments.
///
/// Equality is structural and case-sensitive. Displayed joined with `.`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path {
    segments: Vec<String>,
}

impl Path {
    /// Parse a plain dotted path. Empty segments are dropped; returns `None`
    /// when nothing is left.
    pub fn parse(dotted: &str) -> Option<Self> {
        Self::from_segments(
            dotted
                .split('.')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    /// Build a path from pre-split segments. Returns `None` for an empty list.
    pub fn from_segments(segments: Vec<String>) -> Option<Self> {
        if segments.is_empty() {
            None
        } else {
            Some(Self { segments })
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The first segment. Always present.
    pub fn head(&self) -> &str {
        &self.segments[0]
    }

    /// Everything after the first segment.
    pub fn tail(&self) -> &[String] {
        &self.segments[1..]
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Never true for a parsed path.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

/// A query selector, given either as one string or as a list of strings.
///
/// Each list element is expanded on its own and the results concatenated in
/// order, so list elements may use bracket shorthand too.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Text(String),
    List(Vec<String>),
}

impl Selector {
    /// The individual selector strings, in order.
    pub fn parts(&self) -> Vec<&str> {
        match self {
            Selector::Text(text) => vec![text.as_str()],
            Selector::List(items) => items.iter().map(String::as_str).collect(),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Text(text) => f.write_str(text),
            Selector::List(items) => f.write_str(&items.join(" ")),
        }
    }
}

impl From<&str> for Selector {
    fn from(text: &str) -> Self {
        Selector::Text(text.to_string())
    }
}

impl From<String> for Selector {
    fn from(text: String) -> Self {
        Selector::Text(text)
    }
}

impl From<&String> for Selector {
    fn from(text: &String) -> Self {
        Selector::Text(text.clone())
    }
}

impl From<Vec<String>> for Selector {
    fn from(items: Vec<String>) -> Self {
        Selector::List(items)
    }
}

impl From<Vec<&str>> for Selector {
    fn from(items: Vec<&str>) -> Self {
        Selector::List(items.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for Selector {
    fn from(items: &[&str]) -> Self {
        Selector::List(items.iter().map(|s| s.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Selector {
    fn from(items: [&str; N]) -> Self {
        Selector::List(items.iter().map(|s| s.to_string()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_dotted() {
        let path = Path::parse("top.bottom.foo").unwrap();
        assert_eq!(path.segments(), &["top", "bottom", "foo"]);
        assert_eq!(path.head(), "top");
        assert_eq!(path.tail(), &["bottom", "foo"]);
        assert_eq!(path.to_string(), "top.bottom.foo");
    }

    #[test]
    fn test_parse_drops_empty_segments() {
        let path = Path::parse(".a..b.").unwrap();
        assert_eq!(path.segments(), &["a", "b"]);
        assert_eq!(path.len(), 2);
        assert!(!path.is_empty());
    }

    #[test]
    fn test_parse_empty() {
        assert!(Path::parse("").is_none());
        assert!(Path::parse("...").is_none());
    }

    #[test]
    fn test_case_sensitive_equality() {
        assert_ne!(Path::parse("Card"), Path::parse("card"));
        assert_eq!(Path::parse("a.b"), Path::parse("a..b"));
    }

    #[test]
    fn test_selector_parts() {
        assert_eq!(Selector::from("a b").parts(), vec!["a b"]);
        assert_eq!(Selector::from(["a", "b[c]"]).parts(), vec!["a", "b[c]"]);
        assert_eq!(Selector::from(vec!["x", "y"]).to_string(), "x y");
    }
}
