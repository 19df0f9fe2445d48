//! Raw declaration trees, as authored by the embedding application.
//!
//! Trees are either built in Rust with [`Declarations::with`] or converted
//! from JSON. Nothing here is validated; the normalizer rejects malformed
//! shapes when the tree is registered.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::context::{Context, Vars};
use crate::{Attributes, StyleError, StyleResult};

/// A declaration body. Receives the resolution context and returns the
/// attributes to merge over whatever the context accumulated.
pub type DeclarationFn =
    Arc<dyn Fn(&mut Context<'_, '_>) -> StyleResult<Attributes> + Send + Sync>;

/// A mixin: variables of the calling query plus positional arguments in,
/// partial attributes out.
pub type MixinFn = Arc<dyn Fn(&Vars<'_>, &[Value]) -> Attributes + Send + Sync>;

/// One node of a raw declaration tree.
#[derive(Clone)]
pub enum Declaration {
    /// Flat attribute mapping, resolved as-is.
    Attributes(Attributes),

    /// Function body evaluated at query time.
    Body(DeclarationFn),

    /// Nested declarations, optionally with an `attributes` parent entry.
    Group(BTreeMap<String, Declaration>),

    /// A bare value. Only valid inside a flat attribute mapping, so it is
    /// rejected wherever a declaration is expected.
    Value(Value),
}

impl Declaration {
    /// Wrap a function body.
    pub fn body<F>(body: F) -> Self
    where
        F: Fn(&mut Context<'_, '_>) -> StyleResult<Attributes> + Send + Sync + 'static,
    {
        Declaration::Body(Arc::new(body))
    }

    /// Build a group from named children.
    pub fn group<I, K, D>(children: I) -> Self
    where
        I: IntoIterator<Item = (K, D)>,
        K: Into<String>,
        D: Into<Declaration>,
    {
        Declaration::Group(
            children
                .into_iter()
                .map(|(name, decl)| (name.into(), decl.into()))
                .collect(),
        )
    }

    /// Short name of the variant, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Declaration::Attributes(_) => "attributes",
            Declaration::Body(_) => "function",
            Declaration::Group(_) => "group",
            Declaration::Value(_) => "value",
        }
    }
}

impl fmt::Debug for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Declaration::Attributes(attrs) => f.debug_tuple("Attributes").field(attrs).finish(),
            Declaration::Body(_) => f.write_str("Body(..)"),
            Declaration::Group(children) => f.debug_tuple("Group").field(children).finish(),
            Declaration::Value(value) => f.debug_tuple("Value").field(value).finish(),
        }
    }
}

/// JSON objects holding at least one object are groups; other objects are
/// flat attribute mappings; anything else is a bare value.
impl From<Value> for Declaration {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => {
                if map.values().any(Value::is_object) {
                    Declaration::Group(
                        map.into_iter()
                            .map(|(name, child)| (name, Declaration::from(child)))
                            .collect(),
                    )
                } else {
                    Declaration::Attributes(map)
                }
            }
            other => Declaration::Value(other),
        }
    }
}

impl From<Attributes> for Declaration {
    fn from(attrs: Attributes) -> Self {
        Declaration::Attributes(attrs)
    }
}

impl From<DeclarationFn> for Declaration {
    fn from(body: DeclarationFn) -> Self {
        Declaration::Body(body)
    }
}

/// The top level of a raw declaration tree: named declarations.
#[derive(Debug, Clone, Default)]
pub struct Declarations {
    entries: BTreeMap<String, Declaration>,
}

impl Declarations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a named declaration.
    pub fn with(mut self, name: impl Into<String>, decl: impl Into<Declaration>) -> Self {
        self.insert(name, decl);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, decl: impl Into<Declaration>) {
        self.entries.insert(name.into(), decl.into());
    }

    /// Convert a JSON object whose entries are declarations.
    pub fn from_json(value: Value) -> StyleResult<Self> {
        match value {
            Value::Object(map) => Ok(map.into_iter().collect()),
            other => Err(StyleError::MalformedDeclaration {
                path: String::new(),
                message: format!("expected an object of declarations, found {other}"),
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Declaration)> {
        self.entries.iter()
    }
}

impl<K: Into<String>, D: Into<Declaration>> FromIterator<(K, D)> for Declarations {
    fn from_iter<I: IntoIterator<Item = (K, D)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(name, decl)| (name.into(), decl.into()))
                .collect(),
        }
    }
}

impl IntoIterator for Declarations {
    type Item = (String, Declaration);
    type IntoIter = std::collections::btree_map::IntoIter<String, Declaration>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_flat_object_is_attributes() {
        let decl = Declaration::from(json!({ "border": "solid 1px #000", "margin": 6 }));
        assert_eq!(decl.kind(), "attributes");
    }

    #[test]
    fn test_empty_object_is_attributes() {
        assert_eq!(Declaration::from(json!({})).kind(), "attributes");
    }

    #[test]
    fn test_nested_object_is_group() {
        let decl = Declaration::from(json!({
            "attributes": {},
            "child": { "padding": "2px" }
        }));
        let Declaration::Group(children) = decl else {
            panic!("expected a group");
        };
        assert_eq!(children.len(), 2);
        assert_eq!(children["attributes"].kind(), "attributes");
        assert_eq!(children["child"].kind(), "attributes");
    }

    #[test]
    fn test_mixed_object_keeps_bare_values() {
        let Declaration::Group(children) = Declaration::from(json!({ "a": { "x": 1 }, "b": 2 }))
        else {
            panic!("expected a group");
        };
        assert_eq!(children["b"].kind(), "value");
    }

    #[test]
    fn test_scalar_is_value() {
        assert_eq!(Declaration::from(json!(3)).kind(), "value");
    }

    #[test]
    fn test_declarations_from_json() {
        let decls = Declarations::from_json(json!({
            "a": { "x": 1 },
            "b": { "c": { "y": 2 } }
        }))
        .unwrap();
        assert_eq!(decls.len(), 2);
        let kinds: Vec<_> = decls.iter().map(|(n, d)| (n.as_str(), d.kind())).collect();
        assert_eq!(kinds, vec![("a", "attributes"), ("b", "group")]);
    }

    #[test]
    fn test_declarations_from_json_rejects_non_object() {
        let err = Declarations::from_json(json!([1, 2])).unwrap_err();
        assert!(matches!(err, StyleError::MalformedDeclaration { .. }));
    }

    #[test]
    fn test_with_replaces() {
        let decls = Declarations::new()
            .with("a", json!({ "x": 1 }))
            .with("a", Declaration::body(|css| Ok(css.val())));
        assert_eq!(decls.len(), 1);
        assert_eq!(decls.iter().next().unwrap().1.kind(), "function");
    }
}
