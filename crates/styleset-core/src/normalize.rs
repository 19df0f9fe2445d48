//! Declaration normalizer.
//!
//! Compiles raw [`Declarations`] into [`Node`] trees bound to their owning
//! scope:
//!
//! - function bodies become [`Resolver::Body`]
//! - groups with an `attributes` entry become [`Node::Inheriting`], and every
//!   resolver below them evaluates that parent first
//! - other groups become [`Node::Container`]
//! - flat mappings become [`Resolver::Constant`]
//!
//! Bare values where a declaration is expected are rejected here, at
//! registration time.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::declaration::{Declaration, Declarations};
use crate::node::{Node, Resolver};
use crate::scope::ScopeId;
use crate::{StyleError, StyleResult, ATTRIBUTES_KEY};

/// Normalize a whole declaration tree for `scope`.
///
/// Either every declaration normalizes or none is returned.
pub fn normalize(decls: Declarations, scope: ScopeId) -> StyleResult<BTreeMap<String, Node>> {
    decls
        .into_iter()
        .map(|(name, decl)| {
            let node = normalize_node(decl, scope, &name)?;
            Ok((name, node))
        })
        .collect()
}

fn normalize_node(decl: Declaration, scope: ScopeId, path: &str) -> StyleResult<Node> {
    match decl {
        Declaration::Body(body) => Ok(Node::Leaf(Arc::new(Resolver::Body { body, scope }))),
        Declaration::Attributes(attrs) => Ok(Node::Leaf(Arc::new(Resolver::Constant(attrs)))),
        Declaration::Group(mut children) => match children.remove(ATTRIBUTES_KEY) {
            Some(attributes) => {
                let parent = normalize_parent(attributes, scope, &child_path(path, ATTRIBUTES_KEY))?;
                let children = normalize_children(children, scope, path)?
                    .into_iter()
                    .map(|(name, node)| (name, node.inherit_from(&parent)))
                    .collect();
                Ok(Node::Inheriting { parent, children })
            }
            None => Ok(Node::Container(normalize_children(children, scope, path)?)),
        },
        Declaration::Value(value) => Err(malformed(
            path,
            format!("expected a declaration, found bare value {value}"),
        )),
    }
}

/// The `attributes` entry must itself be invokable.
fn normalize_parent(decl: Declaration, scope: ScopeId, path: &str) -> StyleResult<Arc<Resolver>> {
    let node = normalize_node(decl, scope, path)?;
    node.resolver().cloned().ok_or_else(|| {
        malformed(
            path,
            "the `attributes` entry must be attributes or a function, not a group".to_string(),
        )
    })
}

fn normalize_children(
    children: BTreeMap<String, Declaration>,
    scope: ScopeId,
    path: &str,
) -> StyleResult<BTreeMap<String, Node>> {
    children
        .into_iter()
        .map(|(name, child)| {
            let node = normalize_node(child, scope, &child_path(path, &name))?;
            Ok((name, node))
        })
        .collect()
}

fn child_path(parent: &str, name: &str) -> String {
    format!("{parent}.{name}")
}

fn malformed(path: &str, message: String) -> StyleError {
    StyleError::MalformedDeclaration {
        path: path.to_string(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn normalize_json(value: serde_json::Value) -> StyleResult<BTreeMap<String, Node>> {
        normalize(Declarations::from_json(value)?, ScopeId::ROOT)
    }

    fn shape(node: &Node) -> String {
        match node {
            Node::Leaf(resolver) => match resolver.as_ref() {
                Resolver::Constant(_) => "constant".into(),
                Resolver::Body { .. } => "body".into(),
                Resolver::Inherit { .. } => "inherit".into(),
            },
            Node::Container(children) => format!("container({})", children.len()),
            Node::Inheriting { children, .. } => format!("inheriting({})", children.len()),
        }
    }

    // =========================================================================
    // Shapes
    // =========================================================================

    #[test]
    fn test_flat_mapping_is_constant() {
        let nodes = normalize_json(json!({ "test1": { "minWidth": 1 } })).unwrap();
        assert_eq!(shape(&nodes["test1"]), "constant");
    }

    #[test]
    fn test_body_is_leaf() {
        let decls = Declarations::new().with("b", Declaration::body(|css| Ok(css.val())));
        let nodes = normalize(decls, ScopeId::ROOT).unwrap();
        assert_eq!(shape(&nodes["b"]), "body");
    }

    #[test]
    fn test_nested_without_attributes_is_container() {
        let nodes = normalize_json(json!({
            "top": { "bottom": { "test": 1 }, "side": { "test": 2 } }
        }))
        .unwrap();
        assert_eq!(shape(&nodes["top"]), "container(2)");
        assert_eq!(shape(nodes["top"].child("bottom").unwrap()), "constant");
    }

    #[test]
    fn test_attributes_marker_wraps_children() {
        let nodes = normalize_json(json!({
            "group": {
                "attributes": { "color": "#fff" },
                "child": { "padding": "3px" }
            }
        }))
        .unwrap();
        let group = &nodes["group"];
        assert_eq!(shape(group), "inheriting(1)");
        assert!(group.child(ATTRIBUTES_KEY).is_none());
        assert_eq!(shape(group.child("child").unwrap()), "inherit");
    }

    #[test]
    fn test_inheritance_reaches_through_containers() {
        let nodes = normalize_json(json!({
            "group": {
                "attributes": { "a": 1 },
                "inner": { "leaf": { "b": 2 }, "other": { "c": 3 } }
            }
        }))
        .unwrap();
        let inner = nodes["group"].child("inner").unwrap();
        assert_eq!(shape(inner), "container(2)");
        assert_eq!(shape(inner.child("leaf").unwrap()), "inherit");
    }

    #[test]
    fn test_attributes_only_group() {
        let nodes = normalize_json(json!({ "g": { "attributes": { "a": 1 } } })).unwrap();
        assert_eq!(shape(&nodes["g"]), "inheriting(0)");
        assert!(nodes["g"].resolver().is_some());
    }

    // =========================================================================
    // Malformed input
    // =========================================================================

    #[test]
    fn test_bare_value_at_top_level() {
        let err = normalize_json(json!({ "oops": 3 })).unwrap_err();
        assert_eq!(
            err,
            StyleError::MalformedDeclaration {
                path: "oops".into(),
                message: "expected a declaration, found bare value 3".into(),
            }
        );
    }

    #[test]
    fn test_bare_value_mixed_with_nested() {
        let err = normalize_json(json!({ "g": { "a": { "x": 1 }, "b": "red" } })).unwrap_err();
        assert!(matches!(
            err,
            StyleError::MalformedDeclaration { ref path, .. } if path == "g.b"
        ));
    }

    #[test]
    fn test_attributes_entry_must_be_invokable() {
        let err = normalize_json(json!({
            "g": { "attributes": { "nested": { "x": 1 } }, "c": { "y": 2 } }
        }))
        .unwrap_err();
        assert!(matches!(
            err,
            StyleError::MalformedDeclaration { ref path, .. } if path == "g.attributes"
        ));
    }

    #[test]
    fn test_attributes_entry_bare_value() {
        let err = normalize_json(json!({ "g": { "attributes": 1, "c": { "y": 2 } } })).unwrap_err();
        assert!(matches!(err, StyleError::MalformedDeclaration { .. }));
    }
}
