//! Normalized declaration tree.
//!
//! The normalizer inspects raw shapes once; after that every node is one of
//! three variants and every invokable declaration is a [`Resolver`].

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::context::{Context, Evaluation};
use crate::declaration::DeclarationFn;
use crate::scope::ScopeId;
use crate::{merge, Attributes, StyleResult};

/// The invokable form of a declaration.
pub enum Resolver {
    /// Returns a copy of a fixed mapping.
    Constant(Attributes),

    /// Runs a declaration body against a fresh context in its owning scope.
    Body { body: DeclarationFn, scope: ScopeId },

    /// Resolves `parent`, then `child`, child keys winning.
    Inherit {
        parent: Arc<Resolver>,
        child: Arc<Resolver>,
    },
}

impl Resolver {
    pub(crate) fn invoke(&self, eval: &mut Evaluation<'_>) -> StyleResult<Attributes> {
        match self {
            Resolver::Constant(attrs) => Ok(attrs.clone()),
            Resolver::Body { body, scope } => {
                let mut ctx = Context::new(eval, *scope);
                let returned = body(&mut ctx)?;
                Ok(ctx.finish(returned))
            }
            Resolver::Inherit { parent, child } => {
                let mut attrs = parent.invoke(eval)?;
                merge(&mut attrs, child.invoke(eval)?);
                Ok(attrs)
            }
        }
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolver::Constant(attrs) => f.debug_tuple("Constant").field(attrs).finish(),
            Resolver::Body { scope, .. } => f.debug_struct("Body").field("scope", scope).finish(),
            Resolver::Inherit { parent, child } => f
                .debug_struct("Inherit")
                .field("parent", parent)
                .field("child", child)
                .finish(),
        }
    }
}

/// A node of the normalized tree.
#[derive(Debug, Clone)]
pub enum Node {
    /// An invokable declaration with no children.
    Leaf(Arc<Resolver>),

    /// A grouping used only for path traversal. Not invokable.
    Container(BTreeMap<String, Node>),

    /// A declaration with an `attributes` parent. Invoking it resolves the
    /// parent; its children already inherit from it.
    Inheriting {
        parent: Arc<Resolver>,
        children: BTreeMap<String, Node>,
    },
}

impl Node {
    /// The resolver to run when this node is queried directly.
    pub fn resolver(&self) -> Option<&Arc<Resolver>> {
        match self {
            Node::Leaf(resolver) | Node::Inheriting { parent: resolver, .. } => Some(resolver),
            Node::Container(_) => None,
        }
    }

    pub fn child(&self, name: &str) -> Option<&Node> {
        match self {
            Node::Leaf(_) => None,
            Node::Container(children) | Node::Inheriting { children, .. } => children.get(name),
        }
    }

    /// Make every resolver under this node evaluate `parent` first.
    pub(crate) fn inherit_from(self, parent: &Arc<Resolver>) -> Node {
        let wrap = |resolver: Arc<Resolver>| {
            Arc::new(Resolver::Inherit {
                parent: Arc::clone(parent),
                child: resolver,
            })
        };
        let wrap_all = |children: BTreeMap<String, Node>| {
            children
                .into_iter()
                .map(|(name, node)| (name, node.inherit_from(parent)))
                .collect::<BTreeMap<_, _>>()
        };

        match self {
            Node::Leaf(resolver) => Node::Leaf(wrap(resolver)),
            Node::Container(children) => Node::Container(wrap_all(children)),
            Node::Inheriting {
                parent: own,
                children,
            } => Node::Inheriting {
                parent: wrap(own),
                children: wrap_all(children),
            },
        }
    }
}
