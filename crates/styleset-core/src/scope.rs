//! Scopes: one per namespace plus the root.
//!
//! Each scope owns its normalized declarations, variables and mixins and
//! points at a parent. Variable and mixin lookups walk that chain until a
//! scope answers.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde_json::Value;

use crate::declaration::MixinFn;
use crate::node::Node;
use crate::Attributes;

/// Handle to a scope inside its [`Registry`](crate::Registry).
///
/// Namespace ids carry the registry generation they were issued in, so an id
/// kept across [`Registry::reset`](crate::Registry::reset) no longer matches
/// any scope. The root id is valid in every generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId {
    pub(crate) index: usize,
    pub(crate) generation: u64,
}

impl ScopeId {
    /// The root scope always comes first.
    pub const ROOT: ScopeId = ScopeId {
        index: 0,
        generation: 0,
    };

    pub(crate) fn namespace(index: usize, generation: u64) -> Self {
        Self { index, generation }
    }

    pub fn is_root(self) -> bool {
        self.index == Self::ROOT.index
    }
}

/// A namespace (or the root) with its declarations, variables and mixins.
pub struct Scope {
    pub(crate) name: Option<String>,
    pub(crate) parent: Option<ScopeId>,
    pub(crate) declarations: BTreeMap<String, Node>,
    pub(crate) variables: Attributes,
    pub(crate) mixins: HashMap<String, MixinFn>,
}

impl Scope {
    pub(crate) fn root() -> Self {
        Self::new(None, None)
    }

    pub(crate) fn namespace(name: &str, parent: ScopeId) -> Self {
        Self::new(Some(name.to_string()), Some(parent))
    }

    fn new(name: Option<String>, parent: Option<ScopeId>) -> Self {
        Self {
            name,
            parent,
            declarations: BTreeMap::new(),
            variables: Attributes::new(),
            mixins: HashMap::new(),
        }
    }

    /// Namespace name; `None` for the root.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn parent(&self) -> Option<ScopeId> {
        self.parent
    }

    /// Top-level normalized declarations.
    pub fn declarations(&self) -> &BTreeMap<String, Node> {
        &self.declarations
    }

    /// A variable defined directly on this scope.
    pub fn variable(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    /// A mixin defined directly on this scope.
    pub fn mixin(&self, name: &str) -> Option<&MixinFn> {
        self.mixins.get(name)
    }

    /// Label used in logs and error chains.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("root")
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut mixins: Vec<_> = self.mixins.keys().collect();
        mixins.sort();
        f.debug_struct("Scope")
            .field("name", &self.name)
            .field("parent", &self.parent)
            .field("declarations", &self.declarations.keys().collect::<Vec<_>>())
            .field("variables", &self.variables)
            .field("mixins", &mixins)
            .finish()
    }
}
