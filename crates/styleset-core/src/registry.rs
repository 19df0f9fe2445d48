//! Namespace registry and path resolver.
//!
//! The registry owns the root scope, one scope per namespace and the
//! selector cache. Registration normalizes declarations into a scope;
//! queries locate resolvers by path and run them.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde_json::Value;
use styleset_path::{Path, Selector, SelectorCache};

use crate::context::Vars;
use crate::declaration::{Declarations, MixinFn};
use crate::node::{Node, Resolver};
use crate::normalize::normalize;
use crate::options::RegistryOptions;
use crate::query::Query;
use crate::scope::{Scope, ScopeId};
use crate::{Attributes, StyleError, StyleResult};

/// A resolver found by [`Registry::locate`].
#[derive(Debug)]
pub struct Located<'r> {
    /// The scope whose tree holds the declaration.
    pub scope: ScopeId,
    /// Dotted path inside that scope.
    pub key: String,
    /// Dotted path qualified by namespace, for messages.
    pub label: String,
    pub resolver: &'r Arc<Resolver>,
}

enum Walk<'a> {
    Found(&'a Node),
    /// The first segment is not declared.
    MissingHead,
    /// The first segment matched but a later one did not.
    Missing,
}

fn walk<'a>(tree: &'a BTreeMap<String, Node>, segments: &[String]) -> Walk<'a> {
    let Some((head, rest)) = segments.split_first() else {
        return Walk::MissingHead;
    };
    let Some(mut node) = tree.get(head) else {
        return Walk::MissingHead;
    };
    for segment in rest {
        match node.child(segment) {
            Some(child) => node = child,
            None => return Walk::Missing,
        }
    }
    Walk::Found(node)
}

/// Scopes, declarations, variables and mixins for one styling setup.
#[derive(Debug)]
pub struct Registry {
    scopes: Vec<Scope>,
    namespaces: HashMap<String, ScopeId>,
    selectors: SelectorCache,
    options: RegistryOptions,
    generation: u64,
}

impl Default for Registry {
    fn default() -> Self {
        Self::with_options(RegistryOptions::default())
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: RegistryOptions) -> Self {
        Self {
            scopes: vec![Scope::root()],
            namespaces: HashMap::new(),
            selectors: SelectorCache::with_limit(options.selector_cache_limit),
            options,
            generation: 0,
        }
    }

    pub fn options(&self) -> &RegistryOptions {
        &self.options
    }

    /// Drop every scope, variable, mixin and cached selector. Options stay.
    ///
    /// Namespace ids issued before the reset stop resolving.
    pub fn reset(&mut self) {
        tracing::debug!(namespaces = self.namespaces.len(), "resetting registry");
        self.generation += 1;
        self.scopes = vec![Scope::root()];
        self.namespaces.clear();
        self.selectors.clear();
    }

    // =========================================================================
    // Scopes
    // =========================================================================

    pub fn root(&self) -> &Scope {
        &self.scopes[ScopeId::ROOT.index]
    }

    /// The scope for `id`; `None` for ids from before the last reset.
    pub fn scope(&self, id: ScopeId) -> Option<&Scope> {
        if !id.is_root() && id.generation != self.generation {
            return None;
        }
        self.scopes.get(id.index)
    }

    /// The scope registered for `name`, if any.
    pub fn namespace(&self, name: &str) -> Option<ScopeId> {
        self.namespaces.get(name).copied()
    }

    /// `id` followed by each of its parents, up to the root.
    pub fn ancestors(&self, id: ScopeId) -> impl Iterator<Item = &Scope> + '_ {
        std::iter::successors(self.scope(id), move |scope| {
            scope.parent.and_then(|parent| self.scope(parent))
        })
    }

    /// The scope for `namespace` (root for `None`), created on first use.
    fn ensure_scope(&mut self, namespace: Option<&str>) -> ScopeId {
        let Some(name) = namespace else {
            return ScopeId::ROOT;
        };
        if let Some(id) = self.namespace(name) {
            return id;
        }
        let id = self.next_scope_id();
        self.scopes.push(Scope::namespace(name, ScopeId::ROOT));
        self.namespaces.insert(name.to_string(), id);
        tracing::debug!(namespace = name, "created scope");
        id
    }

    fn next_scope_id(&self) -> ScopeId {
        ScopeId::namespace(self.scopes.len(), self.generation)
    }

    fn scope_mut(&mut self, id: ScopeId) -> &mut Scope {
        &mut self.scopes[id.index]
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Normalize `decls` into the namespace's scope (root for `None`).
    ///
    /// Names already registered there are kept unless redeclared. On error
    /// the scope is left as it was.
    pub fn register(&mut self, namespace: Option<&str>, decls: Declarations) -> StyleResult<ScopeId> {
        // Normalize against the id the scope has or will get, so a failure
        // never leaves an empty namespace behind.
        let id = match namespace {
            None => ScopeId::ROOT,
            Some(name) => self
                .namespace(name)
                .unwrap_or_else(|| self.next_scope_id()),
        };
        let nodes = normalize(decls, id)?;

        let id = self.ensure_scope(namespace);
        tracing::debug!(
            namespace = namespace.unwrap_or("root"),
            declarations = nodes.len(),
            "registered declarations"
        );
        self.scope_mut(id).declarations.extend(nodes);
        Ok(id)
    }

    /// Build declarations with access to the registry, then register them.
    pub fn register_with<F>(&mut self, namespace: Option<&str>, factory: F) -> StyleResult<ScopeId>
    where
        F: FnOnce(&Registry) -> Declarations,
    {
        let decls = factory(self);
        self.register(namespace, decls)
    }

    /// Define variables on the namespace's scope (root for `None`).
    pub fn define_variables(&mut self, namespace: Option<&str>, variables: Attributes) -> ScopeId {
        let id = self.ensure_scope(namespace);
        tracing::debug!(
            namespace = namespace.unwrap_or("root"),
            variables = variables.len(),
            "defined variables"
        );
        crate::merge(&mut self.scope_mut(id).variables, variables);
        id
    }

    /// Define a mixin on the namespace's scope (root for `None`).
    pub fn define_mixin<F>(&mut self, namespace: Option<&str>, name: &str, mixin: F) -> ScopeId
    where
        F: Fn(&Vars<'_>, &[Value]) -> Attributes + Send + Sync + 'static,
    {
        let id = self.ensure_scope(namespace);
        tracing::debug!(namespace = namespace.unwrap_or("root"), mixin = name, "defined mixin");
        let mixin: MixinFn = Arc::new(mixin);
        self.scope_mut(id).mixins.insert(name.to_string(), mixin);
        id
    }

    /// Look a mixin up from `from` through its parents.
    pub fn find_mixin(&self, name: &str, from: ScopeId) -> Option<&MixinFn> {
        self.ancestors(from).find_map(|scope| scope.mixin(name))
    }

    // =========================================================================
    // Resolution
    // =========================================================================

    /// Expand a selector string through the cache.
    pub fn expand(&self, selector: &str) -> Arc<[Path]> {
        self.selectors.expand(selector)
    }

    pub(crate) fn expand_selector(&self, selector: &Selector) -> Vec<Path> {
        self.selectors.expand_selector(selector)
    }

    /// Find the resolver for `path`, starting in `start`.
    ///
    /// Tries the start scope's own tree first. When the first segment is not
    /// declared there, a first segment naming another namespace continues in
    /// that namespace; otherwise namespaced lookups fall back to the root's
    /// declarations (unless disabled in [`RegistryOptions`]).
    pub fn locate(&self, path: &Path, start: ScopeId) -> StyleResult<Located<'_>> {
        let unknown = || StyleError::UnknownPath {
            path: path.to_string(),
        };
        let scope = self.scope(start).ok_or_else(unknown)?;

        match walk(&scope.declarations, path.segments()) {
            Walk::Found(node) => return self.leaf(node, start, path.segments(), path),
            Walk::Missing => return Err(unknown()),
            Walk::MissingHead => {}
        }

        if let Some(other) = self.namespace(path.head()).filter(|&id| id != start) {
            if path.tail().is_empty() {
                return Err(StyleError::NotALeaf {
                    path: path.to_string(),
                });
            }
            tracing::trace!(path = %path, namespace = path.head(), "resolving in namespace");
            return match walk(&self.scopes[other.index].declarations, path.tail()) {
                Walk::Found(node) => self.leaf(node, other, path.tail(), path),
                Walk::Missing | Walk::MissingHead => Err(unknown()),
            };
        }

        if !start.is_root() && self.options.root_fallback {
            if let Walk::Found(node) = walk(&self.root().declarations, path.segments()) {
                tracing::trace!(path = %path, "falling back to root declarations");
                return self.leaf(node, ScopeId::ROOT, path.segments(), path);
            }
        }

        Err(unknown())
    }

    fn leaf<'a>(
        &'a self,
        node: &'a Node,
        scope: ScopeId,
        segments: &[String],
        path: &Path,
    ) -> StyleResult<Located<'a>> {
        let resolver = node.resolver().ok_or_else(|| StyleError::NotALeaf {
            path: path.to_string(),
        })?;
        let key = segments.join(".");
        let label = match self.scopes[scope.index].name() {
            Some(namespace) => format!("{namespace}.{key}"),
            None => key.clone(),
        };
        Ok(Located {
            scope,
            key,
            label,
            resolver,
        })
    }

    /// A query over the root scope.
    pub fn query(&self, selector: impl Into<Selector>) -> Query<'_> {
        self.query_in(ScopeId::ROOT, selector)
    }

    /// A query starting in `scope`.
    pub fn query_in(&self, scope: ScopeId, selector: impl Into<Selector>) -> Query<'_> {
        Query::new(self, scope, selector.into())
    }

    /// Resolve a selector over the root scope with no overrides.
    pub fn resolve(&self, selector: impl Into<Selector>) -> StyleResult<Attributes> {
        self.query(selector).resolve()
    }

    /// Resolve a selector starting in `scope` with no overrides.
    pub fn resolve_in(&self, scope: ScopeId, selector: impl Into<Selector>) -> StyleResult<Attributes> {
        self.query_in(scope, selector).resolve()
    }
}
