//! Resolution context handed to declaration bodies, and the variable
//! accessor shared with mixins.

use serde_json::Value;

use crate::registry::Registry;
use crate::scope::ScopeId;
use crate::{merge, Attributes, StyleError, StyleResult};
use styleset_path::Path;

/// Variable lookup for one query.
///
/// Checks the query's overrides, then the scope the query started in, then
/// each parent up to the root. A name missing everywhere is `None`.
#[derive(Clone, Copy)]
pub struct Vars<'r> {
    registry: &'r Registry,
    scope: ScopeId,
    overrides: &'r Attributes,
}

impl<'r> Vars<'r> {
    pub(crate) fn new(registry: &'r Registry, scope: ScopeId, overrides: &'r Attributes) -> Self {
        Self {
            registry,
            scope,
            overrides,
        }
    }

    pub fn get(&self, name: &str) -> Option<&'r Value> {
        self.overrides.get(name).or_else(|| {
            self.registry
                .ancestors(self.scope)
                .find_map(|scope| scope.variable(name))
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// The scope the query started in.
    pub fn scope(&self) -> ScopeId {
        self.scope
    }
}

struct Active {
    scope: ScopeId,
    key: String,
    label: String,
}

/// State of one query while it runs: the variable accessor and the paths
/// currently being resolved, for cycle detection.
pub(crate) struct Evaluation<'r> {
    registry: &'r Registry,
    vars: Vars<'r>,
    active: Vec<Active>,
}

impl<'r> Evaluation<'r> {
    pub(crate) fn new(registry: &'r Registry, start: ScopeId, overrides: &'r Attributes) -> Self {
        Self {
            registry,
            vars: Vars::new(registry, start, overrides),
            active: Vec::new(),
        }
    }

    pub(crate) fn registry(&self) -> &'r Registry {
        self.registry
    }

    pub(crate) fn vars(&self) -> Vars<'r> {
        self.vars
    }

    /// Locate `path` from `from` and invoke its resolver.
    pub(crate) fn resolve_path(&mut self, path: &Path, from: ScopeId) -> StyleResult<Attributes> {
        let registry = self.registry;
        let located = registry.locate(path, from)?;

        if self
            .active
            .iter()
            .any(|a| a.scope == located.scope && a.key == located.key)
        {
            let mut chain: Vec<String> = self.active.iter().map(|a| a.label.clone()).collect();
            chain.push(located.label.clone());
            return Err(StyleError::CyclicReference {
                path: located.label,
                chain,
            });
        }

        tracing::trace!(path = %located.label, depth = self.active.len(), "resolving");
        self.active.push(Active {
            scope: located.scope,
            key: located.key,
            label: located.label,
        });
        let result = located.resolver.invoke(self);
        self.active.pop();
        result
    }
}

/// The context a declaration body runs in.
///
/// Collects attributes from `include`, `mixin` and `attr` calls. Whatever
/// the body returns is merged over the collected attributes, so a body may
/// either return a mapping or build one here and return `val()`.
///
/// ```
/// use serde_json::json;
/// use styleset_core::{Declaration, Declarations, Registry};
///
/// let mut registry = Registry::new();
/// registry
///     .register(
///         None,
///         Declarations::new()
///             .with("base", json!({ "border": 1 }))
///             .with(
///                 "rounded",
///                 Declaration::body(|css| {
///                     let width = css.var("width").cloned().unwrap_or(json!("auto"));
///                     Ok(css
///                         .include("base")?
///                         .mixin("radius", &[json!(3)])?
///                         .attr([("width".to_string(), width)].into_iter().collect())
///                         .val())
///                 }),
///             ),
///     )
///     .unwrap();
/// registry.define_mixin(None, "radius", |_, args| {
///     [("borderRadius".to_string(), args[0].clone())].into_iter().collect()
/// });
///
/// let attrs = registry.resolve("rounded").unwrap();
/// assert_eq!(
///     serde_json::Value::Object(attrs),
///     json!({ "border": 1, "borderRadius": 3, "width": "auto" })
/// );
/// ```
pub struct Context<'e, 'r> {
    eval: &'e mut Evaluation<'r>,
    scope: ScopeId,
    attrs: Attributes,
}

impl<'e, 'r> Context<'e, 'r> {
    pub(crate) fn new(eval: &'e mut Evaluation<'r>, scope: ScopeId) -> Self {
        Self {
            eval,
            scope,
            attrs: Attributes::new(),
        }
    }

    /// The variable accessor of the running query.
    pub fn vars(&self) -> Vars<'r> {
        self.eval.vars()
    }

    /// Shorthand for `vars().get(name)`.
    pub fn var(&self, name: &str) -> Option<&'r Value> {
        self.eval.vars().get(name)
    }

    /// The scope that owns the running declaration.
    pub fn scope(&self) -> ScopeId {
        self.scope
    }

    /// Merge the attributes of other declarations, in selector order.
    ///
    /// Paths resolve from the owning scope; a leading namespace name reaches
    /// into that namespace.
    pub fn include(&mut self, selector: &str) -> StyleResult<&mut Self> {
        let paths = self.eval.registry().expand(selector);
        for path in paths.iter() {
            let attrs = self.eval.resolve_path(path, self.scope)?;
            merge(&mut self.attrs, attrs);
        }
        Ok(self)
    }

    /// Call a mixin with positional arguments and merge its output.
    pub fn mixin(&mut self, name: &str, args: &[Value]) -> StyleResult<&mut Self> {
        let mixin = self
            .eval
            .registry()
            .find_mixin(name, self.scope)
            .ok_or_else(|| StyleError::UnknownMixin {
                name: name.to_string(),
            })?;
        let vars = self.eval.vars();
        merge(&mut self.attrs, mixin(&vars, args));
        Ok(self)
    }

    /// Merge extra attributes.
    pub fn attr(&mut self, attrs: Attributes) -> &mut Self {
        merge(&mut self.attrs, attrs);
        self
    }

    /// The attributes collected so far.
    pub fn val(&self) -> Attributes {
        self.attrs.clone()
    }

    /// Merge `attrs` last, then return everything collected.
    pub fn val_with(&mut self, attrs: Attributes) -> Attributes {
        self.attr(attrs).val()
    }

    pub(crate) fn finish(mut self, returned: Attributes) -> Attributes {
        merge(&mut self.attrs, returned);
        self.attrs
    }
}
