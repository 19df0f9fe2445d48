//! Query objects.
//!
//! A query expands its selector, resolves each path in order, merges later
//! paths over earlier ones and finally merges any staged attributes.

use styleset_path::{Path, Selector};

use crate::context::Evaluation;
use crate::registry::Registry;
use crate::scope::ScopeId;
use crate::{merge, Attributes, StyleResult};

/// A selector with optional variable overrides and final attributes.
///
/// ```
/// use serde_json::json;
/// use styleset_core::{Declaration, Declarations, Registry};
///
/// let mut registry = Registry::new();
/// registry
///     .register(
///         None,
///         Declarations::new().with(
///             "framed",
///             Declaration::body(|css| {
///                 let border = css.var("border").cloned().unwrap_or_default();
///                 Ok([("border".to_string(), border)].into_iter().collect())
///             }),
///         ),
///     )
///     .unwrap();
///
/// let vars = json!({ "border": "solid 1px #000" }).as_object().cloned().unwrap();
/// let attrs = registry.query("framed").with_variables(vars).resolve().unwrap();
/// assert_eq!(attrs["border"], json!("solid 1px #000"));
/// ```
#[derive(Debug)]
pub struct Query<'r> {
    registry: &'r Registry,
    scope: ScopeId,
    selector: Selector,
    variables: Attributes,
    attributes: Option<Attributes>,
}

impl<'r> Query<'r> {
    pub(crate) fn new(registry: &'r Registry, scope: ScopeId, selector: Selector) -> Self {
        Self {
            registry,
            scope,
            selector,
            variables: Attributes::new(),
            attributes: None,
        }
    }

    /// Add variables that take precedence over every scope's variables.
    pub fn with_variables(mut self, variables: Attributes) -> Self {
        merge(&mut self.variables, variables);
        self
    }

    /// Stage attributes merged after every path, winning over all of them.
    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        match &mut self.attributes {
            Some(staged) => merge(staged, attributes),
            None => self.attributes = Some(attributes),
        }
        self
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    /// The canonical paths this query resolves, in order.
    pub fn paths(&self) -> Vec<Path> {
        self.registry.expand_selector(&self.selector)
    }

    /// Resolve every path and merge the results.
    ///
    /// Fails as a whole if any path fails.
    pub fn resolve(&self) -> StyleResult<Attributes> {
        let paths = self.paths();
        tracing::trace!(selector = %self.selector, paths = paths.len(), "resolving query");
        let mut eval = Evaluation::new(self.registry, self.scope, &self.variables);

        if let ([path], None) = (paths.as_slice(), &self.attributes) {
            return eval.resolve_path(path, self.scope);
        }

        let mut attrs = Attributes::new();
        for path in &paths {
            merge(&mut attrs, eval.resolve_path(path, self.scope)?);
        }
        if let Some(staged) = &self.attributes {
            merge(&mut attrs, staged.clone());
        }
        Ok(attrs)
    }
}
