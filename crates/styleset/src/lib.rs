//! Process-wide styleset registry.
//!
//! Wraps one [`Registry`] shared by the whole process. Registration takes a
//! write lock; queries take a read lock and may run concurrently. Register
//! everything during start-up, then query freely.
//!
//! Declaration bodies and mixins run while the read lock is held, so they
//! must go through their [`Context`] rather than calling back into this
//! module.
//!
//! ```
//! use serde_json::json;
//! use styleset::{Declaration, Declarations};
//!
//! let sheet = styleset::register_in(
//!     "doc_example",
//!     Declarations::new()
//!         .with("my_class", json!({ "border": "solid 1px #000", "margin": "6px" }))
//!         .with(
//!             "with_includes",
//!             Declaration::body(|css| Ok(css.include("my_class")?.val())),
//!         ),
//! )
//! .unwrap();
//!
//! let attrs = sheet.css("with_includes").unwrap();
//! assert_eq!(attrs["margin"], json!("6px"));
//! ```

use std::sync::{OnceLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

pub use styleset_core::{
    merge, Attributes, Context, Declaration, DeclarationFn, Declarations, MixinFn, Path, Registry,
    RegistryOptions, ScopeId, Selector, StyleError, StyleResult, Value, Vars,
};

fn registry() -> &'static RwLock<Registry> {
    static REGISTRY: OnceLock<RwLock<Registry>> = OnceLock::new();
    REGISTRY.get_or_init(|| RwLock::new(Registry::new()))
}

fn read() -> RwLockReadGuard<'static, Registry> {
    registry().read().unwrap_or_else(PoisonError::into_inner)
}

fn write() -> RwLockWriteGuard<'static, Registry> {
    registry().write().unwrap_or_else(PoisonError::into_inner)
}

/// Run `f` with shared access to the global registry.
pub fn with_registry<T>(f: impl FnOnce(&Registry) -> T) -> T {
    f(&read())
}

/// Replace the global registry with an empty one using `options`.
pub fn configure(options: RegistryOptions) {
    tracing::debug!(?options, "configuring global registry");
    *write() = Registry::with_options(options);
}

/// Clear every registered declaration, variable, mixin and cached selector.
///
/// Meant for test isolation; configured options are kept.
pub fn reset() {
    write().reset();
}

// =========================================================================
// Registration
// =========================================================================

/// Register declarations in the root scope.
pub fn register(decls: Declarations) -> StyleResult<Sheet> {
    write().register(None, decls)?;
    Ok(Sheet::root())
}

/// Register declarations in `namespace`, adding to anything already there.
pub fn register_in(namespace: &str, decls: Declarations) -> StyleResult<Sheet> {
    write().register(Some(namespace), decls)?;
    Ok(Sheet::namespaced(namespace))
}

/// Build declarations from the registry, then register them.
///
/// The factory runs under the write lock and must not call back into this
/// module.
pub fn register_with<F>(namespace: Option<&str>, factory: F) -> StyleResult<Sheet>
where
    F: FnOnce(&Registry) -> Declarations,
{
    write().register_with(namespace, factory)?;
    Ok(match namespace {
        Some(name) => Sheet::namespaced(name),
        None => Sheet::root(),
    })
}

/// Define variables globally (`None`) or for one namespace.
pub fn define_variables(namespace: Option<&str>, variables: Attributes) {
    write().define_variables(namespace, variables);
}

/// Define a mixin globally (`None`) or for one namespace.
pub fn define_mixin<F>(namespace: Option<&str>, name: &str, mixin: F)
where
    F: Fn(&Vars<'_>, &[Value]) -> Attributes + Send + Sync + 'static,
{
    write().define_mixin(namespace, name, mixin);
}

// =========================================================================
// Queries
// =========================================================================

/// Resolve a selector from the root scope with no overrides.
pub fn resolve(selector: impl Into<Selector>) -> StyleResult<Attributes> {
    Sheet::root().css(selector)
}

/// Start a query from the root scope.
pub fn query(selector: impl Into<Selector>) -> SheetQuery {
    Sheet::root().get(selector)
}

/// Handle to one namespace (or the root) of the global registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sheet {
    namespace: Option<String>,
}

impl Sheet {
    pub fn root() -> Self {
        Self { namespace: None }
    }

    pub fn namespaced(namespace: &str) -> Self {
        Self {
            namespace: Some(namespace.to_string()),
        }
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Resolve a selector from this sheet with no overrides.
    pub fn css(&self, selector: impl Into<Selector>) -> StyleResult<Attributes> {
        self.get(selector).resolve()
    }

    /// Start a query from this sheet.
    pub fn get(&self, selector: impl Into<Selector>) -> SheetQuery {
        SheetQuery {
            namespace: self.namespace.clone(),
            selector: selector.into(),
            variables: Attributes::new(),
            attributes: None,
        }
    }
}

/// A staged query against the global registry.
///
/// Holds no lock until [`resolve`](SheetQuery::resolve) runs.
#[derive(Debug, Clone)]
pub struct SheetQuery {
    namespace: Option<String>,
    selector: Selector,
    variables: Attributes,
    attributes: Option<Attributes>,
}

impl SheetQuery {
    /// Add variables that take precedence over every scope's variables.
    pub fn with_variables(mut self, variables: Attributes) -> Self {
        merge(&mut self.variables, variables);
        self
    }

    /// Stage attributes merged last.
    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        match &mut self.attributes {
            Some(staged) => merge(staged, attributes),
            None => self.attributes = Some(attributes),
        }
        self
    }

    pub fn resolve(&self) -> StyleResult<Attributes> {
        let registry = read();
        let scope = match &self.namespace {
            None => ScopeId::ROOT,
            Some(name) => registry
                .namespace(name)
                .ok_or_else(|| StyleError::UnknownPath { path: name.clone() })?,
        };

        let mut query = registry
            .query_in(scope, self.selector.clone())
            .with_variables(self.variables.clone());
        if let Some(staged) = &self.attributes {
            query = query.with_attributes(staged.clone());
        }
        query.resolve()
    }
}
