//! Styleset resolution engine
//!
//! Compiles nested style declarations into a queryable tree and resolves
//! selectors against it into flat attribute mappings. Declarations can
//! inherit from an `attributes` parent, include each other across
//! namespaces, call parameterized mixins and read variables that a query
//! may override.
//!
//! ```text
//! Declarations → normalize() → Scope tree → Query::resolve() → Attributes
//! ```
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use styleset_core::{Declaration, Declarations, Registry};
//!
//! let mut registry = Registry::new();
//! registry
//!     .register(
//!         None,
//!         Declarations::new()
//!             .with("base", json!({ "border": 1 }))
//!             .with("card", Declaration::body(|css| Ok(css.include("base")?.val()))),
//!     )
//!     .unwrap();
//!
//! let attrs = registry.resolve("card").unwrap();
//! assert_eq!(attrs["border"], json!(1));
//! ```

pub mod context;
pub mod declaration;
pub mod node;
pub mod normalize;
pub mod options;
pub mod query;
pub mod registry;
pub mod scope;

pub use context::{Context, Vars};
pub use declaration::{Declaration, DeclarationFn, Declarations, MixinFn};
pub use node::{Node, Resolver};
pub use options::RegistryOptions;
pub use query::Query;
pub use registry::Registry;
pub use scope::{Scope, ScopeId};
pub use styleset_path::{Path, Selector};

pub use serde_json::Value;

/// A flat mapping from attribute name to value.
pub type Attributes = serde_json::Map<String, Value>;

/// The reserved key marking a declaration's inherited parent attributes.
pub const ATTRIBUTES_KEY: &str = "attributes";

/// Resolution and registration failures.
///
/// All of these indicate mistakes in how declarations were authored or
/// queried; none are transient.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StyleError {
    /// No declaration matches the path in any reachable scope.
    #[error("Unknown style path \"{path}\"")]
    UnknownPath { path: String },

    /// The path names a grouping of declarations, not a declaration.
    #[error("Style path is not a valid styleset \"{path}\"")]
    NotALeaf { path: String },

    /// The mixin is not defined in the scope or any of its parents.
    #[error("Unknown mixin \"{name}\"")]
    UnknownMixin { name: String },

    /// Raw declarations did not have a shape the normalizer accepts.
    #[error("Malformed declaration \"{path}\": {message}")]
    MalformedDeclaration { path: String, message: String },

    /// A declaration includes itself, directly or through others.
    #[error("Cyclic reference to \"{path}\" ({})", chain.join(" -> "))]
    CyclicReference { path: String, chain: Vec<String> },
}

pub type StyleResult<T> = Result<T, StyleError>;

/// Copy every entry of `src` into `target`, overwriting on key collision.
pub fn merge(target: &mut Attributes, src: Attributes) {
    for (name, value) in src {
        target.insert(name, value);
    }
}
