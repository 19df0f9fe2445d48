//! Styleset selector grammar
//!
//! Turns selector strings into canonical dotted paths. A selector is one or
//! more path expressions separated by whitespace or commas; a path expression
//! is either a plain dotted path (`card.header`) or bracket shorthand
//! (`card[header footer]`) that fans out to one path per child.
//!
//! # Example
//!
//! ```
//! use styleset_path::expand;
//!
//! let paths = expand("button card[header footer]");
//! let dotted: Vec<String> = paths.iter().map(|p| p.to_string()).collect();
//! assert_eq!(dotted, vec!["button", "card.header", "card.footer"]);
//! ```

pub mod cache;
pub mod expand;
pub mod path;

pub use cache::SelectorCache;
pub use expand::expand;
pub use path::{Path, Selector};
