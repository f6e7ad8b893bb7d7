//! Route pattern matching and the compiled route table.
//!
//! Patterns are absolute paths of literal, `:param`, and trailing `*`
//! segments. [`RouteRegistry::build_chain`] resolves a request path to the
//! ordered layout-to-leaf chain with deterministic specificity tie-breaking.
//!
//! ```rust,no_run
//! use trellis::matcher::{RouteInput, RouteRegistry};
//!
//! let registry = RouteRegistry::build(vec![
//!     RouteInput::new("/users/:id", "routes/user"),
//!     RouteInput::new("/users/new", "routes/new-user"),
//! ]).unwrap();
//! // The literal wins over the dynamic segment.
//! let chain = registry.build_chain("/users/new");
//! assert_eq!(chain.leaf().unwrap().import_path(), "routes/new-user");
//! ```

pub use trellis_matcher::*;
