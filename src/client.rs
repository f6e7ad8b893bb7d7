//! Client-side navigation.
//!
//! The engine drives soft navigations against an injected browser surface:
//! fetch the JSON payload, diff the import list, dynamically load only the
//! changed modules, and commit the result to the shared
//! [`RouteStateContainer`](crate::client::RouteStateContainer) in one batch.

pub use trellis_client::*;
