//! Server-side request handling.
//!
//! [`PageServer`](crate::server::PageServer) is the front door: it matches
//! the request path, resolves loaders and actions through a
//! [`PathDataResolver`](crate::server::PathDataResolver), and answers with
//! either a full HTML document or the JSON navigation payload when the
//! reserved query marker is present.

pub use trellis_server::*;
