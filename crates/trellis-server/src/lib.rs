//! Server-side rendering for trellis.
//!
//! First loads flow: match chain → resolve loaders/actions → render nested
//! outlets → wrap in the document shell with the hydration payload embedded.
//! Soft navigations take the same path but stop after payload assembly.

pub mod document;
pub mod handler;
pub mod head;
pub mod outlet;
pub mod resolver;

pub use document::{
	DocumentError, DocumentOptions, DocumentRenderer, PAYLOAD_SCRIPT_ID, ROOT_ELEMENT_ID,
};
pub use handler::{PageServer, ServerError, ServerResponse};
pub use head::collect_head;
pub use outlet::{DefaultErrorBoundary, OutletRenderer};
pub use resolver::{PathDataResolver, ResolveError, ResolveOutcome, ResolvedPath};
