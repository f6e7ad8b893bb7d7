//! Route matching for trellis: pattern compilation, specificity scoring, and
//! nested match-chain resolution.
//!
//! The matcher consumes the flat list of route definitions produced by the
//! build-time file walker and, per request, produces the ordered chain of
//! routes whose patterns nest along the request path. It knows nothing about
//! loaders, rendering, or the client; those consume the chain it produces.

pub mod pattern;
pub mod registry;

pub use pattern::{
	normalize_path, split_path, MatchResult, PatternCache, PatternError, RoutePattern, Segment,
};
pub use registry::{
	MatchChain, MatchedRoute, RouteCapabilities, RouteDefinition, RouteInput, RouteRegistry,
	INDEX_SEGMENT,
};
