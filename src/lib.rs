//! # Trellis
//!
//! A nested-route full-stack web framework core. Trellis turns a list of
//! statically declared path patterns into an ordered chain of route modules,
//! renders that chain as nested outlets on the server, and keeps a hydrated
//! client in sync through JSON payload navigations that re-import only the
//! nested segments that actually changed.
//!
//! The view layer is pluggable: route components produce [`Markup`] and the
//! surrounding build tooling (bundlers, file-system route discovery, dev
//! servers) are external collaborators feeding the core a route table and a
//! head-block configuration.
//!
//! ## Feature Flags
//!
//! - `matcher` - pattern matching and the route registry only, for build
//!   tools that need the route table without a renderer
//! - `server` - data resolution, outlet rendering, and the document shell
//! - `client` - the navigation engine and route state container
//! - `full` (default) - everything
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use trellis::matcher::{RouteInput, RouteRegistry};
//!
//! let registry = RouteRegistry::build(vec![
//!     RouteInput::new("/", "routes/root").with_loader(),
//!     RouteInput::new("/users/:id", "routes/user").with_loader(),
//! ])?;
//! let chain = registry.build_chain("/users/42");
//! assert_eq!(chain.params()["id"], "42");
//! ```

#[cfg(feature = "client")]
pub mod client;
#[cfg(feature = "matcher")]
pub mod matcher;
#[cfg(feature = "server")]
pub mod server;

// Shared data model: the pieces server and client must agree on.
pub use trellis_core::{
	escape_html, is_payload_request, render_head_blocks, sort_head_blocks, strip_payload_marker,
	with_payload_marker, Action, ActivePathData, ComponentContext, ErrorBoundary, HeadBlock,
	HeadRegion, Loader, LoaderArgs, LoaderError, LoaderOutcome, Markup, ModuleLoadError,
	ModuleLoader, NavigationPayload, Outlet, Redirect, RenderError, RequestContext, RequestMethod,
	RouteComponent, RouteModule, SortedHeadBlocks, StaticModuleLoader, PAYLOAD_QUERY_PARAM,
};
