//! Shared data model for the trellis framework core.
//!
//! This crate holds everything the server-side renderer and the client-side
//! navigation engine must agree on: the route-module interface, the head-block
//! model and its deduplication rules, the navigation payload wire format, and
//! the request context handed to loaders and actions.

pub mod error;
pub mod head;
pub mod markup;
pub mod module;
pub mod payload;
pub mod request;

pub use error::{LoaderError, ModuleLoadError, RenderError};
pub use head::{
	render_head_blocks, sort_head_blocks, HeadBlock, HeadRegion, SortedHeadBlocks,
};
pub use markup::{escape_html, Markup};
pub use module::{
	Action, ComponentContext, ErrorBoundary, Loader, LoaderArgs, LoaderOutcome, ModuleLoader,
	Outlet, Redirect, RouteComponent, RouteModule, StaticModuleLoader,
};
pub use payload::{
	is_payload_request, strip_payload_marker, with_payload_marker, ActivePathData,
	NavigationPayload, PAYLOAD_QUERY_PARAM,
};
pub use request::{RequestContext, RequestMethod};
