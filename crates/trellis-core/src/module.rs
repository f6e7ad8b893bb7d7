//! The route-module interface.
//!
//! A route module is everything one discovered route contributes: an optional
//! component, an optional error boundary, optional loader/action, and head
//! blocks. Modules are resolved through an injectable [`ModuleLoader`], so the
//! server can link them statically while the client resolves them lazily, and
//! tests can supply synchronous in-memory stubs.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{LoaderError, ModuleLoadError, RenderError};
use crate::head::HeadBlock;
use crate::markup::Markup;
use crate::request::RequestContext;

/// An explicit instruction to send the client elsewhere.
///
/// Redirects are a distinct loader outcome, never an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
	/// The target location.
	pub location: String,
	/// HTTP status to use on the server (302 by default).
	pub status: u16,
}

impl Redirect {
	/// Creates a `302 Found` redirect.
	pub fn to(location: impl Into<String>) -> Self {
		Self {
			location: location.into(),
			status: 302,
		}
	}

	/// Creates a redirect with an explicit status code.
	pub fn with_status(location: impl Into<String>, status: u16) -> Self {
		Self {
			location: location.into(),
			status,
		}
	}
}

/// The outcome of a loader or action invocation.
#[derive(Debug, Clone)]
pub enum LoaderOutcome {
	/// Serializable data for this depth.
	Data(Value),
	/// Resolution stops immediately; the caller issues the redirect.
	Redirect(Redirect),
}

/// Read-only arguments shared by every loader and action in a chain.
#[derive(Debug, Clone, Copy)]
pub struct LoaderArgs<'a> {
	/// Path parameters bound by dynamic segments across the whole chain.
	pub params: &'a HashMap<String, String>,
	/// Segments absorbed by the leaf splat, if any.
	pub splat_segments: &'a [String],
	/// The request being resolved.
	pub request: &'a RequestContext,
}

/// A route's data loader.
#[async_trait]
pub trait Loader: Send + Sync {
	async fn run(&self, args: LoaderArgs<'_>) -> Result<LoaderOutcome, LoaderError>;
}

/// A route's mutation handler. Only the leaf depth's action is ever invoked.
#[async_trait]
pub trait Action: Send + Sync {
	async fn run(&self, args: LoaderArgs<'_>) -> Result<LoaderOutcome, LoaderError>;
}

/// Per-depth data handed to a component when it renders.
#[derive(Debug, Clone, Copy)]
pub struct ComponentContext<'a> {
	/// The outlet depth being rendered; render failures are attributed to it.
	pub depth: usize,
	/// This depth's loader output, if the loader ran and produced data.
	pub loader_data: Option<&'a Value>,
	/// This depth's action output (leaf of a mutation request only).
	pub action_data: Option<&'a Value>,
	/// Path parameters for the whole chain.
	pub params: &'a HashMap<String, String>,
	/// Splat segments for the whole chain.
	pub splat_segments: &'a [String],
}

/// The callback a component invokes to render its child depth.
pub type Outlet<'a> = &'a mut dyn FnMut() -> Result<Markup, RenderError>;

/// A renderable route component.
///
/// Layout routes call `outlet` wherever their child content belongs; leaf
/// routes may ignore it.
pub trait RouteComponent: Send + Sync {
	fn render(&self, ctx: &ComponentContext<'_>, outlet: Outlet<'_>) -> Result<Markup, RenderError>;
}

/// A per-route error boundary, rendered in place of the failed subtree.
pub trait ErrorBoundary: Send + Sync {
	fn render(&self, error: &str) -> Markup;
}

/// One discovered route's module.
pub trait RouteModule: Send + Sync {
	/// The component rendered at this depth, if any.
	fn component(&self) -> Option<&dyn RouteComponent> {
		None
	}

	/// The error boundary declared at this depth, if any.
	fn error_boundary(&self) -> Option<&dyn ErrorBoundary> {
		None
	}

	/// The data loader declared at this depth, if any.
	fn loader(&self) -> Option<&dyn Loader> {
		None
	}

	/// The mutation handler declared at this depth, if any.
	fn action(&self) -> Option<&dyn Action> {
		None
	}

	/// Head blocks this route contributes for the given render context.
	fn head(&self, _ctx: &ComponentContext<'_>) -> Vec<HeadBlock> {
		Vec::new()
	}
}

/// Resolves an opaque import path to a route module.
///
/// On the server this is typically a static table built at startup; on the
/// client it fronts lazy module loading. Tests supply in-memory stubs.
#[async_trait]
pub trait ModuleLoader: Send + Sync {
	async fn load(&self, import_path: &str) -> Result<Arc<dyn RouteModule>, ModuleLoadError>;
}

/// A [`ModuleLoader`] backed by a static table.
#[derive(Default)]
pub struct StaticModuleLoader {
	modules: HashMap<String, Arc<dyn RouteModule>>,
}

impl StaticModuleLoader {
	/// Creates an empty loader.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a module under its import path.
	pub fn register(mut self, import_path: impl Into<String>, module: Arc<dyn RouteModule>) -> Self {
		self.modules.insert(import_path.into(), module);
		self
	}

	/// Returns the number of registered modules.
	pub fn len(&self) -> usize {
		self.modules.len()
	}

	/// Returns true if no modules are registered.
	pub fn is_empty(&self) -> bool {
		self.modules.is_empty()
	}
}

#[async_trait]
impl ModuleLoader for StaticModuleLoader {
	async fn load(&self, import_path: &str) -> Result<Arc<dyn RouteModule>, ModuleLoadError> {
		self.modules
			.get(import_path)
			.cloned()
			.ok_or_else(|| ModuleLoadError::NotFound(import_path.to_string()))
	}
}
