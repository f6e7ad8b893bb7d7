//! Per-request data resolution over a matched chain.
//!
//! The resolver loads each matched route's module, invokes the leaf action
//! (for mutations) and then every depth's loader in order, and assembles the
//! serializable [`ActivePathData`] payload. Redirects short-circuit the whole
//! resolution; failures are attributed to the nearest ancestor error boundary
//! or surface as an unhandled (500-class) error when the chain declares none.

use std::sync::Arc;

use tracing::{debug, warn};
use trellis_core::{
	ActivePathData, LoaderArgs, LoaderOutcome, ModuleLoadError, ModuleLoader, Redirect,
	RequestContext, RequestMethod, RouteModule,
};
use trellis_matcher::MatchChain;

/// Resolution failures that cannot be recovered by an error boundary.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
	#[error("cannot resolve an empty match chain")]
	EmptyChain,
	#[error(transparent)]
	ModuleLoad(#[from] ModuleLoadError),
	#[error("mutation request targets a route without an action: {0}")]
	NoAction(String),
	#[error("unhandled failure at depth {depth}, no error boundary in chain: {message}")]
	Unhandled { depth: usize, message: String },
}

/// A fully resolved chain: the payload plus the loaded route modules.
pub struct ResolvedPath {
	pub data: ActivePathData,
	pub modules: Vec<Arc<dyn RouteModule>>,
}

/// The two ways a resolution can conclude.
///
/// A redirect is a loader's explicit instruction, never a failure, and it is
/// never accompanied by a partial payload.
pub enum ResolveOutcome {
	Data(ResolvedPath),
	Redirect(Redirect),
}

// Modules are trait objects; only the payload half is formatted.
impl std::fmt::Debug for ResolveOutcome {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Data(resolved) => f.debug_tuple("Data").field(&resolved.data).finish(),
			Self::Redirect(redirect) => f.debug_tuple("Redirect").field(redirect).finish(),
		}
	}
}

/// Resolves matched chains into [`ActivePathData`] payloads.
pub struct PathDataResolver {
	module_loader: Arc<dyn ModuleLoader>,
}

impl PathDataResolver {
	/// Creates a resolver over the given module loader.
	pub fn new(module_loader: Arc<dyn ModuleLoader>) -> Self {
		Self { module_loader }
	}

	/// Resolves a chain for one request.
	///
	/// Loaders run in depth order with sequential awaits: a redirect at depth
	/// *d* therefore prevents any deeper loader from being invoked, and a
	/// failure at depth *d* leaves deeper entries as `None` placeholders.
	/// Array lengths always equal the chain length.
	pub async fn resolve(
		&self,
		chain: &MatchChain,
		request: &RequestContext,
	) -> Result<ResolveOutcome, ResolveError> {
		if chain.is_empty() {
			return Err(ResolveError::EmptyChain);
		}
		let len = chain.len();
		debug!(path = request.path(), depth = len, "resolving chain");

		let modules = futures::future::try_join_all(
			chain
				.routes()
				.iter()
				.map(|route| self.module_loader.load(route.import_path())),
		)
		.await?;

		let mut active_data: Vec<Option<serde_json::Value>> = vec![None; len];
		let mut action_data: Vec<Option<serde_json::Value>> = vec![None; len];
		let mut failure: Option<(usize, String)> = None;

		let args = LoaderArgs {
			params: chain.params(),
			splat_segments: chain.splat_segments(),
			request,
		};

		// Mutations invoke the leaf action first; other depths never run one.
		if request.method() == RequestMethod::Mutation {
			let leaf = len - 1;
			let leaf_route = &chain.routes()[leaf];
			let Some(action) = modules[leaf].action() else {
				return Err(ResolveError::NoAction(leaf_route.import_path().to_string()));
			};
			match action.run(args).await {
				Ok(LoaderOutcome::Data(value)) => action_data[leaf] = Some(value),
				Ok(LoaderOutcome::Redirect(redirect)) => {
					debug!(location = %redirect.location, "action redirected");
					return Ok(ResolveOutcome::Redirect(redirect));
				}
				Err(error) => {
					warn!(depth = leaf, %error, "action failed");
					failure = Some((leaf, error.to_string()));
				}
			}
		}

		if failure.is_none() {
			for depth in 0..len {
				let Some(loader) = modules[depth].loader() else {
					continue;
				};
				match loader.run(args).await {
					Ok(LoaderOutcome::Data(value)) => active_data[depth] = Some(value),
					Ok(LoaderOutcome::Redirect(redirect)) => {
						debug!(depth, location = %redirect.location, "loader redirected");
						return Ok(ResolveOutcome::Redirect(redirect));
					}
					Err(error) => {
						warn!(depth, %error, "loader failed");
						failure = Some((depth, error.to_string()));
						break;
					}
				}
			}
		}

		let (boundary_index, error_to_render) = match failure {
			Some((depth, message)) => match nearest_boundary(chain, depth) {
				Some(boundary) => (Some(boundary), Some(message)),
				None => return Err(ResolveError::Unhandled { depth, message }),
			},
			None => (None, None),
		};

		// Nothing deeper than the boundary is rendered, so nothing deeper
		// keeps data either.
		if let Some(boundary) = boundary_index {
			for depth in (boundary + 1)..len {
				active_data[depth] = None;
				action_data[depth] = None;
			}
		}

		let data = ActivePathData {
			active_data,
			active_import_paths: chain.import_paths(),
			params: chain.params().clone(),
			splat_segments: chain.splat_segments().to_vec(),
			action_data,
			outermost_error_boundary_index: boundary_index,
			error_to_render,
		};
		Ok(ResolveOutcome::Data(ResolvedPath { data, modules }))
	}
}

/// Walks upward from the failing depth to the root, returning the first depth
/// that declares an error boundary.
fn nearest_boundary(chain: &MatchChain, failing_depth: usize) -> Option<usize> {
	(0..=failing_depth)
		.rev()
		.find(|&depth| chain.routes()[depth].definition().capabilities().has_error_boundary)
}
