//! Request handling: match, resolve, render.
//!
//! `PageServer` ties the registry, resolver, outlet pipeline and document
//! shell together. The HTTP layer maps its request into a [`RequestContext`],
//! calls [`PageServer::handle`], and maps the returned [`ServerResponse`]
//! back onto its own response type.

use std::sync::Arc;

use tracing::debug;
use trellis_core::{
	is_payload_request, ErrorBoundary, HeadBlock, ModuleLoader, NavigationPayload, Redirect,
	RequestContext,
};
use trellis_matcher::RouteRegistry;

use crate::document::{DocumentError, DocumentRenderer};
use crate::head::collect_head;
use crate::outlet::{DefaultErrorBoundary, OutletRenderer};
use crate::resolver::{PathDataResolver, ResolveError, ResolveOutcome};

/// What the HTTP layer should send back.
#[derive(Debug)]
pub enum ServerResponse {
	/// A full HTML document (first load).
	Document(String),
	/// The JSON navigation payload (soft navigation).
	Payload(String),
	/// Send the client elsewhere.
	Redirect(Redirect),
	/// Not a route; the caller falls through to its own 404 handling.
	NotFound,
}

/// Errors that surface as 500-class responses.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
	#[error(transparent)]
	Resolve(#[from] ResolveError),
	#[error(transparent)]
	Document(#[from] DocumentError),
	#[error("render failed irrecoverably: {0}")]
	Render(String),
	#[error("failed to serialize navigation payload: {0}")]
	Payload(#[from] serde_json::Error),
}

/// The server-side entry point for one built route table.
pub struct PageServer {
	registry: Arc<RouteRegistry>,
	resolver: PathDataResolver,
	document: DocumentRenderer,
	default_head: Vec<HeadBlock>,
	fallback_boundary: Box<dyn ErrorBoundary>,
	build_id: String,
}

impl PageServer {
	/// Creates a server over a registry and module loader.
	pub fn new(
		registry: Arc<RouteRegistry>,
		module_loader: Arc<dyn ModuleLoader>,
		build_id: impl Into<String>,
	) -> Self {
		Self {
			registry,
			resolver: PathDataResolver::new(module_loader),
			document: DocumentRenderer::new(),
			default_head: Vec::new(),
			fallback_boundary: Box::new(DefaultErrorBoundary),
			build_id: build_id.into(),
		}
	}

	/// Sets the document renderer.
	pub fn document(mut self, document: DocumentRenderer) -> Self {
		self.document = document;
		self
	}

	/// Sets the default head blocks prepended below every route's own.
	pub fn default_head(mut self, blocks: Vec<HeadBlock>) -> Self {
		self.default_head = blocks;
		self
	}

	/// Sets the fallback error boundary.
	pub fn fallback_boundary(mut self, boundary: Box<dyn ErrorBoundary>) -> Self {
		self.fallback_boundary = boundary;
		self
	}

	/// Handles one request.
	///
	/// `query` is the raw query string (without `?`); the reserved payload
	/// marker in it switches the response to JSON mode.
	pub async fn handle(
		&self,
		request: &RequestContext,
		query: &str,
	) -> Result<ServerResponse, ServerError> {
		let chain = self.registry.build_chain(request.path());
		if chain.is_empty() {
			debug!(path = request.path(), "no matching chain");
			return Ok(ServerResponse::NotFound);
		}

		let resolved = match self.resolver.resolve(&chain, request).await? {
			ResolveOutcome::Redirect(redirect) => {
				return Ok(ServerResponse::Redirect(redirect));
			}
			ResolveOutcome::Data(resolved) => resolved,
		};

		let head = collect_head(&self.default_head, &resolved);
		let payload = NavigationPayload::assemble(&resolved.data, head.clone(), &self.build_id);

		if is_payload_request(query) {
			return Ok(ServerResponse::Payload(serde_json::to_string(&payload)?));
		}

		let body = OutletRenderer::new(&resolved, self.fallback_boundary.as_ref())
			.render()
			.map_err(|e| ServerError::Render(e.to_string()))?;
		let html = self.document.render(&head, &body, &payload)?;
		Ok(ServerResponse::Document(html))
	}
}
