//! The recursive outlet render pipeline.
//!
//! Rendering is plain recursion over the resolved chain: depth *n* renders its
//! component, handing it an outlet callback that recurses into depth *n+1*.
//! There is no shared mutable state across depths beyond the read-only
//! payload.
//!
//! Two error-boundary mechanisms coexist deliberately:
//!
//! 1. loader-time: `outermost_error_boundary_index` was computed during
//!    resolution and truncates rendering at that depth;
//! 2. render-time: a component failure is caught here and recovered at the
//!    nearest ancestor that declares a boundary, which can legitimately be a
//!    different depth than the loader-time one.

use tracing::warn;
use trellis_core::{ComponentContext, ErrorBoundary, Markup, RenderError};

use crate::resolver::ResolvedPath;

/// An error boundary rendered when the failing depth declares none of its own.
pub struct DefaultErrorBoundary;

impl ErrorBoundary for DefaultErrorBoundary {
	fn render(&self, error: &str) -> Markup {
		Markup::from_string(format!(
			"<div class=\"trellis-error\">{}</div>",
			trellis_core::escape_html(error)
		))
	}
}

/// Renders a resolved chain as nested outlets.
pub struct OutletRenderer<'a> {
	resolved: &'a ResolvedPath,
	fallback: &'a dyn ErrorBoundary,
}

impl<'a> OutletRenderer<'a> {
	/// Creates a renderer with a caller-supplied fallback boundary.
	pub fn new(resolved: &'a ResolvedPath, fallback: &'a dyn ErrorBoundary) -> Self {
		Self { resolved, fallback }
	}

	/// Renders the whole chain, recovering render-time failures at the
	/// nearest already-rendered ancestor boundary.
	pub fn render(&self) -> Result<Markup, RenderError> {
		match self.render_depth(0, None) {
			Ok(markup) => Ok(markup),
			Err(error) => {
				let failing = error.depth.min(self.resolved.modules.len().saturating_sub(1));
				warn!(depth = error.depth, message = %error.message, "render failed, recovering");
				let boundary = (0..=failing)
					.rev()
					.find(|&depth| self.resolved.modules[depth].error_boundary().is_some())
					.unwrap_or(0);
				// Second failure while rendering the recovery tree is fatal.
				self.render_depth(0, Some((boundary, &error.message)))
			}
		}
	}

	/// Renders one depth.
	///
	/// `forced_boundary` carries the render-time recovery target: when set,
	/// that depth renders its boundary (or the fallback) instead of its
	/// component.
	fn render_depth(
		&self,
		depth: usize,
		forced_boundary: Option<(usize, &str)>,
	) -> Result<Markup, RenderError> {
		let data = &self.resolved.data;
		if depth >= data.len() {
			return Ok(Markup::empty());
		}

		if let Some((boundary, message)) = forced_boundary {
			if depth == boundary {
				return Ok(self.render_boundary(depth, message));
			}
		} else if data.outermost_error_boundary_index == Some(depth) {
			let message = data.error_to_render.as_deref().unwrap_or("unknown error");
			return Ok(self.render_boundary(depth, message));
		}

		let module = &self.resolved.modules[depth];
		let Some(component) = module.component() else {
			return Ok(Markup::empty());
		};

		let ctx = ComponentContext {
			depth,
			loader_data: data.active_data[depth].as_ref(),
			action_data: data.action_data[depth].as_ref(),
			params: &data.params,
			splat_segments: &data.splat_segments,
		};
		let mut outlet = || self.render_depth(depth + 1, forced_boundary);
		component.render(&ctx, &mut outlet)
	}

	fn render_boundary(&self, depth: usize, message: &str) -> Markup {
		match self.resolved.modules[depth].error_boundary() {
			Some(boundary) => boundary.render(message),
			None => self.fallback.render(message),
		}
	}
}
