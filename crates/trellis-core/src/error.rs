//! Error types shared across the framework core.

/// Errors produced by route loaders and actions.
///
/// The framework treats the loader error as an opaque value to be handed to
/// the nearest error boundary; only its rendered message crosses the wire.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
	#[error("{0}")]
	Message(String),
	#[error("loader returned malformed data: {0}")]
	Data(#[from] serde_json::Error),
}

impl LoaderError {
	/// Creates a loader error from any displayable value.
	pub fn msg(message: impl std::fmt::Display) -> Self {
		Self::Message(message.to_string())
	}
}

/// Errors produced while resolving a route module through a [`ModuleLoader`].
///
/// [`ModuleLoader`]: crate::module::ModuleLoader
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum ModuleLoadError {
	#[error("no route module registered for import path: {0}")]
	NotFound(String),
	#[error("failed to load route module {import_path}: {message}")]
	Failed { import_path: String, message: String },
}

/// A render failure at a specific outlet depth.
///
/// The depth is recorded where the failure originated so the pipeline can walk
/// backward through already-rendered ancestors looking for an error boundary.
#[derive(Debug, thiserror::Error)]
#[error("render failed at depth {depth}: {message}")]
pub struct RenderError {
	pub depth: usize,
	pub message: String,
}

impl RenderError {
	/// Creates a render error attributed to the given outlet depth.
	pub fn at(depth: usize, message: impl Into<String>) -> Self {
		Self {
			depth,
			message: message.into(),
		}
	}
}
