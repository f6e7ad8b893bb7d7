//! The request context handed to loaders and actions.

use serde_json::Value;

/// How a request should be resolved against the matched chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMethod {
	/// A read: every depth's loader runs.
	Get,
	/// A mutation: the leaf depth's action runs first, then loaders.
	Mutation,
	/// A re-read after a mutation: loaders run, action data is left untouched.
	Revalidation,
}

/// Request-scoped input shared by every loader and action in a chain.
///
/// The HTTP layer is an external collaborator; it maps its own request type
/// into this context before asking the core to resolve the chain.
#[derive(Debug, Clone)]
pub struct RequestContext {
	method: RequestMethod,
	path: String,
	body: Option<Value>,
}

impl RequestContext {
	/// Creates a read request for the given path.
	pub fn get(path: impl Into<String>) -> Self {
		Self {
			method: RequestMethod::Get,
			path: path.into(),
			body: None,
		}
	}

	/// Creates a mutation request with an optional parsed body.
	pub fn mutation(path: impl Into<String>, body: Option<Value>) -> Self {
		Self {
			method: RequestMethod::Mutation,
			path: path.into(),
			body,
		}
	}

	/// Creates a revalidation request for the given path.
	pub fn revalidation(path: impl Into<String>) -> Self {
		Self {
			method: RequestMethod::Revalidation,
			path: path.into(),
			body: None,
		}
	}

	/// Returns the request method.
	pub fn method(&self) -> RequestMethod {
		self.method
	}

	/// Returns the normalized request path.
	pub fn path(&self) -> &str {
		&self.path
	}

	/// Returns the parsed request body, if any (mutations only).
	pub fn body(&self) -> Option<&Value> {
		self.body.as_ref()
	}
}
