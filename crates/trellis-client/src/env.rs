//! Injectable browser environment.
//!
//! The engine never touches a real DOM or `fetch` directly. Everything it
//! needs from the host page goes through these two traits, so the whole
//! navigation path runs under plain `#[tokio::test]` with in-memory stubs.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use trellis_core::{HeadRegion, NavigationPayload, RequestMethod};

/// Transport failures raised by a [`PayloadFetcher`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FetchError {
	#[error("network error: {0}")]
	Network(String),
	#[error("payload decode error: {0}")]
	Decode(#[from] serde_json::Error),
}

/// What came back from a payload fetch.
///
/// `final_url` is the URL after the transport followed any redirects, which
/// is how the engine observes that a redirect happened at all.
#[derive(Debug, Clone)]
pub struct FetchedPayload {
	pub final_url: String,
	pub status: u16,
	pub payload: Option<NavigationPayload>,
}

impl FetchedPayload {
	/// Returns true for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}
}

/// Fetches the JSON navigation payload for a URL.
///
/// Implementations follow redirects and report the final URL.
#[async_trait]
pub trait PayloadFetcher: Send + Sync {
	async fn fetch(
		&self,
		url: &str,
		method: RequestMethod,
		body: Option<&Value>,
	) -> Result<FetchedPayload, FetchError>;
}

/// The pieces of the browser the engine mutates.
///
/// Head patching is scoped to the sentinel-bounded regions the server
/// emitted; nothing outside those comments is ever touched.
pub trait BrowserAdapter: Send + Sync {
	/// The page's current absolute URL.
	fn current_url(&self) -> String;

	/// Sets `document.title`.
	fn set_title(&self, title: &str);

	/// Clears the given sentinel-bounded head region and inserts `html`
	/// between its start and end comments.
	fn replace_head_region(&self, region: HeadRegion, html: &str);

	/// Pushes a new history entry for `url`.
	fn push_history(&self, url: &str);

	/// Replaces the current history entry with `url`.
	fn replace_history(&self, url: &str);

	/// The current scroll offset.
	fn scroll_position(&self) -> (f64, f64);

	/// Scrolls the viewport.
	fn scroll_to(&self, x: f64, y: f64);

	/// Full browser navigation, abandoning the current document.
	fn hard_navigate(&self, url: &str);

	/// Reads a value from persistent client storage.
	fn storage_get(&self, key: &str) -> Option<String>;

	/// Writes a value to persistent client storage.
	fn storage_set(&self, key: &str, value: &str);
}
