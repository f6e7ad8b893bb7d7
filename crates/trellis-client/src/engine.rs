//! The client navigation engine.
//!
//! Intercepted navigations fetch the JSON payload variant of the target URL,
//! diff the import list against the live state, dynamically load only the
//! modules that changed, and commit the result in one batch. Superseded
//! calls detect a newer generation after every await and bow out silently.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use trellis_core::{
	render_head_blocks, strip_payload_marker, with_payload_marker, HeadRegion, ModuleLoadError,
	ModuleLoader, NavigationPayload, RequestMethod, RouteModule,
};

use crate::diff::changed_indices;
use crate::env::{BrowserAdapter, FetchError, PayloadFetcher};
use crate::scroll::ScrollPositionStore;
use crate::state::{NavigationStatus, RouteStateContainer};

/// Why a navigation was started; drives status flags, history, and scroll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationType {
	/// A link click or programmatic navigation. Pushes history, scrolls to
	/// top.
	UserNavigation,
	/// A server-issued redirect. Replaces history, scrolls to top.
	Redirect,
	/// Browser back/forward. History already moved; restores the recorded
	/// scroll offset.
	BrowserHistory,
	/// Re-running loaders for the current URL. Touches neither history nor
	/// scroll.
	Revalidation,
	/// A form submission (mutation). Touches neither history nor scroll;
	/// the server typically answers with a redirect.
	Submission,
}

/// How a navigation concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationOutcome {
	/// The payload was applied to the live state.
	Applied,
	/// A newer call to the same URL superseded this one. Not an error.
	Aborted,
	/// The engine handed control to the browser (cross-origin target or
	/// build-ID mismatch); this document is going away.
	HardNavigated,
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum NavigationError {
	#[error(transparent)]
	Fetch(#[from] FetchError),
	#[error("payload request returned status {0}")]
	Status(u16),
	#[error("response carried no navigation payload")]
	MissingPayload,
	#[error(transparent)]
	ModuleLoad(#[from] ModuleLoadError),
	#[error("invalid URL: {0}")]
	Url(#[from] url::ParseError),
}

/// Same ballpark as the redirect limit browsers enforce.
const MAX_REDIRECT_FOLLOWS: usize = 20;

/// Per-slot generation counters, keyed by target URL.
///
/// A new call to the same URL bumps the generation, which the in-flight
/// predecessor observes after its next await. Calls to different URLs do not
/// cancel each other; whichever commits last wins.
#[derive(Default)]
struct AbortSlot {
	generations: Mutex<HashMap<String, u64>>,
}

impl AbortSlot {
	fn begin(&self, url: &str) -> u64 {
		let mut map = self.generations.lock();
		let generation = map.entry(url.to_string()).or_insert(0);
		*generation += 1;
		*generation
	}

	fn is_current(&self, url: &str, generation: u64) -> bool {
		self.generations.lock().get(url).copied() == Some(generation)
	}

	/// Drops the entry once its navigation settled, unless a newer generation
	/// took it over. Keeps the table from growing for the page's lifetime.
	fn settle(&self, url: &str, generation: u64) {
		let mut map = self.generations.lock();
		if map.get(url).copied() == Some(generation) {
			map.remove(url);
		}
	}
}

/// Drives soft navigations against a [`RouteStateContainer`].
pub struct NavigationEngine {
	fetcher: Arc<dyn PayloadFetcher>,
	adapter: Arc<dyn BrowserAdapter>,
	modules: Arc<dyn ModuleLoader>,
	state: Arc<RouteStateContainer>,
	scroll: Mutex<ScrollPositionStore>,
	navigate_slot: AbortSlot,
	revalidate_slot: AbortSlot,
}

impl NavigationEngine {
	/// Creates an engine over the injected environment, loading any
	/// persisted scroll offsets.
	pub fn new(
		fetcher: Arc<dyn PayloadFetcher>,
		adapter: Arc<dyn BrowserAdapter>,
		modules: Arc<dyn ModuleLoader>,
		state: Arc<RouteStateContainer>,
	) -> Self {
		let scroll = ScrollPositionStore::load(adapter.as_ref());
		Self {
			fetcher,
			adapter,
			modules,
			state,
			scroll: Mutex::new(scroll),
			navigate_slot: AbortSlot::default(),
			revalidate_slot: AbortSlot::default(),
		}
	}

	/// The shared state container this engine commits into.
	pub fn state(&self) -> &Arc<RouteStateContainer> {
		&self.state
	}

	/// Navigates to `href`.
	pub async fn navigate(
		&self,
		href: &str,
		nav_type: NavigationType,
	) -> Result<NavigationOutcome, NavigationError> {
		self.run(href.to_string(), nav_type, None).await
	}

	/// Submits a mutation to `href` and applies the resulting payload.
	pub async fn submit(
		&self,
		href: &str,
		body: Value,
	) -> Result<NavigationOutcome, NavigationError> {
		self.run(href.to_string(), NavigationType::Submission, Some(body))
			.await
	}

	/// Re-runs the current URL's loaders without touching history or scroll.
	pub async fn revalidate(&self) -> Result<NavigationOutcome, NavigationError> {
		let href = self.adapter.current_url();
		self.run(href, NavigationType::Revalidation, None).await
	}

	async fn run(
		&self,
		href: String,
		nav_type: NavigationType,
		body: Option<Value>,
	) -> Result<NavigationOutcome, NavigationError> {
		let status = match nav_type {
			NavigationType::Revalidation => NavigationStatus::Revalidating,
			NavigationType::Submission => NavigationStatus::Submitting,
			_ => NavigationStatus::Navigating,
		};
		self.state.commit(|state| state.status = status);

		// Leaving the current entry: remember where it was scrolled to, so
		// a later back/forward can restore it.
		if matches!(
			nav_type,
			NavigationType::UserNavigation | NavigationType::Redirect
		) {
			self.remember_scroll();
		}

		let mut href = href;
		let mut nav_type = nav_type;
		let mut body = body;
		let mut follows = 0;
		loop {
			match self.attempt(&href, nav_type, body.take()).await? {
				Attempt::Done(outcome) => return Ok(outcome),
				Attempt::FollowRedirect(target) => {
					follows += 1;
					if follows > MAX_REDIRECT_FOLLOWS {
						warn!(url = %target, "redirect loop, handing off to the browser");
						self.adapter.hard_navigate(&target);
						return Ok(NavigationOutcome::HardNavigated);
					}
					debug!(from = %href, to = %target, "following same-origin redirect");
					href = target;
					nav_type = NavigationType::Redirect;
				}
			}
		}
	}

	/// One fetch-diff-apply pass; may ask the caller to re-enter for a
	/// same-origin redirect.
	async fn attempt(
		&self,
		href: &str,
		nav_type: NavigationType,
		body: Option<Value>,
	) -> Result<Attempt, NavigationError> {
		let base = Url::parse(&self.adapter.current_url())?;
		let target = base.join(href)?;
		if target.origin() != base.origin() {
			debug!(url = %target, "cross-origin target, hard navigating");
			self.adapter.hard_navigate(target.as_str());
			return Ok(Attempt::Done(NavigationOutcome::HardNavigated));
		}

		let path_and_query = path_with_query(&target);
		let slot = match nav_type {
			NavigationType::Revalidation => &self.revalidate_slot,
			_ => &self.navigate_slot,
		};
		let generation = slot.begin(&path_and_query);

		let method = match nav_type {
			NavigationType::Submission => RequestMethod::Mutation,
			NavigationType::Revalidation => RequestMethod::Revalidation,
			_ => RequestMethod::Get,
		};
		let fetch_url = with_payload_marker(&path_and_query);
		let fetched = match self.fetcher.fetch(&fetch_url, method, body.as_ref()).await {
			Ok(fetched) => fetched,
			Err(error) => return self.fail(slot, &path_and_query, generation, error.into()),
		};
		if !slot.is_current(&path_and_query, generation) {
			debug!(url = %path_and_query, "navigation superseded during fetch");
			return Ok(Attempt::Done(NavigationOutcome::Aborted));
		}

		// The transport followed redirects; a different final URL means the
		// server sent us elsewhere. Same-origin targets restart as a fresh
		// internal navigation, anything else leaves the document.
		let final_url = base.join(&strip_payload_marker(&fetched.final_url))?;
		if final_url.origin() != base.origin() {
			self.adapter.hard_navigate(final_url.as_str());
			slot.settle(&path_and_query, generation);
			return Ok(Attempt::Done(NavigationOutcome::HardNavigated));
		}
		let final_path_and_query = path_with_query(&final_url);
		if final_path_and_query != path_and_query {
			slot.settle(&path_and_query, generation);
			return Ok(Attempt::FollowRedirect(final_path_and_query));
		}

		if !fetched.is_success() {
			return self.fail(
				slot,
				&path_and_query,
				generation,
				NavigationError::Status(fetched.status),
			);
		}
		let Some(payload) = fetched.payload else {
			return self.fail(
				slot,
				&path_and_query,
				generation,
				NavigationError::MissingPayload,
			);
		};

		// A payload built by a newer deployment cannot be applied against
		// this document's stale module graph.
		let known_build = self.state.read(|state| state.build_id.clone());
		if payload.build_id != known_build {
			warn!(
				known = %known_build,
				received = %payload.build_id,
				"build changed underneath us, hard reloading"
			);
			self.adapter.hard_navigate(&path_and_query);
			slot.settle(&path_and_query, generation);
			return Ok(Attempt::Done(NavigationOutcome::HardNavigated));
		}

		// Imports cannot be cancelled once started, and a call to a different
		// URL may commit while ours are in flight. Loads are rebased: when
		// the state moved underneath the apply, the diff is recomputed
		// against the new base and the now-missing modules are fetched before
		// trying again. A superseded result is still discarded, not applied.
		let mut loaded: HashMap<usize, Arc<dyn RouteModule>> = HashMap::new();
		loop {
			let base_imports = self.state.read(|state| state.active_import_paths.clone());
			let needed: Vec<usize> = changed_indices(&base_imports, &payload.import_urls)
				.into_iter()
				.filter(|index| !loaded.contains_key(index))
				.collect();
			for index in needed {
				match self.modules.load(&payload.import_urls[index]).await {
					Ok(module) => {
						loaded.insert(index, module);
					}
					Err(error) => {
						return self.fail(slot, &path_and_query, generation, error.into())
					}
				}
			}
			if !slot.is_current(&path_and_query, generation) {
				debug!(url = %path_and_query, "navigation superseded during module load");
				return Ok(Attempt::Done(NavigationOutcome::Aborted));
			}
			if self.apply(&path_and_query, nav_type, payload.clone(), &loaded) {
				slot.settle(&path_and_query, generation);
				return Ok(Attempt::Done(NavigationOutcome::Applied));
			}
			debug!(url = %path_and_query, "state moved during module load, rebasing diff");
		}
	}

	/// Tries to commit a settled payload, then patches the title and the
	/// sentinel-bounded head regions and moves history and scroll. Returns
	/// false without touching anything when the live state no longer matches
	/// the diff base the unchanged-module reuse was computed from.
	fn apply(
		&self,
		path_and_query: &str,
		nav_type: NavigationType,
		payload: NavigationPayload,
		loaded: &HashMap<usize, Arc<dyn RouteModule>>,
	) -> bool {
		let title = payload.title.clone();
		let meta_html = render_head_blocks(&payload.meta_head_blocks);
		let rest_html = render_head_blocks(&payload.rest_head_blocks);

		let applied = self.state.try_commit(|state| {
			let mut modules = Vec::with_capacity(payload.import_urls.len());
			for (index, url) in payload.import_urls.iter().enumerate() {
				if let Some(module) = loaded.get(&index) {
					modules.push(Arc::clone(module));
				} else if index < state.active_modules.len()
					&& state.active_import_paths.get(index) == Some(url)
				{
					// Unchanged depth: keep the already-resolved module.
					modules.push(Arc::clone(&state.active_modules[index]));
				} else {
					// Another navigation committed and this depth no longer
					// lines up; the caller rebases and retries.
					return false;
				}
			}
			state.apply_payload(payload);
			state.active_modules = modules;
			state.status = NavigationStatus::Idle;
			true
		});
		if !applied {
			return false;
		}

		if let Some(title) = title {
			self.adapter.set_title(&title);
		}
		self.adapter.replace_head_region(HeadRegion::Meta, &meta_html);
		self.adapter.replace_head_region(HeadRegion::Rest, &rest_html);

		match nav_type {
			NavigationType::UserNavigation => {
				self.adapter.push_history(path_and_query);
				self.adapter.scroll_to(0.0, 0.0);
			}
			NavigationType::Redirect => {
				self.adapter.replace_history(path_and_query);
				self.adapter.scroll_to(0.0, 0.0);
			}
			NavigationType::BrowserHistory => {
				let path = path_only(path_and_query);
				let offset = self.scroll.lock().recall(path).unwrap_or((0.0, 0.0));
				self.adapter.scroll_to(offset.0, offset.1);
			}
			NavigationType::Revalidation | NavigationType::Submission => {}
		}
		true
	}

	/// Records the current entry's scroll offset and persists the store.
	fn remember_scroll(&self) {
		let Ok(current) = Url::parse(&self.adapter.current_url()) else {
			return;
		};
		let offset = self.adapter.scroll_position();
		let mut scroll = self.scroll.lock();
		scroll.remember(current.path(), offset);
		scroll.persist(self.adapter.as_ref());
	}

	/// A real failure: log it and clear the status flag, but only if no
	/// newer call owns that flag now.
	fn fail(
		&self,
		slot: &AbortSlot,
		url: &str,
		generation: u64,
		error: NavigationError,
	) -> Result<Attempt, NavigationError> {
		if slot.is_current(url, generation) {
			warn!(%url, %error, "navigation failed");
			slot.settle(url, generation);
			self.state
				.commit(|state| state.status = NavigationStatus::Idle);
			Err(error)
		} else {
			debug!(%url, "superseded navigation failed, ignoring");
			Ok(Attempt::Done(NavigationOutcome::Aborted))
		}
	}
}

enum Attempt {
	Done(NavigationOutcome),
	FollowRedirect(String),
}

fn path_with_query(url: &Url) -> String {
	match url.query() {
		Some(query) if !query.is_empty() => format!("{}?{}", url.path(), query),
		_ => url.path().to_string(),
	}
}

fn path_only(path_and_query: &str) -> &str {
	path_and_query
		.split_once('?')
		.map(|(path, _)| path)
		.unwrap_or(path_and_query)
}

#[cfg(test)]
mod tests {
	use super::AbortSlot;

	#[test]
	fn test_abort_slot_prunes_settled_entries() {
		let slot = AbortSlot::default();
		let first = slot.begin("/a");
		let second = slot.begin("/a");
		// Settling a superseded generation leaves the newer one in place.
		slot.settle("/a", first);
		assert!(slot.is_current("/a", second));
		slot.settle("/a", second);
		assert!(slot.generations.lock().is_empty());
	}
}
