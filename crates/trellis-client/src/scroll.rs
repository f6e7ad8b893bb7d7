//! Scroll position restoration for history navigation.
//!
//! Offsets are keyed by URL path and bounded by an LRU so the map cannot
//! grow without limit across a long session. The store round-trips through
//! the adapter's persistent storage so back/forward restoration survives a
//! full page load.

use std::num::NonZeroUsize;

use lru::LruCache;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::env::BrowserAdapter;

/// Bound on remembered offsets; the oldest entry past this is evicted.
pub const SCROLL_CAPACITY: usize = 50;

const STORAGE_KEY: &str = "trellis:scroll-positions";

#[derive(Serialize, Deserialize)]
struct StoredEntry {
	key: String,
	x: f64,
	y: f64,
}

/// An LRU-bounded map of URL path to scroll offset.
pub struct ScrollPositionStore {
	entries: LruCache<String, (f64, f64)>,
}

impl Default for ScrollPositionStore {
	fn default() -> Self {
		Self::new()
	}
}

impl ScrollPositionStore {
	pub fn new() -> Self {
		Self {
			// SCROLL_CAPACITY is a non-zero constant.
			entries: LruCache::new(NonZeroUsize::new(SCROLL_CAPACITY).unwrap()),
		}
	}

	/// Loads the persisted store, or an empty one if storage is absent or
	/// unparseable.
	pub fn load(adapter: &dyn BrowserAdapter) -> Self {
		let mut store = Self::new();
		if let Some(raw) = adapter.storage_get(STORAGE_KEY) {
			match serde_json::from_str::<Vec<StoredEntry>>(&raw) {
				Ok(stored) => {
					// Oldest first so LRU order survives the round-trip.
					for entry in stored {
						store.entries.put(entry.key, (entry.x, entry.y));
					}
				}
				Err(error) => {
					debug!(%error, "discarding unreadable scroll store");
				}
			}
		}
		store
	}

	/// Records the offset for a path, evicting the oldest entry past
	/// capacity.
	pub fn remember(&mut self, key: impl Into<String>, offset: (f64, f64)) {
		self.entries.put(key.into(), offset);
	}

	/// The recorded offset for a path, marking it recently used.
	pub fn recall(&mut self, key: &str) -> Option<(f64, f64)> {
		self.entries.get(key).copied()
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Writes the store through the adapter's persistent storage.
	pub fn persist(&self, adapter: &dyn BrowserAdapter) {
		let stored: Vec<StoredEntry> = self
			.entries
			.iter()
			.rev()
			.map(|(key, &(x, y))| StoredEntry {
				key: key.clone(),
				x,
				y,
			})
			.collect();
		match serde_json::to_string(&stored) {
			Ok(raw) => adapter.storage_set(STORAGE_KEY, &raw),
			Err(error) => debug!(%error, "scroll store not persisted"),
		}
	}
}
