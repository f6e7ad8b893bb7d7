//! The client route state container.
//!
//! One `ClientRouteState` lives for the page's lifetime. Every engine
//! operation mutates it through a single [`RouteStateContainer::commit`],
//! which batches all field writes and notifies observers exactly once, so
//! an observer can never see new params paired with old loader data.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use tracing::debug;
use trellis_core::{NavigationPayload, RouteModule};

/// Which kind of engine operation is currently in flight.
///
/// The flags are mutually exclusive: starting one clears the others.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavigationStatus {
	#[default]
	Idle,
	Navigating,
	Revalidating,
	Submitting,
}

/// The live mirror of the server payload plus the resolved route modules.
#[derive(Clone, Default)]
pub struct ClientRouteState {
	pub active_data: Vec<Option<Value>>,
	pub active_import_paths: Vec<String>,
	pub params: HashMap<String, String>,
	pub splat_segments: Vec<String>,
	pub action_data: Vec<Option<Value>>,
	pub outermost_error_boundary_index: Option<usize>,
	pub error_to_render: Option<String>,
	/// Resolved modules, index-aligned with `active_import_paths`.
	pub active_modules: Vec<Arc<dyn RouteModule>>,
	pub build_id: String,
	pub status: NavigationStatus,
}

impl ClientRouteState {
	/// Builds the initial state from the server-embedded payload and the
	/// modules the host page resolved during hydration.
	pub fn hydrate(payload: NavigationPayload, modules: Vec<Arc<dyn RouteModule>>) -> Self {
		Self {
			active_data: payload.active_data,
			active_import_paths: payload.import_urls,
			params: payload.params,
			splat_segments: payload.splat_segments,
			action_data: payload.action_data,
			outermost_error_boundary_index: payload.outermost_error_boundary_index,
			error_to_render: payload.error_to_render,
			active_modules: modules,
			build_id: payload.build_id,
			status: NavigationStatus::Idle,
		}
	}

	/// Overwrites the payload-mirrored fields from a fresh navigation
	/// payload, leaving modules and status to the caller.
	pub fn apply_payload(&mut self, payload: NavigationPayload) {
		self.active_data = payload.active_data;
		self.active_import_paths = payload.import_urls;
		self.params = payload.params;
		self.splat_segments = payload.splat_segments;
		self.action_data = payload.action_data;
		self.outermost_error_boundary_index = payload.outermost_error_boundary_index;
		self.error_to_render = payload.error_to_render;
		self.build_id = payload.build_id;
	}
}

type Observer = Box<dyn Fn(&ClientRouteState) + Send + Sync>;

/// Shared, observable wrapper around [`ClientRouteState`].
#[derive(Default)]
pub struct RouteStateContainer {
	state: RwLock<ClientRouteState>,
	observers: Mutex<Vec<Observer>>,
}

impl RouteStateContainer {
	pub fn new(initial: ClientRouteState) -> Self {
		Self {
			state: RwLock::new(initial),
			observers: Mutex::new(Vec::new()),
		}
	}

	/// Registers an observer invoked once per commit.
	pub fn subscribe(&self, observer: impl Fn(&ClientRouteState) + Send + Sync + 'static) {
		self.observers.lock().push(Box::new(observer));
	}

	/// Applies `mutate` to the state under the write lock, then notifies
	/// every observer once with the settled state.
	pub fn commit(&self, mutate: impl FnOnce(&mut ClientRouteState)) {
		self.try_commit(|state| {
			mutate(state);
			true
		});
	}

	/// Like [`commit`](Self::commit), but `mutate` may decline by returning
	/// false, in which case observers are not notified. A declining `mutate`
	/// must leave the state untouched.
	pub fn try_commit(&self, mutate: impl FnOnce(&mut ClientRouteState) -> bool) -> bool {
		let snapshot = {
			let mut state = self.state.write();
			if !mutate(&mut state) {
				return false;
			}
			state.clone()
		};
		debug!(status = ?snapshot.status, depth = snapshot.active_import_paths.len(), "state committed");
		for observer in self.observers.lock().iter() {
			observer(&snapshot);
		}
		true
	}

	/// Reads through the state without cloning.
	pub fn read<R>(&self, read: impl FnOnce(&ClientRouteState) -> R) -> R {
		read(&self.state.read())
	}

	/// A full clone of the current state.
	pub fn snapshot(&self) -> ClientRouteState {
		self.state.read().clone()
	}
}
