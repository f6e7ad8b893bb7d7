//! The route registry and nested match-chain resolution.
//!
//! The registry holds the flat list of discovered route definitions supplied
//! by the build-time file walker. Per request it computes the ordered nested
//! chain of matching routes: layouts from the shallowest matched level down to
//! the deepest leaf-capable match, with the highest-scoring pattern winning at
//! each level and registration order breaking exact ties.
//!
//! The registry is immutable once built. Dev-reload scenarios replace the
//! whole registry atomically (swap the owning `Arc`), never mutate it.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::pattern::{
	normalize_path, split_path, MatchResult, PatternCache, PatternError, RoutePattern,
};

/// The trailing segment marking an index route
/// (`/users/_index` supplies terminal content at `/users`).
pub const INDEX_SEGMENT: &str = "_index";

/// What a discovered route module declares.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteCapabilities {
	pub has_loader: bool,
	pub has_action: bool,
	pub has_error_boundary: bool,
}

/// One discovered route, as supplied by the build-time file walker.
#[derive(Debug, Clone)]
pub struct RouteInput {
	pub pattern: String,
	pub import_path: String,
	pub capabilities: RouteCapabilities,
}

impl RouteInput {
	/// Creates a route input with no declared capabilities.
	pub fn new(pattern: impl Into<String>, import_path: impl Into<String>) -> Self {
		Self {
			pattern: pattern.into(),
			import_path: import_path.into(),
			capabilities: RouteCapabilities::default(),
		}
	}

	/// Declares a loader.
	pub fn with_loader(mut self) -> Self {
		self.capabilities.has_loader = true;
		self
	}

	/// Declares an action.
	pub fn with_action(mut self) -> Self {
		self.capabilities.has_action = true;
		self
	}

	/// Declares an error boundary.
	pub fn with_error_boundary(mut self) -> Self {
		self.capabilities.has_error_boundary = true;
		self
	}
}

/// One route definition, compiled and read-only during request serving.
#[derive(Debug)]
pub struct RouteDefinition {
	pattern: Arc<RoutePattern>,
	raw_pattern: String,
	import_path: String,
	capabilities: RouteCapabilities,
	is_index: bool,
	registration_index: usize,
}

impl RouteDefinition {
	/// The compiled pattern. For index routes this is the parent pattern.
	pub fn pattern(&self) -> &RoutePattern {
		&self.pattern
	}

	/// The pattern string as registered (index suffix included).
	pub fn raw_pattern(&self) -> &str {
		&self.raw_pattern
	}

	/// Opaque module reference for this route.
	pub fn import_path(&self) -> &str {
		&self.import_path
	}

	/// What the module declares.
	pub fn capabilities(&self) -> RouteCapabilities {
		self.capabilities
	}

	/// True for index routes (terminal content at the parent's own path).
	pub fn is_index(&self) -> bool {
		self.is_index
	}

	/// Position in the registration order, used for deterministic tie-breaks.
	pub fn registration_index(&self) -> usize {
		self.registration_index
	}
}

/// One chain entry: a definition plus its evaluation against the request.
#[derive(Debug, Clone)]
pub struct MatchedRoute {
	definition: Arc<RouteDefinition>,
	result: MatchResult,
}

impl MatchedRoute {
	/// The matched definition.
	pub fn definition(&self) -> &RouteDefinition {
		&self.definition
	}

	/// The per-pattern evaluation.
	pub fn result(&self) -> &MatchResult {
		&self.result
	}

	/// Shortcut for the definition's import path.
	pub fn import_path(&self) -> &str {
		self.definition.import_path()
	}
}

/// The ordered nested chain of matching routes for one request path.
///
/// The chain is contiguous by construction: element *i+1* nests inside
/// element *i*, and the final element is the leaf that determines the
/// response's primary content. An empty chain means "not a route".
#[derive(Debug, Clone, Default)]
pub struct MatchChain {
	routes: Vec<MatchedRoute>,
	params: HashMap<String, String>,
	splat_segments: Vec<String>,
}

impl MatchChain {
	fn assemble(routes: Vec<MatchedRoute>) -> Self {
		let mut params = HashMap::new();
		let mut splat_segments = Vec::new();
		for route in &routes {
			// Deeper bindings win on name collisions.
			params.extend(route.result.params.clone());
			if !route.result.splat_segments.is_empty() {
				splat_segments = route.result.splat_segments.clone();
			}
		}
		Self {
			routes,
			params,
			splat_segments,
		}
	}

	/// Returns the chain depth.
	pub fn len(&self) -> usize {
		self.routes.len()
	}

	/// Returns true when nothing matched.
	pub fn is_empty(&self) -> bool {
		self.routes.is_empty()
	}

	/// The chain entries, root layout first.
	pub fn routes(&self) -> &[MatchedRoute] {
		&self.routes
	}

	/// The leaf entry, if the chain is non-empty.
	pub fn leaf(&self) -> Option<&MatchedRoute> {
		self.routes.last()
	}

	/// Merged path parameters across the chain.
	pub fn params(&self) -> &HashMap<String, String> {
		&self.params
	}

	/// Splat segments absorbed by the leaf, if any.
	pub fn splat_segments(&self) -> &[String] {
		&self.splat_segments
	}

	/// Import paths per depth, in chain order.
	pub fn import_paths(&self) -> Vec<String> {
		self.routes
			.iter()
			.map(|r| r.import_path().to_string())
			.collect()
	}
}

/// The compiled route table.
pub struct RouteRegistry {
	definitions: Vec<Arc<RouteDefinition>>,
	// Non-index, non-splat definitions grouped by segment count, in
	// registration order within each level.
	prefix_levels: BTreeMap<usize, Vec<usize>>,
	splats: Vec<usize>,
	indexes: Vec<usize>,
	max_depth: usize,
}

impl RouteRegistry {
	/// Compiles every supplied definition into a registry.
	///
	/// Malformed patterns fail the whole build; they are never deferred to
	/// request time.
	pub fn build(inputs: Vec<RouteInput>) -> Result<Self, PatternError> {
		let cache = PatternCache::new();
		let mut definitions = Vec::with_capacity(inputs.len());
		let mut prefix_levels: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
		let mut splats = Vec::new();
		let mut indexes = Vec::new();
		let mut max_depth = 0;

		for (registration_index, input) in inputs.into_iter().enumerate() {
			let (effective_pattern, is_index) = strip_index_suffix(&input.pattern);
			let pattern = cache.compile(&effective_pattern)?;
			max_depth = max_depth.max(pattern.segment_count());

			let index = definitions.len();
			if is_index {
				indexes.push(index);
			} else if pattern.has_splat() {
				splats.push(index);
			} else {
				prefix_levels
					.entry(pattern.segment_count())
					.or_default()
					.push(index);
			}

			definitions.push(Arc::new(RouteDefinition {
				pattern,
				raw_pattern: input.pattern,
				import_path: input.import_path,
				capabilities: input.capabilities,
				is_index,
				registration_index,
			}));
		}

		Ok(Self {
			definitions,
			prefix_levels,
			splats,
			indexes,
			max_depth,
		})
	}

	/// Returns the number of registered definitions.
	pub fn len(&self) -> usize {
		self.definitions.len()
	}

	/// Returns true if no routes are registered.
	pub fn is_empty(&self) -> bool {
		self.definitions.is_empty()
	}

	/// Deepest nesting observed across all definitions.
	pub fn max_depth(&self) -> usize {
		self.max_depth
	}

	/// All definitions, in registration order.
	pub fn definitions(&self) -> impl Iterator<Item = &RouteDefinition> {
		self.definitions.iter().map(|d| d.as_ref())
	}

	/// Computes the ordered nested chain for a request path.
	pub fn build_chain(&self, request_path: &str) -> MatchChain {
		let path = normalize_path(request_path);
		let segments = split_path(&path);
		let n = segments.len();

		// Best full-prefix match per level; level n is the full-path match.
		let mut level_best: Vec<Option<MatchedRoute>> = vec![None; n + 1];
		for (&level, candidates) in self.prefix_levels.range(0..=n) {
			for &index in candidates {
				let definition = &self.definitions[index];
				let result = definition.pattern().match_segments(&segments[..level]);
				if !result.matched {
					continue;
				}
				// Strictly-greater keeps the first registered on score ties.
				let better = match &level_best[level] {
					Some(best) => result.score > best.result.score,
					None => true,
				};
				if better {
					level_best[level] = Some(MatchedRoute {
						definition: Arc::clone(definition),
						result,
					});
				}
			}
		}

		// An index route is eligible only when the request path exactly
		// equals its parent's resolved path.
		let mut index_leaf: Option<MatchedRoute> = None;
		for &index in &self.indexes {
			let definition = &self.definitions[index];
			if definition.pattern().segment_count() != n {
				continue;
			}
			let result = definition.pattern().match_segments(&segments);
			if !result.matched {
				continue;
			}
			let better = match &index_leaf {
				Some(best) => result.score > best.result.score,
				None => true,
			};
			if better {
				index_leaf = Some(MatchedRoute {
					definition: Arc::clone(definition),
					result,
				});
			}
		}

		let full_leaf = level_best[n].take();
		if full_leaf.is_some() || index_leaf.is_some() {
			let mut routes = Vec::new();
			for slot in level_best.iter_mut().take(n) {
				if let Some(layout) = slot.take() {
					routes.push(layout);
				}
			}
			// With both present, the full match at the terminal level acts as
			// the layout wrapping the index route's content.
			if let Some(full) = full_leaf {
				routes.push(full);
			}
			if let Some(index) = index_leaf {
				routes.push(index);
			}
			return MatchChain::assemble(routes);
		}

		// No exact leaf: fall back to the deepest matching splat. Deeper
		// evaluation has already been attempted above, so a shallow splat is
		// only committed when nothing more specific consumed the full path.
		let mut splat_leaf: Option<MatchedRoute> = None;
		for &index in &self.splats {
			let definition = &self.definitions[index];
			if definition.pattern().prefix_len() > n {
				continue;
			}
			let result = definition.pattern().match_segments(&segments);
			if !result.matched {
				continue;
			}
			let better = match &splat_leaf {
				Some(best) => {
					let (depth, best_depth) = (
						definition.pattern().prefix_len(),
						best.definition.pattern().prefix_len(),
					);
					depth > best_depth || (depth == best_depth && result.score > best.result.score)
				}
				None => true,
			};
			if better {
				splat_leaf = Some(MatchedRoute {
					definition: Arc::clone(definition),
					result,
				});
			}
		}

		match splat_leaf {
			Some(splat) => {
				let prefix_len = splat.definition.pattern().prefix_len();
				let mut routes = Vec::new();
				for slot in level_best.iter_mut().take(prefix_len.min(n) + 1) {
					if let Some(layout) = slot.take() {
						routes.push(layout);
					}
				}
				routes.push(splat);
				MatchChain::assemble(routes)
			}
			None => MatchChain::default(),
		}
	}
}

/// Splits an `_index` suffix off a registered pattern, returning the
/// effective (parent) pattern and whether this is an index route.
fn strip_index_suffix(pattern: &str) -> (String, bool) {
	let segments = split_path(pattern);
	match segments.last() {
		Some(&last) if last == INDEX_SEGMENT => {
			let parent = &segments[..segments.len() - 1];
			if parent.is_empty() {
				("/".to_string(), true)
			} else {
				(format!("/{}", parent.join("/")), true)
			}
		}
		_ => (pattern.to_string(), false),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn registry(patterns: &[&str]) -> RouteRegistry {
		RouteRegistry::build(
			patterns
				.iter()
				.map(|p| RouteInput::new(*p, format!("routes{p}")))
				.collect(),
		)
		.unwrap()
	}

	#[test]
	fn test_literal_beats_dynamic_at_same_level() {
		let reg = registry(&["/users/:id", "/users/new"]);
		let chain = reg.build_chain("/users/new");
		assert_eq!(chain.len(), 1);
		assert_eq!(chain.leaf().unwrap().import_path(), "routes/users/new");
		assert!(chain.params().is_empty());
	}

	#[test]
	fn test_dynamic_matches_when_no_literal_fits() {
		let reg = registry(&["/users/:id", "/users/new"]);
		let chain = reg.build_chain("/users/42");
		assert_eq!(chain.leaf().unwrap().import_path(), "routes/users/:id");
		assert_eq!(chain.params().get("id"), Some(&"42".to_string()));
	}

	#[test]
	fn test_nested_chain_root_to_leaf() {
		let reg = registry(&["/", "/users", "/users/:id"]);
		let chain = reg.build_chain("/users/42");
		assert_eq!(chain.import_paths(), vec![
			"routes/".to_string(),
			"routes/users".to_string(),
			"routes/users/:id".to_string(),
		]);
	}

	#[test]
	fn test_index_route_at_parent_path() {
		let reg = registry(&["/users", "/users/_index", "/users/:id"]);

		let chain = reg.build_chain("/users");
		assert_eq!(chain.len(), 2);
		assert_eq!(chain.routes()[0].import_path(), "routes/users");
		assert_eq!(chain.leaf().unwrap().import_path(), "routes/users/_index");
		assert!(chain.leaf().unwrap().definition().is_index());

		// The index route never extends the chain for deeper requests.
		let chain = reg.build_chain("/users/42");
		assert_eq!(chain.leaf().unwrap().import_path(), "routes/users/:id");
	}

	#[test]
	fn test_splat_collects_segments() {
		let reg = registry(&["/docs/*"]);
		let chain = reg.build_chain("/docs/a/b/c");
		assert_eq!(chain.len(), 1);
		assert_eq!(chain.splat_segments(), ["a", "b", "c"]);
		assert!(chain.params().is_empty());
	}

	#[test]
	fn test_deeper_literal_beats_shallow_splat() {
		let reg = registry(&["/docs/*", "/docs/guide/intro"]);
		let chain = reg.build_chain("/docs/guide/intro");
		assert_eq!(chain.leaf().unwrap().import_path(), "routes/docs/guide/intro");
	}

	#[test]
	fn test_no_match_is_empty_chain() {
		let reg = registry(&["/users"]);
		assert!(reg.build_chain("/nothing/here").is_empty());
	}

	#[test]
	fn test_prefix_only_match_is_not_a_route() {
		// A matched layout with no leaf consuming the full path is a 404.
		let reg = registry(&["/", "/users"]);
		assert!(reg.build_chain("/users/42/missing").is_empty());
	}

	#[test]
	fn test_tie_break_is_registration_order() {
		let reg = RouteRegistry::build(vec![
			RouteInput::new("/items/:a", "routes/first"),
			RouteInput::new("/items/:b", "routes/second"),
		])
		.unwrap();
		let chain = reg.build_chain("/items/7");
		assert_eq!(chain.leaf().unwrap().import_path(), "routes/first");
	}

	#[test]
	fn test_malformed_pattern_fails_build() {
		let result = RouteRegistry::build(vec![RouteInput::new("/a/*/b", "routes/bad")]);
		assert!(result.is_err());
	}

	#[test]
	fn test_trailing_slash_normalized() {
		let reg = registry(&["/users"]);
		assert_eq!(reg.build_chain("/users/").len(), 1);
	}

	#[test]
	fn test_root_index() {
		let reg = registry(&["/", "/_index"]);
		let chain = reg.build_chain("/");
		assert_eq!(chain.len(), 2);
		assert!(chain.leaf().unwrap().definition().is_index());
	}
}
