//! Path pattern compilation and per-segment match scoring.
//!
//! Patterns use `/literal/:dynamic/*` syntax. A pattern is compiled once into
//! an ordered segment list and is immutable afterwards; matching is a pure
//! function that scores specificity per segment:
//!
//! - literal segment equal to the request segment: +3
//! - dynamic `:name` segment: +2, binds `params[name]`
//! - splat `*` segment: +1, absorbs all remaining request segments
//!
//! A literal mismatch before a splat makes the whole match fail (score 0).

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

/// Errors surfaced when a pattern is compiled at registry build time.
///
/// Malformed patterns are construction-time errors, never per-request ones.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
	#[error("pattern must start with '/': {0}")]
	NotAbsolute(String),
	#[error("splat segment must be the final segment: {0}")]
	SplatNotLast(String),
	#[error("pattern declares more than one splat segment: {0}")]
	MultipleSplats(String),
	#[error("dynamic segment is missing a name: {0}")]
	EmptyParamName(String),
	#[error("duplicate parameter name '{name}' in pattern: {pattern}")]
	DuplicateParam { name: String, pattern: String },
}

/// One compiled pattern segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
	/// Matches exactly this text.
	Literal(String),
	/// Matches any single segment, binding it to the named parameter.
	Dynamic(String),
	/// Matches all remaining segments. Always final.
	Splat,
}

/// A compiled representation of one path pattern string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
	raw: String,
	segments: Vec<Segment>,
}

const SCORE_LITERAL: u32 = 3;
const SCORE_DYNAMIC: u32 = 2;
const SCORE_SPLAT: u32 = 1;

impl RoutePattern {
	/// Compiles a pattern string.
	///
	/// # Errors
	///
	/// Returns a [`PatternError`] if the pattern is not absolute, declares a
	/// splat anywhere but the final position, or repeats a parameter name.
	pub fn compile(pattern: &str) -> Result<Self, PatternError> {
		if !pattern.starts_with('/') {
			return Err(PatternError::NotAbsolute(pattern.to_string()));
		}

		let mut segments = Vec::new();
		let mut seen_params: Vec<&str> = Vec::new();

		let raw_segments: Vec<&str> = split_path(pattern);
		for (position, raw) in raw_segments.iter().enumerate() {
			if let Some(name) = raw.strip_prefix(':') {
				if name.is_empty() {
					return Err(PatternError::EmptyParamName(pattern.to_string()));
				}
				if seen_params.contains(&name) {
					return Err(PatternError::DuplicateParam {
						name: name.to_string(),
						pattern: pattern.to_string(),
					});
				}
				seen_params.push(name);
				segments.push(Segment::Dynamic(name.to_string()));
			} else if raw.starts_with('*') {
				// A splat may carry a cosmetic name (`*rest`); the remainder
				// binds to splat segments, not to a named parameter.
				if segments.iter().any(|s| matches!(s, Segment::Splat)) {
					return Err(PatternError::MultipleSplats(pattern.to_string()));
				}
				if position != raw_segments.len() - 1 {
					return Err(PatternError::SplatNotLast(pattern.to_string()));
				}
				segments.push(Segment::Splat);
			} else {
				segments.push(Segment::Literal(raw.to_string()));
			}
		}

		Ok(Self {
			raw: pattern.to_string(),
			segments,
		})
	}

	/// Returns the original pattern string.
	pub fn raw(&self) -> &str {
		&self.raw
	}

	/// Returns the compiled segments.
	pub fn segments(&self) -> &[Segment] {
		&self.segments
	}

	/// Returns the number of segments, counting a splat as one.
	pub fn segment_count(&self) -> usize {
		self.segments.len()
	}

	/// Returns true if the final segment is a splat.
	pub fn has_splat(&self) -> bool {
		matches!(self.segments.last(), Some(Segment::Splat))
	}

	/// Returns the number of leading non-splat segments.
	pub fn prefix_len(&self) -> usize {
		if self.has_splat() {
			self.segments.len() - 1
		} else {
			self.segments.len()
		}
	}

	/// Matches this pattern against a normalized absolute path.
	pub fn match_path(&self, path: &str) -> MatchResult {
		self.match_segments(&split_path(path))
	}

	/// Matches this pattern against pre-split path segments.
	///
	/// The pattern must consume every given segment: a non-splat pattern
	/// matches only if the segment counts are equal, and a splat absorbs
	/// whatever remains after its prefix.
	pub fn match_segments(&self, path_segments: &[&str]) -> MatchResult {
		let path_segment_count = path_segments.len();

		if !self.has_splat() && self.segments.len() != path_segment_count {
			return MatchResult::no_match(path_segment_count);
		}
		if self.has_splat() && path_segment_count < self.prefix_len() {
			return MatchResult::no_match(path_segment_count);
		}

		let mut score = 0u32;
		let mut literal_segments_matched = 0usize;
		let mut params = HashMap::new();
		let mut splat_segments = Vec::new();

		for (index, segment) in self.segments.iter().enumerate() {
			match segment {
				Segment::Literal(expected) => {
					if path_segments[index] != expected {
						return MatchResult::no_match(path_segment_count);
					}
					score += SCORE_LITERAL;
					literal_segments_matched += 1;
				}
				Segment::Dynamic(name) => {
					params.insert(name.clone(), path_segments[index].to_string());
					score += SCORE_DYNAMIC;
				}
				Segment::Splat => {
					splat_segments = path_segments[index..]
						.iter()
						.map(|s| s.to_string())
						.collect();
					score += SCORE_SPLAT;
				}
			}
		}

		MatchResult {
			matched: true,
			params,
			splat_segments,
			score,
			literal_segments_matched,
			path_segment_count,
		}
	}
}

impl std::fmt::Display for RoutePattern {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.raw)
	}
}

/// The evaluation of one pattern against one concrete path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
	/// Whether the pattern matched at all. A non-match always has score 0.
	pub matched: bool,
	/// Parameters bound by dynamic segments.
	pub params: HashMap<String, String>,
	/// Request segments absorbed by a trailing splat.
	pub splat_segments: Vec<String>,
	/// Total specificity score.
	pub score: u32,
	/// How many literal segments matched.
	pub literal_segments_matched: usize,
	/// How many segments the evaluated path had.
	pub path_segment_count: usize,
}

impl MatchResult {
	fn no_match(path_segment_count: usize) -> Self {
		Self {
			matched: false,
			params: HashMap::new(),
			splat_segments: Vec::new(),
			score: 0,
			literal_segments_matched: 0,
			path_segment_count,
		}
	}
}

/// Normalizes a request path: absolute, no trailing slash except root.
pub fn normalize_path(path: &str) -> String {
	let trimmed = path.trim_end_matches('/');
	if trimmed.is_empty() {
		"/".to_string()
	} else if trimmed.starts_with('/') {
		trimmed.to_string()
	} else {
		format!("/{trimmed}")
	}
}

/// Splits a path into its non-empty segments.
pub fn split_path(path: &str) -> Vec<&str> {
	path.split('/').filter(|s| !s.is_empty()).collect()
}

/// A compilation cache keyed by pattern string.
///
/// Registries compile each distinct pattern once; repeated route definitions
/// sharing a pattern reuse the compiled form.
#[derive(Default)]
pub struct PatternCache {
	inner: Mutex<HashMap<String, Arc<RoutePattern>>>,
}

impl PatternCache {
	/// Creates an empty cache.
	pub fn new() -> Self {
		Self::default()
	}

	/// Compiles a pattern, reusing a previously compiled form if present.
	pub fn compile(&self, pattern: &str) -> Result<Arc<RoutePattern>, PatternError> {
		if let Some(compiled) = self.inner.lock().get(pattern) {
			return Ok(Arc::clone(compiled));
		}
		let compiled = Arc::new(RoutePattern::compile(pattern)?);
		self.inner
			.lock()
			.insert(pattern.to_string(), Arc::clone(&compiled));
		Ok(compiled)
	}

	/// Returns how many distinct patterns have been compiled.
	pub fn len(&self) -> usize {
		self.inner.lock().len()
	}

	/// Returns true if nothing has been compiled yet.
	pub fn is_empty(&self) -> bool {
		self.inner.lock().is_empty()
	}
}
