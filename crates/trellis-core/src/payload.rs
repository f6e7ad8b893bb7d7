//! Request-scoped path data and the JSON navigation payload.
//!
//! [`ActivePathData`] is the server-internal result of resolving a matched
//! chain; [`NavigationPayload`] is its wire form, shared verbatim between the
//! document shell (embedded for hydration) and the client navigation engine
//! (fetched on soft navigations).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::head::{HeadBlock, SortedHeadBlocks};

/// The reserved query parameter that switches a URL into JSON-payload mode.
///
/// Using a query parameter rather than a separate path or header means the
/// marker composes with any URL.
pub const PAYLOAD_QUERY_PARAM: &str = "trellis_json";

/// Returns true if the given query string requests the JSON payload variant.
pub fn is_payload_request(query: &str) -> bool {
	query
		.split('&')
		.any(|pair| pair.split('=').next() == Some(PAYLOAD_QUERY_PARAM))
}

/// Appends the JSON-mode marker to an href.
pub fn with_payload_marker(href: &str) -> String {
	let separator = if href.contains('?') { '&' } else { '?' };
	format!("{href}{separator}{PAYLOAD_QUERY_PARAM}=1")
}

/// Removes the JSON-mode marker from an href, if present.
pub fn strip_payload_marker(href: &str) -> String {
	let Some((path, query)) = href.split_once('?') else {
		return href.to_string();
	};
	let remaining: Vec<&str> = query
		.split('&')
		.filter(|pair| pair.split('=').next() != Some(PAYLOAD_QUERY_PARAM))
		.collect();
	if remaining.is_empty() {
		path.to_string()
	} else {
		format!("{path}?{}", remaining.join("&"))
	}
}

/// The resolved, serializable payload for one request or navigation.
///
/// All arrays are index-aligned by chain depth.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivePathData {
	/// Loader outputs per depth; `None` for loaderless depths and for depths
	/// truncated by an error boundary.
	pub active_data: Vec<Option<Value>>,
	/// Import paths per depth.
	pub active_import_paths: Vec<String>,
	/// Merged path parameters of the chain.
	pub params: HashMap<String, String>,
	/// Segments absorbed by the leaf splat, if any.
	pub splat_segments: Vec<String>,
	/// Action outputs per depth; only the leaf of a mutation request is set.
	pub action_data: Vec<Option<Value>>,
	/// The depth whose error boundary must render, when a loader or action
	/// failed. Depths beyond this index are not rendered.
	pub outermost_error_boundary_index: Option<usize>,
	/// The failure to hand to the boundary, rendered to a string.
	pub error_to_render: Option<String>,
}

impl ActivePathData {
	/// Returns the chain depth this payload was resolved for.
	pub fn len(&self) -> usize {
		self.active_import_paths.len()
	}

	/// Returns true for the empty (unmatched) payload.
	pub fn is_empty(&self) -> bool {
		self.active_import_paths.is_empty()
	}

	/// Returns true if resolution recorded a failure.
	pub fn has_error(&self) -> bool {
		self.error_to_render.is_some()
	}
}

/// The wire contract between the server and the client navigation engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationPayload {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub title: Option<String>,
	#[serde(rename = "metaHeadBlocks")]
	pub meta_head_blocks: Vec<HeadBlock>,
	#[serde(rename = "restHeadBlocks")]
	pub rest_head_blocks: Vec<HeadBlock>,
	#[serde(rename = "activeData")]
	pub active_data: Vec<Option<Value>>,
	#[serde(rename = "importURLs")]
	pub import_urls: Vec<String>,
	/// `-1` on the wire means "no error boundary".
	#[serde(
		rename = "outermostErrorBoundaryIndex",
		with = "boundary_index_wire"
	)]
	pub outermost_error_boundary_index: Option<usize>,
	#[serde(
		rename = "errorToRender",
		default,
		skip_serializing_if = "Option::is_none"
	)]
	pub error_to_render: Option<String>,
	#[serde(rename = "splatSegments")]
	pub splat_segments: Vec<String>,
	pub params: HashMap<String, String>,
	#[serde(rename = "actionData")]
	pub action_data: Vec<Option<Value>>,
	#[serde(rename = "buildID")]
	pub build_id: String,
}

impl NavigationPayload {
	/// Assembles the wire payload from resolved path data and sorted head
	/// blocks.
	pub fn assemble(
		data: &ActivePathData,
		head: SortedHeadBlocks,
		build_id: impl Into<String>,
	) -> Self {
		Self {
			title: head.title,
			meta_head_blocks: head.meta,
			rest_head_blocks: head.rest,
			active_data: data.active_data.clone(),
			import_urls: data.active_import_paths.clone(),
			outermost_error_boundary_index: data.outermost_error_boundary_index,
			error_to_render: data.error_to_render.clone(),
			splat_segments: data.splat_segments.clone(),
			params: data.params.clone(),
			action_data: data.action_data.clone(),
			build_id: build_id.into(),
		}
	}
}

/// Serializes `Option<usize>` as `-1`/index for wire compatibility.
mod boundary_index_wire {
	use serde::{Deserialize, Deserializer, Serializer};

	pub fn serialize<S: Serializer>(
		value: &Option<usize>,
		serializer: S,
	) -> Result<S::Ok, S::Error> {
		match value {
			Some(index) => serializer.serialize_i64(*index as i64),
			None => serializer.serialize_i64(-1),
		}
	}

	pub fn deserialize<'de, D: Deserializer<'de>>(
		deserializer: D,
	) -> Result<Option<usize>, D::Error> {
		let raw = i64::deserialize(deserializer)?;
		if raw < 0 {
			Ok(None)
		} else {
			Ok(Some(raw as usize))
		}
	}
}
