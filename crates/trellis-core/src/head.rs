//! Document head blocks and their deduplication rules.
//!
//! Routes contribute head blocks (title, meta tags, links, scripts) at every
//! depth of the matched chain. Deeper routes win over shallower ones and over
//! framework defaults, under these rules:
//!
//! - at most one `title`; the last declared wins
//! - at most one `meta[name=...]` / `meta[property=...]` per distinct
//!   name/property value; later declarations override earlier ones
//! - everything else is deduplicated by structural equality
//!
//! The server renders managed head content between sentinel comments so the
//! client engine can later clear and re-insert only within those bounds.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::markup::escape_html;

/// One head element declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HeadBlock {
	/// The document title.
	Title { title: String },
	/// An arbitrary head element such as `meta`, `link`, `script` or `style`.
	Tag {
		tag: String,
		#[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
		attributes: BTreeMap<String, String>,
		#[serde(
			rename = "innerHTML",
			default,
			skip_serializing_if = "Option::is_none"
		)]
		inner_html: Option<String>,
	},
}

impl HeadBlock {
	/// Creates a title block.
	pub fn title(title: impl Into<String>) -> Self {
		Self::Title {
			title: title.into(),
		}
	}

	/// Creates a tag block with no attributes.
	pub fn tag(tag: impl Into<String>) -> Self {
		Self::Tag {
			tag: tag.into(),
			attributes: BTreeMap::new(),
			inner_html: None,
		}
	}

	/// Creates a `meta` block with `name` and `content` attributes.
	pub fn meta(name: impl Into<String>, content: impl Into<String>) -> Self {
		Self::tag("meta")
			.attr("name", name)
			.attr("content", content)
	}

	/// Adds an attribute, replacing any previous value for the same key.
	pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		if let Self::Tag { attributes, .. } = &mut self {
			attributes.insert(key.into(), value.into());
		}
		self
	}

	/// Sets the inner HTML of a tag block.
	pub fn inner_html(mut self, html: impl Into<String>) -> Self {
		if let Self::Tag { inner_html, .. } = &mut self {
			*inner_html = Some(html.into());
		}
		self
	}

	/// Returns the dedup key for keyed meta blocks:
	/// the `name` or `property` attribute value, if present.
	fn meta_key(&self) -> Option<(&'static str, &str)> {
		match self {
			Self::Tag { tag, attributes, .. } if tag == "meta" => {
				if let Some(name) = attributes.get("name") {
					Some(("name", name.as_str()))
				} else {
					attributes
						.get("property")
						.map(|p| ("property", p.as_str()))
				}
			}
			_ => None,
		}
	}
}

/// The two managed regions of the document head.
///
/// Each region is bounded by sentinel comments; content outside the sentinels
/// is never touched by the framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeadRegion {
	/// Meta tags (rendered first, immediately after the title).
	Meta,
	/// Everything else: links, scripts, styles.
	Rest,
}

impl HeadRegion {
	/// The comment marking the start of this region.
	pub fn start_sentinel(&self) -> &'static str {
		match self {
			Self::Meta => "<!--trellis-meta-start-->",
			Self::Rest => "<!--trellis-rest-start-->",
		}
	}

	/// The comment marking the end of this region.
	pub fn end_sentinel(&self) -> &'static str {
		match self {
			Self::Meta => "<!--trellis-meta-end-->",
			Self::Rest => "<!--trellis-rest-end-->",
		}
	}
}

/// Head blocks after deduplication, sorted into their document positions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortedHeadBlocks {
	/// The winning title, if any block declared one.
	pub title: Option<String>,
	/// Deduplicated meta blocks, in declaration order.
	pub meta: Vec<HeadBlock>,
	/// Deduplicated non-meta blocks, in declaration order.
	pub rest: Vec<HeadBlock>,
}

/// Deduplicates head blocks and sorts them into title/meta/rest.
///
/// Blocks are processed in declaration order; callers pass defaults first and
/// deeper routes' blocks later so that the later-wins rules favor the leaf.
pub fn sort_head_blocks(blocks: &[HeadBlock]) -> SortedHeadBlocks {
	let mut title = None;
	let mut meta: Vec<HeadBlock> = Vec::new();
	let mut meta_keys: BTreeMap<(String, String), usize> = BTreeMap::new();
	let mut rest: Vec<HeadBlock> = Vec::new();
	let mut seen: HashSet<HeadBlock> = HashSet::new();

	for block in blocks {
		match block {
			HeadBlock::Title { title: t } => {
				// Last declared title wins.
				title = Some(t.clone());
			}
			HeadBlock::Tag { tag, .. } => {
				if let Some((attr, value)) = block.meta_key() {
					let key = (attr.to_string(), value.to_string());
					match meta_keys.get(&key) {
						// Later declaration overrides in place.
						Some(&index) => meta[index] = block.clone(),
						None => {
							meta_keys.insert(key, meta.len());
							meta.push(block.clone());
						}
					}
				} else if tag == "meta" {
					if seen.insert(block.clone()) {
						meta.push(block.clone());
					}
				} else if seen.insert(block.clone()) {
					rest.push(block.clone());
				}
			}
		}
	}

	SortedHeadBlocks { title, meta, rest }
}

/// Renders head blocks to an HTML string.
///
/// Tag and attribute names come from statically declared route modules and
/// are emitted as-is; attribute values and title text are escaped.
pub fn render_head_blocks(blocks: &[HeadBlock]) -> String {
	let mut html = String::new();
	for block in blocks {
		match block {
			HeadBlock::Title { title } => {
				html.push_str("<title>");
				html.push_str(&escape_html(title));
				html.push_str("</title>");
			}
			HeadBlock::Tag {
				tag,
				attributes,
				inner_html,
			} => {
				html.push('<');
				html.push_str(tag);
				for (key, value) in attributes {
					html.push(' ');
					html.push_str(key);
					html.push_str("=\"");
					html.push_str(&escape_html(value));
					html.push('"');
				}
				html.push('>');
				if let Some(inner) = inner_html {
					html.push_str(inner);
					html.push_str("</");
					html.push_str(tag);
					html.push('>');
				} else if !is_void_tag(tag) {
					html.push_str("</");
					html.push_str(tag);
					html.push('>');
				}
			}
		}
	}
	html
}

fn is_void_tag(tag: &str) -> bool {
	matches!(tag, "meta" | "link" | "base")
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_last_title_wins() {
		let blocks = vec![HeadBlock::title("Root"), HeadBlock::title("Leaf")];
		let sorted = sort_head_blocks(&blocks);
		assert_eq!(sorted.title, Some("Leaf".to_string()));
	}

	#[test]
	fn test_keyed_meta_overrides_in_place() {
		let blocks = vec![
			HeadBlock::meta("description", "root description"),
			HeadBlock::meta("author", "someone"),
			HeadBlock::meta("description", "leaf description"),
		];
		let sorted = sort_head_blocks(&blocks);
		assert_eq!(sorted.meta.len(), 2);
		assert_eq!(
			sorted.meta[0],
			HeadBlock::meta("description", "leaf description")
		);
		assert_eq!(sorted.meta[1], HeadBlock::meta("author", "someone"));
	}

	#[test]
	fn test_meta_property_is_keyed() {
		let blocks = vec![
			HeadBlock::tag("meta")
				.attr("property", "og:title")
				.attr("content", "a"),
			HeadBlock::tag("meta")
				.attr("property", "og:title")
				.attr("content", "b"),
		];
		let sorted = sort_head_blocks(&blocks);
		assert_eq!(sorted.meta.len(), 1);
		assert_eq!(
			sorted.meta[0],
			HeadBlock::tag("meta")
				.attr("property", "og:title")
				.attr("content", "b")
		);
	}

	#[test]
	fn test_structural_dedup_for_rest_blocks() {
		let link = HeadBlock::tag("link")
			.attr("rel", "stylesheet")
			.attr("href", "/main.css");
		let blocks = vec![link.clone(), link.clone()];
		let sorted = sort_head_blocks(&blocks);
		assert_eq!(sorted.rest.len(), 1);
	}

	#[test]
	fn test_render_escapes_attribute_values() {
		let html = render_head_blocks(&[HeadBlock::meta("description", "a \"quoted\" value")]);
		assert_eq!(
			html,
			"<meta content=\"a &quot;quoted&quot; value\" name=\"description\">"
		);
	}

	#[test]
	fn test_render_script_with_inner_html() {
		let html = render_head_blocks(&[HeadBlock::tag("script")
			.attr("type", "module")
			.inner_html("init();")]);
		assert_eq!(html, "<script type=\"module\">init();</script>");
	}

	#[test]
	fn test_head_block_wire_shape() {
		let json = serde_json::to_value(HeadBlock::title("Home")).unwrap();
		assert_eq!(json, serde_json::json!({ "title": "Home" }));

		let json = serde_json::to_value(HeadBlock::meta("description", "d")).unwrap();
		assert_eq!(
			json,
			serde_json::json!({
				"tag": "meta",
				"attributes": { "content": "d", "name": "description" }
			})
		);
	}
}
