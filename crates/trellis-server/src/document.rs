//! The HTML document shell for first loads.
//!
//! Wraps rendered outlet markup in a full document. The managed head regions
//! are bounded by sentinel comments so the client engine can later patch
//! them without touching anything else in `<head>`, and the navigation
//! payload is embedded as JSON for hydration.

use trellis_core::{
	escape_html, render_head_blocks, HeadRegion, Markup, NavigationPayload, SortedHeadBlocks,
};

/// The id of the embedded hydration payload script.
pub const PAYLOAD_SCRIPT_ID: &str = "trellis-payload";

/// The id of the element the client mounts into.
pub const ROOT_ELEMENT_ID: &str = "trellis-root";

/// Options for document rendering.
#[derive(Debug, Clone)]
pub struct DocumentOptions {
	/// Language attribute for the `<html>` element.
	pub lang: String,
	/// Extra raw HTML appended at the end of `<body>` (typically the client
	/// bundle script tag). Never managed by the framework afterwards.
	pub body_scripts: String,
}

impl Default for DocumentOptions {
	fn default() -> Self {
		Self {
			lang: "en".to_string(),
			body_scripts: String::new(),
		}
	}
}

impl DocumentOptions {
	/// Creates default options.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the language.
	pub fn lang(mut self, lang: impl Into<String>) -> Self {
		self.lang = lang.into();
		self
	}

	/// Sets the body scripts block.
	pub fn body_scripts(mut self, html: impl Into<String>) -> Self {
		self.body_scripts = html.into();
		self
	}
}

/// Errors produced while assembling the document.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
	#[error("failed to serialize hydration payload: {0}")]
	Payload(#[from] serde_json::Error),
}

/// Renders full HTML documents.
#[derive(Debug, Clone, Default)]
pub struct DocumentRenderer {
	options: DocumentOptions,
}

impl DocumentRenderer {
	/// Creates a renderer with default options.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a renderer with custom options.
	pub fn with_options(options: DocumentOptions) -> Self {
		Self { options }
	}

	/// Wraps body markup in a full HTML document.
	pub fn render(
		&self,
		head: &SortedHeadBlocks,
		body: &Markup,
		payload: &NavigationPayload,
	) -> Result<String, DocumentError> {
		let payload_json = serde_json::to_string(payload)?;
		// `</script>` inside the JSON would terminate the script element.
		let payload_json = payload_json.replace("</", "<\\/");

		let mut html = String::with_capacity(body.as_str().len() + payload_json.len() + 1024);
		html.push_str("<!DOCTYPE html>\n");
		html.push_str(&format!("<html lang=\"{}\">\n", escape_html(&self.options.lang)));
		html.push_str("<head>\n");
		html.push_str("<meta charset=\"utf-8\">\n");
		if let Some(title) = &head.title {
			html.push_str(&format!("<title>{}</title>\n", escape_html(title)));
		}
		html.push_str(HeadRegion::Meta.start_sentinel());
		html.push_str(&render_head_blocks(&head.meta));
		html.push_str(HeadRegion::Meta.end_sentinel());
		html.push('\n');
		html.push_str(HeadRegion::Rest.start_sentinel());
		html.push_str(&render_head_blocks(&head.rest));
		html.push_str(HeadRegion::Rest.end_sentinel());
		html.push('\n');
		html.push_str(&format!(
			"<script type=\"application/json\" id=\"{PAYLOAD_SCRIPT_ID}\">{payload_json}</script>\n"
		));
		html.push_str("</head>\n<body>\n");
		html.push_str(&format!("<div id=\"{ROOT_ELEMENT_ID}\">"));
		html.push_str(body.as_str());
		html.push_str("</div>\n");
		if !self.options.body_scripts.is_empty() {
			html.push_str(&self.options.body_scripts);
			html.push('\n');
		}
		html.push_str("</body>\n</html>\n");
		Ok(html)
	}
}
