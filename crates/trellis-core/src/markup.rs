//! View-library-agnostic rendered markup.

use std::fmt;

/// A chunk of rendered markup.
///
/// The framework core does not commit to any particular view library; route
/// components produce `Markup` and the document shell concatenates it. View
/// adapters (React-style, template-based, ...) are external collaborators
/// that convert their own output into this type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Markup(String);

impl Markup {
	/// Creates empty markup.
	pub fn empty() -> Self {
		Self(String::new())
	}

	/// Creates markup from a pre-rendered string.
	pub fn from_string(html: impl Into<String>) -> Self {
		Self(html.into())
	}

	/// Returns the underlying HTML string.
	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Consumes the markup, returning the HTML string.
	pub fn into_string(self) -> String {
		self.0
	}

	/// Returns true if no content has been rendered.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Appends another chunk of markup.
	pub fn push(&mut self, other: &Markup) {
		self.0.push_str(&other.0);
	}

	/// Appends a raw string.
	pub fn push_str(&mut self, html: &str) {
		self.0.push_str(html);
	}
}

impl fmt::Display for Markup {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<String> for Markup {
	fn from(html: String) -> Self {
		Self(html)
	}
}

impl From<&str> for Markup {
	fn from(html: &str) -> Self {
		Self(html.to_string())
	}
}

/// Escapes text for safe interpolation into HTML content.
pub fn escape_html(text: &str) -> String {
	let mut out = String::with_capacity(text.len());
	for c in text.chars() {
		match c {
			'&' => out.push_str("&amp;"),
			'<' => out.push_str("&lt;"),
			'>' => out.push_str("&gt;"),
			'"' => out.push_str("&quot;"),
			'\'' => out.push_str("&#39;"),
			_ => out.push(c),
		}
	}
	out
}
