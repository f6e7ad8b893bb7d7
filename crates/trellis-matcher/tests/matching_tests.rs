// Match-chain resolution tests across realistic route tables.

use rstest::rstest;
use trellis_matcher::{RouteInput, RouteRegistry};

fn blog_registry() -> RouteRegistry {
	RouteRegistry::build(vec![
		RouteInput::new("/", "routes/root").with_error_boundary(),
		RouteInput::new("/_index", "routes/home").with_loader(),
		RouteInput::new("/posts", "routes/posts").with_loader(),
		RouteInput::new("/posts/_index", "routes/posts-index").with_loader(),
		RouteInput::new("/posts/:slug", "routes/post").with_loader().with_action(),
		RouteInput::new("/posts/new", "routes/post-new").with_action(),
		RouteInput::new("/files/*", "routes/files").with_loader(),
	])
	.unwrap()
}

// Test: scoring monotonicity - a literal match outranks a dynamic one when
// the patterns agree elsewhere.
#[test]
fn test_literal_segment_outscores_dynamic() {
	let reg = blog_registry();

	let chain = reg.build_chain("/posts/new");
	assert_eq!(chain.leaf().unwrap().import_path(), "routes/post-new");

	let chain = reg.build_chain("/posts/hello-world");
	assert_eq!(chain.leaf().unwrap().import_path(), "routes/post");
	assert_eq!(
		chain.params().get("slug"),
		Some(&"hello-world".to_string())
	);
}

// Test: chain contiguity - every depth below the leaf is present and ordered.
#[test]
fn test_chain_is_contiguous_root_to_leaf() {
	let reg = blog_registry();
	let chain = reg.build_chain("/posts/hello-world");

	assert_eq!(chain.import_paths(), vec![
		"routes/root".to_string(),
		"routes/posts".to_string(),
		"routes/post".to_string(),
	]);
	for window in chain.routes().windows(2) {
		let shallow = window[0].definition().pattern().segment_count();
		let deep = window[1].definition().pattern().segment_count();
		assert!(shallow <= deep);
	}
}

// Test: splat absorbs the remainder without binding named params.
#[test]
fn test_splat_chain() {
	let reg = blog_registry();
	let chain = reg.build_chain("/files/css/styles/main.css");

	assert_eq!(chain.leaf().unwrap().import_path(), "routes/files");
	assert_eq!(chain.splat_segments(), ["css", "styles", "main.css"]);
	assert!(chain.params().is_empty());
}

// Test: index routes terminate their parent's own path only.
#[test]
fn test_index_routes_supply_terminal_content() {
	let reg = blog_registry();

	let chain = reg.build_chain("/");
	assert_eq!(chain.import_paths(), vec![
		"routes/root".to_string(),
		"routes/home".to_string(),
	]);

	let chain = reg.build_chain("/posts");
	assert_eq!(chain.import_paths(), vec![
		"routes/root".to_string(),
		"routes/posts".to_string(),
		"routes/posts-index".to_string(),
	]);
}

// Test: capabilities travel with the matched definition.
#[test]
fn test_capabilities_on_matched_routes() {
	let reg = blog_registry();
	let chain = reg.build_chain("/posts/abc");

	assert!(chain.routes()[0].definition().capabilities().has_error_boundary);
	assert!(chain.leaf().unwrap().definition().capabilities().has_action);
}

#[rstest]
#[case("/nope", true)]
#[case("/posts/a/b", true)] // no route consumes three segments under /posts
#[case("/posts", false)]
#[case("/files/x", false)]
fn test_unroutable_paths_yield_empty_chains(#[case] path: &str, #[case] empty: bool) {
	let reg = blog_registry();
	assert_eq!(reg.build_chain(path).is_empty(), empty, "path: {path}");
}

// Test: a deeper literal wins over a shallower splat for the same path.
#[test]
fn test_splat_defers_to_deeper_match() {
	let reg = RouteRegistry::build(vec![
		RouteInput::new("/docs/*", "routes/docs-splat"),
		RouteInput::new("/docs/api", "routes/docs-api"),
	])
	.unwrap();

	assert_eq!(
		reg.build_chain("/docs/api").leaf().unwrap().import_path(),
		"routes/docs-api"
	);
	assert_eq!(
		reg.build_chain("/docs/other").leaf().unwrap().import_path(),
		"routes/docs-splat"
	);
}

// Test: deeper splat wins over shallower splat.
#[test]
fn test_deeper_splat_wins() {
	let reg = RouteRegistry::build(vec![
		RouteInput::new("/static/*", "routes/static"),
		RouteInput::new("/static/img/*", "routes/static-img"),
	])
	.unwrap();

	assert_eq!(
		reg.build_chain("/static/img/logo.png")
			.leaf()
			.unwrap()
			.import_path(),
		"routes/static-img"
	);
	assert_eq!(
		reg.build_chain("/static/app.js").leaf().unwrap().import_path(),
		"routes/static"
	);
}

// Test: params merge across depths with deeper bindings winning.
#[test]
fn test_params_merge_across_depths() {
	let reg = RouteRegistry::build(vec![
		RouteInput::new("/orgs/:org", "routes/org"),
		RouteInput::new("/orgs/:org/repos/:repo", "routes/repo"),
	])
	.unwrap();

	let chain = reg.build_chain("/orgs/acme/repos/widget");
	assert_eq!(chain.params().get("org"), Some(&"acme".to_string()));
	assert_eq!(chain.params().get("repo"), Some(&"widget".to_string()));
}
