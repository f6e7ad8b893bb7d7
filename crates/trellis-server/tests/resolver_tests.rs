// Path data resolution: loader ordering, redirects, error-boundary
// attribution, and action semantics.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use trellis_core::{
	Action, LoaderArgs, LoaderError, Loader, LoaderOutcome, Redirect, RequestContext, RouteModule,
	StaticModuleLoader,
};
use trellis_matcher::{MatchChain, RouteInput, RouteRegistry};
use trellis_server::{PathDataResolver, ResolveError, ResolveOutcome, ResolvedPath};

struct DataLoader(Value);

#[async_trait]
impl Loader for DataLoader {
	async fn run(&self, _args: LoaderArgs<'_>) -> Result<LoaderOutcome, LoaderError> {
		Ok(LoaderOutcome::Data(self.0.clone()))
	}
}

struct FailingLoader(&'static str);

#[async_trait]
impl Loader for FailingLoader {
	async fn run(&self, _args: LoaderArgs<'_>) -> Result<LoaderOutcome, LoaderError> {
		Err(LoaderError::msg(self.0))
	}
}

struct RedirectLoader(&'static str);

#[async_trait]
impl Loader for RedirectLoader {
	async fn run(&self, _args: LoaderArgs<'_>) -> Result<LoaderOutcome, LoaderError> {
		Ok(LoaderOutcome::Redirect(Redirect::to(self.0)))
	}
}

/// Counts invocations so tests can assert a loader was never reached.
struct CountingLoader {
	calls: Arc<AtomicUsize>,
}

#[async_trait]
impl Loader for CountingLoader {
	async fn run(&self, _args: LoaderArgs<'_>) -> Result<LoaderOutcome, LoaderError> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		Ok(LoaderOutcome::Data(json!("counted")))
	}
}

struct DataAction(Value);

#[async_trait]
impl Action for DataAction {
	async fn run(&self, _args: LoaderArgs<'_>) -> Result<LoaderOutcome, LoaderError> {
		Ok(LoaderOutcome::Data(self.0.clone()))
	}
}

struct RedirectAction(&'static str);

#[async_trait]
impl Action for RedirectAction {
	async fn run(&self, _args: LoaderArgs<'_>) -> Result<LoaderOutcome, LoaderError> {
		Ok(LoaderOutcome::Redirect(Redirect::to(self.0)))
	}
}

#[derive(Default)]
struct StubModule {
	loader: Option<Box<dyn Loader>>,
	action: Option<Box<dyn Action>>,
}

impl StubModule {
	fn with_loader(loader: impl Loader + 'static) -> Self {
		Self {
			loader: Some(Box::new(loader)),
			..Default::default()
		}
	}

	fn with_action(mut self, action: impl Action + 'static) -> Self {
		self.action = Some(Box::new(action));
		self
	}
}

impl RouteModule for StubModule {
	fn loader(&self) -> Option<&dyn Loader> {
		self.loader.as_deref()
	}

	fn action(&self) -> Option<&dyn Action> {
		self.action.as_deref()
	}
}

/// A three-depth chain `/dash/projects` with configurable boundaries:
/// root layout, dash layout, projects leaf.
fn chain_of_three(boundary_at_root: bool) -> (MatchChain, RouteRegistry) {
	let mut root = RouteInput::new("/", "m/root").with_loader();
	if boundary_at_root {
		root = root.with_error_boundary();
	}
	let registry = RouteRegistry::build(vec![
		root,
		RouteInput::new("/dash", "m/dash"),
		RouteInput::new("/dash/projects", "m/projects").with_loader().with_action(),
	])
	.unwrap();
	let chain = registry.build_chain("/dash/projects");
	assert_eq!(chain.len(), 3);
	(chain, registry)
}

fn expect_data(outcome: ResolveOutcome) -> ResolvedPath {
	match outcome {
		ResolveOutcome::Data(resolved) => resolved,
		ResolveOutcome::Redirect(r) => panic!("unexpected redirect to {}", r.location),
	}
}

// Test: index alignment (P3) - every array spans the full chain, with None
// placeholders for loaderless depths.
#[tokio::test]
async fn test_arrays_are_index_aligned() {
	let (chain, _) = chain_of_three(false);
	let loader = StaticModuleLoader::new()
		.register("m/root", Arc::new(StubModule::with_loader(DataLoader(json!({"user": "jo"})))))
		.register("m/dash", Arc::new(StubModule::default()))
		.register(
			"m/projects",
			Arc::new(StubModule::with_loader(DataLoader(json!(["p1", "p2"])))),
		);

	let resolver = PathDataResolver::new(Arc::new(loader));
	let resolved = expect_data(
		resolver
			.resolve(&chain, &RequestContext::get("/dash/projects"))
			.await
			.unwrap(),
	);

	let data = &resolved.data;
	assert_eq!(data.active_data.len(), 3);
	assert_eq!(data.active_import_paths.len(), 3);
	assert_eq!(data.action_data.len(), 3);
	assert_eq!(data.active_data[0], Some(json!({"user": "jo"})));
	assert_eq!(data.active_data[1], None);
	assert_eq!(data.active_data[2], Some(json!(["p1", "p2"])));
	assert_eq!(data.outermost_error_boundary_index, None);
	assert!(!data.has_error());
}

// Test: redirect short-circuit (P6) - a depth-1 redirect must prevent deeper
// loader invocation and must not produce a partial payload.
#[tokio::test]
async fn test_redirect_prevents_deeper_loaders() {
	let calls = Arc::new(AtomicUsize::new(0));
	let registry = RouteRegistry::build(vec![
		RouteInput::new("/", "m/root").with_loader(),
		RouteInput::new("/private", "m/private").with_loader(),
		RouteInput::new("/private/settings", "m/settings").with_loader(),
	])
	.unwrap();
	let chain = registry.build_chain("/private/settings");

	let loader = StaticModuleLoader::new()
		.register("m/root", Arc::new(StubModule::with_loader(DataLoader(json!(1)))))
		.register("m/private", Arc::new(StubModule::with_loader(RedirectLoader("/login"))))
		.register(
			"m/settings",
			Arc::new(StubModule::with_loader(CountingLoader {
				calls: Arc::clone(&calls),
			})),
		);

	let resolver = PathDataResolver::new(Arc::new(loader));
	let outcome = resolver
		.resolve(&chain, &RequestContext::get("/private/settings"))
		.await
		.unwrap();

	match outcome {
		ResolveOutcome::Redirect(redirect) => {
			assert_eq!(redirect.location, "/login");
			assert_eq!(redirect.status, 302);
		}
		ResolveOutcome::Data(_) => panic!("expected redirect"),
	}
	assert_eq!(calls.load(Ordering::SeqCst), 0);
}

// Test: Scenario C - depth-2 loader throws, only depth-0 declares a boundary.
#[tokio::test]
async fn test_failure_attributed_to_nearest_ancestor_boundary() {
	let (chain, _) = chain_of_three(true);
	let loader = StaticModuleLoader::new()
		.register("m/root", Arc::new(StubModule::with_loader(DataLoader(json!(1)))))
		.register("m/dash", Arc::new(StubModule::default()))
		.register(
			"m/projects",
			Arc::new(StubModule::with_loader(FailingLoader("db unreachable"))),
		);

	let resolver = PathDataResolver::new(Arc::new(loader));
	let resolved = expect_data(
		resolver
			.resolve(&chain, &RequestContext::get("/dash/projects"))
			.await
			.unwrap(),
	);

	let data = &resolved.data;
	assert_eq!(data.outermost_error_boundary_index, Some(0));
	assert_eq!(data.error_to_render.as_deref(), Some("db unreachable"));
	// Depths beyond the boundary keep no data.
	assert_eq!(data.active_data[1], None);
	assert_eq!(data.active_data[2], None);
	// Arrays still span the full chain (P3).
	assert_eq!(data.active_data.len(), 3);
}

// Test: a boundary-less chain fails the whole response.
#[tokio::test]
async fn test_unhandled_failure_without_boundary() {
	let (chain, _) = chain_of_three(false);
	let loader = StaticModuleLoader::new()
		.register("m/root", Arc::new(StubModule::with_loader(DataLoader(json!(1)))))
		.register("m/dash", Arc::new(StubModule::default()))
		.register(
			"m/projects",
			Arc::new(StubModule::with_loader(FailingLoader("boom"))),
		);

	let resolver = PathDataResolver::new(Arc::new(loader));
	let error = resolver
		.resolve(&chain, &RequestContext::get("/dash/projects"))
		.await
		.unwrap_err();

	assert!(matches!(
		error,
		ResolveError::Unhandled { depth: 2, ref message } if message == "boom"
	));
}

// Test: mutations run only the leaf action; loaders still run afterwards.
#[tokio::test]
async fn test_mutation_runs_leaf_action_only() {
	let (chain, _) = chain_of_three(false);
	let loader = StaticModuleLoader::new()
		.register("m/root", Arc::new(StubModule::with_loader(DataLoader(json!(1)))))
		.register("m/dash", Arc::new(StubModule::default()))
		.register(
			"m/projects",
			Arc::new(
				StubModule::with_loader(DataLoader(json!(["p1"])))
					.with_action(DataAction(json!({"created": "p2"}))),
			),
		);

	let resolver = PathDataResolver::new(Arc::new(loader));
	let request = RequestContext::mutation("/dash/projects", Some(json!({"name": "p2"})));
	let resolved = expect_data(resolver.resolve(&chain, &request).await.unwrap());

	let data = &resolved.data;
	assert_eq!(data.action_data[2], Some(json!({"created": "p2"})));
	assert_eq!(data.action_data[0], None);
	assert_eq!(data.action_data[1], None);
	// Loaders ran after the action.
	assert_eq!(data.active_data[2], Some(json!(["p1"])));
}

// Test: an action redirect stops everything, loaders included.
#[tokio::test]
async fn test_action_redirect_short_circuits() {
	let calls = Arc::new(AtomicUsize::new(0));
	let (chain, _) = chain_of_three(false);
	let loader = StaticModuleLoader::new()
		.register(
			"m/root",
			Arc::new(StubModule::with_loader(CountingLoader {
				calls: Arc::clone(&calls),
			})),
		)
		.register("m/dash", Arc::new(StubModule::default()))
		.register(
			"m/projects",
			Arc::new(StubModule::default().with_action(RedirectAction("/dash/projects/p2"))),
		);

	let resolver = PathDataResolver::new(Arc::new(loader));
	let request = RequestContext::mutation("/dash/projects", None);
	let outcome = resolver.resolve(&chain, &request).await.unwrap();

	assert!(matches!(outcome, ResolveOutcome::Redirect(_)));
	assert_eq!(calls.load(Ordering::SeqCst), 0);
}

// Test: mutations against actionless leaves are rejected.
#[tokio::test]
async fn test_mutation_without_action_is_rejected() {
	let (chain, _) = chain_of_three(false);
	let loader = StaticModuleLoader::new()
		.register("m/root", Arc::new(StubModule::default()))
		.register("m/dash", Arc::new(StubModule::default()))
		.register("m/projects", Arc::new(StubModule::default()));

	let resolver = PathDataResolver::new(Arc::new(loader));
	let request = RequestContext::mutation("/dash/projects", None);
	let error = resolver.resolve(&chain, &request).await.unwrap_err();

	assert!(matches!(error, ResolveError::NoAction(path) if path == "m/projects"));
}

// Test: revalidation re-runs loaders and leaves action data untouched.
#[tokio::test]
async fn test_revalidation_leaves_action_data_empty() {
	let (chain, _) = chain_of_three(false);
	let loader = StaticModuleLoader::new()
		.register("m/root", Arc::new(StubModule::with_loader(DataLoader(json!(2)))))
		.register("m/dash", Arc::new(StubModule::default()))
		.register(
			"m/projects",
			Arc::new(
				StubModule::with_loader(DataLoader(json!(["p1", "p2"])))
					.with_action(DataAction(json!("never"))),
			),
		);

	let resolver = PathDataResolver::new(Arc::new(loader));
	let request = RequestContext::revalidation("/dash/projects");
	let resolved = expect_data(resolver.resolve(&chain, &request).await.unwrap());

	assert_eq!(resolved.data.active_data[2], Some(json!(["p1", "p2"])));
	assert!(resolved.data.action_data.iter().all(|entry| entry.is_none()));
}

// Test: resolving an empty chain is a caller bug, not a 404.
#[tokio::test]
async fn test_empty_chain_is_an_error() {
	let registry = RouteRegistry::build(vec![RouteInput::new("/", "m/root")]).unwrap();
	let chain = registry.build_chain("/missing");
	assert!(chain.is_empty());

	let resolver = PathDataResolver::new(Arc::new(StaticModuleLoader::new()));
	let error = resolver
		.resolve(&chain, &RequestContext::get("/missing"))
		.await
		.unwrap_err();
	assert!(matches!(error, ResolveError::EmptyChain));
}

// Test: loader args carry merged params and splat segments.
#[tokio::test]
async fn test_loader_args_carry_params() {
	struct EchoParams;

	#[async_trait]
	impl Loader for EchoParams {
		async fn run(&self, args: LoaderArgs<'_>) -> Result<LoaderOutcome, LoaderError> {
			Ok(LoaderOutcome::Data(json!({
				"id": args.params.get("id"),
				"splat": args.splat_segments,
			})))
		}
	}

	let registry = RouteRegistry::build(vec![
		RouteInput::new("/users/:id/files/*", "m/files").with_loader(),
	])
	.unwrap();
	let chain = registry.build_chain("/users/7/files/a/b");

	let loader = StaticModuleLoader::new()
		.register("m/files", Arc::new(StubModule::with_loader(EchoParams)));
	let resolver = PathDataResolver::new(Arc::new(loader));
	let resolved = expect_data(
		resolver
			.resolve(&chain, &RequestContext::get("/users/7/files/a/b"))
			.await
			.unwrap(),
	);

	assert_eq!(
		resolved.data.active_data[0],
		Some(json!({"id": "7", "splat": ["a", "b"]}))
	);
	assert_eq!(resolved.data.params.get("id"), Some(&"7".to_string()));
	assert_eq!(resolved.data.splat_segments, ["a", "b"]);
}
