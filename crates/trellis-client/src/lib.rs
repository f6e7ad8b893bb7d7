//! Client-side navigation runtime.
//!
//! The browser is injected, never assumed: [`PayloadFetcher`] and
//! [`BrowserAdapter`] stand in for `fetch` and the DOM, which keeps the whole
//! engine runnable under ordinary async tests. State lives in a single
//! [`RouteStateContainer`] mutated only through batched commits.

pub mod diff;
pub mod engine;
pub mod env;
pub mod scroll;
pub mod state;

pub use diff::changed_indices;
pub use engine::{NavigationEngine, NavigationError, NavigationOutcome, NavigationType};
pub use env::{BrowserAdapter, FetchError, FetchedPayload, PayloadFetcher};
pub use scroll::{ScrollPositionStore, SCROLL_CAPACITY};
pub use state::{ClientRouteState, NavigationStatus, RouteStateContainer};
