//! wordvec end-to-end test support
//!
//! - `harness`: isolated cache directories wired to a loader
//! - `mocks`: an in-memory fetcher and fixture archives

pub mod mocks;

pub use harness::TestCache;
pub use mocks::{FixtureBuilder, MockFetcher};
