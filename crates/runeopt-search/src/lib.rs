//! Runeopt Search - parallel branch-and-bound loadout search
//!
//! This crate searches the space of legal loadouts for the highest total
//! score as computed by `runeopt-core`.
//!
//! ## Architecture
//!
//! ```text
//! start_search ──► prepare (filter, validate, score, check sizes)
//!      │
//!      └── Coordinator (own thread)
//!           │  phase 1: top-N pools      phase 2: ±K expanded pools
//!           │
//!           └── Worker[] ── Searcher (branch-and-bound over a weapon range)
//!                 │
//!                 └── progress / complete messages ──► SearchHandle
//! ```
//!
//! ## Key Components
//!
//! - [`start_search`]: validates input and returns a [`SearchHandle`]
//! - [`SearchOptions`]: role/class overrides, grade filter, worker count, pool sizes
//! - [`Searcher`]: the per-worker branch-and-bound
//! - [`SearchSpace`]: read-only pools shared by the workers of a phase
//!
//! ## Example
//!
//! ```no_run
//! use runeopt_core::{CharacterContext, Role};
//! use runeopt_search::{start_search, SearchOptions};
//!
//! # let runes: Vec<std::sync::Arc<runeopt_core::Rune>> = Vec::new();
//! let ctx = CharacterContext::new("rogue", Role::Dealer);
//! let mut handle = start_search(&runes, &ctx, SearchOptions::default()).unwrap();
//! handle.on_progress(|p| println!("{:.0}%", p.fraction() * 100.0));
//! if let Some(result) = handle.wait() {
//!     println!("best score {:.2}", result.best_score);
//! }
//! ```

mod bnb;
pub mod candidates;
mod config;
mod coordinator;
mod error;
mod handle;
pub mod partition;
mod result;
mod space;
mod spawn;
mod worker;

pub use bnb::{Searcher, WorkerProgress, WorkerState};
pub use candidates::{expand, prepare, reduce, RankedPools};
pub use config::{max_workers, SearchOptions, WORKER_CAP};
pub use error::{Error, Result};
pub use handle::{search, start_search, start_search_with_model, SearchHandle};
pub use result::{SearchEvent, SearchProgress, SearchResult};
pub use space::{binomial, SearchSpace, SlotIndices};
pub use worker::{WorkerId, WorkerMessage, WorkerTask};
