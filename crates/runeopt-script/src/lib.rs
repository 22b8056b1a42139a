//! Runeopt Script - RON loader for optimizer inputs
//!
//! Loads search inputs from RON files:
//! - Rune pools `(runes: [...])`
//! - Character profiles `(context: (...), options: (...))`
//! - Weight overrides `(effects: {...}, demerits: {...}, triggers: {...})`,
//!   optionally with extra class profiles and score knobs

mod error;
mod loader;
mod schema;

pub use error::{Error, Result};
pub use loader::{Inputs, Loader};
pub use schema::pool::RunePool;
pub use schema::profile::Profile;
pub use schema::weights::WeightOverrides;
