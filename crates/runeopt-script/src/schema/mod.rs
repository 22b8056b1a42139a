//! Schema definitions for RON input files

pub mod pool;
pub mod profile;
pub mod weights;
