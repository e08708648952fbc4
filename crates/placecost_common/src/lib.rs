//! Shared foundational types used across the placecost workspace.
//!
//! Currently this is the internal-error result type shared by the engine,
//! configuration, and CLI crates.

#![warn(missing_docs)]

pub mod result;

pub use result::{InternalError, PlaceResult};
