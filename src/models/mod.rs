//! Fitted curve models and the geometry built on them.
//!
//! Models are plain coefficient vectors so that fitting code can stay generic;
//! evaluation and point-to-curve distances live here.

pub mod distance;
pub mod polynomial;

pub use distance::*;
pub use polynomial::*;
