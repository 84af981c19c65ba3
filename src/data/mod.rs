//! Per-object input data.
//!
//! - `catalog`: named-column access to per-object arrays
//! - `transform`: linear band combinations ("colors") and their presets
//! - `labeller`: star/galaxy classes per object
//! - `sample`: seeded synthetic stellar loci for tests and demos

pub mod catalog;
pub mod labeller;
pub mod sample;
pub mod transform;

pub use catalog::*;
pub use labeller::*;
pub use sample::*;
pub use transform::*;
