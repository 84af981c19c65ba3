//! Locus analysis built on the fitting and statistics layers.
//!
//! - `pipeline`: per-label statistics and the end-to-end locus analysis
//! - `principal`: principal colors (P1/P2) from a linear locus fit
//! - `bounds`: where the fit crosses the bounding lines, and whether those
//!   lines are locally perpendicular to it
//! - `density`: highest-density point of a 2-D cloud (Gaussian KDE)

pub mod bounds;
pub mod density;
pub mod pipeline;
pub mod principal;

pub use bounds::*;
pub use density::*;
pub use pipeline::*;
pub use principal::*;
