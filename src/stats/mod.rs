//! Summary statistics of per-object quantities.
//!
//! - `robust`: clipped location/scale statistics (IQR-based clip about the median)
//! - `syserr`: additive systematic-error term that makes the scatter unit-normal
//! - `enforcer`: checks statistics against configured limits

pub mod enforcer;
pub mod robust;
pub mod syserr;

pub use enforcer::*;
pub use robust::*;
pub use syserr::*;
