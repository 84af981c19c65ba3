//! Numerical building blocks: polynomial arithmetic, root finding,
//! percentiles and least squares.

pub mod ols;
pub mod poly;
pub mod quantile;
pub mod roots;

pub use ols::*;
pub use poly::*;
pub use quantile::*;
pub use roots::*;
