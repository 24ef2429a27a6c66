//! # lutbake-ltc
//! Fitting of Linearly Transformed Cosines (LTC) to BRDF lobes.
//!
//! Eric Heitz, Jonathan Dupuy, Stephen Hill and David Neubelt. Real-Time
//! Polygonal-Light Shading with Linearly Transformed Cosines. ACM
//! Transactions on Graphics (SIGGRAPH 2016), 35(4), 2016.
//!
//! For every (roughness, view angle) cell of a square grid, a 3x3 transform
//! of the clamped cosine distribution is searched that best matches the
//! cosine-weighted BRDF. The fitted table, together with the horizon clipping
//! table of spherical caps, is packed into two RGBA textures consumed by
//! area light shaders.
#![warn(missing_docs)]

mod error;
mod fit;
mod lobe;
mod metric;
mod pack;
mod simplex;
mod sphere;
mod terms;

pub use error::*;
pub use fit::*;
pub use lobe::*;
pub use metric::*;
pub use pack::*;
pub use simplex::*;
pub use sphere::*;
pub use terms::*;
