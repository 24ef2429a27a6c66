//! # lutbake-base
//! Base library for lutbake.
//! Contains the math helpers and the small shared types used by the BRDF
//! models and the look-up table fitting.
#![warn(missing_docs)]

use std::fmt::{Display, Formatter};

pub mod math;

#[cfg(feature = "cli")]
pub mod cli;

/// Indicates whether something is uniform in all directions or not.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Symmetry {
    /// Uniformity in all directions.
    Isotropic,
    /// Non-uniformity in some directions.
    Anisotropic,
}

impl Symmetry {
    /// Returns whether it's isotropic.
    pub const fn is_isotropic(&self) -> bool { matches!(self, Self::Isotropic) }
}

impl Display for Symmetry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Symmetry::Isotropic => "Isotropic",
                Symmetry::Anisotropic => "Anisotropic",
            }
        )
    }
}
