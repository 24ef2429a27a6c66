//! # lutbake-bxdf
//! BRDF models consumed by the look-up table fitters.
//!
//! Every model works in the local shading frame (Z-up, right-handed) and is
//! stateless: the roughness is handed over on each call so that a single
//! instance can be shared by all cells of a table.
#![warn(missing_docs)]

mod disney;
mod lambert;
pub mod microfacet;

use base::math::Vec3;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};

pub use disney::*;
pub use lambert::*;
pub use microfacet::{BeckmannBrdf, TrowbridgeReitzBrdf};

/// Result of a BRDF evaluation.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct BrdfEval {
    /// Cosine-weighted reflectance $f_r \cdot \cos\theta_l$.
    pub value: f32,
    /// Density of [`Brdf::sample`] for the evaluated light direction.
    pub pdf: f32,
}

impl BrdfEval {
    /// Evaluation of a direction the BRDF never scatters to.
    pub const ZERO: Self = Self {
        value: 0.0,
        pdf: 0.0,
    };

    /// Creates a new evaluation result.
    pub const fn new(value: f32, pdf: f32) -> Self { Self { value, pdf } }

    /// Importance sampling weight `value / pdf`, or `None` if the direction
    /// could not have been sampled.
    pub fn weight(&self) -> Option<f32> {
        if self.pdf > 0.0 {
            Some(self.value / self.pdf)
        } else {
            None
        }
    }
}

/// Common interface for the BRDF models.
pub trait Brdf: Debug + Send + Sync {
    /// Returns the kind of the model.
    fn kind(&self) -> BrdfKind;

    /// Importance samples the cosine-weighted BRDF using two uniform variates.
    ///
    /// # Arguments
    ///
    /// * `view` - The view direction (normalised).
    /// * `alpha` - The roughness of the surface.
    /// * `u1` - The first uniform variate in `[0, 1)`.
    /// * `u2` - The second uniform variate in `[0, 1)`.
    ///
    /// # Returns
    ///
    /// The sampled light direction. It may point below the horizon.
    fn sample(&self, view: &Vec3, alpha: f32, u1: f32, u2: f32) -> Vec3;

    /// Evaluates the cosine-weighted BRDF together with the density of
    /// [`Brdf::sample`] for the given pair of directions.
    ///
    /// Both terms are zero when the view direction lies on or below the
    /// horizon.
    ///
    /// # Arguments
    ///
    /// * `view` - The view direction (normalised).
    /// * `light` - The light direction (normalised).
    /// * `alpha` - The roughness of the surface.
    fn eval(&self, view: &Vec3, light: &Vec3, alpha: f32) -> BrdfEval;
}

/// Different kinds of BRDF models.
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BrdfKind {
    /// Trowbridge-Reitz (GGX) microfacet BRDF.
    #[default]
    #[cfg_attr(feature = "cli", clap(alias = "tr", alias = "trowbridge-reitz"))]
    #[serde(alias = "trowbridge-reitz")]
    Ggx,
    /// Beckmann microfacet BRDF.
    #[cfg_attr(feature = "cli", clap(alias = "bk"))]
    Beckmann,
    /// Ideal diffuse reflector.
    #[cfg_attr(feature = "cli", clap(alias = "lambertian"))]
    Lambert,
    /// Burley's diffuse term of the Disney principled BRDF.
    #[cfg_attr(feature = "cli", clap(alias = "disney"))]
    #[serde(alias = "disney")]
    DisneyDiffuse,
}

impl BrdfKind {
    /// Returns the name of the model.
    pub const fn to_str(&self) -> &'static str {
        match self {
            BrdfKind::Ggx => "GGX",
            BrdfKind::Beckmann => "Beckmann",
            BrdfKind::Lambert => "Lambert",
            BrdfKind::DisneyDiffuse => "Disney diffuse",
        }
    }

    /// Creates the model as a trait object.
    pub fn new_boxed(&self) -> Box<dyn Brdf> {
        match self {
            BrdfKind::Ggx => Box::new(TrowbridgeReitzBrdf),
            BrdfKind::Beckmann => Box::new(BeckmannBrdf),
            BrdfKind::Lambert => Box::new(LambertianBrdf),
            BrdfKind::DisneyDiffuse => Box::new(DisneyDiffuseBrdf),
        }
    }
}

impl Display for BrdfKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result { f.write_str(self.to_str()) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base::math::stratified_samples;

    pub(crate) fn view_at(theta: f32) -> Vec3 { Vec3::new(theta.sin(), 0.0, theta.cos()) }

    #[test]
    fn kind_round_trip_through_boxed_model() {
        for kind in [
            BrdfKind::Ggx,
            BrdfKind::Beckmann,
            BrdfKind::Lambert,
            BrdfKind::DisneyDiffuse,
        ] {
            assert_eq!(kind.new_boxed().kind(), kind);
        }
        assert_eq!(BrdfKind::default(), BrdfKind::Ggx);
        assert_eq!(BrdfKind::DisneyDiffuse.to_string(), "Disney diffuse");
    }

    #[test]
    fn weight_requires_positive_pdf() {
        assert_eq!(BrdfEval::ZERO.weight(), None);
        assert_eq!(BrdfEval::new(0.5, 0.25).weight(), Some(2.0));
        assert_eq!(BrdfEval::new(0.5, -1.0).weight(), None);
    }

    #[test]
    fn view_below_horizon_evaluates_to_zero() {
        let view = Vec3::new(0.6, 0.0, -0.8);
        let light = Vec3::Z;
        for kind in [
            BrdfKind::Ggx,
            BrdfKind::Beckmann,
            BrdfKind::Lambert,
            BrdfKind::DisneyDiffuse,
        ] {
            assert_eq!(kind.new_boxed().eval(&view, &light, 0.5), BrdfEval::ZERO);
        }
    }

    /// The albedo estimated through importance sampling never exceeds one.
    #[test]
    fn microfacet_models_conserve_energy() {
        for kind in [BrdfKind::Ggx, BrdfKind::Beckmann] {
            let brdf = kind.new_boxed();
            for theta in [0.0f32, 0.5, 1.0, 1.5] {
                for alpha in [0.05f32, 0.3, 1.0] {
                    let view = view_at(theta);
                    let mut albedo = 0.0f64;
                    for (u1, u2) in stratified_samples(32) {
                        let light = brdf.sample(&view, alpha, u1, u2);
                        if let Some(w) = brdf.eval(&view, &light, alpha).weight() {
                            albedo += w as f64;
                        }
                    }
                    albedo /= 1024.0;
                    assert!(
                        albedo > 0.0 && albedo < 1.01,
                        "{} albedo {} at theta {} alpha {}",
                        kind,
                        albedo,
                        theta,
                        alpha
                    );
                }
            }
        }
    }
}
