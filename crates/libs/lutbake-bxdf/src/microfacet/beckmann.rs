use crate::{
    microfacet::{self, MicrofacetDistribution},
    Brdf, BrdfEval, BrdfKind,
};
use base::math::{sqr, Vec3};
use std::f32::consts::PI;

/// Beckmann microfacet BRDF.
///
/// The slopes of the microfacets follow a Gaussian distribution; the Smith
/// shadowing term uses the rational approximation of Λ from Walter et al.,
/// "Microfacet Models for Refraction through Rough Surfaces" (2007).
#[derive(Debug, Copy, Clone, Default)]
pub struct BeckmannBrdf;

impl MicrofacetDistribution for BeckmannBrdf {
    fn ndf(slope2: f32, cos_theta_m: f32, alpha: f32) -> f32 {
        let alpha2 = sqr(alpha);
        (-slope2 / alpha2).exp() / (PI * alpha2 * sqr(sqr(cos_theta_m)))
    }

    fn lambda(a: f32) -> f32 {
        // Λ is negligible for a >= 1.6.
        if a < 1.6 {
            (1.0 - 1.259 * a + 0.396 * sqr(a)) / (3.535 * a + 2.181 * sqr(a))
        } else {
            0.0
        }
    }

    fn slope_radius(alpha: f32, u: f32) -> f32 { alpha * (-u.ln()).sqrt() }
}

impl Brdf for BeckmannBrdf {
    fn kind(&self) -> BrdfKind { BrdfKind::Beckmann }

    fn sample(&self, view: &Vec3, alpha: f32, u1: f32, u2: f32) -> Vec3 {
        microfacet::sample::<Self>(view, alpha, u1, u2)
    }

    fn eval(&self, view: &Vec3, light: &Vec3, alpha: f32) -> BrdfEval {
        microfacet::eval::<Self>(view, light, alpha)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn lambda_is_cut_off() {
        assert_eq!(BeckmannBrdf::lambda(1.6), 0.0);
        assert_eq!(BeckmannBrdf::lambda(10.0), 0.0);
        assert!(BeckmannBrdf::lambda(1.0) > 0.0);
        // Rational form near the cut-off is already close to zero.
        assert_abs_diff_eq!(BeckmannBrdf::lambda(1.59), 0.0, epsilon = 1e-3);
    }

    #[test]
    fn mirror_configuration_at_normal_incidence() {
        let alpha = 0.4;
        let eval = BeckmannBrdf.eval(&Vec3::Z, &Vec3::Z, alpha);
        let d = 1.0 / (PI * alpha * alpha);
        assert_abs_diff_eq!(eval.value, d / 4.0, epsilon = 1e-5);
        assert_abs_diff_eq!(eval.pdf, d / 4.0, epsilon = 1e-5);
    }
}
