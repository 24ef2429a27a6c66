use crate::{
    microfacet::{self, MicrofacetDistribution},
    Brdf, BrdfEval, BrdfKind,
};
use base::math::{sqr, Vec3};
use std::f32::consts::PI;

/// Trowbridge-Reitz (GGX) microfacet BRDF.
///
/// The distribution of microfacet normals has ellipsoidal level sets; with
/// $\alpha$ the roughness:
///
/// $$
/// D(\mathbf{m}) = \frac{1}{\pi \alpha^2 \cos^4\theta_m (1 + \tan^2\theta_m / \alpha^2)^2}
/// $$
#[derive(Debug, Copy, Clone, Default)]
pub struct TrowbridgeReitzBrdf;

impl MicrofacetDistribution for TrowbridgeReitzBrdf {
    fn ndf(slope2: f32, cos_theta_m: f32, alpha: f32) -> f32 {
        let alpha2 = sqr(alpha);
        let d = sqr(1.0 / (1.0 + slope2 / alpha2));
        d / (PI * alpha2 * sqr(sqr(cos_theta_m)))
    }

    fn lambda(a: f32) -> f32 { 0.5 * (-1.0 + (1.0 + 1.0 / sqr(a)).sqrt()) }

    fn slope_radius(alpha: f32, u: f32) -> f32 { alpha * (u / (1.0 - u)).sqrt() }
}

impl Brdf for TrowbridgeReitzBrdf {
    fn kind(&self) -> BrdfKind { BrdfKind::Ggx }

    fn sample(&self, view: &Vec3, alpha: f32, u1: f32, u2: f32) -> Vec3 {
        microfacet::sample::<Self>(view, alpha, u1, u2)
    }

    fn eval(&self, view: &Vec3, light: &Vec3, alpha: f32) -> BrdfEval {
        microfacet::eval::<Self>(view, light, alpha)
    }
}
