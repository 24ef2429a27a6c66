//! Isotropic microfacet BRDFs with a height-correlated Smith shadowing term.

mod beckmann;
mod trowbridge_reitz;

pub use beckmann::*;
pub use trowbridge_reitz::*;

use crate::BrdfEval;
use base::math::{sqr, Vec3};
use std::f32::consts::PI;

/// Distribution-specific pieces of a microfacet BRDF.
pub trait MicrofacetDistribution {
    /// Evaluates the normal distribution function for a microfacet normal
    /// given the squared length of its slope, $\tan^2\theta_m$.
    ///
    /// # Arguments
    ///
    /// * `slope2` - The squared length of the slope of the microfacet normal.
    /// * `cos_theta_m` - The cosine of the polar angle of the microfacet normal.
    /// * `alpha` - The roughness.
    fn ndf(slope2: f32, cos_theta_m: f32, alpha: f32) -> f32;

    /// Evaluates the Smith auxiliary function Λ.
    ///
    /// # Arguments
    ///
    /// * `a` - $1 / (\alpha \tan\theta)$, always positive.
    fn lambda(a: f32) -> f32;

    /// Maps a uniform variate to the length of the slope of a sampled
    /// microfacet normal.
    fn slope_radius(alpha: f32, u: f32) -> f32;
}

/// Smith Λ for a direction with the given cosine of the polar angle.
fn smith_lambda<D: MicrofacetDistribution>(cos_theta: f32, alpha: f32) -> f32 {
    if cos_theta >= 1.0 {
        return 0.0;
    }
    let tan_theta = (1.0 - sqr(cos_theta)).max(0.0).sqrt() / cos_theta;
    D::lambda(1.0 / (alpha * tan_theta))
}

/// Samples the microfacet normal distribution and reflects the view
/// direction about the sampled normal.
pub(crate) fn sample<D: MicrofacetDistribution>(view: &Vec3, alpha: f32, u1: f32, u2: f32) -> Vec3 {
    let phi = 2.0 * PI * u1;
    let r = D::slope_radius(alpha, u2);
    let (sin_phi, cos_phi) = phi.sin_cos();
    let m = Vec3::new(r * cos_phi, r * sin_phi, 1.0).normalize();
    2.0 * m.dot(*view) * m - *view
}

/// Evaluates the cosine-weighted microfacet BRDF and the density of
/// [`sample`].
pub(crate) fn eval<D: MicrofacetDistribution>(view: &Vec3, light: &Vec3, alpha: f32) -> BrdfEval {
    if view.z <= 0.0 {
        return BrdfEval::ZERO;
    }

    let h = match (*view + *light).try_normalize() {
        Some(h) if h.z != 0.0 => h,
        _ => return BrdfEval::ZERO,
    };

    // Masking-shadowing
    let g2 = if light.z <= 0.0 {
        0.0
    } else {
        let lambda_v = smith_lambda::<D>(view.z, alpha);
        let lambda_l = smith_lambda::<D>(light.z, alpha);
        1.0 / (1.0 + lambda_v + lambda_l)
    };

    let slope2 = sqr(h.x / h.z) + sqr(h.y / h.z);
    let d = D::ndf(slope2, h.z, alpha);

    BrdfEval {
        value: d * g2 / 4.0 / view.z,
        pdf: (d * h.z / 4.0 / view.dot(h)).abs(),
    }
}
