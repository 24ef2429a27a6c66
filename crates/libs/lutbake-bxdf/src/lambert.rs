use crate::{Brdf, BrdfEval, BrdfKind};
use base::math::{cos_weighted_hemisphere, Vec3};
use std::f32::consts::FRAC_1_PI;

/// Ideal diffuse reflector with unit albedo.
///
/// The roughness is ignored. Its cosine-weighted value equals its sampling
/// density, which makes it the reference for energy estimators.
#[derive(Debug, Copy, Clone, Default)]
pub struct LambertianBrdf;

impl Brdf for LambertianBrdf {
    fn kind(&self) -> BrdfKind { BrdfKind::Lambert }

    fn sample(&self, _view: &Vec3, _alpha: f32, u1: f32, u2: f32) -> Vec3 {
        cos_weighted_hemisphere(u1, u2)
    }

    fn eval(&self, view: &Vec3, light: &Vec3, _alpha: f32) -> BrdfEval {
        if view.z <= 0.0 {
            return BrdfEval::ZERO;
        }
        let p = light.z.max(0.0) * FRAC_1_PI;
        BrdfEval::new(p, p)
    }
}
