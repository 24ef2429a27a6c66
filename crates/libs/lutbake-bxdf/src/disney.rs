use crate::{Brdf, BrdfEval, BrdfKind};
use base::math::{cos_weighted_hemisphere, Vec3};
use std::f32::consts::FRAC_1_PI;

/// Diffuse lobe of the Disney principled BRDF.
///
/// Brent Burley. Physically-based shading at Disney. SIGGRAPH 2012 course.
///
/// The Lambertian response is modulated by a retro-reflection factor that
/// grows with the roughness at grazing angles. The perceptual roughness is
/// $\sqrt{\alpha}$. Directions are drawn from the cosine distribution.
#[derive(Debug, Copy, Clone, Default)]
pub struct DisneyDiffuseBrdf;

/// Schlick-like weight $(1 - c)^5$.
fn schlick_weight(cos_theta: f32) -> f32 { (1.0 - cos_theta).clamp(0.0, 1.0).powi(5) }

impl Brdf for DisneyDiffuseBrdf {
    fn kind(&self) -> BrdfKind { BrdfKind::DisneyDiffuse }

    fn sample(&self, _view: &Vec3, _alpha: f32, u1: f32, u2: f32) -> Vec3 {
        cos_weighted_hemisphere(u1, u2)
    }

    fn eval(&self, view: &Vec3, light: &Vec3, alpha: f32) -> BrdfEval {
        if view.z <= 0.0 || light.z <= 0.0 {
            return BrdfEval::ZERO;
        }
        let h = match (*view + *light).try_normalize() {
            Some(h) => h,
            None => return BrdfEval::ZERO,
        };
        let cos_theta_d = light.dot(h);
        let fd90 = 0.5 + 2.0 * cos_theta_d * cos_theta_d * alpha.sqrt();
        let light_scatter = 1.0 + (fd90 - 1.0) * schlick_weight(light.z);
        let view_scatter = 1.0 + (fd90 - 1.0) * schlick_weight(view.z);
        let pdf = light.z * FRAC_1_PI;
        BrdfEval::new(light_scatter * view_scatter * pdf, pdf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn normal_incidence_matches_lambert() {
        // fd90 only matters away from the normal.
        for alpha in [0.0f32, 0.25, 1.0] {
            let eval = DisneyDiffuseBrdf.eval(&Vec3::Z, &Vec3::Z, alpha);
            assert_abs_diff_eq!(eval.value, FRAC_1_PI, epsilon = 1e-6);
            assert_abs_diff_eq!(eval.pdf, FRAC_1_PI, epsilon = 1e-6);
        }
    }

    #[test]
    fn rough_surfaces_retro_reflect_at_grazing_angles() {
        let view = Vec3::new(0.99f32.sqrt(), 0.0, 0.1);
        let smooth = DisneyDiffuseBrdf.eval(&view, &view, 0.0);
        let rough = DisneyDiffuseBrdf.eval(&view, &view, 1.0);
        assert!(rough.value > smooth.value);
        assert!(smooth.weight().unwrap() < 1.0);
        assert!(rough.weight().unwrap() > 1.0);
    }
}
