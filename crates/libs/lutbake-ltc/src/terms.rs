use base::math::{stratified_samples, DVec3, Vec3};
use bxdf::Brdf;

/// Integrals of a BRDF lobe for one view direction and roughness.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AverageTerms {
    /// Directional albedo of the BRDF.
    pub norm: f32,
    /// Albedo weighted by the Schlick factor $(1 - \omega_v \cdot \omega_h)^5$.
    pub fresnel: f32,
    /// Unit average direction of the scattered light, confined to the XZ
    /// plane. Falls back to +Z when the lobe has no net direction.
    pub direction: Vec3,
}

impl AverageTerms {
    /// Estimates the average terms with `sample_count x sample_count`
    /// stratified samples importance sampled from the BRDF.
    ///
    /// # Arguments
    ///
    /// * `brdf` - The BRDF to integrate.
    /// * `view` - The view direction (normalised, in the XZ plane).
    /// * `alpha` - The roughness of the BRDF.
    /// * `sample_count` - The number of strata per dimension.
    pub fn compute<B: Brdf + ?Sized>(
        brdf: &B,
        view: &Vec3,
        alpha: f32,
        sample_count: u32,
    ) -> Self {
        let mut norm = 0.0f64;
        let mut fresnel = 0.0f64;
        let mut direction = DVec3::ZERO;

        for (u1, u2) in stratified_samples(sample_count as usize) {
            let light = brdf.sample(view, alpha, u1, u2);
            let weight = match brdf.eval(view, &light, alpha).weight() {
                Some(w) => w as f64,
                None => continue,
            };
            let cos_vh = (*view + light)
                .try_normalize()
                .map_or(0.0, |h| view.dot(h).max(0.0));
            norm += weight;
            fresnel += weight * (1.0 - cos_vh as f64).powi(5);
            direction += weight * light.as_dvec3();
        }

        let n = (sample_count as f64) * (sample_count as f64);
        direction.y = 0.0;
        let direction = direction
            .try_normalize()
            .map_or(Vec3::Z, |d| d.as_vec3().normalize());

        Self {
            norm: (norm / n) as f32,
            fresnel: (fresnel / n) as f32,
            direction,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use bxdf::{BrdfEval, BrdfKind, LambertianBrdf, TrowbridgeReitzBrdf};

    fn view_at(theta: f32) -> Vec3 { Vec3::new(theta.sin(), 0.0, theta.cos()) }

    #[test]
    fn lambertian_energy_is_one() {
        for theta in [0.0f32, 0.4, 1.0, 1.57] {
            let terms = AverageTerms::compute(&LambertianBrdf, &view_at(theta), 0.5, 32);
            assert_abs_diff_eq!(terms.norm, 1.0, epsilon = 1e-4);
            assert!(terms.fresnel > 0.0 && terms.fresnel < terms.norm);
            assert_abs_diff_eq!(terms.direction.y, 0.0);
            assert_abs_diff_eq!(terms.direction.length(), 1.0, epsilon = 1e-5);
        }
        // Cosine lobe points straight up.
        let terms = AverageTerms::compute(&LambertianBrdf, &Vec3::Z, 0.5, 32);
        assert_abs_diff_eq!(terms.direction.z, 1.0, epsilon = 1e-4);
    }

    #[test]
    fn specular_lobe_follows_the_mirror_direction() {
        let view = view_at(0.8);
        let terms = AverageTerms::compute(&TrowbridgeReitzBrdf, &view, 0.01, 32);
        assert!(terms.norm > 0.9 && terms.norm < 1.001);
        assert_abs_diff_eq!(terms.direction.x, -view.x, epsilon = 1e-2);
        assert_abs_diff_eq!(terms.direction.z, view.z, epsilon = 1e-2);
        // Fresnel weight of a mirror is (1 - cos θv)^5.
        assert_abs_diff_eq!(
            terms.fresnel,
            terms.norm * (1.0 - view.z).powi(5),
            epsilon = 1e-3
        );
    }

    /// A BRDF that never scatters light.
    #[derive(Debug)]
    struct Black;

    impl Brdf for Black {
        fn kind(&self) -> BrdfKind { BrdfKind::Lambert }

        fn sample(&self, _view: &Vec3, _alpha: f32, _u1: f32, _u2: f32) -> Vec3 { Vec3::Z }

        fn eval(&self, _view: &Vec3, _light: &Vec3, _alpha: f32) -> BrdfEval { BrdfEval::ZERO }
    }

    #[test]
    fn empty_lobe_falls_back_to_the_normal() {
        let terms = AverageTerms::compute(&Black, &Vec3::Z, 0.5, 8);
        assert_eq!(terms.norm, 0.0);
        assert_eq!(terms.fresnel, 0.0);
        assert_eq!(terms.direction, Vec3::Z);
    }

    #[test]
    fn boxed_models_are_accepted() {
        let brdf = BrdfKind::Beckmann.new_boxed();
        let terms = AverageTerms::compute(brdf.as_ref(), &view_at(0.5), 0.3, 16);
        assert!(terms.norm > 0.0 && terms.norm <= 1.0);
    }
}
