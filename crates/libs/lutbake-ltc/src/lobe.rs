//! Linearly transformed cosine lobe.
use base::math::{cbr, cos_weighted_hemisphere, Mat3, Vec3};
use std::f32::consts::FRAC_1_PI;

/// A clamped cosine distribution deformed by the linear transform
/// $M = [X\ Y\ Z] \cdot S$, where the columns of $S$ are
/// $(m_{11}, 0, 0)$, $(0, m_{22}, 0)$ and $(m_{13}, 0, 1)$.
///
/// The derived matrices are rebuilt by every mutator so that [`LtcLobe::eval`]
/// and [`LtcLobe::sample`] never observe a stale transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LtcLobe {
    /// Integral of the lobe over the sphere.
    pub magnitude: f32,
    /// Average Schlick-Fresnel weight of the fitted BRDF.
    pub fresnel: f32,
    x: Vec3,
    y: Vec3,
    z: Vec3,
    m11: f32,
    m22: f32,
    m13: f32,
    m: Mat3,
    inv_m: Mat3,
    det_m: f32,
}

impl Default for LtcLobe {
    fn default() -> Self { Self::new() }
}

impl LtcLobe {
    /// Creates an unscaled cosine lobe around +Z.
    pub fn new() -> Self {
        let mut lobe = Self {
            magnitude: 1.0,
            fresnel: 1.0,
            x: Vec3::X,
            y: Vec3::Y,
            z: Vec3::Z,
            m11: 1.0,
            m22: 1.0,
            m13: 0.0,
            m: Mat3::IDENTITY,
            inv_m: Mat3::IDENTITY,
            det_m: 1.0,
        };
        lobe.update();
        lobe
    }

    /// Returns the local frame of the lobe as the columns of a matrix.
    pub fn basis(&self) -> Mat3 { Mat3::from_cols(self.x, self.y, self.z) }

    /// Sets the local frame of the lobe; `z` is the dominant direction.
    pub fn set_basis(&mut self, x: Vec3, y: Vec3, z: Vec3) {
        self.x = x;
        self.y = y;
        self.z = z;
        self.update();
    }

    /// Returns the free parameters `[m11, m22, m13]`.
    pub fn params(&self) -> [f32; 3] { [self.m11, self.m22, self.m13] }

    /// Sets the free parameters of the transform.
    pub fn set_params(&mut self, m11: f32, m22: f32, m13: f32) {
        self.m11 = m11;
        self.m22 = m22;
        self.m13 = m13;
        self.update();
    }

    /// Rebuilds the transform, its inverse and its determinant from the frame
    /// and the free parameters.
    pub fn update(&mut self) {
        let s = Mat3::from_cols(
            Vec3::new(self.m11, 0.0, 0.0),
            Vec3::new(0.0, self.m22, 0.0),
            Vec3::new(self.m13, 0.0, 1.0),
        );
        self.m = self.basis() * s;
        self.inv_m = self.m.inverse();
        self.det_m = self.m.determinant().abs();
    }

    /// Returns the transform $M$.
    pub fn matrix(&self) -> &Mat3 { &self.m }

    /// Returns the inverse transform $M^{-1}$.
    pub fn inv_matrix(&self) -> &Mat3 { &self.inv_m }

    /// Returns $|\det M|$.
    pub fn det(&self) -> f32 { self.det_m }

    /// Returns whether the transform cannot be inverted reliably.
    pub fn is_degenerate(&self) -> bool {
        !(self.det_m > 0.0 && self.det_m.is_finite())
            || !self.m.is_finite()
            || !self.inv_m.is_finite()
    }

    /// Density of the normalised lobe in the direction `l`.
    ///
    /// The direction is mapped back to the cosine distribution by $M^{-1}$
    /// and the clamped cosine is divided by the Jacobian of the transform,
    /// $|\det M| / \|M \omega_o\|^3$.
    pub fn pdf(&self, l: &Vec3) -> f32 {
        let original = (self.inv_m * *l).normalize();
        if !(original.z > 0.0) {
            return 0.0;
        }
        let jacobian = self.det_m / cbr((self.m * original).length());
        original.z * FRAC_1_PI / jacobian
    }

    /// Evaluates the lobe, scaled by its magnitude, in the direction `l`.
    pub fn eval(&self, l: &Vec3) -> f32 { self.magnitude * self.pdf(l) }

    /// Draws a direction from the lobe using two uniform variates.
    ///
    /// Undefined for a degenerate transform, see [`LtcLobe::is_degenerate`].
    pub fn sample(&self, u1: f32, u2: f32) -> Vec3 {
        (self.m * cos_weighted_hemisphere(u1, u2)).normalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use base::math::stratified_samples;
    use proptest::prelude::*;

    fn skewed_lobe() -> LtcLobe {
        let mut lobe = LtcLobe::new();
        let z = Vec3::new(0.3, 0.0, 1.0).normalize();
        lobe.set_basis(Vec3::new(z.z, 0.0, -z.x), Vec3::Y, z);
        lobe.set_params(0.6, 0.9, 0.2);
        lobe.magnitude = 0.75;
        lobe
    }

    #[test]
    fn identity_lobe_is_a_cosine() {
        let lobe = LtcLobe::new();
        assert_eq!(*lobe.matrix(), Mat3::IDENTITY);
        assert_eq!(lobe.det(), 1.0);
        assert_abs_diff_eq!(lobe.eval(&Vec3::Z), FRAC_1_PI, epsilon = 1e-6);
        assert_eq!(lobe.eval(&-Vec3::Z), 0.0);
        assert!(!lobe.is_degenerate());
    }

    #[test]
    fn derived_matrices_follow_mutations() {
        let mut lobe = LtcLobe::new();
        lobe.set_params(2.0, 0.5, 0.25);
        assert_eq!(lobe.params(), [2.0, 0.5, 0.25]);
        assert_abs_diff_eq!(lobe.det(), 1.0, epsilon = 1e-6);
        let m = *lobe.matrix();
        assert_eq!(m.x_axis, Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(m.y_axis, Vec3::new(0.0, 0.5, 0.0));
        assert_eq!(m.z_axis, Vec3::new(0.25, 0.0, 1.0));
        let id = m * *lobe.inv_matrix();
        assert!(id.abs_diff_eq(Mat3::IDENTITY, 1e-6));
    }

    #[test]
    fn singular_transform_is_reported() {
        let mut lobe = LtcLobe::new();
        lobe.set_params(0.0, 1.0, 0.0);
        assert!(lobe.is_degenerate());
        lobe.set_params(1.0, 1.0, f32::NAN);
        assert!(lobe.is_degenerate());
        lobe.set_params(1.0, 1.0, 0.0);
        assert!(!lobe.is_degenerate());
    }

    /// Integrating the lobe over the sphere with uniform stratified samples
    /// recovers its magnitude.
    #[test]
    fn integrates_to_magnitude() {
        let lobe = skewed_lobe();
        let n = 512;
        let mut sum = 0.0f64;
        for (u1, u2) in stratified_samples(n) {
            let z = 1.0 - 2.0 * u1;
            let r = (1.0 - z * z).max(0.0).sqrt();
            let phi = 2.0 * std::f32::consts::PI * u2;
            let l = Vec3::new(r * phi.cos(), r * phi.sin(), z);
            sum += lobe.eval(&l) as f64;
        }
        let integral = sum * 4.0 * std::f64::consts::PI / (n * n) as f64;
        assert_relative_eq!(integral, lobe.magnitude as f64, epsilon = 5e-3);
    }

    #[test]
    fn sampled_directions_follow_the_pdf() {
        let lobe = skewed_lobe();
        for (u1, u2) in stratified_samples(16) {
            let w = cos_weighted_hemisphere(u1, u2);
            let l = lobe.sample(u1, u2);
            let expected = w.z * FRAC_1_PI * cbr((*lobe.matrix() * w).length()) / lobe.det();
            assert_relative_eq!(lobe.eval(&l) / lobe.magnitude, expected, max_relative = 1e-3);
        }
    }

    proptest! {
        #[test]
        fn samples_are_normalised(m11 in 0.05f32..2.0, m22 in 0.05f32..2.0, m13 in -1.0f32..1.0,
                                  u1 in 0.0f32..1.0, u2 in 0.0f32..1.0) {
            let mut lobe = LtcLobe::new();
            lobe.set_params(m11, m22, m13);
            let l = lobe.sample(u1, u2);
            prop_assert!((l.length() - 1.0).abs() < 1e-5);
            prop_assert!(lobe.eval(&l) >= 0.0);
        }
    }
}
