//! Math utilities.

pub use glam::*;
use num_traits::Float;
use std::f32::consts::PI;

/// Returns the square of the given value.
#[inline(always)]
pub fn sqr<F: Float>(x: F) -> F { x * x }

/// Returns the cube of the given value.
#[inline(always)]
pub fn cbr<F: Float>(x: F) -> F { x * x * x }

/// Maps a point of the unit square to a direction on the upper hemisphere
/// distributed proportionally to the cosine of the polar angle.
///
/// $\theta = \arccos(\sqrt{u_1})$, $\phi = 2\pi u_2$.
///
/// # Arguments
///
/// * `u1` - The first uniform variate, drives the polar angle.
/// * `u2` - The second uniform variate, drives the azimuthal angle.
pub fn cos_weighted_hemisphere(u1: f32, u2: f32) -> Vec3 {
    let theta = u1.sqrt().acos();
    let phi = u2 * 2.0 * PI;
    let (sin_theta, cos_theta) = theta.sin_cos();
    let (sin_phi, cos_phi) = phi.sin_cos();
    Vec3::new(sin_theta * cos_phi, sin_theta * sin_phi, cos_theta)
}

/// Generates the centres of the cells of a `n x n` regular grid over the
/// unit square.
///
/// Samples are produced row by row: the second coordinate advances in the
/// outer loop, the first one in the inner loop.
pub fn stratified_samples(n: usize) -> impl Iterator<Item = (f32, f32)> {
    let count = n as f32;
    (0..n).flat_map(move |j| {
        (0..n).map(move |i| ((i as f32 + 0.5) / count, (j as f32 + 0.5) / count))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_sqr_cbr() {
        assert_eq!(sqr(3.0f32), 9.0);
        assert_eq!(cbr(-2.0f64), -8.0);
    }

    #[test]
    fn stratified_samples_order() {
        let samples = stratified_samples(4).collect::<Vec<_>>();
        assert_eq!(samples.len(), 16);
        assert_eq!(samples[0], (0.125, 0.125));
        assert_eq!(samples[1], (0.375, 0.125));
        assert_eq!(samples[4], (0.125, 0.375));
        assert_eq!(samples[15], (0.875, 0.875));
        assert_eq!(stratified_samples(0).count(), 0);
    }

    #[test]
    fn cos_weighted_hemisphere_poles() {
        let up = cos_weighted_hemisphere(1.0, 0.0);
        approx::assert_abs_diff_eq!(up.z, 1.0, epsilon = 1e-6);
        let horizon = cos_weighted_hemisphere(0.0, 0.25);
        approx::assert_abs_diff_eq!(horizon.z, 0.0, epsilon = 1e-6);
        approx::assert_abs_diff_eq!(horizon.y, 1.0, epsilon = 1e-6);
    }

    proptest! {
        #[test]
        fn cos_weighted_hemisphere_is_normalised(u1 in 0.0f32..1.0, u2 in 0.0f32..1.0) {
            let dir = cos_weighted_hemisphere(u1, u2);
            prop_assert!((dir.length() - 1.0).abs() < 1e-5);
            prop_assert!(dir.z >= 0.0);
            prop_assert!((dir.z - u1.sqrt()).abs() < 1e-5);
        }
    }
}
