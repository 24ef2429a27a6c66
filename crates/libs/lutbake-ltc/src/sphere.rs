//! Horizon clipping table for spherical caps.
//!
//! A polygonal light integrated against a clamped cosine can be replaced by
//! a spherical cap with the same average direction. The table stores the
//! projected solid angle of such a cap clipped by the horizon, indexed by the
//! elevation and the length of the average direction.
use base::math::sqr;
use rayon::prelude::*;
use std::f32::consts::{FRAC_PI_2, PI};

fn g(w: f32, s: f32, gamma: f32) -> f32 {
    let (sin_g, cos_g) = gamma.sin_cos();
    -2.0 * w.sin() * s.cos() * cos_g + FRAC_PI_2 - gamma + sin_g * cos_g
}

fn h(w: f32, s: f32, gamma: f32) -> f32 {
    let cos_g = gamma.cos();
    let sin_s2 = sqr(s.sin());
    w.cos()
        * (cos_g * (sin_s2 - sqr(cos_g)).max(0.0).sqrt()
            + sin_s2 * (cos_g / s.sin()).clamp(-1.0, 1.0).asin())
}

/// Projected solid angle of the spherical cap of half-angle `s` whose axis
/// has the polar angle `w`, restricted to the upper hemisphere.
fn ihemi(w: f32, s: f32) -> f32 {
    let sin_s2 = sqr(s.sin());
    let compute_gamma = || (s.cos() / w.sin()).clamp(-1.0, 1.0).asin();

    if w <= FRAC_PI_2 - s {
        // Fully above the horizon.
        PI * w.cos() * sin_s2
    } else if w < FRAC_PI_2 {
        let gamma = compute_gamma();
        PI * w.cos() * sin_s2 + g(w, s, gamma) - h(w, s, gamma)
    } else if w < FRAC_PI_2 + s {
        let gamma = compute_gamma();
        g(w, s, gamma) + h(w, s, gamma)
    } else {
        0.0
    }
}

/// Generates the `n x n` horizon clipping table.
///
/// Entry `i + j * n` corresponds to $z = 2 i / (n - 1) - 1$, the cosine of
/// the elevation of the cap axis, and $l = j / (n - 1)$, the length of the
/// average direction ($\sin^2\sigma$ for a cap of half-angle $\sigma$). It
/// holds the projected solid angle normalised by $\pi l$.
pub fn gen_sphere_table(n: usize) -> Box<[f32]> {
    let mut table = vec![0.0f32; n * n];
    if n < 2 {
        return table.into_boxed_slice();
    }
    let last = (n - 1) as f32;
    table.par_chunks_mut(n).enumerate().for_each(|(j, row)| {
        let len = j as f32 / last;
        let sigma = len.sqrt().asin().min(FRAC_PI_2);
        for (i, value) in row.iter_mut().enumerate() {
            let z = 2.0 * i as f32 / last - 1.0;
            let omega = z.acos();
            *value = if sigma > 0.0 {
                ihemi(omega, sigma) / (PI * len)
            } else {
                z.max(0.0)
            };
        }
    });
    let n_invalid = table.iter().filter(|v| !v.is_finite()).count();
    if n_invalid > 0 {
        log::warn!("{} non-finite entries in the sphere table", n_invalid);
    }
    table.into_boxed_slice()
}
