use crate::LtcLobe;
use base::math::{cbr, stratified_samples, Vec3};
use bxdf::Brdf;

/// Contribution of one light direction to the fitting error.
#[inline]
fn error_sample<B: Brdf + ?Sized>(
    lobe: &LtcLobe,
    brdf: &B,
    view: &Vec3,
    light: &Vec3,
    alpha: f32,
) -> f64 {
    let brdf_eval = brdf.eval(view, light, alpha);
    let lobe_pdf = lobe.pdf(light);
    let lobe_value = lobe.magnitude * lobe_pdf;
    let denom = (lobe_pdf + brdf_eval.pdf) as f64;
    if denom > 0.0 {
        cbr((brdf_eval.value - lobe_value).abs() as f64) / denom
    } else {
        0.0
    }
}

/// Measures how far a lobe is from a BRDF.
///
/// Directions are drawn with `sample_count x sample_count` stratified
/// samples from both the lobe and the BRDF; each one contributes
/// $|f_{brdf} - f_{ltc}|^3 / (p_{ltc} + p_{brdf})$. The sum of both
/// strategies is divided by the number of strata only.
pub fn compute_error<B: Brdf + ?Sized>(
    lobe: &LtcLobe,
    brdf: &B,
    view: &Vec3,
    alpha: f32,
    sample_count: u32,
) -> f64 {
    let mut error = 0.0f64;
    for (u1, u2) in stratified_samples(sample_count as usize) {
        let light = lobe.sample(u1, u2);
        error += error_sample(lobe, brdf, view, &light, alpha);

        let light = brdf.sample(view, alpha, u1, u2);
        error += error_sample(lobe, brdf, view, &light, alpha);
    }
    error / (sample_count as f64 * sample_count as f64)
}
