//! Fitting of the LTC look-up table.
use crate::{
    compute_error, nelder_mead, AverageTerms, FitError, LtcLobe, NelderMeadOptions, Objective,
    Termination,
};
use base::{
    math::{Mat3, Vec2, Vec3},
    Symmetry,
};
use bxdf::Brdf;
use serde::{Deserialize, Serialize};

/// Smallest value of the diagonal parameters of a lobe.
pub const MIN_DIAGONAL: f32 = 1e-7;

/// Largest polar angle of the view direction; grazing angles are singular.
pub const MAX_VIEW_THETA: f32 = 1.57;

/// Configuration of an LTC table fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LtcFitConfig {
    /// Number of entries along each axis of the table.
    pub lut_size: usize,
    /// Number of strata per dimension of the Monte-Carlo estimators.
    pub sample_count: u32,
    /// Roughness floor, avoids evaluating a perfectly specular BRDF.
    pub min_alpha: f32,
    /// Tuning of the simplex search run for every cell.
    pub simplex: NelderMeadOptions,
}

impl Default for LtcFitConfig {
    fn default() -> Self {
        Self {
            lut_size: 64,
            sample_count: 32,
            min_alpha: 1e-5,
            simplex: NelderMeadOptions::default(),
        }
    }
}

impl LtcFitConfig {
    /// Checks that the configuration describes a feasible fit.
    pub fn validate(&self) -> Result<(), FitError> {
        if self.lut_size < 2 {
            return Err(FitError::LutSizeTooSmall(self.lut_size));
        }
        if self.sample_count == 0 {
            return Err(FitError::NoSamples);
        }
        if !(self.min_alpha > 0.0 && self.min_alpha.is_finite()) {
            return Err(FitError::InvalidMinAlpha(self.min_alpha));
        }
        let NelderMeadOptions {
            delta,
            tolerance,
            max_iterations,
        } = self.simplex;
        if !(delta > 0.0 && delta.is_finite())
            || !(tolerance > 0.0 && tolerance.is_finite())
            || max_iterations == 0
        {
            return Err(FitError::InvalidSimplex {
                delta,
                tolerance,
                max_iterations,
            });
        }
        Ok(())
    }
}

/// Position of a cell in the table and the configuration it stands for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridCell {
    /// Index along the roughness axis.
    pub roughness_index: usize,
    /// Index along the view angle axis.
    pub view_index: usize,
    /// Roughness of the BRDF.
    pub alpha: f32,
    /// Polar angle of the view direction.
    pub theta: f32,
    /// View direction, in the XZ plane.
    pub view: Vec3,
}

impl GridCell {
    /// Creates the cell `(a, t)` of a `lut_size x lut_size` table.
    ///
    /// The view angle is parameterised by $\cos\theta = 1 - x^2$ with
    /// $x = t / (N - 1)$, the roughness by $\alpha = r^2$ with
    /// $r = a / (N - 1)$. `lut_size` must be at least 2.
    pub fn new(a: usize, t: usize, lut_size: usize, min_alpha: f32) -> Self {
        let last = (lut_size - 1) as f32;
        let x = t as f32 / last;
        let cos_theta = 1.0 - x * x;
        let theta = cos_theta.acos().min(MAX_VIEW_THETA);
        let roughness = a as f32 / last;
        Self {
            roughness_index: a,
            view_index: t,
            alpha: (roughness * roughness).max(min_alpha),
            theta,
            view: Vec3::new(theta.sin(), 0.0, theta.cos()),
        }
    }
}

/// Report of the minimisation of one cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinimisationReport {
    /// Error of the fitted lobe.
    pub objective_fn: f64,
    /// The number of iterations performed.
    pub n_iterations: u32,
    /// The reason for termination.
    pub termination: Termination,
}

/// Error of a lobe against a BRDF as a function of `[m11, m22, m13]`.
#[derive(Debug)]
pub struct LtcFittingProxy<'a, B: Brdf + ?Sized> {
    brdf: &'a B,
    lobe: LtcLobe,
    view: Vec3,
    alpha: f32,
    symmetry: Symmetry,
    sample_count: u32,
}

impl<'a, B: Brdf + ?Sized> LtcFittingProxy<'a, B> {
    /// Creates a new proxy around a seeded lobe.
    pub fn new(
        brdf: &'a B,
        lobe: LtcLobe,
        cell: &GridCell,
        symmetry: Symmetry,
        sample_count: u32,
    ) -> Self {
        Self {
            brdf,
            lobe,
            view: cell.view,
            alpha: cell.alpha,
            symmetry,
            sample_count,
        }
    }

    /// Writes the parameters into the lobe.
    ///
    /// The diagonal is clamped to [`MIN_DIAGONAL`]; an isotropic fit only
    /// uses the first parameter.
    pub fn update(&mut self, params: &[f64; 3]) {
        let m11 = (params[0] as f32).max(MIN_DIAGONAL);
        let m22 = (params[1] as f32).max(MIN_DIAGONAL);
        let m13 = params[2] as f32;
        if self.symmetry.is_isotropic() {
            self.lobe.set_params(m11, m11, 0.0);
        } else {
            self.lobe.set_params(m11, m22, m13);
        }
    }

    /// Returns the current lobe.
    pub fn lobe(&self) -> &LtcLobe { &self.lobe }

    /// Consumes the proxy, returning the current lobe.
    pub fn into_lobe(self) -> LtcLobe { self.lobe }
}

impl<B: Brdf + ?Sized> Objective<3> for LtcFittingProxy<'_, B> {
    fn eval(&mut self, params: &[f64; 3]) -> f64 {
        self.update(params);
        if self.lobe.is_degenerate() {
            return f64::MAX;
        }
        let error = compute_error(
            &self.lobe,
            self.brdf,
            &self.view,
            self.alpha,
            self.sample_count,
        );
        if error.is_finite() {
            error
        } else {
            f64::MAX
        }
    }
}

/// Prepares the lobe for fitting a cell.
///
/// At normal incidence the lobe is axis aligned, isotropic and starts from
/// the diagonal of `neighbour` (the fitted transform of the next rougher
/// cell) or from the identity. Otherwise the lobe is oriented along the
/// average direction of the BRDF and keeps its current parameters.
pub fn seed_lobe(
    mut lobe: LtcLobe,
    cell: &GridCell,
    terms: &AverageTerms,
    neighbour: Option<&Mat3>,
) -> (LtcLobe, Symmetry) {
    lobe.magnitude = terms.norm;
    lobe.fresnel = terms.fresnel;
    if cell.view_index == 0 {
        lobe.set_basis(Vec3::X, Vec3::Y, Vec3::Z);
        let (m11, m22) = neighbour.map_or((1.0, 1.0), |m| (m.x_axis.x, m.y_axis.y));
        lobe.set_params(m11, m22, 0.0);
        (lobe, Symmetry::Isotropic)
    } else {
        let l = terms.direction;
        lobe.set_basis(Vec3::new(l.z, 0.0, -l.x), Vec3::Y, l);
        (lobe, Symmetry::Anisotropic)
    }
}

/// Fits a seeded lobe to the BRDF at the given cell.
///
/// # Returns
///
/// The lobe updated with the best parameters found and the report of the
/// minimisation.
pub fn fit_cell<B: Brdf + ?Sized>(
    brdf: &B,
    lobe: LtcLobe,
    cell: &GridCell,
    symmetry: Symmetry,
    config: &LtcFitConfig,
) -> (LtcLobe, MinimisationReport) {
    let [m11, m22, m13] = lobe.params();
    let start = [m11 as f64, m22 as f64, m13 as f64];
    let mut proxy = LtcFittingProxy::new(brdf, lobe, cell, symmetry, config.sample_count);
    let min = nelder_mead(&mut proxy, start, &config.simplex);
    proxy.update(&min.params);
    (
        proxy.into_lobe(),
        MinimisationReport {
            objective_fn: min.value,
            n_iterations: min.n_iterations,
            termination: min.termination,
        },
    )
}

/// Fitted LTC transforms over the (roughness, view angle) grid.
///
/// Cell `(a, t)` is stored at `a + t * size`.
#[derive(Debug, Clone)]
pub struct FitTable {
    size: usize,
    matrices: Box<[Mat3]>,
    magnitude_fresnel: Box<[Vec2]>,
    reports: Box<[MinimisationReport]>,
}

impl FitTable {
    /// Returns the number of entries along each axis.
    pub fn size(&self) -> usize { self.size }

    /// Returns the storage index of cell `(a, t)`.
    pub fn index(&self, a: usize, t: usize) -> usize { a + t * self.size }

    /// Returns the fitted transform of cell `(a, t)`.
    pub fn matrix(&self, a: usize, t: usize) -> &Mat3 { &self.matrices[self.index(a, t)] }

    /// Returns the magnitude and the Fresnel weight of cell `(a, t)`.
    pub fn magnitude_fresnel(&self, a: usize, t: usize) -> Vec2 {
        self.magnitude_fresnel[self.index(a, t)]
    }

    /// Returns the minimisation report of cell `(a, t)`.
    pub fn report(&self, a: usize, t: usize) -> &MinimisationReport {
        &self.reports[self.index(a, t)]
    }

    /// Returns all transforms in storage order.
    pub fn matrices(&self) -> &[Mat3] { &self.matrices }

    /// Returns all magnitude and Fresnel pairs in storage order.
    pub fn magnitudes_fresnels(&self) -> &[Vec2] { &self.magnitude_fresnel }
}

/// Zeroes the coefficients coupling the Y axis with the XZ plane.
fn strip_off_plane(mut m: Mat3) -> Mat3 {
    m.x_axis.y = 0.0;
    m.y_axis.x = 0.0;
    m.z_axis.y = 0.0;
    m.y_axis.z = 0.0;
    m
}

/// Fits the LTC table of a BRDF.
///
/// Rows are processed from the roughest to the smoothest and each row from
/// normal incidence to grazing angles: every cell starts from the lobe fitted
/// for the previous one, and cells at normal incidence from the next rougher
/// row.
///
/// # Arguments
///
/// * `brdf` - The BRDF to approximate.
/// * `config` - The configuration of the fit.
pub fn fit_table<B: Brdf + ?Sized>(brdf: &B, config: &LtcFitConfig) -> Result<FitTable, FitError> {
    config.validate()?;
    let n = config.lut_size;
    log::info!(
        "Fitting {}x{} LTC table of {} with {} samples per cell",
        n,
        n,
        brdf.kind(),
        config.sample_count * config.sample_count
    );

    let mut matrices = vec![Mat3::ZERO; n * n];
    let mut magnitude_fresnel = vec![Vec2::ZERO; n * n];
    let mut reports = vec![None; n * n];
    let mut n_not_converged = 0usize;

    let mut lobe = LtcLobe::new();
    for a in (0..n).rev() {
        log::info!("  - roughness row {}/{}", n - a, n);
        for t in 0..n {
            let cell = GridCell::new(a, t, n, config.min_alpha);
            let terms = AverageTerms::compute(brdf, &cell.view, cell.alpha, config.sample_count);
            let neighbour = (a + 1 < n).then(|| &matrices[a + 1 + t * n]);
            let (seeded, symmetry) = seed_lobe(lobe, &cell, &terms, neighbour);
            let (fitted, report) = fit_cell(brdf, seeded, &cell, symmetry, config);

            if fitted.is_degenerate() {
                log::error!(
                    "Degenerate lobe at alpha = {}, theta = {}: {:?}",
                    cell.alpha,
                    cell.theta,
                    fitted.params()
                );
                return Err(FitError::DegenerateCell {
                    roughness_index: a,
                    view_index: t,
                });
            }
            if report.termination == Termination::MaxIterations {
                n_not_converged += 1;
                log::warn!(
                    "Fit at alpha = {}, theta = {} {}, error = {}",
                    cell.alpha,
                    cell.theta,
                    report.termination,
                    report.objective_fn
                );
            }
            log::debug!(
                "    - cell ({}, {}) {}: alpha = {:.5}, theta = {:.4}, params = {:?}, error = {:e}, \
                 iterations = {}",
                a,
                t,
                symmetry,
                cell.alpha,
                cell.theta,
                fitted.params(),
                report.objective_fn,
                report.n_iterations
            );

            let idx = a + t * n;
            matrices[idx] = strip_off_plane(*fitted.matrix());
            magnitude_fresnel[idx] = Vec2::new(fitted.magnitude, fitted.fresnel);
            reports[idx] = Some(report);
            lobe = fitted;
        }
    }

    if n_not_converged > 0 {
        log::warn!(
            "{} of {} cells stopped before convergence",
            n_not_converged,
            n * n
        );
    }

    Ok(FitTable {
        size: n,
        matrices: matrices.into_boxed_slice(),
        magnitude_fresnel: magnitude_fresnel.into_boxed_slice(),
        reports: reports.into_iter().flatten().collect(),
    })
}
