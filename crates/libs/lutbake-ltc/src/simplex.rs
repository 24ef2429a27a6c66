//! Derivative-free minimisation with the Nelder-Mead simplex method.
//!
//! J. A. Nelder and R. Mead. A simplex method for function minimization.
//! The Computer Journal, 7(4):308-313, 1965.
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

const REFLECT: f64 = 1.0;
const EXPAND: f64 = 2.0;
const CONTRACT: f64 = 0.5;
const SHRINK: f64 = 0.5;

/// Tuning of the simplex search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NelderMeadOptions {
    /// Offset of the initial vertices from the starting point along each
    /// axis.
    pub delta: f64,
    /// Relative spread of the objective over the simplex below which the
    /// search stops.
    pub tolerance: f64,
    /// Maximum number of iterations.
    pub max_iterations: u32,
}

impl Default for NelderMeadOptions {
    fn default() -> Self {
        Self {
            delta: 0.05,
            tolerance: 1e-5,
            max_iterations: 100,
        }
    }
}

/// A function to minimise over `D` parameters.
///
/// The returned value must not be NaN; map invalid parameters to a large
/// value instead.
pub trait Objective<const D: usize> {
    /// Evaluates the objective at the given point.
    fn eval(&mut self, params: &[f64; D]) -> f64;
}

impl<F, const D: usize> Objective<D> for F
where
    F: FnMut(&[f64; D]) -> f64,
{
    fn eval(&mut self, params: &[f64; D]) -> f64 { self(params) }
}

/// Reason for the termination of the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Termination {
    /// The objective values of the simplex vertices met the tolerance.
    Converged,
    /// The iteration budget was exhausted.
    MaxIterations,
}

impl Display for Termination {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Termination::Converged => f.write_str("converged"),
            Termination::MaxIterations => f.write_str("reached the maximum number of iterations"),
        }
    }
}

/// Best point found by [`nelder_mead`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Minimum<const D: usize> {
    /// Parameters of the best vertex.
    pub params: [f64; D],
    /// Objective value at `params`.
    pub value: f64,
    /// Number of iterations performed.
    pub n_iterations: u32,
    /// Why the search stopped.
    pub termination: Termination,
}

/// Indices of the lowest, highest and next-highest vertices.
///
/// The next-highest vertex is never the highest one.
fn rank(values: &[f64]) -> (usize, usize, usize) {
    let (mut lo, mut hi) = (0, 0);
    for i in 1..values.len() {
        if values[i] < values[lo] {
            lo = i;
        }
        if values[i] > values[hi] {
            hi = i;
        }
    }
    let nh = (0..values.len())
        .filter(|&i| i != hi)
        .reduce(|nh, i| if values[i] > values[nh] { i } else { nh })
        .unwrap_or(hi);
    (lo, hi, nh)
}

/// `o + coeff * (o - p)`
fn extrapolate<const D: usize>(o: &[f64; D], p: &[f64; D], coeff: f64) -> [f64; D] {
    std::array::from_fn(|k| o[k] + coeff * (o[k] - p[k]))
}

/// Minimises `objective` starting from `start`.
///
/// The initial simplex is made of `start` and the `D` points offset by
/// `options.delta` along each axis. The search stops when
/// $2 |f_{lo} - f_{hi}| < (|f_{lo}| + |f_{hi}|) \cdot tolerance$ or after
/// `options.max_iterations` iterations; the best vertex of the final simplex
/// is returned in both cases.
///
/// # Arguments
///
/// * `objective` - The function to minimise.
/// * `start` - The starting point.
/// * `options` - Size of the initial simplex and stopping criteria.
pub fn nelder_mead<const D: usize, O: Objective<D> + ?Sized>(
    objective: &mut O,
    start: [f64; D],
    options: &NelderMeadOptions,
) -> Minimum<D> {
    let mut simplex = vec![start; D + 1];
    for (i, vertex) in simplex.iter_mut().enumerate().skip(1) {
        vertex[i - 1] += options.delta;
    }
    let mut values = simplex
        .iter()
        .map(|vertex| objective.eval(vertex))
        .collect::<Vec<_>>();

    let mut termination = Termination::MaxIterations;
    let mut n_iterations = 0;
    while n_iterations < options.max_iterations {
        let (lo, hi, nh) = rank(&values);

        let (f_lo, f_hi) = (values[lo], values[hi]);
        if 2.0 * (f_lo - f_hi).abs() < (f_lo.abs() + f_hi.abs()) * options.tolerance {
            termination = Termination::Converged;
            break;
        }
        n_iterations += 1;

        // Centroid of all vertices but the worst one.
        let mut o = [0.0; D];
        for (_, vertex) in simplex.iter().enumerate().filter(|(i, _)| *i != hi) {
            o.iter_mut().zip(vertex).for_each(|(c, v)| *c += v);
        }
        o.iter_mut().for_each(|c| *c /= D as f64);

        let r = extrapolate(&o, &simplex[hi], REFLECT);
        let fr = objective.eval(&r);
        if fr < values[nh] {
            if fr < values[lo] {
                let e = extrapolate(&o, &simplex[hi], EXPAND);
                let fe = objective.eval(&e);
                if fe < fr {
                    log::trace!("  - expand, f = {}", fe);
                    simplex[hi] = e;
                    values[hi] = fe;
                    continue;
                }
            }
            log::trace!("  - reflect, f = {}", fr);
            simplex[hi] = r;
            values[hi] = fr;
            continue;
        }

        let c = extrapolate(&o, &simplex[hi], -CONTRACT);
        let fc = objective.eval(&c);
        if fc < values[hi] {
            log::trace!("  - contract, f = {}", fc);
            simplex[hi] = c;
            values[hi] = fc;
            continue;
        }

        log::trace!("  - shrink towards f = {}", values[lo]);
        let best = simplex[lo];
        for i in (0..=D).filter(|i| *i != lo) {
            simplex[i] = std::array::from_fn(|k| best[k] + SHRINK * (simplex[i][k] - best[k]));
            values[i] = objective.eval(&simplex[i]);
        }
    }

    let (lo, _, _) = rank(&values);
    Minimum {
        params: simplex[lo],
        value: values[lo],
        n_iterations,
        termination,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    fn quadratic(p: &[f64; 3]) -> f64 {
        (p[0] - 1.0).powi(2) + 2.0 * (p[1] + 0.5).powi(2) + 0.5 * (p[2] - 2.0).powi(2) + 1.0
    }

    #[test]
    fn converges_on_a_convex_quadratic() {
        let options = NelderMeadOptions::default();
        let min = nelder_mead(&mut quadratic, [0.0; 3], &options);
        assert_eq!(min.termination, Termination::Converged);
        assert!(min.n_iterations < options.max_iterations);
        assert_abs_diff_eq!(min.value, 1.0, epsilon = 1e-4);
        assert_abs_diff_eq!(min.params[0], 1.0, epsilon = 2e-2);
        assert_abs_diff_eq!(min.params[1], -0.5, epsilon = 2e-2);
        assert_abs_diff_eq!(min.params[2], 2.0, epsilon = 2e-2);
        assert_abs_diff_eq!(min.value, quadratic(&min.params));
    }

    #[test]
    fn rosenbrock_valley() {
        let mut rosenbrock =
            |p: &[f64; 2]| (1.0 - p[0]).powi(2) + 100.0 * (p[1] - p[0] * p[0]).powi(2);
        let options = NelderMeadOptions {
            delta: 0.1,
            tolerance: 1e-12,
            max_iterations: 2000,
        };
        let min = nelder_mead(&mut rosenbrock, [-1.2, 1.0], &options);
        assert_abs_diff_eq!(min.params[0], 1.0, epsilon = 1e-3);
        assert_abs_diff_eq!(min.params[1], 1.0, epsilon = 2e-3);
    }

    #[test]
    fn iteration_budget_is_respected() {
        let mut calls = 0;
        let mut objective = |p: &[f64; 3]| {
            calls += 1;
            quadratic(p)
        };
        let options = NelderMeadOptions {
            max_iterations: 5,
            ..Default::default()
        };
        let min = nelder_mead(&mut objective, [10.0, 10.0, 10.0], &options);
        assert_eq!(min.termination, Termination::MaxIterations);
        assert_eq!(min.n_iterations, 5);
        // Initial simplex plus at most two trial points and a shrink per iteration.
        assert!(calls <= 4 + 5 * 5);
    }

    #[test]
    fn flat_objective_converges_immediately() {
        let mut flat = |_: &[f64; 3]| f64::MAX;
        let min = nelder_mead(&mut flat, [0.5, 0.5, 0.0], &NelderMeadOptions::default());
        assert_eq!(min.termination, Termination::Converged);
        assert_eq!(min.n_iterations, 0);
        assert_eq!(min.params, [0.5, 0.5, 0.0]);
    }

    #[test]
    fn ranking() {
        assert_eq!(rank(&[3.0, 1.0, 4.0, 2.0]), (1, 2, 0));
        assert_eq!(rank(&[1.0, 1.0, 1.0]), (0, 0, 1));
    }

    #[test]
    fn ranking_with_the_worst_vertex_first() {
        assert_eq!(rank(&[4.0, 1.0, 2.0, 3.0]), (1, 0, 3));
        assert_eq!(rank(&[5.0, 2.0, 3.0]), (1, 0, 2));
    }

    #[test]
    fn objective_crossing_zero() {
        // Values of both signs around the start must not pass the
        // relative tolerance test.
        let mut shifted =
            |p: &[f64; 3]| (p[0] - 1.0).powi(2) + p[1].powi(2) + p[2].powi(2) - 0.9525;
        let min = nelder_mead(&mut shifted, [0.0; 3], &NelderMeadOptions::default());
        assert!(min.n_iterations > 0);
        assert_abs_diff_eq!(min.params[0], 1.0, epsilon = 2e-2);
        assert_abs_diff_eq!(min.value, -0.9525, epsilon = 1e-3);
    }

    proptest! {
        #[test]
        fn never_worse_than_the_start(x in -5.0f64..5.0, y in -5.0f64..5.0, z in -5.0f64..5.0) {
            let start = [x, y, z];
            let min = nelder_mead(&mut quadratic, start, &NelderMeadOptions::default());
            prop_assert!(min.value <= quadratic(&start));
            prop_assert!(min.value >= 1.0);
        }
    }
}
