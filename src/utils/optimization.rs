//! Bounded Nelder-Mead minimisation for smoothing parameter estimation.

use std::cmp::Ordering;

/// Outcome of a Nelder-Mead run.
#[derive(Debug, Clone)]
pub struct NelderMeadResult {
    /// Best point found.
    pub optimal_point: Vec<f64>,
    /// Objective value at `optimal_point`.
    pub optimal_value: f64,
    pub iterations: usize,
    pub converged: bool,
}

/// Nelder-Mead coefficients and stopping rules.
#[derive(Debug, Clone)]
pub struct NelderMeadConfig {
    pub max_iter: usize,
    /// Stop when the spread of objective values (or of the vertices) falls below this.
    pub tolerance: f64,
    /// Reflection coefficient.
    pub alpha: f64,
    /// Expansion coefficient.
    pub gamma: f64,
    /// Contraction coefficient.
    pub rho: f64,
    /// Shrink coefficient.
    pub sigma: f64,
    /// Initial simplex step, relative to the starting coordinate when non-zero.
    pub initial_step: f64,
}

impl Default for NelderMeadConfig {
    fn default() -> Self {
        Self {
            max_iter: 1000,
            tolerance: 1e-8,
            alpha: 1.0,
            gamma: 2.0,
            rho: 0.5,
            sigma: 0.5,
            initial_step: 0.05,
        }
    }
}

/// Box constraints, one `(min, max)` pair per dimension.
#[derive(Debug, Clone, Copy)]
pub struct Bounds<'a>(Option<&'a [(f64, f64)]>);

impl<'a> Bounds<'a> {
    fn clamp(&self, mut point: Vec<f64>) -> Vec<f64> {
        if let Some(bounds) = self.0 {
            for (x, &(lo, hi)) in point.iter_mut().zip(bounds) {
                *x = x.clamp(lo, hi);
            }
        }
        point
    }
}

/// Simplex vertices with their objective values.
struct Simplex {
    vertices: Vec<Vec<f64>>,
    values: Vec<f64>,
}

impl Simplex {
    fn build<F>(objective: &F, initial: &[f64], bounds: Bounds<'_>, step: f64) -> Self
    where
        F: Fn(&[f64]) -> f64,
    {
        let base = bounds.clamp(initial.to_vec());
        let mut vertices = Vec::with_capacity(base.len() + 1);
        for i in 0..base.len() {
            let delta = if base[i].abs() > 1e-10 {
                step * base[i].abs()
            } else {
                step
            };
            let mut vertex = base.clone();
            vertex[i] += delta;
            let mut vertex = bounds.clamp(vertex);
            // At an upper bound the step is clamped away; go the other way.
            if vertex[i] == base[i] {
                vertex[i] -= 2.0 * delta;
                vertex = bounds.clamp(vertex);
            }
            vertices.push(vertex);
        }
        vertices.insert(0, base);
        let values = vertices.iter().map(|v| objective(v)).collect();
        Self { vertices, values }
    }

    /// Indices of the best, second-worst and worst vertices.
    fn rank(&self) -> (usize, usize, usize) {
        let mut order: Vec<usize> = (0..self.values.len()).collect();
        order.sort_by(|&a, &b| cmp_values(self.values[a], self.values[b]));
        let n = order.len() - 1;
        (order[0], order[n - 1], order[n])
    }

    fn centroid_without(&self, skip: usize) -> Vec<f64> {
        let dim = self.vertices[0].len();
        let mut centroid = vec![0.0; dim];
        for (i, vertex) in self.vertices.iter().enumerate() {
            if i == skip {
                continue;
            }
            for (c, x) in centroid.iter_mut().zip(vertex) {
                *c += x;
            }
        }
        let count = (self.vertices.len() - 1) as f64;
        centroid.iter_mut().for_each(|c| *c /= count);
        centroid
    }

    fn max_distance_to(&self, point: &[f64]) -> f64 {
        self.vertices
            .iter()
            .map(|v| distance(v, point))
            .fold(0.0, f64::max)
    }

    fn replace(&mut self, idx: usize, vertex: Vec<f64>, value: f64) {
        self.vertices[idx] = vertex;
        self.values[idx] = value;
    }

    fn shrink_towards<F>(&mut self, best: usize, sigma: f64, objective: &F, bounds: Bounds<'_>)
    where
        F: Fn(&[f64]) -> f64,
    {
        let anchor = self.vertices[best].clone();
        for i in 0..self.vertices.len() {
            if i == best {
                continue;
            }
            let moved = lerp(&anchor, &self.vertices[i], sigma);
            let moved = bounds.clamp(moved);
            self.values[i] = objective(&moved);
            self.vertices[i] = moved;
        }
    }

    fn into_best(self, iterations: usize, converged: bool) -> NelderMeadResult {
        let best = self
            .values
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| cmp_values(**a, **b))
            .map(|(i, _)| i)
            .unwrap_or(0);
        NelderMeadResult {
            optimal_value: self.values[best],
            optimal_point: self.vertices.into_iter().nth(best).unwrap_or_default(),
            iterations,
            converged,
        }
    }
}

/// Minimise `objective` starting from `initial`, clamping every trial point to `bounds`.
///
/// ```
/// use revcast::utils::optimization::{nelder_mead, NelderMeadConfig};
///
/// let result = nelder_mead(
///     |x| (x[0] - 0.4).powi(2) + (x[1] - 0.2).powi(2),
///     &[0.5, 0.5],
///     Some(&[(0.0, 1.0), (0.0, 1.0)]),
///     NelderMeadConfig::default(),
/// );
/// assert!((result.optimal_point[0] - 0.4).abs() < 1e-3);
/// ```
pub fn nelder_mead<F>(
    objective: F,
    initial: &[f64],
    bounds: Option<&[(f64, f64)]>,
    config: NelderMeadConfig,
) -> NelderMeadResult
where
    F: Fn(&[f64]) -> f64,
{
    if initial.is_empty() {
        return NelderMeadResult {
            optimal_point: vec![],
            optimal_value: f64::NAN,
            iterations: 0,
            converged: false,
        };
    }

    let bounds = Bounds(bounds);
    let mut simplex = Simplex::build(&objective, initial, bounds, config.initial_step);
    let mut iterations = 0;

    while iterations < config.max_iter {
        iterations += 1;

        let (best, second_worst, worst) = simplex.rank();
        let (f_best, f_second, f_worst) = (
            simplex.values[best],
            simplex.values[second_worst],
            simplex.values[worst],
        );

        if f_worst - f_best < config.tolerance {
            return simplex.into_best(iterations, true);
        }

        let centroid = simplex.centroid_without(worst);
        if simplex.max_distance_to(&centroid) < config.tolerance {
            return simplex.into_best(iterations, true);
        }

        let reflected = bounds.clamp(lerp(&centroid, &simplex.vertices[worst], -config.alpha));
        let f_reflected = objective(&reflected);

        if f_reflected < f_best {
            let expanded = bounds.clamp(lerp(&centroid, &reflected, config.gamma));
            let f_expanded = objective(&expanded);
            if f_expanded < f_reflected {
                simplex.replace(worst, expanded, f_expanded);
            } else {
                simplex.replace(worst, reflected, f_reflected);
            }
            continue;
        }

        if f_reflected < f_second {
            simplex.replace(worst, reflected, f_reflected);
            continue;
        }

        let (target, f_target) = if f_reflected < f_worst {
            (reflected, f_reflected)
        } else {
            (simplex.vertices[worst].clone(), f_worst)
        };
        let contracted = bounds.clamp(lerp(&centroid, &target, config.rho));
        let f_contracted = objective(&contracted);
        if f_contracted < f_target {
            simplex.replace(worst, contracted, f_contracted);
            continue;
        }

        simplex.shrink_towards(best, config.sigma, &objective, bounds);
    }

    simplex.into_best(iterations, false)
}

/// `from + t * (to - from)`; a negative `t` reflects `to` through `from`.
fn lerp(from: &[f64], to: &[f64], t: f64) -> Vec<f64> {
    from.iter().zip(to).map(|(a, b)| a + t * (b - a)).collect()
}

fn distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

/// NaN objective values sort last.
fn cmp_values(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}
