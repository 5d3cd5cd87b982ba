use crate::domain::Interval;
use nalgebra::{DMatrix, SymmetricEigen};

/// Default tolerance for the adaptive integrator.
pub(crate) const DEFAULT_QUAD_TOL: f64 = 1e-10;

const PANEL_ORDER: usize = 10;
const MAX_DEPTH: usize = 40;

/// Get a set of n Gauss-Legendre-Quadrature integration points and weights
/// over `(-1, 1)`.
///
/// ```
/// use galerkin_1d::integration::gauss_quadrature_points;
///
/// let (points, weights) = gauss_quadrature_points(10);
/// assert_eq!(points.len(), 10);
/// assert_eq!(weights.len(), 10);
/// assert!(points.iter().sum::<f64>().abs() < 1e-12);
/// assert!((weights.iter().sum::<f64>() - 2.0).abs() < 1e-12);
/// ```
// https://en.wikipedia.org/wiki/Gaussian_quadrature#Gauss%E2%80%93Legendre_quadrature
pub fn gauss_quadrature_points(n: usize) -> (Vec<f64>, Vec<f64>) {
    let betas: Vec<f64> = (1..n)
        .map(|i| 0.5 / (1.0 - (2.0 * i as f64).powi(-2)).sqrt())
        .collect();

    let polymat: DMatrix<f64> = DMatrix::from_fn(n, n, |r, c| {
        if r == c + 1 {
            betas[r - 1]
        } else if c == r + 1 {
            betas[c - 1]
        } else {
            0.0
        }
    });

    let eigen_decomp = SymmetricEigen::new(polymat);

    let mut xw: Vec<(f64, f64)> = eigen_decomp
        .eigenvalues
        .iter()
        .cloned()
        .zip(
            eigen_decomp
                .eigenvectors
                .row(0)
                .iter()
                .map(|weight| (*weight).powi(2) * 2.0),
        )
        .collect();

    xw.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());

    xw.drain(0..).unzip()
}

/// A fixed Gauss-Legendre rule, applied to arbitrary finite panels.
struct PanelRule {
    points: Vec<f64>,
    weights: Vec<f64>,
}

impl PanelRule {
    fn new(order: usize) -> Self {
        let (points, weights) = gauss_quadrature_points(order);
        Self { points, weights }
    }

    /// Integral estimate over the panel `[a, b]`.
    fn apply<F: Fn(f64) -> f64>(&self, f: &F, a: f64, b: f64) -> f64 {
        let scale = (b - a) / 2.0;
        let offset = (b + a) / 2.0;
        self.points
            .iter()
            .zip(self.weights.iter())
            .map(|(&x, &w)| w * f(x * scale + offset))
            .sum::<f64>()
            * scale
    }
}

fn adaptive<F: Fn(f64) -> f64>(
    rule: &PanelRule,
    f: &F,
    a: f64,
    b: f64,
    whole: f64,
    tol: f64,
    depth: usize,
) -> f64 {
    let mid = 0.5 * (a + b);
    let left = rule.apply(f, a, mid);
    let right = rule.apply(f, mid, b);
    let split = left + right;
    if depth >= MAX_DEPTH || (split - whole).abs() <= tol.max(1e-15 * split.abs()) {
        split
    } else {
        adaptive(rule, f, a, mid, left, tol / 2.0, depth + 1)
            + adaptive(rule, f, mid, b, right, tol / 2.0, depth + 1)
    }
}

/// Adaptive Gauss-Legendre integral of `f` over a single interval.
///
/// Panels are bisected until the whole-panel and split-panel estimates
/// agree to `tol`. Infinite and semi-infinite intervals are mapped onto
/// finite panels by rational substitutions before integrating, so callers
/// never need to special-case unbounded supports.
///
/// ```
/// use galerkin_1d::domain::Interval;
/// use galerkin_1d::integration::integrate;
///
/// let solution = integrate(|x| x * x, Interval::new(0.0, 1.0), 1e-12);
/// assert!((solution - 1.0 / 3.0).abs() < 1e-10);
///
/// // a Gaussian over the full real line
/// let gauss = integrate(|x: f64| (-x * x).exp(), Interval::unbounded(), 1e-10);
/// assert!((gauss - std::f64::consts::PI.sqrt()).abs() < 1e-8);
/// ```
pub fn integrate<F: Fn(f64) -> f64>(f: F, interval: Interval, tol: f64) -> f64 {
    let rule = PanelRule::new(PANEL_ORDER);
    match (interval.start.is_finite(), interval.end.is_finite()) {
        (true, true) => {
            let (a, b) = (interval.start, interval.end);
            if a == b {
                return 0.0;
            }
            let whole = rule.apply(&f, a, b);
            adaptive(&rule, &f, a, b, whole, tol, 0)
        }
        (true, false) => {
            // x = a + t / (1 - t), t in (0, 1)
            let a = interval.start;
            let g = move |t: f64| {
                let u = 1.0 - t;
                f(a + t / u) / (u * u)
            };
            let whole = rule.apply(&g, 0.0, 1.0);
            adaptive(&rule, &g, 0.0, 1.0, whole, tol, 0)
        }
        (false, true) => {
            // x = b - t / (1 - t), t in (0, 1)
            let b = interval.end;
            let g = move |t: f64| {
                let u = 1.0 - t;
                f(b - t / u) / (u * u)
            };
            let whole = rule.apply(&g, 0.0, 1.0);
            adaptive(&rule, &g, 0.0, 1.0, whole, tol, 0)
        }
        (false, false) => {
            // x = t / (1 - t^2), t in (-1, 1)
            let g = move |t: f64| {
                let u = 1.0 - t * t;
                f(t / u) * (1.0 + t * t) / (u * u)
            };
            let whole = rule.apply(&g, -1.0, 1.0);
            adaptive(&rule, &g, -1.0, 1.0, whole, tol, 0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GLQ_ACCURACY: f64 = 1e-9;
    // reference points
    const X_20: [f64; 20] = [
        -0.993128599,
        -0.963971927,
        -0.912234428,
        -0.839116972,
        -0.746331906,
        -0.636053681,
        -0.510867002,
        -0.373706089,
        -0.227785851,
        -0.076526521,
        0.076526521,
        0.227785851,
        0.373706089,
        0.510867002,
        0.636053681,
        0.746331906,
        0.839116972,
        0.912234428,
        0.963971927,
        0.993128599,
    ];
    const W_20: [f64; 20] = [
        0.017614007,
        0.04060143,
        0.062672048,
        0.083276742,
        0.10193012,
        0.118194532,
        0.131688638,
        0.142096109,
        0.149172986,
        0.152753387,
        0.152753387,
        0.149172986,
        0.142096109,
        0.131688638,
        0.118194532,
        0.10193012,
        0.083276742,
        0.062672048,
        0.04060143,
        0.017614007,
    ];

    #[test]
    fn glq_point_generation() {
        let (glq_points, glq_weights) = gauss_quadrature_points(20);

        for (glq_ref, glq_test) in X_20.iter().zip(glq_points.iter()) {
            assert!((glq_ref - glq_test).abs() < GLQ_ACCURACY);
        }

        for (glq_w_ref, glq_w_test) in W_20.iter().zip(glq_weights.iter()) {
            assert!((glq_w_ref - glq_w_test).abs() < GLQ_ACCURACY);
        }
    }

    #[test]
    fn polynomial_integrals_are_exact() {
        let solution = integrate(|x| x.powi(2), Interval::new(-1.0, 1.0), 1e-12);
        assert!((solution - 2.0 / 3.0).abs() < 1e-12);

        let solution = integrate(|x| 3.0 * x.powi(5) - x, Interval::new(0.0, 2.0), 1e-12);
        assert!((solution - 30.0).abs() < 1e-10);
    }

    #[test]
    fn kinked_integrands_converge() {
        // hat function centered at 1 over (0, 2)
        let hat = |x: f64| {
            if x < 1.0 {
                x
            } else {
                2.0 - x
            }
        };
        let solution = integrate(hat, Interval::new(0.0, 2.0), 1e-12);
        assert!((solution - 1.0).abs() < 1e-9);
    }

    #[test]
    fn oscillatory_integrands_converge() {
        let solution = integrate(f64::sin, Interval::new(0.0, std::f64::consts::PI), 1e-12);
        assert!((solution - 2.0).abs() < 1e-10);
    }

    #[test]
    fn semi_infinite_intervals_are_substituted() {
        let solution = integrate(
            |x: f64| (-x).exp(),
            Interval::new(0.0, f64::INFINITY),
            1e-12,
        );
        assert!((solution - 1.0).abs() < 1e-9);

        let solution = integrate(
            |x: f64| x.exp(),
            Interval::new(f64::NEG_INFINITY, 0.0),
            1e-12,
        );
        assert!((solution - 1.0).abs() < 1e-9);
    }

    #[test]
    fn degenerate_interval_is_zero() {
        assert_eq!(integrate(|x| x, Interval::new(3.0, 3.0), 1e-12), 0.0);
    }
}
