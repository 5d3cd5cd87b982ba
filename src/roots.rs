use crate::errors::CoreError;
use nalgebra::{DMatrix, DVector};
use num_complex::Complex64;

const MAX_ITERATIONS: usize = 100;
const STEP_TOL: f64 = 1e-14;
const HULL_SLACK: f64 = 1e-8;

/// Find the `n_roots` smallest real roots of a scalar function.
///
/// The function is sampled over `grid`; sign-change brackets are polished
/// by bisection and, to also catch roots sitting on grid points or at the
/// grid boundary, a secant iteration is started from every sample. Refined
/// roots outside the grid hull are discarded, duplicates closer than `rtol`
/// collapse to one representative, and the survivors are sorted ascending.
/// Non-finite grid entries and fewer than `n_roots` distinct roots are hard
/// `Value` errors.
///
/// ```
/// use galerkin_1d::domain::linspace;
/// use galerkin_1d::roots::find_roots;
///
/// let grid = linspace(0.0, 7.0, 30);
/// let roots = find_roots(f64::sin, &grid, 3, 0.1).unwrap();
/// assert!(roots[0].abs() < 1e-9);
/// assert!((roots[1] - std::f64::consts::PI).abs() < 1e-9);
/// ```
pub fn find_roots<F: Fn(f64) -> f64>(
    function: F,
    grid: &[f64],
    n_roots: usize,
    rtol: f64,
) -> Result<Vec<f64>, CoreError> {
    if grid.iter().any(|x| !x.is_finite()) {
        return Err(CoreError::GridNotFinite);
    }
    let mut points = grid.to_vec();
    points.sort_by(|a, b| a.partial_cmp(b).unwrap());

    if points.is_empty() {
        return Err(CoreError::TooFewRoots {
            found: 0,
            requested: n_roots,
        });
    }
    let lo = points[0];
    let hi = points[points.len() - 1];

    let values: Vec<f64> = points.iter().map(|&x| function(x)).collect();
    let scale = values.iter().fold(0f64, |acc, v| acc.max(v.abs()));
    let accept = 1e-9 * scale.max(1.0);

    let mut candidates = Vec::new();
    for i in 0..points.len() {
        if values[i] == 0.0 {
            candidates.push(points[i]);
        } else if i + 1 < points.len() && values[i] * values[i + 1] < 0.0 {
            candidates.push(bisect(&function, points[i], points[i + 1]));
        }
    }
    for &p in &points {
        if let Some(root) = secant(&function, p) {
            candidates.push(root);
        }
    }

    let slack = HULL_SLACK * (1.0 + hi.abs().max(lo.abs()));
    let mut roots: Vec<f64> = candidates
        .into_iter()
        .filter_map(|r| clamp_into_hull(r, lo, hi, slack))
        .filter(|&r| function(r).abs() <= accept)
        .collect();
    roots.sort_by(|a, b| a.partial_cmp(b).unwrap());
    roots.dedup_by(|b, a| (*b - *a).abs() < rtol);

    if roots.len() < n_roots {
        return Err(CoreError::TooFewRoots {
            found: roots.len(),
            requested: n_roots,
        });
    }
    roots.truncate(n_roots);
    Ok(roots)
}

/// Find `n_roots` vector-valued roots of a multi-dimensional function.
///
/// The search grid is the Cartesian product of the per-axis grids. A damped
/// Newton iteration with a forward-difference Jacobian is started from
/// every grid node; converged roots are kept when they fall inside the
/// per-axis hulls. Deduplication uses Euclidean distance against `rtol`;
/// the result is sorted lexicographically.
pub fn find_roots_nd<F: Fn(&[f64]) -> Vec<f64>>(
    function: F,
    grids: &[Vec<f64>],
    n_roots: usize,
    rtol: f64,
) -> Result<Vec<Vec<f64>>, CoreError> {
    let dims = grids.len();
    if dims == 0 || grids.iter().any(|axis| axis.is_empty()) {
        return Err(CoreError::TooFewRoots {
            found: 0,
            requested: n_roots,
        });
    }
    if grids.iter().flatten().any(|x| !x.is_finite()) {
        return Err(CoreError::GridNotFinite);
    }

    let bounds: Vec<(f64, f64)> = grids
        .iter()
        .map(|axis| {
            let lo = axis.iter().cloned().fold(f64::INFINITY, f64::min);
            let hi = axis.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            (lo, hi)
        })
        .collect();

    let mut roots: Vec<Vec<f64>> = Vec::new();
    let mut indices = vec![0usize; dims];
    loop {
        let start: Vec<f64> = indices
            .iter()
            .enumerate()
            .map(|(axis, &i)| grids[axis][i])
            .collect();

        if let Some(root) = newton_nd(&function, &start) {
            let clamped: Option<Vec<f64>> = root
                .iter()
                .zip(bounds.iter())
                .map(|(&x, &(lo, hi))| {
                    let slack = HULL_SLACK * (1.0 + hi.abs().max(lo.abs()));
                    clamp_into_hull(x, lo, hi, slack)
                })
                .collect();
            if let Some(root) = clamped {
                let distinct = roots
                    .iter()
                    .all(|kept| euclidean_distance(kept, &root) >= rtol);
                if distinct {
                    roots.push(root);
                }
            }
        }

        // odometer over the Cartesian product
        let mut axis = 0;
        loop {
            indices[axis] += 1;
            if indices[axis] < grids[axis].len() {
                break;
            }
            indices[axis] = 0;
            axis += 1;
            if axis == dims {
                break;
            }
        }
        if axis == dims {
            break;
        }
    }

    if roots.len() < n_roots {
        return Err(CoreError::TooFewRoots {
            found: roots.len(),
            requested: n_roots,
        });
    }
    roots.sort_by(|a, b| {
        a.iter()
            .zip(b.iter())
            .find_map(|(x, y)| match x.partial_cmp(y).unwrap() {
                std::cmp::Ordering::Equal => None,
                ord => Some(ord),
            })
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    roots.truncate(n_roots);
    Ok(roots)
}

/// Find `n_roots` complex roots of a holomorphic function.
///
/// The grid is the Cartesian product of a real-part and an imaginary-part
/// axis. A complex secant iteration runs from every node; converged roots
/// must land inside the rectangle spanned by the two axes. Deduplication
/// compares moduli of differences against `rtol`; the result is sorted by
/// real part, then imaginary part.
pub fn find_roots_complex<F: Fn(Complex64) -> Complex64>(
    function: F,
    re_grid: &[f64],
    im_grid: &[f64],
    n_roots: usize,
    rtol: f64,
) -> Result<Vec<Complex64>, CoreError> {
    if re_grid.is_empty() || im_grid.is_empty() {
        return Err(CoreError::TooFewRoots {
            found: 0,
            requested: n_roots,
        });
    }
    if re_grid.iter().chain(im_grid).any(|x| !x.is_finite()) {
        return Err(CoreError::GridNotFinite);
    }
    let re_bounds = (
        re_grid.iter().cloned().fold(f64::INFINITY, f64::min),
        re_grid.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
    );
    let im_bounds = (
        im_grid.iter().cloned().fold(f64::INFINITY, f64::min),
        im_grid.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
    );

    let mut roots: Vec<Complex64> = Vec::new();
    for &re in re_grid {
        for &im in im_grid {
            if let Some(root) = secant_complex(&function, Complex64::new(re, im)) {
                if function(root).norm() > 1e-9 {
                    continue;
                }
                let re_slack = HULL_SLACK * (1.0 + re_bounds.1.abs().max(re_bounds.0.abs()));
                let im_slack = HULL_SLACK * (1.0 + im_bounds.1.abs().max(im_bounds.0.abs()));
                let clamped_re = clamp_into_hull(root.re, re_bounds.0, re_bounds.1, re_slack);
                let clamped_im = clamp_into_hull(root.im, im_bounds.0, im_bounds.1, im_slack);
                if let (Some(re), Some(im)) = (clamped_re, clamped_im) {
                    let root = Complex64::new(re, im);
                    if roots.iter().all(|kept| (kept - root).norm() >= rtol) {
                        roots.push(root);
                    }
                }
            }
        }
    }

    if roots.len() < n_roots {
        return Err(CoreError::TooFewRoots {
            found: roots.len(),
            requested: n_roots,
        });
    }
    roots.sort_by(|a, b| {
        a.re.partial_cmp(&b.re)
            .unwrap()
            .then(a.im.partial_cmp(&b.im).unwrap())
    });
    roots.truncate(n_roots);
    Ok(roots)
}

/// Cast a complex value to its real part, failing when the imaginary part
/// is too significant to discard.
pub fn real(value: Complex64) -> Result<f64, CoreError> {
    let tol = 1e-14 * value.re.abs().max(1.0);
    if value.im.abs() > tol {
        Err(CoreError::ComplexResidue { imag: value.im })
    } else {
        Ok(value.re)
    }
}

/// Keep a refined root inside `[lo, hi]`, snapping values within `slack`
/// of a boundary onto it and rejecting anything further out.
fn clamp_into_hull(x: f64, lo: f64, hi: f64, slack: f64) -> Option<f64> {
    if x >= lo && x <= hi {
        Some(x)
    } else if x < lo && lo - x <= slack {
        Some(lo)
    } else if x > hi && x - hi <= slack {
        Some(hi)
    } else {
        None
    }
}

fn euclidean_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

/// Bisection over a sign-change bracket; converges unconditionally.
fn bisect<F: Fn(f64) -> f64>(function: &F, mut a: f64, mut b: f64) -> f64 {
    let mut fa = function(a);
    for _ in 0..200 {
        let mid = 0.5 * (a + b);
        if mid == a || mid == b {
            break;
        }
        let fm = function(mid);
        if fm == 0.0 {
            return mid;
        }
        if fa * fm < 0.0 {
            b = mid;
        } else {
            a = mid;
            fa = fm;
        }
    }
    0.5 * (a + b)
}

/// Secant iteration from a single starting point; `None` when it diverges
/// or fails to settle.
fn secant<F: Fn(f64) -> f64>(function: &F, x0: f64) -> Option<f64> {
    let mut x_prev = x0;
    let mut x = x0 + 1e-4 * (1.0 + x0.abs());
    let mut f_prev = function(x_prev);
    let mut f = function(x);

    for _ in 0..MAX_ITERATIONS {
        let denom = f - f_prev;
        if denom == 0.0 || !denom.is_finite() {
            return None;
        }
        let x_next = x - f * (x - x_prev) / denom;
        if !x_next.is_finite() {
            return None;
        }
        if (x_next - x).abs() <= STEP_TOL * (1.0 + x_next.abs()) {
            return Some(x_next);
        }
        x_prev = x;
        f_prev = f;
        x = x_next;
        f = function(x);
    }
    None
}

fn secant_complex<F: Fn(Complex64) -> Complex64>(function: &F, z0: Complex64) -> Option<Complex64> {
    let offset = Complex64::new(1e-4 * (1.0 + z0.norm()), 1e-4);
    let mut z_prev = z0;
    let mut z = z0 + offset;
    let mut f_prev = function(z_prev);
    let mut f = function(z);

    for _ in 0..MAX_ITERATIONS {
        let denom = f - f_prev;
        if denom.norm() == 0.0 || !denom.norm().is_finite() {
            return None;
        }
        let z_next = z - f * (z - z_prev) / denom;
        if !z_next.norm().is_finite() {
            return None;
        }
        if (z_next - z).norm() <= STEP_TOL * (1.0 + z_next.norm()) {
            return Some(z_next);
        }
        z_prev = z;
        f_prev = f;
        z = z_next;
        f = function(z);
    }
    None
}

/// Damped Newton iteration with a forward-difference Jacobian.
fn newton_nd<F: Fn(&[f64]) -> Vec<f64>>(function: &F, start: &[f64]) -> Option<Vec<f64>> {
    let dims = start.len();
    let mut x = DVector::from_column_slice(start);

    for _ in 0..MAX_ITERATIONS {
        let fx = DVector::from_vec(function(x.as_slice()));
        if fx.len() != dims {
            return None;
        }
        if fx.norm() <= 1e-12 {
            return Some(x.as_slice().to_vec());
        }

        let mut jacobian = DMatrix::zeros(dims, dims);
        for j in 0..dims {
            let h = 1e-7 * (1.0 + x[j].abs());
            let mut shifted = x.clone();
            shifted[j] += h;
            let f_shifted = DVector::from_vec(function(shifted.as_slice()));
            for i in 0..dims {
                jacobian[(i, j)] = (f_shifted[i] - fx[i]) / h;
            }
        }

        let step = jacobian.lu().solve(&fx)?;
        if !step.iter().all(|v| v.is_finite()) {
            return None;
        }
        let new_x = &x - &step;
        if step.norm() <= STEP_TOL * (1.0 + new_x.norm()) {
            let residual = DVector::from_vec(function(new_x.as_slice()));
            if residual.norm() <= 1e-9 {
                return Some(new_x.as_slice().to_vec());
            }
            return None;
        }
        x = new_x;
    }
    None
}
