use crate::base::Base;
use crate::domain::Domain;
use crate::errors::CoreError;
use crate::function::{Fraction, Function};
use crate::integration::{integrate, DEFAULT_QUAD_TOL};
use nalgebra::DMatrix;
use rayon::prelude::*;

/// L2 inner product of two scalar functions.
///
/// The integration region is the intersection of both domains and both
/// supports; an empty intersection short-circuits to exactly `0.0` without
/// integrating. Each remaining sub-interval is integrated adaptively.
///
/// ```
/// use galerkin_1d::domain::Domain;
/// use galerkin_1d::function::{Function, Handle};
/// use galerkin_1d::product::dot_product_l2;
///
/// let f = Function::with(Handle::scalar(|_| 1.0), Domain::from_bounds(0.0, 10.0), None, vec![]).unwrap();
/// let g = Function::with(Handle::scalar(|_| 2.0), Domain::from_bounds(0.0, 5.0), None, vec![]).unwrap();
/// assert!((dot_product_l2(&f, &g) - 10.0).abs() < 1e-6);
/// ```
pub fn dot_product_l2(f: &Function, g: &Function) -> f64 {
    let region = common_region(f, g);
    region
        .intervals()
        .iter()
        .map(|&iv| integrate(|x| f.eval_raw(x) * g.eval_raw(x), iv, DEFAULT_QUAD_TOL))
        .sum()
}

fn common_region(f: &Function, g: &Function) -> Domain {
    f.domain()
        .intersect(g.domain())
        .intersect(f.nonzero())
        .intersect(g.nonzero())
}

/// Inner product of two fractions of the same kind.
///
/// Scalar fractions reduce to [dot_product_l2]. Vectorial fractions reduce
/// to the sum of member-wise scalar products. Mixing kinds (or member
/// counts) is a `Type` error.
pub fn fraction_dot_product_l2(a: &Fraction, b: &Fraction) -> Result<f64, CoreError> {
    match (a, b) {
        (Fraction::Scalar(f), Fraction::Scalar(g)) => Ok(dot_product_l2(f, g)),
        (Fraction::Vectorial(fs), Fraction::Vectorial(gs)) if fs.len() == gs.len() => Ok(fs
            .iter()
            .zip(gs.iter())
            .map(|(f, g)| dot_product_l2(f, g))
            .sum()),
        _ => Err(CoreError::MixedFractionKinds),
    }
}

/// Build the dense matrix `M[i, j] = product(base_a[i], base_b[j])`.
///
/// With `optimize` set and both arguments referring to the *same* base
/// object, only the upper triangle is computed and mirrored; this assumes a
/// symmetric `product` and is purely a cost optimization. The general path
/// computes every cell independently, with rows filled in parallel; both
/// paths produce identical results for symmetric products.
pub fn calculate_scalar_product_matrix<F>(
    product: F,
    base_a: &Base,
    base_b: &Base,
    optimize: bool,
) -> Result<DMatrix<f64>, CoreError>
where
    F: Fn(&Fraction, &Fraction) -> Result<f64, CoreError> + Sync,
{
    let n = base_a.len();
    let m = base_b.len();

    if optimize && std::ptr::eq(base_a, base_b) {
        let mut matrix = DMatrix::zeros(n, n);
        for i in 0..n {
            for j in i..n {
                let value = product(&base_a[i], &base_b[j])?;
                matrix[(i, j)] = value;
                matrix[(j, i)] = value;
            }
        }
        return Ok(matrix);
    }

    let rows: Vec<Vec<f64>> = base_a
        .fractions()
        .par_iter()
        .map(|fa| {
            base_b
                .fractions()
                .iter()
                .map(|fb| product(fa, fb))
                .collect::<Result<Vec<f64>, CoreError>>()
        })
        .collect::<Result<Vec<Vec<f64>>, CoreError>>()?;

    Ok(DMatrix::from_fn(n, m, |i, j| rows[i][j]))
}
