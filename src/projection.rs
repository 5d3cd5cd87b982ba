use crate::base::Base;
use crate::domain::Domain;
use crate::errors::CoreError;
use crate::function::{Fraction, Function, Handle};
use crate::product::{calculate_scalar_product_matrix, dot_product_l2, fraction_dot_product_l2};
use nalgebra::{DMatrix, DVector};

/// Products below this magnitude are treated as orthogonality.
const ORTHOGONALITY_EPS: f64 = 1e-10;

/// Project a function onto a base, returning one weight per fraction.
///
/// Solves the normal equations `Gram(base, base) * w = rhs` with
/// `rhs[i] = <function, base[i]>`. Every fraction must be a scalar
/// [Function] (`Type` error otherwise); a singular Gram matrix is a `Value`
/// error. When `function` coincides with a member of a nodal base, the
/// weights reproduce its nodal values exactly.
pub fn project_on_base(function: &Function, base: &Base) -> Result<DVector<f64>, CoreError> {
    let members = scalar_members(base)?;

    let rhs = DVector::from_iterator(
        members.len(),
        members.iter().map(|g| dot_product_l2(function, g)),
    );
    let gram = calculate_scalar_product_matrix(fraction_dot_product_l2, base, base, true)?;

    solve_gram(gram, rhs)
}

/// Expand a weight vector back into a callable `sum_i w[i] * base[i](x)`.
///
/// The result is a [Function] over the intersection of the member domains,
/// with no derivative handles of its own; derive the base first and
/// back-project from that when the derivative expansion is needed.
pub fn back_project_from_base(weights: &[f64], base: &Base) -> Result<Function, CoreError> {
    if weights.len() != base.len() {
        return Err(CoreError::WeightCount {
            weights: weights.len(),
            fractions: base.len(),
        });
    }
    let members: Vec<Function> = scalar_members(base)?.into_iter().cloned().collect();
    let weights = weights.to_vec();

    let domain = members
        .iter()
        .skip(1)
        .fold(members[0].domain().clone(), |acc, f| {
            acc.intersect(f.domain())
        });

    let handle = Handle::scalar(move |x| {
        weights
            .iter()
            .zip(members.iter())
            .map(|(w, f)| w * f.eval_raw(x))
            .sum()
    });

    Ok(Function::with(handle, domain, None, Vec::new()).expect("scalar handles are not probed"))
}

/// Re-express a weight vector given in `src_base` in terms of `dst_base`.
///
/// Composes [back_project_from_base] and [project_on_base]; type errors
/// from either primitive propagate unchanged.
pub fn change_projection_base(
    weights: &[f64],
    src_base: &Base,
    dst_base: &Base,
) -> Result<DVector<f64>, CoreError> {
    let expanded = back_project_from_base(weights, src_base)?;
    project_on_base(&expanded, dst_base)
}

/// Rescale `base_a` (and jointly `base_b`, if given) so that the pairwise
/// products `<a[i], b[i]>` all become 1.
///
/// With no second base, each fraction is normalized against itself. Both
/// sides are scaled by the same factor `1/sqrt(p)`, which requires every
/// product to be finite and strictly positive: orthogonal pairs (zero
/// product) and sign-incompatible pairs are a `Value` error, as is a size
/// mismatch between the two bases.
pub fn normalize_base(
    base_a: &Base,
    base_b: Option<&Base>,
) -> Result<(Base, Option<Base>), CoreError> {
    if let Some(b) = base_b {
        if b.len() != base_a.len() {
            return Err(CoreError::BaseSize {
                a: base_a.len(),
                b: b.len(),
            });
        }
    }

    let mut scales = Vec::with_capacity(base_a.len());
    for (i, fraction_a) in base_a.iter().enumerate() {
        let partner = base_b.map_or(fraction_a, |b| &b[i]);
        let product = fraction_dot_product_l2(fraction_a, partner)?;
        // quadrature leaves orthogonal pairs at roundoff level, not at 0
        if !product.is_finite() || product < ORTHOGONALITY_EPS {
            return Err(CoreError::CannotNormalize { product });
        }
        scales.push(1.0 / product.sqrt());
    }

    let scaled_a = Base::from_fractions_unchecked(
        base_a
            .iter()
            .zip(scales.iter())
            .map(|(fraction, &s)| fraction.scale(s))
            .collect(),
    );
    let scaled_b = base_b.map(|b| {
        Base::from_fractions_unchecked(
            b.iter()
                .zip(scales.iter())
                .map(|(fraction, &s)| fraction.scale(s))
                .collect(),
        )
    });

    Ok((scaled_a, scaled_b))
}

fn scalar_members(base: &Base) -> Result<Vec<&Function>, CoreError> {
    base.iter().map(Fraction::as_function).collect()
}

fn solve_gram(gram: DMatrix<f64>, rhs: DVector<f64>) -> Result<DVector<f64>, CoreError> {
    // Gram matrices of independent fractions are symmetric positive
    // definite; fall back to LU when Cholesky rejects the decomposition
    if let Some(cholesky) = gram.clone().cholesky() {
        Ok(cholesky.solve(&rhs))
    } else {
        gram.lu().solve(&rhs).ok_or(CoreError::SingularGram)
    }
}
