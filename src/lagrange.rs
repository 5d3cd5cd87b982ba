use crate::base::Base;
use crate::domain::{linspace, Domain, Interval};
use crate::errors::CoreError;
use crate::function::{Function, Handle};

/// A first-order Lagrange ("hat") fraction over the nodes
/// `start <= top <= end`.
///
/// The function is 1 at `top`, affine down to 0 at `start` and `end`, and
/// identically 0 outside `(start, end)`. Setting `start == top` or
/// `top == end` yields the half-hats used at interval boundaries. One
/// derivative handle (the piecewise-constant slope) is attached, so
/// nodal bases built from these fractions support `derive(1)`.
pub fn lagrange_first_order(start: f64, top: f64, end: f64) -> Function {
    let handle = Handle::scalar(move |x| {
        if x < start || x > end {
            0.0
        } else if x < top {
            (x - start) / (top - start)
        } else if x > top {
            (end - x) / (end - top)
        } else {
            1.0
        }
    });

    let slope = Handle::scalar(move |x| {
        if x < start || x > end {
            0.0
        } else if x < top {
            1.0 / (top - start)
        } else if x > top {
            -1.0 / (end - top)
        } else {
            // the kink itself has no defined slope; 0 keeps integrals exact
            0.0
        }
    });

    Function::with(
        handle,
        Domain::unbounded(),
        Some(Domain::from_bounds(start, end)),
        vec![slope],
    )
    .expect("scalar handles are not probed")
}

/// Discretize an interval into a first-order nodal (hat) basis.
///
/// Returns the `node_count` equidistant node locations and the matching
/// [Base]: half-hats at the two boundary nodes, full hats inside. Every
/// fraction is 1 at its own node and 0 at all others, so projecting a
/// function onto this base yields approximate nodal values.
///
/// ```
/// use galerkin_1d::domain::Interval;
/// use galerkin_1d::lagrange::cure_interval;
///
/// let (nodes, base) = cure_interval(Interval::new(0.0, 10.0), 11).unwrap();
/// assert_eq!(nodes.len(), 11);
/// assert_eq!(base.len(), 11);
/// assert!((nodes[3] - 3.0).abs() < 1e-12);
/// ```
pub fn cure_interval(
    interval: Interval,
    node_count: usize,
) -> Result<(Vec<f64>, Base), CoreError> {
    if node_count < 2 {
        return Err(CoreError::GridTooSmall { min: 2 });
    }
    let nodes = linspace(interval.start, interval.end, node_count);

    let mut functions = Vec::with_capacity(node_count);
    for i in 0..node_count {
        let start = nodes[i.saturating_sub(1)];
        let end = nodes[(i + 1).min(node_count - 1)];
        functions.push(lagrange_first_order(start, nodes[i], end));
    }

    Ok((nodes, Base::from_functions(functions)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACCURACY: f64 = 1e-12;

    #[test]
    fn hat_is_nodal() {
        let hat = lagrange_first_order(0.0, 1.0, 2.0);
        assert!((hat.call(1.0).unwrap() - 1.0).abs() < ACCURACY);
        assert!((hat.call(0.5).unwrap() - 0.5).abs() < ACCURACY);
        assert!((hat.call(1.5).unwrap() - 0.5).abs() < ACCURACY);
        assert!(hat.call(0.0).unwrap().abs() < ACCURACY);
        assert!(hat.call(2.0).unwrap().abs() < ACCURACY);
        assert!(hat.call(-1.0).unwrap().abs() < ACCURACY);
        assert!(hat.call(3.0).unwrap().abs() < ACCURACY);
    }

    #[test]
    fn half_hats_have_one_sided_slopes() {
        let left = lagrange_first_order(0.0, 0.0, 1.0);
        assert!((left.call(0.0).unwrap() - 1.0).abs() < ACCURACY);
        assert!((left.call(0.5).unwrap() - 0.5).abs() < ACCURACY);
        assert!(left.call(1.5).unwrap().abs() < ACCURACY);

        let right = lagrange_first_order(0.0, 1.0, 1.0);
        assert!((right.call(1.0).unwrap() - 1.0).abs() < ACCURACY);
        assert!((right.call(0.25).unwrap() - 0.25).abs() < ACCURACY);
    }

    #[test]
    fn derivative_handle_carries_the_slopes() {
        let hat = lagrange_first_order(0.0, 1.0, 2.0);
        let slope = hat.derive(1).unwrap();
        assert!((slope.call(0.5).unwrap() - 1.0).abs() < ACCURACY);
        assert!((slope.call(1.5).unwrap() + 1.0).abs() < ACCURACY);
        assert!(slope.call(3.0).unwrap().abs() < ACCURACY);
        // nothing beyond the first derivative is stored
        assert!(hat.derive(2).is_err());
    }

    #[test]
    fn cure_interval_produces_a_nodal_base() {
        let (nodes, base) = cure_interval(Interval::new(0.0, 10.0), 5).unwrap();
        assert_eq!(nodes, vec![0.0, 2.5, 5.0, 7.5, 10.0]);
        assert_eq!(base.len(), 5);

        // fraction i is 1 at node i and 0 at every other node
        for (i, fraction) in base.iter().enumerate() {
            let f = fraction.as_function().unwrap();
            for (j, &node) in nodes.iter().enumerate() {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!((f.call(node).unwrap() - expected).abs() < ACCURACY);
            }
        }
    }

    #[test]
    fn partition_of_unity() {
        let (_, base) = cure_interval(Interval::new(0.0, 1.0), 7).unwrap();
        for k in 0..50 {
            let x = k as f64 / 49.0;
            let total: f64 = base
                .iter()
                .map(|fr| fr.as_function().unwrap().call(x).unwrap())
                .sum();
            assert!((total - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn too_few_nodes_is_an_error() {
        assert!(cure_interval(Interval::new(0.0, 1.0), 1).is_err());
        assert!(cure_interval(Interval::new(0.0, 1.0), 0).is_err());
    }
}
