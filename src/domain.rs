use crate::errors::CoreError;
use smallvec::{smallvec, SmallVec};

/// A closed interval on the real line with `start <= end`.
///
/// Both bounds may be infinite. Intervals are plain geometric values; the
/// ordering invariants of interval *lists* live in [Domain] and
/// [domain_intersection].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub start: f64,
    pub end: f64,
}

impl Interval {
    /// Build an interval, swapping the bounds if they were given in
    /// descending order.
    pub fn new(a: f64, b: f64) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    /// Build an interval, rejecting bounds in descending order.
    pub fn checked(start: f64, end: f64) -> Result<Self, CoreError> {
        if start > end {
            Err(CoreError::IntervalNotSorted { start, end })
        } else {
            Ok(Self { start, end })
        }
    }

    /// The full real line.
    pub fn unbounded() -> Self {
        Self {
            start: f64::NEG_INFINITY,
            end: f64::INFINITY,
        }
    }

    pub fn length(&self) -> f64 {
        self.end - self.start
    }

    pub fn contains(&self, x: f64) -> bool {
        x >= self.start && x <= self.end
    }

    pub fn is_finite(&self) -> bool {
        self.start.is_finite() && self.end.is_finite()
    }
}

impl From<(f64, f64)> for Interval {
    fn from((a, b): (f64, f64)) -> Self {
        Self::new(a, b)
    }
}

/// Verify that an interval list is usable: every interval sorted, the list
/// strictly ascending with positive gaps (no overlapping and no touching
/// entries).
fn check_intervals(intervals: &[Interval]) -> Result<(), CoreError> {
    for iv in intervals {
        if iv.start > iv.end {
            return Err(CoreError::IntervalNotSorted {
                start: iv.start,
                end: iv.end,
            });
        }
    }
    for pair in intervals.windows(2) {
        if pair[0].end >= pair[1].start {
            return Err(CoreError::IntervalsNotAscending);
        }
    }
    Ok(())
}

/// Intersect two interval lists.
///
/// Both lists must be sorted and strictly ascending (see [Domain]); a
/// violated ordering is a `Value` error. The result contains one interval
/// `(max(starts), min(ends))` for every pair with positive-length overlap.
/// Pairs that merely touch at a shared boundary point contribute nothing.
///
/// ```
/// use galerkin_1d::domain::{domain_intersection, Interval};
///
/// let overlap = domain_intersection(
///     &[Interval::new(0.0, 2.0)],
///     &[Interval::new(1.0, 3.0)],
/// ).unwrap();
/// assert_eq!(overlap, vec![Interval::new(1.0, 2.0)]);
///
/// // touching intervals have a zero-length intersection, which is excluded
/// let touching = domain_intersection(
///     &[Interval::new(0.0, 1.0)],
///     &[Interval::new(1.0, 3.0)],
/// ).unwrap();
/// assert!(touching.is_empty());
/// ```
pub fn domain_intersection(
    first: &[Interval],
    second: &[Interval],
) -> Result<Vec<Interval>, CoreError> {
    check_intervals(first)?;
    check_intervals(second)?;

    let mut overlaps = Vec::new();
    for a in first {
        for b in second {
            let start = a.start.max(b.start);
            let end = a.end.min(b.end);
            if start < end {
                overlaps.push(Interval { start, end });
            }
        }
    }
    Ok(overlaps)
}

/// An ordered set of non-overlapping, non-touching intervals.
///
/// Constructors normalize their input (descending bounds are swapped, the
/// list is sorted, exact duplicates are dropped) but never merge distinct
/// intervals; inputs that still overlap or touch after normalization are a
/// `Value` error. A `Domain` is immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Domain {
    intervals: SmallVec<[Interval; 2]>,
}

impl Domain {
    /// Build a domain from any iterable of intervals, normalizing order.
    pub fn new(intervals: impl IntoIterator<Item = Interval>) -> Result<Self, CoreError> {
        let mut sorted: SmallVec<[Interval; 2]> = intervals.into_iter().collect();
        sorted.sort_by(|a, b| {
            a.start
                .partial_cmp(&b.start)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        sorted.dedup();
        check_intervals(&sorted)?;
        Ok(Self { intervals: sorted })
    }

    /// A domain made of a single interval (bounds swapped if descending).
    pub fn from_bounds(a: f64, b: f64) -> Self {
        Self {
            intervals: smallvec![Interval::new(a, b)],
        }
    }

    /// The full real line.
    pub fn unbounded() -> Self {
        Self {
            intervals: smallvec![Interval::unbounded()],
        }
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn contains(&self, x: f64) -> bool {
        self.intervals.iter().any(|iv| iv.contains(x))
    }

    /// Intersect with another domain.
    ///
    /// Infallible: both operands already satisfy the ordering invariant.
    pub fn intersect(&self, other: &Domain) -> Domain {
        let overlaps =
            domain_intersection(&self.intervals, &other.intervals).unwrap_or_default();
        Domain {
            intervals: overlaps.into_iter().collect(),
        }
    }

    /// Sum of all interval lengths.
    pub fn total_length(&self) -> f64 {
        self.intervals.iter().map(Interval::length).sum()
    }
}

/// `n` equidistant points spanning `[start, end]` inclusive.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n).map(|i| start + step * i as f64).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrong_arguments_are_rejected() {
        // interval bounds not sorted
        assert!(domain_intersection(
            &[Interval { start: 3.0, end: 2.0 }],
            &[Interval::new(1.0, 3.0)]
        )
        .is_err());
        // interval list not sorted
        assert!(domain_intersection(
            &[Interval::new(4.0, 5.0), Interval::new(1.0, 2.0)],
            &[Interval::new(1.0, 3.0)]
        )
        .is_err());
        // touching intervals in one list
        assert!(domain_intersection(
            &[Interval::new(4.0, 5.0), Interval::new(5.0, 6.0)],
            &[Interval::new(1.0, 3.0)]
        )
        .is_err());
    }

    #[test]
    fn easy_intersections() {
        let single = |a, b, c, d| {
            domain_intersection(&[Interval::new(a, b)], &[Interval::new(c, d)]).unwrap()
        };
        assert_eq!(single(0.0, 2.0, 1.0, 3.0), vec![Interval::new(1.0, 2.0)]);
        assert_eq!(single(0.0, 1.0, 1.0, 3.0), vec![]);
        assert_eq!(single(3.0, 5.0, 1.0, 3.0), vec![]);
        assert_eq!(single(3.0, 5.0, 1.0, 4.0), vec![Interval::new(3.0, 4.0)]);
        assert_eq!(single(3.0, 5.0, 1.0, 6.0), vec![Interval::new(3.0, 5.0)]);
        assert_eq!(single(3.0, 5.0, 6.0, 7.0), vec![]);
    }

    #[test]
    fn complex_intersections() {
        let intersection = domain_intersection(
            &[Interval::new(0.0, 2.0), Interval::new(3.0, 5.0)],
            &[Interval::new(1.0, 4.0)],
        )
        .unwrap();
        assert_eq!(
            intersection,
            vec![Interval::new(1.0, 2.0), Interval::new(3.0, 4.0)]
        );

        let intersection = domain_intersection(
            &[Interval::new(1.0, 3.0), Interval::new(4.0, 6.0)],
            &[Interval::new(0.0, 2.0), Interval::new(3.0, 5.0)],
        )
        .unwrap();
        assert_eq!(
            intersection,
            vec![Interval::new(1.0, 2.0), Interval::new(4.0, 5.0)]
        );

        let intersection = domain_intersection(
            &[
                Interval::new(-10.0, -4.0),
                Interval::new(2.0, 5.0),
                Interval::new(10.0, 17.0),
            ],
            &[
                Interval::new(-20.0, -5.0),
                Interval::new(3.0, 5.0),
                Interval::new(7.0, 23.0),
            ],
        )
        .unwrap();
        assert_eq!(
            intersection,
            vec![
                Interval::new(-10.0, -5.0),
                Interval::new(3.0, 5.0),
                Interval::new(10.0, 17.0),
            ]
        );
    }

    #[test]
    fn intersection_is_commutative() {
        let a = [Interval::new(1.0, 3.0), Interval::new(4.0, 6.0)];
        let b = [Interval::new(0.0, 2.0), Interval::new(3.0, 5.0)];
        assert_eq!(
            domain_intersection(&a, &b).unwrap(),
            domain_intersection(&b, &a).unwrap()
        );
    }

    #[test]
    fn constructor_normalizes_ordering() {
        let d = Domain::from_bounds(0.0, -10.0);
        assert_eq!(d.intervals(), &[Interval::new(-10.0, 0.0)]);

        let d = Domain::new([Interval::new(5.0, 0.0), Interval::new(-10.0, -5.0)]).unwrap();
        assert_eq!(
            d.intervals(),
            &[Interval::new(-10.0, -5.0), Interval::new(0.0, 5.0)]
        );

        // duplicates collapse, touching entries do not
        let d = Domain::new([Interval::new(0.0, 1.0), Interval::new(0.0, 1.0)]).unwrap();
        assert_eq!(d.intervals().len(), 1);
        assert!(Domain::new([Interval::new(0.0, 1.0), Interval::new(1.0, 2.0)]).is_err());
    }

    #[test]
    fn containment_and_length() {
        let d = Domain::new([Interval::new(0.0, 1.0), Interval::new(2.0, 4.0)]).unwrap();
        assert!(d.contains(0.5));
        assert!(d.contains(2.0));
        assert!(!d.contains(1.5));
        assert!((d.total_length() - 3.0).abs() < 1e-14);

        assert!(Domain::unbounded().contains(1e300));
    }

    #[test]
    fn linspace_spans_inclusive() {
        let pts = linspace(0.0, 10.0, 11);
        assert_eq!(pts.len(), 11);
        assert!((pts[0] - 0.0).abs() < 1e-14);
        assert!((pts[10] - 10.0).abs() < 1e-14);
        assert!((pts[3] - 3.0).abs() < 1e-14);
    }
}
