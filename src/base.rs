use crate::errors::CoreError;
use crate::function::{Fraction, Function};
use std::ops::Index;

/// An ordered collection of same-kind fractions spanning an approximation
/// subspace.
///
/// `derive` and `scale` map over every member independently and return a new
/// `Base`; member-level failures propagate unchanged.
#[derive(Clone, Debug, PartialEq)]
pub struct Base {
    fractions: Vec<Fraction>,
}

impl Base {
    /// Build a base from an ordered list of fractions.
    ///
    /// The list must be non-empty and homogeneous: all fractions of the same
    /// variant, and (for vectorial fractions) with the same member count.
    pub fn new(fractions: Vec<Fraction>) -> Result<Self, CoreError> {
        let first = fractions.first().ok_or(CoreError::EmptyBase)?;
        if !fractions.iter().all(|f| first.same_kind(f)) {
            return Err(CoreError::MixedFractionKinds);
        }
        Ok(Self { fractions })
    }

    /// A base holding a single fraction.
    pub fn from_fraction(fraction: Fraction) -> Self {
        Self {
            fractions: vec![fraction],
        }
    }

    /// Convenience constructor for the common scalar-function case.
    pub fn from_functions(functions: Vec<Function>) -> Result<Self, CoreError> {
        Self::new(functions.into_iter().map(Fraction::Scalar).collect())
    }

    pub fn len(&self) -> usize {
        self.fractions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fractions.is_empty()
    }

    pub fn fractions(&self) -> &[Fraction] {
        &self.fractions
    }

    pub fn iter(&self) -> std::slice::Iter<Fraction> {
        self.fractions.iter()
    }

    /// Derive every fraction; any member failure propagates.
    pub fn derive(&self, order: usize) -> Result<Self, CoreError> {
        Ok(Self {
            fractions: self
                .fractions
                .iter()
                .map(|f| f.derive(order))
                .collect::<Result<_, _>>()?,
        })
    }

    /// Scale every fraction by the same constant.
    pub fn scale(&self, factor: f64) -> Self {
        Self {
            fractions: self.fractions.iter().map(|f| f.scale(factor)).collect(),
        }
    }

    /// Scale every fraction by the same callable.
    ///
    /// Like [Fraction::scale_with], the members of the result carry no
    /// derivative handles.
    pub fn scale_with(&self, factor: impl Fn(f64) -> f64 + Send + Sync + 'static) -> Self {
        let factor = std::sync::Arc::new(factor);
        Self {
            fractions: self
                .fractions
                .iter()
                .map(|f| {
                    let factor = factor.clone();
                    f.scale_with(move |x| factor(x))
                })
                .collect(),
        }
    }

    pub(crate) fn from_fractions_unchecked(fractions: Vec<Fraction>) -> Self {
        Self { fractions }
    }
}

impl Index<usize> for Base {
    type Output = Fraction;

    fn index(&self, idx: usize) -> &Fraction {
        &self.fractions[idx]
    }
}
