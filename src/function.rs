use crate::domain::Domain;
use crate::errors::CoreError;
use std::fmt;
use std::sync::Arc;

/// Shared scalar callable.
pub type ScalarFn = Arc<dyn Fn(f64) -> f64 + Send + Sync>;
/// Shared array-valued callable (one output per input point).
pub type ArrayFn = Arc<dyn Fn(&[f64]) -> Vec<f64> + Send + Sync>;

/// A callable payload, classified once as element-wise or vectorized.
///
/// The classification is part of the type and fixed at construction; call
/// sites never re-inspect the handle. `Array` handles are probed when a
/// [Function] is built: a handle that returns a differently-shaped result
/// than its input is rejected with a `Type` error.
#[derive(Clone)]
pub enum Handle {
    Scalar(ScalarFn),
    Array(ArrayFn),
}

impl Handle {
    pub fn scalar(f: impl Fn(f64) -> f64 + Send + Sync + 'static) -> Self {
        Self::Scalar(Arc::new(f))
    }

    pub fn array(f: impl Fn(&[f64]) -> Vec<f64> + Send + Sync + 'static) -> Self {
        Self::Array(Arc::new(f))
    }

    pub fn is_vectorial(&self) -> bool {
        matches!(self, Self::Array(_))
    }

    pub(crate) fn eval(&self, x: f64) -> f64 {
        match self {
            Self::Scalar(f) => f(x),
            Self::Array(f) => f(&[x])[0],
        }
    }

    pub(crate) fn eval_slice(&self, xs: &[f64]) -> Vec<f64> {
        match self {
            Self::Scalar(f) => xs.iter().map(|&x| f(x)).collect(),
            Self::Array(f) => f(xs),
        }
    }

    /// Identity comparison; two handles are equal when they share a callable.
    fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Scalar(a), Self::Scalar(b)) => Arc::ptr_eq(a, b),
            (Self::Array(a), Self::Array(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Wrap into a new handle scaled by a constant.
    fn scaled(&self, factor: f64) -> Self {
        match self {
            Self::Scalar(f) => {
                let f = f.clone();
                Self::scalar(move |x| factor * f(x))
            }
            Self::Array(f) => {
                let f = f.clone();
                Self::array(move |xs| f(xs).into_iter().map(|y| factor * y).collect())
            }
        }
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Scalar(_) => write!(f, "Handle::Scalar(..)"),
            Self::Array(_) => write!(f, "Handle::Array(..)"),
        }
    }
}

/// A scalar-valued function with domain, support and derivative metadata.
///
/// The unit of every basis in this crate. A `Function` owns:
/// * a [Handle] for evaluation,
/// * an ordered list of derivative handles (1st, 2nd, ...),
/// * a `domain` outside of which evaluation is a `Value` error,
/// * a `nonzero` domain (compact support); evaluation outside it is allowed
///   but emits a debug-level event, since it usually indicates a
///   miscomputed support.
///
/// All transformations (`derive`, `scale`, `raise_to`) return new objects;
/// a `Function` is never mutated in place.
#[derive(Clone)]
pub struct Function {
    handle: Handle,
    derivatives: Vec<Handle>,
    domain: Domain,
    nonzero: Domain,
}

impl Function {
    /// A function over the full real line with no derivative information.
    pub fn new(handle: Handle) -> Result<Self, CoreError> {
        Self::with(handle, Domain::unbounded(), None, Vec::new())
    }

    /// Full constructor. `nonzero` defaults to `domain` when absent.
    ///
    /// `Array` handles are probed with a two-point array drawn from the
    /// domain; a result of any other length is a `Type` error.
    pub fn with(
        handle: Handle,
        domain: Domain,
        nonzero: Option<Domain>,
        derivatives: Vec<Handle>,
    ) -> Result<Self, CoreError> {
        if let Handle::Array(f) = &handle {
            let p = probe_point(&domain);
            let out = f(&[p, p]);
            if out.len() != 2 {
                return Err(CoreError::HandleShape {
                    expected: 2,
                    got: out.len(),
                });
            }
        }
        let nonzero = nonzero.unwrap_or_else(|| domain.clone());
        Ok(Self {
            handle,
            derivatives,
            domain,
            nonzero,
        })
    }

    /// Convenience constructor around an element-wise closure.
    pub fn from_scalar_fn(f: impl Fn(f64) -> f64 + Send + Sync + 'static) -> Self {
        Self {
            handle: Handle::scalar(f),
            derivatives: Vec::new(),
            domain: Domain::unbounded(),
            nonzero: Domain::unbounded(),
        }
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    pub fn nonzero(&self) -> &Domain {
        &self.nonzero
    }

    pub fn is_vectorial(&self) -> bool {
        self.handle.is_vectorial()
    }

    /// Number of stored derivative handles.
    pub fn derivative_count(&self) -> usize {
        self.derivatives.len()
    }

    /// Evaluate at a single point.
    ///
    /// Points outside `domain` are a `Value` error. Points inside `domain`
    /// but outside `nonzero` evaluate normally but are reported through
    /// `tracing`, since they hint at a miscomputed support.
    pub fn call(&self, x: f64) -> Result<f64, CoreError> {
        if !self.domain.contains(x) {
            return Err(CoreError::OutOfDomain { point: x });
        }
        if !self.nonzero.contains(x) {
            tracing::debug!(point = x, "evaluation outside the declared support");
        }
        Ok(self.handle.eval(x))
    }

    /// Evaluate at many points, using the vectorized path when available.
    ///
    /// Every point is checked like [Function::call]: outside `domain` is a
    /// `Value` error, outside `nonzero` is reported through `tracing`.
    pub fn eval_slice(&self, xs: &[f64]) -> Result<Vec<f64>, CoreError> {
        for &x in xs {
            if !self.domain.contains(x) {
                return Err(CoreError::OutOfDomain { point: x });
            }
            if !self.nonzero.contains(x) {
                tracing::debug!(point = x, "evaluation outside the declared support");
            }
        }
        Ok(self.handle.eval_slice(xs))
    }

    /// Evaluation without domain checks, for internal composition and
    /// quadrature loops that already restrict themselves to valid regions.
    pub(crate) fn eval_raw(&self, x: f64) -> f64 {
        self.handle.eval(x)
    }

    /// The `order`-th derivative.
    ///
    /// Order 0 returns an object equal to `self`. Order k consumes the
    /// (k-1)-th stored handle and keeps the tail of the list; asking beyond
    /// the stored handles is a `Value` error.
    pub fn derive(&self, order: usize) -> Result<Self, CoreError> {
        if order == 0 {
            return Ok(self.clone());
        }
        if order > self.derivatives.len() {
            return Err(CoreError::DerivativeOrder {
                order,
                available: self.derivatives.len(),
            });
        }
        Ok(Self {
            handle: self.derivatives[order - 1].clone(),
            derivatives: self.derivatives[order..].to_vec(),
            domain: self.domain.clone(),
            nonzero: self.nonzero.clone(),
        })
    }

    /// Scale by a constant.
    ///
    /// Scaling by 1 returns an object equal to `self`. Otherwise the handle
    /// and every derivative handle are scaled identically; domain and
    /// support are preserved.
    pub fn scale(&self, factor: f64) -> Self {
        if factor == 1.0 {
            return self.clone();
        }
        Self {
            handle: self.handle.scaled(factor),
            derivatives: self.derivatives.iter().map(|d| d.scaled(factor)).collect(),
            domain: self.domain.clone(),
            nonzero: self.nonzero.clone(),
        }
    }

    /// Scale by an arbitrary callable, computing `factor(x) * self(x)`.
    ///
    /// The product rule would mix in derivatives of `factor`, which are
    /// unknown here, so the derivative list is emptied: `derive(k)` for
    /// k > 0 on the result is a `Value` error.
    pub fn scale_with(&self, factor: impl Fn(f64) -> f64 + Send + Sync + 'static) -> Self {
        let factor = Arc::new(factor);
        let handle = match &self.handle {
            Handle::Scalar(f) => {
                let f = f.clone();
                let factor = factor.clone();
                Handle::scalar(move |x| factor(x) * f(x))
            }
            Handle::Array(f) => {
                let f = f.clone();
                let factor = factor.clone();
                Handle::array(move |xs| {
                    f(xs)
                        .into_iter()
                        .zip(xs.iter())
                        .map(|(y, &x)| factor(x) * y)
                        .collect()
                })
            }
        };
        Self {
            handle,
            derivatives: Vec::new(),
            domain: self.domain.clone(),
            nonzero: self.nonzero.clone(),
        }
    }

    /// Pointwise power `self(x)^power`.
    ///
    /// Power 1 returns an object equal to `self`; any other power
    /// invalidates the derivative list like [Function::scale_with].
    pub fn raise_to(&self, power: f64) -> Self {
        if power == 1.0 {
            return self.clone();
        }
        let handle = match &self.handle {
            Handle::Scalar(f) => {
                let f = f.clone();
                Handle::scalar(move |x| f(x).powf(power))
            }
            Handle::Array(f) => {
                let f = f.clone();
                Handle::array(move |xs| f(xs).into_iter().map(|y| y.powf(power)).collect())
            }
        };
        Self {
            handle,
            derivatives: Vec::new(),
            domain: self.domain.clone(),
            nonzero: self.nonzero.clone(),
        }
    }
}

/// A finite point inside the domain, used to probe array handles.
fn probe_point(domain: &Domain) -> f64 {
    match domain.intervals().first() {
        Some(iv) if iv.start.is_finite() => iv.start,
        Some(iv) if iv.end.is_finite() => iv.end,
        _ => 0.0,
    }
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        self.handle.ptr_eq(&other.handle)
            && self.derivatives.len() == other.derivatives.len()
            && self
                .derivatives
                .iter()
                .zip(other.derivatives.iter())
                .all(|(a, b)| a.ptr_eq(b))
            && self.domain == other.domain
            && self.nonzero == other.nonzero
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Function")
            .field("handle", &self.handle)
            .field("derivatives", &self.derivatives.len())
            .field("domain", &self.domain)
            .field("nonzero", &self.nonzero)
            .finish()
    }
}

/// One element of a basis.
///
/// The closed set of payload kinds a basis may be built from: a scalar
/// [Function], or a vector of sub-functions evaluated jointly. Capability
/// methods (`derive`, `scale`, ...) dispatch over the variant; routines that
/// need a scalar function type-check at the boundary via
/// [Fraction::as_function].
#[derive(Clone, Debug, PartialEq)]
pub enum Fraction {
    Scalar(Function),
    Vectorial(Vec<Function>),
}

impl Fraction {
    /// Number of scalar components (1 for `Scalar`).
    pub fn member_count(&self) -> usize {
        match self {
            Self::Scalar(_) => 1,
            Self::Vectorial(members) => members.len(),
        }
    }

    pub fn same_kind(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Scalar(_), Self::Scalar(_)) => true,
            (Self::Vectorial(a), Self::Vectorial(b)) => a.len() == b.len(),
            _ => false,
        }
    }

    /// Borrow the scalar function, failing with a `Type` error otherwise.
    pub fn as_function(&self) -> Result<&Function, CoreError> {
        match self {
            Self::Scalar(f) => Ok(f),
            Self::Vectorial(_) => Err(CoreError::NotAFunction),
        }
    }

    /// Member-wise derivative; order 0 yields an equal object.
    pub fn derive(&self, order: usize) -> Result<Self, CoreError> {
        match self {
            Self::Scalar(f) => Ok(Self::Scalar(f.derive(order)?)),
            Self::Vectorial(members) => Ok(Self::Vectorial(
                members
                    .iter()
                    .map(|f| f.derive(order))
                    .collect::<Result<_, _>>()?,
            )),
        }
    }

    /// Member-wise constant scaling.
    pub fn scale(&self, factor: f64) -> Self {
        match self {
            Self::Scalar(f) => Self::Scalar(f.scale(factor)),
            Self::Vectorial(members) => {
                Self::Vectorial(members.iter().map(|f| f.scale(factor)).collect())
            }
        }
    }

    /// Member-wise scaling by a callable; derivatives are invalidated.
    pub fn scale_with(&self, factor: impl Fn(f64) -> f64 + Send + Sync + 'static) -> Self {
        let factor = Arc::new(factor);
        match self {
            Self::Scalar(f) => {
                let factor = factor.clone();
                Self::Scalar(f.scale_with(move |x| factor(x)))
            }
            Self::Vectorial(members) => Self::Vectorial(
                members
                    .iter()
                    .map(|f| {
                        let factor = factor.clone();
                        f.scale_with(move |x| factor(x))
                    })
                    .collect(),
            ),
        }
    }
}

impl From<Function> for Fraction {
    fn from(f: Function) -> Self {
        Self::Scalar(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    fn sin_with_derivatives() -> Function {
        Function::with(
            Handle::scalar(f64::sin),
            Domain::unbounded(),
            None,
            vec![Handle::scalar(f64::cos), Handle::scalar(f64::sin)],
        )
        .unwrap()
    }

    #[test]
    fn defaults_are_unbounded() {
        let f = Function::new(Handle::scalar(f64::sin)).unwrap();
        assert_eq!(f.domain(), &Domain::unbounded());
        assert_eq!(f.nonzero(), &Domain::unbounded());
    }

    #[test]
    fn shape_mismatched_array_handle_is_a_type_error() {
        // doubles the number of output entries, like a column-stacking bug
        let err = Function::new(Handle::array(|xs| {
            xs.iter().flat_map(|&x| [x, x]).collect()
        }))
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Type);
    }

    #[test]
    fn domain_is_enforced_on_call() {
        let f = Function::with(
            Handle::scalar(f64::sin),
            Domain::from_bounds(0.0, 10.0),
            None,
            Vec::new(),
        )
        .unwrap();
        assert!(f.call(-3.0).is_err());
        assert!(f.call(10.5).is_err());
        assert!(f.call(5.0).is_ok());
        assert!(f.eval_slice(&[1.0, 11.0]).is_err());
    }

    #[test]
    fn out_of_support_points_still_evaluate() {
        let f = Function::with(
            Handle::scalar(f64::sin),
            Domain::from_bounds(0.0, 10.0),
            Some(Domain::from_bounds(2.0, 3.0)),
            Vec::new(),
        )
        .unwrap();

        // inside the domain but outside the support: reported, not rejected
        assert!((f.call(5.0).unwrap() - 5f64.sin()).abs() < 1e-12);
        let ys = f.eval_slice(&[1.0, 2.5, 5.0]).unwrap();
        assert_eq!(ys.len(), 3);
        for (&x, &y) in [1.0f64, 2.5, 5.0].iter().zip(ys.iter()) {
            assert!((y - x.sin()).abs() < 1e-12);
        }
    }

    #[test]
    fn scalar_handle_is_classified_and_looped() {
        let f = Function::with(
            Handle::scalar(|x| 2f64.powf(x)),
            Domain::from_bounds(0.0, 10.0),
            None,
            Vec::new(),
        )
        .unwrap();
        assert!(!f.is_vectorial());
        assert!((f.call(10.0).unwrap() - 1024.0).abs() < 1e-9);

        let xs: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let ys = f.eval_slice(&xs).unwrap();
        assert_eq!(ys.len(), 10);
        for (&x, &y) in xs.iter().zip(ys.iter()) {
            assert!((y - 2f64.powf(x)).abs() < 1e-9);
        }
    }

    #[test]
    fn array_handle_is_classified_and_used() {
        let f = Function::with(
            Handle::array(|xs| xs.iter().map(|&x| 2.0 * x).collect()),
            Domain::from_bounds(0.0, 10.0),
            None,
            Vec::new(),
        )
        .unwrap();
        assert!(f.is_vectorial());
        assert!((f.call(10.0).unwrap() - 20.0).abs() < 1e-12);

        let xs: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let ys = f.eval_slice(&xs).unwrap();
        for (&x, &y) in xs.iter().zip(ys.iter()) {
            assert!((y - 2.0 * x).abs() < 1e-12);
        }
    }

    #[test]
    fn derive_walks_the_handle_chain() {
        let f = sin_with_derivatives();

        // zeroth derivative is an equal object
        let d0 = f.derive(0).unwrap();
        assert_eq!(f, d0);

        // first derivative: handle becomes cos, one handle remains
        let d1 = f.derive(1).unwrap();
        assert_eq!(d1.derivative_count(), 1);
        assert!((d1.call(0.0).unwrap() - 1.0).abs() < 1e-12);

        // second derivative: list exhausted
        let d2 = f.derive(2).unwrap();
        assert_eq!(d2.derivative_count(), 0);
        assert!((d2.call(0.0).unwrap()).abs() < 1e-12);

        // beyond the stored handles
        assert!(f.derive(3).is_err());
        assert!(f.derive(100).is_err());
    }

    #[test]
    fn scale_by_constant_keeps_derivatives() {
        let f = sin_with_derivatives();

        let trivial = f.scale(1.0);
        assert_eq!(f, trivial);

        let g = f.scale(10.0);
        for i in 0..100 {
            let x = i as f64;
            assert!((g.call(x).unwrap() - 10.0 * x.sin()).abs() < 1e-12);
        }
        // derivatives scale identically
        let gd = g.derive(1).unwrap();
        assert!((gd.call(0.0).unwrap() - 10.0).abs() < 1e-12);
    }

    #[test]
    fn scale_by_callable_invalidates_derivatives() {
        let f = sin_with_derivatives();
        let g = f.scale_with(|x| x);
        for i in 0..10 {
            let x = i as f64;
            assert!((g.call(x).unwrap() - x * x.sin()).abs() < 1e-12);
        }
        let err = g.derive(1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Value);
    }

    #[test]
    fn raise_to_matches_powers() {
        let f = sin_with_derivatives();

        let trivial = f.raise_to(1.0);
        assert_eq!(f, trivial);

        let g = f.raise_to(2.0);
        for i in 0..100 {
            let x = i as f64;
            assert!((g.call(x).unwrap() - x.sin().powi(2)).abs() < 1e-12);
        }
        assert!(g.derive(1).is_err());
    }

    #[test]
    fn fraction_boundary_type_check() {
        let scalar = Fraction::Scalar(Function::from_scalar_fn(f64::sin));
        let vectorial = Fraction::Vectorial(vec![
            Function::from_scalar_fn(f64::sin),
            Function::from_scalar_fn(f64::cos),
        ]);

        assert!(scalar.as_function().is_ok());
        let err = vectorial.as_function().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Type);
        assert!(scalar.same_kind(&scalar.clone()));
        assert!(!scalar.same_kind(&vectorial));

        // derive(0) yields an equal object for every kind
        assert_eq!(vectorial.derive(0).unwrap(), vectorial);
    }
}
