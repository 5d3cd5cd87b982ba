use thiserror::Error;

/// Broad classification of a [CoreError].
///
/// Every failure in this crate is either a `Type` error (the wrong kind of
/// object reached an interface boundary) or a `Value` error (a well-typed
/// argument carried an unusable value). Callers that only care about the
/// family can match on [CoreError::kind] instead of individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Type,
    Value,
}

/// Crate-wide error type.
///
/// All operations fail synchronously at the offending call; there are no
/// retries and no partial results (an undershot root count is an error, not
/// a truncated success).
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    #[error("interval bounds ({start}, {end}) are not in ascending order")]
    IntervalNotSorted { start: f64, end: f64 },

    #[error("interval list must be sorted, non-overlapping and non-touching")]
    IntervalsNotAscending,

    #[error("handle returned {got} values for a {expected}-point probe; not a valid array handle")]
    HandleShape { expected: usize, got: usize },

    #[error("derivative of order {order} requested, but only {available} derivative handles are stored")]
    DerivativeOrder { order: usize, available: usize },

    #[error("evaluation point {point} lies outside the function domain")]
    OutOfDomain { point: f64 },

    #[error("a scalar Function-valued fraction is required here")]
    NotAFunction,

    #[error("fractions of mismatched kinds cannot be combined")]
    MixedFractionKinds,

    #[error("a base must contain at least one fraction")]
    EmptyBase,

    #[error("bases hold {a} and {b} fractions; a common size is required")]
    BaseSize { a: usize, b: usize },

    #[error("a base named '{0}' is already registered")]
    BaseTaken(String),

    #[error("no base named '{0}' is registered")]
    BaseUnknown(String),

    #[error("gram matrix is singular; projection weights cannot be computed")]
    SingularGram,

    #[error("{weights} weights were given for a base of {fractions} fractions")]
    WeightCount { weights: usize, fractions: usize },

    #[error("scalar product {product} does not admit normalization")]
    CannotNormalize { product: f64 },

    #[error("only {found} distinct roots were found; {requested} were requested")]
    TooFewRoots { found: usize, requested: usize },

    #[error("imaginary part {imag:e} is too significant to discard")]
    ComplexResidue { imag: f64 },

    #[error("a grid of at least {min} points per axis is required")]
    GridTooSmall { min: usize },

    #[error("search grids must contain only finite values")]
    GridNotFinite,

    #[error("output shape {actual:?} does not match the axis lengths {expected:?}")]
    ShapeMismatch { expected: Vec<usize>, actual: Vec<usize> },

    #[error("coordinate axis {axis} is not strictly ascending")]
    AxisNotAscending { axis: usize },

    #[error("matrix multiplication requires 2-dimensional evaluation data")]
    NotAMatrix,
}

impl CoreError {
    /// The error family this variant belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::HandleShape { .. }
            | Self::NotAFunction
            | Self::MixedFractionKinds
            | Self::NotAMatrix => ErrorKind::Type,
            _ => ErrorKind::Value,
        }
    }
}
