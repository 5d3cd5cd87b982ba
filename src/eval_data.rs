use crate::errors::CoreError;
use ndarray::{ArrayD, Axis, Ix2};
use std::ops::{Add, Mul, Sub};

/// A sampled function: one ascending coordinate axis per input dimension
/// plus an N-dimensional output array over the axis product.
///
/// Instances are immutable; interpolation and every algebraic operator
/// return a new `EvalData`. Binary operators accept a scalar or another
/// `EvalData`, which is first re-sampled onto the left operand's grid when
/// the axes differ.
#[derive(Clone, Debug, PartialEq)]
pub struct EvalData {
    input_data: Vec<Vec<f64>>,
    output_data: ArrayD<f64>,
}

impl EvalData {
    /// Pair coordinate axes with an output array.
    ///
    /// The output shape must equal the axis lengths and every axis must be
    /// strictly ascending; both violations are `Value` errors.
    pub fn new(input_data: Vec<Vec<f64>>, output_data: ArrayD<f64>) -> Result<Self, CoreError> {
        let expected: Vec<usize> = input_data.iter().map(Vec::len).collect();
        if output_data.shape() != expected.as_slice() {
            return Err(CoreError::ShapeMismatch {
                expected,
                actual: output_data.shape().to_vec(),
            });
        }
        for (axis, points) in input_data.iter().enumerate() {
            if points.windows(2).any(|pair| pair[0] >= pair[1]) {
                return Err(CoreError::AxisNotAscending { axis });
            }
        }
        Ok(Self {
            input_data,
            output_data,
        })
    }

    pub fn input_data(&self) -> &[Vec<f64>] {
        &self.input_data
    }

    pub fn output_data(&self) -> &ArrayD<f64> {
        &self.output_data
    }

    pub fn ndim(&self) -> usize {
        self.input_data.len()
    }

    /// Linearly interpolate onto a new coordinate set, one target list per
    /// axis. Target points are clamped to the sampled range.
    pub fn interpolate(&self, targets: &[Vec<f64>]) -> Result<Self, CoreError> {
        if targets.len() != self.ndim() {
            return Err(CoreError::ShapeMismatch {
                expected: self.input_data.iter().map(Vec::len).collect(),
                actual: targets.iter().map(Vec::len).collect(),
            });
        }

        let mut data = self.output_data.clone();
        for (axis, target) in targets.iter().enumerate() {
            data = interp_axis(&data, axis, &self.input_data[axis], target);
        }
        Self::new(targets.to_vec(), data)
    }

    /// Matrix product of two 2-dimensional data sets.
    ///
    /// The right operand is re-sampled onto the caller's grid when the axes
    /// differ. Non-2-D data is a `Type` error; incompatible inner
    /// dimensions are a `Value` error.
    pub fn matmul(&self, other: &EvalData) -> Result<Self, CoreError> {
        if self.ndim() != 2 || other.ndim() != 2 {
            return Err(CoreError::NotAMatrix);
        }
        let other = if other.input_data == self.input_data {
            other.clone()
        } else {
            other.interpolate(&self.input_data)?
        };

        let lhs = self
            .output_data
            .view()
            .into_dimensionality::<Ix2>()
            .map_err(|_| CoreError::NotAMatrix)?;
        let rhs = other
            .output_data
            .view()
            .into_dimensionality::<Ix2>()
            .map_err(|_| CoreError::NotAMatrix)?;
        if lhs.ncols() != rhs.nrows() {
            return Err(CoreError::ShapeMismatch {
                expected: vec![lhs.ncols()],
                actual: vec![rhs.nrows()],
            });
        }

        let product = lhs.dot(&rhs).into_dyn();
        Self::new(
            vec![self.input_data[0].clone(), other.input_data[1].clone()],
            product,
        )
    }

    /// Point-wise square root.
    pub fn sqrt(&self) -> Self {
        self.map(f64::sqrt)
    }

    /// Point-wise absolute value.
    pub fn abs(&self) -> Self {
        self.map(f64::abs)
    }

    fn map(&self, op: impl Fn(f64) -> f64) -> Self {
        Self {
            input_data: self.input_data.clone(),
            output_data: self.output_data.mapv(op),
        }
    }

    /// Combine with another data set point-wise, re-sampling `other` onto
    /// this grid first when the axes differ.
    fn zip_with(&self, other: &EvalData, op: impl Fn(f64, f64) -> f64) -> Result<Self, CoreError> {
        let other = if other.input_data == self.input_data {
            other.clone()
        } else {
            other.interpolate(&self.input_data)?
        };
        let mut output = self.output_data.clone();
        output.zip_mut_with(&other.output_data, |a, &b| *a = op(*a, b));
        Ok(Self {
            input_data: self.input_data.clone(),
            output_data: output,
        })
    }
}

/// Interpolate one axis of an N-d array onto new coordinates.
fn interp_axis(data: &ArrayD<f64>, axis: usize, old: &[f64], new: &[f64]) -> ArrayD<f64> {
    let mut shape = data.shape().to_vec();
    shape[axis] = new.len();
    let mut out = ArrayD::zeros(shape);

    for (i, &x) in new.iter().enumerate() {
        let (j0, j1, t) = bracket(old, x);
        let lower = data.index_axis(Axis(axis), j0).to_owned();
        let upper = data.index_axis(Axis(axis), j1).to_owned();
        let blended = &lower * (1.0 - t) + &upper * t;
        out.index_axis_mut(Axis(axis), i).assign(&blended);
    }
    out
}

/// Bracketing indices and blend weight for `x` in an ascending point list,
/// clamped at both ends.
fn bracket(points: &[f64], x: f64) -> (usize, usize, f64) {
    let n = points.len();
    if x <= points[0] {
        return (0, 0, 0.0);
    }
    if x >= points[n - 1] {
        return (n - 1, n - 1, 0.0);
    }
    let upper = points.partition_point(|&p| p <= x);
    let lower = upper - 1;
    let t = (x - points[lower]) / (points[upper] - points[lower]);
    (lower, upper, t)
}

// Scalar operators are infallible; data-data operators re-sample the right
// operand and panic when the dimensionalities are incompatible, matching
// ndarray's own operator contract.

impl Add<f64> for &EvalData {
    type Output = EvalData;
    fn add(self, rhs: f64) -> EvalData {
        self.map(|a| a + rhs)
    }
}

impl Add<&EvalData> for f64 {
    type Output = EvalData;
    fn add(self, rhs: &EvalData) -> EvalData {
        rhs.map(|a| self + a)
    }
}

impl Sub<f64> for &EvalData {
    type Output = EvalData;
    fn sub(self, rhs: f64) -> EvalData {
        self.map(|a| a - rhs)
    }
}

impl Sub<&EvalData> for f64 {
    type Output = EvalData;
    fn sub(self, rhs: &EvalData) -> EvalData {
        rhs.map(|a| self - a)
    }
}

impl Mul<f64> for &EvalData {
    type Output = EvalData;
    fn mul(self, rhs: f64) -> EvalData {
        self.map(|a| a * rhs)
    }
}

impl Mul<&EvalData> for f64 {
    type Output = EvalData;
    fn mul(self, rhs: &EvalData) -> EvalData {
        rhs.map(|a| self * a)
    }
}

impl Add<&EvalData> for &EvalData {
    type Output = EvalData;
    fn add(self, rhs: &EvalData) -> EvalData {
        self.zip_with(rhs, |a, b| a + b)
            .expect("incompatible evaluation grids")
    }
}

impl Sub<&EvalData> for &EvalData {
    type Output = EvalData;
    fn sub(self, rhs: &EvalData) -> EvalData {
        self.zip_with(rhs, |a, b| a - b)
            .expect("incompatible evaluation grids")
    }
}

impl Mul<&EvalData> for &EvalData {
    type Output = EvalData;
    fn mul(self, rhs: &EvalData) -> EvalData {
        self.zip_with(rhs, |a, b| a * b)
            .expect("incompatible evaluation grids")
    }
}
