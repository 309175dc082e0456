//! Row/column orientation of numeric sequences
//!
//! Callers hand in setpoint vectors as slices, `Vec`s, one-dimensional arrays,
//! or as `1 × n` / `n × 1` matrices. [`IntoColumn`] flattens all of these into a
//! single sequence and [`as_column`] produces the `n × 1` matrices returned to
//! callers, so output orientation never depends on input orientation.

use crate::errors::{LMBError, LMBResult};
use crate::FloatValue;
use ndarray::{Array1, Array2, ArrayBase, Axis, Data, Ix1, Ix2};

/// Conversion of a row or column sequence into a flat vector
pub trait IntoColumn {
    fn into_column(self) -> LMBResult<Array1<FloatValue>>;
}

impl IntoColumn for &[FloatValue] {
    fn into_column(self) -> LMBResult<Array1<FloatValue>> {
        Ok(Array1::from(self.to_vec()))
    }
}

impl<const N: usize> IntoColumn for &[FloatValue; N] {
    fn into_column(self) -> LMBResult<Array1<FloatValue>> {
        Ok(Array1::from(self.to_vec()))
    }
}

impl IntoColumn for Vec<FloatValue> {
    fn into_column(self) -> LMBResult<Array1<FloatValue>> {
        Ok(Array1::from(self))
    }
}

impl IntoColumn for &Vec<FloatValue> {
    fn into_column(self) -> LMBResult<Array1<FloatValue>> {
        Ok(Array1::from(self.clone()))
    }
}

impl<S: Data<Elem = FloatValue>> IntoColumn for ArrayBase<S, Ix1> {
    fn into_column(self) -> LMBResult<Array1<FloatValue>> {
        Ok(self.to_owned())
    }
}

impl<S: Data<Elem = FloatValue>> IntoColumn for &ArrayBase<S, Ix1> {
    fn into_column(self) -> LMBResult<Array1<FloatValue>> {
        Ok(self.to_owned())
    }
}

impl<S: Data<Elem = FloatValue>> IntoColumn for ArrayBase<S, Ix2> {
    fn into_column(self) -> LMBResult<Array1<FloatValue>> {
        (&self).into_column()
    }
}

impl<S: Data<Elem = FloatValue>> IntoColumn for &ArrayBase<S, Ix2> {
    fn into_column(self) -> LMBResult<Array1<FloatValue>> {
        let (rows, cols) = self.dim();
        if rows <= 1 || cols <= 1 {
            Ok(self.iter().copied().collect())
        } else {
            Err(LMBError::ShapeMismatch(vec![rows, cols]))
        }
    }
}

/// Arrange a flat sequence as an `n × 1` column
pub fn as_column(values: Array1<FloatValue>) -> Array2<FloatValue> {
    values.insert_axis(Axis(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_row_and_column_matrices_agree() {
        let row = array![[0.1, 0.2, 0.3]];
        let col = array![[0.1], [0.2], [0.3]];

        let a = row.into_column().unwrap();
        let b = col.view().into_column().unwrap();
        assert_eq!(a, b);
        assert_eq!(a, array![0.1, 0.2, 0.3]);
    }

    #[test]
    fn test_sequences() {
        let v = vec![1.0, 2.0];
        assert_eq!((&v).into_column().unwrap(), array![1.0, 2.0]);
        assert_eq!(v.as_slice().into_column().unwrap(), array![1.0, 2.0]);
        assert_eq!((&[3.0, 4.0]).into_column().unwrap(), array![3.0, 4.0]);
        assert_eq!(array![5.0].into_column().unwrap(), array![5.0]);
    }

    #[test]
    fn test_matrix_is_rejected() {
        let m = Array2::<FloatValue>::zeros((2, 3));
        match m.into_column().unwrap_err() {
            LMBError::ShapeMismatch(shape) => assert_eq!(shape, vec![2, 3]),
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn test_as_column_shape() {
        let c = as_column(array![1.0, 2.0, 3.0]);
        assert_eq!(c.dim(), (3, 1));
        assert_eq!(c[[2, 0]], 3.0);
    }
}
