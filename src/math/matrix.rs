use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::error::{Error, Result};

/// Dense row-major matrix of `f64`.
///
/// Every arithmetic method returns a fresh matrix and leaves its operands
/// untouched. Operations with incompatible shapes fail with
/// [`Error::ShapeMismatch`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix { rows, cols, data: vec![0.0; rows * cols] }
    }

    /// Entries drawn uniformly from [-1, 1).
    pub fn random<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Matrix {
        let data = (0..rows * cols).map(|_| rng.gen::<f64>() * 2.0 - 1.0).collect();
        Matrix { rows, cols, data }
    }

    /// Builds a matrix from nested rows. All rows must have the same length.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Matrix> {
        let n_rows = rows.len();
        let n_cols = rows.first().map(|r| r.len()).unwrap_or(0);
        let mut data = Vec::with_capacity(n_rows * n_cols);
        for row in rows {
            if row.len() != n_cols {
                return Err(Error::ShapeMismatch {
                    op: "from_rows",
                    left: (1, n_cols),
                    right: (1, row.len()),
                });
            }
            data.extend(row);
        }
        Ok(Matrix { rows: n_rows, cols: n_cols, data })
    }

    /// Wraps a flat row-major buffer.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f64>) -> Result<Matrix> {
        if data.len() != rows * cols {
            return Err(Error::ShapeMismatch {
                op: "from_vec",
                left: (rows, cols),
                right: (data.len(), 1),
            });
        }
        Ok(Matrix { rows, cols, data })
    }

    /// A `(len × 1)` column vector.
    pub fn column(values: &[f64]) -> Matrix {
        Matrix { rows: values.len(), cols: 1, data: values.to_vec() }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }

    pub fn transpose(&self) -> Matrix {
        let mut res = Matrix::zeros(self.cols, self.rows);
        for i in 0..self.rows {
            for j in 0..self.cols {
                res.data[j * self.rows + i] = self.data[i * self.cols + j];
            }
        }
        res
    }

    /// Same elements, new shape. The element count must be preserved.
    pub fn reshape(&self, rows: usize, cols: usize) -> Result<Matrix> {
        if rows * cols != self.data.len() {
            return Err(Error::ShapeMismatch {
                op: "reshape",
                left: self.shape(),
                right: (rows, cols),
            });
        }
        Ok(Matrix { rows, cols, data: self.data.clone() })
    }

    pub fn map<F>(&self, functor: F) -> Matrix
    where
        F: Fn(f64) -> f64,
    {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|&x| functor(x)).collect(),
        }
    }

    pub fn scale(&self, factor: f64) -> Matrix {
        self.map(|x| x * factor)
    }

    pub fn add(&self, rhs: &Matrix) -> Result<Matrix> {
        self.zip_with(rhs, "add", |a, b| a + b)
    }

    pub fn sub(&self, rhs: &Matrix) -> Result<Matrix> {
        self.zip_with(rhs, "sub", |a, b| a - b)
    }

    /// Element-wise (Hadamard) product.
    pub fn hadamard(&self, rhs: &Matrix) -> Result<Matrix> {
        self.zip_with(rhs, "hadamard", |a, b| a * b)
    }

    /// Matrix product `self · rhs`.
    pub fn dot(&self, rhs: &Matrix) -> Result<Matrix> {
        if self.cols != rhs.rows {
            return Err(Error::ShapeMismatch {
                op: "dot",
                left: self.shape(),
                right: rhs.shape(),
            });
        }

        let mut res = Matrix::zeros(self.rows, rhs.cols);
        for i in 0..self.rows {
            for k in 0..self.cols {
                let lhs = self.data[i * self.cols + k];
                if lhs == 0.0 {
                    continue;
                }
                let rhs_row = &rhs.data[k * rhs.cols..(k + 1) * rhs.cols];
                let out_row = &mut res.data[i * rhs.cols..(i + 1) * rhs.cols];
                for (out, &r) in out_row.iter_mut().zip(rhs_row) {
                    *out += lhs * r;
                }
            }
        }
        Ok(res)
    }

    /// Sum of squared entries.
    pub fn sum_squares(&self) -> f64 {
        self.data.iter().map(|x| x * x).sum()
    }

    fn zip_with<F>(&self, rhs: &Matrix, op: &'static str, f: F) -> Result<Matrix>
    where
        F: Fn(f64, f64) -> f64,
    {
        if self.shape() != rhs.shape() {
            return Err(Error::ShapeMismatch { op, left: self.shape(), right: rhs.shape() });
        }
        Ok(Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().zip(&rhs.data).map(|(&a, &b)| f(a, b)).collect(),
        })
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Matrix { rows: 0, cols: 0, data: vec![] }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dot_multiplies_rows_by_columns() {
        let a = Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        let b = Matrix::column(&[5.0, 6.0]);
        let c = a.dot(&b).unwrap();
        assert_eq!(c.shape(), (2, 1));
        assert_eq!(c.as_slice(), &[17.0, 39.0]);
    }

    #[test]
    fn dot_rejects_mismatched_inner_dimensions() {
        let a = Matrix::zeros(2, 3);
        let b = Matrix::zeros(2, 3);
        assert_eq!(
            a.dot(&b),
            Err(Error::ShapeMismatch { op: "dot", left: (2, 3), right: (2, 3) })
        );
    }

    #[test]
    fn transpose_swaps_indices() {
        let a = Matrix::from_rows(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
        let t = a.transpose();
        assert_eq!(t.shape(), (3, 2));
        assert_eq!(t.get(2, 0), 3.0);
        assert_eq!(t.get(0, 1), 4.0);
    }

    #[test]
    fn elementwise_ops_leave_operands_untouched() {
        let a = Matrix::column(&[1.0, 2.0]);
        let b = Matrix::column(&[3.0, 5.0]);
        assert_eq!(a.add(&b).unwrap().as_slice(), &[4.0, 7.0]);
        assert_eq!(a.sub(&b).unwrap().as_slice(), &[-2.0, -3.0]);
        assert_eq!(a.hadamard(&b).unwrap().as_slice(), &[3.0, 10.0]);
        assert_eq!(a.as_slice(), &[1.0, 2.0]);
        assert!(a.add(&Matrix::zeros(1, 2)).is_err());
    }

    #[test]
    fn reshape_keeps_element_count() {
        let a = Matrix::from_rows(vec![vec![1.0, 2.0, 3.0, 4.0]]).unwrap();
        let r = a.reshape(4, 1).unwrap();
        assert_eq!(r.shape(), (4, 1));
        assert!(a.reshape(3, 1).is_err());
    }

    #[test]
    fn from_rows_rejects_ragged_input() {
        assert!(Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0]]).is_err());
    }
}
