//! Bias-augmented buffers.
//!
//! Every layer vector carries one extra slot at index 0 for the layer's bias unit, and
//! every weight matrix carries one extra row (fed by the source bias) and one extra column
//! (the destination bias slot). These types make that layout explicit instead of leaving
//! index 0 as a convention.
//!
//! Layout:
//! - [`AugmentedVector`]: `len() == neurons + 1`, slot 0 is the bias.
//! - [`AugmentedMatrix`]: shape `(rows, cols)` stored column-major, so column `j` is the
//!   contiguous slice `data[j * rows..(j + 1) * rows]`. Column 0 feeds the destination
//!   bias slot and is zero on construction.

use rand::Rng;
use rand::distributions::{Distribution, Uniform};

/// Constant activation of a bias unit.
pub const BIAS: f64 = 1.0;

#[derive(Debug, Clone, PartialEq)]
pub struct AugmentedVector {
    values: Vec<f64>,
}

impl AugmentedVector {
    /// A vector with `neurons` zeroed real slots and the bias slot set to [`BIAS`].
    pub fn new(neurons: usize) -> Self {
        let mut values = vec![0.0; neurons + 1];
        values[0] = BIAS;
        Self { values }
    }

    /// A fully zeroed vector, bias slot included. Used for error signals.
    pub fn zeros(neurons: usize) -> Self {
        Self {
            values: vec![0.0; neurons + 1],
        }
    }

    /// Number of real neurons (bias excluded).
    #[inline]
    pub fn neurons(&self) -> usize {
        self.values.len() - 1
    }

    /// Total slot count (`neurons() + 1`).
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn bias(&self) -> f64 {
        self.values[0]
    }

    #[inline]
    pub fn set_bias(&mut self, value: f64) {
        self.values[0] = value;
    }

    /// Real neuron slots `1..=neurons`.
    #[inline]
    pub fn real(&self) -> &[f64] {
        &self.values[1..]
    }

    #[inline]
    pub fn real_mut(&mut self) -> &mut [f64] {
        &mut self.values[1..]
    }

    /// All slots, bias at index 0.
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.values
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AugmentedMatrix {
    rows: usize,
    cols: usize,
    /// Column-major, `rows * cols` values.
    data: Vec<f64>,
}

impl AugmentedMatrix {
    /// The placeholder stored at weight index 0 (the input layer has no incoming weights).
    pub fn empty() -> Self {
        Self {
            rows: 0,
            cols: 0,
            data: Vec::new(),
        }
    }

    /// Weights connecting a layer of `from` neurons to a layer of `to` neurons.
    ///
    /// Shape is `(from + 1, to + 1)`. Entries are uniform in `[-1, 1]` except column 0,
    /// which is zero: nothing feeds the destination bias unit.
    pub fn random<R: Rng + ?Sized>(from: usize, to: usize, rng: &mut R) -> Self {
        let rows = from + 1;
        let cols = to + 1;
        let dist = Uniform::new_inclusive(-1.0_f64, 1.0_f64);

        let mut data = vec![0.0; rows * cols];
        for v in &mut data[rows..] {
            *v = dist.sample(rng);
        }
        Self { rows, cols, data }
    }

    /// Rebuild a matrix from column-major values.
    ///
    /// Returns `None` if `data.len() != rows * cols`. Column 0 is taken as-is.
    pub fn from_col_major(rows: usize, cols: usize, data: Vec<f64>) -> Option<Self> {
        if rows.checked_mul(cols)? != data.len() {
            return None;
        }
        Some(Self { rows, cols, data })
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        debug_assert!(row < self.rows && col < self.cols);
        self.data[col * self.rows + row]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        debug_assert!(row < self.rows && col < self.cols);
        self.data[col * self.rows + row] = value;
    }

    /// Column `col` as a contiguous slice of length `rows`.
    #[inline]
    pub fn column(&self, col: usize) -> &[f64] {
        let start = col * self.rows;
        &self.data[start..start + self.rows]
    }

    /// The column that feeds the destination bias slot.
    #[inline]
    pub fn bias_column(&self) -> &[f64] {
        self.column(0)
    }

    /// Raw column-major storage.
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// `out = x^T * self`, i.e. `out[j] = sum_i x[i] * self[i, j]`.
    ///
    /// Shape contract: `x.len() == rows`, `out.len() == cols`.
    #[inline]
    pub fn vec_mul_into(&self, x: &[f64], out: &mut [f64]) {
        debug_assert_eq!(x.len(), self.rows);
        debug_assert_eq!(out.len(), self.cols);

        for (j, o) in out.iter_mut().enumerate() {
            let col = self.column(j);
            let mut sum = 0.0_f64;
            for (&w, &xi) in col.iter().zip(x) {
                sum = w.mul_add(xi, sum);
            }
            *o = sum;
        }
    }

    /// `out = self * d`, i.e. `out[i] = sum_j self[i, j] * d[j]`.
    ///
    /// Shape contract: `d.len() == cols`, `out.len() == rows`.
    #[inline]
    pub fn mul_vec_into(&self, d: &[f64], out: &mut [f64]) {
        debug_assert_eq!(d.len(), self.cols);
        debug_assert_eq!(out.len(), self.rows);

        out.fill(0.0);
        for (j, &dj) in d.iter().enumerate() {
            for (o, &w) in out.iter_mut().zip(self.column(j)) {
                *o = w.mul_add(dj, *o);
            }
        }
    }

    /// `self -= scale * outer(x, d)`, i.e. `self[i, j] -= scale * x[i] * d[j]`.
    ///
    /// Shape contract: `x.len() == rows`, `d.len() == cols`.
    #[inline]
    pub fn sub_scaled_outer(&mut self, scale: f64, x: &[f64], d: &[f64]) {
        debug_assert_eq!(x.len(), self.rows);
        debug_assert_eq!(d.len(), self.cols);

        let rows = self.rows;
        for (j, &dj) in d.iter().enumerate() {
            let step = scale * dj;
            let col = &mut self.data[j * rows..(j + 1) * rows];
            for (w, &xi) in col.iter_mut().zip(x) {
                *w = (-step).mul_add(xi, *w);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn vector_bias_and_real_views() {
        let mut v = AugmentedVector::new(3);
        assert_eq!(v.len(), 4);
        assert_eq!(v.neurons(), 3);
        assert_eq!(v.bias(), BIAS);
        v.real_mut().copy_from_slice(&[1.0, 2.0, 3.0]);
        assert_eq!(v.as_slice(), &[1.0, 1.0, 2.0, 3.0]);

        let z = AugmentedVector::zeros(2);
        assert_eq!(z.as_slice(), &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn random_matrix_has_zero_bias_column_and_bounded_entries() {
        let mut rng = StdRng::seed_from_u64(7);
        let m = AugmentedMatrix::random(4, 3, &mut rng);
        assert_eq!((m.rows(), m.cols()), (5, 4));
        assert!(m.bias_column().iter().all(|&w| w == 0.0));
        assert!(m.as_slice().iter().all(|w| (-1.0..=1.0).contains(w)));
        assert!(m.as_slice()[m.rows()..].iter().any(|&w| w != 0.0));
    }

    #[test]
    fn column_major_products() {
        // [[1, 2],
        //  [3, 4],
        //  [5, 6]] stored column-major.
        let m = AugmentedMatrix::from_col_major(3, 2, vec![1.0, 3.0, 5.0, 2.0, 4.0, 6.0]).unwrap();
        assert_eq!(m.get(1, 1), 4.0);

        let mut out = [0.0; 2];
        m.vec_mul_into(&[1.0, 0.0, 1.0], &mut out);
        assert_eq!(out, [6.0, 8.0]);

        let mut back = [0.0; 3];
        m.mul_vec_into(&[1.0, -1.0], &mut back);
        assert_eq!(back, [-1.0, -1.0, -1.0]);

        let mut m2 = m.clone();
        m2.sub_scaled_outer(0.5, &[2.0, 0.0, 0.0], &[1.0, 2.0]);
        assert_eq!(m2.get(0, 0), 0.0);
        assert_eq!(m2.get(0, 1), 0.0);
        assert_eq!(m2.get(2, 1), 6.0);
    }

    #[test]
    fn from_col_major_checks_length() {
        assert!(AugmentedMatrix::from_col_major(2, 2, vec![0.0; 3]).is_none());
        assert!(AugmentedMatrix::from_col_major(2, 2, vec![0.0; 4]).is_some());
    }
}
