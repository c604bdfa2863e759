//! Sample matrices and datasets.
//!
//! Samples are the *columns* of a matrix: a `Samples` value with dimension `dim` and `len`
//! samples is a `(dim, len)` matrix stored column-major, so every sample is a contiguous
//! slice. Targets use the same type.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::{Error, Result};

/// A collection of samples (one per column).
///
/// Stored as a contiguous buffer:
/// - `values.len() == len * dim`
/// - sample `idx` is `values[idx * dim..(idx + 1) * dim]`
#[derive(Debug, Clone, PartialEq)]
pub struct Samples {
    values: Vec<f64>,
    len: usize,
    dim: usize,
}

impl Samples {
    /// Build samples from a flat column-major buffer with shape `(dim, len)`.
    pub fn from_flat(values: Vec<f64>, dim: usize) -> Result<Self> {
        if dim == 0 {
            return Err(Error::InvalidData("sample dim must be > 0".to_owned()));
        }
        if values.len() % dim != 0 {
            return Err(Error::InvalidData(format!(
                "buffer length {} is not divisible by sample dim {}",
                values.len(),
                dim
            )));
        }

        let len = values.len() / dim;
        Ok(Self { values, len, dim })
    }

    /// Build samples from one vector per sample.
    ///
    /// This is a convenience constructor (it copies into contiguous storage).
    pub fn from_columns(columns: &[Vec<f64>]) -> Result<Self> {
        let Some(first) = columns.first() else {
            return Err(Error::InvalidData("samples must not be empty".to_owned()));
        };

        let dim = first.len();
        if dim == 0 {
            return Err(Error::InvalidData("sample dim must be > 0".to_owned()));
        }
        for (i, col) in columns.iter().enumerate() {
            if col.len() != dim {
                return Err(Error::InvalidData(format!(
                    "sample {i} has len {}, expected {dim}",
                    col.len()
                )));
            }
        }

        let values = columns.iter().flatten().copied().collect();
        Ok(Self {
            values,
            len: columns.len(),
            dim,
        })
    }

    /// Build single-value samples, e.g. scalar targets.
    pub fn from_scalars(values: &[f64]) -> Result<Self> {
        Self::from_flat(values.to_vec(), 1)
    }

    #[inline]
    /// Returns the number of samples (matrix columns).
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    /// Returns the per-sample dimension (matrix rows).
    pub fn dim(&self) -> usize {
        self.dim
    }

    #[inline]
    /// Returns sample `idx`.
    ///
    /// Panics if `idx >= len`.
    pub fn column(&self, idx: usize) -> &[f64] {
        let start = idx * self.dim;
        &self.values[start..start + self.dim]
    }

    #[inline]
    pub fn columns(&self) -> impl ExactSizeIterator<Item = &[f64]> + '_ {
        self.values.chunks_exact(self.dim)
    }

    /// Raw column-major storage.
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }
}

/// Inputs paired with targets, sample by sample.
#[derive(Debug, Clone, Copy)]
pub struct Dataset<'a> {
    inputs: &'a Samples,
    targets: &'a Samples,
}

impl<'a> Dataset<'a> {
    /// Pair inputs with targets.
    ///
    /// Fails with [`Error::InvalidShape`] if the sample counts differ.
    pub fn new(inputs: &'a Samples, targets: &'a Samples) -> Result<Self> {
        if inputs.len() != targets.len() {
            return Err(Error::InvalidShape(format!(
                "inputs have {} samples but targets have {}",
                inputs.len(),
                targets.len()
            )));
        }
        Ok(Self { inputs, targets })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    #[inline]
    pub fn input_dim(&self) -> usize {
        self.inputs.dim()
    }

    #[inline]
    pub fn target_dim(&self) -> usize {
        self.targets.dim()
    }

    #[inline]
    pub fn input(&self, idx: usize) -> &'a [f64] {
        self.inputs.column(idx)
    }

    #[inline]
    pub fn target(&self, idx: usize) -> &'a [f64] {
        self.targets.column(idx)
    }

    /// Randomly partition sample indices into a training and a held-out test subset.
    ///
    /// `train_proportion` is clamped into `[0, 1]`. The training subset holds the first
    /// `floor(len * train_proportion)` indices of a random permutation; the test subset
    /// holds the rest and may be empty.
    pub fn split<R: Rng + ?Sized>(&self, train_proportion: f64, rng: &mut R) -> Split {
        let proportion = train_proportion.clamp(0.0, 1.0);
        let mut indices: Vec<usize> = (0..self.len()).collect();
        indices.shuffle(rng);

        let train_count = ((self.len() as f64 * proportion).floor() as usize).min(self.len());
        let test = indices.split_off(train_count);
        Split {
            train: indices,
            test,
        }
    }
}

/// Index partition produced by [`Dataset::split`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}
