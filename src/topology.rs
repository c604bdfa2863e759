//! Network shape.
//!
//! A [`Topology`] is the neuron count of every layer, input first and output last.
//! Bias units are not counted here; they are added by the augmented buffers.

use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    sizes: Vec<usize>,
}

impl Topology {
    /// Validate and wrap per-layer neuron counts.
    ///
    /// `sizes` includes input and output layers, so its length must be at least 2.
    pub fn new(sizes: &[usize]) -> Result<Self> {
        if sizes.len() < 2 {
            return Err(Error::InvalidConfig(
                "topology must include input and output layers".to_owned(),
            ));
        }
        if let Some(idx) = sizes.iter().position(|&n| n == 0) {
            return Err(Error::InvalidConfig(format!(
                "layer {idx} has 0 neurons; all layer sizes must be > 0"
            )));
        }
        Ok(Self {
            sizes: sizes.to_vec(),
        })
    }

    /// Index of the output layer (`L`).
    #[inline]
    pub fn last_layer(&self) -> usize {
        self.sizes.len() - 1
    }

    #[inline]
    pub fn input_dim(&self) -> usize {
        self.sizes[0]
    }

    #[inline]
    pub fn output_dim(&self) -> usize {
        self.sizes[self.last_layer()]
    }

    /// Neuron count of layer `l`, bias excluded.
    ///
    /// Panics if `l > last_layer()`.
    #[inline]
    pub fn neurons(&self, l: usize) -> usize {
        self.sizes[l]
    }

    #[inline]
    pub fn as_slice(&self) -> &[usize] {
        &self.sizes
    }

    /// Total number of weights across layers `1..=L`, bias rows/columns included.
    pub fn num_weights(&self) -> usize {
        self.sizes.windows(2).map(|w| (w[0] + 1) * (w[1] + 1)).sum()
    }
}

impl TryFrom<&[usize]> for Topology {
    type Error = Error;

    fn try_from(value: &[usize]) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<Vec<usize>> for Topology {
    type Error = Error;

    fn try_from(value: Vec<usize>) -> Result<Self> {
        Self::new(&value)
    }
}
