//! Model serialization/deserialization (feature: `serde`).
//!
//! This module defines a versioned JSON format for `Mlp`, next to the positional binary
//! format in [`crate::codec`].
//!
//! Design notes:
//! - We do NOT directly serialize internal `Mlp` buffers; only topology, mode flag,
//!   bias-slot policy and weights are stored.
//! - `bias_slot` may be absent and then reads as [`BiasSlot::Pinned`].
//! - All deserialization validates the topology, weight lengths, and that all weights are
//!   finite.

use serde::{Deserialize, Serialize};

use std::path::Path;

use crate::{AugmentedMatrix, BiasSlot, Error, Mlp, Result, Topology};

pub const MODEL_FORMAT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SerializedMlp {
    pub format_version: u32,
    pub classification: bool,
    /// Neuron count per layer, input first.
    pub topology: Vec<usize>,
    /// `weights[k]` holds layer `k + 1`, column-major `(NPL[k]+1, NPL[k+1]+1)`.
    pub weights: Vec<Vec<f64>>,
    #[serde(default)]
    pub bias_slot: BiasSlot,
}

impl SerializedMlp {
    pub fn validate(&self) -> Result<()> {
        if self.format_version != MODEL_FORMAT_VERSION {
            return Err(Error::InvalidData(format!(
                "unsupported model format_version {}; expected {}",
                self.format_version, MODEL_FORMAT_VERSION
            )));
        }

        let topology = Topology::new(&self.topology)
            .map_err(|e| Error::InvalidData(format!("invalid topology: {e}")))?;
        if self.weights.len() != topology.last_layer() {
            return Err(Error::InvalidData(format!(
                "expected {} weight layers, got {}",
                topology.last_layer(),
                self.weights.len()
            )));
        }

        for (k, (w, dims)) in self.weights.iter().zip(self.topology.windows(2)).enumerate() {
            let expected = (dims[0] + 1) * (dims[1] + 1);
            if w.len() != expected {
                return Err(Error::InvalidData(format!(
                    "weight layer {} has {} values, expected {expected}",
                    k + 1,
                    w.len()
                )));
            }
            if w.iter().any(|v| !v.is_finite()) {
                return Err(Error::InvalidData(format!(
                    "weight layer {} must contain only finite values",
                    k + 1
                )));
            }
        }

        Ok(())
    }
}

impl From<&Mlp> for SerializedMlp {
    fn from(model: &Mlp) -> Self {
        Self {
            format_version: MODEL_FORMAT_VERSION,
            classification: model.is_classification(),
            topology: model.topology().as_slice().to_vec(),
            weights: model
                .weight_layers()
                .iter()
                .map(|w| w.as_slice().to_vec())
                .collect(),
            bias_slot: model.bias_slot(),
        }
    }
}

impl TryFrom<SerializedMlp> for Mlp {
    type Error = Error;

    fn try_from(value: SerializedMlp) -> std::result::Result<Self, Self::Error> {
        value.validate()?;

        let topology = Topology::new(&value.topology)?;
        let mut weights = Vec::with_capacity(value.weights.len());
        for (k, (data, dims)) in value
            .weights
            .into_iter()
            .zip(value.topology.windows(2))
            .enumerate()
        {
            let m = AugmentedMatrix::from_col_major(dims[0] + 1, dims[1] + 1, data)
                .ok_or_else(|| Error::InvalidData(format!("weight layer {} invalid", k + 1)))?;
            weights.push(m);
        }

        let mlp = Mlp::from_parts(topology, value.classification, weights)?;
        Ok(mlp.with_bias_slot(value.bias_slot))
    }
}

impl Mlp {
    /// Serialize the model to a pretty-printed JSON string.
    pub fn to_json_string_pretty(&self) -> Result<String> {
        let ser = SerializedMlp::from(self);
        serde_json::to_string_pretty(&ser)
            .map_err(|e| Error::InvalidData(format!("failed to serialize model: {e}")))
    }

    /// Serialize the model to a compact JSON string.
    pub fn to_json_string(&self) -> Result<String> {
        let ser = SerializedMlp::from(self);
        serde_json::to_string(&ser)
            .map_err(|e| Error::InvalidData(format!("failed to serialize model: {e}")))
    }

    /// Parse a model from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let ser: SerializedMlp = serde_json::from_str(s)
            .map_err(|e| Error::InvalidData(format!("failed to parse model json: {e}")))?;
        ser.try_into()
    }

    /// Save the model to a JSON file (pretty-printed).
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let s = self.to_json_string_pretty()?;
        let p = path.as_ref();
        std::fs::write(p, s).map_err(|e| Error::io(p, e))
    }

    /// Load a model from a JSON file.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let p = path.as_ref();
        let s = std::fs::read_to_string(p).map_err(|e| Error::io(p, e))?;
        Self::from_json_str(&s)
    }
}
