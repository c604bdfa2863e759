use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::augmented::BIAS;
use crate::{Activation, AugmentedMatrix, AugmentedVector, Error, Result, Samples, Topology, loss};

/// What happens to the bias slot (index 0) of non-input layers during propagation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum BiasSlot {
    /// Slot 0 is reset to `1.0` after every layer, so each layer keeps a live bias unit.
    ///
    /// Bias-slot error signals are then exactly zero and the weight column feeding the
    /// bias slot stays zero through training.
    #[default]
    Pinned,
    /// Slot 0 receives the activated pre-activation like any other slot.
    ///
    /// On a fresh model that is `tanh(0) = 0`, so downstream layers lose their bias input.
    /// Kept for bit-exact compatibility with models trained that way. Binary files do not
    /// record the policy; read such models back with [`Mlp::load_with_bias_slot`].
    Overwritten,
}

/// A dense feed-forward network with bias-augmented layers.
///
/// Layer `l` (for `l` in `1..=L`) receives `weights[l]`, an `(NPL[l-1]+1, NPL[l]+1)` matrix.
/// `weights[0]` is an empty placeholder so layer indices line up.
///
/// The activation and delta buffers are scratch space owned by the model: they are
/// overwritten by every forward/backward pass and are not part of a result.
#[derive(Debug, Clone)]
pub struct Mlp {
    topology: Topology,
    is_classification: bool,
    bias_slot: BiasSlot,
    weights: Vec<AugmentedMatrix>,
    activations: Vec<AugmentedVector>,
    deltas: Vec<AugmentedVector>,
}

impl Mlp {
    /// Random initialization from OS entropy.
    pub fn new(sizes: &[usize], is_classification: bool) -> Result<Self> {
        let mut rng = StdRng::from_entropy();
        Self::new_with_rng(sizes, is_classification, &mut rng)
    }

    pub fn new_with_seed(sizes: &[usize], is_classification: bool, seed: u64) -> Result<Self> {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::new_with_rng(sizes, is_classification, &mut rng)
    }

    pub fn new_with_rng<R: Rng + ?Sized>(
        sizes: &[usize],
        is_classification: bool,
        rng: &mut R,
    ) -> Result<Self> {
        let topology = Topology::new(sizes)?;

        let mut weights = Vec::with_capacity(sizes.len());
        weights.push(AugmentedMatrix::empty());
        for w in sizes.windows(2) {
            weights.push(AugmentedMatrix::random(w[0], w[1], rng));
        }

        Ok(Self::with_buffers(topology, is_classification, weights))
    }

    /// Assemble a model from explicit weights.
    ///
    /// `weights` holds layers `1..=L` (no placeholder); layer `l` must be
    /// `(NPL[l-1]+1, NPL[l]+1)`. Weights are taken as-is, column 0 included.
    pub fn from_parts(
        topology: Topology,
        is_classification: bool,
        weights: Vec<AugmentedMatrix>,
    ) -> Result<Self> {
        let last = topology.last_layer();
        if weights.len() != last {
            return Err(Error::InvalidShape(format!(
                "expected {last} weight layers, got {}",
                weights.len()
            )));
        }
        for (i, w) in weights.iter().enumerate() {
            let l = i + 1;
            let expected = (topology.neurons(l - 1) + 1, topology.neurons(l) + 1);
            if (w.rows(), w.cols()) != expected {
                return Err(Error::InvalidShape(format!(
                    "weight layer {l} has shape {}x{}, expected {}x{}",
                    w.rows(),
                    w.cols(),
                    expected.0,
                    expected.1
                )));
            }
        }

        let mut all = Vec::with_capacity(weights.len() + 1);
        all.push(AugmentedMatrix::empty());
        all.extend(weights);
        Ok(Self::with_buffers(topology, is_classification, all))
    }

    fn with_buffers(
        topology: Topology,
        is_classification: bool,
        weights: Vec<AugmentedMatrix>,
    ) -> Self {
        let activations = topology
            .as_slice()
            .iter()
            .map(|&n| AugmentedVector::new(n))
            .collect();
        let deltas = topology
            .as_slice()
            .iter()
            .map(|&n| AugmentedVector::zeros(n))
            .collect();

        Self {
            topology,
            is_classification,
            bias_slot: BiasSlot::default(),
            weights,
            activations,
            deltas,
        }
    }

    /// Select the bias-slot policy used by subsequent passes.
    pub fn with_bias_slot(mut self, bias_slot: BiasSlot) -> Self {
        self.set_bias_slot(bias_slot);
        self
    }

    pub fn set_bias_slot(&mut self, bias_slot: BiasSlot) {
        self.bias_slot = bias_slot;
        for a in &mut self.activations {
            a.set_bias(BIAS);
        }
    }

    #[inline]
    pub fn bias_slot(&self) -> BiasSlot {
        self.bias_slot
    }

    #[inline]
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    #[inline]
    pub fn is_classification(&self) -> bool {
        self.is_classification
    }

    #[inline]
    pub fn input_dim(&self) -> usize {
        self.topology.input_dim()
    }

    #[inline]
    pub fn output_dim(&self) -> usize {
        self.topology.output_dim()
    }

    /// Index of the output layer (`L`).
    #[inline]
    pub fn last_layer(&self) -> usize {
        self.topology.last_layer()
    }

    /// Incoming weights of layer `l`.
    ///
    /// Panics if `l == 0` or `l > L`.
    #[inline]
    pub fn weights(&self, l: usize) -> &AugmentedMatrix {
        assert!(
            (1..=self.last_layer()).contains(&l),
            "weight layer {l} out of range 1..={}",
            self.last_layer()
        );
        &self.weights[l]
    }

    /// Activations of layer `l` from the most recent forward pass (scratch).
    #[inline]
    pub fn activations(&self, l: usize) -> &AugmentedVector {
        &self.activations[l]
    }

    /// Error signals of layer `l` from the most recent backward pass (scratch).
    #[inline]
    pub fn deltas(&self, l: usize) -> &AugmentedVector {
        &self.deltas[l]
    }

    #[inline]
    pub(crate) fn weight_layers(&self) -> &[AugmentedMatrix] {
        &self.weights[1..]
    }

    #[cfg(test)]
    pub(crate) fn weights_mut(&mut self, l: usize) -> &mut AugmentedMatrix {
        &mut self.weights[l]
    }

    /// Forward pass for a single sample.
    ///
    /// Copies `input` into the real slots of layer 0, then computes every layer's
    /// activations in order. The result is left in the activation cache.
    pub fn propagate(&mut self, input: &[f64]) -> Result<()> {
        if input.len() != self.input_dim() {
            return Err(Error::InvalidShape(format!(
                "input len {} does not match model input_dim {}",
                input.len(),
                self.input_dim()
            )));
        }

        self.activations[0].real_mut().copy_from_slice(input);

        let last = self.last_layer();
        for l in 1..=last {
            // Borrow the previous layer immutably and the current one mutably.
            let (left, right) = self.activations.split_at_mut(l);
            let prev = &left[l - 1];
            let out = &mut right[0];

            self.weights[l].vec_mul_into(prev.as_slice(), out.as_mut_slice());
            Activation::for_layer(l, last, self.is_classification)
                .forward_in_place(out.as_mut_slice());

            if self.bias_slot == BiasSlot::Pinned {
                out.set_bias(BIAS);
            }
        }

        Ok(())
    }

    /// Backward pass for a single sample.
    ///
    /// You must call [`Mlp::propagate`] first with the matching input. `target` is the
    /// un-augmented target of length `output_dim()`.
    ///
    /// Fills the delta cache for layers `1..=L` and returns the sample's mean squared
    /// error, measured before the output derivative is applied.
    pub fn backpropagate(&mut self, target: &[f64]) -> Result<f64> {
        if target.len() != self.output_dim() {
            return Err(Error::InvalidShape(format!(
                "target len {} does not match model output_dim {}",
                target.len(),
                self.output_dim()
            )));
        }

        let last = self.last_layer();
        let error = self.output_error(target);

        if self.is_classification {
            let out = &self.activations[last];
            for (d, &y) in self.deltas[last].as_mut_slice().iter_mut().zip(out.as_slice()) {
                *d *= Activation::Tanh.grad_from_output(y);
            }
        }

        for l in (2..=last).rev() {
            let (left, right) = self.deltas.split_at_mut(l);
            let d_prev = &mut left[l - 1];
            let d_cur = &right[0];

            self.weights[l].mul_vec_into(d_cur.as_slice(), d_prev.as_mut_slice());
            for (d, &y) in d_prev
                .as_mut_slice()
                .iter_mut()
                .zip(self.activations[l - 1].as_slice())
            {
                *d *= Activation::Tanh.grad_from_output(y);
            }
        }

        if self.bias_slot == BiasSlot::Pinned {
            for d in &mut self.deltas[1..] {
                d.set_bias(0.0);
            }
        }

        Ok(error)
    }

    /// Writes `output - augmented(target)` into the output delta and returns its mean square.
    ///
    /// The mean runs over the whole augmented vector, bias slot included. Under
    /// [`BiasSlot::Pinned`] the bias term is zero but still counts in the denominator.
    fn output_error(&mut self, target: &[f64]) -> f64 {
        let last = self.last_layer();
        let out = &self.activations[last];
        let delta = &mut self.deltas[last];

        delta.set_bias(out.bias() - BIAS);
        loss::error_signal(out.real(), target, delta.real_mut());
        loss::mean_square(delta.as_slice())
    }

    /// Error of the most recent forward pass against `target`, without touching the deltas.
    ///
    /// Same measurement rule as [`Mlp::backpropagate`].
    pub(crate) fn sample_error(&self, target: &[f64]) -> f64 {
        let out = &self.activations[self.last_layer()];
        let real = loss::mse(out.real(), target);
        let bias_diff = out.bias() - BIAS;
        let n = out.len() as f64;
        bias_diff.mul_add(bias_diff, real * (n - 1.0)) / n
    }

    /// Applies `weights[l] -= learning_rate * outer(activations[l-1], deltas[l])` to every
    /// layer, using the caches from the last forward/backward pass.
    pub fn apply_update(&mut self, learning_rate: f64) {
        assert!(learning_rate.is_finite(), "learning rate must be finite");

        for l in 1..=self.last_layer() {
            self.weights[l].sub_scaled_outer(
                learning_rate,
                self.activations[l - 1].as_slice(),
                self.deltas[l].as_slice(),
            );
        }
    }

    /// One online SGD step: forward, backward, update. Returns the sample error.
    pub fn train_step(&mut self, input: &[f64], target: &[f64], learning_rate: f64) -> Result<f64> {
        if !learning_rate.is_finite() {
            return Err(Error::InvalidConfig(format!(
                "learning rate must be finite, got {learning_rate}"
            )));
        }
        self.propagate(input)?;
        let error = self.backpropagate(target)?;
        self.apply_update(learning_rate);
        Ok(error)
    }

    /// Predict a single sample. Returns the output layer without its bias slot.
    pub fn predict(&mut self, input: &[f64]) -> Result<Vec<f64>> {
        self.propagate(input)?;
        Ok(self.output().to_vec())
    }

    /// Shape-checked prediction into a caller-provided buffer.
    pub fn predict_into(&mut self, input: &[f64], out: &mut [f64]) -> Result<()> {
        if out.len() != self.output_dim() {
            return Err(Error::InvalidShape(format!(
                "output len {} does not match model output_dim {}",
                out.len(),
                self.output_dim()
            )));
        }
        self.propagate(input)?;
        out.copy_from_slice(self.output());
        Ok(())
    }

    /// Predict every sample (column) of `inputs`, preserving order.
    pub fn predict_batch(&mut self, inputs: &Samples) -> Result<Samples> {
        if inputs.dim() != self.input_dim() {
            return Err(Error::InvalidShape(format!(
                "inputs dim {} does not match model input_dim {}",
                inputs.dim(),
                self.input_dim()
            )));
        }

        let out_dim = self.output_dim();
        let mut preds = vec![0.0_f64; inputs.len() * out_dim];
        for (x, y) in inputs.columns().zip(preds.chunks_exact_mut(out_dim)) {
            self.predict_into(x, y)?;
        }

        Samples::from_flat(preds, out_dim)
    }

    /// Real output slots from the most recent forward pass.
    #[inline]
    pub fn output(&self) -> &[f64] {
        self.activations[self.last_layer()].real()
    }
}
