//! Online training.
//!
//! `Mlp::train` draws one random training sample per step, runs forward + backward, and
//! applies an SGD update. Errors are sampled at evenly spaced checkpoints into a
//! [`TrainReport`].

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{Dataset, Error, Mlp, Result, Samples};

/// Where training randomness comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", content = "seed", rename_all = "snake_case"))]
pub enum RngSource {
    /// Fresh OS entropy on every call; runs are not reproducible.
    #[default]
    Entropy,
    /// Deterministic stream from a fixed seed.
    Seeded(u64),
}

impl RngSource {
    pub fn rng(self) -> StdRng {
        match self {
            RngSource::Entropy => StdRng::from_entropy(),
            RngSource::Seeded(seed) => StdRng::seed_from_u64(seed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TrainConfig {
    /// Number of SGD steps. Must be > 0.
    pub num_iter: usize,
    pub learning_rate: f64,
    /// Share of samples used for weight updates; clamped into `[0, 1]`.
    pub train_proportion: f64,
    /// Number of checkpoints in the error log; clamped to `num_iter`.
    pub error_list_size: usize,
    pub rng: RngSource,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            num_iter: 1000,
            learning_rate: 1e-2,
            train_proportion: 0.8,
            error_list_size: 10,
            rng: RngSource::Entropy,
        }
    }
}

impl TrainConfig {
    pub fn validate(&self) -> Result<()> {
        if self.num_iter == 0 {
            return Err(Error::InvalidConfig("num_iter must be > 0".to_owned()));
        }
        if !self.learning_rate.is_finite() {
            return Err(Error::InvalidConfig(format!(
                "learning rate must be finite, got {}",
                self.learning_rate
            )));
        }
        if self.train_proportion.is_nan() {
            return Err(Error::InvalidConfig(
                "train proportion must not be NaN".to_owned(),
            ));
        }
        Ok(())
    }

    /// Checkpoint count after clamping.
    #[inline]
    pub fn checkpoints(&self) -> usize {
        self.error_list_size.min(self.num_iter)
    }

    /// Steps between checkpoints: `max(1, num_iter / checkpoints)`.
    #[inline]
    pub fn checkpoint_interval(&self) -> usize {
        match self.checkpoints() {
            0 => self.num_iter.max(1),
            n => (self.num_iter / n).max(1),
        }
    }
}

/// Error log produced by [`Mlp::train`].
///
/// Both series have one entry per checkpoint, oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainReport {
    /// Mean training error over the steps since the previous checkpoint.
    pub train_errors: Vec<f64>,
    /// Mean error over the held-out subset at each checkpoint; 0 when it is empty.
    pub test_errors: Vec<f64>,
}

impl TrainReport {
    #[inline]
    pub fn len(&self) -> usize {
        self.train_errors.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.train_errors.is_empty()
    }
}

impl Mlp {
    /// Train on `inputs`/`targets` (one sample per column) with online SGD.
    ///
    /// Randomness comes from `cfg.rng`. See [`Mlp::train_with_rng`].
    pub fn train(
        &mut self,
        inputs: &Samples,
        targets: &Samples,
        cfg: &TrainConfig,
    ) -> Result<TrainReport> {
        let mut rng = cfg.rng.rng();
        self.train_with_rng(inputs, targets, cfg, &mut rng)
    }

    /// Train using the provided RNG for the split and the per-step sample draws.
    ///
    /// Everything is validated before the first weight update, so on error the model is
    /// unchanged.
    pub fn train_with_rng<R: Rng + ?Sized>(
        &mut self,
        inputs: &Samples,
        targets: &Samples,
        cfg: &TrainConfig,
        rng: &mut R,
    ) -> Result<TrainReport> {
        cfg.validate()?;
        let data = Dataset::new(inputs, targets)?;
        self.check_dataset(&data)?;

        let split = data.split(cfg.train_proportion, rng);
        if split.train.is_empty() {
            return Err(Error::InvalidConfig(format!(
                "training subset is empty ({} samples, train proportion {})",
                data.len(),
                cfg.train_proportion
            )));
        }

        let checkpoints = cfg.checkpoints();
        let interval = cfg.checkpoint_interval();
        info!(
            "training {:?} for {} steps: {} train / {} test samples, {} checkpoints every {} steps",
            self.topology().as_slice(),
            cfg.num_iter,
            split.train.len(),
            split.test.len(),
            checkpoints,
            interval
        );

        let mut report = TrainReport {
            train_errors: Vec::with_capacity(checkpoints),
            test_errors: Vec::with_capacity(checkpoints),
        };
        let mut running = 0.0_f64;

        for step in 1..=cfg.num_iter {
            let idx = split.train[rng.gen_range(0..split.train.len())];
            running += self.train_step(data.input(idx), data.target(idx), cfg.learning_rate)?;

            if step % interval == 0 && report.len() < checkpoints {
                let train_error = running / interval as f64;
                running = 0.0;

                let test_error = if split.test.is_empty() {
                    0.0
                } else {
                    self.subset_mse(&data, &split.test)?
                };

                debug!(
                    "checkpoint {}/{} at step {step}: train_error={train_error:.6} test_error={test_error:.6}",
                    report.len() + 1,
                    checkpoints
                );
                report.train_errors.push(train_error);
                report.test_errors.push(test_error);
            }
        }

        info!(
            "training finished: last train_error={:?} test_error={:?}",
            report.train_errors.last(),
            report.test_errors.last()
        );
        Ok(report)
    }

    /// Mean per-sample error over a dataset (forward pass only).
    pub fn evaluate_mse(&mut self, inputs: &Samples, targets: &Samples) -> Result<f64> {
        let data = Dataset::new(inputs, targets)?;
        if data.is_empty() {
            return Err(Error::InvalidData("dataset must not be empty".to_owned()));
        }
        self.check_dataset(&data)?;

        let all: Vec<usize> = (0..data.len()).collect();
        self.subset_mse(&data, &all)
    }

    fn subset_mse(&mut self, data: &Dataset<'_>, indices: &[usize]) -> Result<f64> {
        let mut total = 0.0_f64;
        for &idx in indices {
            self.propagate(data.input(idx))?;
            total += self.sample_error(data.target(idx));
        }
        Ok(total / indices.len() as f64)
    }

    fn check_dataset(&self, data: &Dataset<'_>) -> Result<()> {
        if data.input_dim() != self.input_dim() {
            return Err(Error::InvalidShape(format!(
                "input dim {} does not match model input_dim {}",
                data.input_dim(),
                self.input_dim()
            )));
        }
        if data.target_dim() != self.output_dim() {
            return Err(Error::InvalidShape(format!(
                "target dim {} does not match model output_dim {}",
                data.target_dim(),
                self.output_dim()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn xor() -> (Samples, Samples) {
        let x = Samples::from_columns(&[
            vec![-1.0, -1.0],
            vec![-1.0, 1.0],
            vec![1.0, -1.0],
            vec![1.0, 1.0],
        ])
        .unwrap();
        let y = Samples::from_scalars(&[-1.0, 1.0, 1.0, -1.0]).unwrap();
        (x, y)
    }

    #[test]
    fn checkpoint_interval_rules() {
        let cfg = TrainConfig {
            num_iter: 1000,
            error_list_size: 10,
            ..TrainConfig::default()
        };
        assert_eq!(cfg.checkpoints(), 10);
        assert_eq!(cfg.checkpoint_interval(), 100);

        let clamped = TrainConfig {
            num_iter: 5,
            error_list_size: 50,
            ..TrainConfig::default()
        };
        assert_eq!(clamped.checkpoints(), 5);
        assert_eq!(clamped.checkpoint_interval(), 1);

        let uneven = TrainConfig {
            num_iter: 7,
            error_list_size: 3,
            ..TrainConfig::default()
        };
        assert_eq!(uneven.checkpoint_interval(), 2);
    }

    #[test]
    fn validate_rejects_bad_config() {
        let zero_iter = TrainConfig {
            num_iter: 0,
            ..TrainConfig::default()
        };
        assert!(matches!(zero_iter.validate(), Err(Error::InvalidConfig(_))));

        let bad_lr = TrainConfig {
            learning_rate: f64::NAN,
            ..TrainConfig::default()
        };
        assert!(bad_lr.validate().is_err());

        for learning_rate in [0.0, -0.5] {
            let cfg = TrainConfig {
                learning_rate,
                ..TrainConfig::default()
            };
            assert!(cfg.validate().is_ok(), "learning_rate={learning_rate}");
        }
        assert!(TrainConfig::default().validate().is_ok());
    }

    #[test]
    fn seeded_training_is_reproducible() {
        let (x, y) = xor();
        let cfg = TrainConfig {
            num_iter: 200,
            learning_rate: 0.05,
            train_proportion: 0.75,
            error_list_size: 4,
            rng: RngSource::Seeded(42),
        };

        let mut a = Mlp::new_with_seed(&[2, 3, 1], true, 1).unwrap();
        let mut b = a.clone();
        let ra = a.train(&x, &y, &cfg).unwrap();
        let rb = b.train(&x, &y, &cfg).unwrap();
        assert_eq!(ra, rb);
        assert_eq!(a.weights(1), b.weights(1));
    }

    #[test]
    fn uneven_interval_still_fills_log() {
        let (x, y) = xor();
        let cfg = TrainConfig {
            num_iter: 7,
            learning_rate: 0.01,
            train_proportion: 1.0,
            error_list_size: 3,
            rng: RngSource::Seeded(0),
        };
        let mut mlp = Mlp::new_with_seed(&[2, 2, 1], false, 0).unwrap();
        let report = mlp.train(&x, &y, &cfg).unwrap();
        assert_eq!(report.len(), 3);
    }

    #[test]
    fn failed_validation_leaves_weights_untouched() {
        let (x, y) = xor();
        let mut mlp = Mlp::new_with_seed(&[2, 2, 1], true, 0).unwrap();
        let before = mlp.weights(1).clone();

        let empty_train = TrainConfig {
            train_proportion: 0.0,
            rng: RngSource::Seeded(0),
            ..TrainConfig::default()
        };
        assert!(matches!(
            mlp.train(&x, &y, &empty_train),
            Err(Error::InvalidConfig(_))
        ));

        let wrong_targets = Samples::from_flat(vec![0.0; 8], 2).unwrap();
        assert!(matches!(
            mlp.train(&x, &wrong_targets, &TrainConfig::default()),
            Err(Error::InvalidShape(_))
        ));
        assert_eq!(mlp.weights(1), &before);
    }

    #[test]
    fn evaluate_mse_is_zero_for_perfect_regressor() {
        let topology = crate::Topology::new(&[1, 1]).unwrap();
        let w = crate::AugmentedMatrix::from_col_major(2, 2, vec![0.0, 0.0, 1.0, 2.0]).unwrap();
        let mut mlp = Mlp::from_parts(topology, false, vec![w]).unwrap();

        let x = Samples::from_scalars(&[0.0, 1.0, -2.0]).unwrap();
        let y = Samples::from_scalars(&[1.0, 3.0, -3.0]).unwrap();
        assert_eq!(mlp.evaluate_mse(&x, &y).unwrap(), 0.0);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn config_reads_from_json_with_defaults() {
        let cfg: TrainConfig = serde_json::from_str(
            r#"{"num_iter": 50, "rng": {"kind": "seeded", "seed": 7}}"#,
        )
        .unwrap();
        assert_eq!(cfg.num_iter, 50);
        assert_eq!(cfg.rng, RngSource::Seeded(7));
        assert_eq!(cfg.learning_rate, TrainConfig::default().learning_rate);

        let entropy: RngSource = serde_json::from_str(r#"{"kind": "entropy"}"#).unwrap();
        assert_eq!(entropy, RngSource::Entropy);
    }
}
