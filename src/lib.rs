//! A small MLP (multi-layer perceptron) crate trained by online backpropagation.
//!
//! `online-mlp` is a from-scratch dense feed-forward network where every layer carries a
//! bias unit in slot 0 of its activation vector, and every weight matrix carries the
//! matching extra row and column. Training is stochastic: one randomly drawn sample per
//! step, with periodic error checkpoints on a held-out split.
//!
//! # Design goals
//!
//! - Explicit bias layout: [`AugmentedVector`] / [`AugmentedMatrix`] name the bias slot
//!   instead of leaving index 0 as a convention.
//! - Reused buffers: activations and error signals live on the model and are overwritten
//!   by every pass, so prediction and training steps do not allocate them.
//! - Reproducibility on demand: every random choice can be driven by a seed or a caller
//!   supplied RNG.
//!
//! # Model shape
//!
//! - Scalars are `f64`.
//! - Hidden layers use `tanh`; the output layer uses `tanh` for classification and the
//!   identity for regression.
//! - Weight layer `l` has shape `(NPL[l-1]+1, NPL[l]+1)`, stored column-major.
//! - Sample matrices ([`Samples`]) hold one sample per column.
//!
//! # Panics vs `Result`
//!
//! Public entry points on [`Mlp`] validate shapes and return [`Result`]. The lower-level
//! helpers assume their shape contracts: [`loss::mse`] and [`loss::error_signal`] panic on a
//! length mismatch, and [`Mlp::apply_update`] panics on a non-finite learning rate.
//!
//! # Quick start
//!
//! ```rust
//! use online_mlp::{Mlp, RngSource, Samples, TrainConfig};
//!
//! # fn main() -> online_mlp::Result<()> {
//! let x = Samples::from_columns(&[vec![1.0, 1.0], vec![2.0, 2.0], vec![3.0, 1.0]])?;
//! let y = Samples::from_scalars(&[1.0, 1.0, -1.0])?;
//!
//! let mut mlp = Mlp::new_with_seed(&[2, 2, 1], true, 0)?;
//! let report = mlp.train(
//!     &x,
//!     &y,
//!     &TrainConfig {
//!         num_iter: 1000,
//!         learning_rate: 0.1,
//!         train_proportion: 0.8,
//!         error_list_size: 10,
//!         rng: RngSource::Seeded(0),
//!     },
//! )?;
//! assert_eq!(report.train_errors.len(), 10);
//!
//! let pred = mlp.predict(&[3.0, 1.0])?;
//! assert_eq!(pred.len(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! # Manual training loop
//!
//! ```rust
//! use online_mlp::Mlp;
//!
//! # fn main() -> online_mlp::Result<()> {
//! let mut mlp = Mlp::new_with_seed(&[3, 8, 2], false, 0)?;
//! let x = [0.1, -0.2, 0.3];
//! let t = [0.0, 1.0];
//!
//! mlp.propagate(&x)?;
//! let _err = mlp.backpropagate(&t)?;
//! mlp.apply_update(1e-2);
//! # Ok(())
//! # }
//! ```

pub mod activation;
pub mod augmented;
pub mod codec;
pub mod data;
pub mod error;
pub mod loss;
pub mod mlp;
pub mod topology;
pub mod train;

#[cfg(feature = "serde")]
pub mod serde_model;

pub use activation::Activation;
pub use augmented::{AugmentedMatrix, AugmentedVector};
pub use data::{Dataset, Samples, Split};
pub use error::{Error, Result};
pub use mlp::{BiasSlot, Mlp};
pub use topology::Topology;
pub use train::{RngSource, TrainConfig, TrainReport};
