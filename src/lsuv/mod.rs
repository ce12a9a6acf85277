//! Layer-sequential unit-variance (LSUV) initialization.
//!
//! For every layer with a weight kernel, in model order:
//!
//! 1. Replace the kernel with an orthonormal one ([`seed_orthonormal`]),
//!    keeping the bias.
//! 2. Measure the variance of the layer's output on a sample batch.
//! 3. Divide the kernel by `sqrt(variance) / sqrt(target)` and measure again,
//!    until the variance is within the margin of the target or the standard
//!    deviation collapses. The rescale counter is checked after each
//!    re-measure and stops the layer once it exceeds `max_iter`.
//!
//! Layers are processed strictly one after another: a layer's statistics
//! depend on the final weights of every layer before it.
//!
//! # Example
//!
//! ```
//! use lsuv::lsuv::{LsuvConfig, LsuvInit};
//! use lsuv::nn::{normal, Linear, ReLU, Sequential};
//!
//! let mut model = Sequential::new()
//!     .add(Linear::with_seed(20, 64, Some(1)))
//!     .add(ReLU::new())
//!     .add(Linear::with_seed(64, 10, Some(2)));
//! let batch = normal(&[16, 20], 0.0, 1.0, Some(3));
//!
//! let mut init = LsuvInit::with_config(LsuvConfig::default().with_verbose(false)).seed(4);
//! let report = init.initialize(&mut model, &batch).unwrap();
//!
//! // the 10-wide output layer is too small to normalize
//! assert_eq!(report.layers_initialized, 1);
//! ```
//!
//! # References
//!
//! - Mishkin, D., & Matas, J. (2016). All you need is a good init. ICLR.

mod config;
mod graph;
mod report;

pub use config::LsuvConfig;
pub use graph::LayerGraph;
pub use report::{LayerOutcome, LayerReport, LsuvReport};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::nn::{seed_orthonormal, WeightSet};
use crate::tensor::Tensor;

/// Runs LSUV over any [`LayerGraph`].
///
/// Holds the settings and the random source used for orthonormal seeding.
#[derive(Debug, Clone)]
pub struct LsuvInit {
    config: LsuvConfig,
    rng: StdRng,
}

impl LsuvInit {
    /// Default settings, entropy-seeded random source.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(LsuvConfig::default())
    }

    /// Custom settings, entropy-seeded random source.
    #[must_use]
    pub fn with_config(config: LsuvConfig) -> Self {
        Self {
            config,
            rng: StdRng::from_entropy(),
        }
    }

    /// Default settings with a reproducible random source.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self::new().seed(seed)
    }

    /// Replace the random source with one seeded from `seed`.
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Current settings.
    #[must_use]
    pub fn config(&self) -> &LsuvConfig {
        &self.config
    }

    /// Normalize every eligible layer of `model` in place.
    ///
    /// A layer is eligible when its kind has a weight kernel and the product
    /// of its non-batch output dimensions is at least `min_output_size`.
    /// Ineligible layers are neither read nor written.
    ///
    /// # Errors
    ///
    /// Fails on an invalid config, on a kernel that cannot be seeded
    /// ([`crate::LsuvError::ShapeError`]) and on a rejected weight write.
    /// A weighted layer that exposes no weights is skipped. Non-convergence
    /// is not an error; see [`LayerOutcome`].
    pub fn initialize<G: LayerGraph + ?Sized>(
        &mut self,
        model: &mut G,
        batch: &Tensor,
    ) -> Result<LsuvReport> {
        self.config.validate()?;

        let mut report = LsuvReport::default();

        for index in 0..model.num_layers() {
            let name = model.layer_name(index);
            let kind = model.layer_kind(index);
            self.progress(format_args!("{name}"));
            debug!(layer = %name, %kind, index, "lsuv visiting layer");

            let outcome = if !kind.has_weight_kernel() {
                LayerOutcome::SkippedKind
            } else {
                let output_shape = model.layer_output_shape(index, batch.shape());
                let output_size: usize = output_shape.iter().skip(1).product();

                if output_size < self.config.min_output_size {
                    self.progress(format_args!("{name} too small"));
                    debug!(layer = %name, output_size, "lsuv skipping small layer");
                    LayerOutcome::SkippedTooSmall { output_size }
                } else {
                    self.progress(format_args!("LSUV initializing {name}"));
                    self.normalize_layer(model, index, &name, batch)?
                }
            };

            report.record(LayerReport {
                index,
                name,
                kind,
                outcome,
            });
        }

        self.progress(format_args!(
            "LSUV: total layers initialized {}",
            report.layers_initialized
        ));
        info!(
            layers_initialized = report.layers_initialized,
            layers = report.layers.len(),
            "lsuv initialization finished"
        );

        Ok(report)
    }

    fn normalize_layer<G: LayerGraph + ?Sized>(
        &mut self,
        model: &mut G,
        index: usize,
        name: &str,
        batch: &Tensor,
    ) -> Result<LayerOutcome> {
        let Some(current) = model.layer_weights(index) else {
            warn!(layer = %name, "lsuv skipping weighted layer that exposes no weights");
            return Ok(LayerOutcome::SkippedNoWeights);
        };

        let kernel = seed_orthonormal(current.kernel.shape(), &mut self.rng)?;
        let mut weights = WeightSet::new(kernel, current.bias);
        model.set_layer_weights(index, weights.clone())?;

        let target = self.config.target_variance;
        let mut variance = self.measure(&*model, index, name, batch, 0);
        let mut iterations = 0;

        let outcome = loop {
            if (target - variance).abs() <= self.config.margin {
                break LayerOutcome::Converged {
                    variance,
                    iterations,
                };
            }

            // the counter is checked after each re-measure, so a capped layer
            // gets max_iter + 1 rescales
            if iterations > self.config.max_iter {
                warn!(layer = %name, variance, iterations, "lsuv did not converge within max_iter");
                break LayerOutcome::IterationCap {
                    variance,
                    iterations,
                };
            }

            let std_dev = variance.sqrt();
            if !std_dev.is_finite() || std_dev.abs() < self.config.min_std {
                warn!(layer = %name, variance, iterations, "lsuv variance degenerate, keeping weights");
                break LayerOutcome::Degenerate {
                    variance,
                    iterations,
                };
            }

            let scale = (std_dev / target.sqrt()) as f32;
            weights.kernel = weights.kernel.div_scalar(scale);
            model.set_layer_weights(index, weights.clone())?;

            iterations += 1;
            variance = self.measure(&*model, index, name, batch, iterations);
        };

        Ok(outcome)
    }

    fn measure<G: LayerGraph + ?Sized>(
        &self,
        model: &G,
        index: usize,
        name: &str,
        batch: &Tensor,
        iteration: usize,
    ) -> f64 {
        let variance = model.activations(index, batch).variance();
        self.progress(format_args!("{variance}"));
        debug!(layer = %name, iteration, variance, "lsuv measured variance");
        variance
    }

    fn progress(&self, message: std::fmt::Arguments<'_>) {
        if self.config.verbose {
            println!("{message}");
        }
    }
}

impl Default for LsuvInit {
    fn default() -> Self {
        Self::new()
    }
}

/// Run LSUV with default settings and return the model with a report.
///
/// `verbose` toggles per-layer progress on stdout. The random source is
/// seeded from entropy; use [`LsuvInit::with_seed`] for reproducible runs.
///
/// # Errors
///
/// See [`LsuvInit::initialize`].
///
/// # Example
///
/// ```
/// use lsuv::lsuv::normalize;
/// use lsuv::nn::{normal, Linear, Sequential};
///
/// let model = Sequential::new().add(Linear::new(8, 64));
/// let batch = normal(&[16, 8], 0.0, 1.0, Some(0));
///
/// let (_model, report) = normalize(model, &batch, false).unwrap();
/// assert_eq!(report.layers_initialized, 1);
/// ```
pub fn normalize<G: LayerGraph>(
    mut model: G,
    batch: &Tensor,
    verbose: bool,
) -> Result<(G, LsuvReport)> {
    let mut init = LsuvInit::with_config(LsuvConfig::default().with_verbose(verbose));
    let report = init.initialize(&mut model, batch)?;
    Ok((model, report))
}
