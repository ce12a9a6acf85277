//! Per-layer results of a normalization pass.

use serde::{Deserialize, Serialize};

use crate::nn::LayerKind;

/// What happened to one layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LayerOutcome {
    /// The layer kind has no weight kernel; nothing was read or written.
    SkippedKind,
    /// The layer kind has a weight kernel but the layer exposed no weights.
    SkippedNoWeights,
    /// The layer's non-batch output size is below the configured minimum.
    SkippedTooSmall {
        /// Product of the non-batch output dimensions
        output_size: usize,
    },
    /// Variance ended within the margin of the target.
    Converged {
        /// Final measured variance
        variance: f64,
        /// Rescales performed
        iterations: usize,
    },
    /// The measured standard deviation fell below the degeneracy threshold
    /// (or was not finite); rescaling stopped.
    Degenerate {
        /// Last measured variance
        variance: f64,
        /// Rescales performed
        iterations: usize,
    },
    /// The rescale budget ran out before convergence.
    IterationCap {
        /// Last measured variance
        variance: f64,
        /// Rescales performed
        iterations: usize,
    },
}

impl LayerOutcome {
    /// Whether the layer went through seeding and rescaling.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        !matches!(
            self,
            LayerOutcome::SkippedKind
                | LayerOutcome::SkippedNoWeights
                | LayerOutcome::SkippedTooSmall { .. }
        )
    }

    /// Last measured variance, for initialized layers.
    #[must_use]
    pub fn variance(&self) -> Option<f64> {
        match self {
            LayerOutcome::Converged { variance, .. }
            | LayerOutcome::Degenerate { variance, .. }
            | LayerOutcome::IterationCap { variance, .. } => Some(*variance),
            _ => None,
        }
    }

    /// Rescales performed, for initialized layers.
    #[must_use]
    pub fn iterations(&self) -> Option<usize> {
        match self {
            LayerOutcome::Converged { iterations, .. }
            | LayerOutcome::Degenerate { iterations, .. }
            | LayerOutcome::IterationCap { iterations, .. } => Some(*iterations),
            _ => None,
        }
    }
}

/// One visited layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerReport {
    /// Position in the model
    pub index: usize,
    /// Layer name
    pub name: String,
    /// Layer kind
    pub kind: LayerKind,
    /// What happened
    pub outcome: LayerOutcome,
}

/// Summary of a normalization pass over a whole model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LsuvReport {
    /// Number of layers that were seeded and rescaled, converged or not
    pub layers_initialized: usize,
    /// One entry per layer, in model order
    pub layers: Vec<LayerReport>,
}

impl LsuvReport {
    pub(crate) fn record(&mut self, layer: LayerReport) {
        if layer.outcome.is_initialized() {
            self.layers_initialized += 1;
        }
        self.layers.push(layer);
    }

    /// Look up a layer's entry by name.
    #[must_use]
    pub fn layer(&self, name: &str) -> Option<&LayerReport> {
        self.layers.iter().find(|l| l.name == name)
    }

    /// Entries for layers that were seeded and rescaled.
    pub fn initialized(&self) -> impl Iterator<Item = &LayerReport> {
        self.layers.iter().filter(|l| l.outcome.is_initialized())
    }
}
