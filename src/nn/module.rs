//! The `Module` trait shared by every layer.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{LsuvError, Result};
use crate::tensor::Tensor;

/// Closed set of layer kinds.
///
/// The kind is what decides whether a layer is a candidate for
/// variance normalization; see [`LayerKind::has_weight_kernel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayerKind {
    /// Fully connected layer
    Dense,
    /// 2D convolution
    Conv2d,
    /// Element-wise activation function
    Activation,
    /// Spatial pooling
    Pooling,
    /// Shape-only transformation (flatten, view)
    Reshape,
    /// Container of other modules
    Container,
    /// Anything else
    Other,
}

impl LayerKind {
    /// Whether layers of this kind carry a 2D-or-higher weight kernel plus a
    /// bias, i.e. a weight set that LSUV can reseed and rescale.
    #[must_use]
    pub fn has_weight_kernel(self) -> bool {
        matches!(self, LayerKind::Dense | LayerKind::Conv2d)
    }

    /// Short lowercase name, used for default layer names.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            LayerKind::Dense => "dense",
            LayerKind::Conv2d => "conv2d",
            LayerKind::Activation => "activation",
            LayerKind::Pooling => "pooling",
            LayerKind::Reshape => "reshape",
            LayerKind::Container => "container",
            LayerKind::Other => "other",
        }
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kernel plus optional bias of a weighted layer.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightSet {
    /// Weight kernel; shape fixed at layer construction
    pub kernel: Tensor,
    /// Bias vector, or None for layers built without bias
    pub bias: Option<Tensor>,
}

impl WeightSet {
    /// Create a weight set.
    #[must_use]
    pub fn new(kernel: Tensor, bias: Option<Tensor>) -> Self {
        Self { kernel, bias }
    }

    /// Check that `self` has the same kernel and bias shapes as `current`.
    pub(crate) fn check_compatible(&self, current: &WeightSet) -> Result<()> {
        if self.kernel.shape() != current.kernel.shape() {
            return Err(LsuvError::shape_mismatch(
                "kernel",
                current.kernel.shape(),
                self.kernel.shape(),
            ));
        }
        match (&self.bias, &current.bias) {
            (Some(new), Some(old)) if new.shape() != old.shape() => Err(
                LsuvError::shape_mismatch("bias", old.shape(), new.shape()),
            ),
            (Some(_), None) => Err(LsuvError::DimensionMismatch {
                expected: "no bias".to_string(),
                actual: "bias".to_string(),
            }),
            (None, Some(_)) => Err(LsuvError::DimensionMismatch {
                expected: "bias".to_string(),
                actual: "no bias".to_string(),
            }),
            _ => Ok(()),
        }
    }
}

/// A neural network layer with a forward pass.
///
/// Weightless layers only need [`Module::forward`] and [`Module::kind`];
/// the remaining methods have defaults.
pub trait Module {
    /// Compute the output for an input batch.
    fn forward(&self, input: &Tensor) -> Tensor;

    /// All parameter tensors.
    fn parameters(&self) -> Vec<&Tensor> {
        Vec::new()
    }

    /// All parameter tensors, mutably.
    fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        Vec::new()
    }

    /// Layer kind.
    fn kind(&self) -> LayerKind {
        LayerKind::Other
    }

    /// Output shape for a given input shape, batch dimension included.
    fn output_shape(&self, input_shape: &[usize]) -> Vec<usize> {
        input_shape.to_vec()
    }

    /// Current weight set, or None for weightless layers.
    fn weights(&self) -> Option<WeightSet> {
        None
    }

    /// Replace the weight set. Shapes must match the current ones.
    fn set_weights(&mut self, weights: WeightSet) -> Result<()> {
        Err(LsuvError::DimensionMismatch {
            expected: "no weights".to_string(),
            actual: format!("kernel {:?}", weights.kernel.shape()),
        })
    }
}
