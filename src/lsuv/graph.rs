//! Capability interface a model exposes to the normalizer.

use crate::error::Result;
use crate::nn::{LayerKind, WeightSet};
use crate::tensor::Tensor;

/// An ordered sequence of layers that can be inspected, re-weighted and
/// partially evaluated.
///
/// Layers are addressed by their position in definition order,
/// `0..num_layers()`. Implementations may panic on an out-of-range index.
///
/// [`crate::nn::Sequential`] implements this trait; adapters for other model
/// representations (or test fakes) only need these seven methods.
pub trait LayerGraph {
    /// Number of layers.
    fn num_layers(&self) -> usize;

    /// Human-readable layer name.
    fn layer_name(&self, index: usize) -> String;

    /// Layer kind.
    fn layer_kind(&self, index: usize) -> LayerKind;

    /// Output shape of the layer for a model input of `input_shape`, batch
    /// dimension first.
    fn layer_output_shape(&self, index: usize, input_shape: &[usize]) -> Vec<usize>;

    /// Current weight set, or None for weightless layers.
    fn layer_weights(&self, index: usize) -> Option<WeightSet>;

    /// Replace the layer's weight set. Shapes must not change.
    fn set_layer_weights(&mut self, index: usize, weights: WeightSet) -> Result<()>;

    /// Output of the layer for `batch`, evaluating only the sub-graph that
    /// feeds it.
    fn activations(&self, index: usize, batch: &Tensor) -> Tensor;
}

impl<G: LayerGraph + ?Sized> LayerGraph for &mut G {
    fn num_layers(&self) -> usize {
        (**self).num_layers()
    }

    fn layer_name(&self, index: usize) -> String {
        (**self).layer_name(index)
    }

    fn layer_kind(&self, index: usize) -> LayerKind {
        (**self).layer_kind(index)
    }

    fn layer_output_shape(&self, index: usize, input_shape: &[usize]) -> Vec<usize> {
        (**self).layer_output_shape(index, input_shape)
    }

    fn layer_weights(&self, index: usize) -> Option<WeightSet> {
        (**self).layer_weights(index)
    }

    fn set_layer_weights(&mut self, index: usize, weights: WeightSet) -> Result<()> {
        (**self).set_layer_weights(index, weights)
    }

    fn activations(&self, index: usize, batch: &Tensor) -> Tensor {
        (**self).activations(index, batch)
    }
}
