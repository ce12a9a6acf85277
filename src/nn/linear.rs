//! Fully connected (linear) layer.
//!
//! Implements the transformation y = xW^T + b.

use super::init::{xavier_uniform, zeros};
use super::module::{LayerKind, Module, WeightSet};
use crate::error::Result;
use crate::tensor::Tensor;

/// Fully connected layer: y = xW^T + b
///
/// Weight initialization follows Xavier/Glorot (Glorot & Bengio, 2010) until
/// something like LSUV replaces it.
///
/// # Shape
///
/// - Input: `(*, in_features)` where `*` means any number of batch dimensions
/// - Output: `(*, out_features)`
///
/// # Example
///
/// ```
/// use lsuv::nn::{Linear, Module};
/// use lsuv::tensor::Tensor;
///
/// let layer = Linear::with_seed(20, 30, Some(1));
/// let x = Tensor::zeros(&[128, 20]);
/// let output = layer.forward(&x);
///
/// assert_eq!(output.shape(), &[128, 30]);
/// ```
pub struct Linear {
    /// Weight matrix, shape: [out_features, in_features]
    weight: Tensor,

    /// Cached transposed weight [in_features, out_features], refreshed on
    /// every weight write.
    weight_t: Tensor,

    /// Bias vector, shape: [out_features], or None if bias=false
    bias: Option<Tensor>,

    /// Number of input features
    in_features: usize,

    /// Number of output features
    out_features: usize,
}

impl Linear {
    /// Create a new Linear layer with Xavier initialization.
    pub fn new(in_features: usize, out_features: usize) -> Self {
        Self::with_seed(in_features, out_features, None)
    }

    /// Create a Linear layer with a specific random seed.
    pub fn with_seed(in_features: usize, out_features: usize, seed: Option<u64>) -> Self {
        let mut layer = Self::without_bias_with_seed(in_features, out_features, seed);
        layer.bias = Some(zeros(&[out_features]));
        layer
    }

    /// Create a Linear layer without bias.
    pub fn without_bias(in_features: usize, out_features: usize) -> Self {
        Self::without_bias_with_seed(in_features, out_features, None)
    }

    /// Create a Linear layer without bias with a specific random seed.
    pub fn without_bias_with_seed(
        in_features: usize,
        out_features: usize,
        seed: Option<u64>,
    ) -> Self {
        let weight = xavier_uniform(
            &[out_features, in_features],
            in_features,
            out_features,
            seed,
        );
        let weight_t = weight.transpose();

        Self {
            weight,
            weight_t,
            bias: None,
            in_features,
            out_features,
        }
    }

    /// Get the input feature dimension.
    pub fn in_features(&self) -> usize {
        self.in_features
    }

    /// Get the output feature dimension.
    pub fn out_features(&self) -> usize {
        self.out_features
    }

    /// Check if this layer has a bias term.
    pub fn has_bias(&self) -> bool {
        self.bias.is_some()
    }

    /// Get reference to weight tensor.
    pub fn weight(&self) -> &Tensor {
        &self.weight
    }

    /// Get reference to bias tensor if present.
    pub fn bias(&self) -> Option<&Tensor> {
        self.bias.as_ref()
    }
}

impl Module for Linear {
    fn forward(&self, input: &Tensor) -> Tensor {
        let input_shape = input.shape();
        let ndim = input_shape.len();
        assert!(ndim >= 1, "Linear expects at least 1D input");
        assert_eq!(
            input_shape[ndim - 1],
            self.in_features,
            "Expected {} input features, got {}",
            self.in_features,
            input_shape[ndim - 1]
        );

        // Flatten all batch dimensions into one
        let batch_size: usize = input_shape[..ndim - 1].iter().product();
        let reshaped = input.view(&[batch_size, self.in_features]);

        let output = reshaped.matmul(&self.weight_t);
        let output = match &self.bias {
            Some(b) => output.broadcast_add(b),
            None => output,
        };

        output.view(&self.output_shape(input_shape))
    }

    fn parameters(&self) -> Vec<&Tensor> {
        match &self.bias {
            Some(b) => vec![&self.weight, b],
            None => vec![&self.weight],
        }
    }

    fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        match &mut self.bias {
            Some(b) => vec![&mut self.weight, b],
            None => vec![&mut self.weight],
        }
    }

    fn kind(&self) -> LayerKind {
        LayerKind::Dense
    }

    fn output_shape(&self, input_shape: &[usize]) -> Vec<usize> {
        let mut shape = input_shape.to_vec();
        match shape.last_mut() {
            Some(last) => *last = self.out_features,
            None => shape.push(self.out_features),
        }
        shape
    }

    fn weights(&self) -> Option<WeightSet> {
        Some(WeightSet::new(self.weight.clone(), self.bias.clone()))
    }

    fn set_weights(&mut self, weights: WeightSet) -> Result<()> {
        let current = WeightSet::new(self.weight.clone(), self.bias.clone());
        weights.check_compatible(&current)?;

        self.weight_t = weights.kernel.transpose();
        self.weight = weights.kernel;
        self.bias = weights.bias;
        Ok(())
    }
}

impl std::fmt::Debug for Linear {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Linear")
            .field("in_features", &self.in_features)
            .field("out_features", &self.out_features)
            .field("bias", &self.bias.is_some())
            .finish()
    }
}
