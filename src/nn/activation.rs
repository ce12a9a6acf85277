//! Activation function modules.
//!
//! These modules wrap activation functions for use in Sequential containers.
//!
//! # References
//!
//! - Nair, V., & Hinton, G. E. (2010). Rectified linear units improve restricted
//!   Boltzmann machines. ICML.

use super::module::{LayerKind, Module};
use crate::tensor::Tensor;

/// Rectified Linear Unit activation: ReLU(x) = max(0, x)
///
/// # Example
///
/// ```
/// use lsuv::nn::{Module, ReLU};
/// use lsuv::tensor::Tensor;
///
/// let relu = ReLU::new();
/// let x = Tensor::from_slice(&[-1.0, 0.0, 1.0, 2.0]);
/// assert_eq!(relu.forward(&x).data(), &[0.0, 0.0, 1.0, 2.0]);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ReLU;

impl ReLU {
    /// Create a new ReLU activation.
    pub fn new() -> Self {
        Self
    }
}

impl Module for ReLU {
    fn forward(&self, input: &Tensor) -> Tensor {
        input.relu()
    }

    fn kind(&self) -> LayerKind {
        LayerKind::Activation
    }
}

/// Leaky ReLU activation: LeakyReLU(x) = max(negative_slope * x, x)
#[derive(Debug, Clone, Copy)]
pub struct LeakyReLU {
    negative_slope: f32,
}

impl LeakyReLU {
    /// Create a new LeakyReLU with default negative slope (0.01).
    pub fn new() -> Self {
        Self {
            negative_slope: 0.01,
        }
    }

    /// Create a new LeakyReLU with specified negative slope.
    pub fn with_slope(negative_slope: f32) -> Self {
        Self { negative_slope }
    }
}

impl Default for LeakyReLU {
    fn default() -> Self {
        Self::new()
    }
}

impl Module for LeakyReLU {
    fn forward(&self, input: &Tensor) -> Tensor {
        input.leaky_relu(self.negative_slope)
    }

    fn kind(&self) -> LayerKind {
        LayerKind::Activation
    }
}

/// Tanh activation, maps inputs to (-1, 1).
#[derive(Debug, Clone, Copy, Default)]
pub struct Tanh;

impl Tanh {
    pub fn new() -> Self {
        Self
    }
}

impl Module for Tanh {
    fn forward(&self, input: &Tensor) -> Tensor {
        input.tanh_()
    }

    fn kind(&self) -> LayerKind {
        LayerKind::Activation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activations_are_weightless() {
        let modules: Vec<Box<dyn Module>> = vec![
            Box::new(ReLU::new()),
            Box::new(LeakyReLU::with_slope(0.2)),
            Box::new(Tanh::new()),
        ];
        for m in &modules {
            assert_eq!(m.kind(), LayerKind::Activation);
            assert!(m.weights().is_none());
            assert_eq!(m.output_shape(&[8, 3]), vec![8, 3]);
        }
    }

    #[test]
    fn test_leaky_relu() {
        let act = LeakyReLU::with_slope(0.1);
        let y = act.forward(&Tensor::from_slice(&[-10.0, 5.0]));
        assert_eq!(y.data(), &[-1.0, 5.0]);
        assert!((LeakyReLU::default().forward(&Tensor::from_slice(&[-1.0])).item() + 0.01).abs() < 1e-7);
    }

    #[test]
    fn test_tanh_range() {
        let y = Tanh::new().forward(&Tensor::from_slice(&[-100.0, 0.0, 100.0]));
        assert!(y.data().iter().all(|v| (-1.0..=1.0).contains(v)));
        assert_eq!(y.data()[1], 0.0);
    }
}
