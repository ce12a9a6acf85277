//! Forward-only neural network layers.
//!
//! The nn module is organized around the [`Module`] trait, which defines
//! the interface for all layers:
//!
//! - **Layers**: [`Linear`], [`Conv2d`], [`Flatten`]
//! - **Pooling**: [`MaxPool2d`]
//! - **Activations**: [`ReLU`], [`LeakyReLU`], [`Tanh`]
//! - **Containers**: [`Sequential`]
//! - **Initializers**: [`xavier_uniform`], [`kaiming_uniform`],
//!   [`seed_orthonormal`], ...
//!
//! Weighted layers expose their kernel and bias as a [`WeightSet`] so that
//! data-driven initializers such as [`crate::lsuv`] can replace them.
//!
//! # Example
//!
//! ```
//! use lsuv::nn::{Linear, Module, ReLU, Sequential};
//! use lsuv::tensor::Tensor;
//!
//! let model = Sequential::new()
//!     .add(Linear::new(784, 256))
//!     .add(ReLU::new())
//!     .add(Linear::new(256, 10));
//!
//! let x = Tensor::zeros(&[32, 784]);
//! assert_eq!(model.forward(&x).shape(), &[32, 10]);
//! ```
//!
//! # References
//!
//! - Paszke, A., et al. (2019). `PyTorch`: An imperative style, high-performance
//!   deep learning library. `NeurIPS`.

mod activation;
mod container;
mod conv;
pub mod init;
mod linear;
mod module;

pub use activation::{LeakyReLU, ReLU, Tanh};
pub use container::Sequential;
pub use conv::{Conv2d, Flatten, MaxPool2d};
pub use init::{kaiming_uniform, normal, orthogonal, seed_orthonormal, xavier_uniform};
pub use linear::Linear;
pub use module::{LayerKind, Module, WeightSet};
