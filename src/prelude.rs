//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use lsuv::prelude::*;
//! ```

pub use crate::error::{LsuvError, Result};
pub use crate::lsuv::{normalize, LayerGraph, LayerOutcome, LsuvConfig, LsuvInit, LsuvReport};
pub use crate::nn::{
    normal, orthogonal, seed_orthonormal, Conv2d, Flatten, LayerKind, LeakyReLU, Linear,
    MaxPool2d, Module, ReLU, Sequential, Tanh, WeightSet,
};
pub use crate::tensor::Tensor;
