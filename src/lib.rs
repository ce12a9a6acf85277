//! LSUV: layer-sequential unit-variance weight initialization in pure Rust.
//!
//! LSUV (Mishkin & Matas, 2016) seeds every dense and convolutional kernel
//! with an orthonormal matrix, then rescales it layer by layer until the
//! variance of the layer's output on a sample batch is close to one.
//!
//! # Quick Start
//!
//! ```
//! use lsuv::prelude::*;
//!
//! let model = Sequential::new()
//!     .add(Linear::new(32, 128))
//!     .add(ReLU::new())
//!     .add(Linear::new(128, 64))
//!     .add(ReLU::new())
//!     .add(Linear::new(64, 10));
//!
//! let batch = normal(&[16, 32], 0.0, 1.0, Some(42));
//! let (model, report) = normalize(model, &batch, false).unwrap();
//!
//! // two hidden layers are normalized, the 10-wide head is too small
//! assert_eq!(report.layers_initialized, 2);
//! assert_eq!(model.forward(&batch).shape(), &[16, 10]);
//! ```
//!
//! # Modules
//!
//! - [`tensor`]: Dense `f32` tensor with the operations the layers need
//! - [`nn`]: Layers, the `Sequential` container and weight initializers
//! - [`lsuv`]: The variance normalizer and its model capability trait
//! - [`error`]: Error type and `Result` alias

pub mod error;
pub mod lsuv;
pub mod nn;
pub mod prelude;
pub mod tensor;

pub use error::{LsuvError, Result};
