//! Weight initialization functions.
//!
//! Proper initialization is critical for training deep networks.
//! This module provides initialization schemes from the literature:
//!
//! - Xavier/Glorot (Glorot & Bengio, 2010) - for tanh/sigmoid activations
//! - Kaiming/He (He et al., 2015) - for `ReLU` activations
//! - Orthonormal (Saxe et al., 2014) - the seed for LSUV
//!
//! # References
//!
//! - Glorot, X., & Bengio, Y. (2010). Understanding the difficulty of training
//!   deep feedforward neural networks. AISTATS.
//! - He, K., et al. (2015). Delving deep into rectifiers: Surpassing human-level
//!   performance on `ImageNet` classification. ICCV.
//! - Saxe, A. M., et al. (2014). Exact solutions to the nonlinear dynamics of
//!   learning in deep linear neural networks. ICLR.
//! - Mishkin, D., & Matas, J. (2016). All you need is a good init. ICLR.

use nalgebra::DMatrix;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

use crate::error::{LsuvError, Result};
use crate::tensor::Tensor;

fn rng_from_seed(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}

/// Xavier uniform initialization (Glorot & Bengio, 2010).
///
/// Samples from U(-a, a) where a = sqrt(6 / (`fan_in` + `fan_out`)).
///
/// # Example
///
/// ```
/// use lsuv::nn::xavier_uniform;
///
/// let weight = xavier_uniform(&[256, 784], 784, 256, Some(42));
/// assert_eq!(weight.shape(), &[256, 784]);
/// ```
#[must_use]
pub fn xavier_uniform(shape: &[usize], fan_in: usize, fan_out: usize, seed: Option<u64>) -> Tensor {
    let a = (6.0 / (fan_in + fan_out) as f32).sqrt();
    uniform(shape, -a, a, seed)
}

/// Kaiming uniform initialization (He et al., 2015).
///
/// Samples from U(-bound, bound) where bound = sqrt(6 / `fan_in`).
#[must_use]
pub fn kaiming_uniform(shape: &[usize], fan_in: usize, seed: Option<u64>) -> Tensor {
    let bound = (6.0 / fan_in as f32).sqrt();
    uniform(shape, -bound, bound, seed)
}

/// Uniform distribution initialization.
///
/// Samples from U(low, high).
pub(crate) fn uniform(shape: &[usize], low: f32, high: f32, seed: Option<u64>) -> Tensor {
    let numel: usize = shape.iter().product();
    let mut rng = rng_from_seed(seed);

    let data: Vec<f32> = (0..numel).map(|_| rng.gen_range(low..high)).collect();

    Tensor::from_vec(data, shape)
}

/// Normal distribution initialization.
///
/// Samples from N(mean, std).
#[must_use]
pub fn normal(shape: &[usize], mean: f32, std: f32, seed: Option<u64>) -> Tensor {
    let numel: usize = shape.iter().product();
    let mut rng = rng_from_seed(seed);

    let data: Vec<f32> = (0..numel)
        .map(|_| {
            let z: f32 = rng.sample(StandardNormal);
            mean + std * z
        })
        .collect();

    Tensor::from_vec(data, shape)
}

/// Zeros initialization.
pub(crate) fn zeros(shape: &[usize]) -> Tensor {
    Tensor::zeros(shape)
}

/// Orthonormal seeding via SVD of a Gaussian matrix.
///
/// The shape is viewed as a matrix `(shape[0], prod(shape[1..]))`. A matrix of
/// that size is filled with standard-normal samples drawn from `rng` and
/// factored with an economy SVD. Of the two factors `U` `(d0, k)` and `Vᵀ`
/// `(k, rest)`, the one whose shape equals the flattened shape is returned,
/// reshaped to `shape`. `U` is checked first, so a square view yields `U`.
///
/// The result has orthonormal rows when `d0 <= rest` and orthonormal columns
/// otherwise.
///
/// # Errors
///
/// Returns [`LsuvError::ShapeError`] if `shape` has fewer than two dimensions
/// or contains a zero, and [`LsuvError::Decomposition`] if the SVD does not
/// converge.
///
/// # Example
///
/// ```
/// use lsuv::nn::seed_orthonormal;
/// use rand::SeedableRng;
///
/// let mut rng = rand::rngs::StdRng::seed_from_u64(7);
/// let q = seed_orthonormal(&[16, 4, 3, 3], &mut rng).unwrap();
/// assert_eq!(q.shape(), &[16, 4, 3, 3]);
///
/// assert!(seed_orthonormal(&[5], &mut rng).is_err());
/// ```
pub fn seed_orthonormal<R: Rng + ?Sized>(shape: &[usize], rng: &mut R) -> Result<Tensor> {
    if shape.len() < 2 || shape.contains(&0) {
        return Err(LsuvError::ShapeError {
            shape: shape.to_vec(),
        });
    }

    let rows = shape[0];
    let cols: usize = shape[1..].iter().product();

    let sample = DMatrix::<f64>::from_fn(rows, cols, |_, _| rng.sample(StandardNormal));
    let svd = sample
        .try_svd(true, true, f64::EPSILON, 0)
        .ok_or_else(|| LsuvError::Decomposition {
            message: format!("no convergence for a {rows}x{cols} matrix"),
        })?;

    let (u, v_t) = match (svd.u, svd.v_t) {
        (Some(u), Some(v_t)) => (u, v_t),
        _ => {
            return Err(LsuvError::Decomposition {
                message: "singular vectors were not computed".to_string(),
            })
        }
    };

    let q = if u.shape() == (rows, cols) { u } else { v_t };
    debug_assert_eq!(q.shape(), (rows, cols));

    let q = &q;
    let data: Vec<f32> = (0..rows)
        .flat_map(|i| (0..cols).map(move |j| q[(i, j)] as f32))
        .collect();

    Ok(Tensor::from_vec(data, shape))
}

/// Orthonormal initialization with the crate's seed convention.
///
/// `Some(seed)` is reproducible; `None` draws fresh entropy on every call.
/// See [`seed_orthonormal`] for the construction and errors.
pub fn orthogonal(shape: &[usize], seed: Option<u64>) -> Result<Tensor> {
    let mut rng = rng_from_seed(seed);
    seed_orthonormal(shape, &mut rng)
}
