//! Forward-only tensor operations.
//!
//! Matrix products go through nalgebra; everything else is a plain loop over
//! the row-major buffer.

use nalgebra::DMatrix;

use super::Tensor;

// ============================================================================
// Element-wise Operations
// ============================================================================

impl Tensor {
    /// Divide every element by a scalar.
    #[must_use]
    pub fn div_scalar(&self, scalar: f32) -> Tensor {
        self.map(|x| x / scalar)
    }

    fn map(&self, f: impl Fn(f32) -> f32) -> Tensor {
        Tensor::from_vec(self.data().iter().map(|&x| f(x)).collect(), self.shape())
    }
}

// ============================================================================
// Reductions
// ============================================================================

impl Tensor {
    /// Mean over all elements, accumulated in `f64`.
    ///
    /// Returns NaN for an empty tensor.
    #[must_use]
    pub fn mean(&self) -> f64 {
        let n = self.numel() as f64;
        self.data().iter().map(|&x| f64::from(x)).sum::<f64>() / n
    }

    /// Population variance (zero degrees of freedom) over all elements,
    /// accumulated in `f64`.
    ///
    /// Returns NaN for an empty tensor.
    #[must_use]
    pub fn variance(&self) -> f64 {
        let mean = self.mean();
        let n = self.numel() as f64;
        self.data()
            .iter()
            .map(|&x| (f64::from(x) - mean).powi(2))
            .sum::<f64>()
            / n
    }
}

// ============================================================================
// Activations
// ============================================================================

impl Tensor {
    /// `ReLU` activation: max(0, x)
    #[must_use]
    pub fn relu(&self) -> Tensor {
        self.map(|x| x.max(0.0))
    }

    /// Leaky `ReLU`: x if x > 0, otherwise `negative_slope * x`
    #[must_use]
    pub fn leaky_relu(&self, negative_slope: f32) -> Tensor {
        self.map(|x| if x > 0.0 { x } else { negative_slope * x })
    }

    /// Hyperbolic tangent.
    #[must_use]
    pub fn tanh_(&self) -> Tensor {
        self.map(f32::tanh)
    }
}

// ============================================================================
// Linear Algebra
// ============================================================================

impl Tensor {
    /// Matrix multiplication: z = self @ other
    ///
    /// Supports 2D tensors only.
    #[must_use]
    pub fn matmul(&self, other: &Tensor) -> Tensor {
        assert_eq!(self.ndim(), 2, "matmul requires 2D tensors");
        assert_eq!(other.ndim(), 2, "matmul requires 2D tensors");

        let (m, k1) = (self.shape()[0], self.shape()[1]);
        let (k2, n) = (other.shape()[0], other.shape()[1]);
        assert_eq!(k1, k2, "matmul dimension mismatch: {k1} vs {k2}");

        let a = DMatrix::from_row_slice(m, k1, self.data());
        let b = DMatrix::from_row_slice(k2, n, other.data());

        // nalgebra is column-major; the transpose's buffer is our row-major layout
        let product = (a * b).transpose();
        Tensor::new(product.as_slice(), &[m, n])
    }

    /// Transpose a 2D tensor.
    #[must_use]
    pub fn transpose(&self) -> Tensor {
        assert_eq!(self.ndim(), 2, "transpose requires 2D tensor");

        let (rows, cols) = (self.shape()[0], self.shape()[1]);
        let mut data = vec![0.0; rows * cols];

        for i in 0..rows {
            for j in 0..cols {
                data[j * rows + i] = self.data()[i * cols + j];
            }
        }

        Tensor::from_vec(data, &[cols, rows])
    }

    /// Broadcast addition: z = matrix + vector (broadcasts over rows).
    ///
    /// # Shape
    ///
    /// - self: `[N, M]`
    /// - other: `[M]`
    /// - output: `[N, M]`
    #[must_use]
    pub fn broadcast_add(&self, other: &Tensor) -> Tensor {
        assert_eq!(self.ndim(), 2, "broadcast_add requires 2D matrix");
        assert_eq!(other.ndim(), 1, "broadcast_add requires 1D vector");
        assert_eq!(
            self.shape()[1],
            other.shape()[0],
            "Matrix columns {} must match vector length {}",
            self.shape()[1],
            other.shape()[0]
        );

        let cols = self.shape()[1];
        let bias = other.data();
        let data = self
            .data()
            .iter()
            .enumerate()
            .map(|(i, &x)| x + bias[i % cols])
            .collect();

        Tensor::from_vec(data, self.shape())
    }

    /// Reshape tensor to a new shape.
    ///
    /// The total number of elements must remain the same.
    #[must_use]
    pub fn view(&self, new_shape: &[usize]) -> Tensor {
        let old_numel = self.numel();
        let new_numel: usize = new_shape.iter().product();
        assert_eq!(
            old_numel, new_numel,
            "view: number of elements must match ({old_numel} vs {new_numel})"
        );

        Tensor::new(self.data(), new_shape)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matmul() {
        let a = Tensor::new(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]);
        let b = Tensor::new(&[7.0, 8.0, 9.0, 10.0, 11.0, 12.0], &[3, 2]);
        let c = a.matmul(&b);

        assert_eq!(c.shape(), &[2, 2]);
        assert_eq!(c.data(), &[58.0, 64.0, 139.0, 154.0]);
    }

    #[test]
    #[should_panic(expected = "matmul dimension mismatch")]
    fn test_matmul_mismatch() {
        let a = Tensor::zeros(&[2, 3]);
        let b = Tensor::zeros(&[2, 3]);
        let _ = a.matmul(&b);
    }

    #[test]
    fn test_transpose() {
        let a = Tensor::new(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]);
        let t = a.transpose();
        assert_eq!(t.shape(), &[3, 2]);
        assert_eq!(t.data(), &[1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
    }

    #[test]
    fn test_broadcast_add() {
        let matrix = Tensor::new(&[1.0, 2.0, 3.0, 4.0], &[2, 2]);
        let bias = Tensor::new(&[10.0, 20.0], &[2]);
        let result = matrix.broadcast_add(&bias);
        assert_eq!(result.data(), &[11.0, 22.0, 13.0, 24.0]);
    }

    #[test]
    fn test_view() {
        let a = Tensor::new(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]);
        let b = a.view(&[3, 2]);
        assert_eq!(b.shape(), &[3, 2]);
        assert_eq!(b.data(), a.data());
    }

    #[test]
    fn test_scalar_ops() {
        let a = Tensor::from_slice(&[2.0, -4.0]);
        assert_eq!(a.div_scalar(2.0).data(), &[1.0, -2.0]);
    }

    #[test]
    fn test_mean_variance() {
        let a = Tensor::new(&[1.0, 2.0, 3.0, 4.0], &[2, 2]);
        assert!((a.mean() - 2.5).abs() < 1e-12);
        // population variance: mean of squared deviations
        assert!((a.variance() - 1.25).abs() < 1e-12);
    }

    #[test]
    fn test_variance_constant_is_zero() {
        let a = Tensor::ones(&[4, 8]);
        assert_eq!(a.variance(), 0.0);
    }

    #[test]
    fn test_activations() {
        let x = Tensor::from_slice(&[-2.0, 0.0, 3.0]);
        assert_eq!(x.relu().data(), &[0.0, 0.0, 3.0]);
        assert_eq!(x.leaky_relu(0.5).data(), &[-1.0, 0.0, 3.0]);

        let t = x.tanh_();
        assert!((t.data()[2] - 3.0_f32.tanh()).abs() < 1e-6);
    }
}
