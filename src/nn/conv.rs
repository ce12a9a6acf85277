//! Convolutional and spatial layers.
//!
//! Implements 2D convolution, 2D max pooling and flattening in NCHW layout.
//!
//! # References
//!
//! - `LeCun`, Y., et al. (1998). Gradient-based learning applied to document
//!   recognition. Proceedings of the IEEE.
//! - He, K., et al. (2015). Delving deep into rectifiers: Surpassing
//!   human-level performance on `ImageNet` classification. ICCV.

use super::init::{kaiming_uniform, zeros};
use super::module::{LayerKind, Module, WeightSet};
use crate::error::Result;
use crate::tensor::Tensor;

/// 2D Convolution layer.
///
/// # Shape
///
/// - Input: `(N, C_in, H, W)`
/// - Output: `(N, C_out, H_out, W_out)` where
///   `H_out = (H + 2*padding - kernel_h) / stride + 1`
///
/// # Example
///
/// ```
/// use lsuv::nn::{Conv2d, Module};
/// use lsuv::tensor::Tensor;
///
/// let conv = Conv2d::new(3, 8, 3);
/// let x = Tensor::zeros(&[4, 3, 10, 10]);
/// let y = conv.forward(&x);
/// assert_eq!(y.shape(), &[4, 8, 8, 8]);
/// ```
pub struct Conv2d {
    /// Weight tensor, shape: [`out_channels`, `in_channels`, `kernel_h`, `kernel_w`]
    weight: Tensor,
    /// Bias tensor, shape: [`out_channels`], or None
    bias: Option<Tensor>,
    in_channels: usize,
    out_channels: usize,
    kernel_h: usize,
    kernel_w: usize,
    stride_h: usize,
    stride_w: usize,
    padding_h: usize,
    padding_w: usize,
}

impl Conv2d {
    /// Create a new Conv2d layer with square kernel.
    #[must_use]
    pub fn new(in_channels: usize, out_channels: usize, kernel_size: usize) -> Self {
        Self::with_options(
            in_channels,
            out_channels,
            (kernel_size, kernel_size),
            (1, 1),
            (0, 0),
            true,
        )
    }

    /// Create Conv2d with custom options.
    ///
    /// # Arguments
    ///
    /// * `in_channels` - Number of input channels
    /// * `out_channels` - Number of output channels
    /// * `kernel_size` - (height, width) of the kernel
    /// * `stride` - (height, width) stride
    /// * `padding` - (height, width) zero padding
    /// * `bias` - If true, adds a learnable bias
    #[must_use]
    pub fn with_options(
        in_channels: usize,
        out_channels: usize,
        kernel_size: (usize, usize),
        stride: (usize, usize),
        padding: (usize, usize),
        bias: bool,
    ) -> Self {
        Self::with_seed(in_channels, out_channels, kernel_size, stride, padding, bias, None)
    }

    /// Create Conv2d with custom options and a specific random seed.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn with_seed(
        in_channels: usize,
        out_channels: usize,
        kernel_size: (usize, usize),
        stride: (usize, usize),
        padding: (usize, usize),
        bias: bool,
        seed: Option<u64>,
    ) -> Self {
        let (kernel_h, kernel_w) = kernel_size;
        assert!(
            stride.0 > 0 && stride.1 > 0,
            "Conv2d stride must be non-zero, got {stride:?}"
        );

        let fan_in = in_channels * kernel_h * kernel_w;
        let weight = kaiming_uniform(
            &[out_channels, in_channels, kernel_h, kernel_w],
            fan_in,
            seed,
        );

        Self {
            weight,
            bias: bias.then(|| zeros(&[out_channels])),
            in_channels,
            out_channels,
            kernel_h,
            kernel_w,
            stride_h: stride.0,
            stride_w: stride.1,
            padding_h: padding.0,
            padding_w: padding.1,
        }
    }

    /// Create Conv2d with padding.
    #[must_use]
    pub fn with_padding(
        in_channels: usize,
        out_channels: usize,
        kernel_size: usize,
        padding: usize,
    ) -> Self {
        Self::with_options(
            in_channels,
            out_channels,
            (kernel_size, kernel_size),
            (1, 1),
            (padding, padding),
            true,
        )
    }

    /// Get kernel size as (height, width).
    #[must_use]
    pub fn kernel_size(&self) -> (usize, usize) {
        (self.kernel_h, self.kernel_w)
    }

    /// Get stride as (height, width).
    #[must_use]
    pub fn stride(&self) -> (usize, usize) {
        (self.stride_h, self.stride_w)
    }

    /// Get padding as (height, width).
    #[must_use]
    pub fn padding(&self) -> (usize, usize) {
        (self.padding_h, self.padding_w)
    }

    /// Get reference to weight tensor.
    #[must_use]
    pub fn weight(&self) -> &Tensor {
        &self.weight
    }

    /// Get reference to bias tensor if present.
    #[must_use]
    pub fn bias(&self) -> Option<&Tensor> {
        self.bias.as_ref()
    }

    fn output_hw(&self, in_h: usize, in_w: usize) -> (usize, usize) {
        (
            window_count(in_h + 2 * self.padding_h, self.kernel_h, self.stride_h),
            window_count(in_w + 2 * self.padding_w, self.kernel_w, self.stride_w),
        )
    }
}

impl Module for Conv2d {
    fn forward(&self, input: &Tensor) -> Tensor {
        assert_eq!(
            input.ndim(),
            4,
            "Conv2d expects 4D input [N, C, H, W], got {}D",
            input.ndim()
        );

        let shape = input.shape();
        let (batch_size, in_channels, in_h, in_w) = (shape[0], shape[1], shape[2], shape[3]);

        assert_eq!(
            in_channels, self.in_channels,
            "Expected {} input channels, got {}",
            self.in_channels, in_channels
        );

        let (out_h, out_w) = self.output_hw(in_h, in_w);
        let mut output = vec![0.0; batch_size * self.out_channels * out_h * out_w];

        let input_data = input.data();
        let weight_data = self.weight.data();

        for n in 0..batch_size {
            for oc in 0..self.out_channels {
                for oh in 0..out_h {
                    for ow in 0..out_w {
                        let mut sum = 0.0;

                        for ic in 0..self.in_channels {
                            for kh in 0..self.kernel_h {
                                for kw in 0..self.kernel_w {
                                    let ih = oh * self.stride_h + kh;
                                    let iw = ow * self.stride_w + kw;

                                    // zero padding
                                    if ih < self.padding_h
                                        || ih >= in_h + self.padding_h
                                        || iw < self.padding_w
                                        || iw >= in_w + self.padding_w
                                    {
                                        continue;
                                    }

                                    let val = input_data[n * in_channels * in_h * in_w
                                        + ic * in_h * in_w
                                        + (ih - self.padding_h) * in_w
                                        + (iw - self.padding_w)];

                                    let w_idx =
                                        oc * self.in_channels * self.kernel_h * self.kernel_w
                                            + ic * self.kernel_h * self.kernel_w
                                            + kh * self.kernel_w
                                            + kw;
                                    sum += val * weight_data[w_idx];
                                }
                            }
                        }

                        if let Some(ref bias) = self.bias {
                            sum += bias.data()[oc];
                        }

                        output[n * self.out_channels * out_h * out_w
                            + oc * out_h * out_w
                            + oh * out_w
                            + ow] = sum;
                    }
                }
            }
        }

        Tensor::from_vec(output, &[batch_size, self.out_channels, out_h, out_w])
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
        LayerKind::Conv2d
    }

    fn output_shape(&self, input_shape: &[usize]) -> Vec<usize> {
        assert_eq!(input_shape.len(), 4, "Conv2d expects 4D input [N, C, H, W]");
        let (out_h, out_w) = self.output_hw(input_shape[2], input_shape[3]);
        vec![input_shape[0], self.out_channels, out_h, out_w]
    }

    fn weights(&self) -> Option<WeightSet> {
        Some(WeightSet::new(self.weight.clone(), self.bias.clone()))
    }

    fn set_weights(&mut self, weights: WeightSet) -> Result<()> {
        let current = WeightSet::new(self.weight.clone(), self.bias.clone());
        weights.check_compatible(&current)?;

        self.weight = weights.kernel;
        self.bias = weights.bias;
        Ok(())
    }
}

impl std::fmt::Debug for Conv2d {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Conv2d")
            .field("in_channels", &self.in_channels)
            .field("out_channels", &self.out_channels)
            .field("kernel_size", &(self.kernel_h, self.kernel_w))
            .field("stride", &(self.stride_h, self.stride_w))
            .field("padding", &(self.padding_h, self.padding_w))
            .field("bias", &self.bias.is_some())
            .finish()
    }
}

/// Applies max pooling over a 2D input signal (image).
///
/// # Shape
///
/// - Input: `(N, C, H, W)`
/// - Output: `(N, C, H_out, W_out)`
#[derive(Debug)]
pub struct MaxPool2d {
    kernel_h: usize,
    kernel_w: usize,
    stride_h: usize,
    stride_w: usize,
}

impl MaxPool2d {
    /// Create a new `MaxPool2d` layer with square kernel; stride equals the kernel size.
    #[must_use]
    pub fn new(kernel_size: usize) -> Self {
        Self::with_stride(kernel_size, kernel_size)
    }

    /// Create `MaxPool2d` with custom stride.
    #[must_use]
    pub fn with_stride(kernel_size: usize, stride: usize) -> Self {
        assert!(stride > 0, "MaxPool2d stride must be non-zero");
        Self {
            kernel_h: kernel_size,
            kernel_w: kernel_size,
            stride_h: stride,
            stride_w: stride,
        }
    }
}

impl Module for MaxPool2d {
    fn forward(&self, input: &Tensor) -> Tensor {
        assert_eq!(input.ndim(), 4, "MaxPool2d expects 4D input [N, C, H, W]");

        let out_shape = self.output_shape(input.shape());
        let (batch_size, channels, out_h, out_w) =
            (out_shape[0], out_shape[1], out_shape[2], out_shape[3]);
        let (in_h, in_w) = (input.shape()[2], input.shape()[3]);

        let mut output = vec![f32::NEG_INFINITY; batch_size * channels * out_h * out_w];
        let input_data = input.data();

        for n in 0..batch_size {
            for c in 0..channels {
                for oh in 0..out_h {
                    for ow in 0..out_w {
                        let mut max_val = f32::NEG_INFINITY;

                        for kh in 0..self.kernel_h {
                            for kw in 0..self.kernel_w {
                                let ih = oh * self.stride_h + kh;
                                let iw = ow * self.stride_w + kw;
                                let val = input_data
                                    [n * channels * in_h * in_w + c * in_h * in_w + ih * in_w + iw];
                                max_val = max_val.max(val);
                            }
                        }

                        output
                            [n * channels * out_h * out_w + c * out_h * out_w + oh * out_w + ow] =
                            max_val;
                    }
                }
            }
        }

        Tensor::from_vec(output, &out_shape)
    }

    fn kind(&self) -> LayerKind {
        LayerKind::Pooling
    }

    fn output_shape(&self, input_shape: &[usize]) -> Vec<usize> {
        assert_eq!(input_shape.len(), 4, "MaxPool2d expects 4D input [N, C, H, W]");
        let out_h = window_count(input_shape[2], self.kernel_h, self.stride_h);
        let out_w = window_count(input_shape[3], self.kernel_w, self.stride_w);
        vec![input_shape[0], input_shape[1], out_h, out_w]
    }
}

/// Number of sliding-window positions along one axis; zero when the window
/// does not fit.
fn window_count(extent: usize, kernel: usize, stride: usize) -> usize {
    extent
        .checked_sub(kernel)
        .map_or(0, |room| room / stride + 1)
}

/// Flattens contiguous dimensions of a tensor.
///
/// # Shape
///
/// - Input: `(N, *dims)`
/// - Output: `(N, prod(dims))`
#[derive(Debug)]
pub struct Flatten {
    start_dim: usize,
}

impl Flatten {
    /// Create a new Flatten layer, flattening from dimension 1 onwards
    /// (preserving batch).
    #[must_use]
    pub fn new() -> Self {
        Self { start_dim: 1 }
    }

    /// Create Flatten with custom start dimension.
    #[must_use]
    pub fn from_dim(start_dim: usize) -> Self {
        Self { start_dim }
    }
}

impl Default for Flatten {
    fn default() -> Self {
        Self::new()
    }
}

impl Module for Flatten {
    fn forward(&self, input: &Tensor) -> Tensor {
        input.view(&self.output_shape(input.shape()))
    }

    fn kind(&self) -> LayerKind {
        LayerKind::Reshape
    }

    fn output_shape(&self, input_shape: &[usize]) -> Vec<usize> {
        if input_shape.len() <= self.start_dim + 1 {
            return input_shape.to_vec();
        }

        let mut new_shape = input_shape[..self.start_dim].to_vec();
        new_shape.push(input_shape[self.start_dim..].iter().product());
        new_shape
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conv2d_shape() {
        let conv = Conv2d::new(3, 16, 3);
        let x = Tensor::ones(&[2, 3, 8, 8]);
        let y = conv.forward(&x);
        assert_eq!(y.shape(), &[2, 16, 6, 6]);
        assert_eq!(conv.output_shape(&[2, 3, 8, 8]), vec![2, 16, 6, 6]);
    }

    #[test]
    fn test_conv2d_padding_and_stride() {
        let conv = Conv2d::with_options(1, 2, (3, 3), (2, 2), (1, 1), true);
        let x = Tensor::ones(&[1, 1, 5, 5]);
        let y = conv.forward(&x);
        assert_eq!(y.shape(), &[1, 2, 3, 3]);

        let same = Conv2d::with_padding(1, 1, 3, 1);
        assert_eq!(same.output_shape(&[1, 1, 5, 5]), vec![1, 1, 5, 5]);
    }

    #[test]
    fn test_conv2d_input_smaller_than_kernel() {
        let conv = Conv2d::new(1, 4, 5);
        assert_eq!(conv.output_shape(&[2, 1, 3, 3]), vec![2, 4, 0, 0]);

        let y = conv.forward(&Tensor::ones(&[2, 1, 3, 3]));
        assert_eq!(y.shape(), &[2, 4, 0, 0]);
        assert_eq!(y.numel(), 0);
    }

    #[test]
    #[should_panic(expected = "stride must be non-zero")]
    fn test_conv2d_zero_stride_panics() {
        let _ = Conv2d::with_options(1, 1, (3, 3), (0, 1), (0, 0), false);
    }

    #[test]
    fn test_maxpool2d_input_smaller_than_kernel() {
        let pool = MaxPool2d::new(4);
        assert_eq!(pool.output_shape(&[1, 3, 2, 2]), vec![1, 3, 0, 0]);
        assert_eq!(pool.forward(&Tensor::ones(&[1, 3, 2, 2])).numel(), 0);
    }

    #[test]
    #[should_panic(expected = "stride must be non-zero")]
    fn test_maxpool2d_zero_stride_panics() {
        let _ = MaxPool2d::with_stride(2, 0);
    }

    #[test]
    fn test_conv2d_known_values() {
        let mut conv = Conv2d::with_seed(1, 1, (2, 2), (1, 1), (0, 0), true, Some(0));
        conv.set_weights(WeightSet::new(
            Tensor::ones(&[1, 1, 2, 2]),
            Some(Tensor::from_slice(&[1.0])),
        ))
        .expect("shapes match");

        let x = Tensor::new(
            &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0],
            &[1, 1, 3, 3],
        );
        let y = conv.forward(&x);

        // window sums plus bias
        assert_eq!(y.data(), &[13.0, 17.0, 25.0, 29.0]);
    }

    #[test]
    fn test_conv2d_weights() {
        let conv = Conv2d::with_options(4, 8, (3, 3), (1, 1), (0, 0), false);
        let weights = conv.weights().expect("conv has weights");
        assert_eq!(weights.kernel.shape(), &[8, 4, 3, 3]);
        assert!(weights.bias.is_none());
        assert_eq!(conv.kind(), LayerKind::Conv2d);
    }

    #[test]
    fn test_maxpool2d() {
        let pool = MaxPool2d::new(2);
        let x = Tensor::new(
            &[
                1.0, 2.0, 3.0, 4.0, //
                5.0, 6.0, 7.0, 8.0, //
                9.0, 10.0, 11.0, 12.0, //
                13.0, 14.0, 15.0, 16.0,
            ],
            &[1, 1, 4, 4],
        );
        let y = pool.forward(&x);
        assert_eq!(y.shape(), &[1, 1, 2, 2]);
        assert_eq!(y.data(), &[6.0, 8.0, 14.0, 16.0]);
        assert_eq!(pool.kind(), LayerKind::Pooling);
        assert!(pool.weights().is_none());
    }

    #[test]
    fn test_flatten() {
        let flatten = Flatten::new();
        let x = Tensor::zeros(&[2, 3, 4, 5]);
        let y = flatten.forward(&x);
        assert_eq!(y.shape(), &[2, 60]);

        let already_flat = Tensor::zeros(&[2, 60]);
        assert_eq!(flatten.forward(&already_flat).shape(), &[2, 60]);

        let partial = Flatten::from_dim(2);
        assert_eq!(partial.output_shape(&[2, 3, 4, 5]), vec![2, 3, 20]);
    }
}
