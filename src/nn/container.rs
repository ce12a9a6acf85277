//! Container modules for composing neural networks.

use super::module::{LayerKind, Module, WeightSet};
use crate::error::Result;
use crate::lsuv::LayerGraph;
use crate::tensor::Tensor;

/// Sequential container for chaining modules.
///
/// Modules are executed in order, with each module's output
/// becoming the next module's input. Every module carries a name; [`add`]
/// names it `<kind>_<index>`.
///
/// [`add`]: Sequential::add
///
/// # Example
///
/// ```
/// use lsuv::nn::{Linear, Module, ReLU, Sequential};
/// use lsuv::tensor::Tensor;
///
/// let model = Sequential::new()
///     .add(Linear::new(784, 256))
///     .add(ReLU::new())
///     .add(Linear::new(256, 10));
///
/// assert_eq!(model.name(0), Some("dense_0"));
/// let output = model.forward(&Tensor::zeros(&[32, 784]));
/// assert_eq!(output.shape(), &[32, 10]);
/// ```
pub struct Sequential {
    modules: Vec<Box<dyn Module>>,
    names: Vec<String>,
}

impl Sequential {
    /// Create an empty Sequential container.
    #[must_use]
    pub fn new() -> Self {
        Self {
            modules: Vec::new(),
            names: Vec::new(),
        }
    }

    /// Add a module to the sequence with a generated name.
    ///
    /// Returns self for method chaining.
    #[allow(clippy::should_implement_trait)]
    pub fn add<M: Module + 'static>(self, module: M) -> Self {
        self.add_boxed(Box::new(module))
    }

    /// Add a module under an explicit name.
    #[must_use]
    pub fn add_named<M: Module + 'static>(mut self, name: impl Into<String>, module: M) -> Self {
        self.modules.push(Box::new(module));
        self.names.push(name.into());
        self
    }

    /// Add a module by boxed trait object.
    #[must_use]
    pub fn add_boxed(mut self, module: Box<dyn Module>) -> Self {
        let name = format!("{}_{}", module.kind(), self.modules.len());
        self.modules.push(module);
        self.names.push(name);
        self
    }

    /// Get the number of modules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Check if the container is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Get a module by index.
    pub fn get(&self, index: usize) -> Option<&dyn Module> {
        self.modules.get(index).map(AsRef::as_ref)
    }

    /// Get a module's name by index.
    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// Run the modules `0..=index` on `input`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[must_use]
    pub fn forward_to(&self, index: usize, input: &Tensor) -> Tensor {
        self.modules[..=index]
            .iter()
            .fold(input.clone(), |x, module| module.forward(&x))
    }
}

impl Default for Sequential {
    fn default() -> Self {
        Self::new()
    }
}

impl Module for Sequential {
    fn forward(&self, input: &Tensor) -> Tensor {
        self.modules
            .iter()
            .fold(input.clone(), |x, module| module.forward(&x))
    }

    fn parameters(&self) -> Vec<&Tensor> {
        self.modules.iter().flat_map(|m| m.parameters()).collect()
    }

    fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        self.modules
            .iter_mut()
            .flat_map(|m| m.parameters_mut())
            .collect()
    }

    fn kind(&self) -> LayerKind {
        LayerKind::Container
    }

    fn output_shape(&self, input_shape: &[usize]) -> Vec<usize> {
        self.modules
            .iter()
            .fold(input_shape.to_vec(), |shape, module| module.output_shape(&shape))
    }
}

impl LayerGraph for Sequential {
    fn num_layers(&self) -> usize {
        self.modules.len()
    }

    fn layer_name(&self, index: usize) -> String {
        self.names[index].clone()
    }

    fn layer_kind(&self, index: usize) -> LayerKind {
        self.modules[index].kind()
    }

    fn layer_output_shape(&self, index: usize, input_shape: &[usize]) -> Vec<usize> {
        self.modules[..=index]
            .iter()
            .fold(input_shape.to_vec(), |shape, module| module.output_shape(&shape))
    }

    fn layer_weights(&self, index: usize) -> Option<WeightSet> {
        self.modules[index].weights()
    }

    fn set_layer_weights(&mut self, index: usize, weights: WeightSet) -> Result<()> {
        self.modules[index].set_weights(weights)
    }

    fn activations(&self, index: usize, batch: &Tensor) -> Tensor {
        self.forward_to(index, batch)
    }
}

impl std::fmt::Debug for Sequential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sequential")
            .field("layers", &self.names)
            .finish()
    }
}
