//! Batching of multiple simultaneous simulations.
//!
//! When several simulations are run at once, every solution-like tensor carries an additional
//! leading dimension over the simulations, and the matrices of the matrix database are stored
//! transposed so that the batch dimension stays the fastest one. Both decisions are derived
//! from [`MultipleSimulations`] once per generation run.
use adergen_tensor::{Expr, SparsityPattern, Tensor, TensorAccess};
use std::sync::Arc;

/// Index name of the optional simulation dimension.
pub const SIMULATION_INDEX: char = 's';

/// The number of simulations that are batched together.
///
/// Widths 0 and 1 both mean that batching is disabled.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct MultipleSimulations(usize);

impl MultipleSimulations {
    pub fn new(width: usize) -> Self {
        Self(width)
    }

    pub fn is_enabled(&self) -> bool {
        self.0 > 1
    }

    /// The extent of the simulation dimension; 1 if batching is disabled.
    pub fn width(&self) -> usize {
        self.0.max(1)
    }

    pub fn index_order(&self) -> IndexOrder {
        if self.is_enabled() {
            IndexOrder::Reversed
        } else {
            IndexOrder::Natural
        }
    }
}

/// How index strings of database matrices are written.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum IndexOrder {
    #[default]
    Natural,
    /// Matrices are stored transposed and accessed with reversed index strings.
    Reversed,
}

impl IndexOrder {
    /// Rewrites the index string of a database matrix access.
    pub fn apply(&self, indices: &str) -> String {
        match self {
            IndexOrder::Natural => indices.to_string(),
            IndexOrder::Reversed => indices.chars().rev().collect(),
        }
    }

    pub fn is_reversed(&self) -> bool {
        matches!(self, IndexOrder::Reversed)
    }
}

/// A tensor with an optional leading simulation dimension.
///
/// Accesses are written without the simulation index; it is prepended automatically when the
/// dimension is present, so the same index strings work in both configurations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionalDimTensor {
    tensor: Arc<Tensor>,
    simulations: MultipleSimulations,
}

impl OptionalDimTensor {
    /// Declares a dense tensor with shape `shape`, plus the simulation dimension if enabled.
    pub fn new(name: impl Into<String>, simulations: MultipleSimulations, shape: &[usize]) -> Self {
        let full_shape = Self::full_shape(simulations, shape);
        Self {
            tensor: Tensor::new(name, full_shape),
            simulations,
        }
    }

    /// Declares a tensor with the given pattern, which must already include the simulation
    /// dimension if it is enabled.
    ///
    /// # Panics
    ///
    /// Panics if the rank of the pattern does not account for the simulation dimension.
    pub fn with_pattern(name: impl Into<String>, simulations: MultipleSimulations, pattern: SparsityPattern) -> Self {
        if simulations.is_enabled() {
            assert_eq!(
                pattern.shape().first().copied(),
                Some(simulations.width()),
                "Pattern must start with the simulation dimension."
            );
        }
        Self {
            tensor: Tensor::with_pattern(name, pattern),
            simulations,
        }
    }

    fn full_shape(simulations: MultipleSimulations, shape: &[usize]) -> Vec<usize> {
        let mut full_shape = Vec::with_capacity(shape.len() + 1);
        if simulations.is_enabled() {
            full_shape.push(simulations.width());
        }
        full_shape.extend_from_slice(shape);
        full_shape
    }

    pub fn tensor(&self) -> &Arc<Tensor> {
        &self.tensor
    }

    pub fn name(&self) -> &str {
        self.tensor.name()
    }

    pub fn has_opt_dim(&self) -> bool {
        self.simulations.is_enabled()
    }

    pub fn opt_size(&self) -> usize {
        self.simulations.width()
    }

    pub fn simulations(&self) -> MultipleSimulations {
        self.simulations
    }

    /// The shape without the simulation dimension.
    pub fn base_shape(&self) -> &[usize] {
        let shape = self.tensor.shape();
        if self.has_opt_dim() {
            &shape[1..]
        } else {
            shape
        }
    }

    /// The full index string for the given base indices.
    pub fn indices(&self, indices: &str) -> String {
        if self.has_opt_dim() {
            std::iter::once(SIMULATION_INDEX).chain(indices.chars()).collect()
        } else {
            indices.to_string()
        }
    }

    pub fn access(&self, indices: &str) -> TensorAccess {
        self.tensor.access(&self.indices(indices))
    }

    pub fn at(&self, indices: &str) -> Expr {
        self.tensor.at(&self.indices(indices))
    }

    /// A tensor with the same batching and base shape but a different name.
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self::new(name, self.simulations, self.base_shape())
    }
}
