use crate::basis::DIMENSIONS;
use crate::catalogue::family_member_name;
use crate::error::GeneratorError;
use crate::layout::OptionalDimTensor;
use crate::model::{validate_model, EquationModel};
use adergen_tensor::{SparsityPattern, Tensor};
use std::sync::Arc;

fn star_tensors(patterns: [SparsityPattern; DIMENSIONS]) -> [Arc<Tensor>; DIMENSIONS] {
    let mut dim = 0;
    patterns.map(|pattern| {
        let tensor = Tensor::with_pattern(family_member_name("star", dim), pattern);
        dim += 1;
        tensor
    })
}

/// Position of the symmetric stress component `(i, j)` in the elastic state vector.
fn stress_index(i: usize, j: usize) -> usize {
    match (i.min(j), i.max(j)) {
        (0, 0) => 0,
        (1, 1) => 1,
        (2, 2) => 2,
        (0, 1) => 3,
        (1, 2) => 4,
        (0, 2) => 5,
        _ => unreachable!("stress indices are always below 3"),
    }
}

/// Isotropic linear elasticity in velocity-stress formulation.
///
/// The state vector is `(σxx, σyy, σzz, σxy, σyz, σxz, u, v, w)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinearElastic {
    star: [Arc<Tensor>; DIMENSIONS],
}

impl LinearElastic {
    pub const NUMBER_OF_QUANTITIES: usize = 9;

    pub fn new() -> Self {
        Self {
            star: star_tensors([0, 1, 2].map(Self::star_pattern)),
        }
    }

    /// Structural non-zeros of the elastic flux Jacobian in direction `dim`.
    pub fn star_pattern(dim: usize) -> SparsityPattern {
        let velocity = |component: usize| 6 + component;
        let mut entries = Vec::new();
        // (output, input) pairs
        for normal in 0..3 {
            entries.push((normal, velocity(dim)));
        }
        for e in (0..3).filter(|&e| e != dim) {
            entries.push((stress_index(dim, e), velocity(e)));
        }
        for e in 0..3 {
            entries.push((velocity(e), stress_index(e, dim)));
        }
        let n = Self::NUMBER_OF_QUANTITIES;
        SparsityPattern::from_entries(
            vec![n, n],
            entries.into_iter().map(|(output, input)| vec![input, output]),
        )
    }
}

impl Default for LinearElastic {
    fn default() -> Self {
        Self::new()
    }
}

impl EquationModel for LinearElastic {
    fn number_of_quantities(&self) -> usize {
        Self::NUMBER_OF_QUANTITIES
    }

    fn number_of_extended_quantities(&self) -> usize {
        Self::NUMBER_OF_QUANTITIES
    }

    fn extended_q_tensor(&self, q: &OptionalDimTensor) -> OptionalDimTensor {
        q.clone()
    }

    fn star_matrix(&self, dim: usize) -> Arc<Tensor> {
        Arc::clone(&self.star[dim])
    }
}

/// A general linear hyperbolic system given by the sparsity of its star matrices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinearModel {
    quantities: usize,
    extended_quantities: usize,
    star: [Arc<Tensor>; DIMENSIONS],
    source: Option<Arc<Tensor>>,
}

impl LinearModel {
    /// A model with the given star matrix patterns, which must all be square and of equal shape.
    pub fn new(star_patterns: [SparsityPattern; DIMENSIONS]) -> Result<Self, GeneratorError> {
        let quantities = star_patterns[0].shape().first().copied().unwrap_or(0);
        let model = Self {
            quantities,
            extended_quantities: quantities,
            star: star_tensors(star_patterns),
            source: None,
        };
        validate_model(&model)?;
        Ok(model)
    }

    /// A model whose star matrices are all diagonal.
    pub fn diagonal(quantities: usize) -> Result<Self, GeneratorError> {
        let diagonal = || SparsityPattern::from_entries(vec![quantities, quantities], (0..quantities).map(|q| vec![q, q]));
        Self::new([diagonal(), diagonal(), diagonal()])
    }

    /// Linear acoustics with state `(p, u, v, w)`.
    pub fn acoustic() -> Result<Self, GeneratorError> {
        let pattern = |dim: usize| {
            let velocity = 1 + dim;
            SparsityPattern::from_entries(vec![4, 4], vec![vec![velocity, 0], vec![0, velocity]])
        };
        Self::new([0, 1, 2].map(pattern))
    }

    pub fn with_source_pattern(mut self, pattern: SparsityPattern) -> Result<Self, GeneratorError> {
        self.source = Some(Tensor::with_pattern("sourceMatrix", pattern));
        validate_model(&self)?;
        Ok(self)
    }

    pub fn with_extended_quantities(mut self, extended_quantities: usize) -> Result<Self, GeneratorError> {
        self.extended_quantities = extended_quantities;
        validate_model(&self)?;
        Ok(self)
    }
}

impl EquationModel for LinearModel {
    fn number_of_quantities(&self) -> usize {
        self.quantities
    }

    fn number_of_extended_quantities(&self) -> usize {
        self.extended_quantities
    }

    fn extended_q_tensor(&self, q: &OptionalDimTensor) -> OptionalDimTensor {
        if self.extended_quantities == self.quantities {
            q.clone()
        } else {
            let basis_functions = q.base_shape()[0];
            OptionalDimTensor::new("Qext", q.simulations(), &[basis_functions, self.extended_quantities])
        }
    }

    fn star_matrix(&self, dim: usize) -> Arc<Tensor> {
        Arc::clone(&self.star[dim])
    }

    fn source_matrix(&self) -> Option<Arc<Tensor>> {
        self.source.clone()
    }
}
