use crate::expr::Expr;
use crate::SparsityPattern;
use std::fmt;
use std::sync::Arc;

/// A named, immutable tensor declaration.
///
/// A tensor carries no values, only its shape and which of its entries may be non-zero.
/// Declarations are shared between equations through [`Arc`]; two declarations are equal
/// if their names, shapes and sparsity patterns coincide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tensor {
    name: String,
    pattern: SparsityPattern,
}

impl Tensor {
    /// Declares a dense tensor of the given shape.
    pub fn new(name: impl Into<String>, shape: impl Into<Vec<usize>>) -> Arc<Self> {
        Self::with_pattern(name, SparsityPattern::dense(shape))
    }

    /// Declares a tensor whose shape and sparsity are given by `pattern`.
    pub fn with_pattern(name: impl Into<String>, pattern: SparsityPattern) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            pattern,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shape(&self) -> &[usize] {
        self.pattern.shape()
    }

    pub fn rank(&self) -> usize {
        self.pattern.rank()
    }

    pub fn pattern(&self) -> &SparsityPattern {
        &self.pattern
    }

    /// Access the tensor with the given index names, one character per dimension.
    pub fn access(self: &Arc<Self>, indices: &str) -> TensorAccess {
        TensorAccess {
            tensor: Arc::clone(self),
            indices: indices.chars().collect(),
        }
    }

    /// Shorthand for an [`Expr`] leaf accessing the tensor with the given index names.
    pub fn at(self: &Arc<Self>, indices: &str) -> Expr {
        Expr::Access(self.access(indices))
    }
}

/// A tensor together with one index name per dimension.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TensorAccess {
    tensor: Arc<Tensor>,
    indices: Vec<char>,
}

impl TensorAccess {
    pub fn tensor(&self) -> &Arc<Tensor> {
        &self.tensor
    }

    pub fn indices(&self) -> &[char] {
        &self.indices
    }

    /// Declares the equation `self <= rhs`.
    pub fn assign(self, rhs: Expr) -> crate::Equation {
        crate::Equation::new(self, rhs)
    }
}

impl fmt::Display for TensorAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[", self.tensor.name())?;
        for index in &self.indices {
            write!(f, "{}", index)?;
        }
        write!(f, "]")
    }
}

/// A named scalar parameter of an equation, bound only when the generated kernel runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Scalar {
    name: String,
}

impl Scalar {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
