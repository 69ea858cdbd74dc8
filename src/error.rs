//! Errors raised while generating kernels.
use crate::catalogue::Target;
use adergen_tensor::DeductionError;
use std::error::Error;
use std::fmt;

/// The two classes of generation failures. Both are fatal for the configuration at hand.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    SparsityDeduction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneratorError {
    /// A matrix required by the generators is absent from the matrix database.
    MissingMatrix { name: String, order: usize },
    /// A matrix exists in the database, but its shape does not fit the polynomial order.
    MatrixShape {
        name: String,
        order: usize,
        expected: (usize, usize),
        actual: (usize, usize),
    },
    /// A matrix was inserted twice into the matrix database.
    DuplicateMatrix { name: String },
    /// A kernel name was emitted twice for the same target.
    DuplicateKernel { name: String, target: Option<Target> },
    /// Two different tensors were declared under the same name.
    ConflictingTensor { name: String },
    /// An equation model does not satisfy its contract.
    ModelContract { message: String },
    InvalidOrder { order: usize },
    InvalidConfiguration { message: String },
    SparsityDeduction(DeductionError),
}

impl GeneratorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GeneratorError::SparsityDeduction(_) => ErrorKind::SparsityDeduction,
            _ => ErrorKind::Configuration,
        }
    }

    pub(crate) fn model_contract(message: impl Into<String>) -> Self {
        GeneratorError::ModelContract {
            message: message.into(),
        }
    }

    pub(crate) fn invalid_configuration(message: impl Into<String>) -> Self {
        GeneratorError::InvalidConfiguration {
            message: message.into(),
        }
    }
}

impl fmt::Display for GeneratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeneratorError::MissingMatrix { name, order } => {
                write!(f, "matrix {} is missing from the matrix database for order {}", name, order)
            }
            GeneratorError::MatrixShape {
                name,
                order,
                expected,
                actual,
            } => write!(
                f,
                "matrix {} has shape {}x{} but order {} requires {}x{}",
                name, actual.0, actual.1, order, expected.0, expected.1
            ),
            GeneratorError::DuplicateMatrix { name } => {
                write!(f, "matrix {} is already present in the matrix database", name)
            }
            GeneratorError::DuplicateKernel { name, target } => match target {
                Some(target) => write!(f, "kernel {} was already added for target {}", name, target),
                None => write!(f, "kernel {} was already added", name),
            },
            GeneratorError::ConflictingTensor { name } => {
                write!(f, "tensor {} was declared with conflicting shape or sparsity", name)
            }
            GeneratorError::ModelContract { message } => write!(f, "equation model contract violated: {}", message),
            GeneratorError::InvalidOrder { order } => {
                write!(f, "polynomial order must be at least 1, got {}", order)
            }
            GeneratorError::InvalidConfiguration { message } => write!(f, "invalid configuration: {}", message),
            GeneratorError::SparsityDeduction(err) => write!(f, "{}", err),
        }
    }
}

impl Error for GeneratorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            GeneratorError::SparsityDeduction(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DeductionError> for GeneratorError {
    fn from(err: DeductionError) -> Self {
        GeneratorError::SparsityDeduction(err)
    }
}
