//! Symbolic tensors, tensor equations and sparsity deduction.
//!
//! Tensors are declared with a shape and a structural sparsity pattern and combined into
//! [`Equation`]s using index names:
//!
//! ```
//! use adergen_tensor::{Scalar, Tensor};
//!
//! let a = Tensor::new("A", [4, 3]);
//! let b = Tensor::new("B", [3, 2]);
//! let c = Tensor::new("C", [4, 2]);
//! let equation = c.access("ij").assign(Scalar::new("alpha") * (a.at("ik") * b.at("kj")));
//! assert!(equation.validate().is_ok());
//! assert_eq!(equation.to_string(), "C[ij] <= alpha * A[ik] * B[kj]");
//! ```
pub mod deduce;
pub mod expr;
pub mod sparsity;
pub mod tensor;

pub use deduce::{deduce_sparsity, DeductionError};
pub use expr::{Equation, Expr};
pub use sparsity::SparsityPattern;
pub use tensor::{Scalar, Tensor, TensorAccess};
