//! Expression trees over tensor accesses.
use crate::deduce::{deduce_free_indices, deduce_sparsity, DeductionError};
use crate::tensor::{Scalar, Tensor, TensorAccess};
use crate::SparsityPattern;
use std::fmt;
use std::ops::{Add, AddAssign, Mul};
use std::sync::Arc;

/// A symbolic tensor expression.
///
/// Indices that occur in more than one factor of a [`Expr::Product`] and do not belong to the
/// output are summed over (Einstein convention). All terms of a [`Expr::Sum`] must have the same
/// set of free indices.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    Access(TensorAccess),
    Product(Vec<Expr>),
    Sum(Vec<Expr>),
    Scaled(Scalar, Box<Expr>),
}

impl Expr {
    /// An empty sum, to be extended with `+=`.
    pub fn sum() -> Self {
        Expr::Sum(Vec::new())
    }

    /// Visit every tensor access in the expression from left to right.
    pub fn for_each_access<'a>(&'a self, f: &mut impl FnMut(&'a TensorAccess)) {
        match self {
            Expr::Access(access) => f(access),
            Expr::Product(children) | Expr::Sum(children) => {
                for child in children {
                    child.for_each_access(&mut *f);
                }
            }
            Expr::Scaled(_, inner) => inner.for_each_access(f),
        }
    }
}

impl From<TensorAccess> for Expr {
    fn from(access: TensorAccess) -> Self {
        Expr::Access(access)
    }
}

impl Mul for Expr {
    type Output = Expr;

    fn mul(self, rhs: Expr) -> Expr {
        let mut factors = match self {
            Expr::Product(factors) => factors,
            other => vec![other],
        };
        match rhs {
            Expr::Product(rhs_factors) => factors.extend(rhs_factors),
            other => factors.push(other),
        }
        Expr::Product(factors)
    }
}

impl Mul<Expr> for Scalar {
    type Output = Expr;

    fn mul(self, rhs: Expr) -> Expr {
        Expr::Scaled(self, Box::new(rhs))
    }
}

impl Add for Expr {
    type Output = Expr;

    fn add(mut self, rhs: Expr) -> Expr {
        self += rhs;
        self
    }
}

impl AddAssign for Expr {
    fn add_assign(&mut self, rhs: Expr) {
        let lhs = std::mem::replace(self, Expr::Sum(Vec::new()));
        let mut terms = match lhs {
            Expr::Sum(terms) => terms,
            other => vec![other],
        };
        match rhs {
            Expr::Sum(rhs_terms) => terms.extend(rhs_terms),
            other => terms.push(other),
        }
        *self = Expr::Sum(terms);
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Access(access) => write!(f, "{}", access),
            Expr::Product(factors) => {
                for (i, factor) in factors.iter().enumerate() {
                    if i > 0 {
                        write!(f, " * ")?;
                    }
                    match factor {
                        Expr::Sum(_) => write!(f, "({})", factor)?,
                        _ => write!(f, "{}", factor)?,
                    }
                }
                Ok(())
            }
            Expr::Sum(terms) => {
                for (i, term) in terms.iter().enumerate() {
                    if i > 0 {
                        write!(f, " + ")?;
                    }
                    write!(f, "{}", term)?;
                }
                Ok(())
            }
            Expr::Scaled(scalar, inner) => match inner.as_ref() {
                Expr::Sum(_) => write!(f, "{} * ({})", scalar, inner),
                _ => write!(f, "{} * {}", scalar, inner),
            },
        }
    }
}

/// The declaration `lhs <= rhs`.
///
/// Equations are never evaluated; they only describe what a generated kernel computes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Equation {
    lhs: TensorAccess,
    rhs: Expr,
}

impl Equation {
    pub fn new(lhs: TensorAccess, rhs: Expr) -> Self {
        Self { lhs, rhs }
    }

    pub fn lhs(&self) -> &TensorAccess {
        &self.lhs
    }

    pub fn rhs(&self) -> &Expr {
        &self.rhs
    }

    /// Checks that the free indices of the right-hand side match the left-hand side and that
    /// every index name has a consistent extent across all accesses.
    pub fn validate(&self) -> Result<(), DeductionError> {
        let free = deduce_free_indices(&self.rhs, &self.lhs)?;
        let mut expected = self.lhs.indices().to_vec();
        let mut actual = free;
        expected.sort_unstable();
        actual.sort_unstable();
        if expected != actual {
            return Err(DeductionError::new(
                self.lhs.indices(),
                format!(
                    "right-hand side has free indices {:?}",
                    actual.iter().collect::<String>()
                ),
            ));
        }
        Ok(())
    }

    /// The sparsity pattern of the right-hand side, in the index order of the left-hand side.
    pub fn rhs_sparsity(&self) -> Result<SparsityPattern, DeductionError> {
        self.validate()?;
        deduce_sparsity(&self.rhs, &self.lhs)
    }

    /// All tensors referenced by the equation, left-hand side first, without duplicates.
    pub fn tensors(&self) -> Vec<&Arc<Tensor>> {
        let mut tensors: Vec<&Arc<Tensor>> = vec![self.lhs.tensor()];
        self.rhs.for_each_access(&mut |access| {
            if !tensors.iter().any(|t| *t == access.tensor()) {
                tensors.push(access.tensor());
            }
        });
        tensors
    }
}

impl fmt::Display for Equation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <= {}", self.lhs, self.rhs)
    }
}
