//! Numeric precombination of database matrices.
//!
//! Some backends consume a single matrix where the symbolic kernel chains two or three database
//! matrices. Such products are computed here ahead of kernel emission and inserted into the
//! matrix database under a new name. Products are associated from the right, i.e.
//! `A * B * C` is evaluated as `A * (B * C)`.
use crate::database::MatrixDatabase;
use crate::error::GeneratorError;
use adergen_tensor::Tensor;
use log::debug;
use nalgebra::DMatrix;
use rayon::prelude::*;
use std::sync::Arc;

/// The product of the given matrices, associated from the right.
///
/// Returns `None` if the list is empty or adjacent shapes do not fit.
pub fn chain_product(factors: &[&DMatrix<f64>]) -> Option<DMatrix<f64>> {
    let (last, rest) = factors.split_last()?;
    rest.iter().rev().try_fold((*last).clone(), |product, factor| {
        (factor.ncols() == product.nrows()).then(|| *factor * product)
    })
}

/// A named product of database matrices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Precombination {
    name: String,
    factors: Vec<String>,
}

impl Precombination {
    pub fn new(name: impl Into<String>, factors: impl IntoIterator<Item = String>) -> Self {
        Self {
            name: name.into(),
            factors: factors.into_iter().collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn factors(&self) -> &[String] {
        &self.factors
    }

    /// Computes the product from the values in `db`.
    pub fn evaluate(&self, db: &MatrixDatabase) -> Result<DMatrix<f64>, GeneratorError> {
        let factors = self
            .factors
            .iter()
            .map(|name| db.values(name))
            .collect::<Result<Vec<_>, _>>()?;
        chain_product(&factors).ok_or_else(|| {
            GeneratorError::invalid_configuration(format!(
                "cannot precombine {}: factors [{}] have incompatible shapes",
                self.name,
                self.factors.join(", ")
            ))
        })
    }
}

/// Evaluates all precombinations and inserts the products into `db`.
///
/// Products are computed in parallel but inserted in the order of `plans`, so the result does not
/// depend on scheduling. Returns the declared tensors in the same order.
pub fn materialize_all(db: &mut MatrixDatabase, plans: &[Precombination]) -> Result<Vec<Arc<Tensor>>, GeneratorError> {
    let products = {
        let db = &*db;
        plans
            .par_iter()
            .map(|plan| plan.evaluate(db))
            .collect::<Result<Vec<_>, _>>()?
    };
    let mut tensors = Vec::with_capacity(plans.len());
    for (plan, product) in plans.iter().zip(products) {
        debug!("Precombined {} = {}", plan.name(), plan.factors().join(" * "));
        tensors.push(db.insert(plan.name(), product)?);
    }
    Ok(tensors)
}
