//! Physical equation models.
//!
//! A model supplies the problem-specific tensors of a linear hyperbolic system
//! `Q_t + A Q_x + B Q_y + C Q_z = E Q`: the star matrices (flux Jacobians) per spatial dimension,
//! an optional source matrix, and structural sparsity for the Riemann-solver related tensors.
//! All index algebra is shared and lives in [`crate::assembler`] and [`crate::generate`].
use crate::basis::DIMENSIONS;
use crate::error::GeneratorError;
use crate::layout::OptionalDimTensor;
use adergen_tensor::{SparsityPattern, Tensor};
use std::sync::Arc;

mod linear;

pub use linear::*;

pub trait EquationModel {
    fn number_of_quantities(&self) -> usize;

    /// Number of quantities of the extended state the flux solvers act on.
    ///
    /// Must not be smaller than [`EquationModel::number_of_quantities`].
    fn number_of_extended_quantities(&self) -> usize;

    /// The tensor that surface fluxes accumulate into, given the solution tensor `q`.
    fn extended_q_tensor(&self, q: &OptionalDimTensor) -> OptionalDimTensor;

    /// The star matrix for spatial dimension `dim`.
    ///
    /// Its shape is `number_of_quantities x number_of_quantities`, with the first index ranging
    /// over input quantities and the second over output quantities.
    fn star_matrix(&self, dim: usize) -> Arc<Tensor>;

    /// Zeroth-order coupling term, if the model has one.
    fn source_matrix(&self) -> Option<Arc<Tensor>> {
        None
    }

    fn godunov_pattern(&self) -> SparsityPattern {
        let n = self.number_of_quantities();
        SparsityPattern::dense(vec![n, n])
    }

    fn flux_solver_pattern(&self) -> SparsityPattern {
        SparsityPattern::dense(vec![self.number_of_quantities(), self.number_of_extended_quantities()])
    }

    fn transformation_pattern(&self) -> SparsityPattern {
        SparsityPattern::dense(vec![self.number_of_extended_quantities(), self.number_of_quantities()])
    }

    fn transformation_inv_pattern(&self) -> SparsityPattern {
        self.godunov_pattern()
    }
}

/// Checks that `model` satisfies the [`EquationModel`] contract.
pub fn validate_model<M>(model: &M) -> Result<(), GeneratorError>
where
    M: EquationModel + ?Sized,
{
    let n = model.number_of_quantities();
    let n_ext = model.number_of_extended_quantities();
    if n == 0 {
        return Err(GeneratorError::model_contract("number of quantities must be positive"));
    }
    if n_ext < n {
        return Err(GeneratorError::model_contract(format!(
            "number of extended quantities ({}) is smaller than number of quantities ({})",
            n_ext, n
        )));
    }

    let check_shape = |what: &str, shape: &[usize], expected: [usize; 2]| {
        if shape == expected {
            Ok(())
        } else {
            Err(GeneratorError::model_contract(format!(
                "{} has shape {:?}, expected {:?}",
                what, shape, expected
            )))
        }
    };
    for dim in 0..DIMENSIONS {
        let star = model.star_matrix(dim);
        check_shape(star.name(), star.shape(), [n, n])?;
    }
    if let Some(source) = model.source_matrix() {
        check_shape(source.name(), source.shape(), [n, n])?;
    }
    check_shape("Godunov pattern", model.godunov_pattern().shape(), [n, n])?;
    check_shape("flux solver pattern", model.flux_solver_pattern().shape(), [n, n_ext])?;
    check_shape("transformation pattern", model.transformation_pattern().shape(), [n_ext, n])?;
    check_shape(
        "inverse transformation pattern",
        model.transformation_inv_pattern().shape(),
        [n, n],
    )?;
    Ok(())
}
