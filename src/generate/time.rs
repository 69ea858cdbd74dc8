use crate::assembler::Assembler;
use crate::basis::DIMENSIONS;
use crate::catalogue::{add_kernel, family_member_name, KernelCatalogue, Target};
use crate::error::GeneratorError;
use crate::layout::OptionalDimTensor;
use crate::model::EquationModel;
use adergen_tensor::{deduce_sparsity, Expr, Scalar, SparsityPattern};
use log::{debug, info, warn};
use std::collections::BTreeSet;

/// One time derivative of the degrees of freedom together with its defining expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Derivative {
    pub tensor: OptionalDimTensor,
    /// The expression `dQ(k)[kp]` is assigned.
    pub rhs: Expr,
}

/// The time derivatives `dQ(0), ..., dQ(order - 1)` of the Cauchy-Kowalevski procedure.
///
/// Each derivative is declared with the sparsity deduced from its defining expression, so
/// later derivatives only cover the basis functions that can still be non-zero.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DerivativeArena {
    derivatives: Vec<Derivative>,
}

impl DerivativeArena {
    pub fn len(&self) -> usize {
        self.derivatives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.derivatives.is_empty()
    }

    pub fn get(&self, k: usize) -> Option<&Derivative> {
        self.derivatives.get(k)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Derivative> {
        self.derivatives.iter()
    }

    /// Sparsity of `dQ(k)`.
    pub fn pattern(&self, k: usize) -> Option<&SparsityPattern> {
        self.get(k).map(|derivative| derivative.tensor.tensor().pattern())
    }
}

/// Builds the chain of derivative tensors.
///
/// `dQ(0)` is the dense solution itself. For `k >= 1`,
/// `dQ(k)[kp] = dQ(k-1)[kq] * source[qp] + Σ_d kDivMT(d)[kl] * dQ(k-1)[lq] * star(d)[qp]`,
/// where the source term is only present if the model has a source matrix.
pub fn build_derivatives<M: EquationModel>(assembler: &Assembler<M>) -> Result<DerivativeArena, GeneratorError> {
    let q = assembler.q();
    let model = assembler.model();
    let mut derivatives = Vec::with_capacity(assembler.order());
    derivatives.push(Derivative {
        tensor: q.renamed(family_member_name("dQ", 0)),
        rhs: q.at("kp"),
    });

    for k in 1..assembler.order() {
        let previous = &derivatives[k - 1].tensor;
        let mut rhs = Expr::sum();
        if let Some(source) = model.source_matrix() {
            rhs += previous.at("kq") * source.at("qp");
        }
        for dim in 0..DIMENSIONS {
            let k_div_mt = assembler.db().group("kDivMT", dim)?;
            rhs += k_div_mt.at(&assembler.t("kl")) * previous.at("lq") * model.star_matrix(dim).at("qp");
        }

        let pattern = deduce_sparsity(&rhs, &q.access("kp"))?;
        let name = family_member_name("dQ", k);
        debug!("{} has {}", name, pattern);
        if pattern.is_empty() {
            warn!("{} is structurally zero", name);
        }
        derivatives.push(Derivative {
            tensor: OptionalDimTensor::with_pattern(name, q.simulations(), pattern),
            rhs,
        });
    }
    Ok(DerivativeArena { derivatives })
}

/// Adds the derivative and Taylor expansion kernels for every requested target.
///
/// Per target this emits `derivative(k)` computing `dQ(k)`, and `derivativeTaylorExpansion(k)`
/// accumulating `power * dQ(k)` into `I`, for `k = 0, ..., order - 1`.
pub fn add_time<M, C>(
    assembler: &Assembler<M>,
    catalogue: &mut C,
    targets: &BTreeSet<Target>,
) -> Result<DerivativeArena, GeneratorError>
where
    M: EquationModel,
    C: KernelCatalogue + ?Sized,
{
    let derivatives = build_derivatives(assembler)?;
    let i = assembler.i();
    let power = Scalar::new("power");

    for &target in targets {
        let prefix = target.name_prefix();
        for (k, derivative) in derivatives.iter().enumerate() {
            add_kernel(
                catalogue,
                family_member_name(&format!("{}derivative", prefix), k),
                derivative.tensor.access("kp").assign(derivative.rhs.clone()),
                Some(target),
            )?;

            let taylor_term = power.clone() * derivative.tensor.at("kp");
            let expansion = if k == 0 {
                taylor_term
            } else {
                i.at("kp") + taylor_term
            };
            add_kernel(
                catalogue,
                family_member_name(&format!("{}derivativeTaylorExpansion", prefix), k),
                i.access("kp").assign(expansion),
                Some(target),
            )?;
        }
    }
    info!(
        "Added {} time kernels for {} derivatives",
        2 * derivatives.len() * targets.len(),
        derivatives.len()
    );
    Ok(derivatives)
}
