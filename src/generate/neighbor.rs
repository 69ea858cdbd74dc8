use crate::assembler::Assembler;
use crate::basis::{NUMBER_OF_FACES, NUMBER_OF_FACE_ROTATIONS};
use crate::catalogue::{add_family, family_member_name, no_prefetch, KernelCatalogue, ParameterSpace, Target};
use crate::error::GeneratorError;
use crate::materialize::{materialize_all, Precombination};
use crate::model::EquationModel;
use adergen_tensor::Equation;
use log::info;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Parameters `(h, j, i)` of a neighbor flux: face rotation, neighbor face and local face.
fn neighbor_space() -> ParameterSpace {
    ParameterSpace::new([NUMBER_OF_FACE_ROTATIONS, NUMBER_OF_FACES, NUMBER_OF_FACES])
}

/// Adds the neighboring flux families.
///
/// The cpu family `neighboringFlux` chains `rDivM(i) * fP(h) * rT(j)` symbolically. For the gpu
/// the chain is precombined into `fluxMinus(x)` with `x` the linear index of `(h, j, i)`, and the
/// family `gpu_neighboringFlux` multiplies with that single matrix.
///
/// Returns the number of kernels added.
pub fn add_neighbor<M, C>(
    assembler: &mut Assembler<M>,
    catalogue: &mut C,
    targets: &BTreeSet<Target>,
) -> Result<usize, GeneratorError>
where
    M: EquationModel,
    C: KernelCatalogue + ?Sized,
{
    let space = neighbor_space();
    if targets.contains(&Target::Gpu) {
        let plans: Vec<_> = space
            .iter()
            .map(|p| {
                let (h, j, i) = (p[0], p[1], p[2]);
                Precombination::new(
                    family_member_name("fluxMinus", space.linear_index(&p)),
                    [
                        family_member_name("rDivM", i),
                        family_member_name("fP", h),
                        family_member_name("rT", j),
                    ],
                )
            })
            .collect();
        materialize_all(assembler.db_mut(), &plans)?;
    }
    let assembler = &*assembler;
    let mut count = 0;

    if targets.contains(&Target::Cpu) {
        count += add_family(
            catalogue,
            "neighboringFlux",
            &space,
            Some(Target::Cpu),
            |p| neighboring_flux(assembler, p[0], p[1], p[2]),
            |_| vec![Arc::clone(assembler.i().tensor())],
        )?;
    }

    if targets.contains(&Target::Gpu) {
        count += add_family(
            catalogue,
            &format!("{}neighboringFlux", Target::Gpu.name_prefix()),
            &ParameterSpace::new([space.len()]),
            Some(Target::Gpu),
            |p| neighboring_flux_precombined(assembler, p[0]),
            no_prefetch,
        )?;
    }

    info!("Added {} neighbor kernels", count);
    Ok(count)
}

fn neighboring_flux<M: EquationModel>(
    assembler: &Assembler<M>,
    rotation: usize,
    neighbor_face: usize,
    face: usize,
) -> Result<Equation, GeneratorError> {
    let db = assembler.db();
    let q_ext = assembler.q_ext();
    let flux = db.group("rDivM", face)?.at(&assembler.t("km"))
        * db.group("fP", rotation)?.at(&assembler.t("mn"))
        * db.group("rT", neighbor_face)?.at(&assembler.t("nl"))
        * assembler.i().at("lq")
        * assembler.aminus_t().at("qp");
    Ok(q_ext.access("kp").assign(q_ext.at("kp") + flux))
}

fn neighboring_flux_precombined<M: EquationModel>(
    assembler: &Assembler<M>,
    linear: usize,
) -> Result<Equation, GeneratorError> {
    let q_ext = assembler.q_ext();
    let flux_minus = assembler.db().group("fluxMinus", linear)?;
    let flux = flux_minus.at(&assembler.t("kl")) * assembler.i().at("lq") * assembler.aminus_t().at("qp");
    Ok(q_ext.access("kp").assign(q_ext.at("kp") + flux))
}
