use crate::assembler::Assembler;
use crate::basis::{DIMENSIONS, NUMBER_OF_FACES};
use crate::catalogue::{add_family, add_kernel, family_member_name, no_prefetch, KernelCatalogue, ParameterSpace, Target};
use crate::error::GeneratorError;
use crate::materialize::{materialize_all, Precombination};
use crate::model::EquationModel;
use adergen_tensor::{Equation, Tensor};
use log::info;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Adds the volume kernel and the local surface flux families.
///
/// For every target this emits `volume` and the nodal family `localFluxNodal`. The modal
/// family `localFlux` is emitted for the cpu, while the gpu gets `gpu_localFlux`, which uses
/// the precombined matrices `fluxPlus(i) = rDivM(i) * fMrT(i)`.
///
/// Returns the number of kernels added.
pub fn add_local<M, C>(
    assembler: &mut Assembler<M>,
    catalogue: &mut C,
    targets: &BTreeSet<Target>,
) -> Result<usize, GeneratorError>
where
    M: EquationModel,
    C: KernelCatalogue + ?Sized,
{
    if targets.contains(&Target::Gpu) {
        let plans: Vec<_> = (0..NUMBER_OF_FACES)
            .map(|face| {
                Precombination::new(
                    family_member_name("fluxPlus", face),
                    [family_member_name("rDivM", face), family_member_name("fMrT", face)],
                )
            })
            .collect();
        materialize_all(assembler.db_mut(), &plans)?;
    }
    let assembler = &*assembler;
    let faces = ParameterSpace::new([NUMBER_OF_FACES]);
    let mut count = 0;

    for &target in targets {
        let prefix = target.name_prefix();
        add_kernel(catalogue, format!("{}volume", prefix), volume(assembler)?, Some(target))?;
        count += 1;

        count += add_family(
            catalogue,
            &format!("{}localFluxNodal", prefix),
            &faces,
            Some(target),
            |p| local_flux_nodal(assembler, p[0]),
            |p| local_flux_prefetch(assembler, p[0]),
        )?;
    }

    if targets.contains(&Target::Cpu) {
        count += add_family(
            catalogue,
            "localFlux",
            &faces,
            Some(Target::Cpu),
            |p| local_flux(assembler, p[0]),
            |p| local_flux_prefetch(assembler, p[0]),
        )?;
    }

    if targets.contains(&Target::Gpu) {
        count += add_family(
            catalogue,
            &format!("{}localFlux", Target::Gpu.name_prefix()),
            &faces,
            Some(Target::Gpu),
            |p| local_flux_precombined(assembler, p[0]),
            no_prefetch,
        )?;
    }

    info!("Added {} local kernels", count);
    Ok(count)
}

fn volume<M: EquationModel>(assembler: &Assembler<M>) -> Result<Equation, GeneratorError> {
    let (q, i, model) = (assembler.q(), assembler.i(), assembler.model());
    let mut volume_sum = q.at("kp");
    for dim in 0..DIMENSIONS {
        let k_div_m = assembler.db().group("kDivM", dim)?;
        volume_sum += k_div_m.at(&assembler.t("kl")) * i.at("lq") * model.star_matrix(dim).at("qp");
    }
    if let Some(source) = model.source_matrix() {
        volume_sum += i.at("kq") * source.at("qp");
    }
    Ok(q.access("kp").assign(volume_sum))
}

fn local_flux<M: EquationModel>(assembler: &Assembler<M>, face: usize) -> Result<Equation, GeneratorError> {
    let q_ext = assembler.q_ext();
    let r_div_m = assembler.db().group("rDivM", face)?;
    let f_mr_t = assembler.db().group("fMrT", face)?;
    let flux = r_div_m.at(&assembler.t("km"))
        * f_mr_t.at(&assembler.t("ml"))
        * assembler.i().at("lq")
        * assembler.aplus_t().at("qp");
    Ok(q_ext.access("kp").assign(q_ext.at("kp") + flux))
}

fn local_flux_precombined<M: EquationModel>(assembler: &Assembler<M>, face: usize) -> Result<Equation, GeneratorError> {
    let q_ext = assembler.q_ext();
    let flux_plus = assembler.db().group("fluxPlus", face)?;
    let flux = flux_plus.at(&assembler.t("kl")) * assembler.i().at("lq") * assembler.aplus_t().at("qp");
    Ok(q_ext.access("kp").assign(q_ext.at("kp") + flux))
}

fn local_flux_nodal<M: EquationModel>(assembler: &Assembler<M>, face: usize) -> Result<Equation, GeneratorError> {
    let q_ext = assembler.q_ext();
    let project = assembler.db().group("project2nFaceTo3m", face)?;
    let mut flux = project.at(&assembler.t("kn")) * assembler.i_nodal().at("no") * assembler.aminus_t().at("op");
    // The nodal data belongs to a single simulation and is broadcast to all of them
    if q_ext.has_opt_dim() {
        flux = flux * assembler.one_sim_to_mult_sim().at("s");
    }
    Ok(q_ext.access("kp").assign(q_ext.at("kp") + flux))
}

fn local_flux_prefetch<M: EquationModel>(assembler: &Assembler<M>, face: usize) -> Vec<Arc<Tensor>> {
    match face {
        0 => vec![Arc::clone(assembler.i().tensor())],
        1 => vec![Arc::clone(assembler.q().tensor())],
        _ => Vec::new(),
    }
}
