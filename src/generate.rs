//! Kernel generation for the ADER-DG building blocks.
//!
//! The generators run in a fixed order: initialization, local (volume and local flux),
//! neighbor and time kernels. The local and neighbor generators precombine backend-specific
//! matrices into the database of the assembler before emitting kernels that use them.
use crate::assembler::Assembler;
use crate::catalogue::KernelCatalogue;
use crate::config::{GeneratorConfig, ModelChoice};
use crate::database::MatrixDatabase;
use crate::model::{EquationModel, LinearElastic, LinearModel};
use eyre::Context;
use log::info;

pub mod local;
pub mod neighbor;
pub mod time;

pub use local::add_local;
pub use neighbor::add_neighbor;
pub use time::{add_time, build_derivatives, Derivative, DerivativeArena};

/// Summary of a completed generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    /// Number of kernels added to the catalogue.
    pub kernels: usize,
    pub derivatives: DerivativeArena,
}

/// Runs all generators for `config` and `model` and writes the kernels into `catalogue`.
pub fn generate_all<M, C>(
    config: &GeneratorConfig,
    model: M,
    db: MatrixDatabase,
    catalogue: &mut C,
) -> eyre::Result<GenerationReport>
where
    M: EquationModel,
    C: KernelCatalogue + ?Sized,
{
    let mut assembler = Assembler::new(config, model, db).wrap_err("failed to set up kernel generation")?;
    let targets = &config.targets;

    let mut kernels = assembler
        .add_init(catalogue)
        .wrap_err("failed to generate initialization kernels")?;
    kernels += add_local(&mut assembler, catalogue, targets).wrap_err("failed to generate local kernels")?;
    kernels += add_neighbor(&mut assembler, catalogue, targets).wrap_err("failed to generate neighbor kernels")?;
    let derivatives = add_time(&assembler, catalogue, targets).wrap_err("failed to generate time kernels")?;
    kernels += 2 * derivatives.len() * targets.len();

    info!("Generated {} kernels for order {}", kernels, config.order);
    Ok(GenerationReport { kernels, derivatives })
}

/// Runs [`generate_all`] with the model selected in the configuration.
pub fn generate_from_config<C>(
    config: &GeneratorConfig,
    db: MatrixDatabase,
    catalogue: &mut C,
) -> eyre::Result<GenerationReport>
where
    C: KernelCatalogue + ?Sized,
{
    match config.model {
        ModelChoice::Elastic => generate_all(config, LinearElastic::new(), db, catalogue),
        ModelChoice::Acoustic => generate_all(config, LinearModel::acoustic()?, db, catalogue),
    }
}
