//! Tensors shared by all kernel generators, and the initialization kernels.
use crate::basis::{
    number_of_2d_basis_functions, number_of_3d_basis_functions, number_of_3d_quadrature_points, NUMBER_OF_FACES,
};
use crate::catalogue::{add_kernel, family_member_name, KernelCatalogue};
use crate::config::GeneratorConfig;
use crate::database::{required_matrices, MatrixDatabase, INCLUDED_MATRICES};
use crate::error::GeneratorError;
use crate::layout::{IndexOrder, MultipleSimulations, OptionalDimTensor};
use crate::materialize::{materialize_all, Precombination};
use crate::model::{validate_model, EquationModel};
use adergen_tensor::{Scalar, SparsityPattern, Tensor};
use log::info;
use std::sync::Arc;

/// Declares the tensors shared by the local, neighbor and time kernels of an ADER-DG scheme.
///
/// One assembler is created per configuration: polynomial order, batching and equation model are
/// fixed for its lifetime.
#[derive(Debug)]
pub struct Assembler<M> {
    order: usize,
    simulations: MultipleSimulations,
    model: M,
    db: MatrixDatabase,
    q: OptionalDimTensor,
    i: OptionalDimTensor,
    q_ext: OptionalDimTensor,
    i_nodal: OptionalDimTensor,
    aplus_t: Arc<Tensor>,
    aminus_t: Arc<Tensor>,
    t: Arc<Tensor>,
    t_inv: Arc<Tensor>,
    qgod_local: Arc<Tensor>,
    qgod_neighbor: Arc<Tensor>,
    one_sim_to_mult_sim: Arc<Tensor>,
    selectors: Vec<Arc<Tensor>>,
    include_tensors: Vec<Arc<Tensor>>,
}

impl<M> Assembler<M>
where
    M: EquationModel,
{
    /// Validates configuration, model and matrix database, and declares the shared tensors.
    ///
    /// The database is re-oriented for the configuration's index order, and the nodal face
    /// projections `project2nFaceTo3m(i) = rDivM(i) * V2nTo2m` are precombined into it.
    pub fn new(config: &GeneratorConfig, model: M, db: MatrixDatabase) -> Result<Self, GeneratorError> {
        config.validate()?;
        validate_model(&model)?;
        let order = config.order;
        if db.order() != order {
            return Err(GeneratorError::invalid_configuration(format!(
                "matrix database is for order {} but order {} was requested",
                db.order(),
                order
            )));
        }
        let simulations = config.simulations();
        let mut db = db.with_index_order(simulations.index_order());
        db.check_required(&required_matrices(order))?;
        let include_tensors = INCLUDED_MATRICES
            .iter()
            .map(|name| db.tensor(name))
            .collect::<Result<Vec<_>, _>>()?;

        let project_plans: Vec<_> = (0..NUMBER_OF_FACES)
            .map(|face| {
                Precombination::new(
                    family_member_name("project2nFaceTo3m", face),
                    [family_member_name("rDivM", face), "V2nTo2m".to_string()],
                )
            })
            .collect();
        materialize_all(&mut db, &project_plans)?;

        let nq = model.number_of_quantities();
        let b3 = number_of_3d_basis_functions(order);
        let b2 = number_of_2d_basis_functions(order);
        let q = OptionalDimTensor::new("Q", simulations, &[b3, nq]);
        let i = OptionalDimTensor::new("I", simulations, &[b3, nq]);
        let q_ext = model.extended_q_tensor(&q);
        let i_nodal = OptionalDimTensor::new("INodal", MultipleSimulations::default(), &[b2, nq]);

        let flux_solver_pattern = model.flux_solver_pattern();
        let godunov_pattern = model.godunov_pattern();
        let width = simulations.width();

        let assembler = Self {
            order,
            simulations,
            q,
            i,
            q_ext,
            i_nodal,
            aplus_t: Tensor::with_pattern("AplusT", flux_solver_pattern.clone()),
            aminus_t: Tensor::with_pattern("AminusT", flux_solver_pattern),
            t: Tensor::with_pattern("T", model.transformation_pattern()),
            t_inv: Tensor::with_pattern("Tinv", model.transformation_inv_pattern()),
            qgod_local: Tensor::with_pattern("QgodLocal", godunov_pattern.clone()),
            qgod_neighbor: Tensor::with_pattern("QgodNeighbor", godunov_pattern),
            one_sim_to_mult_sim: Tensor::new("oneSimToMultSim", [width]),
            selectors: selector_tensors(nq),
            include_tensors,
            model,
            db,
        };
        info!(
            "Assembler for order {} with {} quantities ({} extended), {} simulation(s)",
            order,
            nq,
            assembler.model.number_of_extended_quantities(),
            width
        );
        Ok(assembler)
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn simulations(&self) -> MultipleSimulations {
        self.simulations
    }

    pub fn index_order(&self) -> IndexOrder {
        self.db.index_order()
    }

    /// Index string for an access to a database matrix.
    pub fn t(&self, indices: &str) -> String {
        self.index_order().apply(indices)
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn db(&self) -> &MatrixDatabase {
        &self.db
    }

    pub(crate) fn db_mut(&mut self) -> &mut MatrixDatabase {
        &mut self.db
    }

    pub fn number_of_3d_basis_functions(&self) -> usize {
        number_of_3d_basis_functions(self.order)
    }

    pub fn number_of_2d_basis_functions(&self) -> usize {
        number_of_2d_basis_functions(self.order)
    }

    pub fn number_of_3d_quadrature_points(&self) -> usize {
        number_of_3d_quadrature_points(self.order)
    }

    /// The degrees of freedom of the element.
    pub fn q(&self) -> &OptionalDimTensor {
        &self.q
    }

    /// The time-integrated degrees of freedom.
    pub fn i(&self) -> &OptionalDimTensor {
        &self.i
    }

    /// The tensor surface fluxes accumulate into.
    pub fn q_ext(&self) -> &OptionalDimTensor {
        &self.q_ext
    }

    /// Time-integrated degrees of freedom in the nodal face basis.
    pub fn i_nodal(&self) -> &OptionalDimTensor {
        &self.i_nodal
    }

    pub fn aplus_t(&self) -> &Arc<Tensor> {
        &self.aplus_t
    }

    pub fn aminus_t(&self) -> &Arc<Tensor> {
        &self.aminus_t
    }

    pub fn transformation(&self) -> &Arc<Tensor> {
        &self.t
    }

    pub fn transformation_inv(&self) -> &Arc<Tensor> {
        &self.t_inv
    }

    pub fn one_sim_to_mult_sim(&self) -> &Arc<Tensor> {
        &self.one_sim_to_mult_sim
    }

    /// Database matrices that are not used by any kernel but must be exported alongside the kernels.
    pub fn include_tensors(&self) -> &[Arc<Tensor>] {
        &self.include_tensors
    }

    /// Velocity and traction selectors of the state vector. Empty for models without them.
    pub fn selectors(&self) -> &[Arc<Tensor>] {
        &self.selectors
    }

    /// Adds the kernels computing the flux solvers, copying the first simulation, the Christoffel
    /// matrix, and projecting to and from quadrature points. These kernels are shared by all
    /// targets. Returns the number of kernels added.
    pub fn add_init<C>(&self, catalogue: &mut C) -> Result<usize, GeneratorError>
    where
        C: KernelCatalogue + ?Sized,
    {
        let flux_scale = Scalar::new("fluxScale");
        let star0 = self.model.star_matrix(0);
        for (name, flux_solver, godunov) in [
            ("computeFluxSolverLocal", &self.aplus_t, &self.qgod_local),
            ("computeFluxSolverNeighbor", &self.aminus_t, &self.qgod_neighbor),
        ] {
            let rhs = flux_scale.clone()
                * (self.t_inv.at("ki") * godunov.at("kq") * star0.at("ql") * self.t.at("jl"));
            add_kernel(catalogue, name, flux_solver.access("ij").assign(rhs), None)?;
        }

        let b3 = self.number_of_3d_basis_functions();
        let nq = self.model.number_of_quantities();
        let q_fortran = Tensor::new("QFortran", [b3, nq]);
        let copy_q_to_q_fortran = if self.q.has_opt_dim() {
            let first_sim = SparsityPattern::from_entries(vec![self.q.opt_size()], vec![vec![0]]);
            let mult_sim_to_first_sim = Tensor::with_pattern("multSimToFirstSim", first_sim);
            q_fortran
                .access("kp")
                .assign(self.q.at("kp") * mult_sim_to_first_sim.at("s"))
        } else {
            q_fortran.access("kp").assign(self.q.at("kp"))
        };
        add_kernel(catalogue, "copyQToQFortran", copy_q_to_q_fortran, None)?;

        let stiffness_tensor = Tensor::new("stiffnessTensor", [3, 3, 3, 3]);
        let direction = Tensor::new("direction", [3]);
        let christoffel = Tensor::new("christoffel", [3, 3]);
        let compute_christoffel = christoffel
            .access("ik")
            .assign(stiffness_tensor.at("ijkl") * direction.at("j") * direction.at("l"));
        add_kernel(catalogue, "computeChristoffel", compute_christoffel, None)?;

        let qp_shape = [self.number_of_3d_quadrature_points(), nq];
        let ini_cond = OptionalDimTensor::new("iniCond", self.simulations, &qp_shape);
        let dofs_qp = OptionalDimTensor::new("dofsQP", self.simulations, &qp_shape);
        let project_qp = self.db.tensor("projectQP")?;
        let eval_at_qp = self.db.tensor("evalAtQP")?;
        add_kernel(
            catalogue,
            "projectIniCond",
            self.q
                .access("kp")
                .assign(project_qp.at(&self.t("kl")) * ini_cond.at("lp")),
            None,
        )?;
        add_kernel(
            catalogue,
            "evalAtQP",
            dofs_qp
                .access("kp")
                .assign(eval_at_qp.at(&self.t("kl")) * self.q.at("lp")),
            None,
        )?;
        info!("Added 6 initialization kernels");
        Ok(6)
    }
}

/// Selectors of the velocity and traction components of an elastic state vector.
///
/// Models with fewer than nine quantities have no such components.
fn selector_tensors(quantities: usize) -> Vec<Arc<Tensor>> {
    if quantities < 9 {
        return Vec::new();
    }
    let select_velocity =
        SparsityPattern::from_entries(vec![quantities, 3], (0..3).map(|d| vec![6 + d, d]));
    let select_traction =
        SparsityPattern::from_entries(vec![quantities, 3], vec![vec![0, 0], vec![3, 1], vec![5, 2]]);
    vec![
        Tensor::with_pattern("selectVelocity", select_velocity),
        Tensor::with_pattern("tractionPlusMatrix", select_traction.clone()),
        Tensor::with_pattern("tractionMinusMatrix", select_traction),
    ]
}
