//! The sink that generated kernels are written into.
use crate::error::GeneratorError;
use adergen_tensor::{Equation, Tensor};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Execution backend a kernel is generated for.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    Cpu,
    Gpu,
}

impl Target {
    /// Prefix of every kernel name generated specifically for this target.
    pub fn name_prefix(&self) -> &'static str {
        match self {
            Target::Cpu => "",
            Target::Gpu => "gpu_",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Cpu => write!(f, "cpu"),
            Target::Gpu => write!(f, "gpu"),
        }
    }
}

/// A named equation destined for the catalogue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Kernel {
    pub name: String,
    pub equation: Equation,
    /// `None` if the kernel is shared by all targets.
    pub target: Option<Target>,
    /// Tensors the generated code should prefetch while executing the kernel.
    pub prefetch: Vec<Arc<Tensor>>,
}

impl Kernel {
    pub fn new(name: impl Into<String>, equation: Equation, target: Option<Target>) -> Self {
        Self {
            name: name.into(),
            equation,
            target,
            prefetch: Vec::new(),
        }
    }

    pub fn with_prefetch(mut self, prefetch: Vec<Arc<Tensor>>) -> Self {
        self.prefetch = prefetch;
        self
    }
}

/// Receiver of generated kernels.
///
/// Implementations must reject a kernel whose name was already used for the same target
/// (a kernel without a target conflicts with every target).
pub trait KernelCatalogue {
    fn add_kernel(&mut self, kernel: Kernel) -> Result<(), GeneratorError>;
}

/// A catalogue that keeps all kernels in memory, ordered by name.
///
/// Besides name uniqueness it also checks that every tensor name always refers to the same
/// declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InMemoryCatalogue {
    kernels: BTreeMap<String, Vec<Kernel>>,
    tensors: BTreeMap<String, Arc<Tensor>>,
}

impl InMemoryCatalogue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of kernels over all names and targets.
    pub fn len(&self) -> usize {
        self.kernels.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.kernels.is_empty()
    }

    /// Kernels in name order; kernels sharing a name are ordered by insertion.
    pub fn kernels(&self) -> impl Iterator<Item = &Kernel> {
        self.kernels.values().flatten()
    }

    pub fn get(&self, name: &str, target: Option<Target>) -> Option<&Kernel> {
        self.kernels
            .get(name)?
            .iter()
            .find(|kernel| kernel.target == target)
    }

    /// Kernels that run on `target`, including kernels shared by all targets.
    pub fn kernels_for(&self, target: Target) -> impl Iterator<Item = &Kernel> {
        self.kernels()
            .filter(move |kernel| kernel.target.map_or(true, |t| t == target))
    }

    /// The tensor declared under `name` by any kernel.
    pub fn tensor(&self, name: &str) -> Option<&Arc<Tensor>> {
        self.tensors.get(name)
    }
}

impl KernelCatalogue for InMemoryCatalogue {
    fn add_kernel(&mut self, kernel: Kernel) -> Result<(), GeneratorError> {
        let duplicate = self.kernels.get(&kernel.name).map_or(false, |existing| {
            existing.iter().any(|other| {
                other.target.is_none() || kernel.target.is_none() || other.target == kernel.target
            })
        });
        if duplicate {
            return Err(GeneratorError::DuplicateKernel {
                name: kernel.name,
                target: kernel.target,
            });
        }

        let mut declared: BTreeMap<&str, &Arc<Tensor>> = BTreeMap::new();
        for tensor in kernel.equation.tensors().into_iter().chain(&kernel.prefetch) {
            let known = declared
                .get(tensor.name())
                .copied()
                .or_else(|| self.tensors.get(tensor.name()));
            match known {
                Some(known) if known != tensor => {
                    return Err(GeneratorError::ConflictingTensor {
                        name: tensor.name().to_string(),
                    });
                }
                _ => {
                    declared.insert(tensor.name(), tensor);
                }
            }
        }
        for (name, tensor) in declared {
            self.tensors
                .entry(name.to_string())
                .or_insert_with(|| Arc::clone(tensor));
        }

        self.kernels
            .entry(kernel.name.clone())
            .or_default()
            .push(kernel);
        Ok(())
    }
}

/// A fixed-size, multi-dimensional space of integer kernel parameters.
///
/// Enumeration order is deterministic: the first parameter varies fastest, matching
/// [`ParameterSpace::linear_index`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterSpace {
    extents: Vec<usize>,
}

impl ParameterSpace {
    pub fn new(extents: impl Into<Vec<usize>>) -> Self {
        Self {
            extents: extents.into(),
        }
    }

    pub fn extents(&self) -> &[usize] {
        &self.extents
    }

    pub fn len(&self) -> usize {
        self.extents.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The position of `parameters` in the enumeration order.
    ///
    /// # Panics
    ///
    /// Panics if the parameters do not belong to the space.
    pub fn linear_index(&self, parameters: &[usize]) -> usize {
        assert_eq!(parameters.len(), self.extents.len(), "Parameter count must match dimension of space.");
        let mut index = 0;
        let mut stride = 1;
        for (&p, &extent) in parameters.iter().zip(&self.extents) {
            assert!(p < extent, "Parameter {} out of bounds for extent {}.", p, extent);
            index += stride * p;
            stride *= extent;
        }
        index
    }

    /// Iterate over all parameter tuples in enumeration order.
    pub fn iter(&self) -> impl Iterator<Item = Vec<usize>> + '_ {
        (0..self.len()).map(move |mut linear| {
            self.extents
                .iter()
                .map(|&extent| {
                    let p = linear % extent;
                    linear /= extent;
                    p
                })
                .collect()
        })
    }
}

/// Validates `equation` and adds it to the catalogue under `name`.
pub fn add_kernel<C>(
    catalogue: &mut C,
    name: impl Into<String>,
    equation: Equation,
    target: Option<Target>,
) -> Result<(), GeneratorError>
where
    C: KernelCatalogue + ?Sized,
{
    equation.validate()?;
    catalogue.add_kernel(Kernel::new(name, equation, target))
}

/// Expands a kernel family and adds one validated kernel per parameter tuple.
///
/// Variants are named `base(linear_index)`. Returns the number of kernels added.
pub fn add_family<C, F, P>(
    catalogue: &mut C,
    base_name: &str,
    space: &ParameterSpace,
    target: Option<Target>,
    mut equation: F,
    mut prefetch: P,
) -> Result<usize, GeneratorError>
where
    C: KernelCatalogue + ?Sized,
    F: FnMut(&[usize]) -> Result<Equation, GeneratorError>,
    P: FnMut(&[usize]) -> Vec<Arc<Tensor>>,
{
    for parameters in space.iter() {
        let variant = equation(&parameters)?;
        variant.validate()?;
        let name = family_member_name(base_name, space.linear_index(&parameters));
        let kernel = Kernel::new(name, variant, target).with_prefetch(prefetch(&parameters));
        catalogue.add_kernel(kernel)?;
    }
    Ok(space.len())
}

/// Name of a member of an indexed family, for both kernels and tensors.
pub fn family_member_name(base_name: &str, index: usize) -> String {
    format!("{}({})", base_name, index)
}

/// Prefetch function for families without prefetch hints.
pub fn no_prefetch(_: &[usize]) -> Vec<Arc<Tensor>> {
    Vec::new()
}
