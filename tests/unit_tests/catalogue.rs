use adergen::catalogue::{
    add_family, add_kernel, family_member_name, no_prefetch, InMemoryCatalogue, Kernel, KernelCatalogue,
    ParameterSpace, Target,
};
use adergen::error::{ErrorKind, GeneratorError};
use adergen_tensor::Tensor;
use proptest::collection::vec;
use proptest::prelude::*;
use util::assert_panics;

#[test]
fn parameter_space_enumerates_first_parameter_fastest() {
    let space = ParameterSpace::new([3, 4, 4]);
    assert_eq!(space.len(), 48);

    let tuples: Vec<_> = space.iter().collect();
    assert_eq!(tuples.len(), 48);
    assert_eq!(tuples[0], vec![0, 0, 0]);
    assert_eq!(tuples[1], vec![1, 0, 0]);
    assert_eq!(tuples[3], vec![0, 1, 0]);
    assert_eq!(tuples[12], vec![0, 0, 1]);
    assert_eq!(tuples[47], vec![2, 3, 3]);

    for h in 0..3 {
        for j in 0..4 {
            for i in 0..4 {
                assert_eq!(space.linear_index(&[h, j, i]), h + 3 * j + 12 * i);
            }
        }
    }
}

#[test]
fn parameter_space_rejects_foreign_parameters() {
    let space = ParameterSpace::new([3, 4]);
    assert_panics!(space.linear_index(&[3, 0]));
    assert_panics!(space.linear_index(&[0, 0, 0]));
}

#[test]
fn empty_parameter_space() {
    let space = ParameterSpace::new([3, 0]);
    assert!(space.is_empty());
    assert_eq!(space.iter().count(), 0);
}

proptest! {
    #[test]
    fn enumeration_order_matches_linear_index(extents in vec(1..5usize, 1..4)) {
        let space = ParameterSpace::new(extents.clone());
        let mut count = 0;
        for (linear, parameters) in space.iter().enumerate() {
            prop_assert_eq!(space.linear_index(&parameters), linear);
            for (p, extent) in parameters.iter().zip(&extents) {
                prop_assert!(p < extent);
            }
            count += 1;
        }
        prop_assert_eq!(count, space.len());
    }
}

fn copy_equation(name: &str) -> adergen_tensor::Equation {
    let a = Tensor::new(name, [2, 2]);
    let b = Tensor::new("B", [2, 2]);
    a.access("ij").assign(b.at("ij"))
}

#[test]
fn kernel_names_are_unique_per_target() {
    let mut catalogue = InMemoryCatalogue::new();
    add_kernel(&mut catalogue, "copy", copy_equation("A"), Some(Target::Cpu)).unwrap();
    add_kernel(&mut catalogue, "copy", copy_equation("A"), Some(Target::Gpu)).unwrap();
    assert_eq!(catalogue.len(), 2);

    let err = add_kernel(&mut catalogue, "copy", copy_equation("A"), Some(Target::Cpu)).unwrap_err();
    assert_eq!(
        err,
        GeneratorError::DuplicateKernel {
            name: "copy".to_string(),
            target: Some(Target::Cpu)
        }
    );
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert_eq!(catalogue.len(), 2);
}

#[test]
fn shared_kernels_conflict_with_every_target() {
    let mut catalogue = InMemoryCatalogue::new();
    add_kernel(&mut catalogue, "init", copy_equation("A"), None).unwrap();
    assert!(add_kernel(&mut catalogue, "init", copy_equation("A"), Some(Target::Gpu)).is_err());

    add_kernel(&mut catalogue, "volume", copy_equation("A"), Some(Target::Cpu)).unwrap();
    assert!(add_kernel(&mut catalogue, "volume", copy_equation("A"), None).is_err());
}

#[test]
fn conflicting_tensor_declarations_are_rejected() {
    let mut catalogue = InMemoryCatalogue::new();
    add_kernel(&mut catalogue, "first", copy_equation("A"), None).unwrap();

    let a = Tensor::new("A", [3, 3]);
    let c = Tensor::new("C", [3, 3]);
    let err = add_kernel(&mut catalogue, "second", c.access("ij").assign(a.at("ij")), None).unwrap_err();
    assert_eq!(err, GeneratorError::ConflictingTensor { name: "A".to_string() });

    // Also within a single kernel
    let b = Tensor::new("B", [2, 2]);
    let other_b = Tensor::new("B", [2, 3]);
    let d = Tensor::new("D", [2, 3]);
    let kernel = Kernel::new("third", d.access("ik").assign(b.at("ij") * other_b.at("jk")), None);
    assert!(matches!(
        catalogue.add_kernel(kernel),
        Err(GeneratorError::ConflictingTensor { .. })
    ));
}

#[test]
fn invalid_equations_are_sparsity_deduction_errors() {
    let mut catalogue = InMemoryCatalogue::new();
    let a = Tensor::new("A", [2, 3]);
    let b = Tensor::new("B", [2, 3]);
    let err = add_kernel(&mut catalogue, "bad", a.access("ij").assign(b.at("ji")), None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SparsityDeduction);
    assert!(catalogue.is_empty());
}

#[test]
fn families_are_named_by_linear_index() {
    let mut catalogue = InMemoryCatalogue::new();
    let b = Tensor::new("B", [2, 2]);
    let space = ParameterSpace::new([2, 3]);
    let count = add_family(
        &mut catalogue,
        "copy",
        &space,
        Some(Target::Cpu),
        |p| {
            let a = Tensor::new(family_member_name("A", p[0] + 2 * p[1]), [2, 2]);
            Ok(a.access("ij").assign(b.at("ij")))
        },
        |p| if p[0] == 0 { vec![b.clone()] } else { Vec::new() },
    )
    .unwrap();
    assert_eq!(count, 6);
    assert_eq!(catalogue.len(), 6);

    for linear in 0..6 {
        let kernel = catalogue
            .get(&format!("copy({})", linear), Some(Target::Cpu))
            .unwrap();
        assert_eq!(kernel.equation.lhs().tensor().name(), format!("A({})", linear));
        assert_eq!(kernel.prefetch.len(), if linear % 2 == 0 { 1 } else { 0 });
    }
}

#[test]
fn family_without_prefetch() {
    let mut catalogue = InMemoryCatalogue::new();
    let space = ParameterSpace::new([4]);
    add_family(
        &mut catalogue,
        "gpu_copy",
        &space,
        Some(Target::Gpu),
        |_| Ok(copy_equation("A")),
        no_prefetch,
    )
    .unwrap();
    assert!(catalogue.kernels().all(|kernel| kernel.prefetch.is_empty()));
    let names: Vec<_> = catalogue.kernels().map(|kernel| kernel.name.as_str()).collect();
    assert_eq!(names, vec!["gpu_copy(0)", "gpu_copy(1)", "gpu_copy(2)", "gpu_copy(3)"]);
}

#[test]
fn kernels_for_target_include_shared_kernels() {
    let mut catalogue = InMemoryCatalogue::new();
    add_kernel(&mut catalogue, "init", copy_equation("A"), None).unwrap();
    add_kernel(&mut catalogue, "volume", copy_equation("A"), Some(Target::Cpu)).unwrap();
    add_kernel(&mut catalogue, "gpu_volume", copy_equation("A"), Some(Target::Gpu)).unwrap();

    let cpu: Vec<_> = catalogue
        .kernels_for(Target::Cpu)
        .map(|kernel| kernel.name.as_str())
        .collect();
    assert_eq!(cpu, vec!["init", "volume"]);
    let gpu: Vec<_> = catalogue
        .kernels_for(Target::Gpu)
        .map(|kernel| kernel.name.as_str())
        .collect();
    assert_eq!(gpu, vec!["gpu_volume", "init"]);
    assert_eq!(catalogue.tensor("B").map(|b| b.shape()), Some(&[2, 2][..]));
}

#[test]
fn target_prefixes_and_names() {
    assert_eq!(Target::Cpu.name_prefix(), "");
    assert_eq!(Target::Gpu.name_prefix(), "gpu_");
    assert_eq!(Target::Gpu.to_string(), "gpu");
}
