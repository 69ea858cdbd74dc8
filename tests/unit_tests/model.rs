use adergen::error::GeneratorError;
use adergen::layout::{MultipleSimulations, OptionalDimTensor};
use adergen::model::{validate_model, EquationModel, LinearElastic, LinearModel};
use adergen_tensor::SparsityPattern;

#[test]
fn elastic_star_matrices() {
    let model = LinearElastic::new();
    assert_eq!(model.number_of_quantities(), 9);
    assert_eq!(model.number_of_extended_quantities(), 9);
    assert!(model.source_matrix().is_none());
    validate_model(&model).unwrap();

    for dim in 0..3 {
        let star = model.star_matrix(dim);
        assert_eq!(star.name(), format!("star({})", dim));
        assert_eq!(star.shape(), &[9, 9]);
        assert_eq!(star.pattern().nnz(), 8);
        // Velocity in direction dim drives every normal stress
        for normal in 0..3 {
            assert!(star.pattern().contains(&[6 + dim, normal]));
        }
    }

    // Entries are stored as [input, output]
    let star_x = LinearElastic::star_pattern(0);
    assert!(star_x.contains(&[0, 6]));
    assert!(star_x.contains(&[5, 8]));
    assert!(star_x.contains(&[7, 3]));
    assert!(star_x.contains(&[3, 7]));
    assert!(!star_x.contains(&[6, 4]));
}

#[test]
fn elastic_extended_tensor_is_q() {
    let model = LinearElastic::default();
    let q = OptionalDimTensor::new("Q", MultipleSimulations::new(0), &[10, 9]);
    assert_eq!(model.extended_q_tensor(&q), q);
}

#[test]
fn acoustic_model() {
    let model = LinearModel::acoustic().unwrap();
    validate_model(&model).unwrap();
    assert_eq!(model.number_of_quantities(), 4);
    let star_y = model.star_matrix(1);
    assert_eq!(
        star_y.pattern(),
        &SparsityPattern::from_entries(vec![4, 4], vec![vec![0, 2], vec![2, 0]])
    );
}

#[test]
fn derived_patterns_have_consistent_shapes() {
    let model = LinearModel::diagonal(3).unwrap().with_extended_quantities(5).unwrap();
    assert_eq!(model.godunov_pattern().shape(), &[3, 3]);
    assert_eq!(model.flux_solver_pattern().shape(), &[3, 5]);
    assert_eq!(model.transformation_pattern().shape(), &[5, 3]);
    assert_eq!(model.transformation_inv_pattern().shape(), &[3, 3]);

    let q = OptionalDimTensor::new("Q", MultipleSimulations::new(2), &[4, 3]);
    let q_ext = model.extended_q_tensor(&q);
    assert_eq!(q_ext.name(), "Qext");
    assert_eq!(q_ext.tensor().shape(), &[2, 4, 5]);
}

#[test]
fn contract_violations_are_reported() {
    let rectangular = || SparsityPattern::dense(vec![3, 4]);
    assert!(matches!(
        LinearModel::new([rectangular(), rectangular(), rectangular()]),
        Err(GeneratorError::ModelContract { .. })
    ));

    let square = |n: usize| SparsityPattern::dense(vec![n, n]);
    assert!(matches!(
        LinearModel::new([square(3), square(4), square(3)]),
        Err(GeneratorError::ModelContract { .. })
    ));

    assert!(LinearModel::diagonal(0).is_err());
    assert!(LinearModel::diagonal(3)
        .unwrap()
        .with_extended_quantities(2)
        .is_err());
    assert!(LinearModel::diagonal(3)
        .unwrap()
        .with_source_pattern(square(2))
        .is_err());

    let with_source = LinearModel::diagonal(3)
        .unwrap()
        .with_source_pattern(square(3))
        .unwrap();
    assert_eq!(with_source.source_matrix().unwrap().name(), "sourceMatrix");
}
