use adergen::layout::{IndexOrder, MultipleSimulations, OptionalDimTensor};
use adergen_tensor::SparsityPattern;
use util::assert_panics;

#[test]
fn index_order_rewrites_matrix_accesses() {
    assert_eq!(IndexOrder::Natural.apply("kl"), "kl");
    assert_eq!(IndexOrder::Reversed.apply("kl"), "lk");
    assert_eq!(IndexOrder::Reversed.apply("kmn"), "nmk");
    assert!(!IndexOrder::default().is_reversed());
    assert_eq!(MultipleSimulations::new(1).index_order(), IndexOrder::Natural);
    assert_eq!(MultipleSimulations::new(3).index_order(), IndexOrder::Reversed);
}

#[test]
fn unbatched_tensor_has_no_simulation_dimension() {
    for width in [0, 1] {
        let q = OptionalDimTensor::new("Q", MultipleSimulations::new(width), &[10, 9]);
        assert!(!q.has_opt_dim());
        assert_eq!(q.opt_size(), 1);
        assert_eq!(q.tensor().shape(), &[10, 9]);
        assert_eq!(q.base_shape(), &[10, 9]);
        assert_eq!(q.indices("kp"), "kp");
        assert_eq!(q.access("kp").to_string(), "Q[kp]");
    }
}

#[test]
fn batched_tensor_prepends_simulation_index() {
    let q = OptionalDimTensor::new("Q", MultipleSimulations::new(4), &[10, 9]);
    assert!(q.has_opt_dim());
    assert_eq!(q.opt_size(), 4);
    assert_eq!(q.tensor().shape(), &[4, 10, 9]);
    assert_eq!(q.base_shape(), &[10, 9]);
    assert_eq!(q.indices("kp"), "skp");
    assert_eq!(q.at("lq").to_string(), "Q[slq]");

    let renamed = q.renamed("dQ(0)");
    assert_eq!(renamed.name(), "dQ(0)");
    assert_eq!(renamed.tensor().shape(), &[4, 10, 9]);
}

#[test]
fn batched_pattern_must_start_with_simulation_dimension() {
    let simulations = MultipleSimulations::new(4);
    let pattern = SparsityPattern::dense(vec![4, 2, 3]);
    let q = OptionalDimTensor::with_pattern("Q", simulations, pattern);
    assert_eq!(q.base_shape(), &[2, 3]);

    assert_panics!(OptionalDimTensor::with_pattern(
        "Q",
        simulations,
        SparsityPattern::dense(vec![2, 3])
    ));
}
