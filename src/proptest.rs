//! Strategies for property testing generation runs.
use crate::catalogue::Target;
use crate::config::{GeneratorConfig, ModelChoice};
use crate::layout::MultipleSimulations;
use ::proptest::prelude::*;
use adergen_tensor::SparsityPattern;
use std::collections::BTreeSet;

pub fn target() -> impl Strategy<Value = Target> {
    prop_oneof![Just(Target::Cpu), Just(Target::Gpu)]
}

/// Non-empty target sets.
pub fn targets() -> impl Strategy<Value = BTreeSet<Target>> {
    prop::collection::btree_set(target(), 1..=2)
}

pub fn multiple_simulations(max_width: usize) -> impl Strategy<Value = MultipleSimulations> {
    (0..=max_width).prop_map(MultipleSimulations::new)
}

/// Valid configurations with orders in `1..=max_order`.
///
/// Orders are kept small by the caller since the number of kernels and the size of the
/// derivative patterns grow quickly.
pub fn generator_config(max_order: usize) -> impl Strategy<Value = GeneratorConfig> {
    let model = prop_oneof![Just(ModelChoice::Elastic), Just(ModelChoice::Acoustic)];
    (1..=max_order, 0..=4usize, targets(), model).prop_map(|(order, width, targets, model)| {
        GeneratorConfig::new(order)
            .with_multiple_simulations(width)
            .with_targets(targets)
            .with_model(model)
    })
}

/// Arbitrary patterns of the given matrix shape.
pub fn matrix_pattern(rows: usize, cols: usize) -> impl Strategy<Value = SparsityPattern> {
    prop::collection::vec(any::<bool>(), rows * cols).prop_map(move |mask| {
        let entries = mask
            .into_iter()
            .enumerate()
            .filter(|(_, nonzero)| *nonzero)
            .map(|(linear, _)| vec![linear / cols, linear % cols])
            .collect::<Vec<_>>();
        SparsityPattern::from_entries(vec![rows, cols], entries)
    })
}
