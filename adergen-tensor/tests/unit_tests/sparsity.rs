use adergen_tensor::SparsityPattern;
use nalgebra::DMatrix;
use util::assert_panics;

#[test]
fn dense_pattern_contains_every_entry() {
    let pattern = SparsityPattern::dense(vec![2, 3, 2]);
    assert_eq!(pattern.nnz(), 12);
    assert_eq!(pattern.dense_len(), 12);
    assert!(pattern.is_dense());
    assert!(pattern.contains(&[1, 2, 1]));
    assert!(!pattern.contains(&[2, 0, 0]));

    // Lexicographic iteration order
    let entries: Vec<_> = pattern.entries().take(3).map(<[usize]>::to_vec).collect();
    assert_eq!(entries, vec![vec![0, 0, 0], vec![0, 0, 1], vec![0, 1, 0]]);
}

#[test]
fn scalar_pattern_has_single_entry() {
    let pattern = SparsityPattern::dense(Vec::new());
    assert_eq!(pattern.nnz(), 1);
    assert!(pattern.is_dense());
}

#[test]
fn nonzeros_of_matrix() {
    let matrix = DMatrix::from_row_slice(2, 3, &[0.0, 1.5, 0.0, -2.0, 0.0, 1e-300]);
    let pattern = SparsityPattern::from_matrix_nonzeros(&matrix);
    assert_eq!(pattern.shape(), &[2, 3]);
    assert_eq!(pattern.nnz(), 3);
    assert!(pattern.contains(&[0, 1]));
    assert!(pattern.contains(&[1, 0]));
    assert!(pattern.contains(&[1, 2]));
    assert!(!pattern.contains(&[0, 0]));
}

#[test]
fn mask_round_trip_and_transpose() {
    let mask = DMatrix::from_row_slice(2, 3, &[true, false, false, true, true, false]);
    let pattern = SparsityPattern::from_mask(&mask);
    assert_eq!(pattern.to_mask(), mask);

    let transposed = pattern.reversed();
    assert_eq!(transposed.shape(), &[3, 2]);
    assert_eq!(transposed.to_mask(), mask.transpose());
}

#[test]
fn permute_rank_three() {
    let pattern = SparsityPattern::from_entries(vec![2, 3, 4], vec![vec![1, 2, 3], vec![0, 0, 1]]);
    let permuted = pattern.permute(&[2, 0, 1]);
    assert_eq!(permuted.shape(), &[4, 2, 3]);
    assert!(permuted.contains(&[3, 1, 2]));
    assert!(permuted.contains(&[1, 0, 0]));
    assert_eq!(permuted.nnz(), 2);
}

#[test]
fn subset_and_union() {
    let a = SparsityPattern::from_entries(vec![2, 2], vec![vec![0, 0]]);
    let b = SparsityPattern::from_entries(vec![2, 2], vec![vec![1, 1]]);
    let union = a.union(&b);
    assert_eq!(union.nnz(), 2);
    assert!(a.is_subset_of(&union));
    assert!(b.is_subset_of(&union));
    assert!(!union.is_subset_of(&a));
    assert!(SparsityPattern::empty(vec![2, 2]).is_subset_of(&a));
    // Different shapes are never comparable
    assert!(!SparsityPattern::empty(vec![2, 3]).is_subset_of(&a));
}

#[test]
fn out_of_bounds_entries_panic() {
    assert_panics!(SparsityPattern::from_entries(vec![2, 2], vec![vec![2, 0]]));
    assert_panics!(SparsityPattern::from_entries(vec![2, 2], vec![vec![0]]));
    assert_panics!(SparsityPattern::dense(vec![2, 2]).permute(&[0, 0]));
}
