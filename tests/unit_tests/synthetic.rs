use adergen::database::{required_matrices, INCLUDED_MATRICES};
use adergen::synthetic::{basis_degree, synthetic_database};
use util::nonzero_rows;

#[test]
fn basis_degrees_are_grouped() {
    let degrees: Vec<_> = (0..10).map(basis_degree).collect();
    assert_eq!(degrees, vec![0, 1, 1, 1, 2, 2, 2, 2, 2, 2]);
    assert_eq!(basis_degree(10), 3);
}

#[test]
fn synthetic_database_is_complete() {
    for order in 1..=4 {
        let db = synthetic_database(order).unwrap();
        assert_eq!(db.order(), order);
        assert_eq!(db.len(), required_matrices(order).len() + INCLUDED_MATRICES.len());
        for name in INCLUDED_MATRICES {
            assert!(db.contains(name));
        }
        db.check_required(&required_matrices(order)).unwrap();
    }
}

#[test]
fn stiffness_lowers_degree() {
    let db = synthetic_database(3).unwrap();
    for dim in 0..3 {
        let k_div_mt = db.group_values("kDivMT", dim).unwrap();
        for k in 0..10 {
            for l in 0..10 {
                let nonzero = k_div_mt[(k, l)] != 0.0;
                assert_eq!(nonzero, basis_degree(l) > basis_degree(k));
            }
        }
        // Functions of the highest degree are never the result of a derivative
        assert_eq!(nonzero_rows(k_div_mt), (0..4).collect::<Vec<_>>());
        assert!(db.group("kDivM", dim).unwrap().pattern().contains(&[9, 0]));
        assert!(db.tensor("projectQP").unwrap().pattern().is_dense());
    }
}
