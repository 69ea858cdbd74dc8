use adergen::database::{required_matrices, MatrixDatabase, RequiredMatrix};
use adergen::error::GeneratorError;
use adergen::layout::IndexOrder;
use nalgebra::DMatrix;
use util::sample_matrix;

#[test]
fn load_json_with_one_based_triplets() {
    let json = r#"[
        { "name": "A", "rows": 2, "columns": 3, "entries": [[1, 1, 1.5], [2, 3, "2.0"], [2, 3, 0.5]] },
        { "name": "fP(0)", "rows": 1, "columns": 1, "entries": [[1, 1, "-1e-2"]] }
    ]"#;
    let mut db = MatrixDatabase::new(1);
    assert_eq!(db.load_json_str(json).unwrap(), 2);
    assert_eq!(db.len(), 2);

    let expected = DMatrix::from_row_slice(2, 3, &[1.5, 0.0, 0.0, 0.0, 0.0, 2.5]);
    assert_eq!(db.values("A").unwrap(), &expected);
    assert_eq!(db.group_values("fP", 0).unwrap()[(0, 0)], -1e-2);

    let a = db.tensor("A").unwrap();
    assert_eq!(a.shape(), &[2, 3]);
    assert_eq!(a.pattern().nnz(), 2);
    assert!(a.pattern().contains(&[1, 2]));
}

#[test]
fn malformed_json_is_rejected() {
    let mut db = MatrixDatabase::new(1);
    // Zero index
    assert!(db
        .load_json_str(r#"[{ "name": "A", "rows": 1, "columns": 1, "entries": [[0, 1, 1.0]] }]"#)
        .is_err());
    // Out of bounds
    assert!(db
        .load_json_str(r#"[{ "name": "A", "rows": 1, "columns": 1, "entries": [[2, 1, 1.0]] }]"#)
        .is_err());
    // Unparseable value
    assert!(db
        .load_json_str(r#"[{ "name": "A", "rows": 1, "columns": 1, "entries": [[1, 1, "one"]] }]"#)
        .is_err());
    assert!(db.load_json_str("{").is_err());
    assert!(db.is_empty());
}

#[test]
fn files_can_be_merged_but_names_must_be_unique() {
    let json = r#"[{ "name": "A", "rows": 1, "columns": 1, "entries": [[1, 1, 1.0]] }]"#;
    let other = r#"[{ "name": "B", "rows": 1, "columns": 1, "entries": [] }]"#;
    let mut db = MatrixDatabase::new(1);
    db.load_json_str(json).unwrap();
    db.load_json_str(other).unwrap();
    assert_eq!(db.names().collect::<Vec<_>>(), vec!["A", "B"]);
    assert!(db.tensor("B").unwrap().pattern().is_empty());

    let err = db.load_json_str(json).unwrap_err();
    assert_eq!(
        err.downcast_ref::<GeneratorError>(),
        Some(&GeneratorError::DuplicateMatrix { name: "A".to_string() })
    );
}

#[test]
fn missing_matrix_names_matrix_and_order() {
    let db = MatrixDatabase::new(5);
    let err = db.group("kDivM", 2).unwrap_err();
    assert_eq!(
        err,
        GeneratorError::MissingMatrix {
            name: "kDivM(2)".to_string(),
            order: 5
        }
    );
    assert!(err.to_string().contains("kDivM(2)"));
}

#[test]
fn required_matrices_for_order_two() {
    let required = required_matrices(2);
    assert_eq!(required.len(), 24);
    let shape_of = |name: &str| {
        required
            .iter()
            .find(|matrix| matrix.name == name)
            .map(|matrix| matrix.shape)
    };
    assert_eq!(shape_of("kDivM(0)"), Some((4, 4)));
    assert_eq!(shape_of("kDivMT(2)"), Some((4, 4)));
    assert_eq!(shape_of("rDivM(3)"), Some((4, 3)));
    assert_eq!(shape_of("fMrT(1)"), Some((3, 4)));
    assert_eq!(shape_of("rT(0)"), Some((3, 4)));
    assert_eq!(shape_of("fP(2)"), Some((3, 3)));
    assert_eq!(shape_of("projectQP"), Some((4, 27)));
    assert_eq!(shape_of("evalAtQP"), Some((27, 4)));
    assert_eq!(shape_of("V2nTo2m"), Some((3, 3)));
    assert_eq!(shape_of("fP(3)"), None);
}

#[test]
fn check_required_detects_wrong_shapes() {
    let mut db = MatrixDatabase::new(2);
    db.insert("kDivM(0)", sample_matrix(4, 3, 0)).unwrap();
    let required = vec![RequiredMatrix {
        name: "kDivM(0)".to_string(),
        shape: (4, 4),
    }];
    assert_eq!(
        db.check_required(&required),
        Err(GeneratorError::MatrixShape {
            name: "kDivM(0)".to_string(),
            order: 2,
            expected: (4, 4),
            actual: (4, 3),
        })
    );

    let required = vec![RequiredMatrix {
        name: "kDivM(1)".to_string(),
        shape: (4, 4),
    }];
    assert!(matches!(
        db.check_required(&required),
        Err(GeneratorError::MissingMatrix { .. })
    ));
}

#[test]
fn reversed_index_order_transposes_declarations_only() {
    let mut values = DMatrix::zeros(2, 3);
    values[(0, 2)] = 1.0;
    let mut db = MatrixDatabase::new(1);
    db.insert("R", values.clone()).unwrap();
    assert_eq!(db.index_order(), IndexOrder::Natural);
    assert_eq!(db.tensor("R").unwrap().shape(), &[2, 3]);

    let mut db = db.with_index_order(IndexOrder::Reversed);
    let r = db.tensor("R").unwrap();
    assert_eq!(r.shape(), &[3, 2]);
    assert!(r.pattern().contains(&[2, 0]));
    assert_eq!(db.values("R").unwrap(), &values);

    // Matrices inserted later follow the same order
    let s = db.insert("S", sample_matrix(4, 1, 1)).unwrap();
    assert_eq!(s.shape(), &[1, 4]);
}
