//! Deterministic stand-in values for every matrix the generators require.
//!
//! Real matrix files are produced by an external tool. The synthetic database has the right
//! shapes and a realistic structure for the stiffness matrices: with a hierarchical basis
//! ordered by total degree, `kDivMT(d)[k, l]` is non-zero only if `l` has a higher degree than
//! `k`, so each time derivative loses the highest remaining degree. All other matrices are dense.
//! Of the included matrices, `samplingDirections` holds [`SAMPLING_DIRECTIONS`] directions,
//! `M2inv` has the shape of a face mass matrix and `nodes2D` one 2D point per face node.
use crate::basis::{number_of_2d_basis_functions, number_of_3d_basis_functions};
use crate::database::{required_matrices, MatrixDatabase, INCLUDED_MATRICES};
use crate::error::GeneratorError;
use nalgebra::DMatrix;

/// Total polynomial degree of the 3D basis function with the given index.
pub fn basis_degree(index: usize) -> usize {
    let mut degree = 0;
    while number_of_3d_basis_functions(degree + 1) <= index {
        degree += 1;
    }
    degree
}

/// Number of rows of the synthetic `samplingDirections` matrix.
pub const SAMPLING_DIRECTIONS: usize = 8;

fn entry_value(seed: usize, row: usize, col: usize) -> f64 {
    1.0 + ((7 * seed + 3 * row + 5 * col) % 17) as f64 / 17.0
}

/// A database with all matrices of [`required_matrices`] and [`INCLUDED_MATRICES`] for `order`.
pub fn synthetic_database(order: usize) -> Result<MatrixDatabase, GeneratorError> {
    let mut db = MatrixDatabase::new(order);
    for (seed, required) in required_matrices(order).into_iter().enumerate() {
        let (rows, cols) = required.shape;
        let values = if required.name.starts_with("kDivMT") {
            DMatrix::from_fn(rows, cols, |k, l| {
                if basis_degree(l) > basis_degree(k) {
                    entry_value(seed, k, l)
                } else {
                    0.0
                }
            })
        } else if required.name.starts_with("kDivM") {
            DMatrix::from_fn(rows, cols, |k, l| {
                if basis_degree(k) > basis_degree(l) {
                    entry_value(seed, k, l)
                } else {
                    0.0
                }
            })
        } else {
            DMatrix::from_fn(rows, cols, |r, c| entry_value(seed, r, c))
        };
        db.insert(required.name, values)?;
    }

    let b2 = number_of_2d_basis_functions(order);
    let seed = required_matrices(order).len();
    for (offset, name) in INCLUDED_MATRICES.into_iter().enumerate() {
        let (rows, cols) = match name {
            "samplingDirections" => (SAMPLING_DIRECTIONS, 3),
            "nodes2D" => (b2, 2),
            _ => (b2, b2),
        };
        let values = DMatrix::from_fn(rows, cols, |r, c| entry_value(seed + offset, r, c));
        db.insert(name, values)?;
    }
    Ok(db)
}
