use nalgebra::DMatrix;

/// Poor man's approx assertion for matrices
#[macro_export]
macro_rules! assert_approx_matrix_eq {
    ($x:expr, $y:expr, abstol = $tol:expr) => {{
        let diff = $x - $y;

        let max_absdiff = diff.abs().max();
        let approx_eq = max_absdiff <= $tol;

        if !approx_eq {
            println!("abstol: {:e}", $tol);
            println!("left: {}", $x);
            println!("right: {}", $y);
            println!("diff: {:e}", diff);
        }
        assert!(approx_eq);
    }};
}

#[macro_export]
macro_rules! assert_panics {
    ($e:expr) => {{
        use std::panic::catch_unwind;
        use std::stringify;
        let expr_string = stringify!($e);
        let result = catch_unwind(|| $e);
        if result.is_ok() {
            panic!("assert_panics!({}) failed.", expr_string);
        }
    }};
}

/// A reproducible, non-trivial matrix for tests that need numeric data.
///
/// Entries lie in `[0.5, 1.5)` and never vanish, so products of such matrices do not cancel.
pub fn sample_matrix(rows: usize, cols: usize, seed: usize) -> DMatrix<f64> {
    DMatrix::from_fn(rows, cols, |i, j| {
        let hash = (i * 31 + j * 17 + seed * 7 + 3) % 101;
        0.5 + hash as f64 / 101.0
    })
}

/// Indices of the rows of `matrix` that contain at least one non-zero entry.
pub fn nonzero_rows(matrix: &DMatrix<f64>) -> Vec<usize> {
    (0..matrix.nrows())
        .filter(|&i| matrix.row(i).iter().any(|v| *v != 0.0))
        .collect()
}
