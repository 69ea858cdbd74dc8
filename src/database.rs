//! The matrix database: precomputed basis, quadrature and face matrices, looked up by name.
use crate::basis::{
    number_of_2d_basis_functions, number_of_3d_basis_functions, number_of_3d_quadrature_points, DIMENSIONS,
    NUMBER_OF_FACES, NUMBER_OF_FACE_ROTATIONS,
};
use crate::catalogue::family_member_name;
use crate::error::GeneratorError;
use crate::layout::IndexOrder;
use adergen_tensor::{SparsityPattern, Tensor};
use eyre::{eyre, Context};
use log::debug;
use nalgebra::DMatrix;
use nalgebra_sparse::CooMatrix;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
struct Entry {
    values: DMatrix<f64>,
    tensor: Arc<Tensor>,
}

impl Entry {
    fn new(name: &str, values: DMatrix<f64>, index_order: IndexOrder) -> Self {
        let tensor = Tensor::with_pattern(name, stored_pattern(&values, index_order));
        Self { values, tensor }
    }
}

fn stored_pattern(values: &DMatrix<f64>, index_order: IndexOrder) -> SparsityPattern {
    let pattern = SparsityPattern::from_matrix_nonzeros(values);
    match index_order {
        IndexOrder::Natural => pattern,
        IndexOrder::Reversed => pattern.reversed(),
    }
}

/// Named matrices for a single polynomial order.
///
/// Values are always kept in their mathematical orientation. The tensor declared for a matrix
/// follows the database's [`IndexOrder`]: with [`IndexOrder::Reversed`] it is the transpose,
/// and must be accessed with reversed index strings.
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixDatabase {
    order: usize,
    index_order: IndexOrder,
    matrices: BTreeMap<String, Entry>,
}

impl MatrixDatabase {
    pub fn new(order: usize) -> Self {
        Self {
            order,
            index_order: IndexOrder::Natural,
            matrices: BTreeMap::new(),
        }
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn index_order(&self) -> IndexOrder {
        self.index_order
    }

    /// Re-declares all matrix tensors for the given index order.
    pub fn with_index_order(mut self, index_order: IndexOrder) -> Self {
        if index_order != self.index_order {
            self.index_order = index_order;
            for (name, entry) in self.matrices.iter_mut() {
                let values = std::mem::replace(&mut entry.values, DMatrix::zeros(0, 0));
                *entry = Entry::new(name, values, index_order);
            }
        }
        self
    }

    pub fn len(&self) -> usize {
        self.matrices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matrices.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.matrices.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.matrices.keys().map(String::as_str)
    }

    /// Adds a matrix and returns its tensor declaration.
    pub fn insert(&mut self, name: impl Into<String>, values: DMatrix<f64>) -> Result<Arc<Tensor>, GeneratorError> {
        let name = name.into();
        if self.matrices.contains_key(&name) {
            return Err(GeneratorError::DuplicateMatrix { name });
        }
        let entry = Entry::new(&name, values, self.index_order);
        let tensor = Arc::clone(&entry.tensor);
        self.matrices.insert(name, entry);
        Ok(tensor)
    }

    fn entry(&self, name: &str) -> Result<&Entry, GeneratorError> {
        self.matrices
            .get(name)
            .ok_or_else(|| GeneratorError::MissingMatrix {
                name: name.to_string(),
                order: self.order,
            })
    }

    pub fn tensor(&self, name: &str) -> Result<Arc<Tensor>, GeneratorError> {
        self.entry(name).map(|entry| Arc::clone(&entry.tensor))
    }

    /// The tensor of member `index` of the matrix family `base`, e.g. `kDivM(2)`.
    pub fn group(&self, base: &str, index: usize) -> Result<Arc<Tensor>, GeneratorError> {
        self.tensor(&family_member_name(base, index))
    }

    pub fn values(&self, name: &str) -> Result<&DMatrix<f64>, GeneratorError> {
        self.entry(name).map(|entry| &entry.values)
    }

    pub fn group_values(&self, base: &str, index: usize) -> Result<&DMatrix<f64>, GeneratorError> {
        self.values(&family_member_name(base, index))
    }

    /// Checks that every required matrix is present with the expected shape.
    pub fn check_required(&self, required: &[RequiredMatrix]) -> Result<(), GeneratorError> {
        for requirement in required {
            let values = self.values(&requirement.name)?;
            let actual = values.shape();
            if actual != requirement.shape {
                return Err(GeneratorError::MatrixShape {
                    name: requirement.name.clone(),
                    order: self.order,
                    expected: requirement.shape,
                    actual,
                });
            }
        }
        Ok(())
    }

    /// Merges the matrices of a JSON matrix file into the database.
    ///
    /// The file holds an array of objects `{ "name", "rows", "columns", "entries" }`, where every
    /// entry is a `[row, column, value]` triple with 1-based indices. Values may be given as numbers
    /// or as strings. Repeated entries are summed. Returns the number of matrices read.
    pub fn load_json_str(&mut self, json: &str) -> eyre::Result<usize> {
        let matrices: Vec<JsonMatrix> = serde_json::from_str(json).wrap_err("failed to parse matrix file")?;
        let count = matrices.len();
        for matrix in matrices {
            let name = matrix.name.clone();
            let values = matrix
                .into_dense()
                .wrap_err_with(|| format!("invalid matrix {}", name))?;
            debug!("Loaded matrix {} of shape {:?}", name, values.shape());
            self.insert(name, values)?;
        }
        Ok(count)
    }

    /// Loads a JSON matrix file from disk. See [`MatrixDatabase::load_json_str`].
    pub fn load_json_file(&mut self, path: impl AsRef<Path>) -> eyre::Result<usize> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).wrap_err_with(|| format!("failed to read {}", path.display()))?;
        self.load_json_str(&json)
            .wrap_err_with(|| format!("failed to load matrices from {}", path.display()))
    }
}

#[derive(Debug, Deserialize)]
struct JsonMatrix {
    name: String,
    rows: usize,
    columns: usize,
    entries: Vec<(usize, usize, JsonValue)>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonValue {
    Number(f64),
    Text(String),
}

impl JsonMatrix {
    fn into_dense(self) -> eyre::Result<DMatrix<f64>> {
        let mut row_indices = Vec::with_capacity(self.entries.len());
        let mut col_indices = Vec::with_capacity(self.entries.len());
        let mut values = Vec::with_capacity(self.entries.len());
        for (row, col, value) in self.entries {
            if row == 0 || col == 0 {
                return Err(eyre!("matrix entries use 1-based indices, found ({}, {})", row, col));
            }
            let value = match value {
                JsonValue::Number(value) => value,
                JsonValue::Text(text) => text
                    .trim()
                    .parse()
                    .map_err(|_| eyre!("cannot parse matrix entry \"{}\"", text))?,
            };
            row_indices.push(row - 1);
            col_indices.push(col - 1);
            values.push(value);
        }
        let coo = CooMatrix::try_from_triplets(self.rows, self.columns, row_indices, col_indices, values)
            .map_err(|err| eyre!("invalid triplets: {}", err))?;
        Ok(DMatrix::from(&coo))
    }
}

/// A matrix the generators look up, with its shape for a given order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredMatrix {
    pub name: String,
    pub shape: (usize, usize),
}

impl RequiredMatrix {
    fn new(name: impl Into<String>, rows: usize, cols: usize) -> Self {
        Self {
            name: name.into(),
            shape: (rows, cols),
        }
    }
}

/// Matrices exported alongside the kernels although no kernel reads or writes them.
///
/// Their shapes are given by the files they are read from and are not checked.
pub const INCLUDED_MATRICES: [&str; 3] = ["samplingDirections", "M2inv", "nodes2D"];

/// All matrices that must be present in the database for generating kernels of `order`.
pub fn required_matrices(order: usize) -> Vec<RequiredMatrix> {
    let b3 = number_of_3d_basis_functions(order);
    let b2 = number_of_2d_basis_functions(order);
    let qp3 = number_of_3d_quadrature_points(order);

    let mut required = Vec::new();
    for d in 0..DIMENSIONS {
        required.push(RequiredMatrix::new(family_member_name("kDivM", d), b3, b3));
        required.push(RequiredMatrix::new(family_member_name("kDivMT", d), b3, b3));
    }
    for i in 0..NUMBER_OF_FACES {
        required.push(RequiredMatrix::new(family_member_name("rDivM", i), b3, b2));
        required.push(RequiredMatrix::new(family_member_name("fMrT", i), b2, b3));
        required.push(RequiredMatrix::new(family_member_name("rT", i), b2, b3));
    }
    for h in 0..NUMBER_OF_FACE_ROTATIONS {
        required.push(RequiredMatrix::new(family_member_name("fP", h), b2, b2));
    }
    required.push(RequiredMatrix::new("projectQP", b3, qp3));
    required.push(RequiredMatrix::new("evalAtQP", qp3, b3));
    required.push(RequiredMatrix::new("V2nTo2m", b2, b2));
    required
}
