//! Structural sparsity patterns of dense multi-dimensional tensors.
use itertools::Itertools;
use nalgebra::DMatrix;
use std::collections::BTreeSet;
use std::fmt;

/// The set of index tuples of a tensor that may be non-zero.
///
/// Every entry that is not contained in the pattern is structurally zero: downstream code is
/// free to never store or compute it. Entries are kept in lexicographic order, which makes
/// iteration (and therefore everything derived from it) deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SparsityPattern {
    shape: Vec<usize>,
    entries: BTreeSet<Vec<usize>>,
}

impl SparsityPattern {
    /// A pattern in which every entry of the given shape may be non-zero.
    pub fn dense(shape: impl Into<Vec<usize>>) -> Self {
        let shape = shape.into();
        let entries = shape
            .iter()
            .map(|&extent| 0..extent)
            .multi_cartesian_product()
            .collect();
        // multi_cartesian_product yields nothing for rank 0, but a scalar has exactly one entry
        let entries = if shape.is_empty() {
            BTreeSet::from([Vec::new()])
        } else {
            entries
        };
        Self { shape, entries }
    }

    /// A pattern without any non-zero entries.
    pub fn empty(shape: impl Into<Vec<usize>>) -> Self {
        Self {
            shape: shape.into(),
            entries: BTreeSet::new(),
        }
    }

    /// Construct a pattern from an explicit collection of index tuples.
    ///
    /// Duplicate tuples are merged.
    ///
    /// # Panics
    ///
    /// Panics if a tuple does not have the rank of the shape or is out of bounds.
    pub fn from_entries<I>(shape: impl Into<Vec<usize>>, entries: I) -> Self
    where
        I: IntoIterator<Item = Vec<usize>>,
    {
        let shape = shape.into();
        let entries: BTreeSet<_> = entries.into_iter().collect();
        for entry in &entries {
            assert_eq!(entry.len(), shape.len(), "Entry rank must match rank of shape.");
            assert!(
                entry.iter().zip(&shape).all(|(i, n)| i < n),
                "Entry {:?} out of bounds for shape {:?}.",
                entry,
                shape
            );
        }
        Self { shape, entries }
    }

    /// The pattern of the structurally non-zero entries of a matrix.
    ///
    /// Only entries that are exactly zero are considered structural zeros.
    pub fn from_matrix_nonzeros(matrix: &DMatrix<f64>) -> Self {
        let entries = (0..matrix.nrows())
            .cartesian_product(0..matrix.ncols())
            .filter(|&(i, j)| matrix[(i, j)] != 0.0)
            .map(|(i, j)| vec![i, j]);
        Self::from_entries(vec![matrix.nrows(), matrix.ncols()], entries)
    }

    /// A two-dimensional pattern given by a boolean mask.
    pub fn from_mask(mask: &DMatrix<bool>) -> Self {
        let entries = (0..mask.nrows())
            .cartesian_product(0..mask.ncols())
            .filter(|&(i, j)| mask[(i, j)])
            .map(|(i, j)| vec![i, j]);
        Self::from_entries(vec![mask.nrows(), mask.ncols()], entries)
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// The number of entries in a dense tensor of the same shape.
    pub fn dense_len(&self) -> usize {
        self.shape.iter().product()
    }

    /// The number of possibly non-zero entries.
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_dense(&self) -> bool {
        self.nnz() == self.dense_len()
    }

    pub fn contains(&self, entry: &[usize]) -> bool {
        self.entries.contains(entry)
    }

    /// Iterate over the possibly non-zero entries in lexicographic order.
    pub fn entries(&self) -> impl Iterator<Item = &[usize]> {
        self.entries.iter().map(Vec::as_slice)
    }

    /// Returns `true` if every non-zero entry of `self` is also non-zero in `other`.
    ///
    /// Patterns of different shapes are never subsets of each other.
    pub fn is_subset_of(&self, other: &SparsityPattern) -> bool {
        self.shape == other.shape && self.entries.is_subset(&other.entries)
    }

    /// Returns the pattern whose dimension `d` is dimension `perm[d]` of `self`.
    ///
    /// # Panics
    ///
    /// Panics if `perm` is not a permutation of `0 .. rank`.
    pub fn permute(&self, perm: &[usize]) -> Self {
        assert_eq!(perm.len(), self.rank(), "Permutation must have the rank of the pattern.");
        assert!(
            perm.iter().copied().sorted().eq(0..self.rank()),
            "Invalid permutation {:?}",
            perm
        );
        let shape = perm.iter().map(|&d| self.shape[d]).collect();
        let entries = self
            .entries
            .iter()
            .map(|entry| perm.iter().map(|&d| entry[d]).collect())
            .collect();
        Self { shape, entries }
    }

    /// Reverses the order of all dimensions. For matrices this is the transpose.
    pub fn reversed(&self) -> Self {
        let perm: Vec<_> = (0..self.rank()).rev().collect();
        self.permute(&perm)
    }

    /// The pattern that is non-zero wherever either operand is non-zero.
    ///
    /// # Panics
    ///
    /// Panics if the shapes differ.
    pub fn union(&self, other: &SparsityPattern) -> Self {
        assert_eq!(self.shape, other.shape, "Union requires patterns of identical shape.");
        Self {
            shape: self.shape.clone(),
            entries: self.entries.union(&other.entries).cloned().collect(),
        }
    }

    /// Boolean mask of a two-dimensional pattern.
    ///
    /// # Panics
    ///
    /// Panics if the pattern is not two-dimensional.
    pub fn to_mask(&self) -> DMatrix<bool> {
        assert_eq!(self.rank(), 2, "Only two-dimensional patterns can be converted to a mask.");
        let mut mask = DMatrix::from_element(self.shape[0], self.shape[1], false);
        for entry in &self.entries {
            mask[(entry[0], entry[1])] = true;
        }
        mask
    }
}

impl fmt::Display for SparsityPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} non-zeros in {:?}", self.nnz(), self.dense_len(), self.shape)
    }
}
