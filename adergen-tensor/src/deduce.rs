//! Index deduction and sparsity propagation for tensor expressions.
//!
//! The sparsity of an expression is the exact Boolean counterpart of the expression itself:
//! products become joins of the operand patterns on shared indices followed by projection of the
//! contracted indices, and sums become unions. The result therefore contains every entry that can
//! be reached by contracting non-zero operand entries, and no other entry.
use crate::expr::Expr;
use crate::tensor::TensorAccess;
use crate::SparsityPattern;
use itertools::Itertools;
use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt;

/// Failure to reconcile the indices of an equation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeductionError {
    declared: String,
    message: String,
}

impl DeductionError {
    pub(crate) fn new(declared: &[char], message: impl Into<String>) -> Self {
        Self {
            declared: declared.iter().collect(),
            message: message.into(),
        }
    }

    /// The indices declared on the left-hand side of the offending equation.
    pub fn declared_indices(&self) -> &str {
        &self.declared
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for DeductionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cannot deduce indices for equation with declared indices '{}': {}",
            self.declared, self.message
        )
    }
}

impl Error for DeductionError {}

/// Deduces the free indices of `expr` when it is assigned to `target`.
///
/// Also checks that the ranks of all accesses match their tensors and that every index name
/// has the same extent wherever it occurs.
pub(crate) fn deduce_free_indices(expr: &Expr, target: &TensorAccess) -> Result<Vec<char>, DeductionError> {
    let deduction = Deduction::new(expr, target)?;
    deduction.free_indices(expr)
}

/// Deduces the sparsity pattern of `expr` in the index order of `target`.
///
/// `target` only provides the index names and extents of the result; its own sparsity is
/// ignored. This is what allows declaring a new tensor with the deduced pattern.
pub fn deduce_sparsity(expr: &Expr, target: &TensorAccess) -> Result<SparsityPattern, DeductionError> {
    let deduction = Deduction::new(expr, target)?;
    let free = deduction.free_indices(expr)?;
    let mut sorted_free = free.clone();
    let mut sorted_target = target.indices().to_vec();
    sorted_free.sort_unstable();
    sorted_target.sort_unstable();
    if sorted_free != sorted_target {
        return Err(deduction.error(format!(
            "expression has free indices '{}'",
            free.iter().collect::<String>()
        )));
    }

    let relation = deduction.relation(expr)?.project(target.indices());
    Ok(SparsityPattern::from_entries(target.tensor().shape().to_vec(), relation.tuples))
}

struct Deduction<'a> {
    declared: &'a [char],
    extents: BTreeMap<char, usize>,
}

impl<'a> Deduction<'a> {
    fn new(expr: &Expr, target: &'a TensorAccess) -> Result<Self, DeductionError> {
        let mut deduction = Self {
            declared: target.indices(),
            extents: BTreeMap::new(),
        };
        deduction.register(target)?;
        let mut result = Ok(());
        expr.for_each_access(&mut |access| {
            if result.is_ok() {
                result = deduction.register(access);
            }
        });
        result.map(|_| deduction)
    }

    fn error(&self, message: impl Into<String>) -> DeductionError {
        DeductionError::new(self.declared, message)
    }

    fn register(&mut self, access: &TensorAccess) -> Result<(), DeductionError> {
        let tensor = access.tensor();
        if access.indices().len() != tensor.rank() {
            return Err(self.error(format!(
                "tensor {} of rank {} accessed as {}",
                tensor.name(),
                tensor.rank(),
                access
            )));
        }
        for (position, (&index, &extent)) in access.indices().iter().zip(tensor.shape()).enumerate() {
            if access.indices()[..position].contains(&index) {
                return Err(self.error(format!("index '{}' repeated in {}", index, access)));
            }
            match self.extents.get(&index) {
                Some(&known) if known != extent => {
                    return Err(self.error(format!(
                        "index '{}' has extent {} in {} but extent {} elsewhere",
                        index, extent, access, known
                    )));
                }
                _ => {
                    self.extents.insert(index, extent);
                }
            }
        }
        Ok(())
    }

    fn free_indices(&self, expr: &Expr) -> Result<Vec<char>, DeductionError> {
        match expr {
            Expr::Access(access) => Ok(access.indices().to_vec()),
            Expr::Scaled(_, inner) => self.free_indices(inner),
            Expr::Sum(terms) => {
                let (first, rest) = terms.split_first().ok_or_else(|| self.error("empty sum"))?;
                let free = self.free_indices(first)?;
                let key: BTreeSet<_> = free.iter().copied().collect();
                for term in rest {
                    let term_free = self.free_indices(term)?;
                    if term_free.iter().copied().collect::<BTreeSet<_>>() != key {
                        return Err(self.error(format!(
                            "terms of sum have free indices '{}' and '{}'",
                            free.iter().collect::<String>(),
                            term_free.iter().collect::<String>()
                        )));
                    }
                }
                Ok(free)
            }
            Expr::Product(factors) => {
                if factors.is_empty() {
                    return Err(self.error("empty product"));
                }
                let mut all = Vec::new();
                for factor in factors {
                    all.extend(self.free_indices(factor)?);
                }
                Ok(all
                    .iter()
                    .copied()
                    .unique()
                    .filter(|index| self.declared.contains(index) || all.iter().filter(|&c| c == index).count() == 1)
                    .collect())
            }
        }
    }

    fn relation(&self, expr: &Expr) -> Result<Relation, DeductionError> {
        match expr {
            Expr::Access(access) => Ok(Relation {
                indices: access.indices().to_vec(),
                tuples: access.tensor().pattern().entries().map(<[usize]>::to_vec).collect(),
            }),
            Expr::Scaled(_, inner) => self.relation(inner),
            Expr::Sum(terms) => {
                let free = self.free_indices(expr)?;
                let mut tuples = BTreeSet::new();
                for term in terms {
                    tuples.extend(self.relation(term)?.project(&free).tuples);
                }
                Ok(Relation { indices: free, tuples })
            }
            Expr::Product(factors) => {
                let free = self.free_indices(expr)?;
                let relations = factors
                    .iter()
                    .map(|factor| self.relation(factor))
                    .collect::<Result<Vec<_>, _>>()?;

                let mut relations = relations.into_iter();
                let mut accumulated = relations
                    .next()
                    .ok_or_else(|| self.error("empty product"))?;
                let remaining: Vec<Relation> = relations.collect();
                for (i, next) in remaining.iter().enumerate() {
                    // Indices that are neither free nor used by a later factor are summed over here
                    let keep: Vec<char> = accumulated
                        .indices
                        .iter()
                        .chain(next.indices.iter().filter(|c| !accumulated.indices.contains(c)))
                        .copied()
                        .filter(|c| {
                            free.contains(c) || remaining[i + 1..].iter().any(|r| r.indices.contains(c))
                        })
                        .collect();
                    accumulated = accumulated.join(next, &keep);
                }
                Ok(accumulated.project(&free))
            }
        }
    }
}

/// The non-zero entries of an intermediate result, labelled by index names.
#[derive(Debug, Clone)]
struct Relation {
    indices: Vec<char>,
    tuples: BTreeSet<Vec<usize>>,
}

impl Relation {
    fn position(&self, index: char) -> Option<usize> {
        self.indices.iter().position(|&c| c == index)
    }

    /// Restricts the relation to the given indices, in the given order.
    ///
    /// All requested indices must be present.
    fn project(&self, indices: &[char]) -> Relation {
        let positions: Vec<usize> = indices
            .iter()
            .map(|&c| {
                self.position(c)
                    .expect("Internal error: projected index must be part of relation")
            })
            .collect();
        Relation {
            indices: indices.to_vec(),
            tuples: self
                .tuples
                .iter()
                .map(|tuple| positions.iter().map(|&p| tuple[p]).collect())
                .collect(),
        }
    }

    /// Natural join on all shared indices, keeping only the indices in `keep`.
    fn join(&self, other: &Relation, keep: &[char]) -> Relation {
        let shared: Vec<char> = self
            .indices
            .iter()
            .copied()
            .filter(|&c| other.position(c).is_some())
            .collect();
        let key_in_self: Vec<usize> = shared.iter().filter_map(|&c| self.position(c)).collect();
        let key_in_other: Vec<usize> = shared.iter().filter_map(|&c| other.position(c)).collect();

        let mut lookup: BTreeMap<Vec<usize>, Vec<&Vec<usize>>> = BTreeMap::new();
        for tuple in &other.tuples {
            let key = key_in_other.iter().map(|&p| tuple[p]).collect();
            lookup.entry(key).or_default().push(tuple);
        }

        enum Source {
            Left(usize),
            Right(usize),
        }
        let sources: Vec<Source> = keep
            .iter()
            .map(|&c| match self.position(c) {
                Some(p) => Source::Left(p),
                None => Source::Right(
                    other
                        .position(c)
                        .expect("Internal error: kept index must be part of either relation"),
                ),
            })
            .collect();

        let mut tuples = BTreeSet::new();
        for left in &self.tuples {
            let key: Vec<usize> = key_in_self.iter().map(|&p| left[p]).collect();
            if let Some(matches) = lookup.get(&key) {
                for right in matches {
                    tuples.insert(
                        sources
                            .iter()
                            .map(|source| match *source {
                                Source::Left(p) => left[p],
                                Source::Right(p) => right[p],
                            })
                            .collect(),
                    );
                }
            }
        }

        Relation {
            indices: keep.to_vec(),
            tuples,
        }
    }
}
