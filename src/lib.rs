//! Generation of ADER-DG kernel descriptions.
//!
//! `adergen` turns a polynomial order, a batching width and an equation model into a catalogue
//! of named tensor equations: the volume, local and neighboring flux kernels and the
//! Cauchy-Kowalevski time derivatives of a discontinuous Galerkin scheme on tetrahedra.
//! Structural sparsity is propagated through every equation, so that derivative tensors shrink
//! as the recursion proceeds. Turning the equations into code is left to a tensor compiler.
//!
//! ```
//! use adergen::catalogue::InMemoryCatalogue;
//! use adergen::config::GeneratorConfig;
//! use adergen::generate::generate_from_config;
//! use adergen::synthetic::synthetic_database;
//!
//! let config = GeneratorConfig::new(2);
//! let db = synthetic_database(2).unwrap();
//! let mut catalogue = InMemoryCatalogue::new();
//! let report = generate_from_config(&config, db, &mut catalogue).unwrap();
//! assert_eq!(report.kernels, catalogue.len());
//! assert!(catalogue.get("derivative(1)", Some(adergen::catalogue::Target::Cpu)).is_some());
//! ```
pub mod assembler;
pub mod basis;
pub mod catalogue;
pub mod config;
pub mod database;
pub mod error;
pub mod generate;
pub mod layout;
pub mod materialize;
pub mod model;
pub mod synthetic;

#[cfg(feature = "proptest")]
pub mod proptest;

pub extern crate adergen_tensor;
pub extern crate nalgebra;
