//! Relational schema assembly
//!
//! Entities are deduplicated by natural key in the [`Resolver`] and
//! collected by the [`Assembler`] into the rows of [`Tables`].

pub mod assembler;
pub mod resolver;
pub mod tables;

pub use assembler::{check_integrity, Assembler, IntegrityReport, IntegrityViolation, DEFAULT_POSITIONS};
pub use resolver::{normalize_key, EntityKind, Resolver};
pub use tables::{Id, TableRow, Tables, LOAD_ORDER};
