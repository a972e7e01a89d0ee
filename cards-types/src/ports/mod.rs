//! Port traits (interfaces for adapters).
//!
//! These are the contracts that adapters must implement.
//! The application layer depends on these traits, not concrete implementations.

mod predicate;
mod repository;

pub use predicate::{CardPredicate, HolderPredicate, fold_case};
pub use repository::{CardRepository, HolderRepository, Repository};
