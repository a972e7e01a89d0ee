//! # Cards Types
//!
//! Domain types and port traits for the cards service.
//! This crate has ZERO external IO dependencies - only data structures,
//! validation rules, and trait definitions.
//!
//! ## Architecture
//!
//! This crate represents the **innermost core** of the hexagonal architecture:
//! - `domain/` - Pure domain types (Card, Holder, identifiers)
//! - `ports/` - Trait definitions that adapters must implement
//! - `dto/` - Data Transfer Objects for API boundaries
//! - `error/` - Domain, repository and application error types

pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use domain::{Card, CardId, ExternalId, Holder, HolderId, NewCard, NewHolder};
pub use dto::*;
pub use error::{AppError, DomainError, FieldErrors, RepoError};
pub use ports::{
    CardPredicate, CardRepository, HolderPredicate, HolderRepository, Repository, fold_case,
};
