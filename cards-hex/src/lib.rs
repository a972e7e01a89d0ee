//! # Cards Hex
//!
//! Application service layer and HTTP adapter for the cards service.
//!
//! ## Architecture
//!
//! - `query` - picks the lookup strategy for list filters
//! - `merge` - applies sparse updates while protecting immutable fields
//! - `cache` - cache-aside wrapper around single-entity reads and writes
//! - `guard` - refuses holder deletes and renames while cards reference it
//! - `mapper` - translation between DTOs and domain entities
//! - `service/` - Card and Holder services (orchestrate the above)
//! - `inbound/` - HTTP adapter (Axum server)
//!
//! The services are generic over the repository ports, allowing
//! different repository implementations to be injected.

pub mod cache;
pub mod guard;
pub mod inbound;
pub mod mapper;
pub mod merge;
pub mod openapi;
pub mod query;
pub mod service;


pub use cache::{CacheKey, Cached, EntityCache, InMemoryCache};
pub use service::{CardService, HolderService};
