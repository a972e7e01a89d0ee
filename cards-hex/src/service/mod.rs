//! Application services.
//!
//! Orchestrate domain operations through the repository ports.
//! Contain NO infrastructure logic - pure business orchestration.

mod card_service;
mod holder_service;

pub use card_service::CardService;
pub use holder_service::HolderService;
