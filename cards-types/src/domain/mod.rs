//! Domain models for the cards service.

pub mod card;
pub mod external_id;
pub mod holder;

pub use card::{Card, CardId, NewCard};
pub use external_id::ExternalId;
pub use holder::{Holder, HolderId, NewHolder};
