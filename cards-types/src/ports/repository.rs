//! Repository port traits.
//!
//! This is the primary port in our hexagonal architecture.
//! Adapters (Postgres, SQLite, in-memory) implement these traits.

use crate::domain::{Card, CardId, ExternalId, Holder, HolderId, NewCard, NewHolder};
use crate::error::RepoError;
use crate::ports::{CardPredicate, HolderPredicate};

/// Storage for cards.
///
/// Implementations must report uniqueness violations as
/// [`RepoError::Conflict`] so callers can tell them apart from failures.
#[async_trait::async_trait]
pub trait CardRepository: Send + Sync + 'static {
    /// Lists all cards, ordered by id.
    async fn find_all_cards(&self) -> Result<Vec<Card>, RepoError>;

    /// Lists cards matching the predicate, ordered by id.
    async fn find_cards_by(&self, predicate: &CardPredicate) -> Result<Vec<Card>, RepoError>;

    async fn find_card_by_id(&self, id: CardId) -> Result<Option<Card>, RepoError>;

    async fn find_card_by_external_id(&self, id: ExternalId) -> Result<Option<Card>, RepoError>;

    /// Returns true if at least one card matches.
    async fn exists_card_by(&self, predicate: &CardPredicate) -> Result<bool, RepoError>;

    /// Persists a new card; the store assigns its id.
    async fn insert_card(&self, card: NewCard) -> Result<Card, RepoError>;

    /// Replaces every stored field of an existing card.
    ///
    /// Returns [`RepoError::NotFound`] if no card has that id.
    async fn replace_card(&self, card: Card) -> Result<Card, RepoError>;

    /// Deletes a card. Returns false if it did not exist.
    async fn delete_card_by_id(&self, id: CardId) -> Result<bool, RepoError>;
}

/// Storage for holders.
#[async_trait::async_trait]
pub trait HolderRepository: Send + Sync + 'static {
    /// Lists all holders, ordered by id.
    async fn find_all_holders(&self) -> Result<Vec<Holder>, RepoError>;

    /// Lists holders matching the predicate, ordered by id.
    async fn find_holders_by(&self, predicate: &HolderPredicate)
    -> Result<Vec<Holder>, RepoError>;

    async fn find_holder_by_id(&self, id: HolderId) -> Result<Option<Holder>, RepoError>;

    /// Persists a new holder; the store assigns its id.
    async fn insert_holder(&self, holder: NewHolder) -> Result<Holder, RepoError>;

    /// Replaces every stored field of an existing holder.
    ///
    /// Returns [`RepoError::NotFound`] if no holder has that id.
    async fn replace_holder(&self, holder: Holder) -> Result<Holder, RepoError>;

    /// Deletes a holder only if no card matches `still_referenced`.
    ///
    /// The card check and the delete run in one store transaction.
    /// Returns false if the holder was not deleted because a matching card
    /// exists or the holder is already gone.
    async fn delete_holder_unreferenced(
        &self,
        id: HolderId,
        still_referenced: &CardPredicate,
    ) -> Result<bool, RepoError>;
}

/// A store holding both entities.
pub trait Repository: CardRepository + HolderRepository {}

impl<T: CardRepository + HolderRepository> Repository for T {}
