//! Referential integrity between holders and their cards.
//!
//! Cards point at their holder by name and nothing in the store enforces
//! that link, so the checks live here.

use std::sync::Arc;

use cards_types::{AppError, CardPredicate, CardRepository, Holder};

/// Refuses holder mutations that would orphan cards.
pub struct ReferentialGuard<R> {
    repo: Arc<R>,
}

impl<R> Clone for ReferentialGuard<R> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
        }
    }
}

impl<R: CardRepository> ReferentialGuard<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Predicate selecting the cards that belong to `holder`.
    pub fn cards_of(holder: &Holder) -> CardPredicate {
        CardPredicate::HolderIs(holder.name.clone())
    }

    /// Ok if no card references `holder`, Conflict otherwise.
    #[tracing::instrument(skip(self, holder), fields(holder_id = %holder.id))]
    pub async fn assert_deletable(&self, holder: &Holder) -> Result<(), AppError> {
        if self.repo.exists_card_by(&Self::cards_of(holder)).await? {
            tracing::warn!(holder = %holder.name, "refusing to delete holder that still has cards");
            return Err(delete_conflict(holder));
        }
        Ok(())
    }

    /// Ok unless `new_name` renames a holder that still has cards.
    #[tracing::instrument(skip(self, holder), fields(holder_id = %holder.id))]
    pub async fn assert_renamable(&self, holder: &Holder, new_name: &str) -> Result<(), AppError> {
        if holder.is_named(new_name) {
            return Ok(());
        }
        if self.repo.exists_card_by(&Self::cards_of(holder)).await? {
            tracing::warn!(
                holder = %holder.name,
                new_name,
                "refusing to rename holder that still has cards"
            );
            return Err(AppError::Conflict(format!(
                "Cannot rename holder with id {} because it still has cards",
                holder.id
            )));
        }
        Ok(())
    }
}

pub(crate) fn delete_conflict(holder: &Holder) -> AppError {
    AppError::Conflict(format!(
        "Cannot delete holder with id {} because it still has cards",
        holder.id
    ))
}
