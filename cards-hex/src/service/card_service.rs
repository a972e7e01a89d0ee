//! Card application service.

use std::sync::Arc;

use chrono::Utc;
use validator::Validate;

use cards_types::{
    AppError, Card, CardId, CardRepository, CreateCardRequest, DomainError, ExternalId,
    UpdateCardRequest,
};

use crate::cache::{CacheAside, CacheKey, EntityCache, InMemoryCache};
use crate::mapper;
use crate::merge::Merge;
use crate::query::CardQuery;

/// Application service for card operations.
///
/// Generic over `R: CardRepository` - the adapter is injected at compile time.
/// The cache is injected too and lives as long as the service.
pub struct CardService<R: CardRepository> {
    repo: Arc<R>,
    cache: CacheAside<Card>,
}

impl<R: CardRepository> CardService<R> {
    /// Creates a card service over `repo` using the given cache.
    pub fn new(repo: Arc<R>, cache: Arc<dyn EntityCache<Card>>) -> Self {
        Self {
            repo,
            cache: CacheAside::new(cache),
        }
    }

    /// Creates a card service with a private in-memory cache.
    pub fn with_memory_cache(repo: Arc<R>) -> Self {
        Self::new(repo, Arc::new(InMemoryCache::new()))
    }

    /// Returns a reference to the underlying repository.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Lists cards, optionally filtered by number and/or holder name.
    #[tracing::instrument(skip(self))]
    pub async fn find_all(
        &self,
        number: Option<&str>,
        holder: Option<&str>,
    ) -> Result<Vec<Card>, AppError> {
        let query = CardQuery::compose(number, holder);
        tracing::debug!(?query, "listing cards");
        query.execute(self.repo.as_ref()).await.map_err(Into::into)
    }

    /// Gets a card by surrogate id.
    #[tracing::instrument(skip(self), fields(card_id = %id))]
    pub async fn find_by_id(&self, id: CardId) -> Result<Card, AppError> {
        self.cache
            .read(CacheKey::Id(id.get()), || self.repo.find_card_by_id(id))
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Card with id {} not found", id)))
    }

    /// Gets a card by its external id given in textual form.
    ///
    /// Text that is not a canonical UUID is rejected as malformed before the
    /// store is consulted.
    #[tracing::instrument(skip(self))]
    pub async fn find_by_external_id(&self, external_id: &str) -> Result<Card, AppError> {
        let external_id: ExternalId = external_id.parse()?;

        self.cache
            .read(CacheKey::External(external_id), || {
                self.repo.find_card_by_external_id(external_id)
            })
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Card with external id {} not found", external_id))
            })
    }

    /// Creates a new card.
    #[tracing::instrument(skip(self, req), fields(holder = %req.holder_name))]
    pub async fn create(&self, req: CreateCardRequest) -> Result<Card, AppError> {
        req.validate().map_err(DomainError::from)?;

        let card = mapper::new_card(req, Utc::now());
        let created = self
            .cache
            .write(|| self.repo.insert_card(card))
            .await?;

        tracing::info!(card_id = %created.id, external_id = %created.external_id, "card created");
        Ok(created)
    }

    /// Updates a card. Omitted fields keep their value; the holder never changes.
    ///
    /// Backs both full replace and partial patch.
    #[tracing::instrument(skip(self, req), fields(card_id = %id))]
    pub async fn update(&self, id: CardId, req: UpdateCardRequest) -> Result<Card, AppError> {
        req.validate().map_err(DomainError::from)?;

        let existing = self.find_by_id(id).await?;
        let merged = existing.merge(mapper::card_patch(req), Utc::now());
        let updated = self
            .cache
            .write(|| self.repo.replace_card(merged))
            .await?;

        tracing::info!("card updated");
        Ok(updated)
    }

    /// Deletes a card.
    #[tracing::instrument(skip(self), fields(card_id = %id))]
    pub async fn delete(&self, id: CardId) -> Result<(), AppError> {
        let existing = self.find_by_id(id).await?;
        let deleted = self
            .cache
            .remove(&existing, || self.repo.delete_card_by_id(id))
            .await?;

        if !deleted {
            return Err(AppError::NotFound(format!("Card with id {} not found", id)));
        }

        tracing::info!("card deleted");
        Ok(())
    }
}
