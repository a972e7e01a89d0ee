//! Holder application service.

use std::sync::Arc;

use chrono::Utc;
use validator::Validate;

use cards_types::{
    AppError, CreateHolderRequest, DomainError, Holder, HolderId, HolderPredicate, Repository,
    UpdateHolderRequest,
};

use crate::cache::{CacheAside, CacheKey, EntityCache, InMemoryCache};
use crate::guard::{self, ReferentialGuard};
use crate::mapper;
use crate::merge::Merge;
use crate::query::HolderQuery;

/// Application service for holder operations.
///
/// Needs both ports: holder mutations are checked against the cards that
/// reference the holder.
pub struct HolderService<R: Repository> {
    repo: Arc<R>,
    cache: CacheAside<Holder>,
    guard: ReferentialGuard<R>,
}

impl<R: Repository> HolderService<R> {
    pub fn new(repo: Arc<R>, cache: Arc<dyn EntityCache<Holder>>) -> Self {
        Self {
            guard: ReferentialGuard::new(repo.clone()),
            repo,
            cache: CacheAside::new(cache),
        }
    }

    pub fn with_memory_cache(repo: Arc<R>) -> Self {
        Self::new(repo, Arc::new(InMemoryCache::new()))
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Lists holders, optionally filtered by a name substring.
    #[tracing::instrument(skip(self))]
    pub async fn find_all(&self, name: Option<&str>) -> Result<Vec<Holder>, AppError> {
        HolderQuery::compose(name)
            .execute(self.repo.as_ref())
            .await
            .map_err(Into::into)
    }

    #[tracing::instrument(skip(self), fields(holder_id = %id))]
    pub async fn find_by_id(&self, id: HolderId) -> Result<Holder, AppError> {
        self.cache
            .read(CacheKey::Id(id.get()), || self.repo.find_holder_by_id(id))
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Holder with id {} not found", id)))
    }

    /// Finds the holder with exactly this name, ignoring case.
    #[tracing::instrument(skip(self))]
    pub async fn find_by_name(&self, name: &str) -> Result<Holder, AppError> {
        self.repo
            .find_holders_by(&HolderPredicate::NameIs(name.to_string()))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound(format!("Holder {} not found", name)))
    }

    /// Creates a new holder. A name already taken (ignoring case) is a Conflict.
    #[tracing::instrument(skip(self, req), fields(name = %req.name))]
    pub async fn create(&self, req: CreateHolderRequest) -> Result<Holder, AppError> {
        req.validate().map_err(DomainError::from)?;

        let holder = mapper::new_holder(req, Utc::now());
        let created = self
            .cache
            .write(|| self.repo.insert_holder(holder))
            .await?;

        tracing::info!(holder_id = %created.id, "holder created");
        Ok(created)
    }

    /// Updates a holder. Renaming a holder that still has cards is refused.
    #[tracing::instrument(skip(self, req), fields(holder_id = %id))]
    pub async fn update(&self, id: HolderId, req: UpdateHolderRequest) -> Result<Holder, AppError> {
        req.validate().map_err(DomainError::from)?;

        let existing = self.find_by_id(id).await?;
        let patch = mapper::holder_patch(req);
        if let Some(name) = &patch.name {
            self.guard.assert_renamable(&existing, name).await?;
        }

        let merged = existing.merge(patch, Utc::now());
        let updated = self
            .cache
            .write(|| self.repo.replace_holder(merged))
            .await?;

        tracing::info!("holder updated");
        Ok(updated)
    }

    /// Deletes a holder that no card references.
    ///
    /// The reference check is repeated inside the store transaction that
    /// performs the delete.
    #[tracing::instrument(skip(self), fields(holder_id = %id))]
    pub async fn delete(&self, id: HolderId) -> Result<(), AppError> {
        let existing = self.find_by_id(id).await?;
        self.guard.assert_deletable(&existing).await?;

        let still_referenced = ReferentialGuard::<R>::cards_of(&existing);
        let deleted = self
            .cache
            .remove(&existing, || {
                self.repo.delete_holder_unreferenced(id, &still_referenced)
            })
            .await?;

        if deleted {
            tracing::info!("holder deleted");
            return Ok(());
        }

        // A card was added, or the holder removed, after the guard ran.
        match self.repo.find_holder_by_id(id).await? {
            Some(holder) => {
                tracing::warn!("holder gained cards before it could be deleted");
                Err(guard::delete_conflict(&holder))
            }
            None => Err(AppError::NotFound(format!("Holder with id {} not found", id))),
        }
    }
}
