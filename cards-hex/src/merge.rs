//! Partial-update merge.
//!
//! A patch names only the mutable fields of an entity. Anything the patch
//! leaves out keeps its current value; identity and creation data are always
//! carried over from the existing entity. Full replace and partial patch both
//! go through here: a full replace is a patch with every field set.

use chrono::{DateTime, NaiveDate, Utc};

use cards_types::{Card, Holder};

/// Sparse update for a card. There is no holder field by construction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CardPatch {
    pub number: Option<String>,
    pub cvc: Option<String>,
    pub expiry: Option<NaiveDate>,
    pub balance: Option<f64>,
}

/// Sparse update for a holder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HolderPatch {
    pub name: Option<String>,
}

/// Produces a new value from an existing entity and a patch.
pub trait Merge {
    type Patch;

    /// Merges `patch` over `self`, stamping `updated_at` from `now`.
    ///
    /// `updated_at` never moves backwards, even if `now` is behind the
    /// stored timestamp.
    fn merge(&self, patch: Self::Patch, now: DateTime<Utc>) -> Self;
}

fn refreshed(previous: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    now.max(previous)
}

impl Merge for Card {
    type Patch = CardPatch;

    fn merge(&self, patch: CardPatch, now: DateTime<Utc>) -> Card {
        Card {
            id: self.id,
            external_id: self.external_id,
            number: patch.number.unwrap_or_else(|| self.number.clone()),
            cvc: patch.cvc.unwrap_or_else(|| self.cvc.clone()),
            expiry: patch.expiry.unwrap_or(self.expiry),
            holder_name: self.holder_name.clone(),
            balance: patch.balance.unwrap_or(self.balance),
            created_at: self.created_at,
            updated_at: refreshed(self.updated_at, now),
        }
    }
}

impl Merge for Holder {
    type Patch = HolderPatch;

    fn merge(&self, patch: HolderPatch, now: DateTime<Utc>) -> Holder {
        Holder {
            id: self.id,
            name: patch.name.unwrap_or_else(|| self.name.clone()),
            created_at: self.created_at,
            updated_at: refreshed(self.updated_at, now),
        }
    }
}
