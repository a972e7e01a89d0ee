//! Translation between wire DTOs and domain entities.

use chrono::{DateTime, Utc};

use cards_types::{
    Card, CardResponse, CreateCardRequest, CreateHolderRequest, ExternalId, Holder,
    HolderResponse, NewCard, NewHolder, UpdateCardRequest, UpdateHolderRequest,
};

use crate::merge::{CardPatch, HolderPatch};

/// Builds an unsaved card with a fresh external id, stamped at `now`.
pub fn new_card(req: CreateCardRequest, now: DateTime<Utc>) -> NewCard {
    NewCard {
        external_id: ExternalId::new(),
        number: req.number,
        cvc: req.cvc,
        expiry: req.expiry,
        holder_name: req.holder_name,
        balance: req.balance,
        created_at: now,
        updated_at: now,
    }
}

pub fn card_patch(req: UpdateCardRequest) -> CardPatch {
    CardPatch {
        number: req.number,
        cvc: req.cvc,
        expiry: req.expiry,
        balance: req.balance,
    }
}

pub fn card_response(card: Card) -> CardResponse {
    CardResponse {
        id: card.id,
        external_id: card.external_id,
        number: card.number,
        cvc: card.cvc,
        expiry: card.expiry,
        holder_name: card.holder_name,
        balance: card.balance,
        created_at: card.created_at,
        updated_at: card.updated_at,
    }
}

pub fn new_holder(req: CreateHolderRequest, now: DateTime<Utc>) -> NewHolder {
    NewHolder {
        name: req.name,
        created_at: now,
        updated_at: now,
    }
}

pub fn holder_patch(req: UpdateHolderRequest) -> HolderPatch {
    HolderPatch { name: req.name }
}

pub fn holder_response(holder: Holder) -> HolderResponse {
    HolderResponse {
        id: holder.id,
        name: holder.name,
        created_at: holder.created_at,
        updated_at: holder.updated_at,
    }
}
