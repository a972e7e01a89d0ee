//! Database row types and conversion helpers for SQLite and PostgreSQL.

use sqlx::FromRow;

use cards_types::{Card, CardId, ExternalId, Holder, HolderId, RepoError};

// ─────────────────────────────────────────────────────────────────────────────
// Error mapping
// ─────────────────────────────────────────────────────────────────────────────

/// Returns true if the driver rejected a write on a unique constraint.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

/// Maps a driver error, turning unique violations into a conflict with the
/// caller-supplied message.
pub fn map_write_err(err: sqlx::Error, conflict: impl FnOnce() -> String) -> RepoError {
    if is_unique_violation(&err) {
        RepoError::Conflict(conflict())
    } else {
        db_err(err)
    }
}

pub fn db_err(err: sqlx::Error) -> RepoError {
    RepoError::Database(err.to_string())
}

pub fn tx_err(err: sqlx::Error) -> RepoError {
    RepoError::Transaction(err.to_string())
}

pub fn holder_conflict(name: &str) -> String {
    format!("A holder named '{}' already exists", name)
}

pub fn card_conflict(external_id: ExternalId) -> String {
    format!("A card with external id {} already exists", external_id)
}

// ─────────────────────────────────────────────────────────────────────────────
// SQLite rows (text-encoded UUIDs, dates and timestamps)
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(feature = "sqlite")]
pub use self::sqlite_rows::{SqliteCardRow, SqliteHolderRow};

#[cfg(feature = "sqlite")]
mod sqlite_rows {
    use super::*;
    use chrono::{DateTime, NaiveDate, Utc};

    #[derive(FromRow)]
    pub struct SqliteCardRow {
        pub id: i64,
        pub external_id: String,
        pub number: String,
        pub cvc: String,
        pub expiry: String,
        pub holder_name: String,
        pub balance: f64,
        pub created_at: String,
        pub updated_at: String,
    }

    #[derive(FromRow)]
    pub struct SqliteHolderRow {
        pub id: i64,
        pub name: String,
        pub created_at: String,
        pub updated_at: String,
    }

    fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, RepoError> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| RepoError::Database(e.to_string()))
    }

    impl SqliteCardRow {
        /// Convert database row to domain Card.
        pub fn into_domain(self) -> Result<Card, RepoError> {
            let external_id = uuid::Uuid::parse_str(&self.external_id)
                .map_err(|e| RepoError::Database(e.to_string()))?;
            let expiry = self
                .expiry
                .parse::<NaiveDate>()
                .map_err(|e| RepoError::Database(e.to_string()))?;

            Ok(Card {
                id: CardId::new(self.id),
                external_id: ExternalId::from_uuid(external_id),
                number: self.number,
                cvc: self.cvc,
                expiry,
                holder_name: self.holder_name,
                balance: self.balance,
                created_at: parse_timestamp(&self.created_at)?,
                updated_at: parse_timestamp(&self.updated_at)?,
            })
        }
    }

    impl SqliteHolderRow {
        /// Convert database row to domain Holder.
        pub fn into_domain(self) -> Result<Holder, RepoError> {
            Ok(Holder {
                id: HolderId::new(self.id),
                name: self.name,
                created_at: parse_timestamp(&self.created_at)?,
                updated_at: parse_timestamp(&self.updated_at)?,
            })
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// PostgreSQL rows (native types)
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(feature = "postgres")]
pub use self::pg_rows::{PgCardRow, PgHolderRow};

#[cfg(feature = "postgres")]
mod pg_rows {
    use super::*;
    use chrono::{DateTime, NaiveDate, Utc};
    use uuid::Uuid;

    #[derive(FromRow)]
    pub struct PgCardRow {
        pub id: i64,
        pub external_id: Uuid,
        pub number: String,
        pub cvc: String,
        pub expiry: NaiveDate,
        pub holder_name: String,
        pub balance: f64,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(FromRow)]
    pub struct PgHolderRow {
        pub id: i64,
        pub name: String,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    impl PgCardRow {
        pub fn into_domain(self) -> Card {
            Card {
                id: CardId::new(self.id),
                external_id: ExternalId::from_uuid(self.external_id),
                number: self.number,
                cvc: self.cvc,
                expiry: self.expiry,
                holder_name: self.holder_name,
                balance: self.balance,
                created_at: self.created_at,
                updated_at: self.updated_at,
            }
        }
    }

    impl PgHolderRow {
        pub fn into_domain(self) -> Holder {
            Holder {
                id: HolderId::new(self.id),
                name: self.name,
                created_at: self.created_at,
                updated_at: self.updated_at,
            }
        }
    }
}
