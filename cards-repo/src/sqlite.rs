//! SQLite repository adapter.
#![allow(clippy::collapsible_if)]

use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;

use cards_types::{
    Card, CardId, CardPredicate, CardRepository, ExternalId, Holder, HolderId, HolderPredicate,
    HolderRepository, NewCard, NewHolder, RepoError, fold_case,
};

use crate::types::{
    SqliteCardRow, SqliteHolderRow, card_conflict, db_err, holder_conflict, map_write_err, tx_err,
};

const CARD_COLUMNS: &str =
    "id, external_id, number, cvc, expiry, holder_name, balance, created_at, updated_at";
const HOLDER_COLUMNS: &str = "id, name, created_at, updated_at";

// ─────────────────────────────────────────────────────────────────────────────
// SQLite Repository
// ─────────────────────────────────────────────────────────────────────────────

/// SQLite repository implementation.
pub struct SqliteRepo {
    pool: SqlitePool,
}

/// Executes SQL statements from a migration file, splitting by semicolons.
async fn execute_migration(pool: &SqlitePool, sql: &str, name: &str) -> anyhow::Result<()> {
    for statement in sql.split(';') {
        let stmt = statement.trim();
        if !stmt.is_empty() {
            sqlx::query(stmt)
                .execute(pool)
                .await
                .map_err(|e| anyhow::anyhow!("Migration {} failed: {}", name, e))?;
        }
    }
    Ok(())
}

impl SqliteRepo {
    /// Creates a new SQLite repository with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let in_memory = database_url.contains(":memory:") || database_url.contains("mode=memory");

        // Ensure on-disk SQLite target directory exists.
        if !in_memory {
            if let Some(path) = database_url.strip_prefix("sqlite://") {
                let path = path.split('?').next().unwrap_or(path);
                if let Some(parent) = std::path::Path::new(path).parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        // Every connection to `:memory:` opens its own empty database.
        let max_connections = if in_memory { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        let repo = Self { pool };
        repo.run_migrations().await?;
        tracing::debug!(in_memory, "SQLite schema ready");
        Ok(repo)
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn run_migrations(&self) -> anyhow::Result<()> {
        execute_migration(
            &self.pool,
            include_str!("../migrations/0001_create_holders.sql"),
            "0001",
        )
        .await?;
        execute_migration(
            &self.pool,
            include_str!("../migrations/0002_create_cards.sql"),
            "0002",
        )
        .await?;
        Ok(())
    }
}

/// Renders a card predicate as a WHERE clause and its bind values.
///
/// Holder text is compared against the stored `holder_key`, never `lower()`.
fn card_filter(predicate: &CardPredicate) -> (&'static str, Vec<String>) {
    match predicate {
        CardPredicate::NumberContains(number) => {
            ("instr(lower(number), ?) > 0", vec![fold_case(number)])
        }
        CardPredicate::HolderContains(holder) => {
            ("instr(holder_key, ?) > 0", vec![fold_case(holder)])
        }
        CardPredicate::NumberAndHolderContain { number, holder } => (
            "instr(lower(number), ?) > 0 AND instr(holder_key, ?) > 0",
            vec![fold_case(number), fold_case(holder)],
        ),
        CardPredicate::HolderIs(name) => ("holder_key = ?", vec![fold_case(name)]),
    }
}

fn holder_filter(predicate: &HolderPredicate) -> (&'static str, String) {
    match predicate {
        HolderPredicate::NameContains(name) => ("instr(name_key, ?) > 0", fold_case(name)),
        HolderPredicate::NameIs(name) => ("name_key = ?", fold_case(name)),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Card repository
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl CardRepository for SqliteRepo {
    async fn find_all_cards(&self) -> Result<Vec<Card>, RepoError> {
        let sql = format!("SELECT {CARD_COLUMNS} FROM cards ORDER BY id");
        let rows: Vec<SqliteCardRow> = sqlx::query_as(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        rows.into_iter().map(SqliteCardRow::into_domain).collect()
    }

    async fn find_cards_by(&self, predicate: &CardPredicate) -> Result<Vec<Card>, RepoError> {
        let (clause, binds) = card_filter(predicate);
        let sql = format!("SELECT {CARD_COLUMNS} FROM cards WHERE {clause} ORDER BY id");

        let mut query = sqlx::query_as::<_, SqliteCardRow>(&sql);
        for value in binds {
            query = query.bind(value);
        }
        let rows = query.fetch_all(&self.pool).await.map_err(db_err)?;

        rows.into_iter().map(SqliteCardRow::into_domain).collect()
    }

    async fn find_card_by_id(&self, id: CardId) -> Result<Option<Card>, RepoError> {
        let sql = format!("SELECT {CARD_COLUMNS} FROM cards WHERE id = ?");
        let row: Option<SqliteCardRow> = sqlx::query_as(&sql)
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        row.map(SqliteCardRow::into_domain).transpose()
    }

    async fn find_card_by_external_id(&self, id: ExternalId) -> Result<Option<Card>, RepoError> {
        let sql = format!("SELECT {CARD_COLUMNS} FROM cards WHERE external_id = ?");
        let row: Option<SqliteCardRow> = sqlx::query_as(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        row.map(SqliteCardRow::into_domain).transpose()
    }

    async fn exists_card_by(&self, predicate: &CardPredicate) -> Result<bool, RepoError> {
        let (clause, binds) = card_filter(predicate);
        let sql = format!("SELECT EXISTS (SELECT 1 FROM cards WHERE {clause})");

        let mut query = sqlx::query_scalar::<_, bool>(&sql);
        for value in binds {
            query = query.bind(value);
        }
        query.fetch_one(&self.pool).await.map_err(db_err)
    }

    async fn insert_card(&self, card: NewCard) -> Result<Card, RepoError> {
        let result = sqlx::query(
            r#"INSERT INTO cards (external_id, number, cvc, expiry, holder_name, holder_key,
                                 balance, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(card.external_id.to_string())
        .bind(&card.number)
        .bind(&card.cvc)
        .bind(card.expiry.to_string())
        .bind(&card.holder_name)
        .bind(fold_case(&card.holder_name))
        .bind(card.balance)
        .bind(card.created_at.to_rfc3339())
        .bind(card.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_err(e, || card_conflict(card.external_id)))?;

        Ok(card.with_id(CardId::new(result.last_insert_rowid())))
    }

    async fn replace_card(&self, card: Card) -> Result<Card, RepoError> {
        let result = sqlx::query(
            r#"UPDATE cards
               SET external_id = ?, number = ?, cvc = ?, expiry = ?, holder_name = ?,
                   holder_key = ?, balance = ?, created_at = ?, updated_at = ?
               WHERE id = ?"#,
        )
        .bind(card.external_id.to_string())
        .bind(&card.number)
        .bind(&card.cvc)
        .bind(card.expiry.to_string())
        .bind(&card.holder_name)
        .bind(fold_case(&card.holder_name))
        .bind(card.balance)
        .bind(card.created_at.to_rfc3339())
        .bind(card.updated_at.to_rfc3339())
        .bind(card.id.get())
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_err(e, || card_conflict(card.external_id)))?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(card)
    }

    async fn delete_card_by_id(&self, id: CardId) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM cards WHERE id = ?")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(result.rows_affected() > 0)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Holder repository
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl HolderRepository for SqliteRepo {
    async fn find_all_holders(&self) -> Result<Vec<Holder>, RepoError> {
        let sql = format!("SELECT {HOLDER_COLUMNS} FROM holders ORDER BY id");
        let rows: Vec<SqliteHolderRow> = sqlx::query_as(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        rows.into_iter().map(SqliteHolderRow::into_domain).collect()
    }

    async fn find_holders_by(
        &self,
        predicate: &HolderPredicate,
    ) -> Result<Vec<Holder>, RepoError> {
        let (clause, value) = holder_filter(predicate);
        let sql = format!("SELECT {HOLDER_COLUMNS} FROM holders WHERE {clause} ORDER BY id");
        let rows: Vec<SqliteHolderRow> = sqlx::query_as(&sql)
            .bind(value)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        rows.into_iter().map(SqliteHolderRow::into_domain).collect()
    }

    async fn find_holder_by_id(&self, id: HolderId) -> Result<Option<Holder>, RepoError> {
        let sql = format!("SELECT {HOLDER_COLUMNS} FROM holders WHERE id = ?");
        let row: Option<SqliteHolderRow> = sqlx::query_as(&sql)
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        row.map(SqliteHolderRow::into_domain).transpose()
    }

    async fn insert_holder(&self, holder: NewHolder) -> Result<Holder, RepoError> {
        let result = sqlx::query(
            "INSERT INTO holders (name, name_key, created_at, updated_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&holder.name)
        .bind(fold_case(&holder.name))
        .bind(holder.created_at.to_rfc3339())
        .bind(holder.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_err(e, || holder_conflict(&holder.name)))?;

        Ok(holder.with_id(HolderId::new(result.last_insert_rowid())))
    }

    async fn replace_holder(&self, holder: Holder) -> Result<Holder, RepoError> {
        let result = sqlx::query(
            r#"UPDATE holders SET name = ?, name_key = ?, created_at = ?, updated_at = ?
               WHERE id = ?"#,
        )
        .bind(&holder.name)
        .bind(fold_case(&holder.name))
        .bind(holder.created_at.to_rfc3339())
        .bind(holder.updated_at.to_rfc3339())
        .bind(holder.id.get())
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_err(e, || holder_conflict(&holder.name)))?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(holder)
    }

    async fn delete_holder_unreferenced(
        &self,
        id: HolderId,
        still_referenced: &CardPredicate,
    ) -> Result<bool, RepoError> {
        let mut db_tx = self.pool.begin().await.map_err(tx_err)?;

        let (clause, binds) = card_filter(still_referenced);
        let sql = format!("SELECT EXISTS (SELECT 1 FROM cards WHERE {clause})");
        let mut query = sqlx::query_scalar::<_, bool>(&sql);
        for value in binds {
            query = query.bind(value);
        }
        let referenced = query.fetch_one(&mut *db_tx).await.map_err(db_err)?;

        if referenced {
            db_tx.rollback().await.map_err(tx_err)?;
            return Ok(false);
        }

        let result = sqlx::query("DELETE FROM holders WHERE id = ?")
            .bind(id.get())
            .execute(&mut *db_tx)
            .await
            .map_err(db_err)?;

        db_tx.commit().await.map_err(tx_err)?;

        Ok(result.rows_affected() > 0)
    }
}
