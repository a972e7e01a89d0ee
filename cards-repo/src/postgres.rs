//! PostgreSQL repository adapter.

use async_trait::async_trait;
use sqlx::PgPool;

use cards_types::{
    Card, CardId, CardPredicate, CardRepository, ExternalId, Holder, HolderId, HolderPredicate,
    HolderRepository, NewCard, NewHolder, RepoError, fold_case,
};

use crate::types::{
    PgCardRow, PgHolderRow, card_conflict, db_err, holder_conflict, map_write_err, tx_err,
};

const CARD_COLUMNS: &str =
    "id, external_id, number, cvc, expiry, holder_name, balance, created_at, updated_at";
const HOLDER_COLUMNS: &str = "id, name, created_at, updated_at";

// ─────────────────────────────────────────────────────────────────────────────
// PostgreSQL Repository
// ─────────────────────────────────────────────────────────────────────────────

/// PostgreSQL repository implementation.
pub struct PostgresRepo {
    pool: PgPool,
}

/// Executes SQL statements from a migration file, splitting by semicolons.
async fn execute_migration(pool: &PgPool, sql: &str, name: &str) -> Result<(), anyhow::Error> {
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

/// Runs all database migrations.
async fn run_migrations(pool: &PgPool) -> Result<(), anyhow::Error> {
    execute_migration(
        pool,
        include_str!("../migrations/0001_create_holders_pg.sql"),
        "0001",
    )
    .await?;

    execute_migration(
        pool,
        include_str!("../migrations/0002_create_cards_pg.sql"),
        "0002",
    )
    .await?;

    Ok(())
}

impl PostgresRepo {
    /// Creates a new PostgreSQL repository with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        run_migrations(&pool).await?;
        tracing::debug!("PostgreSQL schema ready");
        Ok(Self { pool })
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn card_filter(predicate: &CardPredicate) -> (&'static str, Vec<String>) {
    match predicate {
        CardPredicate::NumberContains(number) => {
            ("strpos(lower(number), $1) > 0", vec![fold_case(number)])
        }
        CardPredicate::HolderContains(holder) => {
            ("strpos(holder_key, $1) > 0", vec![fold_case(holder)])
        }
        CardPredicate::NumberAndHolderContain { number, holder } => (
            "strpos(lower(number), $1) > 0 AND strpos(holder_key, $2) > 0",
            vec![fold_case(number), fold_case(holder)],
        ),
        CardPredicate::HolderIs(name) => ("holder_key = $1", vec![fold_case(name)]),
    }
}

fn holder_filter(predicate: &HolderPredicate) -> (&'static str, String) {
    match predicate {
        HolderPredicate::NameContains(name) => ("strpos(name_key, $1) > 0", fold_case(name)),
        HolderPredicate::NameIs(name) => ("name_key = $1", fold_case(name)),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Card repository
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl CardRepository for PostgresRepo {
    async fn find_all_cards(&self) -> Result<Vec<Card>, RepoError> {
        let sql = format!("SELECT {CARD_COLUMNS} FROM cards ORDER BY id");
        let rows: Vec<PgCardRow> = sqlx::query_as(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(rows.into_iter().map(PgCardRow::into_domain).collect())
    }

    async fn find_cards_by(&self, predicate: &CardPredicate) -> Result<Vec<Card>, RepoError> {
        let (clause, binds) = card_filter(predicate);
        let sql = format!("SELECT {CARD_COLUMNS} FROM cards WHERE {clause} ORDER BY id");

        let mut query = sqlx::query_as::<_, PgCardRow>(&sql);
        for value in binds {
            query = query.bind(value);
        }
        let rows = query.fetch_all(&self.pool).await.map_err(db_err)?;

        Ok(rows.into_iter().map(PgCardRow::into_domain).collect())
    }

    async fn find_card_by_id(&self, id: CardId) -> Result<Option<Card>, RepoError> {
        let sql = format!("SELECT {CARD_COLUMNS} FROM cards WHERE id = $1");
        let row: Option<PgCardRow> = sqlx::query_as(&sql)
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(row.map(PgCardRow::into_domain))
    }

    async fn find_card_by_external_id(&self, id: ExternalId) -> Result<Option<Card>, RepoError> {
        let sql = format!("SELECT {CARD_COLUMNS} FROM cards WHERE external_id = $1");
        let row: Option<PgCardRow> = sqlx::query_as(&sql)
            .bind(id.into_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(row.map(PgCardRow::into_domain))
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
        let sql = format!(
            r#"INSERT INTO cards (external_id, number, cvc, expiry, holder_name, holder_key,
                                 balance, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
               RETURNING {CARD_COLUMNS}"#
        );
        let row: PgCardRow = sqlx::query_as(&sql)
            .bind(card.external_id.into_uuid())
            .bind(&card.number)
            .bind(&card.cvc)
            .bind(card.expiry)
            .bind(&card.holder_name)
            .bind(fold_case(&card.holder_name))
            .bind(card.balance)
            .bind(card.created_at)
            .bind(card.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_write_err(e, || card_conflict(card.external_id)))?;

        Ok(row.into_domain())
    }

    async fn replace_card(&self, card: Card) -> Result<Card, RepoError> {
        let sql = format!(
            r#"UPDATE cards
               SET external_id = $1, number = $2, cvc = $3, expiry = $4, holder_name = $5,
                   holder_key = $6, balance = $7, created_at = $8, updated_at = $9
               WHERE id = $10
               RETURNING {CARD_COLUMNS}"#
        );
        let row: Option<PgCardRow> = sqlx::query_as(&sql)
            .bind(card.external_id.into_uuid())
            .bind(&card.number)
            .bind(&card.cvc)
            .bind(card.expiry)
            .bind(&card.holder_name)
            .bind(fold_case(&card.holder_name))
            .bind(card.balance)
            .bind(card.created_at)
            .bind(card.updated_at)
            .bind(card.id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_write_err(e, || card_conflict(card.external_id)))?;

        row.map(PgCardRow::into_domain).ok_or(RepoError::NotFound)
    }

    async fn delete_card_by_id(&self, id: CardId) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM cards WHERE id = $1")
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
impl HolderRepository for PostgresRepo {
    async fn find_all_holders(&self) -> Result<Vec<Holder>, RepoError> {
        let sql = format!("SELECT {HOLDER_COLUMNS} FROM holders ORDER BY id");
        let rows: Vec<PgHolderRow> = sqlx::query_as(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(rows.into_iter().map(PgHolderRow::into_domain).collect())
    }

    async fn find_holders_by(
        &self,
        predicate: &HolderPredicate,
    ) -> Result<Vec<Holder>, RepoError> {
        let (clause, value) = holder_filter(predicate);
        let sql = format!("SELECT {HOLDER_COLUMNS} FROM holders WHERE {clause} ORDER BY id");
        let rows: Vec<PgHolderRow> = sqlx::query_as(&sql)
            .bind(value)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(rows.into_iter().map(PgHolderRow::into_domain).collect())
    }

    async fn find_holder_by_id(&self, id: HolderId) -> Result<Option<Holder>, RepoError> {
        let sql = format!("SELECT {HOLDER_COLUMNS} FROM holders WHERE id = $1");
        let row: Option<PgHolderRow> = sqlx::query_as(&sql)
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(row.map(PgHolderRow::into_domain))
    }

    async fn insert_holder(&self, holder: NewHolder) -> Result<Holder, RepoError> {
        let sql = format!(
            r#"INSERT INTO holders (name, name_key, created_at, updated_at)
               VALUES ($1, $2, $3, $4)
               RETURNING {HOLDER_COLUMNS}"#
        );
        let row: PgHolderRow = sqlx::query_as(&sql)
            .bind(&holder.name)
            .bind(fold_case(&holder.name))
            .bind(holder.created_at)
            .bind(holder.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_write_err(e, || holder_conflict(&holder.name)))?;

        Ok(row.into_domain())
    }

    async fn replace_holder(&self, holder: Holder) -> Result<Holder, RepoError> {
        let sql = format!(
            r#"UPDATE holders SET name = $1, name_key = $2, created_at = $3, updated_at = $4
               WHERE id = $5
               RETURNING {HOLDER_COLUMNS}"#
        );
        let row: Option<PgHolderRow> = sqlx::query_as(&sql)
            .bind(&holder.name)
            .bind(fold_case(&holder.name))
            .bind(holder.created_at)
            .bind(holder.updated_at)
            .bind(holder.id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_write_err(e, || holder_conflict(&holder.name)))?;

        row.map(PgHolderRow::into_domain).ok_or(RepoError::NotFound)
    }

    async fn delete_holder_unreferenced(
        &self,
        id: HolderId,
        still_referenced: &CardPredicate,
    ) -> Result<bool, RepoError> {
        let mut db_tx = self.pool.begin().await.map_err(tx_err)?;

        // Lock the holder row so a concurrent delete or rename waits for us.
        let locked: Option<i64> =
            sqlx::query_scalar("SELECT id FROM holders WHERE id = $1 FOR UPDATE")
                .bind(id.get())
                .fetch_optional(&mut *db_tx)
                .await
                .map_err(db_err)?;

        if locked.is_none() {
            db_tx.rollback().await.map_err(tx_err)?;
            return Ok(false);
        }

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

        let result = sqlx::query("DELETE FROM holders WHERE id = $1")
            .bind(id.get())
            .execute(&mut *db_tx)
            .await
            .map_err(db_err)?;

        db_tx.commit().await.map_err(tx_err)?;

        Ok(result.rows_affected() > 0)
    }
}
