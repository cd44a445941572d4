//! Storage seams used by the case lifecycle and the auth handlers.
//!
//! [`CaseStore`] and [`AccountStore`] are object-safe so the API can hold
//! them as `Arc<dyn ...>` and tests can substitute in-memory doubles. The
//! PostgreSQL implementations delegate to the repositories.

use async_trait::async_trait;
use ventanilla_core::types::{DbId, Timestamp};

use crate::models::pqrsd::{
    CaseFilter, CaseHistoryEntry, CaseTypeCount, CaseUpdate, MonthlyCount, NewCase,
    NewHistoryEntry, PqrsdCase, StatusCount,
};
use crate::models::user::User;
use crate::repositories::{PqrsdRepo, UserRepo};
use crate::DbPool;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique constraint rejected the write.
    #[error("Duplicate value violates unique constraint: {constraint}")]
    Duplicate { constraint: String },

    /// The database could not be reached or the statement failed.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            // PostgreSQL unique constraint violation: error code 23505
            if db_err.code().as_deref() == Some("23505") {
                return StoreError::Duplicate {
                    constraint: db_err.constraint().unwrap_or("unknown").to_string(),
                };
            }
        }
        StoreError::Unavailable(err.to_string())
    }
}

/// Convenience alias for store results.
pub type StoreResult<T> = Result<T, StoreError>;

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Durable storage for cases and their append-only history.
#[async_trait]
pub trait CaseStore: Send + Sync {
    /// Whether any case already uses `tracking_number`.
    async fn tracking_number_exists(&self, tracking_number: &str) -> StoreResult<bool>;

    /// Insert a case together with its first history entry, atomically.
    ///
    /// Fails with [`StoreError::Duplicate`] if the tracking number is taken.
    async fn insert_case(&self, case: &NewCase, entry: &NewHistoryEntry)
        -> StoreResult<PqrsdCase>;

    async fn find_by_id(&self, id: DbId) -> StoreResult<Option<PqrsdCase>>;

    async fn find_by_tracking_number(&self, tracking_number: &str)
        -> StoreResult<Option<PqrsdCase>>;

    /// History of a case ordered oldest to newest.
    async fn history(&self, case_id: DbId) -> StoreResult<Vec<CaseHistoryEntry>>;

    /// Cases matching `filter`, newest first.
    async fn list(&self, filter: &CaseFilter) -> StoreResult<Vec<PqrsdCase>>;

    /// Apply `update` and append `entry` (when given), atomically.
    ///
    /// Returns `None` if the case does not exist.
    async fn apply_update(
        &self,
        id: DbId,
        update: &CaseUpdate,
        entry: Option<&NewHistoryEntry>,
    ) -> StoreResult<Option<PqrsdCase>>;

    async fn count_all(&self) -> StoreResult<i64>;

    async fn count_by_status(&self) -> StoreResult<Vec<StatusCount>>;

    async fn count_by_case_type(&self) -> StoreResult<Vec<CaseTypeCount>>;

    /// Cases created per calendar month since `since`, oldest month first.
    async fn count_by_month(&self, since: Timestamp) -> StoreResult<Vec<MonthlyCount>>;

    /// Verify the store is reachable.
    async fn health_check(&self) -> StoreResult<()>;
}

/// Lookup of staff accounts for login and per-request access checks.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_by_id(&self, id: DbId) -> StoreResult<Option<User>>;

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    async fn record_successful_login(&self, id: DbId) -> StoreResult<()>;
}

// ---------------------------------------------------------------------------
// PostgreSQL implementations
// ---------------------------------------------------------------------------

/// [`CaseStore`] backed by the PostgreSQL pool.
#[derive(Clone)]
pub struct PgCaseStore {
    pool: DbPool,
}

impl PgCaseStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CaseStore for PgCaseStore {
    async fn tracking_number_exists(&self, tracking_number: &str) -> StoreResult<bool> {
        Ok(PqrsdRepo::tracking_number_exists(&self.pool, tracking_number).await?)
    }

    async fn insert_case(
        &self,
        case: &NewCase,
        entry: &NewHistoryEntry,
    ) -> StoreResult<PqrsdCase> {
        Ok(PqrsdRepo::create_with_history(&self.pool, case, entry).await?)
    }

    async fn find_by_id(&self, id: DbId) -> StoreResult<Option<PqrsdCase>> {
        Ok(PqrsdRepo::find_by_id(&self.pool, id).await?)
    }

    async fn find_by_tracking_number(
        &self,
        tracking_number: &str,
    ) -> StoreResult<Option<PqrsdCase>> {
        Ok(PqrsdRepo::find_by_tracking_number(&self.pool, tracking_number).await?)
    }

    async fn history(&self, case_id: DbId) -> StoreResult<Vec<CaseHistoryEntry>> {
        Ok(PqrsdRepo::list_history(&self.pool, case_id).await?)
    }

    async fn list(&self, filter: &CaseFilter) -> StoreResult<Vec<PqrsdCase>> {
        Ok(PqrsdRepo::list(&self.pool, filter).await?)
    }

    async fn apply_update(
        &self,
        id: DbId,
        update: &CaseUpdate,
        entry: Option<&NewHistoryEntry>,
    ) -> StoreResult<Option<PqrsdCase>> {
        Ok(PqrsdRepo::update_with_history(&self.pool, id, update, entry).await?)
    }

    async fn count_all(&self) -> StoreResult<i64> {
        Ok(PqrsdRepo::count_all(&self.pool).await?)
    }

    async fn count_by_status(&self) -> StoreResult<Vec<StatusCount>> {
        Ok(PqrsdRepo::count_by_status(&self.pool).await?)
    }

    async fn count_by_case_type(&self) -> StoreResult<Vec<CaseTypeCount>> {
        Ok(PqrsdRepo::count_by_case_type(&self.pool).await?)
    }

    async fn count_by_month(&self, since: Timestamp) -> StoreResult<Vec<MonthlyCount>> {
        Ok(PqrsdRepo::count_by_month(&self.pool, since).await?)
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(crate::health_check(&self.pool).await?)
    }
}

/// [`AccountStore`] backed by the PostgreSQL pool.
#[derive(Clone)]
pub struct PgAccountStore {
    pool: DbPool,
}

impl PgAccountStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn find_by_id(&self, id: DbId) -> StoreResult<Option<User>> {
        Ok(UserRepo::find_by_id(&self.pool, id).await?)
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(UserRepo::find_by_username(&self.pool, username).await?)
    }

    async fn record_successful_login(&self, id: DbId) -> StoreResult<()> {
        Ok(UserRepo::record_successful_login(&self.pool, id).await?)
    }
}
