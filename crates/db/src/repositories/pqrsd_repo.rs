//! Repository for the `pqrsd_cases` and `pqrsd_case_history` tables.

use chrono::{Days, NaiveTime};
use sqlx::{PgConnection, PgPool};
use ventanilla_core::types::{DbId, Timestamp};

use crate::models::pqrsd::{
    CaseFilter, CaseHistoryEntry, CaseTypeCount, CaseUpdate, MonthlyCount, NewCase,
    NewHistoryEntry, PqrsdCase, StatusCount,
};

// ---------------------------------------------------------------------------
// Column lists
// ---------------------------------------------------------------------------

/// Column list for `pqrsd_cases` queries.
const COLUMNS: &str = "\
    id, tracking_number, case_type, interest_group, submitter_name, \
    submitter_document_id, submitter_email, submitter_phone, subject, description, \
    status, response_text, response_at, responder_id, submitter_ip, created_at, updated_at";

/// Column list for `pqrsd_case_history` queries.
const HISTORY_COLUMNS: &str = "id, case_id, previous_status, new_status, notes, actor_id, created_at";

// ---------------------------------------------------------------------------
// PqrsdRepo
// ---------------------------------------------------------------------------

/// Provides persistence operations for PQRSD cases and their history.
pub struct PqrsdRepo;

impl PqrsdRepo {
    /// Whether any case already uses `tracking_number`.
    pub async fn tracking_number_exists(
        pool: &PgPool,
        tracking_number: &str,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM pqrsd_cases WHERE tracking_number = $1)",
        )
        .bind(tracking_number)
        .fetch_one(pool)
        .await
    }

    /// Insert a case and its first history entry in one transaction.
    ///
    /// A duplicate tracking number surfaces as a unique violation on
    /// `uq_pqrsd_cases_tracking_number` and nothing is written.
    pub async fn create_with_history(
        pool: &PgPool,
        input: &NewCase,
        entry: &NewHistoryEntry,
    ) -> Result<PqrsdCase, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO pqrsd_cases
                (tracking_number, case_type, interest_group, submitter_name,
                 submitter_document_id, submitter_email, submitter_phone,
                 subject, description, submitter_ip)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {COLUMNS}"
        );
        let case = sqlx::query_as::<_, PqrsdCase>(&query)
            .bind(&input.tracking_number)
            .bind(&input.case_type)
            .bind(&input.interest_group)
            .bind(&input.submitter_name)
            .bind(&input.submitter_document_id)
            .bind(&input.submitter_email)
            .bind(&input.submitter_phone)
            .bind(&input.subject)
            .bind(&input.description)
            .bind(&input.submitter_ip)
            .fetch_one(&mut *tx)
            .await?;

        Self::insert_history(&mut tx, case.id, entry).await?;
        tx.commit().await?;
        Ok(case)
    }

    /// Find a case by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<PqrsdCase>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM pqrsd_cases WHERE id = $1");
        sqlx::query_as::<_, PqrsdCase>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a case by its public tracking number.
    pub async fn find_by_tracking_number(
        pool: &PgPool,
        tracking_number: &str,
    ) -> Result<Option<PqrsdCase>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM pqrsd_cases WHERE tracking_number = $1");
        sqlx::query_as::<_, PqrsdCase>(&query)
            .bind(tracking_number)
            .fetch_optional(pool)
            .await
    }

    /// History of a case, oldest first.
    pub async fn list_history(
        pool: &PgPool,
        case_id: DbId,
    ) -> Result<Vec<CaseHistoryEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {HISTORY_COLUMNS} FROM pqrsd_case_history
             WHERE case_id = $1
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, CaseHistoryEntry>(&query)
            .bind(case_id)
            .fetch_all(pool)
            .await
    }

    /// List cases matching `filter`, newest first.
    ///
    /// Without a `limit` every matching row is returned.
    pub async fn list(pool: &PgPool, filter: &CaseFilter) -> Result<Vec<PqrsdCase>, sqlx::Error> {
        let (where_clause, bind_values, mut bind_idx) = build_case_filter(filter);

        let mut query = format!(
            "SELECT {COLUMNS} FROM pqrsd_cases {where_clause} ORDER BY created_at DESC, id DESC"
        );
        if filter.limit.is_some() {
            query.push_str(&format!(" LIMIT ${bind_idx}"));
            bind_idx += 1;
        }
        if filter.offset.is_some() {
            query.push_str(&format!(" OFFSET ${bind_idx}"));
        }

        let mut q = sqlx::query_as::<_, PqrsdCase>(&query);
        for val in &bind_values {
            q = match val {
                BindValue::Text(v) => q.bind(v.as_str()),
                BindValue::Timestamp(v) => q.bind(*v),
            };
        }
        if let Some(limit) = filter.limit {
            q = q.bind(limit.max(1));
        }
        if let Some(offset) = filter.offset {
            q = q.bind(offset.max(0));
        }
        q.fetch_all(pool).await
    }

    /// Apply a staff update and, optionally, append a history entry, in one
    /// transaction. Returns `None` if the case does not exist.
    pub async fn update_with_history(
        pool: &PgPool,
        id: DbId,
        update: &CaseUpdate,
        entry: Option<&NewHistoryEntry>,
    ) -> Result<Option<PqrsdCase>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE pqrsd_cases SET
                status = $2,
                response_text = COALESCE($3, response_text),
                response_at = COALESCE($4, response_at),
                responder_id = CASE WHEN $4 IS NULL THEN responder_id ELSE $5 END,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, PqrsdCase>(&query)
            .bind(id)
            .bind(&update.status)
            .bind(&update.response_text)
            .bind(update.responded_at)
            .bind(update.responder_id)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(case) = updated else {
            return Ok(None);
        };

        if let Some(entry) = entry {
            Self::insert_history(&mut tx, case.id, entry).await?;
        }
        tx.commit().await?;
        Ok(Some(case))
    }

    /// Total number of cases.
    pub async fn count_all(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*)::BIGINT FROM pqrsd_cases")
            .fetch_one(pool)
            .await
    }

    /// Case counts grouped by status.
    pub async fn count_by_status(pool: &PgPool) -> Result<Vec<StatusCount>, sqlx::Error> {
        sqlx::query_as::<_, StatusCount>(
            "SELECT status, COUNT(*)::BIGINT AS count FROM pqrsd_cases
             GROUP BY status ORDER BY status",
        )
        .fetch_all(pool)
        .await
    }

    /// Case counts grouped by case type.
    pub async fn count_by_case_type(pool: &PgPool) -> Result<Vec<CaseTypeCount>, sqlx::Error> {
        sqlx::query_as::<_, CaseTypeCount>(
            "SELECT case_type, COUNT(*)::BIGINT AS count FROM pqrsd_cases
             GROUP BY case_type ORDER BY case_type",
        )
        .fetch_all(pool)
        .await
    }

    /// Cases created per UTC calendar month since `since`, oldest month first.
    pub async fn count_by_month(
        pool: &PgPool,
        since: Timestamp,
    ) -> Result<Vec<MonthlyCount>, sqlx::Error> {
        sqlx::query_as::<_, MonthlyCount>(
            "SELECT to_char(date_trunc('month', created_at AT TIME ZONE 'UTC'), 'YYYY-MM') AS month,
                    COUNT(*)::BIGINT AS count
             FROM pqrsd_cases
             WHERE created_at >= $1
             GROUP BY 1
             ORDER BY 1",
        )
        .bind(since)
        .fetch_all(pool)
        .await
    }

    async fn insert_history(
        conn: &mut PgConnection,
        case_id: DbId,
        entry: &NewHistoryEntry,
    ) -> Result<CaseHistoryEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO pqrsd_case_history (case_id, previous_status, new_status, notes, actor_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {HISTORY_COLUMNS}"
        );
        sqlx::query_as::<_, CaseHistoryEntry>(&query)
            .bind(case_id)
            .bind(&entry.previous_status)
            .bind(&entry.new_status)
            .bind(&entry.notes)
            .bind(entry.actor_id)
            .fetch_one(conn)
            .await
    }
}

// ---------------------------------------------------------------------------
// Internal helpers for dynamic query building
// ---------------------------------------------------------------------------

/// Typed bind value for dynamically-built case queries.
enum BindValue {
    Text(String),
    Timestamp(Timestamp),
}

/// Build a WHERE clause and bind values from `CaseFilter` parameters.
///
/// Returns `(where_clause, bind_values, next_bind_index)`.
/// The `where_clause` is empty if no filters are active, or starts with `WHERE `.
fn build_case_filter(filter: &CaseFilter) -> (String, Vec<BindValue>, u32) {
    let mut conditions: Vec<String> = Vec::new();
    let mut bind_idx = 1u32;
    let mut bind_values: Vec<BindValue> = Vec::new();

    if let Some(ref case_type) = filter.case_type {
        conditions.push(format!("case_type = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Text(case_type.clone()));
    }

    if let Some(ref status) = filter.status {
        conditions.push(format!("status = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Text(status.clone()));
    }

    if let Some(ref interest_group) = filter.interest_group {
        conditions.push(format!("interest_group = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Text(interest_group.clone()));
    }

    if let Some(from) = filter.from {
        conditions.push(format!("created_at >= ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Timestamp(from.and_time(NaiveTime::MIN).and_utc()));
    }

    if let Some(to) = filter.to {
        // Inclusive end date: everything before midnight of the following day.
        if let Some(next_day) = to.checked_add_days(Days::new(1)) {
            conditions.push(format!("created_at < ${bind_idx}"));
            bind_idx += 1;
            bind_values.push(BindValue::Timestamp(next_day.and_time(NaiveTime::MIN).and_utc()));
        }
    }

    if let Some(ref search) = filter.search {
        let search = search.trim();
        if !search.is_empty() {
            conditions.push(format!(
                "(submitter_name ILIKE ${bind_idx} ESCAPE '\\' \
                 OR submitter_email ILIKE ${bind_idx} ESCAPE '\\' \
                 OR tracking_number ILIKE ${bind_idx} ESCAPE '\\' \
                 OR subject ILIKE ${bind_idx} ESCAPE '\\')"
            ));
            bind_idx += 1;
            bind_values.push(BindValue::Text(format!("%{}%", escape_like(search))));
        }
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    (where_clause, bind_values, bind_idx)
}

/// Escape `LIKE` metacharacters so `value` only matches itself.
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
