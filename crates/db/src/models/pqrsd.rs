//! PQRSD case and case-history models.
//!
//! `status` and `case_type` are stored as text and parsed into
//! [`ventanilla_core::pqrsd`] enums by the lifecycle layer.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ventanilla_core::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// A row from the `pqrsd_cases` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PqrsdCase {
    pub id: DbId,
    pub tracking_number: String,
    pub case_type: String,
    pub interest_group: String,
    pub submitter_name: String,
    pub submitter_document_id: String,
    pub submitter_email: String,
    pub submitter_phone: Option<String>,
    pub subject: String,
    pub description: String,
    pub status: String,
    pub response_text: Option<String>,
    pub response_at: Option<Timestamp>,
    pub responder_id: Option<DbId>,
    pub submitter_ip: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the append-only `pqrsd_case_history` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CaseHistoryEntry {
    pub id: DbId,
    pub case_id: DbId,
    pub previous_status: Option<String>,
    pub new_status: String,
    pub notes: String,
    pub actor_id: Option<DbId>,
    pub created_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Write DTOs
// ---------------------------------------------------------------------------

/// Insert DTO for a new case. The status is always `pending`.
#[derive(Debug, Clone)]
pub struct NewCase {
    pub tracking_number: String,
    pub case_type: String,
    pub interest_group: String,
    pub submitter_name: String,
    pub submitter_document_id: String,
    pub submitter_email: String,
    pub submitter_phone: Option<String>,
    pub subject: String,
    pub description: String,
    pub submitter_ip: Option<String>,
}

/// Insert DTO for a history entry. `case_id` is supplied by the store.
#[derive(Debug, Clone)]
pub struct NewHistoryEntry {
    pub previous_status: Option<String>,
    pub new_status: String,
    pub notes: String,
    pub actor_id: Option<DbId>,
}

/// Status update applied by staff.
///
/// `response_text` is only written when present. `responded_at` and
/// `responder_id` are only written when `responded_at` is present.
#[derive(Debug, Clone)]
pub struct CaseUpdate {
    pub status: String,
    pub response_text: Option<String>,
    pub responded_at: Option<Timestamp>,
    pub responder_id: Option<DbId>,
}

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

/// Filter parameters for listing cases (`GET /pqrsd`).
///
/// Dates are inclusive calendar days in UTC. `search` matches submitter
/// name, submitter email, tracking number and subject, case-insensitively.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CaseFilter {
    pub case_type: Option<String>,
    pub status: Option<String>,
    pub interest_group: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

// ---------------------------------------------------------------------------
// Aggregates
// ---------------------------------------------------------------------------

/// Number of cases in a given status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}

/// Number of cases of a given type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct CaseTypeCount {
    pub case_type: String,
    pub count: i64,
}

/// Number of cases created in a calendar month (`YYYY-MM`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct MonthlyCount {
    pub month: String,
    pub count: i64,
}
