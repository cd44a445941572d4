//! Response shapes produced by [`super::CaseService`].

use serde::Serialize;
use ventanilla_core::types::{DbId, Timestamp};
use ventanilla_db::models::pqrsd::{
    CaseHistoryEntry, CaseTypeCount, MonthlyCount, PqrsdCase, StatusCount,
};

/// Result of a successful submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseCreated {
    pub tracking_number: String,
    pub id: DbId,
}

/// What an anonymous citizen may see about a case.
///
/// Contact data, the submitter IP and staff identities are left out.
#[derive(Debug, Clone, Serialize)]
pub struct PublicCaseView {
    pub tracking_number: String,
    pub case_type: String,
    pub interest_group: String,
    pub status: String,
    pub subject: String,
    pub response_text: Option<String>,
    pub response_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub history: Vec<PublicHistoryEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PublicHistoryEntry {
    pub previous_status: Option<String>,
    pub new_status: String,
    pub notes: String,
    pub created_at: Timestamp,
}

impl PublicCaseView {
    pub fn new(case: PqrsdCase, history: Vec<CaseHistoryEntry>) -> Self {
        Self {
            tracking_number: case.tracking_number,
            case_type: case.case_type,
            interest_group: case.interest_group,
            status: case.status,
            subject: case.subject,
            response_text: case.response_text,
            response_at: case.response_at,
            created_at: case.created_at,
            history: history
                .into_iter()
                .map(|entry| PublicHistoryEntry {
                    previous_status: entry.previous_status,
                    new_status: entry.new_status,
                    notes: entry.notes,
                    created_at: entry.created_at,
                })
                .collect(),
        }
    }
}

/// A full case row plus its audit trail, for staff.
#[derive(Debug, Clone, Serialize)]
pub struct CaseDetail {
    #[serde(flatten)]
    pub case: PqrsdCase,
    pub history: Vec<CaseHistoryEntry>,
}

/// Aggregates served to anonymous visitors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicStats {
    pub total: i64,
    pub by_status: Vec<StatusCount>,
    pub monthly: Vec<MonthlyCount>,
}

/// Aggregates served to staff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaffStats {
    pub total: i64,
    pub by_status: Vec<StatusCount>,
    pub by_case_type: Vec<CaseTypeCount>,
}
