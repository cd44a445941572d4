//! PQRSD case rules: case types, statuses, submission validation and the
//! status transition policy.
//!
//! PQRSD stands for *peticiones, quejas, reclamos, sugerencias y denuncias*,
//! the petitions, complaints, claims, suggestions and reports citizens file
//! with the municipality.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use validator::ValidateEmail;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Validation constants
// ---------------------------------------------------------------------------

/// Interest group assigned when the submitter does not provide one.
pub const DEFAULT_INTEREST_GROUP: &str = "general";

/// Maximum length for the subject line (characters).
pub const MAX_SUBJECT_LENGTH: usize = 255;

/// Maximum length for the description body (characters).
pub const MAX_DESCRIPTION_LENGTH: usize = 10_000;

/// Maximum length for the interest group tag (characters).
pub const MAX_INTEREST_GROUP_LENGTH: usize = 100;

/// Audit note recorded for the first history entry of every case.
pub const CREATED_NOTE: &str = "case created";

// ---------------------------------------------------------------------------
// CaseType
// ---------------------------------------------------------------------------

/// The kind of request a citizen files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseType {
    Petition,
    Complaint,
    Claim,
    Suggestion,
    Report,
}

impl CaseType {
    pub const ALL: [CaseType; 5] = [
        CaseType::Petition,
        CaseType::Complaint,
        CaseType::Claim,
        CaseType::Suggestion,
        CaseType::Report,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CaseType::Petition => "petition",
            CaseType::Complaint => "complaint",
            CaseType::Claim => "claim",
            CaseType::Suggestion => "suggestion",
            CaseType::Report => "report",
        }
    }

    /// Citizen-facing label used in notification emails.
    pub fn label(&self) -> &'static str {
        match self {
            CaseType::Petition => "Petición",
            CaseType::Complaint => "Queja",
            CaseType::Claim => "Reclamo",
            CaseType::Suggestion => "Sugerencia",
            CaseType::Report => "Denuncia",
        }
    }
}

impl fmt::Display for CaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CaseType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CaseType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid case_type '{s}'. Must be one of: {}",
                    join_names(CaseType::ALL.iter().map(CaseType::as_str))
                ))
            })
    }
}

// ---------------------------------------------------------------------------
// CaseStatus
// ---------------------------------------------------------------------------

/// Workflow status of a case. New cases always start as [`CaseStatus::Pending`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    Pending,
    InProgress,
    Resolved,
    Closed,
}

impl CaseStatus {
    pub const ALL: [CaseStatus; 4] = [
        CaseStatus::Pending,
        CaseStatus::InProgress,
        CaseStatus::Resolved,
        CaseStatus::Closed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CaseStatus::Pending => "pending",
            CaseStatus::InProgress => "in_progress",
            CaseStatus::Resolved => "resolved",
            CaseStatus::Closed => "closed",
        }
    }

    /// Citizen-facing label used in notification emails.
    pub fn label(&self) -> &'static str {
        match self {
            CaseStatus::Pending => "Pendiente",
            CaseStatus::InProgress => "En trámite",
            CaseStatus::Resolved => "Resuelta",
            CaseStatus::Closed => "Cerrada",
        }
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CaseStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CaseStatus::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| {
                CoreError::InvalidState(format!(
                    "Invalid status '{s}'. Must be one of: {}",
                    join_names(CaseStatus::ALL.iter().map(CaseStatus::as_str))
                ))
            })
    }
}

// ---------------------------------------------------------------------------
// Transition policy
// ---------------------------------------------------------------------------

/// Whether staff may move a case from `from` to `to`.
///
/// The nominal workflow is `pending -> in_progress -> resolved -> closed`,
/// but staff may set any status from any status. Tightening the workflow
/// only requires changing this function.
pub fn transition_allowed(_from: CaseStatus, _to: CaseStatus) -> bool {
    true
}

/// Validate a requested transition against [`transition_allowed`].
pub fn check_transition(from: CaseStatus, to: CaseStatus) -> Result<(), CoreError> {
    if transition_allowed(from, to) {
        Ok(())
    } else {
        Err(CoreError::InvalidState(format!(
            "Cannot transition case from '{from}' to '{to}'"
        )))
    }
}

// ---------------------------------------------------------------------------
// Submission validation
// ---------------------------------------------------------------------------

/// Raw citizen submission as received from the public form.
///
/// Required fields default to empty strings so that a missing field is
/// reported by [`CaseSubmission::validate`] together with every other
/// problem, instead of failing deserialization on the first one.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CaseSubmission {
    #[serde(default)]
    pub case_type: String,
    pub interest_group: Option<String>,
    #[serde(default)]
    pub submitter_name: String,
    #[serde(default)]
    pub submitter_document_id: String,
    #[serde(default)]
    pub submitter_email: String,
    pub submitter_phone: Option<String>,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub description: String,
}

/// A submission that passed validation, trimmed and normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidSubmission {
    pub case_type: CaseType,
    pub interest_group: String,
    pub submitter_name: String,
    pub submitter_document_id: String,
    pub submitter_email: String,
    pub submitter_phone: Option<String>,
    pub subject: String,
    pub description: String,
}

impl CaseSubmission {
    /// Check every field and return the normalized submission.
    ///
    /// All problems are collected into a single [`CoreError::Validation`]
    /// whose message names each offending field.
    pub fn validate(&self) -> Result<ValidSubmission, CoreError> {
        let mut problems: Vec<String> = Vec::new();

        let required = [
            ("case_type", self.case_type.trim()),
            ("submitter_name", self.submitter_name.trim()),
            ("submitter_document_id", self.submitter_document_id.trim()),
            ("submitter_email", self.submitter_email.trim()),
            ("subject", self.subject.trim()),
            ("description", self.description.trim()),
        ];
        for (field, value) in required {
            if value.is_empty() {
                problems.push(format!("{field} is required"));
            }
        }

        let case_type = match self.case_type.trim() {
            "" => None,
            raw => match raw.parse::<CaseType>() {
                Ok(t) => Some(t),
                Err(CoreError::Validation(msg)) => {
                    problems.push(msg);
                    None
                }
                Err(other) => return Err(other),
            },
        };

        let email = self.submitter_email.trim();
        if !email.is_empty() && !email.validate_email() {
            problems.push(format!("submitter_email '{email}' is not a valid address"));
        }

        let subject = self.subject.trim();
        if subject.chars().count() > MAX_SUBJECT_LENGTH {
            problems.push(format!(
                "subject exceeds maximum length of {MAX_SUBJECT_LENGTH} characters"
            ));
        }

        let description = self.description.trim();
        if description.chars().count() > MAX_DESCRIPTION_LENGTH {
            problems.push(format!(
                "description exceeds maximum length of {MAX_DESCRIPTION_LENGTH} characters"
            ));
        }

        let interest_group = non_blank(self.interest_group.as_deref())
            .unwrap_or(DEFAULT_INTEREST_GROUP)
            .to_string();
        if interest_group.chars().count() > MAX_INTEREST_GROUP_LENGTH {
            problems.push(format!(
                "interest_group exceeds maximum length of {MAX_INTEREST_GROUP_LENGTH} characters"
            ));
        }

        match case_type {
            Some(case_type) if problems.is_empty() => Ok(ValidSubmission {
                case_type,
                interest_group,
                submitter_name: self.submitter_name.trim().to_string(),
                submitter_document_id: self.submitter_document_id.trim().to_string(),
                submitter_email: email.to_string(),
                submitter_phone: non_blank(self.submitter_phone.as_deref()).map(str::to_string),
                subject: subject.to_string(),
                description: description.to_string(),
            }),
            _ => Err(CoreError::Validation(problems.join("; "))),
        }
    }
}

/// Trim an optional string, treating blank values as absent.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn join_names<'a>(names: impl Iterator<Item = &'a str>) -> String {
    names.collect::<Vec<_>>().join(", ")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
