use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use ventanilla_core::error::CoreError;
use ventanilla_core::pqrsd::{
    check_transition, non_blank, CaseStatus, CaseSubmission, CaseType, CREATED_NOTE,
};
use ventanilla_core::tracking::{self, TrackingNumberGenerator};
use ventanilla_core::types::DbId;
use ventanilla_db::models::pqrsd::{CaseFilter, CaseUpdate, NewCase, NewHistoryEntry, PqrsdCase};
use ventanilla_db::{CaseStore, StoreError};
use ventanilla_events::{CaseNotice, CaseNotification, NotificationDispatcher};

use super::stats::{fill_case_types, fill_months, fill_statuses, month_window, STATS_MONTHS};
use super::views::{CaseCreated, CaseDetail, PublicCaseView, PublicStats, StaffStats};
use crate::error::{AppError, AppResult};

/// Upper bound applied to a requested list `limit`.
pub const MAX_LIST_LIMIT: i64 = 500;

/// Body of `PUT /pqrsd/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct TransitionRequest {
    /// Target status. A missing value is rejected like an unknown one.
    #[serde(default)]
    pub status: String,
    pub response_text: Option<String>,
    /// Free text for the audit entry. Defaults to a description of the change.
    pub notes: Option<String>,
}

/// Case lifecycle operations over a [`CaseStore`].
///
/// Notifications are handed to the [`NotificationDispatcher`] and never
/// awaited; their outcome cannot change the result of an operation.
pub struct CaseService {
    store: Arc<dyn CaseStore>,
    generator: TrackingNumberGenerator,
    max_attempts: u32,
    dispatcher: NotificationDispatcher,
}

impl CaseService {
    pub fn new(
        store: Arc<dyn CaseStore>,
        generator: TrackingNumberGenerator,
        max_attempts: u32,
        dispatcher: NotificationDispatcher,
    ) -> Self {
        Self {
            store,
            generator,
            max_attempts: max_attempts.max(1),
            dispatcher,
        }
    }

    /// Whether the backing store answers.
    pub async fn store_healthy(&self) -> bool {
        self.store.health_check().await.is_ok()
    }

    // -----------------------------------------------------------------------
    // Citizen operations
    // -----------------------------------------------------------------------

    /// File a new case.
    ///
    /// Validation happens before anything is written. The tracking number is
    /// probed for existence and then inserted; a unique-key rejection from a
    /// concurrent insert is treated like a taken number and retried, up to
    /// the configured attempt budget.
    pub async fn create(
        &self,
        submission: &CaseSubmission,
        submitter_ip: Option<String>,
    ) -> AppResult<CaseCreated> {
        let valid = submission.validate()?;

        let entry = NewHistoryEntry {
            previous_status: None,
            new_status: CaseStatus::Pending.as_str().to_string(),
            notes: CREATED_NOTE.to_string(),
            actor_id: None,
        };

        for attempt in 0..self.max_attempts {
            let tracking_number = self.generator.generate_at(Utc::now(), attempt);

            if self.store.tracking_number_exists(&tracking_number).await? {
                tracing::debug!(%tracking_number, attempt, "Tracking number taken, retrying");
                continue;
            }

            let new_case = NewCase {
                tracking_number: tracking_number.clone(),
                case_type: valid.case_type.as_str().to_string(),
                interest_group: valid.interest_group.clone(),
                submitter_name: valid.submitter_name.clone(),
                submitter_document_id: valid.submitter_document_id.clone(),
                submitter_email: valid.submitter_email.clone(),
                submitter_phone: valid.submitter_phone.clone(),
                subject: valid.subject.clone(),
                description: valid.description.clone(),
                submitter_ip: submitter_ip.clone(),
            };

            let case = match self.store.insert_case(&new_case, &entry).await {
                Ok(case) => case,
                Err(StoreError::Duplicate { constraint }) => {
                    tracing::debug!(%tracking_number, attempt, %constraint, "Tracking number raced, retrying");
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            tracing::info!(
                case_id = case.id,
                tracking_number = %case.tracking_number,
                case_type = %case.case_type,
                "Case created"
            );

            self.dispatcher.dispatch(CaseNotification::Created(notice(
                &case,
                valid.case_type,
                CaseStatus::Pending,
            )));

            return Ok(CaseCreated {
                tracking_number: case.tracking_number,
                id: case.id,
            });
        }

        tracing::error!(attempts = self.max_attempts, "No free tracking number found");
        Err(CoreError::GenerationExhausted {
            attempts: self.max_attempts,
        }
        .into())
    }

    /// Public view of a case and its history, by tracking number.
    ///
    /// Surrounding whitespace and letter case in the input are ignored.
    pub async fn lookup(&self, tracking_number: &str) -> AppResult<PublicCaseView> {
        let tracking_number = tracking::normalize(tracking_number);
        let case = self
            .store
            .find_by_tracking_number(&tracking_number)
            .await?
            .ok_or_else(|| CoreError::not_found("Case", &tracking_number))?;
        let history = self.store.history(case.id).await?;
        Ok(PublicCaseView::new(case, history))
    }

    /// Case counts by status and per month over the last [`STATS_MONTHS`].
    pub async fn public_stats(&self) -> AppResult<PublicStats> {
        let (since, labels) = month_window(Utc::now(), STATS_MONTHS)
            .ok_or_else(|| CoreError::Internal("Statistics window out of range".into()))?;

        let total = self.store.count_all().await?;
        let by_status = self.store.count_by_status().await?;
        let monthly = self.store.count_by_month(since).await?;

        Ok(PublicStats {
            total,
            by_status: fill_statuses(&by_status),
            monthly: fill_months(&labels, &monthly),
        })
    }

    // -----------------------------------------------------------------------
    // Staff operations
    // -----------------------------------------------------------------------

    /// Cases matching `filter`, newest first.
    ///
    /// `case_type` and `status` filters must name known values. `limit` is
    /// clamped to `1..=MAX_LIST_LIMIT`; without it every match is returned.
    pub async fn list(&self, mut filter: CaseFilter) -> AppResult<Vec<PqrsdCase>> {
        if let Some(raw) = non_blank(filter.case_type.as_deref()) {
            raw.parse::<CaseType>()?;
        }
        if let Some(raw) = non_blank(filter.status.as_deref()) {
            raw.parse::<CaseStatus>()?;
        }
        if let (Some(from), Some(to)) = (filter.from, filter.to) {
            if from > to {
                return Err(AppError::BadRequest(format!(
                    "'from' ({from}) must not be after 'to' ({to})"
                )));
            }
        }

        filter.case_type = trimmed(filter.case_type);
        filter.status = trimmed(filter.status);
        filter.interest_group = trimmed(filter.interest_group);
        filter.search = trimmed(filter.search);
        filter.limit = filter.limit.map(|l| l.clamp(1, MAX_LIST_LIMIT));
        filter.offset = filter.offset.map(|o| o.max(0));

        Ok(self.store.list(&filter).await?)
    }

    /// A full case row with its audit trail.
    pub async fn get(&self, id: DbId) -> AppResult<CaseDetail> {
        let case = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(|| CoreError::not_found("Case", id))?;
        let history = self.store.history(case.id).await?;
        Ok(CaseDetail { case, history })
    }

    /// Move a case to a new status on behalf of `actor_id`.
    ///
    /// The row is always updated. An audit entry is appended only when the
    /// status actually changes. Resolving with a response stamps
    /// `response_at` and the responder, then notifies the citizen.
    /// Concurrent transitions on one case are last-write-wins.
    pub async fn transition(
        &self,
        id: DbId,
        request: &TransitionRequest,
        actor_id: DbId,
    ) -> AppResult<PqrsdCase> {
        let new_status: CaseStatus = request.status.trim().parse()?;

        let current = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(|| CoreError::not_found("Case", id))?;
        let previous_status: CaseStatus = current.status.parse().map_err(|_| {
            CoreError::Internal(format!(
                "Case {id} has unrecognized stored status '{}'",
                current.status
            ))
        })?;
        check_transition(previous_status, new_status)?;

        let response_text = non_blank(request.response_text.as_deref()).map(str::to_string);
        let resolving = new_status == CaseStatus::Resolved && response_text.is_some();

        let update = CaseUpdate {
            status: new_status.as_str().to_string(),
            response_text,
            responded_at: resolving.then(Utc::now),
            responder_id: resolving.then_some(actor_id),
        };

        let entry = (previous_status != new_status).then(|| NewHistoryEntry {
            previous_status: Some(previous_status.as_str().to_string()),
            new_status: new_status.as_str().to_string(),
            notes: non_blank(request.notes.as_deref())
                .map(str::to_string)
                .unwrap_or_else(|| {
                    format!(
                        "status changed from {} to {}",
                        previous_status.as_str(),
                        new_status.as_str()
                    )
                }),
            actor_id: Some(actor_id),
        });

        let updated = self
            .store
            .apply_update(id, &update, entry.as_ref())
            .await?
            .ok_or_else(|| CoreError::not_found("Case", id))?;

        tracing::info!(
            case_id = updated.id,
            tracking_number = %updated.tracking_number,
            previous_status = previous_status.as_str(),
            status = new_status.as_str(),
            actor_id,
            audited = entry.is_some(),
            "Case updated"
        );

        if resolving {
            match updated.case_type.parse::<CaseType>() {
                Ok(case_type) => {
                    self.dispatcher.dispatch(CaseNotification::Resolved(notice(
                        &updated, case_type, new_status,
                    )));
                }
                Err(_) => tracing::warn!(
                    case_id = updated.id,
                    case_type = %updated.case_type,
                    "Unrecognized case type, resolution notice skipped"
                ),
            }
        }

        Ok(updated)
    }

    /// Case counts by status and by case type.
    pub async fn staff_stats(&self) -> AppResult<StaffStats> {
        let total = self.store.count_all().await?;
        let by_status = self.store.count_by_status().await?;
        let by_case_type = self.store.count_by_case_type().await?;

        Ok(StaffStats {
            total,
            by_status: fill_statuses(&by_status),
            by_case_type: fill_case_types(&by_case_type),
        })
    }
}

fn notice(case: &PqrsdCase, case_type: CaseType, status: CaseStatus) -> CaseNotice {
    CaseNotice {
        case_id: case.id,
        tracking_number: case.tracking_number.clone(),
        case_type,
        status,
        submitter_name: case.submitter_name.clone(),
        submitter_email: case.submitter_email.clone(),
        subject: case.subject.clone(),
        response_text: case.response_text.clone(),
        created_at: case.created_at,
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    non_blank(value.as_deref()).map(str::to_string)
}
