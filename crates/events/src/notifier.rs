//! Case notifications: the [`CaseNotifier`] seam and its email implementation.
//!
//! Notifiers never return errors. A failed or skipped delivery is reported
//! as `NotifyOutcome { sent: false }` and logged here.

use async_trait::async_trait;
use ventanilla_core::pqrsd::{CaseStatus, CaseType};
use ventanilla_core::types::{DbId, Timestamp};

use crate::delivery::email::{EmailDelivery, OutgoingEmail};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Snapshot of the case fields a notification needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseNotice {
    pub case_id: DbId,
    pub tracking_number: String,
    pub case_type: CaseType,
    pub status: CaseStatus,
    pub submitter_name: String,
    pub submitter_email: String,
    pub subject: String,
    pub response_text: Option<String>,
    pub created_at: Timestamp,
}

/// Result of a notification attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotifyOutcome {
    pub sent: bool,
}

impl NotifyOutcome {
    pub const SENT: NotifyOutcome = NotifyOutcome { sent: true };
    pub const NOT_SENT: NotifyOutcome = NotifyOutcome { sent: false };
}

/// Sends case notifications to citizens.
#[async_trait]
pub trait CaseNotifier: Send + Sync {
    /// Acknowledge a newly filed case to its submitter.
    async fn notify_created(&self, notice: &CaseNotice) -> NotifyOutcome;

    /// Deliver the staff response of a resolved case to its submitter.
    async fn notify_resolved(&self, notice: &CaseNotice) -> NotifyOutcome;
}

// ---------------------------------------------------------------------------
// EmailCaseNotifier
// ---------------------------------------------------------------------------

/// [`CaseNotifier`] that sends plain-text emails over SMTP.
///
/// Without a mailer every call returns `sent: false` immediately.
pub struct EmailCaseNotifier {
    mailer: Option<EmailDelivery>,
    staff_inbox: Option<String>,
}

impl EmailCaseNotifier {
    /// `staff_inbox`, when set, also receives a summary of each new case.
    pub fn new(mailer: Option<EmailDelivery>, staff_inbox: Option<String>) -> Self {
        Self {
            mailer,
            staff_inbox,
        }
    }

    /// A notifier with no transport. Every notification is skipped.
    pub fn unconfigured() -> Self {
        Self::new(None, None)
    }

    pub fn is_configured(&self) -> bool {
        self.mailer.is_some()
    }

    async fn deliver(&self, email: &OutgoingEmail, tracking_number: &str) -> NotifyOutcome {
        let Some(mailer) = &self.mailer else {
            tracing::debug!(tracking_number, "Email not configured, skipping notification");
            return NotifyOutcome::NOT_SENT;
        };
        match mailer.send(email).await {
            Ok(()) => NotifyOutcome::SENT,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    tracking_number,
                    to = %email.to,
                    "Notification email failed"
                );
                NotifyOutcome::NOT_SENT
            }
        }
    }
}

#[async_trait]
impl CaseNotifier for EmailCaseNotifier {
    async fn notify_created(&self, notice: &CaseNotice) -> NotifyOutcome {
        let outcome = self
            .deliver(&render_created(notice), &notice.tracking_number)
            .await;

        if let (Some(inbox), true) = (&self.staff_inbox, self.is_configured()) {
            // The staff copy does not affect the reported outcome.
            self.deliver(&render_staff_copy(notice, inbox), &notice.tracking_number)
                .await;
        }
        outcome
    }

    async fn notify_resolved(&self, notice: &CaseNotice) -> NotifyOutcome {
        self.deliver(&render_resolved(notice), &notice.tracking_number)
            .await
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Acknowledgement sent to the submitter when a case is filed.
pub fn render_created(notice: &CaseNotice) -> OutgoingEmail {
    OutgoingEmail {
        to: notice.submitter_email.clone(),
        subject: format!("Radicado {}: hemos recibido su solicitud", notice.tracking_number),
        body: format!(
            "Estimado(a) {name},\n\n\
             Hemos recibido su {kind} \"{subject}\" el {date} con el número de radicado {tracking}.\n\
             Puede consultar el estado de su solicitud en cualquier momento con este número.\n\n\
             Estado actual: {status}\n",
            name = notice.submitter_name,
            kind = notice.case_type.label().to_lowercase(),
            subject = notice.subject,
            date = notice.created_at.format("%Y-%m-%d"),
            tracking = notice.tracking_number,
            status = notice.status.label(),
        ),
    }
}

/// Response sent to the submitter when staff resolve a case.
pub fn render_resolved(notice: &CaseNotice) -> OutgoingEmail {
    OutgoingEmail {
        to: notice.submitter_email.clone(),
        subject: format!("Radicado {}: respuesta a su solicitud", notice.tracking_number),
        body: format!(
            "Estimado(a) {name},\n\n\
             Su solicitud \"{subject}\" (radicado {tracking}) ha sido respondida.\n\n\
             Respuesta:\n{response}\n\n\
             Estado actual: {status}\n",
            name = notice.submitter_name,
            subject = notice.subject,
            tracking = notice.tracking_number,
            response = notice.response_text.as_deref().unwrap_or_default(),
            status = notice.status.label(),
        ),
    }
}

/// Summary of a new case for the staff inbox.
pub fn render_staff_copy(notice: &CaseNotice, inbox: &str) -> OutgoingEmail {
    OutgoingEmail {
        to: inbox.to_string(),
        subject: format!(
            "Nuevo radicado {} ({})",
            notice.tracking_number,
            notice.case_type.label()
        ),
        body: format!(
            "Radicado: {tracking}\nTipo: {kind}\nAsunto: {subject}\nSolicitante: {name} <{email}>\n",
            tracking = notice.tracking_number,
            kind = notice.case_type.label(),
            subject = notice.subject,
            name = notice.submitter_name,
            email = notice.submitter_email,
        ),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
