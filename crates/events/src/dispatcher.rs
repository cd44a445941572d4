//! Fire-and-forget delivery of case notifications.
//!
//! [`NotificationDispatcher::dispatch`] spawns the notifier call on its own
//! task and returns immediately. The outcome is logged by that task and is
//! never propagated to the request that triggered it.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::notifier::{CaseNotice, CaseNotifier, NotifyOutcome};

/// A one-way message to the notifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaseNotification {
    /// A citizen filed a new case.
    Created(CaseNotice),
    /// Staff resolved a case with a response.
    Resolved(CaseNotice),
}

impl CaseNotification {
    pub fn kind(&self) -> &'static str {
        match self {
            CaseNotification::Created(_) => "created",
            CaseNotification::Resolved(_) => "resolved",
        }
    }

    pub fn notice(&self) -> &CaseNotice {
        match self {
            CaseNotification::Created(n) | CaseNotification::Resolved(n) => n,
        }
    }
}

/// Hands notifications to a [`CaseNotifier`] without waiting for them.
///
/// Cheap to clone; clones share the notifier.
#[derive(Clone)]
pub struct NotificationDispatcher {
    notifier: Arc<dyn CaseNotifier>,
}

impl NotificationDispatcher {
    pub fn new(notifier: Arc<dyn CaseNotifier>) -> Self {
        Self { notifier }
    }

    /// Send `notification` on a background task.
    ///
    /// Must be called from within a Tokio runtime. The returned handle may
    /// be dropped; the task runs to completion regardless.
    pub fn dispatch(&self, notification: CaseNotification) -> JoinHandle<NotifyOutcome> {
        let notifier = Arc::clone(&self.notifier);
        tokio::spawn(async move {
            let outcome = match &notification {
                CaseNotification::Created(notice) => notifier.notify_created(notice).await,
                CaseNotification::Resolved(notice) => notifier.notify_resolved(notice).await,
            };
            let notice = notification.notice();
            tracing::info!(
                case_id = notice.case_id,
                tracking_number = %notice.tracking_number,
                kind = notification.kind(),
                sent = outcome.sent,
                "Case notification processed"
            );
            outcome
        })
    }
}
