//! Outbound notifications for the citizen-services portal.
//!
//! - [`delivery`] -- SMTP transport ([`EmailDelivery`]).
//! - [`notifier`] -- the [`CaseNotifier`] seam, the email-backed notifier
//!   and message rendering for PQRSD cases.
//! - [`dispatcher`] -- [`NotificationDispatcher`], which hands a
//!   notification to the notifier on its own task and never reports back
//!   to the caller.

pub mod delivery;
pub mod dispatcher;
pub mod notifier;

pub use delivery::email::{EmailConfig, EmailDelivery, EmailError, OutgoingEmail};
pub use dispatcher::{CaseNotification, NotificationDispatcher};
pub use notifier::{CaseNotice, CaseNotifier, EmailCaseNotifier, NotifyOutcome};
