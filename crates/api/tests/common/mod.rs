//! Shared fixtures for the API integration tests.
//!
//! The router runs against in-memory [`CaseStore`] / [`AccountStore`]
//! doubles and a [`RecordingNotifier`], so no database or SMTP server is
//! needed.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use chrono::Utc;
use http_body_util::BodyExt;
use tower::ServiceExt;

use ventanilla_api::app::build_app;
use ventanilla_api::auth::jwt::{generate_access_token, JwtConfig};
use ventanilla_api::auth::password::hash_password;
use ventanilla_api::config::ServerConfig;
use ventanilla_api::pqrsd::CaseService;
use ventanilla_api::state::AppState;
use ventanilla_core::roles::{ROLE_ADMIN, ROLE_EDITOR};
use ventanilla_core::tracking::TrackingNumberGenerator;
use ventanilla_core::types::{DbId, Timestamp};
use ventanilla_db::models::pqrsd::{
    CaseFilter, CaseHistoryEntry, CaseTypeCount, CaseUpdate, MonthlyCount, NewCase,
    NewHistoryEntry, PqrsdCase, StatusCount,
};
use ventanilla_db::models::user::User;
use ventanilla_db::{AccountStore, CaseStore, StoreError, StoreResult};
use ventanilla_events::{CaseNotice, CaseNotifier, NotificationDispatcher, NotifyOutcome};

pub const TEST_JWT_SECRET: &str = "test-secret-that-is-long-enough-for-hmac";
pub const STAFF_USER_ID: DbId = 1;
pub const EDITOR_USER_ID: DbId = 2;
pub const TEST_PASSWORD: &str = "test_password_123!";

// ---------------------------------------------------------------------------
// In-memory case store
// ---------------------------------------------------------------------------

#[derive(Default)]
struct CaseTables {
    cases: Vec<PqrsdCase>,
    history: Vec<CaseHistoryEntry>,
    next_case_id: DbId,
    next_history_id: DbId,
}

/// [`CaseStore`] over plain vectors, with knobs for failure injection.
#[derive(Default)]
pub struct InMemoryCaseStore {
    tables: Mutex<CaseTables>,
    /// Every existence probe reports the number as taken.
    all_taken: AtomicBool,
    /// This many upcoming inserts fail with a unique-key violation.
    pending_duplicates: AtomicU32,
    /// Every call fails with `StoreError::Unavailable`.
    unavailable: AtomicBool,
    insert_attempts: AtomicU32,
}

impl InMemoryCaseStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_all_tracking_numbers_taken(&self) {
        self.all_taken.store(true, Ordering::SeqCst);
    }

    pub fn fail_next_inserts_as_duplicate(&self, count: u32) {
        self.pending_duplicates.store(count, Ordering::SeqCst);
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn insert_attempts(&self) -> u32 {
        self.insert_attempts.load(Ordering::SeqCst)
    }

    pub fn case_count(&self) -> usize {
        self.tables.lock().unwrap().cases.len()
    }

    pub fn history_count(&self) -> usize {
        self.tables.lock().unwrap().history.len()
    }

    /// Move a case's creation time, for date-range and statistics tests.
    pub fn backdate(&self, id: DbId, created_at: Timestamp) {
        let mut tables = self.tables.lock().unwrap();
        if let Some(case) = tables.cases.iter_mut().find(|c| c.id == id) {
            case.created_at = created_at;
        }
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("connection refused".into()));
        }
        Ok(())
    }
}

fn push_history(tables: &mut CaseTables, case_id: DbId, entry: &NewHistoryEntry) {
    tables.next_history_id += 1;
    let id = tables.next_history_id;
    tables.history.push(CaseHistoryEntry {
        id,
        case_id,
        previous_status: entry.previous_status.clone(),
        new_status: entry.new_status.clone(),
        notes: entry.notes.clone(),
        actor_id: entry.actor_id,
        created_at: Utc::now(),
    });
}

fn matches_filter(case: &PqrsdCase, filter: &CaseFilter) -> bool {
    if filter.case_type.as_ref().is_some_and(|t| &case.case_type != t) {
        return false;
    }
    if filter.status.as_ref().is_some_and(|s| &case.status != s) {
        return false;
    }
    if filter
        .interest_group
        .as_ref()
        .is_some_and(|g| &case.interest_group != g)
    {
        return false;
    }
    let day = case.created_at.date_naive();
    if filter.from.is_some_and(|from| day < from) || filter.to.is_some_and(|to| day > to) {
        return false;
    }
    if let Some(search) = &filter.search {
        let needle = search.to_lowercase();
        let haystacks = [
            &case.submitter_name,
            &case.submitter_email,
            &case.tracking_number,
            &case.subject,
        ];
        if !haystacks.iter().any(|h| h.to_lowercase().contains(&needle)) {
            return false;
        }
    }
    true
}

#[async_trait]
impl CaseStore for InMemoryCaseStore {
    async fn tracking_number_exists(&self, tracking_number: &str) -> StoreResult<bool> {
        self.check_available()?;
        if self.all_taken.load(Ordering::SeqCst) {
            return Ok(true);
        }
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .cases
            .iter()
            .any(|c| c.tracking_number == tracking_number))
    }

    async fn insert_case(
        &self,
        case: &NewCase,
        entry: &NewHistoryEntry,
    ) -> StoreResult<PqrsdCase> {
        self.check_available()?;
        self.insert_attempts.fetch_add(1, Ordering::SeqCst);

        let duplicate = StoreError::Duplicate {
            constraint: "uq_pqrsd_cases_tracking_number".into(),
        };
        if self
            .pending_duplicates
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(duplicate);
        }

        let mut tables = self.tables.lock().unwrap();
        if tables
            .cases
            .iter()
            .any(|c| c.tracking_number == case.tracking_number)
        {
            return Err(duplicate);
        }

        tables.next_case_id += 1;
        let now = Utc::now();
        let row = PqrsdCase {
            id: tables.next_case_id,
            tracking_number: case.tracking_number.clone(),
            case_type: case.case_type.clone(),
            interest_group: case.interest_group.clone(),
            submitter_name: case.submitter_name.clone(),
            submitter_document_id: case.submitter_document_id.clone(),
            submitter_email: case.submitter_email.clone(),
            submitter_phone: case.submitter_phone.clone(),
            subject: case.subject.clone(),
            description: case.description.clone(),
            status: entry.new_status.clone(),
            response_text: None,
            response_at: None,
            responder_id: None,
            submitter_ip: case.submitter_ip.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.cases.push(row.clone());
        push_history(&mut tables, row.id, entry);
        Ok(row)
    }

    async fn find_by_id(&self, id: DbId) -> StoreResult<Option<PqrsdCase>> {
        self.check_available()?;
        let tables = self.tables.lock().unwrap();
        Ok(tables.cases.iter().find(|c| c.id == id).cloned())
    }

    async fn find_by_tracking_number(
        &self,
        tracking_number: &str,
    ) -> StoreResult<Option<PqrsdCase>> {
        self.check_available()?;
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .cases
            .iter()
            .find(|c| c.tracking_number == tracking_number)
            .cloned())
    }

    async fn history(&self, case_id: DbId) -> StoreResult<Vec<CaseHistoryEntry>> {
        self.check_available()?;
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .history
            .iter()
            .filter(|h| h.case_id == case_id)
            .cloned()
            .collect())
    }

    async fn list(&self, filter: &CaseFilter) -> StoreResult<Vec<PqrsdCase>> {
        self.check_available()?;
        let tables = self.tables.lock().unwrap();
        let mut rows: Vec<PqrsdCase> = tables
            .cases
            .iter()
            .filter(|c| matches_filter(c, filter))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let offset = filter.offset.unwrap_or(0).max(0) as usize;
        let rows = rows.into_iter().skip(offset);
        Ok(match filter.limit {
            Some(limit) => rows.take(limit.max(1) as usize).collect(),
            None => rows.collect(),
        })
    }

    async fn apply_update(
        &self,
        id: DbId,
        update: &CaseUpdate,
        entry: Option<&NewHistoryEntry>,
    ) -> StoreResult<Option<PqrsdCase>> {
        self.check_available()?;
        let mut tables = self.tables.lock().unwrap();
        let Some(case) = tables.cases.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        case.status = update.status.clone();
        if let Some(text) = &update.response_text {
            case.response_text = Some(text.clone());
        }
        if let Some(at) = update.responded_at {
            case.response_at = Some(at);
            case.responder_id = update.responder_id;
        }
        case.updated_at = Utc::now();
        let updated = case.clone();

        if let Some(entry) = entry {
            push_history(&mut tables, id, entry);
        }
        Ok(Some(updated))
    }

    async fn count_all(&self) -> StoreResult<i64> {
        self.check_available()?;
        Ok(self.tables.lock().unwrap().cases.len() as i64)
    }

    async fn count_by_status(&self) -> StoreResult<Vec<StatusCount>> {
        self.check_available()?;
        let tables = self.tables.lock().unwrap();
        let mut counts: Vec<StatusCount> = Vec::new();
        for case in &tables.cases {
            match counts.iter_mut().find(|c| c.status == case.status) {
                Some(c) => c.count += 1,
                None => counts.push(StatusCount {
                    status: case.status.clone(),
                    count: 1,
                }),
            }
        }
        Ok(counts)
    }

    async fn count_by_case_type(&self) -> StoreResult<Vec<CaseTypeCount>> {
        self.check_available()?;
        let tables = self.tables.lock().unwrap();
        let mut counts: Vec<CaseTypeCount> = Vec::new();
        for case in &tables.cases {
            match counts.iter_mut().find(|c| c.case_type == case.case_type) {
                Some(c) => c.count += 1,
                None => counts.push(CaseTypeCount {
                    case_type: case.case_type.clone(),
                    count: 1,
                }),
            }
        }
        Ok(counts)
    }

    async fn count_by_month(&self, since: Timestamp) -> StoreResult<Vec<MonthlyCount>> {
        self.check_available()?;
        let tables = self.tables.lock().unwrap();
        let mut counts: Vec<MonthlyCount> = Vec::new();
        for case in tables.cases.iter().filter(|c| c.created_at >= since) {
            let month = case.created_at.format("%Y-%m").to_string();
            match counts.iter_mut().find(|c| c.month == month) {
                Some(c) => c.count += 1,
                None => counts.push(MonthlyCount { month, count: 1 }),
            }
        }
        counts.sort_by(|a, b| a.month.cmp(&b.month));
        Ok(counts)
    }

    async fn health_check(&self) -> StoreResult<()> {
        self.check_available()
    }
}

// ---------------------------------------------------------------------------
// In-memory account store
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct InMemoryAccountStore {
    users: Mutex<Vec<User>>,
    logins: Mutex<Vec<DbId>>,
}

impl InMemoryAccountStore {
    /// Add an account whose password is [`TEST_PASSWORD`].
    pub fn add_user(&self, id: DbId, username: &str, role: &str, is_active: bool) {
        let now = Utc::now();
        self.users.lock().unwrap().push(User {
            id,
            username: username.to_string(),
            email: format!("{username}@alcaldia.gov.co"),
            password_hash: hash_password(TEST_PASSWORD).expect("hashing should succeed"),
            role: role.to_string(),
            is_active,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        });
    }

    /// Change an existing account's role and active flag in place.
    pub fn update_user(&self, id: DbId, role: &str, is_active: bool) {
        if let Some(user) = self.users.lock().unwrap().iter_mut().find(|u| u.id == id) {
            user.role = role.to_string();
            user.is_active = is_active;
        }
    }

    /// Delete an account.
    pub fn remove_user(&self, id: DbId) {
        self.users.lock().unwrap().retain(|u| u.id != id);
    }

    pub fn recorded_logins(&self) -> Vec<DbId> {
        self.logins.lock().unwrap().clone()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn find_by_id(&self, id: DbId) -> StoreResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == id)
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn record_successful_login(&self, id: DbId) -> StoreResult<()> {
        self.logins.lock().unwrap().push(id);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Recording notifier
// ---------------------------------------------------------------------------

/// [`CaseNotifier`] that records every call and reports `sent: false`.
#[derive(Default)]
pub struct RecordingNotifier {
    calls: Mutex<Vec<(&'static str, CaseNotice)>>,
}

impl RecordingNotifier {
    pub fn calls(&self) -> Vec<(&'static str, CaseNotice)> {
        self.calls.lock().unwrap().clone()
    }

    /// Wait until at least `n` notifications were recorded (dispatch is
    /// asynchronous), then return them.
    pub async fn wait_for(&self, n: usize) -> Vec<(&'static str, CaseNotice)> {
        for _ in 0..200 {
            if self.calls.lock().unwrap().len() >= n {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        self.calls()
    }
}

#[async_trait]
impl CaseNotifier for RecordingNotifier {
    async fn notify_created(&self, notice: &CaseNotice) -> NotifyOutcome {
        self.calls.lock().unwrap().push(("created", notice.clone()));
        NotifyOutcome::NOT_SENT
    }

    async fn notify_resolved(&self, notice: &CaseNotice) -> NotifyOutcome {
        self.calls.lock().unwrap().push(("resolved", notice.clone()));
        NotifyOutcome::NOT_SENT
    }
}

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        database_max_connections: 5,
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            access_token_expiry_mins: 60,
        },
        tracking_prefix: "PQR".to_string(),
        tracking_max_attempts: 10,
        staff_inbox: None,
    }
}

/// Everything a test may want to inspect after driving the router.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryCaseStore>,
    pub accounts: Arc<InMemoryAccountStore>,
    pub notifier: Arc<RecordingNotifier>,
    pub cases: Arc<CaseService>,
}

impl TestApp {
    /// A fresh clone of the router, for one `oneshot` request.
    pub fn app(&self) -> Router {
        self.router.clone()
    }
}

/// Build the full application router over fresh in-memory doubles.
///
/// The account store holds an active admin (`staff`, id 1), an active
/// editor (`editor`, id 2) and a deactivated admin (`former`, id 3).
pub fn build_test_app() -> TestApp {
    build_test_app_with(test_config())
}

pub fn build_test_app_with(config: ServerConfig) -> TestApp {
    let store = Arc::new(InMemoryCaseStore::new());
    let accounts = Arc::new(InMemoryAccountStore::default());
    accounts.add_user(STAFF_USER_ID, "staff", ROLE_ADMIN, true);
    accounts.add_user(EDITOR_USER_ID, "editor", ROLE_EDITOR, true);
    accounts.add_user(3, "former", ROLE_ADMIN, false);

    let notifier = Arc::new(RecordingNotifier::default());
    let generator =
        TrackingNumberGenerator::new(config.tracking_prefix.clone()).expect("valid prefix");
    let cases = Arc::new(CaseService::new(
        store.clone(),
        generator,
        config.tracking_max_attempts,
        NotificationDispatcher::new(notifier.clone()),
    ));

    let state = AppState {
        config: Arc::new(config),
        cases: cases.clone(),
        accounts: accounts.clone(),
    };

    TestApp {
        router: build_app(state),
        store,
        accounts,
        notifier,
        cases,
    }
}

// ---------------------------------------------------------------------------
// Tokens and request helpers
// ---------------------------------------------------------------------------

pub fn token_for(user_id: DbId, role: &str) -> String {
    generate_access_token(user_id, role, &test_config().jwt).expect("token generation")
}

pub fn staff_token() -> String {
    token_for(STAFF_USER_ID, ROLE_ADMIN)
}

pub fn editor_token() -> String {
    token_for(EDITOR_USER_ID, ROLE_EDITOR)
}

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    app.oneshot(builder.body(body).unwrap()).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// A complete, valid citizen submission.
pub fn submission() -> serde_json::Value {
    serde_json::json!({
        "case_type": "complaint",
        "submitter_name": "Ana Gómez",
        "submitter_document_id": "1032456789",
        "submitter_email": "ana@example.com",
        "submitter_phone": "3001234567",
        "subject": "Ruido nocturno",
        "description": "Un establecimiento genera ruido después de medianoche."
    })
}
