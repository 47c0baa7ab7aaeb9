//! Tests for the activity log module
//!
//! These drive `ActivityLog` directly against a temporary database,
//! covering scoping, required-field validation, date ordering, the
//! exactly-one client-name lookup and the edit/delete cycle.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde_json::{json, Value};
use tempfile::NamedTempFile;

use followup::activities::ActivityLog;
use followup::error::{AppError, GatewayError};
use followup::gateway::{init_gateway, Filter, Gateway, Order, RedbGateway, Table};
use followup::model::ActivityForm;

fn temp_gateway() -> (Arc<RedbGateway>, NamedTempFile) {
    let temp_db = NamedTempFile::new().expect("Failed to create temp file");
    let gateway = init_gateway(temp_db.path().to_str().unwrap())
        .expect("Failed to initialize test database");
    (Arc::new(gateway), temp_db)
}

fn seed_client(gateway: &dyn Gateway, name: &str) -> String {
    let stored = gateway
        .insert(Table::Clients, json!({ "company_name": name }))
        .unwrap();
    stored["id"].as_str().unwrap().to_string()
}

fn seed_activity(gateway: &dyn Gateway, client_id: &str, date: &str, result: &str) -> String {
    let stored = gateway
        .insert(
            Table::Activities,
            json!({
                "client_id": client_id,
                "activity_type": "زيارة",
                "result": result,
                "date": date
            }),
        )
        .unwrap();
    stored["id"].as_str().unwrap().to_string()
}

fn activity_form(activity_type: &str, result: &str, date: &str) -> ActivityForm {
    ActivityForm {
        activity_type: activity_type.to_string(),
        result: result.to_string(),
        date: date.to_string(),
        notes: String::new(),
    }
}

/// Counts writes so scope failures can be shown to stop short of the
/// gateway.
struct CountingGateway {
    inner: RedbGateway,
    writes: AtomicUsize,
}

impl Gateway for CountingGateway {
    fn select(
        &self,
        table: Table,
        filter: Option<&Filter>,
        order: Option<&Order>,
    ) -> Result<Vec<Value>, GatewayError> {
        self.inner.select(table, filter, order)
    }

    fn insert(&self, table: Table, record: Value) -> Result<Value, GatewayError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.insert(table, record)
    }

    fn update(&self, table: Table, patch: Value, filter: &Filter) -> Result<(), GatewayError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.update(table, patch, filter)
    }

    fn delete(&self, table: Table, filter: &Filter) -> Result<(), GatewayError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.delete(table, filter)
    }
}

#[test]
fn load_orders_activities_by_date_descending() {
    let (gateway, _temp_db) = temp_gateway();
    let client = seed_client(gateway.as_ref(), "Acme");
    seed_activity(gateway.as_ref(), &client, "2026-01-05", "first");
    seed_activity(gateway.as_ref(), &client, "2026-03-01", "second");
    seed_activity(gateway.as_ref(), &client, "2025-12-31", "third");

    let mut log = ActivityLog::new(gateway);
    log.scope_to(&client);
    log.load().unwrap();

    let dates: Vec<String> = log
        .activities()
        .iter()
        .map(|a| a.date.to_string())
        .collect();
    assert_eq!(dates, vec!["2026-03-01", "2026-01-05", "2025-12-31"]);
}

#[test]
fn load_only_returns_the_scoped_clients_activities() {
    let (gateway, _temp_db) = temp_gateway();
    let acme = seed_client(gateway.as_ref(), "Acme");
    let delta = seed_client(gateway.as_ref(), "Delta");
    seed_activity(gateway.as_ref(), &acme, "2026-01-05", "call");
    seed_activity(gateway.as_ref(), &delta, "2026-01-06", "visit");

    let mut log = ActivityLog::new(gateway);
    log.scope_to(&acme);
    log.load().unwrap();

    assert_eq!(log.activities().len(), 1);
    assert_eq!(log.activities()[0].client_id, acme);
}

#[test]
fn submit_without_scope_fails_before_the_gateway() {
    let temp_db = NamedTempFile::new().expect("Failed to create temp file");
    let inner = init_gateway(temp_db.path().to_str().unwrap())
        .expect("Failed to initialize test database");
    let gateway = Arc::new(CountingGateway {
        inner,
        writes: AtomicUsize::new(0),
    });

    let mut log = ActivityLog::new(gateway.clone());
    let err = log
        .submit(activity_form("زيارة", "مهتم", "2026-05-01"))
        .unwrap_err();

    assert!(matches!(err, AppError::MissingScope(_)));
    assert_eq!(gateway.writes.load(Ordering::SeqCst), 0);
}

#[test]
fn submit_requires_type_result_and_date() {
    let (gateway, _temp_db) = temp_gateway();
    let client = seed_client(gateway.as_ref(), "Acme");

    let mut log = ActivityLog::new(gateway.clone());
    log.scope_to(&client);

    for form in [
        activity_form("", "مهتم", "2026-05-01"),
        activity_form("زيارة", "", "2026-05-01"),
        activity_form("زيارة", "مهتم", ""),
    ] {
        let err = log.submit(form).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    let rows = gateway.select(Table::Activities, None, None).unwrap();
    assert!(rows.is_empty());
}

#[test]
fn submit_rejects_a_malformed_date() {
    let (gateway, _temp_db) = temp_gateway();
    let client = seed_client(gateway.as_ref(), "Acme");

    let mut log = ActivityLog::new(gateway);
    log.scope_to(&client);

    let err = log
        .submit(activity_form("زيارة", "مهتم", "01/05/2026"))
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    // The form keeps the rejected values for correction.
    assert_eq!(log.form().date, "01/05/2026");
}

#[test]
fn submit_attaches_the_scope_and_resets_the_form() {
    let (gateway, _temp_db) = temp_gateway();
    let client = seed_client(gateway.as_ref(), "Acme");

    let mut log = ActivityLog::new(gateway.clone());
    log.scope_to(&client);

    let mut form = activity_form("اتصال", "مهتم", "2026-05-01");
    form.notes = "  ".to_string();
    log.submit(form).unwrap();

    assert_eq!(log.form().activity_type, "");
    assert!(log.editing().is_none());
    assert_eq!(log.activities().len(), 1);

    let rows = gateway.select(Table::Activities, None, None).unwrap();
    assert_eq!(rows[0]["client_id"], client.as_str());
    // Blank notes are stored as absent.
    assert!(rows[0].get("notes").is_none());
}

#[test]
fn client_name_lookup_requires_exactly_one_match() {
    let (gateway, _temp_db) = temp_gateway();
    let client = seed_client(gateway.as_ref(), "Acme");

    let mut log = ActivityLog::new(gateway.clone());
    log.scope_to(&client);
    log.load_client_name().unwrap();
    assert_eq!(log.client_name(), "Acme");

    // A scope pointing at no record fails and leaves the name blank.
    let mut orphan = ActivityLog::new(gateway.clone());
    orphan.scope_to("missing-id");
    let err = orphan.load_client_name().unwrap_err();
    assert!(matches!(
        err,
        AppError::Gateway(GatewayError::RowCount(0))
    ));
    assert_eq!(orphan.client_name(), "");

    // More than one match is just as much of a failure.
    seed_activity(gateway.as_ref(), &client, "2026-01-05", "a");
    seed_activity(gateway.as_ref(), &client, "2026-01-06", "b");
    let err = gateway
        .select_single(Table::Activities, &Filter::eq("client_id", client.clone()))
        .unwrap_err();
    assert!(matches!(err, GatewayError::RowCount(2)));
}

#[test]
fn begin_edit_then_submit_updates_in_place() {
    let (gateway, _temp_db) = temp_gateway();
    let client = seed_client(gateway.as_ref(), "Acme");
    let id = seed_activity(gateway.as_ref(), &client, "2026-01-05", "مهتم");

    let mut log = ActivityLog::new(gateway.clone());
    log.scope_to(&client);
    log.load().unwrap();

    log.begin_edit(&id).unwrap();
    assert_eq!(log.form().date, "2026-01-05");
    assert_eq!(log.editing(), Some(id.as_str()));

    let mut form = log.form().clone();
    form.result = "تم الاتفاق".to_string();
    log.submit(form).unwrap();

    assert!(log.editing().is_none());
    assert_eq!(log.activities().len(), 1);
    assert_eq!(log.activities()[0].result, "تم الاتفاق");
    assert_eq!(log.activities()[0].id, id);

    let err = log.begin_edit("missing-id").unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[test]
fn delete_removes_and_reloads() {
    let (gateway, _temp_db) = temp_gateway();
    let client = seed_client(gateway.as_ref(), "Acme");
    let first = seed_activity(gateway.as_ref(), &client, "2026-01-05", "a");
    seed_activity(gateway.as_ref(), &client, "2026-01-06", "b");

    let mut log = ActivityLog::new(gateway);
    log.scope_to(&client);
    log.load().unwrap();
    assert_eq!(log.activities().len(), 2);

    log.delete(&first).unwrap();
    assert_eq!(log.activities().len(), 1);
    assert_ne!(log.activities()[0].id, first);
}

#[test]
fn changing_scope_resets_the_view_state() {
    let (gateway, _temp_db) = temp_gateway();
    let acme = seed_client(gateway.as_ref(), "Acme");
    let delta = seed_client(gateway.as_ref(), "Delta");

    let mut log = ActivityLog::new(gateway);
    log.scope_to(&acme);
    log.load().unwrap();
    log.load_client_name().unwrap();

    // A rejected submission leaves values in the form.
    let _ = log.submit(activity_form("زيارة", "", ""));
    assert_eq!(log.form().activity_type, "زيارة");
    assert_eq!(log.client_name(), "Acme");

    log.scope_to(&delta);
    assert_eq!(log.client_name(), "");
    assert_eq!(log.form().activity_type, "");
    assert!(log.activities().is_empty());

    // Re-entering the same scope keeps the state.
    log.load_client_name().unwrap();
    log.scope_to(&delta);
    assert_eq!(log.client_name(), "Delta");
}
