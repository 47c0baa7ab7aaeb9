//! Table gateway: the data access contract and its embedded implementation
//!
//! The two views never touch storage directly. They speak to a [`Gateway`],
//! a table-scoped contract offering `select`, `insert`, `update` and
//! `delete` with equality filtering and single-field ordering, and consume
//! rows as plain JSON objects.
//!
//! [`RedbGateway`] is the production implementation: an embedded redb
//! database with one table per collection, each row stored as a
//! JSON-serialized string keyed by the record id the gateway assigns on
//! insert.

use std::sync::{Arc, Mutex};

use rand::{distr::Alphanumeric, Rng};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use serde_json::Value;

use crate::activities::ActivityLog;
use crate::clients::ClientDirectory;
use crate::error::GatewayError;
use crate::theme::ThemeStore;

/// Client records, keyed by id, JSON-serialized.
pub const TABLE_CLIENTS: TableDefinition<&str, &str> = TableDefinition::new("clients_v1");

/// Activity records, keyed by id, JSON-serialized. Each row carries the
/// owning client id in its `client_id` field.
pub const TABLE_ACTIVITIES: TableDefinition<&str, &str> = TableDefinition::new("activities_v1");

/// Length of gateway-assigned record identifiers.
const ID_LEN: usize = 12;

/// The two collections the application consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Clients,
    Activities,
}

impl Table {
    fn def(self) -> TableDefinition<'static, &'static str, &'static str> {
        match self {
            Table::Clients => TABLE_CLIENTS,
            Table::Activities => TABLE_ACTIVITIES,
        }
    }
}

/// Equality filter on one field of a row.
#[derive(Debug, Clone)]
pub struct Filter {
    pub field: &'static str,
    pub value: String,
}

impl Filter {
    pub fn eq(field: &'static str, value: impl Into<String>) -> Self {
        Filter { field, value: value.into() }
    }

    pub fn matches(&self, row: &Value) -> bool {
        row.get(self.field).and_then(Value::as_str) == Some(self.value.as_str())
    }
}

/// Ordering on one field of a row. Fields compare as strings, which also
/// orders `YYYY-MM-DD` dates chronologically.
#[derive(Debug, Clone)]
pub struct Order {
    pub field: &'static str,
    pub ascending: bool,
}

impl Order {
    pub fn asc(field: &'static str) -> Self {
        Order { field, ascending: true }
    }

    pub fn desc(field: &'static str) -> Self {
        Order { field, ascending: false }
    }
}

/// Table-scoped data access contract consumed by both view modules.
pub trait Gateway: Send + Sync {
    /// Returns all rows of `table` matching `filter`, sorted by `order`.
    fn select(
        &self,
        table: Table,
        filter: Option<&Filter>,
        order: Option<&Order>,
    ) -> Result<Vec<Value>, GatewayError>;

    /// Stores a new record and returns it with its assigned id. Fields set
    /// to `null` are dropped before storage.
    fn insert(&self, table: Table, record: Value) -> Result<Value, GatewayError>;

    /// Applies `patch` to every row matching `filter`. A `null` value in
    /// the patch clears the field; other values replace it.
    fn update(&self, table: Table, patch: Value, filter: &Filter) -> Result<(), GatewayError>;

    /// Removes every row matching `filter`. Removing nothing is not an
    /// error.
    fn delete(&self, table: Table, filter: &Filter) -> Result<(), GatewayError>;

    /// Returns the one row matching `filter`, failing when the match count
    /// is anything other than one.
    fn select_single(&self, table: Table, filter: &Filter) -> Result<Value, GatewayError> {
        let mut rows = self.select(table, Some(filter), None)?;
        match rows.len() {
            1 => Ok(rows.remove(0)),
            n => Err(GatewayError::RowCount(n)),
        }
    }
}

/// Embedded redb-backed gateway.
pub struct RedbGateway {
    db: Database,
}

/// Opens (or creates) the database file and makes sure both tables exist.
///
/// # Arguments
///
/// * `db_path` - File path where the database should be stored
pub fn init_gateway(db_path: &str) -> Result<RedbGateway, redb::Error> {
    let db = Database::create(db_path)?;

    let write_txn = db.begin_write()?;
    {
        write_txn.open_table(TABLE_CLIENTS)?;
        write_txn.open_table(TABLE_ACTIVITIES)?;
    }
    write_txn.commit()?;

    Ok(RedbGateway { db })
}

impl Gateway for RedbGateway {
    fn select(
        &self,
        table: Table,
        filter: Option<&Filter>,
        order: Option<&Order>,
    ) -> Result<Vec<Value>, GatewayError> {
        let read_txn = self.db.begin_read()?;
        let t = read_txn.open_table(table.def())?;

        let mut rows: Vec<Value> = t
            .iter()?
            .filter_map(|entry| entry.ok())
            .filter_map(|(_, value)| serde_json::from_str::<Value>(value.value()).ok())
            .filter(|row| filter.is_none_or(|f| f.matches(row)))
            .collect();

        if let Some(order) = order {
            rows.sort_by(|left, right| {
                let l = field_str(left, order.field);
                let r = field_str(right, order.field);
                if order.ascending { l.cmp(r) } else { r.cmp(l) }
            });
        }

        Ok(rows)
    }

    fn insert(&self, table: Table, record: Value) -> Result<Value, GatewayError> {
        let Value::Object(mut row) = record else {
            return Err(GatewayError::Malformed);
        };
        row.retain(|_, value| !value.is_null());

        let write_txn = self.db.begin_write()?;
        let stored;
        {
            let mut t = write_txn.open_table(table.def())?;

            // Ids are random; regenerate on the off chance of a collision.
            let id = loop {
                let candidate: String = rand::rng()
                    .sample_iter(&Alphanumeric)
                    .take(ID_LEN)
                    .map(char::from)
                    .collect();
                if t.get(candidate.as_str())?.is_none() {
                    break candidate;
                }
            };

            row.insert("id".to_string(), Value::String(id.clone()));
            stored = Value::Object(row);
            let encoded = serde_json::to_string(&stored)?;
            t.insert(id.as_str(), encoded.as_str())?;
        }
        write_txn.commit()?;

        tracing::debug!(table = ?table, "record inserted");
        Ok(stored)
    }

    fn update(&self, table: Table, patch: Value, filter: &Filter) -> Result<(), GatewayError> {
        let Value::Object(patch) = patch else {
            return Err(GatewayError::Malformed);
        };

        let write_txn = self.db.begin_write()?;
        {
            let mut t = write_txn.open_table(table.def())?;

            let matching: Vec<(String, Value)> = t
                .iter()?
                .filter_map(|entry| entry.ok())
                .filter_map(|(key, value)| {
                    serde_json::from_str::<Value>(value.value())
                        .ok()
                        .map(|row| (key.value().to_string(), row))
                })
                .filter(|(_, row)| filter.matches(row))
                .collect();

            for (key, mut row) in matching {
                if let Some(map) = row.as_object_mut() {
                    for (field, value) in &patch {
                        if value.is_null() {
                            map.remove(field);
                        } else {
                            map.insert(field.clone(), value.clone());
                        }
                    }
                }
                let encoded = serde_json::to_string(&row)?;
                t.insert(key.as_str(), encoded.as_str())?;
            }
        }
        write_txn.commit()?;

        tracing::debug!(table = ?table, field = filter.field, "records updated");
        Ok(())
    }

    fn delete(&self, table: Table, filter: &Filter) -> Result<(), GatewayError> {
        let write_txn = self.db.begin_write()?;
        {
            let mut t = write_txn.open_table(table.def())?;

            let matching: Vec<String> = t
                .iter()?
                .filter_map(|entry| entry.ok())
                .filter(|(_, value)| {
                    serde_json::from_str::<Value>(value.value())
                        .map(|row| filter.matches(&row))
                        .unwrap_or(false)
                })
                .map(|(key, _)| key.value().to_string())
                .collect();

            for key in matching {
                t.remove(key.as_str())?;
            }
        }
        write_txn.commit()?;

        tracing::debug!(table = ?table, field = filter.field, "records deleted");
        Ok(())
    }
}

fn field_str<'a>(row: &'a Value, field: &str) -> &'a str {
    row.get(field).and_then(Value::as_str).unwrap_or("")
}

/// Application state shared across all request handlers.
///
/// The two view modules are process-wide: their search term, expanded row,
/// form contents and edit target survive across requests, mirroring a
/// single user's open page.
#[derive(Clone)]
pub struct AppState {
    pub directory: Arc<Mutex<ClientDirectory>>,
    pub log: Arc<Mutex<ActivityLog>>,
    pub theme: Arc<ThemeStore>,
}

impl AppState {
    pub fn new(gateway: Arc<dyn Gateway>, theme: ThemeStore) -> Self {
        AppState {
            directory: Arc::new(Mutex::new(ClientDirectory::new(gateway.clone()))),
            log: Arc::new(Mutex::new(ActivityLog::new(gateway))),
            theme: Arc::new(theme),
        }
    }
}
