//! In-process row store. Keeps every table as a vector of JSON objects,
//! records each call it receives, and can be told to fail specific calls.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde_json::{Map, Value};

use crate::error::DbError;
use crate::query::{Embed, Filter, Link, Query, RowStore};
use crate::schema::CREATED_AT;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Select,
    Insert,
    Update,
    Delete,
    Rpc,
}

/// One call as received by the store. `target` is the table or RPC name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub op: Op,
    pub target: String,
}

type Row = Map<String, Value>;

#[derive(Default)]
struct Inner {
    tables: HashMap<String, Vec<Row>>,
    next_id: i64,
    journal: Vec<Call>,
    faults: HashMap<(Op, String), String>,
}

pub struct MemoryStore {
    inner: Mutex<Inner>,
    epoch: DateTime<Utc>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            epoch: DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
                .map(|t| t.with_timezone(&Utc))
                .unwrap_or_default(),
        }
    }

    /// Make every later `op` on `target` fail with `message`.
    pub fn fail(&self, op: Op, target: &str, message: &str) {
        if let Ok(mut inner) = self.inner.lock() {
            inner
                .faults
                .insert((op, target.to_string()), message.to_string());
        }
    }

    pub fn clear_faults(&self) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.faults.clear();
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.inner
            .lock()
            .map(|inner| inner.journal.clone())
            .unwrap_or_default()
    }

    pub fn row_count(&self, table: &str) -> usize {
        self.inner
            .lock()
            .map(|inner| inner.tables.get(table).map_or(0, Vec::len))
            .unwrap_or(0)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, DbError> {
        self.inner
            .lock()
            .map_err(|e| DbError::Store(format!("memory store lock poisoned: {e}")))
    }

    /// Journal the call, then fail it if a fault is registered.
    fn enter(&self, op: Op, target: &str) -> Result<MutexGuard<'_, Inner>, DbError> {
        let mut inner = self.lock()?;
        inner.journal.push(Call {
            op,
            target: target.to_string(),
        });
        if let Some(message) = inner.faults.get(&(op, target.to_string())) {
            return Err(DbError::Backend {
                status: 400,
                message: message.clone(),
            });
        }
        Ok(inner)
    }
}

#[async_trait]
impl RowStore for MemoryStore {
    async fn select(&self, query: &Query) -> Result<Vec<Value>, DbError> {
        let inner = self.enter(Op::Select, query.table)?;
        let mut rows: Vec<&Row> = inner
            .tables
            .get(query.table)
            .map(|rows| rows.iter().filter(|r| matches(r, &query.filters)).collect())
            .unwrap_or_default();

        if let Some(order) = query.order {
            rows.sort_by(|a, b| {
                let ord = compare(a.get(order.column), b.get(order.column));
                if order.descending { ord.reverse() } else { ord }
            });
        }
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }

        Ok(rows.into_iter().map(|r| project(&inner, r, query)).collect())
    }

    async fn insert(&self, query: &Query, rows: Vec<Value>) -> Result<Vec<Value>, DbError> {
        let mut inner = self.enter(Op::Insert, query.table)?;
        let mut inserted = Vec::with_capacity(rows.len());

        for row in rows {
            let Value::Object(mut row) = row else {
                return Err(DbError::Backend {
                    status: 400,
                    message: "insert payload must be an object".to_string(),
                });
            };
            inner.next_id += 1;
            let seq = inner.next_id;
            row.entry("id").or_insert(Value::from(seq));
            let created_at = (self.epoch + Duration::seconds(seq))
                .to_rfc3339_opts(SecondsFormat::Secs, true);
            row.entry(CREATED_AT).or_insert(Value::from(created_at));
            inner
                .tables
                .entry(query.table.to_string())
                .or_default()
                .push(row.clone());
            inserted.push(row);
        }

        Ok(inserted.iter().map(|r| project(&inner, r, query)).collect())
    }

    async fn update(&self, query: &Query, patch: Value) -> Result<Vec<Value>, DbError> {
        let mut inner = self.enter(Op::Update, query.table)?;
        let Value::Object(patch) = patch else {
            return Err(DbError::Backend {
                status: 400,
                message: "update payload must be an object".to_string(),
            });
        };

        let mut updated = Vec::new();
        if let Some(rows) = inner.tables.get_mut(query.table) {
            for row in rows.iter_mut().filter(|r| matches(r, &query.filters)) {
                for (k, v) in &patch {
                    row.insert(k.clone(), v.clone());
                }
                updated.push(row.clone());
            }
        }

        Ok(updated.iter().map(|r| project(&inner, r, query)).collect())
    }

    async fn delete(&self, query: &Query) -> Result<Vec<Value>, DbError> {
        let mut inner = self.enter(Op::Delete, query.table)?;
        let mut removed = Vec::new();
        if let Some(rows) = inner.tables.get_mut(query.table) {
            let (gone, kept): (Vec<Row>, Vec<Row>) =
                rows.drain(..).partition(|r| matches(r, &query.filters));
            *rows = kept;
            removed = gone;
        }

        Ok(removed.iter().map(|r| project(&inner, r, query)).collect())
    }

    async fn rpc(&self, function: &str, _args: Value) -> Result<Value, DbError> {
        self.enter(Op::Rpc, function)?;
        Ok(Value::Null)
    }
}

fn matches(row: &Row, filters: &[Filter]) -> bool {
    filters
        .iter()
        .all(|f| row.get(f.column).is_some_and(|v| values_eq(v, &f.value)))
}

fn values_eq(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        _ => Ordering::Equal,
    }
}

fn pick(row: &Row, columns: &[&str]) -> Row {
    if columns.contains(&"*") {
        return row.clone();
    }
    columns
        .iter()
        .filter_map(|c| row.get(*c).map(|v| (c.to_string(), v.clone())))
        .collect()
}

fn project(inner: &Inner, row: &Row, query: &Query) -> Value {
    let mut out = pick(row, &query.columns);
    for embed in &query.embeds {
        out.insert(embed.table.to_string(), resolve(inner, row, embed));
    }
    Value::Object(out)
}

fn resolve(inner: &Inner, row: &Row, embed: &Embed) -> Value {
    let table = inner.tables.get(embed.table);
    match embed.link {
        Link::Children { fk } => {
            let Some(id) = row.get("id") else {
                return Value::Array(Vec::new());
            };
            let children = table
                .map(|rows| {
                    rows.iter()
                        .filter(|r| r.get(fk).is_some_and(|v| values_eq(v, id)))
                        .map(|r| Value::Object(pick(r, embed.columns)))
                        .collect()
                })
                .unwrap_or_default();
            Value::Array(children)
        }
        Link::Parent { fk } => {
            let Some(key) = row.get(fk) else {
                return Value::Null;
            };
            table
                .and_then(|rows| {
                    rows.iter()
                        .find(|r| r.get("id").is_some_and(|v| values_eq(v, key)))
                })
                .map(|r| Value::Object(pick(r, embed.columns)))
                .unwrap_or(Value::Null)
        }
    }
}
