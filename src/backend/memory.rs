//! In-process tables that answer queries the way the hosted backend does

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    config::{AuthConfig, SeedUser},
    error::{AppError, AppResult},
    models::auth::{AuthUser, Claims, Session},
};

use super::{AuthBackend, DataBackend, Filter, Query};

static NULL: Value = Value::Null;

#[derive(Default)]
struct Store {
    tables: HashMap<String, Vec<Value>>,
    /// Last `created_at` handed out; keeps insertion order strict
    clock: Option<DateTime<Utc>>,
}

impl Store {
    fn next_timestamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let stamp = match self.clock {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.clock = Some(stamp);
        stamp
    }
}

struct Account {
    id: Uuid,
    password: String,
}

pub struct MemoryBackend {
    store: RwLock<Store>,
    accounts: HashMap<String, Account>,
    auth: AuthConfig,
}

impl MemoryBackend {
    pub fn new(seed_users: &[SeedUser], auth: AuthConfig) -> Self {
        let accounts = seed_users
            .iter()
            .map(|user| {
                (
                    user.email.to_lowercase(),
                    Account {
                        id: Uuid::new_v4(),
                        password: user.password.clone(),
                    },
                )
            })
            .collect();

        Self {
            store: RwLock::new(Store::default()),
            accounts,
            auth,
        }
    }

    fn claims_for(&self, token: &str) -> AppResult<Claims> {
        Claims::from_token(token, &self.auth.jwt_secret, &self.auth.jwt_audience).map_err(|e| {
            AppError::Backend {
                status: 401,
                message: format!("Invalid token: {}", e),
            }
        })
    }
}

/// Render a cell the way it appears in a filter value
fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// SQL `LIKE` with `%` (any run) and `_` (one character), ignoring case
fn like_matches(text: &str, pattern: &str) -> bool {
    let text: Vec<char> = text.to_lowercase().chars().collect();
    let pattern: Vec<char> = pattern.to_lowercase().chars().collect();

    let (mut t, mut p) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        if p < pattern.len() && (pattern[p] == '_' || pattern[p] == text[t]) {
            t += 1;
            p += 1;
        } else if p < pattern.len() && pattern[p] == '%' {
            backtrack = Some((p, t));
            p += 1;
        } else if let Some((star, matched)) = backtrack {
            p = star + 1;
            t = matched + 1;
            backtrack = Some((star, matched + 1));
        } else {
            return false;
        }
    }

    pattern[p..].iter().all(|c| *c == '%')
}

fn row_matches(row: &Value, filters: &[Filter]) -> bool {
    filters.iter().all(|filter| {
        let cell = row.get(filter.column()).unwrap_or(&NULL);
        match filter {
            Filter::Eq { value, .. } => cell_text(cell) == *value,
            Filter::Ilike { pattern, .. } => cell.as_str().is_some_and(|s| like_matches(s, pattern)),
        }
    })
}

fn compare_cells(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => {
            match (x.parse::<DateTime<Utc>>(), y.parse::<DateTime<Utc>>()) {
                (Ok(x), Ok(y)) => x.cmp(&y),
                _ => x.cmp(y),
            }
        }
        // Nulls sort last, as in Postgres ascending order
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Greater,
        (_, Value::Null) => Ordering::Less,
        _ => cell_text(a).cmp(&cell_text(b)),
    }
}

fn project(row: &Value, columns: &[String]) -> Value {
    if columns.is_empty() || columns.iter().any(|c| c == "*") {
        return row.clone();
    }
    let mut out = Map::new();
    for column in columns {
        out.insert(column.clone(), row.get(column).cloned().unwrap_or(Value::Null));
    }
    Value::Object(out)
}

/// Project a stored row and resolve its embedded relations
fn render(store: &Store, row: &Value, query: &Query) -> Value {
    let mut out = project(row, query.selected_columns());

    for embed in query.embeds() {
        let related = row.get(&embed.foreign_key).and_then(|key| {
            store
                .tables
                .get(&embed.table)?
                .iter()
                .find(|candidate| candidate.get("id") == Some(key))
        });
        let value = related
            .map(|r| project(r, &embed.columns))
            .unwrap_or(Value::Null);
        if let Value::Object(map) = &mut out {
            map.insert(embed.table.clone(), value);
        }
    }

    out
}

fn as_object(row: Value, table: &str) -> AppResult<Map<String, Value>> {
    match row {
        Value::Object(map) => Ok(map),
        other => Err(AppError::Backend {
            status: 400,
            message: format!("Expected an object for table {}, got {}", table, other),
        }),
    }
}

#[async_trait]
impl DataBackend for MemoryBackend {
    async fn select(&self, query: &Query) -> AppResult<Vec<Value>> {
        let store = self.store.read().await;
        let mut rows: Vec<&Value> = store
            .tables
            .get(query.table_name())
            .map(|rows| rows.iter().filter(|row| row_matches(row, query.filters())).collect())
            .unwrap_or_default();

        if let Some(order) = query.ordering() {
            rows.sort_by(|a, b| {
                let ordering = compare_cells(
                    a.get(&order.column).unwrap_or(&NULL),
                    b.get(&order.column).unwrap_or(&NULL),
                );
                if order.ascending {
                    ordering
                } else {
                    ordering.reverse()
                }
            });
        }

        let limit = query.row_limit().unwrap_or(usize::MAX);
        Ok(rows
            .into_iter()
            .take(limit)
            .map(|row| render(&store, row, query))
            .collect())
    }

    async fn insert(&self, query: &Query, rows: Value) -> AppResult<Vec<Value>> {
        let table = query.table_name();
        let rows = match rows {
            Value::Array(rows) => rows,
            row => vec![row],
        };

        let mut store = self.store.write().await;
        let mut stored = Vec::with_capacity(rows.len());
        for row in rows {
            let mut map = as_object(row, table)?;
            if map.get("id").map_or(true, Value::is_null) {
                map.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));
            }
            if map.get("created_at").map_or(true, Value::is_null) {
                let stamp = store.next_timestamp();
                map.insert("created_at".to_string(), Value::String(stamp.to_rfc3339()));
            }
            stored.push(Value::Object(map));
        }

        let rendered = stored.iter().map(|row| render(&store, row, query)).collect();
        store
            .tables
            .entry(table.to_string())
            .or_default()
            .extend(stored);
        tracing::debug!(table, "Memory backend insert");
        Ok(rendered)
    }

    async fn update(&self, query: &Query, patch: Value) -> AppResult<Vec<Value>> {
        let patch = as_object(patch, query.table_name())?;

        let mut store = self.store.write().await;
        let mut updated = Vec::new();
        if let Some(rows) = store.tables.get_mut(query.table_name()) {
            for row in rows.iter_mut().filter(|row| row_matches(row, query.filters())) {
                if let Value::Object(map) = &mut *row {
                    for (key, value) in &patch {
                        map.insert(key.clone(), value.clone());
                    }
                }
                updated.push(row.clone());
            }
        }

        Ok(updated.iter().map(|row| render(&store, row, query)).collect())
    }

    async fn delete(&self, query: &Query) -> AppResult<Vec<Value>> {
        let mut store = self.store.write().await;
        let mut deleted = Vec::new();
        if let Some(rows) = store.tables.get_mut(query.table_name()) {
            let (gone, kept): (Vec<Value>, Vec<Value>) = rows
                .drain(..)
                .partition(|row| row_matches(row, query.filters()));
            *rows = kept;
            deleted = gone;
        }

        Ok(deleted.iter().map(|row| project(row, query.selected_columns())).collect())
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

#[async_trait]
impl AuthBackend for MemoryBackend {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> AppResult<Session> {
        let email = email.to_lowercase();
        let account = self
            .accounts
            .get(&email)
            .filter(|account| account.password == password)
            .ok_or_else(|| AppError::Backend {
                status: 400,
                message: "Invalid login credentials".to_string(),
            })?;

        let now = Utc::now().timestamp();
        let expires_in = self.auth.jwt_expiration_hours as i64 * 3600;
        let claims = Claims {
            sub: account.id.to_string(),
            aud: self.auth.jwt_audience.clone(),
            email: Some(email.clone()),
            role: Some("authenticated".to_string()),
            exp: now + expires_in,
            iat: now,
        };
        let access_token = claims
            .create_token(&self.auth.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))?;

        Ok(Session {
            access_token,
            token_type: "bearer".to_string(),
            expires_in,
            refresh_token: None,
            user: AuthUser {
                id: account.id.to_string(),
                email: Some(email),
                role: claims.role,
            },
        })
    }

    /// No refresh tokens are issued here, so there is nothing to revoke
    async fn sign_out(&self, access_token: &str) -> AppResult<()> {
        self.claims_for(access_token)?;
        Ok(())
    }

    async fn get_user(&self, access_token: &str) -> AppResult<AuthUser> {
        let claims = self.claims_for(access_token)?;
        Ok(AuthUser {
            id: claims.sub,
            email: claims.email,
            role: claims.role,
        })
    }
}
