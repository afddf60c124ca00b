use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};

use wabridge_api::db::{self, Built};
use wabridge_api::{BotSettingsRecord, SessionRecord, SessionStatusResponse};
use wabridge_core::SessionStatus;

/// Shared database state. Constructed once in `main` (or per test) and
/// passed into every handler — no process-wide singleton handle.
#[derive(Clone)]
pub struct Db {
    conn: Arc<Mutex<Connection>>,
}

impl Db {
    pub fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().expect("database mutex poisoned")
    }

    /// Create a session and its default bot settings as one unit of work.
    /// Either both rows land or neither does — a failed settings insert can
    /// never orphan a session.
    pub fn insert_session_with_settings(
        &self,
        session: &db::sessions::InsertParams<'_>,
        settings: &db::bot_settings::InsertParams<'_>,
    ) -> rusqlite::Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        sq_execute(&tx, db::sessions::insert(session))?;
        sq_execute(&tx, db::bot_settings::insert(settings))?;
        tx.commit()
    }
}

/// Initialize the database: open connection, enable WAL, run migrations.
pub fn init_db(data_dir: &Path) -> Result<Db> {
    std::fs::create_dir_all(data_dir)?;
    let db_path = data_dir.join("wabridge.db");
    let conn = Connection::open(&db_path).context("opening SQLite database")?;

    // WAL for concurrent reads; foreign_keys so bot_settings cascade on
    // session delete.
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    conn.execute_batch("PRAGMA foreign_keys=ON;")?;

    run_migrations(&conn)?;

    Ok(Db {
        conn: Arc::new(Mutex::new(conn)),
    })
}

fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS _migrations (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )?;

    for (name, sql) in db::migrations::MIGRATIONS {
        let already_applied: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM _migrations WHERE name = ?1",
                [name],
                |row| row.get(0),
            )
            .unwrap_or(false);

        if !already_applied {
            conn.execute_batch(sql)
                .with_context(|| format!("running migration {name}"))?;
            conn.execute("INSERT INTO _migrations (name) VALUES (?1)", [name])?;
            tracing::info!("Applied migration: {name}");
        }
    }

    Ok(())
}

/// Current timestamp as stored everywhere: RFC 3339 with microseconds, so
/// lexicographic order equals chronological order.
pub fn now() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}

/// True when an insert failed on a uniqueness constraint (duplicate
/// `session_id` and the like).
pub fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

// ── sea-query → rusqlite bridge ─────────────────────────────────────────────

fn sq_value(v: &sea_query::Value) -> rusqlite::types::Value {
    use rusqlite::types::Value as Sql;
    use sea_query::Value;
    match v {
        Value::Bool(Some(b)) => Sql::Integer(*b as i64),
        Value::TinyInt(Some(i)) => Sql::Integer(*i as i64),
        Value::SmallInt(Some(i)) => Sql::Integer(*i as i64),
        Value::Int(Some(i)) => Sql::Integer(*i as i64),
        Value::BigInt(Some(i)) => Sql::Integer(*i),
        Value::TinyUnsigned(Some(i)) => Sql::Integer(*i as i64),
        Value::SmallUnsigned(Some(i)) => Sql::Integer(*i as i64),
        Value::Unsigned(Some(i)) => Sql::Integer(*i as i64),
        Value::BigUnsigned(Some(i)) => Sql::Integer(*i as i64),
        Value::Float(Some(f)) => Sql::Real(*f as f64),
        Value::Double(Some(f)) => Sql::Real(*f),
        Value::String(Some(s)) => Sql::Text((**s).clone()),
        Value::Char(Some(c)) => Sql::Text(c.to_string()),
        Value::Bytes(Some(b)) => Sql::Blob((**b).clone()),
        _ => Sql::Null,
    }
}

/// Execute a built statement, returning the affected row count.
pub fn sq_execute(conn: &Connection, (sql, values): Built) -> rusqlite::Result<usize> {
    let mut stmt = conn.prepare(&sql)?;
    stmt.execute(rusqlite::params_from_iter(values.0.iter().map(sq_value)))
}

/// Run a built SELECT expected to return exactly one row.
pub fn sq_query_row<T>(
    conn: &Connection,
    (sql, values): Built,
    f: impl FnOnce(&rusqlite::Row<'_>) -> rusqlite::Result<T>,
) -> rusqlite::Result<T> {
    let mut stmt = conn.prepare(&sql)?;
    stmt.query_row(rusqlite::params_from_iter(values.0.iter().map(sq_value)), f)
}

/// Run a built SELECT where absence is a normal outcome, not an error.
pub fn sq_query_opt<T>(
    conn: &Connection,
    built: Built,
    f: impl FnOnce(&rusqlite::Row<'_>) -> rusqlite::Result<T>,
) -> rusqlite::Result<Option<T>> {
    sq_query_row(conn, built, f).optional()
}

/// Run a built SELECT returning all rows.
pub fn sq_query_map<T>(
    conn: &Connection,
    (sql, values): Built,
    f: impl FnMut(&rusqlite::Row<'_>) -> rusqlite::Result<T>,
) -> rusqlite::Result<Vec<T>> {
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(values.0.iter().map(sq_value)), f)?;
    rows.collect()
}

// ── Row mappers ─────────────────────────────────────────────────────────────
// Positional; column order is fixed by the builders in `wabridge_api::db`.

fn status_at(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<SessionStatus> {
    let raw: String = row.get(idx)?;
    raw.parse().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

pub fn session_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SessionRecord> {
    let session_data: Option<String> = row.get(5)?;
    Ok(SessionRecord {
        id: row.get(0)?,
        session_id: row.get(1)?,
        phone_number: row.get(2)?,
        whatsapp_name: row.get(3)?,
        status: status_at(row, 4)?,
        session_data: session_data.and_then(|s| serde_json::from_str(&s).ok()),
        pairing_code: row.get(6)?,
        last_active: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

pub fn session_status_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SessionStatusResponse> {
    Ok(SessionStatusResponse {
        session_id: row.get(0)?,
        status: status_at(row, 1)?,
        updated_at: row.get(2)?,
    })
}

pub fn bot_settings_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<BotSettingsRecord> {
    Ok(BotSettingsRecord {
        id: row.get(0)?,
        session_id: row.get(1)?,
        anti_delete_jid: row.get(2)?,
        is_anti_delete_enabled: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

/// Internal admin settings row. The password stays server-side; the API
/// view type in `wabridge_api` deliberately has no password field.
#[derive(Debug, Clone)]
pub struct AdminSettingsRow {
    pub id: String,
    pub admin_password: String,
    pub default_anti_delete_jid: Option<String>,
    pub admin_contact: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

pub fn admin_settings_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<AdminSettingsRow> {
    Ok(AdminSettingsRow {
        id: row.get(0)?,
        admin_password: row.get(1)?,
        default_anti_delete_jid: row.get(2)?,
        admin_contact: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

// ── Bootstrap ───────────────────────────────────────────────────────────────

/// Lazily create the admin settings singleton on first startup. Subsequent
/// starts are no-ops; the row is never deleted.
pub fn ensure_admin_settings(db: &Db, default_password: &str) -> Result<()> {
    let conn = db.conn();
    let existing = sq_query_opt(
        &conn,
        db::admin_settings::get_singleton(),
        admin_settings_from_row,
    )?;
    if existing.is_some() {
        return Ok(());
    }

    let ts = now();
    sq_execute(
        &conn,
        db::admin_settings::insert(&db::admin_settings::InsertParams {
            id: &uuid::Uuid::new_v4().to_string(),
            admin_password: default_password,
            default_anti_delete_jid: Some(""),
            admin_contact: Some(""),
            created_at: &ts,
            updated_at: &ts,
        }),
    )?;
    tracing::info!("bootstrapped admin settings");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> (Db, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db = init_db(dir.path()).unwrap();
        (db, dir)
    }

    fn insert_session(db: &Db, session_id: &str) {
        let ts = now();
        db.insert_session_with_settings(
            &db::sessions::InsertParams {
                id: &uuid::Uuid::new_v4().to_string(),
                session_id,
                phone_number: None,
                status: "connecting",
                pairing_code: None,
                created_at: &ts,
                updated_at: &ts,
            },
            &db::bot_settings::InsertParams {
                id: &uuid::Uuid::new_v4().to_string(),
                session_id,
                anti_delete_jid: None,
                is_anti_delete_enabled: true,
                created_at: &ts,
                updated_at: &ts,
            },
        )
        .unwrap();
    }

    #[test]
    fn create_then_read_back() {
        let (db, _dir) = test_db();
        insert_session(&db, "sess-1");

        let conn = db.conn();
        let rec = sq_query_row(&conn, db::sessions::get_by_session_id("sess-1"), session_from_row)
            .unwrap();
        assert_eq!(rec.session_id, "sess-1");
        assert_eq!(rec.status, SessionStatus::Connecting);
        assert!(rec.last_active.is_none());

        let settings = sq_query_row(
            &conn,
            db::bot_settings::get_by_session_id("sess-1"),
            bot_settings_from_row,
        )
        .unwrap();
        assert!(settings.is_anti_delete_enabled);
    }

    #[test]
    fn absent_session_is_none_not_error() {
        let (db, _dir) = test_db();
        let conn = db.conn();
        let found = sq_query_opt(&conn, db::sessions::get_by_session_id("nope"), session_from_row)
            .unwrap();
        assert!(found.is_none());
    }

    #[test]
    fn duplicate_session_id_is_a_constraint_violation() {
        let (db, _dir) = test_db();
        insert_session(&db, "sess-1");

        let ts = now();
        let err = {
            let conn = db.conn();
            sq_execute(
                &conn,
                db::sessions::insert(&db::sessions::InsertParams {
                    id: &uuid::Uuid::new_v4().to_string(),
                    session_id: "sess-1",
                    phone_number: None,
                    status: "connecting",
                    pairing_code: None,
                    created_at: &ts,
                    updated_at: &ts,
                }),
            )
            .unwrap_err()
        };
        assert!(is_constraint_violation(&err));
    }

    #[test]
    fn update_refreshes_updated_at_and_merges_fields() {
        let (db, _dir) = test_db();
        insert_session(&db, "sess-1");

        let conn = db.conn();
        let before =
            sq_query_row(&conn, db::sessions::get_by_session_id("sess-1"), session_from_row)
                .unwrap();

        let ts = now();
        let changed = sq_execute(
            &conn,
            db::sessions::update(
                "sess-1",
                &db::sessions::UpdateParams {
                    status: Some("active"),
                    whatsapp_name: Some("Alice"),
                    last_active: Some(&ts),
                    ..Default::default()
                },
                &ts,
            ),
        )
        .unwrap();
        assert_eq!(changed, 1);

        let after =
            sq_query_row(&conn, db::sessions::get_by_session_id("sess-1"), session_from_row)
                .unwrap();
        assert_eq!(after.status, SessionStatus::Active);
        assert_eq!(after.whatsapp_name.as_deref(), Some("Alice"));
        // untouched fields survive the merge
        assert_eq!(after.created_at, before.created_at);
        assert!(after.updated_at > before.updated_at);
    }

    #[test]
    fn delete_reports_row_count_and_cascades() {
        let (db, _dir) = test_db();
        insert_session(&db, "sess-1");

        let conn = db.conn();
        assert_eq!(sq_execute(&conn, db::sessions::delete("sess-1")).unwrap(), 1);
        // second delete removes nothing
        assert_eq!(sq_execute(&conn, db::sessions::delete("sess-1")).unwrap(), 0);

        let settings = sq_query_opt(
            &conn,
            db::bot_settings::get_by_session_id("sess-1"),
            bot_settings_from_row,
        )
        .unwrap();
        assert!(settings.is_none(), "bot settings must cascade on delete");
    }

    #[test]
    fn list_is_newest_first() {
        let (db, _dir) = test_db();
        insert_session(&db, "older");
        insert_session(&db, "newer");

        let conn = db.conn();
        let all = sq_query_map(&conn, db::sessions::list_newest_first(), session_from_row)
            .unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].session_id, "newer");
        assert_eq!(all[1].session_id, "older");
    }

    #[test]
    fn admin_bootstrap_runs_once() {
        let (db, _dir) = test_db();
        ensure_admin_settings(&db, "admin123").unwrap();
        ensure_admin_settings(&db, "other-password").unwrap();

        let conn = db.conn();
        let row = sq_query_row(
            &conn,
            db::admin_settings::get_singleton(),
            admin_settings_from_row,
        )
        .unwrap();
        // second call must not overwrite the existing singleton
        assert_eq!(row.admin_password, "admin123");
    }

    #[test]
    fn failed_pair_insert_rolls_back_the_session() {
        let (db, _dir) = test_db();
        insert_session(&db, "sess-1");

        // Reuse sess-1's settings row id to force the second insert to fail.
        let ts = now();
        let result = db.insert_session_with_settings(
            &db::sessions::InsertParams {
                id: &uuid::Uuid::new_v4().to_string(),
                session_id: "sess-2",
                phone_number: None,
                status: "connecting",
                pairing_code: None,
                created_at: &ts,
                updated_at: &ts,
            },
            &db::bot_settings::InsertParams {
                id: &uuid::Uuid::new_v4().to_string(),
                session_id: "sess-1",
                anti_delete_jid: None,
                is_anti_delete_enabled: true,
                created_at: &ts,
                updated_at: &ts,
            },
        );
        assert!(result.is_err());

        let conn = db.conn();
        let orphan = sq_query_opt(&conn, db::sessions::get_by_session_id("sess-2"), session_from_row)
            .unwrap();
        assert!(orphan.is_none(), "session insert must roll back");
    }
}
