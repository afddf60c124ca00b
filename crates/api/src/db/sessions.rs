//! Session query builders.

use sea_query::{Expr, Order, Query, SqliteQueryBuilder};

use super::tables::WhatsappSessions;
use super::Built;

// ── Helpers ────────────────────────────────────────────────────────────────

/// Add the full session column set to a SELECT.
/// Column order must match `session_from_row()` positional mappers.
fn session_columns(q: &mut sea_query::SelectStatement) -> &mut sea_query::SelectStatement {
    q.column(WhatsappSessions::Id)
        .column(WhatsappSessions::SessionId)
        .column(WhatsappSessions::PhoneNumber)
        .column(WhatsappSessions::WhatsappName)
        .column(WhatsappSessions::Status)
        .column(WhatsappSessions::SessionData)
        .column(WhatsappSessions::PairingCode)
        .column(WhatsappSessions::LastActive)
        .column(WhatsappSessions::CreatedAt)
        .column(WhatsappSessions::UpdatedAt)
}

fn session_select() -> sea_query::SelectStatement {
    let mut q = Query::select().to_owned();
    session_columns(&mut q);
    q.from(WhatsappSessions::Table).to_owned()
}

// ── Queries ────────────────────────────────────────────────────────────────

/// Parameters for inserting a session. A new session is always `connecting`
/// with no name, data, or last-active yet.
pub struct InsertParams<'a> {
    pub id: &'a str,
    pub session_id: &'a str,
    pub phone_number: Option<&'a str>,
    pub status: &'a str,
    pub pairing_code: Option<&'a str>,
    pub created_at: &'a str,
    pub updated_at: &'a str,
}

/// INSERT a new session.
pub fn insert(p: &InsertParams<'_>) -> Built {
    Query::insert()
        .into_table(WhatsappSessions::Table)
        .columns([
            WhatsappSessions::Id,
            WhatsappSessions::SessionId,
            WhatsappSessions::PhoneNumber,
            WhatsappSessions::Status,
            WhatsappSessions::PairingCode,
            WhatsappSessions::CreatedAt,
            WhatsappSessions::UpdatedAt,
        ])
        .values_panic([
            p.id.into(),
            p.session_id.into(),
            p.phone_number.map(|s| s.to_string()).into(),
            p.status.into(),
            p.pairing_code.map(|s| s.to_string()).into(),
            p.created_at.into(),
            p.updated_at.into(),
        ])
        .build(SqliteQueryBuilder)
}

/// SELECT a single session by its external `session_id` handle.
pub fn get_by_session_id(session_id: &str) -> Built {
    session_select()
        .and_where(Expr::col(WhatsappSessions::SessionId).eq(session_id))
        .build(SqliteQueryBuilder)
}

/// SELECT `session_id, status, updated_at` — the cheap poller payload.
pub fn get_status(session_id: &str) -> Built {
    Query::select()
        .column(WhatsappSessions::SessionId)
        .column(WhatsappSessions::Status)
        .column(WhatsappSessions::UpdatedAt)
        .from(WhatsappSessions::Table)
        .and_where(Expr::col(WhatsappSessions::SessionId).eq(session_id))
        .build(SqliteQueryBuilder)
}

/// SELECT all sessions, newest first. The ordering is load-bearing for the
/// admin dashboard's default view.
pub fn list_newest_first() -> Built {
    session_select()
        .order_by(WhatsappSessions::CreatedAt, Order::Desc)
        .build(SqliteQueryBuilder)
}

/// Partial-update field set. `None` leaves a column untouched; `updated_at`
/// is always refreshed.
#[derive(Default)]
pub struct UpdateParams<'a> {
    pub status: Option<&'a str>,
    pub phone_number: Option<&'a str>,
    pub whatsapp_name: Option<&'a str>,
    pub session_data: Option<&'a str>,
    pub last_active: Option<&'a str>,
}

/// UPDATE a session by `session_id`, merging only the provided fields.
pub fn update(session_id: &str, p: &UpdateParams<'_>, updated_at: &str) -> Built {
    let mut q = Query::update()
        .table(WhatsappSessions::Table)
        .value(WhatsappSessions::UpdatedAt, updated_at)
        .to_owned();

    if let Some(status) = p.status {
        q.value(WhatsappSessions::Status, status);
    }
    if let Some(phone) = p.phone_number {
        q.value(WhatsappSessions::PhoneNumber, phone);
    }
    if let Some(name) = p.whatsapp_name {
        q.value(WhatsappSessions::WhatsappName, name);
    }
    if let Some(data) = p.session_data {
        q.value(WhatsappSessions::SessionData, data);
    }
    if let Some(ts) = p.last_active {
        q.value(WhatsappSessions::LastActive, ts);
    }

    q.and_where(Expr::col(WhatsappSessions::SessionId).eq(session_id))
        .build(SqliteQueryBuilder)
}

/// DELETE a session by `session_id`. Row count tells the caller whether
/// anything was actually removed.
pub fn delete(session_id: &str) -> Built {
    Query::delete()
        .from_table(WhatsappSessions::Table)
        .and_where(Expr::col(WhatsappSessions::SessionId).eq(session_id))
        .build(SqliteQueryBuilder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_binds_all_columns() {
        let (sql, values) = insert(&InsertParams {
            id: "row-1",
            session_id: "sess-1",
            phone_number: Some("+15551234567"),
            status: "connecting",
            pairing_code: None,
            created_at: "2025-01-01T00:00:00.000000Z",
            updated_at: "2025-01-01T00:00:00.000000Z",
        });
        assert!(sql.starts_with("INSERT INTO \"whatsapp_sessions\""));
        assert_eq!(values.0.len(), 7);
    }

    #[test]
    fn update_skips_absent_fields() {
        let (sql, values) = update(
            "sess-1",
            &UpdateParams {
                status: Some("active"),
                ..Default::default()
            },
            "2025-01-01T00:00:01.000000Z",
        );
        assert!(sql.contains("\"updated_at\""));
        assert!(sql.contains("\"status\""));
        assert!(!sql.contains("\"whatsapp_name\""));
        // updated_at + status + WHERE session_id
        assert_eq!(values.0.len(), 3);
    }

    #[test]
    fn list_orders_by_created_at_desc() {
        let (sql, _) = list_newest_first();
        assert!(sql.contains("ORDER BY \"created_at\" DESC"));
    }
}
