//! Confirmation dispatcher.
//!
//! Simulates delivering a confirmation message to a freshly linked account.
//! A real messaging integration plugs in at `send_message`; the rest of the
//! system only sees success/failure. On success the session is driven
//! `connecting -> active` through the enforced lifecycle; on failure nothing
//! is mutated.

use std::time::Duration;

use wabridge_api::db;
use wabridge_core::{validate_transition, SessionStatus};

use crate::storage::{self, session_from_row, sq_execute, sq_query_opt, Db};

/// Stand-in delay for the external messaging API round trip.
const SEND_DELAY: Duration = Duration::from_secs(1);

/// Deliver a single message. Stubbed: logs and reports success after a
/// fixed delay.
async fn send_message(to: &str, message: &str) -> bool {
    tracing::info!("sending confirmation to {to}: {message}");
    tokio::time::sleep(SEND_DELAY).await;
    true
}

/// Send the "session linked" confirmation and, if delivery succeeds,
/// activate the session and refresh `last_active`. Returns whether the
/// session ended up active.
pub async fn send_session_confirmation(db: &Db, session_id: &str, phone_number: &str) -> bool {
    let message = format!(
        "Your session has been successfully linked!\n\n\
         Session ID: {session_id}\n\n\
         This session is now active and ready to use. Keep this Session ID \
         safe - you'll need it for your bot configuration.\n\n\
         Powered by WABridge"
    );

    if !send_message(phone_number, &message).await {
        return false;
    }

    match activate_session(db, session_id) {
        Ok(()) => true,
        Err(e) => {
            tracing::error!("activate session {session_id}: {e}");
            false
        }
    }
}

fn activate_session(db: &Db, session_id: &str) -> anyhow::Result<()> {
    let conn = db.conn();
    let session = sq_query_opt(
        &conn,
        db::sessions::get_by_session_id(session_id),
        session_from_row,
    )?
    .ok_or_else(|| anyhow::anyhow!("session not found"))?;

    validate_transition(session.status, SessionStatus::Active)?;

    let ts = storage::now();
    sq_execute(
        &conn,
        db::sessions::update(
            session_id,
            &db::sessions::UpdateParams {
                status: Some(SessionStatus::Active.as_str()),
                last_active: Some(&ts),
                ..Default::default()
            },
            &ts,
        ),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{init_db, now, sq_query_row};

    fn seeded_db(status: &str) -> (Db, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db = init_db(dir.path()).unwrap();
        let ts = now();
        db.insert_session_with_settings(
            &db::sessions::InsertParams {
                id: "row-1",
                session_id: "sess-1",
                phone_number: Some("+15551234567"),
                status,
                pairing_code: None,
                created_at: &ts,
                updated_at: &ts,
            },
            &db::bot_settings::InsertParams {
                id: "settings-1",
                session_id: "sess-1",
                anti_delete_jid: None,
                is_anti_delete_enabled: true,
                created_at: &ts,
                updated_at: &ts,
            },
        )
        .unwrap();
        (db, dir)
    }

    #[tokio::test(start_paused = true)]
    async fn successful_delivery_activates_the_session() {
        let (db, _dir) = seeded_db("connecting");
        assert!(send_session_confirmation(&db, "sess-1", "+15551234567").await);

        let conn = db.conn();
        let rec = sq_query_row(&conn, db::sessions::get_by_session_id("sess-1"), session_from_row)
            .unwrap();
        assert_eq!(rec.status, SessionStatus::Active);
        assert!(rec.last_active.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_session_reports_failure() {
        let (db, _dir) = seeded_db("connecting");
        assert!(!send_session_confirmation(&db, "missing", "+15551234567").await);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_session_cannot_be_confirmed_into_active() {
        let (db, _dir) = seeded_db("failed");
        assert!(!send_session_confirmation(&db, "sess-1", "+15551234567").await);

        let conn = db.conn();
        let rec = sq_query_row(&conn, db::sessions::get_by_session_id("sess-1"), session_from_row)
            .unwrap();
        assert_eq!(rec.status, SessionStatus::Failed);
    }
}
