//! Bot settings query builders. One row per session, created in lockstep
//! with it.

use sea_query::{Expr, Query, SqliteQueryBuilder};

use super::tables::BotSettings;
use super::Built;

/// Column order must match `bot_settings_from_row()`.
fn settings_select() -> sea_query::SelectStatement {
    Query::select()
        .column(BotSettings::Id)
        .column(BotSettings::SessionId)
        .column(BotSettings::AntiDeleteJid)
        .column(BotSettings::IsAntiDeleteEnabled)
        .column(BotSettings::CreatedAt)
        .column(BotSettings::UpdatedAt)
        .from(BotSettings::Table)
        .to_owned()
}

pub struct InsertParams<'a> {
    pub id: &'a str,
    pub session_id: &'a str,
    pub anti_delete_jid: Option<&'a str>,
    pub is_anti_delete_enabled: bool,
    pub created_at: &'a str,
    pub updated_at: &'a str,
}

/// INSERT default bot settings for a freshly created session.
pub fn insert(p: &InsertParams<'_>) -> Built {
    Query::insert()
        .into_table(BotSettings::Table)
        .columns([
            BotSettings::Id,
            BotSettings::SessionId,
            BotSettings::AntiDeleteJid,
            BotSettings::IsAntiDeleteEnabled,
            BotSettings::CreatedAt,
            BotSettings::UpdatedAt,
        ])
        .values_panic([
            p.id.into(),
            p.session_id.into(),
            p.anti_delete_jid.map(|s| s.to_string()).into(),
            p.is_anti_delete_enabled.into(),
            p.created_at.into(),
            p.updated_at.into(),
        ])
        .build(SqliteQueryBuilder)
}

/// SELECT the settings row for a session.
pub fn get_by_session_id(session_id: &str) -> Built {
    settings_select()
        .and_where(Expr::col(BotSettings::SessionId).eq(session_id))
        .build(SqliteQueryBuilder)
}

#[derive(Default)]
pub struct UpdateParams<'a> {
    pub anti_delete_jid: Option<&'a str>,
    pub is_anti_delete_enabled: Option<bool>,
}

/// UPDATE settings by session id, merging only the provided fields.
pub fn update(session_id: &str, p: &UpdateParams<'_>, updated_at: &str) -> Built {
    let mut q = Query::update()
        .table(BotSettings::Table)
        .value(BotSettings::UpdatedAt, updated_at)
        .to_owned();

    if let Some(jid) = p.anti_delete_jid {
        q.value(BotSettings::AntiDeleteJid, jid);
    }
    if let Some(enabled) = p.is_anti_delete_enabled {
        q.value(BotSettings::IsAntiDeleteEnabled, enabled);
    }

    q.and_where(Expr::col(BotSettings::SessionId).eq(session_id))
        .build(SqliteQueryBuilder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_with_no_fields_still_touches_updated_at() {
        let (sql, values) = update("sess-1", &UpdateParams::default(), "ts");
        assert!(sql.contains("\"updated_at\""));
        assert_eq!(values.0.len(), 2);
    }
}
