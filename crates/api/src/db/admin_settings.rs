//! Admin settings query builders. The table is a singleton: at most one row,
//! bootstrapped lazily on first startup and never deleted.

use sea_query::{Expr, Query, SqliteQueryBuilder};

use super::tables::AdminSettings;
use super::Built;

/// Column order must match `admin_settings_from_row()`.
fn settings_select() -> sea_query::SelectStatement {
    Query::select()
        .column(AdminSettings::Id)
        .column(AdminSettings::AdminPassword)
        .column(AdminSettings::DefaultAntiDeleteJid)
        .column(AdminSettings::AdminContact)
        .column(AdminSettings::CreatedAt)
        .column(AdminSettings::UpdatedAt)
        .from(AdminSettings::Table)
        .to_owned()
}

pub struct InsertParams<'a> {
    pub id: &'a str,
    pub admin_password: &'a str,
    pub default_anti_delete_jid: Option<&'a str>,
    pub admin_contact: Option<&'a str>,
    pub created_at: &'a str,
    pub updated_at: &'a str,
}

/// INSERT the singleton row (bootstrap only).
pub fn insert(p: &InsertParams<'_>) -> Built {
    Query::insert()
        .into_table(AdminSettings::Table)
        .columns([
            AdminSettings::Id,
            AdminSettings::AdminPassword,
            AdminSettings::DefaultAntiDeleteJid,
            AdminSettings::AdminContact,
            AdminSettings::CreatedAt,
            AdminSettings::UpdatedAt,
        ])
        .values_panic([
            p.id.into(),
            p.admin_password.into(),
            p.default_anti_delete_jid.map(|s| s.to_string()).into(),
            p.admin_contact.map(|s| s.to_string()).into(),
            p.created_at.into(),
            p.updated_at.into(),
        ])
        .build(SqliteQueryBuilder)
}

/// SELECT the first (only) row.
pub fn get_singleton() -> Built {
    settings_select().limit(1).build(SqliteQueryBuilder)
}

#[derive(Default)]
pub struct UpdateParams<'a> {
    pub default_anti_delete_jid: Option<&'a str>,
    pub admin_contact: Option<&'a str>,
}

/// UPDATE the singleton by its row id. Callers resolve the id via
/// `get_singleton()` first; a missing row is "not found", not an insert.
pub fn update_by_id(id: &str, p: &UpdateParams<'_>, updated_at: &str) -> Built {
    let mut q = Query::update()
        .table(AdminSettings::Table)
        .value(AdminSettings::UpdatedAt, updated_at)
        .to_owned();

    if let Some(jid) = p.default_anti_delete_jid {
        q.value(AdminSettings::DefaultAntiDeleteJid, jid);
    }
    if let Some(contact) = p.admin_contact {
        q.value(AdminSettings::AdminContact, contact);
    }

    q.and_where(Expr::col(AdminSettings::Id).eq(id))
        .build(SqliteQueryBuilder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn singleton_select_is_limited_to_one_row() {
        let (sql, _) = get_singleton();
        assert!(sql.contains("LIMIT"));
    }
}
