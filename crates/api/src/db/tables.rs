//! Compile-time–checked column identifiers for all tables.

use sea_query::Iden;

#[derive(Iden)]
pub enum WhatsappSessions {
    Table,
    Id,
    SessionId,
    PhoneNumber,
    WhatsappName,
    Status,
    SessionData,
    PairingCode,
    LastActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub enum BotSettings {
    Table,
    Id,
    SessionId,
    AntiDeleteJid,
    IsAntiDeleteEnabled,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub enum AdminSettings {
    Table,
    Id,
    AdminPassword,
    DefaultAntiDeleteJid,
    AdminContact,
    CreatedAt,
    UpdatedAt,
}
