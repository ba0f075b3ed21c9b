//! Static role/permission tables.
//!
//! Roles and permission identifiers are compiled-in constants; the database
//! only stores per-role *overrides* on top of [`default_grants`] (see
//! `ops::permissions`). The pure [`has_permission`] lookup answers against
//! the defaults alone and is what UI layers use to gate visibility.

use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Account role.
///
/// - `Admin`: full access, can manage staff and permission overrides.
/// - `Staff`: day-to-day operations (events, catalog, clients, revenue).
/// - `Client`: read-only views scoped to their own bookings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Staff,
    Client,
}

impl Role {
    /// Canonical role string used by the database.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Staff => "staff",
            Self::Client => "client",
        }
    }
}

impl TryFrom<&str> for Role {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "admin" => Ok(Self::Admin),
            "staff" => Ok(Self::Staff),
            "client" => Ok(Self::Client),
            other => Err(EngineError::InvalidRole(format!("invalid role: {other}"))),
        }
    }
}

/// Permission identifiers, grouped by category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    EventsView,
    EventsCreate,
    EventsEdit,
    EventsCancel,
    MenuView,
    MenuEdit,
    RecipesView,
    RecipesEdit,
    ClientsView,
    ClientsEdit,
    InvoicesView,
    InvoicesIssue,
    InvoicesVoid,
    RevenueRecord,
    AnalyticsView,
    AnalyticsExport,
    StaffView,
    StaffManage,
    PermissionsView,
    PermissionsManage,
}

/// Every known permission, in display order.
pub const ALL_PERMISSIONS: &[Permission] = &[
    Permission::EventsView,
    Permission::EventsCreate,
    Permission::EventsEdit,
    Permission::EventsCancel,
    Permission::MenuView,
    Permission::MenuEdit,
    Permission::RecipesView,
    Permission::RecipesEdit,
    Permission::ClientsView,
    Permission::ClientsEdit,
    Permission::InvoicesView,
    Permission::InvoicesIssue,
    Permission::InvoicesVoid,
    Permission::RevenueRecord,
    Permission::AnalyticsView,
    Permission::AnalyticsExport,
    Permission::StaffView,
    Permission::StaffManage,
    Permission::PermissionsView,
    Permission::PermissionsManage,
];

impl Permission {
    /// Canonical dotted identifier, e.g. `events.view`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EventsView => "events.view",
            Self::EventsCreate => "events.create",
            Self::EventsEdit => "events.edit",
            Self::EventsCancel => "events.cancel",
            Self::MenuView => "menu.view",
            Self::MenuEdit => "menu.edit",
            Self::RecipesView => "recipes.view",
            Self::RecipesEdit => "recipes.edit",
            Self::ClientsView => "clients.view",
            Self::ClientsEdit => "clients.edit",
            Self::InvoicesView => "invoices.view",
            Self::InvoicesIssue => "invoices.issue",
            Self::InvoicesVoid => "invoices.void",
            Self::RevenueRecord => "revenue.record",
            Self::AnalyticsView => "analytics.view",
            Self::AnalyticsExport => "analytics.export",
            Self::StaffView => "staff.view",
            Self::StaffManage => "staff.manage",
            Self::PermissionsView => "permissions.view",
            Self::PermissionsManage => "permissions.manage",
        }
    }

    /// Category used to group permissions in management views.
    pub fn category(self) -> &'static str {
        match self {
            Self::EventsView | Self::EventsCreate | Self::EventsEdit | Self::EventsCancel => {
                "events"
            }
            Self::MenuView | Self::MenuEdit | Self::RecipesView | Self::RecipesEdit => "menu",
            Self::ClientsView | Self::ClientsEdit => "clients",
            Self::InvoicesView
            | Self::InvoicesIssue
            | Self::InvoicesVoid
            | Self::RevenueRecord => "billing",
            Self::AnalyticsView | Self::AnalyticsExport => "analytics",
            Self::StaffView | Self::StaffManage => "staff",
            Self::PermissionsView | Self::PermissionsManage => "admin",
        }
    }
}

impl TryFrom<&str> for Permission {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        ALL_PERMISSIONS
            .iter()
            .copied()
            .find(|p| p.as_str() == value)
            .ok_or_else(|| EngineError::InvalidRole(format!("invalid permission: {value}")))
    }
}

const STAFF_GRANTS: &[Permission] = &[
    Permission::EventsView,
    Permission::EventsCreate,
    Permission::EventsEdit,
    Permission::EventsCancel,
    Permission::MenuView,
    Permission::RecipesView,
    Permission::RecipesEdit,
    Permission::ClientsView,
    Permission::ClientsEdit,
    Permission::InvoicesView,
    Permission::InvoicesIssue,
    Permission::RevenueRecord,
    Permission::AnalyticsView,
];

const CLIENT_GRANTS: &[Permission] = &[
    Permission::EventsView,
    Permission::MenuView,
    Permission::InvoicesView,
];

/// Compiled-in default grants for a role.
///
/// Admins hold every permission; staff hold the operational subset; clients
/// only see their own bookings, the menu and their invoices.
pub fn default_grants(role: Role) -> &'static [Permission] {
    match role {
        Role::Admin => ALL_PERMISSIONS,
        Role::Staff => STAFF_GRANTS,
        Role::Client => CLIENT_GRANTS,
    }
}

/// Pure lookup against the default grant table.
pub fn has_permission(role: Role, permission: Permission) -> bool {
    default_grants(role).contains(&permission)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_holds_every_permission() {
        for permission in ALL_PERMISSIONS {
            assert!(has_permission(Role::Admin, *permission));
        }
    }

    #[test]
    fn staff_cannot_manage_permissions_or_staff() {
        assert!(has_permission(Role::Staff, Permission::EventsCreate));
        assert!(!has_permission(Role::Staff, Permission::StaffManage));
        assert!(!has_permission(Role::Staff, Permission::PermissionsManage));
        assert!(!has_permission(Role::Staff, Permission::InvoicesVoid));
    }

    #[test]
    fn client_is_read_only() {
        assert!(has_permission(Role::Client, Permission::EventsView));
        assert!(has_permission(Role::Client, Permission::MenuView));
        assert!(!has_permission(Role::Client, Permission::EventsCreate));
        assert!(!has_permission(Role::Client, Permission::ClientsView));
    }

    #[test]
    fn permission_ids_round_trip() {
        for permission in ALL_PERMISSIONS {
            assert_eq!(
                Permission::try_from(permission.as_str()).unwrap(),
                *permission
            );
        }
        assert!(Permission::try_from("events.destroy").is_err());
    }

    #[test]
    fn role_strings_round_trip() {
        for role in [Role::Admin, Role::Staff, Role::Client] {
            assert_eq!(Role::try_from(role.as_str()).unwrap(), role);
        }
        assert!(Role::try_from("owner").is_err());
    }
}
