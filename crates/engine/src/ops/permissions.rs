//! Persisted permission overrides and the audit trail.
//!
//! The compiled-in defaults ([`default_grants`](crate::default_grants)) stay
//! authoritative until an admin writes an override; every change lands in
//! `permission_audit` so grants stay reviewable.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue, QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*,
};

use crate::{
    Permission, ResultEngine, Role, permission_audit, rbac, rbac::ALL_PERMISSIONS, role_grants,
};

use super::{Engine, with_tx};

/// One permission with its effective allow/deny state for a role.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PermissionGrant {
    pub permission: Permission,
    pub allowed: bool,
    /// `true` when the state comes from a persisted override rather than the
    /// defaults.
    pub overridden: bool,
}

/// One row of the permission audit trail.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PermissionAuditEntry {
    pub role: Role,
    pub permission: Permission,
    pub allowed: bool,
    pub changed_by: String,
    pub changed_at: DateTime<Utc>,
}

impl Engine {
    /// Effective permission set for a role: defaults plus overrides.
    pub async fn effective_permissions(
        &self,
        role: Role,
        user_id: &str,
    ) -> ResultEngine<Vec<PermissionGrant>> {
        with_tx!(self, |db_tx| {
            self.require_permission(&db_tx, user_id, Permission::PermissionsView)
                .await?;

            let overrides = role_grants::Entity::find()
                .filter(role_grants::Column::Role.eq(role.as_str()))
                .all(&db_tx)
                .await?;

            let mut grants = Vec::with_capacity(ALL_PERMISSIONS.len());
            for permission in ALL_PERMISSIONS {
                let row = overrides
                    .iter()
                    .find(|o| o.permission == permission.as_str());
                grants.push(PermissionGrant {
                    permission: *permission,
                    allowed: row
                        .map(|o| o.allowed)
                        .unwrap_or_else(|| rbac::has_permission(role, *permission)),
                    overridden: row.is_some(),
                });
            }
            Ok(grants)
        })
    }

    /// Writes a permission override and its audit row in one transaction.
    pub async fn set_permission(
        &self,
        role: Role,
        permission: Permission,
        allowed: bool,
        user_id: &str,
        changed_at: DateTime<Utc>,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_permission(&db_tx, user_id, Permission::PermissionsManage)
                .await?;

            let existing = role_grants::Entity::find_by_id((
                role.as_str().to_string(),
                permission.as_str().to_string(),
            ))
            .one(&db_tx)
            .await?;

            match existing {
                Some(_) => {
                    let model = role_grants::ActiveModel {
                        role: ActiveValue::Unchanged(role.as_str().to_string()),
                        permission: ActiveValue::Unchanged(permission.as_str().to_string()),
                        allowed: ActiveValue::Set(allowed),
                    };
                    model.update(&db_tx).await?;
                }
                None => {
                    let model = role_grants::ActiveModel {
                        role: ActiveValue::Set(role.as_str().to_string()),
                        permission: ActiveValue::Set(permission.as_str().to_string()),
                        allowed: ActiveValue::Set(allowed),
                    };
                    model.insert(&db_tx).await?;
                }
            }

            let audit = permission_audit::ActiveModel {
                id: ActiveValue::NotSet,
                role: ActiveValue::Set(role.as_str().to_string()),
                permission: ActiveValue::Set(permission.as_str().to_string()),
                allowed: ActiveValue::Set(allowed),
                changed_by: ActiveValue::Set(user_id.to_string()),
                changed_at: ActiveValue::Set(changed_at),
            };
            audit.insert(&db_tx).await?;

            Ok(())
        })
    }

    /// Lists the audit trail, newest first.
    pub async fn permission_audit(
        &self,
        limit: u64,
        user_id: &str,
    ) -> ResultEngine<Vec<PermissionAuditEntry>> {
        with_tx!(self, |db_tx| {
            self.require_permission(&db_tx, user_id, Permission::PermissionsView)
                .await?;

            let rows = permission_audit::Entity::find()
                .order_by_desc(permission_audit::Column::Id)
                .limit(limit)
                .all(&db_tx)
                .await?;

            let mut out = Vec::with_capacity(rows.len());
            for row in rows {
                out.push(PermissionAuditEntry {
                    role: Role::try_from(row.role.as_str())?,
                    permission: Permission::try_from(row.permission.as_str())?,
                    allowed: row.allowed,
                    changed_by: row.changed_by,
                    changed_at: row.changed_at,
                });
            }
            Ok(out)
        })
    }
}
