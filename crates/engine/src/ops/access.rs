//! User resolution and permission checks.
//!
//! Every DB-backed op resolves the acting user first and checks its
//! effective permission: persisted `role_grants` overrides win over the
//! compiled-in [`default_grants`](crate::default_grants).

use sea_orm::{DatabaseTransaction, QueryFilter, prelude::*};

use crate::{EngineError, Permission, ResultEngine, Role, rbac, role_grants, users};

use super::Engine;

impl Engine {
    /// Resolves an active (non-archived) user row and its parsed role.
    pub(super) async fn require_user(
        &self,
        db: &DatabaseTransaction,
        username: &str,
    ) -> ResultEngine<(users::Model, Role)> {
        let model = users::Entity::find_by_id(username.to_string())
            .filter(users::Column::Archived.eq(false))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))?;
        let role = Role::try_from(model.role.as_str())?;
        Ok((model, role))
    }

    /// Effective check: persisted override if present, defaults otherwise.
    pub(super) async fn role_allows(
        &self,
        db: &DatabaseTransaction,
        role: Role,
        permission: Permission,
    ) -> ResultEngine<bool> {
        let row = role_grants::Entity::find_by_id((
            role.as_str().to_string(),
            permission.as_str().to_string(),
        ))
        .one(db)
        .await?;
        Ok(match row {
            Some(grant) => grant.allowed,
            None => rbac::has_permission(role, permission),
        })
    }

    /// Fails with [`EngineError::Forbidden`] unless the user's role holds the
    /// permission. Returns the role for callers that scope by it.
    pub(super) async fn require_permission(
        &self,
        db: &DatabaseTransaction,
        username: &str,
        permission: Permission,
    ) -> ResultEngine<Role> {
        let (_, role) = self.require_user(db, username).await?;
        if !self.role_allows(db, role, permission).await? {
            return Err(EngineError::Forbidden(format!(
                "missing permission: {}",
                permission.as_str()
            )));
        }
        Ok(role)
    }
}
