//! Staff account management.

use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{EngineError, Permission, ResultEngine, Role, users};

use super::{Engine, normalize_required_name, with_tx};

/// Account summary for staff listings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StaffMember {
    pub username: String,
    pub role: Role,
    pub archived: bool,
}

impl Engine {
    /// Creates an account with a role. Usernames are unique.
    pub async fn create_user(
        &self,
        username: &str,
        password: &str,
        role: Role,
        user_id: &str,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_permission(&db_tx, user_id, Permission::StaffManage)
                .await?;
            let username = normalize_required_name(username, "user")?;
            if password.is_empty() {
                return Err(EngineError::InvalidName(
                    "password must not be empty".to_string(),
                ));
            }

            let exists = users::Entity::find_by_id(username.clone())
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::ExistingKey(username));
            }

            let model = users::ActiveModel {
                username: ActiveValue::Set(username),
                password: ActiveValue::Set(password.to_string()),
                role: ActiveValue::Set(role.as_str().to_string()),
                archived: ActiveValue::Set(false),
            };
            model.insert(&db_tx).await?;
            Ok(())
        })
    }

    /// Changes an account's role.
    pub async fn set_user_role(
        &self,
        username: &str,
        role: Role,
        user_id: &str,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_permission(&db_tx, user_id, Permission::StaffManage)
                .await?;
            self.require_user(&db_tx, username).await?;

            let model = users::ActiveModel {
                username: ActiveValue::Unchanged(username.to_string()),
                role: ActiveValue::Set(role.as_str().to_string()),
                ..Default::default()
            };
            model.update(&db_tx).await?;
            Ok(())
        })
    }

    /// Archives an account, locking it out of authentication. Archiving the
    /// acting account is rejected.
    pub async fn archive_user(&self, username: &str, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_permission(&db_tx, user_id, Permission::StaffManage)
                .await?;
            if username == user_id {
                return Err(EngineError::InvalidRole(
                    "cannot archive own account".to_string(),
                ));
            }
            self.require_user(&db_tx, username).await?;

            let model = users::ActiveModel {
                username: ActiveValue::Unchanged(username.to_string()),
                archived: ActiveValue::Set(true),
                ..Default::default()
            };
            model.update(&db_tx).await?;
            Ok(())
        })
    }

    /// Lists accounts ordered by username.
    pub async fn list_users(
        &self,
        include_archived: bool,
        user_id: &str,
    ) -> ResultEngine<Vec<StaffMember>> {
        with_tx!(self, |db_tx| {
            self.require_permission(&db_tx, user_id, Permission::StaffView)
                .await?;

            let mut query = users::Entity::find().order_by_asc(users::Column::Username);
            if !include_archived {
                query = query.filter(users::Column::Archived.eq(false));
            }

            let models = query.all(&db_tx).await?;
            let mut out = Vec::with_capacity(models.len());
            for model in models {
                out.push(StaffMember {
                    role: Role::try_from(model.role.as_str())?,
                    username: model.username,
                    archived: model.archived,
                });
            }
            Ok(out)
        })
    }
}
