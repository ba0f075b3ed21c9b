//! Client account operations.

use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
    sea_query::Expr,
};
use uuid::Uuid;

use crate::{EngineError, Permission, ResultEngine, clients, clients::Client};

use super::{Engine, normalize_optional_text, normalize_required_name, with_tx};

impl Engine {
    async fn client_name_taken(
        &self,
        db: &DatabaseTransaction,
        name: &str,
        exclude_id: Option<Uuid>,
    ) -> ResultEngine<bool> {
        let mut query = clients::Entity::find()
            .filter(Expr::cust("LOWER(name)").eq(name.to_lowercase()));
        if let Some(id) = exclude_id {
            query = query.filter(clients::Column::Id.ne(id.to_string()));
        }
        Ok(query.one(db).await?.is_some())
    }

    pub(super) async fn require_client(
        &self,
        db: &DatabaseTransaction,
        client_id: Uuid,
    ) -> ResultEngine<Client> {
        let model = clients::Entity::find_by_id(client_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("client not exists".to_string()))?;
        Client::try_from(model)
    }

    /// Creates a client account. Names are unique case-insensitively.
    pub async fn new_client(
        &self,
        name: &str,
        email: Option<&str>,
        phone: Option<&str>,
        user_id: &str,
    ) -> ResultEngine<Client> {
        with_tx!(self, |db_tx| {
            self.require_permission(&db_tx, user_id, Permission::ClientsEdit)
                .await?;
            let name = normalize_required_name(name, "client")?;
            if self.client_name_taken(&db_tx, &name, None).await? {
                return Err(EngineError::ExistingKey(name));
            }

            let client = Client::new(
                name,
                normalize_optional_text(email),
                normalize_optional_text(phone),
            );
            clients::ActiveModel::from(&client).insert(&db_tx).await?;
            Ok(client)
        })
    }

    /// Updates name/contact fields; `None` leaves a field unchanged.
    pub async fn update_client(
        &self,
        client_id: Uuid,
        name: Option<&str>,
        email: Option<&str>,
        phone: Option<&str>,
        user_id: &str,
    ) -> ResultEngine<Client> {
        with_tx!(self, |db_tx| {
            self.require_permission(&db_tx, user_id, Permission::ClientsEdit)
                .await?;
            let mut client = self.require_client(&db_tx, client_id).await?;

            if let Some(name) = name {
                let name = normalize_required_name(name, "client")?;
                if self
                    .client_name_taken(&db_tx, &name, Some(client_id))
                    .await?
                {
                    return Err(EngineError::ExistingKey(name));
                }
                client.name = name;
            }
            if let Some(email) = normalize_optional_text(email) {
                client.email = Some(email);
            }
            if let Some(phone) = normalize_optional_text(phone) {
                client.phone = Some(phone);
            }

            let model = clients::ActiveModel {
                id: ActiveValue::Set(client_id.to_string()),
                name: ActiveValue::Set(client.name.clone()),
                email: ActiveValue::Set(client.email.clone()),
                phone: ActiveValue::Set(client.phone.clone()),
                ..Default::default()
            };
            model.update(&db_tx).await?;
            Ok(client)
        })
    }

    /// Archives a client. Archived clients are hidden from listings and
    /// rejected for new bookings; history stays intact.
    pub async fn archive_client(&self, client_id: Uuid, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_permission(&db_tx, user_id, Permission::ClientsEdit)
                .await?;
            self.require_client(&db_tx, client_id).await?;

            let model = clients::ActiveModel {
                id: ActiveValue::Set(client_id.to_string()),
                archived: ActiveValue::Set(true),
                ..Default::default()
            };
            model.update(&db_tx).await?;
            Ok(())
        })
    }

    pub async fn client(&self, client_id: Uuid, user_id: &str) -> ResultEngine<Client> {
        with_tx!(self, |db_tx| {
            self.require_permission(&db_tx, user_id, Permission::ClientsView)
                .await?;
            self.require_client(&db_tx, client_id).await
        })
    }

    /// Lists clients ordered by name, active only unless asked otherwise.
    pub async fn list_clients(
        &self,
        include_archived: bool,
        user_id: &str,
    ) -> ResultEngine<Vec<Client>> {
        with_tx!(self, |db_tx| {
            self.require_permission(&db_tx, user_id, Permission::ClientsView)
                .await?;

            let mut query = clients::Entity::find().order_by_asc(clients::Column::Name);
            if !include_archived {
                query = query.filter(clients::Column::Archived.eq(false));
            }

            let models = query.all(&db_tx).await?;
            models.into_iter().map(Client::try_from).collect()
        })
    }
}
