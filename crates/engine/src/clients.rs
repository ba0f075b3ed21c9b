//! Client accounts: the people and organizations events are booked for.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, util};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub archived: bool,
}

impl Client {
    pub fn new(name: String, email: Option<String>, phone: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            phone,
            archived: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "clients")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub archived: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Client> for ActiveModel {
    fn from(client: &Client) -> Self {
        Self {
            id: ActiveValue::Set(client.id.to_string()),
            name: ActiveValue::Set(client.name.clone()),
            email: ActiveValue::Set(client.email.clone()),
            phone: ActiveValue::Set(client.phone.clone()),
            archived: ActiveValue::Set(client.archived),
        }
    }
}

impl TryFrom<Model> for Client {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: util::parse_uuid(&model.id, "client")?,
            name: model.name,
            email: model.email,
            phone: model.phone,
            archived: model.archived,
        })
    }
}
