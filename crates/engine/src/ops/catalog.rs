//! Menu catalog operations: packages and upcharges.

use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
    sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    Currency, EngineError, Money, Permission, ResultEngine, packages, packages::MenuPackage,
    upcharges, upcharges::Upcharge,
};

use super::{Engine, normalize_required_name, with_tx};

fn require_non_negative(amount: Money, label: &str) -> ResultEngine<()> {
    if amount.is_negative() {
        return Err(EngineError::InvalidAmount(format!(
            "{label} must not be negative"
        )));
    }
    Ok(())
}

impl Engine {
    pub(super) async fn require_package(
        &self,
        db: &DatabaseTransaction,
        package_id: Uuid,
    ) -> ResultEngine<MenuPackage> {
        let model = packages::Entity::find_by_id(package_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("package not exists".to_string()))?;
        MenuPackage::try_from(model)
    }

    pub(super) async fn require_upcharge(
        &self,
        db: &DatabaseTransaction,
        upcharge_id: Uuid,
    ) -> ResultEngine<Upcharge> {
        let model = upcharges::Entity::find_by_id(upcharge_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("upcharge not exists".to_string()))?;
        Upcharge::try_from(model)
    }

    async fn package_name_taken(
        &self,
        db: &DatabaseTransaction,
        name: &str,
        exclude_id: Option<Uuid>,
    ) -> ResultEngine<bool> {
        let mut query = packages::Entity::find()
            .filter(Expr::cust("LOWER(name)").eq(name.to_lowercase()));
        if let Some(id) = exclude_id {
            query = query.filter(packages::Column::Id.ne(id.to_string()));
        }
        Ok(query.one(db).await?.is_some())
    }

    /// Creates a menu package with per-guest base prices.
    pub async fn new_package(
        &self,
        name: &str,
        adult_price: Money,
        child_price: Money,
        min_guests: u32,
        vegetarian: bool,
        gluten_free: bool,
        user_id: &str,
    ) -> ResultEngine<MenuPackage> {
        with_tx!(self, |db_tx| {
            self.require_permission(&db_tx, user_id, Permission::MenuEdit)
                .await?;
            let name = normalize_required_name(name, "package")?;
            require_non_negative(adult_price, "adult_price")?;
            require_non_negative(child_price, "child_price")?;
            if self.package_name_taken(&db_tx, &name, None).await? {
                return Err(EngineError::ExistingKey(name));
            }

            let package = MenuPackage {
                id: Uuid::new_v4(),
                name,
                adult_price,
                child_price,
                min_guests,
                vegetarian,
                gluten_free,
                currency: Currency::default(),
                archived: false,
            };
            packages::ActiveModel::from(&package).insert(&db_tx).await?;
            Ok(package)
        })
    }

    /// Updates package prices/flags; `None` leaves a field unchanged.
    #[allow(clippy::too_many_arguments)]
    pub async fn update_package(
        &self,
        package_id: Uuid,
        name: Option<&str>,
        adult_price: Option<Money>,
        child_price: Option<Money>,
        min_guests: Option<u32>,
        vegetarian: Option<bool>,
        gluten_free: Option<bool>,
        user_id: &str,
    ) -> ResultEngine<MenuPackage> {
        with_tx!(self, |db_tx| {
            self.require_permission(&db_tx, user_id, Permission::MenuEdit)
                .await?;
            let mut package = self.require_package(&db_tx, package_id).await?;

            if let Some(name) = name {
                let name = normalize_required_name(name, "package")?;
                if self
                    .package_name_taken(&db_tx, &name, Some(package_id))
                    .await?
                {
                    return Err(EngineError::ExistingKey(name));
                }
                package.name = name;
            }
            if let Some(price) = adult_price {
                require_non_negative(price, "adult_price")?;
                package.adult_price = price;
            }
            if let Some(price) = child_price {
                require_non_negative(price, "child_price")?;
                package.child_price = price;
            }
            if let Some(min_guests) = min_guests {
                package.min_guests = min_guests;
            }
            if let Some(vegetarian) = vegetarian {
                package.vegetarian = vegetarian;
            }
            if let Some(gluten_free) = gluten_free {
                package.gluten_free = gluten_free;
            }

            let mut model = packages::ActiveModel::from(&package);
            model.id = ActiveValue::Unchanged(package_id.to_string());
            model.update(&db_tx).await?;
            Ok(package)
        })
    }

    pub async fn archive_package(&self, package_id: Uuid, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_permission(&db_tx, user_id, Permission::MenuEdit)
                .await?;
            self.require_package(&db_tx, package_id).await?;

            let model = packages::ActiveModel {
                id: ActiveValue::Set(package_id.to_string()),
                archived: ActiveValue::Set(true),
                ..Default::default()
            };
            model.update(&db_tx).await?;
            Ok(())
        })
    }

    pub async fn list_packages(
        &self,
        include_archived: bool,
        user_id: &str,
    ) -> ResultEngine<Vec<MenuPackage>> {
        with_tx!(self, |db_tx| {
            self.require_permission(&db_tx, user_id, Permission::MenuView)
                .await?;

            let mut query = packages::Entity::find().order_by_asc(packages::Column::Name);
            if !include_archived {
                query = query.filter(packages::Column::Archived.eq(false));
            }

            let models = query.all(&db_tx).await?;
            models.into_iter().map(MenuPackage::try_from).collect()
        })
    }

    /// Creates a per-guest upcharge for a premium option.
    pub async fn new_upcharge(
        &self,
        name: &str,
        amount: Money,
        user_id: &str,
    ) -> ResultEngine<Upcharge> {
        with_tx!(self, |db_tx| {
            self.require_permission(&db_tx, user_id, Permission::MenuEdit)
                .await?;
            let name = normalize_required_name(name, "upcharge")?;
            require_non_negative(amount, "amount")?;

            let taken = upcharges::Entity::find()
                .filter(Expr::cust("LOWER(name)").eq(name.to_lowercase()))
                .one(&db_tx)
                .await?
                .is_some();
            if taken {
                return Err(EngineError::ExistingKey(name));
            }

            let upcharge = Upcharge {
                id: Uuid::new_v4(),
                name,
                amount,
                archived: false,
            };
            upcharges::ActiveModel::from(&upcharge)
                .insert(&db_tx)
                .await?;
            Ok(upcharge)
        })
    }

    pub async fn update_upcharge(
        &self,
        upcharge_id: Uuid,
        amount: Money,
        user_id: &str,
    ) -> ResultEngine<Upcharge> {
        with_tx!(self, |db_tx| {
            self.require_permission(&db_tx, user_id, Permission::MenuEdit)
                .await?;
            require_non_negative(amount, "amount")?;
            let mut upcharge = self.require_upcharge(&db_tx, upcharge_id).await?;
            upcharge.amount = amount;

            let model = upcharges::ActiveModel {
                id: ActiveValue::Set(upcharge_id.to_string()),
                amount_minor: ActiveValue::Set(amount.minor()),
                ..Default::default()
            };
            model.update(&db_tx).await?;
            Ok(upcharge)
        })
    }

    pub async fn archive_upcharge(&self, upcharge_id: Uuid, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_permission(&db_tx, user_id, Permission::MenuEdit)
                .await?;
            self.require_upcharge(&db_tx, upcharge_id).await?;

            let model = upcharges::ActiveModel {
                id: ActiveValue::Set(upcharge_id.to_string()),
                archived: ActiveValue::Set(true),
                ..Default::default()
            };
            model.update(&db_tx).await?;
            Ok(())
        })
    }

    pub async fn list_upcharges(
        &self,
        include_archived: bool,
        user_id: &str,
    ) -> ResultEngine<Vec<Upcharge>> {
        with_tx!(self, |db_tx| {
            self.require_permission(&db_tx, user_id, Permission::MenuView)
                .await?;

            let mut query = upcharges::Entity::find().order_by_asc(upcharges::Column::Name);
            if !include_archived {
                query = query.filter(upcharges::Column::Archived.eq(false));
            }

            let models = query.all(&db_tx).await?;
            models.into_iter().map(Upcharge::try_from).collect()
        })
    }
}
