//! Initial schema migration - creates all tables from scratch.
//!
//! It creates the complete schema for Convivio:
//!
//! - `users`: authentication and roles
//! - `clients`: people/organizations events are booked for
//! - `menu_packages`: priceable catalog items (per-guest base prices)
//! - `upcharges`: per-guest surcharges for premium options
//! - `ingredients`: costing catalog plus on-hand stock
//! - `recipes` / `recipe_ingredients`: dish compositions for costing
//! - `events` / `event_upcharges`: bookings with their quote snapshot
//! - `revenue_records`: flat rows the analytics aggregation runs over
//! - `invoices`: billing documents issued per event

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Username,
    Password,
    Role,
    Archived,
}

#[derive(Iden)]
enum Clients {
    Table,
    Id,
    Name,
    Email,
    Phone,
    Archived,
}

#[derive(Iden)]
enum MenuPackages {
    Table,
    Id,
    Name,
    AdultPriceMinor,
    ChildPriceMinor,
    MinGuests,
    Vegetarian,
    GlutenFree,
    Currency,
    Archived,
}

#[derive(Iden)]
enum Upcharges {
    Table,
    Id,
    Name,
    AmountMinor,
    Archived,
}

#[derive(Iden)]
enum Ingredients {
    Table,
    Id,
    Name,
    Unit,
    CostPerUnitMinor,
    StockQuantity,
    Archived,
}

#[derive(Iden)]
enum Recipes {
    Table,
    Id,
    Name,
    Servings,
    Archived,
}

#[derive(Iden)]
enum RecipeIngredients {
    Table,
    RecipeId,
    IngredientId,
    Quantity,
}

#[derive(Iden)]
enum Events {
    Table,
    Id,
    ClientId,
    Name,
    EventDate,
    PackageId,
    AdultCount,
    ChildCount,
    GratuityPercent,
    SubtotalMinor,
    GratuityMinor,
    TotalMinor,
    Currency,
    Status,
    Note,
    CreatedBy,
    CanceledAt,
    CanceledBy,
}

#[derive(Iden)]
enum EventUpcharges {
    Table,
    EventId,
    UpchargeId,
}

#[derive(Iden)]
enum RevenueRecords {
    Table,
    Id,
    EventId,
    ClientId,
    OccurredOn,
    GrossRevenueMinor,
    FoodCostMinor,
    LaborCostMinor,
    OtherExpensesMinor,
    NetProfitMinor,
    PaymentMethod,
    CreatedBy,
}

#[derive(Iden)]
enum Invoices {
    Table,
    Id,
    EventId,
    ClientId,
    Number,
    IssuedOn,
    DueOn,
    TotalMinor,
    Currency,
    Status,
    PaidAt,
    VoidedAt,
    VoidedBy,
    CreatedBy,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .col(
                        ColumnDef::new(Users::Role)
                            .string()
                            .not_null()
                            .default("staff"),
                    )
                    .col(
                        ColumnDef::new(Users::Archived)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Clients
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Clients::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Clients::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Clients::Name).string().not_null())
                    .col(ColumnDef::new(Clients::Email).string())
                    .col(ColumnDef::new(Clients::Phone).string())
                    .col(ColumnDef::new(Clients::Archived).boolean().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-clients-name-unique")
                    .table(Clients::Table)
                    .col(Clients::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Menu packages
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(MenuPackages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MenuPackages::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MenuPackages::Name).string().not_null())
                    .col(
                        ColumnDef::new(MenuPackages::AdultPriceMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MenuPackages::ChildPriceMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MenuPackages::MinGuests)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(MenuPackages::Vegetarian).boolean().not_null())
                    .col(ColumnDef::new(MenuPackages::GlutenFree).boolean().not_null())
                    .col(
                        ColumnDef::new(MenuPackages::Currency)
                            .string()
                            .not_null()
                            .default("EUR"),
                    )
                    .col(ColumnDef::new(MenuPackages::Archived).boolean().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-menu_packages-name-unique")
                    .table(MenuPackages::Table)
                    .col(MenuPackages::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Upcharges
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Upcharges::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Upcharges::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Upcharges::Name).string().not_null())
                    .col(
                        ColumnDef::new(Upcharges::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Upcharges::Archived).boolean().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-upcharges-name-unique")
                    .table(Upcharges::Table)
                    .col(Upcharges::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Ingredients
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Ingredients::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Ingredients::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Ingredients::Name).string().not_null())
                    .col(ColumnDef::new(Ingredients::Unit).string().not_null())
                    .col(
                        ColumnDef::new(Ingredients::CostPerUnitMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Ingredients::StockQuantity)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(ColumnDef::new(Ingredients::Archived).boolean().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-ingredients-name-unique")
                    .table(Ingredients::Table)
                    .col(Ingredients::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Recipes
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Recipes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Recipes::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Recipes::Name).string().not_null())
                    .col(ColumnDef::new(Recipes::Servings).integer().not_null())
                    .col(ColumnDef::new(Recipes::Archived).boolean().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-recipes-name-unique")
                    .table(Recipes::Table)
                    .col(Recipes::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(RecipeIngredients::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RecipeIngredients::RecipeId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RecipeIngredients::IngredientId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RecipeIngredients::Quantity)
                            .double()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(RecipeIngredients::RecipeId)
                            .col(RecipeIngredients::IngredientId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-recipe_ingredients-recipe_id")
                            .from(RecipeIngredients::Table, RecipeIngredients::RecipeId)
                            .to(Recipes::Table, Recipes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-recipe_ingredients-ingredient_id")
                            .from(RecipeIngredients::Table, RecipeIngredients::IngredientId)
                            .to(Ingredients::Table, Ingredients::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 7. Events
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Events::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Events::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Events::ClientId).string().not_null())
                    .col(ColumnDef::new(Events::Name).string().not_null())
                    .col(ColumnDef::new(Events::EventDate).date().not_null())
                    .col(ColumnDef::new(Events::PackageId).string().not_null())
                    .col(ColumnDef::new(Events::AdultCount).integer().not_null())
                    .col(ColumnDef::new(Events::ChildCount).integer().not_null())
                    .col(
                        ColumnDef::new(Events::GratuityPercent)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Events::SubtotalMinor).big_integer().not_null())
                    .col(ColumnDef::new(Events::GratuityMinor).big_integer().not_null())
                    .col(ColumnDef::new(Events::TotalMinor).big_integer().not_null())
                    .col(
                        ColumnDef::new(Events::Currency)
                            .string()
                            .not_null()
                            .default("EUR"),
                    )
                    .col(ColumnDef::new(Events::Status).string().not_null())
                    .col(ColumnDef::new(Events::Note).string())
                    .col(ColumnDef::new(Events::CreatedBy).string().not_null())
                    .col(ColumnDef::new(Events::CanceledAt).timestamp())
                    .col(ColumnDef::new(Events::CanceledBy).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-events-client_id")
                            .from(Events::Table, Events::ClientId)
                            .to(Clients::Table, Clients::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-events-package_id")
                            .from(Events::Table, Events::PackageId)
                            .to(MenuPackages::Table, MenuPackages::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-events-event_date")
                    .table(Events::Table)
                    .col(Events::EventDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-events-client_id")
                    .table(Events::Table)
                    .col(Events::ClientId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-events-created_by")
                    .table(Events::Table)
                    .col(Events::CreatedBy)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(EventUpcharges::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(EventUpcharges::EventId).string().not_null())
                    .col(
                        ColumnDef::new(EventUpcharges::UpchargeId)
                            .string()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(EventUpcharges::EventId)
                            .col(EventUpcharges::UpchargeId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-event_upcharges-event_id")
                            .from(EventUpcharges::Table, EventUpcharges::EventId)
                            .to(Events::Table, Events::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-event_upcharges-upcharge_id")
                            .from(EventUpcharges::Table, EventUpcharges::UpchargeId)
                            .to(Upcharges::Table, Upcharges::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 8. Revenue records
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(RevenueRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RevenueRecords::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(RevenueRecords::EventId).string())
                    .col(ColumnDef::new(RevenueRecords::ClientId).string().not_null())
                    .col(ColumnDef::new(RevenueRecords::OccurredOn).date().not_null())
                    .col(
                        ColumnDef::new(RevenueRecords::GrossRevenueMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RevenueRecords::FoodCostMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RevenueRecords::LaborCostMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RevenueRecords::OtherExpensesMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RevenueRecords::NetProfitMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RevenueRecords::PaymentMethod)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RevenueRecords::CreatedBy)
                            .string()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-revenue_records-event_id")
                            .from(RevenueRecords::Table, RevenueRecords::EventId)
                            .to(Events::Table, Events::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-revenue_records-client_id")
                            .from(RevenueRecords::Table, RevenueRecords::ClientId)
                            .to(Clients::Table, Clients::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-revenue_records-occurred_on")
                    .table(RevenueRecords::Table)
                    .col(RevenueRecords::OccurredOn)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-revenue_records-client_id")
                    .table(RevenueRecords::Table)
                    .col(RevenueRecords::ClientId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 9. Invoices
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Invoices::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Invoices::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Invoices::EventId).string().not_null())
                    .col(ColumnDef::new(Invoices::ClientId).string().not_null())
                    .col(ColumnDef::new(Invoices::Number).string().not_null())
                    .col(ColumnDef::new(Invoices::IssuedOn).date().not_null())
                    .col(ColumnDef::new(Invoices::DueOn).date().not_null())
                    .col(ColumnDef::new(Invoices::TotalMinor).big_integer().not_null())
                    .col(
                        ColumnDef::new(Invoices::Currency)
                            .string()
                            .not_null()
                            .default("EUR"),
                    )
                    .col(ColumnDef::new(Invoices::Status).string().not_null())
                    .col(ColumnDef::new(Invoices::PaidAt).timestamp())
                    .col(ColumnDef::new(Invoices::VoidedAt).timestamp())
                    .col(ColumnDef::new(Invoices::VoidedBy).string())
                    .col(ColumnDef::new(Invoices::CreatedBy).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-invoices-event_id")
                            .from(Invoices::Table, Invoices::EventId)
                            .to(Events::Table, Events::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-invoices-client_id")
                            .from(Invoices::Table, Invoices::ClientId)
                            .to(Clients::Table, Clients::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-invoices-number-unique")
                    .table(Invoices::Table)
                    .col(Invoices::Number)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-invoices-event_id")
                    .table(Invoices::Table)
                    .col(Invoices::EventId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(Invoices::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RevenueRecords::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(EventUpcharges::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Events::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RecipeIngredients::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Recipes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Ingredients::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Upcharges::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MenuPackages::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Clients::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
