//! Request/response types shared by the server and its clients.
//!
//! Monetary fields are integer minor units (`*_minor`); dates are plain
//! `YYYY-MM-DD`, timestamps RFC3339 with offset.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Eur,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Staff,
    Client,
}

pub mod client {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ClientNew {
        pub name: String,
        pub email: Option<String>,
        pub phone: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ClientUpdate {
        pub name: Option<String>,
        pub email: Option<String>,
        pub phone: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ClientView {
        pub id: Uuid,
        pub name: String,
        pub email: Option<String>,
        pub phone: Option<String>,
        pub archived: bool,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ClientListParams {
        pub include_archived: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ClientsResponse {
        pub clients: Vec<ClientView>,
    }
}

pub mod catalog {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PackageNew {
        pub name: String,
        pub adult_price_minor: i64,
        pub child_price_minor: i64,
        #[serde(default)]
        pub min_guests: u32,
        #[serde(default)]
        pub vegetarian: bool,
        #[serde(default)]
        pub gluten_free: bool,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct PackageUpdate {
        pub name: Option<String>,
        pub adult_price_minor: Option<i64>,
        pub child_price_minor: Option<i64>,
        pub min_guests: Option<u32>,
        pub vegetarian: Option<bool>,
        pub gluten_free: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PackageView {
        pub id: Uuid,
        pub name: String,
        pub adult_price_minor: i64,
        pub child_price_minor: i64,
        pub min_guests: u32,
        pub vegetarian: bool,
        pub gluten_free: bool,
        pub currency: Currency,
        pub archived: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PackagesResponse {
        pub packages: Vec<PackageView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UpchargeNew {
        pub name: String,
        pub amount_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UpchargeUpdate {
        pub amount_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UpchargeView {
        pub id: Uuid,
        pub name: String,
        pub amount_minor: i64,
        pub archived: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UpchargesResponse {
        pub upcharges: Vec<UpchargeView>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct CatalogListParams {
        pub include_archived: Option<bool>,
    }
}

pub mod recipe {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct IngredientNew {
        pub name: String,
        /// Unit the quantity and cost refer to (kg, l, pieces).
        pub unit: String,
        pub cost_per_unit_minor: i64,
        #[serde(default)]
        pub stock_quantity: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct IngredientCostUpdate {
        pub cost_per_unit_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct StockAdjust {
        /// Signed delta; the resulting stock must stay non-negative.
        pub delta: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct IngredientView {
        pub id: Uuid,
        pub name: String,
        pub unit: String,
        pub cost_per_unit_minor: i64,
        pub stock_quantity: f64,
        pub archived: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct IngredientsResponse {
        pub ingredients: Vec<IngredientView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RecipeItem {
        pub ingredient_id: Uuid,
        pub quantity: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RecipeNew {
        pub name: String,
        pub servings: u32,
        pub items: Vec<RecipeItem>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RecipeItemsUpdate {
        pub items: Vec<RecipeItem>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RecipeView {
        pub id: Uuid,
        pub name: String,
        pub servings: u32,
        pub items: Vec<RecipeItem>,
        pub archived: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RecipesResponse {
        pub recipes: Vec<RecipeView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RecipeCostView {
        pub total_minor: i64,
        pub cost_per_serving_minor: i64,
        pub currency: Currency,
    }
}

pub mod quote {
    use super::*;

    /// Prices a prospective selection; nothing is persisted.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct QuoteRequest {
        pub package_id: Uuid,
        pub adult_count: u32,
        pub child_count: u32,
        #[serde(default)]
        pub upcharge_ids: Vec<Uuid>,
        #[serde(default)]
        pub gratuity_percent: u8,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct QuoteView {
        pub subtotal_minor: i64,
        pub gratuity_minor: i64,
        pub total_minor: i64,
        pub currency: Currency,
    }
}

pub mod event {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum EventStatus {
        Booked,
        Confirmed,
        Completed,
        Canceled,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct EventNew {
        pub client_id: Uuid,
        pub name: String,
        pub event_date: NaiveDate,
        pub package_id: Uuid,
        pub adult_count: u32,
        pub child_count: u32,
        #[serde(default)]
        pub upcharge_ids: Vec<Uuid>,
        #[serde(default)]
        pub gratuity_percent: u8,
        pub note: Option<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct EventUpdate {
        pub name: Option<String>,
        pub event_date: Option<NaiveDate>,
        pub package_id: Option<Uuid>,
        pub adult_count: Option<u32>,
        pub child_count: Option<u32>,
        pub upcharge_ids: Option<Vec<Uuid>>,
        pub gratuity_percent: Option<u8>,
        pub note: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct EventStatusUpdate {
        pub status: EventStatus,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct EventCancel {
        /// Defaults to "now" server-side when omitted.
        pub canceled_at: Option<DateTime<FixedOffset>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct EventView {
        pub id: Uuid,
        pub client_id: Uuid,
        pub name: String,
        pub event_date: NaiveDate,
        pub package_id: Uuid,
        pub adult_count: u32,
        pub child_count: u32,
        pub upcharge_ids: Vec<Uuid>,
        pub gratuity_percent: u8,
        pub subtotal_minor: i64,
        pub gratuity_minor: i64,
        pub total_minor: i64,
        pub currency: Currency,
        pub status: EventStatus,
        pub note: Option<String>,
        pub created_by: String,
        pub canceled_at: Option<DateTime<Utc>>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct EventListParams {
        pub limit: Option<u64>,
        /// Opaque pagination cursor (base64), from `next_cursor`.
        ///
        /// Newest → older pagination.
        pub cursor: Option<String>,
        pub status: Option<EventStatus>,
        pub from: Option<NaiveDate>,
        pub to: Option<NaiveDate>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct EventListResponse {
        pub events: Vec<EventView>,
        pub next_cursor: Option<String>,
    }
}

pub mod revenue {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum PaymentMethod {
        Cash,
        Card,
        Transfer,
        Check,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RevenueNew {
        pub event_id: Option<Uuid>,
        pub client_id: Uuid,
        pub occurred_on: NaiveDate,
        pub gross_revenue_minor: i64,
        pub food_cost_minor: i64,
        pub labor_cost_minor: i64,
        pub other_expenses_minor: i64,
        pub net_profit_minor: i64,
        pub payment_method: PaymentMethod,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RevenueView {
        pub id: Uuid,
        pub event_id: Option<Uuid>,
        pub client_id: Uuid,
        pub occurred_on: NaiveDate,
        pub gross_revenue_minor: i64,
        pub food_cost_minor: i64,
        pub labor_cost_minor: i64,
        pub other_expenses_minor: i64,
        pub net_profit_minor: i64,
        pub payment_method: PaymentMethod,
        pub created_by: String,
    }

    /// `[from, to)` on `occurred_on`; either bound optional.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct RevenueRangeParams {
        pub from: Option<NaiveDate>,
        pub to: Option<NaiveDate>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RevenueListResponse {
        pub records: Vec<RevenueView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MonthlyBucketView {
        pub month: String,
        pub revenue_minor: i64,
        pub profit_minor: i64,
        pub event_count: u64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ClientBucketView {
        pub client_id: Uuid,
        pub client_name: Option<String>,
        pub revenue_minor: i64,
        pub profit_minor: i64,
        pub event_count: u64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RevenueReportView {
        pub by_month: Vec<MonthlyBucketView>,
        pub by_client: Vec<ClientBucketView>,
        pub total_revenue_minor: i64,
        pub total_profit_minor: i64,
        pub profit_margin_percent: f64,
        pub average_event_revenue_minor: i64,
        pub top_payment_method: Option<PaymentMethod>,
    }
}

pub mod invoice {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum InvoiceStatus {
        Issued,
        Paid,
        Void,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct InvoiceIssue {
        pub event_id: Uuid,
        /// Defaults to today server-side when omitted.
        pub issued_on: Option<NaiveDate>,
        pub due_on: NaiveDate,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct InvoicePay {
        pub paid_at: Option<DateTime<FixedOffset>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct InvoiceVoid {
        pub voided_at: Option<DateTime<FixedOffset>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct InvoiceView {
        pub id: Uuid,
        pub event_id: Uuid,
        pub client_id: Uuid,
        pub number: String,
        pub issued_on: NaiveDate,
        pub due_on: NaiveDate,
        pub total_minor: i64,
        pub currency: Currency,
        pub status: InvoiceStatus,
        pub paid_at: Option<DateTime<Utc>>,
        pub voided_at: Option<DateTime<Utc>>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct InvoiceListParams {
        pub include_void: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct InvoicesResponse {
        pub invoices: Vec<InvoiceView>,
    }
}

pub mod permission {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PermissionGrantView {
        /// Dotted identifier, e.g. `events.view`.
        pub permission: String,
        pub category: String,
        pub allowed: bool,
        /// `true` when a persisted override shadows the default grant.
        pub overridden: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RolePermissionsResponse {
        pub role: Role,
        pub permissions: Vec<PermissionGrantView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PermissionUpdate {
        pub permission: String,
        pub allowed: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AuditEntryView {
        pub role: Role,
        pub permission: String,
        pub allowed: bool,
        pub changed_by: String,
        pub changed_at: DateTime<Utc>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct AuditParams {
        pub limit: Option<u64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AuditResponse {
        pub entries: Vec<AuditEntryView>,
    }
}

pub mod staff {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserNew {
        pub username: String,
        pub password: String,
        pub role: Role,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RoleUpdate {
        pub role: Role,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserView {
        pub username: String,
        pub role: Role,
        pub archived: bool,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct StaffListParams {
        pub include_archived: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UsersResponse {
        pub users: Vec<UserView>,
    }
}
