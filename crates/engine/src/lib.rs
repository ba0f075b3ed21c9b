//! Convivio domain engine.
//!
//! Pure calculators (quotes, recipe costing, revenue aggregation, role
//! tables) plus the database-backed operations the HTTP layer calls. The
//! engine owns validation and permission checks; the server only maps DTOs.

pub use clients::Client;
pub use costing::{CostTracker, IngredientUsage, recipe_cost};
pub use currency::Currency;
pub use error::EngineError;
pub use events::{Event, EventStatus};
pub use ingredients::Ingredient;
pub use invoices::{Invoice, InvoiceStatus};
pub use money::Money;
pub use ops::{
    BookEventCmd, Engine, EngineBuilder, EventListFilter, IssueInvoiceCmd, PermissionAuditEntry,
    PermissionGrant, QuoteCmd, RecipeCost, RecordRevenueCmd, StaffMember, UpdateEventCmd,
};
pub use packages::MenuPackage;
pub use pricing::{MAX_UPCHARGES, Quote, QuoteInput, compute_quote};
pub use rbac::{ALL_PERMISSIONS, Permission, Role, default_grants, has_permission};
pub use recipes::Recipe;
pub use reports::{ClientBucket, MonthlyBucket, PaymentMethod, RevenueReport, revenue_report};
pub use revenue_records::RevenueRecord;
pub use upcharges::Upcharge;

mod clients;
mod costing;
mod currency;
mod error;
mod event_upcharges;
mod events;
mod ingredients;
mod invoices;
mod money;
mod ops;
mod packages;
mod permission_audit;
mod pricing;
mod rbac;
mod recipe_ingredients;
mod recipes;
mod reports;
mod revenue_records;
mod role_grants;
mod upcharges;
mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
