//! Revenue records and the analytics report.

use chrono::NaiveDate;
use sea_orm::{
    DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    EngineError, Money, Permission, ResultEngine, clients,
    reports::{self, PaymentMethod, RevenueReport},
    revenue_records, revenue_records::RevenueRecord,
    util,
};

use super::{Engine, with_tx};

/// Records the financial outcome of an event.
#[derive(Clone, Debug)]
pub struct RecordRevenueCmd {
    /// Optional link to the event this revenue came from.
    pub event_id: Option<Uuid>,
    pub client_id: Uuid,
    pub occurred_on: NaiveDate,
    pub gross_revenue: Money,
    pub food_cost: Money,
    pub labor_cost: Money,
    pub other_expenses: Money,
    /// Stored as given; the aggregation trusts it and never recomputes.
    pub net_profit: Money,
    pub payment_method: PaymentMethod,
    pub user_id: String,
}

fn validate_range(from: Option<NaiveDate>, to: Option<NaiveDate>) -> ResultEngine<()> {
    if let (Some(from), Some(to)) = (from, to)
        && from >= to
    {
        return Err(EngineError::InvalidDate(
            "invalid range: from must be < to".to_string(),
        ));
    }
    Ok(())
}

#[derive(Serialize)]
struct CsvRow<'a> {
    month: &'a str,
    revenue_minor: i64,
    profit_minor: i64,
    events: u64,
}

impl Engine {
    async fn load_records(
        &self,
        db: &DatabaseTransaction,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> ResultEngine<Vec<RevenueRecord>> {
        let mut query = revenue_records::Entity::find()
            .order_by_asc(revenue_records::Column::OccurredOn)
            .order_by_asc(revenue_records::Column::Id);
        if let Some(from) = from {
            query = query.filter(revenue_records::Column::OccurredOn.gte(from));
        }
        if let Some(to) = to {
            query = query.filter(revenue_records::Column::OccurredOn.lt(to));
        }

        let models = query.all(db).await?;
        models.into_iter().map(RevenueRecord::try_from).collect()
    }

    /// Stores a revenue record. All amounts must be non-negative; if an
    /// event is linked it must belong to the given client.
    pub async fn record_revenue(&self, cmd: RecordRevenueCmd) -> ResultEngine<RevenueRecord> {
        with_tx!(self, |db_tx| {
            self.require_permission(&db_tx, &cmd.user_id, Permission::RevenueRecord)
                .await?;

            for (amount, label) in [
                (cmd.gross_revenue, "gross_revenue"),
                (cmd.food_cost, "food_cost"),
                (cmd.labor_cost, "labor_cost"),
                (cmd.other_expenses, "other_expenses"),
                (cmd.net_profit, "net_profit"),
            ] {
                if amount.is_negative() {
                    return Err(EngineError::InvalidAmount(format!(
                        "{label} must not be negative"
                    )));
                }
            }

            self.require_client(&db_tx, cmd.client_id).await?;
            if let Some(event_id) = cmd.event_id {
                let model = crate::events::Entity::find_by_id(event_id.to_string())
                    .one(&db_tx)
                    .await?
                    .ok_or_else(|| EngineError::KeyNotFound("event not exists".to_string()))?;
                if model.client_id != cmd.client_id.to_string() {
                    return Err(EngineError::InvalidId(
                        "event does not belong to client".to_string(),
                    ));
                }
            }

            let record = RevenueRecord {
                id: Uuid::new_v4(),
                event_id: cmd.event_id,
                client_id: cmd.client_id,
                occurred_on: cmd.occurred_on,
                gross_revenue: cmd.gross_revenue,
                food_cost: cmd.food_cost,
                labor_cost: cmd.labor_cost,
                other_expenses: cmd.other_expenses,
                net_profit: cmd.net_profit,
                payment_method: cmd.payment_method,
                created_by: cmd.user_id.clone(),
            };
            revenue_records::ActiveModel::from(&record)
                .insert(&db_tx)
                .await?;
            Ok(record)
        })
    }

    /// Removes a revenue record.
    pub async fn delete_revenue_record(&self, record_id: Uuid, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_permission(&db_tx, user_id, Permission::RevenueRecord)
                .await?;

            let model = revenue_records::Entity::find_by_id(record_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| {
                    EngineError::KeyNotFound("revenue record not exists".to_string())
                })?;
            model.delete(&db_tx).await?;
            Ok(())
        })
    }

    /// Lists revenue records in `[from, to)`, oldest first.
    pub async fn list_revenue_records(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        user_id: &str,
    ) -> ResultEngine<Vec<RevenueRecord>> {
        with_tx!(self, |db_tx| {
            self.require_permission(&db_tx, user_id, Permission::AnalyticsView)
                .await?;
            validate_range(from, to)?;
            self.load_records(&db_tx, from, to).await
        })
    }

    /// Aggregates records in `[from, to)` into the revenue report, with
    /// client names resolved for display.
    pub async fn revenue_report(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        user_id: &str,
    ) -> ResultEngine<RevenueReport> {
        with_tx!(self, |db_tx| {
            self.require_permission(&db_tx, user_id, Permission::AnalyticsView)
                .await?;
            validate_range(from, to)?;

            let records = self.load_records(&db_tx, from, to).await?;
            let mut report = reports::revenue_report(&records);

            if !report.by_client.is_empty() {
                let ids: Vec<String> = report
                    .by_client
                    .iter()
                    .map(|bucket| bucket.client_id.to_string())
                    .collect();
                let models = clients::Entity::find()
                    .filter(clients::Column::Id.is_in(ids))
                    .all(&db_tx)
                    .await?;
                for model in models {
                    let id = util::parse_uuid(&model.id, "client")?;
                    if let Some(bucket) =
                        report.by_client.iter_mut().find(|b| b.client_id == id)
                    {
                        bucket.client_name = Some(model.name.clone());
                    }
                }
            }

            Ok(report)
        })
    }

    /// Renders the monthly buckets plus a total row as CSV for export.
    pub async fn revenue_report_csv(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        user_id: &str,
    ) -> ResultEngine<Vec<u8>> {
        with_tx!(self, |db_tx| {
            self.require_permission(&db_tx, user_id, Permission::AnalyticsExport)
                .await?;
            validate_range(from, to)?;

            let records = self.load_records(&db_tx, from, to).await?;
            let report = reports::revenue_report(&records);

            let mut writer = csv::Writer::from_writer(vec![]);
            for bucket in &report.by_month {
                writer
                    .serialize(CsvRow {
                        month: &bucket.month,
                        revenue_minor: bucket.revenue.minor(),
                        profit_minor: bucket.profit.minor(),
                        events: bucket.event_count,
                    })
                    .map_err(|err| EngineError::Export(err.to_string()))?;
            }
            writer
                .serialize(CsvRow {
                    month: "TOTAL",
                    revenue_minor: report.total_revenue.minor(),
                    profit_minor: report.total_profit.minor(),
                    events: records.len() as u64,
                })
                .map_err(|err| EngineError::Export(err.to_string()))?;

            writer
                .into_inner()
                .map_err(|err| EngineError::Export(err.to_string()))
        })
    }
}
