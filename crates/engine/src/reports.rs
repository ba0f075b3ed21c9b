//! Revenue aggregation.
//!
//! Groups flat revenue records by calendar month and by client and derives
//! summary scalars. Stored `net_profit` values are trusted as-is; the
//! aggregator never recomputes `gross − costs`.
//!
//! Empty input yields zero totals and empty bucket lists. Demonstration
//! data is seeded explicitly through the admin CLI, never substituted here.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::{EngineError, Money, revenue_records::RevenueRecord};

/// How an event was paid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    Transfer,
    Check,
}

impl PaymentMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Card => "card",
            Self::Transfer => "transfer",
            Self::Check => "check",
        }
    }
}

impl TryFrom<&str> for PaymentMethod {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "cash" => Ok(Self::Cash),
            "card" => Ok(Self::Card),
            "transfer" => Ok(Self::Transfer),
            "check" => Ok(Self::Check),
            other => Err(EngineError::InvalidAmount(format!(
                "invalid payment method: {other}"
            ))),
        }
    }
}

/// Revenue and profit accumulated for one calendar month.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MonthlyBucket {
    /// `YYYY-MM` key; lexicographic order is chronological order.
    pub month: String,
    pub revenue: Money,
    pub profit: Money,
    pub event_count: u64,
}

/// Revenue and profit accumulated for one client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientBucket {
    pub client_id: uuid::Uuid,
    /// Resolved by the engine op for display; `None` when aggregating raw
    /// records outside the database.
    pub client_name: Option<String>,
    pub revenue: Money,
    pub profit: Money,
    pub event_count: u64,
}

/// Aggregated view over a set of revenue records.
#[derive(Clone, Debug, PartialEq)]
pub struct RevenueReport {
    /// One bucket per distinct month, chronologically ascending.
    pub by_month: Vec<MonthlyBucket>,
    /// One bucket per distinct client, descending by revenue (stable: ties
    /// keep first-seen order).
    pub by_client: Vec<ClientBucket>,
    pub total_revenue: Money,
    pub total_profit: Money,
    /// `total_profit / total_revenue × 100`; exactly `0.0` when revenue is 0.
    pub profit_margin_percent: f64,
    /// `total_revenue / record_count`; zero when there are no records.
    pub average_event_revenue: Money,
    /// Most frequent payment method; ties broken by first encounter.
    pub top_payment_method: Option<PaymentMethod>,
}

/// Aggregates revenue records into monthly/client buckets and summary
/// scalars.
pub fn revenue_report(records: &[RevenueRecord]) -> RevenueReport {
    let mut months: BTreeMap<String, MonthlyBucket> = BTreeMap::new();
    let mut client_index: HashMap<uuid::Uuid, usize> = HashMap::new();
    let mut clients: Vec<ClientBucket> = Vec::new();
    let mut method_counts: Vec<(PaymentMethod, u64)> = Vec::new();

    let mut total_revenue = Money::ZERO;
    let mut total_profit = Money::ZERO;

    for record in records {
        total_revenue += record.gross_revenue;
        total_profit += record.net_profit;

        let month_key = record.occurred_on.format("%Y-%m").to_string();
        let bucket = months.entry(month_key.clone()).or_insert(MonthlyBucket {
            month: month_key,
            revenue: Money::ZERO,
            profit: Money::ZERO,
            event_count: 0,
        });
        bucket.revenue += record.gross_revenue;
        bucket.profit += record.net_profit;
        bucket.event_count += 1;

        let idx = *client_index.entry(record.client_id).or_insert_with(|| {
            clients.push(ClientBucket {
                client_id: record.client_id,
                client_name: None,
                revenue: Money::ZERO,
                profit: Money::ZERO,
                event_count: 0,
            });
            clients.len() - 1
        });
        clients[idx].revenue += record.gross_revenue;
        clients[idx].profit += record.net_profit;
        clients[idx].event_count += 1;

        match method_counts
            .iter_mut()
            .find(|(method, _)| *method == record.payment_method)
        {
            Some((_, count)) => *count += 1,
            None => method_counts.push((record.payment_method, 1)),
        }
    }

    // Stable sort: equal revenues keep first-seen order.
    clients.sort_by(|a, b| b.revenue.cmp(&a.revenue));

    let profit_margin_percent = if total_revenue.is_zero() {
        0.0
    } else {
        total_profit.minor() as f64 / total_revenue.minor() as f64 * 100.0
    };
    let average_event_revenue = if records.is_empty() {
        Money::ZERO
    } else {
        Money::new(total_revenue.minor() / records.len() as i64)
    };

    // Strict `>` keeps the first-encountered method on ties.
    let top_payment_method = method_counts
        .iter()
        .fold(None::<(PaymentMethod, u64)>, |best, &(method, count)| {
            match best {
                Some((_, best_count)) if count <= best_count => best,
                _ => Some((method, count)),
            }
        })
        .map(|(method, _)| method);

    RevenueReport {
        by_month: months.into_values().collect(),
        by_client: clients,
        total_revenue,
        total_profit,
        profit_margin_percent,
        average_event_revenue,
        top_payment_method,
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use uuid::Uuid;

    use super::*;

    fn record(
        date: &str,
        gross: i64,
        profit: i64,
        client_id: Uuid,
        method: PaymentMethod,
    ) -> RevenueRecord {
        RevenueRecord {
            id: Uuid::new_v4(),
            event_id: None,
            client_id,
            occurred_on: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            gross_revenue: Money::new(gross),
            food_cost: Money::ZERO,
            labor_cost: Money::ZERO,
            other_expenses: Money::ZERO,
            net_profit: Money::new(profit),
            payment_method: method,
            created_by: "test".to_string(),
        }
    }

    #[test]
    fn empty_input_yields_zero_aggregates() {
        let report = revenue_report(&[]);
        assert!(report.by_month.is_empty());
        assert!(report.by_client.is_empty());
        assert_eq!(report.total_revenue, Money::ZERO);
        assert_eq!(report.total_profit, Money::ZERO);
        assert_eq!(report.profit_margin_percent, 0.0);
        assert_eq!(report.average_event_revenue, Money::ZERO);
        assert_eq!(report.top_payment_method, None);
    }

    #[test]
    fn margin_is_zero_not_nan_when_revenue_is_zero() {
        let client = Uuid::new_v4();
        let report = revenue_report(&[record("2024-03-01", 0, 0, client, PaymentMethod::Cash)]);
        assert_eq!(report.profit_margin_percent, 0.0);
        assert!(report.profit_margin_percent.is_finite());
    }

    #[test]
    fn reference_scenario_two_records_one_month() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let report = revenue_report(&[
            record("2024-01-05", 1000, 300, a, PaymentMethod::Card),
            record("2024-01-20", 500, 100, b, PaymentMethod::Cash),
        ]);

        assert_eq!(report.by_month.len(), 1);
        let month = &report.by_month[0];
        assert_eq!(month.month, "2024-01");
        assert_eq!(month.revenue, Money::new(1500));
        assert_eq!(month.profit, Money::new(400));
        assert_eq!(month.event_count, 2);

        assert_eq!(report.by_client.len(), 2);
        assert_eq!(report.by_client[0].client_id, a);
        assert_eq!(report.by_client[0].revenue, Money::new(1000));
        assert_eq!(report.by_client[0].event_count, 1);
        assert_eq!(report.by_client[1].client_id, b);
        assert_eq!(report.by_client[1].revenue, Money::new(500));

        assert_eq!(report.total_revenue, Money::new(1500));
        assert!((report.profit_margin_percent - 26.666_666_666_666_668).abs() < 1e-9);
        assert_eq!(report.average_event_revenue, Money::new(750));
    }

    #[test]
    fn revenue_is_conserved_across_groupings() {
        let clients: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
        let records = vec![
            record("2023-11-02", 810, 200, clients[0], PaymentMethod::Card),
            record("2023-12-24", 2_400, 900, clients[1], PaymentMethod::Transfer),
            record("2024-01-05", 1_000, 300, clients[0], PaymentMethod::Card),
            record("2024-01-20", 500, 100, clients[2], PaymentMethod::Cash),
            record("2024-02-14", 3_250, 1_100, clients[1], PaymentMethod::Card),
        ];
        let report = revenue_report(&records);

        let monthly_sum: i64 = report.by_month.iter().map(|b| b.revenue.minor()).sum();
        let client_sum: i64 = report.by_client.iter().map(|b| b.revenue.minor()).sum();
        assert_eq!(monthly_sum, report.total_revenue.minor());
        assert_eq!(client_sum, report.total_revenue.minor());
    }

    #[test]
    fn months_sorted_ascending_regardless_of_input_order() {
        let client = Uuid::new_v4();
        let report = revenue_report(&[
            record("2024-03-01", 10, 1, client, PaymentMethod::Cash),
            record("2023-12-01", 10, 1, client, PaymentMethod::Cash),
            record("2024-01-15", 10, 1, client, PaymentMethod::Cash),
        ]);
        let months: Vec<&str> = report.by_month.iter().map(|b| b.month.as_str()).collect();
        assert_eq!(months, ["2023-12", "2024-01", "2024-03"]);
    }

    #[test]
    fn clients_sorted_by_revenue_descending_stable() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();
        let report = revenue_report(&[
            record("2024-01-01", 500, 0, a, PaymentMethod::Cash),
            record("2024-01-02", 900, 0, b, PaymentMethod::Cash),
            record("2024-01-03", 500, 0, c, PaymentMethod::Cash),
        ]);
        let order: Vec<Uuid> = report.by_client.iter().map(|x| x.client_id).collect();
        // b first; a before c because a was seen first at equal revenue.
        assert_eq!(order, vec![b, a, c]);
    }

    #[test]
    fn payment_method_tie_goes_to_first_encountered() {
        let client = Uuid::new_v4();
        let report = revenue_report(&[
            record("2024-01-01", 10, 1, client, PaymentMethod::Transfer),
            record("2024-01-02", 10, 1, client, PaymentMethod::Card),
            record("2024-01-03", 10, 1, client, PaymentMethod::Card),
            record("2024-01-04", 10, 1, client, PaymentMethod::Transfer),
        ]);
        assert_eq!(report.top_payment_method, Some(PaymentMethod::Transfer));
    }
}
