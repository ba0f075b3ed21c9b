use chrono::NaiveDate;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{Engine, EngineError, Money, PaymentMethod, RecordRevenueCmd};
use migration::MigratorTrait;
use uuid::Uuid;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let backend = db.get_database_backend();
    for (username, role) in [("alice", "admin"), ("bruno", "staff"), ("carla", "client")] {
        db.execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO users (username, password, role, archived) VALUES (?, ?, ?, ?)",
            vec![username.into(), "password".into(), role.into(), false.into()],
        ))
        .await
        .unwrap();
    }
    let engine = Engine::builder().database(db.clone()).build().await.unwrap();
    (engine, db)
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn record_cmd(
    client_id: Uuid,
    occurred_on: NaiveDate,
    gross: i64,
    net: i64,
    method: PaymentMethod,
) -> RecordRevenueCmd {
    RecordRevenueCmd {
        event_id: None,
        client_id,
        occurred_on,
        gross_revenue: Money::new(gross),
        food_cost: Money::ZERO,
        labor_cost: Money::ZERO,
        other_expenses: Money::ZERO,
        net_profit: Money::new(net),
        payment_method: method,
        user_id: "alice".to_string(),
    }
}

#[tokio::test]
async fn report_aggregates_months_and_clients() {
    let (engine, _db) = engine_with_db().await;
    let anna = engine.new_client("Anna", None, None, "alice").await.unwrap();
    let bice = engine.new_client("Bice", None, None, "alice").await.unwrap();

    engine
        .record_revenue(record_cmd(anna.id, date(2024, 1, 5), 1000, 300, PaymentMethod::Card))
        .await
        .unwrap();
    engine
        .record_revenue(record_cmd(bice.id, date(2024, 1, 20), 500, 100, PaymentMethod::Cash))
        .await
        .unwrap();

    let report = engine.revenue_report(None, None, "alice").await.unwrap();

    assert_eq!(report.by_month.len(), 1);
    assert_eq!(report.by_month[0].month, "2024-01");
    assert_eq!(report.by_month[0].revenue, Money::new(1500));
    assert_eq!(report.by_month[0].profit, Money::new(400));

    assert_eq!(report.by_client.len(), 2);
    assert_eq!(report.by_client[0].client_id, anna.id);
    assert_eq!(report.by_client[0].client_name.as_deref(), Some("Anna"));
    assert_eq!(report.by_client[1].client_name.as_deref(), Some("Bice"));

    assert_eq!(report.total_revenue, Money::new(1500));
    assert!((report.profit_margin_percent - 26.666_666_666_666_668).abs() < 1e-9);
    assert_eq!(report.average_event_revenue, Money::new(750));

    // Conservation: both groupings cover every cent.
    let by_month: i64 = report.by_month.iter().map(|b| b.revenue.minor()).sum();
    let by_client: i64 = report.by_client.iter().map(|b| b.revenue.minor()).sum();
    assert_eq!(by_month, report.total_revenue.minor());
    assert_eq!(by_client, report.total_revenue.minor());
}

#[tokio::test]
async fn empty_report_is_all_zero() {
    let (engine, _db) = engine_with_db().await;

    let report = engine.revenue_report(None, None, "alice").await.unwrap();

    assert!(report.by_month.is_empty());
    assert!(report.by_client.is_empty());
    assert_eq!(report.total_revenue, Money::ZERO);
    assert_eq!(report.profit_margin_percent, 0.0);
    assert_eq!(report.average_event_revenue, Money::ZERO);
    assert_eq!(report.top_payment_method, None);
}

#[tokio::test]
async fn range_filter_is_half_open() {
    let (engine, _db) = engine_with_db().await;
    let anna = engine.new_client("Anna", None, None, "alice").await.unwrap();

    for (month, day) in [(1, 15), (2, 1), (2, 28), (3, 1)] {
        engine
            .record_revenue(record_cmd(
                anna.id,
                date(2024, month, day),
                100,
                10,
                PaymentMethod::Card,
            ))
            .await
            .unwrap();
    }

    let records = engine
        .list_revenue_records(Some(date(2024, 2, 1)), Some(date(2024, 3, 1)), "alice")
        .await
        .unwrap();
    assert_eq!(records.len(), 2);

    let err = engine
        .list_revenue_records(Some(date(2024, 3, 1)), Some(date(2024, 2, 1)), "alice")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidDate(_)));
}

#[tokio::test]
async fn negative_amounts_rejected() {
    let (engine, _db) = engine_with_db().await;
    let anna = engine.new_client("Anna", None, None, "alice").await.unwrap();

    let mut cmd = record_cmd(anna.id, date(2024, 1, 5), 1000, 300, PaymentMethod::Card);
    cmd.food_cost = Money::new(-1);
    let err = engine.record_revenue(cmd).await.unwrap_err();

    assert_eq!(
        err,
        EngineError::InvalidAmount("food_cost must not be negative".to_string())
    );
}

#[tokio::test]
async fn delete_record_removes_it_from_the_report() {
    let (engine, _db) = engine_with_db().await;
    let anna = engine.new_client("Anna", None, None, "alice").await.unwrap();

    let record = engine
        .record_revenue(record_cmd(anna.id, date(2024, 1, 5), 1000, 300, PaymentMethod::Card))
        .await
        .unwrap();
    engine
        .delete_revenue_record(record.id, "alice")
        .await
        .unwrap();

    let report = engine.revenue_report(None, None, "alice").await.unwrap();
    assert_eq!(report.total_revenue, Money::ZERO);
}

#[tokio::test]
async fn client_role_cannot_record_revenue() {
    let (engine, _db) = engine_with_db().await;
    let anna = engine.new_client("Anna", None, None, "alice").await.unwrap();

    let mut cmd = record_cmd(anna.id, date(2024, 1, 5), 1000, 300, PaymentMethod::Card);
    cmd.user_id = "carla".to_string();
    let err = engine.record_revenue(cmd).await.unwrap_err();

    assert!(matches!(err, EngineError::Forbidden(_)));
}

#[tokio::test]
async fn csv_export_needs_the_export_permission() {
    let (engine, _db) = engine_with_db().await;
    let anna = engine.new_client("Anna", None, None, "alice").await.unwrap();
    engine
        .record_revenue(record_cmd(anna.id, date(2024, 1, 5), 1000, 300, PaymentMethod::Card))
        .await
        .unwrap();

    // Staff holds analytics.view but not analytics.export.
    let err = engine
        .revenue_report_csv(None, None, "bruno")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    let bytes = engine.revenue_report_csv(None, None, "alice").await.unwrap();
    let text = String::from_utf8(bytes).unwrap();
    assert!(text.starts_with("month,revenue_minor,profit_minor,events"));
    assert!(text.contains("2024-01,1000,300,1"));
    assert!(text.contains("TOTAL,1000,300,1"));
}
