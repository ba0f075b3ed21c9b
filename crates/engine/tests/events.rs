use chrono::{NaiveDate, Utc};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{
    BookEventCmd, Engine, EngineError, EventListFilter, EventStatus, IssueInvoiceCmd, Money,
    QuoteCmd,
};
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

/// A client, a 60.00/30.00 package and a 7.00 upcharge.
async fn seed_catalog(engine: &Engine, min_guests: u32) -> (Uuid, Uuid, Uuid) {
    let client = engine
        .new_client("Rossi Wedding", None, None, "alice")
        .await
        .unwrap();
    let package = engine
        .new_package(
            "Gala",
            Money::new(60_00),
            Money::new(30_00),
            min_guests,
            false,
            false,
            "alice",
        )
        .await
        .unwrap();
    let upcharge = engine
        .new_upcharge("Seafood course", Money::new(7_00), "alice")
        .await
        .unwrap();
    (client.id, package.id, upcharge.id)
}

fn book_cmd(client_id: Uuid, package_id: Uuid, upcharge_ids: Vec<Uuid>) -> BookEventCmd {
    BookEventCmd {
        client_id,
        name: "Reception".to_string(),
        event_date: date(2026, 9, 12),
        package_id,
        adult_count: 10,
        child_count: 2,
        upcharge_ids,
        gratuity_percent: 20,
        note: None,
        user_id: "alice".to_string(),
    }
}

#[tokio::test]
async fn book_event_snapshots_quote() {
    let (engine, _db) = engine_with_db().await;
    let (client_id, package_id, upcharge_id) = seed_catalog(&engine, 0).await;

    let event = engine
        .book_event(book_cmd(client_id, package_id, vec![upcharge_id]))
        .await
        .unwrap();

    assert_eq!(event.subtotal, Money::new(744_00));
    assert_eq!(event.gratuity, Money::new(148_80));
    assert_eq!(event.total, Money::new(892_80));
    assert_eq!(event.status, EventStatus::Booked);
    assert_eq!(event.upcharge_ids, vec![upcharge_id]);

    let reloaded = engine.event(event.id, "alice").await.unwrap();
    assert_eq!(reloaded.total, event.total);
    assert_eq!(reloaded.upcharge_ids, vec![upcharge_id]);
}

#[tokio::test]
async fn quote_preview_matches_booking() {
    let (engine, _db) = engine_with_db().await;
    let (_, package_id, upcharge_id) = seed_catalog(&engine, 0).await;

    let quote = engine
        .price_quote(QuoteCmd {
            package_id,
            adult_count: 10,
            child_count: 2,
            upcharge_ids: vec![upcharge_id],
            gratuity_percent: 20,
            user_id: "alice".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(quote.subtotal, Money::new(744_00));
    assert_eq!(quote.total, Money::new(892_80));
}

#[tokio::test]
async fn duplicate_upcharge_selection_collapses() {
    let (engine, _db) = engine_with_db().await;
    let (client_id, package_id, upcharge_id) = seed_catalog(&engine, 0).await;

    let event = engine
        .book_event(book_cmd(client_id, package_id, vec![upcharge_id, upcharge_id]))
        .await
        .unwrap();

    // Set semantics: the duplicate contributes once.
    assert_eq!(event.upcharge_ids, vec![upcharge_id]);
    assert_eq!(event.subtotal, Money::new(744_00));
}

#[tokio::test]
async fn third_upcharge_rejected_at_booking() {
    let (engine, _db) = engine_with_db().await;
    let (client_id, package_id, _) = seed_catalog(&engine, 0).await;
    let second = engine
        .new_upcharge("Wine pairing", Money::new(12_00), "alice")
        .await
        .unwrap();
    let third = engine
        .new_upcharge("Dessert buffet", Money::new(4_50), "alice")
        .await
        .unwrap();
    let first = engine
        .new_upcharge("Cheese course", Money::new(5_00), "alice")
        .await
        .unwrap();

    let err = engine
        .book_event(book_cmd(client_id, package_id, vec![first.id, second.id, third.id]))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        EngineError::InvalidAmount("at most 2 upcharges per selection".to_string())
    );
}

#[tokio::test]
async fn booking_below_package_minimum_rejected() {
    let (engine, _db) = engine_with_db().await;
    let (client_id, package_id, _) = seed_catalog(&engine, 20).await;

    let err = engine
        .book_event(book_cmd(client_id, package_id, vec![]))
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::InvalidAmount(_)));
}

#[tokio::test]
async fn client_role_cannot_book() {
    let (engine, _db) = engine_with_db().await;
    let (client_id, package_id, _) = seed_catalog(&engine, 0).await;

    let mut cmd = book_cmd(client_id, package_id, vec![]);
    cmd.user_id = "carla".to_string();
    let err = engine.book_event(cmd).await.unwrap_err();

    assert!(matches!(err, EngineError::Forbidden(_)));
}

#[tokio::test]
async fn client_role_sees_only_own_events() {
    let (engine, _db) = engine_with_db().await;
    let (client_id, package_id, _) = seed_catalog(&engine, 0).await;

    let event = engine
        .book_event(book_cmd(client_id, package_id, vec![]))
        .await
        .unwrap();

    let (listed, _) = engine
        .list_events_page(10, None, &EventListFilter::default(), "carla")
        .await
        .unwrap();
    assert!(listed.is_empty());

    let err = engine.event(event.id, "carla").await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    let (listed, _) = engine
        .list_events_page(10, None, &EventListFilter::default(), "alice")
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn cancel_event_is_terminal() {
    let (engine, _db) = engine_with_db().await;
    let (client_id, package_id, _) = seed_catalog(&engine, 0).await;
    let event = engine
        .book_event(book_cmd(client_id, package_id, vec![]))
        .await
        .unwrap();

    engine
        .cancel_event(event.id, "alice", Utc::now())
        .await
        .unwrap();

    let err = engine
        .cancel_event(event.id, "alice", Utc::now())
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::InvalidStatus("event already canceled".to_string())
    );

    let err = engine
        .update_event(event.id, engine::UpdateEventCmd::default(), "alice")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidStatus(_)));
}

#[tokio::test]
async fn status_moves_forward_only() {
    let (engine, _db) = engine_with_db().await;
    let (client_id, package_id, _) = seed_catalog(&engine, 0).await;
    let event = engine
        .book_event(book_cmd(client_id, package_id, vec![]))
        .await
        .unwrap();

    let err = engine
        .update_event_status(event.id, EventStatus::Completed, "alice")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidStatus(_)));

    engine
        .update_event_status(event.id, EventStatus::Confirmed, "alice")
        .await
        .unwrap();
    let event = engine
        .update_event_status(event.id, EventStatus::Completed, "alice")
        .await
        .unwrap();
    assert_eq!(event.status, EventStatus::Completed);
}

#[tokio::test]
async fn update_event_requotes() {
    let (engine, _db) = engine_with_db().await;
    let (client_id, package_id, upcharge_id) = seed_catalog(&engine, 0).await;
    let event = engine
        .book_event(book_cmd(client_id, package_id, vec![upcharge_id]))
        .await
        .unwrap();

    let updated = engine
        .update_event(
            event.id,
            engine::UpdateEventCmd {
                adult_count: Some(20),
                upcharge_ids: Some(vec![]),
                gratuity_percent: Some(0),
                ..Default::default()
            },
            "alice",
        )
        .await
        .unwrap();

    // 20 × 60.00 + 2 × 30.00, no upcharge, no gratuity.
    assert_eq!(updated.subtotal, Money::new(1260_00));
    assert_eq!(updated.total, Money::new(1260_00));
    assert!(updated.upcharge_ids.is_empty());
}

#[tokio::test]
async fn event_pagination_walks_newest_to_oldest() {
    let (engine, _db) = engine_with_db().await;
    let (client_id, package_id, _) = seed_catalog(&engine, 0).await;

    for day in 1..=5 {
        let mut cmd = book_cmd(client_id, package_id, vec![]);
        cmd.name = format!("Event {day}");
        cmd.event_date = date(2026, 7, day);
        engine.book_event(cmd).await.unwrap();
    }

    let mut seen = Vec::new();
    let mut cursor: Option<String> = None;
    loop {
        let (page, next) = engine
            .list_events_page(2, cursor.as_deref(), &EventListFilter::default(), "alice")
            .await
            .unwrap();
        seen.extend(page.into_iter().map(|e| e.event_date));
        match next {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    let expected: Vec<NaiveDate> = (1..=5).rev().map(|day| date(2026, 7, day)).collect();
    assert_eq!(seen, expected);
}

#[tokio::test]
async fn invoice_lifecycle_and_numbering() {
    let (engine, _db) = engine_with_db().await;
    let (client_id, package_id, _) = seed_catalog(&engine, 0).await;
    let event = engine
        .book_event(book_cmd(client_id, package_id, vec![]))
        .await
        .unwrap();

    let invoice = engine
        .issue_invoice(IssueInvoiceCmd {
            event_id: event.id,
            issued_on: date(2026, 1, 10),
            due_on: date(2026, 2, 10),
            user_id: "alice".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(invoice.number, "INV-2026-0001");
    assert_eq!(invoice.total, event.total);

    // One active invoice per event.
    let err = engine
        .issue_invoice(IssueInvoiceCmd {
            event_id: event.id,
            issued_on: date(2026, 1, 11),
            due_on: date(2026, 2, 11),
            user_id: "alice".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));

    // Staff cannot void.
    let err = engine
        .void_invoice(invoice.id, "bruno", Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    engine
        .void_invoice(invoice.id, "alice", Utc::now())
        .await
        .unwrap();

    // Voiding freed the event for a new invoice; numbering continues.
    let second = engine
        .issue_invoice(IssueInvoiceCmd {
            event_id: event.id,
            issued_on: date(2026, 1, 12),
            due_on: date(2026, 2, 12),
            user_id: "alice".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(second.number, "INV-2026-0002");

    let paid = engine
        .mark_invoice_paid(second.id, Utc::now(), "alice")
        .await
        .unwrap();
    assert!(paid.paid_at.is_some());

    let err = engine
        .void_invoice(second.id, "alice", Utc::now())
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::InvalidStatus("cannot void a paid invoice".to_string())
    );
}

#[tokio::test]
async fn canceled_event_cannot_be_invoiced() {
    let (engine, _db) = engine_with_db().await;
    let (client_id, package_id, _) = seed_catalog(&engine, 0).await;
    let event = engine
        .book_event(book_cmd(client_id, package_id, vec![]))
        .await
        .unwrap();
    engine
        .cancel_event(event.id, "alice", Utc::now())
        .await
        .unwrap();

    let err = engine
        .issue_invoice(IssueInvoiceCmd {
            event_id: event.id,
            issued_on: date(2026, 1, 10),
            due_on: date(2026, 2, 10),
            user_id: "alice".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidStatus(_)));
}
