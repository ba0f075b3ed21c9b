use chrono::Utc;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{BookEventCmd, Engine, EngineError, Money, Permission, Role};
use migration::MigratorTrait;
use uuid::Uuid;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let backend = db.get_database_backend();
    for (username, role) in [("alice", "admin"), ("bruno", "staff")] {
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

async fn seed_booking_target(engine: &Engine) -> (Uuid, Uuid) {
    let client = engine
        .new_client("Anna", None, None, "alice")
        .await
        .unwrap();
    let package = engine
        .new_package("Classico", Money::new(45_00), Money::new(22_50), 0, false, false, "alice")
        .await
        .unwrap();
    (client.id, package.id)
}

fn book_as(client_id: Uuid, package_id: Uuid, user: &str) -> BookEventCmd {
    BookEventCmd {
        client_id,
        name: "Dinner".to_string(),
        event_date: chrono::NaiveDate::from_ymd_opt(2026, 5, 1).unwrap(),
        package_id,
        adult_count: 4,
        child_count: 0,
        upcharge_ids: vec![],
        gratuity_percent: 10,
        note: None,
        user_id: user.to_string(),
    }
}

#[tokio::test]
async fn defaults_apply_without_overrides() {
    let (engine, _db) = engine_with_db().await;

    let grants = engine
        .effective_permissions(Role::Staff, "alice")
        .await
        .unwrap();

    let create = grants
        .iter()
        .find(|g| g.permission == Permission::EventsCreate)
        .unwrap();
    assert!(create.allowed);
    assert!(!create.overridden);

    let manage = grants
        .iter()
        .find(|g| g.permission == Permission::PermissionsManage)
        .unwrap();
    assert!(!manage.allowed);
    assert!(!manage.overridden);
}

#[tokio::test]
async fn override_revokes_and_audit_records_it() {
    let (engine, _db) = engine_with_db().await;
    let (client_id, package_id) = seed_booking_target(&engine).await;

    // Staff can book by default.
    engine
        .book_event(book_as(client_id, package_id, "bruno"))
        .await
        .unwrap();

    engine
        .set_permission(Role::Staff, Permission::EventsCreate, false, "alice", Utc::now())
        .await
        .unwrap();

    let err = engine
        .book_event(book_as(client_id, package_id, "bruno"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    let grants = engine
        .effective_permissions(Role::Staff, "alice")
        .await
        .unwrap();
    let create = grants
        .iter()
        .find(|g| g.permission == Permission::EventsCreate)
        .unwrap();
    assert!(!create.allowed);
    assert!(create.overridden);

    // Re-granting restores booking; the audit keeps both changes,
    // newest first.
    engine
        .set_permission(Role::Staff, Permission::EventsCreate, true, "alice", Utc::now())
        .await
        .unwrap();
    engine
        .book_event(book_as(client_id, package_id, "bruno"))
        .await
        .unwrap();

    let audit = engine.permission_audit(10, "alice").await.unwrap();
    assert_eq!(audit.len(), 2);
    assert!(audit[0].allowed);
    assert!(!audit[1].allowed);
    assert_eq!(audit[0].changed_by, "alice");
    assert_eq!(audit[0].permission, Permission::EventsCreate);
    assert_eq!(audit[0].role, Role::Staff);
}

#[tokio::test]
async fn staff_cannot_manage_permissions() {
    let (engine, _db) = engine_with_db().await;

    let err = engine
        .set_permission(Role::Staff, Permission::InvoicesVoid, true, "bruno", Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    let err = engine
        .effective_permissions(Role::Staff, "bruno")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));
}

#[tokio::test]
async fn override_can_grant_beyond_defaults() {
    let (engine, _db) = engine_with_db().await;

    engine
        .set_permission(Role::Staff, Permission::InvoicesVoid, true, "alice", Utc::now())
        .await
        .unwrap();

    let grants = engine
        .effective_permissions(Role::Staff, "alice")
        .await
        .unwrap();
    let void = grants
        .iter()
        .find(|g| g.permission == Permission::InvoicesVoid)
        .unwrap();
    assert!(void.allowed);
    assert!(void.overridden);
}

#[tokio::test]
async fn staff_accounts_lifecycle() {
    let (engine, _db) = engine_with_db().await;

    engine
        .create_user("dora", "password", Role::Staff, "alice")
        .await
        .unwrap();
    let err = engine
        .create_user("dora", "other", Role::Staff, "alice")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));

    engine
        .set_user_role("dora", Role::Admin, "alice")
        .await
        .unwrap();
    let users = engine.list_users(false, "alice").await.unwrap();
    let dora = users.iter().find(|u| u.username == "dora").unwrap();
    assert_eq!(dora.role, Role::Admin);

    // Archived accounts stop resolving.
    engine.archive_user("bruno", "alice").await.unwrap();
    let err = engine
        .list_users(false, "bruno")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    let err = engine.archive_user("alice", "alice").await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidRole(_)));
}
