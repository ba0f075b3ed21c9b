use std::{error::Error, io::Write};

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use engine::{
    BookEventCmd, Engine, IngredientUsage, Money, PaymentMethod, RecordRevenueCmd, Role,
};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection, EntityTrait, Set};

mod users {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "users")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub username: String,
        pub password: String,
        pub role: String,
        pub archived: bool,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

#[derive(Parser, Debug)]
#[command(name = "convivio_admin")]
#[command(about = "Admin utilities for Convivio (bootstrap users, seed demo data)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./convivio.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    Seed(Seed),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Create(UserCreateArgs),
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    username: String,
    /// One of: admin, staff, client.
    #[arg(long, default_value = "staff")]
    role: String,
}

#[derive(Args, Debug)]
struct Seed {
    #[command(subcommand)]
    command: SeedCommand,
}

#[derive(Subcommand, Debug)]
enum SeedCommand {
    /// Inserts a small demonstration dataset (clients, catalog, revenue).
    ///
    /// Seeding is the only source of demo data; the analytics endpoints
    /// never substitute it on their own.
    Demo(SeedDemoArgs),
}

#[derive(Args, Debug)]
struct SeedDemoArgs {
    /// Existing user the seeded rows are created as (needs admin rights).
    #[arg(long = "as", default_value = "admin")]
    as_user: String,
}

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> Result<Self, Box<dyn Error + Send + Sync>> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn prompt_password(prompt: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
    let _raw = RawModeGuard::enter()?;

    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(prompt)
    )?;
    out.flush()?;

    let mut buf = String::new();
    loop {
        let Event::Key(KeyEvent {
            code, modifiers, ..
        }) = event::read()?
        else {
            continue;
        };

        match code {
            KeyCode::Enter => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                break;
            }
            KeyCode::Backspace => {
                if buf.pop().is_some() {
                    execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
                    out.flush()?;
                }
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                return Err("interrupted".into());
            }
            KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                buf.push(ch);
                execute!(out, Print("*"))?;
                out.flush()?;
            }
            _ => {}
        }
    }

    Ok(buf)
}

fn prompt_password_twice() -> Result<String, Box<dyn Error + Send + Sync>> {
    let mut out = std::io::stderr();
    for _ in 0..3 {
        let p1 = prompt_password("Password: ")?;
        if p1.is_empty() {
            execute!(
                out,
                cursor::MoveToColumn(0),
                terminal::Clear(ClearType::CurrentLine),
                Print("Password must not be empty.\r\n")
            )?;
            continue;
        }

        let p2 = prompt_password("Confirm password: ")?;
        if p1 == p2 {
            return Ok(p1);
        }

        execute!(
            out,
            cursor::MoveToColumn(0),
            terminal::Clear(ClearType::CurrentLine),
            Print("Passwords do not match. Try again.\r\n")
        )?;
    }

    Err("too many attempts".into())
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

fn date(year: i32, month: u32, day: u32) -> Result<NaiveDate, Box<dyn Error + Send + Sync>> {
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| "invalid date".into())
}

async fn seed_demo(engine: &Engine, user: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
    let rossi = engine
        .new_client("Rossi Wedding", Some("rossi@example.com"), None, user)
        .await?;
    let bianchi = engine
        .new_client(
            "Bianchi S.p.A.",
            Some("events@bianchi.example"),
            Some("+39 045 555 0101"),
            user,
        )
        .await?;
    let circolo = engine
        .new_client("Circolo Nautico", None, Some("+39 045 555 0188"), user)
        .await?;

    engine
        .new_package("Classico", Money::new(45_00), Money::new(22_50), 10, false, false, user)
        .await?;
    let gala = engine
        .new_package("Gala", Money::new(60_00), Money::new(30_00), 20, false, false, user)
        .await?;
    engine
        .new_package("Orto", Money::new(38_00), Money::new(19_00), 0, true, true, user)
        .await?;

    let seafood = engine
        .new_upcharge("Seafood course", Money::new(7_00), user)
        .await?;
    engine
        .new_upcharge("Premium wine pairing", Money::new(12_00), user)
        .await?;
    engine
        .new_upcharge("Dessert buffet", Money::new(4_50), user)
        .await?;

    let flour = engine
        .new_ingredient("Flour", "kg", Money::new(80), 25.0, user)
        .await?;
    let butter = engine
        .new_ingredient("Butter", "kg", Money::new(12_50), 8.0, user)
        .await?;
    let sea_bass = engine
        .new_ingredient("Sea bass", "kg", Money::new(28_00), 12.0, user)
        .await?;

    engine
        .new_recipe(
            "Branzino al forno",
            4,
            vec![
                IngredientUsage {
                    ingredient_id: sea_bass.id,
                    quantity: 1.6,
                },
                IngredientUsage {
                    ingredient_id: butter.id,
                    quantity: 0.2,
                },
                IngredientUsage {
                    ingredient_id: flour.id,
                    quantity: 0.1,
                },
            ],
            user,
        )
        .await?;

    engine
        .book_event(BookEventCmd {
            client_id: rossi.id,
            name: "Rossi wedding reception".to_string(),
            event_date: date(2026, 9, 12)?,
            package_id: gala.id,
            adult_count: 60,
            child_count: 8,
            upcharge_ids: vec![seafood.id],
            gratuity_percent: 18,
            note: Some("Terrace dinner, sunset ceremony".to_string()),
            user_id: user.to_string(),
        })
        .await?;

    let records: [(NaiveDate, i64, i64, i64, i64, i64, &engine::Client, PaymentMethod); 6] = [
        (date(2026, 3, 14)?, 425000, 120000, 90000, 15000, 200000, &rossi, PaymentMethod::Card),
        (date(2026, 3, 28)?, 610000, 180000, 130000, 20000, 280000, &bianchi, PaymentMethod::Transfer),
        (date(2026, 4, 5)?, 240000, 70000, 55000, 10000, 105000, &rossi, PaymentMethod::Card),
        (date(2026, 4, 19)?, 150000, 52000, 38000, 6000, 54000, &circolo, PaymentMethod::Cash),
        (date(2026, 5, 9)?, 380000, 110000, 82000, 13000, 175000, &bianchi, PaymentMethod::Card),
        (date(2026, 6, 21)?, 95000, 30000, 24000, 4000, 37000, &circolo, PaymentMethod::Check),
    ];
    for (occurred_on, gross, food, labor, other, net, client, method) in records {
        engine
            .record_revenue(RecordRevenueCmd {
                event_id: None,
                client_id: client.id,
                occurred_on,
                gross_revenue: Money::new(gross),
                food_cost: Money::new(food),
                labor_cost: Money::new(labor),
                other_expenses: Money::new(other),
                net_profit: Money::new(net),
                payment_method: method,
                user_id: user.to_string(),
            })
            .await?;
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;

    match cli.command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            let role = match Role::try_from(args.role.as_str()) {
                Ok(role) => role,
                Err(err) => {
                    eprintln!("{err}");
                    std::process::exit(2);
                }
            };
            let password = prompt_password_twice()?;

            if users::Entity::find_by_id(args.username.clone())
                .one(&db)
                .await?
                .is_some()
            {
                eprintln!("user already exists: {}", args.username);
                std::process::exit(1);
            }

            let user = users::ActiveModel {
                username: Set(args.username.clone()),
                password: Set(password),
                role: Set(role.as_str().to_string()),
                archived: Set(false),
            };
            users::Entity::insert(user).exec(&db).await?;

            println!("created user: {} ({})", args.username, role.as_str());
        }
        Command::Seed(Seed {
            command: SeedCommand::Demo(args),
        }) => {
            if users::Entity::find_by_id(args.as_user.clone())
                .one(&db)
                .await?
                .is_none()
            {
                eprintln!("user not found: {}", args.as_user);
                std::process::exit(1);
            }

            let engine = Engine::builder().database(db.clone()).build().await?;
            seed_demo(&engine, &args.as_user).await?;
            println!("seeded demo dataset as {}", args.as_user);
        }
    }

    Ok(())
}
