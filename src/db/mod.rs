// The database: connecting, migrating, and the queries of each type.
mod competition;
mod game;
mod history;
mod league;
mod person;
mod stats;
mod team;
mod user;

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteQueryResult};
use tracing::info;

use crate::{error::{Error, Result}, logic::{types::Db, user::{generate_token, Role, User}}};

// Open the database, creating it if needed, and run the migrations.
pub async fn connect(url: &str) -> Result<Db> {
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let db = SqlitePoolOptions::new().connect_with(options).await?;
    migrate(&db).await?;

    info!("connected to {url}");
    return Ok(db);
}

// A private in-memory database. Every connection of a pool would get its own, so keep to one.
pub async fn memory() -> Result<Db> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
    let db = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options).await?;

    migrate(&db).await?;
    return Ok(db);
}

pub async fn migrate(db: &Db) -> Result<()> {
    sqlx::migrate!("sql/migrations").run(db).await?;
    Ok(())
}

// Create the first admin when nobody can log in yet. Returns the new user, if one was created.
pub async fn bootstrap_admin(db: &Db, name: &str, email: &str, token: Option<&str>) -> Result<Option<User>> {
    if User::count(db).await? > 0 {
        return Ok(None);
    }

    let mut admin = User::build(name, email, Role::Admin);
    admin.api_token = match token {
        Some(token) => token.to_string(),
        None => generate_token(&mut rand::rng()),
    };
    admin.save(db).await?;

    info!("created admin user {}", admin.name);
    return Ok(Some(admin));
}

// Turn an empty result into a not found error.
pub(crate) trait Found<T> {
    fn found(self, what: &'static str) -> Result<T>;
}

impl<T> Found<T> for Option<T> {
    fn found(self, what: &'static str) -> Result<T> {
        self.ok_or(Error::NotFound(what))
    }
}

// Fail if an update or a delete did not hit any row.
pub(crate) fn affected(result: SqliteQueryResult, what: &'static str) -> Result<()> {
    match result.rows_affected() {
        0 => Err(Error::NotFound(what)),
        _ => Ok(()),
    }
}
