use crate::{db::{affected, Found}, error::Result, logic::{types::{Db, UserId}, user::{generate_token, User}}};

impl User {
    pub async fn fetch_from_db(db: &Db, id: UserId) -> Result<Self> {
        sqlx::query_as(
            "SELECT * FROM AppUser
            WHERE id = $1"
        ).bind(id)
        .fetch_optional(db).await?
        .found("user")
    }

    // Find the owner of an API token.
    pub async fn fetch_by_token(db: &Db, token: &str) -> Result<Option<Self>> {
        Ok(sqlx::query_as(
            "SELECT * FROM AppUser
            WHERE api_token = $1"
        ).bind(token)
        .fetch_optional(db).await?)
    }

    pub async fn fetch_all(db: &Db) -> Result<Vec<Self>> {
        Ok(sqlx::query_as(
            "SELECT * FROM AppUser
            ORDER BY name"
        ).fetch_all(db).await?)
    }

    pub async fn count(db: &Db) -> Result<u32> {
        Ok(sqlx::query_scalar(
            "SELECT COUNT(*) FROM AppUser"
        ).fetch_one(db).await?)
    }

    // Save a new user. A token is generated unless one was given.
    pub async fn save(&mut self, db: &Db) -> Result<()> {
        self.validate()?;
        if self.api_token.is_empty() {
            self.api_token = generate_token(&mut rand::rng());
        }

        self.id = sqlx::query_scalar(
            "INSERT INTO AppUser (name, email, api_token, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id"
        ).bind(self.name.as_str())
        .bind(self.email.as_str())
        .bind(self.api_token.as_str())
        .bind(self.role)
        .fetch_one(db).await?;

        Ok(())
    }

    // Update the name, email and role. The token stays.
    pub async fn update(&self, db: &Db) -> Result<()> {
        self.validate()?;
        let result = sqlx::query(
            "UPDATE AppUser SET name = $1, email = $2, role = $3
            WHERE id = $4"
        ).bind(self.name.as_str())
        .bind(self.email.as_str())
        .bind(self.role)
        .bind(self.id)
        .execute(db).await?;

        affected(result, "user")
    }

    pub async fn delete(db: &Db, id: UserId) -> Result<()> {
        let result = sqlx::query(
            "DELETE FROM AppUser WHERE id = $1"
        ).bind(id)
        .execute(db).await?;

        affected(result, "user")
    }
}
