mod player;
mod transfer;

use crate::{db::{affected, Found}, error::Result, logic::{person::Position, types::{Db, PositionId}}};

impl Position {
    pub async fn fetch_from_db(db: &Db, id: PositionId) -> Result<Self> {
        sqlx::query_as(
            "SELECT * FROM Position
            WHERE id = $1"
        ).bind(id)
        .fetch_optional(db).await?
        .found("position")
    }

    pub async fn fetch_all(db: &Db) -> Result<Vec<Self>> {
        Ok(sqlx::query_as(
            "SELECT * FROM Position
            ORDER BY id"
        ).fetch_all(db).await?)
    }

    pub async fn save(&mut self, db: &Db) -> Result<()> {
        self.validate()?;
        self.id = sqlx::query_scalar(
            "INSERT INTO Position (position_name, abbreviation)
            VALUES ($1, $2)
            RETURNING id"
        ).bind(self.position_name.as_str())
        .bind(self.abbreviation.as_str())
        .fetch_one(db).await?;

        Ok(())
    }

    pub async fn update(&self, db: &Db) -> Result<()> {
        self.validate()?;
        let result = sqlx::query(
            "UPDATE Position SET position_name = $1, abbreviation = $2
            WHERE id = $3"
        ).bind(self.position_name.as_str())
        .bind(self.abbreviation.as_str())
        .bind(self.id)
        .execute(db).await?;

        affected(result, "position")
    }

    pub async fn delete(db: &Db, id: PositionId) -> Result<()> {
        let result = sqlx::query(
            "DELETE FROM Position WHERE id = $1"
        ).bind(id)
        .execute(db).await?;

        affected(result, "position")
    }
}
