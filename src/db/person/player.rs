use sqlx::SqliteConnection;

use crate::{db::{affected, Found}, error::Result, logic::{person::{player::Player, Position}, types::{Db, PlayerId, PositionId}}};

impl Player {
    pub async fn fetch_from_db(db: &Db, id: PlayerId) -> Result<Self> {
        let mut player: Self = sqlx::query_as(
            "SELECT * FROM Player
            WHERE id = $1"
        ).bind(id)
        .fetch_optional(db).await?
        .found("player")?;

        player.secondary_position_ids = Self::fetch_secondary_position_ids(db, id).await?;
        return Ok(player);
    }

    pub async fn fetch_all(db: &Db) -> Result<Vec<Self>> {
        Ok(sqlx::query_as(
            "SELECT * FROM Player
            ORDER BY last_name, first_name"
        ).fetch_all(db).await?)
    }

    async fn fetch_secondary_position_ids(db: &Db, id: PlayerId) -> Result<Vec<PositionId>> {
        Ok(sqlx::query_scalar(
            "SELECT position_id FROM PlayerPosition
            WHERE player_id = $1
            ORDER BY position_id"
        ).bind(id)
        .fetch_all(db).await?)
    }

    // The primary position first, then the secondary ones.
    pub async fn positions(&self, db: &Db) -> Result<Vec<Position>> {
        Ok(sqlx::query_as(
            "SELECT Position.* FROM Position
            LEFT JOIN PlayerPosition ON PlayerPosition.position_id = Position.id AND PlayerPosition.player_id = $1
            WHERE Position.id = $2 OR PlayerPosition.player_id IS NOT NULL
            ORDER BY Position.id != $2, Position.id"
        ).bind(self.id)
        .bind(self.position_id)
        .fetch_all(db).await?)
    }

    // Save a new player with their secondary positions.
    pub async fn save(&mut self, db: &Db) -> Result<()> {
        self.validate()?;
        self.normalise_positions();

        let mut tx = db.begin().await?;
        self.id = sqlx::query_scalar(
            "INSERT INTO Player (first_name, last_name, shirt_number, birth_date, nationality, photo, team_id, position_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id"
        ).bind(self.first_name.as_str())
        .bind(self.last_name.as_str())
        .bind(self.shirt_number)
        .bind(self.birth_date)
        .bind(self.nationality.as_deref())
        .bind(self.photo.as_deref())
        .bind(self.team_id)
        .bind(self.position_id)
        .fetch_one(&mut *tx).await?;

        self.save_secondary_positions(&mut tx).await?;
        tx.commit().await?;
        Ok(())
    }

    // Update the player. The current team only changes through transfers.
    pub async fn update(&mut self, db: &Db) -> Result<()> {
        self.validate()?;
        self.normalise_positions();

        let mut tx = db.begin().await?;
        let result = sqlx::query(
            "UPDATE Player SET first_name = $1, last_name = $2, shirt_number = $3, birth_date = $4,
            nationality = $5, photo = $6, position_id = $7
            WHERE id = $8"
        ).bind(self.first_name.as_str())
        .bind(self.last_name.as_str())
        .bind(self.shirt_number)
        .bind(self.birth_date)
        .bind(self.nationality.as_deref())
        .bind(self.photo.as_deref())
        .bind(self.position_id)
        .bind(self.id)
        .execute(&mut *tx).await?;
        affected(result, "player")?;

        self.save_secondary_positions(&mut tx).await?;
        tx.commit().await?;
        Ok(())
    }

    // Replace the secondary positions.
    async fn save_secondary_positions(&self, conn: &mut SqliteConnection) -> Result<()> {
        sqlx::query(
            "DELETE FROM PlayerPosition WHERE player_id = $1"
        ).bind(self.id)
        .execute(&mut *conn).await?;

        for position_id in self.secondary_position_ids.iter() {
            sqlx::query(
                "INSERT INTO PlayerPosition (player_id, position_id)
                VALUES ($1, $2)"
            ).bind(self.id)
            .bind(position_id)
            .execute(&mut *conn).await?;
        }

        Ok(())
    }

    pub async fn delete(db: &Db, id: PlayerId) -> Result<()> {
        let result = sqlx::query(
            "DELETE FROM Player WHERE id = $1"
        ).bind(id)
        .execute(db).await?;

        affected(result, "player")
    }
}
