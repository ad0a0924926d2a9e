mod event;

use crate::{db::{affected, Found}, error::Result, logic::{game::Game, types::{Db, GameId}}};

impl Game {
    pub async fn fetch_from_db(db: &Db, id: GameId) -> Result<Self> {
        sqlx::query_as(
            "SELECT * FROM Game
            WHERE id = $1"
        ).bind(id)
        .fetch_optional(db).await?
        .found("game")
    }

    pub async fn save(&mut self, db: &Db) -> Result<()> {
        self.validate()?;
        self.id = sqlx::query_scalar(
            "INSERT INTO Game (matchday_id, home_id, away_id, home_goals, away_goals, home_goalkeeper_id, away_goalkeeper_id,
            home_saves, away_saves, is_finished, man_of_the_match_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id"
        ).bind(self.matchday_id)
        .bind(self.home_id)
        .bind(self.away_id)
        .bind(self.home_goals)
        .bind(self.away_goals)
        .bind(self.home_goalkeeper_id)
        .bind(self.away_goalkeeper_id)
        .bind(self.home_saves)
        .bind(self.away_saves)
        .bind(self.is_finished)
        .bind(self.man_of_the_match_id)
        .fetch_one(db).await?;

        Ok(())
    }

    // Update the whole game, score included.
    pub async fn update(&self, db: &Db) -> Result<()> {
        self.validate()?;
        let result = sqlx::query(
            "UPDATE Game SET matchday_id = $1, home_id = $2, away_id = $3, home_goals = $4, away_goals = $5,
            home_goalkeeper_id = $6, away_goalkeeper_id = $7, home_saves = $8, away_saves = $9, is_finished = $10,
            man_of_the_match_id = $11
            WHERE id = $12"
        ).bind(self.matchday_id)
        .bind(self.home_id)
        .bind(self.away_id)
        .bind(self.home_goals)
        .bind(self.away_goals)
        .bind(self.home_goalkeeper_id)
        .bind(self.away_goalkeeper_id)
        .bind(self.home_saves)
        .bind(self.away_saves)
        .bind(self.is_finished)
        .bind(self.man_of_the_match_id)
        .bind(self.id)
        .execute(db).await?;

        affected(result, "game")
    }

    pub async fn delete(db: &Db, id: GameId) -> Result<()> {
        let result = sqlx::query(
            "DELETE FROM Game WHERE id = $1"
        ).bind(id)
        .execute(db).await?;

        affected(result, "game")
    }
}
