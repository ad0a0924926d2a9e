// Goals and cards. A goal also changes the score of its match.
use sqlx::SqliteConnection;
use tracing::debug;

use crate::{db::{affected, competition::cup, Found}, error::Result, logic::{competition::grouped_cup::Poule, game::{event::{Card, GameRef, Goal}, Side}, types::{CardId, Db, GoalId, TeamId}}};

// Get the teams of the referenced match.
async fn teams_of(conn: &mut SqliteConnection, game: GameRef) -> Result<(Option<TeamId>, Option<TeamId>)> {
    let query = format!("SELECT home_id, away_id FROM {} WHERE id = $1", game.table());
    sqlx::query_as(&query)
        .bind(game.id())
        .fetch_optional(&mut *conn).await?
        .found("game")
}

// Add to or take from the score of one side.
async fn change_score(conn: &mut SqliteConnection, game: GameRef, side: Side, change: i8) -> Result<()> {
    let column = side.goals_column();
    let query = format!(
        "UPDATE {} SET {column} = MAX({column} + $1, 0) WHERE id = $2",
        game.table()
    );
    sqlx::query(&query)
        .bind(change)
        .bind(game.id())
        .execute(&mut *conn).await?;

    Ok(())
}

// Group tables and cup ties depend on the score, so they are recomputed within the same transaction.
async fn refresh_results(conn: &mut SqliteConnection, game: GameRef) -> Result<()> {
    match game {
        GameRef::Poule(id) => {
            let poule_id = sqlx::query_scalar(
                "SELECT poule_id FROM PouleGame WHERE id = $1"
            ).bind(id)
            .fetch_one(&mut *conn).await?;

            Poule::recompute_standings(conn, poule_id).await?;
        }
        GameRef::Cup(id) => {
            cup::readvance(conn, id).await?;
        }
        GameRef::Regular(_) => (),
    }
    Ok(())
}

impl Goal {
    pub async fn fetch_from_db(db: &Db, id: GoalId) -> Result<Self> {
        sqlx::query_as(
            "SELECT * FROM Goal
            WHERE id = $1"
        ).bind(id)
        .fetch_optional(db).await?
        .found("goal")
    }

    // Goals of a match in the order they were entered.
    pub async fn fetch_for_game(db: &Db, game: GameRef) -> Result<Vec<Self>> {
        let column = event_column(game);
        Ok(sqlx::query_as(&format!("SELECT * FROM Goal WHERE {column} = $1 ORDER BY id"))
            .bind(game.id())
            .fetch_all(db).await?)
    }

    // Save the goal and add it to the score of the match.
    pub async fn record(&mut self, db: &Db) -> Result<()> {
        self.validate()?;
        let game = self.game_ref()?;

        let mut tx = db.begin().await?;
        let (home_id, away_id) = teams_of(&mut tx, game).await?;
        let side = Side::of(self.team_id, home_id, away_id)?;

        self.id = sqlx::query_scalar(
            "INSERT INTO Goal (game_id, cup_game_id, poule_game_id, team_id, scorer_id, assist_id, minute, goal_type)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id"
        ).bind(self.game_id)
        .bind(self.cup_game_id)
        .bind(self.poule_game_id)
        .bind(self.team_id)
        .bind(self.scorer_id)
        .bind(self.assist_id)
        .bind(self.minute.as_deref())
        .bind(self.goal_type)
        .fetch_one(&mut *tx).await?;

        change_score(&mut tx, game, side, 1).await?;
        refresh_results(&mut tx, game).await?;
        tx.commit().await?;

        debug!("goal {} recorded for team {} in {:?}", self.id, self.team_id, game);
        Ok(())
    }

    // Delete the goal and take it off the score.
    pub async fn remove(db: &Db, id: GoalId) -> Result<()> {
        let mut tx = db.begin().await?;
        let goal: Goal = sqlx::query_as(
            "SELECT * FROM Goal WHERE id = $1"
        ).bind(id)
        .fetch_optional(&mut *tx).await?
        .found("goal")?;

        let game = goal.game_ref()?;
        let (home_id, away_id) = teams_of(&mut tx, game).await?;

        sqlx::query(
            "DELETE FROM Goal WHERE id = $1"
        ).bind(id)
        .execute(&mut *tx).await?;

        // The team may have been removed from the match since; the score is left alone then.
        if let Ok(side) = Side::of(goal.team_id, home_id, away_id) {
            change_score(&mut tx, game, side, -1).await?;
        }
        refresh_results(&mut tx, game).await?;
        tx.commit().await?;
        Ok(())
    }
}

impl Card {
    pub async fn fetch_for_game(db: &Db, game: GameRef) -> Result<Vec<Self>> {
        let column = event_column(game);
        Ok(sqlx::query_as(&format!("SELECT * FROM Card WHERE {column} = $1 ORDER BY id"))
            .bind(game.id())
            .fetch_all(db).await?)
    }

    pub async fn record(&mut self, db: &Db) -> Result<()> {
        self.validate()?;
        let game = self.game_ref()?;

        let mut tx = db.begin().await?;
        let (home_id, away_id) = teams_of(&mut tx, game).await?;
        Side::of(self.team_id, home_id, away_id)?;

        self.id = sqlx::query_scalar(
            "INSERT INTO Card (game_id, cup_game_id, poule_game_id, team_id, player_id, minute, card_type)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id"
        ).bind(self.game_id)
        .bind(self.cup_game_id)
        .bind(self.poule_game_id)
        .bind(self.team_id)
        .bind(self.player_id)
        .bind(self.minute.as_deref())
        .bind(self.card_type)
        .fetch_one(&mut *tx).await?;

        tx.commit().await?;
        Ok(())
    }

    pub async fn remove(db: &Db, id: CardId) -> Result<()> {
        let result = sqlx::query(
            "DELETE FROM Card WHERE id = $1"
        ).bind(id)
        .execute(db).await?;

        affected(result, "card")
    }
}

fn event_column(game: GameRef) -> &'static str {
    match game {
        GameRef::Regular(_) => "game_id",
        GameRef::Cup(_) => "cup_game_id",
        GameRef::Poule(_) => "poule_game_id",
    }
}
