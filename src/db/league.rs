use sqlx::types::Json;
use time::Date;
use tracing::info;

use crate::{db::{affected, Found}, error::{Error, Result}, logic::{competition::{round_robin, standings::{self, FixtureResult, Standing}}, game::Game, league::{self, League, Matchday, Season}, types::{Db, LeagueId, MatchdayId, SeasonId, TeamId}}};

impl League {
    pub async fn fetch_from_db(db: &Db, id: LeagueId) -> Result<Self> {
        sqlx::query_as(
            "SELECT * FROM League
            WHERE id = $1"
        ).bind(id)
        .fetch_optional(db).await?
        .found("league")
    }

    pub async fn fetch_all(db: &Db) -> Result<Vec<Self>> {
        Ok(sqlx::query_as(
            "SELECT * FROM League
            ORDER BY name"
        ).fetch_all(db).await?)
    }

    pub async fn save(&mut self, db: &Db) -> Result<()> {
        self.validate()?;
        self.id = sqlx::query_scalar(
            "INSERT INTO League (name, logo)
            VALUES ($1, $2)
            RETURNING id"
        ).bind(self.name.as_str())
        .bind(self.logo.as_deref())
        .fetch_one(db).await?;

        Ok(())
    }

    pub async fn update(&self, db: &Db) -> Result<()> {
        self.validate()?;
        let result = sqlx::query(
            "UPDATE League SET name = $1, logo = $2
            WHERE id = $3"
        ).bind(self.name.as_str())
        .bind(self.logo.as_deref())
        .bind(self.id)
        .execute(db).await?;

        affected(result, "league")
    }

    pub async fn delete(db: &Db, id: LeagueId) -> Result<()> {
        let result = sqlx::query(
            "DELETE FROM League WHERE id = $1"
        ).bind(id)
        .execute(db).await?;

        affected(result, "league")
    }

    pub async fn seasons(&self, db: &Db) -> Result<Vec<Season>> {
        Ok(sqlx::query_as(
            "SELECT * FROM Season
            WHERE league_id = $1
            ORDER BY name DESC"
        ).bind(self.id)
        .fetch_all(db).await?)
    }
}

impl Season {
    pub async fn fetch_from_db(db: &Db, id: SeasonId) -> Result<Self> {
        sqlx::query_as(
            "SELECT * FROM Season
            WHERE id = $1"
        ).bind(id)
        .fetch_optional(db).await?
        .found("season")
    }

    pub async fn fetch_all(db: &Db) -> Result<Vec<Self>> {
        Ok(sqlx::query_as(
            "SELECT * FROM Season
            ORDER BY league_id, name"
        ).fetch_all(db).await?)
    }

    pub async fn save(&mut self, db: &Db) -> Result<()> {
        self.validate()?;
        self.id = sqlx::query_scalar(
            "INSERT INTO Season (league_id, name, points_for_win, points_for_draw, points_for_loss, rank_criteria)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id"
        ).bind(self.league_id)
        .bind(self.name.as_str())
        .bind(self.points.points_for_win)
        .bind(self.points.points_for_draw)
        .bind(self.points.points_for_loss)
        .bind(Json(&self.rank_criteria))
        .fetch_one(db).await?;

        Ok(())
    }

    pub async fn update(&self, db: &Db) -> Result<()> {
        self.validate()?;
        let result = sqlx::query(
            "UPDATE Season SET league_id = $1, name = $2, points_for_win = $3, points_for_draw = $4,
            points_for_loss = $5, rank_criteria = $6
            WHERE id = $7"
        ).bind(self.league_id)
        .bind(self.name.as_str())
        .bind(self.points.points_for_win)
        .bind(self.points.points_for_draw)
        .bind(self.points.points_for_loss)
        .bind(Json(&self.rank_criteria))
        .bind(self.id)
        .execute(db).await?;

        affected(result, "season")
    }

    pub async fn delete(db: &Db, id: SeasonId) -> Result<()> {
        let result = sqlx::query(
            "DELETE FROM Season WHERE id = $1"
        ).bind(id)
        .execute(db).await?;

        affected(result, "season")
    }

    // Teams entered into the season, and any team that has a game in it.
    pub async fn team_ids(&self, db: &Db) -> Result<Vec<TeamId>> {
        Ok(sqlx::query_scalar(
            "SELECT team_id FROM SeasonTeam WHERE season_id = $1
            UNION
            SELECT home_id FROM Game INNER JOIN Matchday ON Matchday.id = Game.matchday_id WHERE Matchday.season_id = $1
            UNION
            SELECT away_id FROM Game INNER JOIN Matchday ON Matchday.id = Game.matchday_id WHERE Matchday.season_id = $1
            ORDER BY 1"
        ).bind(self.id)
        .fetch_all(db).await?)
    }

    pub async fn matchdays(&self, db: &Db) -> Result<Vec<Matchday>> {
        Ok(sqlx::query_as(
            "SELECT * FROM Matchday
            WHERE season_id = $1
            ORDER BY number"
        ).bind(self.id)
        .fetch_all(db).await?)
    }

    pub async fn games(&self, db: &Db) -> Result<Vec<Game>> {
        Ok(sqlx::query_as(
            "SELECT Game.* FROM Game
            INNER JOIN Matchday ON Matchday.id = Game.matchday_id
            WHERE Matchday.season_id = $1
            ORDER BY Matchday.number, Game.id"
        ).bind(self.id)
        .fetch_all(db).await?)
    }

    // The league table, computed from the finished games.
    pub async fn standings(&self, db: &Db) -> Result<Vec<Standing>> {
        let teams = self.team_ids(db).await?;
        let results: Vec<FixtureResult> = self.games(db).await?.iter().map(Game::fixture_result).collect();
        return Ok(standings::compute(&teams, &results, &self.points, &self.rank_criteria));
    }

    // Create the match days and games of a full round robin between the teams.
    pub async fn generate_schedule(&self, db: &Db, teams: &[TeamId], legs: u8, start: Option<Date>) -> Result<Vec<Matchday>> {
        let fixtures = round_robin::generate(teams, legs)?;
        let mut matchdays = league::schedule_matchdays(self.id, &fixtures, start);

        let mut tx = db.begin().await?;
        let existing: u32 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM Matchday WHERE season_id = $1"
        ).bind(self.id)
        .fetch_one(&mut *tx).await?;
        if existing > 0 {
            return Err(Error::invalid_configuration("the season already has match days"));
        }

        for team_id in teams.iter() {
            sqlx::query(
                "INSERT OR IGNORE INTO SeasonTeam (season_id, team_id)
                VALUES ($1, $2)"
            ).bind(self.id)
            .bind(team_id)
            .execute(&mut *tx).await?;
        }

        for matchday in matchdays.iter_mut() {
            matchday.id = sqlx::query_scalar(
                "INSERT INTO Matchday (season_id, number, date)
                VALUES ($1, $2, $3)
                RETURNING id"
            ).bind(self.id)
            .bind(matchday.number)
            .bind(matchday.date)
            .fetch_one(&mut *tx).await?;
        }

        for fixture in fixtures.iter() {
            let matchday_id = matchdays[(fixture.matchday - 1) as usize].id;
            sqlx::query(
                "INSERT INTO Game (matchday_id, home_id, away_id)
                VALUES ($1, $2, $3)"
            ).bind(matchday_id)
            .bind(fixture.home_id)
            .bind(fixture.away_id)
            .execute(&mut *tx).await?;
        }

        tx.commit().await?;
        info!("scheduled {} games over {} match days for season {}", fixtures.len(), matchdays.len(), self.id);
        return Ok(matchdays);
    }
}

impl Matchday {
    pub async fn fetch_from_db(db: &Db, id: MatchdayId) -> Result<Self> {
        sqlx::query_as(
            "SELECT * FROM Matchday
            WHERE id = $1"
        ).bind(id)
        .fetch_optional(db).await?
        .found("match day")
    }

    pub async fn save(&mut self, db: &Db) -> Result<()> {
        self.id = sqlx::query_scalar(
            "INSERT INTO Matchday (season_id, number, date)
            VALUES ($1, $2, $3)
            RETURNING id"
        ).bind(self.season_id)
        .bind(self.number)
        .bind(self.date)
        .fetch_one(db).await?;

        Ok(())
    }

    pub async fn update(&self, db: &Db) -> Result<()> {
        let result = sqlx::query(
            "UPDATE Matchday SET season_id = $1, number = $2, date = $3
            WHERE id = $4"
        ).bind(self.season_id)
        .bind(self.number)
        .bind(self.date)
        .bind(self.id)
        .execute(db).await?;

        affected(result, "match day")
    }

    pub async fn delete(db: &Db, id: MatchdayId) -> Result<()> {
        let result = sqlx::query(
            "DELETE FROM Matchday WHERE id = $1"
        ).bind(id)
        .execute(db).await?;

        affected(result, "match day")
    }

    pub async fn games(&self, db: &Db) -> Result<Vec<Game>> {
        Ok(sqlx::query_as(
            "SELECT * FROM Game
            WHERE matchday_id = $1
            ORDER BY id"
        ).bind(self.id)
        .fetch_all(db).await?)
    }
}
