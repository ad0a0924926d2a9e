use serde::Serialize;
use sqlx::{FromRow, Row, sqlite::SqliteRow};
use time::Date;

use crate::{error::Result, logic::{league::Season, time::iso_date_format, types::{Db, GameId, MatchdayId, TeamId}}};

#[derive(Serialize)]
pub struct MatchdayPackage {
    pub id: MatchdayId,
    pub number: u8,
    #[serde(with = "iso_date_format::option")]
    pub date: Option<Date>,
    pub games: Vec<GamePackage>,
}

#[derive(Serialize)]
pub struct GamePackage {
    pub id: GameId,
    pub matchday_id: MatchdayId,
    pub home: TeamPackage,
    pub away: TeamPackage,
    pub is_finished: bool,
}

impl FromRow<'_, SqliteRow> for GamePackage {
    fn from_row(row: &SqliteRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            matchday_id: row.try_get("matchday_id")?,
            home: TeamPackage::custom_from_row(row, "home")?,
            away: TeamPackage::custom_from_row(row, "away")?,
            is_finished: row.try_get("is_finished")?,
        })
    }
}

impl GamePackage {
    pub fn select_query() -> String {
        format!(
            "SELECT Game.id, Game.matchday_id, Game.is_finished,
            Game.home_id, home.full_name AS home_name, home.crest AS home_crest, Game.home_goals,
            Game.away_id, away.full_name AS away_name, away.crest AS away_crest, Game.away_goals
            FROM Game
            INNER JOIN Matchday ON Matchday.id = Game.matchday_id
            {} {}",
            TeamPackage::join("home"),
            TeamPackage::join("away"),
        )
    }

    // Every game a team played or will play, in calendar order.
    pub async fn fetch_for_team(db: &Db, team_id: TeamId) -> Result<Vec<Self>> {
        let query = format!(
            "{}
            WHERE Game.home_id = $1 OR Game.away_id = $1
            ORDER BY Matchday.date, Matchday.number, Game.id",
            Self::select_query()
        );
        Ok(sqlx::query_as(&query).bind(team_id).fetch_all(db).await?)
    }
}

#[derive(Serialize)]
pub struct TeamPackage {
    pub id: TeamId,
    pub name: String,
    pub crest: Option<String>,
    pub goals: u8,
}

impl TeamPackage {
    pub fn custom_from_row(row: &SqliteRow, home_away: &str) -> sqlx::Result<Self> {
        Ok(Self {
            id: row.try_get(format!("{home_away}_id").as_str())?,
            name: row.try_get(format!("{home_away}_name").as_str())?,
            crest: row.try_get(format!("{home_away}_crest").as_str())?,
            goals: row.try_get(format!("{home_away}_goals").as_str())?,
        })
    }

    fn join(home_away: &str) -> String {
        format!("INNER JOIN Team {home_away} ON {home_away}.id = Game.{home_away}_id")
    }
}

// The match days of a season with their games.
pub async fn season_calendar(db: &Db, season: &Season) -> Result<Vec<MatchdayPackage>> {
    let query = format!(
        "{}
        WHERE Matchday.season_id = $1
        ORDER BY Matchday.number, Game.id",
        GamePackage::select_query()
    );
    let mut games: Vec<GamePackage> = sqlx::query_as(&query).bind(season.id).fetch_all(db).await?;

    let mut calendar: Vec<MatchdayPackage> = season.matchdays(db).await?
        .into_iter()
        .map(|matchday| MatchdayPackage {
            id: matchday.id,
            number: matchday.number,
            date: matchday.date,
            games: Vec::new(),
        })
        .collect();

    for matchday in calendar.iter_mut() {
        let (own, rest): (Vec<GamePackage>, Vec<GamePackage>) = games.into_iter().partition(|g| g.matchday_id == matchday.id);
        matchday.games = own;
        games = rest;
    }

    return Ok(calendar);
}
