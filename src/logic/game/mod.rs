// Regular league matches.
pub mod event;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::{error::{Error, FieldErrors, Result}, logic::{competition::standings::FixtureResult, types::{GameId, MatchdayId, PlayerId, TeamId}}};

#[derive(Debug, Serialize, Deserialize)]
#[derive(Default, Clone, PartialEq)]
#[derive(FromRow)]
pub struct Game {
    #[serde(default)]
    pub id: GameId,
    pub matchday_id: MatchdayId,
    pub home_id: TeamId,
    pub away_id: TeamId,
    #[serde(default)]
    pub home_goals: u8,
    #[serde(default)]
    pub away_goals: u8,
    #[serde(default)]
    pub home_goalkeeper_id: Option<PlayerId>,
    #[serde(default)]
    pub away_goalkeeper_id: Option<PlayerId>,
    #[serde(default)]
    pub home_saves: u8,
    #[serde(default)]
    pub away_saves: u8,
    #[serde(default)]
    pub is_finished: bool,
    #[serde(default)]
    pub man_of_the_match_id: Option<PlayerId>,
}

impl Game {
    pub fn build(matchday_id: MatchdayId, home_id: TeamId, away_id: TeamId) -> Self {
        Self {
            matchday_id,
            home_id,
            away_id,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::new();
        if self.home_id == self.away_id {
            errors.add("away_id", "a team cannot play against itself");
        }
        if self.home_goalkeeper_id.is_some() && self.home_goalkeeper_id == self.away_goalkeeper_id {
            errors.add("away_goalkeeper_id", "the same player cannot keep goal for both teams");
        }
        errors.into_result()
    }

    pub fn fixture_result(&self) -> FixtureResult {
        FixtureResult {
            home_id: self.home_id,
            away_id: self.away_id,
            home_goals: self.home_goals,
            away_goals: self.away_goals,
            is_finished: self.is_finished,
        }
    }
}

// A result as entered by hand. Penalties only matter for cup ties.
#[derive(Debug, Serialize, Deserialize)]
#[derive(Default, Clone, Copy, PartialEq)]
pub struct Score {
    pub home_goals: u8,
    pub away_goals: u8,
    #[serde(default)]
    pub home_penalties: Option<u8>,
    #[serde(default)]
    pub away_penalties: Option<u8>,
    #[serde(default)]
    pub is_finished: bool,
}

impl Score {
    pub fn build(home_goals: u8, away_goals: u8, is_finished: bool) -> Self {
        Self {
            home_goals,
            away_goals,
            is_finished,
            ..Default::default()
        }
    }

    pub fn with_penalties(mut self, home: u8, away: u8) -> Self {
        self.home_penalties = Some(home);
        self.away_penalties = Some(away);
        return self;
    }

    pub fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::new();
        if self.home_penalties.is_some() != self.away_penalties.is_some() {
            errors.add("away_penalties", "a shootout needs a score for both teams");
        }
        errors.into_result()
    }
}

// Which side of a match a team played on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Side {
    Home,
    Away,
}

impl Side {
    // Find the side of the team, or fail if it did not play in the match.
    pub fn of(team_id: TeamId, home_id: Option<TeamId>, away_id: Option<TeamId>) -> Result<Self> {
        if home_id == Some(team_id) {
            return Ok(Self::Home);
        }
        if away_id == Some(team_id) {
            return Ok(Self::Away);
        }

        let mut errors = FieldErrors::new();
        errors.add("team_id", "the team did not play in this match");
        return Err(Error::Validation(errors));
    }

    // The score column of this side.
    pub fn goals_column(&self) -> &'static str {
        match self {
            Self::Home => "home_goals",
            Self::Away => "away_goals",
        }
    }
}
