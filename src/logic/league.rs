// Leagues, their seasons and the match days of a season.
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::Date;

use crate::{error::{FieldErrors, Result}, logic::{competition::{ranking::RankCriteria, round_robin::Fixture, standings::PointsFormat}, time::{iso_date_format, weeks_after}, types::{LeagueId, MatchdayId, SeasonId}}};

#[derive(Debug, Serialize, Deserialize)]
#[derive(Default, Clone, PartialEq)]
#[derive(FromRow)]
pub struct League {
    #[serde(default)]
    pub id: LeagueId,
    pub name: String,
    #[serde(default)]
    pub logo: Option<String>,
}

impl League {
    pub fn build(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::new();
        errors.require("name", &self.name);
        errors.into_result()
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[derive(Clone, PartialEq)]
#[derive(FromRow)]
pub struct Season {
    #[serde(default)]
    pub id: SeasonId,
    pub league_id: LeagueId,
    // Years during which the season takes place, such as "2024-2025".
    pub name: String,
    #[serde(default)]
    #[sqlx(flatten)]
    pub points: PointsFormat,
    #[serde(default = "RankCriteria::defaults")]
    #[sqlx(json)]
    pub rank_criteria: Vec<RankCriteria>,
}

impl Season {
    pub fn build(league_id: LeagueId, name: &str) -> Self {
        Self {
            id: SeasonId::default(),
            league_id,
            name: name.to_string(),
            points: PointsFormat::default(),
            rank_criteria: RankCriteria::defaults(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::new();
        errors.require("name", &self.name);
        if self.rank_criteria.is_empty() {
            errors.add("rank_criteria", "at least one criterium is needed");
        }
        errors.into_result()
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[derive(Default, Clone, PartialEq)]
#[derive(FromRow)]
pub struct Matchday {
    #[serde(default)]
    pub id: MatchdayId,
    pub season_id: SeasonId,
    pub number: u8,
    #[serde(default, with = "iso_date_format::option")]
    pub date: Option<Date>,
}

impl Matchday {
    pub fn build(season_id: SeasonId, number: u8, date: Option<Date>) -> Self {
        Self {
            season_id,
            number,
            date,
            ..Default::default()
        }
    }
}

// Match days for a generated schedule, one week apart from the start date.
pub fn schedule_matchdays(season_id: SeasonId, fixtures: &[Fixture], start: Option<Date>) -> Vec<Matchday> {
    let last = fixtures.iter().map(|f| f.matchday).max().unwrap_or(0);
    (1..=last)
        .map(|number| Matchday::build(season_id, number, start.map(|d| weeks_after(d, (number - 1) as u32))))
        .collect()
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;
    use crate::logic::competition::round_robin;

    #[test]
    fn match_days_are_a_week_apart() {
        let fixtures = round_robin::generate(&[1, 2, 3, 4], 2).unwrap();
        let days = schedule_matchdays(7, &fixtures, Some(date!(2025 - 08 - 02)));

        assert_eq!(days.len(), 6);
        assert_eq!(days[0].date, Some(date!(2025 - 08 - 02)));
        assert_eq!(days[5].date, Some(date!(2025 - 09 - 06)));
        assert!(days.iter().all(|d| d.season_id == 7));
    }

    #[test]
    fn seasons_need_a_name() {
        assert!(Season::build(1, "").validate().is_err());
        assert!(Season::build(1, "2024-2025").validate().is_ok());
    }
}
