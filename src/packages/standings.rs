use std::collections::HashMap;

use ordinal::ToOrdinal as _;
use serde::Serialize;

use crate::{error::Result, logic::{competition::standings::Standing, league::Season, team::Team, types::{Db, TeamId}}};

// A table row with the team's name and the rank as an ordinal.
#[derive(Debug, Serialize)]
#[derive(Clone, PartialEq)]
pub struct StandingPackage {
    pub team_id: TeamId,
    pub name: String,
    pub crest: Option<String>,
    pub rank: String,
    pub points: u16,
    pub played: u8,
    pub won: u8,
    pub drawn: u8,
    pub lost: u8,
    pub goals_for: u16,
    pub goals_against: u16,
    pub goal_difference: i16,
}

impl StandingPackage {
    pub fn build(standing: &Standing, team: Option<&Team>) -> Self {
        Self {
            team_id: standing.team_id,
            name: team.map(|t| t.full_name.clone()).unwrap_or_default(),
            crest: team.and_then(|t| t.crest.clone()),
            rank: standing.rank.to_ordinal_string(),
            points: standing.points,
            played: standing.played,
            won: standing.won,
            drawn: standing.drawn,
            lost: standing.lost,
            goals_for: standing.goals_for,
            goals_against: standing.goals_against,
            goal_difference: standing.goal_difference,
        }
    }
}

// Put names on a computed table.
pub async fn with_names(db: &Db, standings: &[Standing]) -> Result<Vec<StandingPackage>> {
    let ids: Vec<TeamId> = standings.iter().map(|s| s.team_id).collect();
    let teams: HashMap<TeamId, Team> = Team::fetch_many(db, &ids).await?
        .into_iter()
        .map(|t| (t.id, t))
        .collect();

    Ok(standings.iter().map(|s| StandingPackage::build(s, teams.get(&s.team_id))).collect())
}

pub async fn season_table(db: &Db, season: &Season) -> Result<Vec<StandingPackage>> {
    let standings = season.standings(db).await?;
    with_names(db, &standings).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranks_are_ordinals() {
        let mut standing = Standing::build(4);
        standing.rank = 2;
        standing.points = 7;

        let team = Team::build("Rovers");
        let row = StandingPackage::build(&standing, Some(&team));
        assert_eq!(row.rank, "2nd");
        assert_eq!(row.name, "Rovers");
        assert_eq!(row.points, 7);
    }
}
