// Cups with a group stage followed by a knockout phase.
use std::collections::HashSet;

use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::{error::{Error, FieldErrors, Result}, logic::{competition::{cup::CupRules, ranking::RankCriteria, standings::{FixtureResult, PointsFormat, Standing}}, game::Score, types::{CupId, GroupedCupId, PouleGameId, PouleId, TeamId}}};

#[derive(Debug, Serialize, Deserialize)]
#[derive(Clone, Copy, PartialEq)]
pub struct GroupFormat {
    pub no_of_teams: u8,
    pub no_of_groups: u8,
    pub qualifiers_per_group: u8,
    pub random_draw: bool,
    pub group_legs: u8,
    pub knockout_legs: u8,
    pub knockout_random_pairing: bool,
    pub win_only: bool,
    #[serde(default)]
    pub points: PointsFormat,
}

impl Default for GroupFormat {
    fn default() -> Self {
        Self {
            no_of_teams: 8,
            no_of_groups: 2,
            qualifiers_per_group: 2,
            random_draw: false,
            group_legs: 1,
            knockout_legs: 1,
            knockout_random_pairing: false,
            win_only: false,
            points: PointsFormat::default(),
        }
    }
}

impl GroupFormat {
    pub fn group_size(&self) -> u8 {
        match self.no_of_groups {
            0 => 0,
            groups => self.no_of_teams / groups,
        }
    }

    // How many teams make it to the knockout phase.
    pub fn knockout_teams(&self) -> u8 {
        self.no_of_groups.saturating_mul(self.qualifiers_per_group)
    }

    // Check that the groups can be drawn and the knockout phase built.
    pub fn validate(&self) -> Result<()> {
        if self.no_of_groups == 0 {
            return Err(Error::invalid_configuration("a grouped cup needs at least one group"));
        }
        if self.no_of_teams % self.no_of_groups != 0 {
            return Err(Error::invalid_configuration(format!(
                "{} teams cannot be split evenly into {} groups", self.no_of_teams, self.no_of_groups
            )));
        }
        if self.group_size() < 2 {
            return Err(Error::invalid_configuration("every group needs at least 2 teams"));
        }
        if self.qualifiers_per_group == 0 || self.qualifiers_per_group >= self.group_size() {
            return Err(Error::invalid_configuration(format!(
                "between 1 and {} teams can qualify from a group of {}", self.group_size() - 1, self.group_size()
            )));
        }
        if !(1..=2).contains(&self.group_legs) || !(1..=2).contains(&self.knockout_legs) {
            return Err(Error::invalid_configuration("matches are played over 1 or 2 legs"));
        }
        if self.knockout_teams() < 2 {
            return Err(Error::invalid_configuration("the knockout phase needs at least 2 teams"));
        }

        return Ok(());
    }

    // The rules of the knockout phase.
    pub fn knockout_rules(&self) -> CupRules {
        CupRules::build(self.knockout_teams(), self.knockout_random_pairing, None, self.knockout_legs, self.win_only)
    }
}

#[derive(Debug, Serialize)]
#[derive(Default, Clone)]
#[derive(FromRow)]
pub struct GroupedCup {
    pub id: GroupedCupId,
    pub name: String,
    #[sqlx(json)]
    pub format: GroupFormat,
    #[sqlx(json)]
    pub rank_criteria: Vec<RankCriteria>,
    // The knockout phase, once the group stage is over.
    pub cup_id: Option<CupId>,
    pub is_generated: bool,
}

impl GroupedCup {
    pub fn build(name: &str, format: GroupFormat, rank_criteria: Vec<RankCriteria>) -> Self {
        Self {
            name: name.to_string(),
            format,
            rank_criteria: match rank_criteria.is_empty() {
                true => RankCriteria::defaults(),
                false => rank_criteria,
            },
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::new();
        errors.require("name", &self.name);
        errors.into_result()?;
        self.format.validate()
    }
}

// A single group.
#[derive(Debug, Serialize)]
#[derive(Default, Clone)]
#[derive(FromRow)]
pub struct Poule {
    pub id: PouleId,
    pub grouped_cup_id: GroupedCupId,
    pub name: String,

    #[sqlx(skip)]
    pub standings: Vec<Standing>,
    #[sqlx(skip)]
    pub games: Vec<PouleGame>,
}

impl Poule {
    pub fn build(grouped_cup_id: GroupedCupId, name: String) -> Self {
        Self {
            grouped_cup_id,
            name,
            ..Default::default()
        }
    }

    // Check if every game of the group has been played.
    pub fn is_over(&self) -> bool {
        self.games.iter().all(|g| g.is_finished)
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[derive(Default, Clone, PartialEq)]
#[derive(FromRow)]
pub struct PouleGame {
    pub id: PouleGameId,
    pub poule_id: PouleId,
    pub matchday: u8,
    pub home_id: TeamId,
    pub away_id: TeamId,
    pub home_goals: u8,
    pub away_goals: u8,
    pub is_finished: bool,
}

impl PouleGame {
    // Enter the result. Group games can end level, so penalties are ignored.
    pub fn apply(&mut self, score: &Score) {
        self.home_goals = score.home_goals;
        self.away_goals = score.away_goals;
        self.is_finished = score.is_finished;
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

// "Group A", "Group B" and so on.
pub fn group_name(index: usize) -> String {
    let letter = (b'A' + (index % 26) as u8) as char;
    match index / 26 {
        0 => format!("Group {letter}"),
        n => format!("Group {letter}{n}"),
    }
}

// Split the teams into groups.
// Without a random draw the teams are dealt out like cards: team i goes to group i mod g.
pub fn draw<R: Rng + ?Sized>(teams: &[TeamId], format: &GroupFormat, rng: &mut R) -> Result<Vec<Vec<TeamId>>> {
    format.validate()?;

    if teams.len() != format.no_of_teams as usize {
        return Err(Error::invalid_configuration(format!(
            "the grouped cup is set up for {} teams, but {} were given", format.no_of_teams, teams.len()
        )));
    }

    let unique: HashSet<&TeamId> = teams.iter().collect();
    if unique.len() != teams.len() {
        return Err(Error::invalid_configuration("a team is entered twice"));
    }

    let mut pool = teams.to_vec();
    if format.random_draw {
        pool.shuffle(rng);
    }

    let mut groups = vec![Vec::new(); format.no_of_groups as usize];
    for (i, team_id) in pool.into_iter().enumerate() {
        groups[i % format.no_of_groups as usize].push(team_id);
    }

    return Ok(groups);
}

// Get the teams that go through, group winners first, then runners-up and so on.
// With ordered pairing and a power of two groups, teams from the same group cannot meet in the first knockout round.
// Other group counts give no such guarantee.
pub fn qualifiers(ranked_groups: &[Vec<Standing>], per_group: u8) -> Result<Vec<TeamId>> {
    let mut teams = Vec::new();
    for position in 0..per_group as usize {
        for group in ranked_groups.iter() {
            match group.get(position) {
                Some(row) => teams.push(row.team_id),
                None => return Err(Error::invalid_configuration(format!(
                    "a group has only {} teams, {per_group} should qualify", group.len()
                ))),
            }
        }
    }

    return Ok(teams);
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::logic::competition::{cup::bracket, round_robin, standings};

    fn format(no_of_teams: u8, no_of_groups: u8, qualifiers_per_group: u8) -> GroupFormat {
        GroupFormat {
            no_of_teams,
            no_of_groups,
            qualifiers_per_group,
            ..Default::default()
        }
    }

    #[test]
    fn format_rules_are_enforced() {
        assert!(format(8, 2, 2).validate().is_ok());
        assert!(matches!(format(9, 2, 2).validate(), Err(Error::InvalidConfiguration(_))));
        assert!(matches!(format(8, 2, 4).validate(), Err(Error::InvalidConfiguration(_))));
        assert!(matches!(format(8, 2, 0).validate(), Err(Error::InvalidConfiguration(_))));
        assert!(matches!(format(8, 0, 1).validate(), Err(Error::InvalidConfiguration(_))));
        assert!(matches!(format(2, 1, 1).validate(), Err(Error::InvalidConfiguration(_))));
    }

    #[test]
    fn ordered_draw_deals_teams_out() {
        let groups = draw(&[1, 2, 3, 4, 5, 6, 7, 8], &format(8, 2, 2), &mut StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(groups, vec![vec![1, 3, 5, 7], vec![2, 4, 6, 8]]);
        assert_eq!(group_name(0), "Group A");
        assert_eq!(group_name(1), "Group B");
    }

    #[test]
    fn random_draw_keeps_every_team() {
        let mut random = format(8, 4, 1);
        random.random_draw = true;
        let groups = draw(&[1, 2, 3, 4, 5, 6, 7, 8], &random, &mut StdRng::seed_from_u64(9)).unwrap();

        assert_eq!(groups.len(), 4);
        assert!(groups.iter().all(|g| g.len() == 2));
        let mut all: Vec<TeamId> = groups.concat();
        all.sort_unstable();
        assert_eq!(all, vec![1, 2, 3, 4, 5, 6, 7, 8]);
    }

    // Play a group where the lower id always wins.
    fn play_group(teams: &[TeamId]) -> Vec<Standing> {
        let results: Vec<FixtureResult> = round_robin::generate(teams, 1).unwrap().iter()
            .map(|f| {
                let home_wins = f.home_id < f.away_id;
                FixtureResult {
                    home_id: f.home_id,
                    away_id: f.away_id,
                    home_goals: if home_wins { 2 } else { 0 },
                    away_goals: if home_wins { 0 } else { 2 },
                    is_finished: true,
                }
            })
            .collect();
        standings::compute(teams, &results, &PointsFormat::default(), &RankCriteria::defaults())
    }

    #[test]
    fn top_two_of_two_groups_make_a_four_team_knockout() {
        let format = format(8, 2, 2);
        let groups = draw(&[1, 2, 3, 4, 5, 6, 7, 8], &format, &mut StdRng::seed_from_u64(1)).unwrap();
        let tables: Vec<Vec<Standing>> = groups.iter().map(|g| play_group(g)).collect();

        // Group A: 1, 3, 5, 7. Group B: 2, 4, 6, 8.
        let through = qualifiers(&tables, format.qualifiers_per_group).unwrap();
        assert_eq!(through, vec![1, 2, 3, 4]);

        let knockout = bracket::build(&through, &format.knockout_rules(), &mut StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(knockout.rounds.len(), 2);

        // Group winners face the runners-up of the other group.
        let semis: Vec<(Option<TeamId>, Option<TeamId>)> = knockout.rounds[0].games.iter()
            .map(|g| (g.home_id, g.away_id))
            .collect();
        assert_eq!(semis, vec![(Some(1), Some(4)), (Some(2), Some(3))]);
    }
}
