// Table rows for round robin stages, computed from match results.
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::logic::{competition::ranking::{self, RankCriteria}, types::TeamId};

// How many points each result is worth.
#[derive(Debug, Serialize, Deserialize)]
#[derive(Clone, Copy, PartialEq)]
#[derive(FromRow)]
pub struct PointsFormat {
    pub points_for_win: u8,
    pub points_for_draw: u8,
    pub points_for_loss: u8,
}

impl Default for PointsFormat {
    fn default() -> Self {
        Self::build(3, 1, 0)
    }
}

impl PointsFormat {
    pub fn build(points_for_win: u8, points_for_draw: u8, points_for_loss: u8) -> Self {
        Self {
            points_for_win,
            points_for_draw,
            points_for_loss,
        }
    }
}

// The part of a match that matters for the table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixtureResult {
    pub home_id: TeamId,
    pub away_id: TeamId,
    pub home_goals: u8,
    pub away_goals: u8,
    pub is_finished: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[derive(Default, Clone, PartialEq)]
#[derive(FromRow)]
pub struct Standing {
    pub team_id: TeamId,
    #[sqlx(rename = "ranking")]
    pub rank: u8,
    pub points: u16,
    pub played: u8,
    pub won: u8,
    pub drawn: u8,
    pub lost: u8,
    pub goals_for: u16,
    pub goals_against: u16,
    pub goal_difference: i16,
}

// Basics.
impl Standing {
    pub fn build(team_id: TeamId) -> Self {
        Self {
            team_id,
            ..Default::default()
        }
    }

    // Add the data of a single match to this row.
    pub fn update(&mut self, game_data: &Standing) {
        self.played += game_data.played;
        self.won += game_data.won;
        self.drawn += game_data.drawn;
        self.lost += game_data.lost;
        self.goals_for += game_data.goals_for;
        self.goals_against += game_data.goals_against;
        self.goal_difference = self.goals_for as i16 - self.goals_against as i16;
    }

    // Count the points with the given format.
    fn count_points(&mut self, format: &PointsFormat) {
        self.points =
            self.won as u16 * format.points_for_win as u16 +
            self.drawn as u16 * format.points_for_draw as u16 +
            self.lost as u16 * format.points_for_loss as u16;
    }

    // Get the rows of both teams from a single finished match.
    pub fn from_fixture(fixture: &FixtureResult) -> (Standing, Standing) {
        let mut home_data = Standing::build(fixture.home_id);
        let mut away_data = Standing::build(fixture.away_id);

        if fixture.home_goals > fixture.away_goals {
            home_data.won = 1;
            away_data.lost = 1;
        }
        else if fixture.away_goals > fixture.home_goals {
            away_data.won = 1;
            home_data.lost = 1;
        }
        else {
            home_data.drawn = 1;
            away_data.drawn = 1;
        }

        home_data.played = 1;
        away_data.played = 1;
        home_data.goals_for = fixture.home_goals as u16;
        away_data.goals_for = fixture.away_goals as u16;
        home_data.goals_against = fixture.away_goals as u16;
        away_data.goals_against = fixture.home_goals as u16;

        return (home_data, away_data);
    }
}

// Compute the whole table from scratch.
// Every team in `teams` gets a row even without matches, in the given order before ranking.
pub fn compute(teams: &[TeamId], fixtures: &[FixtureResult], format: &PointsFormat, criteria: &[RankCriteria]) -> Vec<Standing> {
    let mut standings: Vec<Standing> = teams.iter().map(|id| Standing::build(*id)).collect();

    for fixture in fixtures.iter().filter(|f| f.is_finished) {
        let (home_data, away_data) = Standing::from_fixture(fixture);
        row_for(&mut standings, fixture.home_id).update(&home_data);
        row_for(&mut standings, fixture.away_id).update(&away_data);
    }

    for standing in standings.iter_mut() {
        standing.count_points(format);
    }

    ranking::rank(&mut standings, criteria);
    return standings;
}

// Get the row of a team, adding one if the team has none yet.
fn row_for(standings: &mut Vec<Standing>, team_id: TeamId) -> &mut Standing {
    let index = match standings.iter().position(|s| s.team_id == team_id) {
        Some(i) => i,
        None => {
            standings.push(Standing::build(team_id));
            standings.len() - 1
        }
    };
    &mut standings[index]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finished(home_id: TeamId, away_id: TeamId, home_goals: u8, away_goals: u8) -> FixtureResult {
        FixtureResult { home_id, away_id, home_goals, away_goals, is_finished: true }
    }

    const A: TeamId = 1;
    const B: TeamId = 2;
    const C: TeamId = 3;
    const D: TeamId = 4;

    fn group_results() -> Vec<FixtureResult> {
        vec![
            finished(A, B, 2, 0),
            finished(C, D, 1, 1),
            finished(A, C, 3, 1),
            finished(B, D, 0, 0),
            finished(A, D, 1, 1),
            finished(B, C, 2, 1),
        ]
    }

    #[test]
    fn four_team_group_is_ranked_by_points() {
        let table = compute(&[A, B, C, D], &group_results(), &PointsFormat::default(), &RankCriteria::defaults());

        let order: Vec<TeamId> = table.iter().map(|s| s.team_id).collect();
        assert_eq!(order, vec![A, B, D, C]);

        let a = &table[0];
        assert_eq!((a.won, a.drawn, a.lost), (2, 1, 0));
        assert_eq!(a.points, 7);
        assert_eq!((a.goals_for, a.goals_against, a.goal_difference), (6, 2, 4));
        assert_eq!(a.played, 3);

        let points: Vec<u16> = table.iter().map(|s| s.points).collect();
        assert_eq!(points, vec![7, 4, 3, 1]);
        assert_eq!(table[1].goal_difference, -1);
        assert_eq!(table[2].goal_difference, 0);
        assert_eq!(table[3].goal_difference, -3);
    }

    #[test]
    fn each_match_awards_two_or_three_points() {
        let format = PointsFormat::default();
        for fixture in group_results() {
            let table = compute(&[fixture.home_id, fixture.away_id], &[fixture], &format, &RankCriteria::defaults());
            let total: u16 = table.iter().map(|s| s.points).sum();
            match fixture.home_goals == fixture.away_goals {
                true => assert_eq!(total, 2),
                false => assert_eq!(total, 3),
            }
        }
    }

    #[test]
    fn recomputation_is_idempotent() {
        let format = PointsFormat::default();
        let first = compute(&[A, B, C, D], &group_results(), &format, &RankCriteria::defaults());
        let second = compute(&[A, B, C, D], &group_results(), &format, &RankCriteria::defaults());
        assert_eq!(first, second);
    }

    #[test]
    fn unfinished_matches_are_ignored() {
        let mut results = group_results();
        results.push(FixtureResult { home_id: C, away_id: A, home_goals: 5, away_goals: 0, is_finished: false });

        let table = compute(&[A, B, C, D], &results, &PointsFormat::default(), &RankCriteria::defaults());
        assert_eq!(table[0].team_id, A);
        assert_eq!(table[0].played, 3);
    }

    #[test]
    fn teams_without_matches_still_get_a_row() {
        let table = compute(&[A, B, 9], &[finished(A, B, 1, 0)], &PointsFormat::default(), &RankCriteria::defaults());
        assert_eq!(table.len(), 3);
        assert_eq!(table[1].team_id, 9);
        assert_eq!(table[1].points, 0);
    }
}
