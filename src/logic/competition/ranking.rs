// Functions for ranking teams within a group or a league table.
use std::{cmp::Ordering, collections::HashMap};

use serde::{Deserialize, Serialize};

use crate::logic::competition::standings::Standing;

// What ranking criteria a table has, in order of priority.
#[derive(Debug, Serialize, Deserialize)]
#[derive(Eq, Hash, PartialEq)]
#[derive(Clone, Copy)]
pub enum RankCriteria {
    Points,
    GoalDifference,
    GoalsFor,
    GoalsAgainst,   // Lower is better.
    Wins,
    Draws,
    Losses, // Lower is better.
}

impl RankCriteria {
    // Points, then goal difference, then goals scored.
    pub fn defaults() -> Vec<Self> {
        vec![Self::Points, Self::GoalDifference, Self::GoalsFor]
    }
}

type CmpFunc = fn (&Standing, &Standing) -> Ordering;

// Compare functions here.

fn compare_points(a: &Standing, b: &Standing) -> Ordering {
    b.points.cmp(&a.points)
}

fn compare_goal_difference(a: &Standing, b: &Standing) -> Ordering {
    b.goal_difference.cmp(&a.goal_difference)
}

fn compare_goals_for(a: &Standing, b: &Standing) -> Ordering {
    b.goals_for.cmp(&a.goals_for)
}

fn compare_goals_against(a: &Standing, b: &Standing) -> Ordering {
    a.goals_against.cmp(&b.goals_against)
}

fn compare_wins(a: &Standing, b: &Standing) -> Ordering {
    b.won.cmp(&a.won)
}

fn compare_draws(a: &Standing, b: &Standing) -> Ordering {
    b.drawn.cmp(&a.drawn)
}

fn compare_losses(a: &Standing, b: &Standing) -> Ordering {
    a.lost.cmp(&b.lost)
}

// Get the available sort functions.
pub fn get_sort_functions() -> HashMap<RankCriteria, CmpFunc> {
    let mut functions: HashMap<RankCriteria, CmpFunc> = HashMap::new();
    functions.insert(RankCriteria::Points, compare_points);
    functions.insert(RankCriteria::GoalDifference, compare_goal_difference);
    functions.insert(RankCriteria::GoalsFor, compare_goals_for);
    functions.insert(RankCriteria::GoalsAgainst, compare_goals_against);
    functions.insert(RankCriteria::Wins, compare_wins);
    functions.insert(RankCriteria::Draws, compare_draws);
    functions.insert(RankCriteria::Losses, compare_losses);
    return functions;
}

// Sort the rows with the given criteria and write the resulting ranks.
// The sort is stable: rows equal on every criterium keep their given order.
pub fn rank(standings: &mut [Standing], criteria: &[RankCriteria]) {
    let sort_functions = get_sort_functions();

    standings.sort_by(|a, b| {
        let mut order = Ordering::Equal;
        for criterium in criteria.iter() {
            order = sort_functions[criterium](a, b);

            if order.is_ne() { break; }
        }
        order
    });

    for (i, standing) in standings.iter_mut().enumerate() {
        standing.rank = i as u8 + 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(team_id: u32, points: u16, goals_for: u16, goals_against: u16) -> Standing {
        Standing {
            team_id,
            points,
            goals_for,
            goals_against,
            goal_difference: goals_for as i16 - goals_against as i16,
            ..Default::default()
        }
    }

    #[test]
    fn goal_difference_breaks_level_points() {
        let mut rows = vec![row(1, 4, 3, 3), row(2, 4, 5, 1), row(3, 6, 0, 0)];
        rank(&mut rows, &RankCriteria::defaults());

        let order: Vec<u32> = rows.iter().map(|r| r.team_id).collect();
        assert_eq!(order, vec![3, 2, 1]);
        assert_eq!(rows[0].rank, 1);
        assert_eq!(rows[2].rank, 3);
    }

    #[test]
    fn rows_equal_on_every_criterium_keep_their_order() {
        let mut rows = vec![row(7, 3, 2, 1), row(4, 3, 2, 1)];
        rank(&mut rows, &RankCriteria::defaults());
        assert_eq!(rows[0].team_id, 7);
        assert_eq!(rows[1].team_id, 4);
    }

    #[test]
    fn extra_criteria_are_applied_in_order() {
        let mut a = row(1, 3, 2, 2);
        a.lost = 1;
        let b = row(2, 3, 2, 2);
        let mut rows = vec![a, b];
        rank(&mut rows, &[RankCriteria::Points, RankCriteria::Losses]);
        assert_eq!(rows[0].team_id, 2);
    }
}
