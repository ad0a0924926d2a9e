// Deciding who goes through from a tie.
use std::cmp::Ordering;

use crate::{error::{Error, Result}, logic::{competition::cup::{CupRules, Tie}, types::TeamId}};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution {
    Winner(TeamId),
    // Teams or results are still missing.
    Undecided,
}

// Get the winner of a tie once every leg is finished.
// A tie that is level after every tiebreak is an error: someone has to go through.
pub fn resolve(tie: &Tie, rules: &CupRules) -> Result<Resolution> {
    if tie.is_bye() {
        return Ok(match tie.first.winner_id.or(tie.home_id()) {
            Some(id) => Resolution::Winner(id),
            None => Resolution::Undecided,
        });
    }

    let (home_id, away_id) = match (tie.home_id(), tie.away_id()) {
        (Some(home), Some(away)) => (home, away),
        _ => return Ok(Resolution::Undecided),
    };

    if tie.legs().any(|leg| !leg.is_finished) {
        return Ok(Resolution::Undecided);
    }

    let by_aggregate = tie.aggregate_of(home_id).cmp(&tie.aggregate_of(away_id));
    if let Some(winner) = pick(by_aggregate, home_id, away_id) {
        return Ok(Resolution::Winner(winner));
    }

    if rules.away_goals_rule() && tie.second.is_some() {
        let by_away_goals = away_goals_of(tie, home_id).cmp(&away_goals_of(tie, away_id));
        if let Some(winner) = pick(by_away_goals, home_id, away_id) {
            return Ok(Resolution::Winner(winner));
        }
    }

    let deciding = tie.deciding_leg();
    let (home_penalties, away_penalties) = match (deciding.home_penalties, deciding.away_penalties) {
        (Some(home), Some(away)) => (home, away),
        _ => return Err(Error::incomplete_result(format!(
            "tie {} is level and has no penalty shootout", tie.position()
        ))),
    };

    let shootout_winner = match deciding.home_id {
        Some(id) if id == home_id => pick(home_penalties.cmp(&away_penalties), home_id, away_id),
        _ => pick(home_penalties.cmp(&away_penalties), away_id, home_id),
    };

    match shootout_winner {
        Some(winner) => Ok(Resolution::Winner(winner)),
        None => Err(Error::incomplete_result(format!("the penalty shootout of tie {} is level", tie.position()))),
    }
}

// Goals a team scored in the legs it played away.
fn away_goals_of(tie: &Tie, team_id: TeamId) -> u16 {
    tie.legs()
        .filter(|leg| leg.away_id == Some(team_id))
        .map(|leg| leg.away_goals as u16)
        .sum()
}

fn pick(order: Ordering, first: TeamId, second: TeamId) -> Option<TeamId> {
    match order {
        Ordering::Greater => Some(first),
        Ordering::Less => Some(second),
        Ordering::Equal => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::competition::cup::{CupGame, CupRound};

    const HOME: TeamId = 1;
    const AWAY: TeamId = 2;

    fn two_legs(first: (u8, u8), second: (u8, u8)) -> CupRound {
        let mut round = CupRound::build(1, "Final".to_string());
        round.push_tie(1, Some(HOME), Some(AWAY), 2);
        round.games[0].home_goals = first.0;
        round.games[0].away_goals = first.1;
        round.games[1].home_goals = second.0;
        round.games[1].away_goals = second.1;
        for game in round.games.iter_mut() {
            game.is_finished = true;
        }
        return round;
    }

    fn one_leg(home_goals: u8, away_goals: u8) -> CupRound {
        let mut round = CupRound::build(1, "Final".to_string());
        round.push_tie(1, Some(HOME), Some(AWAY), 1);
        round.games[0].home_goals = home_goals;
        round.games[0].away_goals = away_goals;
        round.games[0].is_finished = true;
        return round;
    }

    fn rules(legs: u8, win_only: bool) -> CupRules {
        CupRules::build(2, false, None, legs, win_only)
    }

    #[test]
    fn aggregate_counts_goals_per_team_across_legs() {
        // 2-1 at home, then 1-1 away: 3-2 on aggregate.
        let round = two_legs((2, 1), (1, 1));
        let tie = round.tie(1).unwrap();

        assert_eq!(tie.aggregate(), Some((3, 2)));
        assert_eq!(resolve(&tie, &rules(2, false)).unwrap(), Resolution::Winner(HOME));
    }

    #[test]
    fn away_goals_decide_a_level_aggregate() {
        // 1-2 at home, 1-0 away: 2-2, but the visitors scored twice away.
        let round = two_legs((1, 2), (0, 1));
        let tie = round.tie(1).unwrap();

        assert_eq!(tie.aggregate(), Some((2, 2)));
        assert_eq!(resolve(&tie, &rules(2, false)).unwrap(), Resolution::Winner(AWAY));
    }

    #[test]
    fn win_only_ties_go_straight_to_penalties() {
        let mut round = two_legs((1, 2), (0, 1));
        round.games[1].home_penalties = Some(4);
        round.games[1].away_penalties = Some(5);
        let tie = round.tie(1).unwrap();

        // The second leg is hosted by the away team, so the shootout is won by the first leg's hosts.
        assert_eq!(resolve(&tie, &rules(2, true)).unwrap(), Resolution::Winner(HOME));
    }

    #[test]
    fn level_single_leg_needs_a_shootout() {
        let round = one_leg(1, 1);
        let tie = round.tie(1).unwrap();
        assert!(matches!(resolve(&tie, &rules(1, false)), Err(Error::IncompleteResult(_))));
        assert!(matches!(resolve(&tie, &rules(1, true)), Err(Error::IncompleteResult(_))));

        let mut round = one_leg(1, 1);
        round.games[0].home_penalties = Some(3);
        round.games[0].away_penalties = Some(3);
        assert!(matches!(resolve(&round.tie(1).unwrap(), &rules(1, false)), Err(Error::IncompleteResult(_))));

        round.games[0].away_penalties = Some(2);
        assert_eq!(resolve(&round.tie(1).unwrap(), &rules(1, false)).unwrap(), Resolution::Winner(HOME));
    }

    #[test]
    fn unfinished_or_unfilled_ties_are_undecided() {
        let mut round = two_legs((3, 0), (0, 0));
        round.games[1].is_finished = false;
        assert_eq!(resolve(&round.tie(1).unwrap(), &rules(2, false)).unwrap(), Resolution::Undecided);

        let mut waiting = CupRound::build(2, "Final".to_string());
        waiting.push_tie(1, Some(HOME), None, 1);
        assert_eq!(resolve(&waiting.tie(1).unwrap(), &rules(1, false)).unwrap(), Resolution::Undecided);
    }

    #[test]
    fn byes_are_won_straight_away() {
        let mut round = CupRound::build(1, "Semi Final".to_string());
        round.games.push(CupGame::bye(1, 7));
        assert_eq!(resolve(&round.tie(1).unwrap(), &rules(1, false)).unwrap(), Resolution::Winner(7));
    }
}
