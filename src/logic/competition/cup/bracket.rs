// Functions for generating the rounds of a knockout cup.
use std::collections::HashSet;

use ordinal::ToOrdinal as _;
use rand::{seq::SliceRandom, Rng};

use crate::{error::{Error, Result}, logic::{competition::cup::{Bracket, CupGame, CupRound, CupRules}, types::{convert, TeamId}}};

// Build every round of a cup for the given teams.
// The first round is filled, later rounds wait for the winners.
pub fn build<R: Rng + ?Sized>(teams: &[TeamId], rules: &CupRules, rng: &mut R) -> Result<Bracket> {
    rules.validate()?;
    validate_teams(teams, rules)?;

    let mut entrants = teams.to_vec();
    if rules.random_pairing {
        entrants.shuffle(rng);
    }

    let size = bracket_size(entrants.len());
    let total_rounds = rules.round_count();
    let mut bracket = Bracket::default();

    let mut first_round = CupRound::build(1, round_name(1, total_rounds));
    let seeds = seed_positions(size);
    for (i, pair) in seeds.chunks(2).enumerate() {
        let position: u8 = convert::int(i + 1)?;
        let home_id = entrant_at_seed(&entrants, pair[0]);
        let away_id = entrant_at_seed(&entrants, pair[1]);

        match (home_id, away_id) {
            (Some(home), Some(away)) => first_round.push_tie(position, Some(home), Some(away), rules.legs),
            (Some(team), None) | (None, Some(team)) => first_round.games.push(CupGame::bye(position, team)),
            (None, None) => return Err(Error::invalid_configuration("a tie without any teams")),
        }
    }
    bracket.rounds.push(first_round);

    for number in 2..=total_rounds {
        let mut round = CupRound::build(number, round_name(number, total_rounds));
        let ties = size >> number;
        for i in 0..ties {
            round.push_tie(convert::int(i + 1)?, None, None, rules.legs);
        }
        bracket.rounds.push(round);
    }

    return Ok(bracket);
}

// Make sure the list of teams matches the rules.
fn validate_teams(teams: &[TeamId], rules: &CupRules) -> Result<()> {
    if teams.len() < 2 {
        return Err(Error::invalid_configuration(format!("a cup needs at least 2 teams, got {}", teams.len())));
    }

    if teams.len() != rules.no_of_teams as usize {
        return Err(Error::invalid_configuration(format!(
            "the cup is set up for {} teams, but {} were given", rules.no_of_teams, teams.len()
        )));
    }

    let mut seen = HashSet::new();
    for id in teams.iter() {
        if !seen.insert(id) {
            return Err(Error::invalid_configuration(format!("team {id} is entered twice")));
        }
    }

    return Ok(());
}

// The number of slots in the first round: the next power of two.
pub fn bracket_size(no_of_teams: usize) -> usize {
    no_of_teams.max(1).next_power_of_two()
}

// The order of seeds in the first round, so that top seeds meet as late as possible.
// For 8 slots: 1, 8, 4, 5, 2, 7, 3, 6.
pub fn seed_positions(size: usize) -> Vec<usize> {
    let mut seeds = vec![1];
    while seeds.len() < size {
        let n = seeds.len();
        let mut next = Vec::with_capacity(n * 2);
        for seed in seeds.iter().copied() {
            next.push(seed);
            next.push(n * 2 + 1 - seed);
        }
        seeds = next;
    }
    return seeds;
}

// Seeds past the number of teams are byes.
fn entrant_at_seed(entrants: &[TeamId], seed: usize) -> Option<TeamId> {
    entrants.get(seed - 1).copied()
}

// Get a generic name for a knockout round based on how many rounds are left.
pub fn round_name(number: u8, total_rounds: u8) -> String {
    let rounds_left = total_rounds.saturating_sub(number) + 1;

    match rounds_left {
        1 => "Final".to_string(),
        2 => "Semi Final".to_string(),
        3 => "Quarter Final".to_string(),
        _ => format!("{} Round", (number as usize).to_ordinal_string()),
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::logic::competition::cup::TieStatus;

    fn rules(no_of_teams: u8, legs: u8, random_pairing: bool) -> CupRules {
        CupRules::build(no_of_teams, random_pairing, None, legs, false)
    }

    fn teams(n: u32) -> Vec<TeamId> {
        (1..=n).collect()
    }

    #[test]
    fn seed_positions_pair_top_against_bottom() {
        assert_eq!(seed_positions(2), vec![1, 2]);
        assert_eq!(seed_positions(8), vec![1, 8, 4, 5, 2, 7, 3, 6]);
    }

    #[test]
    fn eight_teams_make_seven_ties_over_three_rounds() {
        let mut rng = StdRng::seed_from_u64(1);
        let bracket = build(&teams(8), &rules(8, 1, false), &mut rng).unwrap();

        assert_eq!(bracket.rounds.len(), 3);
        assert_eq!(bracket.tie_count(), 7);

        let names: Vec<&str> = bracket.rounds.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Quarter Final", "Semi Final", "Final"]);

        let first = &bracket.rounds[0];
        assert_eq!(first.games.len(), 4);
        assert!(first.ties().iter().all(|t| t.status() == TieStatus::Scheduled));
        assert_eq!((first.games[0].home_id, first.games[0].away_id), (Some(1), Some(8)));

        for round in bracket.rounds.iter().skip(1) {
            assert!(round.games.iter().all(|g| g.home_id.is_none() && g.away_id.is_none()));
            assert!(round.ties().iter().all(|t| t.status() == TieStatus::Pending));
        }
    }

    #[test]
    fn two_legs_double_the_games_with_swapped_sides() {
        let mut rng = StdRng::seed_from_u64(1);
        let bracket = build(&teams(4), &rules(4, 2, false), &mut rng).unwrap();

        let first = &bracket.rounds[0];
        assert_eq!(first.games.len(), 4);
        let tie = first.tie(1).unwrap();
        let second = tie.second.unwrap();
        assert_eq!((second.home_id, second.away_id), (tie.first.away_id, tie.first.home_id));
        assert_eq!(bracket.rounds[1].games.len(), 2);
    }

    #[test]
    fn missing_seeds_become_byes_for_the_top_seeds() {
        let mut rng = StdRng::seed_from_u64(1);
        let bracket = build(&teams(6), &rules(6, 2, false), &mut rng).unwrap();

        let first = &bracket.rounds[0];
        let byes: Vec<&CupGame> = first.games.iter().filter(|g| g.is_fake).collect();
        assert_eq!(byes.len(), 2);
        assert!(byes.iter().all(|g| g.is_finished && g.winner_id == g.home_id));

        let bye_teams: Vec<Option<TeamId>> = byes.iter().map(|g| g.winner_id).collect();
        assert_eq!(bye_teams, vec![Some(1), Some(2)]);

        // Byes are never played twice.
        assert_eq!(first.games.len(), 2 + 2 * 2);
        assert_eq!(bracket.rounds[0].name, "Quarter Final");
    }

    #[test]
    fn random_pairing_is_reproducible_with_a_seed() {
        let first = build(&teams(16), &rules(16, 1, true), &mut StdRng::seed_from_u64(42)).unwrap();
        let second = build(&teams(16), &rules(16, 1, true), &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(first, second);

        let mut drawn: Vec<TeamId> = first.rounds[0].games.iter()
            .flat_map(|g| [g.home_id, g.away_id])
            .flatten()
            .collect();
        drawn.sort_unstable();
        assert_eq!(drawn, teams(16));
    }

    #[test]
    fn invalid_team_lists_are_rejected() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(build(&[1], &rules(1, 1, false), &mut rng), Err(Error::InvalidConfiguration(_))));
        assert!(matches!(build(&[1, 2, 2, 3], &rules(4, 1, false), &mut rng), Err(Error::InvalidConfiguration(_))));
        assert!(matches!(build(&teams(5), &rules(4, 1, false), &mut rng), Err(Error::InvalidConfiguration(_))));

        let wrong_rounds = CupRules::build(8, false, Some(4), 1, false);
        assert!(matches!(build(&teams(8), &wrong_rounds, &mut rng), Err(Error::InvalidConfiguration(_))));
    }

    #[test]
    fn early_rounds_get_ordinal_names() {
        assert_eq!(round_name(1, 5), "1st Round");
        assert_eq!(round_name(2, 5), "2nd Round");
        assert_eq!(round_name(3, 5), "Quarter Final");
        assert_eq!(round_name(1, 1), "Final");
    }
}
