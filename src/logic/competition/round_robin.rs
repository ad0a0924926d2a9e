// Generating the fixtures of round robin stages: groups and league seasons.
use serde::Serialize;

use crate::{error::{Error, Result}, logic::types::{convert, TeamId}};

// A single generated match, not yet saved.
#[derive(Debug, Serialize)]
#[derive(Clone, Copy, PartialEq)]
pub struct Fixture {
    // Counting from 1.
    pub matchday: u8,
    pub home_id: TeamId,
    pub away_id: TeamId,
}

// Get the number of match days a full round robin needs.
pub fn matchday_count(no_of_teams: usize, legs: u8) -> usize {
    let per_leg = match no_of_teams % 2 {
        0 => no_of_teams.saturating_sub(1),
        _ => no_of_teams,
    };
    per_leg * legs as usize
}

// Every team meets every other team once per leg.
// Uses the circle method: the first team stays put while the others rotate around it.
// With two legs the second half repeats the first with home and away swapped.
pub fn generate(teams: &[TeamId], legs: u8) -> Result<Vec<Fixture>> {
    if teams.len() < 2 {
        return Err(Error::invalid_configuration(format!("a round robin needs at least 2 teams, got {}", teams.len())));
    }
    if !(1..=2).contains(&legs) {
        return Err(Error::invalid_configuration(format!("a round robin is played over 1 or 2 legs, got {legs}")));
    }

    // An odd number of teams gets a resting slot.
    let mut slots: Vec<Option<TeamId>> = teams.iter().copied().map(Some).collect();
    if slots.len() % 2 == 1 {
        slots.push(None);
    }

    let n = slots.len();
    let rounds = n - 1;
    let mut fixtures = Vec::new();

    for round in 0..rounds {
        let matchday: u8 = convert::int(round + 1)?;
        for i in 0..n / 2 {
            let (a, b) = (slots[i], slots[n - 1 - i]);
            let (Some(a), Some(b)) = (a, b) else { continue };

            // Alternate sides so that nobody plays too many home games in a row.
            let (home_id, away_id) = match (i == 0 && round % 2 == 1) || (i != 0 && i % 2 == 1) {
                true => (b, a),
                false => (a, b),
            };
            fixtures.push(Fixture { matchday, home_id, away_id });
        }

        // Keep the first slot, rotate the rest clockwise.
        let last = slots.remove(n - 1);
        slots.insert(1, last);
    }

    if legs == 2 {
        let offset: u8 = convert::int(rounds)?;
        let return_legs: Vec<Fixture> = fixtures.iter()
            .map(|f| Fixture { matchday: f.matchday + offset, home_id: f.away_id, away_id: f.home_id })
            .collect();
        fixtures.extend(return_legs);
    }

    return Ok(fixtures);
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn pairs(fixtures: &[Fixture]) -> HashSet<(TeamId, TeamId)> {
        fixtures.iter().map(|f| (f.home_id.min(f.away_id), f.home_id.max(f.away_id))).collect()
    }

    #[test]
    fn everyone_meets_everyone_once() {
        let fixtures = generate(&[1, 2, 3, 4], 1).unwrap();
        assert_eq!(fixtures.len(), 6);
        assert_eq!(pairs(&fixtures).len(), 6);
        assert_eq!(fixtures.iter().map(|f| f.matchday).max(), Some(3));

        // Nobody plays twice on the same day.
        for day in 1..=3 {
            let playing: Vec<TeamId> = fixtures.iter()
                .filter(|f| f.matchday == day)
                .flat_map(|f| [f.home_id, f.away_id])
                .collect();
            assert_eq!(playing.len(), playing.iter().collect::<HashSet<_>>().len());
        }
    }

    #[test]
    fn odd_team_counts_rest_one_team_per_day() {
        let fixtures = generate(&[1, 2, 3, 4, 5], 1).unwrap();
        assert_eq!(fixtures.len(), 10);
        assert_eq!(matchday_count(5, 1), 5);
        assert!(fixtures.iter().all(|f| f.matchday <= 5));
    }

    #[test]
    fn second_leg_swaps_sides() {
        let fixtures = generate(&[1, 2, 3, 4], 2).unwrap();
        assert_eq!(fixtures.len(), 12);

        let first = fixtures[0];
        let mirrored = fixtures.iter()
            .find(|f| f.matchday == first.matchday + 3 && f.home_id == first.away_id)
            .unwrap();
        assert_eq!(mirrored.away_id, first.home_id);
    }

    #[test]
    fn single_team_is_rejected() {
        assert!(matches!(generate(&[1], 1), Err(Error::InvalidConfiguration(_))));
    }
}
