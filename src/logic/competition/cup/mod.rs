// Knockout cups: rounds of ties, each tie played over one or two legs.
pub mod advancement;
pub mod bracket;
pub mod resolver;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::{error::{Error, FieldErrors, Result}, logic::{game::Score, types::{CupGameId, CupId, CupRoundId, GroupedCupId, TeamId}}};

// How a cup is drawn and played.
#[derive(Debug, Serialize, Deserialize)]
#[derive(Clone, Copy, PartialEq)]
#[derive(FromRow)]
pub struct CupRules {
    pub no_of_teams: u8,
    pub random_pairing: bool,
    // Derived from the team count when not given.
    pub rounds: Option<u8>,
    pub legs: u8,
    // Only the winner of a tie matters, so the away goals rule is not used.
    pub win_only: bool,
}

impl Default for CupRules {
    fn default() -> Self {
        Self {
            no_of_teams: 2,
            random_pairing: false,
            rounds: None,
            legs: 1,
            win_only: false,
        }
    }
}

impl CupRules {
    pub fn build(no_of_teams: u8, random_pairing: bool, rounds: Option<u8>, legs: u8, win_only: bool) -> Self {
        Self {
            no_of_teams,
            random_pairing,
            rounds,
            legs,
            win_only,
        }
    }

    // How many rounds a bracket for this many teams needs.
    pub fn required_rounds(no_of_teams: u8) -> u8 {
        (no_of_teams.max(1) as u32).next_power_of_two().trailing_zeros() as u8
    }

    // The number of rounds the cup is played over.
    pub fn round_count(&self) -> u8 {
        self.rounds.unwrap_or(Self::required_rounds(self.no_of_teams))
    }

    // Whether away goals decide a two-legged tie that is level on aggregate.
    pub fn away_goals_rule(&self) -> bool {
        self.legs == 2 && !self.win_only
    }

    // Check that the settings can produce a bracket.
    pub fn validate(&self) -> Result<()> {
        if self.no_of_teams < 2 {
            return Err(Error::invalid_configuration(format!("a cup needs at least 2 teams, got {}", self.no_of_teams)));
        }

        if !(1..=2).contains(&self.legs) {
            return Err(Error::invalid_configuration(format!("ties are played over 1 or 2 legs, got {}", self.legs)));
        }

        let required = Self::required_rounds(self.no_of_teams);
        match self.rounds {
            Some(rounds) if rounds != required => Err(Error::invalid_configuration(format!(
                "{} teams need {required} rounds, but {rounds} were requested", self.no_of_teams
            ))),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Serialize)]
#[derive(Default, Clone)]
#[derive(FromRow)]
pub struct Cup {
    pub id: CupId,
    pub name: String,
    #[sqlx(flatten)]
    pub rules: CupRules,
    // Set when the cup is the knockout phase of a grouped cup.
    pub grouped_cup_id: Option<GroupedCupId>,
    pub winner_id: Option<TeamId>,
    pub is_generated: bool,
}

impl Cup {
    pub fn build(name: &str, rules: CupRules) -> Self {
        Self {
            name: name.to_string(),
            rules,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::new();
        errors.require("name", &self.name);
        errors.into_result()?;
        self.rules.validate()
    }
}

// A round of a cup. Round 1 is played first, the highest number is the final.
#[derive(Debug, Serialize)]
#[derive(Default, Clone, PartialEq)]
#[derive(FromRow)]
pub struct CupRound {
    pub id: CupRoundId,
    pub cup_id: CupId,
    #[sqlx(rename = "round_number")]
    pub number: u8,
    #[sqlx(rename = "round_name")]
    pub name: String,

    #[sqlx(skip)]
    pub games: Vec<CupGame>,
}

impl CupRound {
    pub fn build(number: u8, name: String) -> Self {
        Self {
            number,
            name,
            ..Default::default()
        }
    }

    // Add a tie with the given teams, with a second leg if needed.
    pub fn push_tie(&mut self, position: u8, home_id: Option<TeamId>, away_id: Option<TeamId>, legs: u8) {
        self.games.push(CupGame::build(position, home_id, away_id, true));
        if legs == 2 {
            self.games.push(CupGame::build(position, away_id, home_id, false));
        }
    }

    // Get the positions of the ties in this round, in order.
    pub fn positions(&self) -> Vec<u8> {
        let mut positions: Vec<u8> = self.games.iter().map(|g| g.position).collect();
        positions.sort_unstable();
        positions.dedup();
        return positions;
    }

    // Get the tie at the given position.
    pub fn tie(&self, position: u8) -> Option<Tie<'_>> {
        let first = self.games.iter().find(|g| g.position == position && g.is_first_leg)?;
        let second = self.games.iter().find(|g| g.position == position && !g.is_first_leg);
        Some(Tie { first, second })
    }

    pub fn ties(&self) -> Vec<Tie<'_>> {
        self.positions().into_iter().filter_map(|p| self.tie(p)).collect()
    }

    // Put a team in the home or away slot of a tie. The second leg gets the mirrored slot.
    // Return whether anything changed.
    // An empty team clears the slot.
    pub fn set_slot(&mut self, position: u8, slot: Slot, team_id: Option<TeamId>) -> bool {
        let mut changed = false;
        for game in self.games.iter_mut().filter(|g| g.position == position) {
            let target = match (slot, game.is_first_leg) {
                (Slot::Home, true) | (Slot::Away, false) => &mut game.home_id,
                _ => &mut game.away_id,
            };

            if *target != team_id {
                *target = team_id;
                changed = true;
            }
        }
        return changed;
    }

    // Record the winner on the deciding leg of a tie.
    pub fn set_winner(&mut self, position: u8, winner_id: TeamId) {
        let has_second_leg = self.games.iter().any(|g| g.position == position && !g.is_first_leg);
        for game in self.games.iter_mut().filter(|g| g.position == position) {
            let is_deciding = game.is_first_leg != has_second_leg;
            game.winner_id = match is_deciding {
                true => Some(winner_id),
                false => None,
            };
        }
    }

    // Forget the winner of a tie. Byes keep theirs.
    pub fn clear_winner(&mut self, position: u8) {
        for game in self.games.iter_mut().filter(|g| g.position == position && !g.is_fake) {
            game.winner_id = None;
        }
    }
}

// Which side of the next tie a winner goes to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Slot {
    Home,
    Away,
}

// One leg of a tie.
#[derive(Debug, Serialize, Deserialize)]
#[derive(Default, Clone, PartialEq)]
#[derive(FromRow)]
pub struct CupGame {
    pub id: CupGameId,
    pub round_id: CupRoundId,
    // The tie this leg belongs to, counting from 1 within the round.
    pub position: u8,
    pub home_id: Option<TeamId>,
    pub away_id: Option<TeamId>,
    pub home_goals: u8,
    pub away_goals: u8,
    pub home_penalties: Option<u8>,
    pub away_penalties: Option<u8>,
    pub is_first_leg: bool,
    pub return_game_id: Option<CupGameId>,
    // A placeholder for a bye: no game is played.
    pub is_fake: bool,
    pub is_finished: bool,
    pub winner_id: Option<TeamId>,
}

impl CupGame {
    pub fn build(position: u8, home_id: Option<TeamId>, away_id: Option<TeamId>, is_first_leg: bool) -> Self {
        Self {
            position,
            home_id,
            away_id,
            is_first_leg,
            ..Default::default()
        }
    }

    // A bye: finished from the start, with the team already through.
    pub fn bye(position: u8, team_id: TeamId) -> Self {
        Self {
            position,
            home_id: Some(team_id),
            is_first_leg: true,
            is_fake: true,
            is_finished: true,
            winner_id: Some(team_id),
            ..Default::default()
        }
    }

    // Goals scored by the team in this leg, if it played in it.
    pub fn goals_of(&self, team_id: TeamId) -> Option<u8> {
        if self.home_id == Some(team_id) {
            Some(self.home_goals)
        }
        else if self.away_id == Some(team_id) {
            Some(self.away_goals)
        }
        else {
            None
        }
    }

    // Enter the result of the leg.
    pub fn apply(&mut self, score: &Score) -> Result<()> {
        if self.is_fake {
            return Err(Error::invalid_configuration("a bye has no result"));
        }
        if self.home_id.is_none() || self.away_id.is_none() {
            return Err(Error::incomplete_result("the teams of this tie are not known yet"));
        }
        score.validate()?;

        self.home_goals = score.home_goals;
        self.away_goals = score.away_goals;
        self.home_penalties = score.home_penalties;
        self.away_penalties = score.away_penalties;
        self.is_finished = score.is_finished;
        Ok(())
    }

    // Check if the shootout is recorded for both sides.
    pub fn has_shootout(&self) -> bool {
        self.home_penalties.is_some() && self.away_penalties.is_some()
    }
}

// Where a tie stands.
#[derive(Debug, Serialize)]
#[derive(Clone, Copy, PartialEq)]
pub enum TieStatus {
    Bye,
    // Waiting for the winners of the previous round.
    Pending,
    Scheduled,
    InProgress,
    Finished,
}

// A tie, viewed through its legs.
#[derive(Debug, Clone, Copy)]
pub struct Tie<'a> {
    pub first: &'a CupGame,
    pub second: Option<&'a CupGame>,
}

impl<'a> Tie<'a> {
    pub fn position(&self) -> u8 {
        self.first.position
    }

    // Home team of the first leg.
    pub fn home_id(&self) -> Option<TeamId> {
        self.first.home_id
    }

    pub fn away_id(&self) -> Option<TeamId> {
        self.first.away_id
    }

    // The leg that ends the tie.
    pub fn deciding_leg(&self) -> &'a CupGame {
        self.second.unwrap_or(self.first)
    }

    pub fn legs(&self) -> impl Iterator<Item = &'a CupGame> + 'a {
        std::iter::once(self.first).chain(self.second)
    }

    pub fn is_bye(&self) -> bool {
        self.first.is_fake
    }

    // Total goals of a team over every leg of the tie.
    pub fn aggregate_of(&self, team_id: TeamId) -> u16 {
        self.legs().filter_map(|leg| leg.goals_of(team_id)).map(|g| g as u16).sum()
    }

    // Aggregate score from the point of view of the first leg's home team.
    pub fn aggregate(&self) -> Option<(u16, u16)> {
        let home_id = self.home_id()?;
        let away_id = self.away_id()?;
        Some((self.aggregate_of(home_id), self.aggregate_of(away_id)))
    }

    pub fn status(&self) -> TieStatus {
        if self.is_bye() {
            return TieStatus::Bye;
        }
        if self.home_id().is_none() || self.away_id().is_none() {
            return TieStatus::Pending;
        }

        let finished = self.legs().filter(|leg| leg.is_finished).count();
        let total = self.legs().count();
        match finished {
            0 => TieStatus::Scheduled,
            n if n == total => TieStatus::Finished,
            _ => TieStatus::InProgress,
        }
    }
}

// The rounds of a cup, first round first.
#[derive(Debug, Serialize)]
#[derive(Default, Clone, PartialEq)]
pub struct Bracket {
    pub rounds: Vec<CupRound>,
}

impl Bracket {
    pub fn round_index(&self, number: u8) -> Option<usize> {
        self.rounds.iter().position(|r| r.number == number)
    }

    pub fn final_round_number(&self) -> Option<u8> {
        self.rounds.iter().map(|r| r.number).max()
    }

    // Count the ties over every round.
    pub fn tie_count(&self) -> usize {
        self.rounds.iter().map(|r| r.positions().len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_rounds_round_up_to_a_full_bracket() {
        assert_eq!(CupRules::required_rounds(2), 1);
        assert_eq!(CupRules::required_rounds(8), 3);
        assert_eq!(CupRules::required_rounds(6), 3);
        assert_eq!(CupRules::required_rounds(9), 4);
    }

    #[test]
    fn rules_reject_impossible_settings() {
        assert!(matches!(CupRules::build(1, false, None, 1, false).validate(), Err(Error::InvalidConfiguration(_))));
        assert!(matches!(CupRules::build(8, false, Some(2), 1, false).validate(), Err(Error::InvalidConfiguration(_))));
        assert!(matches!(CupRules::build(8, false, None, 3, false).validate(), Err(Error::InvalidConfiguration(_))));
        assert!(CupRules::build(8, false, Some(3), 2, false).validate().is_ok());
    }

    #[test]
    fn mirrored_slot_on_the_second_leg() {
        let mut round = CupRound::build(2, "Final".to_string());
        round.push_tie(1, None, None, 2);

        assert!(round.set_slot(1, Slot::Home, Some(5)));
        assert!(round.set_slot(1, Slot::Away, Some(6)));
        assert!(!round.set_slot(1, Slot::Away, Some(6)));

        let tie = round.tie(1).unwrap();
        assert_eq!((tie.first.home_id, tie.first.away_id), (Some(5), Some(6)));
        let second = tie.second.unwrap();
        assert_eq!((second.home_id, second.away_id), (Some(6), Some(5)));
    }

    #[test]
    fn results_need_both_teams() {
        let mut pending = CupGame::build(1, Some(5), None, true);
        assert!(matches!(pending.apply(&Score::build(1, 0, true)), Err(Error::IncompleteResult(_))));

        let mut bye = CupGame::bye(1, 5);
        assert!(matches!(bye.apply(&Score::build(1, 0, true)), Err(Error::InvalidConfiguration(_))));

        let mut game = CupGame::build(1, Some(5), Some(6), true);
        game.apply(&Score::build(1, 1, true).with_penalties(5, 4)).unwrap();
        assert!(game.is_finished && game.has_shootout());
    }
}
