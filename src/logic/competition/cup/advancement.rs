// Moving tie winners on to the next round.
use serde::Serialize;
use tracing::debug;

use crate::{error::{Error, Result}, logic::{competition::cup::{resolver::{self, Resolution}, Bracket, CupRules, Slot}, types::TeamId}};

// What advancing a round did.
#[derive(Debug, Serialize)]
#[derive(Default, Clone, PartialEq)]
pub struct Advancement {
    // Position of the tie and its winner.
    pub winners: Vec<(u8, TeamId)>,
    pub undecided: usize,
    // Finished ties that cannot be decided, with the reason.
    pub incomplete: Vec<(u8, String)>,
    // The winner of the cup, once the final is decided.
    pub champion: Option<TeamId>,
}

// The tie of the next round a winner goes to, and on which side.
pub fn next_slot(position: u8) -> (u8, Slot) {
    let next_position = position.div_ceil(2);
    match position % 2 {
        1 => (next_position, Slot::Home),
        _ => (next_position, Slot::Away),
    }
}

// Resolve every tie of a round and place the winners in the next round.
// A tie that is not decided loses any winner it had, and its slot in the next round is emptied,
// so this can be run again whenever results come in or change.
pub fn advance(bracket: &mut Bracket, round_number: u8, rules: &CupRules) -> Result<Advancement> {
    let index = bracket.round_index(round_number).ok_or(Error::NotFound("cup round"))?;
    let is_final = Some(round_number) == bracket.final_round_number();

    let mut advancement = Advancement::default();
    let mut open = Vec::new();
    for tie in bracket.rounds[index].ties() {
        match resolver::resolve(&tie, rules) {
            Ok(Resolution::Winner(id)) => advancement.winners.push((tie.position(), id)),
            Ok(Resolution::Undecided) => {
                advancement.undecided += 1;
                open.push(tie.position());
            }
            Err(Error::IncompleteResult(reason)) => {
                advancement.incomplete.push((tie.position(), reason));
                open.push(tie.position());
            }
            Err(e) => return Err(e),
        }
    }

    for (position, winner_id) in advancement.winners.iter().copied() {
        bracket.rounds[index].set_winner(position, winner_id);

        if is_final {
            advancement.champion = Some(winner_id);
            continue;
        }

        let (next_position, slot) = next_slot(position);
        if let Some(next_round) = bracket.rounds.get_mut(index + 1) {
            if next_round.set_slot(next_position, slot, Some(winner_id)) {
                debug!("team {winner_id} advances to tie {next_position} of round {}", next_round.number);
            }
        }
    }

    for position in open {
        bracket.rounds[index].clear_winner(position);

        let (next_position, slot) = next_slot(position);
        if let Some(next_round) = bracket.rounds.get_mut(index + 1) {
            if next_round.set_slot(next_position, slot, None) {
                debug!("tie {next_position} of round {} waits for a winner again", next_round.number);
            }
        }
    }

    return Ok(advancement);
}

// Advance a round and every round after it, so later rounds follow a changed result.
// Returns what happened in the given round, with the champion as it stands after the final.
pub fn advance_from(bracket: &mut Bracket, round_number: u8, rules: &CupRules) -> Result<Advancement> {
    let mut advancement = advance(bracket, round_number, rules)?;

    let mut later: Vec<u8> = bracket.rounds.iter().map(|r| r.number).filter(|n| *n > round_number).collect();
    later.sort_unstable();
    for number in later {
        advancement.champion = advance(bracket, number, rules)?.champion;
    }

    return Ok(advancement);
}

// Advance every round in order, first round first. Returns the champion if the final is decided.
pub fn recompute(bracket: &mut Bracket, rules: &CupRules) -> Result<Option<TeamId>> {
    let first = match bracket.rounds.iter().map(|r| r.number).min() {
        Some(number) => number,
        None => return Ok(None),
    };

    Ok(advance_from(bracket, first, rules)?.champion)
}
