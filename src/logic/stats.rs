// Player statistics counted from recorded goals and cards.
use serde::Serialize;
use sqlx::FromRow;

use crate::logic::{game::event::{Card, Goal}, types::{PlayerId, TeamId}};

#[derive(Debug, Serialize)]
#[derive(Default, Clone, PartialEq)]
pub struct PlayerStats {
    pub goals: u16,
    pub assists: u16,
    pub yellow_cards: u16,
    pub red_cards: u16,
    pub man_of_the_match: u16,
}

impl PlayerStats {
    // Count the events of a single player.
    pub fn tally(player_id: PlayerId, goals: &[Goal], cards: &[Card], man_of_the_match: u16) -> Self {
        let mut stats = Self {
            man_of_the_match,
            ..Default::default()
        };

        for goal in goals.iter() {
            if goal.scorer_id == Some(player_id) && goal.counts_for_scorer() {
                stats.goals += 1;
            }
            if goal.assist_id == Some(player_id) {
                stats.assists += 1;
            }
        }

        for card in cards.iter().filter(|c| c.player_id == player_id) {
            if card.card_type.is_yellow() { stats.yellow_cards += 1; }
            if card.card_type.is_red() { stats.red_cards += 1; }
        }

        return stats;
    }
}

// What kind of competition an event was recorded in.
#[derive(Debug, Serialize)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[derive(sqlx::Type)]
pub enum CompetitionKind {
    Season,
    Cup,
    GroupedCup,
}

// Statistics of one competition in a player's profile.
// Competitions are told apart by kind and id, names may repeat.
#[derive(Debug, Serialize)]
#[derive(Clone, PartialEq)]
pub struct CompetitionStats {
    pub kind: CompetitionKind,
    pub competition_id: u32,
    pub competition: String,
    #[serde(flatten)]
    pub stats: PlayerStats,
}

// A row of a top scorer or top assist list.
#[derive(Debug, Serialize)]
#[derive(Clone, PartialEq)]
#[derive(FromRow)]
pub struct LeaderRow {
    pub player_id: PlayerId,
    pub first_name: String,
    pub last_name: String,
    pub team_id: Option<TeamId>,
    pub total: u32,
}

// Leader boards of a season.
#[derive(Debug, Serialize)]
#[derive(Default, Clone, PartialEq)]
pub struct SeasonStats {
    pub top_scorers: Vec<LeaderRow>,
    pub top_assists: Vec<LeaderRow>,
}
