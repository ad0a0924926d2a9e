// Goals and cards recorded against a match.
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::{error::{Error, FieldErrors, Result}, logic::types::{CardId, CupGameId, GameId, GoalId, PlayerId, PouleGameId, TeamId}};

#[derive(Debug, Serialize, Deserialize)]
#[derive(Default, Clone, Copy, PartialEq)]
#[derive(sqlx::Type)]
pub enum GoalType {
    #[default]
    Normal,
    FreeKick,
    Penalty,
    OwnGoal,
}

#[derive(Debug, Serialize, Deserialize)]
#[derive(Default, Clone, Copy, PartialEq)]
#[derive(sqlx::Type)]
pub enum CardType {
    #[default]
    Yellow,
    SecondYellow,
    Red,
}

impl CardType {
    pub fn is_yellow(&self) -> bool {
        matches!(self, Self::Yellow | Self::SecondYellow)
    }

    // A second yellow also sends the player off.
    pub fn is_red(&self) -> bool {
        matches!(self, Self::Red | Self::SecondYellow)
    }
}

// The match an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameRef {
    Regular(GameId),
    Cup(CupGameId),
    Poule(PouleGameId),
}

impl GameRef {
    // Exactly one of the references has to be set.
    pub fn from_columns(game_id: Option<GameId>, cup_game_id: Option<CupGameId>, poule_game_id: Option<PouleGameId>) -> Result<Self> {
        match (game_id, cup_game_id, poule_game_id) {
            (Some(id), None, None) => Ok(Self::Regular(id)),
            (None, Some(id), None) => Ok(Self::Cup(id)),
            (None, None, Some(id)) => Ok(Self::Poule(id)),
            _ => {
                let mut errors = FieldErrors::new();
                errors.add("game_id", "exactly one match has to be given");
                Err(Error::Validation(errors))
            }
        }
    }

    pub fn table(&self) -> &'static str {
        match self {
            Self::Regular(_) => "Game",
            Self::Cup(_) => "CupGame",
            Self::Poule(_) => "PouleGame",
        }
    }

    pub fn id(&self) -> u32 {
        match self {
            Self::Regular(id) | Self::Cup(id) | Self::Poule(id) => *id,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[derive(Default, Clone, PartialEq)]
#[derive(FromRow)]
pub struct Goal {
    #[serde(default)]
    pub id: GoalId,
    #[serde(default)]
    pub game_id: Option<GameId>,
    #[serde(default)]
    pub cup_game_id: Option<CupGameId>,
    #[serde(default)]
    pub poule_game_id: Option<PouleGameId>,
    // The team the goal counts for. For own goals this is the opponent of the scorer.
    pub team_id: TeamId,
    #[serde(default)]
    pub scorer_id: Option<PlayerId>,
    #[serde(default)]
    pub assist_id: Option<PlayerId>,
    // Free-form, such as "45+2".
    #[serde(default)]
    pub minute: Option<String>,
    #[serde(default)]
    pub goal_type: GoalType,
}

impl Goal {
    pub fn game_ref(&self) -> Result<GameRef> {
        GameRef::from_columns(self.game_id, self.cup_game_id, self.poule_game_id)
    }

    pub fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::new();
        if self.game_ref().is_err() {
            errors.add("game_id", "exactly one match has to be given");
        }
        if self.assist_id.is_some() && self.assist_id == self.scorer_id {
            errors.add("assist_id", "a player cannot assist their own goal");
        }
        if self.goal_type == GoalType::OwnGoal && self.assist_id.is_some() {
            errors.add("assist_id", "own goals have no assist");
        }
        validate_minute(&mut errors, self.minute.as_deref());
        errors.into_result()
    }

    // Counts towards the scorer's tally.
    pub fn counts_for_scorer(&self) -> bool {
        self.goal_type != GoalType::OwnGoal
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[derive(Default, Clone, PartialEq)]
#[derive(FromRow)]
pub struct Card {
    #[serde(default)]
    pub id: CardId,
    #[serde(default)]
    pub game_id: Option<GameId>,
    #[serde(default)]
    pub cup_game_id: Option<CupGameId>,
    #[serde(default)]
    pub poule_game_id: Option<PouleGameId>,
    pub team_id: TeamId,
    pub player_id: PlayerId,
    #[serde(default)]
    pub minute: Option<String>,
    #[serde(default)]
    pub card_type: CardType,
}

impl Card {
    pub fn game_ref(&self) -> Result<GameRef> {
        GameRef::from_columns(self.game_id, self.cup_game_id, self.poule_game_id)
    }

    pub fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::new();
        if self.game_ref().is_err() {
            errors.add("game_id", "exactly one match has to be given");
        }
        validate_minute(&mut errors, self.minute.as_deref());
        errors.into_result()
    }
}

// Minutes are labels, but they should still look like one.
fn validate_minute(errors: &mut FieldErrors, minute: Option<&str>) {
    let Some(minute) = minute else { return };
    if minute.len() > 8 || !minute.chars().all(|c| c.is_ascii_digit() || c == '+' || c == '\'') {
        errors.add("minute", "must look like 45 or 45+2");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_belong_to_exactly_one_match() {
        assert_eq!(GameRef::from_columns(None, Some(4), None).unwrap(), GameRef::Cup(4));
        assert!(GameRef::from_columns(Some(1), Some(4), None).is_err());
        assert!(GameRef::from_columns(None, None, None).is_err());
    }

    #[test]
    fn goal_rules() {
        let goal = Goal {
            game_id: Some(1),
            team_id: 2,
            scorer_id: Some(9),
            assist_id: Some(9),
            minute: Some("90+3".to_string()),
            ..Default::default()
        };
        let Err(Error::Validation(errors)) = goal.validate() else { panic!("expected validation errors") };
        assert!(errors.get("assist_id").is_some());
        assert!(errors.get("minute").is_none());

        let own_goal = Goal { goal_type: GoalType::OwnGoal, assist_id: None, ..goal };
        assert!(own_goal.validate().is_ok());
        assert!(!own_goal.counts_for_scorer());
    }

    #[test]
    fn second_yellow_is_both_colours() {
        assert!(CardType::SecondYellow.is_yellow());
        assert!(CardType::SecondYellow.is_red());
        assert!(!CardType::Red.is_yellow());
    }
}
