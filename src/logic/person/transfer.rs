// Transfers of players between teams. The log is append-only.
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::Date;

use crate::{error::{FieldErrors, Result}, logic::{time::iso_date_format, types::{PlayerId, TeamId, TransferId}}};

#[derive(Debug, Serialize, Deserialize)]
#[derive(Clone, PartialEq)]
#[derive(FromRow)]
pub struct Transfer {
    #[serde(default)]
    pub id: TransferId,
    pub player_id: PlayerId,
    // Filled in from the player's current team when saved.
    #[serde(default)]
    pub old_team_id: Option<TeamId>,
    pub new_team_id: TeamId,
    #[serde(with = "iso_date_format")]
    pub date: Date,
}

impl Transfer {
    pub fn build(player_id: PlayerId, new_team_id: TeamId, date: Date) -> Self {
        Self {
            id: TransferId::default(),
            player_id,
            old_team_id: None,
            new_team_id,
            date,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::new();
        if self.old_team_id == Some(self.new_team_id) {
            errors.add("new_team_id", "the player already plays for this team");
        }
        errors.into_result()
    }
}

// The team a player played for on the given day, if any transfer covers it.
// The latest transfer on or before the day wins; transfers on the same day are ordered by id.
pub fn team_at_date(transfers: &[Transfer], date: Date) -> Option<TeamId> {
    transfers.iter()
        .filter(|t| t.date <= date)
        .max_by_key(|t| (t.date, t.id))
        .map(|t| t.new_team_id)
}
