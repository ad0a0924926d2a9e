// Custom types that are widely used are defined here.
use sqlx::SqlitePool;

use crate::error::{Error, Result};

pub type Db = SqlitePool;

// Database ID types.
pub type TeamId = u32;
pub type PositionId = u32;
pub type PlayerId = u32;
pub type TransferId = u32;
pub type LeagueId = u32;
pub type SeasonId = u32;
pub type MatchdayId = u32;
pub type GameId = u32;
pub type CupId = u32;
pub type CupRoundId = u32;
pub type CupGameId = u32;
pub type GroupedCupId = u32;
pub type PouleId = u32;
pub type PouleGameId = u32;
pub type GoalId = u32;
pub type CardId = u32;
pub type TemplateId = u32;
pub type HistoryEntryId = u32;
pub type UserId = u32;

// Type conversions.
pub mod convert {
    use std::fmt::Display;

    use super::{Error, Result};

    // Convert between integers.
    pub fn int<N1: Display + Copy, N2: TryFrom<N1>>(num: N1) -> Result<N2> {
        num.try_into().map_err(|_| Error::invalid_configuration(format!("{num} is out of range")))
    }
}
