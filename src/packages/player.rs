use serde::Serialize;
use time::OffsetDateTime;

use crate::{error::Result, logic::{person::{player::Player, transfer::Transfer, Position}, stats::CompetitionStats, team::Team, types::{Db, PlayerId}}};

// A player's profile.
#[derive(Serialize)]
pub struct PlayerPackage {
    pub player: Player,
    pub age: Option<i32>,
    pub team: Option<Team>,
    pub positions: Vec<Position>,
    pub transfers: Vec<Transfer>,
    pub stats: Vec<CompetitionStats>,
}

pub async fn profile(db: &Db, id: PlayerId) -> Result<PlayerPackage> {
    let player = Player::fetch_from_db(db, id).await?;
    let team = match player.team_id {
        Some(team_id) => Some(Team::fetch_from_db(db, team_id).await?),
        None => None,
    };

    Ok(PlayerPackage {
        age: player.age(OffsetDateTime::now_utc().date()),
        team,
        positions: player.positions(db).await?,
        transfers: Transfer::fetch_for_player(db, id).await?,
        stats: player.stats(db).await?,
        player,
    })
}
