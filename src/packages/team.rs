use serde::Serialize;

use crate::{error::Result, logic::{person::player::Player, team::Team, types::{Db, TeamId}}, packages::calendar::GamePackage};

// Everything on a team's page.
#[derive(Serialize)]
pub struct TeamPagePackage {
    pub team: Team,
    pub players: Vec<Player>,
    pub rivals: Vec<Team>,
    pub games: Vec<GamePackage>,
}

pub async fn team_page(db: &Db, id: TeamId) -> Result<TeamPagePackage> {
    let team = Team::fetch_from_db(db, id).await?;
    Ok(TeamPagePackage {
        players: team.players(db).await?,
        rivals: team.rivals(db).await?,
        games: GamePackage::fetch_for_team(db, id).await?,
        team,
    })
}

#[derive(Serialize)]
pub struct CrestPackage {
    pub id: TeamId,
    pub crest: Option<String>,
}

// Crests of many teams at once. Unknown ids are left out.
pub async fn crests(db: &Db, ids: &[TeamId]) -> Result<Vec<CrestPackage>> {
    Ok(Team::fetch_many(db, ids).await?
        .into_iter()
        .map(|team| CrestPackage { id: team.id, crest: team.crest })
        .collect())
}

// Parse "1,2,3" into ids, skipping anything that is not a number.
pub fn parse_ids(list: &str) -> Vec<TeamId> {
    let mut ids: Vec<TeamId> = list.split(',')
        .filter_map(|part| part.trim().parse().ok())
        .collect();
    ids.sort_unstable();
    ids.dedup();
    return ids;
}
