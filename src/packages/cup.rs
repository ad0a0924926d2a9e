use std::collections::HashMap;

use serde::Serialize;

use crate::{error::Result, logic::{competition::{cup::{Bracket, Cup, CupGame, CupRound, Tie, TieStatus}, grouped_cup::{GroupedCup, PouleGame}}, team::Team, types::{CupRoundId, Db, PouleId, TeamId}}, packages::standings::{self, StandingPackage}};

type Names = HashMap<TeamId, String>;

#[derive(Serialize)]
pub struct CupPackage {
    pub cup: Cup,
    pub rounds: Vec<RoundPackage>,
}

#[derive(Serialize)]
pub struct RoundPackage {
    pub id: CupRoundId,
    pub number: u8,
    pub name: String,
    pub ties: Vec<TiePackage>,
}

#[derive(Serialize)]
pub struct TiePackage {
    pub position: u8,
    pub home: Option<TieTeamPackage>,
    pub away: Option<TieTeamPackage>,
    // From the first leg's home team's point of view.
    pub aggregate: Option<(u16, u16)>,
    pub status: TieStatus,
    pub winner_id: Option<TeamId>,
    pub legs: Vec<CupGame>,
}

#[derive(Serialize)]
pub struct TieTeamPackage {
    pub id: TeamId,
    pub name: String,
}

impl TieTeamPackage {
    fn build(id: Option<TeamId>, names: &Names) -> Option<Self> {
        let id = id?;
        Some(Self {
            id,
            name: names.get(&id).cloned().unwrap_or_default(),
        })
    }
}

impl TiePackage {
    fn build(tie: &Tie, names: &Names) -> Self {
        Self {
            position: tie.position(),
            home: TieTeamPackage::build(tie.home_id(), names),
            away: TieTeamPackage::build(tie.away_id(), names),
            aggregate: match tie.is_bye() {
                true => None,
                false => tie.aggregate(),
            },
            status: tie.status(),
            winner_id: tie.deciding_leg().winner_id,
            legs: tie.legs().cloned().collect(),
        }
    }
}

impl RoundPackage {
    fn build(round: &CupRound, names: &Names) -> Self {
        Self {
            id: round.id,
            number: round.number,
            name: round.name.clone(),
            ties: round.ties().iter().map(|tie| TiePackage::build(tie, names)).collect(),
        }
    }
}

async fn team_names(db: &Db, ids: Vec<TeamId>) -> Result<Names> {
    Ok(Team::fetch_many(db, &ids).await?
        .into_iter()
        .map(|t| (t.id, t.full_name))
        .collect())
}

fn bracket_team_ids(bracket: &Bracket) -> Vec<TeamId> {
    let mut ids: Vec<TeamId> = bracket.rounds.iter()
        .flat_map(|r| r.games.iter())
        .flat_map(|g| [g.home_id, g.away_id])
        .flatten()
        .collect();
    ids.sort_unstable();
    ids.dedup();
    return ids;
}

// The cup with every round and tie.
pub async fn cup_view(db: &Db, cup: Cup) -> Result<CupPackage> {
    let bracket = cup.bracket(db).await?;
    let names = team_names(db, bracket_team_ids(&bracket)).await?;

    Ok(CupPackage {
        rounds: bracket.rounds.iter().map(|round| RoundPackage::build(round, &names)).collect(),
        cup,
    })
}

#[derive(Serialize)]
pub struct GroupedCupPackage {
    pub grouped_cup: GroupedCup,
    pub groups: Vec<GroupPackage>,
    pub knockout: Option<CupPackage>,
}

#[derive(Serialize)]
pub struct GroupPackage {
    pub id: PouleId,
    pub name: String,
    pub table: Vec<StandingPackage>,
    pub games: Vec<PouleGame>,
    pub is_over: bool,
}

// The groups with their tables, and the knockout phase once it exists.
pub async fn grouped_cup_view(db: &Db, grouped_cup: GroupedCup) -> Result<GroupedCupPackage> {
    let mut groups = Vec::new();
    for poule in grouped_cup.poules(db).await? {
        let is_over = poule.is_over();
        groups.push(GroupPackage {
            id: poule.id,
            name: poule.name,
            table: standings::with_names(db, &poule.standings).await?,
            games: poule.games,
            is_over,
        });
    }

    let knockout = match grouped_cup.cup_id {
        Some(cup_id) => Some(cup_view(db, Cup::fetch_from_db(db, cup_id).await?).await?),
        None => None,
    };

    Ok(GroupedCupPackage {
        grouped_cup,
        groups,
        knockout,
    })
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::logic::competition::cup::{bracket, CupRules};

    #[test]
    fn byes_show_no_aggregate() {
        let rules = CupRules::build(3, false, None, 1, false);
        let bracket = bracket::build(&[1, 2, 3], &rules, &mut StdRng::seed_from_u64(1)).unwrap();
        let names: Names = [(1, "Rovers".to_string())].into_iter().collect();

        let round = RoundPackage::build(&bracket.rounds[0], &names);
        let bye = &round.ties[0];
        assert_eq!(bye.status, TieStatus::Bye);
        assert_eq!(bye.aggregate, None);
        assert_eq!(bye.home.as_ref().map(|t| t.name.as_str()), Some("Rovers"));
        assert!(bye.away.is_none());

        assert_eq!(bracket_team_ids(&bracket), vec![1, 2, 3]);
    }
}
