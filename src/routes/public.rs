// Read-only pages.
use axum::{extract::{Path, Query, State}, routing::get, Json, Router};
use serde::{Deserialize, Serialize};

use crate::{error::Result, logic::{competition::{cup::Cup, grouped_cup::GroupedCup}, history::HistoryEntry, league::{League, Season}, stats::SeasonStats, types::{CupId, GroupedCupId, PlayerId, SeasonId, TeamId}}, packages::{calendar::{self, MatchdayPackage}, cup::{self, CupPackage, GroupedCupPackage}, player::{self, PlayerPackage}, standings::{self, StandingPackage}, team::{self, CrestPackage, TeamPagePackage}}, routes::AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/leagues", get(leagues))
        .route("/seasons/:id/standings", get(season_standings))
        .route("/seasons/:id/statistics", get(season_statistics))
        .route("/seasons/:id/calendar", get(season_calendar))
        .route("/cups", get(cups))
        .route("/cups/:id", get(cup_detail))
        .route("/grouped-cups/:id", get(grouped_cup_detail))
        .route("/teams/logos", get(team_logos))
        .route("/teams/:id", get(team_page))
        .route("/players/:id", get(player_profile))
        .route("/history", get(history))
}

#[derive(Serialize)]
struct LeagueWithSeasons {
    #[serde(flatten)]
    league: League,
    seasons: Vec<Season>,
}

async fn leagues(State(state): State<AppState>) -> Result<Json<Vec<LeagueWithSeasons>>> {
    let mut leagues = Vec::new();
    for league in League::fetch_all(&state.db).await? {
        let seasons = league.seasons(&state.db).await?;
        leagues.push(LeagueWithSeasons { league, seasons });
    }
    Ok(Json(leagues))
}

async fn season_standings(State(state): State<AppState>, Path(id): Path<SeasonId>) -> Result<Json<Vec<StandingPackage>>> {
    let season = Season::fetch_from_db(&state.db, id).await?;
    Ok(Json(standings::season_table(&state.db, &season).await?))
}

async fn season_statistics(State(state): State<AppState>, Path(id): Path<SeasonId>) -> Result<Json<SeasonStats>> {
    let season = Season::fetch_from_db(&state.db, id).await?;
    Ok(Json(season.stats(&state.db).await?))
}

async fn season_calendar(State(state): State<AppState>, Path(id): Path<SeasonId>) -> Result<Json<Vec<MatchdayPackage>>> {
    let season = Season::fetch_from_db(&state.db, id).await?;
    Ok(Json(calendar::season_calendar(&state.db, &season).await?))
}

async fn cups(State(state): State<AppState>) -> Result<Json<Vec<Cup>>> {
    Ok(Json(Cup::fetch_all(&state.db).await?))
}

async fn cup_detail(State(state): State<AppState>, Path(id): Path<CupId>) -> Result<Json<CupPackage>> {
    let cup = Cup::fetch_from_db(&state.db, id).await?;
    Ok(Json(cup::cup_view(&state.db, cup).await?))
}

async fn grouped_cup_detail(State(state): State<AppState>, Path(id): Path<GroupedCupId>) -> Result<Json<GroupedCupPackage>> {
    let grouped_cup = GroupedCup::fetch_from_db(&state.db, id).await?;
    Ok(Json(cup::grouped_cup_view(&state.db, grouped_cup).await?))
}

#[derive(Deserialize)]
struct IdList {
    #[serde(default)]
    ids: String,
}

async fn team_logos(State(state): State<AppState>, Query(query): Query<IdList>) -> Result<Json<Vec<CrestPackage>>> {
    let ids = team::parse_ids(&query.ids);
    Ok(Json(team::crests(&state.db, &ids).await?))
}

async fn team_page(State(state): State<AppState>, Path(id): Path<TeamId>) -> Result<Json<TeamPagePackage>> {
    Ok(Json(team::team_page(&state.db, id).await?))
}

async fn player_profile(State(state): State<AppState>, Path(id): Path<PlayerId>) -> Result<Json<PlayerPackage>> {
    Ok(Json(player::profile(&state.db, id).await?))
}

async fn history(State(state): State<AppState>) -> Result<Json<Vec<HistoryEntry>>> {
    Ok(Json(HistoryEntry::fetch_all(&state.db).await?))
}
