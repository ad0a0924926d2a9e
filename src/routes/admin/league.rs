use axum::{extract::{Path, State}, http::StatusCode, routing::{get, post, put}, Json, Router};
use serde::Deserialize;
use time::Date;

use crate::{error::Result, logic::{league::{League, Matchday, Season}, time::iso_date_format, types::{LeagueId, MatchdayId, SeasonId, TeamId}}, routes::AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/leagues", get(list_leagues).post(create_league))
        .route("/leagues/:id", put(update_league).delete(delete_league))
        .route("/seasons", get(list_seasons).post(create_season))
        .route("/seasons/:id", put(update_season).delete(delete_season))
        .route("/seasons/:id/matchdays", get(list_matchdays))
        .route("/seasons/:id/schedule", post(generate_schedule))
        .route("/matchdays", post(create_matchday))
        .route("/matchdays/:id", put(update_matchday).delete(delete_matchday))
}

async fn list_leagues(State(state): State<AppState>) -> Result<Json<Vec<League>>> {
    Ok(Json(League::fetch_all(&state.db).await?))
}

async fn create_league(State(state): State<AppState>, Json(mut league): Json<League>) -> Result<(StatusCode, Json<League>)> {
    league.save(&state.db).await?;
    Ok((StatusCode::CREATED, Json(league)))
}

async fn update_league(State(state): State<AppState>, Path(id): Path<LeagueId>, Json(mut league): Json<League>) -> Result<Json<League>> {
    league.id = id;
    league.update(&state.db).await?;
    Ok(Json(league))
}

async fn delete_league(State(state): State<AppState>, Path(id): Path<LeagueId>) -> Result<StatusCode> {
    League::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_seasons(State(state): State<AppState>) -> Result<Json<Vec<Season>>> {
    Ok(Json(Season::fetch_all(&state.db).await?))
}

async fn create_season(State(state): State<AppState>, Json(mut season): Json<Season>) -> Result<(StatusCode, Json<Season>)> {
    season.save(&state.db).await?;
    Ok((StatusCode::CREATED, Json(season)))
}

async fn update_season(State(state): State<AppState>, Path(id): Path<SeasonId>, Json(mut season): Json<Season>) -> Result<Json<Season>> {
    season.id = id;
    season.update(&state.db).await?;
    Ok(Json(season))
}

async fn delete_season(State(state): State<AppState>, Path(id): Path<SeasonId>) -> Result<StatusCode> {
    Season::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_matchdays(State(state): State<AppState>, Path(id): Path<SeasonId>) -> Result<Json<Vec<Matchday>>> {
    let season = Season::fetch_from_db(&state.db, id).await?;
    Ok(Json(season.matchdays(&state.db).await?))
}

#[derive(Deserialize)]
struct ScheduleForm {
    teams: Vec<TeamId>,
    #[serde(default = "one_leg")]
    legs: u8,
    #[serde(default, with = "iso_date_format::option")]
    start: Option<Date>,
}

fn one_leg() -> u8 {
    1
}

async fn generate_schedule(State(state): State<AppState>, Path(id): Path<SeasonId>, Json(form): Json<ScheduleForm>) -> Result<(StatusCode, Json<Vec<Matchday>>)> {
    let season = Season::fetch_from_db(&state.db, id).await?;
    let matchdays = season.generate_schedule(&state.db, &form.teams, form.legs, form.start).await?;
    Ok((StatusCode::CREATED, Json(matchdays)))
}

async fn create_matchday(State(state): State<AppState>, Json(mut matchday): Json<Matchday>) -> Result<(StatusCode, Json<Matchday>)> {
    matchday.save(&state.db).await?;
    Ok((StatusCode::CREATED, Json(matchday)))
}

async fn update_matchday(State(state): State<AppState>, Path(id): Path<MatchdayId>, Json(mut matchday): Json<Matchday>) -> Result<Json<Matchday>> {
    matchday.id = id;
    matchday.update(&state.db).await?;
    Ok(Json(matchday))
}

async fn delete_matchday(State(state): State<AppState>, Path(id): Path<MatchdayId>) -> Result<StatusCode> {
    Matchday::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
