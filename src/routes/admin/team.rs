use axum::{extract::{Path, State}, http::StatusCode, routing::{delete, get, post, put}, Json, Router};
use serde::Deserialize;

use crate::{error::Result, logic::{person::{player::Player, transfer::Transfer, Position}, team::Team, types::{PlayerId, PositionId, TeamId}}, routes::AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/teams", get(list_teams).post(create_team))
        .route("/teams/:id", put(update_team).delete(delete_team))
        .route("/teams/:id/rivals", get(list_rivals).post(add_rival))
        .route("/teams/:id/rivals/:rival_id", delete(remove_rival))
        .route("/positions", get(list_positions).post(create_position))
        .route("/positions/:id", put(update_position).delete(delete_position))
        .route("/players", get(list_players).post(create_player))
        .route("/players/:id", get(get_player).put(update_player).delete(delete_player))
        .route("/players/:id/transfers", get(list_transfers))
        .route("/transfers", post(record_transfer))
}

async fn list_teams(State(state): State<AppState>) -> Result<Json<Vec<Team>>> {
    Ok(Json(Team::fetch_all(&state.db).await?))
}

async fn create_team(State(state): State<AppState>, Json(mut team): Json<Team>) -> Result<(StatusCode, Json<Team>)> {
    team.save(&state.db).await?;
    Ok((StatusCode::CREATED, Json(team)))
}

async fn update_team(State(state): State<AppState>, Path(id): Path<TeamId>, Json(mut team): Json<Team>) -> Result<Json<Team>> {
    team.id = id;
    team.update(&state.db).await?;
    Ok(Json(team))
}

async fn delete_team(State(state): State<AppState>, Path(id): Path<TeamId>) -> Result<StatusCode> {
    Team::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_rivals(State(state): State<AppState>, Path(id): Path<TeamId>) -> Result<Json<Vec<Team>>> {
    let team = Team::fetch_from_db(&state.db, id).await?;
    Ok(Json(team.rivals(&state.db).await?))
}

#[derive(Deserialize)]
struct RivalForm {
    rival_id: TeamId,
}

async fn add_rival(State(state): State<AppState>, Path(id): Path<TeamId>, Json(form): Json<RivalForm>) -> Result<StatusCode> {
    Team::add_rival(&state.db, id, form.rival_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn remove_rival(State(state): State<AppState>, Path((id, rival_id)): Path<(TeamId, TeamId)>) -> Result<StatusCode> {
    Team::remove_rival(&state.db, id, rival_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_positions(State(state): State<AppState>) -> Result<Json<Vec<Position>>> {
    Ok(Json(Position::fetch_all(&state.db).await?))
}

async fn create_position(State(state): State<AppState>, Json(mut position): Json<Position>) -> Result<(StatusCode, Json<Position>)> {
    position.save(&state.db).await?;
    Ok((StatusCode::CREATED, Json(position)))
}

async fn update_position(State(state): State<AppState>, Path(id): Path<PositionId>, Json(mut position): Json<Position>) -> Result<Json<Position>> {
    position.id = id;
    position.update(&state.db).await?;
    Ok(Json(position))
}

async fn delete_position(State(state): State<AppState>, Path(id): Path<PositionId>) -> Result<StatusCode> {
    Position::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_players(State(state): State<AppState>) -> Result<Json<Vec<Player>>> {
    Ok(Json(Player::fetch_all(&state.db).await?))
}

async fn get_player(State(state): State<AppState>, Path(id): Path<PlayerId>) -> Result<Json<Player>> {
    Ok(Json(Player::fetch_from_db(&state.db, id).await?))
}

async fn create_player(State(state): State<AppState>, Json(mut player): Json<Player>) -> Result<(StatusCode, Json<Player>)> {
    player.save(&state.db).await?;
    Ok((StatusCode::CREATED, Json(player)))
}

async fn update_player(State(state): State<AppState>, Path(id): Path<PlayerId>, Json(mut player): Json<Player>) -> Result<Json<Player>> {
    player.id = id;
    player.update(&state.db).await?;
    Ok(Json(Player::fetch_from_db(&state.db, id).await?))
}

async fn delete_player(State(state): State<AppState>, Path(id): Path<PlayerId>) -> Result<StatusCode> {
    Player::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_transfers(State(state): State<AppState>, Path(id): Path<PlayerId>) -> Result<Json<Vec<Transfer>>> {
    Ok(Json(Transfer::fetch_for_player(&state.db, id).await?))
}

async fn record_transfer(State(state): State<AppState>, Json(mut transfer): Json<Transfer>) -> Result<(StatusCode, Json<Transfer>)> {
    transfer.record(&state.db).await?;
    Ok((StatusCode::CREATED, Json(transfer)))
}
