use axum::{extract::{Path, State}, http::StatusCode, routing::{delete, get, post}, Json, Router};
use serde::Serialize;

use crate::{error::Result, logic::{game::{event::{Card, GameRef, Goal}, Game}, types::{CardId, GameId, GoalId}}, routes::AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/games", post(create_game))
        .route("/games/:id", get(get_game).put(update_game).delete(delete_game))
        .route("/games/:id/events", get(game_events))
        .route("/goals", post(record_goal))
        .route("/goals/:id", delete(remove_goal))
        .route("/cards", post(record_card))
        .route("/cards/:id", delete(remove_card))
}

async fn create_game(State(state): State<AppState>, Json(mut game): Json<Game>) -> Result<(StatusCode, Json<Game>)> {
    game.save(&state.db).await?;
    Ok((StatusCode::CREATED, Json(game)))
}

async fn get_game(State(state): State<AppState>, Path(id): Path<GameId>) -> Result<Json<Game>> {
    Ok(Json(Game::fetch_from_db(&state.db, id).await?))
}

async fn update_game(State(state): State<AppState>, Path(id): Path<GameId>, Json(mut game): Json<Game>) -> Result<Json<Game>> {
    game.id = id;
    game.update(&state.db).await?;
    Ok(Json(game))
}

async fn delete_game(State(state): State<AppState>, Path(id): Path<GameId>) -> Result<StatusCode> {
    Game::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Serialize)]
struct GameEvents {
    goals: Vec<Goal>,
    cards: Vec<Card>,
}

async fn game_events(State(state): State<AppState>, Path(id): Path<GameId>) -> Result<Json<GameEvents>> {
    let game = GameRef::Regular(Game::fetch_from_db(&state.db, id).await?.id);
    Ok(Json(GameEvents {
        goals: Goal::fetch_for_game(&state.db, game).await?,
        cards: Card::fetch_for_game(&state.db, game).await?,
    }))
}

async fn record_goal(State(state): State<AppState>, Json(mut goal): Json<Goal>) -> Result<(StatusCode, Json<Goal>)> {
    goal.record(&state.db).await?;
    Ok((StatusCode::CREATED, Json(goal)))
}

async fn remove_goal(State(state): State<AppState>, Path(id): Path<GoalId>) -> Result<StatusCode> {
    Goal::remove(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn record_card(State(state): State<AppState>, Json(mut card): Json<Card>) -> Result<(StatusCode, Json<Card>)> {
    card.record(&state.db).await?;
    Ok((StatusCode::CREATED, Json(card)))
}

async fn remove_card(State(state): State<AppState>, Path(id): Path<CardId>) -> Result<StatusCode> {
    Card::remove(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
