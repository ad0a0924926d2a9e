use axum::{extract::{Path, State}, http::StatusCode, routing::{get, put}, Json, Router};
use serde::Serialize;

use crate::{error::Result, logic::{history::HistoryEntry, types::{HistoryEntryId, UserId}, user::User}, routes::AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/history", get(list_history).post(create_entry))
        .route("/history/:id", put(update_entry).delete(delete_entry))
}

// User management, for admins only.
pub fn user_router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/:id", get(get_user).put(update_user).delete(delete_user))
}

async fn list_history(State(state): State<AppState>) -> Result<Json<Vec<HistoryEntry>>> {
    Ok(Json(HistoryEntry::fetch_all(&state.db).await?))
}

async fn create_entry(State(state): State<AppState>, Json(mut entry): Json<HistoryEntry>) -> Result<(StatusCode, Json<HistoryEntry>)> {
    entry.save(&state.db).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

async fn update_entry(State(state): State<AppState>, Path(id): Path<HistoryEntryId>, Json(mut entry): Json<HistoryEntry>) -> Result<Json<HistoryEntry>> {
    entry.id = id;
    entry.update(&state.db).await?;
    Ok(Json(entry))
}

async fn delete_entry(State(state): State<AppState>, Path(id): Path<HistoryEntryId>) -> Result<StatusCode> {
    HistoryEntry::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// The token is part of the response only here.
#[derive(Serialize)]
struct NewUser {
    #[serde(flatten)]
    user: User,
    api_token: String,
}

async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>> {
    Ok(Json(User::fetch_all(&state.db).await?))
}

async fn get_user(State(state): State<AppState>, Path(id): Path<UserId>) -> Result<Json<User>> {
    Ok(Json(User::fetch_from_db(&state.db, id).await?))
}

async fn create_user(State(state): State<AppState>, Json(mut user): Json<User>) -> Result<(StatusCode, Json<NewUser>)> {
    user.save(&state.db).await?;
    let api_token = user.api_token.clone();
    Ok((StatusCode::CREATED, Json(NewUser { user, api_token })))
}

async fn update_user(State(state): State<AppState>, Path(id): Path<UserId>, Json(mut user): Json<User>) -> Result<Json<User>> {
    user.id = id;
    user.update(&state.db).await?;
    Ok(Json(User::fetch_from_db(&state.db, id).await?))
}

async fn delete_user(State(state): State<AppState>, Path(id): Path<UserId>) -> Result<StatusCode> {
    User::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
