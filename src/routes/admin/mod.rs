// Management endpoints. Every route needs a user token, the user routes an admin one.
mod competition;
mod game;
mod league;
mod site;
mod team;

use axum::{middleware, Router};

use crate::routes::{auth, AppState};

pub fn router(state: AppState) -> Router<AppState> {
    let users = site::user_router().route_layer(middleware::from_fn(auth::require_admin));

    Router::new()
        .merge(league::router())
        .merge(team::router())
        .merge(game::router())
        .merge(competition::router())
        .merge(site::router())
        .merge(users)
        .route_layer(middleware::from_fn_with_state(state, auth::require_user))
}
