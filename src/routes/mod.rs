// The HTTP surface: public pages under /api, management under /admin.
mod admin;
mod auth;
mod public;

use axum::{http::StatusCode, response::{IntoResponse, Response}, Json, Router};
use rand::{rngs::StdRng, SeedableRng};
use serde_json::json;
use sqlx::error::ErrorKind;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::{error::Error, logic::types::Db};

#[derive(Clone)]
pub struct AppState {
    pub db: Db,
}

pub fn router(db: Db) -> Router {
    let state = AppState { db };

    Router::new()
        .nest("/api", public::router())
        .nest("/admin", admin::router(state.clone()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// A generator for draws, seeded from the thread's generator so it can be held across awaits.
fn draw_rng() -> StdRng {
    StdRng::from_rng(&mut rand::rng())
}

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::InvalidConfiguration(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::IncompleteResult(_) => StatusCode::CONFLICT,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::Database(sqlx::Error::Database(e)) => match e.kind() {
                // References to missing rows and duplicates are bad input, not failures.
                ErrorKind::ForeignKeyViolation | ErrorKind::UniqueViolation | ErrorKind::CheckViolation => StatusCode::UNPROCESSABLE_ENTITY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Database(_) | Self::Migration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            Self::Validation(errors) => json!({ "errors": errors }),
            e if status == StatusCode::INTERNAL_SERVER_ERROR => {
                error!("request failed: {e}");
                json!({ "error": "internal server error" })
            }
            e => json!({ "error": e.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FieldErrors;

    #[test]
    fn errors_map_to_statuses() {
        let mut errors = FieldErrors::new();
        errors.add("name", "is required");
        assert_eq!(Error::Validation(errors).status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(Error::invalid_configuration("x").status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(Error::incomplete_result("x").status(), StatusCode::CONFLICT);
        assert_eq!(Error::NotFound("cup").status(), StatusCode::NOT_FOUND);
        assert_eq!(Error::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(Error::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(Error::Database(sqlx::Error::RowNotFound).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
