// Bearer token checks for the admin surface.
use axum::{extract::{Request, State}, http::{header::AUTHORIZATION, HeaderMap}, middleware::Next, response::Response};
use tracing::debug;

use crate::{error::{Error, Result}, logic::user::User, routes::AppState};

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    match token.is_empty() {
        true => None,
        false => Some(token.to_string()),
    }
}

// Let the request through if the token belongs to a user, who is then available to the handler.
pub async fn require_user(State(state): State<AppState>, mut request: Request, next: Next) -> Result<Response> {
    let token = bearer_token(request.headers()).ok_or(Error::Unauthorized)?;
    let user = User::fetch_by_token(&state.db, &token).await?.ok_or(Error::Unauthorized)?;

    debug!("{} {} by {}", request.method(), request.uri().path(), user.email);
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

// Only admins get past. Runs after `require_user`.
pub async fn require_admin(request: Request, next: Next) -> Result<Response> {
    match request.extensions().get::<User>() {
        Some(user) if user.is_admin() => Ok(next.run(request).await),
        Some(_) => Err(Error::Forbidden),
        None => Err(Error::Unauthorized),
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn only_bearer_tokens_are_read() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc123"));
        assert_eq!(bearer_token(&headers).as_deref(), Some("abc123"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc123"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);
    }
}
