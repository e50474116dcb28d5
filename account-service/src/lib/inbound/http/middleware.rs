use auth::Verification;
use axum::extract::Request;
use axum::extract::State;
use axum::http::{self};
use axum::middleware::Next;
use axum::response::Response;

use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::router::AppState;

/// Extension type carrying the identity established from a bearer token.
#[derive(Debug, Clone)]
pub struct CurrentAccount {
    pub username: String,
}

/// Middleware that inspects the Authorization header and records the caller's
/// identity in the request extensions.
///
/// It never rejects. A missing, malformed, invalid or expired bearer token
/// just leaves the request anonymous; whether anonymity is acceptable is
/// decided per route.
pub async fn identify(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    if let Some(token) = bearer_token(&req) {
        match state.authenticator.verify_session(token) {
            Ok(Verification::Active { username }) => {
                req.extensions_mut().insert(CurrentAccount { username });
            }
            Ok(Verification::Expired { username }) => {
                tracing::debug!(username = %username, "Expired bearer token");
            }
            Err(e) => {
                tracing::debug!(error = %e, "Rejected bearer token");
            }
        }
    }
    next.run(req).await
}

/// Middleware guarding routes that require an established identity.
pub async fn require_authentication(req: Request, next: Next) -> Result<Response, ApiError> {
    if req.extensions().get::<CurrentAccount>().is_none() {
        return Err(ApiError::unauthorized(req.uri().path()));
    }
    Ok(next.run(req).await)
}

fn bearer_token(req: &Request) -> Option<&str> {
    let header = req.headers().get(http::header::AUTHORIZATION)?;
    let value = header.to_str().ok()?;
    value.strip_prefix("Bearer ")
}
