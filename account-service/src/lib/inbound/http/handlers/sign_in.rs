use axum::extract::rejection::JsonRejection;
use axum::extract::OriginalUri;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::request_context;
use super::ApiError;
use super::ApiSuccess;
use crate::account::models::Username;
use crate::inbound::http::router::AppState;

pub async fn sign_in(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    body: Result<Json<SignInRequest>, JsonRejection>,
) -> Result<ApiSuccess<SignInResponseData>, ApiError> {
    let path = uri.path().to_string();
    let Json(body) = body.map_err(|rejection| ApiError::from_rejection(rejection, &path))?;

    // A structurally impossible username can never match an account, so it
    // gets the same answer as a wrong password.
    let username =
        Username::new(body.username).map_err(|_| ApiError::bad_credentials(&path))?;

    let context = request_context(&state, &headers);
    state
        .account_service
        .authenticate(&username, &body.password, &context)
        .await
        .map_err(|err| ApiError::from_account(err, &path))
        .map(|jwt| ApiSuccess::new(StatusCode::OK, SignInResponseData { jwt }))
}

/// HTTP request body for signing in (raw JSON).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignInRequest {
    username: String,
    password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignInResponseData {
    pub jwt: String,
}
