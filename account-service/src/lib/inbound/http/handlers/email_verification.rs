use std::collections::HashMap;

use axum::extract::OriginalUri;
use axum::extract::Query;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use uuid::Uuid;

use super::request_context;
use super::ApiError;
use crate::inbound::http::router::AppState;

/// Redeem an emailed verification token, enabling the account it belongs to.
///
/// The endpoint declares exactly one query parameter; anything else the
/// caller supplies is rejected by name rather than ignored.
pub async fn email_verification(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    Query(parameters): Query<HashMap<String, String>>,
) -> Result<StatusCode, ApiError> {
    let path = uri.path().to_string();

    let mut unsupported: Vec<String> = parameters
        .keys()
        .filter(|name| name.as_str() != "token")
        .cloned()
        .collect();
    if !unsupported.is_empty() {
        unsupported.sort();
        return Err(ApiError::unsupported_parameters(&path, unsupported));
    }

    // A missing or non-UUID token value can never name a stored token
    let value = parameters
        .get("token")
        .and_then(|raw| Uuid::parse_str(raw).ok())
        .ok_or_else(|| ApiError::bad_verification_token(&path))?;

    let context = request_context(&state, &headers);
    state
        .account_service
        .redeem_verification_token(value, &context)
        .await
        .map_err(|err| ApiError::from_account(err, &path))
        .map(|()| StatusCode::OK)
}
