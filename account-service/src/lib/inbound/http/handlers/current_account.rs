use axum::extract::OriginalUri;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;

use super::sign_up::AccountResponseData;
use super::ApiError;
use super::ApiSuccess;
use crate::account::models::Username;
use crate::inbound::http::middleware::CurrentAccount;
use crate::inbound::http::router::AppState;

/// Return the account of the authenticated caller.
pub async fn current_account(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Extension(current): Extension<CurrentAccount>,
) -> Result<ApiSuccess<AccountResponseData>, ApiError> {
    let path = uri.path().to_string();

    // The subject claim was produced from a valid username at mint time; a
    // token that fails this parse was not minted by us.
    let username =
        Username::new(current.username).map_err(|_| ApiError::unauthorized(&path))?;

    state
        .account_service
        .get_account(&username)
        .await
        .map_err(|err| ApiError::from_account(err, &path))
        .map(|ref account| ApiSuccess::new(StatusCode::OK, account.into()))
}
