use std::fmt;

use axum::extract::rejection::JsonRejection;
use axum::extract::OriginalUri;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use serde::Serialize;

use super::request_context;
use super::ApiError;
use super::ApiSuccess;
use crate::account::models::Account;
use crate::account::models::BirthDate;
use crate::account::models::EmailAddress;
use crate::account::models::Gender;
use crate::account::models::PersonName;
use crate::account::models::RawPassword;
use crate::account::models::RegisterAccountCommand;
use crate::account::models::Username;
use crate::inbound::http::router::AppState;

pub async fn sign_up(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    body: Result<Json<SignUpRequest>, JsonRejection>,
) -> Result<ApiSuccess<AccountResponseData>, ApiError> {
    let path = uri.path().to_string();
    let Json(body) = body.map_err(|rejection| ApiError::from_rejection(rejection, &path))?;
    let command = body
        .try_into_command()
        .map_err(|err| err.into_api_error(&path))?;
    let context = request_context(&state, &headers);
    state
        .account_service
        .register(command, &context)
        .await
        .map_err(|err| ApiError::from_account(err, &path))
        .map(|ref account| ApiSuccess::new(StatusCode::CREATED, account.into()))
}

/// HTTP request body for registration (raw JSON).
///
/// Properties outside this set are rejected rather than silently dropped.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SignUpRequest {
    username: String,
    password: String,
    email: String,
    first_name: String,
    last_name: String,
    birth_date: String,
    #[serde(default)]
    gender: Option<Gender>,
}

#[derive(Debug, Clone)]
enum ParseSignUpRequestError {
    /// Field constraint violations, all of them.
    Violations(Vec<String>),
    /// The birth date string is not a date at all.
    BirthDateFormat,
}

impl ParseSignUpRequestError {
    fn into_api_error(self, path: &str) -> ApiError {
        match self {
            Self::Violations(violations) => ApiError::validation(path, violations),
            Self::BirthDateFormat => ApiError::datetime_validation(path),
        }
    }
}

impl SignUpRequest {
    /// Validate every field, collecting all violations rather than stopping
    /// at the first. An unparseable birth date aborts early because nothing
    /// sensible can be validated against it.
    fn try_into_command(self) -> Result<RegisterAccountCommand, ParseSignUpRequestError> {
        let birth_date = NaiveDate::parse_from_str(&self.birth_date, "%Y-%m-%d")
            .map_err(|_| ParseSignUpRequestError::BirthDateFormat)?;

        let mut violations = Vec::new();
        let username = collect(Username::new(self.username), "username", &mut violations);
        let email = collect(EmailAddress::new(self.email), "email", &mut violations);
        let first_name = collect(PersonName::new(self.first_name), "firstName", &mut violations);
        let last_name = collect(PersonName::new(self.last_name), "lastName", &mut violations);
        let birth_date = collect(BirthDate::new(birth_date), "birthDate", &mut violations);
        let password = match RawPassword::new(self.password) {
            Ok(password) => Some(password),
            Err(errors) => {
                for error in errors {
                    violations.push(format!("password: {error}"));
                }
                None
            }
        };

        match (username, email, first_name, last_name, birth_date, password) {
            (
                Some(username),
                Some(email),
                Some(first_name),
                Some(last_name),
                Some(birth_date),
                Some(password),
            ) => Ok(RegisterAccountCommand {
                username,
                email,
                first_name,
                last_name,
                birth_date,
                gender: self.gender.unwrap_or_default(),
                password,
            }),
            _ => Err(ParseSignUpRequestError::Violations(violations)),
        }
    }
}

fn collect<T, E: fmt::Display>(
    result: Result<T, E>,
    field: &str,
    violations: &mut Vec<String>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(error) => {
            violations.push(format!("{field}: {error}"));
            None
        }
    }
}

/// Account representation returned to clients. Neither the password hash nor
/// internal bookkeeping fields appear here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponseData {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: String,
    pub gender: Gender,
    pub enabled: bool,
}

impl From<&Account> for AccountResponseData {
    fn from(account: &Account) -> Self {
        Self {
            username: account.username.to_string(),
            email: account.email.as_str().to_string(),
            first_name: account.first_name.as_str().to_string(),
            last_name: account.last_name.as_str().to_string(),
            birth_date: account.birth_date.as_date().format("%Y-%m-%d").to_string(),
            gender: account.gender,
            enabled: account.enabled,
        }
    }
}
