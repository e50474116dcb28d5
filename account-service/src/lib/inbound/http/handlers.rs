use std::sync::OnceLock;

use axum::extract::rejection::JsonRejection;
use axum::http::header;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use chrono::DateTime;
use chrono::Utc;
use regex::Regex;
use serde::Serialize;

use crate::account::errors::AccountError;
use crate::account::models::RequestContext;
use crate::inbound::http::router::AppState;

pub mod current_account;
pub mod email_verification;
pub mod sign_in;
pub mod sign_up;

/// Numeric error codes carried in error responses so clients can react
/// without parsing messages.
pub mod error_code {
    pub const BAD_EMAIL_VERIFICATION_TOKEN: u16 = 1;
    pub const EXPIRED_EMAIL_VERIFICATION_TOKEN: u16 = 2;
    pub const DISABLED_ACCOUNT: u16 = 3;
    pub const VALIDATION: u16 = 4;
    pub const USER_EXISTS: u16 = 5;
    pub const UNSUPPORTED_REQUEST_PARAMETER: u16 = 6;
    pub const DATETIME_VALIDATION: u16 = 7;
    pub const REQUEST_BODY_VALIDATION: u16 = 8;
    pub const REQUEST_BODY_VALIDATION_UNKNOWN_PROPERTY: u16 = 9;
}

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(StatusCode, Json<T>);

impl<T> PartialEq for ApiSuccess<T>
where
    T: Serialize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 .0 == other.1 .0
    }
}

impl<T: Serialize + PartialEq> ApiSuccess<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(data))
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

/// Wire shape of every error response. Empty optional fields are omitted
/// from the JSON entirely.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorResponse {
    pub timestamp: DateTime<Utc>,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(
        rename = "validationErrors",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub validation_errors: Vec<String>,
}

/// An error ready to be serialized onto the wire, carrying the status line
/// and the response body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorResponse,
}

impl ApiError {
    fn new(status: StatusCode, path: &str, message: String) -> Self {
        Self {
            status,
            body: ErrorResponse {
                timestamp: Utc::now(),
                path: path.to_string(),
                code: None,
                message,
                suggestion: None,
                validation_errors: Vec::new(),
            },
        }
    }

    fn with_code(mut self, code: u16) -> Self {
        self.body.code = Some(code);
        self
    }

    fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.body.suggestion = Some(suggestion.to_string());
        self
    }

    fn with_validation_errors(mut self, errors: Vec<String>) -> Self {
        self.body.validation_errors = errors;
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &ErrorResponse {
        &self.body
    }

    pub fn user_exists(path: &str) -> Self {
        Self::new(
            StatusCode::CONFLICT,
            path,
            "There is already an account with this username".to_string(),
        )
        .with_code(error_code::USER_EXISTS)
        .with_suggestion("Choose a different username")
    }

    pub fn bad_credentials(path: &str) -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            path,
            "Wrong username or password".to_string(),
        )
        .with_suggestion("Make sure that the username and the password are correct")
    }

    pub fn locked(path: &str) -> Self {
        Self::new(
            StatusCode::LOCKED,
            path,
            "This account is locked".to_string(),
        )
    }

    pub fn disabled(path: &str) -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            path,
            "This account has not been verified yet".to_string(),
        )
        .with_code(error_code::DISABLED_ACCOUNT)
        .with_suggestion("Check your email for the verification message")
    }

    pub fn bad_verification_token(path: &str) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            path,
            "This email verification token is not valid".to_string(),
        )
        .with_code(error_code::BAD_EMAIL_VERIFICATION_TOKEN)
        .with_suggestion("Request a new verification email")
    }

    pub fn expired_verification_token(path: &str) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            path,
            "This email verification token has expired".to_string(),
        )
        .with_code(error_code::EXPIRED_EMAIL_VERIFICATION_TOKEN)
        .with_suggestion("A new verification email has been sent, use the link it contains")
    }

    pub fn validation(path: &str, errors: Vec<String>) -> Self {
        Self::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            path,
            format!("The request has {} validation errors", errors.len()),
        )
        .with_code(error_code::VALIDATION)
        .with_validation_errors(errors)
    }

    pub fn unsupported_parameters(path: &str, parameters: Vec<String>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            path,
            format!(
                "The request has {} unsupported parameters",
                parameters.len()
            ),
        )
        .with_code(error_code::UNSUPPORTED_REQUEST_PARAMETER)
        .with_validation_errors(parameters)
    }

    pub fn datetime_validation(path: &str) -> Self {
        Self::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            path,
            "Failed to parse a date value".to_string(),
        )
        .with_code(error_code::DATETIME_VALIDATION)
        .with_suggestion("Use the yyyy-mm-dd format")
    }

    pub fn malformed_body(path: &str, message: &str) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            path,
            sanitize_type_paths(message),
        )
        .with_code(error_code::REQUEST_BODY_VALIDATION)
        .with_suggestion("Fix the request body so that it is well-formed JSON")
    }

    pub fn unknown_body_fields(path: &str, fields: Vec<String>) -> Self {
        Self::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            path,
            format!(
                "The request body has {} properties that are not allowed",
                fields.len()
            ),
        )
        .with_code(error_code::REQUEST_BODY_VALIDATION_UNKNOWN_PROPERTY)
        .with_suggestion("Remove these properties from the request body")
        .with_validation_errors(fields)
    }

    pub fn unauthorized(path: &str) -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            path,
            "Full authentication is required to access this resource".to_string(),
        )
    }

    pub fn not_found(path: &str, message: String) -> Self {
        Self::new(StatusCode::NOT_FOUND, path, message)
    }

    pub fn internal(path: &str) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            path,
            "Internal server error".to_string(),
        )
    }

    /// Translate a domain error into its wire representation.
    ///
    /// Infrastructure faults are logged here and surface as an opaque 500;
    /// their messages never reach the client.
    pub fn from_account(err: AccountError, path: &str) -> Self {
        match err {
            AccountError::UserExists(_) => Self::user_exists(path),
            AccountError::BadCredentials => Self::bad_credentials(path),
            AccountError::Locked => Self::locked(path),
            AccountError::Disabled => Self::disabled(path),
            AccountError::BadVerificationToken => Self::bad_verification_token(path),
            AccountError::ExpiredVerificationToken => Self::expired_verification_token(path),
            AccountError::NotFound(_) => Self::not_found(path, err.to_string()),
            err => {
                tracing::error!(error = %err, path, "Request failed");
                Self::internal(path)
            }
        }
    }

    /// Translate a JSON extractor rejection into its wire representation.
    ///
    /// Unknown body properties get their own code so clients can tell a
    /// typo'd field apart from broken JSON.
    pub fn from_rejection(rejection: JsonRejection, path: &str) -> Self {
        match rejection {
            JsonRejection::JsonDataError(err) => {
                let detail = err.body_text();
                match unknown_field_name(&detail) {
                    Some(field) => Self::unknown_body_fields(path, vec![field]),
                    None => Self::validation(path, vec![sanitize_type_paths(&detail)]),
                }
            }
            JsonRejection::JsonSyntaxError(err) => Self::malformed_body(path, &err.body_text()),
            rejection => Self::malformed_body(path, &rejection.body_text()),
        }
    }
}

/// Build the per-request context passed into the domain: the base URL for
/// verification links and the caller's preferred locale.
pub(crate) fn request_context(state: &AppState, headers: &HeaderMap) -> RequestContext {
    let locale = headers
        .get(header::ACCEPT_LANGUAGE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|value| value.trim().to_string())
        .unwrap_or_else(|| "en".to_string());
    RequestContext {
        callback_base_url: state.public_url.clone(),
        locale,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Rewrite dotted type paths in a deserializer message down to their last
/// segment, so internals never leak onto the wire.
///
/// Only runs whose final segment looks like a type name (uppercase-initial)
/// are rewritten; a domain name like `example.com` passes through untouched.
fn sanitize_type_paths(message: &str) -> String {
    static TYPE_PATH: OnceLock<Regex> = OnceLock::new();
    let pattern = TYPE_PATH
        .get_or_init(|| Regex::new(r"[A-Za-z_]\w*(\.[A-Za-z_]\w*)*\.[A-Z]\w*").unwrap());
    pattern
        .replace_all(message, |captures: &regex::Captures| {
            let matched = &captures[0];
            match matched.rsplit('.').next() {
                Some(last) => last.to_string(),
                None => matched.to_string(),
            }
        })
        .into_owned()
}

/// Pull the offending field name out of serde's "unknown field `x`" message.
fn unknown_field_name(detail: &str) -> Option<String> {
    let (_, rest) = detail.split_once("unknown field `")?;
    let (field, _) = rest.split_once('`')?;
    Some(field.to_string())
}
