//! Registration, confirmation and login endpoints.
//!
//! Account lifecycle: registration creates a pending (inactive) account with
//! a one-time 6-digit code; confirmation consumes the code exactly once and
//! activates the account; login verifies credentials against an active
//! account and returns its bearer token.

pub mod state;
pub(crate) mod storage;
pub mod types;
pub(crate) mod utils;

pub use self::state::AuthConfig;

use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{error, instrument};

use self::storage::{ConfirmOutcome, RegisterOutcome};
use self::types::{
    ConfirmRequest, ConfirmResponse, ErrorResponse, FieldErrors, LoginRequest, LoginResponse,
    NON_FIELD_ERRORS, RegisterRequest, RegisterResponse,
};
use self::utils::{hash_password, valid_code, valid_username, verify_password};

#[utoipa::path(
    post,
    path = "/api/v1/users/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registration successful", body = RegisterResponse),
        (status = 400, description = "Invalid input or username already taken", body = FieldErrors),
        (status = 500, description = "Registration failed", body = ErrorResponse),
    ),
    tag = "users"
)]
#[instrument(skip(pool, config, payload))]
pub async fn register(
    pool: Extension<PgPool>,
    config: Extension<Arc<AuthConfig>>,
    payload: Option<Json<RegisterRequest>>,
) -> impl IntoResponse {
    let request: RegisterRequest = match payload {
        Some(Json(payload)) => payload,
        None => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new("Missing payload")),
            )
                .into_response();
        }
    };

    let mut errors = FieldErrors::default();

    let username = match request.username.as_deref().map(str::trim) {
        None | Some("") => {
            errors.push("username", "This field is required.");
            ""
        }
        Some(username) if !valid_username(username) => {
            errors.push(
                "username",
                "Enter a valid username: 1-150 letters, digits or @/./+/-/_ characters.",
            );
            username
        }
        Some(username) => username,
    };

    let password = match request.password.as_deref() {
        None | Some("") => {
            errors.push("password", "This field is required.");
            ""
        }
        Some(password) if password.chars().count() < config.password_min_length() => {
            errors.push("password", "Password is too short.");
            password
        }
        Some(password) => password,
    };

    if !errors.is_empty() {
        return (StatusCode::BAD_REQUEST, Json(errors)).into_response();
    }

    let password_hash = match hash_password(password) {
        Ok(hash) => hash,
        Err(err) => {
            error!("Error hashing password: {err}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Error registering user")),
            )
                .into_response();
        }
    };

    match storage::create_account(&pool, username, &password_hash).await {
        Ok(RegisterOutcome::Created { code }) => (
            StatusCode::CREATED,
            Json(RegisterResponse {
                message: "User registered successfully".to_string(),
                username: username.to_string(),
                confirmation_code: code,
            }),
        )
            .into_response(),
        Ok(RegisterOutcome::Conflict) => (
            StatusCode::BAD_REQUEST,
            Json(FieldErrors::single(
                "username",
                "A user with that username already exists.",
            )),
        )
            .into_response(),
        Err(err) => {
            error!("Error registering user: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Error registering user")),
            )
                .into_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/users/confirm",
    request_body = ConfirmRequest,
    responses(
        (status = 200, description = "Account confirmed", body = ConfirmResponse),
        (status = 400, description = "Invalid input or wrong confirmation code", body = ErrorResponse),
        (status = 404, description = "No pending account with that username", body = ErrorResponse),
        (status = 500, description = "Confirmation failed", body = ErrorResponse),
    ),
    tag = "users"
)]
#[instrument(skip(pool, payload))]
pub async fn confirm(
    pool: Extension<PgPool>,
    payload: Option<Json<ConfirmRequest>>,
) -> impl IntoResponse {
    let request: ConfirmRequest = match payload {
        Some(Json(payload)) => payload,
        None => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new("Missing payload")),
            )
                .into_response();
        }
    };

    let mut errors = FieldErrors::default();

    let username = match request.username.as_deref().map(str::trim) {
        None | Some("") => {
            errors.push("username", "This field is required.");
            ""
        }
        Some(username) => username,
    };

    let code = match request.code.as_deref().map(str::trim) {
        None | Some("") => {
            errors.push("code", "This field is required.");
            ""
        }
        Some(code) if !valid_code(code) => {
            errors.push("code", "Code must be exactly 6 digits.");
            code
        }
        Some(code) => code,
    };

    if !errors.is_empty() {
        return (StatusCode::BAD_REQUEST, Json(errors)).into_response();
    }

    match storage::confirm_account(&pool, username, code).await {
        Ok(ConfirmOutcome::Confirmed) => (
            StatusCode::OK,
            Json(ConfirmResponse {
                message: "Account confirmed successfully".to_string(),
                username: username.to_string(),
            }),
        )
            .into_response(),
        Ok(ConfirmOutcome::NotFound) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("User not found or already activated")),
        )
            .into_response(),
        Ok(ConfirmOutcome::WrongCode) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("Invalid confirmation code")),
        )
            .into_response(),
        Err(err) => {
            error!("Error confirming account: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Error confirming account")),
            )
                .into_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/users/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Invalid credentials or inactive account", body = FieldErrors),
        (status = 500, description = "Login failed", body = ErrorResponse),
    ),
    tag = "users"
)]
#[instrument(skip(pool, payload))]
pub async fn login(
    pool: Extension<PgPool>,
    payload: Option<Json<LoginRequest>>,
) -> impl IntoResponse {
    let request: LoginRequest = match payload {
        Some(Json(payload)) => payload,
        None => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new("Missing payload")),
            )
                .into_response();
        }
    };

    let mut errors = FieldErrors::default();

    let username = match request.username.as_deref().map(str::trim) {
        None | Some("") => {
            errors.push("username", "This field is required.");
            ""
        }
        Some(username) => username,
    };

    let password = match request.password.as_deref() {
        None | Some("") => {
            errors.push("password", "This field is required.");
            ""
        }
        Some(password) => password,
    };

    if !errors.is_empty() {
        return (StatusCode::BAD_REQUEST, Json(errors)).into_response();
    }

    let account = match storage::lookup_account(&pool, username).await {
        Ok(Some(account)) => account,
        Ok(None) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(FieldErrors::single(NON_FIELD_ERRORS, "User not found.")),
            )
                .into_response();
        }
        Err(err) => {
            error!("Error looking up account: {err}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Error logging in")),
            )
                .into_response();
        }
    };

    if !verify_password(password, &account.password_hash) {
        return (
            StatusCode::BAD_REQUEST,
            Json(FieldErrors::single(NON_FIELD_ERRORS, "Wrong password.")),
        )
            .into_response();
    }

    if !account.active {
        return (
            StatusCode::BAD_REQUEST,
            Json(FieldErrors::single(
                NON_FIELD_ERRORS,
                "Account not activated. Confirm your registration.",
            )),
        )
            .into_response();
    }

    match storage::issue_session_token(&pool, account.id).await {
        Ok(token) => (
            StatusCode::OK,
            Json(LoginResponse {
                message: "Login successful".to_string(),
                token,
                user_id: account.id.to_string(),
                username: account.username,
            }),
        )
            .into_response(),
        Err(err) => {
            error!("Error issuing session token: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Error logging in")),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use sqlx::postgres::PgPoolOptions;

    fn lazy_pool() -> Result<PgPool> {
        // Validation paths return before any query runs, so a lazy pool
        // never has to connect.
        Ok(PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?)
    }

    fn auth_config() -> Arc<AuthConfig> {
        Arc::new(AuthConfig::new())
    }

    #[tokio::test]
    async fn register_missing_payload() -> Result<()> {
        let response = register(Extension(lazy_pool()?), Extension(auth_config()), None)
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn register_missing_fields() -> Result<()> {
        let response = register(
            Extension(lazy_pool()?),
            Extension(auth_config()),
            Some(Json(RegisterRequest {
                username: None,
                password: None,
            })),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn register_rejects_invalid_username() -> Result<()> {
        let response = register(
            Extension(lazy_pool()?),
            Extension(auth_config()),
            Some(Json(RegisterRequest {
                username: Some("not a valid username".to_string()),
                password: Some("secret123!".to_string()),
            })),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn register_rejects_overlong_username() -> Result<()> {
        let response = register(
            Extension(lazy_pool()?),
            Extension(auth_config()),
            Some(Json(RegisterRequest {
                username: Some("a".repeat(151)),
                password: Some("secret123!".to_string()),
            })),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn register_rejects_short_password() -> Result<()> {
        let response = register(
            Extension(lazy_pool()?),
            Extension(auth_config()),
            Some(Json(RegisterRequest {
                username: Some("alice".to_string()),
                password: Some("short".to_string()),
            })),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn confirm_missing_payload() -> Result<()> {
        let response = confirm(Extension(lazy_pool()?), None).await.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn confirm_rejects_short_code() -> Result<()> {
        let response = confirm(
            Extension(lazy_pool()?),
            Some(Json(ConfirmRequest {
                username: Some("alice".to_string()),
                code: Some("123".to_string()),
            })),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn confirm_rejects_non_numeric_code() -> Result<()> {
        let response = confirm(
            Extension(lazy_pool()?),
            Some(Json(ConfirmRequest {
                username: Some("alice".to_string()),
                code: Some("12a456".to_string()),
            })),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn login_missing_fields() -> Result<()> {
        let response = login(
            Extension(lazy_pool()?),
            Some(Json(LoginRequest {
                username: Some("alice".to_string()),
                password: None,
            })),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }
}
