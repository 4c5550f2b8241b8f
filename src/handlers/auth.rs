use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::outbox::OutboxTask;
use crate::models::reset_code::PasswordResetCode;
use crate::models::session::Session;
use crate::models::user::User;
use crate::outbox::{PasswordResetPayload, KIND_PASSWORD_RESET_EMAIL};
use crate::state::AppState;
use crate::utils::auth::AuthUser;
use crate::utils::crypto;
use crate::utils::error::{AppError, AppResult};
use crate::utils::response::{created, empty_success, success};

const ROLES: [&str; 2] = ["buyer", "seller"];
const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default = "default_role")]
    pub role: String,
}

fn default_role() -> String {
    "buyer".to_string()
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RequestResetRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub email: String,
    pub code: String,
    pub new_password: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub token: String,
    pub user_id: Uuid,
    pub name: String,
    pub role: String,
}

pub fn validate_registration(req: &RegisterRequest) -> AppResult<()> {
    if req.name.trim().is_empty() {
        return Err(AppError::ValidationError("Name is required.".to_string()));
    }
    if !req.email.contains('@') {
        return Err(AppError::ValidationError(
            "A valid email address is required.".to_string(),
        ));
    }
    if req.password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::ValidationError(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters."
        )));
    }
    if !ROLES.contains(&req.role.as_str()) {
        return Err(AppError::ValidationError(
            "Role must be 'buyer' or 'seller'.".to_string(),
        ));
    }
    Ok(())
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<Response> {
    validate_registration(&req)?;

    let (hash, salt) = crypto::hash_password(&req.password);
    let user = User::create(
        &state.pool,
        req.name.trim(),
        &req.email.to_lowercase(),
        &req.role,
        &hash,
        &salt,
    )
    .await
    .map_err(|e| {
        if let AppError::DatabaseError(sqlx::Error::Database(db)) = &e {
            if db.code().as_deref() == Some("23505") {
                return AppError::Conflict(
                    "An account with this email already exists.".to_string(),
                );
            }
        }
        e
    })?;

    let token = crypto::generate_session_token();
    Session::create(&state.pool, &token, user.id, state.config.session_ttl_hours).await?;

    let body = SessionResponse {
        token,
        user_id: user.id,
        name: user.name,
        role: user.role,
    };
    Ok(created(body, "Account created").into_response())
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Response> {
    let user = User::find_by_email(&state.pool, &req.email.to_lowercase())
        .await?
        .ok_or_else(invalid_credentials)?;

    if !crypto::verify_password(&req.password, &user.password_salt, &user.password_hash) {
        return Err(invalid_credentials());
    }

    let token = crypto::generate_session_token();
    Session::create(&state.pool, &token, user.id, state.config.session_ttl_hours).await?;

    let body = SessionResponse {
        token,
        user_id: user.id,
        name: user.name,
        role: user.role,
    };
    Ok(success(body, "Logged in").into_response())
}

/// Deletes the session the caller authenticated with.
pub async fn logout(State(state): State<AppState>, user: AuthUser) -> AppResult<Response> {
    Session::delete(&state.pool, &user.token).await?;
    Ok(empty_success("Logged out").into_response())
}

/// Start the reset flow: generate a short-lived code, persist it, and queue
/// the email through the outbox. The response is the same whether or not the
/// email belongs to an account.
pub async fn request_reset(
    State(state): State<AppState>,
    Json(req): Json<RequestResetRequest>,
) -> AppResult<Response> {
    let ack = empty_success("If the account exists, a reset code has been sent.");

    let Some(user) = User::find_by_email(&state.pool, &req.email.to_lowercase()).await? else {
        return Ok(ack.into_response());
    };

    let code = crypto::generate_reset_code();
    let ttl = state.config.reset_code_ttl_minutes;

    let mut tx = state.pool.begin().await?;
    let payload = serde_json::to_value(PasswordResetPayload {
        email: user.email.clone(),
        code: code.clone(),
        expires_minutes: ttl,
    })
    .map_err(|e| AppError::InternalServerError(format!("outbox payload: {e}")))?;

    PasswordResetCode::create(&mut tx, user.id, &code, ttl).await?;
    OutboxTask::enqueue(&mut tx, KIND_PASSWORD_RESET_EMAIL, &payload).await?;
    tx.commit().await?;

    Ok(ack.into_response())
}

/// Finish the reset flow: verify the code, consume it, and replace the
/// password. Codes are single-use and compared in constant time.
pub async fn reset_password(
    State(state): State<AppState>,
    Json(req): Json<ResetPasswordRequest>,
) -> AppResult<Response> {
    if req.new_password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::ValidationError(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters."
        )));
    }

    let user = User::find_by_email(&state.pool, &req.email.to_lowercase())
        .await?
        .ok_or_else(invalid_reset)?;

    let active = PasswordResetCode::find_active(&state.pool, user.id)
        .await?
        .ok_or_else(invalid_reset)?;

    if !crypto::codes_match(&req.code, &active.code) {
        return Err(invalid_reset());
    }

    // Consuming the code and replacing the password commit together, so a
    // failed update leaves the code usable.
    let mut tx = state.pool.begin().await?;
    if !PasswordResetCode::consume(&mut tx, active.id).await? {
        return Err(invalid_reset());
    }

    let (hash, salt) = crypto::hash_password(&req.new_password);
    User::update_password(&mut tx, user.id, &hash, &salt).await?;
    tx.commit().await?;

    Ok(empty_success("Password updated").into_response())
}

fn invalid_credentials() -> AppError {
    AppError::AuthError("Invalid email or password.".to_string())
}

fn invalid_reset() -> AppError {
    AppError::ValidationError("Reset code is invalid or expired.".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> RegisterRequest {
        RegisterRequest {
            name: "Amina".to_string(),
            email: "amina@example.com".to_string(),
            password: "correct horse".to_string(),
            role: "buyer".to_string(),
        }
    }

    #[test]
    fn test_valid_registration_passes() {
        assert!(validate_registration(&valid_request()).is_ok());
    }

    #[test]
    fn test_blank_name_rejected() {
        let mut req = valid_request();
        req.name = "   ".to_string();
        assert!(matches!(
            validate_registration(&req),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn test_short_password_rejected() {
        let mut req = valid_request();
        req.password = "short".to_string();
        assert!(matches!(
            validate_registration(&req),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn test_unknown_role_rejected() {
        let mut req = valid_request();
        req.role = "admin".to_string();
        assert!(matches!(
            validate_registration(&req),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn test_default_role_is_buyer() {
        let req: RegisterRequest = serde_json::from_value(serde_json::json!({
            "name": "Omar",
            "email": "omar@example.com",
            "password": "longenough",
        }))
        .unwrap();
        assert_eq!(req.role, "buyer");
    }
}
