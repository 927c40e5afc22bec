/// Authentication endpoints
///
/// This module provides user authentication endpoints:
/// - Registration (creates a user holding the `user` role)
/// - Login (verifies the Argon2id hash and issues a token pair)
/// - Token refresh
///
/// # Endpoints
///
/// - `POST /auth/register` - Register new user
/// - `POST /auth/login` - Login and get tokens
/// - `POST /auth/refresh` - Refresh access token

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{extract::State, Json};
use lendit_shared::{
    auth::{jwt, password},
    models::{
        role::Role,
        user::{CreateUser, User},
    },
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Username (stored lowercase)
    #[validate(length(min = 2, max = 30, message = "Username must be between 2 and 30 characters"))]
    pub username: String,

    /// Password (validated for strength before hashing)
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    /// Primary email address
    #[validate(email(message = "Invalid email format"))]
    pub primary_email: String,
}

/// Token pair response returned by register and login
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    /// User ID
    pub user_id: i64,

    /// Username as stored
    pub username: String,

    /// Access token (24h)
    pub access_token: String,

    /// Refresh token (30d)
    pub refresh_token: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Username
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    /// Password
    pub password: String,
}

/// Refresh token request
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    /// Refresh token
    pub refresh_token: String,
}

/// Refresh token response
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    /// New access token (24h)
    pub access_token: String,
}

/// Register a new user
///
/// Creates a user account holding the `user` role and returns a token pair.
///
/// # Errors
///
/// - `409 Conflict`: username or email already exists
/// - `422 Unprocessable Entity`: validation failed
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Json<TokenResponse>> {
    req.validate()?;

    password::validate_password_strength(&req.password).map_err(|e| {
        ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "password".to_string(),
            message: e,
        }])
    })?;

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            username: req.username,
            password_hash,
            primary_email: req.primary_email,
        },
    )
    .await?;

    // Every fresh account starts with the plain user role
    let role = match Role::find_by_name(&state.db, "user").await? {
        Some(role) => role,
        None => Role::create(&state.db, "user").await?,
    };
    role.assign_to_user(&state.db, user.id).await?;

    let roles = vec![role.name.clone()];
    let access = jwt::Claims::new(user.id, &user.username, roles.clone(), jwt::TokenType::Access);
    let refresh = jwt::Claims::new(user.id, &user.username, roles, jwt::TokenType::Refresh);

    Ok(Json(TokenResponse {
        user_id: user.id,
        username: user.username.clone(),
        access_token: jwt::create_token(&access, state.jwt_secret())?,
        refresh_token: jwt::create_token(&refresh, state.jwt_secret())?,
    }))
}

/// Login endpoint
///
/// Authenticates a user by username and password and returns a token pair
/// carrying the user's role names.
///
/// # Errors
///
/// - `401 Unauthorized`: invalid credentials
/// - `422 Unprocessable Entity`: validation failed
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    req.validate()?;

    let user = User::find_by_username(&state.db, &req.username)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid username or password".to_string()))?;

    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized(
            "Invalid username or password".to_string(),
        ));
    }

    let roles = Role::names_for_user(&state.db, user.id).await?;

    let access = jwt::Claims::new(user.id, &user.username, roles.clone(), jwt::TokenType::Access);
    let refresh = jwt::Claims::new(user.id, &user.username, roles, jwt::TokenType::Refresh);

    Ok(Json(TokenResponse {
        user_id: user.id,
        username: user.username.clone(),
        access_token: jwt::create_token(&access, state.jwt_secret())?,
        refresh_token: jwt::create_token(&refresh, state.jwt_secret())?,
    }))
}

/// Token refresh endpoint
///
/// Exchanges a refresh token for a new access token.
///
/// # Errors
///
/// - `401 Unauthorized`: invalid or expired refresh token
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<RefreshResponse>> {
    let access_token = jwt::refresh_access_token(&req.refresh_token, state.jwt_secret())?;

    Ok(Json(RefreshResponse { access_token }))
}
