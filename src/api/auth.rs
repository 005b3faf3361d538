use axum::{
    extract::Extension,
    http::StatusCode,
    middleware::from_fn_with_state,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::{DatabaseConnection, TransactionTrait};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use crate::api::ANY_ROLE;
use crate::entities::user::Role;
use crate::error::ApiError;
use crate::middleware::auth::{auth_middleware, generate_token, AuthState, Claims};
use crate::services::users;

pub fn auth_router(db: Arc<DatabaseConnection>) -> Router {
    let open = Router::new()
        .route("/users", post(register_user))
        .route("/sessions", post(login));
    let session = Router::new()
        .route("/sessions/current", get(current_session))
        .layer(from_fn_with_state(
            AuthState {
                db: db.clone(),
                allowed: ANY_ROLE,
            },
            auth_middleware,
        ));
    Router::new().merge(open).merge(session).layer(Extension(db))
}

async fn register_user(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<CreateUserPayload>,
) -> Result<Response, ApiError> {
    payload.validate()?;

    let txn = db.begin().await?;
    users::create_user(
        &txn,
        users::NewUser {
            username: payload.username,
            name: payload.name,
            surname: payload.surname,
            password: payload.password,
            role: payload.role,
        },
    )
    .await?;
    txn.commit().await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User created successfully"
        })),
    )
        .into_response())
}

async fn login(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<LoginPayload>,
) -> Result<Response, ApiError> {
    let account = match users::get_user(&*db, &payload.username).await {
        Ok(account) => account,
        // do not reveal whether the username exists
        Err(ApiError::UserNotFound) => return Err(ApiError::Unauthorized),
        Err(err) => return Err(err),
    };
    if !account.check_hash(&payload.password) {
        return Err(ApiError::Unauthorized);
    }

    let token = generate_token(&account.username, account.role)
        .map_err(|err| ApiError::Internal(err.to_string()))?;
    Ok((
        StatusCode::OK,
        Json(json!({
            "token": token,
            "username": account.username,
            "role": account.role,
        })),
    )
        .into_response())
}

async fn current_session(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Result<Response, ApiError> {
    let account = users::get_user(&*db, &claims.username).await?;
    Ok((StatusCode::OK, Json(account)).into_response())
}

//Structs
#[derive(Deserialize, Debug, Validate)]
struct CreateUserPayload {
    #[validate(regex(path = *USERNAME_REGEX))]
    username: String,
    #[validate(length(min = 1))]
    name: String,
    #[validate(length(min = 1))]
    surname: String,
    #[validate(length(min = 6))]
    password: String,
    role: Role,
}

#[derive(Deserialize)]
struct LoginPayload {
    username: String,
    password: String,
}

static USERNAME_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_]{3,25}$").unwrap());
