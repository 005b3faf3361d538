use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    middleware::from_fn_with_state,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use sea_orm::{DatabaseConnection, TransactionTrait};
use serde::Deserialize;
use serde_json::json;
use std::str::FromStr;
use std::sync::Arc;

use crate::api::{ADMIN_ONLY, ANY_ROLE};
use crate::entities::user::Role;
use crate::error::ApiError;
use crate::middleware::auth::{auth_middleware, AuthState, Claims};
use crate::services::users;

pub fn users_router(db: Arc<DatabaseConnection>) -> Router {
    let admin = Router::new()
        .route("/users", get(get_users).delete(delete_all_users))
        .route("/users/roles/:role", get(get_users_by_role))
        .layer(from_fn_with_state(
            AuthState {
                db: db.clone(),
                allowed: ADMIN_ONLY,
            },
            auth_middleware,
        ));
    let personal = Router::new()
        .route(
            "/users/:username",
            get(get_user).patch(update_user).delete(delete_user),
        )
        .layer(from_fn_with_state(
            AuthState {
                db: db.clone(),
                allowed: ANY_ROLE,
            },
            auth_middleware,
        ));
    Router::new()
        .merge(admin)
        .merge(personal)
        .layer(Extension(db))
}

async fn get_users(
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<Response, ApiError> {
    let accounts = users::get_users(&*db).await?;
    Ok((StatusCode::OK, Json(accounts)).into_response())
}

async fn get_users_by_role(
    Path(role): Path<String>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<Response, ApiError> {
    let role = Role::from_str(&role).map_err(|_| ApiError::InvalidRole)?;
    let accounts = users::users_by_role(&*db, role).await?;
    Ok((StatusCode::OK, Json(accounts)).into_response())
}

async fn get_user(
    Path(username): Path<String>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Result<Response, ApiError> {
    if claims.username != username && !claims.is_admin() {
        return Err(ApiError::Unauthorized);
    }
    let account = users::get_user(&*db, &username).await?;
    Ok((StatusCode::OK, Json(account)).into_response())
}

async fn update_user(
    Path(username): Path<String>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<UpdateUserPayload>,
) -> Result<Response, ApiError> {
    let txn = db.begin().await?;
    if claims.username != username {
        if !claims.is_admin() {
            return Err(ApiError::Unauthorized);
        }
        let target = users::get_user(&txn, &username).await?;
        if target.role == Role::Admin {
            return Err(ApiError::UserIsAdmin);
        }
    }

    let updated = users::update_info(
        &txn,
        &username,
        users::InfoUpdate {
            name: payload.name,
            surname: payload.surname,
            address: payload.address,
            birthdate: payload.birthdate,
        },
    )
    .await?;
    txn.commit().await?;
    Ok((StatusCode::OK, Json(updated)).into_response())
}

async fn delete_user(
    Path(username): Path<String>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Result<Response, ApiError> {
    let txn = db.begin().await?;
    if claims.username != username {
        if !claims.is_admin() {
            return Err(ApiError::Unauthorized);
        }
        let target = users::get_user(&txn, &username).await?;
        if target.role == Role::Admin {
            return Err(ApiError::UserIsAdmin);
        }
    }

    users::delete_user(&txn, &username).await?;
    txn.commit().await?;
    Ok((
        StatusCode::OK,
        Json(json!({
            "message": "User deleted successfully"
        })),
    )
        .into_response())
}

async fn delete_all_users(
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<Response, ApiError> {
    let txn = db.begin().await?;
    users::delete_all_non_admin(&txn).await?;
    txn.commit().await?;
    Ok((
        StatusCode::OK,
        Json(json!({
            "message": "All non-admin users deleted"
        })),
    )
        .into_response())
}

//Structs
#[derive(Deserialize)]
struct UpdateUserPayload {
    name: String,
    surname: String,
    address: Option<String>,
    birthdate: Option<NaiveDate>,
}
