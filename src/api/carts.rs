use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    middleware::from_fn_with_state,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use sea_orm::{DatabaseConnection, TransactionTrait};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::api::{CUSTOMER_ONLY, STAFF};
use crate::error::ApiError;
use crate::middleware::auth::{auth_middleware, AuthState, Claims};
use crate::services::carts;

pub fn carts_router(db: Arc<DatabaseConnection>) -> Router {
    let customer = Router::new()
        .route(
            "/carts/current",
            get(get_active_cart).patch(checkout).delete(clear_cart),
        )
        .route("/carts/current/items", post(add_to_cart))
        .route("/carts/current/items/:model", delete(remove_one_unit))
        .route("/carts/history", get(get_paid_carts))
        .layer(from_fn_with_state(
            AuthState {
                db: db.clone(),
                allowed: CUSTOMER_ONLY,
            },
            auth_middleware,
        ));
    let staff = Router::new()
        .route("/carts", get(get_all_carts).delete(delete_all_carts))
        .layer(from_fn_with_state(
            AuthState {
                db: db.clone(),
                allowed: STAFF,
            },
            auth_middleware,
        ));
    Router::new()
        .merge(customer)
        .merge(staff)
        .layer(Extension(db))
}

async fn get_active_cart(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Result<Response, ApiError> {
    let txn = db.begin().await?;
    let cart = carts::active_cart(&txn, &claims.username).await?;
    txn.commit().await?;
    Ok((StatusCode::OK, Json(cart)).into_response())
}

async fn add_to_cart(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<AddToCartPayload>,
) -> Result<Response, ApiError> {
    let txn = db.begin().await?;
    carts::add_to_cart(&txn, &claims.username, &payload.model).await?;
    txn.commit().await?;
    Ok((
        StatusCode::OK,
        Json(json!({
            "message": "Added successfully"
        })),
    )
        .into_response())
}

async fn remove_one_unit(
    Path(model): Path<String>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Result<Response, ApiError> {
    let txn = db.begin().await?;
    carts::remove_one_unit(&txn, &claims.username, &model).await?;
    txn.commit().await?;
    Ok((
        StatusCode::OK,
        Json(json!({
            "message": "Removed successfully"
        })),
    )
        .into_response())
}

async fn clear_cart(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Result<Response, ApiError> {
    let txn = db.begin().await?;
    carts::clear_cart(&txn, &claims.username).await?;
    txn.commit().await?;
    Ok((
        StatusCode::OK,
        Json(json!({
            "message": "Cart cleared"
        })),
    )
        .into_response())
}

/// The whole stock re-check and decrement sequence plus the paid
/// transition commits or rolls back as one unit.
async fn checkout(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Result<Response, ApiError> {
    let txn = db.begin().await?;
    carts::checkout(&txn, &claims.username).await?;
    txn.commit().await?;
    Ok((
        StatusCode::OK,
        Json(json!({
            "message": "Checkout completed"
        })),
    )
        .into_response())
}

async fn get_paid_carts(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Result<Response, ApiError> {
    let history = carts::paid_carts(&*db, &claims.username).await?;
    Ok((StatusCode::OK, Json(history)).into_response())
}

async fn get_all_carts(
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<Response, ApiError> {
    let all = carts::all_carts(&*db).await?;
    Ok((StatusCode::OK, Json(all)).into_response())
}

async fn delete_all_carts(
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<Response, ApiError> {
    let txn = db.begin().await?;
    carts::delete_all(&txn).await?;
    txn.commit().await?;
    Ok((
        StatusCode::OK,
        Json(json!({
            "message": "All carts deleted"
        })),
    )
        .into_response())
}

//Structs
#[derive(Deserialize, Debug)]
struct AddToCartPayload {
    model: String,
}
