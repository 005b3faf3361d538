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
use validator::Validate;

use crate::api::{ANY_ROLE, CUSTOMER_ONLY, STAFF};
use crate::error::ApiError;
use crate::middleware::auth::{auth_middleware, AuthState, Claims};
use crate::services::reviews;

pub fn reviews_router(db: Arc<DatabaseConnection>) -> Router {
    let customer = Router::new()
        .route("/reviews/:model", post(add_review).delete(delete_own_review))
        .layer(from_fn_with_state(
            AuthState {
                db: db.clone(),
                allowed: CUSTOMER_ONLY,
            },
            auth_middleware,
        ));
    let shared = Router::new()
        .route("/reviews/:model", get(get_product_reviews))
        .layer(from_fn_with_state(
            AuthState {
                db: db.clone(),
                allowed: ANY_ROLE,
            },
            auth_middleware,
        ));
    let staff = Router::new()
        .route("/reviews", delete(delete_all_reviews))
        .route("/reviews/:model/all", delete(delete_product_reviews))
        .layer(from_fn_with_state(
            AuthState {
                db: db.clone(),
                allowed: STAFF,
            },
            auth_middleware,
        ));
    Router::new()
        .merge(customer)
        .merge(shared)
        .merge(staff)
        .layer(Extension(db))
}

async fn add_review(
    Path(model): Path<String>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<AddReviewPayload>,
) -> Result<Response, ApiError> {
    payload.validate()?;

    let txn = db.begin().await?;
    reviews::add_review(&txn, &model, &claims.username, payload.score, payload.comment).await?;
    txn.commit().await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Review added successfully"
        })),
    )
        .into_response())
}

async fn get_product_reviews(
    Path(model): Path<String>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<Response, ApiError> {
    let found = reviews::product_reviews(&*db, &model).await?;
    Ok((StatusCode::OK, Json(found)).into_response())
}

async fn delete_own_review(
    Path(model): Path<String>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Result<Response, ApiError> {
    let txn = db.begin().await?;
    reviews::delete_review(&txn, &model, &claims.username).await?;
    txn.commit().await?;
    Ok((
        StatusCode::OK,
        Json(json!({
            "message": "Review deleted successfully"
        })),
    )
        .into_response())
}

async fn delete_product_reviews(
    Path(model): Path<String>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<Response, ApiError> {
    let txn = db.begin().await?;
    reviews::delete_reviews_of_product(&txn, &model).await?;
    txn.commit().await?;
    Ok((
        StatusCode::OK,
        Json(json!({
            "message": "All reviews for the product deleted"
        })),
    )
        .into_response())
}

async fn delete_all_reviews(
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<Response, ApiError> {
    let txn = db.begin().await?;
    reviews::delete_all(&txn).await?;
    txn.commit().await?;
    Ok((
        StatusCode::OK,
        Json(json!({
            "message": "All reviews deleted"
        })),
    )
        .into_response())
}

//Structs
#[derive(Deserialize, Debug, Validate)]
struct AddReviewPayload {
    #[validate(range(min = 1, max = 5))]
    score: i32,
    comment: String,
}
