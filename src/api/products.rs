use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    middleware::from_fn_with_state,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::{DatabaseConnection, TransactionTrait};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use crate::api::{ANY_ROLE, STAFF};
use crate::entities::product::Category;
use crate::error::ApiError;
use crate::middleware::auth::{auth_middleware, AuthState};
use crate::services::products;

pub fn products_router(db: Arc<DatabaseConnection>) -> Router {
    let staff = Router::new()
        .route(
            "/products",
            post(register_product)
                .get(get_products)
                .delete(delete_all_products),
        )
        .route("/products/:model", patch(restock).delete(delete_product))
        .route("/products/:model/sell", patch(sell))
        .layer(from_fn_with_state(
            AuthState {
                db: db.clone(),
                allowed: STAFF,
            },
            auth_middleware,
        ));
    let shared = Router::new()
        .route("/products/available", get(get_available_products))
        .layer(from_fn_with_state(
            AuthState {
                db: db.clone(),
                allowed: ANY_ROLE,
            },
            auth_middleware,
        ));
    Router::new()
        .merge(staff)
        .merge(shared)
        .layer(Extension(db))
}

async fn register_product(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<RegisterProductPayload>,
) -> Result<Response, ApiError> {
    payload.validate()?;

    let txn = db.begin().await?;
    products::register_product(
        &txn,
        products::NewProduct {
            model: payload.model,
            category: payload.category,
            quantity: payload.quantity,
            details: payload.details,
            selling_price: payload.selling_price,
            arrival_date: payload.arrival_date,
        },
    )
    .await?;
    txn.commit().await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Product registered successfully"
        })),
    )
        .into_response())
}

async fn restock(
    Path(model): Path<String>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<StockChangePayload>,
) -> Result<Response, ApiError> {
    payload.validate()?;

    let txn = db.begin().await?;
    let quantity = products::restock(&txn, &model, payload.quantity, payload.change_date).await?;
    txn.commit().await?;
    Ok((
        StatusCode::OK,
        Json(json!({
            "quantity": quantity
        })),
    )
        .into_response())
}

async fn sell(
    Path(model): Path<String>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<StockChangePayload>,
) -> Result<Response, ApiError> {
    payload.validate()?;

    let txn = db.begin().await?;
    let quantity = products::sell(&txn, &model, payload.quantity, payload.change_date).await?;
    txn.commit().await?;
    Ok((
        StatusCode::OK,
        Json(json!({
            "quantity": quantity
        })),
    )
        .into_response())
}

async fn get_products(
    Query(params): Query<ProductQuery>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<Response, ApiError> {
    let grouping = products::parse_grouping(
        params.grouping.as_deref(),
        params.category,
        params.model.as_deref(),
    )?;
    let found = products::get_products(&*db, grouping, false).await?;
    Ok((StatusCode::OK, Json(found)).into_response())
}

async fn get_available_products(
    Query(params): Query<ProductQuery>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<Response, ApiError> {
    let grouping = products::parse_grouping(
        params.grouping.as_deref(),
        params.category,
        params.model.as_deref(),
    )?;
    let found = products::get_products(&*db, grouping, true).await?;
    Ok((StatusCode::OK, Json(found)).into_response())
}

async fn delete_product(
    Path(model): Path<String>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<Response, ApiError> {
    let txn = db.begin().await?;
    products::delete_product(&txn, &model).await?;
    txn.commit().await?;
    Ok((
        StatusCode::OK,
        Json(json!({
            "message": "Product deleted successfully"
        })),
    )
        .into_response())
}

async fn delete_all_products(
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<Response, ApiError> {
    let txn = db.begin().await?;
    products::delete_all(&txn).await?;
    txn.commit().await?;
    Ok((
        StatusCode::OK,
        Json(json!({
            "message": "All products deleted"
        })),
    )
        .into_response())
}

//Structs
#[derive(Deserialize, Debug, Validate)]
struct RegisterProductPayload {
    #[validate(regex(path = *MODEL_REGEX))]
    model: String,
    category: Category,
    #[validate(range(min = 0))]
    quantity: i32,
    details: Option<String>,
    #[validate(range(exclusive_min = 0.0))]
    selling_price: f32,
    arrival_date: Option<NaiveDate>,
}

#[derive(Deserialize, Debug, Validate)]
struct StockChangePayload {
    #[validate(range(min = 1))]
    quantity: i32,
    change_date: Option<NaiveDate>,
}

#[derive(Deserialize)]
struct ProductQuery {
    grouping: Option<String>,
    category: Option<Category>,
    model: Option<String>,
}

static MODEL_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\S(?:.{0,48}\S)?$").unwrap());
