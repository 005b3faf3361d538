pub mod auth;
pub mod carts;
pub mod products;
pub mod reviews;
pub mod users;

use axum::{middleware::from_fn, response::IntoResponse, routing::get, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::entities::user::Role;
use crate::middleware::logging::logging_middleware;

pub(crate) const ANY_ROLE: &[Role] = &[];
pub(crate) const CUSTOMER_ONLY: &[Role] = &[Role::Customer];
pub(crate) const STAFF: &[Role] = &[Role::Manager, Role::Admin];
pub(crate) const ADMIN_ONLY: &[Role] = &[Role::Admin];

pub fn create_api_router(shared_db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/", get(health))
        .nest("/api", auth::auth_router(shared_db.clone()))
        .nest("/api", users::users_router(shared_db.clone()))
        .nest("/api", products::products_router(shared_db.clone()))
        .nest("/api", carts::carts_router(shared_db.clone()))
        .nest("/api", reviews::reviews_router(shared_db))
        .layer(from_fn(logging_middleware))
}

async fn health() -> impl IntoResponse {
    "ok"
}
