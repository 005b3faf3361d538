use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::DbErr;
use serde_json::json;
use thiserror::Error;
use tracing::error;
use validator::ValidationErrors;

/// Every rejection the services can produce, each mapped to one HTTP status.
/// Store failures stay opaque and outside the domain taxonomy.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("The user does not exist")]
    UserNotFound,
    #[error("The username already exists")]
    UserAlreadyExists,
    #[error("Admin accounts cannot be modified or deleted by other admins")]
    UserIsAdmin,
    #[error("You cannot access this resource")]
    Unauthorized,

    #[error("The product does not exist")]
    ProductNotFound,
    #[error("The product already exists")]
    ProductAlreadyExists,
    #[error("The product is out of stock")]
    EmptyStock,
    #[error("The requested quantity exceeds the available stock")]
    LowStock,
    #[error("Input date is not compatible with the current date")]
    DateError,

    #[error("There is no unpaid cart for this customer")]
    CartNotFound,
    #[error("The product is not in the cart")]
    ProductNotInCart,
    #[error("The cart is empty")]
    EmptyCart,
    #[error("A product in the cart is sold out")]
    ProductSoldOut,
    #[error("The available stock cannot satisfy a product in the cart")]
    InsufficientStock,

    #[error("A review for this product by this user already exists")]
    ExistingReview,
    #[error("There is no review by this user for this product")]
    NoReviewForProduct,

    #[error("No grouping was selected but a category or model filter is set")]
    IncorrectNoneGrouping,
    #[error("Grouping by category requires a category filter and no model filter")]
    IncorrectCategoryGrouping,
    #[error("Grouping by model requires a model filter and no category filter")]
    IncorrectModelGrouping,
    #[error("The grouping parameter must be one of `category` or `model`")]
    InvalidGrouping,
    #[error("The role must be one of `Customer`, `Manager` or `Admin`")]
    InvalidRole,

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Internal server error")]
    Db(#[from] DbErr),
    #[error("Internal server error")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::UserNotFound
            | ApiError::ProductNotFound
            | ApiError::CartNotFound
            | ApiError::ProductNotInCart
            | ApiError::NoReviewForProduct => StatusCode::NOT_FOUND,

            ApiError::UserAlreadyExists
            | ApiError::ProductAlreadyExists
            | ApiError::EmptyStock
            | ApiError::LowStock
            | ApiError::EmptyCart
            | ApiError::ProductSoldOut
            | ApiError::InsufficientStock
            | ApiError::ExistingReview => StatusCode::CONFLICT,

            ApiError::DateError => StatusCode::BAD_REQUEST,

            ApiError::IncorrectNoneGrouping
            | ApiError::IncorrectCategoryGrouping
            | ApiError::IncorrectModelGrouping
            | ApiError::InvalidGrouping
            | ApiError::InvalidRole
            | ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,

            ApiError::UserIsAdmin | ApiError::Unauthorized => StatusCode::UNAUTHORIZED,

            ApiError::Db(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Db(err) => error!(error = %err, "Store operation failed"),
            ApiError::Internal(detail) => error!(detail = %detail, "Internal failure"),
            _ => {}
        }
        (
            self.status(),
            Json(json!({
                "error": self.to_string()
            })),
        )
            .into_response()
    }
}
