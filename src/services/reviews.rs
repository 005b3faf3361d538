use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set,
};

use crate::entities::{
    product::Entity as ProductEntity,
    review::{self, Entity as ReviewEntity},
};
use crate::error::ApiError;

async fn require_product<C: ConnectionTrait>(conn: &C, model: &str) -> Result<(), ApiError> {
    ProductEntity::find_by_id(model)
        .one(conn)
        .await?
        .ok_or(ApiError::ProductNotFound)?;
    Ok(())
}

async fn find_review<C: ConnectionTrait>(
    conn: &C,
    model: &str,
    username: &str,
) -> Result<Option<review::Model>, ApiError> {
    let existing = ReviewEntity::find()
        .filter(review::Column::Model.eq(model))
        .filter(review::Column::Username.eq(username))
        .one(conn)
        .await?;
    Ok(existing)
}

/// One review per (product, user); the review is dated today.
pub async fn add_review<C: ConnectionTrait>(
    conn: &C,
    model: &str,
    username: &str,
    score: i32,
    comment: String,
) -> Result<(), ApiError> {
    require_product(conn, model).await?;
    if find_review(conn, model, username).await?.is_some() {
        return Err(ApiError::ExistingReview);
    }

    let new_review = review::ActiveModel {
        model: Set(model.to_owned()),
        username: Set(username.to_owned()),
        score: Set(score),
        date: Set(Utc::now().date_naive()),
        comment: Set(comment),
        ..Default::default()
    };
    new_review.insert(conn).await?;
    Ok(())
}

pub async fn product_reviews<C: ConnectionTrait>(
    conn: &C,
    model: &str,
) -> Result<Vec<review::Model>, ApiError> {
    require_product(conn, model).await?;
    let reviews = ReviewEntity::find()
        .filter(review::Column::Model.eq(model))
        .all(conn)
        .await?;
    Ok(reviews)
}

pub async fn delete_review<C: ConnectionTrait>(
    conn: &C,
    model: &str,
    username: &str,
) -> Result<(), ApiError> {
    require_product(conn, model).await?;
    let existing = find_review(conn, model, username)
        .await?
        .ok_or(ApiError::NoReviewForProduct)?;
    let existing: review::ActiveModel = existing.into();
    existing.delete(conn).await?;
    Ok(())
}

pub async fn delete_reviews_of_product<C: ConnectionTrait>(
    conn: &C,
    model: &str,
) -> Result<(), ApiError> {
    require_product(conn, model).await?;
    ReviewEntity::delete_many()
        .filter(review::Column::Model.eq(model))
        .exec(conn)
        .await?;
    Ok(())
}

pub async fn delete_all<C: ConnectionTrait>(conn: &C) -> Result<(), ApiError> {
    ReviewEntity::delete_many().exec(conn).await?;
    Ok(())
}
