use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set,
};

use crate::entities::product::{self, Category, Entity as ProductEntity};
use crate::error::ApiError;

pub struct NewProduct {
    pub model: String,
    pub category: Category,
    pub quantity: i32,
    pub details: Option<String>,
    pub selling_price: f32,
    pub arrival_date: Option<NaiveDate>,
}

/// Query selector for the catalog: all products, one category, or one model.
#[derive(Debug, Clone, PartialEq)]
pub enum Grouping {
    All,
    ByCategory(Category),
    ByModel(String),
}

/// Validates the grouping-parameter combination: exactly one of
/// {none, category, model}, with the matching filter present and the
/// other absent. Each mismatch has its own rejection.
pub fn parse_grouping(
    grouping: Option<&str>,
    category: Option<Category>,
    model: Option<&str>,
) -> Result<Grouping, ApiError> {
    match grouping {
        None => {
            if category.is_some() || model.is_some() {
                Err(ApiError::IncorrectNoneGrouping)
            } else {
                Ok(Grouping::All)
            }
        }
        Some("category") => match (category, model) {
            (Some(category), None) => Ok(Grouping::ByCategory(category)),
            _ => Err(ApiError::IncorrectCategoryGrouping),
        },
        Some("model") => match (category, model) {
            (None, Some(model)) if !model.is_empty() => Ok(Grouping::ByModel(model.to_owned())),
            _ => Err(ApiError::IncorrectModelGrouping),
        },
        Some(_) => Err(ApiError::InvalidGrouping),
    }
}

pub async fn register_product<C: ConnectionTrait>(
    conn: &C,
    new: NewProduct,
) -> Result<(), ApiError> {
    if let Some(arrival) = new.arrival_date {
        if arrival > Utc::now().date_naive() {
            return Err(ApiError::DateError);
        }
    }
    if ProductEntity::find_by_id(&new.model).one(conn).await?.is_some() {
        return Err(ApiError::ProductAlreadyExists);
    }

    let prod = product::ActiveModel {
        model: Set(new.model),
        category: Set(new.category),
        quantity: Set(new.quantity),
        details: Set(new.details),
        selling_price: Set(new.selling_price),
        arrival_date: Set(new.arrival_date),
    };
    prod.insert(conn).await?;
    Ok(())
}

/// The date of a stock change must not precede the arrival date or fall in
/// the future. A missing date means today.
fn resolve_change_date(
    date: Option<NaiveDate>,
    arrival: Option<NaiveDate>,
) -> Result<NaiveDate, ApiError> {
    let today = Utc::now().date_naive();
    let date = date.unwrap_or(today);
    if date > today {
        return Err(ApiError::DateError);
    }
    if let Some(arrival) = arrival {
        if date < arrival {
            return Err(ApiError::DateError);
        }
    }
    Ok(date)
}

/// Additive stock change. Returns the new available quantity.
pub async fn restock<C: ConnectionTrait>(
    conn: &C,
    model: &str,
    quantity: i32,
    change_date: Option<NaiveDate>,
) -> Result<i32, ApiError> {
    let prod = ProductEntity::find_by_id(model)
        .one(conn)
        .await?
        .ok_or(ApiError::ProductNotFound)?;
    resolve_change_date(change_date, prod.arrival_date)?;

    let new_quantity = prod.quantity + quantity;
    let mut prod: product::ActiveModel = prod.into();
    prod.quantity = Set(new_quantity);
    prod.update(conn).await?;
    Ok(new_quantity)
}

/// Direct sale outside any cart. Returns the remaining quantity.
pub async fn sell<C: ConnectionTrait>(
    conn: &C,
    model: &str,
    quantity: i32,
    selling_date: Option<NaiveDate>,
) -> Result<i32, ApiError> {
    let prod = ProductEntity::find_by_id(model)
        .one(conn)
        .await?
        .ok_or(ApiError::ProductNotFound)?;
    resolve_change_date(selling_date, prod.arrival_date)?;

    if prod.quantity == 0 {
        return Err(ApiError::EmptyStock);
    }
    if quantity > prod.quantity {
        return Err(ApiError::LowStock);
    }

    let new_quantity = prod.quantity - quantity;
    let mut prod: product::ActiveModel = prod.into();
    prod.quantity = Set(new_quantity);
    prod.update(conn).await?;
    Ok(new_quantity)
}

pub async fn get_products<C: ConnectionTrait>(
    conn: &C,
    grouping: Grouping,
    available_only: bool,
) -> Result<Vec<product::Model>, ApiError> {
    match grouping {
        Grouping::ByModel(model) => {
            let prod = ProductEntity::find_by_id(&model)
                .one(conn)
                .await?
                .ok_or(ApiError::ProductNotFound)?;
            if available_only && prod.quantity <= 0 {
                return Ok(vec![]);
            }
            Ok(vec![prod])
        }
        Grouping::ByCategory(category) => {
            let mut query = ProductEntity::find().filter(product::Column::Category.eq(category));
            if available_only {
                query = query.filter(product::Column::Quantity.gt(0));
            }
            Ok(query.all(conn).await?)
        }
        Grouping::All => {
            let mut query = ProductEntity::find();
            if available_only {
                query = query.filter(product::Column::Quantity.gt(0));
            }
            Ok(query.all(conn).await?)
        }
    }
}

pub async fn delete_product<C: ConnectionTrait>(conn: &C, model: &str) -> Result<(), ApiError> {
    let prod = ProductEntity::find_by_id(model)
        .one(conn)
        .await?
        .ok_or(ApiError::ProductNotFound)?;
    let prod: product::ActiveModel = prod.into();
    prod.delete(conn).await?;
    Ok(())
}

pub async fn delete_all<C: ConnectionTrait>(conn: &C) -> Result<(), ApiError> {
    ProductEntity::delete_many().exec(conn).await?;
    Ok(())
}
