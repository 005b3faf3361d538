use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set,
};
use serde::Serialize;

use crate::entities::{
    cart::{self, Entity as CartEntity},
    cart_item::{self, Entity as CartItemEntity},
    product::{self, Category, Entity as ProductEntity},
};
use crate::error::ApiError;

/// A cart as the API reports it. The conceptual empty cart (no row yet)
/// serializes the same way as a stored one.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub customer: String,
    pub paid: bool,
    pub payment_date: Option<chrono::NaiveDate>,
    pub total: f32,
    pub products: Vec<CartLine>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CartLine {
    pub model: String,
    pub quantity: i32,
    pub category: Category,
    pub price: f32,
}

impl From<cart_item::Model> for CartLine {
    fn from(item: cart_item::Model) -> CartLine {
        CartLine {
            model: item.model,
            quantity: item.quantity,
            category: item.category,
            price: item.price,
        }
    }
}

impl CartView {
    fn empty(customer: &str) -> CartView {
        CartView {
            customer: customer.to_owned(),
            paid: false,
            payment_date: None,
            total: 0.0,
            products: vec![],
        }
    }

    fn assemble(cart: cart::Model, items: Vec<cart_item::Model>) -> CartView {
        CartView {
            customer: cart.customer,
            paid: cart.paid,
            payment_date: cart.payment_date,
            total: cart.total,
            products: items.into_iter().map(CartLine::from).collect(),
        }
    }
}

async fn find_active<C: ConnectionTrait>(
    conn: &C,
    customer: &str,
) -> Result<Option<cart::Model>, ApiError> {
    let cart = CartEntity::find()
        .filter(cart::Column::Customer.eq(customer))
        .filter(cart::Column::Paid.eq(false))
        .one(conn)
        .await?;
    Ok(cart)
}

async fn items_of<C: ConnectionTrait>(
    conn: &C,
    cart_id: i32,
) -> Result<Vec<cart_item::Model>, ApiError> {
    let items = CartItemEntity::find()
        .filter(cart_item::Column::CartId.eq(cart_id))
        .all(conn)
        .await?;
    Ok(items)
}

/// The customer's unpaid cart. Absence is not a failure: a customer who
/// never added anything gets an empty cart back.
pub async fn active_cart<C: ConnectionTrait>(
    conn: &C,
    customer: &str,
) -> Result<CartView, ApiError> {
    match find_active(conn, customer).await? {
        Some(cart) => {
            let items = items_of(conn, cart.id).await?;
            Ok(CartView::assemble(cart, items))
        }
        None => Ok(CartView::empty(customer)),
    }
}

/// Adds one unit of `model` to the customer's unpaid cart, creating the
/// cart on first use. Stock is only checked here, not decremented: the
/// authoritative decrement happens at checkout.
pub async fn add_to_cart<C: ConnectionTrait>(
    conn: &C,
    customer: &str,
    model: &str,
) -> Result<(), ApiError> {
    let prod = ProductEntity::find_by_id(model)
        .one(conn)
        .await?
        .ok_or(ApiError::ProductNotFound)?;
    if prod.quantity <= 0 {
        return Err(ApiError::EmptyStock);
    }

    let cart = match find_active(conn, customer).await? {
        Some(cart) => cart,
        None => {
            let new_cart = cart::ActiveModel {
                customer: Set(customer.to_owned()),
                paid: Set(false),
                payment_date: Set(None),
                total: Set(0.0),
                ..Default::default()
            };
            new_cart.insert(conn).await?
        }
    };

    let existing = CartItemEntity::find()
        .filter(cart_item::Column::CartId.eq(cart.id))
        .filter(cart_item::Column::Model.eq(model))
        .one(conn)
        .await?;
    match existing {
        Some(item) => {
            let quantity = item.quantity;
            let mut item: cart_item::ActiveModel = item.into();
            item.quantity = Set(quantity + 1);
            item.update(conn).await?;
        }
        None => {
            let new_item = cart_item::ActiveModel {
                cart_id: Set(cart.id),
                model: Set(model.to_owned()),
                quantity: Set(1),
                category: Set(prod.category),
                price: Set(prod.selling_price),
                ..Default::default()
            };
            new_item.insert(conn).await?;
        }
    }

    let total = cart.total;
    let mut cart: cart::ActiveModel = cart.into();
    cart.total = Set(total + prod.selling_price);
    cart.update(conn).await?;
    Ok(())
}

/// Removes one unit of `model`, deleting the line item when it hits zero.
pub async fn remove_one_unit<C: ConnectionTrait>(
    conn: &C,
    customer: &str,
    model: &str,
) -> Result<(), ApiError> {
    ProductEntity::find_by_id(model)
        .one(conn)
        .await?
        .ok_or(ApiError::ProductNotFound)?;

    let cart = find_active(conn, customer)
        .await?
        .ok_or(ApiError::CartNotFound)?;
    let items = items_of(conn, cart.id).await?;
    if items.is_empty() {
        return Err(ApiError::CartNotFound);
    }

    let item = items
        .into_iter()
        .find(|item| item.model == model)
        .ok_or(ApiError::ProductNotInCart)?;

    let price = item.price;
    if item.quantity <= 1 {
        let item: cart_item::ActiveModel = item.into();
        item.delete(conn).await?;
    } else {
        let quantity = item.quantity;
        let mut item: cart_item::ActiveModel = item.into();
        item.quantity = Set(quantity - 1);
        item.update(conn).await?;
    }

    let total = cart.total;
    let mut cart: cart::ActiveModel = cart.into();
    cart.total = Set(total - price);
    cart.update(conn).await?;
    Ok(())
}

/// Empties the unpaid cart. The cart row survives, unpaid and at zero.
pub async fn clear_cart<C: ConnectionTrait>(conn: &C, customer: &str) -> Result<(), ApiError> {
    let cart = find_active(conn, customer)
        .await?
        .ok_or(ApiError::CartNotFound)?;

    CartItemEntity::delete_many()
        .filter(cart_item::Column::CartId.eq(cart.id))
        .exec(conn)
        .await?;

    let mut cart: cart::ActiveModel = cart.into();
    cart.total = Set(0.0);
    cart.update(conn).await?;
    Ok(())
}

/// Pays for the unpaid cart. Every line item's stock is re-checked against
/// current availability before anything is written; the caller's
/// transaction makes the decrements plus the paid transition all-or-nothing.
pub async fn checkout<C: ConnectionTrait>(conn: &C, customer: &str) -> Result<(), ApiError> {
    let cart = find_active(conn, customer)
        .await?
        .ok_or(ApiError::CartNotFound)?;
    let items = items_of(conn, cart.id).await?;
    if items.is_empty() {
        return Err(ApiError::EmptyCart);
    }

    let mut decrements: Vec<(product::Model, i32)> = Vec::with_capacity(items.len());
    for item in &items {
        let prod = ProductEntity::find_by_id(&item.model)
            .one(conn)
            .await?
            .ok_or(ApiError::ProductNotFound)?;
        if prod.quantity == 0 {
            return Err(ApiError::ProductSoldOut);
        }
        if prod.quantity < item.quantity {
            return Err(ApiError::InsufficientStock);
        }
        decrements.push((prod, item.quantity));
    }

    for (prod, sold) in decrements {
        let remaining = prod.quantity - sold;
        let mut prod: product::ActiveModel = prod.into();
        prod.quantity = Set(remaining);
        prod.update(conn).await?;
    }

    let mut cart: cart::ActiveModel = cart.into();
    cart.paid = Set(true);
    cart.payment_date = Set(Some(Utc::now().date_naive()));
    cart.update(conn).await?;
    Ok(())
}

/// The customer's checkout history, line items included.
pub async fn paid_carts<C: ConnectionTrait>(
    conn: &C,
    customer: &str,
) -> Result<Vec<CartView>, ApiError> {
    let carts = CartEntity::find()
        .filter(cart::Column::Customer.eq(customer))
        .filter(cart::Column::Paid.eq(true))
        .find_with_related(CartItemEntity)
        .all(conn)
        .await?;
    Ok(carts
        .into_iter()
        .map(|(cart, items)| CartView::assemble(cart, items))
        .collect())
}

pub async fn all_carts<C: ConnectionTrait>(conn: &C) -> Result<Vec<CartView>, ApiError> {
    let carts = CartEntity::find()
        .find_with_related(CartItemEntity)
        .all(conn)
        .await?;
    Ok(carts
        .into_iter()
        .map(|(cart, items)| CartView::assemble(cart, items))
        .collect())
}

pub async fn delete_all<C: ConnectionTrait>(conn: &C) -> Result<(), ApiError> {
    CartItemEntity::delete_many().exec(conn).await?;
    CartEntity::delete_many().exec(conn).await?;
    Ok(())
}
