pub mod cart;
pub mod cart_item;
pub mod product;
pub mod review;
pub mod user;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2,
};
use sea_orm::{ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait, Schema, Set};

use crate::entities::{
    cart::Entity as Cart, cart_item::Entity as CartItem, product::Entity as Product,
    review::Entity as Review, user::Entity as User,
};

pub async fn setup_schema(db: &DatabaseConnection) {
    let schema = Schema::new(db.get_database_backend());
    let create_user_table = schema.create_table_from_entity(User).if_not_exists().to_owned();
    let create_product_table = schema
        .create_table_from_entity(Product)
        .if_not_exists()
        .to_owned();
    let create_cart_table = schema.create_table_from_entity(Cart).if_not_exists().to_owned();
    let create_cart_item_table = schema
        .create_table_from_entity(CartItem)
        .if_not_exists()
        .to_owned();
    let create_review_table = schema
        .create_table_from_entity(Review)
        .if_not_exists()
        .to_owned();

    db.execute(db.get_database_backend().build(&create_user_table))
        .await
        .expect("Failed to create users schema");
    db.execute(db.get_database_backend().build(&create_product_table))
        .await
        .expect("Failed to create products schema");
    db.execute(db.get_database_backend().build(&create_cart_table))
        .await
        .expect("Failed to create carts schema");
    db.execute(db.get_database_backend().build(&create_cart_item_table))
        .await
        .expect("Failed to create cart_items schema");
    db.execute(db.get_database_backend().build(&create_review_table))
        .await
        .expect("Failed to create reviews schema");
}

/// Creates the first Admin account on an empty directory so the API is
/// reachable after a fresh start. No-op once any account exists.
pub async fn seed_admin(db: &DatabaseConnection, username: &str, password: &str) {
    let existing = User::find()
        .count(db)
        .await
        .expect("Failed to inspect users table during seed");
    if existing > 0 {
        return;
    }

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .expect("Failed to hash seed password")
        .to_string();

    let admin = user::ActiveModel {
        username: Set(username.to_owned()),
        name: Set(username.to_owned()),
        surname: Set(username.to_owned()),
        role: Set(user::Role::Admin),
        address: Set(None),
        birthdate: Set(None),
        password: Set(password_hash),
    };

    User::insert(admin)
        .exec(db)
        .await
        .expect("Failed to seed admin account");
}
