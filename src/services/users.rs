use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2,
};
use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set,
};

use crate::entities::user::{self, Entity as UserEntity, Role};
use crate::error::ApiError;

pub struct NewUser {
    pub username: String,
    pub name: String,
    pub surname: String,
    pub password: String,
    pub role: Role,
}

pub struct InfoUpdate {
    pub name: String,
    pub surname: String,
    pub address: Option<String>,
    pub birthdate: Option<NaiveDate>,
}

pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| ApiError::Internal(format!("Failed to hash password: {err}")))
}

pub async fn create_user<C: ConnectionTrait>(conn: &C, new: NewUser) -> Result<(), ApiError> {
    if UserEntity::find_by_id(&new.username)
        .one(conn)
        .await?
        .is_some()
    {
        return Err(ApiError::UserAlreadyExists);
    }

    let account = user::ActiveModel {
        username: Set(new.username),
        name: Set(new.name),
        surname: Set(new.surname),
        role: Set(new.role),
        address: Set(None),
        birthdate: Set(None),
        password: Set(hash_password(&new.password)?),
    };
    account.insert(conn).await?;
    Ok(())
}

pub async fn get_users<C: ConnectionTrait>(conn: &C) -> Result<Vec<user::Model>, ApiError> {
    Ok(UserEntity::find().all(conn).await?)
}

pub async fn users_by_role<C: ConnectionTrait>(
    conn: &C,
    role: Role,
) -> Result<Vec<user::Model>, ApiError> {
    Ok(UserEntity::find()
        .filter(user::Column::Role.eq(role))
        .all(conn)
        .await?)
}

pub async fn get_user<C: ConnectionTrait>(
    conn: &C,
    username: &str,
) -> Result<user::Model, ApiError> {
    UserEntity::find_by_id(username)
        .one(conn)
        .await?
        .ok_or(ApiError::UserNotFound)
}

pub async fn update_info<C: ConnectionTrait>(
    conn: &C,
    username: &str,
    update: InfoUpdate,
) -> Result<user::Model, ApiError> {
    if let Some(birthdate) = update.birthdate {
        if birthdate > Utc::now().date_naive() {
            return Err(ApiError::DateError);
        }
    }
    let account = get_user(conn, username).await?;

    let mut account: user::ActiveModel = account.into();
    account.name = Set(update.name);
    account.surname = Set(update.surname);
    account.address = Set(update.address);
    account.birthdate = Set(update.birthdate);
    Ok(account.update(conn).await?)
}

pub async fn delete_user<C: ConnectionTrait>(conn: &C, username: &str) -> Result<(), ApiError> {
    let account = get_user(conn, username).await?;
    let account: user::ActiveModel = account.into();
    account.delete(conn).await?;
    Ok(())
}

/// Bulk delete never touches Admin accounts.
pub async fn delete_all_non_admin<C: ConnectionTrait>(conn: &C) -> Result<(), ApiError> {
    UserEntity::delete_many()
        .filter(user::Column::Role.ne(Role::Admin))
        .exec(conn)
        .await?;
    Ok(())
}
