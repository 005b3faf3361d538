use sea_orm::{Database, DatabaseConnection};
use std::sync::Arc;

use electrostore::api::create_api_router;
use electrostore::entities::{seed_admin, setup_schema};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let db: DatabaseConnection = Database::connect(&database_url)
        .await
        .expect("Failed to connect to the database");
    setup_schema(&db).await;

    let admin_username = std::env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_owned());
    let admin_password = std::env::var("ADMIN_PASSWORD").expect("ADMIN_PASSWORD must be set");
    seed_admin(&db, &admin_username, &admin_password).await;

    let shared_db = Arc::new(db);

    let app = create_api_router(shared_db);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000")
        .await
        .expect("Failed to bind 0.0.0.0:3000");
    tracing::info!("Running at {:?}", listener.local_addr());
    axum::serve(listener, app).await.expect("Server error");
}
