use anyhow::Result;
use sea_orm::{Database, DatabaseConnection};
use tracing::info;

/// Connect to the database via Sea-ORM
pub async fn connect(database_url: &str) -> Result<DatabaseConnection> {
    info!("Connecting to database via Sea-ORM");
    let db = Database::connect(database_url).await?;
    Ok(db)
}
