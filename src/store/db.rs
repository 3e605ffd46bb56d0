//! Database connection handling and startup schema creation.
//!
//! The connection URL is injected configuration, not process-global state.
//! There is no migration framework: the single table is created at startup
//! directly from the entity definition.

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Schema};

use crate::error::StoreError;
use crate::store::users;

/// Open a connection pool to the given database URL.
pub async fn connect(url: &str) -> Result<DatabaseConnection, StoreError> {
    Ok(Database::connect(url).await?)
}

/// Open a single-connection pool.
///
/// Required for `sqlite::memory:`, where every pooled connection would
/// otherwise see its own empty database.
pub async fn connect_single(url: &str) -> Result<DatabaseConnection, StoreError> {
    let mut options = ConnectOptions::new(url);
    options.max_connections(1);
    Ok(Database::connect(options).await?)
}

/// Create the `users` table if it does not exist.
pub async fn init_schema(db: &DatabaseConnection) -> Result<(), StoreError> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let mut statement = schema.create_table_from_entity(users::Entity);
    statement.if_not_exists();
    db.execute(backend.build(&statement)).await?;

    Ok(())
}
