use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

use crate::seed::ensure_indexes;

pub async fn init_db(db_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(db_url.to_owned());

    opt.max_connections(50)
        .min_connections(2)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(60))
        .sqlx_logging(true);

    let db = Database::connect(opt).await?;
    prepare_schema(&db).await?;

    Ok(db)
}

/// Create or migrate all tables from the entity definitions, then add the
/// indexes schema sync cannot express.
pub async fn prepare_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    db.get_schema_registry("catalog_server::entity::*")
        .sync(db)
        .await?;
    ensure_indexes(db).await
}
