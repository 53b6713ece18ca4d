use crate::config::DatabaseConfig;
use crate::storage::entity::{Application, FieldResponse, Form, FormField, Opening, User};
use log::info;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, DbErr,
    EntityTrait, Schema, Statement,
};
use std::time::Duration;

pub async fn establish_connection(cfg: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(cfg.url.clone());
    opt.max_connections(cfg.max_connections)
        .min_connections(cfg.min_connections)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .sqlx_logging(true)
        .sqlx_logging_level(log::LevelFilter::Debug);

    let db = Database::connect(opt).await?;

    if db.get_database_backend() == DatabaseBackend::Sqlite {
        db.execute(Statement::from_string(
            DatabaseBackend::Sqlite,
            "PRAGMA journal_mode=WAL;".to_string(),
        ))
        .await?;
        db.execute(Statement::from_string(
            DatabaseBackend::Sqlite,
            "PRAGMA foreign_keys=ON;".to_string(),
        ))
        .await?;
    }

    // Parents before children so foreign keys resolve.
    create_table(&db, User).await?;
    create_table(&db, Opening).await?;
    create_table(&db, Form).await?;
    create_table(&db, FormField).await?;
    create_table(&db, Application).await?;
    create_table(&db, FieldResponse).await?;

    // One application per email per opening.
    db.execute(Statement::from_string(
        db.get_database_backend(),
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_applications_opening_email ON applications(opening_id, email);"
            .to_string(),
    ))
    .await?;
    db.execute(Statement::from_string(
        db.get_database_backend(),
        "CREATE INDEX IF NOT EXISTS idx_field_responses_field ON field_responses(field_id);"
            .to_string(),
    ))
    .await?;

    info!("Database connection established and tables initialized.");

    Ok(db)
}

async fn create_table<E: EntityTrait>(db: &DatabaseConnection, entity: E) -> Result<(), DbErr> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);
    let stmt = builder.build(schema.create_table_from_entity(entity).if_not_exists());
    db.execute(stmt).await?;
    Ok(())
}

#[cfg(test)]
pub async fn connect_in_memory() -> DatabaseConnection {
    let cfg = DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        min_connections: 1,
    };
    establish_connection(&cfg)
        .await
        .expect("in-memory database should initialize")
}
