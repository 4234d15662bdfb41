//! Database configuration module.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`;
//! the compound UNIQUE indexes the join tables rely on for idempotent re-attachment are added
//! explicitly, since entity attributes only describe single-column uniqueness.
//! Services and materials also get a plain index on `name_key` for case-insensitive lookups.

use crate::entities::{
    Material, Process, ProcessService, ProcessWorker, Product, ProductMaterial, Service, Worker,
    material, process_service, process_worker, product_material, service,
};
use crate::errors::Result;
use sea_orm::sea_query::{Index, IndexCreateStatement};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use tracing::{debug, info};

/// Default database location when `DATABASE_URL` is not set.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/shopfloor.sqlite?mode=rwc";

/// Gets the database URL from environment variable or returns default `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by `DATABASE_URL`.
///
/// Falls back to a default local `SQLite` file if no environment variable is set.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    debug!("Connecting to database at {}", database_url);
    Database::connect(&database_url).await.map_err(Into::into)
}

/// Creates all tables and the join-table uniqueness indexes if they do not exist yet.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    // Parents before children
    let mut tables = vec![
        schema.create_table_from_entity(Material),
        schema.create_table_from_entity(Service),
        schema.create_table_from_entity(Worker),
        schema.create_table_from_entity(Product),
        schema.create_table_from_entity(Process),
        schema.create_table_from_entity(ProductMaterial),
        schema.create_table_from_entity(ProcessService),
        schema.create_table_from_entity(ProcessWorker),
    ];
    for table in &mut tables {
        table.if_not_exists();
        db.execute(builder.build(&*table)).await?;
    }

    let indexes = [
        unique_pair_index(
            "idx_product_materials_pair",
            ProductMaterial,
            product_material::Column::ProductId,
            product_material::Column::MaterialId,
        ),
        unique_pair_index(
            "idx_process_services_pair",
            ProcessService,
            process_service::Column::ProcessId,
            process_service::Column::ServiceId,
        ),
        unique_pair_index(
            "idx_process_workers_pair",
            ProcessWorker,
            process_worker::Column::ProcessId,
            process_worker::Column::WorkerId,
        ),
        // Retired rows keep their names, so these are not unique
        lookup_index("idx_services_name_key", Service, service::Column::NameKey),
        lookup_index("idx_materials_name_key", Material, material::Column::NameKey),
    ];
    for index in &indexes {
        db.execute(builder.build(index)).await?;
    }

    info!("Database tables and join indexes ensured");
    Ok(())
}

fn unique_pair_index<E>(name: &str, entity: E, left: E::Column, right: E::Column) -> IndexCreateStatement
where
    E: EntityTrait,
{
    Index::create()
        .name(name)
        .table(entity)
        .col(left)
        .col(right)
        .unique()
        .if_not_exists()
        .to_owned()
}

fn lookup_index<E>(name: &str, entity: E, column: E::Column) -> IndexCreateStatement
where
    E: EntityTrait,
{
    Index::create()
        .name(name)
        .table(entity)
        .col(column)
        .if_not_exists()
        .to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{MaterialModel, ProcessModel, ProcessServiceModel, ServiceModel};
    use sea_orm::QuerySelect;

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Test that tables exist by querying them
        let _: Vec<MaterialModel> = Material::find().limit(1).all(&db).await?;
        let _: Vec<ServiceModel> = Service::find().limit(1).all(&db).await?;
        let _: Vec<ProcessModel> = Process::find().limit(1).all(&db).await?;
        let _: Vec<ProcessServiceModel> = ProcessService::find().limit(1).all(&db).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_is_repeatable() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;
        Ok(())
    }

    #[test]
    fn test_database_url_falls_back_to_default() {
        if std::env::var("DATABASE_URL").is_err() {
            assert_eq!(get_database_url(), DEFAULT_DATABASE_URL);
        }
    }
}
