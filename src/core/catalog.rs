//! Catalog repository - the lookups the costing engine needs from the rest of the system.
//!
//! The engine never reaches for a global database handle. Resolution goes through
//! [`CatalogRepository`], implemented here by [`SeaCatalog`] over any `SeaORM` connection or
//! transaction; tests swap in an in-memory catalog.

use crate::{
    config::catalog::CatalogConfig,
    core::{material, product, service, worker},
    entities::{
        material as material_entity, product as product_entity, service as service_entity,
        worker as worker_entity,
    },
    errors::Result,
};
use sea_orm::ConnectionTrait;
use tracing::{debug, info};

/// Read-active and create operations over the catalog.
#[allow(async_fn_in_trait)]
pub trait CatalogRepository {
    /// Active material by id.
    async fn find_active_material(&self, id: i64) -> Result<Option<material_entity::Model>>;

    /// Active product by id.
    async fn find_active_product(&self, id: i64) -> Result<Option<product_entity::Model>>;

    /// Active service by id.
    async fn find_active_service(&self, id: i64) -> Result<Option<service_entity::Model>>;

    /// Active service by trimmed, case-insensitive name.
    async fn find_service_by_name_ci(&self, name: &str) -> Result<Option<service_entity::Model>>;

    /// Creates a catalog service.
    async fn create_service(&self, name: &str, cost: f64) -> Result<service_entity::Model>;

    /// Active worker by id.
    async fn find_active_worker(&self, id: i64) -> Result<Option<worker_entity::Model>>;
}

/// [`CatalogRepository`] backed by a `SeaORM` connection or transaction.
pub struct SeaCatalog<'a, C> {
    conn: &'a C,
}

impl<'a, C> SeaCatalog<'a, C>
where
    C: ConnectionTrait,
{
    /// Wraps a connection or an open transaction.
    #[must_use]
    pub const fn new(conn: &'a C) -> Self {
        Self { conn }
    }
}

impl<C> CatalogRepository for SeaCatalog<'_, C>
where
    C: ConnectionTrait,
{
    async fn find_active_material(&self, id: i64) -> Result<Option<material_entity::Model>> {
        material::find_active_material(self.conn, id).await
    }

    async fn find_active_product(&self, id: i64) -> Result<Option<product_entity::Model>> {
        product::find_active_product(self.conn, id).await
    }

    async fn find_active_service(&self, id: i64) -> Result<Option<service_entity::Model>> {
        service::find_active_service(self.conn, id).await
    }

    async fn find_service_by_name_ci(&self, name: &str) -> Result<Option<service_entity::Model>> {
        service::find_service_by_name_ci(self.conn, name).await
    }

    async fn create_service(&self, name: &str, cost: f64) -> Result<service_entity::Model> {
        service::insert_service(self.conn, name, cost).await
    }

    async fn find_active_worker(&self, id: i64) -> Result<Option<worker_entity::Model>> {
        worker::find_active_worker(self.conn, id).await
    }
}

/// Counts of rows created by [`seed_catalog`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    /// Materials inserted
    pub materials: usize,
    /// Services inserted
    pub services: usize,
    /// Workers inserted
    pub workers: usize,
}

/// Inserts the catalog entries from the seed file that do not exist yet.
///
/// Entries are matched by name among active rows, so re-running the seed is a no-op.
pub async fn seed_catalog<C>(db: &C, config: &CatalogConfig) -> Result<SeedSummary>
where
    C: ConnectionTrait,
{
    let mut summary = SeedSummary::default();

    for entry in &config.materials {
        if material::find_material_by_name_ci(db, &entry.name).await?.is_some() {
            debug!("Material '{}' already present, skipping", entry.name);
            continue;
        }
        material::create_material(db, &entry.name, entry.unit_cost, entry.waste_percentage).await?;
        summary.materials += 1;
    }

    for entry in &config.services {
        if service::find_service_by_name_ci(db, &entry.name).await?.is_some() {
            debug!("Service '{}' already present, skipping", entry.name);
            continue;
        }
        service::create_service(db, &entry.name, entry.cost).await?;
        summary.services += 1;
    }

    for entry in &config.workers {
        if worker::find_worker_by_name(db, &entry.firstname, &entry.lastname)
            .await?
            .is_some()
        {
            debug!(
                "Worker '{} {}' already present, skipping",
                entry.firstname, entry.lastname
            );
            continue;
        }
        worker::create_worker(db, &entry.firstname, &entry.lastname, entry.hourly_rate).await?;
        summary.workers += 1;
    }

    info!(
        materials = summary.materials,
        services = summary.services,
        workers = summary.workers,
        "Catalog seeded"
    );
    Ok(summary)
}
