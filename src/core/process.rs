//! Process business logic - Production runs of a product with attached services and labor.
//!
//! Create and update run as one [`UnitOfWork`]: validate, open the transaction, resolve and
//! dedup the references, write the base row, write the associations, recompute `cost_total`,
//! commit. Any failure on the way drops the unit, and with it every write made so far.

use crate::{
    core::{
        catalog::CatalogRepository,
        resolver::{self, ServiceRef, WorkerRef},
        unit_of_work::UnitOfWork,
        validate,
    },
    entities::{Process, process},
    errors::{EntityKind, Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{info, instrument};

/// Input for [`create_process`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewProcess {
    /// Display name
    pub name: String,
    /// Product being built
    pub product_id: i64,
    /// Units produced
    pub quantity: i32,
    /// Total duration in minutes
    pub duration_total_minutes: i32,
    /// Services to attach
    pub services: Vec<ServiceRef>,
    /// Workers to attach
    pub workers: Vec<WorkerRef>,
}

/// Changes applied by [`update_process`].
///
/// `None` leaves a field or relation as it is. For `services` and `workers`, `Some` replaces the
/// whole relation, so `Some(vec![])` detaches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessUpdate {
    /// New display name
    pub name: Option<String>,
    /// New owning product
    pub product_id: Option<i64>,
    /// New quantity
    pub quantity: Option<i32>,
    /// New total duration
    pub duration_total_minutes: Option<i32>,
    /// Replacement service set
    pub services: Option<Vec<ServiceRef>>,
    /// Replacement worker set
    pub workers: Option<Vec<WorkerRef>>,
}

/// Retrieves all active processes ordered by name.
pub async fn get_all_active_processes<C>(db: &C) -> Result<Vec<process::Model>>
where
    C: ConnectionTrait,
{
    Process::find()
        .filter(process::Column::DeletedAt.is_null())
        .order_by_asc(process::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a process by id, retired or not.
pub async fn get_process_by_id<C>(db: &C, process_id: i64) -> Result<Option<process::Model>>
where
    C: ConnectionTrait,
{
    Process::find_by_id(process_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds an active process by id.
pub async fn find_active_process<C>(db: &C, process_id: i64) -> Result<Option<process::Model>>
where
    C: ConnectionTrait,
{
    Process::find_by_id(process_id)
        .filter(process::Column::DeletedAt.is_null())
        .one(db)
        .await
        .map_err(Into::into)
}

/// Confirms the product a process points at is active.
async fn require_active_product(uow: &UnitOfWork, product_id: i64) -> Result<()> {
    validate::id(product_id, "Product")?;
    uow.catalog()
        .find_active_product(product_id)
        .await?
        .ok_or_else(|| Error::not_found(EntityKind::Product, product_id))?;
    Ok(())
}

/// Creates a process, attaches its services and workers, and computes its total.
///
/// # Errors
/// - [`Error::InvalidInput`] / [`Error::InvalidAmount`] for malformed input, before any write
/// - [`Error::ReferenceNotFound`] for an unknown or retired product, service id or worker id
/// - [`Error::Database`] on storage failure
///
/// Nothing is persisted on error, including services that name resolution would have created.
#[instrument(skip(db, input), fields(name = %input.name, product_id = input.product_id))]
pub async fn create_process(db: &DatabaseConnection, input: NewProcess) -> Result<process::Model> {
    let name = validate::name(&input.name, "Process")?;
    validate::id(input.product_id, "Product")?;
    validate::non_negative(input.quantity, "Process quantity")?;
    validate::non_negative(input.duration_total_minutes, "Process duration")?;
    resolver::validate_service_refs(&input.services)?;
    resolver::validate_worker_refs(&input.workers)?;

    let uow = UnitOfWork::begin(db).await?;

    require_active_product(&uow, input.product_id).await?;
    // Workers never write, so an unknown worker fails before any service is created
    let workers = uow.resolve_workers(&input.workers).await?;
    let services = uow.resolve_services(&input.services).await?;

    let now = chrono::Utc::now().naive_utc();
    let process = process::ActiveModel {
        name: Set(name),
        product_id: Set(input.product_id),
        quantity: Set(input.quantity),
        duration_total_minutes: Set(input.duration_total_minutes),
        cost_total: Set(0.0),
        deleted_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(uow.conn())
    .await?;

    uow.replace_process_services(process.id, &services).await?;
    uow.replace_process_workers(process.id, &workers).await?;
    let total = uow.recompute_process(process.id).await?;

    let process = get_process_by_id(uow.conn(), process.id)
        .await?
        .ok_or(Error::ProcessNotFound { id: process.id })?;
    uow.commit().await?;

    info!(
        process_id = process.id,
        services = services.len(),
        workers = workers.len(),
        total,
        "Process created"
    );
    Ok(process)
}

/// Applies an update to an active process.
///
/// Each relation given as `Some` is deleted and reattached; the total is recomputed once at the
/// end so it reflects the final state of every relation.
///
/// # Errors
/// [`Error::ProcessNotFound`] for an unknown or retired process, plus everything
/// [`create_process`] can return. Nothing is persisted on error.
#[instrument(skip(db, changes))]
pub async fn update_process(
    db: &DatabaseConnection,
    process_id: i64,
    changes: ProcessUpdate,
) -> Result<process::Model> {
    let name = changes
        .name
        .as_deref()
        .map(|n| validate::name(n, "Process"))
        .transpose()?;
    if let Some(quantity) = changes.quantity {
        validate::non_negative(quantity, "Process quantity")?;
    }
    if let Some(minutes) = changes.duration_total_minutes {
        validate::non_negative(minutes, "Process duration")?;
    }
    if let Some(services) = &changes.services {
        resolver::validate_service_refs(services)?;
    }
    if let Some(workers) = &changes.workers {
        resolver::validate_worker_refs(workers)?;
    }

    let uow = UnitOfWork::begin(db).await?;

    let mut process: process::ActiveModel = find_active_process(uow.conn(), process_id)
        .await?
        .ok_or(Error::ProcessNotFound { id: process_id })?
        .into();

    if let Some(product_id) = changes.product_id {
        require_active_product(&uow, product_id).await?;
        process.product_id = Set(product_id);
    }
    if let Some(name) = name {
        process.name = Set(name);
    }
    if let Some(quantity) = changes.quantity {
        process.quantity = Set(quantity);
    }
    if let Some(minutes) = changes.duration_total_minutes {
        process.duration_total_minutes = Set(minutes);
    }
    process.updated_at = Set(chrono::Utc::now().naive_utc());
    process.update(uow.conn()).await?;

    if let Some(refs) = &changes.workers {
        let workers = uow.resolve_workers(refs).await?;
        uow.replace_process_workers(process_id, &workers).await?;
    }
    if let Some(refs) = &changes.services {
        let services = uow.resolve_services(refs).await?;
        uow.replace_process_services(process_id, &services).await?;
    }
    let total = uow.recompute_process(process_id).await?;

    let process = get_process_by_id(uow.conn(), process_id)
        .await?
        .ok_or(Error::ProcessNotFound { id: process_id })?;
    uow.commit().await?;

    info!(process_id, total, "Process updated");
    Ok(process)
}

/// Soft deletes a process. Its association rows are kept.
pub async fn delete_process(db: &DatabaseConnection, process_id: i64) -> Result<process::Model> {
    let mut process: process::ActiveModel = find_active_process(db, process_id)
        .await?
        .ok_or(Error::ProcessNotFound { id: process_id })?
        .into();

    let now = chrono::Utc::now().naive_utc();
    process.deleted_at = Set(Some(now));
    process.updated_at = Set(now);

    let process = process.update(db).await?;
    info!(process_id, "Process retired");
    Ok(process)
}
