//! Association writer - persists resolved references as join rows.
//!
//! Inserts use `ON CONFLICT DO NOTHING` on each join table's compound key, so attaching a pair
//! that already exists is a no-op rather than an error. Rows written through a transaction are
//! visible to the recomputer running on the same transaction.

use crate::{
    core::resolver::{ResolvedMaterial, ResolvedService, ResolvedWorker},
    entities::{
        ProcessService, ProcessWorker, ProductMaterial, process_service, process_worker,
        product_material,
    },
    errors::Result,
};
use sea_orm::sea_query::OnConflict;
use sea_orm::{Set, prelude::*};
use tracing::debug;

/// Attaches services to a process with their cost snapshots. Returns the number of new rows.
pub async fn attach_services_with_costs<C>(
    db: &C,
    process_id: i64,
    services: &[ResolvedService],
) -> Result<u64>
where
    C: ConnectionTrait,
{
    if services.is_empty() {
        return Ok(0);
    }

    let rows = services.iter().map(|s| process_service::ActiveModel {
        process_id: Set(process_id),
        service_id: Set(s.service_id),
        cost_service: Set(s.cost_service),
        deleted_at: Set(None),
        ..Default::default()
    });

    let inserted = ProcessService::insert_many(rows)
        .on_conflict(
            OnConflict::columns([
                process_service::Column::ProcessId,
                process_service::Column::ServiceId,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    debug!(process_id, inserted, requested = services.len(), "Attached services");
    Ok(inserted)
}

/// Attaches workers to a process with their labor costs. Returns the number of new rows.
pub async fn attach_workers_with_costs<C>(
    db: &C,
    process_id: i64,
    workers: &[ResolvedWorker],
) -> Result<u64>
where
    C: ConnectionTrait,
{
    if workers.is_empty() {
        return Ok(0);
    }

    let rows = workers.iter().map(|w| process_worker::ActiveModel {
        process_id: Set(process_id),
        worker_id: Set(w.worker_id),
        cost_labor: Set(w.cost_labor),
        deleted_at: Set(None),
        ..Default::default()
    });

    let inserted = ProcessWorker::insert_many(rows)
        .on_conflict(
            OnConflict::columns([
                process_worker::Column::ProcessId,
                process_worker::Column::WorkerId,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    debug!(process_id, inserted, requested = workers.len(), "Attached workers");
    Ok(inserted)
}

/// Attaches material lines to a product. `line_cost` starts at zero; the product recompute
/// fills it in. Returns the number of new rows.
pub async fn attach_materials<C>(
    db: &C,
    product_id: i64,
    materials: &[ResolvedMaterial],
) -> Result<u64>
where
    C: ConnectionTrait,
{
    if materials.is_empty() {
        return Ok(0);
    }

    let rows = materials.iter().map(|m| product_material::ActiveModel {
        product_id: Set(product_id),
        material_id: Set(m.material_id),
        quantity: Set(m.quantity),
        line_cost: Set(0.0),
        deleted_at: Set(None),
        ..Default::default()
    });

    let inserted = ProductMaterial::insert_many(rows)
        .on_conflict(
            OnConflict::columns([
                product_material::Column::ProductId,
                product_material::Column::MaterialId,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    debug!(product_id, inserted, requested = materials.len(), "Attached materials");
    Ok(inserted)
}

/// Removes every service association of a process ahead of a reattach.
pub async fn detach_all_services<C>(db: &C, process_id: i64) -> Result<u64>
where
    C: ConnectionTrait,
{
    let result = ProcessService::delete_many()
        .filter(process_service::Column::ProcessId.eq(process_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

/// Removes every worker association of a process ahead of a reattach.
pub async fn detach_all_workers<C>(db: &C, process_id: i64) -> Result<u64>
where
    C: ConnectionTrait,
{
    let result = ProcessWorker::delete_many()
        .filter(process_worker::Column::ProcessId.eq(process_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

/// Removes every material line of a product ahead of a reattach.
pub async fn detach_all_materials<C>(db: &C, product_id: i64) -> Result<u64>
where
    C: ConnectionTrait,
{
    let result = ProductMaterial::delete_many()
        .filter(product_material::Column::ProductId.eq(product_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}
