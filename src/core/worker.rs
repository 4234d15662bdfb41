//! Worker business logic - People whose labor is charged to processes.

use crate::{
    core::{costing, validate},
    entities::{Worker, worker},
    errors::{EntityKind, Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::info;

/// Labor cost of a worker for a given duration: `hourly_rate * minutes / 60`.
///
/// This is the caller-side computation used to fill a worker reference's labor cost; the
/// engine itself never derives labor from rates.
#[must_use]
pub fn labor_cost(hourly_rate: f64, duration_minutes: i32) -> f64 {
    hourly_rate * f64::from(duration_minutes) / 60.0
}

/// Retrieves all active workers ordered by last name.
pub async fn get_all_active_workers<C>(db: &C) -> Result<Vec<worker::Model>>
where
    C: ConnectionTrait,
{
    Worker::find()
        .filter(worker::Column::DeletedAt.is_null())
        .order_by_asc(worker::Column::Lastname)
        .order_by_asc(worker::Column::Firstname)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds an active worker by id.
pub async fn find_active_worker<C>(db: &C, worker_id: i64) -> Result<Option<worker::Model>>
where
    C: ConnectionTrait,
{
    Worker::find_by_id(worker_id)
        .filter(worker::Column::DeletedAt.is_null())
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds an active worker by exact first and last name.
pub async fn find_worker_by_name<C>(
    db: &C,
    firstname: &str,
    lastname: &str,
) -> Result<Option<worker::Model>>
where
    C: ConnectionTrait,
{
    Worker::find()
        .filter(worker::Column::DeletedAt.is_null())
        .filter(worker::Column::Firstname.eq(firstname.trim()))
        .filter(worker::Column::Lastname.eq(lastname.trim()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a new worker.
///
/// # Errors
/// Returns an error if either name part is blank, the hourly rate is negative or not finite,
/// or the insert fails.
pub async fn create_worker<C>(
    db: &C,
    firstname: &str,
    lastname: &str,
    hourly_rate: f64,
) -> Result<worker::Model>
where
    C: ConnectionTrait,
{
    let firstname = validate::name(firstname, "Worker first")?;
    let lastname = validate::name(lastname, "Worker last")?;
    let hourly_rate = validate::amount(hourly_rate)?;

    let now = chrono::Utc::now().naive_utc();
    let worker = worker::ActiveModel {
        firstname: Set(firstname),
        lastname: Set(lastname),
        hourly_rate: Set(hourly_rate),
        deleted_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    worker.insert(db).await.map_err(Into::into)
}

/// Fields of a worker that [`update_worker`] may change. `None` leaves a field alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkerUpdate {
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub hourly_rate: Option<f64>,
}

/// Renames a worker or changes the hourly rate.
///
/// Process labor costs are snapshots supplied by callers, so no total is recomputed.
///
/// # Errors
/// Returns an error if a new name part is blank, the rate is negative or not finite, or the
/// worker is not active.
pub async fn update_worker(
    db: &DatabaseConnection,
    worker_id: i64,
    changes: WorkerUpdate,
) -> Result<worker::Model> {
    let firstname = changes
        .firstname
        .as_deref()
        .map(|n| validate::name(n, "Worker first"))
        .transpose()?;
    let lastname = changes
        .lastname
        .as_deref()
        .map(|n| validate::name(n, "Worker last"))
        .transpose()?;
    let hourly_rate = changes.hourly_rate.map(validate::amount).transpose()?;

    let mut worker: worker::ActiveModel = find_active_worker(db, worker_id)
        .await?
        .ok_or_else(|| Error::not_found(EntityKind::Worker, worker_id))?
        .into();

    if let Some(firstname) = firstname {
        worker.firstname = Set(firstname);
    }
    if let Some(lastname) = lastname {
        worker.lastname = Set(lastname);
    }
    if let Some(hourly_rate) = hourly_rate {
        worker.hourly_rate = Set(hourly_rate);
    }
    worker.updated_at = Set(chrono::Utc::now().naive_utc());
    let worker = worker.update(db).await?;

    info!(worker_id, "Worker updated");
    Ok(worker)
}

/// Soft deletes a worker and recomputes every active process the worker was attached to.
pub async fn delete_worker(db: &DatabaseConnection, worker_id: i64) -> Result<worker::Model> {
    let txn = db.begin().await?;

    let mut worker: worker::ActiveModel = find_active_worker(&txn, worker_id)
        .await?
        .ok_or_else(|| Error::not_found(EntityKind::Worker, worker_id))?
        .into();

    let now = chrono::Utc::now().naive_utc();
    worker.deleted_at = Set(Some(now));
    worker.updated_at = Set(now);
    let worker = worker.update(&txn).await?;

    let touched = costing::recompute_processes_using_worker(&txn, worker_id).await?;

    txn.commit().await?;
    info!(worker_id, processes = touched.len(), "Worker retired");
    Ok(worker)
}
