//! Service business logic - Catalog services that can be attached to processes.
//!
//! Service names are unique case-insensitively among active rows. Every row stores a
//! `name_key` (trimmed, Unicode-lowercased name) and lookups compare against it by equality,
//! which is what lets the resolver create a service on the fly without producing near-duplicates.

use crate::{
    core::{costing, validate},
    entities::{Service, service},
    errors::{EntityKind, Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::info;

/// Retrieves all active services, newest first.
pub async fn get_all_active_services<C>(db: &C) -> Result<Vec<service::Model>>
where
    C: ConnectionTrait,
{
    Service::find()
        .filter(service::Column::DeletedAt.is_null())
        .order_by_desc(service::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds an active service by id.
pub async fn find_active_service<C>(db: &C, service_id: i64) -> Result<Option<service::Model>>
where
    C: ConnectionTrait,
{
    Service::find_by_id(service_id)
        .filter(service::Column::DeletedAt.is_null())
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds an active service whose name matches case-insensitively after trimming.
pub async fn find_service_by_name_ci<C>(db: &C, name: &str) -> Result<Option<service::Model>>
where
    C: ConnectionTrait,
{
    Service::find()
        .filter(service::Column::DeletedAt.is_null())
        .filter(service::Column::NameKey.eq(validate::name_key(name)))
        .order_by_asc(service::Column::Id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Inserts a service row without checking for name clashes.
///
/// Callers are expected to have looked the name up first; the resolver does so inside the
/// same transaction.
pub async fn insert_service<C>(db: &C, name: &str, cost: f64) -> Result<service::Model>
where
    C: ConnectionTrait,
{
    let now = chrono::Utc::now().naive_utc();
    let service = service::ActiveModel {
        name: Set(name.trim().to_string()),
        name_key: Set(validate::name_key(name)),
        cost: Set(cost),
        deleted_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    service.insert(db).await.map_err(Into::into)
}

/// Creates a new catalog service after validating the name and cost.
///
/// # Errors
/// Returns an error if:
/// - The name is empty or whitespace-only
/// - The cost is negative or not finite
/// - An active service already uses the name (case-insensitive)
/// - The database insert operation fails
pub async fn create_service<C>(db: &C, name: &str, cost: f64) -> Result<service::Model>
where
    C: ConnectionTrait,
{
    let name = validate::name(name, "Service")?;
    let cost = validate::amount(cost)?;

    if find_service_by_name_ci(db, &name).await?.is_some() {
        return Err(Error::DuplicateName { name });
    }

    insert_service(db, &name, cost).await
}

/// Changes applied by [`update_service`]. `None` leaves a field as it is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceUpdate {
    /// New name, must stay unique among active services
    pub name: Option<String>,
    /// New catalog cost
    pub cost: Option<f64>,
}

/// Renames a service and/or changes its catalog cost.
///
/// Cost snapshots already attached to processes are left alone, so no recompute is needed.
///
/// # Errors
/// Returns an error if the service is unknown or retired, the new name is blank or used by
/// another active service, the cost is negative or not finite, or the update fails.
pub async fn update_service(
    db: &DatabaseConnection,
    service_id: i64,
    changes: ServiceUpdate,
) -> Result<service::Model> {
    let name = changes
        .name
        .as_deref()
        .map(|n| validate::name(n, "Service"))
        .transpose()?;
    let cost = changes.cost.map(validate::amount).transpose()?;

    let txn = db.begin().await?;

    let mut service: service::ActiveModel = find_active_service(&txn, service_id)
        .await?
        .ok_or_else(|| Error::not_found(EntityKind::Service, service_id))?
        .into();

    if let Some(name) = name {
        let taken = find_service_by_name_ci(&txn, &name)
            .await?
            .is_some_and(|other| other.id != service_id);
        if taken {
            return Err(Error::DuplicateName { name });
        }
        service.name_key = Set(validate::name_key(&name));
        service.name = Set(name);
    }
    if let Some(cost) = cost {
        service.cost = Set(cost);
    }
    service.updated_at = Set(chrono::Utc::now().naive_utc());
    let service = service.update(&txn).await?;

    txn.commit().await?;
    info!(service_id, "Service updated");
    Ok(service)
}

/// Soft deletes a service and recomputes every active process it was attached to.
///
/// The association rows are kept; the recompute simply stops counting them.
pub async fn delete_service(db: &DatabaseConnection, service_id: i64) -> Result<service::Model> {
    let txn = db.begin().await?;

    let mut service: service::ActiveModel = find_active_service(&txn, service_id)
        .await?
        .ok_or_else(|| Error::not_found(EntityKind::Service, service_id))?
        .into();

    let now = chrono::Utc::now().naive_utc();
    service.deleted_at = Set(Some(now));
    service.updated_at = Set(now);
    let service = service.update(&txn).await?;

    let touched = costing::recompute_processes_using_service(&txn, service_id).await?;

    txn.commit().await?;
    info!(service_id, processes = touched.len(), "Service retired");
    Ok(service)
}
