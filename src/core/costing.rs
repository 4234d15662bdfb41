//! Cost recomputation - derives and persists product and process totals.
//!
//! Totals are never adjusted incrementally. Every recompute reads back the active inputs
//! (join rows whose own `deleted_at` is unset and whose target is not retired), sums them, and
//! overwrites the derived column. Running a recompute twice with no writes in between yields the
//! same value and the same stored state.
//!
//! All functions are generic over `ConnectionTrait` so they run against a plain connection or
//! inside the transaction of the flow that changed the inputs.

use crate::{
    entities::{
        Material, Process, ProcessService, ProcessWorker, Product, ProductMaterial, Service,
        Worker, process, process_service, process_worker, product, product_material, service,
        worker,
    },
    errors::{Error, Result},
};
use sea_orm::sea_query::Expr;
use sea_orm::{QueryOrder, Set, prelude::*};
use std::collections::BTreeSet;
use tracing::{debug, info, instrument};

/// Cost of one bill-of-material line: `unit_cost * (1 + waste / 100) * quantity`.
#[must_use]
pub fn material_line_cost(unit_cost: f64, waste_percentage: f64, quantity: i32) -> f64 {
    unit_cost * (1.0 + waste_percentage / 100.0) * f64::from(quantity)
}

/// Rounds a monetary value to two decimal places for presentation.
#[must_use]
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Materials share of a process: the product's derived total when it has one, otherwise the
/// product's list price times the process quantity, otherwise zero.
#[must_use]
pub fn materials_cost(product: Option<&product::Model>, quantity: i32) -> f64 {
    match product {
        Some(product::Model {
            total_cost: Some(total),
            ..
        }) => *total,
        Some(product::Model {
            price: Some(price), ..
        }) => price * f64::from(quantity),
        _ => 0.0,
    }
}

/// The components of a process total.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CostBreakdown {
    /// Materials share, see [`materials_cost`]
    pub materials: f64,
    /// Sum of active service cost snapshots
    pub services: f64,
    /// Sum of active labor costs
    pub labor: f64,
}

impl CostBreakdown {
    /// `materials + services + labor`
    #[must_use]
    pub fn total(&self) -> f64 {
        self.materials + self.services + self.labor
    }
}

/// A service line counted in a process total.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceLine {
    /// Association row id
    pub id: i64,
    /// Attached service id
    pub service_id: i64,
    /// Catalog name
    pub name: String,
    /// Current catalog cost
    pub catalog_cost: f64,
    /// Cost snapshot charged to the process
    pub cost_service: f64,
}

/// A labor line counted in a process total.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerLine {
    /// Association row id
    pub id: i64,
    /// Attached worker id
    pub worker_id: i64,
    /// Worker display name
    pub name: String,
    /// Labor cost charged to the process
    pub cost_labor: f64,
}

/// Read model of a process with everything that feeds its total.
#[derive(Debug, Clone)]
pub struct ProcessCostReport {
    /// The process as stored
    pub process: process::Model,
    /// The owning product, if it still exists
    pub product: Option<product::Model>,
    /// Active service lines
    pub services: Vec<ServiceLine>,
    /// Active labor lines
    pub workers: Vec<WorkerLine>,
    /// Components of the total
    pub breakdown: CostBreakdown,
}

/// Number of entities touched by [`recompute_all`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecomputeSummary {
    /// Products recomputed
    pub products: usize,
    /// Processes recomputed
    pub processes: usize,
}

/// Service associations of a process that still count: row active and service not retired.
pub async fn active_service_lines<C>(db: &C, process_id: i64) -> Result<Vec<ServiceLine>>
where
    C: ConnectionTrait,
{
    let rows = ProcessService::find()
        .filter(process_service::Column::ProcessId.eq(process_id))
        .filter(process_service::Column::DeletedAt.is_null())
        .order_by_asc(process_service::Column::Id)
        .find_also_related(Service)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .filter_map(|(row, target)| {
            target.filter(service::Model::is_active).map(|s| ServiceLine {
                id: row.id,
                service_id: row.service_id,
                name: s.name,
                catalog_cost: s.cost,
                cost_service: row.cost_service,
            })
        })
        .collect())
}

/// Worker associations of a process that still count: row active and worker not retired.
pub async fn active_worker_lines<C>(db: &C, process_id: i64) -> Result<Vec<WorkerLine>>
where
    C: ConnectionTrait,
{
    let rows = ProcessWorker::find()
        .filter(process_worker::Column::ProcessId.eq(process_id))
        .filter(process_worker::Column::DeletedAt.is_null())
        .order_by_asc(process_worker::Column::Id)
        .find_also_related(Worker)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .filter_map(|(row, target)| {
            target.filter(worker::Model::is_active).map(|w| WorkerLine {
                id: row.id,
                worker_id: row.worker_id,
                name: w.full_name(),
                cost_labor: row.cost_labor,
            })
        })
        .collect())
}

/// Loads a process, its product and its active lines without writing anything.
///
/// # Errors
/// [`Error::ProcessNotFound`] if the process does not exist or is retired.
pub async fn process_cost_breakdown<C>(db: &C, process_id: i64) -> Result<ProcessCostReport>
where
    C: ConnectionTrait,
{
    let (process, product) = Process::find_by_id(process_id)
        .find_also_related(Product)
        .one(db)
        .await?
        .filter(|(p, _)| p.is_active())
        .ok_or(Error::ProcessNotFound { id: process_id })?;

    let services = active_service_lines(db, process_id).await?;
    let workers = active_worker_lines(db, process_id).await?;

    let breakdown = CostBreakdown {
        materials: materials_cost(product.as_ref(), process.quantity),
        services: services.iter().map(|s| s.cost_service).sum(),
        labor: workers.iter().map(|w| w.cost_labor).sum(),
    };

    Ok(ProcessCostReport {
        process,
        product,
        services,
        workers,
        breakdown,
    })
}

/// Recomputes and stores `cost_total` for a process, returning the new total.
///
/// # Errors
/// [`Error::ProcessNotFound`] if the process does not exist or is retired; storage errors.
#[instrument(skip(db))]
pub async fn recompute_process_cost<C>(db: &C, process_id: i64) -> Result<f64>
where
    C: ConnectionTrait,
{
    let report = process_cost_breakdown(db, process_id).await?;
    let total = report.breakdown.total();

    Process::update_many()
        .col_expr(process::Column::CostTotal, Expr::value(total))
        .filter(process::Column::Id.eq(process_id))
        .exec(db)
        .await?;

    debug!(
        process_id,
        materials = report.breakdown.materials,
        services = report.breakdown.services,
        labor = report.breakdown.labor,
        total,
        "Process cost recomputed"
    );
    Ok(total)
}

/// Recomputes every active material line of a product, stores each `line_cost`, then stores
/// their sum as the product's `total_cost`. Returns the new total.
///
/// Lines that are soft-deleted, or whose material is retired, are skipped and do not count.
///
/// # Errors
/// [`Error::ProductNotFound`] if the product does not exist or is retired; storage errors.
#[instrument(skip(db))]
pub async fn recompute_product_cost<C>(db: &C, product_id: i64) -> Result<f64>
where
    C: ConnectionTrait,
{
    Product::find_by_id(product_id)
        .filter(product::Column::DeletedAt.is_null())
        .one(db)
        .await?
        .ok_or(Error::ProductNotFound { id: product_id })?;

    let lines = ProductMaterial::find()
        .filter(product_material::Column::ProductId.eq(product_id))
        .filter(product_material::Column::DeletedAt.is_null())
        .order_by_asc(product_material::Column::Id)
        .find_also_related(Material)
        .all(db)
        .await?;

    let mut total = 0.0;
    for (line, material) in lines {
        let Some(material) = material.filter(|m| m.is_active()) else {
            continue;
        };
        let cost = material_line_cost(material.unit_cost, material.waste_percentage, line.quantity);
        total += cost;

        let mut line: product_material::ActiveModel = line.into();
        line.line_cost = Set(cost);
        line.update(db).await?;
    }

    Product::update_many()
        .col_expr(product::Column::TotalCost, Expr::value(Some(total)))
        .filter(product::Column::Id.eq(product_id))
        .exec(db)
        .await?;

    debug!(product_id, total, "Product cost recomputed");
    Ok(total)
}

/// Recomputes every active process building the given product.
pub async fn recompute_processes_for_product<C>(db: &C, product_id: i64) -> Result<Vec<i64>>
where
    C: ConnectionTrait,
{
    let process_ids: Vec<i64> = Process::find()
        .filter(process::Column::ProductId.eq(product_id))
        .filter(process::Column::DeletedAt.is_null())
        .all(db)
        .await?
        .into_iter()
        .map(|p| p.id)
        .collect();

    for process_id in &process_ids {
        recompute_process_cost(db, *process_id).await?;
    }
    Ok(process_ids)
}

/// Recomputes every active product whose bill of materials mentions the material, then the
/// processes building those products. Returns the product ids touched.
pub async fn recompute_products_using_material<C>(db: &C, material_id: i64) -> Result<Vec<i64>>
where
    C: ConnectionTrait,
{
    let product_ids: BTreeSet<i64> = ProductMaterial::find()
        .filter(product_material::Column::MaterialId.eq(material_id))
        .filter(product_material::Column::DeletedAt.is_null())
        .find_also_related(Product)
        .all(db)
        .await?
        .into_iter()
        .filter_map(|(_, product)| product.filter(product::Model::is_active).map(|p| p.id))
        .collect();

    for product_id in &product_ids {
        recompute_product_cost(db, *product_id).await?;
        recompute_processes_for_product(db, *product_id).await?;
    }
    Ok(product_ids.into_iter().collect())
}

/// Recomputes every active process the service is attached to. Returns the process ids.
pub async fn recompute_processes_using_service<C>(db: &C, service_id: i64) -> Result<Vec<i64>>
where
    C: ConnectionTrait,
{
    let process_ids: BTreeSet<i64> = ProcessService::find()
        .filter(process_service::Column::ServiceId.eq(service_id))
        .find_also_related(Process)
        .all(db)
        .await?
        .into_iter()
        .filter_map(|(_, process)| process.filter(process::Model::is_active).map(|p| p.id))
        .collect();

    for process_id in &process_ids {
        recompute_process_cost(db, *process_id).await?;
    }
    Ok(process_ids.into_iter().collect())
}

/// Recomputes every active process the worker is attached to. Returns the process ids.
pub async fn recompute_processes_using_worker<C>(db: &C, worker_id: i64) -> Result<Vec<i64>>
where
    C: ConnectionTrait,
{
    let process_ids: BTreeSet<i64> = ProcessWorker::find()
        .filter(process_worker::Column::WorkerId.eq(worker_id))
        .find_also_related(Process)
        .all(db)
        .await?
        .into_iter()
        .filter_map(|(_, process)| process.filter(process::Model::is_active).map(|p| p.id))
        .collect();

    for process_id in &process_ids {
        recompute_process_cost(db, *process_id).await?;
    }
    Ok(process_ids.into_iter().collect())
}

/// Recomputes every active product, then every active process.
///
/// Products go first because process totals read the product totals.
pub async fn recompute_all<C>(db: &C) -> Result<RecomputeSummary>
where
    C: ConnectionTrait,
{
    let products = Product::find()
        .filter(product::Column::DeletedAt.is_null())
        .all(db)
        .await?;
    for product in &products {
        recompute_product_cost(db, product.id).await?;
    }

    let processes = Process::find()
        .filter(process::Column::DeletedAt.is_null())
        .all(db)
        .await?;
    for process in &processes {
        recompute_process_cost(db, process.id).await?;
    }

    let summary = RecomputeSummary {
        products: products.len(),
        processes: processes.len(),
    };
    info!(
        products = summary.products,
        processes = summary.processes,
        "Recompute pass finished"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;

    fn product_with(total_cost: Option<f64>, price: Option<f64>) -> product::Model {
        let now = chrono::Utc::now().naive_utc();
        product::Model {
            id: 1,
            name: "Table".to_string(),
            description: None,
            estimated_time: 60,
            profit_margin: 0.3,
            price,
            total_cost,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_material_line_cost() {
        assert_close(material_line_cost(10.0, 10.0, 2), 22.0);
        assert_eq!(material_line_cost(5.0, 0.0, 3), 15.0);
        assert_eq!(material_line_cost(5.0, 100.0, 1), 10.0);
    }

    #[test]
    fn test_round_cents() {
        assert_eq!(round_cents(37.000_000_000_000_01), 37.0);
        assert_eq!(round_cents(1.005_1), 1.01);
        assert_eq!(round_cents(2.344), 2.34);
    }

    #[test]
    fn test_materials_cost_fallbacks() {
        let with_total = product_with(Some(37.0), Some(100.0));
        assert_eq!(materials_cost(Some(&with_total), 4), 37.0);

        let priced_only = product_with(None, Some(12.5));
        assert_eq!(materials_cost(Some(&priced_only), 4), 50.0);

        let neither = product_with(None, None);
        assert_eq!(materials_cost(Some(&neither), 4), 0.0);
        assert_eq!(materials_cost(None, 4), 0.0);
    }

    #[tokio::test]
    async fn test_product_total_from_two_materials() -> Result<()> {
        let (db, fixture) = setup_costed_process().await?;

        let total = recompute_product_cost(&db, fixture.product.id).await?;
        assert_close(total, 37.0);

        let lines = ProductMaterial::find()
            .filter(product_material::Column::ProductId.eq(fixture.product.id))
            .order_by_asc(product_material::Column::Id)
            .all(&db)
            .await?;
        assert_close(lines[0].line_cost, 22.0);
        assert_close(lines[1].line_cost, 15.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_process_total_adds_services_and_labor() -> Result<()> {
        let (db, fixture) = setup_costed_process().await?;

        let total = recompute_process_cost(&db, fixture.process.id).await?;
        assert_close(total, 57.0);

        let report = process_cost_breakdown(&db, fixture.process.id).await?;
        assert_close(report.breakdown.materials, 37.0);
        assert_close(report.breakdown.services, 8.0);
        assert_close(report.breakdown.labor, 12.0);
        assert_eq!(report.services.len(), 1);
        assert_eq!(report.workers.len(), 1);
        assert_eq!(report.workers[0].name, "Ana Tester");
        Ok(())
    }

    #[tokio::test]
    async fn test_recompute_is_idempotent() -> Result<()> {
        let (db, fixture) = setup_costed_process().await?;

        let first = recompute_process_cost(&db, fixture.process.id).await?;
        let stored_first = Process::find_by_id(fixture.process.id).one(&db).await?.unwrap();
        let second = recompute_process_cost(&db, fixture.process.id).await?;
        let stored_second = Process::find_by_id(fixture.process.id).one(&db).await?.unwrap();
        assert_eq!(first, second);
        assert_eq!(stored_first, stored_second);

        let p1 = recompute_product_cost(&db, fixture.product.id).await?;
        let p2 = recompute_product_cost(&db, fixture.product.id).await?;
        assert_eq!(p1, p2);
        Ok(())
    }

    #[tokio::test]
    async fn test_soft_deleted_join_row_is_excluded() -> Result<()> {
        let (db, fixture) = setup_costed_process().await?;

        let row = ProcessService::find()
            .filter(process_service::Column::ProcessId.eq(fixture.process.id))
            .one(&db)
            .await?
            .unwrap();
        let mut row: process_service::ActiveModel = row.into();
        row.deleted_at = Set(Some(chrono::Utc::now().naive_utc()));
        row.update(&db).await?;

        let total = recompute_process_cost(&db, fixture.process.id).await?;
        assert_close(total, 49.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_recompute_missing_entities() -> Result<()> {
        let db = setup_test_db().await?;

        let result = recompute_process_cost(&db, 404).await;
        assert!(matches!(result.unwrap_err(), Error::ProcessNotFound { id: 404 }));

        let result = recompute_product_cost(&db, 404).await;
        assert!(matches!(result.unwrap_err(), Error::ProductNotFound { id: 404 }));
        Ok(())
    }

    #[tokio::test]
    async fn test_recompute_all_heals_stale_totals() -> Result<()> {
        let (db, fixture) = setup_costed_process().await?;

        Process::update_many()
            .col_expr(process::Column::CostTotal, Expr::value(0.0))
            .filter(process::Column::Id.eq(fixture.process.id))
            .exec(&db)
            .await?;

        let summary = recompute_all(&db).await?;
        assert_eq!(
            summary,
            RecomputeSummary {
                products: 1,
                processes: 1
            }
        );

        let process = Process::find_by_id(fixture.process.id).one(&db).await?.unwrap();
        assert_close(process.cost_total, 57.0);
        Ok(())
    }
}
