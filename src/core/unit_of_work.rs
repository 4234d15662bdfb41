//! Unit of work - one database transaction carried through a create or update flow.
//!
//! Each step of a flow (resolve, dedup, attach, recompute) runs against the transaction held
//! here. Dropping a `UnitOfWork` without calling [`UnitOfWork::commit`] rolls everything back,
//! so an early `?` return never leaves partial associations or a stale total behind.

use crate::{
    core::{
        association,
        catalog::SeaCatalog,
        costing, dedup,
        resolver::{
            self, MaterialLine, ResolvedMaterial, ResolvedService, ResolvedWorker, ServiceRef,
            WorkerRef,
        },
    },
    errors::Result,
};
use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};
use tracing::debug;

/// An open transaction and the engine steps that run inside it.
pub struct UnitOfWork {
    txn: DatabaseTransaction,
}

impl UnitOfWork {
    /// Opens a new transaction.
    pub async fn begin(db: &DatabaseConnection) -> Result<Self> {
        let txn = db.begin().await?;
        Ok(Self { txn })
    }

    /// The underlying transaction, for base-row reads and writes.
    #[must_use]
    pub const fn conn(&self) -> &DatabaseTransaction {
        &self.txn
    }

    /// Catalog lookups that see this transaction's own writes.
    #[must_use]
    pub const fn catalog(&self) -> SeaCatalog<'_, DatabaseTransaction> {
        SeaCatalog::new(&self.txn)
    }

    /// Resolves service references and collapses duplicates.
    pub async fn resolve_services(&self, refs: &[ServiceRef]) -> Result<Vec<ResolvedService>> {
        let resolved = resolver::resolve_services(&self.catalog(), refs).await?;
        dedup::dedup(resolved)
    }

    /// Resolves worker references and collapses duplicates.
    pub async fn resolve_workers(&self, refs: &[WorkerRef]) -> Result<Vec<ResolvedWorker>> {
        let resolved = resolver::resolve_workers(&self.catalog(), refs).await?;
        dedup::dedup(resolved)
    }

    /// Resolves material lines and collapses duplicates.
    pub async fn resolve_materials(&self, lines: &[MaterialLine]) -> Result<Vec<ResolvedMaterial>> {
        let resolved = resolver::resolve_materials(&self.catalog(), lines).await?;
        dedup::dedup(resolved)
    }

    /// Deletes the process's service rows and writes the given set in their place.
    pub async fn replace_process_services(
        &self,
        process_id: i64,
        services: &[ResolvedService],
    ) -> Result<u64> {
        let removed = association::detach_all_services(&self.txn, process_id).await?;
        let inserted =
            association::attach_services_with_costs(&self.txn, process_id, services).await?;
        debug!(process_id, removed, inserted, "Replaced process services");
        Ok(inserted)
    }

    /// Deletes the process's worker rows and writes the given set in their place.
    pub async fn replace_process_workers(
        &self,
        process_id: i64,
        workers: &[ResolvedWorker],
    ) -> Result<u64> {
        let removed = association::detach_all_workers(&self.txn, process_id).await?;
        let inserted =
            association::attach_workers_with_costs(&self.txn, process_id, workers).await?;
        debug!(process_id, removed, inserted, "Replaced process workers");
        Ok(inserted)
    }

    /// Deletes the product's material lines and writes the given set in their place.
    pub async fn replace_product_materials(
        &self,
        product_id: i64,
        materials: &[ResolvedMaterial],
    ) -> Result<u64> {
        let removed = association::detach_all_materials(&self.txn, product_id).await?;
        let inserted = association::attach_materials(&self.txn, product_id, materials).await?;
        debug!(product_id, removed, inserted, "Replaced product materials");
        Ok(inserted)
    }

    /// Recomputes a process total against the transaction's current state.
    pub async fn recompute_process(&self, process_id: i64) -> Result<f64> {
        costing::recompute_process_cost(&self.txn, process_id).await
    }

    /// Recomputes a product total, then every active process building it.
    pub async fn recompute_product(&self, product_id: i64) -> Result<f64> {
        let total = costing::recompute_product_cost(&self.txn, product_id).await?;
        costing::recompute_processes_for_product(&self.txn, product_id).await?;
        Ok(total)
    }

    /// Makes every write of this unit durable.
    pub async fn commit(self) -> Result<()> {
        self.txn.commit().await.map_err(Into::into)
    }
}
