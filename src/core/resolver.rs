//! Reference resolution - turns caller-supplied service, worker and material references into
//! confirmed active entity ids with the cost each line contributes.
//!
//! A batch either resolves completely or fails on the first reference that does not: an
//! explicit id that is unknown or retired aborts it with [`Error::ReferenceNotFound`]. A service
//! named but not found in the catalog is created on the spot, which is why resolution should run
//! inside the same unit of work as the writes that follow it.

use crate::{
    core::{catalog::CatalogRepository, validate},
    errors::{EntityKind, Error, Result},
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A service reference as supplied by a caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "by", rename_all = "snake_case")]
pub enum ServiceRef {
    /// An existing catalog service, optionally charged at a different cost.
    Id {
        /// Service identifier
        id: i64,
        /// Cost charged instead of the catalog cost
        #[serde(default)]
        cost_override: Option<f64>,
    },
    /// A service named free-text; created in the catalog when no active one matches.
    Name {
        /// Service name, matched trimmed and case-insensitively
        name: String,
        /// Cost charged, also used as catalog cost when the service is created
        #[serde(default)]
        cost: Option<f64>,
    },
}

impl ServiceRef {
    /// Reference by id charged at the catalog cost.
    #[must_use]
    pub const fn by_id(id: i64) -> Self {
        Self::Id {
            id,
            cost_override: None,
        }
    }

    /// Reference by name without an explicit cost.
    pub fn by_name(name: impl Into<String>) -> Self {
        Self::Name {
            name: name.into(),
            cost: None,
        }
    }
}

/// A worker reference: workers are always referenced by id, with the labor cost the caller
/// computed (typically hourly rate times hours).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorkerRef {
    /// Worker identifier
    pub worker_id: i64,
    /// Labor cost charged to the process
    #[serde(default)]
    pub cost_labor: f64,
}

/// One bill-of-material line supplied by a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialLine {
    /// Material identifier
    pub material_id: i64,
    /// Units consumed, strictly positive
    pub quantity: i32,
}

/// A service reference after resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedService {
    /// Confirmed active service id
    pub service_id: i64,
    /// Catalog name of the service
    pub service_name: String,
    /// Catalog cost at resolution time
    pub catalog_cost: f64,
    /// Cost snapshot to store on the association
    pub cost_service: f64,
}

/// A worker reference after resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedWorker {
    /// Confirmed active worker id
    pub worker_id: i64,
    /// Labor cost to store on the association
    pub cost_labor: f64,
}

/// A material line after resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedMaterial {
    /// Confirmed active material id
    pub material_id: i64,
    /// Units consumed
    pub quantity: i32,
}

/// Checks the parts of service references that need no storage.
pub fn validate_service_refs(refs: &[ServiceRef]) -> Result<()> {
    for reference in refs {
        match reference {
            ServiceRef::Id { id, cost_override } => {
                validate::id(*id, "Service")?;
                if let Some(cost) = cost_override {
                    validate::amount(*cost)?;
                }
            }
            ServiceRef::Name { name, cost } => {
                validate::name(name, "Service")?;
                if let Some(cost) = cost {
                    validate::amount(*cost)?;
                }
            }
        }
    }
    Ok(())
}

/// Checks the parts of worker references that need no storage.
pub fn validate_worker_refs(refs: &[WorkerRef]) -> Result<()> {
    for reference in refs {
        validate::id(reference.worker_id, "Worker")?;
        validate::amount(reference.cost_labor)?;
    }
    Ok(())
}

/// Checks the parts of material lines that need no storage.
pub fn validate_material_lines(lines: &[MaterialLine]) -> Result<()> {
    for line in lines {
        validate::id(line.material_id, "Material")?;
        validate::positive_quantity(line.quantity, "Material")?;
    }
    Ok(())
}

/// Resolves service references, creating catalog services for unknown names.
///
/// # Errors
/// - [`Error::ReferenceNotFound`] when an explicit id is unknown or retired
/// - [`Error::InvalidInput`] / [`Error::InvalidAmount`] for malformed references
pub async fn resolve_services<R>(repo: &R, refs: &[ServiceRef]) -> Result<Vec<ResolvedService>>
where
    R: CatalogRepository,
{
    validate_service_refs(refs)?;

    let mut resolved = Vec::with_capacity(refs.len());
    for reference in refs {
        let line = match reference {
            ServiceRef::Id { id, cost_override } => {
                let service = repo
                    .find_active_service(*id)
                    .await?
                    .ok_or_else(|| Error::not_found(EntityKind::Service, *id))?;
                ResolvedService {
                    service_id: service.id,
                    cost_service: cost_override.unwrap_or(service.cost),
                    catalog_cost: service.cost,
                    service_name: service.name,
                }
            }
            ServiceRef::Name { name, cost } => {
                let service = match repo.find_service_by_name_ci(name).await? {
                    Some(existing) => existing,
                    None => {
                        debug!("Creating catalog service '{}'", name.trim());
                        repo.create_service(name.trim(), cost.unwrap_or(0.0)).await?
                    }
                };
                ResolvedService {
                    service_id: service.id,
                    cost_service: cost.unwrap_or(service.cost),
                    catalog_cost: service.cost,
                    service_name: service.name,
                }
            }
        };
        resolved.push(line);
    }
    Ok(resolved)
}

/// Confirms every worker id is active. Labor costs pass through untouched.
///
/// # Errors
/// [`Error::ReferenceNotFound`] when a worker id is unknown or retired.
pub async fn resolve_workers<R>(repo: &R, refs: &[WorkerRef]) -> Result<Vec<ResolvedWorker>>
where
    R: CatalogRepository,
{
    validate_worker_refs(refs)?;

    let mut resolved = Vec::with_capacity(refs.len());
    for reference in refs {
        repo.find_active_worker(reference.worker_id)
            .await?
            .ok_or_else(|| Error::not_found(EntityKind::Worker, reference.worker_id))?;
        resolved.push(ResolvedWorker {
            worker_id: reference.worker_id,
            cost_labor: reference.cost_labor,
        });
    }
    Ok(resolved)
}

/// Confirms every material id is active.
///
/// # Errors
/// [`Error::ReferenceNotFound`] when a material id is unknown or retired.
pub async fn resolve_materials<R>(repo: &R, lines: &[MaterialLine]) -> Result<Vec<ResolvedMaterial>>
where
    R: CatalogRepository,
{
    validate_material_lines(lines)?;

    let mut resolved = Vec::with_capacity(lines.len());
    for line in lines {
        repo.find_active_material(line.material_id)
            .await?
            .ok_or_else(|| Error::not_found(EntityKind::Material, line.material_id))?;
        resolved.push(ResolvedMaterial {
            material_id: line.material_id,
            quantity: line.quantity,
        });
    }
    Ok(resolved)
}
