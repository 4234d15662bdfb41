//! Process entity - A production run of a product, with services and labor attached.
//!
//! `cost_total` is derived and owned by the cost recomputer:
//! materials cost + active service costs + active labor costs.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Process database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "processes")]
pub struct Model {
    /// Unique identifier for the process
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Name of the process (e.g., "Assembly line A")
    pub name: String,
    /// Product built by this process
    pub product_id: i64,
    /// Number of units produced
    pub quantity: i32,
    /// Total duration in minutes
    pub duration_total_minutes: i32,
    /// Derived total cost as of the last recompute
    pub cost_total: f64,
    /// Soft delete timestamp - set when the process is retired
    pub deleted_at: Option<DateTime>,
    /// When the process was created
    pub created_at: DateTime,
    /// When the process was last modified
    pub updated_at: DateTime,
}

/// Defines relationships between Process and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each process builds one product
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
    /// One process has many attached services
    #[sea_orm(has_many = "super::process_service::Entity")]
    ProcessServices,
    /// One process has many attached workers
    #[sea_orm(has_many = "super::process_worker::Entity")]
    ProcessWorkers,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl Related<super::process_service::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProcessServices.def()
    }
}

impl Related<super::process_worker::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProcessWorkers.def()
    }
}

impl Model {
    /// Whether the process has not been retired.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }
}

impl ActiveModelBehavior for ActiveModel {}
