//! Product entity - Finished goods built from materials.
//!
//! `total_cost` is derived: it is owned by the cost recomputer and always equals the sum of the
//! line costs of the product's active bill of materials.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Unique identifier for the product
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Name of the product (e.g., "Oak table")
    pub name: String,
    /// Optional free-text description
    pub description: Option<String>,
    /// Estimated production time in minutes
    pub estimated_time: i32,
    /// Profit margin applied on top of the cost
    pub profit_margin: f64,
    /// Optional list price, used when no material cost is available
    pub price: Option<f64>,
    /// Derived material cost, `None` until the first recompute
    pub total_cost: Option<f64>,
    /// Soft delete timestamp - set when the product is retired
    pub deleted_at: Option<DateTime>,
    /// When the product was created
    pub created_at: DateTime,
    /// When the product was last modified
    pub updated_at: DateTime,
}

/// Defines relationships between Product and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One product has many material lines
    #[sea_orm(has_many = "super::product_material::Entity")]
    ProductMaterials,
    /// One product is built by many processes
    #[sea_orm(has_many = "super::process::Entity")]
    Processes,
}

impl Related<super::product_material::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductMaterials.def()
    }
}

impl Related<super::process::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Processes.def()
    }
}

impl Model {
    /// Whether the product has not been retired.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }
}

impl ActiveModelBehavior for ActiveModel {}
