//! Material entity - Raw materials consumed by products.
//!
//! Each material has a unit cost and a waste percentage. The effective cost of one unit is
//! `unit_cost * (1 + waste_percentage / 100)`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Material database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "materials")]
pub struct Model {
    /// Unique identifier for the material
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-readable name (e.g., "Pine board", "Wood glue")
    pub name: String,
    /// Trimmed, lowercased name used for case-insensitive lookups
    pub name_key: String,
    /// Cost of one unit of the material
    pub unit_cost: f64,
    /// Percentage of material lost during production, 0 to 100
    pub waste_percentage: f64,
    /// Soft delete timestamp - set when the material is retired
    pub deleted_at: Option<DateTime>,
    /// When the material was created
    pub created_at: DateTime,
    /// When the material was last modified
    pub updated_at: DateTime,
}

/// Defines relationships between Material and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One material appears in many product bills of material
    #[sea_orm(has_many = "super::product_material::Entity")]
    ProductMaterials,
}

impl Related<super::product_material::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductMaterials.def()
    }
}

impl Model {
    /// Whether the material has not been retired.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }
}

impl ActiveModelBehavior for ActiveModel {}
