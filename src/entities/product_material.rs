//! Product/material join entity - One line of a product's bill of materials.
//!
//! Unique on `(product_id, material_id)`. `line_cost` is a cached display value rewritten on
//! every product recompute.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product material line database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product_materials")]
pub struct Model {
    /// Unique identifier for the line
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning product
    pub product_id: i64,
    /// Material consumed
    pub material_id: i64,
    /// Number of material units consumed, always positive
    pub quantity: i32,
    /// `unit_cost * (1 + waste / 100) * quantity` as of the last recompute
    pub line_cost: f64,
    /// Soft delete timestamp for the line itself
    pub deleted_at: Option<DateTime>,
}

/// Defines relationships between a material line and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each line belongs to one product
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
    /// Each line references one material
    #[sea_orm(
        belongs_to = "super::material::Entity",
        from = "Column::MaterialId",
        to = "super::material::Column::Id"
    )]
    Material,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl Related<super::material::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Material.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
