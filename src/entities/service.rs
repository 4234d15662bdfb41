//! Service entity - Catalog of outsourced or internal services with a list cost.
//!
//! Names are unique case-insensitively among active rows.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Service database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "services")]
pub struct Model {
    /// Unique identifier for the service
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Name of the service (e.g., "Painting")
    pub name: String,
    /// Trimmed, lowercased name used for case-insensitive lookups
    pub name_key: String,
    /// Catalog cost of the service
    pub cost: f64,
    /// Soft delete timestamp - set when the service is retired
    pub deleted_at: Option<DateTime>,
    /// When the service was created
    pub created_at: DateTime,
    /// When the service was last modified
    pub updated_at: DateTime,
}

/// Defines relationships between Service and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One service is attached to many processes
    #[sea_orm(has_many = "super::process_service::Entity")]
    ProcessServices,
}

impl Related<super::process_service::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProcessServices.def()
    }
}

impl Model {
    /// Whether the service has not been retired.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }
}

impl ActiveModelBehavior for ActiveModel {}
