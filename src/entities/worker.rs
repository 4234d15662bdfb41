//! Worker entity - People whose labor is charged to processes.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Worker database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "workers")]
pub struct Model {
    /// Unique identifier for the worker
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Given name
    pub firstname: String,
    /// Family name
    pub lastname: String,
    /// Hourly rate charged for this worker's labor
    pub hourly_rate: f64,
    /// Soft delete timestamp - set when the worker is retired
    pub deleted_at: Option<DateTime>,
    /// When the worker was created
    pub created_at: DateTime,
    /// When the worker was last modified
    pub updated_at: DateTime,
}

/// Defines relationships between Worker and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One worker is attached to many processes
    #[sea_orm(has_many = "super::process_worker::Entity")]
    ProcessWorkers,
}

impl Related<super::process_worker::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProcessWorkers.def()
    }
}

impl Model {
    /// Whether the worker has not been retired.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }

    /// First and last name joined for display.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.firstname, self.lastname).trim().to_string()
    }
}

impl ActiveModelBehavior for ActiveModel {}
