//! Process/service join entity - A service attached to a process.
//!
//! Unique on `(process_id, service_id)`. `cost_service` is the cost snapshot captured when the
//! service was attached; later catalog price changes do not affect it.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Process service database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "process_services")]
pub struct Model {
    /// Unique identifier for the association
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning process
    pub process_id: i64,
    /// Attached service
    pub service_id: i64,
    /// Cost snapshot charged to the process
    pub cost_service: f64,
    /// Soft delete timestamp for the association itself
    pub deleted_at: Option<DateTime>,
}

/// Defines relationships between a process service and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each association belongs to one process
    #[sea_orm(
        belongs_to = "super::process::Entity",
        from = "Column::ProcessId",
        to = "super::process::Column::Id"
    )]
    Process,
    /// Each association references one service
    #[sea_orm(
        belongs_to = "super::service::Entity",
        from = "Column::ServiceId",
        to = "super::service::Column::Id"
    )]
    Service,
}

impl Related<super::process::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Process.def()
    }
}

impl Related<super::service::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Service.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
