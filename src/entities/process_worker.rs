//! Process/worker join entity - Labor charged to a process.
//!
//! Unique on `(process_id, worker_id)`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Process worker database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "process_workers")]
pub struct Model {
    /// Unique identifier for the association
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning process
    pub process_id: i64,
    /// Attached worker
    pub worker_id: i64,
    /// Labor cost charged to the process
    pub cost_labor: f64,
    /// Soft delete timestamp for the association itself
    pub deleted_at: Option<DateTime>,
}

/// Defines relationships between a process worker and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each association belongs to one process
    #[sea_orm(
        belongs_to = "super::process::Entity",
        from = "Column::ProcessId",
        to = "super::process::Column::Id"
    )]
    Process,
    /// Each association references one worker
    #[sea_orm(
        belongs_to = "super::worker::Entity",
        from = "Column::WorkerId",
        to = "super::worker::Column::Id"
    )]
    Worker,
}

impl Related<super::process::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Process.def()
    }
}

impl Related<super::worker::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Worker.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
