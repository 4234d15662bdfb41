//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod material;
pub mod process;
pub mod process_service;
pub mod process_worker;
pub mod product;
pub mod product_material;
pub mod service;
pub mod worker;

// Re-export specific types to avoid conflicts
pub use material::{Column as MaterialColumn, Entity as Material, Model as MaterialModel};
pub use process::{Column as ProcessColumn, Entity as Process, Model as ProcessModel};
pub use process_service::{
    Column as ProcessServiceColumn, Entity as ProcessService, Model as ProcessServiceModel,
};
pub use process_worker::{
    Column as ProcessWorkerColumn, Entity as ProcessWorker, Model as ProcessWorkerModel,
};
pub use product::{Column as ProductColumn, Entity as Product, Model as ProductModel};
pub use product_material::{
    Column as ProductMaterialColumn, Entity as ProductMaterial, Model as ProductMaterialModel,
};
pub use service::{Column as ServiceColumn, Entity as Service, Model as ServiceModel};
pub use worker::{Column as WorkerColumn, Entity as Worker, Model as WorkerModel};
