//! Shared test utilities for the costing engine.
//!
//! This module provides common helper functions for setting up test databases,
//! a fully costed fixture, and an in-memory catalog for resolver tests.

use crate::{
    core::{
        catalog::CatalogRepository,
        material,
        process::{self, NewProcess},
        product::{self, NewProduct},
        resolver::{MaterialLine, ServiceRef, WorkerRef},
        service, validate, worker,
    },
    entities,
    errors::Result,
};
use sea_orm::DatabaseConnection;
use std::cell::RefCell;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Asserts two money values agree to within half a cent.
#[track_caller]
pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 0.005,
        "expected {expected}, got {actual}"
    );
}

/// Creates a test worker with sensible defaults.
///
/// # Defaults
/// * `lastname`: "Tester"
pub async fn create_test_worker(
    db: &DatabaseConnection,
    firstname: &str,
    hourly_rate: f64,
) -> Result<entities::worker::Model> {
    worker::create_worker(db, firstname, "Tester", hourly_rate).await
}

/// Everything [`setup_costed_process`] creates.
#[derive(Debug, Clone)]
pub struct CostedProcess {
    /// "Table": 10/10% x2 + 5/0% x3 = 37
    pub product: entities::product::Model,
    /// "Assembly" of one table with painting and labor: 37 + 8 + 12 = 57
    pub process: entities::process::Model,
    /// "Painting" at 8
    pub service: entities::service::Model,
    /// "Ana Tester" at 12/h
    pub worker: entities::worker::Model,
    /// Pine (10, 10%) then Screws (5, 0%)
    pub materials: Vec<entities::material::Model>,
}

/// Builds a product and a process through the engine, with known totals.
pub async fn setup_costed_process() -> Result<(DatabaseConnection, CostedProcess)> {
    let db = setup_test_db().await?;

    let pine = material::create_material(&db, "Pine", 10.0, 10.0).await?;
    let screws = material::create_material(&db, "Screws", 5.0, 0.0).await?;

    let product = product::create_product(
        &db,
        NewProduct {
            name: "Table".to_string(),
            estimated_time: 120,
            profit_margin: 0.25,
            materials: vec![
                MaterialLine {
                    material_id: pine.id,
                    quantity: 2,
                },
                MaterialLine {
                    material_id: screws.id,
                    quantity: 3,
                },
            ],
            ..Default::default()
        },
    )
    .await?;

    let painting = service::create_service(&db, "Painting", 8.0).await?;
    let ana = create_test_worker(&db, "Ana", 12.0).await?;

    let process = process::create_process(
        &db,
        NewProcess {
            name: "Assembly".to_string(),
            product_id: product.id,
            quantity: 1,
            duration_total_minutes: 60,
            services: vec![ServiceRef::by_id(painting.id)],
            workers: vec![WorkerRef {
                worker_id: ana.id,
                cost_labor: worker::labor_cost(ana.hourly_rate, 60),
            }],
        },
    )
    .await?;

    Ok((
        db,
        CostedProcess {
            product,
            process,
            service: painting,
            worker: ana,
            materials: vec![pine, screws],
        },
    ))
}

#[derive(Default)]
struct CatalogState {
    next_id: i64,
    materials: Vec<entities::material::Model>,
    products: Vec<entities::product::Model>,
    services: Vec<entities::service::Model>,
    workers: Vec<entities::worker::Model>,
}

impl CatalogState {
    const fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-memory [`CatalogRepository`] for resolver tests.
#[derive(Default)]
pub struct InMemoryCatalog {
    state: RefCell<CatalogState>,
}

impl InMemoryCatalog {
    /// Adds an active service.
    pub fn add_service(&self, name: &str, cost: f64) -> entities::service::Model {
        let mut state = self.state.borrow_mut();
        let now = chrono::Utc::now().naive_utc();
        let model = entities::service::Model {
            id: state.next_id(),
            name: name.trim().to_string(),
            name_key: validate::name_key(name),
            cost,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        };
        state.services.push(model.clone());
        model
    }

    /// Soft deletes a service.
    pub fn retire_service(&self, id: i64) {
        let mut state = self.state.borrow_mut();
        let now = chrono::Utc::now().naive_utc();
        for service in state.services.iter_mut().filter(|s| s.id == id) {
            service.deleted_at = Some(now);
        }
    }

    /// Number of services ever stored, retired included.
    pub fn service_count(&self) -> usize {
        self.state.borrow().services.len()
    }

    /// Adds an active worker.
    pub fn add_worker(&self, firstname: &str, hourly_rate: f64) -> entities::worker::Model {
        let mut state = self.state.borrow_mut();
        let now = chrono::Utc::now().naive_utc();
        let model = entities::worker::Model {
            id: state.next_id(),
            firstname: firstname.to_string(),
            lastname: "Tester".to_string(),
            hourly_rate,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        };
        state.workers.push(model.clone());
        model
    }

    /// Soft deletes a worker.
    pub fn retire_worker(&self, id: i64) {
        let mut state = self.state.borrow_mut();
        let now = chrono::Utc::now().naive_utc();
        for worker in state.workers.iter_mut().filter(|w| w.id == id) {
            worker.deleted_at = Some(now);
        }
    }

    /// Adds an active material.
    pub fn add_material(
        &self,
        name: &str,
        unit_cost: f64,
        waste_percentage: f64,
    ) -> entities::material::Model {
        let mut state = self.state.borrow_mut();
        let now = chrono::Utc::now().naive_utc();
        let model = entities::material::Model {
            id: state.next_id(),
            name: name.trim().to_string(),
            name_key: validate::name_key(name),
            unit_cost,
            waste_percentage,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        };
        state.materials.push(model.clone());
        model
    }

    /// Soft deletes a material.
    pub fn retire_material(&self, id: i64) {
        let mut state = self.state.borrow_mut();
        let now = chrono::Utc::now().naive_utc();
        for material in state.materials.iter_mut().filter(|m| m.id == id) {
            material.deleted_at = Some(now);
        }
    }
}

impl CatalogRepository for InMemoryCatalog {
    async fn find_active_material(&self, id: i64) -> Result<Option<entities::material::Model>> {
        Ok(self
            .state
            .borrow()
            .materials
            .iter()
            .find(|m| m.id == id && m.is_active())
            .cloned())
    }

    async fn find_active_product(&self, id: i64) -> Result<Option<entities::product::Model>> {
        Ok(self
            .state
            .borrow()
            .products
            .iter()
            .find(|p| p.id == id && p.is_active())
            .cloned())
    }

    async fn find_active_service(&self, id: i64) -> Result<Option<entities::service::Model>> {
        Ok(self
            .state
            .borrow()
            .services
            .iter()
            .find(|s| s.id == id && s.is_active())
            .cloned())
    }

    async fn find_service_by_name_ci(
        &self,
        name: &str,
    ) -> Result<Option<entities::service::Model>> {
        let wanted = validate::name_key(name);
        Ok(self
            .state
            .borrow()
            .services
            .iter()
            .find(|s| s.is_active() && s.name_key == wanted)
            .cloned())
    }

    async fn create_service(&self, name: &str, cost: f64) -> Result<entities::service::Model> {
        Ok(self.add_service(name, cost))
    }

    async fn find_active_worker(&self, id: i64) -> Result<Option<entities::worker::Model>> {
        Ok(self
            .state
            .borrow()
            .workers
            .iter()
            .find(|w| w.id == id && w.is_active())
            .cloned())
    }
}
