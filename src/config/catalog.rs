//! Seed catalog loading from config.toml
//!
//! The catalog file lists materials, services and workers that should exist before the first
//! product or process is costed. Seeding is idempotent: entries whose name already matches an
//! active row are skipped.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Default catalog file location when `CATALOG_CONFIG` is not set.
pub const DEFAULT_CATALOG_PATH: &str = "config.toml";

/// Configuration structure representing the entire catalog file
#[derive(Debug, Default, Deserialize)]
pub struct CatalogConfig {
    /// Materials to seed
    #[serde(default)]
    pub materials: Vec<MaterialConfig>,
    /// Services to seed
    #[serde(default)]
    pub services: Vec<ServiceConfig>,
    /// Workers to seed
    #[serde(default)]
    pub workers: Vec<WorkerConfig>,
}

/// Configuration for a single material
#[derive(Debug, Deserialize, Clone)]
pub struct MaterialConfig {
    /// Name of the material
    pub name: String,
    /// Cost of one unit
    pub unit_cost: f64,
    /// Waste percentage, 0 to 100
    #[serde(default)]
    pub waste_percentage: f64,
}

/// Configuration for a single service
#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    /// Name of the service
    pub name: String,
    /// Catalog cost
    #[serde(default)]
    pub cost: f64,
}

/// Configuration for a single worker
#[derive(Debug, Deserialize, Clone)]
pub struct WorkerConfig {
    /// Given name
    pub firstname: String,
    /// Family name
    pub lastname: String,
    /// Hourly rate
    pub hourly_rate: f64,
}

/// Loads the seed catalog from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<CatalogConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read catalog file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse catalog file: {e}"),
    })
}

/// Path of the catalog file, from `CATALOG_CONFIG` or the default location.
#[must_use]
pub fn catalog_path() -> String {
    std::env::var("CATALOG_CONFIG").unwrap_or_else(|_| DEFAULT_CATALOG_PATH.to_string())
}
