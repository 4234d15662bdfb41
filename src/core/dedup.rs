//! Duplicate collapsing for resolved references.
//!
//! Every relation kind follows the same merge policy: entries sharing a resolved id collapse
//! into the slot of the first occurrence, monetary amounts (and material quantities) are
//! summed, and descriptive fields are taken from the last occurrence. Nothing a caller asked
//! for is silently dropped. A merged material quantity that no longer fits an `i32` is rejected.

use crate::{
    core::resolver::{ResolvedMaterial, ResolvedService, ResolvedWorker},
    errors::{Error, Result},
};
use std::collections::HashMap;

/// A resolved line that can be merged with another line for the same entity.
pub trait Mergeable {
    /// Resolved entity id used as the dedup key.
    fn key(&self) -> i64;

    /// Folds a later duplicate into this line.
    fn merge(&mut self, later: Self) -> Result<()>;
}

impl Mergeable for ResolvedService {
    fn key(&self) -> i64 {
        self.service_id
    }

    fn merge(&mut self, later: Self) -> Result<()> {
        self.cost_service += later.cost_service;
        self.service_name = later.service_name;
        self.catalog_cost = later.catalog_cost;
        Ok(())
    }
}

impl Mergeable for ResolvedWorker {
    fn key(&self) -> i64 {
        self.worker_id
    }

    fn merge(&mut self, later: Self) -> Result<()> {
        self.cost_labor += later.cost_labor;
        Ok(())
    }
}

impl Mergeable for ResolvedMaterial {
    fn key(&self) -> i64 {
        self.material_id
    }

    fn merge(&mut self, later: Self) -> Result<()> {
        self.quantity = self.quantity.checked_add(later.quantity).ok_or_else(|| {
            Error::invalid(format!(
                "Merged quantity for material {} is too large",
                self.material_id
            ))
        })?;
        Ok(())
    }
}

/// Collapses lines sharing the same key, keeping first-occurrence order.
///
/// # Errors
/// Returns [`Error::InvalidInput`] if merging two lines overflows.
pub fn dedup<T>(lines: Vec<T>) -> Result<Vec<T>>
where
    T: Mergeable,
{
    let mut slots: HashMap<i64, usize> = HashMap::with_capacity(lines.len());
    let mut out: Vec<T> = Vec::with_capacity(lines.len());

    for line in lines {
        let key = line.key();
        match slots.get(&key).copied() {
            Some(slot) => out[slot].merge(line)?,
            None => {
                slots.insert(key, out.len());
                out.push(line);
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;

    fn service(id: i64, name: &str, cost: f64) -> ResolvedService {
        ResolvedService {
            service_id: id,
            service_name: name.to_string(),
            catalog_cost: cost,
            cost_service: cost,
        }
    }

    #[test]
    fn test_same_service_twice_yields_one_line_with_summed_cost() {
        let lines = dedup(vec![service(1, "Painting", 8.0), service(1, "Painting", 2.0)]).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].cost_service, 10.0);
    }

    #[test]
    fn test_first_occurrence_order_is_kept() {
        let lines = dedup(vec![
            service(2, "Sanding", 3.0),
            service(1, "Painting", 8.0),
            service(2, "Sanding (renamed)", 1.0),
        ])
        .unwrap();
        let ids: Vec<i64> = lines.iter().map(|s| s.service_id).collect();
        assert_eq!(ids, vec![2, 1]);
        assert_eq!(lines[0].service_name, "Sanding (renamed)");
        assert_eq!(lines[0].cost_service, 4.0);
    }

    #[test]
    fn test_workers_labor_is_summed() {
        let lines = dedup(vec![
            ResolvedWorker {
                worker_id: 5,
                cost_labor: 12.0,
            },
            ResolvedWorker {
                worker_id: 6,
                cost_labor: 3.0,
            },
            ResolvedWorker {
                worker_id: 5,
                cost_labor: 6.0,
            },
        ])
        .unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].cost_labor, 18.0);
        assert_eq!(lines[1].cost_labor, 3.0);
    }

    #[test]
    fn test_material_quantities_are_summed() {
        let lines = dedup(vec![
            ResolvedMaterial {
                material_id: 9,
                quantity: 2,
            },
            ResolvedMaterial {
                material_id: 9,
                quantity: 3,
            },
        ])
        .unwrap();
        assert_eq!(
            lines,
            vec![ResolvedMaterial {
                material_id: 9,
                quantity: 5
            }]
        );
    }

    #[test]
    fn test_empty_input() {
        let lines: Vec<ResolvedWorker> = dedup(Vec::new()).unwrap();
        assert!(lines.is_empty());
    }

    #[test]
    fn test_material_quantity_overflow_is_rejected() {
        let result = dedup(vec![
            ResolvedMaterial {
                material_id: 9,
                quantity: i32::MAX,
            },
            ResolvedMaterial {
                material_id: 9,
                quantity: 1,
            },
        ]);
        assert!(matches!(result.unwrap_err(), Error::InvalidInput { message: _ }));
    }
}
