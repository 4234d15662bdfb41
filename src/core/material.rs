//! Material business logic - Raw materials consumed by product bills of material.
//!
//! Changing a material's cost inputs, or retiring it, invalidates the total of every product
//! that uses it and of every process building those products. Both flows therefore run the
//! cascading recompute inside the same transaction as the material write.
//!
//! Names are unique among active materials, compared through the stored `name_key`.

use crate::{
    core::{costing, validate},
    entities::{Material, material},
    errors::{EntityKind, Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{info, instrument};

/// Retrieves all active materials ordered by name.
pub async fn get_all_active_materials<C>(db: &C) -> Result<Vec<material::Model>>
where
    C: ConnectionTrait,
{
    Material::find()
        .filter(material::Column::DeletedAt.is_null())
        .order_by_asc(material::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds an active material by id.
pub async fn find_active_material<C>(db: &C, material_id: i64) -> Result<Option<material::Model>>
where
    C: ConnectionTrait,
{
    Material::find_by_id(material_id)
        .filter(material::Column::DeletedAt.is_null())
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds an active material by name, case-insensitively.
pub async fn find_material_by_name_ci<C>(db: &C, name: &str) -> Result<Option<material::Model>>
where
    C: ConnectionTrait,
{
    Material::find()
        .filter(material::Column::DeletedAt.is_null())
        .filter(material::Column::NameKey.eq(validate::name_key(name)))
        .order_by_asc(material::Column::Id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a new material.
///
/// The waste percentage is only checked for being a finite non-negative number; keeping it
/// within 0..=100 is the caller's job.
///
/// # Errors
/// Returns an error if the name is blank or already taken by an active material, the unit cost
/// or waste percentage is negative or not finite, or the insert fails.
pub async fn create_material<C>(
    db: &C,
    name: &str,
    unit_cost: f64,
    waste_percentage: f64,
) -> Result<material::Model>
where
    C: ConnectionTrait,
{
    let name = validate::name(name, "Material")?;
    let unit_cost = validate::amount(unit_cost)?;
    let waste_percentage = validate::amount(waste_percentage)?;

    if find_material_by_name_ci(db, &name).await?.is_some() {
        return Err(Error::DuplicateName { name });
    }

    let now = chrono::Utc::now().naive_utc();
    let material = material::ActiveModel {
        name_key: Set(validate::name_key(&name)),
        name: Set(name),
        unit_cost: Set(unit_cost),
        waste_percentage: Set(waste_percentage),
        deleted_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    material.insert(db).await.map_err(Into::into)
}

/// Fields of a material that [`update_material`] may change. `None` leaves a field alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterialUpdate {
    pub name: Option<String>,
    pub unit_cost: Option<f64>,
    pub waste_percentage: Option<f64>,
}

/// Renames a material or changes its cost inputs, then recomputes every product using it and
/// every process building those products.
///
/// # Errors
/// Returns an error if a new name is blank or taken by another active material, an amount is
/// negative or not finite, or the material is not active.
#[instrument(skip(db))]
pub async fn update_material(
    db: &DatabaseConnection,
    material_id: i64,
    changes: MaterialUpdate,
) -> Result<material::Model> {
    let name = changes
        .name
        .as_deref()
        .map(|n| validate::name(n, "Material"))
        .transpose()?;
    let unit_cost = changes.unit_cost.map(validate::amount).transpose()?;
    let waste_percentage = changes.waste_percentage.map(validate::amount).transpose()?;

    let txn = db.begin().await?;

    let mut material: material::ActiveModel = find_active_material(&txn, material_id)
        .await?
        .ok_or_else(|| Error::not_found(EntityKind::Material, material_id))?
        .into();

    if let Some(name) = name {
        let taken = find_material_by_name_ci(&txn, &name)
            .await?
            .is_some_and(|other| other.id != material_id);
        if taken {
            return Err(Error::DuplicateName { name });
        }
        material.name_key = Set(validate::name_key(&name));
        material.name = Set(name);
    }
    if let Some(unit_cost) = unit_cost {
        material.unit_cost = Set(unit_cost);
    }
    if let Some(waste_percentage) = waste_percentage {
        material.waste_percentage = Set(waste_percentage);
    }
    material.updated_at = Set(chrono::Utc::now().naive_utc());
    let material = material.update(&txn).await?;

    let products = costing::recompute_products_using_material(&txn, material_id).await?;

    txn.commit().await?;
    info!(material_id, products = products.len(), "Material updated");
    Ok(material)
}

/// Soft deletes a material and recomputes the products and processes that depended on it.
///
/// The bill-of-material lines pointing at the material are kept; recomputes skip them.
#[instrument(skip(db))]
pub async fn delete_material(db: &DatabaseConnection, material_id: i64) -> Result<material::Model> {
    let txn = db.begin().await?;

    let mut material: material::ActiveModel = find_active_material(&txn, material_id)
        .await?
        .ok_or_else(|| Error::not_found(EntityKind::Material, material_id))?
        .into();

    let now = chrono::Utc::now().naive_utc();
    material.deleted_at = Set(Some(now));
    material.updated_at = Set(now);
    let material = material.update(&txn).await?;

    let products = costing::recompute_products_using_material(&txn, material_id).await?;

    txn.commit().await?;
    info!(material_id, products = products.len(), "Material retired");
    Ok(material)
}
