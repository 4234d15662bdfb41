//! Product business logic - Products and their bills of material.
//!
//! A product's `total_cost` is owned by the cost recomputer: callers never set it. Creating a
//! product or replacing its materials runs in one [`UnitOfWork`] that writes the base row,
//! resolves and attaches the material lines, then recomputes the product and every active
//! process building it before committing.

use crate::{
    core::{resolver::MaterialLine, unit_of_work::UnitOfWork, validate},
    entities::{Product, product},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{info, instrument};

/// Input for [`create_product`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewProduct {
    /// Display name
    pub name: String,
    /// Free-text description
    pub description: Option<String>,
    /// Estimated production time in minutes
    pub estimated_time: i32,
    /// Profit margin as a fraction, strictly positive
    pub profit_margin: f64,
    /// Optional list price, used when no material total exists
    pub price: Option<f64>,
    /// Bill of materials
    pub materials: Vec<MaterialLine>,
}

/// Changes applied by [`update_product`]. `None` leaves a field as it is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductUpdate {
    /// New display name
    pub name: Option<String>,
    /// New description
    pub description: Option<String>,
    /// New estimated production time
    pub estimated_time: Option<i32>,
    /// New profit margin
    pub profit_margin: Option<f64>,
    /// New list price
    pub price: Option<f64>,
    /// Replacement bill of materials; an empty list removes every line
    pub materials: Option<Vec<MaterialLine>>,
}

/// Retrieves all active products, ordered alphabetically by name.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_all_active_products<C>(db: &C) -> Result<Vec<product::Model>>
where
    C: ConnectionTrait,
{
    Product::find()
        .filter(product::Column::DeletedAt.is_null())
        .order_by_asc(product::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a product by id, retired or not.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_product_by_id<C>(db: &C, product_id: i64) -> Result<Option<product::Model>>
where
    C: ConnectionTrait,
{
    Product::find_by_id(product_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds an active product by id.
pub async fn find_active_product<C>(db: &C, product_id: i64) -> Result<Option<product::Model>>
where
    C: ConnectionTrait,
{
    Product::find_by_id(product_id)
        .filter(product::Column::DeletedAt.is_null())
        .one(db)
        .await
        .map_err(Into::into)
}

fn validate_fields(
    estimated_time: Option<i32>,
    profit_margin: Option<f64>,
    price: Option<f64>,
) -> Result<()> {
    if let Some(minutes) = estimated_time {
        validate::non_negative(minutes, "Estimated time")?;
    }
    if let Some(margin) = profit_margin {
        validate::positive_amount(margin)?;
    }
    if let Some(price) = price {
        validate::amount(price)?;
    }
    Ok(())
}

/// Creates a product with its bill of materials and computes its total.
///
/// # Errors
/// Returns an error if:
/// - The name is blank, or a numeric field is negative or not finite
/// - A material line has a non-positive quantity or names an unknown/retired material
/// - Any database operation fails (nothing is persisted in that case)
#[instrument(skip(db, input), fields(name = %input.name))]
pub async fn create_product(db: &DatabaseConnection, input: NewProduct) -> Result<product::Model> {
    let name = validate::name(&input.name, "Product")?;
    validate_fields(
        Some(input.estimated_time),
        Some(input.profit_margin),
        input.price,
    )?;

    let uow = UnitOfWork::begin(db).await?;

    let now = chrono::Utc::now().naive_utc();
    let product = product::ActiveModel {
        name: Set(name),
        description: Set(input.description),
        estimated_time: Set(input.estimated_time),
        profit_margin: Set(input.profit_margin),
        price: Set(input.price),
        total_cost: Set(None),
        deleted_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(uow.conn())
    .await?;

    let materials = uow.resolve_materials(&input.materials).await?;
    uow.replace_product_materials(product.id, &materials).await?;
    let total = uow.recompute_product(product.id).await?;

    let product = get_product_by_id(uow.conn(), product.id)
        .await?
        .ok_or(Error::ProductNotFound { id: product.id })?;
    uow.commit().await?;

    info!(product_id = product.id, total, "Product created");
    Ok(product)
}

/// Applies an update to an active product.
///
/// When `materials` is present the existing lines are deleted and the new set attached. The
/// product total, and the totals of the active processes building it, are recomputed once at the
/// end either way.
///
/// # Errors
/// Returns an error if the product is unknown or retired, an input is invalid, a material does
/// not resolve, or any database operation fails. Nothing is persisted on error.
#[instrument(skip(db, changes))]
pub async fn update_product(
    db: &DatabaseConnection,
    product_id: i64,
    changes: ProductUpdate,
) -> Result<product::Model> {
    let name = changes
        .name
        .as_deref()
        .map(|n| validate::name(n, "Product"))
        .transpose()?;
    validate_fields(changes.estimated_time, changes.profit_margin, changes.price)?;

    let uow = UnitOfWork::begin(db).await?;

    let mut product: product::ActiveModel = find_active_product(uow.conn(), product_id)
        .await?
        .ok_or(Error::ProductNotFound { id: product_id })?
        .into();

    if let Some(name) = name {
        product.name = Set(name);
    }
    if let Some(description) = changes.description {
        product.description = Set(Some(description));
    }
    if let Some(minutes) = changes.estimated_time {
        product.estimated_time = Set(minutes);
    }
    if let Some(margin) = changes.profit_margin {
        product.profit_margin = Set(margin);
    }
    if let Some(price) = changes.price {
        product.price = Set(Some(price));
    }
    product.updated_at = Set(chrono::Utc::now().naive_utc());
    product.update(uow.conn()).await?;

    if let Some(lines) = &changes.materials {
        let materials = uow.resolve_materials(lines).await?;
        uow.replace_product_materials(product_id, &materials).await?;
    }
    let total = uow.recompute_product(product_id).await?;

    let product = get_product_by_id(uow.conn(), product_id)
        .await?
        .ok_or(Error::ProductNotFound { id: product_id })?;
    uow.commit().await?;

    info!(product_id, total, "Product updated");
    Ok(product)
}

/// Soft deletes a product. Its material lines and processes are left as they are.
///
/// # Errors
/// Returns an error if the product is unknown or already retired, or the update fails.
pub async fn delete_product(db: &DatabaseConnection, product_id: i64) -> Result<product::Model> {
    let mut product: product::ActiveModel = find_active_product(db, product_id)
        .await?
        .ok_or(Error::ProductNotFound { id: product_id })?
        .into();

    let now = chrono::Utc::now().naive_utc();
    product.deleted_at = Set(Some(now));
    product.updated_at = Set(now);

    product.update(db).await.map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::material;
    use crate::entities::{ProductMaterial, product_material};
    use crate::errors::EntityKind;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn table(materials: Vec<MaterialLine>) -> NewProduct {
        NewProduct {
            name: "Table".to_string(),
            estimated_time: 90,
            profit_margin: 0.3,
            materials,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_product_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = create_product(
            &db,
            NewProduct {
                name: "   ".to_string(),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::InvalidInput { message: _ }));

        let result = create_product(
            &db,
            NewProduct {
                price: Some(-10.0),
                ..table(Vec::new())
            },
        )
        .await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidAmount { amount: -10.0 }
        ));

        let result = create_product(
            &db,
            NewProduct {
                estimated_time: -1,
                ..table(Vec::new())
            },
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::InvalidInput { message: _ }));

        let result = create_product(
            &db,
            NewProduct {
                profit_margin: 0.0,
                ..table(Vec::new())
            },
        )
        .await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidAmount { amount: 0.0 }
        ));

        let result = update_product(
            &db,
            1,
            ProductUpdate {
                profit_margin: Some(0.0),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidAmount { amount: 0.0 }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_product_with_two_materials_totals_37() -> Result<()> {
        let db = setup_test_db().await?;
        let pine = material::create_material(&db, "Pine", 10.0, 10.0).await?;
        let screws = material::create_material(&db, "Screws", 5.0, 0.0).await?;

        let product = create_product(
            &db,
            table(vec![
                MaterialLine {
                    material_id: pine.id,
                    quantity: 2,
                },
                MaterialLine {
                    material_id: screws.id,
                    quantity: 3,
                },
            ]),
        )
        .await?;

        assert_close(product.total_cost.unwrap(), 37.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_product_with_unknown_material_persists_nothing() -> Result<()> {
        let db = setup_test_db().await?;

        let result = create_product(
            &db,
            table(vec![MaterialLine {
                material_id: 42,
                quantity: 1,
            }]),
        )
        .await;
        assert!(matches!(
            result.unwrap_err(),
            Error::ReferenceNotFound {
                kind: EntityKind::Material,
                reference: _
            }
        ));
        assert!(get_all_active_products(&db).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_create_product_with_retired_material_persists_nothing() -> Result<()> {
        let db = setup_test_db().await?;
        let pine = material::create_material(&db, "Pine", 10.0, 10.0).await?;
        material::delete_material(&db, pine.id).await?;

        let result = create_product(
            &db,
            table(vec![MaterialLine {
                material_id: pine.id,
                quantity: 2,
            }]),
        )
        .await;
        assert!(matches!(
            result.unwrap_err(),
            Error::ReferenceNotFound {
                kind: EntityKind::Material,
                reference: _
            }
        ));
        assert!(get_all_active_products(&db).await?.is_empty());
        assert!(ProductMaterial::find().all(&db).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_material_lines_are_merged() -> Result<()> {
        let db = setup_test_db().await?;
        let pine = material::create_material(&db, "Pine", 10.0, 0.0).await?;

        let line = MaterialLine {
            material_id: pine.id,
            quantity: 1,
        };
        let product = create_product(&db, table(vec![line, line])).await?;

        let lines = ProductMaterial::find()
            .filter(product_material::Column::ProductId.eq(product.id))
            .all(&db)
            .await?;
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 2);
        assert_close(product.total_cost.unwrap(), 20.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_product_replaces_materials_and_cascades() -> Result<()> {
        let (db, fixture) = setup_costed_process().await?;

        // Keep only the 5/0% material, now x4 = 20
        let updated = update_product(
            &db,
            fixture.product.id,
            ProductUpdate {
                materials: Some(vec![MaterialLine {
                    material_id: fixture.materials[1].id,
                    quantity: 4,
                }]),
                ..Default::default()
            },
        )
        .await?;
        assert_close(updated.total_cost.unwrap(), 20.0);

        // 20 + 8 + 12
        let process = crate::core::process::get_process_by_id(&db, fixture.process.id)
            .await?
            .unwrap();
        assert_close(process.cost_total, 40.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_product_without_materials_keeps_lines() -> Result<()> {
        let (db, fixture) = setup_costed_process().await?;

        let updated = update_product(
            &db,
            fixture.product.id,
            ProductUpdate {
                name: Some("Desk".to_string()),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(updated.name, "Desk");
        assert_close(updated.total_cost.unwrap(), 37.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_product_empty_materials_zeroes_total() -> Result<()> {
        let (db, fixture) = setup_costed_process().await?;

        let updated = update_product(
            &db,
            fixture.product.id,
            ProductUpdate {
                materials: Some(Vec::new()),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(updated.total_cost, Some(0.0));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_product() -> Result<()> {
        let (db, fixture) = setup_costed_process().await?;

        let deleted = delete_product(&db, fixture.product.id).await?;
        assert!(deleted.deleted_at.is_some());
        assert!(get_all_active_products(&db).await?.is_empty());
        assert!(find_active_product(&db, fixture.product.id).await?.is_none());
        assert!(get_product_by_id(&db, fixture.product.id).await?.is_some());

        let result = delete_product(&db, fixture.product.id).await;
        assert!(matches!(result.unwrap_err(), Error::ProductNotFound { id: _ }));
        Ok(())
    }
}
