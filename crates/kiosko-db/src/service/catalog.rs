//! # Catalog Service
//!
//! Materials, products, variants and components, with the cost engine rules
//! applied inside the same transaction as the write they guard.
//!
//! ## Cost Recomputation Triggers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  add_component ─────┐                                                   │
//! │  remove_component ──┼──► load_bom(product) ──► Σ line costs ──► cost    │
//! │  material cost edit ┘         (fresh)            must stay < price      │
//! │                                                                         │
//! │  upsert_product / set_manual_cost:                                      │
//! │      Σ line costs <= cost < price   (floor only when components exist)  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::time::Duration;

use chrono::{DateTime, Utc};
use kiosko_core::costing::{
    check_manual_cost, cost_after_addition, cost_after_material_change, cost_after_removal,
    ensure_below_price,
};
use kiosko_core::validation::{
    validate_cents, validate_component_quantity, validate_material, validate_product,
    validate_variant,
};
use kiosko_core::{
    Component, Material, MaterialDraft, Money, Product, ProductDraft, ScanPayload,
    ValidationError, Variant, VariantDraft,
};
use serde::{Deserialize, Serialize};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::info;

use crate::error::{StoreError, StoreResult};
use crate::repository::{component, material, new_id, product, variant};
use crate::service::with_timeout;

/// A scanned label resolved against the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanMatch {
    /// With variants and components loaded.
    pub product: Product,
    /// Present when the label named a variant.
    pub variant: Option<Variant>,
}

/// Catalog operations. Obtain with [`crate::Database::catalog`].
#[derive(Debug, Clone)]
pub struct CatalogService {
    pool: SqlitePool,
    timeout: Duration,
}

impl CatalogService {
    pub fn new(pool: SqlitePool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    // =========================================================================
    // Materials
    // =========================================================================

    pub async fn list_materials(&self) -> StoreResult<Vec<Material>> {
        with_timeout(self.timeout, "list_materials", async {
            let mut conn = self.pool.acquire().await?;
            Ok(material::list(&mut conn).await?)
        })
        .await
    }

    pub async fn get_material(&self, id: &str) -> StoreResult<Material> {
        with_timeout(self.timeout, "get_material", async {
            let mut conn = self.pool.acquire().await?;
            material::get(&mut conn, id)
                .await?
                .ok_or_else(|| StoreError::not_found("Material", id))
        })
        .await
    }

    /// Creates (`id: None`) or edits a material.
    ///
    /// Editing the cost recomputes every product that uses the material. If
    /// any of them would reach its sale price the whole edit is rejected.
    pub async fn upsert_material(&self, draft: MaterialDraft) -> StoreResult<Material> {
        with_timeout(self.timeout, "upsert_material", async {
            validate_material(&draft)?;

            let now = Utc::now();
            let mut tx = self.pool.begin().await?;

            let saved = match draft.id.as_deref() {
                None => {
                    let created = Material {
                        id: new_id(),
                        name: draft.name.trim().to_string(),
                        cost_cents: draft.cost_cents,
                        unit: draft.unit.trim().to_string(),
                        stock: draft.stock,
                        created_at: now,
                        updated_at: now,
                    };
                    material::insert(&mut tx, &created).await?;
                    created
                }
                Some(id) => {
                    let existing = material::get(&mut tx, id)
                        .await?
                        .ok_or_else(|| StoreError::not_found("Material", id))?;
                    let cost_changed = existing.cost_cents != draft.cost_cents;

                    let updated = Material {
                        name: draft.name.trim().to_string(),
                        cost_cents: draft.cost_cents,
                        unit: draft.unit.trim().to_string(),
                        stock: draft.stock,
                        updated_at: now,
                        ..existing
                    };
                    material::update(&mut tx, &updated).await?;

                    if cost_changed {
                        let touched = recompute_products_using(&mut tx, id, now).await?;
                        info!(material_id = %id, products = touched, "Recomputed product costs");
                    }
                    updated
                }
            };

            tx.commit().await?;
            info!(id = %saved.id, name = %saved.name, "Material saved");
            Ok(saved)
        })
        .await
    }

    /// Deletes a material nobody uses.
    ///
    /// ## Errors
    /// * `NotFound` - unknown id
    /// * `Validation(InUse)` - components still reference it
    pub async fn delete_material(&self, id: &str) -> StoreResult<()> {
        with_timeout(self.timeout, "delete_material", async {
            let mut tx = self.pool.begin().await?;

            if material::get(&mut tx, id).await?.is_none() {
                return Err(StoreError::not_found("Material", id));
            }

            let references = material::count_references(&mut tx, id).await?;
            if references > 0 {
                return Err(ValidationError::InUse {
                    entity: "Material".to_string(),
                    id: id.to_string(),
                    references,
                }
                .into());
            }

            material::delete(&mut tx, id).await?;
            tx.commit().await?;

            info!(id = %id, "Material deleted");
            Ok(())
        })
        .await
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Every product with its variants and components.
    pub async fn list_products(&self) -> StoreResult<Vec<Product>> {
        with_timeout(self.timeout, "list_products", async {
            let mut conn = self.pool.acquire().await?;
            Ok(product::list_full(&mut conn).await?)
        })
        .await
    }

    pub async fn get_product(&self, id: &str) -> StoreResult<Product> {
        with_timeout(self.timeout, "get_product", async {
            let mut conn = self.pool.acquire().await?;
            product::get_full(&mut conn, id)
                .await?
                .ok_or_else(|| StoreError::not_found("Product", id))
        })
        .await
    }

    /// Creates (`id: None`) or edits a product.
    ///
    /// ## Rules
    /// - `cost < price` always
    /// - editing a product with components: `cost >= Σ component costs`
    pub async fn upsert_product(&self, draft: ProductDraft) -> StoreResult<Product> {
        with_timeout(self.timeout, "upsert_product", async {
            validate_product(&draft)?;

            let now = Utc::now();
            let cost = Money::from_cents(draft.cost_cents);
            let price = Money::from_cents(draft.price_cents);
            let mut tx = self.pool.begin().await?;

            let id = match draft.id.as_deref() {
                None => {
                    ensure_below_price(cost, price)?;

                    let created = Product {
                        id: new_id(),
                        name: draft.name.trim().to_string(),
                        cost_cents: draft.cost_cents,
                        price_cents: draft.price_cents,
                        stock: draft.stock,
                        created_at: now,
                        updated_at: now,
                        variants: Vec::new(),
                        components: Vec::new(),
                    };
                    product::insert(&mut tx, &created).await?;
                    created.id
                }
                Some(id) => {
                    let existing = product::get(&mut tx, id)
                        .await?
                        .ok_or_else(|| StoreError::not_found("Product", id))?;
                    let bom = component::load_bom(&mut tx, id).await?;
                    check_manual_cost(cost, price, &bom)?;

                    let updated = Product {
                        name: draft.name.trim().to_string(),
                        cost_cents: draft.cost_cents,
                        price_cents: draft.price_cents,
                        stock: draft.stock,
                        updated_at: now,
                        ..existing
                    };
                    product::update(&mut tx, &updated).await?;
                    updated.id
                }
            };

            let saved = product::get_full(&mut tx, &id)
                .await?
                .ok_or_else(|| StoreError::not_found("Product", &id))?;
            tx.commit().await?;

            info!(
                id = %saved.id,
                cost_cents = saved.cost_cents,
                price_cents = saved.price_cents,
                "Product saved"
            );
            Ok(saved)
        })
        .await
    }

    /// Sets the cost of a product by hand.
    pub async fn set_manual_cost(&self, product_id: &str, cost_cents: i64) -> StoreResult<Product> {
        with_timeout(self.timeout, "set_manual_cost", async {
            validate_cents("cost", cost_cents)?;

            let mut tx = self.pool.begin().await?;
            let existing = product::get(&mut tx, product_id)
                .await?
                .ok_or_else(|| StoreError::not_found("Product", product_id))?;
            let bom = component::load_bom(&mut tx, product_id).await?;

            check_manual_cost(Money::from_cents(cost_cents), existing.price(), &bom)?;
            product::set_cost(&mut tx, product_id, cost_cents, Utc::now()).await?;

            let saved = product::get_full(&mut tx, product_id)
                .await?
                .ok_or_else(|| StoreError::not_found("Product", product_id))?;
            tx.commit().await?;

            info!(id = %product_id, cost_cents, "Manual cost set");
            Ok(saved)
        })
        .await
    }

    /// Deletes a product with its variants and components. Recorded sales
    /// keep their snapshot of it.
    pub async fn delete_product(&self, id: &str) -> StoreResult<()> {
        with_timeout(self.timeout, "delete_product", async {
            let mut tx = self.pool.begin().await?;

            let (variants, components) = product::delete_cascade(&mut tx, id)
                .await?
                .ok_or_else(|| StoreError::not_found("Product", id))?;
            tx.commit().await?;

            info!(id = %id, variants, components, "Product deleted");
            Ok(())
        })
        .await
    }

    // =========================================================================
    // Components
    // =========================================================================

    /// Adds `quantity` of a material to a product's BOM.
    ///
    /// The product cost becomes the fresh sum over all components including
    /// the new one; if that reaches the sale price nothing is written.
    pub async fn add_component(
        &self,
        product_id: &str,
        material_id: &str,
        quantity: f64,
    ) -> StoreResult<Component> {
        with_timeout(self.timeout, "add_component", async {
            validate_component_quantity(quantity)?;

            let now = Utc::now();
            let mut tx = self.pool.begin().await?;

            let owner = product::get(&mut tx, product_id)
                .await?
                .ok_or_else(|| StoreError::not_found("Product", product_id))?;
            let used = material::get(&mut tx, material_id)
                .await?
                .ok_or_else(|| StoreError::not_found("Material", material_id))?;

            let bom = component::load_bom(&mut tx, product_id).await?;
            let new_cost = cost_after_addition(&bom, used.cost(), quantity, owner.price())?;

            let created = Component {
                id: new_id(),
                product_id: product_id.to_string(),
                material_id: material_id.to_string(),
                quantity,
                created_at: now,
            };
            component::insert(&mut tx, &created).await?;
            product::set_cost(&mut tx, product_id, new_cost.cents(), now).await?;

            tx.commit().await?;

            info!(
                product_id = %product_id,
                material_id = %material_id,
                quantity,
                cost_cents = new_cost.cents(),
                "Component added"
            );
            Ok(created)
        })
        .await
    }

    /// Removes a component and recomputes the owner's cost from what remains.
    ///
    /// Returns the owning product as it is after the change.
    pub async fn remove_component(&self, component_id: &str) -> StoreResult<Product> {
        with_timeout(self.timeout, "remove_component", async {
            let now = Utc::now();
            let mut tx = self.pool.begin().await?;

            let removed = component::get(&mut tx, component_id)
                .await?
                .ok_or_else(|| StoreError::not_found("Component", component_id))?;
            component::delete(&mut tx, component_id).await?;

            let remaining = component::load_bom(&mut tx, &removed.product_id).await?;
            let new_cost = cost_after_removal(&remaining);
            product::set_cost(&mut tx, &removed.product_id, new_cost.cents(), now).await?;

            let owner = product::get_full(&mut tx, &removed.product_id)
                .await?
                .ok_or_else(|| StoreError::not_found("Product", &removed.product_id))?;
            tx.commit().await?;

            info!(
                product_id = %owner.id,
                component_id = %component_id,
                cost_cents = new_cost.cents(),
                "Component removed"
            );
            Ok(owner)
        })
        .await
    }

    // =========================================================================
    // Variants
    // =========================================================================

    /// Creates (`id: None`) or edits a variant. Stock must be > 0.
    pub async fn upsert_variant(&self, draft: VariantDraft) -> StoreResult<Variant> {
        with_timeout(self.timeout, "upsert_variant", async {
            validate_variant(&draft)?;

            let now = Utc::now();
            let mut tx = self.pool.begin().await?;

            if product::get(&mut tx, &draft.product_id).await?.is_none() {
                return Err(StoreError::not_found("Product", &draft.product_id));
            }

            let saved = match draft.id.as_deref() {
                None => {
                    let created = Variant {
                        id: new_id(),
                        product_id: draft.product_id.clone(),
                        name: draft.name.trim().to_string(),
                        stock: draft.stock,
                        created_at: now,
                        updated_at: now,
                    };
                    variant::insert(&mut tx, &created).await?;
                    created
                }
                Some(id) => {
                    let existing = variant::get(&mut tx, id)
                        .await?
                        .ok_or_else(|| StoreError::not_found("Variant", id))?;
                    if existing.product_id != draft.product_id {
                        return Err(ValidationError::InvalidFormat {
                            field: "product_id".to_string(),
                            reason: "variant belongs to another product".to_string(),
                        }
                        .into());
                    }

                    let updated = Variant {
                        name: draft.name.trim().to_string(),
                        stock: draft.stock,
                        updated_at: now,
                        ..existing
                    };
                    variant::update(&mut tx, &updated).await?;
                    updated
                }
            };

            tx.commit().await?;
            info!(id = %saved.id, product_id = %saved.product_id, stock = saved.stock, "Variant saved");
            Ok(saved)
        })
        .await
    }

    pub async fn delete_variant(&self, id: &str) -> StoreResult<()> {
        with_timeout(self.timeout, "delete_variant", async {
            let mut conn = self.pool.acquire().await?;
            if !variant::delete(&mut conn, id).await? {
                return Err(StoreError::not_found("Variant", id));
            }

            info!(id = %id, "Variant deleted");
            Ok(())
        })
        .await
    }

    // =========================================================================
    // Scanning
    // =========================================================================

    /// Resolves raw QR scanner output to a catalog entry.
    pub async fn resolve_scan(&self, raw: &str) -> StoreResult<ScanMatch> {
        with_timeout(self.timeout, "resolve_scan", async {
            let payload = ScanPayload::parse(raw)?;

            let mut conn = self.pool.acquire().await?;
            let found = product::get_full(&mut conn, &payload.product_id)
                .await?
                .ok_or_else(|| StoreError::not_found("Product", &payload.product_id))?;

            let selected = match payload.variant_id.as_deref() {
                None => None,
                Some(variant_id) => Some(
                    found
                        .variant(variant_id)
                        .cloned()
                        .ok_or_else(|| StoreError::not_found("Variant", variant_id))?,
                ),
            };

            Ok(ScanMatch {
                product: found,
                variant: selected,
            })
        })
        .await
    }
}

/// Recomputes the cost of every product whose BOM uses `material_id`.
///
/// Returns how many products were updated.
async fn recompute_products_using(
    conn: &mut SqliteConnection,
    material_id: &str,
    at: DateTime<Utc>,
) -> StoreResult<usize> {
    let product_ids = material::products_using(&mut *conn, material_id).await?;

    for product_id in &product_ids {
        let owner = product::get(&mut *conn, product_id)
            .await?
            .ok_or_else(|| StoreError::not_found("Product", product_id))?;
        let bom = component::load_bom(&mut *conn, product_id).await?;

        let cost = cost_after_material_change(&bom, owner.price())?;
        product::set_cost(&mut *conn, product_id, cost.cents(), at).await?;
    }

    Ok(product_ids.len())
}
