//! End-to-end tests against a fresh in-memory database per test.

use chrono::{Duration, Utc};
use kiosko_core::costing::cost_floor;
use kiosko_core::{
    DateRange, Material, MaterialDraft, PendingSale, Product, ProductDraft, SaleLineRequest,
    ScanPayload, VariantDraft, DEFAULT_TOP_N,
};

use crate::{Database, DbConfig, ErrorKind};

// =============================================================================
// Helpers
// =============================================================================

async fn db() -> Database {
    Database::new(DbConfig::in_memory()).await.unwrap()
}

async fn material(db: &Database, name: &str, cost_cents: i64, stock: f64) -> Material {
    db.catalog()
        .upsert_material(MaterialDraft {
            id: None,
            name: name.to_string(),
            cost_cents,
            unit: "m".to_string(),
            stock,
        })
        .await
        .unwrap()
}

async fn product(db: &Database, name: &str, price_cents: i64, cost_cents: i64, stock: i64) -> Product {
    db.catalog()
        .upsert_product(ProductDraft {
            id: None,
            name: name.to_string(),
            cost_cents,
            price_cents,
            stock,
        })
        .await
        .unwrap()
}

fn request(product_id: &str, variant_id: Option<&str>, quantity: i64) -> SaleLineRequest {
    SaleLineRequest {
        product_id: product_id.to_string(),
        variant_id: variant_id.map(str::to_string),
        quantity,
    }
}

fn edit(p: &Product, cost_cents: i64, price_cents: i64) -> ProductDraft {
    ProductDraft {
        id: Some(p.id.clone()),
        name: p.name.clone(),
        cost_cents,
        price_cents,
        stock: p.stock,
    }
}

async fn sale_count(db: &Database) -> usize {
    db.reports().list_sales(DateRange::all()).await.unwrap().len()
}

// =============================================================================
// Cost Engine
// =============================================================================

/// Tela $10/m, Remera $50: 2 m sets cost to $20; 5 m more would reach $70.
#[tokio::test]
async fn test_scenario_a_component_cost_and_rejection() {
    let db = db().await;
    let tela = material(&db, "Tela", 1000, 100.0).await;
    let remera = product(&db, "Remera", 5000, 500, 20).await;

    db.catalog().add_component(&remera.id, &tela.id, 2.0).await.unwrap();
    let after_first = db.catalog().get_product(&remera.id).await.unwrap();
    assert_eq!(after_first.cost_cents, 2000);

    let err = db
        .catalog()
        .add_component(&remera.id, &tela.id, 5.0)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationError);

    let unchanged = db.catalog().get_product(&remera.id).await.unwrap();
    assert_eq!(unchanged.cost_cents, 2000);
    assert_eq!(unchanged.components.len(), 1);
}

#[tokio::test]
async fn test_p1_cost_floor_holds_after_add_and_remove() {
    let db = db().await;
    let tela = material(&db, "Tela", 1000, 100.0).await;
    let hilo = material(&db, "Hilo", 5, 1000.0).await;
    let remera = product(&db, "Remera", 5000, 0, 10).await;

    db.catalog().add_component(&remera.id, &tela.id, 1.5).await.unwrap();
    let thread = db.catalog().add_component(&remera.id, &hilo.id, 30.0).await.unwrap();

    let p = db.catalog().get_product(&remera.id).await.unwrap();
    assert_eq!(p.cost_cents, 1500 + 150);
    assert!(p.cost() >= cost_floor(&p.components));

    let p = db.catalog().remove_component(&thread.id).await.unwrap();
    assert_eq!(p.cost_cents, 1500);
    assert_eq!(p.components.len(), 1);
    assert!(p.cost() >= cost_floor(&p.components));
}

#[tokio::test]
async fn test_p2_cost_must_stay_below_price() {
    let db = db().await;

    let err = db
        .catalog()
        .upsert_product(ProductDraft {
            id: None,
            name: "Gorra".to_string(),
            cost_cents: 4000,
            price_cents: 4000,
            stock: 1,
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationError);
    assert!(db.catalog().list_products().await.unwrap().is_empty());

    let gorra = product(&db, "Gorra", 4000, 1000, 1).await;
    let err = db.catalog().upsert_product(edit(&gorra, 1000, 900)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationError);

    let saved = db.catalog().upsert_product(edit(&gorra, 1200, 4500)).await.unwrap();
    assert!(saved.cost_cents < saved.price_cents);
}

#[tokio::test]
async fn test_manual_cost_respects_component_floor() {
    let db = db().await;
    let tela = material(&db, "Tela", 1000, 100.0).await;
    let remera = product(&db, "Remera", 5000, 0, 10).await;
    db.catalog().add_component(&remera.id, &tela.id, 2.0).await.unwrap();

    let err = db.catalog().set_manual_cost(&remera.id, 1999).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationError);

    let p = db.catalog().set_manual_cost(&remera.id, 2500).await.unwrap();
    assert_eq!(p.cost_cents, 2500);

    let err = db.catalog().upsert_product(edit(&p, 1000, 5000)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationError);
}

#[tokio::test]
async fn test_p5_removing_components_never_goes_negative() {
    let db = db().await;
    let hilo = material(&db, "Hilo", 10, 1000.0).await;
    let llavero = product(&db, "Llavero", 1000, 0, 5).await;

    let a = db.catalog().add_component(&llavero.id, &hilo.id, 0.1).await.unwrap();
    let b = db.catalog().add_component(&llavero.id, &hilo.id, 0.2).await.unwrap();

    // manual cost above the floor, then the floor shrinks to nothing
    db.catalog().set_manual_cost(&llavero.id, 5).await.unwrap();
    db.catalog().remove_component(&a.id).await.unwrap();
    let p = db.catalog().remove_component(&b.id).await.unwrap();

    assert_eq!(p.cost_cents, 0);
    assert!(p.components.is_empty());
}

#[tokio::test]
async fn test_material_cost_change_recomputes_products() {
    let db = db().await;
    let tela = material(&db, "Tela", 1000, 100.0).await;
    let remera = product(&db, "Remera", 5000, 0, 10).await;
    db.catalog().add_component(&remera.id, &tela.id, 2.0).await.unwrap();

    let mut draft = MaterialDraft {
        id: Some(tela.id.clone()),
        name: tela.name.clone(),
        cost_cents: 1500,
        unit: tela.unit.clone(),
        stock: tela.stock,
    };
    db.catalog().upsert_material(draft.clone()).await.unwrap();
    assert_eq!(db.catalog().get_product(&remera.id).await.unwrap().cost_cents, 3000);

    // 2 m at $25 = $50 reaches the price: whole edit rejected
    draft.cost_cents = 2500;
    let err = db.catalog().upsert_material(draft).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationError);
    assert_eq!(db.catalog().get_material(&tela.id).await.unwrap().cost_cents, 1500);
    assert_eq!(db.catalog().get_product(&remera.id).await.unwrap().cost_cents, 3000);
}

#[tokio::test]
async fn test_add_component_unknown_references() {
    let db = db().await;
    let tela = material(&db, "Tela", 1000, 100.0).await;
    let remera = product(&db, "Remera", 5000, 0, 10).await;

    let err = db.catalog().add_component("nope", &tela.id, 1.0).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = db.catalog().add_component(&remera.id, "nope", 1.0).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = db.catalog().add_component(&remera.id, &tela.id, 0.0).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationError);

    let err = db.catalog().remove_component("nope").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

// =============================================================================
// Catalog Maintenance
// =============================================================================

#[tokio::test]
async fn test_material_delete_rejected_while_in_use() {
    let db = db().await;
    let tela = material(&db, "Tela", 1000, 100.0).await;
    let remera = product(&db, "Remera", 5000, 0, 10).await;
    let component = db.catalog().add_component(&remera.id, &tela.id, 1.0).await.unwrap();

    let err = db.catalog().delete_material(&tela.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationError);
    assert!(db.catalog().get_material(&tela.id).await.is_ok());

    db.catalog().remove_component(&component.id).await.unwrap();
    db.catalog().delete_material(&tela.id).await.unwrap();

    let err = db.catalog().get_material(&tela.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_delete_product_cascades_to_variants_and_components() {
    let db = db().await;
    let tela = material(&db, "Tela", 1000, 100.0).await;
    let remera = product(&db, "Remera", 5000, 0, 10).await;
    db.catalog().add_component(&remera.id, &tela.id, 1.0).await.unwrap();
    db.catalog()
        .upsert_variant(VariantDraft {
            id: None,
            product_id: remera.id.clone(),
            name: "Rojo".to_string(),
            stock: 5,
        })
        .await
        .unwrap();

    db.catalog().delete_product(&remera.id).await.unwrap();

    assert!(db.catalog().list_products().await.unwrap().is_empty());
    let variants: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM variants")
        .fetch_one(db.pool())
        .await
        .unwrap();
    let components: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM components")
        .fetch_one(db.pool())
        .await
        .unwrap();
    assert_eq!((variants, components), (0, 0));

    // material is not owned by the product; now unused, it can go
    db.catalog().delete_material(&tela.id).await.unwrap();

    let err = db.catalog().delete_product(&remera.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_upsert_with_unknown_id_is_not_found() {
    let db = db().await;

    let err = db
        .catalog()
        .upsert_material(MaterialDraft {
            id: Some("missing".to_string()),
            name: "Tela".to_string(),
            cost_cents: 100,
            unit: "m".to_string(),
            stock: 1.0,
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = db
        .catalog()
        .upsert_product(ProductDraft {
            id: Some("missing".to_string()),
            name: "Remera".to_string(),
            cost_cents: 100,
            price_cents: 200,
            stock: 1,
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_variant_rules() {
    let db = db().await;
    let remera = product(&db, "Remera", 5000, 1000, 0).await;

    let zero_stock = VariantDraft {
        id: None,
        product_id: remera.id.clone(),
        name: "Rojo".to_string(),
        stock: 0,
    };
    let err = db.catalog().upsert_variant(zero_stock.clone()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationError);

    let orphan = VariantDraft {
        product_id: "missing".to_string(),
        stock: 3,
        ..zero_stock.clone()
    };
    let err = db.catalog().upsert_variant(orphan).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let rojo = db
        .catalog()
        .upsert_variant(VariantDraft { stock: 5, ..zero_stock })
        .await
        .unwrap();
    let renamed = db
        .catalog()
        .upsert_variant(VariantDraft {
            id: Some(rojo.id.clone()),
            product_id: remera.id.clone(),
            name: "Rojo oscuro".to_string(),
            stock: 7,
        })
        .await
        .unwrap();
    assert_eq!(renamed.name, "Rojo oscuro");
    assert_eq!(renamed.stock, 7);
    assert_eq!(renamed.created_at, rojo.created_at);

    db.catalog().delete_variant(&rojo.id).await.unwrap();
    let err = db.catalog().delete_variant(&rojo.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

// =============================================================================
// Sale Recorder
// =============================================================================

/// price $100, cost $60, 3 units → total $300, profit $120.
#[tokio::test]
async fn test_scenario_c_sale_totals_and_stock() {
    let db = db().await;
    let p = product(&db, "Mate", 10000, 6000, 10).await;

    let sale = db.checkout().record_sale(&[request(&p.id, None, 3)]).await.unwrap();

    assert_eq!(sale.total_units, 3);
    assert_eq!(sale.total_cents, 30000);
    assert_eq!(sale.profit_cents, 12000);
    assert_eq!(sale.lines[0].unit_price_cents, 10000);
    assert_eq!(sale.lines[0].profit_cents, 12000);

    assert_eq!(db.catalog().get_product(&p.id).await.unwrap().stock, 7);

    let stored = db.reports().get_sale(&sale.id).await.unwrap();
    assert_eq!(stored.total_cents, sale.total_cents);
    assert_eq!(stored.lines, sale.lines);
}

#[tokio::test]
async fn test_scenario_d_variant_required() {
    let db = db().await;
    let remera = product(&db, "Remera", 5000, 1000, 0).await;
    let rojo = db
        .catalog()
        .upsert_variant(VariantDraft {
            id: None,
            product_id: remera.id.clone(),
            name: "Rojo".to_string(),
            stock: 5,
        })
        .await
        .unwrap();

    let err = db
        .checkout()
        .record_sale(&[request(&remera.id, None, 1)])
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationError);
    assert_eq!(sale_count(&db).await, 0);

    let sale = db
        .checkout()
        .record_sale(&[request(&remera.id, Some(&rojo.id), 2)])
        .await
        .unwrap();
    assert_eq!(sale.lines[0].variant_name_snapshot.as_deref(), Some("Rojo"));

    let p = db.catalog().get_product(&remera.id).await.unwrap();
    assert_eq!(p.variants[0].stock, 3);
    assert_eq!(p.stock, 0);
}

#[tokio::test]
async fn test_p3_duplicate_lines_cannot_oversell() {
    let db = db().await;
    let p = product(&db, "Remera", 5000, 1000, 3).await;

    let err = db
        .checkout()
        .record_sale(&[request(&p.id, None, 2), request(&p.id, None, 2)])
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientStock);

    assert_eq!(db.catalog().get_product(&p.id).await.unwrap().stock, 3);
    assert_eq!(sale_count(&db).await, 0);
}

#[tokio::test]
async fn test_failed_sale_writes_nothing() {
    let db = db().await;
    let plenty = product(&db, "Bolsa", 2500, 900, 10).await;
    let scarce = product(&db, "Gorra", 4000, 1900, 1).await;

    let err = db
        .checkout()
        .record_sale(&[request(&plenty.id, None, 4), request(&scarce.id, None, 2)])
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientStock);

    assert_eq!(db.catalog().get_product(&plenty.id).await.unwrap().stock, 10);
    assert_eq!(db.catalog().get_product(&scarce.id).await.unwrap().stock, 1);
    assert_eq!(sale_count(&db).await, 0);

    let err = db.checkout().record_sale(&[]).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationError);

    let err = db
        .checkout()
        .record_sale(&[request("missing", None, 1)])
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_p4_recorded_sale_ignores_later_price_changes() {
    let db = db().await;
    let p = product(&db, "Mate", 10000, 6000, 10).await;
    let sale = db.checkout().record_sale(&[request(&p.id, None, 2)]).await.unwrap();

    db.catalog().upsert_product(edit(&p, 9000, 20000)).await.unwrap();
    db.catalog().set_manual_cost(&p.id, 100).await.unwrap();

    let stored = db.reports().get_sale(&sale.id).await.unwrap();
    assert_eq!(stored.lines[0].unit_price_cents, 10000);
    assert_eq!(stored.lines[0].profit_cents, 8000);
    assert_eq!(stored.profit_cents, 8000);

    db.catalog().delete_product(&p.id).await.unwrap();
    let stored = db.reports().get_sale(&sale.id).await.unwrap();
    assert_eq!(stored.lines[0].name_snapshot, "Mate");
    assert_eq!(stored.total_cents, 20000);
}

/// Stock 3: add 2, add 2 more is refused and the pending sale keeps 2.
#[tokio::test]
async fn test_scenario_b_pending_sale_then_record() {
    let db = db().await;
    let p = product(&db, "Remera", 5000, 1000, 3).await;
    let p = db.catalog().get_product(&p.id).await.unwrap();

    let mut pending = PendingSale::new();
    pending.add_line(&p, None, 2).unwrap();
    assert!(pending.add_line(&p, None, 2).is_err());
    assert_eq!(pending.quantity_of(&p.id, None), 2);

    // stock moved under the pending sale: recording fails, pending is kept
    db.catalog().upsert_product(ProductDraft { stock: 1, ..edit(&p, 1000, 5000) }).await.unwrap();
    let err = db.checkout().record_pending(&mut pending).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientStock);
    assert_eq!(pending.quantity_of(&p.id, None), 2);

    db.catalog().upsert_product(ProductDraft { stock: 3, ..edit(&p, 1000, 5000) }).await.unwrap();
    let sale = db.checkout().record_pending(&mut pending).await.unwrap();
    assert_eq!(sale.total_units, 2);
    assert!(pending.is_empty());
}

// =============================================================================
// Reports
// =============================================================================

#[tokio::test]
async fn test_statistics_over_recorded_sales() {
    let db = db().await;
    let mate = product(&db, "Mate", 10000, 6000, 10).await;
    let bolsa = product(&db, "Bolsa", 2500, 900, 10).await;

    db.checkout()
        .record_sale(&[request(&mate.id, None, 1), request(&bolsa.id, None, 3)])
        .await
        .unwrap();
    db.checkout().record_sale(&[request(&mate.id, None, 1)]).await.unwrap();

    let stats = db.reports().get_statistics(DateRange::all(), DEFAULT_TOP_N).await.unwrap();
    assert_eq!(stats.total_sales, 2);
    assert_eq!(stats.total_units_sold, 5);
    assert_eq!(stats.total_revenue_cents, 10000 + 7500 + 10000);
    assert_eq!(stats.total_profit_cents, 4000 + 4800 + 4000);
    assert_eq!(stats.best_sellers[0].product_id, bolsa.id);
    assert_eq!(stats.best_sellers[1].units, 2);
    assert_eq!(stats.daily.len(), 1);

    let later = Utc::now() + Duration::days(1);
    let empty = db
        .reports()
        .get_statistics(DateRange::between(later, later + Duration::days(1)), 5)
        .await
        .unwrap();
    assert_eq!(empty.total_sales, 0);
    assert!(empty.best_sellers.is_empty());

    let err = db.reports().get_sale("missing").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

// =============================================================================
// Scanning
// =============================================================================

#[tokio::test]
async fn test_resolve_scan() {
    let db = db().await;
    let remera = product(&db, "Remera", 5000, 1000, 0).await;
    let rojo = db
        .catalog()
        .upsert_variant(VariantDraft {
            id: None,
            product_id: remera.id.clone(),
            name: "Rojo".to_string(),
            stock: 5,
        })
        .await
        .unwrap();

    let label = ScanPayload::new(remera.id.clone(), Some(rojo.id.clone())).encode();
    let found = db.catalog().resolve_scan(&label).await.unwrap();
    assert_eq!(found.product.id, remera.id);
    assert_eq!(found.variant.map(|v| v.id), Some(rojo.id.clone()));

    let bare = db.catalog().resolve_scan(&remera.id).await.unwrap();
    assert!(bare.variant.is_none());
    assert_eq!(bare.product.variants.len(), 1);

    let unknown = ScanPayload::new(uuid::Uuid::new_v4().to_string(), None).encode();
    let err = db.catalog().resolve_scan(&unknown).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = db.catalog().resolve_scan("not a label").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationError);
}

// =============================================================================
// Numeric Limits
// =============================================================================

#[tokio::test]
async fn test_huge_component_quantity_is_rejected() {
    let db = db().await;
    let tela = material(&db, "Tela", 1000, 100.0).await;
    let remera = product(&db, "Remera", 5000, 0, 10).await;
    db.catalog().add_component(&remera.id, &tela.id, 2.0).await.unwrap();

    let err = db
        .catalog()
        .add_component(&remera.id, &tela.id, 1e300)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationError);

    let p = db.catalog().get_product(&remera.id).await.unwrap();
    assert_eq!(p.cost_cents, 2000);
    assert_eq!(p.components.len(), 1);
}

#[tokio::test]
async fn test_sale_quantity_near_i64_max_is_insufficient_stock() {
    let db = db().await;
    let p = product(&db, "Remera", 5000, 1000, 5).await;

    let err = db
        .checkout()
        .record_sale(&[request(&p.id, None, 2), request(&p.id, None, i64::MAX)])
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientStock);

    assert_eq!(db.catalog().get_product(&p.id).await.unwrap().stock, 5);
    assert_eq!(sale_count(&db).await, 0);
}
