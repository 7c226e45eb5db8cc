//! Integration tests for autodiscovery, the admin site registry, and the
//! REST API served by the generated router.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{Duration, Utc};
use once_cell::sync::Lazy;
use serde_json::{json, Value};
use tower::ServiceExt;

use backoffice_admin::autodiscover::{
    autodiscover_models, reregister_inline_admins, AdminApp, DiscoveryOptions,
};
use backoffice_admin::charts::{models_for_charts, models_for_grids, DashboardCatalog};
use backoffice_admin::model_admin::{factory, InlineAdmin, ModelAdmin};
use backoffice_admin::site::AdminSite;
use backoffice_admin::store::InMemoryStore;
use backoffice_core::apps::AppConfig;
use backoffice_core::error::BackofficeResult;
use backoffice_core::meta::{FieldDef, FieldType, ModelMeta, OnDelete};

// ── Fixtures: a catalog app and a sales app ─────────────────────────

static CATEGORY: Lazy<ModelMeta> = Lazy::new(|| {
    ModelMeta::new("catalog", "Category").fields(vec![
        FieldDef::new("id", FieldType::BigAutoField).primary_key(),
        FieldDef::new("name", FieldType::CharField).max_length(200),
    ])
});

static PRODUCT: Lazy<ModelMeta> = Lazy::new(|| {
    ModelMeta::new("catalog", "Product").fields(vec![
        FieldDef::new("id", FieldType::BigAutoField).primary_key(),
        FieldDef::new("name", FieldType::CharField).max_length(200),
        FieldDef::new("sku", FieldType::CharField).max_length(100).unique(),
        FieldDef::new(
            "price",
            FieldType::DecimalField {
                max_digits: 10,
                decimal_places: 2,
            },
        ),
        FieldDef::new("created_at", FieldType::DateTimeField),
    ])
});

static ORDER: Lazy<ModelMeta> = Lazy::new(|| {
    ModelMeta::new("sales", "Order")
        .ordering(vec!["-created_at"])
        .fields(vec![
            FieldDef::new("id", FieldType::BigAutoField).primary_key(),
            FieldDef::new("order_number", FieldType::CharField).max_length(50).unique(),
            FieldDef::new("status", FieldType::CharField).max_length(20),
            FieldDef::new(
                "total_amount",
                FieldType::DecimalField {
                    max_digits: 10,
                    decimal_places: 2,
                },
            ),
            FieldDef::new("created_at", FieldType::DateTimeField),
        ])
});

static ORDER_ITEM: Lazy<ModelMeta> = Lazy::new(|| {
    ModelMeta::new("sales", "OrderItem").fields(vec![
        FieldDef::new("id", FieldType::BigAutoField).primary_key(),
        FieldDef::new(
            "order",
            FieldType::ForeignKey {
                to: "sales.order".to_string(),
                on_delete: OnDelete::Cascade,
                related_name: Some("items".to_string()),
            },
        ),
        FieldDef::new("quantity", FieldType::IntegerField),
    ])
});

fn product_admin() -> ModelAdmin {
    ModelAdmin::new("catalog", "product")
        .list_display(vec!["name", "sku", "price"])
        .search_fields(vec!["name", "sku"])
        .schema_from(&PRODUCT)
}

fn order_admin() -> ModelAdmin {
    ModelAdmin::new("sales", "order")
        .list_display(vec!["order_number", "status", "total_amount"])
        .search_fields(vec!["order_number"])
        .list_filter(vec!["status"])
        .ordering(vec!["-created_at"])
        .inlines(vec![InlineAdmin::tabular("sales", "orderitem").extra(1)])
        .schema_from(&ORDER)
}

struct CatalogApp;

impl AppConfig for CatalogApp {
    fn name(&self) -> &str {
        "catalog"
    }

    fn models(&self) -> Vec<&'static ModelMeta> {
        vec![&*CATEGORY, &*PRODUCT]
    }
}

impl AdminApp for CatalogApp {
    fn register_admins(&self, site: &mut AdminSite) -> BackofficeResult<()> {
        site.register(&PRODUCT, factory(product_admin))
    }
}

struct SalesApp;

impl AppConfig for SalesApp {
    fn name(&self) -> &str {
        "sales"
    }

    fn models(&self) -> Vec<&'static ModelMeta> {
        vec![&*ORDER, &*ORDER_ITEM]
    }
}

impl AdminApp for SalesApp {
    fn register_admins(&self, site: &mut AdminSite) -> BackofficeResult<()> {
        site.register(&ORDER, factory(order_admin))
    }
}

fn apps() -> Vec<Box<dyn AdminApp>> {
    vec![Box::new(CatalogApp), Box::new(SalesApp)]
}

fn as_refs(apps: &[Box<dyn AdminApp>]) -> Vec<&dyn AdminApp> {
    apps.iter().map(AsRef::as_ref).collect()
}

fn discovered_site() -> AdminSite {
    let apps = apps();
    let mut site = AdminSite::new("admin");
    autodiscover_models(&as_refs(&apps), &mut site, &DiscoveryOptions::new());
    site
}

fn seeded_store() -> InMemoryStore {
    let recent = |days: i64| (Utc::now() - Duration::days(days)).to_rfc3339();
    InMemoryStore::with_data(vec![
        (
            "sales.order",
            vec![
                json!({"id": 1, "order_number": "ORD-1", "status": "pending",
                       "total_amount": 150.0, "created_at": recent(3)}),
                json!({"id": 2, "order_number": "ORD-2", "status": "shipped",
                       "total_amount": 80.0, "created_at": recent(10)}),
            ],
        ),
        (
            "catalog.product",
            vec![json!({"id": 1, "name": "Keyboard", "sku": "SKU-1",
                        "price": 49.9, "created_at": recent(40)})],
        ),
    ])
}

async fn get_json(router: &axum::Router, uri: &str) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn post_json(router: &axum::Router, uri: &str, payload: &Value) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(payload).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn api_router() -> axum::Router {
    let apps = apps();
    let catalog = DashboardCatalog::build(&as_refs(&apps));
    let mut site = AdminSite::new("admin");
    autodiscover_models(&as_refs(&apps), &mut site, &DiscoveryOptions::new());
    site.store(Arc::new(seeded_store()))
        .catalog(catalog)
        .into_router()
}

// ═════════════════════════════════════════════════════════════════════
// 1. Autodiscovery builds the expected registry
// ═════════════════════════════════════════════════════════════════════

#[test]
fn test_discovery_registers_four_models() {
    let apps = apps();
    let mut site = AdminSite::new("admin");
    let count = autodiscover_models(&as_refs(&apps), &mut site, &DiscoveryOptions::new());

    assert_eq!(count, 4);
    let mut keys = site.registered_models();
    keys.sort_unstable();
    assert_eq!(
        keys,
        vec![
            "catalog.category",
            "catalog.product",
            "sales.order",
            "sales.orderitem"
        ]
    );

    // Bespoke policy survives promotion.
    let product = site.get_model_admin("catalog.product").unwrap();
    assert_eq!(product.search_fields, vec!["name", "sku"]);

    // The order's inline child is reachable from the registry.
    let order = site.get_model_admin("sales.order").unwrap();
    assert_eq!(order.inlines[0].model_key(), "sales.orderitem");
    assert!(site.is_registered(&order.inlines[0].model_key()));

    // Models without declarations carry the generic configuration.
    assert!(site.entry("catalog.category").unwrap().factory.is_none());
    assert!(site.entry("sales.orderitem").unwrap().factory.is_none());
}

#[test]
fn test_discovery_twice_keeps_membership_and_bindings() {
    let apps = apps();
    let mut site = AdminSite::new("admin");
    autodiscover_models(&as_refs(&apps), &mut site, &DiscoveryOptions::new());
    let mut before = site.registered_models();
    before.sort_unstable();
    let before: Vec<String> = before.iter().map(|s| (*s).to_string()).collect();

    autodiscover_models(&as_refs(&apps), &mut site, &DiscoveryOptions::new());
    let mut after = site.registered_models();
    after.sort_unstable();
    let after: Vec<String> = after.iter().map(|s| (*s).to_string()).collect();

    assert_eq!(before, after);
    assert!(site.entry("catalog.product").unwrap().factory.is_some());
    assert!(site.entry("catalog.category").unwrap().factory.is_none());
}

#[test]
fn test_promotion_replaces_stale_entries() {
    let apps = apps();
    let mut site = AdminSite::new("admin");
    // A stale generic registration from an earlier code version.
    site.register_default(&ORDER).unwrap();
    assert!(site.get_model_admin("sales.order").unwrap().inlines.is_empty());

    autodiscover_models(&as_refs(&apps), &mut site, &DiscoveryOptions::new());

    let order = site.get_model_admin("sales.order").unwrap();
    assert_eq!(order.inlines.len(), 1);
}

#[test]
fn test_direct_registration_then_inline_repair() {
    let mut site = discovered_site();

    // A startup path re-registers the order directly with its factory, the
    // way the server pins important models.
    site.register(&ORDER, factory(order_admin)).unwrap();
    reregister_inline_admins(&mut site);

    let order = site.get_model_admin("sales.order").unwrap();
    assert_eq!(order.inlines.len(), 1);
    assert_eq!(order.inlines[0].model_key(), "sales.orderitem");
}

// ═════════════════════════════════════════════════════════════════════
// 2. Chart/grid catalogs over declared metadata
// ═════════════════════════════════════════════════════════════════════

#[test]
fn test_models_for_charts_requires_numeric_fields() {
    let apps = apps();
    let charts = models_for_charts(&as_refs(&apps));
    let names: Vec<&str> = charts.iter().map(|m| m.name.as_str()).collect();

    // Category has no numeric field; auto primary keys do not count, but
    // the item's quantity does.
    assert_eq!(names, vec!["Product", "Order", "OrderItem"]);
    let order = charts.iter().find(|m| m.name == "Order").unwrap();
    assert_eq!(order.fields, vec!["total_amount"]);
    assert_eq!(order.date_field.as_deref(), Some("created_at"));
    let item = charts.iter().find(|m| m.name == "OrderItem").unwrap();
    assert_eq!(item.fields, vec!["quantity"]);
    assert_eq!(item.date_field, None);
}

#[test]
fn test_models_for_grids_lists_all_concrete_models() {
    let apps = apps();
    let grids = models_for_grids(&as_refs(&apps));
    let names: Vec<&str> = grids.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["Category", "Product", "Order", "OrderItem"]);
    let order = grids.iter().find(|m| m.name == "Order").unwrap();
    assert!(order.fields.contains(&"order_number".to_string()));
}

// ═════════════════════════════════════════════════════════════════════
// 3. REST API over the generated router
// ═════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_index_groups_models_by_app() {
    let router = api_router();
    let (status, body) = get_json(&router, "/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["site_name"], "admin");
    let apps = body["apps"].as_array().unwrap();
    assert_eq!(apps.len(), 2);
    assert_eq!(apps[0]["app_label"], "catalog");
    assert_eq!(apps[1]["app_label"], "sales");
}

#[tokio::test]
async fn test_schema_endpoint() {
    let router = api_router();
    let (status, body) = get_json(&router, "/sales/order/schema").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["model_name"], "order");
    assert_eq!(body["search_fields"], json!(["order_number"]));
    assert_eq!(body["inlines"][0]["model_name"], "orderitem");

    let (status, _) = get_json(&router, "/sales/refund/schema").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_endpoint_search_and_filters() {
    let router = api_router();

    let (status, body) = get_json(&router, "/sales/order/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    // Ordered by -created_at: the most recent order first.
    assert_eq!(body["results"][0]["order_number"], "ORD-1");
    // Filter choices for the sidebar.
    assert_eq!(body["filters"]["status"], json!(["pending", "shipped"]));

    let (_, body) = get_json(&router, "/sales/order/?search=ORD-2").await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["results"][0]["status"], "shipped");

    let (_, body) = get_json(&router, "/sales/order/?status=pending").await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["results"][0]["order_number"], "ORD-1");
}

#[tokio::test]
async fn test_detail_and_crud_endpoints() {
    let router = api_router();

    let (status, body) = get_json(&router, "/sales/order/1/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["order_number"], "ORD-1");

    let (status, _) = get_json(&router, "/sales/order/99/").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, created) = post_json(
        &router,
        "/catalog/product/",
        &json!({"name": "Mouse", "sku": "SKU-2", "price": 19.9}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["id"], 2);

    let (status, _) = post_json(&router, "/catalog/gadget/", &json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_chart_data_endpoint() {
    let router = api_router();
    let (status, body) = get_json(
        &router,
        "/charts/data/?model=Order&field=total_amount&operation=sum&frequency=year&type=bar",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["chart_type"], "bar");
    let labels = body["labels"].as_array().unwrap();
    let data = body["data"].as_array().unwrap();
    assert_eq!(labels.len(), 5);
    // Both seeded orders are recent, so the whole series sums to their total.
    let total: f64 = data.iter().map(|v| v.as_f64().unwrap()).sum();
    assert!((total - 230.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_chart_data_unknown_field_suggests_alternatives() {
    let router = api_router();
    let (status, body) =
        get_json(&router, "/charts/data/?model=Order&field=grand_total").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["available_fields"], json!(["total_amount"]));
    assert_eq!(body["suggestion"], "total_amount");

    let (status, _) = get_json(&router, "/charts/data/?model=Nope&field=x").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get_json(&router, "/charts/data/").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_grid_data_endpoint() {
    let router = api_router();
    let (status, body) = get_json(
        &router,
        "/grids/data/?model=Order&columns=order_number,status,carrier",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_count"], 2);
    assert_eq!(body["columns"], json!(["order_number", "status", "carrier"]));
    assert_eq!(body["data"][0]["order_number"], "ORD-1");
    // Missing columns render as "-".
    assert_eq!(body["data"][0]["carrier"], "-");

    let (_, body) = get_json(
        &router,
        "/grids/data/?model=Order&columns=order_number&q=ord-2",
    )
    .await;
    assert_eq!(body["total_count"], 1);
}

#[tokio::test]
async fn test_stats_endpoint() {
    let router = api_router();
    let (status, body) = get_json(&router, "/stats/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["orders"], 2);
    assert_eq!(body["products"], 1);
    assert!((body["revenue"].as_f64().unwrap() - 230.0).abs() < 1e-9);
    assert_eq!(body["counts"]["product"], 1);
    // No payments are seeded, so the convenience keys default to zero.
    assert_eq!(body["payments"], 0);
}

#[tokio::test]
async fn test_model_fields_endpoint() {
    let router = api_router();
    let (status, body) = get_json(&router, "/models/fields/?model=Order").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["fields"], json!(["total_amount"]));

    // A known model with no numeric fields returns an empty list.
    let (status, body) = get_json(&router, "/models/fields/?model=Category").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["fields"], json!([]));

    let (status, _) = get_json(&router, "/models/fields/?model=Ghost").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get_json(&router, "/models/fields/").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_model_catalog_endpoints() {
    let router = api_router();
    let (status, body) = get_json(&router, "/models/charts/").await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"Order"));

    let (status, body) = get_json(&router, "/models/grids/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_preferences_roundtrip() {
    let router = api_router();

    let (status, body) = get_json(&router, "/preferences/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["theme_modern"], "ocean-blue");

    let (status, body) =
        post_json(&router, "/preferences/", &json!({"theme_modern": "emerald"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["theme_modern"], "emerald");

    let (status, body) = get_json(&router, "/preferences/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["theme_modern"], "emerald");

    let (status, _) =
        post_json(&router, "/preferences/", &json!({"theme_modern": "neon"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_stub() {
    let router = api_router();

    let (status, body) = post_json(
        &router,
        "/login/",
        &json!({"username": "admin", "password": "admin"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["is_staff"], true);

    let (status, _) = post_json(
        &router,
        "/login/",
        &json!({"username": "admin", "password": "nope"}),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
