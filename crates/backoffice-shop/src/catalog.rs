//! Product catalog: categories and products.

use once_cell::sync::Lazy;

use backoffice_admin::autodiscover::AdminApp;
use backoffice_admin::model_admin::{factory, ModelAdmin};
use backoffice_admin::site::AdminSite;
use backoffice_core::apps::AppConfig;
use backoffice_core::error::BackofficeResult;
use backoffice_core::meta::{FieldDef, FieldType, ModelMeta, OnDelete};

static CATEGORY: Lazy<ModelMeta> = Lazy::new(|| {
    ModelMeta::new("catalog", "Category")
        .verbose_name("category")
        .verbose_name_plural("categories")
        .ordering(vec!["name"])
        .fields(vec![
            FieldDef::new("id", FieldType::BigAutoField).primary_key(),
            FieldDef::new("name", FieldType::CharField).max_length(200).unique(),
            FieldDef::new("slug", FieldType::SlugField).max_length(200).unique(),
            FieldDef::new("description", FieldType::TextField).blank().null(),
            FieldDef::new("is_active", FieldType::BooleanField),
            FieldDef::new(
                "parent",
                FieldType::ForeignKey {
                    to: "catalog.category".to_string(),
                    on_delete: OnDelete::SetNull,
                    related_name: Some("children".to_string()),
                },
            )
            .blank()
            .null(),
            FieldDef::new("created_at", FieldType::DateTimeField),
            FieldDef::new("updated_at", FieldType::DateTimeField),
        ])
});

static PRODUCT: Lazy<ModelMeta> = Lazy::new(|| {
    ModelMeta::new("catalog", "Product")
        .ordering(vec!["-created_at"])
        .fields(vec![
            FieldDef::new("id", FieldType::BigAutoField).primary_key(),
            FieldDef::new("name", FieldType::CharField).max_length(200),
            FieldDef::new("slug", FieldType::SlugField).max_length(200).unique(),
            FieldDef::new("description", FieldType::TextField).blank().null(),
            FieldDef::new("short_description", FieldType::CharField)
                .max_length(500)
                .blank()
                .null(),
            FieldDef::new(
                "category",
                FieldType::ForeignKey {
                    to: "catalog.category".to_string(),
                    on_delete: OnDelete::SetNull,
                    related_name: Some("products".to_string()),
                },
            )
            .null(),
            FieldDef::new(
                "price",
                FieldType::DecimalField {
                    max_digits: 10,
                    decimal_places: 2,
                },
            ),
            FieldDef::new(
                "compare_price",
                FieldType::DecimalField {
                    max_digits: 10,
                    decimal_places: 2,
                },
            )
            .blank()
            .null(),
            FieldDef::new("sku", FieldType::CharField).max_length(100).unique(),
            FieldDef::new("stock_quantity", FieldType::IntegerField),
            FieldDef::new("is_active", FieldType::BooleanField),
            FieldDef::new("is_featured", FieldType::BooleanField),
            FieldDef::new(
                "weight",
                FieldType::DecimalField {
                    max_digits: 8,
                    decimal_places: 2,
                },
            )
            .blank()
            .null(),
            FieldDef::new("created_at", FieldType::DateTimeField),
            FieldDef::new("updated_at", FieldType::DateTimeField),
        ])
});

/// Metadata of the category model.
pub fn category_meta() -> &'static ModelMeta {
    &CATEGORY
}

/// Metadata of the product model.
pub fn product_meta() -> &'static ModelMeta {
    &PRODUCT
}

fn category_admin() -> ModelAdmin {
    ModelAdmin::new("catalog", "category")
        .verbose_name("category")
        .verbose_name_plural("categories")
        .list_display(vec!["name", "slug", "parent", "is_active", "created_at"])
        .search_fields(vec!["name", "slug", "description"])
        .list_filter(vec!["is_active", "parent", "created_at"])
        .prepopulate("slug", vec!["name"])
        .readonly_fields(vec!["created_at", "updated_at"])
        .ordering(vec!["name"])
        .schema_from(&CATEGORY)
}

fn product_admin() -> ModelAdmin {
    ModelAdmin::new("catalog", "product")
        .list_display(vec![
            "name",
            "sku",
            "category",
            "price",
            "stock_quantity",
            "is_active",
            "is_featured",
            "created_at",
        ])
        .search_fields(vec!["name", "sku", "description", "short_description"])
        .list_filter(vec!["category", "is_active", "is_featured", "created_at"])
        .prepopulate("slug", vec!["name"])
        .readonly_fields(vec!["created_at", "updated_at"])
        .ordering(vec!["-created_at"])
        .schema_from(&PRODUCT)
}

/// The catalog application.
pub struct CatalogApp;

impl AppConfig for CatalogApp {
    fn name(&self) -> &str {
        "catalog"
    }

    fn verbose_name(&self) -> &str {
        "Product Catalog"
    }

    fn models(&self) -> Vec<&'static ModelMeta> {
        vec![&*CATEGORY, &*PRODUCT]
    }
}

impl AdminApp for CatalogApp {
    fn register_admins(&self, site: &mut AdminSite) -> BackofficeResult<()> {
        site.register(&CATEGORY, factory(category_admin))?;
        site.register(&PRODUCT, factory(product_admin))?;
        Ok(())
    }
}
