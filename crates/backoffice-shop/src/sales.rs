//! Sales: orders and their items, invoices, payments.
//!
//! Orders edit with their items inline, and invoices with their payments,
//! so the parent/child relationships stay visible in the edit views.

use once_cell::sync::Lazy;

use backoffice_admin::autodiscover::AdminApp;
use backoffice_admin::model_admin::{factory, InlineAdmin, ModelAdmin};
use backoffice_admin::site::AdminSite;
use backoffice_core::apps::AppConfig;
use backoffice_core::error::BackofficeResult;
use backoffice_core::meta::{FieldDef, FieldType, ModelMeta, OnDelete};

/// Order lifecycle states, as (value, label) pairs.
pub const ORDER_STATUSES: [(&str, &str); 5] = [
    ("pending", "Pending"),
    ("processing", "Processing"),
    ("shipped", "Shipped"),
    ("delivered", "Delivered"),
    ("cancelled", "Cancelled"),
];

/// Invoice lifecycle states.
pub const INVOICE_STATUSES: [(&str, &str); 4] = [
    ("draft", "Draft"),
    ("sent", "Sent"),
    ("paid", "Paid"),
    ("cancelled", "Cancelled"),
];

/// Payment methods.
pub const PAYMENT_METHODS: [(&str, &str); 5] = [
    ("credit_card", "Credit card"),
    ("bank_transfer", "Bank transfer"),
    ("paypal", "PayPal"),
    ("cash", "Cash"),
    ("check", "Check"),
];

/// Payment lifecycle states.
pub const PAYMENT_STATUSES: [(&str, &str); 5] = [
    ("pending", "Pending"),
    ("processing", "Processing"),
    ("completed", "Completed"),
    ("failed", "Failed"),
    ("refunded", "Refunded"),
];

fn amount_field(name: &'static str) -> FieldDef {
    FieldDef::new(
        name,
        FieldType::DecimalField {
            max_digits: 10,
            decimal_places: 2,
        },
    )
}

static ORDER: Lazy<ModelMeta> = Lazy::new(|| {
    ModelMeta::new("sales", "Order")
        .ordering(vec!["-created_at"])
        .fields(vec![
            FieldDef::new("id", FieldType::BigAutoField).primary_key(),
            FieldDef::new(
                "user",
                FieldType::ForeignKey {
                    to: "accounts.user".to_string(),
                    on_delete: OnDelete::Cascade,
                    related_name: Some("orders".to_string()),
                },
            ),
            FieldDef::new("order_number", FieldType::CharField).max_length(50).unique(),
            FieldDef::new("status", FieldType::CharField)
                .max_length(20)
                .choices(ORDER_STATUSES.to_vec()),
            amount_field("total_amount"),
            FieldDef::new("shipping_address", FieldType::TextField),
            FieldDef::new("shipping_city", FieldType::CharField).max_length(100),
            FieldDef::new("shipping_postal_code", FieldType::CharField).max_length(10),
            FieldDef::new("shipping_country", FieldType::CharField).max_length(100),
            FieldDef::new("notes", FieldType::TextField).blank().null(),
            FieldDef::new("created_at", FieldType::DateTimeField),
            FieldDef::new("updated_at", FieldType::DateTimeField),
        ])
});

static ORDER_ITEM: Lazy<ModelMeta> = Lazy::new(|| {
    ModelMeta::new("sales", "OrderItem")
        .verbose_name("order item")
        .verbose_name_plural("order items")
        .fields(vec![
            FieldDef::new("id", FieldType::BigAutoField).primary_key(),
            FieldDef::new(
                "order",
                FieldType::ForeignKey {
                    to: "sales.order".to_string(),
                    on_delete: OnDelete::Cascade,
                    related_name: Some("items".to_string()),
                },
            ),
            FieldDef::new(
                "product",
                FieldType::ForeignKey {
                    to: "catalog.product".to_string(),
                    on_delete: OnDelete::Cascade,
                    related_name: None,
                },
            ),
            FieldDef::new("quantity", FieldType::IntegerField),
            amount_field("unit_price"),
            amount_field("subtotal"),
            FieldDef::new("created_at", FieldType::DateTimeField),
        ])
});

static INVOICE: Lazy<ModelMeta> = Lazy::new(|| {
    ModelMeta::new("sales", "Invoice")
        .ordering(vec!["-issued_date"])
        .fields(vec![
            FieldDef::new("id", FieldType::BigAutoField).primary_key(),
            FieldDef::new(
                "order",
                FieldType::OneToOneField {
                    to: "sales.order".to_string(),
                    on_delete: OnDelete::Cascade,
                    related_name: Some("invoice".to_string()),
                },
            ),
            FieldDef::new("invoice_number", FieldType::CharField).max_length(50).unique(),
            FieldDef::new("status", FieldType::CharField)
                .max_length(20)
                .choices(INVOICE_STATUSES.to_vec()),
            amount_field("subtotal"),
            amount_field("tax_amount"),
            amount_field("total_amount"),
            FieldDef::new("issued_date", FieldType::DateField),
            FieldDef::new("due_date", FieldType::DateField),
            FieldDef::new("notes", FieldType::TextField).blank().null(),
            FieldDef::new("created_at", FieldType::DateTimeField),
            FieldDef::new("updated_at", FieldType::DateTimeField),
        ])
});

static PAYMENT: Lazy<ModelMeta> = Lazy::new(|| {
    ModelMeta::new("sales", "Payment")
        .ordering(vec!["-created_at"])
        .fields(vec![
            FieldDef::new("id", FieldType::BigAutoField).primary_key(),
            FieldDef::new(
                "invoice",
                FieldType::ForeignKey {
                    to: "sales.invoice".to_string(),
                    on_delete: OnDelete::Cascade,
                    related_name: Some("payments".to_string()),
                },
            ),
            amount_field("amount"),
            FieldDef::new("method", FieldType::CharField)
                .max_length(20)
                .choices(PAYMENT_METHODS.to_vec()),
            FieldDef::new("status", FieldType::CharField)
                .max_length(20)
                .choices(PAYMENT_STATUSES.to_vec()),
            FieldDef::new("transaction_id", FieldType::CharField)
                .max_length(200)
                .blank()
                .null(),
            FieldDef::new("payment_date", FieldType::DateTimeField).blank().null(),
            FieldDef::new("notes", FieldType::TextField).blank().null(),
            FieldDef::new("created_at", FieldType::DateTimeField),
            FieldDef::new("updated_at", FieldType::DateTimeField),
        ])
});

/// Metadata of the order model.
pub fn order_meta() -> &'static ModelMeta {
    &ORDER
}

/// Metadata of the order item model.
pub fn order_item_meta() -> &'static ModelMeta {
    &ORDER_ITEM
}

/// Metadata of the invoice model.
pub fn invoice_meta() -> &'static ModelMeta {
    &INVOICE
}

/// Metadata of the payment model.
pub fn payment_meta() -> &'static ModelMeta {
    &PAYMENT
}

fn order_admin() -> ModelAdmin {
    ModelAdmin::new("sales", "order")
        .list_display(vec![
            "order_number",
            "user",
            "status",
            "total_amount",
            "shipping_city",
            "created_at",
        ])
        .search_fields(vec![
            "order_number",
            "user__username",
            "user__email",
            "shipping_address",
            "shipping_city",
        ])
        .list_filter(vec!["status", "shipping_country", "created_at"])
        .readonly_fields(vec!["created_at", "updated_at"])
        .ordering(vec!["-created_at"])
        .inlines(vec![InlineAdmin::tabular("sales", "orderitem")
            .extra(1)
            .fields(vec!["product", "quantity", "unit_price", "subtotal"])])
        .schema_from(&ORDER)
}

fn order_item_admin() -> ModelAdmin {
    ModelAdmin::new("sales", "orderitem")
        .verbose_name("order item")
        .verbose_name_plural("order items")
        .list_display(vec![
            "order",
            "product",
            "quantity",
            "unit_price",
            "subtotal",
            "created_at",
        ])
        .search_fields(vec!["order__order_number", "product__name", "product__sku"])
        .list_filter(vec!["created_at"])
        .readonly_fields(vec!["created_at"])
        .schema_from(&ORDER_ITEM)
}

fn invoice_admin() -> ModelAdmin {
    ModelAdmin::new("sales", "invoice")
        .list_display(vec![
            "invoice_number",
            "order",
            "status",
            "total_amount",
            "issued_date",
            "due_date",
            "created_at",
        ])
        .search_fields(vec![
            "invoice_number",
            "order__order_number",
            "order__user__username",
        ])
        .list_filter(vec!["status", "issued_date", "due_date", "created_at"])
        .readonly_fields(vec!["created_at", "updated_at"])
        .ordering(vec!["-issued_date"])
        .inlines(vec![InlineAdmin::tabular("sales", "payment")
            .extra(1)
            .fields(vec!["amount", "method", "status", "payment_date"])])
        .schema_from(&INVOICE)
}

fn payment_admin() -> ModelAdmin {
    ModelAdmin::new("sales", "payment")
        .list_display(vec![
            "invoice",
            "amount",
            "method",
            "status",
            "payment_date",
            "transaction_id",
            "created_at",
        ])
        .search_fields(vec![
            "transaction_id",
            "invoice__invoice_number",
            "invoice__order__order_number",
        ])
        .list_filter(vec!["method", "status", "payment_date", "created_at"])
        .readonly_fields(vec!["created_at", "updated_at"])
        .ordering(vec!["-created_at"])
        .schema_from(&PAYMENT)
}

/// The sales application.
pub struct SalesApp;

impl AppConfig for SalesApp {
    fn name(&self) -> &str {
        "sales"
    }

    fn verbose_name(&self) -> &str {
        "Sales"
    }

    fn models(&self) -> Vec<&'static ModelMeta> {
        vec![&*ORDER, &*ORDER_ITEM, &*INVOICE, &*PAYMENT]
    }
}

impl AdminApp for SalesApp {
    fn register_admins(&self, site: &mut AdminSite) -> BackofficeResult<()> {
        site.register(&ORDER, factory(order_admin))?;
        site.register(&ORDER_ITEM, factory(order_item_admin))?;
        site.register(&INVOICE, factory(invoice_admin))?;
        site.register(&PAYMENT, factory(payment_admin))?;
        Ok(())
    }
}
