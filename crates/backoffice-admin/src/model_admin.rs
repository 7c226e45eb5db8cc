//! Per-model administration configuration.
//!
//! A [`ModelAdmin`] bundles the display policy for one model: list columns,
//! searchable and filterable fields, readonly fields, and inline child
//! editors. Applications declare bespoke configurations in their admin
//! module; models without one get [`ModelAdmin::for_model`], the generic
//! configuration derived from declared metadata.
//!
//! Configurations are registered through an [`AdminFactory`], a constructor
//! invoked once per target site, so that two sites never share one
//! configuration instance.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use backoffice_core::meta::{FieldDef, ModelMeta};

/// Constructor for a [`ModelAdmin`].
///
/// Discovery keeps the factory alongside each registry entry and invokes it
/// whenever a configuration has to be bound to another site, instead of
/// handing the existing instance around.
pub type AdminFactory = Arc<dyn Fn() -> ModelAdmin + Send + Sync>;

/// Wraps a plain constructor function into an [`AdminFactory`].
pub fn factory(f: fn() -> ModelAdmin) -> AdminFactory {
    Arc::new(f)
}

/// Display and edit policy for one model.
///
/// # Examples
///
/// ```
/// use backoffice_admin::model_admin::ModelAdmin;
///
/// let admin = ModelAdmin::new("catalog", "product")
///     .list_display(vec!["name", "sku", "price", "is_active"])
///     .search_fields(vec!["name", "sku", "description"])
///     .list_filter(vec!["category", "is_active"])
///     .readonly_fields(vec!["created_at", "updated_at"]);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelAdmin {
    /// The application label (e.g. "sales").
    pub app_label: String,
    /// The model name in lowercase (e.g. "order").
    pub model_name: String,
    /// The human-readable verbose name.
    pub verbose_name: String,
    /// The human-readable plural verbose name.
    pub verbose_name_plural: String,
    /// Fields shown as columns in the list view.
    pub list_display: Vec<String>,
    /// Fields offered as sidebar filters in the list view.
    pub list_filter: Vec<String>,
    /// Fields searched when using the search box.
    pub search_fields: Vec<String>,
    /// Default ordering (prefix with "-" for descending).
    pub ordering: Vec<String>,
    /// Number of items per page in the list view.
    pub list_per_page: usize,
    /// Fields that are read-only in forms.
    pub readonly_fields: Vec<String>,
    /// Fields auto-populated from other fields (target -> sources).
    pub prepopulated_fields: HashMap<String, Vec<String>>,
    /// Inline child editors embedded in this model's edit form.
    pub inlines: Vec<InlineAdmin>,
    /// Schema of the model's fields, for frontend introspection.
    pub fields_schema: Vec<FieldSchema>,
}

impl ModelAdmin {
    /// Creates a configuration with default policy and no field schema.
    pub fn new(app_label: impl Into<String>, model_name: impl Into<String>) -> Self {
        let model = model_name.into();
        let verbose = model.replace('_', " ");
        let verbose_plural = format!("{verbose}s");
        Self {
            app_label: app_label.into(),
            model_name: model,
            verbose_name: verbose,
            verbose_name_plural: verbose_plural,
            list_display: vec!["__str__".to_string()],
            list_filter: Vec::new(),
            search_fields: Vec::new(),
            ordering: Vec::new(),
            list_per_page: 25,
            readonly_fields: Vec::new(),
            prepopulated_fields: HashMap::new(),
            inlines: Vec::new(),
            fields_schema: Vec::new(),
        }
    }

    /// Creates the generic configuration for a model: names, ordering, and
    /// field schema taken from the declared metadata, default policy for
    /// everything else.
    ///
    /// This is what a model gets when no bespoke configuration is declared
    /// for it, and what registration falls back to when a bespoke
    /// configuration cannot be bound.
    pub fn for_model(meta: &ModelMeta) -> Self {
        let mut admin = Self::new(meta.app_label, meta.model_name.clone());
        admin.verbose_name = meta.verbose_name.clone();
        admin.verbose_name_plural = meta.verbose_name_plural.clone();
        admin.ordering = meta.ordering.clone();
        admin.fields_schema = meta.fields.iter().map(FieldSchema::from_field).collect();
        admin
    }

    /// Sets the verbose name.
    #[must_use]
    pub fn verbose_name(mut self, name: impl Into<String>) -> Self {
        self.verbose_name = name.into();
        self
    }

    /// Sets the plural verbose name.
    #[must_use]
    pub fn verbose_name_plural(mut self, name: impl Into<String>) -> Self {
        self.verbose_name_plural = name.into();
        self
    }

    /// Sets the list view columns.
    #[must_use]
    pub fn list_display(mut self, fields: Vec<&str>) -> Self {
        self.list_display = fields.into_iter().map(String::from).collect();
        self
    }

    /// Sets the sidebar filter fields.
    #[must_use]
    pub fn list_filter(mut self, fields: Vec<&str>) -> Self {
        self.list_filter = fields.into_iter().map(String::from).collect();
        self
    }

    /// Sets the searchable fields.
    #[must_use]
    pub fn search_fields(mut self, fields: Vec<&str>) -> Self {
        self.search_fields = fields.into_iter().map(String::from).collect();
        self
    }

    /// Sets the default ordering.
    #[must_use]
    pub fn ordering(mut self, fields: Vec<&str>) -> Self {
        self.ordering = fields.into_iter().map(String::from).collect();
        self
    }

    /// Sets the number of items per page.
    #[must_use]
    pub const fn list_per_page(mut self, count: usize) -> Self {
        self.list_per_page = count;
        self
    }

    /// Sets the read-only fields.
    #[must_use]
    pub fn readonly_fields(mut self, fields: Vec<&str>) -> Self {
        self.readonly_fields = fields.into_iter().map(String::from).collect();
        self
    }

    /// Declares a prepopulated field (e.g. a slug built from a name).
    #[must_use]
    pub fn prepopulate(mut self, target: &str, sources: Vec<&str>) -> Self {
        self.prepopulated_fields.insert(
            target.to_string(),
            sources.into_iter().map(String::from).collect(),
        );
        self
    }

    /// Sets the inline child editors.
    #[must_use]
    pub fn inlines(mut self, inlines: Vec<InlineAdmin>) -> Self {
        self.inlines = inlines;
        self
    }

    /// Sets the field schema from declared metadata.
    #[must_use]
    pub fn schema_from(mut self, meta: &ModelMeta) -> Self {
        self.fields_schema = meta.fields.iter().map(FieldSchema::from_field).collect();
        self
    }

    /// Returns the model key in `"app_label.model_name"` format.
    pub fn model_key(&self) -> String {
        format!("{}.{}", self.app_label, self.model_name)
    }

    /// Returns whether this configuration declares any inline editors.
    pub fn has_inlines(&self) -> bool {
        !self.inlines.is_empty()
    }
}

/// Configuration for inline child editing within a parent's edit form.
///
/// The inline model must be joined to the parent by a foreign key or a
/// one-to-one field; registration verifies this.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InlineAdmin {
    /// The app label of the inline model.
    pub app_label: String,
    /// The model name of the inline model.
    pub model_name: String,
    /// The display layout for the inline editor.
    pub inline_type: InlineType,
    /// Number of extra empty forms to display.
    pub extra: usize,
    /// Fields to display in the inline form; empty means all editable fields.
    pub fields: Vec<String>,
}

impl InlineAdmin {
    /// Creates a tabular inline for the given child model.
    pub fn tabular(app_label: impl Into<String>, model_name: impl Into<String>) -> Self {
        Self::new(app_label, model_name, InlineType::Tabular)
    }

    /// Creates a stacked inline for the given child model.
    pub fn stacked(app_label: impl Into<String>, model_name: impl Into<String>) -> Self {
        Self::new(app_label, model_name, InlineType::Stacked)
    }

    fn new(
        app_label: impl Into<String>,
        model_name: impl Into<String>,
        inline_type: InlineType,
    ) -> Self {
        Self {
            app_label: app_label.into(),
            model_name: model_name.into(),
            inline_type,
            extra: 3,
            fields: Vec::new(),
        }
    }

    /// Sets the number of extra empty forms.
    #[must_use]
    pub const fn extra(mut self, n: usize) -> Self {
        self.extra = n;
        self
    }

    /// Sets the fields to display.
    #[must_use]
    pub fn fields(mut self, fields: Vec<&str>) -> Self {
        self.fields = fields.into_iter().map(String::from).collect();
        self
    }

    /// Returns the inline model's key in `"app_label.model_name"` format.
    pub fn model_key(&self) -> String {
        format!("{}.{}", self.app_label, self.model_name)
    }
}

/// The visual layout style for inline editors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InlineType {
    /// Table-based layout with each inline as a row.
    Tabular,
    /// Form-based layout with each inline as a full form block.
    Stacked,
}

/// Schema of a single model field, sent to the frontend so it can render
/// list columns and forms without a separate definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSchema {
    /// The field name.
    pub name: String,
    /// The field type name (e.g. "CharField", "DecimalField").
    pub field_type: String,
    /// Whether the field must be provided.
    pub required: bool,
    /// Whether the field is read-only.
    pub read_only: bool,
    /// Whether the field is the primary key.
    pub primary_key: bool,
    /// Maximum character length, if applicable.
    pub max_length: Option<usize>,
    /// Human-readable label.
    pub label: String,
    /// Allowed choices as (value, label) pairs, if constrained.
    pub choices: Option<Vec<(String, String)>>,
    /// The target model key for relational fields.
    pub related_model: Option<String>,
}

impl FieldSchema {
    /// Derives the schema entry for a declared field.
    pub fn from_field(field: &FieldDef) -> Self {
        Self {
            name: field.name.to_string(),
            field_type: field.field_type.type_name().to_string(),
            required: !(field.null || field.blank || field.primary_key),
            read_only: field.primary_key,
            primary_key: field.primary_key,
            max_length: field.max_length,
            label: field.verbose_name.clone(),
            choices: field.choices.clone(),
            related_model: field.field_type.related_model().map(String::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backoffice_core::meta::{FieldType, OnDelete};

    fn product_meta() -> ModelMeta {
        ModelMeta::new("catalog", "Product")
            .verbose_name("product")
            .verbose_name_plural("products")
            .ordering(vec!["-created_at"])
            .fields(vec![
                FieldDef::new("id", FieldType::BigAutoField).primary_key(),
                FieldDef::new("name", FieldType::CharField).max_length(200),
                FieldDef::new("category", FieldType::ForeignKey {
                    to: "catalog.category".to_string(),
                    on_delete: OnDelete::SetNull,
                    related_name: Some("products".to_string()),
                })
                .null(),
                FieldDef::new("price", FieldType::DecimalField {
                    max_digits: 10,
                    decimal_places: 2,
                }),
            ])
    }

    #[test]
    fn test_new_defaults() {
        let admin = ModelAdmin::new("sales", "order");
        assert_eq!(admin.model_key(), "sales.order");
        assert_eq!(admin.list_display, vec!["__str__"]);
        assert_eq!(admin.list_per_page, 25);
        assert!(admin.search_fields.is_empty());
        assert!(!admin.has_inlines());
    }

    #[test]
    fn test_for_model_derives_from_meta() {
        let meta = product_meta();
        let admin = ModelAdmin::for_model(&meta);
        assert_eq!(admin.model_key(), "catalog.product");
        assert_eq!(admin.verbose_name_plural, "products");
        assert_eq!(admin.ordering, vec!["-created_at"]);
        assert_eq!(admin.fields_schema.len(), 4);
        assert!(admin.fields_schema[0].primary_key);
        assert_eq!(
            admin.fields_schema[2].related_model.as_deref(),
            Some("catalog.category")
        );
    }

    #[test]
    fn test_builder() {
        let admin = ModelAdmin::new("catalog", "product")
            .list_display(vec!["name", "sku", "price"])
            .search_fields(vec!["name", "sku"])
            .list_filter(vec!["is_active"])
            .ordering(vec!["name"])
            .list_per_page(50)
            .readonly_fields(vec!["created_at"])
            .prepopulate("slug", vec!["name"]);

        assert_eq!(admin.list_display, vec!["name", "sku", "price"]);
        assert_eq!(admin.search_fields, vec!["name", "sku"]);
        assert_eq!(admin.list_filter, vec!["is_active"]);
        assert_eq!(admin.list_per_page, 50);
        assert_eq!(
            admin.prepopulated_fields.get("slug"),
            Some(&vec!["name".to_string()])
        );
    }

    #[test]
    fn test_inline_builders() {
        let inline = InlineAdmin::tabular("sales", "orderitem")
            .extra(1)
            .fields(vec!["product", "quantity", "unit_price"]);
        assert_eq!(inline.model_key(), "sales.orderitem");
        assert_eq!(inline.inline_type, InlineType::Tabular);
        assert_eq!(inline.extra, 1);
        assert_eq!(inline.fields.len(), 3);

        let stacked = InlineAdmin::stacked("sales", "invoice");
        assert_eq!(stacked.inline_type, InlineType::Stacked);
        assert_eq!(stacked.extra, 3);
    }

    #[test]
    fn test_has_inlines() {
        let admin = ModelAdmin::new("sales", "order")
            .inlines(vec![InlineAdmin::tabular("sales", "orderitem")]);
        assert!(admin.has_inlines());
    }

    #[test]
    fn test_field_schema_required_logic() {
        let meta = product_meta();
        let schemas: Vec<FieldSchema> = meta.fields.iter().map(FieldSchema::from_field).collect();
        // Primary keys are read-only and not required.
        assert!(!schemas[0].required);
        assert!(schemas[0].read_only);
        // Plain non-null fields are required.
        assert!(schemas[1].required);
        assert_eq!(schemas[1].max_length, Some(200));
        // Nullable FK is optional.
        assert!(!schemas[2].required);
    }

    #[test]
    fn test_factory_builds_fresh_instances() {
        fn order_admin() -> ModelAdmin {
            ModelAdmin::new("sales", "order").search_fields(vec!["order_number"])
        }
        let f = factory(order_admin);
        let a = f();
        let b = f();
        assert_eq!(a.search_fields, b.search_fields);
        // Two invocations produce independent values.
        let mut a = a;
        a.search_fields.push("status".to_string());
        assert_ne!(a.search_fields.len(), b.search_fields.len());
    }

    #[test]
    fn test_serialization() {
        let admin = ModelAdmin::new("catalog", "product").list_per_page(10);
        let json = serde_json::to_string(&admin).unwrap();
        assert!(json.contains("\"app_label\":\"catalog\""));
        assert!(json.contains("\"list_per_page\":10"));
    }
}
