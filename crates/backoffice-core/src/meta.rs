//! Declared model metadata.
//!
//! Every data model the panel can administer is described by a [`ModelMeta`]:
//! its application label, name, flags (abstract/proxy), and declared
//! [`FieldDef`] list. Capabilities that the dashboard needs, such as which
//! fields are numeric and which field dates an object, are derived from the
//! declared field types here, once, instead of being probed per-request.
//!
//! Applications expose their metadata as `&'static ModelMeta` values
//! (typically `once_cell::sync::Lazy` statics) and list them from their
//! [`AppConfig::models`](crate::apps::AppConfig::models) implementation.

use serde::{Deserialize, Serialize};

/// Field names probed, in order, when looking for the field that dates an
/// object (used by time-bucketed chart aggregation).
const DATE_FIELD_CANDIDATES: [&str; 4] = ["created_at", "date_joined", "created", "date_created"];

/// Field names that mark a model as revenue-bearing, in order of preference.
const AMOUNT_FIELD_CANDIDATES: [&str; 2] = ["total_amount", "amount"];

/// The type of a declared model field.
///
/// Relational variants carry the target model key (`"app.model"`) and the
/// delete behavior, which the admin uses to pair parents with inline
/// children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FieldType {
    /// Auto-incrementing 64-bit integer primary key.
    BigAutoField,
    /// Variable-length string with a max length.
    CharField,
    /// Unlimited-length text.
    TextField,
    /// URL-friendly string.
    SlugField,
    /// Email address.
    EmailField,
    /// 32-bit signed integer.
    IntegerField,
    /// 64-bit signed integer.
    BigIntegerField,
    /// 16-bit signed integer.
    SmallIntegerField,
    /// 32-bit integer constrained to non-negative values.
    PositiveIntegerField,
    /// 64-bit floating-point number.
    FloatField,
    /// Fixed-precision decimal number.
    DecimalField {
        /// Maximum total digits.
        max_digits: u32,
        /// Digits after the decimal point.
        decimal_places: u32,
    },
    /// Boolean (true/false).
    BooleanField,
    /// Date without time.
    DateField,
    /// Date and time.
    DateTimeField,
    /// JSON data.
    JsonField,
    /// Many-to-one relationship.
    ForeignKey {
        /// The target model key (e.g. "catalog.product").
        to: String,
        /// Behavior when the referenced object is deleted.
        on_delete: OnDelete,
        /// The name used for the reverse relation.
        related_name: Option<String>,
    },
    /// One-to-one relationship (unique foreign key).
    OneToOneField {
        /// The target model key.
        to: String,
        /// Behavior when the referenced object is deleted.
        on_delete: OnDelete,
        /// The name used for the reverse relation.
        related_name: Option<String>,
    },
}

impl FieldType {
    /// Whether this field type is numeric for charting purposes.
    ///
    /// Primary-key auto fields are deliberately not numeric: summing object
    /// ids produces nothing a dashboard wants.
    pub const fn is_numeric(&self) -> bool {
        matches!(
            self,
            Self::IntegerField
                | Self::BigIntegerField
                | Self::SmallIntegerField
                | Self::PositiveIntegerField
                | Self::FloatField
                | Self::DecimalField { .. }
        )
    }

    /// Whether this field holds a date or datetime.
    pub const fn is_temporal(&self) -> bool {
        matches!(self, Self::DateField | Self::DateTimeField)
    }

    /// Whether this is a relational field.
    pub const fn is_relation(&self) -> bool {
        matches!(self, Self::ForeignKey { .. } | Self::OneToOneField { .. })
    }

    /// The target model key for relational fields.
    pub fn related_model(&self) -> Option<&str> {
        match self {
            Self::ForeignKey { to, .. } | Self::OneToOneField { to, .. } => Some(to),
            _ => None,
        }
    }

    /// The type name as presented to API consumers (e.g. `"DecimalField"`).
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::BigAutoField => "BigAutoField",
            Self::CharField => "CharField",
            Self::TextField => "TextField",
            Self::SlugField => "SlugField",
            Self::EmailField => "EmailField",
            Self::IntegerField => "IntegerField",
            Self::BigIntegerField => "BigIntegerField",
            Self::SmallIntegerField => "SmallIntegerField",
            Self::PositiveIntegerField => "PositiveIntegerField",
            Self::FloatField => "FloatField",
            Self::DecimalField { .. } => "DecimalField",
            Self::BooleanField => "BooleanField",
            Self::DateField => "DateField",
            Self::DateTimeField => "DateTimeField",
            Self::JsonField => "JsonField",
            Self::ForeignKey { .. } => "ForeignKey",
            Self::OneToOneField { .. } => "OneToOneField",
        }
    }
}

/// Behavior when a referenced object is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OnDelete {
    /// Delete all related objects.
    Cascade,
    /// Prevent deletion if related objects exist.
    Protect,
    /// Set the foreign key to NULL.
    SetNull,
}

/// Declaration of a single model field.
#[derive(Debug, Clone, Serialize)]
pub struct FieldDef {
    /// The field name.
    pub name: &'static str,
    /// The type of this field.
    pub field_type: FieldType,
    /// Whether this field is the primary key.
    pub primary_key: bool,
    /// Whether the field may be null.
    pub null: bool,
    /// Whether the field may be left blank in forms.
    pub blank: bool,
    /// Whether a unique constraint applies.
    pub unique: bool,
    /// Maximum character length, if applicable.
    pub max_length: Option<usize>,
    /// Human-readable name for the field.
    pub verbose_name: String,
    /// Allowed values as (value, display label) pairs, if constrained.
    pub choices: Option<Vec<(String, String)>>,
}

impl FieldDef {
    /// Creates a field declaration with defaults: non-null, non-blank,
    /// not unique, no length limit, no choices.
    pub fn new(name: &'static str, field_type: FieldType) -> Self {
        Self {
            name,
            field_type,
            primary_key: false,
            null: false,
            blank: false,
            unique: false,
            max_length: None,
            verbose_name: name.replace('_', " "),
            choices: None,
        }
    }

    /// Marks this field as the primary key.
    #[must_use]
    pub const fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Allows NULL values.
    #[must_use]
    pub const fn null(mut self) -> Self {
        self.null = true;
        self
    }

    /// Allows the field to be left blank.
    #[must_use]
    pub const fn blank(mut self) -> Self {
        self.blank = true;
        self
    }

    /// Applies a unique constraint.
    #[must_use]
    pub const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Sets the maximum character length.
    #[must_use]
    pub const fn max_length(mut self, len: usize) -> Self {
        self.max_length = Some(len);
        self
    }

    /// Sets the human-readable name.
    #[must_use]
    pub fn verbose_name(mut self, name: impl Into<String>) -> Self {
        self.verbose_name = name.into();
        self
    }

    /// Constrains the field to the given (value, label) choices.
    #[must_use]
    pub fn choices(mut self, choices: Vec<(&str, &str)>) -> Self {
        self.choices = Some(
            choices
                .into_iter()
                .map(|(v, l)| (v.to_string(), l.to_string()))
                .collect(),
        );
        self
    }
}

/// Complete metadata for one administrable model.
#[derive(Debug, Clone, Serialize)]
pub struct ModelMeta {
    /// The application label (e.g. "sales").
    pub app_label: &'static str,
    /// The model name in lowercase (e.g. "orderitem").
    pub model_name: String,
    /// The model's type name (e.g. "OrderItem").
    pub object_name: &'static str,
    /// Human-readable name.
    pub verbose_name: String,
    /// Plural human-readable name.
    pub verbose_name_plural: String,
    /// Whether the model is abstract (never registered).
    pub abstract_model: bool,
    /// Whether the model is a proxy for another model.
    pub proxy: bool,
    /// Default ordering (prefix with "-" for descending).
    pub ordering: Vec<String>,
    /// Declared fields.
    pub fields: Vec<FieldDef>,
}

impl ModelMeta {
    /// Creates metadata for a concrete model.
    ///
    /// The lowercase model name and default verbose names are derived from
    /// `object_name`; override them with the builder methods where the
    /// defaults read badly.
    pub fn new(app_label: &'static str, object_name: &'static str) -> Self {
        let model_name = object_name.to_lowercase();
        let verbose_name = model_name.clone();
        let verbose_name_plural = format!("{verbose_name}s");
        Self {
            app_label,
            model_name,
            object_name,
            verbose_name,
            verbose_name_plural,
            abstract_model: false,
            proxy: false,
            ordering: Vec::new(),
            fields: Vec::new(),
        }
    }

    /// Sets the human-readable name.
    #[must_use]
    pub fn verbose_name(mut self, name: impl Into<String>) -> Self {
        self.verbose_name = name.into();
        self
    }

    /// Sets the plural human-readable name.
    #[must_use]
    pub fn verbose_name_plural(mut self, name: impl Into<String>) -> Self {
        self.verbose_name_plural = name.into();
        self
    }

    /// Marks the model as abstract.
    #[must_use]
    pub const fn abstract_model(mut self) -> Self {
        self.abstract_model = true;
        self
    }

    /// Marks the model as a proxy.
    #[must_use]
    pub const fn proxy(mut self) -> Self {
        self.proxy = true;
        self
    }

    /// Sets the default ordering.
    #[must_use]
    pub fn ordering(mut self, fields: Vec<&str>) -> Self {
        self.ordering = fields.into_iter().map(String::from).collect();
        self
    }

    /// Sets the declared fields.
    #[must_use]
    pub fn fields(mut self, fields: Vec<FieldDef>) -> Self {
        self.fields = fields;
        self
    }

    /// Returns the model key in `"app_label.model_name"` format.
    pub fn key(&self) -> String {
        format!("{}.{}", self.app_label, self.model_name)
    }

    /// Returns the declared field with the given name, if any.
    pub fn get_field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Returns whether the model declares a field with the given name.
    pub fn has_field(&self, name: &str) -> bool {
        self.get_field(name).is_some()
    }

    /// Returns all declared field names.
    pub fn field_names(&self) -> Vec<&'static str> {
        self.fields.iter().map(|f| f.name).collect()
    }

    /// Returns the names of numeric fields, in declaration order.
    pub fn numeric_field_names(&self) -> Vec<&'static str> {
        self.fields
            .iter()
            .filter(|f| f.field_type.is_numeric())
            .map(|f| f.name)
            .collect()
    }

    /// Returns the field that dates an object, if the model declares one.
    ///
    /// Checked against a fixed candidate list (`created_at`, `date_joined`,
    /// `created`, `date_created`) so that time-bucketed charts work for
    /// models that use any of the common conventions.
    pub fn date_field(&self) -> Option<&'static str> {
        DATE_FIELD_CANDIDATES.iter().copied().find(|name| {
            self.get_field(name)
                .is_some_and(|f| f.field_type.is_temporal())
        })
    }

    /// Returns the revenue-bearing field, if any.
    ///
    /// Prefers `total_amount` over `amount`; either must be numeric.
    pub fn amount_field(&self) -> Option<&'static str> {
        AMOUNT_FIELD_CANDIDATES.iter().copied().find(|name| {
            self.get_field(name)
                .is_some_and(|f| f.field_type.is_numeric())
        })
    }

    /// Returns whether this model declares a FK or O2O field pointing at the
    /// model identified by `parent_key`.
    pub fn relates_to(&self, parent_key: &str) -> bool {
        self.fields
            .iter()
            .any(|f| f.field_type.related_model() == Some(parent_key))
    }
}
