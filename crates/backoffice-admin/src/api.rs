//! JSON request/response types for the admin REST API.
//!
//! These are the payloads the dashboard frontend consumes: the model index,
//! per-model schemas, paginated lists, chart series, grid rows, and the
//! quick-stats summary.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model_admin::{FieldSchema, InlineAdmin, ModelAdmin};

/// A paginated response for list views.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonListResponse {
    /// The objects for the current page.
    pub results: Vec<Value>,
    /// Total number of matching objects (across all pages).
    pub count: usize,
    /// The current page number (1-indexed).
    pub page: usize,
    /// The number of items per page.
    pub page_size: usize,
    /// Total number of pages.
    pub total_pages: usize,
    /// Whether there is a next page.
    pub has_next: bool,
    /// Whether there is a previous page.
    pub has_previous: bool,
}

impl JsonListResponse {
    /// Slices a full result set down to one page and fills in the
    /// pagination metadata.
    pub fn paginate(all_results: &[Value], page: usize, page_size: usize) -> Self {
        let count = all_results.len();
        let page_size = page_size.max(1);
        let total_pages = count.div_ceil(page_size).max(1);
        let page = page.clamp(1, total_pages);

        let start = (page - 1) * page_size;
        let end = (start + page_size).min(count);
        let results = if start < count {
            all_results[start..end].to_vec()
        } else {
            Vec::new()
        };

        Self {
            results,
            count,
            page,
            page_size,
            total_pages,
            has_next: page < total_pages,
            has_previous: page > 1,
        }
    }
}

/// The model index: registered models grouped by application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelIndexResponse {
    /// The registered models grouped by app label.
    pub apps: Vec<AppModels>,
}

/// Models grouped under an application label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppModels {
    /// The application label.
    pub app_label: String,
    /// The models registered under this app.
    pub models: Vec<ModelInfo>,
}

/// Summary information about one registered model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    /// The model name.
    pub name: String,
    /// The human-readable name.
    pub verbose_name: String,
    /// The plural human-readable name.
    pub verbose_name_plural: String,
    /// The API URL for this model's list view.
    pub url: String,
}

/// Builds the model index from registered admin configurations.
pub fn build_model_index<'a, I>(admins: I, url_prefix: &str) -> ModelIndexResponse
where
    I: IntoIterator<Item = &'a ModelAdmin>,
{
    let mut apps_map: HashMap<String, Vec<ModelInfo>> = HashMap::new();

    for admin in admins {
        let info = ModelInfo {
            name: admin.model_name.clone(),
            verbose_name: admin.verbose_name.clone(),
            verbose_name_plural: admin.verbose_name_plural.clone(),
            url: format!("{}/{}/{}/", url_prefix, admin.app_label, admin.model_name),
        };
        apps_map
            .entry(admin.app_label.clone())
            .or_default()
            .push(info);
    }

    let mut apps: Vec<AppModels> = apps_map
        .into_iter()
        .map(|(app_label, mut models)| {
            models.sort_by(|a, b| a.name.cmp(&b.name));
            AppModels { app_label, models }
        })
        .collect();
    apps.sort_by(|a, b| a.app_label.cmp(&b.app_label));

    ModelIndexResponse { apps }
}

/// Schema of one registered model, used by the frontend for rendering
/// list views and forms.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSchemaResponse {
    /// The application label.
    pub app_label: String,
    /// The model name.
    pub model_name: String,
    /// Human-readable name.
    pub verbose_name: String,
    /// Plural human-readable name.
    pub verbose_name_plural: String,
    /// Field schema definitions.
    pub fields: Vec<FieldSchema>,
    /// Fields displayed in the list view.
    pub list_display: Vec<String>,
    /// Fields offered as sidebar filters.
    pub list_filter: Vec<String>,
    /// Fields that are searchable.
    pub search_fields: Vec<String>,
    /// Default ordering.
    pub ordering: Vec<String>,
    /// Read-only fields.
    pub readonly_fields: Vec<String>,
    /// Prepopulated fields (target -> sources).
    pub prepopulated_fields: HashMap<String, Vec<String>>,
    /// Inline child editors.
    pub inlines: Vec<InlineAdmin>,
    /// Number of items per page.
    pub list_per_page: usize,
}

impl ModelSchemaResponse {
    /// Creates a schema response from a registered configuration.
    pub fn from_admin(admin: &ModelAdmin) -> Self {
        Self {
            app_label: admin.app_label.clone(),
            model_name: admin.model_name.clone(),
            verbose_name: admin.verbose_name.clone(),
            verbose_name_plural: admin.verbose_name_plural.clone(),
            fields: admin.fields_schema.clone(),
            list_display: admin.list_display.clone(),
            list_filter: admin.list_filter.clone(),
            search_fields: admin.search_fields.clone(),
            ordering: admin.ordering.clone(),
            readonly_fields: admin.readonly_fields.clone(),
            prepopulated_fields: admin.prepopulated_fields.clone(),
            inlines: admin.inlines.clone(),
            list_per_page: admin.list_per_page,
        }
    }
}

/// A chart series: one label and one value per time bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartDataResponse {
    /// Bucket labels, oldest first.
    pub labels: Vec<String>,
    /// Aggregated values, aligned with `labels`.
    pub data: Vec<f64>,
    /// The chart type requested by the caller, echoed back.
    pub chart_type: String,
}

/// Grid rows projected onto the requested columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridDataResponse {
    /// The projected rows.
    pub data: Vec<Value>,
    /// The requested columns.
    pub columns: Vec<String>,
    /// Total number of matching rows before pagination, when paginated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_count: Option<usize>,
}

/// Quick dashboard statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    /// Object counts per model (lowercase model name), for models with data.
    pub counts: HashMap<String, usize>,
    /// Number of orders.
    pub orders: usize,
    /// Number of invoices.
    pub invoices: usize,
    /// Number of payments.
    pub payments: usize,
    /// Number of products.
    pub products: usize,
    /// Total revenue summed from amount-bearing models.
    pub revenue: f64,
}

/// Numeric fields of one model, for chart auto-completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelFieldsResponse {
    /// The model name as requested.
    pub model: String,
    /// The model's numeric field names.
    pub fields: Vec<String>,
}

/// Login credentials.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    /// The username.
    pub username: String,
    /// The password.
    pub password: String,
}

/// Successful login payload.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    /// Opaque session token.
    pub token: String,
    /// The authenticated user.
    pub user: CurrentUserResponse,
}

/// Current user info.
#[derive(Debug, Clone, Serialize)]
pub struct CurrentUserResponse {
    /// The username.
    pub username: String,
    /// The user's email.
    pub email: String,
    /// Whether the user is a staff member.
    pub is_staff: bool,
    /// Whether the user is a superuser.
    pub is_superuser: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_paginate_middle_page() {
        let objects: Vec<Value> = (1..=25).map(|i| json!({"id": i})).collect();
        let page = JsonListResponse::paginate(&objects, 2, 10);
        assert_eq!(page.count, 25);
        assert_eq!(page.results.len(), 10);
        assert_eq!(page.results[0]["id"], 11);
        assert_eq!(page.total_pages, 3);
        assert!(page.has_next);
        assert!(page.has_previous);
    }

    #[test]
    fn test_paginate_clamps_page() {
        let objects: Vec<Value> = (1..=5).map(|i| json!({"id": i})).collect();
        let page = JsonListResponse::paginate(&objects, 99, 10);
        assert_eq!(page.page, 1);
        assert_eq!(page.results.len(), 5);
        assert!(!page.has_next);
    }

    #[test]
    fn test_paginate_zero_page_size() {
        let objects: Vec<Value> = (1..=3).map(|i| json!({"id": i})).collect();
        let page = JsonListResponse::paginate(&objects, 1, 0);
        assert_eq!(page.page_size, 1);
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn test_paginate_empty() {
        let page = JsonListResponse::paginate(&[], 1, 10);
        assert_eq!(page.count, 0);
        assert_eq!(page.total_pages, 1);
        assert!(page.results.is_empty());
    }

    #[test]
    fn test_build_model_index_groups_and_sorts() {
        let admins = vec![
            ModelAdmin::new("sales", "order"),
            ModelAdmin::new("catalog", "product"),
            ModelAdmin::new("sales", "invoice"),
        ];
        let index = build_model_index(admins.iter(), "/api/admin");

        assert_eq!(index.apps.len(), 2);
        assert_eq!(index.apps[0].app_label, "catalog");
        assert_eq!(index.apps[1].app_label, "sales");
        assert_eq!(index.apps[1].models[0].name, "invoice");
        assert_eq!(index.apps[1].models[1].name, "order");
        assert_eq!(index.apps[0].models[0].url, "/api/admin/catalog/product/");
    }

    #[test]
    fn test_model_schema_from_admin() {
        let admin = ModelAdmin::new("sales", "order")
            .search_fields(vec!["order_number"])
            .list_filter(vec!["status"])
            .readonly_fields(vec!["created_at"])
            .inlines(vec![crate::model_admin::InlineAdmin::tabular(
                "sales",
                "orderitem",
            )]);
        let schema = ModelSchemaResponse::from_admin(&admin);
        assert_eq!(schema.model_name, "order");
        assert_eq!(schema.search_fields, vec!["order_number"]);
        assert_eq!(schema.list_filter, vec!["status"]);
        assert_eq!(schema.inlines.len(), 1);
        assert_eq!(schema.inlines[0].model_key(), "sales.orderitem");
    }

    #[test]
    fn test_grid_response_omits_absent_total() {
        let response = GridDataResponse {
            data: vec![],
            columns: vec!["name".to_string()],
            total_count: None,
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(!json.contains("total_count"));
    }
}
