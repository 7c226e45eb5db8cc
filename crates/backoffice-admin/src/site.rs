//! The admin site: model registry and router generation.
//!
//! An [`AdminSite`] maps model keys to registered [`ModelAdmin`]
//! configurations. Registration is an upsert: registering a key that is
//! already present atomically replaces the prior entry, so re-running
//! discovery after a code reload picks up updated configurations instead of
//! keeping stale ones. Each entry retains the [`AdminFactory`] it was
//! registered with, so a configuration can always be rebuilt fresh for this
//! site rather than shared from another one.
//!
//! The site is built once at startup by the autodiscovery engine, then
//! converted into an Axum router ([`AdminSite::into_router`]) that serves
//! the dashboard REST API.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use chrono::Utc;
use serde_json::Value;

use backoffice_core::error::{BackofficeError, BackofficeResult};
use backoffice_core::meta::ModelMeta;

use crate::api::{
    build_model_index, ChartDataResponse, CurrentUserResponse, GridDataResponse, JsonListResponse,
    LoginRequest, LoginResponse, ModelFieldsResponse, ModelSchemaResponse, StatsResponse,
};
use crate::charts::{aggregate_series, bucket_ranges, DashboardCatalog, Frequency, Operation};
use crate::filters;
use crate::model_admin::{AdminFactory, ModelAdmin};
use crate::panel;
use crate::store::{AdminStore, InMemoryStore};

/// One registry entry: the model's metadata, its bound configuration, and
/// the factory that configuration came from (absent for generic entries).
#[derive(Clone)]
pub struct RegisteredAdmin {
    /// The registered model's metadata.
    pub meta: &'static ModelMeta,
    /// The configuration bound to this site.
    pub admin: ModelAdmin,
    /// The constructor the configuration was built with, kept so repair and
    /// re-discovery can bind a fresh instance instead of sharing this one.
    pub factory: Option<AdminFactory>,
}

impl std::fmt::Debug for RegisteredAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredAdmin")
            .field("key", &self.meta.key())
            .field("admin", &self.admin.model_key())
            .field("has_factory", &self.factory.is_some())
            .finish()
    }
}

/// The admin site registry.
///
/// # Examples
///
/// ```
/// use backoffice_admin::site::AdminSite;
///
/// let site = AdminSite::new("admin");
/// assert_eq!(site.model_count(), 0);
/// let _router = site.into_router();
/// ```
pub struct AdminSite {
    name: String,
    header: String,
    index_title: String,
    url_prefix: String,
    registry: HashMap<String, RegisteredAdmin>,
    models: HashMap<String, &'static ModelMeta>,
    catalog: DashboardCatalog,
    store: Option<Arc<dyn AdminStore>>,
}

impl AdminSite {
    /// Creates a new admin site with the given name.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            header: "Backoffice Administration".to_string(),
            index_title: "Dashboard".to_string(),
            url_prefix: "/api/admin".to_string(),
            registry: HashMap::new(),
            models: HashMap::new(),
            catalog: DashboardCatalog::default(),
            store: None,
        }
    }

    /// Sets the page header.
    #[must_use]
    pub fn header(mut self, header: &str) -> Self {
        self.header = header.to_string();
        self
    }

    /// Sets the dashboard title.
    #[must_use]
    pub fn index_title(mut self, title: &str) -> Self {
        self.index_title = title.to_string();
        self
    }

    /// Sets the URL prefix for admin API routes.
    #[must_use]
    pub fn url_prefix(mut self, prefix: &str) -> Self {
        self.url_prefix = prefix.to_string();
        self
    }

    /// Sets the object store backing list/detail/chart endpoints.
    #[must_use]
    pub fn store(mut self, store: Arc<dyn AdminStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Sets the dashboard catalogs (chart/grid/stats model lists).
    #[must_use]
    pub fn catalog(mut self, catalog: DashboardCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Returns the site name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the URL prefix.
    pub fn url_prefix_str(&self) -> &str {
        &self.url_prefix
    }

    /// Makes a model's metadata known to the site without registering it.
    ///
    /// Known metadata is what inline references are validated against;
    /// discovery installs every installed app's models up front so that a
    /// parent can be registered before its children.
    pub fn install_model(&mut self, meta: &'static ModelMeta) {
        self.models.insert(meta.key(), meta);
    }

    /// Returns the metadata known for a model key, if any.
    pub fn model_meta(&self, key: &str) -> Option<&'static ModelMeta> {
        self.models.get(key).copied()
    }

    /// Registers a model with a configuration built by `factory`.
    ///
    /// A fresh configuration instance is constructed for this site and
    /// validated against the model's metadata. If the key is already
    /// registered the prior entry is replaced.
    pub fn register(
        &mut self,
        meta: &'static ModelMeta,
        factory: AdminFactory,
    ) -> BackofficeResult<()> {
        if meta.abstract_model {
            return Err(BackofficeError::ImproperlyConfigured(format!(
                "cannot register abstract model {}",
                meta.key()
            )));
        }
        self.install_model(meta);

        let admin = factory();
        self.check_model_admin(meta, &admin)?;
        self.registry.insert(
            meta.key(),
            RegisteredAdmin {
                meta,
                admin,
                factory: Some(factory),
            },
        );
        Ok(())
    }

    /// Registers a model with the generic configuration derived from its
    /// metadata.
    pub fn register_default(&mut self, meta: &'static ModelMeta) -> BackofficeResult<()> {
        if meta.abstract_model {
            return Err(BackofficeError::ImproperlyConfigured(format!(
                "cannot register abstract model {}",
                meta.key()
            )));
        }
        self.install_model(meta);

        self.registry.insert(
            meta.key(),
            RegisteredAdmin {
                meta,
                admin: ModelAdmin::for_model(meta),
                factory: None,
            },
        );
        Ok(())
    }

    /// Rebuilds a registered entry's configuration from its factory.
    ///
    /// Returns `Ok(true)` when the entry was rebuilt, `Ok(false)` when the
    /// entry has no factory (generic entries are already site-local), and an
    /// error when the key is unknown or the rebuilt configuration fails
    /// validation, in which case the existing entry is left untouched.
    pub fn refresh_from_factory(&mut self, key: &str) -> BackofficeResult<bool> {
        let entry = self
            .registry
            .get(key)
            .ok_or_else(|| BackofficeError::NotFound(format!("model {key} is not registered")))?;
        let Some(factory) = entry.factory.clone() else {
            return Ok(false);
        };
        let meta = entry.meta;

        let admin = factory();
        self.check_model_admin(meta, &admin)?;
        self.registry.insert(
            key.to_string(),
            RegisteredAdmin {
                meta,
                admin,
                factory: Some(factory),
            },
        );
        Ok(true)
    }

    /// Removes a model from the registry, returning its entry.
    pub fn unregister(&mut self, key: &str) -> Option<RegisteredAdmin> {
        self.registry.remove(key)
    }

    /// Returns whether a model is registered.
    pub fn is_registered(&self, key: &str) -> bool {
        self.registry.contains_key(key)
    }

    /// Returns the registry entry for a model, if any.
    pub fn entry(&self, key: &str) -> Option<&RegisteredAdmin> {
        self.registry.get(key)
    }

    /// Returns the bound configuration for a model, if registered.
    pub fn get_model_admin(&self, key: &str) -> Option<&ModelAdmin> {
        self.registry.get(key).map(|e| &e.admin)
    }

    /// Iterates over all registry entries.
    pub fn entries(&self) -> impl Iterator<Item = (&String, &RegisteredAdmin)> {
        self.registry.iter()
    }

    /// Returns all registered model keys.
    pub fn registered_models(&self) -> Vec<&str> {
        self.registry.keys().map(String::as_str).collect()
    }

    /// Returns the number of registered models.
    pub fn model_count(&self) -> usize {
        self.registry.len()
    }

    /// Validates a configuration against a model's metadata.
    ///
    /// Every referenced field must exist on the model (`__`-separated
    /// traversals are checked on their first segment), and every inline must
    /// point at a known model joined to this one by a FK or O2O field.
    fn check_model_admin(&self, meta: &ModelMeta, admin: &ModelAdmin) -> BackofficeResult<()> {
        let key = meta.key();
        if admin.model_key() != key {
            return Err(BackofficeError::ImproperlyConfigured(format!(
                "configuration for {} offered under key {key}",
                admin.model_key()
            )));
        }

        let field_refs = admin
            .list_display
            .iter()
            .filter(|f| f.as_str() != "__str__")
            .chain(&admin.list_filter)
            .chain(&admin.search_fields)
            .chain(&admin.readonly_fields);
        for field in field_refs {
            let base = field.split("__").next().unwrap_or(field);
            if !meta.has_field(base) {
                return Err(BackofficeError::ImproperlyConfigured(format!(
                    "{key} has no field '{base}' referenced by its configuration"
                )));
            }
        }

        for (target, sources) in &admin.prepopulated_fields {
            for field in std::iter::once(target).chain(sources) {
                if !meta.has_field(field) {
                    return Err(BackofficeError::ImproperlyConfigured(format!(
                        "{key} has no field '{field}' referenced by prepopulated_fields"
                    )));
                }
            }
        }

        for inline in &admin.inlines {
            let child_key = inline.model_key();
            let Some(child) = self.models.get(&child_key) else {
                return Err(BackofficeError::ImproperlyConfigured(format!(
                    "inline references unknown model {child_key}"
                )));
            };
            if !child.relates_to(&key) {
                return Err(BackofficeError::ImproperlyConfigured(format!(
                    "inline model {child_key} has no relation to {key}"
                )));
            }
        }

        Ok(())
    }

    /// Converts the site into an Axum router serving the admin REST API.
    ///
    /// The generated routes are:
    ///
    /// - `POST /login/`, `POST /logout/` - session stubs
    /// - `GET /` - registered models grouped by app
    /// - `GET /me/` - current user info
    /// - `GET /stats/` - quick dashboard statistics
    /// - `GET /models/charts/`, `GET /models/grids/` - eligible model catalogs
    /// - `GET /models/fields/?model=` - numeric fields of one model
    /// - `GET /charts/data/` - time-bucketed chart series
    /// - `GET /grids/data/` - column-projected grid rows
    /// - `GET /preferences/`, `POST /preferences/` - UI preferences
    /// - `GET /{app}/{model}/schema` - model schema introspection
    /// - `GET|POST /{app}/{model}/` - list / create
    /// - `GET|PUT|DELETE /{app}/{model}/{pk}/` - detail / update / delete
    pub fn into_router(self) -> Router {
        let store: Arc<dyn AdminStore> = self
            .store
            .unwrap_or_else(|| Arc::new(InMemoryStore::new()));

        let shared = Arc::new(SiteState {
            name: self.name,
            header: self.header,
            index_title: self.index_title,
            url_prefix: self.url_prefix,
            registry: self.registry,
            catalog: self.catalog,
            store,
        });

        Router::new()
            .route("/login/", post(handle_login))
            .route("/logout/", post(handle_logout))
            .route("/", get(handle_index))
            .route("/me/", get(handle_me))
            .route("/stats/", get(handle_stats))
            .route("/models/charts/", get(handle_chart_models))
            .route("/models/grids/", get(handle_grid_models))
            .route("/models/fields/", get(handle_model_fields))
            .route("/charts/data/", get(handle_chart_data))
            .route("/grids/data/", get(handle_grid_data))
            .route(
                "/preferences/",
                get(handle_get_preferences).post(handle_set_preferences),
            )
            .route("/{app}/{model}/schema", get(handle_schema))
            .route("/{app}/{model}/", get(handle_list).post(handle_create))
            .route(
                "/{app}/{model}/{pk}/",
                get(handle_detail).put(handle_update).delete(handle_delete),
            )
            .with_state(shared)
    }
}

impl std::fmt::Debug for AdminSite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys = self.registered_models();
        keys.sort_unstable();
        f.debug_struct("AdminSite")
            .field("name", &self.name)
            .field("url_prefix", &self.url_prefix)
            .field("model_count", &self.registry.len())
            .field("models", &keys.join(", "))
            .finish_non_exhaustive()
    }
}

/// Shared state for the Axum handlers.
struct SiteState {
    name: String,
    header: String,
    index_title: String,
    url_prefix: String,
    registry: HashMap<String, RegisteredAdmin>,
    catalog: DashboardCatalog,
    store: Arc<dyn AdminStore>,
}

fn error_json(status: StatusCode, message: impl Into<String>) -> axum::response::Response {
    (
        status,
        axum::Json(serde_json::json!({ "error": message.into() })),
    )
        .into_response()
}

fn backoffice_error(err: &BackofficeError) -> axum::response::Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    error_json(status, err.to_string())
}

// ── Session stubs ──────────────────────────────────────────────────

/// Handler for `POST /login/`. Development stub: accepts admin/admin.
async fn handle_login(axum::Json(payload): axum::Json<LoginRequest>) -> impl IntoResponse {
    if payload.username == "admin" && payload.password == "admin" {
        let response = LoginResponse {
            token: "backoffice-dev-token-admin".to_string(),
            user: staff_user(),
        };
        axum::Json(serde_json::to_value(response).unwrap_or_default()).into_response()
    } else {
        error_json(StatusCode::UNAUTHORIZED, "Invalid credentials")
    }
}

/// Handler for `POST /logout/`.
async fn handle_logout() -> impl IntoResponse {
    StatusCode::NO_CONTENT
}

fn staff_user() -> CurrentUserResponse {
    CurrentUserResponse {
        username: "admin".to_string(),
        email: "admin@example.com".to_string(),
        is_staff: true,
        is_superuser: true,
    }
}

/// Handler for `GET /me/`.
async fn handle_me() -> impl IntoResponse {
    axum::Json(staff_user())
}

// ── Index / schema ─────────────────────────────────────────────────

/// Handler for `GET /` - all registered models grouped by app.
async fn handle_index(State(state): State<Arc<SiteState>>) -> impl IntoResponse {
    let index = build_model_index(
        state.registry.values().map(|e| &e.admin),
        &state.url_prefix,
    );
    axum::Json(serde_json::json!({
        "site_name": state.name,
        "site_header": state.header,
        "index_title": state.index_title,
        "apps": index.apps,
    }))
}

/// Handler for `GET /{app}/{model}/schema`.
async fn handle_schema(
    State(state): State<Arc<SiteState>>,
    Path((app, model)): Path<(String, String)>,
) -> impl IntoResponse {
    let key = format!("{app}.{model}");
    state.registry.get(&key).map_or_else(
        || error_json(StatusCode::NOT_FOUND, format!("Model '{key}' not found")),
        |entry| {
            let schema = ModelSchemaResponse::from_admin(&entry.admin);
            axum::Json(serde_json::to_value(schema).unwrap_or_default()).into_response()
        },
    )
}

// ── List / CRUD ────────────────────────────────────────────────────

/// Handler for `GET /{app}/{model}/` - paginated list with search,
/// filtering, and ordering.
async fn handle_list(
    State(state): State<Arc<SiteState>>,
    Path((app, model)): Path<(String, String)>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let key = format!("{app}.{model}");
    let Some(entry) = state.registry.get(&key) else {
        return error_json(StatusCode::NOT_FOUND, format!("Model '{key}' not found"));
    };
    let admin = &entry.admin;

    let objects = match state.store.list(&key).await {
        Ok(objects) => objects,
        Err(err) => return backoffice_error(&err),
    };

    let choices = filters::filter_choices(&objects, &admin.list_filter);

    let active_filters: HashMap<String, String> = params
        .iter()
        .filter(|(k, _)| admin.list_filter.contains(*k))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    let mut shaped = filters::apply_filters(&objects, &active_filters);

    if let Some(query) = params.get("search") {
        shaped = filters::apply_search(&shaped, &admin.search_fields, query);
    }

    let ordering = params
        .get("ordering")
        .map(String::as_str)
        .or_else(|| admin.ordering.first().map(String::as_str));
    let shaped = filters::apply_ordering(shaped, ordering);

    let page = params.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
    let page_size = params
        .get("page_size")
        .and_then(|p| p.parse().ok())
        .unwrap_or(admin.list_per_page);
    let page = JsonListResponse::paginate(&shaped, page, page_size);

    let mut body = serde_json::to_value(page).unwrap_or_default();
    if let Value::Object(map) = &mut body {
        map.insert(
            "filters".to_string(),
            serde_json::to_value(choices).unwrap_or_default(),
        );
    }
    axum::Json(body).into_response()
}

/// Handler for `POST /{app}/{model}/`.
async fn handle_create(
    State(state): State<Arc<SiteState>>,
    Path((app, model)): Path<(String, String)>,
    axum::Json(body): axum::Json<Value>,
) -> impl IntoResponse {
    let key = format!("{app}.{model}");
    if !state.registry.contains_key(&key) {
        return error_json(StatusCode::NOT_FOUND, format!("Model '{key}' not found"));
    }
    match state.store.insert(&key, body).await {
        Ok(object) => {
            tracing::info!(model = %key, id = %object.get("id").cloned().unwrap_or_default(), "object created");
            (StatusCode::CREATED, axum::Json(object)).into_response()
        }
        Err(err) => backoffice_error(&err),
    }
}

/// Handler for `GET /{app}/{model}/{pk}/`.
async fn handle_detail(
    State(state): State<Arc<SiteState>>,
    Path((app, model, pk)): Path<(String, String, String)>,
) -> impl IntoResponse {
    let key = format!("{app}.{model}");
    if !state.registry.contains_key(&key) {
        return error_json(StatusCode::NOT_FOUND, format!("Model '{key}' not found"));
    }
    match state.store.get(&key, &pk).await {
        Ok(object) => axum::Json(object).into_response(),
        Err(err) => backoffice_error(&err),
    }
}

/// Handler for `PUT /{app}/{model}/{pk}/`.
async fn handle_update(
    State(state): State<Arc<SiteState>>,
    Path((app, model, pk)): Path<(String, String, String)>,
    axum::Json(body): axum::Json<Value>,
) -> impl IntoResponse {
    let key = format!("{app}.{model}");
    if !state.registry.contains_key(&key) {
        return error_json(StatusCode::NOT_FOUND, format!("Model '{key}' not found"));
    }
    match state.store.update(&key, &pk, body).await {
        Ok(object) => axum::Json(object).into_response(),
        Err(err) => backoffice_error(&err),
    }
}

/// Handler for `DELETE /{app}/{model}/{pk}/`.
async fn handle_delete(
    State(state): State<Arc<SiteState>>,
    Path((app, model, pk)): Path<(String, String, String)>,
) -> impl IntoResponse {
    let key = format!("{app}.{model}");
    if !state.registry.contains_key(&key) {
        return error_json(StatusCode::NOT_FOUND, format!("Model '{key}' not found"));
    }
    match state.store.delete(&key, &pk).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => error_json(StatusCode::NOT_FOUND, "Object not found"),
        Err(err) => backoffice_error(&err),
    }
}

// ── Dashboard: charts, grids, stats ────────────────────────────────

/// Handler for `GET /models/charts/`.
async fn handle_chart_models(State(state): State<Arc<SiteState>>) -> impl IntoResponse {
    axum::Json(serde_json::to_value(&state.catalog.chart_models).unwrap_or_default())
}

/// Handler for `GET /models/grids/`.
async fn handle_grid_models(State(state): State<Arc<SiteState>>) -> impl IntoResponse {
    axum::Json(serde_json::to_value(&state.catalog.grid_models).unwrap_or_default())
}

/// Handler for `GET /models/fields/?model=` - numeric fields of one model.
async fn handle_model_fields(
    State(state): State<Arc<SiteState>>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let Some(model) = params.get("model") else {
        return error_json(StatusCode::BAD_REQUEST, "Model name is required");
    };

    if let Some(chart_model) = state.catalog.find_chart_model(model) {
        return axum::Json(
            serde_json::to_value(ModelFieldsResponse {
                model: model.clone(),
                fields: chart_model.fields.clone(),
            })
            .unwrap_or_default(),
        )
        .into_response();
    }
    if state.catalog.find_grid_model(model).is_some() {
        return axum::Json(
            serde_json::to_value(ModelFieldsResponse {
                model: model.clone(),
                fields: Vec::new(),
            })
            .unwrap_or_default(),
        )
        .into_response();
    }
    error_json(
        StatusCode::NOT_FOUND,
        format!("Model '{model}' not found"),
    )
}

/// Handler for `GET /charts/data/` - time-bucketed aggregation.
async fn handle_chart_data(
    State(state): State<Arc<SiteState>>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let (Some(model), Some(field)) = (params.get("model"), params.get("field")) else {
        return error_json(StatusCode::BAD_REQUEST, "Model and field are required");
    };
    let Some(chart_model) = state.catalog.find_chart_model(model) else {
        return error_json(StatusCode::BAD_REQUEST, "Invalid model");
    };

    if !chart_model.fields.contains(field) {
        // Unknown field: report what is available so the UI can recover.
        return (
            StatusCode::BAD_REQUEST,
            axum::Json(serde_json::json!({
                "error": format!("Field '{field}' does not exist on model {model}"),
                "available_fields": chart_model.fields,
                "suggestion": chart_model.fields.first(),
            })),
        )
            .into_response();
    }

    let chart_type = params
        .get("type")
        .cloned()
        .unwrap_or_else(|| "line".to_string());
    let frequency = Frequency::parse(params.get("frequency").map_or("month", String::as_str));
    let operation = Operation::parse(params.get("operation").map_or("sum", String::as_str));

    let objects = match state.store.list(&chart_model.key).await {
        Ok(objects) => objects,
        Err(err) => return backoffice_error(&err),
    };

    let buckets = bucket_ranges(Utc::now(), frequency);
    let (labels, data) = aggregate_series(
        &objects,
        chart_model.date_field.as_deref(),
        field,
        operation,
        &buckets,
    );

    axum::Json(
        serde_json::to_value(ChartDataResponse {
            labels,
            data,
            chart_type,
        })
        .unwrap_or_default(),
    )
    .into_response()
}

/// Handler for `GET /grids/data/` - column projection with search and
/// pagination.
async fn handle_grid_data(
    State(state): State<Arc<SiteState>>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let Some(model) = params.get("model") else {
        return error_json(StatusCode::BAD_REQUEST, "Model is required");
    };
    let Some(grid_model) = state.catalog.find_grid_model(model) else {
        return error_json(StatusCode::BAD_REQUEST, "Invalid model");
    };

    let columns: Vec<String> = params
        .get("columns")
        .map(|c| {
            c.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
        .filter(|c: &Vec<String>| !c.is_empty())
        .unwrap_or_else(|| grid_model.fields.clone());

    let objects = match state.store.list(&grid_model.key).await {
        Ok(objects) => objects,
        Err(err) => return backoffice_error(&err),
    };

    let mut shaped = objects;
    if let Some(query) = params.get("q") {
        shaped = filters::apply_search(&shaped, &columns, query);
    }

    let ordering = state
        .registry
        .get(&grid_model.key)
        .and_then(|entry| entry.admin.ordering.first().cloned());
    let shaped = filters::apply_ordering(shaped, ordering.as_deref());

    let total_count = shaped.len();
    let page = params.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
    let page_size = params
        .get("page_size")
        .and_then(|p| p.parse::<usize>().ok())
        .unwrap_or(20)
        .clamp(1, 100);
    let page = JsonListResponse::paginate(&shaped, page, page_size);

    axum::Json(
        serde_json::to_value(GridDataResponse {
            data: filters::project_columns(&page.results, &columns),
            columns,
            total_count: Some(total_count),
        })
        .unwrap_or_default(),
    )
    .into_response()
}

/// Handler for `GET /stats/` - auto-discovered per-model counts and revenue.
async fn handle_stats(State(state): State<Arc<SiteState>>) -> impl IntoResponse {
    let mut counts = HashMap::new();
    let mut revenue = 0.0;

    for stats_model in &state.catalog.stats_models {
        let count = state.store.count(&stats_model.key).await;
        if let Some(amount_field) = &stats_model.amount_field {
            if let Ok(objects) = state.store.list(&stats_model.key).await {
                revenue += objects
                    .iter()
                    .filter_map(|obj| match obj.get(amount_field.as_str()) {
                        Some(Value::Number(n)) => n.as_f64(),
                        Some(Value::String(s)) => s.parse().ok(),
                        _ => None,
                    })
                    .sum::<f64>();
            }
            counts.insert(stats_model.name.clone(), count);
        } else if count > 0 {
            counts.insert(stats_model.name.clone(), count);
        }
    }

    let count_of = |name: &str| counts.get(name).copied().unwrap_or_default();
    let response = StatsResponse {
        orders: count_of("order"),
        invoices: count_of("invoice"),
        payments: count_of("payment"),
        products: count_of("product"),
        revenue,
        counts,
    };
    axum::Json(serde_json::to_value(response).unwrap_or_default()).into_response()
}

// ── Preferences ────────────────────────────────────────────────────

/// Handler for `GET /preferences/`.
async fn handle_get_preferences(State(state): State<Arc<SiteState>>) -> impl IntoResponse {
    match state.store.get(panel::USER_PREFERENCE_KEY, "1").await {
        Ok(prefs) => axum::Json(prefs).into_response(),
        Err(_) => axum::Json(panel::default_preferences()).into_response(),
    }
}

/// Handler for `POST /preferences/` - updates theme / page-size choices.
async fn handle_set_preferences(
    State(state): State<Arc<SiteState>>,
    axum::Json(body): axum::Json<Value>,
) -> impl IntoResponse {
    if let Err(message) = panel::validate_preferences(&body) {
        return error_json(StatusCode::BAD_REQUEST, message);
    }

    let updated = match state.store.update(panel::USER_PREFERENCE_KEY, "1", body.clone()).await {
        Ok(prefs) => prefs,
        Err(_) => {
            let mut prefs = panel::default_preferences();
            if let (Value::Object(base), Value::Object(patch)) = (&mut prefs, &body) {
                for (name, value) in patch {
                    base.insert(name.clone(), value.clone());
                }
            }
            match state.store.insert(panel::USER_PREFERENCE_KEY, prefs).await {
                Ok(stored) => stored,
                Err(err) => return backoffice_error(&err),
            }
        }
    };
    axum::Json(updated).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model_admin::{factory, InlineAdmin};
    use backoffice_core::meta::{FieldDef, FieldType, OnDelete};

    fn leak(meta: ModelMeta) -> &'static ModelMeta {
        Box::leak(Box::new(meta))
    }

    fn order_meta() -> &'static ModelMeta {
        leak(
            ModelMeta::new("sales", "Order").fields(vec![
                FieldDef::new("id", FieldType::BigAutoField).primary_key(),
                FieldDef::new("order_number", FieldType::CharField).max_length(50),
                FieldDef::new("status", FieldType::CharField).max_length(20),
            ]),
        )
    }

    fn item_meta() -> &'static ModelMeta {
        leak(
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
            ]),
        )
    }

    fn order_admin() -> ModelAdmin {
        ModelAdmin::new("sales", "order")
            .list_display(vec!["order_number", "status"])
            .search_fields(vec!["order_number"])
    }

    #[test]
    fn test_new_site() {
        let site = AdminSite::new("admin");
        assert_eq!(site.name(), "admin");
        assert_eq!(site.url_prefix_str(), "/api/admin");
        assert_eq!(site.model_count(), 0);
    }

    #[test]
    fn test_register_and_lookup() {
        let mut site = AdminSite::new("admin");
        site.register(order_meta(), factory(order_admin)).unwrap();

        assert!(site.is_registered("sales.order"));
        assert_eq!(site.model_count(), 1);
        let admin = site.get_model_admin("sales.order").unwrap();
        assert_eq!(admin.search_fields, vec!["order_number"]);
        assert!(site.entry("sales.order").unwrap().factory.is_some());
    }

    #[test]
    fn test_register_is_upsert() {
        let mut site = AdminSite::new("admin");
        site.register(order_meta(), factory(order_admin)).unwrap();
        site.register(
            order_meta(),
            factory(|| ModelAdmin::new("sales", "order").list_per_page(50)),
        )
        .unwrap();

        assert_eq!(site.model_count(), 1);
        assert_eq!(site.get_model_admin("sales.order").unwrap().list_per_page, 50);
    }

    #[test]
    fn test_register_refuses_abstract() {
        let meta = leak(ModelMeta::new("sales", "Base").abstract_model());
        let mut site = AdminSite::new("admin");
        assert!(site.register_default(meta).is_err());
        assert!(site
            .register(meta, factory(|| ModelAdmin::new("sales", "base")))
            .is_err());
        assert_eq!(site.model_count(), 0);
    }

    #[test]
    fn test_register_rejects_unknown_field_reference() {
        let mut site = AdminSite::new("admin");
        let result = site.register(
            order_meta(),
            factory(|| ModelAdmin::new("sales", "order").search_fields(vec!["tracking_code"])),
        );
        assert!(matches!(
            result,
            Err(BackofficeError::ImproperlyConfigured(_))
        ));
        assert!(!site.is_registered("sales.order"));
    }

    #[test]
    fn test_register_allows_traversal_field_reference() {
        let mut site = AdminSite::new("admin");
        site.install_model(item_meta());
        // "order__order_number" is valid because "order" exists on the item.
        site.register(
            item_meta(),
            factory(|| {
                ModelAdmin::new("sales", "orderitem").search_fields(vec!["order__order_number"])
            }),
        )
        .unwrap();
    }

    #[test]
    fn test_register_rejects_key_mismatch() {
        let mut site = AdminSite::new("admin");
        let result = site.register(order_meta(), factory(|| ModelAdmin::new("sales", "invoice")));
        assert!(result.is_err());
    }

    #[test]
    fn test_register_validates_inlines() {
        let mut site = AdminSite::new("admin");

        // Unknown child model.
        let result = site.register(
            order_meta(),
            factory(|| {
                ModelAdmin::new("sales", "order")
                    .inlines(vec![InlineAdmin::tabular("sales", "orderitem")])
            }),
        );
        assert!(result.is_err());

        // Known and related child model.
        site.install_model(item_meta());
        site.register(
            order_meta(),
            factory(|| {
                ModelAdmin::new("sales", "order")
                    .inlines(vec![InlineAdmin::tabular("sales", "orderitem")])
            }),
        )
        .unwrap();

        // Known but unrelated child model.
        let category = leak(
            ModelMeta::new("catalog", "Category")
                .fields(vec![FieldDef::new("name", FieldType::CharField)]),
        );
        site.install_model(category);
        let result = site.register(
            order_meta(),
            factory(|| {
                ModelAdmin::new("sales", "order")
                    .inlines(vec![InlineAdmin::tabular("catalog", "category")])
            }),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_unregister() {
        let mut site = AdminSite::new("admin");
        site.register(order_meta(), factory(order_admin)).unwrap();
        let entry = site.unregister("sales.order").unwrap();
        assert_eq!(entry.meta.key(), "sales.order");
        assert!(!site.is_registered("sales.order"));
        assert!(site.unregister("sales.order").is_none());
    }

    #[test]
    fn test_register_default_has_no_factory() {
        let mut site = AdminSite::new("admin");
        site.register_default(order_meta()).unwrap();
        let entry = site.entry("sales.order").unwrap();
        assert!(entry.factory.is_none());
        assert_eq!(entry.admin.list_display, vec!["__str__"]);
        assert_eq!(entry.admin.fields_schema.len(), 3);
    }

    #[test]
    fn test_refresh_from_factory() {
        let mut site = AdminSite::new("admin");
        site.register(order_meta(), factory(order_admin)).unwrap();
        assert!(site.refresh_from_factory("sales.order").unwrap());

        site.register_default(item_meta()).unwrap();
        assert!(!site.refresh_from_factory("sales.orderitem").unwrap());

        assert!(site.refresh_from_factory("sales.invoice").is_err());
    }

    #[test]
    fn test_debug_output() {
        let mut site = AdminSite::new("admin");
        site.register(order_meta(), factory(order_admin)).unwrap();
        let debug = format!("{site:?}");
        assert!(debug.contains("AdminSite"));
        assert!(debug.contains("sales.order"));
    }

    #[test]
    fn test_into_router_builds() {
        let mut site = AdminSite::new("admin").url_prefix("/api/admin");
        site.register(order_meta(), factory(order_admin)).unwrap();
        let _router = site.into_router();
    }
}
