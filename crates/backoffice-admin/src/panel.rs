//! The panel's own application: dashboard grids, dashboard charts, and UI
//! preferences.
//!
//! These models configure the panel itself, so autodiscovery always excludes
//! this application (the admin tool does not administer itself through
//! discovery). The server registers them explicitly at startup via
//! [`register_panel_models`] once the rest of the registry is built.

use once_cell::sync::Lazy;
use serde_json::{json, Value};

use backoffice_core::apps::AppConfig;
use backoffice_core::error::BackofficeResult;
use backoffice_core::meta::{FieldDef, FieldType, ModelMeta};

use crate::autodiscover::AdminApp;
use crate::model_admin::{factory, ModelAdmin};
use crate::site::AdminSite;

/// The panel application's dotted name.
pub const APP_NAME: &str = "backoffice.panel";

/// The panel application's label, used for self-exclusion.
pub const APP_LABEL: &str = "panel";

/// Store key of the UI preference object.
pub const USER_PREFERENCE_KEY: &str = "panel.userpreference";

/// Themes available for the modern interface.
pub const MODERN_THEMES: [&str; 4] = ["ocean-blue", "emerald", "sunset", "dark"];

/// Themes available for the classic interface.
pub const CLASSIC_THEMES: [&str; 7] = [
    "default",
    "nostalgia",
    "ocean",
    "sunset",
    "forest",
    "dark",
    "crystal-glass",
];

static DASHBOARD_GRID: Lazy<ModelMeta> = Lazy::new(|| {
    ModelMeta::new(APP_LABEL, "DashboardGrid")
        .verbose_name("dashboard grid")
        .verbose_name_plural("dashboard grids")
        .fields(vec![
            FieldDef::new("id", FieldType::BigAutoField).primary_key(),
            FieldDef::new("name", FieldType::CharField).max_length(200).unique(),
            FieldDef::new("description", FieldType::TextField).blank().null(),
            FieldDef::new("model_name", FieldType::CharField).max_length(200),
            FieldDef::new("columns", FieldType::JsonField),
            FieldDef::new("filters", FieldType::JsonField).blank(),
            FieldDef::new("created_at", FieldType::DateTimeField),
            FieldDef::new("updated_at", FieldType::DateTimeField),
        ])
});

static DASHBOARD_CHART: Lazy<ModelMeta> = Lazy::new(|| {
    ModelMeta::new(APP_LABEL, "DashboardChart")
        .verbose_name("dashboard chart")
        .verbose_name_plural("dashboard charts")
        .fields(vec![
            FieldDef::new("id", FieldType::BigAutoField).primary_key(),
            FieldDef::new("name", FieldType::CharField).max_length(200).unique(),
            FieldDef::new("chart_type", FieldType::CharField)
                .max_length(20)
                .choices(vec![
                    ("line", "Line"),
                    ("bar", "Bar"),
                    ("pie", "Pie"),
                    ("doughnut", "Doughnut"),
                    ("area", "Area"),
                ]),
            FieldDef::new("model_name", FieldType::CharField).max_length(200),
            FieldDef::new("field_name", FieldType::CharField).max_length(200),
            FieldDef::new("frequency", FieldType::CharField)
                .max_length(20)
                .choices(vec![
                    ("day", "Day"),
                    ("week", "Week"),
                    ("month", "Month"),
                    ("quarter", "Quarter"),
                    ("year", "Year"),
                ]),
            FieldDef::new("operation", FieldType::CharField).max_length(20).blank(),
            FieldDef::new("created_at", FieldType::DateTimeField),
            FieldDef::new("updated_at", FieldType::DateTimeField),
        ])
});

static USER_PREFERENCE: Lazy<ModelMeta> = Lazy::new(|| {
    ModelMeta::new(APP_LABEL, "UserPreference")
        .verbose_name("user preference")
        .verbose_name_plural("user preferences")
        .fields(vec![
            FieldDef::new("id", FieldType::BigAutoField).primary_key(),
            FieldDef::new("theme_modern", FieldType::CharField)
                .max_length(50)
                .choices(MODERN_THEMES.iter().map(|t| (*t, *t)).collect()),
            FieldDef::new("theme_classic", FieldType::CharField)
                .max_length(50)
                .choices(CLASSIC_THEMES.iter().map(|t| (*t, *t)).collect()),
            FieldDef::new("sidebar_collapsed", FieldType::BooleanField),
            FieldDef::new("items_per_page", FieldType::IntegerField),
            FieldDef::new("created_at", FieldType::DateTimeField),
            FieldDef::new("updated_at", FieldType::DateTimeField),
        ])
});

/// Metadata of the dashboard grid model.
pub fn dashboard_grid_meta() -> &'static ModelMeta {
    &DASHBOARD_GRID
}

/// Metadata of the dashboard chart model.
pub fn dashboard_chart_meta() -> &'static ModelMeta {
    &DASHBOARD_CHART
}

/// Metadata of the UI preference model.
pub fn user_preference_meta() -> &'static ModelMeta {
    &USER_PREFERENCE
}

fn dashboard_grid_admin() -> ModelAdmin {
    ModelAdmin::new(APP_LABEL, "dashboardgrid")
        .verbose_name("dashboard grid")
        .verbose_name_plural("dashboard grids")
        .list_display(vec!["name", "model_name", "created_at"])
        .search_fields(vec!["name", "description", "model_name"])
        .list_filter(vec!["created_at"])
        .schema_from(&DASHBOARD_GRID)
}

fn dashboard_chart_admin() -> ModelAdmin {
    ModelAdmin::new(APP_LABEL, "dashboardchart")
        .verbose_name("dashboard chart")
        .verbose_name_plural("dashboard charts")
        .list_display(vec![
            "name",
            "chart_type",
            "model_name",
            "field_name",
            "frequency",
            "created_at",
        ])
        .search_fields(vec!["name", "model_name", "field_name"])
        .list_filter(vec!["chart_type", "frequency", "created_at"])
        .schema_from(&DASHBOARD_CHART)
}

fn user_preference_admin() -> ModelAdmin {
    ModelAdmin::new(APP_LABEL, "userpreference")
        .verbose_name("user preference")
        .verbose_name_plural("user preferences")
        .list_display(vec!["theme_modern", "theme_classic", "items_per_page"])
        .list_filter(vec!["theme_modern", "theme_classic"])
        .schema_from(&USER_PREFERENCE)
}

/// The panel application.
///
/// Declares no admins through discovery; its models are registered
/// explicitly by [`register_panel_models`].
pub struct PanelApp;

impl AppConfig for PanelApp {
    fn name(&self) -> &str {
        APP_NAME
    }

    fn verbose_name(&self) -> &str {
        "Backoffice Panel"
    }

    fn models(&self) -> Vec<&'static ModelMeta> {
        vec![&*DASHBOARD_GRID, &*DASHBOARD_CHART, &*USER_PREFERENCE]
    }
}

impl AdminApp for PanelApp {}

/// Registers the panel's own models onto the site.
///
/// Called after autodiscovery, mirroring how the panel is excluded from
/// discovery but still wants its configuration models administrable.
pub fn register_panel_models(site: &mut AdminSite) -> BackofficeResult<()> {
    site.register(&*DASHBOARD_GRID, factory(dashboard_grid_admin))?;
    site.register(&*DASHBOARD_CHART, factory(dashboard_chart_admin))?;
    site.register(&*USER_PREFERENCE, factory(user_preference_admin))?;
    Ok(())
}

/// The preference object served when none has been stored yet.
pub fn default_preferences() -> Value {
    json!({
        "theme_modern": "ocean-blue",
        "theme_classic": "default",
        "sidebar_collapsed": false,
        "items_per_page": 25,
    })
}

/// Validates a preference update payload.
///
/// Only known keys with acceptable values are allowed; the error string
/// names the offending key.
pub fn validate_preferences(payload: &Value) -> Result<(), String> {
    let Value::Object(fields) = payload else {
        return Err("expected a JSON object".to_string());
    };

    for (key, value) in fields {
        match key.as_str() {
            "theme_modern" => {
                let theme = value.as_str().unwrap_or_default();
                if !MODERN_THEMES.contains(&theme) {
                    return Err(format!("unknown modern theme '{theme}'"));
                }
            }
            "theme_classic" => {
                let theme = value.as_str().unwrap_or_default();
                if !CLASSIC_THEMES.contains(&theme) {
                    return Err(format!("unknown classic theme '{theme}'"));
                }
            }
            "sidebar_collapsed" => {
                if !value.is_boolean() {
                    return Err("sidebar_collapsed must be a boolean".to_string());
                }
            }
            "items_per_page" => {
                let Some(n) = value.as_u64() else {
                    return Err("items_per_page must be a positive integer".to_string());
                };
                if n == 0 || n > 200 {
                    return Err("items_per_page must be between 1 and 200".to_string());
                }
            }
            other => return Err(format!("unknown preference '{other}'")),
        }
    }
    Ok(())
}
