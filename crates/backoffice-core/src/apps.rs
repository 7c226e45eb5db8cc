//! Application registry for the backoffice panel.
//!
//! Installed applications implement [`AppConfig`] and are collected in an
//! [`AppRegistry`]. Unlike a process-wide implicit singleton, the registry is
//! an explicit value: it is constructed at startup, populated once, and then
//! handed by reference to whatever needs to enumerate applications (the
//! autodiscovery engine, the chart/grid helpers, the stats endpoint).

use std::collections::HashMap;

use crate::meta::ModelMeta;

/// Configuration for an installed application.
///
/// # Examples
///
/// ```
/// use backoffice_core::apps::AppConfig;
///
/// struct CatalogApp;
///
/// impl AppConfig for CatalogApp {
///     fn name(&self) -> &str { "catalog" }
///     fn verbose_name(&self) -> &str { "Product Catalog" }
/// }
/// ```
pub trait AppConfig: Send + Sync {
    /// Returns the full dotted path of the application
    /// (e.g. `"backoffice.contrib.sessions"` or just `"catalog"`).
    fn name(&self) -> &str;

    /// Returns a short label derived from the name (the last component).
    fn label(&self) -> &str {
        self.name().rsplit('.').next().unwrap_or_else(|| self.name())
    }

    /// Returns a human-readable name for the application.
    fn verbose_name(&self) -> &str {
        self.name()
    }

    /// Returns the metadata of every model this application declares,
    /// including abstract and proxy models.
    fn models(&self) -> Vec<&'static ModelMeta> {
        Vec::new()
    }

    /// Called after all apps have been loaded.
    fn ready(&self) {}
}

/// The central registry of installed applications.
///
/// Applications are registered via [`register`](AppRegistry::register) and
/// then [`populate`](AppRegistry::populate) is called once to finalize
/// initialization (calling each app's `ready()` method).
pub struct AppRegistry {
    apps: Vec<Box<dyn AppConfig>>,
    app_labels: HashMap<String, usize>,
    ready: bool,
}

impl Default for AppRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl AppRegistry {
    /// Creates a new, empty `AppRegistry`.
    pub fn new() -> Self {
        Self {
            apps: Vec::new(),
            app_labels: HashMap::new(),
            ready: false,
        }
    }

    /// Registers an application.
    ///
    /// # Panics
    ///
    /// Panics if an application with the same label is already registered,
    /// or if [`populate`](AppRegistry::populate) has already been called.
    pub fn register(&mut self, app: Box<dyn AppConfig>) {
        assert!(
            !self.ready,
            "Cannot register apps after the registry has been populated"
        );

        let label = app.label().to_string();
        assert!(
            !self.app_labels.contains_key(&label),
            "Application with label '{label}' is already registered"
        );

        let index = self.apps.len();
        self.app_labels.insert(label, index);
        self.apps.push(app);
    }

    /// Returns the configuration for the app with the given label, if registered.
    pub fn get_app_config(&self, label: &str) -> Option<&dyn AppConfig> {
        self.app_labels
            .get(label)
            .map(|&idx| self.apps[idx].as_ref())
    }

    /// Returns a slice of all registered app configurations.
    pub fn get_app_configs(&self) -> &[Box<dyn AppConfig>] {
        &self.apps
    }

    /// Looks up a model's metadata by name across every installed app.
    ///
    /// Accepts either a bare object name (`"Order"`, case-insensitive on the
    /// lowercase model name) or a qualified key (`"sales.order"`).
    pub fn find_model(&self, name: &str) -> Option<&'static ModelMeta> {
        if let Some((app_label, model_name)) = name.split_once('.') {
            let wanted = model_name.to_lowercase();
            return self
                .apps
                .iter()
                .filter(|app| app.label() == app_label)
                .flat_map(|app| app.models())
                .find(|meta| meta.model_name == wanted);
        }

        let wanted = name.to_lowercase();
        self.apps
            .iter()
            .flat_map(|app| app.models())
            .find(|meta| meta.model_name == wanted || meta.object_name == name)
    }

    /// Finalizes the registry by calling `ready()` on each app in
    /// registration order.
    ///
    /// # Panics
    ///
    /// Panics if `populate` has already been called.
    pub fn populate(&mut self) {
        assert!(!self.ready, "AppRegistry has already been populated");

        for app in &self.apps {
            app.ready();
        }

        self.ready = true;
    }

    /// Returns `true` if the registry has been populated.
    pub const fn is_ready(&self) -> bool {
        self.ready
    }
}
