//! Model autodiscovery and re-registration.
//!
//! [`autodiscover_models`] populates an [`AdminSite`] with every eligible
//! model across the installed applications. It works in three passes:
//!
//! 1. **Discovery** - every application's [`AdminApp::register_admins`] hook
//!    runs against a scratch default site, so each app declares its bespoke
//!    configurations the same way it would for any site. A failing hook is
//!    logged and skipped; that app's models simply fall through to pass 3.
//! 2. **Promotion** - every (model, configuration) pair found on the scratch
//!    site is re-registered onto the target site, honoring the exclusion
//!    lists, the abstract/proxy rules, and the panel's self-exclusion. The
//!    configuration is rebuilt from its factory so the target site gets a
//!    fresh instance, never one shared with another site. A configuration
//!    the target site rejects falls back to the generic configuration.
//! 3. **Completion** - every remaining eligible model, declared admin or
//!    not, is registered with the generic configuration.
//!
//! No step returns an error to the caller: every per-model failure is
//! converted into a fallback or a logged skip, so startup cannot be broken
//! by a bad admin declaration.

use std::collections::HashMap;
use std::sync::Arc;

use backoffice_core::apps::AppConfig;
use backoffice_core::error::BackofficeResult;
use backoffice_core::meta::ModelMeta;
use backoffice_core::settings::AdminSettings;

use crate::model_admin::{AdminFactory, ModelAdmin};
use crate::panel;
use crate::site::AdminSite;

/// Framework-internal application namespaces, always excluded.
pub const DEFAULT_EXCLUDE_APPS: [&str; 5] = [
    "backoffice.contrib.admin",
    "backoffice.contrib.contenttypes",
    "backoffice.contrib.sessions",
    "backoffice.contrib.messages",
    "backoffice.contrib.staticfiles",
];

/// An installed application that can declare admin configurations.
///
/// The default implementation declares nothing; models of such apps are
/// picked up by the completion pass with generic configurations.
pub trait AdminApp: AppConfig {
    /// Registers this application's bespoke admin configurations onto the
    /// given site.
    fn register_admins(&self, _site: &mut AdminSite) -> BackofficeResult<()> {
        Ok(())
    }
}

/// Options controlling what autodiscovery registers.
///
/// User-supplied exclusions are merged with [`DEFAULT_EXCLUDE_APPS`] and the
/// panel's own application, which is always excluded so the admin tool does
/// not administer itself.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryOptions {
    /// Application names or labels to skip.
    pub exclude_apps: Vec<String>,
    /// Model names (qualified keys or bare type names) to skip.
    pub exclude_models: Vec<String>,
    /// Whether proxy models may be registered.
    pub include_proxy: bool,
}

impl DiscoveryOptions {
    /// Creates options with no user exclusions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds options from the admin settings table.
    pub fn from_settings(settings: &AdminSettings) -> Self {
        Self {
            exclude_apps: settings.exclude_apps.clone(),
            exclude_models: settings.exclude_models.clone(),
            include_proxy: settings.include_proxy,
        }
    }

    /// Adds excluded applications.
    #[must_use]
    pub fn exclude_apps(mut self, apps: Vec<&str>) -> Self {
        self.exclude_apps
            .extend(apps.into_iter().map(String::from));
        self
    }

    /// Adds excluded models.
    #[must_use]
    pub fn exclude_models(mut self, models: Vec<&str>) -> Self {
        self.exclude_models
            .extend(models.into_iter().map(String::from));
        self
    }

    /// Allows proxy models to be registered.
    #[must_use]
    pub const fn include_proxy(mut self, include: bool) -> Self {
        self.include_proxy = include;
        self
    }

    fn app_excluded(&self, app_name: &str, app_label: &str) -> bool {
        if app_label == panel::APP_LABEL || app_name == panel::APP_NAME {
            return true;
        }
        if DEFAULT_EXCLUDE_APPS.contains(&app_name) {
            return true;
        }
        self.exclude_apps
            .iter()
            .any(|excluded| excluded == app_name || excluded == app_label)
    }

    fn model_excluded(&self, meta: &ModelMeta) -> bool {
        let key = meta.key();
        self.exclude_models
            .iter()
            .any(|excluded| *excluded == key || excluded == meta.object_name)
    }
}

/// Why a model was not registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The model's application is excluded (defaults, user list, or self).
    ExcludedApp,
    /// The model itself is excluded.
    ExcludedModel,
    /// The model is abstract.
    Abstract,
    /// The model is a proxy and proxies are not included.
    Proxy,
    /// The model is already registered and no bespoke configuration was
    /// offered.
    AlreadyRegistered,
    /// Registration failed and so did the generic fallback.
    Failed,
}

/// The outcome of one best-effort registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// The offered configuration was bound.
    Registered,
    /// The offered configuration was rejected; the generic one was bound
    /// instead.
    FellBackToGeneric,
    /// Nothing was registered.
    Skipped(SkipReason),
}

impl Registration {
    /// Whether this outcome added or replaced a registry entry.
    pub const fn registered(self) -> bool {
        matches!(self, Self::Registered | Self::FellBackToGeneric)
    }
}

/// Registers one model onto the site, best-effort.
///
/// All registration policy funnels through here: exclusion and
/// abstract/proxy filtering, upsert of bespoke configurations with generic
/// fallback, and skip-if-present for models offered without a bespoke
/// configuration. Never returns an error; the outcome says what happened.
pub fn register_model(
    site: &mut AdminSite,
    app_name: &str,
    meta: &'static ModelMeta,
    factory: Option<AdminFactory>,
    options: &DiscoveryOptions,
) -> Registration {
    if options.app_excluded(app_name, meta.app_label) {
        return Registration::Skipped(SkipReason::ExcludedApp);
    }
    if options.model_excluded(meta) {
        return Registration::Skipped(SkipReason::ExcludedModel);
    }
    if meta.abstract_model {
        return Registration::Skipped(SkipReason::Abstract);
    }
    if meta.proxy && !options.include_proxy {
        return Registration::Skipped(SkipReason::Proxy);
    }

    match factory {
        Some(factory) => match site.register(meta, factory) {
            Ok(()) => Registration::Registered,
            Err(err) => {
                tracing::debug!(
                    model = %meta.key(),
                    error = %err,
                    "configuration rejected, falling back to generic"
                );
                match site.register_default(meta) {
                    Ok(()) => Registration::FellBackToGeneric,
                    Err(err) => {
                        tracing::debug!(model = %meta.key(), error = %err, "generic fallback failed");
                        Registration::Skipped(SkipReason::Failed)
                    }
                }
            }
        },
        None => {
            if site.is_registered(&meta.key()) {
                return Registration::Skipped(SkipReason::AlreadyRegistered);
            }
            match site.register_default(meta) {
                Ok(()) => Registration::Registered,
                Err(err) => {
                    tracing::debug!(model = %meta.key(), error = %err, "generic registration failed");
                    Registration::Skipped(SkipReason::Failed)
                }
            }
        }
    }
}

/// Discovers every eligible model across the installed applications and
/// registers it onto `site`, preferring bespoke configurations over the
/// generic one. Returns the number of models registered; the count is
/// informational (it is logged) and nothing load-bearing should depend
/// on it.
pub fn autodiscover_models(
    apps: &[&dyn AdminApp],
    site: &mut AdminSite,
    options: &DiscoveryOptions,
) -> usize {
    // Make every installed model known to both sites up front, so a parent
    // registered early can validate inlines against children declared later.
    for app in apps {
        for meta in app.models() {
            site.install_model(meta);
        }
    }

    // Pass 1: each application declares its admins onto a scratch site.
    let mut source = AdminSite::new("default");
    for app in apps {
        for meta in app.models() {
            source.install_model(meta);
        }
    }
    for app in apps {
        if let Err(err) = app.register_admins(&mut source) {
            tracing::warn!(
                app = app.name(),
                error = %err,
                "admin declarations failed; models fall back to generic configuration"
            );
        }
    }

    let app_names: HashMap<&str, &str> = apps.iter().map(|a| (a.label(), a.name())).collect();
    let mut registered = 0usize;

    // Pass 2: promote everything the applications declared.
    let mut declared: Vec<String> = source.entries().map(|(key, _)| key.clone()).collect();
    declared.sort_unstable();
    for key in declared {
        let Some(entry) = source.entry(&key) else {
            continue;
        };
        let meta = entry.meta;
        // A declaration without a factory can still be promoted; the target
        // gets a fresh generic instance of its own.
        let factory: AdminFactory = match entry.factory.clone() {
            Some(factory) => factory,
            None => Arc::new(move || ModelAdmin::for_model(meta)),
        };
        let app_name = app_names
            .get(meta.app_label)
            .copied()
            .unwrap_or(meta.app_label);

        let outcome = register_model(site, app_name, meta, Some(factory), options);
        if outcome.registered() {
            registered += 1;
        }
    }

    // Pass 3: every remaining eligible model gets the generic configuration.
    for app in apps {
        for meta in app.models() {
            let outcome = register_model(site, app.name(), meta, None, options);
            if outcome.registered() {
                registered += 1;
            }
        }
    }

    tracing::info!(count = registered, "model autodiscovery complete");
    registered
}

/// Re-registers, from its factory, every entry whose configuration declares
/// inline editors.
///
/// A model registered directly (outside [`autodiscover_models`]) can end up
/// holding a configuration instance built for another site, whose inlines
/// then do not resolve here. Rebuilding such entries from their factories
/// restores the inlines. Safe to call any number of times.
pub fn reregister_inline_admins(site: &mut AdminSite) {
    let with_inlines: Vec<String> = site
        .entries()
        .filter(|(_, entry)| entry.admin.has_inlines())
        .map(|(key, _)| key.clone())
        .collect();

    for key in with_inlines {
        match site.refresh_from_factory(&key) {
            Ok(true) => tracing::debug!(model = %key, "inline configuration re-registered"),
            Ok(false) => {}
            Err(err) => {
                tracing::warn!(model = %key, error = %err, "inline re-registration failed");
            }
        }
    }
}
