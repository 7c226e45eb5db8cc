//! Development server for the backoffice admin panel.
//!
//! Startup wires the whole panel together: settings, logging, the installed
//! applications, model autodiscovery onto the admin site, inline repair,
//! explicit registration of the panel's own models, and finally the Axum
//! server. Discovery problems never abort startup; affected models simply
//! arrive with generic configurations or stay unregistered.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use clap::{Parser, Subcommand};
use tower_http::trace::TraceLayer;

use backoffice_admin::autodiscover::{
    autodiscover_models, reregister_inline_admins, AdminApp, DiscoveryOptions,
};
use backoffice_admin::charts::DashboardCatalog;
use backoffice_admin::panel::{self, PanelApp};
use backoffice_admin::site::AdminSite;
use backoffice_admin::store::InMemoryStore;
use backoffice_core::apps::AppRegistry;
use backoffice_core::logging::setup_logging;
use backoffice_core::settings::Settings;
use backoffice_shop::seed;

/// Administrative back-office for the shop data set.
#[derive(Parser)]
#[command(name = "backoffice-server", version, about)]
struct Cli {
    /// Path to a TOML settings file (defaults to ./backoffice.toml when present).
    #[arg(long)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (the default).
    Runserver {
        /// Bind address, overriding the settings file (e.g. 0.0.0.0:8000).
        #[arg(long)]
        addr: Option<String>,
    },
    /// Inspect the installed applications and validate the admin settings.
    Check,
    /// Describe the sample data set the development store is seeded with.
    Populate,
}

fn load_settings(path: Option<&PathBuf>) -> anyhow::Result<Settings> {
    if let Some(path) = path {
        return Settings::from_toml_file(path)
            .with_context(|| format!("failed to load settings from {}", path.display()));
    }
    let default_path = PathBuf::from("backoffice.toml");
    if default_path.exists() {
        tracing::info!("loading settings from backoffice.toml");
        return Settings::from_toml_file(&default_path).context("failed to load backoffice.toml");
    }
    Ok(Settings::default())
}

/// All installed applications: the shop plus the panel itself.
fn installed_apps() -> Vec<Box<dyn AdminApp>> {
    let mut apps = backoffice_shop::installed_apps();
    apps.push(Box::new(PanelApp));
    apps
}

/// Builds the fully-populated admin site.
fn build_site(settings: &Settings, apps: &[&dyn AdminApp]) -> AdminSite {
    let mut site = AdminSite::new("admin")
        .header(&settings.admin.site_header)
        .index_title(&settings.admin.index_title)
        .url_prefix(&settings.admin.url_prefix);

    let options = DiscoveryOptions::from_settings(&settings.admin);
    autodiscover_models(apps, &mut site, &options);
    reregister_inline_admins(&mut site);

    if let Err(err) = panel::register_panel_models(&mut site) {
        tracing::warn!(error = %err, "panel models could not be registered");
    }

    site
}

async fn runserver(settings: &Settings, addr_override: Option<String>) -> anyhow::Result<()> {
    let apps = installed_apps();
    let app_refs: Vec<&dyn AdminApp> = apps.iter().map(AsRef::as_ref).collect();

    let store = Arc::new(InMemoryStore::with_data(seed::sample_data()));
    let catalog = DashboardCatalog::build(&app_refs);

    let site = build_site(settings, &app_refs)
        .store(store)
        .catalog(catalog);
    tracing::info!(models = site.model_count(), "admin site ready");

    let prefix = settings.admin.url_prefix.clone();
    let router = Router::new()
        .route(
            "/",
            axum::routing::get({
                let prefix = prefix.clone();
                move || async move {
                    axum::Json(serde_json::json!({
                        "service": "backoffice",
                        "admin": prefix,
                    }))
                }
            }),
        )
        .nest(&prefix, site.into_router())
        .layer(TraceLayer::new_for_http());

    let addr = addr_override.unwrap_or_else(|| settings.bind_addr());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("listening on http://{addr}{prefix}/");
    axum::serve(listener, router).await?;
    Ok(())
}

/// Prints the installed applications and flags exclusion entries that match
/// nothing, the closest thing this panel has to a system check.
fn check(settings: &Settings) -> anyhow::Result<()> {
    let mut registry = AppRegistry::new();
    registry.register(Box::new(backoffice_shop::AccountsApp));
    registry.register(Box::new(backoffice_shop::CatalogApp));
    registry.register(Box::new(backoffice_shop::SalesApp));
    registry.register(Box::new(PanelApp));
    registry.populate();

    let mut issues = 0usize;

    println!("Installed applications:");
    for app in registry.get_app_configs() {
        println!(
            "  {} ({}) - {} model(s)",
            app.label(),
            app.verbose_name(),
            app.models().len()
        );
    }

    for excluded in &settings.admin.exclude_apps {
        if registry.get_app_config(excluded).is_none() {
            println!("warning: excluded app '{excluded}' is not installed");
            issues += 1;
        }
    }
    for excluded in &settings.admin.exclude_models {
        if registry.find_model(excluded).is_none() {
            println!("warning: excluded model '{excluded}' does not exist");
            issues += 1;
        }
    }

    if issues == 0 {
        println!("System check identified no issues.");
    } else {
        println!("System check identified {issues} warning(s).");
    }
    Ok(())
}

/// Reports what the development store gets seeded with.
fn populate() -> anyhow::Result<()> {
    for (model_key, objects) in seed::sample_data() {
        println!("{model_key}: {} object(s)", objects.len());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = load_settings(cli.settings.as_ref())?;
    setup_logging(&settings);

    match cli.command.unwrap_or(Command::Runserver { addr: None }) {
        Command::Runserver { addr } => runserver(&settings, addr).await,
        Command::Check => check(&settings),
        Command::Populate => populate(),
    }
}
