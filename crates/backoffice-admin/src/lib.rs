//! # backoffice-admin
//!
//! The admin engine for the backoffice panel. The centerpiece is model
//! autodiscovery: [`autodiscover::autodiscover_models`] scans every installed
//! application, collects the admin configurations the applications declare
//! for themselves, and re-registers everything onto an [`site::AdminSite`],
//! falling back to generic configurations for models without one.
//!
//! ## Modules
//!
//! - [`model_admin`] - Per-model display/edit policy ([`ModelAdmin`](model_admin::ModelAdmin))
//! - [`site`] - The admin site registry and its Axum router
//! - [`autodiscover`] - Model discovery and best-effort re-registration
//! - [`charts`] - Chart/grid/stats query helpers over declared metadata
//! - [`api`] - JSON request/response types for the admin REST API
//! - [`store`] - Object storage abstraction and the in-memory store
//! - [`filters`] - Search/filter/ordering applied to stored objects
//! - [`panel`] - The panel's own application (dashboard models, preferences)

pub mod api;
pub mod autodiscover;
pub mod charts;
pub mod filters;
pub mod model_admin;
pub mod panel;
pub mod site;
pub mod store;

pub use autodiscover::{autodiscover_models, reregister_inline_admins, DiscoveryOptions};
pub use model_admin::{AdminFactory, InlineAdmin, InlineType, ModelAdmin};
pub use site::AdminSite;
