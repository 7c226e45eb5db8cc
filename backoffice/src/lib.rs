//! # backoffice
//!
//! A customized administrative back-office for an e-commerce data set.
//!
//! This is the meta-crate that re-exports the sub-crates for convenient
//! access. Depend on `backoffice` to get the whole panel, or on individual
//! crates for finer-grained control.

/// Foundation types: settings, app registry, model metadata, errors.
pub use backoffice_core as core;

/// The admin engine: autodiscovery, the site registry, and the REST API.
#[cfg(feature = "admin")]
pub use backoffice_admin as admin;

/// The e-commerce applications: accounts, catalog, sales.
#[cfg(feature = "shop")]
pub use backoffice_shop as shop;
