//! # backoffice-core
//!
//! Foundation types for the backoffice admin panel. This crate has no HTTP
//! or storage dependencies and provides what every other crate builds on.
//!
//! ## Modules
//!
//! - [`error`] - Error types and result alias
//! - [`settings`] - Configuration, including the admin exclusion surface
//! - [`apps`] - Application registry and lifecycle management
//! - [`meta`] - Declared model metadata (fields, flags, capabilities)
//! - [`logging`] - Tracing-based logging integration

pub mod apps;
pub mod error;
pub mod logging;
pub mod meta;
pub mod settings;

// Re-export the most commonly used types at the crate root.
pub use error::{BackofficeError, BackofficeResult};
pub use meta::{FieldDef, FieldType, ModelMeta, OnDelete};
pub use settings::Settings;
