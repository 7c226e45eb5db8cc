//! Settings for the backoffice panel.
//!
//! [`Settings`] holds the whole configuration surface with sensible defaults
//! and can be deserialized from a TOML file. The admin-specific knobs
//! (exclusion lists, proxy inclusion, site titles) live in the nested
//! [`AdminSettings`] table, so a host project configures the panel with:
//!
//! ```toml
//! [admin]
//! exclude_apps = ["audit"]
//! exclude_models = ["catalog.Discount"]
//! include_proxy = false
//! ```

use serde::{Deserialize, Serialize};

use crate::error::BackofficeResult;

/// Admin panel configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminSettings {
    /// Heading shown at the top of every admin page.
    pub site_header: String,
    /// Short title used in page titles.
    pub site_title: String,
    /// Title of the dashboard page.
    pub index_title: String,
    /// URL prefix for all admin API routes.
    pub url_prefix: String,
    /// Application namespaces the autodiscovery must never register.
    pub exclude_apps: Vec<String>,
    /// Model names (qualified or bare) the autodiscovery must never register.
    pub exclude_models: Vec<String>,
    /// Whether proxy models may be registered.
    pub include_proxy: bool,
    /// Default number of items per page in list views.
    pub items_per_page: usize,
}

impl Default for AdminSettings {
    fn default() -> Self {
        Self {
            site_header: "Backoffice Administration".to_string(),
            site_title: "Backoffice".to_string(),
            index_title: "Dashboard".to_string(),
            url_prefix: "/api/admin".to_string(),
            exclude_apps: Vec::new(),
            exclude_models: Vec::new(),
            include_proxy: false,
            items_per_page: 25,
        }
    }
}

/// The complete set of panel settings.
///
/// # Examples
///
/// ```
/// use backoffice_core::settings::Settings;
///
/// let settings = Settings::default();
/// assert!(settings.debug);
/// assert_eq!(settings.admin.url_prefix, "/api/admin");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Whether debug mode is enabled (pretty logs, permissive defaults).
    pub debug: bool,
    /// The host the server binds to.
    pub host: String,
    /// The port the server binds to.
    pub port: u16,
    /// List of installed application names.
    pub installed_apps: Vec<String>,
    /// The log level (e.g. "info", "debug", "warn").
    pub log_level: String,
    /// Admin panel configuration.
    pub admin: AdminSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: true,
            host: "127.0.0.1".to_string(),
            port: 8000,
            installed_apps: Vec::new(),
            log_level: "info".to_string(),
            admin: AdminSettings::default(),
        }
    }
}

impl Settings {
    /// Parses settings from a TOML document.
    pub fn from_toml_str(content: &str) -> BackofficeResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Loads settings from a TOML file.
    pub fn from_toml_file(path: impl AsRef<std::path::Path>) -> BackofficeResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Returns the socket address string the server should bind to.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert!(settings.debug);
        assert_eq!(settings.bind_addr(), "127.0.0.1:8000");
        assert_eq!(settings.log_level, "info");
        assert!(settings.admin.exclude_apps.is_empty());
        assert!(!settings.admin.include_proxy);
        assert_eq!(settings.admin.items_per_page, 25);
    }

    #[test]
    fn test_from_toml_str() {
        let settings = Settings::from_toml_str(
            r#"
            debug = false
            port = 9000
            installed_apps = ["accounts", "catalog", "sales"]

            [admin]
            site_header = "Shop Admin"
            exclude_apps = ["audit"]
            exclude_models = ["catalog.Discount"]
            include_proxy = true
            "#,
        )
        .unwrap();

        assert!(!settings.debug);
        assert_eq!(settings.port, 9000);
        assert_eq!(settings.installed_apps.len(), 3);
        assert_eq!(settings.admin.site_header, "Shop Admin");
        assert_eq!(settings.admin.exclude_apps, vec!["audit"]);
        assert_eq!(settings.admin.exclude_models, vec!["catalog.Discount"]);
        assert!(settings.admin.include_proxy);
        // Unset admin keys keep their defaults.
        assert_eq!(settings.admin.url_prefix, "/api/admin");
    }

    #[test]
    fn test_from_toml_str_empty() {
        let settings = Settings::from_toml_str("").unwrap();
        assert_eq!(settings.port, 8000);
    }

    #[test]
    fn test_from_toml_str_invalid() {
        assert!(Settings::from_toml_str("debug = [ nope").is_err());
    }
}
