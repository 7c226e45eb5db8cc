//! # backoffice-shop
//!
//! The e-commerce data set administered by the backoffice panel: customer
//! accounts, the product catalog, and sales (orders, invoices, payments).
//! Each application declares its model metadata and its bespoke admin
//! configurations; the panel's autodiscovery picks both up at startup.
//!
//! [`seed`] generates sample objects so charts and grids have data to show
//! on a fresh install.

pub mod accounts;
pub mod catalog;
pub mod sales;
pub mod seed;

use backoffice_admin::autodiscover::AdminApp;

pub use accounts::AccountsApp;
pub use catalog::CatalogApp;
pub use sales::SalesApp;

/// All shop applications, in registration order.
pub fn installed_apps() -> Vec<Box<dyn AdminApp>> {
    vec![
        Box::new(AccountsApp),
        Box::new(CatalogApp),
        Box::new(SalesApp),
    ]
}
