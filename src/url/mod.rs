//! URL handling module
//!
//! Builds listing, metadata and attachment addresses for the catalog and
//! recognizes identifier-bearing detail links.

mod catalog;

pub use catalog::CatalogUrls;
