//! Configuration module for the harvester
//!
//! Settings are layered: built-in defaults, then an optional TOML file,
//! then command-line overrides. Validation runs on the merged result.
//!
//! # Example
//!
//! ```no_run
//! use etd_harvester::config::{load_config, validate, ConfigOverrides};
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml"))
//!     .unwrap()
//!     .with_overrides(ConfigOverrides {
//!         output_dir: Some("./out".to_string()),
//!         ..Default::default()
//!     });
//! validate(&config).unwrap();
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{CatalogConfig, Config, CrawlConfig, HttpConfig, OutputConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;

/// Values supplied on the command line
///
/// `None` keeps whatever the config file (or the default) says.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub output_dir: Option<String>,
    pub embargo: Option<u32>,
    pub category: Option<String>,
    pub start_page: Option<u32>,
    pub max_page: Option<u32>,
    pub min_id: Option<u32>,
    pub max_id: Option<u32>,
    pub fetch_attachments: Option<bool>,
    pub ignore_certificates: Option<bool>,
}

impl Config {
    /// Applies command-line overrides on top of this configuration
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(dir) = overrides.output_dir {
            self.output.directory = Some(dir);
        }
        if let Some(embargo) = overrides.embargo {
            self.catalog.embargo = embargo;
        }
        if let Some(category) = overrides.category {
            self.catalog.category = Some(category);
        }
        if let Some(page) = overrides.start_page {
            self.crawl.start_page = page;
        }
        if let Some(page) = overrides.max_page {
            self.crawl.max_page = page;
        }
        if let Some(id) = overrides.min_id {
            self.crawl.min_id = id;
        }
        if let Some(id) = overrides.max_id {
            self.crawl.max_id = id;
        }
        if let Some(fetch) = overrides.fetch_attachments {
            self.crawl.fetch_attachments = fetch;
        }
        if let Some(ignore) = overrides.ignore_certificates {
            self.http.ignore_certificates = ignore;
        }
        self
    }
}
