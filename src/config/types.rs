use serde::Deserialize;

/// Main configuration structure for the harvester
///
/// Every section has defaults, so an empty TOML file (or no file at all)
/// yields a usable configuration once an output directory is supplied.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub crawl: CrawlConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Where the catalog lives and how its pages are addressed
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Base URL of the catalog site
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Path of the index script, relative to the base URL
    #[serde(rename = "index-path")]
    pub index_path: String,

    /// Path under which attachments are served, relative to the base URL
    #[serde(rename = "repository-path")]
    pub repository_path: String,

    /// Query parameter (`key=value`) that marks a link as a detail link
    #[serde(rename = "detail-marker")]
    pub detail_marker: String,

    /// Query parameter carrying the document identifier in detail links
    #[serde(rename = "id-param")]
    pub id_param: String,

    /// CSS selector for identifier-bearing anchors on a listing page
    #[serde(rename = "listing-selector")]
    pub listing_selector: String,

    /// Embargo filter sent with every listing request (0 for fulltext)
    pub embargo: u32,

    /// Optional category filter sent with every listing request
    pub category: Option<String>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "https://etd.unsyiah.ac.id/".to_string(),
            index_path: "index.php".to_string(),
            repository_path: "repository/".to_string(),
            detail_marker: "p=show_detail".to_string(),
            id_param: "id".to_string(),
            listing_selector: "table.zebra-table td a".to_string(),
            embargo: 0,
            category: None,
        }
    }
}

/// Pagination and document handling
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// First listing page to fetch
    #[serde(rename = "start-page")]
    pub start_page: u32,

    /// Last listing page to fetch (inclusive)
    #[serde(rename = "max-page")]
    pub max_page: u32,

    /// Lower identifier bound (reserved, not applied to discovery)
    #[serde(rename = "min-id")]
    pub min_id: u32,

    /// Upper identifier bound (reserved, not applied to discovery)
    #[serde(rename = "max-id")]
    pub max_id: u32,

    /// Whether to download attachments alongside metadata
    #[serde(rename = "fetch-attachments")]
    pub fetch_attachments: bool,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            start_page: 1,
            max_page: u32::MAX,
            min_id: 0,
            max_id: u32::MAX,
            fetch_attachments: true,
        }
    }
}

/// HTTP client settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Accept invalid TLS certificates
    #[serde(rename = "ignore-certificates")]
    pub ignore_certificates: bool,

    /// User agent sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Whole-request timeout in seconds
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            ignore_certificates: false,
            user_agent: concat!("etd-harvester/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: 120,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving `<id>.json` records and attachments
    pub directory: Option<String>,
}
