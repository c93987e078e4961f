//! Address construction for a paginated catalog
//!
//! A catalog exposes three kinds of addresses:
//! - listing pages: `<index>?embargo=E[&category=C]&page=N`
//! - metadata documents: `<index>?p=show_detail&inXML=true&id=ID`
//! - attachments: `<repository>/<name>`

use crate::config::CatalogConfig;
use url::Url;

/// Query parameter asking the detail page for its XML rendition
const METADATA_FORMAT_PARAM: (&str, &str) = ("inXML", "true");

/// Resolved addresses for one catalog
#[derive(Debug, Clone)]
pub struct CatalogUrls {
    /// The index script (listing pages and detail pages)
    index: Url,

    /// Directory that serves attachment files
    repository: Url,

    /// Detail-link marker split into key and value (`p`, `show_detail`)
    detail_marker: (String, String),

    /// Query parameter carrying the identifier
    id_param: String,

    /// Filters sent with every listing request
    listing_filters: Vec<(String, String)>,
}

impl CatalogUrls {
    /// Resolves the catalog configuration into absolute addresses
    ///
    /// # Errors
    ///
    /// Returns a parse error if the base URL or one of the paths is invalid.
    pub fn new(config: &CatalogConfig) -> Result<Self, url::ParseError> {
        let mut base = Url::parse(&config.base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let index = base.join(&config.index_path)?;
        let repository = base.join(&config.repository_path)?;

        let detail_marker = match config.detail_marker.split_once('=') {
            Some((key, value)) => (key.to_string(), value.to_string()),
            None => (config.detail_marker.clone(), String::new()),
        };

        let mut listing_filters = vec![("embargo".to_string(), config.embargo.to_string())];
        if let Some(category) = &config.category {
            listing_filters.push(("category".to_string(), category.clone()));
        }

        Ok(Self {
            index,
            repository,
            detail_marker,
            id_param: config.id_param.clone(),
            listing_filters,
        })
    }

    /// Address of listing page `page`
    pub fn listing_url(&self, page: u32) -> Url {
        let mut url = self.index.clone();
        {
            let mut query = url.query_pairs_mut();
            query.clear();
            for (key, value) in &self.listing_filters {
                query.append_pair(key, value);
            }
            query.append_pair("page", &page.to_string());
        }
        url
    }

    /// Address of the XML metadata document for `id`
    pub fn metadata_url(&self, id: &str) -> Url {
        let mut url = self.index.clone();
        url.query_pairs_mut()
            .clear()
            .append_pair(&self.detail_marker.0, &self.detail_marker.1)
            .append_pair(METADATA_FORMAT_PARAM.0, METADATA_FORMAT_PARAM.1)
            .append_pair(&self.id_param, id);
        url
    }

    /// Address of the attachment file `name`
    ///
    /// The name is pushed as a single path segment, so characters such as
    /// `?` or `#` are percent-encoded rather than changing the address.
    pub fn attachment_url(&self, name: &str) -> Url {
        let mut url = self.repository.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(name);
        }
        url
    }

    /// Extracts the document identifier from a detail link
    ///
    /// The link is resolved against `page_url` first. It qualifies when it
    /// points at the index script on the catalog host and carries the detail
    /// marker; the scheme is not compared, since catalogs often mix http and
    /// https links.
    ///
    /// # Returns
    ///
    /// * `Some(id)` - The non-empty identifier
    /// * `None` - The link is not a detail link
    pub fn document_id(&self, href: &str, page_url: &Url) -> Option<String> {
        let href = href.trim();
        if href.is_empty() || href.starts_with('#') {
            return None;
        }

        let link = page_url.join(href).ok()?;
        if link.host_str() != self.index.host_str() || link.path() != self.index.path() {
            return None;
        }

        let (marker_key, marker_value) = &self.detail_marker;
        let is_detail = link
            .query_pairs()
            .any(|(key, value)| key == marker_key.as_str() && value == marker_value.as_str());
        if !is_detail {
            return None;
        }

        link.query_pairs()
            .find(|(key, _)| key == self.id_param.as_str())
            .map(|(_, value)| value.trim().to_string())
            .filter(|id| !id.is_empty())
    }
}
