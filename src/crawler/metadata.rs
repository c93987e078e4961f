//! Metadata extraction from catalog XML (MODS) documents
//!
//! The detail page's XML rendition looks like:
//!
//! ```xml
//! <modsCollection xmlns="http://www.loc.gov/mods/v3">
//!   <mods id="14278">
//!     <titleInfo><title>...</title></titleInfo>
//!     <name><namePart>...</namePart></name>
//!     <note>abstract</note>
//!     <slims_digitals><slims_digital_item path="/thesis.pdf"/></slims_digitals>
//!     <recordInfo><recordCreationDate>...</recordCreationDate></recordInfo>
//!   </mods>
//! </modsCollection>
//! ```
//!
//! Elements are matched by local name, so default and prefixed namespaces
//! both work.

use crate::ParseError;
use roxmltree::{Document, Node};
use serde::{Deserialize, Serialize};

/// Metadata record persisted as `<id>.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRecord {
    pub document_id: String,
    pub title: String,
    pub author: String,
    pub date_time: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    /// Normalized attachment file name, empty when there is none
    pub document: String,
}

impl DocumentRecord {
    /// Returns the attachment name, if the record declares one
    pub fn attachment(&self) -> Option<&str> {
        if self.document.is_empty() {
            None
        } else {
            Some(&self.document)
        }
    }
}

/// Fields as found in the metadata document
///
/// `None` means the element was absent; `Some("")` means it was present but
/// empty. Both become an empty string in the record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedFields {
    pub title: Option<String>,
    pub author: Option<String>,
    pub date_time: Option<String>,
    pub abstract_text: Option<String>,
    pub attachment: Option<String>,
}

impl ExtractedFields {
    /// Builds the record for `id`
    pub fn into_record(self, id: &str) -> DocumentRecord {
        DocumentRecord {
            document_id: id.to_string(),
            title: self.title.unwrap_or_default(),
            author: self.author.unwrap_or_default(),
            date_time: self.date_time.unwrap_or_default(),
            abstract_text: self.abstract_text.unwrap_or_default(),
            document: self.attachment.unwrap_or_default(),
        }
    }
}

/// Parses a metadata document and builds the record for `id`
///
/// # Errors
///
/// * `ParseError::Encoding` - the payload is not UTF-8
/// * `ParseError::Xml` - the payload is not well-formed XML
/// * `ParseError::MissingElement` - there is no `mods` record element
pub fn extract_record(xml: &[u8], id: &str) -> Result<DocumentRecord, ParseError> {
    Ok(extract_fields(xml)?.into_record(id))
}

/// Parses a metadata document into its optional fields
pub fn extract_fields(xml: &[u8]) -> Result<ExtractedFields, ParseError> {
    let text = std::str::from_utf8(xml)?;
    let doc = Document::parse(text)?;
    let record = find_record(&doc).ok_or_else(|| ParseError::MissingElement {
        element: "mods".to_string(),
    })?;

    Ok(ExtractedFields {
        title: child_text(record, &["titleInfo", "title"]),
        author: child_text(record, &["name", "namePart"]),
        date_time: child_text(record, &["recordInfo", "recordCreationDate"]),
        abstract_text: child_text(record, &["note"]),
        attachment: find_attachment(record),
    })
}

/// Locates the `mods` element, either as the root or inside `modsCollection`
fn find_record<'a, 'input>(doc: &'a Document<'input>) -> Option<Node<'a, 'input>> {
    let root = doc.root_element();
    match root.tag_name().name() {
        "mods" => Some(root),
        "modsCollection" => find_child(root, "mods"),
        _ => None,
    }
}

/// Find the first child element with the given local name
fn find_child<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|child| child.is_element() && child.tag_name().name() == tag)
}

/// Follows `path` through first-match children and returns the trimmed text
fn child_text(node: Node<'_, '_>, path: &[&str]) -> Option<String> {
    let mut current = node;
    for tag in path {
        current = find_child(current, tag)?;
    }
    Some(current.text().unwrap_or_default().trim().to_string())
}

/// Reads the attachment path from the digital-items block
///
/// Accepts both the flattened (`slims_digitals`) and the prefixed
/// (`slims:digitals`) spelling.
fn find_attachment(record: Node<'_, '_>) -> Option<String> {
    let digitals =
        find_child(record, "slims_digitals").or_else(|| find_child(record, "digitals"))?;
    let item = find_child(digitals, "slims_digital_item")
        .or_else(|| find_child(digitals, "digital_item"))?;
    item.attribute("path").map(normalize_attachment_name)
}

/// Strips path separators so the name can be stored directly
pub fn normalize_attachment_name(path: &str) -> String {
    path.chars()
        .filter(|c| *c != '/' && *c != '\\')
        .collect::<String>()
        .trim()
        .to_string()
}
