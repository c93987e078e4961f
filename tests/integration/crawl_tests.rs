//! Integration tests for the harvester
//!
//! These tests use wiremock to stand up a mock catalog and run the full
//! crawl cycle end-to-end against a temporary output directory.

use etd_harvester::config::Config;
use etd_harvester::crawler::{Coordinator, DocumentRecord};
use etd_harvester::output::StopReason;
use etd_harvester::state::CancellationFlag;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Creates a test configuration pointing at the mock catalog
fn create_test_config(base_url: &str, outdir: &Path, max_page: u32) -> Config {
    let mut config = Config::default();
    config.catalog.base_url = base_url.to_string();
    config.crawl.start_page = 1;
    config.crawl.max_page = max_page;
    config.http.timeout_secs = 5;
    config.output.directory = Some(outdir.display().to_string());
    config
}

/// Listing page linking to the given identifiers
fn listing_page(ids: &[&str]) -> String {
    let rows: String = ids
        .iter()
        .map(|id| {
            format!(
                r#"<tr><td><a href="index.php?p=show_detail&amp;id={}">Skripsi {}</a></td></tr>"#,
                id, id
            )
        })
        .collect();
    format!(
        r#"<html><body><table class="zebra-table">{}</table></body></html>"#,
        rows
    )
}

/// Metadata document with an optional attachment
fn metadata_xml(id: &str, attachment: Option<&str>) -> String {
    let digitals = match attachment {
        Some(path) => format!(
            r#"<slims_digitals><slims_digital_item path="{}">Fulltext</slims_digital_item></slims_digitals>"#,
            path
        ),
        None => String::new(),
    };
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<modsCollection xmlns="http://www.loc.gov/mods/v3">
  <mods id="{id}">
    <titleInfo><title>Skripsi {id}</title></titleInfo>
    <name><namePart>Mahasiswa {id}</namePart></name>
    <note>Abstrak {id}</note>
    {digitals}
    <recordInfo><recordCreationDate>2020-01-01 00:00:00</recordCreationDate></recordInfo>
  </mods>
</modsCollection>"#,
        id = id,
        digitals = digitals
    )
}

async fn mount_listing(server: &MockServer, page: u32, ids: &[&str], expected: u64) {
    Mock::given(method("GET"))
        .and(path("/index.php"))
        .and(query_param("page", page.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(ids)))
        .expect(expected)
        .mount(server)
        .await;
}

async fn mount_metadata<R>(server: &MockServer, id: &str, response: R, expected: u64)
where
    R: Respond + 'static,
{
    Mock::given(method("GET"))
        .and(path("/index.php"))
        .and(query_param("p", "show_detail"))
        .and(query_param("id", id))
        .respond_with(response)
        .expect(expected)
        .mount(server)
        .await;
}

fn xml_response(id: &str, attachment: Option<&str>) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/xml")
        .set_body_string(metadata_xml(id, attachment))
}

fn read_record(dir: &Path, id: &str) -> DocumentRecord {
    let bytes = std::fs::read(dir.join(format!("{}.json", id))).expect("record missing");
    serde_json::from_slice(&bytes).expect("record is not valid JSON")
}

/// Sets a cancellation flag when the request arrives, then answers slowly
struct CancelOnRequest {
    flag: CancellationFlag,
    response: ResponseTemplate,
}

impl Respond for CancelOnRequest {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        self.flag.cancel();
        self.response.clone()
    }
}

#[tokio::test]
async fn test_harvest_stops_after_empty_page() {
    let server = MockServer::start().await;
    let outdir = TempDir::new().unwrap();

    mount_listing(&server, 1, &["10", "11"], 1).await;
    mount_listing(&server, 2, &[], 1).await;
    mount_listing(&server, 3, &[], 0).await;

    mount_metadata(&server, "10", xml_response("10", None), 1).await;
    mount_metadata(&server, "11", xml_response("11", Some("/thesis11.pdf")), 1).await;

    Mock::given(method("GET"))
        .and(path("/repository/thesis11.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.4 thesis".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let config = create_test_config(&server.uri(), outdir.path(), 10);
    let mut coordinator = Coordinator::new(config).unwrap();
    let stats = coordinator.run().await;

    assert_eq!(stats.documents_saved, 2);
    assert_eq!(stats.documents_dispatched, 2);
    assert_eq!(stats.last_page, Some(2));
    assert_eq!(stats.stop_reason, Some(StopReason::Exhausted));
    assert_eq!(coordinator.success_counter().get().await, 2);

    let ten = read_record(outdir.path(), "10");
    assert_eq!(ten.document_id, "10");
    assert_eq!(ten.title, "Skripsi 10");
    assert_eq!(ten.author, "Mahasiswa 10");
    assert_eq!(ten.abstract_text, "Abstrak 10");
    assert_eq!(ten.date_time, "2020-01-01 00:00:00");
    assert_eq!(ten.document, "");

    let eleven = read_record(outdir.path(), "11");
    assert_eq!(eleven.document, "thesis11.pdf");

    let pdf = std::fs::read(outdir.path().join("thesis11.pdf")).unwrap();
    assert_eq!(pdf, b"%PDF-1.4 thesis");
}

#[tokio::test]
async fn test_record_json_layout() {
    let server = MockServer::start().await;
    let outdir = TempDir::new().unwrap();

    mount_listing(&server, 1, &["12"], 1).await;
    mount_listing(&server, 2, &[], 1).await;
    mount_metadata(&server, "12", xml_response("12", None), 1).await;

    let config = create_test_config(&server.uri(), outdir.path(), 5);
    Coordinator::new(config).unwrap().run().await;

    let raw = std::fs::read_to_string(outdir.path().join("12.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["documentId"], "12");
    assert_eq!(value["title"], "Skripsi 12");
    assert_eq!(value["dateTime"], "2020-01-01 00:00:00");
    assert_eq!(value["abstract"], "Abstrak 12");
    assert_eq!(value["document"], "");
}

#[tokio::test]
async fn test_failed_metadata_is_skipped() {
    let server = MockServer::start().await;
    let outdir = TempDir::new().unwrap();

    mount_listing(&server, 1, &["20"], 1).await;
    mount_listing(&server, 2, &[], 1).await;
    mount_listing(&server, 3, &[], 1).await;
    mount_metadata(&server, "20", ResponseTemplate::new(500), 1).await;

    let config = create_test_config(&server.uri(), outdir.path(), 3);
    let mut coordinator = Coordinator::new(config).unwrap();
    let stats = coordinator.run().await;

    // Nothing was saved, so empty pages do not end the crawl early
    assert_eq!(stats.documents_saved, 0);
    assert_eq!(stats.documents_failed, 1);
    assert_eq!(stats.last_page, Some(3));
    assert_eq!(stats.stop_reason, Some(StopReason::PageLimit));
    assert!(!outdir.path().join("20.json").exists());
}

#[tokio::test]
async fn test_missing_attachment_leaves_no_record() {
    let server = MockServer::start().await;
    let outdir = TempDir::new().unwrap();

    mount_listing(&server, 1, &["21", "22"], 1).await;
    mount_listing(&server, 2, &[], 1).await;
    mount_metadata(&server, "21", xml_response("21", Some("/gone.pdf")), 1).await;
    mount_metadata(&server, "22", xml_response("22", None), 1).await;

    Mock::given(method("GET"))
        .and(path("/repository/gone.pdf"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let config = create_test_config(&server.uri(), outdir.path(), 5);
    let stats = Coordinator::new(config).unwrap().run().await;

    assert_eq!(stats.documents_saved, 1);
    assert_eq!(stats.documents_failed, 1);
    assert!(!outdir.path().join("21.json").exists());
    assert!(!outdir.path().join("gone.pdf").exists());
    assert!(outdir.path().join("22.json").exists());
}

#[tokio::test]
async fn test_persisted_documents_are_not_refetched() {
    let server = MockServer::start().await;
    let outdir = TempDir::new().unwrap();
    std::fs::write(outdir.path().join("30.json"), r#"{"documentId":"30"}"#).unwrap();

    mount_listing(&server, 1, &["30", "31"], 1).await;
    mount_listing(&server, 2, &[], 1).await;
    mount_metadata(&server, "30", xml_response("30", None), 0).await;
    mount_metadata(&server, "31", xml_response("31", None), 1).await;

    let config = create_test_config(&server.uri(), outdir.path(), 5);
    let stats = Coordinator::new(config).unwrap().run().await;

    assert_eq!(stats.documents_saved, 1);
    assert_eq!(stats.documents_dispatched, 1);
    assert_eq!(stats.already_persisted, 1);

    // The existing record is left untouched
    let raw = std::fs::read_to_string(outdir.path().join("30.json")).unwrap();
    assert_eq!(raw, r#"{"documentId":"30"}"#);
}

#[tokio::test]
async fn test_relisted_documents_are_dispatched_once() {
    let server = MockServer::start().await;
    let outdir = TempDir::new().unwrap();

    mount_listing(&server, 1, &["40", "41"], 1).await;
    // Page 2 only repeats page 1 and so counts as empty
    mount_listing(&server, 2, &["41", "40"], 1).await;
    mount_listing(&server, 3, &["42"], 0).await;
    mount_metadata(&server, "40", xml_response("40", None), 1).await;
    mount_metadata(&server, "41", xml_response("41", None), 1).await;

    let config = create_test_config(&server.uri(), outdir.path(), 5);
    let stats = Coordinator::new(config).unwrap().run().await;

    assert_eq!(stats.documents_saved, 2);
    assert_eq!(stats.stop_reason, Some(StopReason::Exhausted));
}

#[tokio::test]
async fn test_failed_listing_page_is_skipped() {
    let server = MockServer::start().await;
    let outdir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/index.php"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;
    mount_listing(&server, 2, &["50"], 1).await;
    mount_listing(&server, 3, &[], 1).await;
    mount_metadata(&server, "50", xml_response("50", None), 1).await;

    let config = create_test_config(&server.uri(), outdir.path(), 10);
    let stats = Coordinator::new(config).unwrap().run().await;

    assert_eq!(stats.pages_failed, 1);
    assert_eq!(stats.pages_fetched, 2);
    assert_eq!(stats.documents_saved, 1);
    assert_eq!(stats.last_page, Some(3));
}

#[tokio::test]
async fn test_unparsable_listing_page_is_skipped() {
    let server = MockServer::start().await;
    let outdir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/index.php"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Database error, please retry"))
        .expect(1)
        .mount(&server)
        .await;
    mount_listing(&server, 2, &["55"], 1).await;
    mount_listing(&server, 3, &[], 1).await;
    mount_metadata(&server, "55", xml_response("55", None), 1).await;

    let config = create_test_config(&server.uri(), outdir.path(), 10);
    let stats = Coordinator::new(config).unwrap().run().await;

    assert_eq!(stats.pages_failed, 1);
    assert_eq!(stats.pages_fetched, 2);
    assert_eq!(stats.documents_saved, 1);
    assert_eq!(stats.last_page, Some(3));
    assert!(outdir.path().join("55.json").exists());
}

#[tokio::test]
async fn test_latin1_listing_page_is_harvested() {
    let server = MockServer::start().await;
    let outdir = TempDir::new().unwrap();

    let mut body = listing_page(&["56"]).replace("Skripsi 56", "Caf~").into_bytes();
    let pos = body.iter().position(|b| *b == b'~').unwrap();
    body[pos] = 0xe9;
    Mock::given(method("GET"))
        .and(path("/index.php"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
        .expect(1)
        .mount(&server)
        .await;
    mount_listing(&server, 2, &[], 1).await;
    mount_metadata(&server, "56", xml_response("56", None), 1).await;

    let config = create_test_config(&server.uri(), outdir.path(), 10);
    let stats = Coordinator::new(config).unwrap().run().await;

    assert_eq!(stats.pages_failed, 0);
    assert_eq!(stats.documents_saved, 1);
    assert!(outdir.path().join("56.json").exists());
}

#[tokio::test]
async fn test_start_after_max_page_makes_no_requests() {
    let server = MockServer::start().await;
    let outdir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = create_test_config(&server.uri(), outdir.path(), 3);
    config.crawl.start_page = 4;
    let stats = Coordinator::new(config).unwrap().run().await;

    assert_eq!(stats.documents_saved, 0);
    assert_eq!(stats.last_page, None);
}

#[tokio::test]
async fn test_attachments_disabled() {
    let server = MockServer::start().await;
    let outdir = TempDir::new().unwrap();

    mount_listing(&server, 1, &["60"], 1).await;
    mount_listing(&server, 2, &[], 1).await;
    mount_metadata(&server, "60", xml_response("60", Some("/t60.pdf")), 1).await;

    Mock::given(method("GET"))
        .and(path("/repository/t60.pdf"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = create_test_config(&server.uri(), outdir.path(), 5);
    config.crawl.fetch_attachments = false;
    let stats = Coordinator::new(config).unwrap().run().await;

    assert_eq!(stats.documents_saved, 1);
    assert_eq!(read_record(outdir.path(), "60").document, "t60.pdf");
    assert!(!outdir.path().join("t60.pdf").exists());
}

#[tokio::test]
async fn test_interrupt_lets_in_flight_documents_finish() {
    let server = MockServer::start().await;
    let outdir = TempDir::new().unwrap();
    let cancel = CancellationFlag::new();

    mount_listing(&server, 1, &["70"], 1).await;
    mount_listing(&server, 2, &["71"], 1).await;
    mount_listing(&server, 3, &["72", "73"], 1).await;
    mount_listing(&server, 4, &["74"], 0).await;

    mount_metadata(&server, "70", xml_response("70", None), 1).await;
    mount_metadata(&server, "71", xml_response("71", None), 1).await;
    mount_metadata(&server, "72", xml_response("72", None), 1).await;
    mount_metadata(
        &server,
        "73",
        CancelOnRequest {
            flag: cancel.clone(),
            response: xml_response("73", None).set_delay(Duration::from_millis(300)),
        },
        1,
    )
    .await;
    mount_metadata(&server, "74", xml_response("74", None), 0).await;

    let config = create_test_config(&server.uri(), outdir.path(), 10);
    let mut coordinator = Coordinator::new(config)
        .unwrap()
        .with_cancellation(cancel.clone());
    let stats = coordinator.run().await;

    assert!(cancel.is_cancelled());
    assert_eq!(stats.documents_saved, 4);
    assert_eq!(stats.last_page, Some(3));
    assert_eq!(stats.stop_reason, Some(StopReason::Interrupted));
    assert!(outdir.path().join("73.json").exists());
    assert!(!outdir.path().join("74.json").exists());
}
