//! Integration tests for the catalogue crawler against a mock catalogue.

#![allow(clippy::unwrap_used)]

mod support;

use springer_download::download::HttpSettings;
use springer_download::{BookError, CatalogueCrawler, ChapterRole, HttpClient};
use support::{catalogue_page, entry_path, identity_for, mount_page};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_crawl_follows_pages_and_orders_front_and_back_matter() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        &entry_path("contents/"),
        catalogue_page(
            Some("Numerical Methods"),
            Some("x7k2p9"),
            &["front-matter.pdf", "c1/fulltext.pdf", "back-matter.pdf"],
            Some("page/2/"),
        ),
    )
    .await;
    mount_page(
        &server,
        &entry_path("contents/page/2/"),
        catalogue_page(
            None,
            None,
            &["front-matter.pdf", "c2/fulltext.pdf", "back-matter.pdf"],
            Some("../3/"),
        ),
    )
    .await;
    mount_page(
        &server,
        &entry_path("contents/page/3/"),
        catalogue_page(None, None, &["c3/fulltext.pdf", "back-matter.pdf"], None),
    )
    .await;

    let identity = identity_for(&server);
    let client = HttpClient::new(&HttpSettings::default()).unwrap();
    let book = CatalogueCrawler::new(&client, &identity).crawl().await.unwrap();

    assert_eq!(book.title, "Numerical Methods");
    let hrefs: Vec<_> = book.chapters.iter().map(|c| c.href()).collect();
    assert_eq!(
        hrefs,
        vec![
            "front-matter.pdf",
            "c1/fulltext.pdf",
            "c2/fulltext.pdf",
            "c3/fulltext.pdf",
            "back-matter.pdf",
        ]
    );
    assert_eq!(book.chapters[0].role(), ChapterRole::FrontMatter);
    assert_eq!(book.chapters[4].role(), ChapterRole::BackMatter);
    assert_eq!(
        book.cover_url.unwrap().as_str(),
        format!("{}/contents/x7k2p9/cover-large.gif", server.uri())
    );
}

#[tokio::test]
async fn test_crawl_follows_query_only_next_link() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(entry_path("contents/")))
        .and(query_param("p", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            catalogue_page(None, None, &["c2/fulltext.pdf"], None).into_bytes(),
            "text/html",
        ))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(entry_path("contents/")))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            catalogue_page(Some("Paged Book"), None, &["c1/fulltext.pdf"], Some("?p=2"))
                .into_bytes(),
            "text/html",
        ))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    let identity = identity_for(&server);
    let client = HttpClient::new(&HttpSettings::default()).unwrap();
    let book = CatalogueCrawler::new(&client, &identity).crawl().await.unwrap();

    let hrefs: Vec<_> = book.chapters.iter().map(|c| c.href()).collect();
    assert_eq!(hrefs, vec!["c1/fulltext.pdf", "c2/fulltext.pdf"]);
}

#[tokio::test]
async fn test_crawl_maps_forbidden_status_to_access_denied() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(entry_path("contents/")))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let identity = identity_for(&server);
    let client = HttpClient::new(&HttpSettings::default()).unwrap();
    let result = CatalogueCrawler::new(&client, &identity).crawl().await;

    assert!(
        matches!(result, Err(BookError::AccessDenied { .. })),
        "expected AccessDenied, got {result:?}"
    );
}

#[tokio::test]
async fn test_crawl_missing_page_is_fetch_error() {
    let server = MockServer::start().await;

    let identity = identity_for(&server);
    let client = HttpClient::new(&HttpSettings::default()).unwrap();
    let result = CatalogueCrawler::new(&client, &identity).crawl().await;

    let error = result.unwrap_err();
    assert!(matches!(error, BookError::Fetch { .. }), "{error:?}");
    assert!(error.to_string().starts_with("bad link given"));
}

#[tokio::test]
async fn test_crawl_without_title_fails() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        &entry_path("contents/"),
        catalogue_page(None, None, &["c1/fulltext.pdf"], None),
    )
    .await;

    let identity = identity_for(&server);
    let client = HttpClient::new(&HttpSettings::default()).unwrap();
    let result = CatalogueCrawler::new(&client, &identity).crawl().await;

    assert!(matches!(result, Err(BookError::TitleExtraction { .. })));
}

#[tokio::test]
async fn test_crawl_without_chapters_fails() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        &entry_path("contents/"),
        catalogue_page(Some("Empty Book"), None, &[], None),
    )
    .await;

    let identity = identity_for(&server);
    let client = HttpClient::new(&HttpSettings::default()).unwrap();
    let result = CatalogueCrawler::new(&client, &identity).crawl().await;

    assert!(matches!(result, Err(BookError::NoChaptersFound)));
}

#[tokio::test]
async fn test_crawl_retries_transient_page_failure_when_enabled() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(entry_path("contents/")))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_page(
        &server,
        &entry_path("contents/"),
        catalogue_page(Some("Retried"), None, &["c1/fulltext.pdf"], None),
    )
    .await;

    let identity = identity_for(&server);
    let settings = HttpSettings {
        max_retries: 1,
        ..HttpSettings::default()
    };
    let client = HttpClient::new(&settings).unwrap();
    let book = CatalogueCrawler::new(&client, &identity).crawl().await.unwrap();

    assert_eq!(book.title, "Retried");
    assert_eq!(book.chapters.len(), 1);
}
