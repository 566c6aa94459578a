use indoc::formatdoc;
use integration_tests::TestServer;

#[tokio::test]
async fn index_page() {
    let server = TestServer::start("").await;

    let response = server.client.get("/").await;
    assert_eq!(response.status(), 200);

    let content_type = response.headers()["content-type"].to_str().unwrap().to_owned();
    assert!(content_type.starts_with("text/html"), "{content_type}");

    let body = response.text().await.unwrap();
    assert!(body.contains("<title>Identity Gateway</title>"));
    assert!(body.contains(r#"<script src="/static/app.js"></script>"#));
}

#[tokio::test]
async fn protected_page_needs_no_headers() {
    let server = TestServer::start("").await;

    let response = server.client.get("/protected").await;
    assert_eq!(response.status(), 200);

    let body = response.text().await.unwrap();
    assert!(body.contains("<h1>Protected area</h1>"));
}

#[tokio::test]
async fn static_assets() {
    let static_dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(static_dir.path().join("img")).unwrap();
    std::fs::write(static_dir.path().join("app.js"), "console.log('hi');").unwrap();
    std::fs::write(static_dir.path().join("img").join("logo.svg"), "<svg/>").unwrap();

    let config = formatdoc! {r#"
        [server]
        static_dir = "{}"
    "#, static_dir.path().display()};

    let server = TestServer::start(&config).await;

    let response = server.client.get("/static/app.js").await;
    assert_eq!(response.status(), 200);

    let body = response.text().await.unwrap();
    insta::assert_snapshot!(body, @"console.log('hi');");

    let response = server.client.get("/static/img/logo.svg").await;
    assert_eq!(response.status(), 200);
    assert_eq!(response.headers()["content-type"], "image/svg+xml");
    assert_eq!(response.text().await.unwrap(), "<svg/>");

    for path in ["/static/img", "/static/img/"] {
        let response = server.client.get(path).await;
        assert_eq!(response.status(), 404, "{path}");
    }
}

#[tokio::test]
async fn missing_static_asset_is_not_found() {
    let static_dir = tempfile::tempdir().unwrap();

    let config = formatdoc! {r#"
        [server]
        static_dir = "{}"
    "#, static_dir.path().display()};

    let server = TestServer::start(&config).await;

    let response = server.client.get("/static/nope.css").await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn missing_static_dir_still_serves_pages() {
    let server = TestServer::start(indoc::indoc! {r#"
        [server]
        static_dir = "/this/directory/does/not/exist"
    "#})
    .await;

    assert_eq!(server.client.get("/static/app.css").await.status(), 404);
    assert_eq!(server.client.get("/").await.status(), 200);
}
