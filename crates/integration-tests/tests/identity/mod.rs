use integration_tests::{ProxyHeaders, TestServer};
use serde_json::json;

fn alice() -> ProxyHeaders {
    ProxyHeaders::verified()
        .subject_dn("CN=alice,O=Example,C=US")
        .issuer_dn("CN=Example Issuing CA,O=Example")
        .serial("4F1A2B")
        .fingerprint("9c:3e:aa:01")
}

#[tokio::test]
async fn me_returns_identity() {
    let server = TestServer::start("").await;

    for path in ["/me", "/api/me"] {
        let response = server.client.get_as(path, alice()).await;
        assert_eq!(response.status(), 200);

        let body: serde_json::Value = response.json().await.unwrap();

        assert_eq!(
            body,
            json!({
                "verified": true,
                "subject_dn": "CN=alice,O=Example,C=US",
                "issuer_dn": "CN=Example Issuing CA,O=Example",
                "serial": "4F1A2B",
                "fingerprint": "9c:3e:aa:01",
                "common_name": "alice",
            })
        );
    }
}

#[tokio::test]
async fn verify_header_is_case_insensitive() {
    let server = TestServer::start("").await;

    let response = server
        .client
        .get_as("/api/me", ProxyHeaders::with_verify("Success").subject_dn("CN=bob"))
        .await;

    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["verified"], json!(true));
    assert_eq!(body["common_name"], json!("bob"));
}

#[tokio::test]
async fn me_without_common_name() {
    let server = TestServer::start("").await;

    let response = server
        .client
        .get_as("/api/me", ProxyHeaders::verified().subject_dn("O=Example,C=US"))
        .await;

    let body: serde_json::Value = response.json().await.unwrap();

    assert_eq!(
        body,
        json!({
            "verified": true,
            "subject_dn": "O=Example,C=US",
            "issuer_dn": null,
            "serial": null,
            "fingerprint": null,
            "common_name": null,
        })
    );
}

#[tokio::test]
async fn unverified_clients_are_rejected() {
    let server = TestServer::start("").await;

    let cases = [
        ("/me", None),
        ("/api/me", Some("")),
        ("/api/me", Some("FAILED")),
        ("/api/me", Some("NONE")),
        ("/api/protected", Some("success:maybe")),
        ("/api/protected", None),
    ];

    for (path, verify) in cases {
        let response = match verify {
            Some(verify) => {
                let headers = ProxyHeaders::with_verify(verify).subject_dn("CN=mallory,O=Evil");
                server.client.get_as(path, headers).await
            }
            None => server.client.get(path).await,
        };

        assert_eq!(response.status(), 401, "{path} with verify={verify:?}");

        let body = response.text().await.unwrap();
        insta::allow_duplicates! {
            insta::assert_snapshot!(body, @r#"{"detail":"Client certificate required/invalid"}"#);
        }
    }
}

#[tokio::test]
async fn protected_greets_common_name() {
    let server = TestServer::start("").await;

    let response = server.client.get_as("/api/protected", alice()).await;
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();

    assert_eq!(
        body,
        json!({
            "ok": true,
            "message": "Hello, alice",
            "identity": {
                "verified": true,
                "subject_dn": "CN=alice,O=Example,C=US",
                "issuer_dn": "CN=Example Issuing CA,O=Example",
                "serial": "4F1A2B",
                "fingerprint": "9c:3e:aa:01",
                "common_name": "alice",
            },
        })
    );
}

#[tokio::test]
async fn protected_falls_back_to_subject_dn() {
    let server = TestServer::start("").await;

    let response = server
        .client
        .get_as("/api/protected", ProxyHeaders::verified().subject_dn("O=Example,C=US"))
        .await;

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["message"], json!("Hello, O=Example,C=US"));
}

#[tokio::test]
async fn protected_falls_back_to_unknown() {
    let server = TestServer::start("").await;

    let response = server.client.get_as("/api/protected", ProxyHeaders::verified()).await;

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["message"], json!("Hello, Unknown"));
    assert_eq!(body["identity"]["common_name"], serde_json::Value::Null);
}

#[tokio::test]
async fn first_common_name_wins() {
    let server = TestServer::start("").await;

    let response = server
        .client
        .get_as("/api/me", ProxyHeaders::verified().subject_dn("CN=alice,CN=admin,O=Example"))
        .await;

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["common_name"], json!("alice"));
}
