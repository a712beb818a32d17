mod common;

use anyhow::Result;
use reqwest::StatusCode;

#[tokio::test]
async fn root_reports_service_info() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client.get(&server.base_url).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let payload = res.json::<serde_json::Value>().await?;
    assert!(payload["success"].as_bool().unwrap_or(false), "payload: {}", payload);
    assert_eq!(payload["data"]["name"], "Portal Catalog API");
    assert!(payload["data"]["endpoints"]["areas"].is_string());

    Ok(())
}

#[tokio::test]
async fn cors_echoes_only_configured_origins() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    // The harness pins SECURITY_CORS_ORIGINS to a single origin
    let res = client
        .get(&server.base_url)
        .header("origin", "http://portal-tests.localhost")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("http://portal-tests.localhost")
    );

    let res = client
        .get(&server.base_url)
        .header("origin", "https://elsewhere.example.com")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(
        res.headers().get("access-control-allow-origin").is_none(),
        "unlisted origin must not be allowed"
    );

    Ok(())
}

#[tokio::test]
async fn health_reports_database_state() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/health", server.base_url))
        .send()
        .await?;
    let status = res.status();
    let payload = res.json::<serde_json::Value>().await?;

    match status {
        StatusCode::OK => {
            assert_eq!(payload["data"]["status"], "ok");
            assert_eq!(payload["data"]["database"], "ok");
        }
        StatusCode::SERVICE_UNAVAILABLE => {
            assert_eq!(payload["data"]["status"], "degraded");
            assert!(payload["data"]["database_error"].is_string());
        }
        other => panic!("unexpected health status {other}: {payload}"),
    }

    Ok(())
}
