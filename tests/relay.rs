//! End-to-end tests: real relay, mock upstreams, real sockets.

use axum::http::header;
use edge_relay::policy::{PolicyTable, SourcePolicy};
use reqwest::StatusCode;

mod common;

use common::{client, respond_with, start_mock_upstream, start_relay};

/// Policy that admits the loopback mock as a media host.
fn loopback_policy(referer: Option<&str>) -> PolicyTable {
    PolicyTable::new(vec![SourcePolicy::new("local", ["127.0.0.1"], referer)])
}

fn unused_api_base() -> String {
    "http://127.0.0.1:9/api.php".to_string()
}

#[tokio::test]
async fn test_preflight() {
    let relay = start_relay(unused_api_base(), PolicyTable::builtin()).await;

    let res = client()
        .request(reqwest::Method::OPTIONS, relay.url())
        .send()
        .await
        .expect("Relay unreachable");

    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    let headers = res.headers();
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "GET,HEAD,OPTIONS");
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_HEADERS], "*");
    assert_eq!(headers[header::ACCESS_CONTROL_MAX_AGE], "86400");
    assert!(res.bytes().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_method_not_allowed() {
    let relay = start_relay(unused_api_base(), PolicyTable::builtin()).await;

    let res = client()
        .post(format!("{}?types=song", relay.url()))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(res.text().await.unwrap(), "Method not allowed");
}

#[tokio::test]
async fn test_foreign_host_is_forbidden() {
    let relay = start_relay(unused_api_base(), PolicyTable::builtin()).await;

    let res = client()
        .get(relay.url())
        .query(&[("target", "https://evil.com/file.mp3")])
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(res.text().await.unwrap(), "Target host not allowed");
}

#[tokio::test]
async fn test_scheme_smuggling_is_rejected() {
    let relay = start_relay(unused_api_base(), PolicyTable::builtin()).await;

    for target in ["javascript:alert(1)", "file:///etc/passwd", "ftp://x"] {
        let res = client()
            .get(relay.url())
            .query(&[("target", target), ("source", "kuwo")])
            .send()
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{target}");
        assert_eq!(res.text().await.unwrap(), "Invalid target");
    }
}

#[tokio::test]
async fn test_audio_relay_streams_range_with_referer() {
    let upstream = start_mock_upstream(|_| {
        respond_with(
            206,
            &[
                ("content-type", "audio/mpeg"),
                ("content-range", "bytes 0-12/1000"),
                ("accept-ranges", "bytes"),
                ("set-cookie", "tracker=1"),
                ("x-powered-by", "media-cdn"),
            ],
            "partial-audio",
        )
    })
    .await;
    let relay = start_relay(
        unused_api_base(),
        loopback_policy(Some("https://www.kuwo.cn/")),
    )
    .await;

    let res = client()
        .get(relay.url())
        .query(&[("target", upstream.url("/song.mp3?x=1").as_str()), ("source", "LOCAL")])
        .header(header::RANGE, "bytes=0-12")
        .header(header::USER_AGENT, "TestPlayer/1.0")
        .header(header::COOKIE, "session=secret")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::PARTIAL_CONTENT);
    let headers = res.headers().clone();
    assert_eq!(headers[header::CONTENT_TYPE], "audio/mpeg");
    assert_eq!(headers[header::CONTENT_RANGE], "bytes 0-12/1000");
    assert_eq!(headers[header::ACCEPT_RANGES], "bytes");
    assert_eq!(headers[header::CACHE_CONTROL], "public, max-age=3600");
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert!(headers.get(header::SET_COOKIE).is_none());
    assert!(headers.get("x-powered-by").is_none());
    assert!(headers.get("x-request-id").is_none());
    assert_eq!(res.text().await.unwrap(), "partial-audio");

    let seen = upstream.last();
    assert_eq!(seen.method, reqwest::Method::GET);
    assert_eq!(seen.path, "/song.mp3");
    assert_eq!(seen.query.as_deref(), Some("x=1"));
    assert_eq!(seen.headers[header::REFERER], "https://www.kuwo.cn/");
    assert_eq!(seen.headers[header::ORIGIN], "https://www.kuwo.cn");
    assert_eq!(seen.headers[header::RANGE], "bytes=0-12");
    assert_eq!(seen.headers[header::USER_AGENT], "TestPlayer/1.0");
    assert!(seen.headers.get(header::COOKIE).is_none());
}

#[tokio::test]
async fn test_audio_relay_head_and_defaults() {
    let upstream = start_mock_upstream(|_| {
        respond_with(
            200,
            &[("content-type", "audio/flac"), ("cache-control", "max-age=60")],
            "flac-bytes",
        )
    })
    .await;
    let relay = start_relay(unused_api_base(), loopback_policy(None)).await;

    let res = client()
        .head(relay.url())
        .query(&[("target", upstream.url("/a.flac").as_str())])
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()[header::CACHE_CONTROL], "max-age=60");
    assert_eq!(res.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");

    let seen = upstream.last();
    assert_eq!(seen.method, reqwest::Method::HEAD);
    assert!(seen.headers[header::USER_AGENT]
        .to_str()
        .unwrap()
        .starts_with("Mozilla/5.0"));
    assert!(seen.headers.get(header::REFERER).is_none());
    assert!(seen.headers.get(header::ORIGIN).is_none());
    assert!(seen.headers.get(header::RANGE).is_none());
}

#[tokio::test]
async fn test_api_relay_strips_routing_params() {
    let upstream = start_mock_upstream(|_| {
        respond_with(200, &[("set-cookie", "sid=1")], r#"{"ok":true}"#)
    })
    .await;
    let relay = start_relay(upstream.url("/api.php"), PolicyTable::builtin()).await;

    let res = client()
        .get(format!("{}?types=song&callback=jsonp123&source=x", relay.url()))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()[header::CONTENT_TYPE], "application/json; charset=utf-8");
    assert_eq!(res.headers()[header::CACHE_CONTROL], "no-store");
    assert_eq!(res.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert!(res.headers().get(header::SET_COOKIE).is_none());
    assert_eq!(res.text().await.unwrap(), r#"{"ok":true}"#);

    let seen = upstream.last();
    assert_eq!(seen.method, reqwest::Method::GET);
    assert_eq!(seen.path, "/api.php");
    assert_eq!(seen.query.as_deref(), Some("types=song&source=x"));
    assert_eq!(seen.headers[header::ACCEPT], "application/json");
    assert!(seen.headers.get(header::USER_AGENT).is_some());
}

#[tokio::test]
async fn test_api_relay_passes_upstream_status() {
    let upstream = start_mock_upstream(|_| {
        respond_with(503, &[("content-type", "text/html")], "busy")
    })
    .await;
    let relay = start_relay(upstream.url("/api.php"), PolicyTable::builtin()).await;

    let res = client()
        .get(format!("{}?types=search&name=test", relay.url()))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(res.headers()[header::CONTENT_TYPE], "text/html");
    assert_eq!(res.text().await.unwrap(), "busy");
    assert_eq!(upstream.requests().len(), 1, "no retries");
}

#[tokio::test]
async fn test_missing_types_never_reaches_upstream() {
    let upstream = start_mock_upstream(|_| respond_with(200, &[], "{}")).await;
    let relay = start_relay(upstream.url("/api.php"), PolicyTable::builtin()).await;

    let res = client()
        .get(format!("{}?name=test", relay.url()))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.text().await.unwrap(), "Missing types");
    assert!(upstream.requests().is_empty());
}

#[tokio::test]
async fn test_unreachable_upstream_is_bad_gateway() {
    let closed = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = closed.local_addr().unwrap();
    drop(closed);

    let relay = start_relay(format!("http://{addr}/api.php"), PolicyTable::builtin()).await;

    let res = client()
        .get(format!("{}?types=song", relay.url()))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    assert!(res.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    assert_eq!(res.text().await.unwrap(), "Upstream request failed");
}

#[tokio::test]
async fn test_redirect_keeps_injected_referer() {
    let upstream = start_mock_upstream(|seen| {
        if seen.path == "/a.mp3" {
            respond_with(302, &[("location", "/b.mp3")], "")
        } else {
            respond_with(200, &[("content-type", "audio/mpeg")], "moved-audio")
        }
    })
    .await;
    let relay = start_relay(
        unused_api_base(),
        loopback_policy(Some("https://www.kuwo.cn/")),
    )
    .await;

    let res = client()
        .get(relay.url())
        .query(&[("target", upstream.url("/a.mp3").as_str()), ("source", "local")])
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "moved-audio");

    let hops = upstream.requests();
    assert_eq!(hops.len(), 2);
    assert_eq!(hops[1].path, "/b.mp3");
    for hop in &hops {
        assert_eq!(hop.headers[header::REFERER], "https://www.kuwo.cn/");
        assert_eq!(hop.headers[header::ORIGIN], "https://www.kuwo.cn");
    }
}

#[tokio::test]
async fn test_redirect_to_foreign_host_is_not_followed() {
    let upstream = start_mock_upstream(|seen| {
        if seen.path == "/a.mp3" {
            let port = seen
                .headers
                .get(header::HOST)
                .and_then(|h| h.to_str().ok())
                .and_then(|h| h.rsplit(':').next())
                .unwrap_or("80")
                .to_string();
            let location = format!("http://localhost:{port}/c.mp3");
            let mut response = respond_with(302, &[], "");
            response
                .headers_mut()
                .insert(header::LOCATION, location.parse().unwrap());
            response
        } else {
            respond_with(200, &[], "should-not-be-fetched")
        }
    })
    .await;
    let relay = start_relay(unused_api_base(), loopback_policy(None)).await;

    let res = client()
        .get(relay.url())
        .query(&[("target", upstream.url("/a.mp3").as_str())])
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(res.text().await.unwrap(), "Upstream request failed");
    assert_eq!(upstream.requests().len(), 1);
}
