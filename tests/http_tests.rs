//! HTTP edge tests

use std::sync::Arc;

use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};

use reflinker::api::services::{EdgeSettings, configure_routes};
use reflinker::entity::EntityRegistry;
use reflinker::services::TrackerService;
use reflinker::storage::MemoryStoreFactory;

const BASE_URL: &str = "https://sho.rt";

fn tracker() -> Arc<TrackerService> {
    let registry = Arc::new(EntityRegistry::new(Arc::new(MemoryStoreFactory)));
    Arc::new(TrackerService::new(registry, 8, "Direct".to_string()))
}

macro_rules! app {
    ($tracker:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(Arc::clone(&$tracker)))
                .app_data(web::Data::new(EdgeSettings {
                    public_base_url: Some(BASE_URL.to_string()),
                }))
                .configure(configure_routes),
        )
        .await
    };
}

/// 从 shorten 响应中取出短码
fn extract_code(body: &str) -> String {
    let prefix = format!(r#"href="{}/"#, BASE_URL);
    let start = body.find(&prefix).expect("short url in body") + prefix.len();
    body[start..]
        .split('"')
        .next()
        .expect("closing quote")
        .to_string()
}

#[actix_rt::test]
async fn test_home_page() {
    let tracker = tracker();
    let app = app!(tracker);

    let req = test::TestRequest::get().uri("/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = test::read_body(resp).await;
    let body = String::from_utf8_lossy(&body);
    assert!(body.contains(r#"action="/shorten""#));
}

#[actix_rt::test]
async fn test_shorten_redirect_and_track() {
    let tracker = tracker();
    let app = app!(tracker);

    let req = test::TestRequest::post()
        .uri("/shorten")
        .set_form([("url", "https://example.org")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = test::read_body(resp).await;
    let body = String::from_utf8_lossy(&body).into_owned();
    assert!(body.starts_with("<p>Shortened URL: "));
    let code = extract_code(&body);
    assert_eq!(code.len(), 8);

    // 无 Referer 访问
    let req = test::TestRequest::get().uri(&format!("/{}", code)).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(
        resp.headers().get(header::LOCATION).unwrap(),
        "https://example.org"
    );

    let req = test::TestRequest::get()
        .uri(&format!("/{}/admin?format=json", code))
        .to_request();
    let json: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(json["destination_url"], "https://example.org");
    assert_eq!(json["referrals"], serde_json::json!({"Direct": 1}));

    // 带 Referer 访问
    let req = test::TestRequest::get()
        .uri(&format!("/{}", code))
        .insert_header((header::REFERER, "https://ref.example"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);

    let req = test::TestRequest::get()
        .uri(&format!("/{}/admin?format=json", code))
        .to_request();
    let json: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(json["code"], code.as_str());
    assert_eq!(
        json["referrals"],
        serde_json::json!({"Direct": 1, "https://ref.example": 1})
    );

    // HTML 管理页
    let req = test::TestRequest::get()
        .uri(&format!("/{}/admin", code))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    let body = String::from_utf8_lossy(&body);
    assert!(body.contains("Destination Url: https://example.org"));
    assert!(body.contains("<li>Direct 1</li>"));
    assert!(body.contains("<li>https://ref.example 1</li>"));
}

#[actix_rt::test]
async fn test_shorten_without_url_is_bad_request() {
    let tracker = tracker();
    let app = app!(tracker);

    let req = test::TestRequest::post()
        .uri("/shorten")
        .set_form([("other", "value")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = test::read_body(resp).await;
    assert_eq!(body, "Invalid URL");

    let req = test::TestRequest::post().uri("/shorten").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(tracker.registry().is_empty());
}

#[actix_rt::test]
async fn test_admin_page_for_unset_code() {
    let tracker = tracker();
    let app = app!(tracker);

    let req = test::TestRequest::get().uri("/fresh123/admin").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = test::read_body(resp).await;
    let body = String::from_utf8_lossy(&body);
    assert!(body.contains("Admin Page for fresh123"));
    assert!(body.contains("Destination Url: </h3>"));
    assert!(body.contains("No referring pages found"));
}

#[actix_rt::test]
async fn test_admin_page_does_not_count() {
    let tracker = tracker();
    let app = app!(tracker);

    for _ in 0..3 {
        let req = test::TestRequest::get().uri("/quiet123/admin").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let snapshot = tracker.inspect("quiet123").await.unwrap();
    assert!(snapshot.referrals.is_empty());
}

#[actix_rt::test]
async fn test_invalid_code_is_not_found_and_not_registered() {
    let tracker = tracker();
    let app = app!(tracker);

    let req = test::TestRequest::get().uri("/bad~code").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get().uri("/bad~code/admin").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    assert!(!tracker.registry().contains("bad~code"));
    assert!(tracker.registry().is_empty());
}

#[actix_rt::test]
async fn test_unknown_code_is_not_found() {
    let tracker = tracker();
    let app = app!(tracker);

    let req = test::TestRequest::get().uri("/unknown1").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = test::read_body(resp).await;
    assert_eq!(body, "URL not found");

    // 未设置目标的访问依然计入来源统计
    let snapshot = tracker.inspect("unknown1").await.unwrap();
    assert_eq!(snapshot.referrals.get("Direct"), Some(&1));
}

#[actix_rt::test]
async fn test_shorten_uses_request_host_without_public_base_url() {
    let tracker = tracker();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(Arc::clone(&tracker)))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/shorten")
        .insert_header((header::HOST, "links.local:8080"))
        .set_form([("url", "https://example.org")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = test::read_body(resp).await;
    let body = String::from_utf8_lossy(&body);
    assert!(body.contains(r#"href="http://links.local:8080/"#));
}

#[actix_rt::test]
async fn test_shorten_rejects_url_with_control_characters() {
    let tracker = tracker();
    let app = app!(tracker);

    let req = test::TestRequest::post()
        .uri("/shorten")
        .set_form([("url", "https://example.org/a\nb")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = test::read_body(resp).await;
    assert!(String::from_utf8_lossy(&body).starts_with("Invalid URL"));

    // 没有写入任何短码，后续重定向不会 500
    assert!(tracker.registry().is_empty());
}
