use std::sync::Arc;

use actix_web::{HttpResponse, web};
use serde::Deserialize;
use tracing::trace;

use super::{error_response, not_found_response};
use crate::entity::{DEFAULT_DESTINATION, EntitySnapshot};
use crate::services::TrackerService;
use crate::utils::{escape_html, is_valid_short_code};

#[derive(Debug, Default, Deserialize)]
pub struct AdminQuery {
    /// `json` 返回 JSON，否则返回 HTML
    pub format: Option<String>,
}

pub struct AdminService;

impl AdminService {
    /// 只读：目标地址与来源统计，不计数
    pub async fn handle_admin(
        path: web::Path<String>,
        query: web::Query<AdminQuery>,
        tracker: web::Data<Arc<TrackerService>>,
    ) -> HttpResponse {
        let code = path.into_inner();
        if !is_valid_short_code(&code) {
            trace!("Invalid short code rejected on admin page: {}", &code);
            return not_found_response();
        }

        let snapshot = match tracker.inspect(&code).await {
            Ok(snapshot) => snapshot,
            Err(e) => return error_response(&e),
        };

        if query.format.as_deref() == Some("json") {
            HttpResponse::Ok().json(snapshot)
        } else {
            HttpResponse::Ok()
                .content_type("text/html; charset=utf-8")
                .body(render_admin_page(&snapshot))
        }
    }
}

pub fn render_admin_page(snapshot: &EntitySnapshot) -> String {
    let code = escape_html(&snapshot.code);
    let destination = escape_html(
        snapshot
            .destination_url
            .as_deref()
            .unwrap_or(DEFAULT_DESTINATION),
    );

    let referral_items = if snapshot.referrals.is_empty() {
        "<li>No referring pages found</li>".to_string()
    } else {
        snapshot
            .referrals
            .iter()
            .map(|(referrer, count)| format!("<li>{} {}</li>", escape_html(referrer), count))
            .collect::<Vec<_>>()
            .join("")
    };

    format!(
        r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="utf-8">
    <title>Admin Page for {code}</title>
  </head>
  <body>
    <h1>Admin Page for {code}</h1>
    <h3>Destination Url: {destination}</h3>
    <h2>Referring Pages</h2>
    <ul>
      {referral_items}
    </ul>
  </body>
</html>
"#
    )
}

pub fn admin_routes() -> actix_web::Resource {
    web::resource("/{code}/admin")
        .route(web::get().to(AdminService::handle_admin))
        .route(web::head().to(AdminService::handle_admin))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::ReferralCounts;

    #[test]
    fn test_render_empty_listing() {
        let html = render_admin_page(&EntitySnapshot {
            code: "abc".to_string(),
            destination_url: None,
            referrals: ReferralCounts::new(),
        });
        assert!(html.contains("Admin Page for abc"));
        assert!(html.contains("Destination Url: </h3>"));
        assert!(html.contains("No referring pages found"));
    }

    #[test]
    fn test_render_escapes_referrers() {
        let mut referrals = ReferralCounts::new();
        referrals.insert("<script>".to_string(), 2);
        let html = render_admin_page(&EntitySnapshot {
            code: "abc".to_string(),
            destination_url: Some("https://example.org/?a=1&b=2".to_string()),
            referrals,
        });
        assert!(html.contains("<li>&lt;script&gt; 2</li>"));
        assert!(html.contains("https://example.org/?a=1&amp;b=2"));
        assert!(!html.contains("<script>"));
    }
}
