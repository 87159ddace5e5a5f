use std::sync::Arc;

use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, web};
use tracing::trace;

use super::{error_response, not_found_response};
use crate::services::TrackerService;
use crate::utils::is_valid_short_code;

pub struct RedirectService;

impl RedirectService {
    pub async fn handle_redirect(
        req: HttpRequest,
        path: web::Path<String>,
        tracker: web::Data<Arc<TrackerService>>,
    ) -> HttpResponse {
        let code = path.into_inner();

        if !is_valid_short_code(&code) {
            // 非法短码，直接 404（不创建 Entity）
            trace!("Invalid short code rejected: {}", &code);
            return not_found_response();
        }

        let referrer = req
            .headers()
            .get(header::REFERER)
            .and_then(|h| h.to_str().ok());

        match tracker.resolve_and_track(&code, referrer).await {
            Ok(target) => HttpResponse::Found()
                .insert_header((header::LOCATION, target))
                .finish(),
            Err(e) => error_response(&e),
        }
    }
}

/// Redirect 路由配置
pub fn redirect_routes() -> actix_web::Resource {
    web::resource("/{code}").route(web::get().to(RedirectService::handle_redirect))
}
