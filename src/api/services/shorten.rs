use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, web};
use serde::Deserialize;
use tracing::debug;

use super::{EdgeSettings, error_response};
use crate::services::{ShortenRequest, TrackerService};
use crate::utils::escape_html;

#[derive(Debug, Deserialize)]
pub struct ShortenForm {
    pub url: Option<String>,
}

pub struct ShortenService;

impl ShortenService {
    pub async fn handle_shorten(
        req: HttpRequest,
        form: Option<web::Form<ShortenForm>>,
        tracker: web::Data<Arc<TrackerService>>,
        settings: Option<web::Data<EdgeSettings>>,
    ) -> HttpResponse {
        // 表单无法解析时按缺少 url 处理
        let url = form.and_then(|f| f.into_inner().url);

        let result = match tracker.shorten(ShortenRequest { url, code: None }).await {
            Ok(result) => result,
            Err(e) => return error_response(&e),
        };

        let base = Self::base_url(&req, settings.as_ref().map(|s| s.get_ref()));
        let short_url = format!("{}/{}", base.trim_end_matches('/'), result.code);
        debug!("Short URL issued: {}", short_url);

        let escaped = escape_html(&short_url);
        HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(format!(
                r#"<p>Shortened URL: <a href="{0}" target="_blank">{0}</a></p>"#,
                escaped
            ))
    }

    /// 优先使用配置的对外地址，否则从请求推导
    fn base_url(req: &HttpRequest, settings: Option<&EdgeSettings>) -> String {
        if let Some(base) = settings.and_then(|s| s.public_base_url.as_deref())
            && !base.is_empty()
        {
            return base.to_string();
        }
        let info = req.connection_info();
        format!("{}://{}", info.scheme(), info.host())
    }
}

pub fn shorten_routes() -> actix_web::Resource {
    web::resource("/shorten").route(web::post().to(ShortenService::handle_shorten))
}
