pub mod admin;
pub mod frontend;
pub mod redirect;
pub mod shorten;

use actix_web::HttpResponse;
use tracing::error;

use crate::errors::ReflinkerError;

pub use admin::{AdminService, admin_routes};
pub use frontend::{FrontendService, frontend_routes};
pub use redirect::{RedirectService, redirect_routes};
pub use shorten::{ShortenService, shorten_routes};

/// HTTP 边缘层设置
#[derive(Clone, Debug, Default)]
pub struct EdgeSettings {
    /// 生成短链接时使用的对外地址，未设置时从请求推导
    pub public_base_url: Option<String>,
}

/// 注册全部路由
///
/// `/{code}/admin` 必须先于 `/{code}` 注册。
pub fn configure_routes(cfg: &mut actix_web::web::ServiceConfig) {
    cfg.service(frontend_routes())
        .service(shorten_routes())
        .service(admin_routes())
        .service(redirect_routes());
}

/// 从 ReflinkerError 构建纯文本错误响应
pub fn error_response(err: &ReflinkerError) -> HttpResponse {
    let status = err.http_status();
    let body = match err {
        ReflinkerError::Validation(msg) => msg.clone(),
        ReflinkerError::NotFound(_) => "URL not found".to_string(),
        _ => {
            error!("{}", err.format_colored());
            "Internal Server Error".to_string()
        }
    };

    HttpResponse::build(status)
        .insert_header(("Content-Type", "text/plain; charset=utf-8"))
        .body(body)
}

#[inline]
pub(crate) fn not_found_response() -> HttpResponse {
    HttpResponse::NotFound()
        .insert_header(("Content-Type", "text/plain; charset=utf-8"))
        .body("Not Found")
}
