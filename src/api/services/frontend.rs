use actix_web::{HttpResponse, Responder, web};
use tracing::trace;

const HOME_PAGE: &str = r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="utf-8">
    <title>reflinker</title>
  </head>
  <body>
    <h1>Shorten a URL</h1>
    <form method="post" action="/shorten">
      <input type="url" name="url" placeholder="https://example.org" required>
      <button type="submit">Shorten</button>
    </form>
    <p>Visit <code>/&lt;code&gt;/admin</code> to see where the clicks came from.</p>
  </body>
</html>
"#;

pub struct FrontendService;

impl FrontendService {
    /// 首页：短链接生成表单
    pub async fn handle_index() -> impl Responder {
        trace!("Serving home page");
        HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(HOME_PAGE)
    }
}

pub fn frontend_routes() -> actix_web::Resource {
    web::resource("/")
        .route(web::get().to(FrontendService::handle_index))
        .route(web::head().to(FrontendService::handle_index))
}
