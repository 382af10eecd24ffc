//! 重定向服务
//!
//! 热路径：短码 → 查找 → 状态检查 → 原子计数 → 302。
//! 分析事件的持久化在响应之外异步派发，其成败不影响重定向。

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, Responder, web};
use serde::Deserialize;
use tracing::{debug, error, trace};

use crate::analytics::RequestMeta;
use crate::analytics::global::get_click_recorder;
use crate::storage::{LinkStatus, SeaOrmStorage};
use crate::utils::ip::extract_client_ip;
use crate::utils::is_valid_short_code;

use migration::entities::link;

/// 重定向查询参数
#[derive(Debug, Deserialize)]
pub struct RedirectQuery {
    /// qr=1 标记该点击来自扫描 QR 码
    pub qr: Option<String>,
}

pub struct RedirectService {}

impl RedirectService {
    pub async fn handle_redirect(
        req: HttpRequest,
        path: web::Path<String>,
        query: web::Query<RedirectQuery>,
        storage: web::Data<Arc<SeaOrmStorage>>,
    ) -> impl Responder {
        let code = path.into_inner();

        if !is_valid_short_code(&code) {
            // 非法短码，直接 404
            trace!("Invalid short code rejected: {}", &code);
            return Self::not_found_response();
        }

        let link = match storage.get_link_by_code(&code).await {
            Ok(Some(link)) => link,
            Ok(None) => {
                debug!("Redirect link not found in database: {}", &code);
                return Self::not_found_response();
            }
            Err(e) => {
                error!("Database error during redirect lookup: {}", e);
                return Self::error_response();
            }
        };

        if link.status == LinkStatus::Inactive.as_str() {
            // 停用链接：403，不计数、不记录事件
            debug!("Deactivated link rejected: {}", &code);
            return Self::deactivated_response();
        }

        // 原子递增点击计数（就地 UPDATE），在重定向响应前完成持久化
        if let Err(e) = storage.increment_click(&code).await {
            error!("Failed to increment click count for '{}': {}", &code, e);
            return Self::error_response();
        }

        // 分析事件异步派发（fire-and-forget），与计数解耦：
        // 事件写入失败或延迟不影响重定向，也不保证与计数同时可见
        let is_qr_scan = query.qr.as_deref() == Some("1");
        Self::dispatch_click_event(&req, &link, is_qr_scan);

        Self::finish_redirect(link)
    }

    /// 同步阶段只提取原始请求头，分类与写入都在后台任务执行
    fn dispatch_click_event(req: &HttpRequest, link: &link::Model, is_qr_scan: bool) {
        let Some(recorder) = get_click_recorder() else {
            return;
        };

        let meta = RequestMeta {
            user_agent: req
                .headers()
                .get("user-agent")
                .and_then(|h| h.to_str().ok())
                .map(String::from),
            referrer: req
                .headers()
                .get("referer")
                .or_else(|| req.headers().get("referrer"))
                .and_then(|h| h.to_str().ok())
                .map(String::from),
            client_ip: extract_client_ip(req),
        };

        recorder.dispatch(link.clone(), meta, is_qr_scan);
    }

    #[inline]
    fn not_found_response() -> HttpResponse {
        HttpResponse::build(StatusCode::NOT_FOUND)
            .insert_header(("Content-Type", "text/html; charset=utf-8"))
            .insert_header(("Cache-Control", "public, max-age=60"))
            .body("Not Found")
    }

    #[inline]
    fn deactivated_response() -> HttpResponse {
        HttpResponse::build(StatusCode::FORBIDDEN)
            .insert_header(("Content-Type", "text/html; charset=utf-8"))
            .body("This link has been deactivated")
    }

    #[inline]
    fn error_response() -> HttpResponse {
        HttpResponse::build(StatusCode::INTERNAL_SERVER_ERROR)
            .insert_header(("Content-Type", "text/html; charset=utf-8"))
            .body("Internal Server Error")
    }

    fn finish_redirect(link: link::Model) -> HttpResponse {
        HttpResponse::build(StatusCode::FOUND)
            .insert_header(("Location", link.target_url))
            .finish()
    }
}

/// Redirect 路由配置
pub fn redirect_routes() -> actix_web::Scope {
    web::scope("/r")
        .route("/{code}", web::get().to(RedirectService::handle_redirect))
        .route("/{code}", web::head().to(RedirectService::handle_redirect))
}
