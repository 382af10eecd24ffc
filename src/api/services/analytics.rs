//! Analytics API 端点
//!
//! Dashboard 的统计查询接口：
//! - 全局汇总（含热门链接）
//! - 单链接汇总
//! - (星期几 × 小时) 热力图
//! - 简单洞察
//! - 导出报告
//!
//! 所有端点要求有效的 Bearer access token。

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, web};
use serde::Deserialize;

use crate::api::services::{ErrorCode, api_result, error_response, verify_jwt};
use crate::services::{AnalyticsScope, AnalyticsService};
use crate::storage::SeaOrmStorage;

// ============ 请求参数 ============

/// Analytics 查询参数
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsQuery {
    /// 限定单个链接
    pub link_id: Option<String>,
    /// 限定某用户拥有的链接（linkId 优先）
    pub user_id: Option<String>,
    /// 开始日期 (YYYY-MM-DD)
    pub start_date: Option<String>,
    /// 结束日期 (YYYY-MM-DD，含当天整天)
    pub end_date: Option<String>,
}

impl AnalyticsQuery {
    fn scope(&self) -> AnalyticsScope {
        if let Some(ref link_id) = self.link_id {
            AnalyticsScope::Link(link_id.clone())
        } else if let Some(ref user_id) = self.user_id {
            AnalyticsScope::Owner(user_id.clone())
        } else {
            AnalyticsScope::All
        }
    }
}

fn unauthorized() -> HttpResponse {
    error_response(
        StatusCode::UNAUTHORIZED,
        ErrorCode::Unauthorized,
        "Unauthorized",
    )
}

// ============ API 端点 ============

/// GET /api/analytics - 全局汇总（含热门链接）
pub async fn get_overall_analytics(
    req: HttpRequest,
    query: web::Query<AnalyticsQuery>,
    storage: web::Data<Arc<SeaOrmStorage>>,
) -> HttpResponse {
    if verify_jwt(&req).is_none() {
        return unauthorized();
    }

    let service = AnalyticsService::new(storage.get_ref().clone());
    let result = async {
        let (start, end) =
            AnalyticsService::parse_date_range(query.start_date.as_deref(), query.end_date.as_deref())?;
        service
            .get_overall_analytics(&query.scope(), start, end)
            .await
    }
    .await;

    api_result(result)
}

/// GET /api/analytics/link/{id} - 单链接汇总
pub async fn get_link_analytics(
    req: HttpRequest,
    path: web::Path<String>,
    query: web::Query<AnalyticsQuery>,
    storage: web::Data<Arc<SeaOrmStorage>>,
) -> HttpResponse {
    if verify_jwt(&req).is_none() {
        return unauthorized();
    }

    let link_id = path.into_inner();
    let service = AnalyticsService::new(storage.get_ref().clone());
    let result = async {
        let (start, end) =
            AnalyticsService::parse_date_range(query.start_date.as_deref(), query.end_date.as_deref())?;
        service.get_link_analytics(&link_id, start, end).await
    }
    .await;

    api_result(result)
}

/// GET /api/analytics/heatmap - (星期几 × 小时) 热力图
pub async fn get_heatmap(
    req: HttpRequest,
    query: web::Query<AnalyticsQuery>,
    storage: web::Data<Arc<SeaOrmStorage>>,
) -> HttpResponse {
    if verify_jwt(&req).is_none() {
        return unauthorized();
    }

    let service = AnalyticsService::new(storage.get_ref().clone());
    let result = async {
        let (start, end) =
            AnalyticsService::parse_date_range(query.start_date.as_deref(), query.end_date.as_deref())?;
        service.get_heatmap(&query.scope(), start, end).await
    }
    .await;

    api_result(result)
}

/// GET /api/analytics/insights - 简单洞察
pub async fn get_insights(
    req: HttpRequest,
    query: web::Query<AnalyticsQuery>,
    storage: web::Data<Arc<SeaOrmStorage>>,
) -> HttpResponse {
    if verify_jwt(&req).is_none() {
        return unauthorized();
    }

    let service = AnalyticsService::new(storage.get_ref().clone());
    api_result(service.get_insights(&query.scope()).await)
}

/// GET /api/analytics/export - 导出事件快照（最多 10,000 条）
pub async fn export_analytics(
    req: HttpRequest,
    query: web::Query<AnalyticsQuery>,
    storage: web::Data<Arc<SeaOrmStorage>>,
) -> HttpResponse {
    if verify_jwt(&req).is_none() {
        return unauthorized();
    }

    let service = AnalyticsService::new(storage.get_ref().clone());
    let result = async {
        let (start, end) =
            AnalyticsService::parse_date_range(query.start_date.as_deref(), query.end_date.as_deref())?;
        service.export(&query.scope(), start, end).await
    }
    .await;

    api_result(result)
}

/// Analytics 路由配置
pub fn analytics_routes() -> actix_web::Scope {
    web::scope("/analytics")
        .route("", web::get().to(get_overall_analytics))
        .route("/heatmap", web::get().to(get_heatmap))
        .route("/insights", web::get().to(get_insights))
        .route("/export", web::get().to(export_analytics))
        .route("/link/{id}", web::get().to(get_link_analytics))
}
