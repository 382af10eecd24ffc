//! Link 管理 API 端点
//!
//! 链接 CRUD 与批量操作。匿名创建是允许的（链接可以无主），
//! 这些端点不做令牌校验。

use std::sync::Arc;

use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};

use crate::api::services::{api_result, success_response};
use crate::services::{CreateLinkRequest, LinkService, UpdateLinkRequest};
use crate::storage::SeaOrmStorage;

use migration::entities::link;

// ============ 请求/响应结构 ============

/// 创建链接请求体
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLinkBody {
    pub original_url: String,
    pub custom_slug: Option<String>,
    pub domain: Option<String>,
    pub tags: Option<String>,
    pub user_id: Option<String>,
}

/// 更新链接请求体
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLinkBody {
    pub original_url: Option<String>,
    pub status: Option<String>,
    pub tags: Option<String>,
}

/// 批量删除请求体
#[derive(Debug, Deserialize)]
pub struct BulkDeleteBody {
    pub ids: Vec<String>,
}

/// 批量更新状态请求体
#[derive(Debug, Deserialize)]
pub struct BulkStatusBody {
    pub ids: Vec<String>,
    pub status: String,
}

/// 链接响应
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkDto {
    pub id: String,
    pub original: String,
    pub short: String,
    pub short_code: String,
    pub clicks: i64,
    pub date: String,
    pub status: String,
    pub tags: String,
}

impl From<link::Model> for LinkDto {
    fn from(model: link::Model) -> Self {
        Self {
            short: format!("{}/{}", model.domain, model.short_code),
            date: model.created_at.date_naive().to_string(),
            id: model.id,
            original: model.target_url,
            short_code: model.short_code,
            clicks: model.click_count,
            status: model.status,
            tags: model.tags,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkResult {
    pub affected: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkStatsDto {
    pub total_links: u64,
    pub active_links: u64,
    pub inactive_links: u64,
    pub total_clicks: i64,
}

// ============ API 端点 ============

/// POST /api/links - 创建短链接
pub async fn post_link(
    body: web::Json<CreateLinkBody>,
    storage: web::Data<Arc<SeaOrmStorage>>,
) -> HttpResponse {
    let body = body.into_inner();
    let service = LinkService::new(storage.get_ref().clone());
    let result = service
        .create_link(CreateLinkRequest {
            target_url: body.original_url,
            custom_slug: body.custom_slug,
            domain: body.domain,
            tags: body.tags,
            user_id: body.user_id,
        })
        .await
        .map(LinkDto::from);
    api_result(result)
}

/// GET /api/links/{id} - 获取链接
pub async fn get_link(
    path: web::Path<String>,
    storage: web::Data<Arc<SeaOrmStorage>>,
) -> HttpResponse {
    let service = LinkService::new(storage.get_ref().clone());
    api_result(service.get_link(&path.into_inner()).await.map(LinkDto::from))
}

/// PUT /api/links/{id} - 更新链接
pub async fn update_link(
    path: web::Path<String>,
    body: web::Json<UpdateLinkBody>,
    storage: web::Data<Arc<SeaOrmStorage>>,
) -> HttpResponse {
    let body = body.into_inner();
    let service = LinkService::new(storage.get_ref().clone());
    let result = service
        .update_link(
            &path.into_inner(),
            UpdateLinkRequest {
                target_url: body.original_url,
                status: body.status,
                tags: body.tags,
            },
        )
        .await
        .map(LinkDto::from);
    api_result(result)
}

/// DELETE /api/links/{id} - 删除链接（级联策略见配置）
pub async fn delete_link(
    path: web::Path<String>,
    storage: web::Data<Arc<SeaOrmStorage>>,
) -> HttpResponse {
    let service = LinkService::new(storage.get_ref().clone());
    match service.delete_link(&path.into_inner()).await {
        Ok(()) => success_response("Link deleted successfully"),
        Err(e) => api_result::<(), _>(Err(e)),
    }
}

/// POST /api/links/bulk-delete - 批量删除链接
pub async fn bulk_delete_links(
    body: web::Json<BulkDeleteBody>,
    storage: web::Data<Arc<SeaOrmStorage>>,
) -> HttpResponse {
    let service = LinkService::new(storage.get_ref().clone());
    api_result(
        service
            .bulk_delete(&body.ids)
            .await
            .map(|affected| BulkResult { affected }),
    )
}

/// POST /api/links/bulk-status - 批量更新状态
pub async fn bulk_update_status(
    body: web::Json<BulkStatusBody>,
    storage: web::Data<Arc<SeaOrmStorage>>,
) -> HttpResponse {
    let service = LinkService::new(storage.get_ref().clone());
    api_result(
        service
            .bulk_update_status(&body.ids, &body.status)
            .await
            .map(|affected| BulkResult { affected }),
    )
}

/// GET /api/links/stats - 链接总体统计
pub async fn get_stats(storage: web::Data<Arc<SeaOrmStorage>>) -> HttpResponse {
    let service = LinkService::new(storage.get_ref().clone());
    api_result(service.stats().await.map(|stats| LinkStatsDto {
        total_links: stats.total,
        active_links: stats.active,
        inactive_links: stats.inactive,
        total_clicks: stats.total_clicks,
    }))
}

/// Link 管理路由配置
pub fn links_routes() -> actix_web::Scope {
    web::scope("/links")
        .route("", web::post().to(post_link))
        // 静态段路由必须在 /{id} 之前
        .route("/stats", web::get().to(get_stats))
        .route("/bulk-delete", web::post().to(bulk_delete_links))
        .route("/bulk-status", web::post().to(bulk_update_status))
        .route("/{id}", web::get().to(get_link))
        .route("/{id}", web::put().to(update_link))
        .route("/{id}", web::delete().to(delete_link))
}
