//! Link service layer
//!
//! 链接的创建、编辑与删除。重定向热路径不经过这里，
//! 删除走可配置的级联策略（见 `analytics.cascade_on_link_delete`）。

use std::sync::Arc;

use chrono::Utc;
use sea_orm::ActiveValue::{Set, Unchanged};
use tracing::{debug, info};
use url::Url;
use uuid::Uuid;

use crate::config::get_config;
use crate::errors::{Result, ShrinklyError};
use crate::storage::backend::LinkStats;
use crate::storage::{LinkStatus, SeaOrmStorage};
use crate::utils::{generate_random_code, is_valid_short_code};

use migration::entities::link;

/// 随机短码冲突时的最大重试次数
const MAX_CODE_ATTEMPTS: usize = 5;

/// 创建链接请求
#[derive(Debug, Clone, Default)]
pub struct CreateLinkRequest {
    pub target_url: String,
    pub custom_slug: Option<String>,
    pub domain: Option<String>,
    pub tags: Option<String>,
    pub user_id: Option<String>,
}

/// 更新链接请求（None 字段保持不变）
#[derive(Debug, Clone, Default)]
pub struct UpdateLinkRequest {
    pub target_url: Option<String>,
    pub status: Option<String>,
    pub tags: Option<String>,
}

/// Link 服务
pub struct LinkService {
    storage: Arc<SeaOrmStorage>,
}

impl LinkService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    /// 创建短链接
    ///
    /// 自定义 slug 冲突时报错；否则生成随机短码（冲突时重试）。
    pub async fn create_link(&self, req: CreateLinkRequest) -> Result<link::Model> {
        if req.target_url.is_empty() {
            return Err(ShrinklyError::validation("URL required"));
        }
        if Url::parse(&req.target_url).is_err() {
            return Err(ShrinklyError::validation("Invalid URL format"));
        }

        let config = get_config();

        let short_code = match req.custom_slug {
            Some(ref slug) => {
                if !is_valid_short_code(slug) {
                    return Err(ShrinklyError::validation(format!(
                        "Invalid custom slug: '{}'",
                        slug
                    )));
                }
                if self.storage.short_code_exists(slug).await? {
                    return Err(ShrinklyError::validation("Custom slug already in use"));
                }
                slug.clone()
            }
            None => self.generate_unique_code().await?,
        };

        let model = link::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            short_code: Set(short_code.clone()),
            target_url: Set(req.target_url),
            custom_slug: Set(req.custom_slug),
            domain: Set(req
                .domain
                .unwrap_or_else(|| config.features.default_domain.clone())),
            click_count: Set(0),
            status: Set(LinkStatus::Active.as_str().to_string()),
            tags: Set(req.tags.unwrap_or_default()),
            user_id: Set(req.user_id),
            created_at: Set(Utc::now()),
        };

        let created = self.storage.insert_link(model).await?;
        info!("Link created: {} -> {}", short_code, created.target_url);
        Ok(created)
    }

    /// 生成未被占用的随机短码
    async fn generate_unique_code(&self) -> Result<String> {
        let length = get_config().features.random_code_length;
        for _ in 0..MAX_CODE_ATTEMPTS {
            let code = generate_random_code(length);
            if !self.storage.short_code_exists(&code).await? {
                return Ok(code);
            }
            debug!("Random code collision, regenerating");
        }
        Err(ShrinklyError::database_operation(
            "Failed to generate a unique short code",
        ))
    }

    /// 获取链接
    pub async fn get_link(&self, id: &str) -> Result<link::Model> {
        self.storage
            .get_link_by_id(id)
            .await?
            .ok_or_else(|| ShrinklyError::not_found(format!("Link not found: {}", id)))
    }

    /// 更新链接（目标 URL / 状态 / 标签）
    pub async fn update_link(&self, id: &str, req: UpdateLinkRequest) -> Result<link::Model> {
        // 先确认存在
        self.get_link(id).await?;

        let mut model = link::ActiveModel {
            id: Unchanged(id.to_string()),
            ..Default::default()
        };

        if let Some(target_url) = req.target_url {
            if Url::parse(&target_url).is_err() {
                return Err(ShrinklyError::validation("Invalid URL format"));
            }
            model.target_url = Set(target_url);
        }
        if let Some(status) = req.status {
            let status: LinkStatus = status
                .parse()
                .map_err(|e: String| ShrinklyError::validation(e))?;
            model.status = Set(status.as_str().to_string());
        }
        if let Some(tags) = req.tags {
            model.tags = Set(tags);
        }

        self.storage.update_link(model).await
    }

    /// 删除链接，级联策略由配置决定
    pub async fn delete_link(&self, id: &str) -> Result<()> {
        let cascade = get_config().analytics.cascade_on_link_delete;
        let existed = self.storage.delete_link(id, cascade).await?;
        if !existed {
            return Err(ShrinklyError::not_found(format!("Link not found: {}", id)));
        }
        info!("Link deleted: {} (cascade_events: {})", id, cascade);
        Ok(())
    }

    /// 批量删除链接，返回删除数量
    pub async fn bulk_delete(&self, ids: &[String]) -> Result<u64> {
        if ids.is_empty() {
            return Err(ShrinklyError::validation("No link IDs provided"));
        }
        let cascade = get_config().analytics.cascade_on_link_delete;
        let deleted = self.storage.delete_links(ids, cascade).await?;
        info!("Bulk delete: {} link(s) removed", deleted);
        Ok(deleted)
    }

    /// 批量设置状态，返回更新数量
    pub async fn bulk_update_status(&self, ids: &[String], status: &str) -> Result<u64> {
        if ids.is_empty() {
            return Err(ShrinklyError::validation("No link IDs provided"));
        }
        let status: LinkStatus = status
            .parse()
            .map_err(|e: String| ShrinklyError::validation(e))?;
        self.storage.set_links_status(ids, status.as_str()).await
    }

    /// 链接总体统计
    pub async fn stats(&self) -> Result<LinkStats> {
        self.storage.link_stats().await
    }
}
