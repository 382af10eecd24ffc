//! 链接表的数据库操作
//!
//! # Security Note
//!
//! 所有进入 SQL 构造的 short_code 都先经过 `utils::is_valid_short_code()`
//! 校验，作为参数化查询之外的纵深防御。

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ExprTrait, FromQueryResult, PaginatorTrait,
    QueryFilter, QuerySelect,
};
use tracing::{debug, warn};

use super::retry;
use crate::errors::{Result, ShrinklyError};
use crate::utils::is_valid_short_code;

use migration::entities::{analytics_event, link};

/// 链接总体统计
#[derive(Debug, Clone)]
pub struct LinkStats {
    pub total: u64,
    pub active: u64,
    pub inactive: u64,
    pub total_clicks: i64,
}

#[derive(Debug, FromQueryResult)]
struct SumRow {
    total: Option<i64>,
}

impl super::SeaOrmStorage {
    /// 按短码查找链接（重定向热路径）
    pub async fn get_link_by_code(&self, code: &str) -> Result<Option<link::Model>> {
        link::Entity::find()
            .filter(link::Column::ShortCode.eq(code))
            .one(&self.db)
            .await
            .map_err(Into::into)
    }

    /// 按 id 查找链接
    pub async fn get_link_by_id(&self, id: &str) -> Result<Option<link::Model>> {
        link::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(Into::into)
    }

    /// 批量按 id 查找链接（用于聚合结果的注解）
    pub async fn get_links_by_ids(&self, ids: &[String]) -> Result<Vec<link::Model>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        link::Entity::find()
            .filter(link::Column::Id.is_in(ids.iter().cloned()))
            .all(&self.db)
            .await
            .map_err(Into::into)
    }

    /// 检查短码是否已被占用
    pub async fn short_code_exists(&self, code: &str) -> Result<bool> {
        let count = link::Entity::find()
            .filter(link::Column::ShortCode.eq(code))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }

    /// 插入新链接
    pub async fn insert_link(&self, model: link::ActiveModel) -> Result<link::Model> {
        let db = &self.db;
        let inserted = retry::with_retry("insert_link", self.retry_config, || async {
            model.clone().insert(db).await
        })
        .await?;
        Ok(inserted)
    }

    /// 更新链接（只更新 ActiveModel 中 Set 的字段）
    pub async fn update_link(&self, model: link::ActiveModel) -> Result<link::Model> {
        let db = &self.db;
        let updated = retry::with_retry("update_link", self.retry_config, || async {
            link::Entity::update(model.clone()).exec(db).await
        })
        .await?;
        Ok(updated)
    }

    /// 原子地递增点击计数
    ///
    /// 必须使用存储层的就地 UPDATE（click_count = click_count + 1），
    /// 并发重定向同一短码时不丢失计数。禁止读-改-写。
    pub async fn increment_click(&self, code: &str) -> Result<()> {
        // 安全校验：确保 short_code 格式合法
        if !is_valid_short_code(code) {
            return Err(ShrinklyError::validation(format!(
                "Invalid short_code format detected: '{}' - refusing to execute SQL",
                code
            )));
        }

        // 原生 SQL 级别的原子增量更新
        let db = &self.db;
        let result = retry::with_retry("increment_click", self.retry_config, || async {
            link::Entity::update_many()
                .col_expr(
                    link::Column::ClickCount,
                    Expr::col(link::Column::ClickCount).add(1i64),
                )
                .filter(link::Column::ShortCode.eq(code))
                .exec(db)
                .await
        })
        .await
        .map_err(|e| {
            ShrinklyError::database_operation(format!(
                "Failed to increment click count (still failed after retries): {}",
                e
            ))
        })?;

        if result.rows_affected == 0 {
            // 链接在查找与计数之间被删除，计数丢弃
            warn!("increment_click: no row matched short code '{}'", code);
        }

        Ok(())
    }

    /// 删除链接，按级联策略决定是否同时删除其分析事件
    ///
    /// 返回链接是否存在。
    pub async fn delete_link(&self, id: &str, cascade_events: bool) -> Result<bool> {
        if cascade_events {
            let deleted = analytics_event::Entity::delete_many()
                .filter(analytics_event::Column::LinkId.eq(id))
                .exec(&self.db)
                .await?;
            debug!(
                "delete_link: cascade removed {} events for link {}",
                deleted.rows_affected, id
            );
        }

        let result = link::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }

    /// 批量删除链接，返回删除数量
    pub async fn delete_links(&self, ids: &[String], cascade_events: bool) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        if cascade_events {
            let deleted = analytics_event::Entity::delete_many()
                .filter(analytics_event::Column::LinkId.is_in(ids.iter().cloned()))
                .exec(&self.db)
                .await?;
            debug!(
                "delete_links: cascade removed {} events for {} links",
                deleted.rows_affected,
                ids.len()
            );
        }

        let result = link::Entity::delete_many()
            .filter(link::Column::Id.is_in(ids.iter().cloned()))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }

    /// 批量设置链接状态，返回更新数量
    pub async fn set_links_status(&self, ids: &[String], status: &str) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = link::Entity::update_many()
            .col_expr(link::Column::Status, Expr::value(status))
            .filter(link::Column::Id.is_in(ids.iter().cloned()))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }

    /// 列出某用户拥有的全部链接 id（owner 范围过滤）
    pub async fn list_link_ids_by_owner(&self, user_id: &str) -> Result<Vec<String>> {
        let rows: Vec<String> = link::Entity::find()
            .select_only()
            .column(link::Column::Id)
            .filter(link::Column::UserId.eq(user_id))
            .into_tuple()
            .all(&self.db)
            .await?;
        Ok(rows)
    }

    /// 链接总体统计（总数/活跃/停用/累计点击）
    pub async fn link_stats(&self) -> Result<LinkStats> {
        let total = link::Entity::find().count(&self.db).await?;
        let active = link::Entity::find()
            .filter(link::Column::Status.eq("active"))
            .count(&self.db)
            .await?;
        let inactive = link::Entity::find()
            .filter(link::Column::Status.eq("inactive"))
            .count(&self.db)
            .await?;

        let sum = link::Entity::find()
            .select_only()
            .column_as(link::Column::ClickCount.sum(), "total")
            .into_model::<SumRow>()
            .one(&self.db)
            .await?;

        Ok(LinkStats {
            total,
            active,
            inactive,
            total_clicks: sum.and_then(|row| row.total).unwrap_or(0),
        })
    }
}
