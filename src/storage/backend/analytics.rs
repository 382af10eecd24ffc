//! Analytics 相关的数据库查询
//!
//! 提供分析事件的统计查询方法，供 AnalyticsService 调用。
//! 所有方法都是纯读操作，不修改链接或事件状态。

use chrono::{DateTime, Utc};
use sea_orm::{
    ColumnTrait, DbBackend, EntityTrait, FromQueryResult, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Select,
    sea_query::Expr,
};

use crate::errors::Result;

use migration::entities::analytics_event;

// ============ 查询过滤条件 ============

/// 事件过滤条件（范围 + 时间窗口）
///
/// `link_id` 限定单链接；`link_ids` 为 owner 范围解析出的链接集合；
/// 两者都为空表示全部链接。
#[derive(Default, Clone, Debug)]
pub struct EventFilter {
    pub link_id: Option<String>,
    pub link_ids: Option<Vec<String>>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl EventFilter {
    fn apply(&self, mut select: Select<analytics_event::Entity>) -> Select<analytics_event::Entity> {
        if let Some(ref link_id) = self.link_id {
            select = select.filter(analytics_event::Column::LinkId.eq(link_id));
        }
        if let Some(ref link_ids) = self.link_ids {
            select = select.filter(analytics_event::Column::LinkId.is_in(link_ids.iter().cloned()));
        }
        if let Some(start) = self.start {
            select = select.filter(analytics_event::Column::ClickedAt.gte(start));
        }
        if let Some(end) = self.end {
            select = select.filter(analytics_event::Column::ClickedAt.lte(end));
        }
        select
    }
}

// ============ 查询结果类型 ============

/// 趋势查询结果行
#[derive(Debug, FromQueryResult)]
pub struct TrendRow {
    pub label: String,
    pub count: i64,
}

/// 分组统计结果行（device/browser/country/referrer_source 通用）
#[derive(Debug, FromQueryResult)]
pub struct BreakdownRow {
    pub name: Option<String>,
    pub count: i64,
}

/// 热力图查询结果行（day: 1-7, 1 = Sunday；hour: 0-23, UTC）
#[derive(Debug, FromQueryResult)]
pub struct HeatmapRow {
    pub day: i32,
    pub hour: i32,
    pub count: i64,
}

/// 热门链接查询结果行
#[derive(Debug, FromQueryResult)]
pub struct TopLinkRow {
    pub link_id: String,
    pub short_code: String,
    pub count: i64,
}

#[derive(Debug, FromQueryResult)]
struct CountRow {
    count: i64,
}

#[derive(Debug, FromQueryResult)]
struct BucketRow {
    bucket: i32,
    count: i64,
}

// ============ SeaOrmStorage Analytics 方法 ============

impl super::SeaOrmStorage {
    /// 按日期分组的表达式（UTC 日期字符串 YYYY-MM-DD）
    fn day_expr(&self) -> Expr {
        match self.db_backend() {
            DbBackend::Sqlite => Expr::cust("strftime('%Y-%m-%d', clicked_at)"),
            DbBackend::MySql => Expr::cust("DATE_FORMAT(clicked_at, '%Y-%m-%d')"),
            _ => Expr::cust("TO_CHAR(clicked_at, 'YYYY-MM-DD')"),
        }
    }

    /// 星期几表达式，统一为 1 = Sunday .. 7 = Saturday
    fn dow_expr(&self) -> Expr {
        match self.db_backend() {
            DbBackend::Sqlite => Expr::cust("CAST(strftime('%w', clicked_at) AS INTEGER) + 1"),
            DbBackend::MySql => Expr::cust("DAYOFWEEK(clicked_at)"),
            _ => Expr::cust("CAST(EXTRACT(DOW FROM clicked_at) AS INTEGER) + 1"),
        }
    }

    /// 小时表达式（0-23, UTC）
    fn hour_expr(&self) -> Expr {
        match self.db_backend() {
            DbBackend::Sqlite => Expr::cust("CAST(strftime('%H', clicked_at) AS INTEGER)"),
            DbBackend::MySql => Expr::cust("HOUR(clicked_at)"),
            _ => Expr::cust("CAST(EXTRACT(HOUR FROM clicked_at) AS INTEGER)"),
        }
    }

    /// 统计事件总数
    pub async fn count_events(&self, filter: &EventFilter) -> Result<u64> {
        filter
            .apply(analytics_event::Entity::find())
            .count(&self.db)
            .await
            .map_err(Into::into)
    }

    /// 统计不重复的访客 IP 数（unique-visitor 近似值）
    pub async fn count_unique_visitors(&self, filter: &EventFilter) -> Result<u64> {
        let row = filter
            .apply(analytics_event::Entity::find())
            .select_only()
            .column_as(Expr::cust("COUNT(DISTINCT ip_address)"), "count")
            .into_model::<CountRow>()
            .one(&self.db)
            .await?;
        Ok(row.map(|r| r.count as u64).unwrap_or(0))
    }

    /// 统计 QR 扫码事件数
    pub async fn count_qr_scans(&self, filter: &EventFilter) -> Result<u64> {
        filter
            .apply(analytics_event::Entity::find())
            .filter(analytics_event::Column::IsQrScan.eq(true))
            .count(&self.db)
            .await
            .map_err(Into::into)
    }

    /// 按指定维度分组统计
    ///
    /// 按计数降序排列；计数相同时按标签升序，保证结果确定。
    pub async fn get_breakdown(
        &self,
        filter: &EventFilter,
        column: analytics_event::Column,
        limit: Option<u64>,
    ) -> Result<Vec<BreakdownRow>> {
        let mut select = filter
            .apply(analytics_event::Entity::find())
            .select_only()
            .column_as(column, "name")
            .column_as(analytics_event::Column::Id.count(), "count")
            .group_by(column)
            .order_by_desc(Expr::cust("count"))
            .order_by_asc(column);

        if let Some(limit) = limit {
            select = select.limit(limit);
        }

        select
            .into_model::<BreakdownRow>()
            .all(&self.db)
            .await
            .map_err(Into::into)
    }

    /// 获取按天分组的点击趋势（升序，最多 30 个点）
    pub async fn get_daily_trend(&self, filter: &EventFilter) -> Result<Vec<TrendRow>> {
        let date_expr = self.day_expr();
        filter
            .apply(analytics_event::Entity::find())
            .select_only()
            .column_as(date_expr.clone(), "label")
            .column_as(analytics_event::Column::Id.count(), "count")
            .group_by(date_expr)
            .order_by_asc(Expr::cust("label"))
            .limit(30)
            .into_model::<TrendRow>()
            .all(&self.db)
            .await
            .map_err(Into::into)
    }

    /// 获取 (星期几, 小时) 热力图，只包含非零桶，按 (day, hour) 升序
    pub async fn get_heatmap(&self, filter: &EventFilter) -> Result<Vec<HeatmapRow>> {
        let dow_expr = self.dow_expr();
        let hour_expr = self.hour_expr();
        filter
            .apply(analytics_event::Entity::find())
            .select_only()
            .column_as(dow_expr.clone(), "day")
            .column_as(hour_expr.clone(), "hour")
            .column_as(analytics_event::Column::Id.count(), "count")
            .group_by(dow_expr)
            .group_by(hour_expr)
            .order_by_asc(Expr::cust("day"))
            .order_by_asc(Expr::cust("hour"))
            .into_model::<HeatmapRow>()
            .all(&self.db)
            .await
            .map_err(Into::into)
    }

    /// 获取事件数最多的链接
    ///
    /// 零事件的链接不会出现（按事件分组，而非扫描链接表）。
    pub async fn get_top_links(&self, filter: &EventFilter, limit: u64) -> Result<Vec<TopLinkRow>> {
        filter
            .apply(analytics_event::Entity::find())
            .select_only()
            .column(analytics_event::Column::LinkId)
            .column(analytics_event::Column::ShortCode)
            .column_as(analytics_event::Column::Id.count(), "count")
            .group_by(analytics_event::Column::LinkId)
            .group_by(analytics_event::Column::ShortCode)
            .order_by_desc(Expr::cust("count"))
            .limit(limit)
            .into_model::<TopLinkRow>()
            .all(&self.db)
            .await
            .map_err(Into::into)
    }

    /// 点击最多的星期几（1 = Sunday），无数据时返回 None
    pub async fn best_day_of_week(&self, filter: &EventFilter) -> Result<Option<(i32, i64)>> {
        let dow_expr = self.dow_expr();
        let row = filter
            .apply(analytics_event::Entity::find())
            .select_only()
            .column_as(dow_expr.clone(), "bucket")
            .column_as(analytics_event::Column::Id.count(), "count")
            .group_by(dow_expr)
            .order_by_desc(Expr::cust("count"))
            .limit(1)
            .into_model::<BucketRow>()
            .one(&self.db)
            .await?;
        Ok(row.map(|r| (r.bucket, r.count)))
    }

    /// 点击最多的小时（0-23, UTC），无数据时返回 None
    pub async fn best_hour(&self, filter: &EventFilter) -> Result<Option<(i32, i64)>> {
        let hour_expr = self.hour_expr();
        let row = filter
            .apply(analytics_event::Entity::find())
            .select_only()
            .column_as(hour_expr.clone(), "bucket")
            .column_as(analytics_event::Column::Id.count(), "count")
            .group_by(hour_expr)
            .order_by_desc(Expr::cust("count"))
            .limit(1)
            .into_model::<BucketRow>()
            .one(&self.db)
            .await?;
        Ok(row.map(|r| (r.bucket, r.count)))
    }

    /// 导出事件（按时间倒序，调用方限制上限）
    pub async fn export_events(
        &self,
        filter: &EventFilter,
        limit: u64,
    ) -> Result<Vec<analytics_event::Model>> {
        filter
            .apply(analytics_event::Entity::find())
            .order_by_desc(analytics_event::Column::ClickedAt)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(Into::into)
    }
}
