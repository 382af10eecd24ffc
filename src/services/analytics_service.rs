//! Analytics service layer
//!
//! Provides unified business logic for analytics queries, shared between
//! the HTTP API and integration tests.
//!
//! 所有查询都是纯读操作：按范围（单链接 / 全部 / 某用户的全部链接）
//! 与日期窗口过滤后实时聚合，不修改任何链接或事件状态。

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::errors::{Result, ShrinklyError};
use crate::storage::SeaOrmStorage;
use crate::storage::backend::EventFilter;

use migration::entities::analytics_event;

/// 热门链接返回条数
const TOP_LINKS_LIMIT: u64 = 5;
/// 分组统计返回条数（browser / country / referrer）
const BREAKDOWN_LIMIT: u64 = 10;
/// 导出上限：一次快照，不是流式接口
const EXPORT_LIMIT: u64 = 10_000;

/// 无数据时 insights 的占位值
const NOT_ENOUGH_DATA: &str = "Not enough data";

const DAY_ABBREVS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
const DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

// ============ 公共类型定义 ============

/// 查询范围
#[derive(Debug, Clone, Default)]
pub enum AnalyticsScope {
    /// 全部链接
    #[default]
    All,
    /// 单个链接
    Link(String),
    /// 某用户拥有的全部链接
    Owner(String),
}

/// 分组统计条目
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakdownEntry {
    pub name: String,
    pub clicks: u64,
}

/// 单日趋势点
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub date: String,
    pub clicks: u64,
}

/// 汇总统计
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub total_clicks: u64,
    pub unique_visitors: u64,
    pub qr_scans: u64,
    pub devices: Vec<BreakdownEntry>,
    pub browsers: Vec<BreakdownEntry>,
    pub countries: Vec<BreakdownEntry>,
    pub referrers: Vec<BreakdownEntry>,
    pub click_trends: Vec<TrendPoint>,
}

/// 热门链接条目
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopLinkEntry {
    pub link_id: String,
    pub clicks: u64,
    /// domain/short_code；链接已删除时为 "Unknown"
    pub short_url: String,
    pub original_url: String,
}

/// 全局汇总（含热门链接）
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallAnalytics {
    #[serde(flatten)]
    pub summary: AnalyticsSummary,
    pub top_links: Vec<TopLinkEntry>,
}

/// 热力图单元格
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapCell {
    /// 三字母星期标签（Sun..Sat）
    pub day: String,
    pub hour: i32,
    pub clicks: u64,
}

/// 简单洞察：各维度独立取最高计数的桶
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Insights {
    pub best_day: String,
    pub best_platform: String,
    pub best_hour: String,
    pub top_link: String,
}

/// 导出行
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRow {
    pub short_url: String,
    pub original_url: String,
    pub device: String,
    pub browser: String,
    pub os: String,
    pub country: String,
    pub referrer: String,
    pub is_qr_scan: bool,
    pub clicked_at: String,
}

// ============ AnalyticsService ============

/// Analytics 服务
pub struct AnalyticsService {
    storage: Arc<SeaOrmStorage>,
}

impl AnalyticsService {
    /// 创建 AnalyticsService 实例
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    /// 解析日期范围（YYYY-MM-DD，两端都可省略）
    ///
    /// start 取当日 00:00:00，end 取当日 23:59:59.999（含当天整天）。
    /// 格式非法时返回错误，不静默回退。
    pub fn parse_date_range(
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Result<(Option<DateTime<Utc>>, Option<DateTime<Utc>>)> {
        let start = match start_date {
            Some(s) => Some(
                Self::parse_day(s)
                    .ok_or_else(|| {
                        ShrinklyError::date_parse(format!(
                            "Invalid start date format: '{}'. Expected YYYY-MM-DD",
                            s
                        ))
                    })?
                    .and_hms_opt(0, 0, 0)
                    .map(|dt| dt.and_utc())
                    .unwrap(),
            ),
            None => None,
        };

        let end = match end_date {
            Some(s) => Some(
                Self::parse_day(s)
                    .ok_or_else(|| {
                        ShrinklyError::date_parse(format!(
                            "Invalid end date format: '{}'. Expected YYYY-MM-DD",
                            s
                        ))
                    })?
                    .and_hms_milli_opt(23, 59, 59, 999)
                    .map(|dt| dt.and_utc())
                    .unwrap(),
            ),
            None => None,
        };

        if let (Some(start), Some(end)) = (start, end)
            && start > end
        {
            return Err(ShrinklyError::date_parse(
                "Start date must not be later than end date",
            ));
        }

        Ok((start, end))
    }

    fn parse_day(s: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
    }

    /// 把查询范围解析为事件过滤条件
    async fn resolve_filter(
        &self,
        scope: &AnalyticsScope,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<EventFilter> {
        let mut filter = EventFilter {
            start,
            end,
            ..Default::default()
        };

        match scope {
            AnalyticsScope::All => {}
            AnalyticsScope::Link(link_id) => {
                filter.link_id = Some(link_id.clone());
            }
            AnalyticsScope::Owner(user_id) => {
                // 事件表不存 user_id，先解析出该用户的链接集合
                let link_ids = self.storage.list_link_ids_by_owner(user_id).await?;
                filter.link_ids = Some(link_ids);
            }
        }

        Ok(filter)
    }

    /// 汇总统计：总量、独立访客、QR 扫码数、各维度分组、日趋势
    pub async fn get_summary(
        &self,
        scope: &AnalyticsScope,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<AnalyticsSummary> {
        info!("Analytics: get_summary scope={:?}", scope);

        let filter = self.resolve_filter(scope, start, end).await?;

        // 并发执行全部聚合查询，减少响应时间
        let (total_clicks, unique_visitors, qr_scans, devices, browsers, countries, referrers, trend) =
            tokio::try_join!(
                self.storage.count_events(&filter),
                self.storage.count_unique_visitors(&filter),
                self.storage.count_qr_scans(&filter),
                self.storage
                    .get_breakdown(&filter, analytics_event::Column::Device, None),
                self.storage.get_breakdown(
                    &filter,
                    analytics_event::Column::Browser,
                    Some(BREAKDOWN_LIMIT)
                ),
                self.storage.get_breakdown(
                    &filter,
                    analytics_event::Column::Country,
                    Some(BREAKDOWN_LIMIT)
                ),
                self.storage.get_breakdown(
                    &filter,
                    analytics_event::Column::ReferrerSource,
                    Some(BREAKDOWN_LIMIT)
                ),
                self.storage.get_daily_trend(&filter),
            )
            .map_err(|e| {
                ShrinklyError::analytics_query_failed(format!("Summary query failed: {}", e))
            })?;

        let to_entries = |rows: Vec<crate::storage::backend::BreakdownRow>| -> Vec<BreakdownEntry> {
            rows.into_iter()
                .map(|row| BreakdownEntry {
                    name: row.name.unwrap_or_else(|| "unknown".to_string()),
                    clicks: row.count as u64,
                })
                .collect()
        };

        let click_trends: Vec<TrendPoint> = trend
            .into_iter()
            .map(|row| TrendPoint {
                date: row.label,
                clicks: row.count as u64,
            })
            .collect();

        debug!(
            "Analytics: get_summary returned {} clicks, {} trend points",
            total_clicks,
            click_trends.len()
        );

        Ok(AnalyticsSummary {
            total_clicks,
            unique_visitors,
            qr_scans,
            devices: to_entries(devices),
            browsers: to_entries(browsers),
            countries: to_entries(countries),
            referrers: to_entries(referrers),
            click_trends,
        })
    }

    /// 单链接汇总统计（链接不存在时报错）
    pub async fn get_link_analytics(
        &self,
        link_id: &str,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<AnalyticsSummary> {
        if self.storage.get_link_by_id(link_id).await?.is_none() {
            return Err(ShrinklyError::not_found(format!(
                "Link not found: {}",
                link_id
            )));
        }

        self.get_summary(&AnalyticsScope::Link(link_id.to_string()), start, end)
            .await
    }

    /// 全局汇总统计（含热门链接）
    pub async fn get_overall_analytics(
        &self,
        scope: &AnalyticsScope,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<OverallAnalytics> {
        let summary = self.get_summary(scope, start, end).await?;

        let filter = self.resolve_filter(scope, start, end).await?;
        let top_rows = self
            .storage
            .get_top_links(&filter, TOP_LINKS_LIMIT)
            .await
            .map_err(|e| {
                ShrinklyError::analytics_query_failed(format!("Top links query failed: {}", e))
            })?;

        // 批量取链接详情；已删除的链接用 "Unknown" 占位而不是剔除
        let ids: Vec<String> = top_rows.iter().map(|row| row.link_id.clone()).collect();
        let links = self.storage.get_links_by_ids(&ids).await?;

        let top_links = top_rows
            .into_iter()
            .map(|row| {
                let link = links.iter().find(|l| l.id == row.link_id);
                TopLinkEntry {
                    link_id: row.link_id,
                    clicks: row.count as u64,
                    short_url: link
                        .map(|l| format!("{}/{}", l.domain, l.short_code))
                        .unwrap_or_else(|| "Unknown".to_string()),
                    original_url: link
                        .map(|l| l.target_url.clone())
                        .unwrap_or_else(|| "Unknown".to_string()),
                }
            })
            .collect();

        Ok(OverallAnalytics { summary, top_links })
    }

    /// (星期几 × 小时) 热力图
    pub async fn get_heatmap(
        &self,
        scope: &AnalyticsScope,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Vec<HeatmapCell>> {
        info!("Analytics: get_heatmap scope={:?}", scope);

        let filter = self.resolve_filter(scope, start, end).await?;
        let rows = self.storage.get_heatmap(&filter).await.map_err(|e| {
            ShrinklyError::analytics_query_failed(format!("Heatmap query failed: {}", e))
        })?;

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let label = DAY_ABBREVS.get((row.day - 1) as usize)?;
                Some(HeatmapCell {
                    day: label.to_string(),
                    hour: row.hour,
                    clicks: row.count as u64,
                })
            })
            .collect())
    }

    /// 简单洞察：最佳日 / 最佳平台 / 最佳小时 / 热门链接
    ///
    /// 每项独立取最高计数的桶；事件集为空时各项均为 "Not enough data"。
    pub async fn get_insights(&self, scope: &AnalyticsScope) -> Result<Insights> {
        info!("Analytics: get_insights scope={:?}", scope);

        let filter = self.resolve_filter(scope, None, None).await?;

        let (best_day, best_platform, best_hour, top_rows) = tokio::try_join!(
            self.storage.best_day_of_week(&filter),
            self.storage.get_breakdown(
                &filter,
                analytics_event::Column::ReferrerSource,
                Some(1)
            ),
            self.storage.best_hour(&filter),
            self.storage.get_top_links(&filter, 1),
        )
        .map_err(|e| {
            ShrinklyError::analytics_query_failed(format!("Insights query failed: {}", e))
        })?;

        let best_day = best_day
            .and_then(|(day, _)| DAY_NAMES.get((day - 1) as usize))
            .map(|name| name.to_string())
            .unwrap_or_else(|| NOT_ENOUGH_DATA.to_string());

        let best_platform = best_platform
            .into_iter()
            .next()
            .and_then(|row| row.name)
            .unwrap_or_else(|| NOT_ENOUGH_DATA.to_string());

        let best_hour = best_hour
            .map(|(hour, _)| format!("{}:00", hour))
            .unwrap_or_else(|| NOT_ENOUGH_DATA.to_string());

        let top_link = match top_rows.into_iter().next() {
            Some(row) => match self.storage.get_link_by_id(&row.link_id).await? {
                Some(link) => format!("{}/{}", link.domain, link.short_code),
                None => NOT_ENOUGH_DATA.to_string(),
            },
            None => NOT_ENOUGH_DATA.to_string(),
        };

        Ok(Insights {
            best_day,
            best_platform,
            best_hour,
            top_link,
        })
    }

    /// 导出事件快照（最多 10,000 条，按时间倒序）
    ///
    /// 这是有界快照而非流式接口；需要更多数据时用更窄的过滤条件重查。
    pub async fn export(
        &self,
        scope: &AnalyticsScope,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Vec<ExportRow>> {
        info!("Analytics: export scope={:?}", scope);

        let filter = self.resolve_filter(scope, start, end).await?;
        let events = self
            .storage
            .export_events(&filter, EXPORT_LIMIT)
            .await
            .map_err(|e| {
                ShrinklyError::analytics_query_failed(format!("Export query failed: {}", e))
            })?;

        // 批量取链接详情用于注解
        let mut ids: Vec<String> = events.iter().map(|e| e.link_id.clone()).collect();
        ids.sort();
        ids.dedup();
        let links = self.storage.get_links_by_ids(&ids).await?;

        let rows = events
            .into_iter()
            .map(|event| {
                let link = links.iter().find(|l| l.id == event.link_id);
                ExportRow {
                    short_url: link
                        .map(|l| format!("{}/{}", l.domain, l.short_code))
                        .unwrap_or_else(|| "Unknown".to_string()),
                    original_url: link
                        .map(|l| l.target_url.clone())
                        .unwrap_or_else(|| "Unknown".to_string()),
                    device: event.device,
                    browser: event.browser,
                    os: event.os,
                    country: event.country,
                    referrer: event.referrer_source,
                    is_qr_scan: event.is_qr_scan,
                    clicked_at: event
                        .clicked_at
                        .to_rfc3339_opts(SecondsFormat::Millis, true),
                }
            })
            .collect::<Vec<_>>();

        debug!("Analytics: export returned {} records", rows.len());

        Ok(rows)
    }
}
