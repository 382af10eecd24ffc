//! AnalyticsService 集成测试
//!
//! 覆盖 parse_date_range、get_summary、get_overall_analytics、
//! get_heatmap、get_insights、export，以及范围过滤与日期边界。

use std::sync::{Arc, Once};

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use sea_orm::ActiveValue::Set;
use tempfile::TempDir;
use uuid::Uuid;

use shrinkly::analytics::{ClickEvent, EventSink};
use shrinkly::config::init_config;
use shrinkly::services::{AnalyticsScope, AnalyticsService};
use shrinkly::storage::SeaOrmStorage;

use migration::entities::link;

// =============================================================================
// 全局初始化
// =============================================================================

static INIT: Once = Once::new();

fn init_static_config() {
    INIT.call_once(|| {
        init_config();
    });
}

async fn create_temp_storage() -> (Arc<SeaOrmStorage>, TempDir) {
    init_static_config();
    let td = TempDir::new().unwrap();
    let p = td.path().join("analytics_svc_test.db");
    let u = format!("sqlite://{}?mode=rwc", p.display());
    let s = SeaOrmStorage::new(&u).await.unwrap();
    (Arc::new(s), td)
}

async fn insert_link(
    storage: &Arc<SeaOrmStorage>,
    code: &str,
    target: &str,
    user_id: Option<&str>,
) -> link::Model {
    let model = link::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        short_code: Set(code.to_string()),
        target_url: Set(target.to_string()),
        custom_slug: Set(None),
        domain: Set("shrinkly.link".to_string()),
        click_count: Set(0),
        status: Set("active".to_string()),
        tags: Set(String::new()),
        user_id: Set(user_id.map(String::from)),
        created_at: Set(Utc::now()),
    };
    storage.insert_link(model).await.unwrap()
}

/// 构造事件；调用方可覆盖字段
fn make_event(link: &link::Model, clicked_at: DateTime<Utc>) -> ClickEvent {
    ClickEvent {
        link_id: link.id.clone(),
        short_code: link.short_code.clone(),
        ip_address: Some("203.0.113.1".to_string()),
        user_agent: None,
        device: "mobile".to_string(),
        browser: "Safari".to_string(),
        os: "iPhone".to_string(),
        country: "Unknown".to_string(),
        city: "Unknown".to_string(),
        referrer: None,
        referrer_source: "direct".to_string(),
        is_qr_scan: false,
        clicked_at,
    }
}

async fn append(storage: &Arc<SeaOrmStorage>, event: ClickEvent) {
    storage.append_event(event).await.unwrap();
}

// =============================================================================
// parse_date_range 测试
// =============================================================================

mod parse_date_range_tests {
    use super::*;

    #[test]
    fn test_both_none() {
        let (start, end) = AnalyticsService::parse_date_range(None, None).unwrap();
        assert!(start.is_none());
        assert!(end.is_none());
    }

    #[test]
    fn test_valid_range() {
        let (start, end) =
            AnalyticsService::parse_date_range(Some("2024-01-01"), Some("2024-01-31")).unwrap();
        assert_eq!(start.unwrap().to_rfc3339(), "2024-01-01T00:00:00+00:00");
        // end 取当天最后一毫秒
        assert_eq!(
            end.unwrap().to_rfc3339(),
            "2024-01-31T23:59:59.999+00:00"
        );
    }

    #[test]
    fn test_invalid_format_is_error() {
        assert!(AnalyticsService::parse_date_range(Some("not-a-date"), None).is_err());
        assert!(AnalyticsService::parse_date_range(None, Some("2024/01/01")).is_err());
    }

    #[test]
    fn test_start_after_end_is_error() {
        assert!(
            AnalyticsService::parse_date_range(Some("2024-02-01"), Some("2024-01-01")).is_err()
        );
    }
}

// =============================================================================
// 汇总统计测试
// =============================================================================

#[tokio::test]
async fn test_summary_counts_and_breakdowns() {
    let (storage, _td) = create_temp_storage().await;
    let service = AnalyticsService::new(Arc::clone(&storage));
    let link = insert_link(&storage, "sum1", "https://example.com", None).await;

    let now = Utc::now();

    // 3 个事件：2 mobile + 1 desktop，2 个不同 IP，1 次 QR 扫码
    let mut e1 = make_event(&link, now);
    e1.is_qr_scan = true;
    append(&storage, e1).await;

    let mut e2 = make_event(&link, now);
    e2.ip_address = Some("203.0.113.2".to_string());
    append(&storage, e2).await;

    let mut e3 = make_event(&link, now);
    e3.device = "desktop".to_string();
    e3.browser = "Chrome".to_string();
    e3.referrer_source = "Google".to_string();
    append(&storage, e3).await;

    let summary = service
        .get_summary(&AnalyticsScope::Link(link.id.clone()), None, None)
        .await
        .unwrap();

    assert_eq!(summary.total_clicks, 3);
    assert_eq!(summary.unique_visitors, 2);
    assert_eq!(summary.qr_scans, 1);

    // device 分组按计数降序
    assert_eq!(summary.devices[0].name, "mobile");
    assert_eq!(summary.devices[0].clicks, 2);
    assert_eq!(summary.devices[1].name, "desktop");
    assert_eq!(summary.devices[1].clicks, 1);

    // referrer 分组包含 direct 与 Google
    let referrer_names: Vec<&str> = summary.referrers.iter().map(|r| r.name.as_str()).collect();
    assert!(referrer_names.contains(&"direct"));
    assert!(referrer_names.contains(&"Google"));
}

#[tokio::test]
async fn test_summary_tie_break_is_deterministic() {
    let (storage, _td) = create_temp_storage().await;
    let service = AnalyticsService::new(Arc::clone(&storage));
    let link = insert_link(&storage, "tie1", "https://example.com", None).await;

    // Chrome 与 Firefox 计数相同，应按标签升序排在一起
    let mut e1 = make_event(&link, Utc::now());
    e1.browser = "Firefox".to_string();
    append(&storage, e1).await;

    let mut e2 = make_event(&link, Utc::now());
    e2.browser = "Chrome".to_string();
    append(&storage, e2).await;

    let summary = service
        .get_summary(&AnalyticsScope::Link(link.id.clone()), None, None)
        .await
        .unwrap();

    assert_eq!(summary.browsers[0].name, "Chrome");
    assert_eq!(summary.browsers[1].name, "Firefox");
}

#[tokio::test]
async fn test_summary_is_idempotent() {
    let (storage, _td) = create_temp_storage().await;
    let service = AnalyticsService::new(Arc::clone(&storage));
    let link = insert_link(&storage, "idem1", "https://example.com", None).await;

    for _ in 0..5 {
        append(&storage, make_event(&link, Utc::now())).await;
    }

    // 无写入间隔的两次查询必须返回完全相同的结果
    let first = service
        .get_summary(&AnalyticsScope::All, None, None)
        .await
        .unwrap();
    let second = service
        .get_summary(&AnalyticsScope::All, None, None)
        .await
        .unwrap();
    assert_eq!(first, second);
}

// =============================================================================
// 日期过滤边界测试
// =============================================================================

#[tokio::test]
async fn test_end_date_is_inclusive_through_end_of_day() {
    let (storage, _td) = create_temp_storage().await;
    let service = AnalyticsService::new(Arc::clone(&storage));
    let link = insert_link(&storage, "edge1", "https://example.com", None).await;

    // 2024-01-05 当天最后一毫秒的事件
    let ts = NaiveDate::from_ymd_opt(2024, 1, 5)
        .unwrap()
        .and_hms_milli_opt(23, 59, 59, 999)
        .unwrap()
        .and_utc();
    append(&storage, make_event(&link, ts)).await;

    // endDate=2024-01-05 → 包含
    let (start, end) =
        AnalyticsService::parse_date_range(Some("2024-01-01"), Some("2024-01-05")).unwrap();
    let summary = service
        .get_summary(&AnalyticsScope::Link(link.id.clone()), start, end)
        .await
        .unwrap();
    assert_eq!(summary.total_clicks, 1);

    // endDate=2024-01-04 → 不包含
    let (start, end) =
        AnalyticsService::parse_date_range(Some("2024-01-01"), Some("2024-01-04")).unwrap();
    let summary = service
        .get_summary(&AnalyticsScope::Link(link.id.clone()), start, end)
        .await
        .unwrap();
    assert_eq!(summary.total_clicks, 0);
}

// =============================================================================
// 趋势测试
// =============================================================================

#[tokio::test]
async fn test_daily_trend_ascending() {
    let (storage, _td) = create_temp_storage().await;
    let service = AnalyticsService::new(Arc::clone(&storage));
    let link = insert_link(&storage, "trend1", "https://example.com", None).await;

    // 1 月 3 日两次，1 月 1 日一次（乱序插入）
    append(
        &storage,
        make_event(&link, Utc.with_ymd_and_hms(2024, 1, 3, 10, 0, 0).unwrap()),
    )
    .await;
    append(
        &storage,
        make_event(&link, Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap()),
    )
    .await;
    append(
        &storage,
        make_event(&link, Utc.with_ymd_and_hms(2024, 1, 3, 11, 0, 0).unwrap()),
    )
    .await;

    let summary = service
        .get_summary(&AnalyticsScope::Link(link.id.clone()), None, None)
        .await
        .unwrap();

    assert_eq!(summary.click_trends.len(), 2);
    assert_eq!(summary.click_trends[0].date, "2024-01-01");
    assert_eq!(summary.click_trends[0].clicks, 1);
    assert_eq!(summary.click_trends[1].date, "2024-01-03");
    assert_eq!(summary.click_trends[1].clicks, 2);
}

// =============================================================================
// 热力图测试
// =============================================================================

#[tokio::test]
async fn test_heatmap_sunday_hour_14() {
    let (storage, _td) = create_temp_storage().await;
    let service = AnalyticsService::new(Arc::clone(&storage));
    let link = insert_link(&storage, "heat1", "https://example.com", None).await;

    // 2024-01-07 是星期日
    for minute in 0..3 {
        append(
            &storage,
            make_event(
                &link,
                Utc.with_ymd_and_hms(2024, 1, 7, 14, minute, 0).unwrap(),
            ),
        )
        .await;
    }

    let heatmap = service
        .get_heatmap(&AnalyticsScope::Link(link.id.clone()), None, None)
        .await
        .unwrap();

    assert_eq!(heatmap.len(), 1);
    assert_eq!(heatmap[0].day, "Sun");
    assert_eq!(heatmap[0].hour, 14);
    assert_eq!(heatmap[0].clicks, 3);
}

#[tokio::test]
async fn test_heatmap_sorted_by_day_then_hour() {
    let (storage, _td) = create_temp_storage().await;
    let service = AnalyticsService::new(Arc::clone(&storage));
    let link = insert_link(&storage, "heat2", "https://example.com", None).await;

    // 周一 8 点、周日 14 点、周日 9 点
    append(
        &storage,
        make_event(&link, Utc.with_ymd_and_hms(2024, 1, 8, 8, 0, 0).unwrap()),
    )
    .await;
    append(
        &storage,
        make_event(&link, Utc.with_ymd_and_hms(2024, 1, 7, 14, 0, 0).unwrap()),
    )
    .await;
    append(
        &storage,
        make_event(&link, Utc.with_ymd_and_hms(2024, 1, 7, 9, 0, 0).unwrap()),
    )
    .await;

    let heatmap = service
        .get_heatmap(&AnalyticsScope::Link(link.id.clone()), None, None)
        .await
        .unwrap();

    let cells: Vec<(String, i32)> = heatmap.iter().map(|c| (c.day.clone(), c.hour)).collect();
    assert_eq!(
        cells,
        vec![
            ("Sun".to_string(), 9),
            ("Sun".to_string(), 14),
            ("Mon".to_string(), 8),
        ]
    );
}

// =============================================================================
// 热门链接测试
// =============================================================================

#[tokio::test]
async fn test_top_links_annotated_and_bounded() {
    let (storage, _td) = create_temp_storage().await;
    let service = AnalyticsService::new(Arc::clone(&storage));

    let hot = insert_link(&storage, "hot1", "https://example.com/hot", None).await;
    let cold = insert_link(&storage, "cold1", "https://example.com/cold", None).await;
    // cold 没有任何事件，不应出现在榜单

    for _ in 0..4 {
        append(&storage, make_event(&hot, Utc::now())).await;
    }

    let overall = service
        .get_overall_analytics(&AnalyticsScope::All, None, None)
        .await
        .unwrap();

    assert_eq!(overall.top_links.len(), 1);
    assert_eq!(overall.top_links[0].clicks, 4);
    assert_eq!(overall.top_links[0].short_url, "shrinkly.link/hot1");
    assert_eq!(overall.top_links[0].original_url, "https://example.com/hot");
    assert!(!overall.top_links.iter().any(|l| l.link_id == cold.id));
}

#[tokio::test]
async fn test_top_links_deleted_link_reported_as_unknown() {
    let (storage, _td) = create_temp_storage().await;
    let service = AnalyticsService::new(Arc::clone(&storage));

    let link = insert_link(&storage, "gone1", "https://example.com", None).await;
    append(&storage, make_event(&link, Utc::now())).await;

    // 删除链接但保留事件（级联关闭），榜单用占位字段而不是剔除
    storage.delete_link(&link.id, false).await.unwrap();

    let overall = service
        .get_overall_analytics(&AnalyticsScope::All, None, None)
        .await
        .unwrap();

    assert_eq!(overall.top_links.len(), 1);
    assert_eq!(overall.top_links[0].short_url, "Unknown");
    assert_eq!(overall.top_links[0].original_url, "Unknown");
}

// =============================================================================
// Owner 范围测试
// =============================================================================

#[tokio::test]
async fn test_owner_scope_filters_by_link_ownership() {
    let (storage, _td) = create_temp_storage().await;
    let service = AnalyticsService::new(Arc::clone(&storage));

    let alice_link = insert_link(&storage, "alice1", "https://example.com/a", Some("alice")).await;
    let bob_link = insert_link(&storage, "bob1", "https://example.com/b", Some("bob")).await;

    append(&storage, make_event(&alice_link, Utc::now())).await;
    append(&storage, make_event(&alice_link, Utc::now())).await;
    append(&storage, make_event(&bob_link, Utc::now())).await;

    let alice_summary = service
        .get_summary(&AnalyticsScope::Owner("alice".to_string()), None, None)
        .await
        .unwrap();
    assert_eq!(alice_summary.total_clicks, 2);

    let bob_summary = service
        .get_summary(&AnalyticsScope::Owner("bob".to_string()), None, None)
        .await
        .unwrap();
    assert_eq!(bob_summary.total_clicks, 1);
}

// =============================================================================
// Insights 测试
// =============================================================================

#[tokio::test]
async fn test_insights_empty_returns_sentinel() {
    let (storage, _td) = create_temp_storage().await;
    let service = AnalyticsService::new(Arc::clone(&storage));

    let insights = service.get_insights(&AnalyticsScope::All).await.unwrap();
    assert_eq!(insights.best_day, "Not enough data");
    assert_eq!(insights.best_platform, "Not enough data");
    assert_eq!(insights.best_hour, "Not enough data");
    assert_eq!(insights.top_link, "Not enough data");
}

#[tokio::test]
async fn test_insights_single_bucket() {
    let (storage, _td) = create_temp_storage().await;
    let service = AnalyticsService::new(Arc::clone(&storage));
    let link = insert_link(&storage, "ins1", "https://example.com", None).await;

    // 全部事件：星期日 14 点，来源 Facebook
    for _ in 0..3 {
        let mut event = make_event(&link, Utc.with_ymd_and_hms(2024, 1, 7, 14, 30, 0).unwrap());
        event.referrer_source = "Facebook".to_string();
        append(&storage, event).await;
    }

    let insights = service.get_insights(&AnalyticsScope::All).await.unwrap();
    assert_eq!(insights.best_day, "Sunday");
    assert_eq!(insights.best_platform, "Facebook");
    assert_eq!(insights.best_hour, "14:00");
    assert_eq!(insights.top_link, "shrinkly.link/ins1");
}

// =============================================================================
// 导出测试
// =============================================================================

#[tokio::test]
async fn test_export_most_recent_first_with_annotations() {
    let (storage, _td) = create_temp_storage().await;
    let service = AnalyticsService::new(Arc::clone(&storage));
    let link = insert_link(&storage, "exp1", "https://example.com", None).await;

    append(
        &storage,
        make_event(&link, Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap()),
    )
    .await;
    let mut newest = make_event(&link, Utc.with_ymd_and_hms(2024, 1, 2, 8, 0, 0).unwrap());
    newest.is_qr_scan = true;
    append(&storage, newest).await;

    let rows = service
        .export(&AnalyticsScope::Link(link.id.clone()), None, None)
        .await
        .unwrap();

    assert_eq!(rows.len(), 2);
    // 最近的排在最前
    assert!(rows[0].clicked_at > rows[1].clicked_at);
    assert!(rows[0].is_qr_scan);
    assert_eq!(rows[0].short_url, "shrinkly.link/exp1");
    assert_eq!(rows[0].original_url, "https://example.com");
    assert_eq!(rows[0].device, "mobile");
    // ISO-8601 时间戳
    assert!(rows[0].clicked_at.ends_with('Z'));
}

#[tokio::test]
async fn test_export_row_limit_enforced() {
    let (storage, _td) = create_temp_storage().await;
    let link = insert_link(&storage, "lim1", "https://example.com", None).await;

    for hour in 8..12 {
        append(
            &storage,
            make_event(&link, Utc.with_ymd_and_hms(2024, 1, 1, hour, 0, 0).unwrap()),
        )
        .await;
    }

    // 存储层导出受上限约束，且从最近的开始截断
    let filter = shrinkly::storage::backend::EventFilter {
        link_id: Some(link.id.clone()),
        ..Default::default()
    };
    let rows = storage.export_events(&filter, 2).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows[0].clicked_at > rows[1].clicked_at);
}

// =============================================================================
// 单链接查询校验
// =============================================================================

#[tokio::test]
async fn test_link_analytics_unknown_link_is_not_found() {
    let (storage, _td) = create_temp_storage().await;
    let service = AnalyticsService::new(Arc::clone(&storage));

    let err = service
        .get_link_analytics("no-such-id", None, None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        shrinkly::errors::ShrinklyError::NotFound(_)
    ));
}
