//! 点击记录器
//!
//! 负责在重定向之外构建并持久化分析事件：
//! - 分类（UA / referrer）在事件构建时内联完成
//! - 通过 `tokio::spawn` 派发，绝不阻塞重定向响应
//! - 写入带超时，超时或失败只记日志，不重试、不向上传播

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{trace, warn};

use migration::entities::link;

use super::classifier::{GeoClassifier, NullGeoClassifier, classify_referrer, classify_user_agent};
use super::sink::EventSink;
use super::{ClickEvent, RequestMeta};

/// 点击记录器
///
/// 持有事件 Sink 与可选的 geo 解析器。状态完全封装在结构体内部，
/// 便于测试和多实例使用。
pub struct ClickRecorder {
    sink: Arc<dyn EventSink>,
    geo: Arc<dyn GeoClassifier>,
    write_timeout: Duration,
}

impl ClickRecorder {
    pub fn new(sink: Arc<dyn EventSink>, write_timeout: Duration) -> Self {
        Self {
            sink,
            geo: Arc::new(NullGeoClassifier),
            write_timeout,
        }
    }

    /// 注入 geo 解析器（缺省为 Null 实现，落库 "Unknown"）
    pub fn with_geo_classifier(mut self, geo: Arc<dyn GeoClassifier>) -> Self {
        self.geo = geo;
        self
    }

    /// 从请求元数据构建分析事件（分类内联完成）
    pub fn build_event(link: &link::Model, meta: &RequestMeta, is_qr_scan: bool) -> ClickEvent {
        let ua_info = classify_user_agent(meta.user_agent.as_deref().unwrap_or(""));
        let referrer_source = classify_referrer(meta.referrer.as_deref().unwrap_or(""));

        ClickEvent {
            link_id: link.id.clone(),
            short_code: link.short_code.clone(),
            ip_address: meta.client_ip.clone(),
            user_agent: meta.user_agent.clone(),
            device: ua_info.device,
            browser: ua_info.browser,
            os: ua_info.os,
            country: "Unknown".to_string(),
            city: "Unknown".to_string(),
            referrer: meta.referrer.clone(),
            referrer_source,
            is_qr_scan,
            clicked_at: Utc::now(),
        }
    }

    /// 记录一次点击，返回是否成功写入
    ///
    /// 失败（存储不可用、超时）只记日志并吞掉，调用方无需处理。
    pub async fn record(&self, link: &link::Model, meta: &RequestMeta, is_qr_scan: bool) -> bool {
        let mut event = Self::build_event(link, meta, is_qr_scan);

        // geo 解析（有 IP 且解析器可用时），失败降级为 "Unknown"
        if let Some(ref ip) = meta.client_ip
            && let Some(geo) = self.geo.lookup(ip).await
        {
            if let Some(country) = geo.country {
                event.country = country;
            }
            if let Some(city) = geo.city {
                event.city = city;
            }
        }

        let code = event.short_code.clone();
        match tokio::time::timeout(self.write_timeout, self.sink.append_event(event)).await {
            Ok(Ok(())) => {
                trace!("ClickRecorder: event recorded for '{}'", code);
                true
            }
            Ok(Err(e)) => {
                warn!("ClickRecorder: failed to record event for '{}': {}", code, e);
                false
            }
            Err(_) => {
                warn!(
                    "ClickRecorder: event write for '{}' timed out after {} ms, abandoned",
                    code,
                    self.write_timeout.as_millis()
                );
                false
            }
        }
    }

    /// 异步派发一次点击记录（fire-and-forget）
    ///
    /// 这是重定向热路径与分析写入之间的显式异步边界：
    /// spawn 之后立即返回，事件持久化的成败不影响重定向。
    pub fn dispatch(self: &Arc<Self>, link: link::Model, meta: RequestMeta, is_qr_scan: bool) {
        let recorder = Arc::clone(self);
        tokio::spawn(async move {
            recorder.record(&link, &meta, is_qr_scan).await;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    fn make_link() -> link::Model {
        link::Model {
            id: "11111111-2222-3333-4444-555555555555".to_string(),
            short_code: "abc123".to_string(),
            target_url: "https://example.com".to_string(),
            custom_slug: None,
            domain: "shrinkly.link".to_string(),
            click_count: 0,
            status: "active".to_string(),
            tags: String::new(),
            user_id: None,
            created_at: Utc::now(),
        }
    }

    struct MockSink {
        recorded: std::sync::Mutex<Vec<ClickEvent>>,
        fail: bool,
    }

    impl MockSink {
        fn new() -> Self {
            Self {
                recorded: std::sync::Mutex::new(Vec::new()),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                recorded: std::sync::Mutex::new(Vec::new()),
                fail: true,
            }
        }

        fn events(&self) -> Vec<ClickEvent> {
            self.recorded.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl EventSink for MockSink {
        async fn append_event(&self, event: ClickEvent) -> anyhow::Result<()> {
            if self.fail {
                anyhow::bail!("store unavailable");
            }
            self.recorded.lock().unwrap().push(event);
            Ok(())
        }
    }

    const IPHONE_SAFARI: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 16_5 like Mac OS X) \
        AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.5 Mobile/15E148 Safari/604.1";

    #[tokio::test]
    async fn test_record_classifies_and_persists() {
        let sink = Arc::new(MockSink::new());
        let recorder = ClickRecorder::new(
            Arc::clone(&sink) as Arc<dyn EventSink>,
            Duration::from_secs(3),
        );

        let meta = RequestMeta {
            user_agent: Some(IPHONE_SAFARI.to_string()),
            referrer: Some("https://www.facebook.com/feed".to_string()),
            client_ip: Some("203.0.113.7".to_string()),
        };

        let ok = recorder.record(&make_link(), &meta, false).await;
        assert!(ok);

        let events = sink.events();
        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.short_code, "abc123");
        assert_eq!(event.device, "mobile");
        assert_eq!(event.referrer_source, "Facebook");
        assert_eq!(event.country, "Unknown");
        assert_eq!(event.city, "Unknown");
        assert!(!event.is_qr_scan);
    }

    #[tokio::test]
    async fn test_record_qr_flag() {
        let sink = Arc::new(MockSink::new());
        let recorder = ClickRecorder::new(
            Arc::clone(&sink) as Arc<dyn EventSink>,
            Duration::from_secs(3),
        );

        recorder
            .record(&make_link(), &RequestMeta::default(), true)
            .await;

        assert!(sink.events()[0].is_qr_scan);
    }

    #[tokio::test]
    async fn test_record_failure_is_swallowed() {
        let sink = Arc::new(MockSink::failing());
        let recorder = ClickRecorder::new(
            Arc::clone(&sink) as Arc<dyn EventSink>,
            Duration::from_secs(3),
        );

        // 写入失败只返回 false，不 panic、不传播
        let ok = recorder
            .record(&make_link(), &RequestMeta::default(), false)
            .await;
        assert!(!ok);
        assert!(sink.events().is_empty());
    }

    #[tokio::test]
    async fn test_record_empty_meta_degrades_to_sentinels() {
        let sink = Arc::new(MockSink::new());
        let recorder = ClickRecorder::new(
            Arc::clone(&sink) as Arc<dyn EventSink>,
            Duration::from_secs(3),
        );

        recorder
            .record(&make_link(), &RequestMeta::default(), false)
            .await;

        let event = &sink.events()[0];
        assert_eq!(event.device, "unknown");
        assert_eq!(event.browser, "unknown");
        assert_eq!(event.os, "unknown");
        assert_eq!(event.referrer_source, "direct");
    }

    #[tokio::test]
    async fn test_record_with_injected_geo_classifier() {
        use crate::analytics::classifier::{GeoClassifier, GeoInfo};

        struct FixedGeo;

        #[async_trait]
        impl GeoClassifier for FixedGeo {
            async fn lookup(&self, _ip: &str) -> Option<GeoInfo> {
                Some(GeoInfo {
                    country: Some("DE".to_string()),
                    city: None,
                })
            }
        }

        let sink = Arc::new(MockSink::new());
        let recorder = ClickRecorder::new(
            Arc::clone(&sink) as Arc<dyn EventSink>,
            Duration::from_secs(3),
        )
        .with_geo_classifier(Arc::new(FixedGeo));

        let meta = RequestMeta {
            client_ip: Some("203.0.113.7".to_string()),
            ..Default::default()
        };
        recorder.record(&make_link(), &meta, false).await;

        let event = &sink.events()[0];
        assert_eq!(event.country, "DE");
        // 解析器未返回城市时保持占位值
        assert_eq!(event.city, "Unknown");
    }

    /// 慢 Sink 超时后放弃写入
    #[tokio::test]
    async fn test_record_write_timeout_abandoned() {
        struct SlowSink;

        #[async_trait]
        impl EventSink for SlowSink {
            async fn append_event(&self, _event: ClickEvent) -> anyhow::Result<()> {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(())
            }
        }

        let recorder = ClickRecorder::new(Arc::new(SlowSink), Duration::from_millis(50));
        let ok = recorder
            .record(&make_link(), &RequestMeta::default(), false)
            .await;
        assert!(!ok);
    }
}
