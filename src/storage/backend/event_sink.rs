//! EventSink implementation for SeaOrmStorage
//!
//! 分析事件的落库实现：单条 INSERT，append-only，失败交由上层
//! ClickRecorder 记日志后吞掉。

use async_trait::async_trait;
use sea_orm::{ActiveValue::Set, EntityTrait};

use super::retry;
use crate::analytics::{ClickEvent, EventSink};

use migration::entities::analytics_event;

#[async_trait]
impl EventSink for super::SeaOrmStorage {
    async fn append_event(&self, event: ClickEvent) -> anyhow::Result<()> {
        let model = analytics_event::ActiveModel {
            link_id: Set(event.link_id),
            short_code: Set(event.short_code),
            ip_address: Set(event.ip_address),
            user_agent: Set(event.user_agent),
            device: Set(event.device),
            browser: Set(event.browser),
            os: Set(event.os),
            country: Set(event.country),
            city: Set(event.city),
            referrer: Set(event.referrer),
            referrer_source: Set(event.referrer_source),
            is_qr_scan: Set(event.is_qr_scan),
            clicked_at: Set(event.clicked_at),
            ..Default::default()
        };

        let db = &self.db;
        retry::with_retry("append_event", self.retry_config, || async {
            analytics_event::Entity::insert(model.clone()).exec(db).await
        })
        .await
        .map_err(|e| anyhow::anyhow!("Failed to insert analytics event: {}", e))?;

        Ok(())
    }
}
