use super::ClickEvent;

/// 分析事件 Sink（append-only）
#[async_trait::async_trait]
pub trait EventSink: Send + Sync {
    /// 追加单条分析事件
    async fn append_event(&self, event: ClickEvent) -> anyhow::Result<()>;
}
