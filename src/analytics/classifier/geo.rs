//! 地理位置分类器接口
//!
//! 当前没有接入真实的 geo-IP 解析器，事件统一写入 "Unknown" 占位。
//! 接口保持与其他分类器一致：解析缺失或失败时优雅降级，不影响事件写入。

use async_trait::async_trait;

/// geo 解析结果
#[derive(Debug, Clone, Default)]
pub struct GeoInfo {
    pub country: Option<String>,
    pub city: Option<String>,
}

/// geo-IP 解析器接口
#[async_trait]
pub trait GeoClassifier: Send + Sync {
    /// 按 IP 解析地理位置，失败或无数据时返回 None
    async fn lookup(&self, ip: &str) -> Option<GeoInfo>;
}

/// 空实现：始终返回 None，事件落库为 "Unknown"
pub struct NullGeoClassifier;

#[async_trait]
impl GeoClassifier for NullGeoClassifier {
    async fn lookup(&self, _ip: &str) -> Option<GeoInfo> {
        None
    }
}
