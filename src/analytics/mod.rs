pub mod classifier;
pub mod global;
pub mod recorder;
pub mod sink;

pub use recorder::ClickRecorder;
pub use sink::EventSink;

use chrono::{DateTime, Utc};

/// 单次点击的分析事件
///
/// 每次成功重定向恰好产生一条，写入后不可变（append-only）。
#[derive(Debug, Clone)]
pub struct ClickEvent {
    /// 所属链接 id
    pub link_id: String,
    /// 短码（冗余，加速查询）
    pub short_code: String,
    /// 访客 IP
    pub ip_address: Option<String>,
    /// 原始 User-Agent
    pub user_agent: Option<String>,
    /// mobile / tablet / desktop / unknown
    pub device: String,
    /// 浏览器名称，无法识别时为 "unknown"
    pub browser: String,
    /// 操作系统名称，无法识别时为 "unknown"
    pub os: String,
    /// 国家，无 geo 解析器时为 "Unknown"
    pub country: String,
    /// 城市，无 geo 解析器时为 "Unknown"
    pub city: String,
    /// 原始 Referer header
    pub referrer: Option<String>,
    /// 分类后的来源标签
    pub referrer_source: String,
    /// 是否来自扫描 QR 码
    pub is_qr_scan: bool,
    /// 点击时间戳
    pub clicked_at: DateTime<Utc>,
}

/// 重定向请求携带的访客元数据
#[derive(Debug, Clone, Default)]
pub struct RequestMeta {
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
    pub client_ip: Option<String>,
}
