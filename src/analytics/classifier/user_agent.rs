//! User-Agent 分类器
//!
//! 使用 woothee 解析原始 UA 字符串，归类为 {device, browser, os}。
//! 任何输入都能得到结果，解析失败统一降级为 "unknown"，从不报错。

use once_cell::sync::Lazy;
use woothee::parser::Parser;

/// 解析器内部数据集只读，进程内共享一份
static PARSER: Lazy<Parser> = Lazy::new(Parser::new);

/// UA 分类结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UaInfo {
    /// mobile / tablet / desktop / unknown
    pub device: String,
    pub browser: String,
    pub os: String,
}

impl Default for UaInfo {
    fn default() -> Self {
        Self {
            device: "unknown".to_string(),
            browser: "unknown".to_string(),
            os: "unknown".to_string(),
        }
    }
}

/// 解析 User-Agent 字符串
///
/// 设备归类规则：
/// - UA 含平板特征（iPad / tablet）→ tablet
/// - woothee 分类为手机（smartphone / mobilephone）→ mobile
/// - 能识别出操作系统但无移动特征 → desktop
/// - 其余 → unknown
pub fn classify_user_agent(user_agent: &str) -> UaInfo {
    let Some(result) = PARSER.parse(user_agent) else {
        return UaInfo::default();
    };

    let os_detected = result.os != "UNKNOWN";

    let lower = user_agent.to_ascii_lowercase();
    let device = if lower.contains("ipad") || lower.contains("tablet") {
        "tablet"
    } else if result.category == "smartphone" || result.category == "mobilephone" {
        "mobile"
    } else if os_detected {
        "desktop"
    } else {
        "unknown"
    };

    UaInfo {
        device: device.to_string(),
        browser: if result.name != "UNKNOWN" {
            result.name.to_string()
        } else {
            "unknown".to_string()
        },
        os: if os_detected {
            result.os.to_string()
        } else {
            "unknown".to_string()
        },
    }
}
