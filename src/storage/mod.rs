pub mod backend;

pub use backend::SeaOrmStorage;

use std::fmt;
use std::str::FromStr;

/// 链接状态
///
/// 数据库中以字符串存储（"active" / "inactive"），历史上出现过
/// 没有 status 字段的精简 schema，已废弃。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
    Active,
    Inactive,
}

impl LinkStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkStatus::Active => "active",
            LinkStatus::Inactive => "inactive",
        }
    }
}

impl fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LinkStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(LinkStatus::Active),
            "inactive" => Ok(LinkStatus::Inactive),
            _ => Err(format!(
                "Invalid link status: '{}'. Valid: active, inactive",
                s
            )),
        }
    }
}
