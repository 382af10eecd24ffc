//! 配置管理
//!
//! 静态配置从 config.toml 与环境变量加载（前缀 SHRINKLY，分隔符 __），
//! 优先级：ENV > config.toml > 默认值。

mod structs;

pub use structs::{
    AnalyticsConfig, ApiConfig, DatabaseConfig, FeaturesConfig, LoggingConfig, ServerConfig,
    StaticConfig,
};

use std::sync::OnceLock;

static CONFIG: OnceLock<StaticConfig> = OnceLock::new();

/// 获取全局配置实例
pub fn get_config() -> &'static StaticConfig {
    CONFIG.get_or_init(StaticConfig::load)
}

/// 初始化全局配置（幂等）
pub fn init_config() {
    CONFIG.get_or_init(StaticConfig::load);
}
