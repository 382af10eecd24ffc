use std::fmt;

use actix_web::http::StatusCode;

#[derive(Debug, Clone)]
pub enum ShrinklyError {
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    Validation(String),
    NotFound(String),
    LinkDeactivated(String),
    Serialization(String),
    DateParse(String),
    AnalyticsQueryFailed(String),
}

impl ShrinklyError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            ShrinklyError::DatabaseConfig(_) => "E001",
            ShrinklyError::DatabaseConnection(_) => "E002",
            ShrinklyError::DatabaseOperation(_) => "E003",
            ShrinklyError::Validation(_) => "E004",
            ShrinklyError::NotFound(_) => "E005",
            ShrinklyError::LinkDeactivated(_) => "E006",
            ShrinklyError::Serialization(_) => "E007",
            ShrinklyError::DateParse(_) => "E008",
            ShrinklyError::AnalyticsQueryFailed(_) => "E009",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            ShrinklyError::DatabaseConfig(_) => "Database Configuration Error",
            ShrinklyError::DatabaseConnection(_) => "Database Connection Error",
            ShrinklyError::DatabaseOperation(_) => "Database Operation Error",
            ShrinklyError::Validation(_) => "Validation Error",
            ShrinklyError::NotFound(_) => "Resource Not Found",
            ShrinklyError::LinkDeactivated(_) => "Link Deactivated",
            ShrinklyError::Serialization(_) => "Serialization Error",
            ShrinklyError::DateParse(_) => "Date Parse Error",
            ShrinklyError::AnalyticsQueryFailed(_) => "Analytics Query Failed",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            ShrinklyError::DatabaseConfig(msg) => msg,
            ShrinklyError::DatabaseConnection(msg) => msg,
            ShrinklyError::DatabaseOperation(msg) => msg,
            ShrinklyError::Validation(msg) => msg,
            ShrinklyError::NotFound(msg) => msg,
            ShrinklyError::LinkDeactivated(msg) => msg,
            ShrinklyError::Serialization(msg) => msg,
            ShrinklyError::DateParse(msg) => msg,
            ShrinklyError::AnalyticsQueryFailed(msg) => msg,
        }
    }

    /// 映射到 HTTP 状态码
    pub fn http_status(&self) -> StatusCode {
        match self {
            ShrinklyError::NotFound(_) => StatusCode::NOT_FOUND,
            ShrinklyError::LinkDeactivated(_) => StatusCode::FORBIDDEN,
            ShrinklyError::Validation(_) | ShrinklyError::DateParse(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for ShrinklyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for ShrinklyError {}

// 便捷的构造函数
impl ShrinklyError {
    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        ShrinklyError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        ShrinklyError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        ShrinklyError::DatabaseOperation(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        ShrinklyError::Validation(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        ShrinklyError::NotFound(msg.into())
    }

    pub fn link_deactivated<T: Into<String>>(msg: T) -> Self {
        ShrinklyError::LinkDeactivated(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        ShrinklyError::Serialization(msg.into())
    }

    pub fn date_parse<T: Into<String>>(msg: T) -> Self {
        ShrinklyError::DateParse(msg.into())
    }

    pub fn analytics_query_failed<T: Into<String>>(msg: T) -> Self {
        ShrinklyError::AnalyticsQueryFailed(msg.into())
    }
}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for ShrinklyError {
    fn from(err: sea_orm::DbErr) -> Self {
        ShrinklyError::DatabaseOperation(err.to_string())
    }
}

impl From<serde_json::Error> for ShrinklyError {
    fn from(err: serde_json::Error) -> Self {
        ShrinklyError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for ShrinklyError {
    fn from(err: chrono::ParseError) -> Self {
        ShrinklyError::DateParse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ShrinklyError>;
