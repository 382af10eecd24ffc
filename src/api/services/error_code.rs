//! 统一 API 错误码定义

use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::errors::ShrinklyError;

/// API 错误码枚举
///
/// 使用 serde_repr 序列化为数字。按千位分域：
/// - 0: 成功
/// - 1000-1099: 通用错误
/// - 3000-3099: 链接错误
/// - 6000-6099: Analytics 错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(i32)]
pub enum ErrorCode {
    // 成功
    Success = 0,

    // 通用错误 1000-1099
    BadRequest = 1000,
    Unauthorized = 1001,
    NotFound = 1004,
    InternalServerError = 1005,
    InvalidDateFormat = 1012,

    // 链接错误 3000-3099
    LinkNotFound = 3000,
    LinkAlreadyExists = 3001,
    LinkInvalidUrl = 3002,
    LinkDeactivated = 3007,

    // Analytics 错误 6000-6099
    AnalyticsQueryFailed = 6000,
}

impl From<&ShrinklyError> for ErrorCode {
    fn from(err: &ShrinklyError) -> Self {
        match err {
            ShrinklyError::NotFound(_) => ErrorCode::NotFound,
            ShrinklyError::LinkDeactivated(_) => ErrorCode::LinkDeactivated,
            ShrinklyError::Validation(_) => ErrorCode::BadRequest,
            ShrinklyError::DateParse(_) => ErrorCode::InvalidDateFormat,
            ShrinklyError::AnalyticsQueryFailed(_) => ErrorCode::AnalyticsQueryFailed,
            _ => ErrorCode::InternalServerError,
        }
    }
}
