//! API 帮助函数

use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse};
use serde::Serialize;

use crate::api::jwt::{AccessClaims, get_jwt_service};
use crate::errors::ShrinklyError;

use super::error_code::ErrorCode;

/// 统一 JSON 响应信封
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// 构建 JSON 响应
pub fn json_response<T: Serialize>(
    status: StatusCode,
    code: ErrorCode,
    message: impl Into<String>,
    data: Option<T>,
) -> HttpResponse {
    HttpResponse::build(status)
        .append_header(("Content-Type", "application/json; charset=utf-8"))
        .json(ApiResponse {
            code: code as i32,
            message: message.into(),
            data,
        })
}

/// 构建成功响应
pub fn success_response<T: Serialize>(data: T) -> HttpResponse {
    json_response(StatusCode::OK, ErrorCode::Success, "OK", Some(data))
}

/// 构建错误响应
pub fn error_response(status: StatusCode, error_code: ErrorCode, message: &str) -> HttpResponse {
    json_response::<()>(status, error_code, message, None)
}

/// 从 ShrinklyError 构建错误响应（自动映射 HTTP 状态码和 ErrorCode）
pub fn error_from_shrinkly(err: &ShrinklyError) -> HttpResponse {
    error_response(err.http_status(), ErrorCode::from(err), err.message())
}

/// 统一 Result → HttpResponse 转换
///
/// 成功时返回 200 OK + JSON 数据，失败时自动映射 ShrinklyError。
pub fn api_result<T, E>(result: Result<T, E>) -> HttpResponse
where
    T: Serialize,
    E: Into<ShrinklyError>,
{
    match result {
        Ok(data) => success_response(data),
        Err(e) => {
            let err: ShrinklyError = e.into();
            error_from_shrinkly(&err)
        }
    }
}

/// 校验 Bearer access token，返回 claims（失败返回 None）
pub fn verify_jwt(req: &HttpRequest) -> Option<AccessClaims> {
    let auth_header = req.headers().get("Authorization")?;
    let auth_str = auth_header.to_str().ok()?;
    let token = auth_str.strip_prefix("Bearer ")?;
    get_jwt_service().validate_access_token(token).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_response_status() {
        let response = success_response("data");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_error_response_status() {
        let response = error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::BadRequest,
            "Something went wrong",
        );
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_error_from_shrinkly_maps_status() {
        let err = ShrinklyError::not_found("missing");
        assert_eq!(error_from_shrinkly(&err).status(), StatusCode::NOT_FOUND);

        let err = ShrinklyError::link_deactivated("inactive");
        assert_eq!(error_from_shrinkly(&err).status(), StatusCode::FORBIDDEN);

        let err = ShrinklyError::analytics_query_failed("boom");
        assert_eq!(
            error_from_shrinkly(&err).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
