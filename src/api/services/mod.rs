pub mod analytics;
mod error_code;
mod helpers;
pub mod links;
pub mod redirect;

pub use error_code::ErrorCode;
pub use helpers::{ApiResponse, api_result, error_response, success_response, verify_jwt};
