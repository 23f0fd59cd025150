//! 错误处理模块

use reqwest::StatusCode;
use thiserror::Error;

/// groq-demo 的统一错误类型
///
/// 页面控制器会把所有错误渲染为页面内容，这里只负责精确分类
#[derive(Debug, Error)]
pub enum GroqError {
    /// HTTP 请求相关错误
    #[error("HTTP请求失败: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON 序列化/反序列化错误
    #[error("JSON处理错误: {0}")]
    Json(String),

    /// API 服务端错误
    #[error("API错误: {0}")]
    Api(String),

    /// 请求超时错误
    #[error("请求超时")]
    Timeout,

    /// 响应内容为空
    #[error("响应内容为空")]
    NoContent,

    /// API 请求频率限制
    #[error("请求频率超限: {0}")]
    RateLimit(String),

    /// 身份验证失败
    #[error("身份验证失败: {0}")]
    Auth(String),

    /// 指定的模型不存在
    #[error("模型不存在: {0}")]
    ModelNotFound(String),

    /// 请求参数无效
    #[error("请求参数无效: {0}")]
    InvalidRequest(String),

    /// 配置相关错误
    #[error("配置错误: {0}")]
    Config(String),

    /// IO 错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// groq-demo 的 Result 类型别名
pub type Result<T> = std::result::Result<T, GroqError>;

impl From<serde_json::Error> for GroqError {
    fn from(e: serde_json::Error) -> Self {
        GroqError::Json(e.to_string())
    }
}

impl From<dotenvy::Error> for GroqError {
    fn from(e: dotenvy::Error) -> Self {
        GroqError::Config(e.to_string())
    }
}

impl GroqError {
    /// 根据 HTTP 状态码和服务端返回的错误信息构造错误
    pub fn from_status(status: StatusCode, detail: String) -> Self {
        match status.as_u16() {
            401 | 403 => GroqError::Auth(detail),
            404 => GroqError::ModelNotFound(detail),
            429 => GroqError::RateLimit(detail),
            400 | 422 => GroqError::InvalidRequest(detail),
            _ => GroqError::Api(format!("Request failed with status {}: {}", status, detail)),
        }
    }

    /// 将 reqwest 错误归类，超时单独处理
    pub(crate) fn from_transport(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            GroqError::Timeout
        } else {
            GroqError::Http(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            GroqError::from_status(StatusCode::UNAUTHORIZED, "bad key".into()),
            GroqError::Auth(m) if m == "bad key"
        ));
        assert!(matches!(
            GroqError::from_status(StatusCode::TOO_MANY_REQUESTS, "slow down".into()),
            GroqError::RateLimit(_)
        ));
        assert!(matches!(
            GroqError::from_status(StatusCode::NOT_FOUND, "no model".into()),
            GroqError::ModelNotFound(_)
        ));
        assert!(matches!(
            GroqError::from_status(StatusCode::BAD_REQUEST, "bad".into()),
            GroqError::InvalidRequest(_)
        ));
    }

    #[test]
    fn test_server_error_keeps_status() {
        let err = GroqError::from_status(StatusCode::BAD_GATEWAY, "upstream".into());
        match err {
            GroqError::Api(msg) => {
                assert!(msg.contains("502"));
                assert!(msg.contains("upstream"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
