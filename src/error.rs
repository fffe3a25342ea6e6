// error.rs — 错误类型与错误归类模块
// 所有请求失败都会先经过这里，被归为唯一的一种 WallazaError 再交给调用方

use reqwest::StatusCode;
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

/// 本 crate 统一使用的 Result 别名
pub type Result<T, E = WallazaError> = std::result::Result<T, E>;

/// 调用 Wallaza API 时可能出现的所有错误
#[derive(Debug, Error)]
pub enum WallazaError {
    /// HTTP 401：凭证被拒绝
    #[error("authentication failed, please check your API key")]
    Unauthorized,

    /// HTTP 429：触发限流，不会自动重试
    #[error("rate limit exceeded, please try again later")]
    RateLimited {
        /// `Retry-After` 响应头的原始值（如有）
        retry_after: Option<String>,
    },

    /// 其他错误状态码，且响应体中带有错误信息
    #[error("API error ({status}): {detail}")]
    Api { status: u16, detail: String },

    /// 错误状态码，但响应体无法解析出错误信息
    #[error("API error ({status}): request failed")]
    ApiUnspecified { status: u16 },

    /// 请求已发出但没有收到响应（连接失败、超时等）
    #[error("no response from API server, please check your connection: {source}")]
    NoResponse {
        #[source]
        source: reqwest::Error,
    },

    /// 请求发出之前就失败了（参数非法、URL 非法等）
    #[error("failed to set up request: {reason}")]
    RequestSetup { reason: String },

    /// 响应成功但 JSON 结构不符合预期
    #[error("unexpected response from {context}: {source}")]
    Parse {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// 写文件失败或二进制流中途断开
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 配置在构造时被拒绝
    #[error("invalid client configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl WallazaError {
    pub(crate) fn setup(reason: impl Into<String>) -> Self {
        Self::RequestSetup {
            reason: reason.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// 错误对应的 HTTP 状态码（仅服务端返回了响应的情况）
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized => Some(401),
            Self::RateLimited { .. } => Some(429),
            Self::Api { status, .. } | Self::ApiUnspecified { status } => Some(*status),
            _ => None,
        }
    }

    /// 服务端表示资源不存在
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// 稍后重试有可能成功；本 crate 自身从不重试
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited { .. } | Self::NoResponse { .. })
    }
}

/// 错误响应体的几种常见形状
///
/// - `{"error": {"message": "..."}}`
/// - `{"error": "..."}`
/// - `{"message": "..."}`
#[derive(Deserialize)]
struct ErrorBody {
    error: Option<ErrorField>,
    message: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorField {
    Detailed { message: String },
    Plain(String),
}

fn error_detail(body: &[u8]) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_slice(body).ok()?;
    let detail = match parsed.error {
        Some(ErrorField::Detailed { message }) | Some(ErrorField::Plain(message)) => Some(message),
        None => parsed.message,
    }?;
    let detail = detail.trim();
    (!detail.is_empty()).then(|| detail.to_string())
}

/// 将错误状态码归类为对应的错误
///
/// `body` 是错误响应的原始内容，只在 401/429 以外的状态下才会被解析。
pub fn classify_status(status: StatusCode, retry_after: Option<String>, body: &[u8]) -> WallazaError {
    match status {
        StatusCode::UNAUTHORIZED => WallazaError::Unauthorized,
        StatusCode::TOO_MANY_REQUESTS => WallazaError::RateLimited { retry_after },
        _ => match error_detail(body) {
            Some(detail) => WallazaError::Api {
                status: status.as_u16(),
                detail,
            },
            None => WallazaError::ApiUnspecified {
                status: status.as_u16(),
            },
        },
    }
}

/// 将 reqwest 在发送阶段产生的错误归类
///
/// builder 错误说明请求根本没有发出去，其余情况都视为没有收到响应。
pub fn classify_send_error(err: reqwest::Error) -> WallazaError {
    if err.is_builder() {
        WallazaError::setup(err.to_string())
    } else {
        WallazaError::NoResponse { source: err }
    }
}

/// 检查响应状态，错误状态会读完响应体并归类
pub(crate) async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let retry_after = response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    // 读不到响应体时按“没有错误信息”处理
    let body = response.bytes().await.unwrap_or_default();

    tracing::debug!(status = status.as_u16(), "API returned error status");
    Err(classify_status(status, retry_after, &body))
}
