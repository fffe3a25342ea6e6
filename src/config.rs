// config.rs — 客户端配置模块
// 凭证和 API 地址在构造时确定，之后只读；本 crate 不主动读取任何文件或环境变量

use crate::error::{Result, WallazaError};
use schemars::JsonSchema; // 引入用于生成 JSON Schema 的 trait
use serde::{Deserialize, Serialize}; // 引入序列化与反序列化 trait
use std::fmt;
use std::time::Duration;
use url::Url;

/// Wallaza API 默认地址
pub const DEFAULT_BASE_URL: &str = "https://api.wallaza.com/v1";

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

/// 客户端配置
///
/// 字段全部私有，构造后不可修改；`with_*` 方法消耗旧值并返回校验过的新值。
/// 同一份配置可以安全地在多个并发任务之间共享（`Clone` 很便宜）。
///
/// 对应的 TOML 形式：
///
/// ```toml
/// api_key = "your_api_key"
/// base_url = "https://api.wallaza.com/v1"
/// timeout_ms = 30000
/// ```
#[derive(Clone, Deserialize, Serialize, JsonSchema)]
pub struct ClientConfig {
    /// Bearer token，必填且不能为空
    api_key: String,
    /// API 基础 URL
    #[serde(default = "default_base_url")]
    base_url: String,
    /// 单次请求的整体超时（毫秒），不配置则不设超时
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timeout_ms: Option<u64>,
}

impl ClientConfig {
    /// 使用默认 API 地址创建配置
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self {
            api_key: api_key.into(),
            base_url: default_base_url(),
            timeout_ms: None,
        }
        .validated()
    }

    /// 替换 API 基础 URL（用于测试环境或私有部署）
    pub fn with_base_url(self, base_url: impl Into<String>) -> Result<Self> {
        Self {
            base_url: base_url.into(),
            ..self
        }
        .validated()
    }

    /// 设置单次请求的超时时间，精度为毫秒，不足 1 毫秒的超时会被拒绝
    pub fn with_timeout(self, timeout: Duration) -> Result<Self> {
        let millis = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        Self {
            timeout_ms: Some(millis),
            ..self
        }
        .validated()
    }

    /// 从 TOML 文本解析配置
    ///
    /// 只负责解析，不关心文本来自哪里；读取文件是调用方的事情。
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| WallazaError::InvalidConfig {
            reason: e.to_string(),
        })?;
        config.validated()
    }

    /// 将当前配置转换为 TOML 字符串
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_else(|_| "# Error serializing config".to_string())
    }

    /// 获取配置的 JSON Schema
    pub fn get_schema() -> String {
        let schema = schemars::schema_for!(ClientConfig);
        serde_json::to_string_pretty(&schema).unwrap_or_default()
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// 解析后的基础 URL
    ///
    /// 构造时已经校验过，这里仍然返回 `Result` 以免在调用链中出现 panic。
    pub(crate) fn base(&self) -> Result<Url> {
        parse_base_url(&self.base_url)
    }

    fn validated(self) -> Result<Self> {
        if self.api_key.trim().is_empty() {
            return Err(WallazaError::InvalidConfig {
                reason: "api_key must not be empty".to_string(),
            });
        }
        parse_base_url(&self.base_url)?;
        if self.timeout_ms == Some(0) {
            return Err(WallazaError::InvalidConfig {
                reason: "timeout_ms must be at least 1".to_string(),
            });
        }
        Ok(self)
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| WallazaError::InvalidConfig {
        reason: format!("invalid base_url {raw:?}: {e}"),
    })?;
    // mailto: 之类的 URL 无法追加路径段
    if url.cannot_be_a_base() {
        return Err(WallazaError::InvalidConfig {
            reason: format!("base_url {raw:?} cannot carry a path"),
        });
    }
    Ok(url)
}

// 手写 Debug，避免凭证出现在日志里
impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_uses_default_base_url() {
        let config = ClientConfig::new("key").unwrap();
        assert_eq!(config.base_url(), DEFAULT_BASE_URL);
        assert_eq!(config.api_key(), "key");
        assert!(config.timeout().is_none());
    }

    #[test]
    fn empty_api_key_is_rejected() {
        for key in ["", "   "] {
            let err = ClientConfig::new(key).unwrap_err();
            assert!(matches!(err, WallazaError::InvalidConfig { .. }), "{err:?}");
        }
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = ClientConfig::new("key")
            .unwrap()
            .with_base_url("not a url")
            .unwrap_err();
        assert!(matches!(err, WallazaError::InvalidConfig { .. }));

        let err = ClientConfig::new("key")
            .unwrap()
            .with_base_url("mailto:someone@example.com")
            .unwrap_err();
        assert!(matches!(err, WallazaError::InvalidConfig { .. }));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        for timeout in [Duration::ZERO, Duration::from_micros(500)] {
            let err = ClientConfig::new("key").unwrap().with_timeout(timeout).unwrap_err();
            assert!(matches!(err, WallazaError::InvalidConfig { .. }), "{timeout:?}");
        }
    }

    #[test]
    fn sub_second_timeouts_are_kept() {
        for millis in [200, 1900] {
            let config = ClientConfig::new("key")
                .unwrap()
                .with_timeout(Duration::from_millis(millis))
                .unwrap();
            assert_eq!(config.timeout(), Some(Duration::from_millis(millis)));
        }
    }

    #[test]
    fn toml_without_base_url_falls_back_to_default() {
        let config = ClientConfig::from_toml_str("api_key = \"abc\"\ntimeout_ms = 15000\n").unwrap();
        assert_eq!(config.base_url(), DEFAULT_BASE_URL);
        assert_eq!(config.timeout(), Some(Duration::from_secs(15)));
    }

    #[test]
    fn toml_missing_api_key_is_invalid() {
        let err = ClientConfig::from_toml_str("base_url = \"https://example.com\"").unwrap_err();
        assert!(matches!(err, WallazaError::InvalidConfig { .. }));
    }

    #[test]
    fn to_toml_parses_back() {
        let config = ClientConfig::new("abc")
            .unwrap()
            .with_base_url("http://127.0.0.1:8080/v1")
            .unwrap();
        let parsed = ClientConfig::from_toml_str(&config.to_toml()).unwrap();
        assert_eq!(parsed.base_url(), "http://127.0.0.1:8080/v1");
        assert_eq!(parsed.api_key(), "abc");
    }

    #[test]
    fn debug_output_hides_api_key() {
        let config = ClientConfig::new("super-secret").unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn schema_mentions_every_field() {
        let schema = ClientConfig::get_schema();
        for field in ["api_key", "base_url", "timeout_ms"] {
            assert!(schema.contains(field), "schema is missing {field}");
        }
    }
}
