// transport.rs — HTTP 传输层
// 负责拼接 URL、附加鉴权头、发送请求，并把失败交给 error 模块归类

use crate::config::ClientConfig;
use crate::error::{Result, WallazaError, check_status, classify_send_error};
use reqwest::Method;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderValue};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

/// 已绑定配置的请求发送器
///
/// `reqwest::Client` 内部维护连接池，clone 只是增加引用计数，
/// 所以 `Transport` 可以随意复制到多个任务中使用。
#[derive(Debug, Clone)]
pub struct Transport {
    client: reqwest::Client,
    config: ClientConfig,
}

impl Transport {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(classify_send_error)?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// 在基础 URL 后追加路径段
    ///
    /// 每个段都会被百分号编码，`id` 中的 `/` 或 `..` 不会改变请求路径的层级。
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.config.base()?;
        url.path_segments_mut()
            .map_err(|_| WallazaError::setup("base URL cannot carry a path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// 把记录里的下载地址解析为绝对 URL，相对地址以基础 URL 为准
    pub fn resolve(&self, location: &str) -> std::result::Result<Url, url::ParseError> {
        match Url::parse(location) {
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                let base = self
                    .config
                    .base()
                    .map_err(|_| url::ParseError::RelativeUrlWithoutBase)?;
                base.join(location)
            }
            other => other,
        }
    }

    fn bearer(&self) -> Result<HeaderValue> {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", self.config.api_key()))
            .map_err(|_| WallazaError::setup("API key contains characters not allowed in a header"))?;
        value.set_sensitive(true);
        Ok(value)
    }

    /// 发送一次带鉴权的 API 请求，返回原始响应体
    ///
    /// `query` 为空时不会附加查询字符串。
    #[instrument(level = "debug", skip(self, query))]
    pub async fn send(&self, method: Method, segments: &[&str], query: &[(&str, String)]) -> Result<Vec<u8>> {
        let url = self.endpoint(segments)?;

        let mut request = self
            .client
            .request(method, url)
            .header(AUTHORIZATION, self.bearer()?)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if !query.is_empty() {
            request = request.query(query);
        }

        let response = request.send().await.map_err(classify_send_error)?;
        let response = check_status(response).await?;

        // 状态码正常但读响应体时连接断开，同样属于没有拿到响应
        let body = response
            .bytes()
            .await
            .map_err(|source| WallazaError::NoResponse { source })?;

        debug!(bytes = body.len(), "API response received");
        Ok(body.to_vec())
    }

    /// GET 请求并把响应体解析为 `T`
    pub async fn get_json<T: DeserializeOwned>(&self, segments: &[&str], query: &[(&str, String)]) -> Result<T> {
        let body = self.send(Method::GET, segments, query).await?;
        serde_json::from_slice(&body).map_err(|source| WallazaError::Parse {
            context: format!("/{}", segments.join("/")),
            source,
        })
    }

    /// 打开二进制资源的下载流
    ///
    /// 资源通常托管在 CDN 上，这里不会带上 Authorization 头。
    /// 错误状态码与 API 请求使用同样的归类方式。
    #[instrument(level = "debug", skip(self), fields(url = %url))]
    pub async fn open_binary(&self, url: Url) -> Result<reqwest::Response> {
        let response = self.client.get(url).send().await.map_err(classify_send_error)?;
        check_status(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport(base: &str) -> Transport {
        let config = ClientConfig::new("key").unwrap().with_base_url(base).unwrap();
        Transport::new(config).unwrap()
    }

    #[test]
    fn endpoint_appends_segments() {
        let t = transport("https://api.wallaza.com/v1");
        let url = t.endpoint(&["wallpapers", "search"]).unwrap();
        assert_eq!(url.as_str(), "https://api.wallaza.com/v1/wallpapers/search");
    }

    #[test]
    fn endpoint_tolerates_trailing_slash() {
        let t = transport("https://api.wallaza.com/v1/");
        let url = t.endpoint(&["wallpapers"]).unwrap();
        assert_eq!(url.as_str(), "https://api.wallaza.com/v1/wallpapers");
    }

    #[test]
    fn endpoint_encodes_ids() {
        let t = transport("https://api.wallaza.com/v1");
        let url = t.endpoint(&["wallpapers", "../admin"]).unwrap();
        assert_eq!(url.path(), "/v1/wallpapers/..%2Fadmin");
    }

    #[test]
    fn resolve_keeps_absolute_urls() {
        let t = transport("https://api.wallaza.com/v1");
        let url = t.resolve("https://cdn.wallaza.com/full/abc.jpg").unwrap();
        assert_eq!(url.host_str(), Some("cdn.wallaza.com"));
    }

    #[test]
    fn resolve_joins_relative_urls() {
        let t = transport("https://api.wallaza.com/v1");
        let url = t.resolve("/files/abc.jpg").unwrap();
        assert_eq!(url.as_str(), "https://api.wallaza.com/files/abc.jpg");
    }

    #[test]
    fn bearer_header_is_sensitive() {
        let t = transport("https://api.wallaza.com/v1");
        let value = t.bearer().unwrap();
        assert!(value.is_sensitive());
        assert_eq!(value.to_str().unwrap(), "Bearer key");
    }
}
