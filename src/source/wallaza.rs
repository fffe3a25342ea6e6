// wallaza.rs — Wallaza API 异步客户端模块
// 负责与 Wallaza API 交互：列出、搜索、查询壁纸，以及下载原图

use super::{DownloadRequest, ListQuery, ListResponse, SearchQuery, Wallpaper, WallpaperSource};
use crate::config::ClientConfig;
use crate::download;
use crate::error::{Result, WallazaError};
use crate::transport::Transport;
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::{debug, info, instrument};

/// Wallaza API 异步客户端
///
/// 只持有不可变的配置和 HTTP 连接池，没有任何可变状态，
/// clone 之后可以在多个任务中并发使用。
#[derive(Debug, Clone)]
pub struct WallazaClient {
    transport: Transport,
}

impl WallazaClient {
    /// 创建新的 Wallaza 客户端
    pub fn new(config: ClientConfig) -> Result<Self> {
        Ok(Self {
            transport: Transport::new(config)?,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        self.transport.config()
    }
}

/// 空 ID 或 "."、".." 会让请求落到别的路径上，直接拒绝
fn check_id(id: &str) -> Result<&str> {
    let trimmed = id.trim();
    if trimmed.is_empty() || trimmed == "." || trimmed == ".." {
        return Err(WallazaError::setup(format!("invalid wallpaper id {id:?}")));
    }
    Ok(trimmed)
}

#[async_trait]
impl WallpaperSource for WallazaClient {
    #[instrument(skip(self))]
    async fn list_wallpapers(&self, query: &ListQuery) -> Result<Vec<Wallpaper>> {
        let params = query.params()?;
        let response: ListResponse = self.transport.get_json(&["wallpapers"], &params).await?;
        debug!(count = response.data.len(), "listed wallpapers");
        Ok(response.data)
    }

    #[instrument(skip(self))]
    async fn search_wallpapers(&self, query: &SearchQuery) -> Result<Vec<Wallpaper>> {
        let params = query.params()?;
        let response: ListResponse = self
            .transport
            .get_json(&["wallpapers", "search"], &params)
            .await?;
        debug!(count = response.data.len(), "search finished");
        Ok(response.data)
    }

    #[instrument(skip(self))]
    async fn get_wallpaper(&self, id: &str) -> Result<Wallpaper> {
        let id = check_id(id)?;
        self.transport.get_json(&["wallpapers", id], &[]).await
    }

    #[instrument(skip(self, request), fields(id = %request.wallpaper_id, dest = %request.destination.display()))]
    async fn download_wallpaper(&self, request: &DownloadRequest) -> Result<PathBuf> {
        // 第一步：查询元数据，拿到原图地址
        let wallpaper = self.get_wallpaper(&request.wallpaper_id).await?;

        let source = self
            .transport
            .resolve(&wallpaper.url)
            .map_err(|e| WallazaError::setup(format!("wallpaper {} has an invalid url {:?}: {e}", wallpaper.id, wallpaper.url)))?;

        // 第二步：流式写入目标文件
        let bytes = download::fetch_to_path(&self.transport, source, &request.destination).await?;

        info!(bytes, "wallpaper saved");
        Ok(request.destination.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_and_dot_ids_are_rejected() {
        for id in ["", "  ", ".", ".."] {
            assert!(matches!(check_id(id), Err(WallazaError::RequestSetup { .. })), "{id:?}");
        }
        assert_eq!(check_id(" w42 ").unwrap(), "w42");
    }
}
