// source/mod.rs — 壁纸源抽象接口模块
// 定义查询参数、壁纸记录以及所有壁纸源客户端必须实现的 Trait

pub mod wallaza;

use crate::error::{Result, WallazaError};
use async_trait::async_trait; // 异步 Trait 支持宏
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// 单张壁纸的元数据
///
/// 只有 `id`、`title`、`resolution`、`url` 是必需字段，
/// 服务端返回的其他字段原样保存在 `extra` 中。
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Wallpaper {
    /// 壁纸在服务端的唯一标识
    pub id: String,
    pub title: String,
    /// 分辨率描述（如 "3840x2160"）
    pub resolution: String,
    /// 原图下载地址
    pub url: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// 列表和搜索接口的响应外层 `{ "data": [...] }`
#[derive(Debug, Deserialize)]
pub(crate) struct ListResponse {
    pub data: Vec<Wallpaper>,
}

/// 分辨率，文本形式为 "WIDTHxHEIGHT"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl FromStr for Resolution {
    type Err = WallazaError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || WallazaError::setup(format!("resolution {s:?} is not in WIDTHxHEIGHT form"));

        let (w, h) = s.trim().split_once('x').ok_or_else(invalid)?;
        let width = w.parse::<u32>().map_err(|_| invalid())?;
        let height = h.parse::<u32>().map_err(|_| invalid())?;
        if width == 0 || height == 0 {
            return Err(invalid());
        }
        Ok(Self { width, height })
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// 列表查询参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    /// 页码，从 1 开始
    pub page: u32,
    /// 每页数量
    pub limit: u32,
    /// 分类过滤（如 "Nature"），不设置或为空白时不发送
    pub category: Option<String>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 20,
            category: None,
        }
    }
}

impl ListQuery {
    pub fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// 转为查询参数列表，非法参数在这里就会被拒绝
    pub(crate) fn params(&self) -> Result<Vec<(&'static str, String)>> {
        if self.page == 0 {
            return Err(WallazaError::setup("page must be at least 1"));
        }
        if self.limit == 0 {
            return Err(WallazaError::setup("limit must be at least 1"));
        }

        let mut params = vec![("page", self.page.to_string()), ("limit", self.limit.to_string())];
        // 空字符串等同于没有设置分类
        if let Some(category) = self.category.as_deref().filter(|c| !c.trim().is_empty()) {
            params.push(("category", category.to_string()));
        }
        Ok(params)
    }
}

/// 搜索参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub query: String,
    pub resolution: Option<Resolution>,
}

impl SearchQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            resolution: None,
        }
    }

    pub fn resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = Some(resolution);
        self
    }

    pub(crate) fn params(&self) -> Result<Vec<(&'static str, String)>> {
        if self.query.trim().is_empty() {
            return Err(WallazaError::setup("search query must not be empty"));
        }

        let mut params = vec![("query", self.query.clone())];
        if let Some(resolution) = self.resolution {
            params.push(("resolution", resolution.to_string()));
        }
        Ok(params)
    }
}

/// 下载请求：要下载哪张壁纸、保存到哪里
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub wallpaper_id: String,
    /// 目标文件的完整路径，父目录不存在时会自动创建
    pub destination: PathBuf,
}

impl DownloadRequest {
    pub fn new(wallpaper_id: impl Into<String>, destination: impl AsRef<Path>) -> Self {
        Self {
            wallpaper_id: wallpaper_id.into(),
            destination: destination.as_ref().to_path_buf(),
        }
    }
}

/// 壁纸源的抽象 Trait
///
/// # 异步 Trait 说明
/// 这里使用 `async_trait` 宏来支持异步接口，
/// 这样调用方可以持有 `Box<dyn WallpaperSource + Send + Sync>`。
#[async_trait]
pub trait WallpaperSource {
    /// 分页列出壁纸
    async fn list_wallpapers(&self, query: &ListQuery) -> Result<Vec<Wallpaper>>;

    /// 按关键词（和可选分辨率）搜索壁纸
    async fn search_wallpapers(&self, query: &SearchQuery) -> Result<Vec<Wallpaper>>;

    /// 按 ID 获取单张壁纸的元数据
    async fn get_wallpaper(&self, id: &str) -> Result<Wallpaper>;

    /// 下载壁纸原图，返回保存后的完整路径
    async fn download_wallpaper(&self, request: &DownloadRequest) -> Result<PathBuf>;
}
