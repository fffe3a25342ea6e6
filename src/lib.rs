// lib.rs — crate 入口
// Wallaza 壁纸 API 的异步客户端：列出、搜索、查询壁纸元数据，并流式下载原图

pub mod config;
pub mod download;
pub mod error;
pub mod source;
pub mod transport;

pub use config::{ClientConfig, DEFAULT_BASE_URL};
pub use error::{Result, WallazaError};
pub use source::wallaza::WallazaClient;
pub use source::{DownloadRequest, ListQuery, Resolution, SearchQuery, Wallpaper, WallpaperSource};
