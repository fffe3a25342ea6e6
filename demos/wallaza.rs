// demos/wallaza.rs — Wallaza 客户端使用示例
// 获取自然类壁纸、搜索 4K 山景壁纸，并下载第一张搜索结果
//
// 运行：
//   WALLAZA_API_KEY=xxx cargo run --example wallaza
//   cargo run --example wallaza -- path/to/config.toml
//
// 日志级别通过 RUST_LOG 控制，例如 RUST_LOG=wallaza=debug

// 初始化多语言支持，嵌入 locales 目录下的所有翻译
rust_i18n::i18n!("locales", fallback = "en");

use rust_i18n::t; // 引入翻译宏
use std::path::PathBuf;
use wallaza::{ClientConfig, DownloadRequest, ListQuery, SearchQuery, WallazaClient, WallazaError, WallpaperSource};

#[tokio::main]
async fn main() {
    // 自动检测系统语言并设置
    let locale = std::env::var("LANG").unwrap_or_else(|_| "en".to_string());
    if locale.starts_with("zh") {
        rust_i18n::set_locale("zh-CN");
    } else {
        rust_i18n::set_locale("en");
    }

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(err) = run().await {
        eprintln!("{}", t!("error", message => err.to_string()));
        match &err {
            WallazaError::Unauthorized => eprintln!("{}", t!("hint_api_key")),
            WallazaError::RateLimited {
                retry_after: Some(after),
            } => eprintln!("{}", t!("hint_retry_later", after => after)),
            _ => {}
        }
        std::process::exit(1);
    }
}

/// 配置来源：命令行给出的 TOML 文件优先，否则读取 WALLAZA_API_KEY
fn load_config() -> Result<ClientConfig, WallazaError> {
    if let Some(path) = std::env::args().nth(1) {
        let content = std::fs::read_to_string(&path).map_err(|source| WallazaError::Io {
            path: PathBuf::from(&path),
            source,
        })?;
        return ClientConfig::from_toml_str(&content);
    }

    let api_key = std::env::var("WALLAZA_API_KEY").unwrap_or_else(|_| "YOUR_API_KEY".to_string());
    ClientConfig::new(api_key)
}

async fn run() -> Result<(), WallazaError> {
    let client = WallazaClient::new(load_config()?)?;

    println!("{}", t!("fetching_nature"));
    let nature = client
        .list_wallpapers(&ListQuery::default().category("Nature").limit(5))
        .await?;
    println!("{}", t!("found_nature", count => nature.len()));
    for wallpaper in &nature {
        println!(
            "{}",
            t!("wallpaper_line", title => wallpaper.title, res => wallpaper.resolution)
        );
    }

    println!("\n{}", t!("searching_mountain"));
    let query = SearchQuery::new("mountain").resolution("3840x2160".parse()?);
    let mountains = client.search_wallpapers(&query).await?;
    println!("{}", t!("found_mountain", count => mountains.len()));

    if let Some(wallpaper) = mountains.first() {
        println!("\n{}", t!("downloading", title => wallpaper.title));

        let file_path = PathBuf::from("downloads").join(format!("{}.jpg", wallpaper.id));
        let saved = client
            .download_wallpaper(&DownloadRequest::new(&wallpaper.id, &file_path))
            .await?;
        println!("{}", t!("saved_to", path => saved.display()));
    }

    Ok(())
}
