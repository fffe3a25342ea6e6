// download.rs — 原图下载模块
// 把二进制响应体一块一块写入目标文件，不会把整张图片读进内存

use crate::error::{Result, WallazaError};
use crate::transport::Transport;
use futures_util::StreamExt; // 提供 bytes_stream() 返回流上的 next()
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, warn};
use url::Url;

/// 确保目标文件的所有上级目录存在，重复调用没有副作用
pub async fn ensure_parent_dir(destination: &Path) -> Result<()> {
    match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent)
            .await
            .map_err(|e| WallazaError::io(parent, e)),
        _ => Ok(()),
    }
}

/// 下载过程中使用的临时文件：与目标文件同目录，名字后加 `.part`
fn partial_path(destination: &Path) -> Result<PathBuf> {
    let name = destination
        .file_name()
        .ok_or_else(|| WallazaError::setup(format!("destination {} has no file name", destination.display())))?;
    let mut partial = name.to_os_string();
    partial.push(".part");
    Ok(destination.with_file_name(partial))
}

/// 下载 `source` 到 `destination`，返回写入的字节数
///
/// 数据先写入同目录下的 `.part` 文件，完整写完后再改名为目标文件。
/// 失败时只删除临时文件，目标位置原有的文件保持不变。
pub(crate) async fn fetch_to_path(transport: &Transport, source: Url, destination: &Path) -> Result<u64> {
    let partial = partial_path(destination)?;
    ensure_parent_dir(destination).await?;

    // 先拿到成功的响应再创建文件，错误状态码不会留下空文件
    let response = transport.open_binary(source).await?;

    let file = File::create(&partial)
        .await
        .map_err(|e| WallazaError::io(&partial, e))?;

    let written = match stream_to_file(response, file, &partial).await {
        Ok(written) => written,
        Err(err) => {
            discard_partial(&partial).await;
            return Err(err);
        }
    };

    if let Err(e) = fs::rename(&partial, destination).await {
        discard_partial(&partial).await;
        return Err(WallazaError::io(destination, e));
    }
    Ok(written)
}

async fn stream_to_file(response: reqwest::Response, file: File, destination: &Path) -> Result<u64> {
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut written: u64 = 0;

    while let Some(chunk) = stream.next().await {
        // 传输中途断开归为 I/O 错误
        let chunk = chunk.map_err(|e| WallazaError::io(destination, std::io::Error::other(e)))?;

        writer
            .write_all(&chunk)
            .await
            .map_err(|e| WallazaError::io(destination, e))?;

        written += chunk.len() as u64;
    }

    writer
        .flush()
        .await
        .map_err(|e| WallazaError::io(destination, e))?;

    debug!(bytes = written, path = %destination.display(), "stream finished");
    Ok(written)
}

async fn discard_partial(destination: &Path) {
    if let Err(e) = fs::remove_file(destination).await {
        warn!(path = %destination.display(), error = %e, "failed to remove partial download");
    }
}
