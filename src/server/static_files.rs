use crate::server::http::HttpResponse;
use std::path::{Component, Path, PathBuf};

const INDEX_FILE: &str = "index.html";

pub fn content_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("html") | Some("htm") => "text/html; charset=utf-8",
        Some("js") | Some("mjs") => "text/javascript; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("json") | Some("map") => "application/json",
        Some("txt") => "text/plain; charset=utf-8",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("ico") => "image/x-icon",
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        _ => "application/octet-stream",
    }
}

/// Maps a request path onto the static root. Paths that would escape the
/// root resolve to `None`.
pub fn resolve(root: &Path, request_path: &str) -> Option<PathBuf> {
    let relative = Path::new(request_path.trim_start_matches('/'));
    let mut resolved = root.to_path_buf();

    for component in relative.components() {
        match component {
            Component::Normal(part) => resolved.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    Some(resolved)
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}

async fn read(path: &Path) -> Option<HttpResponse> {
    match tokio::fs::read(path).await {
        Ok(body) => Some(HttpResponse::new(200, content_type(path), body)),
        Err(e) => {
            tracing::warn!("Failed to read {}: {}", path.display(), e);
            None
        }
    }
}

/// 找不到的路徑一律回傳 index.html，交給前端路由處理
pub async fn serve(root: &Path, request_path: &str) -> HttpResponse {
    if let Some(path) = resolve(root, request_path) {
        if path != root && is_file(&path).await {
            if let Some(response) = read(&path).await {
                return response;
            }
        }
    }

    let index = root.join(INDEX_FILE);
    if is_file(&index).await {
        if let Some(response) = read(&index).await {
            return response;
        }
    }

    HttpResponse::error(404, "not_found", "Frontend bundle not found")
}
