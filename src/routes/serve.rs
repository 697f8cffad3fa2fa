//! Wildcard file serving route
//!
//! Serves the serve root as a browsable site. Any path segment ending in
//! `.epub` switches to the archive's virtual filesystem, rooted at the
//! directory holding its `content.opf`.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use axum::{
    extract::{ConnectInfo, State},
    http::{header, HeaderMap, Uri},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Router,
};

use crate::archive::EpubArchive;
use crate::error::{AppError, Result};
use crate::html::{disk_children, render_archive_listing, render_disk_listing, RewriteBase};
use crate::response::{archive_entry_response, disk_file_response};
use crate::state::AppState;
use crate::vfs::{has_traversal, resolve_archive_path, resolve_disk_path, RequestTarget, Resolution};

/// Create the serving router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(serve))
        .route("/*path", get(serve))
}

/// A decoded inbound request
struct ServeRequest {
    /// Path as received, still percent-encoded
    raw_path: String,
    /// Percent-decoded path, starting with '/'
    path: String,
    /// Authority used for absolute URLs
    host: String,
}

impl ServeRequest {
    fn trailing_slash(&self) -> bool {
        self.path.ends_with('/')
    }

    /// Redirect to the same path with a trailing slash
    fn redirect_to_directory(&self) -> Response {
        Redirect::temporary(&format!("{}/", self.raw_path)).into_response()
    }
}

/// Result of the blocking part of an archive request
enum ArchiveOutcome {
    Redirect,
    Listing(String),
    File { entry: String, data: Vec<u8> },
}

async fn serve(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    uri: Uri,
) -> Result<Response> {
    let raw_path = uri.path().to_string();
    let path = urlencoding::decode(&raw_path)
        .map_err(|_| AppError::NotFound("File not found".to_string()))?
        .into_owned();

    if has_traversal(&path) {
        return Err(AppError::NotFound("File not found".to_string()));
    }

    let peer = connect_info.map(|ConnectInfo(addr)| addr);
    let host = request_host(&headers, &uri, peer, state.config().server.port);
    let request = ServeRequest {
        raw_path,
        path,
        host,
    };

    match RequestTarget::parse(&request.path) {
        RequestTarget::Archive {
            archive_path,
            inner_path,
        } => serve_archive(&state, &request, archive_path, inner_path).await,
        RequestTarget::Plain { path } => serve_disk(&state, &request, &path).await,
    }
}

/// Serve a path inside an EPUB archive
async fn serve_archive(
    state: &AppState,
    request: &ServeRequest,
    archive_path: String,
    inner_path: String,
) -> Result<Response> {
    let archive_file = state.serve_root().join(&archive_path);
    let cache = state.root_cache().clone();
    let trailing_slash = request.trailing_slash();
    let display_path = request.path.clone();

    let outcome = tokio::task::spawn_blocking(move || -> Result<ArchiveOutcome> {
        let mut archive = EpubArchive::open(&archive_file)?;
        let package_root = cache.package_root(&archive_file, &archive)?;

        match resolve_archive_path(&archive, &package_root, &inner_path, trailing_slash)? {
            Resolution::Redirect => Ok(ArchiveOutcome::Redirect),
            Resolution::Listing(anchor) => Ok(ArchiveOutcome::Listing(render_archive_listing(
                archive.entries(),
                &anchor,
                &package_root,
                &display_path,
            ))),
            Resolution::File(entry) => {
                let data = archive.read(&entry)?;
                Ok(ArchiveOutcome::File { entry, data })
            }
        }
    })
    .await
    .map_err(|e| AppError::Processing(format!("Task join error: {}", e)))??;

    match outcome {
        ArchiveOutcome::Redirect => Ok(request.redirect_to_directory()),
        ArchiveOutcome::Listing(html) => Ok(Html(html).into_response()),
        ArchiveOutcome::File { entry, data } => {
            tracing::debug!("Serving {} from {}", entry, archive_path);
            let base = RewriteBase::archive(request.host.as_str(), archive_path);
            archive_entry_response(&entry, data, &base)
        }
    }
}

/// Serve a path from the serve root on disk
async fn serve_disk(state: &AppState, request: &ServeRequest, path: &str) -> Result<Response> {
    match resolve_disk_path(state.serve_root(), path, request.trailing_slash()).await? {
        Resolution::Redirect => Ok(request.redirect_to_directory()),
        Resolution::Listing(dir) => {
            let entries = disk_children(&dir).await?;
            Ok(Html(render_disk_listing(&entries, &request.path)).into_response())
        }
        Resolution::File(file) => {
            let base = RewriteBase::plain(request.host.as_str(), request.path.as_str());
            disk_file_response(&file, &base).await
        }
    }
}

/// Authority for rewritten URLs
///
/// Prefers the `Host` header, then the request URI, then the client address
/// paired with the server port.
fn request_host(headers: &HeaderMap, uri: &Uri, peer: Option<SocketAddr>, port: u16) -> String {
    headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .filter(|host| !host.is_empty())
        .map(str::to_owned)
        .or_else(|| uri.authority().map(|authority| authority.to_string()))
        .unwrap_or_else(|| {
            let ip = peer
                .map(|addr| addr.ip())
                .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST));
            SocketAddr::new(ip, port).to_string()
        })
}
