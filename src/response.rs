//! Response assembly
//!
//! Picks the content type from the file name, runs the link rewriter over
//! markup, stylesheets and scripts, and passes everything else through.

use std::path::Path;

use axum::{
    body::Body,
    http::{header, StatusCode},
    response::Response,
};
use tokio_util::io::ReaderStream;

use crate::error::{AppError, Result};
use crate::html::{rewrite_bytes, RewriteBase};

/// Content type used when the extension is unknown
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Content types whose bodies may hold relative references
pub const REWRITE_ELIGIBLE: [&str; 5] = [
    "text/html",
    "application/xhtml+xml",
    "text/css",
    "application/javascript",
    "text/javascript",
];

/// Guess a content type from a file or entry name
pub fn content_type_for(name: &str) -> String {
    mime_guess::from_path(name)
        .first()
        .map(|mime| mime.essence_str().to_string())
        .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string())
}

pub fn is_rewrite_eligible(content_type: &str) -> bool {
    REWRITE_ELIGIBLE.contains(&content_type)
}

/// Respond with the bytes of an archive entry
pub fn archive_entry_response(entry: &str, data: Vec<u8>, base: &RewriteBase) -> Result<Response> {
    let content_type = content_type_for(entry);

    if is_rewrite_eligible(&content_type) {
        let body = rewrite_bytes(&data, base)?;
        return build(text_content_type(&content_type), Some(body.len() as u64), Body::from(body));
    }

    let len = data.len() as u64;
    build(content_type, Some(len), Body::from(data))
}

/// Respond with a file from disk
///
/// Text content is read fully and rewritten; anything else is streamed.
pub async fn disk_file_response(path: &Path, base: &RewriteBase) -> Result<Response> {
    let content_type = content_type_for(&path.to_string_lossy());

    if is_rewrite_eligible(&content_type) {
        let data = tokio::fs::read(path).await?;
        let body = rewrite_bytes(&data, base)?;
        return build(text_content_type(&content_type), Some(body.len() as u64), Body::from(body));
    }

    let file = tokio::fs::File::open(path).await?;
    let len = file.metadata().await.ok().map(|metadata| metadata.len());
    let body = Body::from_stream(ReaderStream::new(file));

    build(content_type, len, body)
}

/// Rewritten bodies are always UTF-8
fn text_content_type(content_type: &str) -> String {
    if content_type.starts_with("text/") {
        format!("{}; charset=utf-8", content_type)
    } else {
        content_type.to_string()
    }
}

fn build(content_type: String, len: Option<u64>, body: Body) -> Result<Response> {
    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type);

    if let Some(len) = len {
        builder = builder.header(header::CONTENT_LENGTH, len);
    }

    builder
        .body(body)
        .map_err(|e| AppError::Processing(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("Text/ch1.html"), "text/html");
        assert_eq!(content_type_for("Text/ch1.xhtml"), "application/xhtml+xml");
        assert_eq!(content_type_for("Styles/main.css"), "text/css");
        assert_eq!(content_type_for("Images/cover.png"), "image/png");
        assert_eq!(content_type_for("mimetype"), DEFAULT_CONTENT_TYPE);
        assert_eq!(content_type_for("data.unknownext"), DEFAULT_CONTENT_TYPE);
    }

    #[test]
    fn test_rewrite_eligibility() {
        assert!(is_rewrite_eligible(&content_type_for("a.html")));
        assert!(is_rewrite_eligible(&content_type_for("a.xhtml")));
        assert!(is_rewrite_eligible(&content_type_for("a.css")));
        assert!(is_rewrite_eligible(&content_type_for("a.js")));
        assert!(!is_rewrite_eligible(&content_type_for("a.png")));
        assert!(!is_rewrite_eligible(&content_type_for("a.ttf")));
    }

    #[tokio::test]
    async fn test_archive_markup_is_rewritten() {
        let base = RewriteBase::archive("h", "book.epub");
        let data = br#"<img src="../Images/a.png"/>"#.to_vec();

        let response = archive_entry_response("OEBPS/Text/ch1.html", data, &base).unwrap();
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/html; charset=utf-8"
        );
        assert_eq!(
            body_string(response).await,
            r#"<img src="http://h/book.epub/Images/a.png"/>"#
        );
    }

    #[tokio::test]
    async fn test_archive_binary_passes_through() {
        let base = RewriteBase::archive("h", "book.epub");
        let data = b"src=\"../x\" \xff\xfe".to_vec();

        let response = archive_entry_response("OEBPS/Images/a.png", data.clone(), &base).unwrap();
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(bytes.to_vec(), data);
    }

    #[tokio::test]
    async fn test_disk_file_response() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let page = temp_dir.path().join("page.html");
        let image = temp_dir.path().join("pic.bin");
        std::fs::write(&page, r#"<a href="../up.html">up</a>"#).unwrap();
        std::fs::write(&image, [0u8, 1, 2, 3]).unwrap();

        let base = RewriteBase::plain("h", "/site/chap1/page.html");
        let response = disk_file_response(&page, &base).await.unwrap();
        assert_eq!(
            body_string(response).await,
            r#"<a href="http://h/site/up.html">up</a>"#
        );

        let response = disk_file_response(&image, &base).await.unwrap();
        assert_eq!(response.headers()[header::CONTENT_TYPE], DEFAULT_CONTENT_TYPE);
        assert_eq!(response.headers()[header::CONTENT_LENGTH], "4");
    }
}
