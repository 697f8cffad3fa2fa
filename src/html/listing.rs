//! Directory listing pages
//!
//! Archive listings are derived from entry names (zip containers rarely
//! store directories) and render subdirectories before files. On-disk
//! listings come from `read_dir` and sort everything together by name.

use std::collections::BTreeSet;
use std::path::Path;

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::error::{AppError, Result};

/// A child of a listed directory
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ListingEntry {
    pub name: String,
    pub is_dir: bool,
}

/// Immediate children of `anchor` inside an archive
///
/// Returns `(directories, files)`, each sorted and deduplicated.
pub fn archive_children(entries: &[String], anchor: &str) -> (Vec<String>, Vec<String>) {
    let anchor = anchor.trim_end_matches('/');
    let prefix = if anchor.is_empty() {
        String::new()
    } else {
        format!("{}/", anchor)
    };

    let mut dirs = BTreeSet::new();
    let mut files = BTreeSet::new();

    for rest in entries.iter().filter_map(|name| name.strip_prefix(prefix.as_str())) {
        match rest.split_once('/') {
            Some((head, _)) if !head.is_empty() => {
                dirs.insert(head.to_string());
            }
            Some(_) => {}
            None if !rest.is_empty() => {
                files.insert(rest.to_string());
            }
            None => {}
        }
    }

    (dirs.into_iter().collect(), files.into_iter().collect())
}

/// Render the listing of an archive directory
///
/// Links are relative to the listing URL, which always ends in '/'. The
/// parent link is omitted at the package root.
pub fn render_archive_listing(
    entries: &[String],
    anchor: &str,
    package_root: &str,
    request_path: &str,
) -> String {
    let (dirs, files) = archive_children(entries, anchor);
    let at_root = anchor.trim_end_matches('/') == package_root.trim_end_matches('/');

    let links = dirs
        .iter()
        .map(|dir| (format!("{}/", urlencoding::encode(dir)), format!("{}/", dir)))
        .chain(
            files
                .iter()
                .map(|file| (urlencoding::encode(file).into_owned(), file.clone())),
        );

    render_page(request_path, (!at_root).then_some("../"), links)
}

/// Read the children of an on-disk directory, sorted by name
pub async fn disk_children(dir: &Path) -> Result<Vec<ListingEntry>> {
    let mut read_dir = tokio::fs::read_dir(dir).await.map_err(enumeration_error)?;
    let mut entries = Vec::new();

    while let Some(entry) = read_dir.next_entry().await.map_err(enumeration_error)? {
        // Follows symlinks, unlike DirEntry::file_type
        let is_dir = tokio::fs::metadata(entry.path())
            .await
            .map(|metadata| metadata.is_dir())
            .unwrap_or(false);

        entries.push(ListingEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            is_dir,
        });
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

/// A directory that vanished before enumeration is missing, not forbidden
fn enumeration_error(e: std::io::Error) -> AppError {
    match e.kind() {
        std::io::ErrorKind::NotFound => AppError::NotFound("Directory not found".to_string()),
        _ => AppError::ListingDenied(e.to_string()),
    }
}

/// Render the listing of an on-disk directory
///
/// Links are absolute paths built from `request_path`.
pub fn render_disk_listing(entries: &[ListingEntry], request_path: &str) -> String {
    let base = request_path.trim_end_matches('/');
    let at_root = base.is_empty();

    let parent = base
        .rsplit_once('/')
        .map(|(parent, _)| format!("{}/", encode_path(parent)));

    let links = entries.iter().map(|entry| {
        let suffix = if entry.is_dir { "/" } else { "" };
        (
            format!("{}/{}{}", encode_path(base), urlencoding::encode(&entry.name), suffix),
            format!("{}{}", entry.name, suffix),
        )
    });

    let parent = if at_root { None } else { parent };
    render_page(request_path, parent.as_deref(), links)
}

/// Percent-encode each segment of a '/'-separated path
pub fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn render_page<I>(request_path: &str, parent: Option<&str>, links: I) -> String
where
    I: IntoIterator<Item = (String, String)>,
{
    let title = encode_text(request_path);

    let mut html = format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>Index of {title}</title></head>\n\
         <body><h2>Index of {title}</h2><hr><ul>\n"
    );

    if let Some(parent) = parent {
        html.push_str(&format!(
            "<li><a href=\"{}\">..</a></li>\n",
            encode_double_quoted_attribute(parent)
        ));
    }

    for (href, label) in links {
        html.push_str(&format!(
            "<li><a href=\"{}\">{}</a></li>\n",
            encode_double_quoted_attribute(&href),
            encode_text(&label)
        ));
    }

    html.push_str("</ul><hr></body></html>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_archive_children_split_and_sorted() {
        let entries = names(&[
            "OEBPS/content.opf",
            "OEBPS/c.txt",
            "OEBPS/b.txt",
            "OEBPS/a/one.xhtml",
            "OEBPS/a/two.xhtml",
            "OEBPS/Images/cover.jpg",
            "META-INF/container.xml",
        ]);

        let (dirs, files) = archive_children(&entries, "OEBPS");
        assert_eq!(dirs, vec!["Images", "a"]);
        assert_eq!(files, vec!["b.txt", "c.txt", "content.opf"]);
    }

    #[test]
    fn test_archive_children_at_archive_root() {
        let entries = names(&["mimetype", "OEBPS/content.opf"]);

        let (dirs, files) = archive_children(&entries, "");
        assert_eq!(dirs, vec!["OEBPS"]);
        assert_eq!(files, vec!["mimetype"]);
    }

    #[test]
    fn test_archive_listing_directories_before_files() {
        let entries = names(&["OEBPS/content.opf", "OEBPS/b.txt", "OEBPS/a/x.xhtml", "OEBPS/c.txt"]);
        let html = render_archive_listing(&entries, "OEBPS", "OEBPS", "/book.epub/");

        let a = html.find("href=\"a/\"").unwrap();
        let b = html.find("href=\"b.txt\"").unwrap();
        let c = html.find("href=\"c.txt\"").unwrap();
        assert!(a < b && b < c);
        assert!(html.contains("<title>Index of /book.epub/</title>"));
        // Package root has no parent link
        assert!(!html.contains(">..</a>"));
    }

    #[test]
    fn test_archive_listing_parent_and_encoding() {
        let entries = names(&["OEBPS/content.opf", "OEBPS/Text/chapter one.xhtml"]);
        let html = render_archive_listing(&entries, "OEBPS/Text", "OEBPS", "/book.epub/Text/");

        assert!(html.contains("<a href=\"../\">..</a>"));
        assert!(html.contains("href=\"chapter%20one.xhtml\""));
        assert!(html.contains(">chapter one.xhtml</a>"));
    }

    #[test]
    fn test_disk_listing_merged_order() {
        let entries = vec![
            ListingEntry { name: "a".into(), is_dir: true },
            ListingEntry { name: "b.txt".into(), is_dir: false },
            ListingEntry { name: "c".into(), is_dir: true },
        ];
        let html = render_disk_listing(&entries, "/site/");

        let a = html.find("href=\"/site/a/\"").unwrap();
        let b = html.find("href=\"/site/b.txt\"").unwrap();
        let c = html.find("href=\"/site/c/\"").unwrap();
        assert!(a < b && b < c);
        assert!(html.contains("<a href=\"/\">..</a>"));
    }

    #[test]
    fn test_disk_listing_root_has_no_parent() {
        let entries = vec![ListingEntry { name: "site".into(), is_dir: true }];
        let html = render_disk_listing(&entries, "/");

        assert!(!html.contains(">..</a>"));
        assert!(html.contains("href=\"/site/\""));
    }

    #[test]
    fn test_listing_escapes_markup() {
        let html = render_disk_listing(&[], "/<script>/");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[tokio::test]
    async fn test_disk_children_sorted() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        std::fs::create_dir(temp_dir.path().join("b")).unwrap();
        std::fs::write(temp_dir.path().join("c.txt"), "").unwrap();
        std::fs::write(temp_dir.path().join("a.txt"), "").unwrap();

        let entries = disk_children(temp_dir.path()).await.unwrap();
        let names: Vec<_> = entries.iter().map(|e| (e.name.as_str(), e.is_dir)).collect();
        assert_eq!(names, vec![("a.txt", false), ("b", true), ("c.txt", false)]);
    }

    #[tokio::test]
    async fn test_disk_children_missing_dir_is_not_found() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let result = disk_children(&temp_dir.path().join("gone")).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_enumeration_error_mapping() {
        let denied = std::io::Error::from(std::io::ErrorKind::PermissionDenied);
        assert!(matches!(enumeration_error(denied), AppError::ListingDenied(_)));

        let gone = std::io::Error::from(std::io::ErrorKind::NotFound);
        assert!(matches!(enumeration_error(gone), AppError::NotFound(_)));
    }
}
