//! Request path classification

/// Extension marking a path segment as an EPUB archive (case-insensitive)
pub const ARCHIVE_EXTENSION: &str = ".epub";

/// Where a request path points
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestTarget {
    /// Inside an archive: `archive_path` is the file on disk relative to the
    /// serve root, `inner_path` is relative to the archive's package root
    Archive {
        archive_path: String,
        inner_path: String,
    },
    /// A plain file or directory below the serve root
    Plain { path: String },
}

impl RequestTarget {
    /// Classify a decoded request path (leading '/' optional)
    ///
    /// The first segment ending in `.epub` is the archive boundary; anything
    /// after it is looked up inside the archive.
    pub fn parse(path: &str) -> Self {
        let path = path.trim_start_matches('/');
        let segments: Vec<&str> = path.split('/').collect();

        let boundary = segments
            .iter()
            .position(|segment| segment.to_lowercase().ends_with(ARCHIVE_EXTENSION));

        match boundary {
            Some(index) => RequestTarget::Archive {
                archive_path: segments[..=index].join("/"),
                inner_path: segments[index + 1..].join("/"),
            },
            None => RequestTarget::Plain {
                path: path.to_string(),
            },
        }
    }
}

/// Whether the path tries to climb out of its root
pub fn has_traversal(path: &str) -> bool {
    path.split(['/', '\\']).any(|segment| segment == "..")
}

/// Join two '/'-separated paths, ignoring empty parts and stray slashes
pub fn join_virtual(base: &str, relative: &str) -> String {
    let base = base.trim_end_matches('/');
    let relative = relative.trim_matches('/');

    match (base.is_empty(), relative.is_empty()) {
        (_, true) => base.to_string(),
        (true, false) => relative.to_string(),
        (false, false) => format!("{}/{}", base, relative),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_archive_target() {
        assert_eq!(
            RequestTarget::parse("/library/Book.EPUB/Text/ch1.xhtml"),
            RequestTarget::Archive {
                archive_path: "library/Book.EPUB".to_string(),
                inner_path: "Text/ch1.xhtml".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_archive_root() {
        let expected = RequestTarget::Archive {
            archive_path: "book.epub".to_string(),
            inner_path: String::new(),
        };
        assert_eq!(RequestTarget::parse("/book.epub"), expected);
        assert_eq!(RequestTarget::parse("/book.epub/"), expected);
    }

    #[test]
    fn test_first_archive_segment_wins() {
        assert_eq!(
            RequestTarget::parse("a.epub/b.epub/c"),
            RequestTarget::Archive {
                archive_path: "a.epub".to_string(),
                inner_path: "b.epub/c".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_plain_target() {
        assert_eq!(
            RequestTarget::parse("/site/chap1/page.html"),
            RequestTarget::Plain {
                path: "site/chap1/page.html".to_string()
            }
        );
        assert_eq!(
            RequestTarget::parse("/"),
            RequestTarget::Plain {
                path: String::new()
            }
        );
        // Only a suffix counts
        assert!(matches!(
            RequestTarget::parse("/epub-notes/x.epub.txt"),
            RequestTarget::Plain { .. }
        ));
    }

    #[test]
    fn test_has_traversal() {
        assert!(has_traversal("../etc/passwd"));
        assert!(has_traversal("book.epub/../../x"));
        assert!(has_traversal("a\\..\\b"));
        assert!(!has_traversal("a/..b/c.."));
        assert!(!has_traversal(""));
    }

    #[test]
    fn test_join_virtual() {
        assert_eq!(join_virtual("", ""), "");
        assert_eq!(join_virtual("OEBPS", ""), "OEBPS");
        assert_eq!(join_virtual("", "Text/ch1.xhtml"), "Text/ch1.xhtml");
        assert_eq!(join_virtual("OEBPS", "Text/"), "OEBPS/Text");
        assert_eq!(join_virtual("OEBPS/", "/index.html"), "OEBPS/index.html");
    }
}
