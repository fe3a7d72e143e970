//! Per-file upload policy resolution.
//!
//! Maps a file path to the headers it should be uploaded with:
//! content type (by extension), whether to gzip it, and which
//! cache-control tier applies. Everything here is pure and
//! deterministic so the deploy pipeline stays testable.

use std::path::Path;

/// Cache directive for content-hashed files under an assets directory.
pub const CACHE_IMMUTABLE: &str = "public, max-age=31536000, immutable";

/// Cache directive for HTML documents (short-lived, re-fetched hourly).
pub const CACHE_HTML: &str = "public, max-age=3600";

/// Default cache directive for everything else.
pub const CACHE_DEFAULT: &str = "public, max-age=86400";

/// Resolved upload policy for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePolicy {
    pub content_type: &'static str,
    pub compress: bool,
    pub cache_control: &'static str,
}

/// Resolves the full policy for a local file destined for `remote_key`.
pub fn resolve(path: &Path, remote_key: &str) -> FilePolicy {
    FilePolicy {
        content_type: content_type(path),
        compress: should_compress(path),
        cache_control: cache_control(remote_key),
    }
}

/// Returns the MIME type for a file based on its extension.
///
/// Unknown extensions map to `application/octet-stream`.
pub fn content_type(path: &Path) -> &'static str {
    match extension(path).as_deref() {
        Some("html") | Some("htm") => "text/html",
        Some("css") => "text/css",
        Some("js") | Some("mjs") => "application/javascript",
        Some("json") => "application/json",
        Some("xml") => "application/xml",
        Some("txt") => "text/plain",
        Some("md") => "text/markdown",
        Some("svg") => "image/svg+xml",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("ico") => "image/x-icon",
        Some("pdf") => "application/pdf",
        Some("zip") => "application/zip",
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",
        Some("otf") => "font/otf",
        Some("eot") => "application/vnd.ms-fontobject",
        _ => "application/octet-stream",
    }
}

/// Whether a file is worth gzipping before upload.
///
/// Text-based payloads compress well; images and fonts are already
/// compressed and are sent as-is.
pub fn should_compress(path: &Path) -> bool {
    const COMPRESS_EXTENSIONS: &[&str] = &[
        "html", "htm", "css", "js", "mjs", "json", "xml", "txt", "md", "svg",
    ];
    const COMPRESS_TYPES: &[&str] = &[
        "application/javascript",
        "application/json",
        "application/xml",
        "image/svg+xml",
    ];

    if let Some(ext) = extension(path)
        && COMPRESS_EXTENSIONS.contains(&ext.as_str())
    {
        return true;
    }

    let ct = content_type(path);
    ct.starts_with("text/") || COMPRESS_TYPES.contains(&ct)
}

/// Returns the cache-control directive for a remote key.
///
/// Three tiers, in precedence order:
/// 1. Content-hashed assets (an `assets/` path segment plus a hyphen
///    or dot in the key) are immutable and cached for a year. This
///    wins even for `.html` keys under `assets/`.
/// 2. HTML documents get a short TTL so deploys propagate quickly.
/// 3. Everything else gets a one-day default.
pub fn cache_control(remote_key: &str) -> &'static str {
    if is_hashed_asset(remote_key) {
        CACHE_IMMUTABLE
    } else if remote_key.ends_with(".html") || remote_key == "index.html" {
        CACHE_HTML
    } else {
        CACHE_DEFAULT
    }
}

fn is_hashed_asset(remote_key: &str) -> bool {
    let in_assets = remote_key.starts_with("assets/") || remote_key.contains("/assets/");
    in_assets && (remote_key.contains('-') || remote_key.contains('.'))
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn content_type_table() {
        let cases = [
            ("index.html", "text/html"),
            ("page.htm", "text/html"),
            ("style.css", "text/css"),
            ("app.js", "application/javascript"),
            ("module.mjs", "application/javascript"),
            ("data.json", "application/json"),
            ("feed.xml", "application/xml"),
            ("notes.txt", "text/plain"),
            ("readme.md", "text/markdown"),
            ("logo.svg", "image/svg+xml"),
            ("photo.jpg", "image/jpeg"),
            ("photo.jpeg", "image/jpeg"),
            ("icon.png", "image/png"),
            ("anim.gif", "image/gif"),
            ("pic.webp", "image/webp"),
            ("favicon.ico", "image/x-icon"),
            ("doc.pdf", "application/pdf"),
            ("bundle.zip", "application/zip"),
            ("font.woff", "font/woff"),
            ("font.woff2", "font/woff2"),
            ("font.ttf", "font/ttf"),
            ("font.otf", "font/otf"),
            ("font.eot", "application/vnd.ms-fontobject"),
        ];
        for (name, expected) in cases {
            assert_eq!(content_type(Path::new(name)), expected, "for {name}");
        }
    }

    #[test]
    fn content_type_unknown_extension() {
        assert_eq!(content_type(Path::new("video.mp4")), "application/octet-stream");
        assert_eq!(content_type(Path::new("no_extension")), "application/octet-stream");
    }

    #[test]
    fn content_type_case_insensitive() {
        assert_eq!(content_type(Path::new("INDEX.HTML")), "text/html");
        assert_eq!(content_type(Path::new("App.JS")), "application/javascript");
    }

    #[test]
    fn compress_text_based_files() {
        for name in [
            "index.html", "page.htm", "style.css", "app.js", "mod.mjs", "d.json", "f.xml",
            "robots.txt", "readme.md", "logo.svg",
        ] {
            assert!(should_compress(Path::new(name)), "{name} should compress");
        }
    }

    #[test]
    fn no_compress_binary_files() {
        for name in ["icon.png", "photo.jpg", "font.woff2", "doc.pdf", "blob.bin"] {
            assert!(!should_compress(Path::new(name)), "{name} should not compress");
        }
    }

    #[test]
    fn cache_tiers() {
        assert_eq!(cache_control("assets/app-3f2a1.js"), CACHE_IMMUTABLE);
        assert_eq!(cache_control("sub/assets/chunk.css"), CACHE_IMMUTABLE);
        assert_eq!(cache_control("index.html"), CACHE_HTML);
        assert_eq!(cache_control("about/index.html"), CACHE_HTML);
        assert_eq!(cache_control("robots.txt"), CACHE_DEFAULT);
        assert_eq!(cache_control("images/photo.jpg"), CACHE_DEFAULT);
    }

    #[test]
    fn hashed_asset_wins_over_html() {
        // A .html file under assets/ is still treated as immutable:
        // the assets tier takes precedence over the html tier.
        assert_eq!(cache_control("assets/page-x.html"), CACHE_IMMUTABLE);
    }

    #[test]
    fn assets_dir_without_hash_marker() {
        // "assets/" segment alone is not enough without a hyphen or dot.
        assert_eq!(cache_control("assets/raw"), CACHE_DEFAULT);
    }

    #[test]
    fn resolve_combines_all_three() {
        let p = PathBuf::from("/build/assets/app-3f2a1.js");
        let policy = resolve(&p, "assets/app-3f2a1.js");
        assert_eq!(policy.content_type, "application/javascript");
        assert!(policy.compress);
        assert_eq!(policy.cache_control, CACHE_IMMUTABLE);
    }
}
