//! Content types for release assets

use std::path::Path;

/// Fallback for anything not in the table
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Look up a content type from the file extension
pub fn lookup(path: &Path) -> &'static str {
    let ext = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => ext.to_ascii_lowercase(),
        None => return OCTET_STREAM,
    };

    match ext.as_str() {
        "deb" => "application/vnd.debian.binary-package",
        "rpm" => "application/x-rpm",
        "exe" | "msi" | "dll" => "application/x-msdownload",
        "apk" => "application/vnd.android.package-archive",
        "appx" | "msix" => "application/appx",
        "dmg" => "application/x-apple-diskimage",
        "zip" => "application/zip",
        "gz" | "tgz" => "application/gzip",
        "tar" => "application/x-tar",
        "xz" => "application/x-xz",
        "bz2" => "application/x-bzip2",
        "zst" => "application/zstd",
        "7z" => "application/x-7z-compressed",
        "jar" => "application/java-archive",
        "json" => "application/json",
        "pdf" => "application/pdf",
        "sig" | "asc" => "application/pgp-signature",
        "txt" | "sha256" | "sha512" => "text/plain",
        "md" => "text/markdown",
        "html" | "htm" => "text/html",
        "png" => "image/png",
        "svg" => "image/svg+xml",
        _ => OCTET_STREAM,
    }
}
