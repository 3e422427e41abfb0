//! Default configuration values

/// Default configuration file name (TOML)
pub const DEFAULT_CONFIG_TOML: &str = "liftoff.toml";

/// Default configuration file name (YAML)
pub const DEFAULT_CONFIG_YAML: &str = "liftoff.yaml";

/// Releases API base URL
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Namespace prefix of tag refs
pub const DEFAULT_TAG_REF_PREFIX: &str = "refs/tags/";

/// Artifact name prefix marking release assets
pub const DEFAULT_ASSET_PREFIX: &str = "release_";

/// Installer and package formats uploaded under the extension policy
pub const DEFAULT_ASSET_EXTENSIONS: &[&str] = &[
    ".deb",
    ".rpm",
    ".exe",
    ".msi",
    ".pkg.tar.zst",
    ".apk",
    ".appx",
    ".AppImage",
    ".snap",
];

/// Directory a download step stages artifacts into
pub const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";

/// Parallel asset uploads
pub const DEFAULT_UPLOAD_CONCURRENCY: usize = 4;

/// Per-request timeout for API calls
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Get list of config file names to search for
pub fn config_file_names() -> Vec<&'static str> {
    vec![
        DEFAULT_CONFIG_TOML,
        DEFAULT_CONFIG_YAML,
        ".liftoff.toml",
        ".liftoff.yaml",
    ]
}
