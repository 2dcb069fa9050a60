// Constants module for shared string constants

pub const HANGAR_API_BASE: &str = "https://hangar.papermc.io/api/v1";
pub const MODRINTH_API_BASE: &str = "https://api.modrinth.com/v2";
pub const PAPERMC_API_BASE: &str = "https://api.papermc.io/v2";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const USER_AGENT: &str = concat!("scaf/", env!("CARGO_PKG_VERSION"));

pub const DEFAULT_MANIFEST_FILE: &str = "plugins.yaml";
pub const DEFAULT_CONFIG_FILE: &str = "scaf.toml";

/// Source identifiers as they appear in manifests and resolved artifacts.
pub const SOURCE_HANGAR: &str = "hangar";
pub const SOURCE_MODRINTH: &str = "modrinth";
pub const SOURCE_PAPERMC: &str = "papermc";
pub const SOURCE_S3: &str = "s3";
pub const SOURCE_URL: &str = "url";

pub const DEFAULT_HANGAR_PLATFORM: &str = "VELOCITY";
pub const DEFAULT_MODRINTH_LOADER: &str = "velocity";
pub const DEFAULT_PAPERMC_PROJECT: &str = "velocity";

/// Hangar returns at most this many versions per page.
pub const HANGAR_PAGE_LIMIT: usize = 100;

pub const LATEST: &str = "latest";
pub const UNKNOWN_VERSION: &str = "unknown";
pub const VERSION_PLACEHOLDER: &str = "${version}";
