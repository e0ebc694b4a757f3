use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use ims_core::time::{is_valid_timezone, DEFAULT_TIMEZONE};
use ims_core::{PageSize, SiteId};
use serde::Deserialize;
use thiserror::Error;

const APP_DIR: &str = "ims";
const CONFIG_FILENAME: &str = "config.toml";

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api/";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const MAX_TIMEOUT_SECS: u64 = 600;

pub const ENV_API_URL: &str = "IMS_API_URL";
pub const ENV_API_TOKEN: &str = "IMS_API_TOKEN";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub default_timezone: String,
    pub default_page_size: PageSize,
    pub default_site_id: Option<SiteId>,
    pub api: ApiConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_timezone: DEFAULT_TIMEZONE.to_string(),
            default_page_size: PageSize::DEFAULT,
            default_site_id: None,
            api: ApiConfig {
                base_url: DEFAULT_BASE_URL.to_string(),
                token: None,
                timeout_secs: DEFAULT_TIMEOUT_SECS,
            },
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing home directory")]
    MissingHomeDir,
    #[error("invalid config path: {0}")]
    InvalidConfigPath(PathBuf),
    #[error("config file not found: {0}")]
    MissingConfigFile(PathBuf),
    #[error("config file holds an API token but is readable by others: {0}")]
    InsecurePermissions(PathBuf),
    #[error("invalid default_timezone value: {0}")]
    InvalidTimezone(String),
    #[error("invalid default_page_size value: {0} (expected one of 5, 10, 25, 50, 100)")]
    InvalidPageSize(u32),
    #[error("invalid default_site_id value: {0}")]
    InvalidSiteId(i64),
    #[error("invalid api.base_url value: {0} (expected http:// or https://)")]
    InvalidBaseUrl(String),
    #[error("invalid api.timeout_secs value: {0}")]
    InvalidTimeout(u64),
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    default_timezone: Option<String>,
    default_page_size: Option<u32>,
    default_site_id: Option<i64>,
    api: Option<ApiFile>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ApiFile {
    base_url: Option<String>,
    token: Option<String>,
    timeout_secs: Option<u64>,
}

/// Loads the config file (explicit path, or the XDG default) and applies
/// `IMS_API_URL` / `IMS_API_TOKEN` on top.
pub fn load(config_path: Option<PathBuf>) -> Result<AppConfig> {
    let config = load_file(config_path)?;
    apply_env(config, |key| env::var(key).ok())
}

pub fn load_file(config_path: Option<PathBuf>) -> Result<AppConfig> {
    let required = config_path.is_some();
    let path = match resolve_config_path(config_path) {
        Ok(path) => path,
        Err(ConfigError::MissingHomeDir) if !required => return Ok(AppConfig::default()),
        Err(ConfigError::InvalidConfigPath(_)) if !required => return Ok(AppConfig::default()),
        Err(err) => return Err(err),
    };
    match load_at_path(&path, required)? {
        Some(config) => Ok(config),
        None => Ok(AppConfig::default()),
    }
}

pub fn resolve_config_path(custom: Option<PathBuf>) -> Result<PathBuf> {
    match custom {
        Some(path) => {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::InvalidConfigPath(path));
            }
            Ok(path)
        }
        None => {
            let base = if let Some(dir) = env::var_os("XDG_CONFIG_HOME") {
                let path = PathBuf::from(dir);
                if path.as_os_str().is_empty() {
                    return Err(ConfigError::InvalidConfigPath(path));
                }
                path
            } else {
                let home = dirs::home_dir().ok_or(ConfigError::MissingHomeDir)?;
                home.join(".config")
            };
            Ok(base.join(APP_DIR).join(CONFIG_FILENAME))
        }
    }
}

/// Environment values win over the file. Blank values are ignored.
pub fn apply_env<F>(mut config: AppConfig, lookup: F) -> Result<AppConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
    if let Some(url) = read(ENV_API_URL) {
        config.api.base_url = validate_base_url(url)?;
    }
    if let Some(token) = read(ENV_API_TOKEN) {
        config.api.token = Some(token.trim().to_string());
    }
    Ok(config)
}

fn load_at_path(path: &Path, required: bool) -> Result<Option<AppConfig>> {
    if !path.exists() {
        if required {
            return Err(ConfigError::MissingConfigFile(path.to_path_buf()));
        }
        return Ok(None);
    }

    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: ConfigFile = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    let has_token = parsed
        .api
        .as_ref()
        .and_then(|api| api.token.as_ref())
        .is_some();
    if has_token {
        ensure_permissions(path)?;
    }
    Ok(Some(merge_config(parsed)?))
}

fn merge_config(parsed: ConfigFile) -> Result<AppConfig> {
    let mut config = AppConfig::default();

    if let Some(timezone) = parsed.default_timezone {
        let timezone = timezone.trim().to_string();
        if !is_valid_timezone(&timezone) {
            return Err(ConfigError::InvalidTimezone(timezone));
        }
        config.default_timezone = timezone;
    }

    if let Some(size) = parsed.default_page_size {
        config.default_page_size =
            PageSize::new(size).map_err(|_| ConfigError::InvalidPageSize(size))?;
    }

    if let Some(site_id) = parsed.default_site_id {
        if site_id <= 0 {
            return Err(ConfigError::InvalidSiteId(site_id));
        }
        config.default_site_id = Some(SiteId::new(site_id));
    }

    if let Some(api) = parsed.api {
        if let Some(url) = api.base_url {
            config.api.base_url = validate_base_url(url)?;
        }
        if let Some(token) = api.token {
            let token = token.trim().to_string();
            config.api.token = (!token.is_empty()).then_some(token);
        }
        if let Some(timeout) = api.timeout_secs {
            if timeout == 0 || timeout > MAX_TIMEOUT_SECS {
                return Err(ConfigError::InvalidTimeout(timeout));
            }
            config.api.timeout_secs = timeout;
        }
    }

    Ok(config)
}

fn validate_base_url(raw: String) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(trimmed.to_string())
    } else {
        Err(ConfigError::InvalidBaseUrl(trimmed.to_string()))
    }
}

#[cfg(unix)]
fn ensure_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = fs::metadata(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    if metadata.permissions().mode() & 0o077 != 0 {
        return Err(ConfigError::InsecurePermissions(path.to_path_buf()));
    }
    Ok(())
}

#[cfg(not(unix))]
fn ensure_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
