use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

use crate::errors::ConfigError;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_DATA_PATH: &str = "db.json";
const DEFAULT_API_BASE: &str = "https://api.cloudinary.com/";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Settings read once at startup.
#[derive(Clone, Debug)]
pub struct Config {
    /// The port to listen on.
    pub port: u16,

    /// The JSON file holding all reviews.
    pub data_path: PathBuf,

    /// The limit on every image host request and record file operation.
    pub timeout: Duration,

    pub cloudinary: CloudinaryConfig,
}

/// Credentials for the image host.
#[derive(Clone, Debug)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,

    /// The API root, always with a trailing slash.
    pub api_base: Url,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing { name })
        };

        let port = parse_or(&lookup, "PORT", DEFAULT_PORT)?;
        let timeout = Duration::from_secs(parse_or(&lookup, "REVIEWS_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?);
        let data_path = lookup("REVIEWS_DATA_PATH")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH));

        let raw_base = lookup("CLOUDINARY_API_BASE")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_owned());
        let api_base = parse_base(&raw_base).ok_or(ConfigError::Invalid {
            name: "CLOUDINARY_API_BASE",
            value: raw_base,
        })?;

        let cloudinary = CloudinaryConfig {
            cloud_name: required("CLOUDINARY_CLOUD_NAME")?,
            api_key: required("CLOUDINARY_API_KEY")?,
            api_secret: required("CLOUDINARY_API_SECRET")?,
            api_base,
        };

        Ok(Config {
            port,
            data_path,
            timeout,
            cloudinary,
        })
    }
}

fn parse_or<T: FromStr>(
    lookup: impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name).filter(|v| !v.trim().is_empty()) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}

// `Url::join` drops the last path segment unless the base ends in a slash
fn parse_base(raw: &str) -> Option<Url> {
    let with_slash = if raw.ends_with('/') {
        raw.to_owned()
    } else {
        format!("{}/", raw)
    };

    Url::parse(&with_slash).ok()
}
