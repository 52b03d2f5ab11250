//! Collector configuration.
//!
//! Settings come from three layers, highest precedence first:
//!
//! 1. Command-line flags (and their environment variables)
//! 2. An optional YAML file given with `--config`
//! 3. Built-in defaults
//!
//! The resolved [`CollectorConfig`] is passed explicitly to the API client and
//! the collector; nothing reads configuration from ambient state.
//!
//! # YAML file
//!
//! ```yaml
//! endpoint: https://content.guardianapis.com/search
//! from_date: 2024-01-01
//! to_date: 2024-01-31
//! page_size: 50
//! max_pages: 20
//! api_key_file: secrets/guardian.txt
//! ```

use crate::cli::ArticlesArgs;
use chrono::NaiveDate;
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, instrument};
use url::Url;

pub const DEFAULT_ENDPOINT: &str = "https://content.guardianapis.com/search";
pub const DEFAULT_API_KEY_FILE: &str = "api_key.txt";
/// Largest page the search API will serve.
pub const MAX_PAGE_SIZE: u32 = 50;
pub const DEFAULT_PAGE_SIZE: u32 = MAX_PAGE_SIZE;
pub const DEFAULT_MAX_PAGES: u32 = 20;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    ParseFile {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("failed to read API key from {path}: {source}")]
    ReadKey {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("API key is empty")]
    EmptyKey,
    #[error("missing required setting `{0}`")]
    Missing(&'static str),
    #[error("invalid date for `{field}`: {value:?} (expected YYYY-MM-DD)")]
    InvalidDate {
        field: &'static str,
        value: String,
        source: chrono::ParseError,
    },
    #[error("from_date {from} is after to_date {to}")]
    InvertedRange { from: NaiveDate, to: NaiveDate },
    #[error("page_size must be between 1 and 50, got {0}")]
    PageSize(u32),
    #[error("max_pages must be at least 1")]
    MaxPages,
    #[error("invalid endpoint URL {value:?}: {source}")]
    Endpoint {
        value: String,
        source: url::ParseError,
    },
}

/// Opaque API key. `Debug` never shows the value.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The raw key, for building requests only.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

/// Everything the collector needs for one run.
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    pub api_key: ApiKey,
    pub endpoint: Url,
    /// Inclusive.
    pub from_date: NaiveDate,
    /// Inclusive.
    pub to_date: NaiveDate,
    pub page_size: u32,
    /// Hard cap on fetch calls.
    pub max_pages: u32,
}

/// Optional YAML layer. Every key may be omitted.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub endpoint: Option<String>,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
    pub page_size: Option<u32>,
    pub max_pages: Option<u32>,
    pub api_key_file: Option<PathBuf>,
}

impl FileConfig {
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        let file: FileConfig =
            serde_yaml::from_str(&raw).map_err(|source| ConfigError::ParseFile {
                path: path.to_path_buf(),
                source,
            })?;
        debug!(?file, "Loaded config file");
        Ok(file)
    }
}

/// Build the collector configuration from CLI arguments, the optional YAML
/// file they point at, and defaults.
///
/// # Arguments
///
/// * `args` - Parsed `articles` subcommand arguments
///
/// # Returns
///
/// A validated [`CollectorConfig`], or a [`ConfigError`] if the YAML file or
/// key file cannot be read, a date is missing or malformed, the range is
/// inverted, or the page size or ceiling is out of bounds.
pub fn resolve(args: &ArticlesArgs) -> Result<CollectorConfig, ConfigError> {
    let file = match &args.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    resolve_layers(args, file)
}

fn resolve_layers(args: &ArticlesArgs, file: FileConfig) -> Result<CollectorConfig, ConfigError> {
    let endpoint_raw = args
        .endpoint
        .clone()
        .or(file.endpoint)
        .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
    let endpoint = Url::parse(&endpoint_raw).map_err(|source| ConfigError::Endpoint {
        value: endpoint_raw.clone(),
        source,
    })?;

    let from_date = parse_date(
        "from_date",
        args.from_date.clone().or(file.from_date),
    )?;
    let to_date = parse_date("to_date", args.to_date.clone().or(file.to_date))?;
    if from_date > to_date {
        return Err(ConfigError::InvertedRange {
            from: from_date,
            to: to_date,
        });
    }

    let page_size = args.page_size.or(file.page_size).unwrap_or(DEFAULT_PAGE_SIZE);
    if page_size == 0 || page_size > MAX_PAGE_SIZE {
        return Err(ConfigError::PageSize(page_size));
    }

    let max_pages = args.max_pages.or(file.max_pages).unwrap_or(DEFAULT_MAX_PAGES);
    if max_pages == 0 {
        return Err(ConfigError::MaxPages);
    }

    let api_key = match &args.api_key {
        Some(key) => ApiKey::new(key.trim()),
        None => {
            let path = args
                .api_key_file
                .clone()
                .or(file.api_key_file)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_API_KEY_FILE));
            load_api_key(&path)?
        }
    };
    if api_key.expose().is_empty() {
        return Err(ConfigError::EmptyKey);
    }

    info!(
        %endpoint,
        %from_date,
        %to_date,
        page_size,
        max_pages,
        "Resolved collector configuration"
    );

    Ok(CollectorConfig {
        api_key,
        endpoint,
        from_date,
        to_date,
        page_size,
        max_pages,
    })
}

fn parse_date(field: &'static str, value: Option<String>) -> Result<NaiveDate, ConfigError> {
    let value = value.ok_or(ConfigError::Missing(field))?;
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|source| {
        ConfigError::InvalidDate {
            field,
            value,
            source,
        }
    })
}

/// Read the key from a file kept out of version control.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub fn load_api_key(path: &Path) -> Result<ApiKey, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::ReadKey {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(ApiKey::new(raw.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Command};
    use clap::Parser;
    use std::io::Write;

    fn articles_args(extra: &[&str]) -> ArticlesArgs {
        let mut argv = vec!["guardian_digest", "articles"];
        argv.extend_from_slice(extra);
        match Cli::parse_from(argv).command {
            Command::Articles(args) => args,
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_api_key_debug_is_redacted() {
        let key = ApiKey::new("abc123");
        assert_eq!(format!("{key:?}"), "ApiKey(<redacted>)");
        assert_eq!(key.expose(), "abc123");
    }

    #[test]
    fn test_defaults_applied() {
        let args = articles_args(&[
            "--from-date",
            "2024-01-01",
            "--to-date",
            "2024-01-31",
            "--api-key",
            "k",
        ]);
        let config = resolve(&args).unwrap();
        assert_eq!(config.endpoint.as_str(), DEFAULT_ENDPOINT);
        assert_eq!(config.page_size, 50);
        assert_eq!(config.max_pages, 20);
        assert_eq!(config.from_date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    }

    #[test]
    fn test_cli_overrides_file() {
        let args = articles_args(&["--page-size", "10", "--api-key", "k"]);
        let file = FileConfig {
            from_date: Some("2023-05-01".to_string()),
            to_date: Some("2023-05-02".to_string()),
            page_size: Some(25),
            max_pages: Some(3),
            ..FileConfig::default()
        };
        let config = resolve_layers(&args, file).unwrap();
        assert_eq!(config.page_size, 10);
        assert_eq!(config.max_pages, 3);
        assert_eq!(config.to_date, NaiveDate::from_ymd_opt(2023, 5, 2).unwrap());
    }

    #[test]
    fn test_yaml_file_and_key_file() {
        let dir = tempfile::tempdir().unwrap();
        let key_path = dir.path().join("key.txt");
        fs::write(&key_path, "  from-file-key\n").unwrap();

        let config_path = dir.path().join("collector.yaml");
        let mut f = fs::File::create(&config_path).unwrap();
        writeln!(
            f,
            "from_date: \"2024-02-01\"\nto_date: \"2024-02-10\"\nmax_pages: 4\napi_key_file: {}",
            key_path.display()
        )
        .unwrap();
        drop(f);

        let config_arg = config_path.to_string_lossy().to_string();
        let args = articles_args(&["--config", &config_arg]);
        let config = resolve(&args).unwrap();
        assert_eq!(config.api_key.expose(), "from-file-key");
        assert_eq!(config.max_pages, 4);
        assert_eq!(config.from_date, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
    }

    #[test]
    fn test_unknown_yaml_key_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("collector.yaml");
        fs::write(&config_path, "page_sise: 10\n").unwrap();
        let err = FileConfig::load(&config_path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseFile { .. }));
    }

    #[test]
    fn test_missing_date_rejected() {
        let args = articles_args(&["--to-date", "2024-01-31", "--api-key", "k"]);
        let err = resolve(&args).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("from_date")));
    }

    #[test]
    fn test_bad_date_rejected() {
        let args = articles_args(&[
            "--from-date",
            "01/02/2024",
            "--to-date",
            "2024-01-31",
            "--api-key",
            "k",
        ]);
        let err = resolve(&args).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDate { field: "from_date", .. }));
    }

    #[test]
    fn test_inverted_range_rejected() {
        let args = articles_args(&[
            "--from-date",
            "2024-02-01",
            "--to-date",
            "2024-01-31",
            "--api-key",
            "k",
        ]);
        assert!(matches!(
            resolve(&args).unwrap_err(),
            ConfigError::InvertedRange { .. }
        ));
    }

    #[test]
    fn test_page_size_bounds() {
        for bad in ["0", "51"] {
            let args = articles_args(&[
                "--from-date",
                "2024-01-01",
                "--to-date",
                "2024-01-02",
                "--page-size",
                bad,
                "--api-key",
                "k",
            ]);
            assert!(matches!(resolve(&args).unwrap_err(), ConfigError::PageSize(_)));
        }
    }

    #[test]
    fn test_zero_max_pages_rejected() {
        let args = articles_args(&[
            "--from-date",
            "2024-01-01",
            "--to-date",
            "2024-01-02",
            "--max-pages",
            "0",
            "--api-key",
            "k",
        ]);
        assert!(matches!(resolve(&args).unwrap_err(), ConfigError::MaxPages));
    }

    #[test]
    fn test_empty_key_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let key_path = dir.path().join("key.txt");
        fs::write(&key_path, "\n").unwrap();
        let key_arg = key_path.to_string_lossy().to_string();
        let args = articles_args(&[
            "--from-date",
            "2024-01-01",
            "--to-date",
            "2024-01-02",
            "--api-key-file",
            &key_arg,
        ]);
        assert!(matches!(resolve(&args).unwrap_err(), ConfigError::EmptyKey));
    }

    #[test]
    fn test_missing_key_file_reported() {
        let args = articles_args(&[
            "--from-date",
            "2024-01-01",
            "--to-date",
            "2024-01-02",
            "--api-key-file",
            "/nonexistent/guardian/key.txt",
        ]);
        assert!(matches!(resolve(&args).unwrap_err(), ConfigError::ReadKey { .. }));
    }
}
