//! Brainbox: a personal content-catalog client.
//!
//! Brainbox keeps a local, consistent view of a remote catalog of notes, links,
//! documents and videos, and lets the user browse and search it:
//! - Create, update and delete items against a remote store, with concurrent
//!   requests applied idempotently by item id
//! - Filter by item type and by link domain or document extension
//! - Search by meaning through a remote ranking endpoint, with a local keyword
//!   fallback when the remote ranking is empty or weak
//! - Paginate whatever is displayed

#![allow(clippy::multiple_crate_versions)]

//!
//! # Architecture
//!
//! The crate follows a layered architecture pattern:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  CLI (main.rs) / CatalogClient (client.rs)          │  ← Runtime
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Application Layer (app/)                           │  ← State machine
//! │  - Item store, filter engine                        │
//! │  - Search ranking session                           │
//! │  - Display reconciler and pagination                │
//! └─────────────────────────────────────────────────────┘
//!         │                    │                    │
//! ┌───────────────┐   ┌───────────────┐   ┌───────────────┐
//! │ UI Layer      │   │ Remote Layer  │   │ Worker Layer  │
//! │ (ui/)         │   │ (remote/)     │   │ (worker/)     │
//! │ - View models │   │ - HTTP client │   │ - Request /   │
//! │ - Renderer    │   │ - Credentials │   │   response    │
//! │               │   │ - Wire models │   │ - Executor    │
//! └───────────────┘   └───────────────┘   └───────────────┘
//!         │                    │                    │
//! ┌─────────────────────────────────────────────────────┐
//! │  Infrastructure & Domain Layers                     │
//! │  - Data directory paths (infrastructure/)           │
//! │  - Error types (domain/error)                       │
//! │  - Item model (domain/item)                         │
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Observability (observability/)                     │
//! │  - tracing subscriber                               │
//! │  - OpenTelemetry span file export                   │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`app`]: Catalog state machine with event/action model
//! - [`client`]: Async runtime executing actions against the remote store
//! - [`domain`]: Core domain types (Item, errors)
//! - [`infrastructure`]: Data directory and file locations
//! - [`remote`]: Remote store trait, HTTP implementation and credentials
//! - [`worker`]: Remote request executor and its message protocol
//! - [`ui`]: View models and plain-text rendering
//! - [`observability`]: Logging and span export
//!
//! # Configuration
//!
//! Settings are layered: defaults, then a TOML file, then `BRAINBOX_*`
//! environment variables.
//!
//! ```toml
//! # ~/.config/brainbox/config.toml
//! server_url = "http://localhost:5555"
//! page_size = 16
//! ranking_mode = "boosted"
//! weak_score_threshold = 0.25
//! trace_level = "debug"
//! ```
//!
//! # Example
//!
//! ```rust
//! use brainbox::{handle_event, initialize, Action, Config, Event};
//!
//! let config = Config::default();
//! let mut state = initialize(&config);
//!
//! let (_, actions) = handle_event(&mut state, &Event::Refresh)?;
//! assert!(matches!(actions.as_slice(), [Action::Dispatch(_)]));
//! assert!(state.store.is_loading());
//! # Ok::<(), brainbox::CatalogError>(())
//! ```

pub mod app;
pub mod client;
pub mod domain;
pub mod infrastructure;
pub mod observability;
pub mod remote;
pub mod ui;
pub mod worker;

pub use app::{handle_event, Action, AppState, Event, RankingMode, SearchPhase};
pub use client::CatalogClient;
pub use domain::{CatalogError, Item, ItemDraft, ItemId, ItemType, Result};

use app::{Pagination, SearchSession, DEFAULT_PAGE_SIZE, PAGE_SIZES, WEAK_SCORE_THRESHOLD};
use infrastructure::paths::{default_token_file, expand_tilde};
use remote::{ChainedTokens, FileToken, StaticToken, TokenSource};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Environment variables read by [`Config::from_env`], with the key they set.
///
/// `BRAINBOX_API_BASE` is listed before `BRAINBOX_API_URL` and wins when both
/// are present.
pub const ENV_KEYS: [(&str, &str); 10] = [
    ("BRAINBOX_API_BASE", "api_base"),
    ("BRAINBOX_API_URL", "api_base"),
    ("BRAINBOX_TOKEN", "token"),
    ("BRAINBOX_TOKEN_FILE", "token_file"),
    ("BRAINBOX_PAGE_SIZE", "page_size"),
    ("BRAINBOX_WEAK_SCORE_THRESHOLD", "weak_score_threshold"),
    ("BRAINBOX_RANKING_MODE", "ranking_mode"),
    ("BRAINBOX_TIMEOUT_SECS", "timeout_secs"),
    ("BRAINBOX_TRACE_LEVEL", "trace_level"),
    ("BRAINBOX_TRACE_FILE", "trace_file"),
];

/// Client configuration.
///
/// # Example
///
/// ```toml
/// server_url = "https://catalog.example.org"
/// api_prefix = "/api"
/// token_file = "~/.local/share/brainbox/token"
/// page_size = 24
/// ranking_mode = "auto"
/// timeout_secs = 10
/// trace_file = true
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root of the remote service, also used to resolve relative upload links.
    ///
    /// Default: `http://localhost:5555`
    pub server_url: String,

    /// Path of the API below `server_url`. Default: `/api`
    pub api_prefix: String,

    /// Full API base, overriding `server_url` + `api_prefix` for requests.
    pub api_base: Option<String>,

    /// Static bearer credential. Takes precedence over `token_file`.
    pub token: Option<String>,

    /// File holding the bearer credential, re-read before each request.
    ///
    /// Default: `<data_dir>/token`
    pub token_file: Option<PathBuf>,

    /// Items per page; one of 8, 12, 16 or 24. Default: 12
    pub page_size: usize,

    /// Boosted score below which a remote ranking is considered weak.
    ///
    /// Default: `0.2`
    pub weak_score_threshold: f64,

    pub ranking_mode: RankingMode,

    /// Request timeout. Unset keeps the transport default.
    pub timeout_secs: Option<u64>,

    /// Filter directive for logs and spans.
    ///
    /// Options: `trace`, `debug`, `info`, `warn`, `error`. `RUST_LOG` wins when
    /// set. Default: `"info"`
    pub trace_level: Option<String>,

    /// Export spans to `<data_dir>/brainbox-spans.json`. Default: `false`
    pub trace_file: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:5555".to_string(),
            api_prefix: "/api".to_string(),
            api_base: None,
            token: None,
            token_file: None,
            page_size: DEFAULT_PAGE_SIZE,
            weak_score_threshold: WEAK_SCORE_THRESHOLD,
            ranking_mode: RankingMode::Auto,
            timeout_secs: None,
            trace_level: None,
            trace_file: false,
        }
    }
}

impl Config {
    /// Loads configuration from a TOML file. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Io`] if the file cannot be read and
    /// [`CatalogError::Config`] if it is not valid TOML for this structure.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&contents).map_err(|e| {
            CatalogError::Config(format!("invalid config file {}: {e}", path.display()))
        })?;
        config.token_file = config
            .token_file
            .map(|file| file.to_str().map_or_else(|| file.clone(), expand_tilde));
        Ok(config)
    }

    /// Builds configuration from string key/value pairs on top of the defaults.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::collections::BTreeMap;
    /// use brainbox::{Config, RankingMode};
    ///
    /// let mut map = BTreeMap::new();
    /// map.insert("page_size".to_string(), "24".to_string());
    /// map.insert("ranking_mode".to_string(), "boosted".to_string());
    /// map.insert("timeout_secs".to_string(), "soon".to_string());
    ///
    /// let config = Config::from_map(&map);
    /// assert_eq!(config.page_size, 24);
    /// assert_eq!(config.ranking_mode, RankingMode::Boosted);
    /// assert_eq!(config.timeout_secs, None);
    /// ```
    #[must_use]
    pub fn from_map(map: &BTreeMap<String, String>) -> Self {
        Self::default().merge_map(map)
    }

    /// Overrides fields present in `map`.
    ///
    /// # Parsing Rules
    ///
    /// - Blank values are ignored
    /// - Numbers, booleans and ranking modes that fail to parse keep the
    ///   current value
    /// - `token_file` expands a leading `~`
    /// - `trace_file` accepts `true/false`, `1/0`, `yes/no`, `on/off`
    #[must_use]
    pub fn merge_map(mut self, map: &BTreeMap<String, String>) -> Self {
        let get = |key: &str| map.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());

        if let Some(value) = get("server_url") {
            self.server_url = value.to_string();
        }
        if let Some(value) = get("api_prefix") {
            self.api_prefix = value.to_string();
        }
        if let Some(value) = get("api_base") {
            self.api_base = Some(value.to_string());
        }
        if let Some(value) = get("token") {
            self.token = Some(value.to_string());
        }
        if let Some(value) = get("token_file") {
            self.token_file = Some(expand_tilde(value));
        }
        if let Some(value) = get("page_size").and_then(|v| v.parse::<usize>().ok()) {
            self.page_size = value;
        }
        if let Some(value) = get("weak_score_threshold").and_then(|v| v.parse::<f64>().ok()) {
            self.weak_score_threshold = value;
        }
        if let Some(value) = get("ranking_mode").and_then(|v| v.parse::<RankingMode>().ok()) {
            self.ranking_mode = value;
        }
        if let Some(value) = get("timeout_secs").and_then(|v| v.parse::<u64>().ok()) {
            self.timeout_secs = Some(value);
        }
        if let Some(value) = get("trace_level") {
            self.trace_level = Some(value.to_string());
        }
        if let Some(value) = get("trace_file").and_then(parse_flag) {
            self.trace_file = value;
        }
        self
    }

    /// Builds configuration from `BRAINBOX_*` environment variables on top of
    /// the defaults. See [`ENV_KEYS`].
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().merge_env(|name| std::env::var(name).ok())
    }

    /// Overrides fields from environment variables looked up through `lookup`.
    #[must_use]
    pub fn merge_env(self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut map = BTreeMap::new();
        for (name, key) in ENV_KEYS {
            if map.contains_key(key) {
                continue;
            }
            if let Some(value) = lookup(name).filter(|v| !v.trim().is_empty()) {
                map.insert(key.to_string(), value);
            }
        }
        self.merge_map(&map)
    }

    /// Resolves the effective configuration: defaults, then the TOML file at
    /// `path` (if given), then the environment.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be loaded or the result does not
    /// [`validate`](Self::validate).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let base = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        let config = base.merge_env(|name| std::env::var(name).ok());
        config.validate()?;
        tracing::debug!(
            api_base = %config.api_base(),
            page_size = config.page_size,
            ranking_mode = %config.ranking_mode,
            "configuration loaded"
        );
        Ok(config)
    }

    /// Checks values the parsers cannot.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Config`] for a page size outside [`PAGE_SIZES`],
    /// a threshold outside `[0, 1]`, or an unparsable API base.
    pub fn validate(&self) -> Result<()> {
        if !PAGE_SIZES.contains(&self.page_size) {
            return Err(CatalogError::Config(format!(
                "page_size must be one of {PAGE_SIZES:?}, got {}",
                self.page_size
            )));
        }
        if !(0.0..=1.0).contains(&self.weak_score_threshold) {
            return Err(CatalogError::Config(format!(
                "weak_score_threshold must be within [0, 1], got {}",
                self.weak_score_threshold
            )));
        }
        let api_base = self.api_base();
        reqwest::Url::parse(&api_base)
            .map_err(|e| CatalogError::Config(format!("invalid API base {api_base}: {e}")))?;
        Ok(())
    }

    /// Base URL for API requests.
    ///
    /// ```rust
    /// use brainbox::Config;
    ///
    /// assert_eq!(Config::default().api_base(), "http://localhost:5555/api");
    /// ```
    #[must_use]
    pub fn api_base(&self) -> String {
        if let Some(base) = &self.api_base {
            return base.trim_end_matches('/').to_string();
        }
        let server = self.server_url.trim_end_matches('/');
        let prefix = self.api_prefix.trim_matches('/');
        if prefix.is_empty() {
            server.to_string()
        } else {
            format!("{server}/{prefix}")
        }
    }

    /// Base for resolving relative links: `server_url`, or the API base with
    /// `api_prefix` removed when only an API base was given.
    #[must_use]
    pub fn link_base(&self) -> String {
        match &self.api_base {
            Some(base) => {
                let base = base.trim_end_matches('/');
                let prefix = self.api_prefix.trim_end_matches('/');
                base.strip_suffix(prefix)
                    .filter(|_| !prefix.is_empty())
                    .unwrap_or(base)
                    .to_string()
            }
            None => self.server_url.trim_end_matches('/').to_string(),
        }
    }

    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Bearer credential source: the static token first, then the token file.
    #[must_use]
    pub fn token_source(&self) -> Arc<dyn TokenSource> {
        let file = self.token_file.clone().unwrap_or_else(default_token_file);
        Arc::new(ChainedTokens::new(vec![
            Box::new(StaticToken::new(self.token.clone())),
            Box::new(FileToken::new(file)),
        ]))
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Creates the application state for `config`.
///
/// An unsupported page size falls back to the default; [`Config::validate`]
/// reports it beforehand when strictness is wanted.
///
/// # Example
///
/// ```rust
/// use brainbox::{initialize, Config};
///
/// let config = Config { page_size: 8, ..Config::default() };
/// let state = initialize(&config);
/// assert_eq!(state.pagination.page_size(), 8);
/// assert!(state.store.is_empty());
/// ```
#[must_use]
pub fn initialize(config: &Config) -> AppState {
    tracing::debug!(
        page_size = config.page_size,
        ranking_mode = %config.ranking_mode,
        threshold = config.weak_score_threshold,
        "initializing catalog state"
    );

    let pagination = Pagination::new(config.page_size).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "unsupported page size, using default");
        Pagination::default()
    });
    let search =
        SearchSession::new(config.ranking_mode).with_threshold(config.weak_score_threshold);

    AppState::new(pagination, search, config.link_base())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.api_base(), "http://localhost:5555/api");
        assert_eq!(config.link_base(), "http://localhost:5555");
        assert_eq!(config.page_size, 12);
        assert!((config.weak_score_threshold - 0.2).abs() < f64::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn toml_file_keeps_unset_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "server_url = \"https://cat.example\"\nranking_mode = \"remote\"\ntrace_file = true"
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.server_url, "https://cat.example");
        assert_eq!(config.ranking_mode, RankingMode::Remote);
        assert!(config.trace_file);
        assert_eq!(config.api_prefix, "/api");
        assert_eq!(config.page_size, 12);
    }

    #[test]
    fn invalid_toml_is_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "page_size = \"many\"").unwrap();
        assert!(matches!(Config::from_file(file.path()), Err(CatalogError::Config(_))));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::from_file(&dir.path().join("absent.toml"));
        assert!(matches!(result, Err(CatalogError::Io(_))));
    }

    #[test]
    fn map_parsing_is_tolerant() {
        let map: BTreeMap<String, String> = [
            ("page_size", "lots"),
            ("weak_score_threshold", "0.35"),
            ("ranking_mode", "sideways"),
            ("trace_file", "yes"),
            ("token", "   "),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let config = Config::from_map(&map);
        assert_eq!(config.page_size, 12);
        assert!((config.weak_score_threshold - 0.35).abs() < f64::EPSILON);
        assert_eq!(config.ranking_mode, RankingMode::Auto);
        assert!(config.trace_file);
        assert_eq!(config.token, None);
    }

    #[test]
    fn env_api_base_wins_over_api_url() {
        let env: BTreeMap<&str, &str> = [
            ("BRAINBOX_API_BASE", "https://a.example/api/"),
            ("BRAINBOX_API_URL", "https://b.example/api"),
            ("BRAINBOX_PAGE_SIZE", "16"),
        ]
        .into_iter()
        .collect();

        let config = Config::default().merge_env(|name| env.get(name).map(ToString::to_string));
        assert_eq!(config.api_base(), "https://a.example/api");
        assert_eq!(config.link_base(), "https://a.example");
        assert_eq!(config.page_size, 16);
    }

    #[test]
    fn env_api_url_used_alone() {
        let config = Config::default().merge_env(|name| {
            (name == "BRAINBOX_API_URL").then(|| "https://b.example/api".to_string())
        });
        assert_eq!(config.api_base(), "https://b.example/api");
    }

    #[test]
    fn validation_rejects_bad_values() {
        let config = Config { page_size: 10, ..Config::default() };
        assert!(matches!(config.validate(), Err(CatalogError::Config(_))));

        let config = Config { weak_score_threshold: 1.5, ..Config::default() };
        assert!(config.validate().is_err());

        let config = Config { server_url: "not a url".into(), ..Config::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn static_token_precedes_file() {
        let dir = tempfile::tempdir().unwrap();
        let token_file = dir.path().join("token");
        std::fs::write(&token_file, "from-file\n").unwrap();

        let config = Config {
            token_file: Some(token_file.clone()),
            ..Config::default()
        };
        assert_eq!(config.token_source().token().as_deref(), Some("from-file"));

        let config = Config {
            token: Some("static".into()),
            token_file: Some(token_file),
            ..Config::default()
        };
        assert_eq!(config.token_source().token().as_deref(), Some("static"));
    }

    #[test]
    fn initialize_applies_search_settings() {
        let config = Config {
            page_size: 7,
            ranking_mode: RankingMode::Boosted,
            weak_score_threshold: 0.4,
            ..Config::default()
        };
        let state = initialize(&config);
        assert_eq!(state.pagination.page_size(), DEFAULT_PAGE_SIZE);
        assert_eq!(state.search.mode(), RankingMode::Boosted);
        assert!((state.search.threshold() - 0.4).abs() < f64::EPSILON);
        assert_eq!(state.server_url, "http://localhost:5555");
    }
}
