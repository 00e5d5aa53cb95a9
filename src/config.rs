//! Runtime configuration.
//!
//! The only environment knob is the API base URL. Everything else has a fixed default
//! that embedders and tests can override with the `with_*` setters.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::endpoints::DEFAULT_BASE_URL;
use crate::error::{Error, Result};

/// Environment variable holding the API base URL.
pub const API_URL_ENV: &str = "EMS_API_URL";
/// Name the web front end used for the same setting; read when `EMS_API_URL` is unset.
pub const LEGACY_API_URL_ENV: &str = "NEXT_PUBLIC_API_URL";
/// Quiet period after the last search keystroke before the list is refetched.
pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);
/// File name the CSV export is saved under.
pub const EXPORT_FILE_NAME: &str = "employees.csv";

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the employee API, e.g. `http://localhost:8000/api`.
    pub base_url: Url,
    pub search_debounce: Duration,
    /// Where the exported CSV is written.
    pub export_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            search_debounce: DEFAULT_SEARCH_DEBOUNCE,
            export_path: PathBuf::from(EXPORT_FILE_NAME),
        }
    }
}

impl Config {
    /// Reads the base URL from `EMS_API_URL` (or `NEXT_PUBLIC_API_URL`), falling back to
    /// `http://localhost:8000/api`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::from_env`] but with a caller-supplied variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let raw = [API_URL_ENV, LEGACY_API_URL_ENV]
            .into_iter()
            .filter_map(&lookup)
            .find(|value| !value.trim().is_empty());

        match raw {
            Some(raw) => {
                let base_url = parse_base_url(&raw)?;
                debug!(%base_url, "using API base URL from environment");
                Ok(Self::default().with_base_url(base_url))
            }
            None => Ok(Self::default()),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    #[must_use]
    pub fn with_search_debounce(mut self, debounce: Duration) -> Self {
        self.search_debounce = debounce;
        self
    }

    #[must_use]
    pub fn with_export_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.export_path = path.into();
        self
    }
}

/// Parses an absolute http(s) base URL.
pub fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim()).map_err(|_| Error::InvalidEndpoint)?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(Error::InvalidEndpoint),
    }
}
