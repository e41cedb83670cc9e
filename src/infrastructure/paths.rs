//! Filesystem locations used by the client.
//!
//! All per-user state lives in one data directory: the bearer token file and
//! the optional span trace file. The directory follows the XDG base directory
//! convention and falls back to the home directory.

use crate::domain::error::Result;
use std::path::{Path, PathBuf};

/// Directory name under the platform data directory.
pub const APP_DIR_NAME: &str = "brainbox";

/// File holding the bearer token, relative to the data directory.
pub const TOKEN_FILE_NAME: &str = "token";

/// File receiving exported spans, relative to the data directory.
pub const TRACE_FILE_NAME: &str = "brainbox-spans.json";

/// Resolves the data directory from explicit environment values.
///
/// `XDG_DATA_HOME` wins when set and absolute; otherwise
/// `$HOME/.local/share` is used. Without either the current directory is used.
///
/// # Examples
///
/// ```
/// use brainbox::infrastructure::paths::data_dir_from;
/// use std::path::PathBuf;
///
/// assert_eq!(
///     data_dir_from(Some("/xdg"), Some("/home/me")),
///     PathBuf::from("/xdg/brainbox")
/// );
/// assert_eq!(
///     data_dir_from(Some("relative"), Some("/home/me")),
///     PathBuf::from("/home/me/.local/share/brainbox")
/// );
/// ```
#[must_use]
pub fn data_dir_from(xdg_data_home: Option<&str>, home: Option<&str>) -> PathBuf {
    let base = xdg_data_home
        .filter(|dir| Path::new(dir).is_absolute())
        .map(PathBuf::from)
        .or_else(|| {
            home.filter(|h| !h.is_empty())
                .map(|h| PathBuf::from(h).join(".local").join("share"))
        })
        .unwrap_or_else(|| PathBuf::from("."));
    base.join(APP_DIR_NAME)
}

/// Returns the data directory for this user.
#[must_use]
pub fn get_data_dir() -> PathBuf {
    let xdg = std::env::var("XDG_DATA_HOME").ok();
    let home = std::env::var("HOME").ok();
    data_dir_from(xdg.as_deref(), home.as_deref())
}

/// Default location of the bearer token file.
#[must_use]
pub fn default_token_file() -> PathBuf {
    get_data_dir().join(TOKEN_FILE_NAME)
}

/// Default location of the span trace file.
#[must_use]
pub fn default_trace_file() -> PathBuf {
    get_data_dir().join(TRACE_FILE_NAME)
}

/// Expands a leading `~` to the home directory.
///
/// Paths without a tilde, or with no home directory known, are returned as is.
#[must_use]
pub fn expand_tilde(path: &str) -> PathBuf {
    let home = std::env::var("HOME").ok().filter(|h| !h.is_empty());
    match (path, home) {
        ("~", Some(home)) => PathBuf::from(home),
        (p, Some(home)) if p.starts_with("~/") => PathBuf::from(home).join(&p[2..]),
        (p, _) => PathBuf::from(p),
    }
}

/// Creates `dir` and its parents if missing.
///
/// # Errors
///
/// Returns [`CatalogError::Io`](crate::domain::CatalogError::Io) if the
/// directory cannot be created.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_current_dir() {
        assert_eq!(data_dir_from(None, None), PathBuf::from("./brainbox"));
        assert_eq!(data_dir_from(None, Some("")), PathBuf::from("./brainbox"));
    }

    #[test]
    fn ensure_dir_creates_parents() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("a").join("b");
        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());
    }
}
