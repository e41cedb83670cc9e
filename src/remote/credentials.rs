//! Bearer credential sources.
//!
//! Issuing tokens is somebody else's job; the client only needs to read one
//! before each request. A source returning `None` makes protected requests fail
//! with [`CatalogError::AuthorizationMissing`](crate::domain::CatalogError)
//! before anything is sent.

use std::path::PathBuf;

/// Supplies the bearer credential for outgoing requests.
pub trait TokenSource: Send + Sync {
    /// Returns the current token, or `None` when the user is not logged in.
    fn token(&self) -> Option<String>;
}

/// A token fixed at construction time.
#[derive(Debug, Clone, Default)]
pub struct StaticToken(Option<String>);

impl StaticToken {
    #[must_use]
    pub fn new(token: Option<String>) -> Self {
        Self(token.filter(|t| !t.trim().is_empty()))
    }

    #[must_use]
    pub fn none() -> Self {
        Self(None)
    }
}

impl TokenSource for StaticToken {
    fn token(&self) -> Option<String> {
        self.0.clone()
    }
}

/// A token stored in a file, re-read on every request so that logging in or out
/// from another process takes effect immediately.
#[derive(Debug, Clone)]
pub struct FileToken {
    path: PathBuf,
}

impl FileToken {
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl TokenSource for FileToken {
    fn token(&self) -> Option<String> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                (!token.is_empty()).then(|| token.to_string())
            }
            Err(e) => {
                tracing::trace!(path = ?self.path, error = %e, "token file not readable");
                None
            }
        }
    }
}

/// Tries each source in order and returns the first token found.
pub struct ChainedTokens(Vec<Box<dyn TokenSource>>);

impl ChainedTokens {
    #[must_use]
    pub fn new(sources: Vec<Box<dyn TokenSource>>) -> Self {
        Self(sources)
    }
}

impl TokenSource for ChainedTokens {
    fn token(&self) -> Option<String> {
        self.0.iter().find_map(|source| source.token())
    }
}

impl std::fmt::Debug for ChainedTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainedTokens")
            .field("sources", &self.0.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_static_token_counts_as_missing() {
        assert_eq!(StaticToken::new(Some("  ".into())).token(), None);
        assert_eq!(StaticToken::new(Some("abc".into())).token().as_deref(), Some("abc"));
    }

    #[test]
    fn file_token_is_reread_each_time() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token");
        let source = FileToken::new(path.clone());
        assert_eq!(source.token(), None);

        std::fs::write(&path, "secret\n").unwrap();
        assert_eq!(source.token().as_deref(), Some("secret"));

        std::fs::write(&path, "").unwrap();
        assert_eq!(source.token(), None);
    }

    #[test]
    fn chain_prefers_first_available() {
        let chain = ChainedTokens::new(vec![
            Box::new(StaticToken::none()),
            Box::new(StaticToken::new(Some("second".into()))),
        ]);
        assert_eq!(chain.token().as_deref(), Some("second"));
    }
}
