//! Search phase and ranking mode types.
//!
//! # State Machine
//!
//! A search session moves through these phases:
//!
//! ```text
//! Idle ──submit──▶ Searching ──▶ Ranked | Fallback | Empty | Errored
//!  ▲                                       │
//!  └────────── clear / empty submit ───────┘
//! ```
//!
//! Submitting a new query from any terminal phase goes straight back to
//! `Searching`.

use crate::domain::CatalogError;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Where the search session currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchPhase {
    /// No query; the display follows the filter engine.
    #[default]
    Idle,

    /// A ranking request is in flight.
    Searching,

    /// The remote ranking (possibly locally boosted) is displayed.
    Ranked,

    /// The remote ranking was weak or empty and was replaced by local keyword
    /// matches.
    Fallback,

    /// The query completed with zero matches. Not an error.
    Empty,

    /// The ranking request failed.
    Errored,
}

/// How the session treats the order returned by the ranking endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankingMode {
    /// Trust the remote order when the response names its ranking strategy,
    /// boost locally otherwise.
    #[default]
    Auto,

    /// Always trust the remote order.
    Remote,

    /// Always apply local boosting and the weak-score fallback.
    Boosted,
}

impl RankingMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Remote => "remote",
            Self::Boosted => "boosted",
        }
    }
}

impl fmt::Display for RankingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RankingMode {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "remote" => Ok(Self::Remote),
            "boosted" => Ok(Self::Boosted),
            other => Err(CatalogError::Config(format!("unknown ranking mode: {other}"))),
        }
    }
}
