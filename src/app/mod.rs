//! Application layer coordinating state, events, and actions.
//!
//! This module sits between the client runtime and the domain, remote and
//! worker layers. It holds the catalog state machine.
//!
//! # Architecture
//!
//! The application layer follows a unidirectional data flow pattern:
//!
//! ```text
//! User Intent → Event → handle_event → State Mutations → Actions → Worker
//!                  ↑                                                  ↓
//!                  └────────────── Remote Responses ──────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`store`]: Item store, the canonical collection and its CRUD lifecycle
//! - [`filter`]: Filter engine, type and sub-category filtering plus navigation counts
//! - [`search`]: Search ranking session, remote ranking with local fallback
//! - [`display`]: Display reconciler and pagination
//! - [`state`]: Central state container and view model computation
//! - [`handler`]: Event processing and state transition coordinator
//! - [`actions`]: Side effect commands emitted by the handler
//! - [`modes`]: Search phase and ranking mode types

pub mod actions;
pub mod display;
pub mod filter;
pub mod handler;
pub mod modes;
pub mod search;
pub mod state;
pub mod store;

pub use actions::Action;
pub use display::{Page, Pagination, DEFAULT_PAGE_SIZE, PAGE_SIZES};
pub use filter::FilterState;
pub use handler::{handle_event, Event};
pub use modes::{RankingMode, SearchPhase};
pub use search::{MatchLabel, SearchSession, WEAK_SCORE_THRESHOLD};
pub use state::AppState;
pub use store::ItemStore;
