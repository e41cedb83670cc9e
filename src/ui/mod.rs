//! User interface layer.
//!
//! Transforms catalog state into display-ready view models and renders them
//! as text.
//!
//! ```text
//! AppState → compute_viewmodel → UIViewModel → render → text
//! ```
//!
//! # Modules
//!
//! - [`viewmodel`]: View model types and card formatting rules
//! - [`renderer`]: Plain-text renderer writing to any `io::Write`

pub mod renderer;
pub mod viewmodel;

pub use renderer::{render, render_viewmodel, RenderOptions};
pub use viewmodel::{
    Card, CardBody, DocumentFile, EmptyState, FooterInfo, HeaderInfo, LinkPreview, NavEntry,
    SearchBarInfo, StatusInfo, SubNavEntry, UIViewModel,
};
