//! Infrastructure layer for filesystem and environment interactions.

pub mod paths;

pub use paths::{default_token_file, default_trace_file, ensure_dir, expand_tilde, get_data_dir};
