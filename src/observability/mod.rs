//! Logging and span export.
//!
//! ```text
//! tracing macros ─┬─ fmt layer ───────────────────────────→ stderr
//!                 └─ tracing-opentelemetry → FileSpanExporter → brainbox-spans.json
//! ```
//!
//! The span file lives in the data directory, rotates at 10 MiB and keeps
//! three backups. It is only written when `trace_file` is enabled.
//!
//! - `init`: subscriber setup
//! - `tracer`: tracer provider with the file exporter
//! - `span_formatter`: JSON encoding of span batches
//! - `file_writer`: rotating line writer

mod file_writer;
mod init;
mod span_formatter;
mod tracer;

pub use init::{init_tracing, resolve_level, shutdown_tracing, SERVICE_NAME};
