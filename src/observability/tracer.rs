//! OpenTelemetry tracer provider backed by a rotating JSON file.

use super::file_writer::RotatingFile;
use super::span_formatter::SpanFormatter;
use futures_util::future::BoxFuture;
use opentelemetry::trace::TraceError;
use opentelemetry::KeyValue;
use opentelemetry_sdk::export::trace::{ExportResult, SpanData, SpanExporter};
use opentelemetry_sdk::resource::Resource;
use opentelemetry_sdk::trace::{Config, TracerProvider};
use std::path::PathBuf;

/// Span exporter writing one JSON document per batch.
#[derive(Debug)]
struct FileSpanExporter {
    file: RotatingFile,
    formatter: SpanFormatter,
    is_shutdown: bool,
}

impl SpanExporter for FileSpanExporter {
    fn export(&mut self, batch: Vec<SpanData>) -> BoxFuture<'static, ExportResult> {
        let result = if self.is_shutdown {
            Err(TraceError::from("span exporter is shut down"))
        } else {
            let document = self.formatter.format_batch(&batch).to_string();
            self.file
                .write_line(&document)
                .map_err(|e| TraceError::from(e.to_string()))
        };
        Box::pin(std::future::ready(result))
    }

    fn shutdown(&mut self) {
        self.is_shutdown = true;
    }
}

/// Builds a tracer provider that exports spans of `service` to `file_path`.
///
/// Spans are exported as they end, without batching, so the file stays
/// current for short-lived CLI runs.
#[must_use]
pub fn file_tracer_provider(file_path: PathBuf, service: &str) -> TracerProvider {
    let exporter = FileSpanExporter {
        file: RotatingFile::new(file_path),
        formatter: SpanFormatter::new(service),
        is_shutdown: false,
    };
    let resource = Resource::new(vec![KeyValue::new("service.name", service.to_string())]);

    TracerProvider::builder()
        .with_config(Config::default().with_resource(resource))
        .with_simple_exporter(exporter)
        .build()
}
