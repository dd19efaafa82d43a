//! Turns raw OTel trace export requests into the flat [Span] batches the rest
//! of the crate works on. The tree is not built here, only per-span fields are
//! extracted; hierarchy comes later from [crate::span_tree::SpanForest].

use anyhow::Result;
use opentelemetry_proto::tonic::collector::trace::v1::ExportTraceServiceRequest;
use opentelemetry_proto::tonic::common::v1::any_value::Value;
use opentelemetry_proto::tonic::trace::v1::status::StatusCode;

use crate::task_timer::TaskTimer;
use crate::types::{time_point_from_unix_nano, Span, SpanStatus};

/// Extract flat spans from raw OTel data.
///
/// The service name comes from the resource's `service.name` attribute, with
/// `"unknown"` as the fallback. Span ids are hex-encoded; an empty parent id
/// means a root span. Spans without an id are dropped, they can't participate
/// in the hierarchy.
pub fn extract_spans(requests: &[ExportTraceServiceRequest]) -> Result<Vec<Span>> {
    let timer = TaskTimer::new("Extracting spans");

    let mut spans = Vec::new();
    for request in requests {
        for resource_spans in &request.resource_spans {
            let service_name = resource_spans
                .resource
                .as_ref()
                .and_then(|resource| {
                    resource
                        .attributes
                        .iter()
                        .find(|attribute| attribute.key == "service.name")
                })
                .and_then(|attribute| attribute.value.clone())
                .and_then(|value| value.value)
                .and_then(|value| match value {
                    Value::StringValue(name) => Some(name),
                    _ => None,
                })
                .unwrap_or_else(|| "unknown".to_string());

            for scope_spans in &resource_spans.scope_spans {
                for span in &scope_spans.spans {
                    if span.span_id.is_empty() {
                        continue;
                    }

                    let start_time = time_point_from_unix_nano(span.start_time_unix_nano);
                    let end_time = time_point_from_unix_nano(span.end_time_unix_nano);

                    spans.push(Span {
                        span_id: hex::encode(&span.span_id),
                        parent_span_id: if span.parent_span_id.is_empty() {
                            None
                        } else {
                            Some(hex::encode(&span.parent_span_id))
                        },
                        service_name: service_name.clone(),
                        operation_name: span.name.clone(),
                        start_time,
                        duration: (end_time - start_time).max(0.0),
                        status: extract_status(span),
                    });
                }
            }
        }
    }

    timer.stop_with_count(spans.len());
    Ok(spans)
}

/// OTel only knows Unset/Ok/Error. Cancellations arrive as errors whose status
/// message mentions cancellation, which is how the tracing libraries we ingest
/// from report them.
fn extract_status(span: &opentelemetry_proto::tonic::trace::v1::Span) -> SpanStatus {
    match &span.status {
        Some(status) if status.code() == StatusCode::Error => {
            if status.message.to_lowercase().contains("cancel") {
                SpanStatus::Cancelled
            } else {
                SpanStatus::Error
            }
        }
        _ => SpanStatus::Ok,
    }
}
