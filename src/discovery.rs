//! Derives the service dependency graph from raw span batches. A call from one
//! service to another shows up as a parent/child span pair on different
//! services; this module aggregates those pairs into nodes and weighted edges
//! for the layout engine.
//!
//! Edge latency is a real running aggregate over observed cross-service calls,
//! not a placeholder.

use std::collections::HashMap;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::layout::LayoutGraph;
use crate::stats::Statistics;
use crate::task_timer::TaskTimer;
use crate::types::{ServiceEdge, ServiceNode, Span, SpanStatus};

#[derive(Debug, Default)]
struct ServiceTally {
    request_count: u64,
    error_count: u64,
    total_latency: f64,
}

#[derive(Debug, Default)]
struct EdgeTally {
    call_count: u64,
    latency: Statistics,
}

/// Accumulates per-service and per-edge statistics across trace batches and
/// turns them into a [LayoutGraph].
#[derive(Debug, Default)]
pub struct ServiceMapBuilder {
    services: HashMap<String, ServiceTally>,
    /// (caller service, callee service) -> tallies
    edges: HashMap<(String, String), EdgeTally>,
    trace_count: u64,
}

impl ServiceMapBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trace_count(&self) -> u64 {
        self.trace_count
    }

    /// Folds one trace's spans into the aggregate. The batch is flat; parent
    /// links are resolved within the batch only, a dangling parent simply
    /// contributes no edge.
    pub fn add_trace(&mut self, spans: &[Span]) {
        if spans.is_empty() {
            return;
        }

        let span_by_id: HashMap<&str, &Span> = spans
            .iter()
            .map(|span| (span.span_id.as_str(), span))
            .collect();

        for span in spans {
            let tally = self.services.entry(span.service_name.clone()).or_default();
            tally.request_count += 1;
            if span.status == SpanStatus::Error {
                tally.error_count += 1;
            }
            tally.total_latency += span.duration;

            // A parent on a different service means a service-to-service call.
            if let Some(parent_id) = &span.parent_span_id {
                if let Some(parent) = span_by_id.get(parent_id.as_str()) {
                    if parent.service_name != span.service_name {
                        let edge = self
                            .edges
                            .entry((parent.service_name.clone(), span.service_name.clone()))
                            .or_default();
                        edge.call_count += 1;
                        edge.latency.add_value(span.duration);
                    }
                }
            }
        }

        self.trace_count += 1;
    }

    /// Delay statistics for one edge, for drill-down views.
    pub fn edge_latency_statistics(&self, from: &str, to: &str) -> Option<&Statistics> {
        self.edges
            .get(&(from.to_string(), to.to_string()))
            .map(|edge| &edge.latency)
    }

    /// Builds the node/edge set the layout engine consumes.
    ///
    /// Nodes are sorted by id and initial positions come from a seeded RNG, so
    /// the same aggregate and seed always produce the same graph. The scatter
    /// is only a starting point for the first layout run, nothing reads
    /// meaning into it.
    pub fn build(&self, canvas_width: f64, canvas_height: f64, seed: u64) -> LayoutGraph {
        let timer = TaskTimer::new("Building service map");
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let mut service_names: Vec<&String> = self.services.keys().collect();
        service_names.sort();

        let mut nodes = Vec::with_capacity(service_names.len());
        for name in service_names {
            let tally = &self.services[name];
            let mut node = ServiceNode::new(
                name.clone(),
                rng.random_range(0.0..canvas_width.max(1.0)),
                rng.random_range(0.0..canvas_height.max(1.0)),
            );
            node.request_count = tally.request_count;
            node.error_rate = if tally.request_count > 0 {
                tally.error_count as f64 / tally.request_count as f64
            } else {
                0.0
            };
            node.avg_latency = if tally.request_count > 0 {
                tally.total_latency / tally.request_count as f64
            } else {
                0.0
            };
            nodes.push(node);
        }

        let max_call_count = self
            .edges
            .values()
            .map(|edge| edge.call_count)
            .max()
            .unwrap_or(0);

        let mut edge_keys: Vec<&(String, String)> = self.edges.keys().collect();
        edge_keys.sort();

        let mut edges = Vec::with_capacity(edge_keys.len());
        for key in edge_keys {
            let tally = &self.edges[key];
            edges.push(ServiceEdge {
                source: key.0.clone(),
                target: key.1.clone(),
                // Relative call volume, the busiest edge gets strength 1.
                strength: if max_call_count > 0 {
                    tally.call_count as f64 / max_call_count as f64
                } else {
                    0.0
                },
                call_count: tally.call_count,
                avg_latency: tally.latency.mean(),
            });
        }

        timer.stop_with_count(nodes.len());
        LayoutGraph::new(nodes, edges)
    }
}
