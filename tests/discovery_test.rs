
use approx::assert_relative_eq;
use test_helpers::create_service_span;
use traceview::discovery::ServiceMapBuilder;
use traceview::types::SpanStatus;

/// frontend -> backend -> database, one call each.
fn three_tier_trace() -> Vec<traceview::Span> {
    vec![
        create_service_span("1", None, "frontend", 0.0, 1.0, SpanStatus::Ok),
        create_service_span("2", Some("1"), "backend", 0.1, 0.6, SpanStatus::Ok),
        create_service_span("3", Some("2"), "database", 0.2, 0.2, SpanStatus::Ok),
    ]
}

#[test]
fn cross_service_calls_become_edges() {
    let mut builder = ServiceMapBuilder::new();
    builder.add_trace(&three_tier_trace());

    let graph = builder.build(800.0, 600.0, 7);
    assert_eq!(graph.nodes.len(), 3);
    assert_eq!(graph.edges.len(), 2);

    // Nodes sorted by id.
    let ids: Vec<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["backend", "database", "frontend"]);

    assert!(graph
        .edges
        .iter()
        .any(|e| e.source == "frontend" && e.target == "backend"));
    assert!(graph
        .edges
        .iter()
        .any(|e| e.source == "backend" && e.target == "database"));
}

#[test]
fn same_service_parent_child_is_not_an_edge() {
    let spans = vec![
        create_service_span("1", None, "backend", 0.0, 1.0, SpanStatus::Ok),
        create_service_span("2", Some("1"), "backend", 0.1, 0.5, SpanStatus::Ok),
    ];
    let mut builder = ServiceMapBuilder::new();
    builder.add_trace(&spans);

    let graph = builder.build(800.0, 600.0, 7);
    assert_eq!(graph.nodes.len(), 1);
    assert!(graph.edges.is_empty());
}

#[test]
fn dangling_parent_contributes_no_edge() {
    let spans = vec![create_service_span(
        "2",
        Some("gone"),
        "backend",
        0.0,
        0.5,
        SpanStatus::Ok,
    )];
    let mut builder = ServiceMapBuilder::new();
    builder.add_trace(&spans);

    let graph = builder.build(800.0, 600.0, 7);
    assert_eq!(graph.nodes.len(), 1);
    assert!(graph.edges.is_empty());
}

#[test]
fn edge_latency_is_a_real_average() {
    let trace_a = vec![
        create_service_span("1", None, "frontend", 0.0, 1.0, SpanStatus::Ok),
        create_service_span("2", Some("1"), "backend", 0.1, 0.2, SpanStatus::Ok),
    ];
    let trace_b = vec![
        create_service_span("3", None, "frontend", 5.0, 1.0, SpanStatus::Ok),
        create_service_span("4", Some("3"), "backend", 5.1, 0.4, SpanStatus::Ok),
    ];
    let mut builder = ServiceMapBuilder::new();
    builder.add_trace(&trace_a);
    builder.add_trace(&trace_b);
    assert_eq!(builder.trace_count(), 2);

    let graph = builder.build(800.0, 600.0, 7);
    let edge = &graph.edges[0];
    assert_eq!(edge.call_count, 2);
    assert_relative_eq!(edge.avg_latency, 0.3, epsilon = 1e-9);

    let stats = builder.edge_latency_statistics("frontend", "backend").unwrap();
    assert_eq!(stats.count, 2);
    assert_relative_eq!(stats.min, 0.2, epsilon = 1e-9);
    assert_relative_eq!(stats.max, 0.4, epsilon = 1e-9);
}

#[test]
fn strength_is_relative_call_volume() {
    // frontend->backend twice, backend->database once.
    let spans = vec![
        create_service_span("1", None, "frontend", 0.0, 1.0, SpanStatus::Ok),
        create_service_span("2", Some("1"), "backend", 0.1, 0.2, SpanStatus::Ok),
        create_service_span("3", Some("1"), "backend", 0.4, 0.2, SpanStatus::Ok),
        create_service_span("4", Some("2"), "database", 0.2, 0.1, SpanStatus::Ok),
    ];
    let mut builder = ServiceMapBuilder::new();
    builder.add_trace(&spans);

    let graph = builder.build(800.0, 600.0, 7);
    let strength_of = |from: &str, to: &str| {
        graph
            .edges
            .iter()
            .find(|e| e.source == from && e.target == to)
            .unwrap()
            .strength
    };
    assert_relative_eq!(strength_of("frontend", "backend"), 1.0, epsilon = 1e-9);
    assert_relative_eq!(strength_of("backend", "database"), 0.5, epsilon = 1e-9);
}

#[test]
fn node_metrics_are_aggregated() {
    let spans = vec![
        create_service_span("1", None, "backend", 0.0, 0.2, SpanStatus::Ok),
        create_service_span("2", None, "backend", 1.0, 0.4, SpanStatus::Error),
    ];
    let mut builder = ServiceMapBuilder::new();
    builder.add_trace(&spans);

    let graph = builder.build(800.0, 600.0, 7);
    let node = graph.node("backend").unwrap();
    assert_eq!(node.request_count, 2);
    assert_relative_eq!(node.error_rate, 0.5, epsilon = 1e-9);
    assert_relative_eq!(node.avg_latency, 0.3, epsilon = 1e-9);
}

#[test]
fn same_seed_gives_same_initial_positions() {
    let mut builder = ServiceMapBuilder::new();
    builder.add_trace(&three_tier_trace());

    let first = builder.build(800.0, 600.0, 42);
    let second = builder.build(800.0, 600.0, 42);
    for (a, b) in first.nodes.iter().zip(&second.nodes) {
        assert_eq!((a.x, a.y), (b.x, b.y));
    }
}

#[test]
fn empty_aggregate_builds_an_empty_graph() {
    let builder = ServiceMapBuilder::new();
    let graph = builder.build(800.0, 600.0, 7);
    assert!(graph.nodes.is_empty());
    assert!(graph.edges.is_empty());
}
