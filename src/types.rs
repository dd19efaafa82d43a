use serde::{Deserialize, Serialize};

/// Seconds since epoch
/// TODO: make nicer, f64 isn't great for this
pub type TimePoint = f64;

pub const MILLISECONDS_PER_SECOND: f64 = 1000.0;

pub fn time_point_from_unix_nano(unix_nano: u64) -> TimePoint {
    unix_nano as f64 / 1_000_000_000.0
}

pub fn time_point_to_utc_string(time: TimePoint) -> String {
    let date_time = chrono::DateTime::from_timestamp_nanos((time * 1e9) as i64);
    date_time.format("%Y-%m-%d %H:%M:%S%.3f").to_string()
}

/// Final status of a timed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpanStatus {
    Ok,
    Error,
    Cancelled,
}

/// A single timed operation within a trace. Spans reference their parent by id,
/// hierarchy is reconstructed by [crate::span_tree::SpanForest].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Span {
    /// Unique within a trace.
    pub span_id: String,
    /// `None` for root spans. A reference to a span that is not present in the
    /// same batch is treated the same as `None`.
    pub parent_span_id: Option<String>,
    pub service_name: String,
    pub operation_name: String,
    pub start_time: TimePoint,
    /// Seconds, always >= 0.
    pub duration: f64,
    pub status: SpanStatus,
}

impl Span {
    pub fn end_time(&self) -> TimePoint {
        self.start_time + self.duration
    }
}

/// A service in the dependency graph. Position and velocity are mutated in
/// place by the layout algorithms; pinned nodes are left where the user put them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceNode {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    /// Set when the user drags a node and fixes it. Layout must not move it.
    pub pinned: bool,
    pub request_count: u64,
    /// 0.0 - 1.0
    pub error_rate: f64,
    /// Average span duration observed for this service, in seconds.
    pub avg_latency: f64,
}

impl ServiceNode {
    pub fn new(id: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            pinned: false,
            request_count: 0,
            error_rate: 0.0,
            avg_latency: 0.0,
        }
    }
}

/// A directed call relationship between two services.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceEdge {
    pub source: String,
    pub target: String,
    /// Relative call volume in [0, 1], used as the spring weight by the
    /// force-directed layout.
    pub strength: f64,
    pub call_count: u64,
    /// Average latency of calls along this edge, in seconds.
    pub avg_latency: f64,
}
