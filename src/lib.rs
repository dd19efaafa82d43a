//! Core algorithms of a distributed-trace explorer: span-tree reconstruction,
//! expand-aware flattening with windowed rendering, timeline mapping and 2D
//! layout of the service dependency graph. The rendering layer lives outside
//! this crate and only consumes the structures produced here.

pub mod discovery;
pub mod ingest;
pub mod layout;
pub mod persistent;
pub mod span_tree;
pub mod stats;
pub mod task_timer;
pub mod timeline;
pub mod types;
pub mod virtualizer;

pub use discovery::ServiceMapBuilder;
pub use layout::{apply_layout, LayoutConfig, LayoutGraph, LayoutKind};
pub use span_tree::{SpanForest, SpanIndex, VisibleRow};
pub use timeline::{SpanInterval, Timeline};
pub use types::{ServiceEdge, ServiceNode, Span, SpanStatus, TimePoint};
pub use virtualizer::{content_height, visible_window, Window};
