//! Reconstructs the span hierarchy from a flat batch of spans and flattens it
//! into the depth-first sequence of rows that are eligible for rendering.
//! The forest is rebuilt from scratch whenever a new batch arrives, nothing is
//! patched incrementally.

use std::collections::{HashMap, HashSet};

use crate::types::Span;

/// Index of a span in the forest's arena.
pub type SpanIndex = usize;

/// One row of the flattened trace view. `depth` is the indentation level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleRow {
    pub span_index: SpanIndex,
    pub depth: usize,
}

/// A parent -> ordered children index over a batch of spans.
///
/// Spans whose declared parent is missing from the batch are reparented to the
/// root, so the result is always a valid forest with no dangling references.
#[derive(Debug, Default)]
pub struct SpanForest {
    spans: Vec<Span>,
    /// `None` is the root bucket. Every bucket is sorted ascending by start
    /// time, ties broken by span id so the order is stable across rebuilds.
    children: HashMap<Option<SpanIndex>, Vec<SpanIndex>>,
    by_id: HashMap<String, SpanIndex>,
}

impl SpanForest {
    pub fn build(spans: Vec<Span>) -> SpanForest {
        let mut by_id = HashMap::with_capacity(spans.len());
        for (index, span) in spans.iter().enumerate() {
            by_id.insert(span.span_id.clone(), index);
        }

        let mut children: HashMap<Option<SpanIndex>, Vec<SpanIndex>> = HashMap::new();
        children.entry(None).or_default();
        for (index, span) in spans.iter().enumerate() {
            let parent = match &span.parent_span_id {
                // Dangling parent reference, treat the span as a root.
                Some(parent_id) => by_id.get(parent_id).copied(),
                None => None,
            };
            children.entry(parent).or_default().push(index);
        }

        for bucket in children.values_mut() {
            bucket.sort_by(|&a, &b| {
                spans[a]
                    .start_time
                    .partial_cmp(&spans[b].start_time)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| spans[a].span_id.cmp(&spans[b].span_id))
            });
        }

        SpanForest {
            spans,
            children,
            by_id,
        }
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn span(&self, index: SpanIndex) -> &Span {
        &self.spans[index]
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    pub fn get_by_id(&self, span_id: &str) -> Option<&Span> {
        self.by_id.get(span_id).map(|&index| &self.spans[index])
    }

    /// Top-level spans, ordered by start time.
    pub fn roots(&self) -> &[SpanIndex] {
        self.children
            .get(&None)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Children of the given span, ordered by start time.
    pub fn children_of(&self, span_id: &str) -> &[SpanIndex] {
        self.by_id
            .get(span_id)
            .and_then(|&index| self.children.get(&Some(index)))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Whether the row for this span should get an expand affordance at all.
    pub fn has_children(&self, span_id: &str) -> bool {
        !self.children_of(span_id).is_empty()
    }

    /// Flattens the forest depth-first into the rows eligible for rendering.
    ///
    /// A span's subtree is descended only if its id is in `expanded`, so a
    /// collapsed subtree contributes exactly one row regardless of descendant
    /// count. The caller owns `expanded` and keeps it across rebuilds, ids stay
    /// valid even when indices change.
    ///
    /// Uses an explicit stack instead of recursion so pathologically deep
    /// traces can't blow the call stack, and a visited set so a malformed
    /// parent chain can't loop forever.
    pub fn flatten(&self, expanded: &HashSet<String>) -> Vec<VisibleRow> {
        let mut rows = Vec::new();
        let mut visited: HashSet<SpanIndex> = HashSet::new();
        let mut stack: Vec<(SpanIndex, usize)> = Vec::new();

        // Reversed so the earliest-starting root is popped first.
        for &root in self.roots().iter().rev() {
            stack.push((root, 0));
        }

        while let Some((index, depth)) = stack.pop() {
            if !visited.insert(index) {
                continue;
            }
            rows.push(VisibleRow {
                span_index: index,
                depth,
            });

            if expanded.contains(&self.spans[index].span_id) {
                if let Some(bucket) = self.children.get(&Some(index)) {
                    for &child in bucket.iter().rev() {
                        stack.push((child, depth + 1));
                    }
                }
            }
        }

        rows
    }

    /// Flattened order with every span expanded. Used by analysis passes that
    /// need to see the whole trace regardless of the UI's expand state.
    pub fn flatten_all(&self) -> Vec<VisibleRow> {
        let expanded: HashSet<String> = self
            .spans
            .iter()
            .map(|span| span.span_id.clone())
            .collect();
        self.flatten(&expanded)
    }
}
