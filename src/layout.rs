//! Positions service nodes on a 2D canvas. Three interchangeable algorithms
//! work over the same node/edge arena: a force-directed simulation, a layered
//! hierarchical layout and a simple circular arrangement.
//!
//! All of them mutate node positions in place and never fail: empty graphs lay
//! out to nothing, edges naming unknown node ids are dropped, pinned nodes are
//! never moved.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

use crate::types::{ServiceEdge, ServiceNode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LayoutKind {
    #[default]
    ForceDirected,
    Hierarchical,
    Circular,
}

/// Tuning knobs for the layout algorithms. The defaults are calibrated for a
/// few hundred nodes on a ~800x600 canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Fixed iteration budget for the force simulation. No convergence check,
    /// the budget is always spent.
    pub iterations: usize,
    /// Pairwise repulsion scale, force is `repulsion / distance^2`.
    pub repulsion: f64,
    /// Spring constant for edges, force is `distance * attraction * strength`.
    pub attraction: f64,
    /// Global force scale applied before integration.
    pub alpha: f64,
    /// Velocity multiplier per iteration, < 1 so the simulation settles
    /// instead of oscillating.
    pub damping: f64,
    pub canvas_width: f64,
    pub canvas_height: f64,
    /// Positions are kept at least this far from the canvas edge.
    pub margin: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            iterations: 50,
            repulsion: 6000.0,
            attraction: 0.05,
            alpha: 0.1,
            damping: 0.9,
            canvas_width: 800.0,
            canvas_height: 600.0,
            margin: 40.0,
        }
    }
}

/// The node/edge arena a layout run works on. Each run owns its graph, so two
/// concurrent runs never mutate the same nodes; a stale run's output is simply
/// not applied.
#[derive(Debug, Clone, Default)]
pub struct LayoutGraph {
    pub nodes: Vec<ServiceNode>,
    pub edges: Vec<ServiceEdge>,
}

impl LayoutGraph {
    pub fn new(nodes: Vec<ServiceNode>, edges: Vec<ServiceEdge>) -> Self {
        Self { nodes, edges }
    }

    pub fn node(&self, id: &str) -> Option<&ServiceNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut ServiceNode> {
        self.nodes.iter_mut().find(|node| node.id == id)
    }

    /// Handles the UI's pin toggle. Pinning also stops any residual drift.
    pub fn set_pinned(&mut self, id: &str, pinned: bool) {
        if let Some(node) = self.node_mut(id) {
            node.pinned = pinned;
            if pinned {
                node.vx = 0.0;
                node.vy = 0.0;
            }
        }
    }

    /// Handles the UI's drag event: moves the node and kills its velocity so
    /// the simulation doesn't immediately yank it back.
    pub fn drag_to(&mut self, id: &str, x: f64, y: f64) {
        if let Some(node) = self.node_mut(id) {
            node.x = x;
            node.y = y;
            node.vx = 0.0;
            node.vy = 0.0;
        }
    }

    fn index_by_id(&self) -> HashMap<&str, usize> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (node.id.as_str(), index))
            .collect()
    }

    /// Edges resolved to arena indices. Edges referencing unknown node ids are
    /// silently dropped here.
    fn resolved_edges(&self) -> Vec<(usize, usize, f64)> {
        let index_by_id = self.index_by_id();
        self.edges
            .iter()
            .filter_map(|edge| {
                let source = *index_by_id.get(edge.source.as_str())?;
                let target = *index_by_id.get(edge.target.as_str())?;
                Some((source, target, edge.strength))
            })
            .collect()
    }
}

/// Runs the requested layout over the graph.
pub fn apply_layout(graph: &mut LayoutGraph, kind: LayoutKind, config: &LayoutConfig) {
    match kind {
        LayoutKind::ForceDirected => force_directed(graph, config, None),
        LayoutKind::Hierarchical => hierarchical(graph, config),
        LayoutKind::Circular => circular(graph, config),
    }
}

/// Iterative repulsion + spring simulation.
///
/// `cancel` is checked between iterations: when another layout run supersedes
/// this one the caller flips the flag and the stale run stops early. Its output
/// is then discarded by the caller, cancellation is purely cooperative.
pub fn force_directed(graph: &mut LayoutGraph, config: &LayoutConfig, cancel: Option<&AtomicBool>) {
    if graph.nodes.is_empty() {
        return;
    }
    let edges = graph.resolved_edges();
    for _ in 0..config.iterations {
        if let Some(flag) = cancel {
            if flag.load(Ordering::Relaxed) {
                return;
            }
        }
        force_iteration(&mut graph.nodes, &edges, config);
    }
}

fn force_iteration(nodes: &mut [ServiceNode], edges: &[(usize, usize, f64)], config: &LayoutConfig) {
    let count = nodes.len();

    // Forces accumulate into a separate delta buffer and are applied once at
    // the end of the iteration, so the pair loop below reads a consistent
    // snapshot of positions.
    let mut force_x = vec![0.0; count];
    let mut force_y = vec![0.0; count];

    // Every unordered pair repels. Pinned nodes still act as repulsion sources,
    // they just won't move when the forces are applied.
    for i in 0..count {
        for j in (i + 1)..count {
            let dx = nodes[j].x - nodes[i].x;
            let dy = nodes[j].y - nodes[i].y;
            // Floored at 1 so coincident nodes don't blow up the division.
            let distance = (dx * dx + dy * dy).sqrt().max(1.0);
            let force = config.repulsion / (distance * distance);
            let unit_x = dx / distance;
            let unit_y = dy / distance;
            force_x[i] -= force * unit_x;
            force_y[i] -= force * unit_y;
            force_x[j] += force * unit_x;
            force_y[j] += force * unit_y;
        }
    }

    // Edges pull their endpoints together like springs, weighted by strength.
    for &(source, target, strength) in edges {
        let dx = nodes[target].x - nodes[source].x;
        let dy = nodes[target].y - nodes[source].y;
        let distance = (dx * dx + dy * dy).sqrt().max(1.0);
        let force = distance * config.attraction * strength;
        let unit_x = dx / distance;
        let unit_y = dy / distance;
        force_x[source] += force * unit_x;
        force_y[source] += force * unit_y;
        force_x[target] -= force * unit_x;
        force_y[target] -= force * unit_y;
    }

    let min_x = config.margin;
    let max_x = (config.canvas_width - config.margin).max(min_x);
    let min_y = config.margin;
    let max_y = (config.canvas_height - config.margin).max(min_y);

    for (index, node) in nodes.iter_mut().enumerate() {
        if node.pinned {
            continue;
        }
        node.vx = (node.vx + force_x[index] * config.alpha) * config.damping;
        node.vy = (node.vy + force_y[index] * config.alpha) * config.damping;
        node.x = (node.x + node.vx).clamp(min_x, max_x);
        node.y = (node.y + node.vy).clamp(min_y, max_y);
    }
}

/// Places nodes evenly around a circle centered in the canvas, in input order.
/// One shot, no iteration.
pub fn circular(graph: &mut LayoutGraph, config: &LayoutConfig) {
    let count = graph.nodes.len();
    if count == 0 {
        return;
    }
    let center_x = config.canvas_width / 2.0;
    let center_y = config.canvas_height / 2.0;
    let radius = 0.35 * config.canvas_width.min(config.canvas_height);

    for (index, node) in graph.nodes.iter_mut().enumerate() {
        if node.pinned {
            continue;
        }
        let angle = 2.0 * std::f64::consts::PI * index as f64 / count as f64;
        node.x = center_x + radius * angle.cos();
        node.y = center_y + radius * angle.sin();
        node.vx = 0.0;
        node.vy = 0.0;
    }
}

/// BFS level assignment for the hierarchical layout. Nodes with no incoming
/// edge are roots at level 0; every other node gets `parent level + 1` from
/// whichever traversal path reaches it first. Nodes a BFS from the roots never
/// reaches (cycles with no entry point) fall back to level 0.
pub fn hierarchy_levels(graph: &LayoutGraph) -> HashMap<String, usize> {
    let count = graph.nodes.len();
    let edges = graph.resolved_edges();

    let mut has_incoming = vec![false; count];
    for &(_, target, _) in &edges {
        has_incoming[target] = true;
    }

    let mut levels: Vec<Option<usize>> = vec![None; count];
    let mut queue = VecDeque::new();
    for index in 0..count {
        if !has_incoming[index] {
            levels[index] = Some(0);
            queue.push_back(index);
        }
    }

    while let Some(current) = queue.pop_front() {
        let next_level = levels[current].unwrap_or(0) + 1;
        for &(source, target, _) in &edges {
            if source == current && levels[target].is_none() {
                levels[target] = Some(next_level);
                queue.push_back(target);
            }
        }
    }

    graph
        .nodes
        .iter()
        .enumerate()
        .map(|(index, node)| (node.id.clone(), levels[index].unwrap_or(0)))
        .collect()
}

/// Layered top-to-bottom layout: levels are evenly spaced vertically, nodes
/// are evenly spaced horizontally within their level.
pub fn hierarchical(graph: &mut LayoutGraph, config: &LayoutConfig) {
    if graph.nodes.is_empty() {
        return;
    }
    let levels = hierarchy_levels(graph);

    let mut nodes_per_level: HashMap<usize, Vec<usize>> = HashMap::new();
    for (index, node) in graph.nodes.iter().enumerate() {
        let level = levels.get(&node.id).copied().unwrap_or(0);
        nodes_per_level.entry(level).or_default().push(index);
    }
    let level_count = nodes_per_level.keys().max().copied().unwrap_or(0) + 1;

    let usable_width = (config.canvas_width - 2.0 * config.margin).max(0.0);
    let usable_height = (config.canvas_height - 2.0 * config.margin).max(0.0);
    let row_height = usable_height / level_count as f64;

    for (level, indices) in nodes_per_level {
        let y = config.margin + row_height * (level as f64 + 0.5);
        let slot_width = usable_width / indices.len() as f64;
        for (slot, index) in indices.into_iter().enumerate() {
            let node = &mut graph.nodes[index];
            if node.pinned {
                continue;
            }
            node.x = config.margin + slot_width * (slot as f64 + 0.5);
            node.y = y;
            node.vx = 0.0;
            node.vy = 0.0;
        }
    }
}
