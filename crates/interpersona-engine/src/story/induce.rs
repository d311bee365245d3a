use std::collections::{BTreeMap, BTreeSet, HashSet};

use interpersona_core::errors::ReportError;
use interpersona_core::reference::graph::{GraphEdge, SectionGraph};
use interpersona_core::types::StyleCode;

struct Frame {
    node: StyleCode,
    /// Nearest user-style ancestor seen on this path.
    marker: StyleCode,
    children: Vec<StyleCode>,
    next: usize,
}

impl Frame {
    fn new(graph: &SectionGraph, node: StyleCode, marker: StyleCode) -> Self {
        // repeated rows would only re-walk the same subtree
        let mut children: Vec<StyleCode> = Vec::new();
        for child in graph.children_of(node) {
            if !children.contains(&child) {
                children.push(child);
            }
        }
        Self {
            node,
            marker,
            children,
            next: 0,
        }
    }
}

/// Walk the authored graph from the parent of every row and emit edges
/// between the user's styles.
///
/// A user child under a user node yields `(node, child)` and moves the
/// path marker to `node`. A user child under a non-user node yields
/// `(marker, child)`, where the marker starts as the walk's start node.
/// Every child is descended into either way. Duplicates are kept.
pub fn induce_edges(
    graph: &SectionGraph,
    user_styles: &BTreeSet<StyleCode>,
) -> Result<Vec<GraphEdge>, ReportError> {
    let mut out = Vec::new();
    for row in &graph.edges {
        let start = row.parent;
        let mut stack = vec![Frame::new(graph, start, start)];
        while let Some(top) = stack.last_mut() {
            let Some(&child) = top.children.get(top.next) else {
                stack.pop();
                continue;
            };
            top.next += 1;
            if user_styles.contains(&child) {
                if user_styles.contains(&top.node) {
                    out.push(GraphEdge {
                        parent: top.node,
                        child,
                    });
                    top.marker = top.node;
                } else {
                    out.push(GraphEdge {
                        parent: top.marker,
                        child,
                    });
                }
            }
            let marker = top.marker;
            if stack.iter().any(|f| f.node == child) {
                return Err(ReportError::config(format!(
                    "section {} graph has a cycle through {child}",
                    graph.section_id
                )));
            }
            stack.push(Frame::new(graph, child, marker));
        }
    }
    Ok(out)
}

/// Keep the first copy of each edge, and only edges leaving a user style.
pub fn dedup_user_edges(edges: Vec<GraphEdge>, user_styles: &BTreeSet<StyleCode>) -> Vec<GraphEdge> {
    let mut seen = HashSet::new();
    edges
        .into_iter()
        .filter(|e| seen.insert(*e))
        .filter(|e| user_styles.contains(&e.parent))
        .collect()
}

/// Drop a direct edge when a longer path already reaches the same child.
///
/// For each child with two or more parents (ascending by code), and each of
/// its parents `p` that is itself a child, remove the edges from `p`'s
/// parents straight to that child. `1->2, 2->3, 1->3` loses `1->3`.
pub fn collapse_redundant(mut edges: Vec<GraphEdge>) -> Vec<GraphEdge> {
    let mut parent_count: BTreeMap<StyleCode, usize> = BTreeMap::new();
    for e in &edges {
        *parent_count.entry(e.child).or_default() += 1;
    }
    let repeated: Vec<StyleCode> = parent_count
        .into_iter()
        .filter(|&(_, n)| n >= 2)
        .map(|(c, _)| c)
        .collect();

    for child in repeated {
        let parents: Vec<StyleCode> = edges
            .iter()
            .filter(|e| e.child == child)
            .map(|e| e.parent)
            .collect();
        for p in parents {
            let grandparents: Vec<StyleCode> = edges
                .iter()
                .filter(|e| e.child == p)
                .map(|e| e.parent)
                .collect();
            if !grandparents.is_empty() {
                edges.retain(|e| !(e.child == child && grandparents.contains(&e.parent)));
            }
        }
    }
    edges
}
