use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{SectionId, StyleCode};

/// One authored parent/child edge of a section's story graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GraphEdge {
    pub parent: StyleCode,
    pub child: StyleCode,
}

impl GraphEdge {
    pub fn new(parent: i32, child: i32) -> Self {
        Self {
            parent: StyleCode::from_raw(parent),
            child: StyleCode::from_raw(child),
        }
    }
}

/// Authored story graph of a report section. Row order is significant: it
/// ranks edges when stories are assembled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionGraph {
    pub section_id: SectionId,
    #[serde(default)]
    pub edges: Vec<GraphEdge>,
}

impl SectionGraph {
    pub fn new(section_id: SectionId, edges: Vec<GraphEdge>) -> Self {
        Self { section_id, edges }
    }

    /// Children of `node` in authoring order, duplicates included.
    pub fn children_of(&self, node: StyleCode) -> impl Iterator<Item = StyleCode> + '_ {
        self.edges
            .iter()
            .filter(move |e| e.parent == node)
            .map(|e| e.child)
    }

    /// Row index of the last authored copy of `edge`.
    pub fn last_row_of(&self, edge: GraphEdge) -> Option<usize> {
        self.edges.iter().rposition(|e| *e == edge)
    }

    /// Row index of the first edge leaving `node`.
    pub fn first_row_with_parent(&self, node: StyleCode) -> Option<usize> {
        self.edges.iter().position(|e| e.parent == node)
    }

    /// Row index of the first edge entering `node`.
    pub fn first_row_with_child(&self, node: StyleCode) -> Option<usize> {
        self.edges.iter().position(|e| e.child == node)
    }

    /// Returns a node that lies on a cycle, if the graph has one.
    pub fn find_cycle(&self) -> Option<StyleCode> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Open,
            Done,
        }

        let mut adjacency: BTreeMap<StyleCode, Vec<StyleCode>> = BTreeMap::new();
        for e in &self.edges {
            adjacency.entry(e.parent).or_default().push(e.child);
        }

        let mut marks: BTreeMap<StyleCode, Mark> = BTreeMap::new();
        for &start in adjacency.keys() {
            if marks.contains_key(&start) {
                continue;
            }
            // (node, next child position)
            let mut stack = vec![(start, 0usize)];
            marks.insert(start, Mark::Open);
            while let Some(top) = stack.last_mut() {
                let node = top.0;
                let next = adjacency.get(&node).and_then(|c| c.get(top.1)).copied();
                top.1 += 1;
                match next {
                    Some(child) => match marks.get(&child) {
                        Some(Mark::Open) => return Some(child),
                        Some(Mark::Done) => {}
                        None => {
                            marks.insert(child, Mark::Open);
                            stack.push((child, 0));
                        }
                    },
                    None => {
                        marks.insert(node, Mark::Done);
                        stack.pop();
                    }
                }
            }
        }
        None
    }
}
