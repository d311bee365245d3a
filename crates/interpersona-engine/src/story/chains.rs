use interpersona_core::reference::graph::{GraphEdge, SectionGraph};
use interpersona_core::types::StyleCode;

/// Added to ranks of edges that were re-parented over non-user nodes, so
/// they sort after every verbatim authored edge.
pub const REPARENTED_OFFSET: usize = 1000;

pub type Story = Vec<StyleCode>;

/// A reduced edge with its authoring rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankedEdge {
    pub edge: GraphEdge,
    pub rank: usize,
}

/// Rank every reduced edge by where it sits in the authored graph.
///
/// An edge authored verbatim takes the row index of its last copy. A
/// re-parented edge takes `OFFSET + 1 + first row leaving its parent`; when
/// several re-parented edges share a parent they take
/// `OFFSET + 1 + first row entering their child` instead.
pub fn rank_edges(graph: &SectionGraph, edges: &[GraphEdge]) -> Vec<RankedEdge> {
    let fallback = graph.edges.len();
    let reparented: Vec<GraphEdge> = edges
        .iter()
        .copied()
        .filter(|e| graph.last_row_of(*e).is_none())
        .collect();
    let shared_parent = |p: StyleCode| reparented.iter().filter(|e| e.parent == p).count() > 1;

    edges
        .iter()
        .map(|&edge| {
            let rank = match graph.last_row_of(edge) {
                Some(row) => row,
                None => {
                    let row = if shared_parent(edge.parent) {
                        graph.first_row_with_child(edge.child)
                    } else {
                        graph.first_row_with_parent(edge.parent)
                    };
                    REPARENTED_OFFSET + 1 + row.unwrap_or(fallback)
                }
            };
            RankedEdge { edge, rank }
        })
        .collect()
}

fn in_degree(edges: &[GraphEdge], node: StyleCode) -> usize {
    edges.iter().filter(|e| e.child == node).count()
}

fn min_rank_by(ranks: &[RankedEdge], pick: impl Fn(&GraphEdge) -> bool) -> usize {
    ranks
        .iter()
        .filter(|r| pick(&r.edge))
        .map(|r| r.rank)
        .min()
        .unwrap_or(usize::MAX)
}

/// Parents that are never a child, in first-appearance order, stably
/// sorted by the lowest rank among their outgoing edges.
pub fn order_roots(edges: &[GraphEdge], ranks: &[RankedEdge]) -> Vec<StyleCode> {
    let mut roots: Vec<StyleCode> = Vec::new();
    for e in edges {
        if in_degree(edges, e.parent) == 0 && !roots.contains(&e.parent) {
            roots.push(e.parent);
        }
    }
    roots.sort_by_key(|&root| min_rank_by(ranks, |e| e.parent == root));
    roots
}

/// Consume `node`'s outgoing edges and return the children left with no
/// other parent, ordered by their lowest remaining rank.
fn release_children(
    node: StyleCode,
    remaining: &mut Vec<GraphEdge>,
    ranks: &[RankedEdge],
) -> Vec<StyleCode> {
    let children: Vec<StyleCode> = remaining
        .iter()
        .filter(|e| e.parent == node)
        .map(|e| e.child)
        .collect();
    remaining.retain(|e| e.parent != node);
    let mut free: Vec<StyleCode> = children
        .into_iter()
        .filter(|&c| in_degree(remaining, c) == 0)
        .collect();
    free.sort_by_key(|&c| min_rank_by(ranks, |e| e.child == c));
    free
}

/// One story per root, assembled depth-first over a shrinking edge set.
///
/// A child joins the story of the parent whose visit leaves it with no
/// remaining parent; children still waiting on another parent are left for
/// that parent's visit. Edges and ranks are shared across roots.
pub fn assemble(
    edges: &[GraphEdge],
    mut ranks: Vec<RankedEdge>,
    roots: &[StyleCode],
) -> Vec<Story> {
    let mut remaining = edges.to_vec();
    let mut stories = Vec::with_capacity(roots.len());
    for &root in roots {
        let mut story = vec![root];
        let first = release_children(root, &mut remaining, &ranks);
        let mut stack: Vec<(StyleCode, std::vec::IntoIter<StyleCode>)> =
            vec![(root, first.into_iter())];
        while let Some(top) = stack.last_mut() {
            let node = top.0;
            let Some(child) = top.1.next() else {
                stack.pop();
                continue;
            };
            ranks.retain(|r| !(r.edge.parent == node && r.edge.child == child));
            story.push(child);
            let next = release_children(child, &mut remaining, &ranks);
            stack.push((child, next.into_iter()));
        }
        stories.push(story);
    }
    stories
}

/// Append every user style missing from `stories` as its own story, in
/// the user's order.
pub fn attach_leftovers(stories: &mut Vec<Story>, user_styles: &[StyleCode]) {
    for &style in user_styles {
        if !stories.iter().any(|s| s.contains(&style)) {
            stories.push(vec![style]);
        }
    }
}
