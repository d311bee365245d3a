//! Per-section story ordering over the authored story graph.

pub mod chains;
pub mod induce;

use std::collections::BTreeSet;

use interpersona_core::errors::ReportError;
use interpersona_core::reference::graph::SectionGraph;
use interpersona_core::types::StyleCode;
use tracing::debug;

pub use self::chains::Story;
use self::chains::{assemble, attach_leftovers, order_roots, rank_edges};
use self::induce::{collapse_redundant, dedup_user_edges, induce_edges};

/// Partition a section's user styles into ordered stories.
///
/// `user_styles` is the user's row order for the section; duplicates are
/// ignored. Every style ends up in exactly one story.
pub fn build_stories(
    graph: &SectionGraph,
    user_styles: &[StyleCode],
) -> Result<Vec<Story>, ReportError> {
    let mut ordered: Vec<StyleCode> = Vec::with_capacity(user_styles.len());
    for &s in user_styles {
        if !ordered.contains(&s) {
            ordered.push(s);
        }
    }
    let users: BTreeSet<StyleCode> = ordered.iter().copied().collect();

    let induced = induce_edges(graph, &users)?;
    let edges = collapse_redundant(dedup_user_edges(induced, &users));

    let mut stories = if edges.is_empty() {
        Vec::new()
    } else {
        let ranks = rank_edges(graph, &edges);
        let roots = order_roots(&edges, &ranks);
        assemble(&edges, ranks, &roots)
    };
    attach_leftovers(&mut stories, &ordered);

    debug!(
        section = graph.section_id,
        styles = ordered.len(),
        edges = edges.len(),
        stories = stories.len(),
        "stories built"
    );
    Ok(stories)
}
