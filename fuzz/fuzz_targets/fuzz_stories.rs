#![no_main]
use libfuzzer_sys::fuzz_target;

use interpersona_core::reference::graph::{GraphEdge, SectionGraph};
use interpersona_core::types::StyleCode;
use interpersona_engine::story::build_stories;

// Byte pairs become edges, the first byte picks the user's styles.
fuzz_target!(|data: &[u8]| {
    let Some((&mask, rest)) = data.split_first() else {
        return;
    };
    let edges: Vec<GraphEdge> = rest
        .chunks_exact(2)
        .take(64)
        .map(|p| GraphEdge::new(i32::from(p[0] % 8), i32::from(p[1] % 8)))
        .collect();
    let graph = SectionGraph::new(1, edges);
    let users: Vec<StyleCode> = (0..8)
        .filter(|i| mask & (1 << i) != 0)
        .map(StyleCode::from_raw)
        .collect();

    match build_stories(&graph, &users) {
        Ok(stories) => {
            let mut seen: Vec<StyleCode> = stories.into_iter().flatten().collect();
            seen.sort();
            assert_eq!(seen, users);
        }
        // cyclic graphs are rejected, never looped on
        Err(_) => assert!(graph.find_cycle().is_some()),
    }
});
