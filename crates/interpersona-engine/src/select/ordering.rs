use std::collections::BTreeMap;

use interpersona_core::errors::ReportError;
use interpersona_core::reference::ReferenceData;
use interpersona_core::types::{SectionId, StyleCode};

use super::{Candidate, Placed};
use crate::story::{build_stories, Story};

/// Above this many stories the middle of the order is re-sorted by code.
pub const KEEP_ENDS_ABOVE: usize = 4;

/// Highest emotional impact among the story's rows.
pub fn story_impact(story: &[StyleCode], rows: &[Candidate<'_>]) -> i32 {
    rows.iter()
        .filter(|c| story.contains(&c.code()))
        .map(|c| c.row.emotional_impact)
        .max()
        .unwrap_or(i32::MIN)
}

/// Most impactful stories first.
///
/// With more than [`KEEP_ENDS_ABOVE`] stories the first two and the last
/// keep their place and the rest are ordered by their first style code.
pub fn order_stories(stories: Vec<Story>, rows: &[Candidate<'_>]) -> Vec<Story> {
    let mut keyed: Vec<(i32, Story)> = stories
        .into_iter()
        .map(|s| (story_impact(&s, rows), s))
        .collect();
    keyed.sort_by(|a, b| b.0.cmp(&a.0));
    let mut ordered: Vec<Story> = keyed.into_iter().map(|(_, s)| s).collect();

    if ordered.len() > KEEP_ENDS_ABOVE {
        let last = ordered.len() - 1;
        ordered[2..last].sort_by_key(|s| s.first().copied());
    }
    ordered
}

/// Lay rows out section by section, story by story.
///
/// Sections come out in ascending id; a story's rows follow its member
/// order.
pub fn arrange<'a>(
    rows: &[Candidate<'a>],
    reference: &ReferenceData,
) -> Result<Vec<Placed<'a>>, ReportError> {
    let mut by_section: BTreeMap<SectionId, Vec<Candidate<'a>>> = BTreeMap::new();
    for c in rows {
        by_section.entry(c.section()).or_default().push(*c);
    }

    let mut out = Vec::with_capacity(rows.len());
    for (section, section_rows) in by_section {
        let graph = reference
            .sections
            .get(&section)
            .ok_or_else(|| ReportError::config(format!("section {section} has no graph")))?;
        let styles: Vec<StyleCode> = section_rows.iter().map(Candidate::code).collect();
        let stories = order_stories(build_stories(graph, &styles)?, &section_rows);

        for (i, story) in stories.iter().enumerate() {
            for code in story {
                out.extend(
                    section_rows
                        .iter()
                        .filter(|c| c.code() == *code)
                        .map(|c| Placed {
                            row: c.row,
                            story: i + 1,
                        }),
                );
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::select::fixtures::row;
    use interpersona_core::reference::content::ContentRow;
    use interpersona_core::reference::graph::{GraphEdge, SectionGraph};

    fn code(raw: i32) -> StyleCode {
        StyleCode::from_raw(raw)
    }

    fn candidates(rows: &[ContentRow]) -> Vec<Candidate<'_>> {
        rows.iter().map(|row| Candidate { row, angle: 0.0 }).collect()
    }

    #[test]
    fn impact_is_max_of_member_rows() {
        let rows = [row(1, 1, 1, 0, false, 3), row(1, 2, 1, 0, false, 7)];
        let c = candidates(&rows);
        assert_eq!(story_impact(&[code(101), code(201)], &c), 7);
        assert_eq!(story_impact(&[code(101)], &c), 3);
    }

    #[test]
    fn few_stories_sort_by_impact_only() {
        let rows = [
            row(1, 1, 1, 0, false, 1),
            row(1, 2, 1, 0, false, 5),
            row(1, 3, 1, 0, false, 5),
        ];
        let c = candidates(&rows);
        let ordered = order_stories(vec![vec![code(101)], vec![code(201)], vec![code(301)]], &c);
        // equal impacts keep their order
        assert_eq!(ordered, vec![vec![code(201)], vec![code(301)], vec![code(101)]]);
    }

    #[test]
    fn many_stories_keep_ends_and_sort_middle_by_code() {
        let rows = [
            row(1, 5, 1, 0, false, 10),
            row(1, 4, 1, 0, false, 8),
            row(1, 3, 1, 0, false, 6),
            row(1, 2, 1, 0, false, 4),
            row(1, 1, 1, 0, false, 2),
        ];
        let c = candidates(&rows);
        let stories: Vec<Story> = [101, 201, 301, 401, 501].iter().map(|&r| vec![code(r)]).collect();
        let ordered: Vec<i32> = order_stories(stories, &c)
            .iter()
            .map(|s| s[0].raw())
            .collect();
        assert_eq!(ordered, vec![501, 401, 201, 301, 101]);
    }

    #[test]
    fn arrange_numbers_stories_per_section() {
        let mut data = crate::assign::fixtures::reference();
        data.sections.insert(
            1,
            SectionGraph::new(1, vec![GraphEdge::new(101, 201)]),
        );
        data.sections.insert(2, SectionGraph::new(2, Vec::new()));
        let rows = [
            row(2, 2, 1, 0, false, 1),
            row(1, 2, 1, 0, false, 1),
            row(1, 1, 1, 0, false, 1),
            row(1, 3, 1, 0, false, 9),
        ];
        let placed = arrange(&candidates(&rows), &data).unwrap();
        let got: Vec<(u16, i32, usize)> = placed
            .iter()
            .map(|p| (p.row.section, p.row.code().raw(), p.story))
            .collect();
        assert_eq!(
            got,
            vec![(1, 301, 1), (1, 101, 2), (1, 201, 2), (2, 201, 1)]
        );
    }

    #[test]
    fn unknown_section_is_configuration_error() {
        let data = crate::assign::fixtures::reference();
        let rows = [row(7, 1, 1, 0, false, 0)];
        let err = arrange(&candidates(&rows), &data).unwrap_err();
        assert!(matches!(err, ReportError::Configuration(_)));
    }
}
