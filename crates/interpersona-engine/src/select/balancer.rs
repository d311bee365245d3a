use std::collections::BTreeMap;

use interpersona_core::config::ReportConfig;
use interpersona_core::errors::ReportError;
use interpersona_core::types::{SectionId, ThemeId};
use tracing::debug;

use super::Candidate;

/// Rows kept in the report body and rows pushed to the extended report.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Split<'a> {
    pub current: Vec<Candidate<'a>>,
    pub extended: Vec<Candidate<'a>>,
}

fn word_totals(rows: &[Candidate<'_>]) -> BTreeMap<SectionId, u32> {
    let mut totals = BTreeMap::new();
    for c in rows {
        *totals.entry(c.section()).or_insert(0) += c.row.word_count;
    }
    totals
}

fn oversize_sections(
    rows: &[Candidate<'_>],
    config: &ReportConfig,
) -> Result<Vec<SectionId>, ReportError> {
    let mut out = Vec::new();
    for (section, words) in word_totals(rows) {
        if words >= config.target_for(section)? {
            out.push(section);
        }
    }
    Ok(out)
}

/// Indices into `rows` of the rows that may move next.
fn candidates(rows: &[Candidate<'_>], oversize: &[SectionId], config: &ReportConfig) -> Vec<usize> {
    let protected = |c: &Candidate<'_>| {
        config
            .protected
            .is_some_and(|p| p.theme == c.row.theme && p.section == c.section())
    };
    let mut picked: Vec<usize> = Vec::new();
    for &section in oversize {
        picked.extend(
            rows.iter()
                .enumerate()
                .filter(|(_, c)| c.section() == section && !protected(c))
                .map(|(i, _)| i),
        );
    }

    // spare illustrations in sections that have few left
    for &section in oversize {
        let illustrated = picked
            .iter()
            .filter(|&&i| rows[i].section() == section && rows[i].row.illustration)
            .count();
        if illustrated <= config.min_illustrations as usize {
            picked.retain(|&i| !(rows[i].section() == section && rows[i].row.illustration));
        }
    }

    let Some(min_impact) = picked.iter().map(|&i| rows[i].row.emotional_impact).min() else {
        return picked;
    };
    picked.retain(|&i| rows[i].row.emotional_impact == min_impact);

    let mut per_theme: BTreeMap<ThemeId, usize> = BTreeMap::new();
    for &i in &picked {
        *per_theme.entry(rows[i].row.theme).or_insert(0) += 1;
    }
    let top = per_theme.values().copied().max().unwrap_or(0);
    picked.retain(|&i| per_theme[&rows[i].row.theme] == top);
    picked
}

/// Move rows out of oversize sections until every section fits its word
/// target or nothing movable is left.
///
/// `rows` must be in budget order. When no row moves, one row still goes:
/// the lowest-impact row of the section with the most rows.
pub fn apply_budget<'a>(
    rows: Vec<Candidate<'a>>,
    config: &ReportConfig,
) -> Result<Split<'a>, ReportError> {
    let mut split = Split {
        current: rows,
        extended: Vec::new(),
    };

    loop {
        let oversize = oversize_sections(&split.current, config)?;
        if oversize.is_empty() {
            break;
        }
        let picked = candidates(&split.current, &oversize, config);
        let next = config.section_order.iter().find_map(|&section| {
            picked
                .iter()
                .copied()
                .find(|&i| split.current[i].section() == section)
        });
        let Some(i) = next else {
            break;
        };
        let moved = split.current.remove(i);
        debug!(
            section = moved.section(),
            code = %moved.code(),
            words = moved.row.word_count,
            "row moved to extended report"
        );
        split.extended.push(moved);
    }

    if split.extended.is_empty() {
        move_fallback(&mut split);
    }
    Ok(split)
}

fn move_fallback(split: &mut Split<'_>) {
    let mut counts: BTreeMap<SectionId, usize> = BTreeMap::new();
    for c in &split.current {
        *counts.entry(c.section()).or_insert(0) += 1;
    }
    let mut fullest: Option<(SectionId, usize)> = None;
    for (section, n) in counts {
        if fullest.map_or(true, |(_, best)| n > best) {
            fullest = Some((section, n));
        }
    }
    let Some((section, _)) = fullest else {
        return;
    };
    let lowest = split
        .current
        .iter()
        .enumerate()
        .filter(|(_, c)| c.section() == section)
        .min_by_key(|(_, c)| c.row.emotional_impact)
        .map(|(i, _)| i);
    if let Some(i) = lowest {
        let moved = split.current.remove(i);
        debug!(section, code = %moved.code(), "fallback row moved to extended report");
        split.extended.push(moved);
    }
}
